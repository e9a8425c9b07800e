//! Catalog of specialists: rubrics, schemas and required inputs per task.

pub mod documents;
pub mod geotechnical;
pub mod structural;
pub mod visual;
