//! Task taxonomies.
//!
//! Every domain agent resolves a request to one leaf task from a closed set.
//! The sets are plain enums so registries keyed by them can be checked for
//! exhaustiveness.

mod agent;
mod document_kind;
mod geotechnical;
mod structural;

pub use agent::AgentKind;
pub use document_kind::{DocumentKind, DocumentRole};
pub use geotechnical::GeotechnicalTask;
pub use structural::StructuralTask;

use std::fmt::Debug;
use std::hash::Hash;

/// Sentinel tag returned by sub-task detection when no task fits.
pub const UNSUPPORTED_TASK: &str = "unsupported_task";

/// A closed set of leaf tasks handled by one domain agent.
pub trait TaskTag: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Every member of the set.
    fn all() -> &'static [Self];

    /// Machine tag used in classification prompts, e.g. `beam_design`.
    fn tag(&self) -> &'static str;

    /// Human task name, e.g. `Beam Design`.
    fn label(&self) -> &'static str;

    /// Resolves a tag back to its task.
    fn from_tag(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|task| task.tag() == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_well_formed<T: TaskTag>() {
        let tags: HashSet<&str> = T::all().iter().map(|t| t.tag()).collect();
        assert_eq!(tags.len(), T::all().len(), "duplicate tag");
        assert!(!tags.contains(UNSUPPORTED_TASK));
        for task in T::all() {
            assert_eq!(T::from_tag(task.tag()), Some(*task));
            assert!(!task.label().is_empty());
        }
    }

    #[test]
    fn taxonomies_are_well_formed() {
        assert_well_formed::<StructuralTask>();
        assert_well_formed::<GeotechnicalTask>();
        assert_well_formed::<DocumentKind>();
    }

    #[test]
    fn unknown_tag_resolves_to_none() {
        assert_eq!(StructuralTask::from_tag("bridge_design"), None);
        assert_eq!(StructuralTask::from_tag(UNSUPPORTED_TASK), None);
    }
}
