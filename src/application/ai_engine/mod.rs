//! AI engine: classification, dispatch, retrieval and streaming primitives
//! shared by the handlers.

mod classifier;
mod models;
mod rag;
mod registry;
mod specialist;
mod streaming;
mod subtask;
mod taxonomies;

pub use classifier::{ClassificationFailure, ConstrainedClassifier, Taxonomy};
pub use models::TierModels;
pub use rag::{RagContext, RagContextInjector};
pub use registry::{AgentDescriptor, DispatchError, RegistryError, SpecialistRegistry};
pub use specialist::{
    FailureReason, GenerationFailure, GenerationSettings, SpecialistHandler, SpecialistInput,
    SpecialistOutcome, SpecialistSpec, StructuredSpecialist,
};
pub use streaming::{CancelHandle, StreamState, StreamingChannel};
pub use subtask::SubtaskDetector;
pub use taxonomies::{
    CorpusSelection, IntentTaxonomy, Sufficiency, SufficiencyCheck, TaskChoice, TaskSelection,
};
