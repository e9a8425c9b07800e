//! Application handlers.
//!
//! One command handler per orchestrator operation. Handlers return typed
//! outcomes; user-facing wording is left to the orchestrator.

mod analyze_image;
mod detect_intent;
mod route_calculation;
mod route_document;
mod stream_conversation;

pub use analyze_image::{
    AnalyzeImageCommand, AnalyzeImageError, AnalyzeImageHandler, VisualFollowUpCommand,
    VisualFollowUpHandler,
};
pub use detect_intent::{DetectIntentCommand, DetectIntentHandler, DetectIntentResult};
pub use route_calculation::{
    CalculationOutcome, RouteCalculationCommand, RouteCalculationError, RouteCalculationHandler,
};
pub use route_document::{RouteDocumentCommand, RouteDocumentError, RouteDocumentHandler};
pub use stream_conversation::{
    StreamConversationCommand, StreamConversationHandler, StreamConversationResult, StreamError,
};
