//! Engine tiers and the capability gate.

mod capability;
mod tier;

pub use capability::{Capability, CapabilityDenied, CapabilityGate};
pub use tier::EngineTier;
