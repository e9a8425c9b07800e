//! Specialist registry.
//!
//! Maps every leaf task of a domain agent to the specialist that handles it.
//! "No handler for this task" and "the handler failed" are distinct outcomes.
//!
//! # Example
//!
//! ```ignore
//! let mut registry = SpecialistRegistry::new("structural");
//! registry.register(StructuralTask::BeamDesign, EngineTier::Premium, beam);
//! registry.validate_exhaustive()?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use super::specialist::{GenerationFailure, SpecialistHandler, SpecialistInput, SpecialistOutcome};
use super::taxonomies::TaskSelection;
use crate::domain::engine::{Capability, CapabilityDenied, EngineTier};
use crate::domain::tasks::TaskTag;

/// One registered specialist.
pub struct AgentDescriptor<K, T> {
    pub key: K,
    pub minimum_tier: EngineTier,
    pub handler: Arc<dyn SpecialistHandler<T>>,
}

impl<K: Clone, T> Clone for AgentDescriptor<K, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            minimum_tier: self.minimum_tier,
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Startup misconfiguration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{agent} registry has no handler for: {}", missing.join(", "))]
    MissingHandlers { agent: String, missing: Vec<String> },
}

/// Why a dispatch produced no payload.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("no specialist handles this request")]
    UnsupportedTask,

    #[error(transparent)]
    CapabilityDenied(#[from] CapabilityDenied),

    #[error(transparent)]
    GenerationFailure(#[from] GenerationFailure),
}

/// Enum-keyed specialist registry for one domain agent.
pub struct SpecialistRegistry<K, T> {
    agent: String,
    capability: Capability,
    descriptors: HashMap<K, AgentDescriptor<K, T>>,
}

impl<K: TaskTag, T> SpecialistRegistry<K, T> {
    /// Creates an empty registry whose tier denials report `capability`.
    pub fn new(agent: impl Into<String>, capability: Capability) -> Self {
        Self {
            agent: agent.into(),
            capability,
            descriptors: HashMap::new(),
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Registers `handler` for `key`, replacing any previous one.
    pub fn register(
        &mut self,
        key: K,
        minimum_tier: EngineTier,
        handler: Arc<dyn SpecialistHandler<T>>,
    ) -> &mut Self {
        self.descriptors.insert(
            key,
            AgentDescriptor {
                key,
                minimum_tier,
                handler,
            },
        );
        self
    }

    pub fn get(&self, key: K) -> Option<&AgentDescriptor<K, T>> {
        self.descriptors.get(&key)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Fails if any task of `K` has no handler.
    pub fn validate_exhaustive(&self) -> Result<(), RegistryError> {
        self.validate_covers(K::all())
    }

    /// Fails if any of `keys` has no handler.
    pub fn validate_covers(&self, keys: &[K]) -> Result<(), RegistryError> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|key| !self.descriptors.contains_key(key))
            .map(|key| key.tag().to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::MissingHandlers {
                agent: self.agent.clone(),
                missing,
            })
        }
    }

    /// Runs the specialist for `selection`, re-checking its minimum tier.
    pub async fn dispatch(
        &self,
        selection: TaskSelection<K>,
        tier: EngineTier,
        input: &SpecialistInput,
    ) -> Result<(K, SpecialistOutcome<T>), DispatchError> {
        let TaskSelection::Task(key) = selection else {
            return Err(DispatchError::UnsupportedTask);
        };
        let descriptor = self.get(key).ok_or(DispatchError::UnsupportedTask)?;
        if !tier.satisfies(descriptor.minimum_tier) {
            return Err(CapabilityDenied {
                capability: self.capability,
                required: descriptor.minimum_tier,
                current: tier,
            }
            .into());
        }

        info!(agent = %self.agent, task = key.tag(), %tier, "dispatching specialist");
        let outcome = descriptor.handler.generate(input).await?;
        Ok((key, outcome))
    }
}
