//! Candidate registry.

use std::fmt;

use tokencheck_domain::Deployment;
use tracing::debug;

use crate::{AdapterError, MinimalAdapter, ReferenceAdapter, SlotAdapter, TokenAdapter};

/// Id of the composition-based reference candidate.
pub const REFERENCE: &str = "reference";

/// Id of the minimal candidate.
pub const MINIMAL: &str = "minimal";

/// Id of the slot-level candidate.
pub const SLOT: &str = "slot";

/// Builds a fresh adapter for a deployment.
pub type AdapterFactory =
    Box<dyn Fn(&Deployment) -> Result<Box<dyn TokenAdapter>, AdapterError> + Send + Sync>;

/// Ordered set of candidate factories.
///
/// The first registered candidate is the baseline the others are compared against.
#[derive(Default)]
pub struct CandidateRegistry {
    entries: Vec<(String, AdapterFactory)>,
}

impl fmt::Debug for CandidateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateRegistry").field("ids", &self.ids().collect::<Vec<_>>()).finish()
    }
}

impl CandidateRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Registry with the three built-in candidates, `reference` first.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.entries.push((REFERENCE.to_string(), Box::new(deploy_reference) as AdapterFactory));
        registry.entries.push((MINIMAL.to_string(), Box::new(deploy_minimal) as AdapterFactory));
        registry.entries.push((SLOT.to_string(), Box::new(deploy_slot) as AdapterFactory));
        registry
    }

    /// Register a factory under `id`.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> Result<(), AdapterError>
    where
        F: Fn(&Deployment) -> Result<Box<dyn TokenAdapter>, AdapterError> + Send + Sync + 'static,
    {
        let id = id.into();
        if self.contains(&id) {
            return Err(AdapterError::DuplicateCandidate(id));
        }
        debug!(target: "registry", %id, "registered candidate");
        self.entries.push((id, Box::new(factory)));
        Ok(())
    }

    /// Keep only the candidates in `ids`, in registration order.
    pub fn retain(&mut self, ids: &[String]) -> Result<(), AdapterError> {
        if let Some(unknown) = ids.iter().find(|id| !self.contains(id)) {
            return Err(AdapterError::UnknownCandidate(unknown.clone()));
        }
        self.entries.retain(|(id, _)| ids.contains(id));
        Ok(())
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == id)
    }

    /// Registered ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    /// Number of registered candidates.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no candidate is registered.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a fresh adapter for `id`.
    pub fn build(&self, id: &str, deployment: &Deployment) -> Result<Box<dyn TokenAdapter>, AdapterError> {
        let (_, factory) = self
            .entries
            .iter()
            .find(|(existing, _)| existing == id)
            .ok_or_else(|| AdapterError::UnknownCandidate(id.to_string()))?;
        debug!(target: "registry", %id, address = %deployment.address, "deploying candidate");
        factory(deployment)
    }

    /// Build fresh adapters for every candidate, in registration order.
    pub fn build_all(&self, deployment: &Deployment) -> Result<Vec<Box<dyn TokenAdapter>>, AdapterError> {
        self.ids().map(|id| self.build(id, deployment)).collect()
    }
}

fn deploy_reference(deployment: &Deployment) -> Result<Box<dyn TokenAdapter>, AdapterError> {
    Ok(Box::new(ReferenceAdapter::deploy(REFERENCE, deployment)?))
}

fn deploy_minimal(deployment: &Deployment) -> Result<Box<dyn TokenAdapter>, AdapterError> {
    Ok(Box::new(MinimalAdapter::deploy(MINIMAL, deployment)?))
}

fn deploy_slot(deployment: &Deployment) -> Result<Box<dyn TokenAdapter>, AdapterError> {
    Ok(Box::new(SlotAdapter::deploy(SLOT, deployment)))
}
