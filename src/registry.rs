//! Handler and policy registries.
//!
//! Both are assembled once at startup and then only read.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use itertools::Itertools;
use tracing::debug;

use crate::error::AuthzError;
use crate::traits::AuthorizationHandler;
use crate::types::{Operation, Policy, ResourceKind};

type HandlerKey = (Operation, ResourceKind);

/// Handlers keyed by `(operation, resource kind)`, in registration order.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerKey, Vec<Arc<dyn AuthorizationHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the pair the handler declares. Several handlers may
    /// share a pair; they are invoked in the order they were registered.
    pub fn register(&mut self, handler: Arc<dyn AuthorizationHandler>) {
        let key = (handler.operation(), handler.resource_kind());
        debug!(
            event = "Register",
            phase = "Handler",
            handler = handler.name(),
            operation = %key.0,
            resource_kind = %key.1
        );
        self.handlers.entry(key).or_default().push(handler);
    }

    /// Handlers for the pair; empty when nothing is registered.
    pub fn handlers_for(
        &self,
        operation: &Operation,
        kind: ResourceKind,
    ) -> &[Arc<dyn AuthorizationHandler>] {
        self.handlers
            .get(&(operation.clone(), kind))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Registered pairs, sorted for stable output.
    pub fn pairs(&self) -> Vec<(Operation, ResourceKind)> {
        self.handlers
            .keys()
            .cloned()
            .sorted_by(|a, b| (&a.0, a.1.to_string()).cmp(&(&b.0, b.1.to_string())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Named policies for route-level gating.
#[derive(Debug, Default, Clone)]
pub struct PolicyRegistry {
    policies: HashMap<String, Policy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `Default` and `SearchPolicy`.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for policy in [Policy::default_policy(), Policy::search()] {
            registry.policies.insert(policy.name().to_string(), policy);
        }
        registry
    }

    pub fn register(&mut self, policy: Policy) -> Result<(), AuthzError> {
        match self.policies.entry(policy.name().to_string()) {
            Entry::Occupied(entry) => Err(AuthzError::DuplicatePolicy(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(event = "Register", phase = "Policy", policy = policy.name());
                entry.insert(policy);
                Ok(())
            }
        }
    }

    /// Register, replacing any policy with the same name.
    pub fn upsert(&mut self, policy: Policy) {
        self.policies.insert(policy.name().to_string(), policy);
    }

    pub fn resolve(&self, name: &str) -> Result<&Policy, AuthzError> {
        self.policies
            .get(name)
            .ok_or_else(|| AuthzError::PolicyNotFound(name.to_string()))
    }

    /// Fails on the first referenced name that is not registered.
    pub fn validate<I, S>(&self, names: I) -> Result<(), AuthzError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.resolve(name.as_ref())?;
        }
        Ok(())
    }

    /// Policy names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.policies.keys().map(String::as_str).sorted().collect()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
