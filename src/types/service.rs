//! Pluggable services selected by name.
//!
//! A [`ServiceRegistry`] maps names to constructors. A service field
//! resolves a name to its [`ServiceFactory`]; the application creates the
//! service later with whatever parameter it needs.

use std::fmt;
use std::sync::Arc;

use super::FieldType;
use crate::error::Rejection;

/// A named constructor of services of type `S` taking a parameter `P`.
///
/// Two factories are equal if they have the same name.
pub struct ServiceFactory<S, P> {
    name: String,
    constructor: Arc<dyn Fn(P) -> S + Send + Sync>,
}

impl<S, P> ServiceFactory<S, P> {
    /// Create a factory.
    pub fn new<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(P) -> S + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            constructor: Arc::new(constructor),
        }
    }

    /// The registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construct a service.
    pub fn create(&self, parameter: P) -> S {
        (self.constructor)(parameter)
    }
}

impl<S, P> Clone for ServiceFactory<S, P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            constructor: Arc::clone(&self.constructor),
        }
    }
}

impl<S, P> PartialEq for ServiceFactory<S, P> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<S, P> fmt::Debug for ServiceFactory<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceFactory")
            .field("name", &self.name)
            .finish()
    }
}

/// Named service constructors, in registration order.
pub struct ServiceRegistry<S, P> {
    factories: Vec<ServiceFactory<S, P>>,
}

impl<S, P> ServiceRegistry<S, P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Register a constructor under `name`. A later registration with the
    /// same name replaces the earlier one.
    pub fn with<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(P) -> S + Send + Sync + 'static,
    {
        let factory = ServiceFactory::new(name, constructor);
        self.factories.retain(|f| f.name != factory.name);
        self.factories.push(factory);
        self
    }

    /// Look up a factory by name.
    pub fn get(&self, name: &str) -> Option<&ServiceFactory<S, P>> {
        self.factories.iter().find(|f| f.name == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.name.as_str()).collect()
    }
}

impl<S, P> Default for ServiceRegistry<S, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P> Clone for ServiceRegistry<S, P> {
    fn clone(&self) -> Self {
        Self {
            factories: self.factories.clone(),
        }
    }
}

/// Field type resolving a name against a [`ServiceRegistry`].
pub struct ServiceType<'r, S, P> {
    services: &'r ServiceRegistry<S, P>,
}

impl<'r, S, P> ServiceType<'r, S, P> {
    /// Create the field type.
    pub fn new(services: &'r ServiceRegistry<S, P>) -> Self {
        Self { services }
    }
}

impl<S, P> FieldType for ServiceType<'_, S, P>
where
    S: 'static,
    P: 'static,
{
    type Value = ServiceFactory<S, P>;

    fn type_name(&self) -> &'static str {
        "service"
    }

    fn parse(&self, raw: &str) -> Result<ServiceFactory<S, P>, Rejection> {
        self.services.get(raw).cloned().ok_or_else(|| {
            Rejection::new(format!(
                "must name one of the services [{}], but was '{}'",
                self.services.names().join(", "),
                raw
            ))
        })
    }

    fn render(&self, value: &ServiceFactory<S, P>) -> String {
        value.name().to_string()
    }
}
