use std::collections::HashMap;

use crate::{descriptor::TypeDescriptor, errors::DiscoveryError};

/// Finds the candidate types of a namespace
///
/// Candidates may include types which are not managed, the manager filters them.
/// A namespace without candidates yields an empty list, an error is reserved for
/// namespaces which can not be resolved at all.
pub trait Discovery: Send + Sync {
    fn discover(&self, namespace: &str) -> Result<Vec<TypeDescriptor>, DiscoveryError>;
}

/// A list of descriptors per namespace, filled through explicit registration
///
/// # Example
/// ```rust
/// use wrapp_ioc::{Catalog, Discovery, TypeDescriptor};
///
/// #[derive(Default)]
/// struct Mailer;
///
/// let catalog = Catalog::new()
///     .namespace("app.empty")
///     .register("app.mail", TypeDescriptor::managed::<Mailer>());
///
/// assert!(catalog.discover("app.empty").unwrap().is_empty());
/// assert_eq!(catalog.discover("app.mail").unwrap().len(), 1);
/// assert!(catalog.discover("app.unknown").is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    namespaces: HashMap<String, Vec<TypeDescriptor>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a namespace, without adding candidates
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.entry(namespace.into()).or_default();
        self
    }

    /// Adds a candidate to a namespace, declaring the namespace if needed
    pub fn register(
        mut self,
        namespace: impl Into<String>,
        descriptor: impl Into<TypeDescriptor>,
    ) -> Self {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .push(descriptor.into());
        self
    }
}

impl Discovery for Catalog {
    fn discover(&self, namespace: &str) -> Result<Vec<TypeDescriptor>, DiscoveryError> {
        if !is_valid_namespace(namespace) {
            return Err(DiscoveryError::InvalidNamespace(namespace.to_string()));
        }

        let candidates = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| DiscoveryError::UnknownNamespace(namespace.to_string()))?;

        tracing::debug!(
            "Discovered {} candidates in namespace '{namespace}'",
            candidates.len()
        );
        Ok(candidates.clone())
    }
}

/// Dot separated segments of ascii alphanumerics, `_` or `-`
fn is_valid_namespace(namespace: &str) -> bool {
    namespace.split('.').all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    })
}
