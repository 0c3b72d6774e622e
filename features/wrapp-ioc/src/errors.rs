use std::sync::Arc;

use thiserror::Error;

use crate::{
    dependency_graph::DependencyGraphError,
    types::{DynError, Phase, TypeInfo},
};

/// Errors when filling a dependency slot
#[derive(Error, Debug, Clone)]
pub enum InjectError {
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// Slots are filled exactly once
    #[error("The slot for '{0}' was already filled")]
    AlreadyFilled(&'static str),
}

/// Errors when requiring a component from an initialized manager
#[derive(Error, Debug, Clone)]
pub enum RequireError {
    #[error("The manager has not been initialized")]
    NotInitialized,
    /// The required type is not known
    #[error("The required type '{0}' is not managed.")]
    TypeMissing(&'static str),
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// The namespace could not be resolved at all
#[derive(Error, Debug, Clone)]
pub enum DiscoveryError {
    #[error("'{0}' is not a valid namespace identifier")]
    InvalidNamespace(String),
    #[error("The namespace '{0}' is not known")]
    UnknownNamespace(String),
    /// Custom discovery mechanisms may fail for their own reasons
    #[error("Failed to resolve namespace '{namespace}' - error: {error}")]
    Other {
        namespace: String,
        error: Arc<DynError>,
    },
}

/// Errors while instantiating and injecting components
#[derive(Error, Debug, Clone)]
pub enum WireError {
    #[error("'{duplicate}' resolves to the name '{name}' which is already taken by '{existing}'")]
    DuplicateName {
        name: String,
        existing: TypeInfo,
        duplicate: TypeInfo,
    },
    /// A type can only be managed once per namespace
    #[error("'{component}' is registered as both '{name}' and '{duplicate_name}'")]
    DuplicateType {
        component: TypeInfo,
        name: String,
        duplicate_name: String,
    },
    /// A factory failed to build
    #[error("Factory for '{component}' failed - error: {error}")]
    Construction {
        component: TypeInfo,
        error: Arc<DynError>,
    },
    /// Injection found no registered instance for a slot
    #[error("'{component}' needs '{dependency}' in slot '{slot}' but no instance is registered")]
    UnresolvedDependency {
        component: TypeInfo,
        slot: &'static str,
        dependency: TypeInfo,
    },
    #[error("Failed to inject slot '{slot}' of '{component}': {error}")]
    Injection {
        component: TypeInfo,
        slot: &'static str,
        #[source]
        error: InjectError,
    },
}

/// Errors surfaced by [crate::LifecycleManager] operations
#[derive(Error, Debug, Clone)]
pub enum LifecycleError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// The components can not be ordered
    #[error(transparent)]
    Dependency(#[from] DependencyGraphError<TypeInfo>),
    #[error(transparent)]
    Wire(#[from] WireError),
    /// A hook failed, remaining hooks of the phase were skipped
    #[error("The {phase} hook of '{component}' failed - error: {error}")]
    Hook {
        component: String,
        phase: Phase,
        error: Arc<DynError>,
    },
}
