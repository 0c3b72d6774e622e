use std::{
    any::{Any, TypeId},
    fmt::{self, Debug, Display},
    sync::Arc,
};

use crate::descriptor::TypeDescriptor;

/// Boxed error type used by factories and hooks
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Type erased component as produced by a factory
pub type AnyComponent = Arc<dyn Any + Send + Sync>;

/// A manager may be driven from any thread, so anything it manages
/// needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// The two phases in which hooks are invoked
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Phase {
    Start,
    Stop,
}
impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Start => f.write_str("start"),
            Phase::Stop => f.write_str("stop"),
        }
    }
}

/// A live component, registered under its resolved name
///
/// Cloning only clones the handle, the component itself is never duplicated.
#[derive(Clone)]
pub struct Instance {
    name: Arc<str>,
    descriptor: TypeDescriptor,
    component: AnyComponent,
}

impl Instance {
    pub(crate) fn new(name: String, descriptor: TypeDescriptor, component: AnyComponent) -> Self {
        Instance {
            name: name.into(),
            descriptor,
            component,
        }
    }

    /// The name this instance is registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> TypeInfo {
        self.descriptor.info()
    }

    /// The descriptor this instance was constructed from
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.component.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info().type_name),
        }
    }

    pub fn downcast_ref<T: Injectable>(&self) -> Option<&T> {
        self.component.downcast_ref::<T>()
    }

    /// Returns true if both handles point to the same component
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.component, &other.component)
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("type", &self.info().type_name)
            .finish()
    }
}
