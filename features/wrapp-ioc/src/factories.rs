use std::{convert::Infallible, marker::PhantomData, sync::Arc};

use crate::types::{AnyComponent, DynError, Injectable, TypeInfo};

/// A Factory providing instances of a given type
///
/// Construction takes no arguments, dependencies are injected into the
/// constructed instance afterwards.
pub trait InstanceFactory: Send + Sync {
    type Provides: Injectable;

    /// Returns the typeinfo about the factory's provided type
    fn supplies() -> TypeInfo {
        TypeInfo::of::<Self::Provides>()
    }

    /// Constructs a new instance of the factory's provided type
    fn construct(&self) -> Result<Self::Provides, impl Into<DynError>>;
}

/// Wrapper Trait for factories, providing instances of Any
pub trait DynFactory: Send + Sync {
    fn supplies(&self) -> TypeInfo;

    fn construct(&self) -> Result<AnyComponent, DynError>;
}
// Impl DynFactory for any InstanceFactory
impl<T: Injectable, SpecificFactory: InstanceFactory<Provides = T>> DynFactory for SpecificFactory {
    fn supplies(&self) -> TypeInfo {
        <SpecificFactory as InstanceFactory>::supplies()
    }

    fn construct(&self) -> Result<AnyComponent, DynError> {
        // Forward the call to the specific implementation
        <SpecificFactory as InstanceFactory>::construct(self)
            .map(|instance| Arc::new(instance) as AnyComponent)
            .map_err(|e| e.into())
    }
}

/// Constructs components through [Default]
pub struct DefaultFactory<T>(PhantomData<fn() -> T>);
impl<T> Default for DefaultFactory<T> {
    fn default() -> Self {
        DefaultFactory(PhantomData)
    }
}
impl<T: Injectable + Default> InstanceFactory for DefaultFactory<T> {
    type Provides = T;

    #[allow(refining_impl_trait)]
    fn construct(&self) -> Result<T, Infallible> {
        Ok(T::default())
    }
}

/// Constructs components through a function, which may fail
pub struct FnFactory<F>(pub F);
impl<T, E, F> InstanceFactory for FnFactory<F>
where
    T: Injectable,
    E: Into<DynError>,
    F: Fn() -> Result<T, E> + Send + Sync,
{
    type Provides = T;

    #[allow(refining_impl_trait)]
    fn construct(&self) -> Result<T, E> {
        (self.0)()
    }
}
