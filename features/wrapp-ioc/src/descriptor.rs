use std::{any::type_name, fmt::Debug, marker::PhantomData, sync::Arc};

use crate::{
    errors::InjectError,
    factories::{DefaultFactory, DynFactory, InstanceFactory},
    slot::Depends,
    types::{AnyComponent, DynError, Injectable, Instance, Phase, TypeInfo},
};

type Injector = dyn Fn(&Instance, &Instance) -> Result<(), InjectError> + Send + Sync;
type HookFn = dyn Fn(&Instance) -> Result<(), DynError> + Send + Sync;

/// A declared dependency of a component
#[derive(Clone)]
pub struct DependencySlot {
    name: &'static str,
    target: TypeInfo,
    injector: Arc<Injector>,
}

impl DependencySlot {
    /// Creates a slot which fills `owner` with a `target` instance through `injector`
    pub fn new(
        name: &'static str,
        target: TypeInfo,
        injector: impl Fn(&Instance, &Instance) -> Result<(), InjectError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            target,
            injector: Arc::new(injector),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type this slot depends on
    pub fn target(&self) -> TypeInfo {
        self.target
    }

    pub fn inject(&self, owner: &Instance, dependency: &Instance) -> Result<(), InjectError> {
        (self.injector)(owner, dependency)
    }
}

impl Debug for DependencySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencySlot")
            .field("name", &self.name)
            .field("target", &self.target.type_name)
            .finish()
    }
}

/// A start or stop hook of a component
#[derive(Clone)]
pub struct Hook(Arc<HookFn>);

impl Hook {
    pub fn new(hook: impl Fn(&Instance) -> Result<(), DynError> + Send + Sync + 'static) -> Self {
        Hook(Arc::new(hook))
    }

    pub fn invoke(&self, instance: &Instance) -> Result<(), DynError> {
        (self.0)(instance)
    }
}

impl Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Hook")
    }
}

/// Everything known about a type which may be managed
///
/// Descriptors carry the metadata a [crate::inspect::Inspector] reports and the factory used for
/// construction. Cloning is cheap, the metadata is shared.
#[derive(Clone)]
pub struct TypeDescriptor(Arc<DescriptorInner>);

struct DescriptorInner {
    info: TypeInfo,
    managed: bool,
    name: Option<String>,
    factory: Box<dyn DynFactory>,
    slots: Vec<DependencySlot>,
    start: Option<Hook>,
    stop: Option<Hook>,
}

impl TypeDescriptor {
    /// Describes a managed component constructed through [Default]
    pub fn managed<T: Injectable + Default>() -> ComponentBuilder<T> {
        ComponentBuilder::new(Box::new(DefaultFactory::<T>::default()), true)
    }

    /// Describes a managed component constructed by `factory`
    pub fn with_factory<F: InstanceFactory + 'static>(factory: F) -> ComponentBuilder<F::Provides> {
        ComponentBuilder::new(Box::new(factory), true)
    }

    /// Describes a type which is discoverable but not managed
    pub fn plain<T: Injectable + Default>() -> ComponentBuilder<T> {
        ComponentBuilder::new(Box::new(DefaultFactory::<T>::default()), false)
    }

    pub fn info(&self) -> TypeInfo {
        self.0.info
    }

    pub fn is_managed(&self) -> bool {
        self.0.managed
    }

    pub fn declared_name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn slots(&self) -> &[DependencySlot] {
        &self.0.slots
    }

    pub fn hook(&self, phase: Phase) -> Option<&Hook> {
        match phase {
            Phase::Start => self.0.start.as_ref(),
            Phase::Stop => self.0.stop.as_ref(),
        }
    }

    /// Constructs a fresh, not yet wired instance
    pub fn construct(&self) -> Result<AnyComponent, DynError> {
        self.0.factory.construct()
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type", &self.0.info.type_name)
            .field("managed", &self.0.managed)
            .field("name", &self.0.name)
            .field("slots", &self.0.slots)
            .field("start", &self.0.start.is_some())
            .field("stop", &self.0.stop.is_some())
            .finish()
    }
}

/// Collects the metadata of a component of type `T`
///
/// ```rust
/// use wrapp_ioc::{Depends, TypeDescriptor};
///
/// #[derive(Default)]
/// struct Database;
///
/// #[derive(Default)]
/// struct Repository {
///     database: Depends<Database>,
/// }
/// impl Repository {
///     fn open(&self) -> Result<(), String> {
///         Ok(())
///     }
/// }
///
/// let database = TypeDescriptor::managed::<Database>().named("db").build();
/// let repository = TypeDescriptor::managed::<Repository>()
///     .depends_on("database", |repository: &Repository| &repository.database)
///     .on_start(Repository::open)
///     .build();
///
/// assert_eq!(repository.slots()[0].target(), database.info());
/// ```
pub struct ComponentBuilder<T> {
    inner: DescriptorInner,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> ComponentBuilder<T> {
    fn new(factory: Box<dyn DynFactory>, managed: bool) -> Self {
        ComponentBuilder {
            inner: DescriptorInner {
                info: TypeInfo::of::<T>(),
                managed,
                name: None,
                factory,
                slots: Vec::new(),
                start: None,
                stop: None,
            },
            _marker: PhantomData,
        }
    }

    /// Registers the component under `name` instead of its type name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.inner.name = Some(name.into());
        self
    }

    /// Declares a dependency on `D`, injected into the slot returned by `accessor`
    pub fn depends_on<D: Injectable>(
        mut self,
        slot: &'static str,
        accessor: fn(&T) -> &Depends<D>,
    ) -> Self {
        let injector = move |owner: &Instance, dependency: &Instance| {
            let component =
                owner
                    .downcast_ref::<T>()
                    .ok_or_else(|| InjectError::DowncastFailed {
                        required_type: type_name::<T>(),
                        actual_type: owner.info().type_name,
                    })?;
            accessor(component).fill(dependency)
        };

        self.inner
            .slots
            .push(DependencySlot::new(slot, TypeInfo::of::<D>(), injector));
        self
    }

    pub fn on_start<E: Into<DynError>>(
        mut self,
        hook: impl Fn(&T) -> Result<(), E> + Send + Sync + 'static,
    ) -> Self {
        self.inner.start = Some(typed_hook(hook));
        self
    }

    pub fn on_stop<E: Into<DynError>>(
        mut self,
        hook: impl Fn(&T) -> Result<(), E> + Send + Sync + 'static,
    ) -> Self {
        self.inner.stop = Some(typed_hook(hook));
        self
    }

    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor(Arc::new(self.inner))
    }
}

impl<T: Injectable> From<ComponentBuilder<T>> for TypeDescriptor {
    fn from(builder: ComponentBuilder<T>) -> Self {
        builder.build()
    }
}

fn typed_hook<T: Injectable, E: Into<DynError>>(
    hook: impl Fn(&T) -> Result<(), E> + Send + Sync + 'static,
) -> Hook {
    Hook::new(move |instance: &Instance| {
        let component = instance.downcast_ref::<T>().ok_or_else(|| -> DynError {
            format!(
                "Hook for '{}' called on '{}'",
                type_name::<T>(),
                instance.info().type_name
            )
            .into()
        })?;
        hook(component).map_err(Into::into)
    })
}
