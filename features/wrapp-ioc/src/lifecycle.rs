use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    builder::{LifecycleManagerBuilder, ManagerConfig, StopOrder},
    descriptor::TypeDescriptor,
    discovery::Discovery,
    errors::{LifecycleError, RequireError, WireError},
    inspect::Inspector,
    registry::ComponentRegistry,
    topological,
    types::{Injectable, Instance, Phase, TypeInfo},
};

/// Where a [LifecycleManager] is in its lifecycle
///
/// Transitions only move forward: `Uninitialized -> Initialized -> Started -> Stopped`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initialized,
    Started,
    Stopped,
}

/// Manages the lifecycle of all components within a single namespace
///
/// 1. `initialize` discovers the managed components, orders them by their dependencies,
///    constructs them and injects their dependencies
/// 2. `start` invokes the start hook of every component, in dependency order
/// 3. `stop` invokes the stop hook of every component
///
/// Each step only runs once, repeated or out of order calls do nothing.
/// All operations are serialized, hooks must not call back into their manager.
pub struct LifecycleManager {
    config: ManagerConfig,
    discovery: Arc<dyn Discovery>,
    inspector: Arc<dyn Inspector>,
    inner: Mutex<ManagerInner>,
}

#[derive(Default)]
struct ManagerInner {
    state: LifecycleState,
    registry: Option<ComponentRegistry>,
}

impl Debug for LifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("LifecycleManager")
            .field("namespace", &self.config.namespace)
            .field("state", &inner.state)
            .field("components", &inner.registry)
            .finish()
    }
}

impl LifecycleManager {
    /// Creates a manager for `namespace`, discovering components through `discovery`
    pub fn new<D: Discovery + 'static>(namespace: impl Into<String>, discovery: D) -> Self {
        Self::builder(namespace).discovery(discovery).build()
    }

    pub fn builder(namespace: impl Into<String>) -> LifecycleManagerBuilder {
        LifecycleManagerBuilder::new(namespace)
    }

    pub(crate) fn from_parts(
        config: ManagerConfig,
        discovery: Arc<dyn Discovery>,
        inspector: Arc<dyn Inspector>,
    ) -> Self {
        LifecycleManager {
            config,
            discovery,
            inspector,
            inner: Mutex::new(ManagerInner::default()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.lock().state
    }

    /// Discovers, orders, constructs and wires all managed components
    ///
    /// Only the first successful call has an effect. On failure nothing is kept,
    /// the manager stays uninitialized.
    pub fn initialize(&self) -> Result<(), LifecycleError> {
        let mut inner = self.lock();
        if inner.state != LifecycleState::Uninitialized {
            tracing::debug!(
                "Namespace '{}' is already initialized",
                self.config.namespace
            );
            return Ok(());
        }

        let registry = self.assemble().inspect_err(|e| {
            tracing::error!(
                "Failed to initialize namespace '{}': {e}",
                self.config.namespace
            )
        })?;

        tracing::info!(
            "Initialized {} components in namespace '{}'",
            registry.len(),
            self.config.namespace
        );
        inner.registry = Some(registry);
        inner.state = LifecycleState::Initialized;
        Ok(())
    }

    /// Invokes the start hook of every component, dependencies first
    ///
    /// Does nothing unless the manager is initialized and not yet started.
    /// The first failing hook aborts the remaining ones, hooks which already ran are not undone.
    pub fn start(&self) -> Result<(), LifecycleError> {
        let mut inner = self.lock();
        if inner.state != LifecycleState::Initialized {
            tracing::warn!(
                "Ignoring start of namespace '{}' in state {:?}",
                self.config.namespace,
                inner.state
            );
            return Ok(());
        }

        inner.state = LifecycleState::Started;
        let components: Vec<&Instance> = match &inner.registry {
            Some(registry) => registry.instances().iter().collect(),
            None => Vec::new(),
        };

        self.run_phase(Phase::Start, &components)?;
        tracing::info!("Started namespace '{}'", self.config.namespace);
        Ok(())
    }

    /// Invokes the stop hook of every component, in the configured [StopOrder]
    ///
    /// Does nothing unless the manager was started. Failures behave as in [LifecycleManager::start].
    pub fn stop(&self) -> Result<(), LifecycleError> {
        let mut inner = self.lock();
        if inner.state != LifecycleState::Started {
            tracing::warn!(
                "Ignoring stop of namespace '{}' in state {:?}",
                self.config.namespace,
                inner.state
            );
            return Ok(());
        }

        inner.state = LifecycleState::Stopped;
        let mut components: Vec<&Instance> = match &inner.registry {
            Some(registry) => registry.instances().iter().collect(),
            None => Vec::new(),
        };
        if self.config.stop_order == StopOrder::Reverse {
            components.reverse();
        }

        self.run_phase(Phase::Stop, &components)?;
        tracing::info!("Stopped namespace '{}'", self.config.namespace);
        Ok(())
    }

    /// Attempts to get the managed component of type `T`
    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        let inner = self.lock();
        let registry = inner
            .registry
            .as_ref()
            .ok_or(RequireError::NotInitialized)?;

        registry
            .get_by_type(TypeId::of::<T>())
            .ok_or(RequireError::TypeMissing(type_name::<T>()))?
            .downcast()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    /// The component registered under `name`
    pub fn component(&self, name: &str) -> Option<Instance> {
        let inner = self.lock();
        inner.registry.as_ref()?.get(name).cloned()
    }

    /// Names of all components, in registration order
    pub fn component_names(&self) -> Vec<String> {
        let inner = self.lock();
        inner
            .registry
            .iter()
            .flat_map(|registry| registry.instances())
            .map(|instance| instance.name().to_string())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, ManagerInner> {
        // A panicking hook poisons the lock, the state it leaves behind is still valid
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs discovery, sorting and wiring into a fresh registry
    fn assemble(&self) -> Result<ComponentRegistry, LifecycleError> {
        let namespace = &self.config.namespace;
        let candidates = self.discovery.discover(namespace)?;
        let candidate_count = candidates.len();

        let mut descriptors: HashMap<TypeId, TypeDescriptor> = HashMap::new();
        let mut mapping: Vec<(TypeInfo, Vec<TypeInfo>)> = Vec::new();
        for descriptor in candidates {
            if !self.inspector.is_managed(&descriptor) {
                tracing::debug!("Skipping unmanaged type '{}'", descriptor.info());
                continue;
            }

            let info = descriptor.info();
            if let Some(existing) = descriptors.get(&info.type_id) {
                return Err(WireError::DuplicateType {
                    component: info,
                    name: self.inspector.resolved_name(existing),
                    duplicate_name: self.inspector.resolved_name(&descriptor),
                }
                .into());
            }

            let dependencies = self
                .inspector
                .dependency_slots(&descriptor)
                .iter()
                .map(|slot| slot.target())
                .collect();
            mapping.push((info, dependencies));
            descriptors.insert(info.type_id, descriptor);
        }

        tracing::debug!(
            "Found {} managed of {candidate_count} candidates in namespace '{namespace}'",
            mapping.len()
        );

        let ordered: Vec<TypeDescriptor> = topological::sort(mapping)?
            .into_iter()
            .filter_map(|info| descriptors.remove(&info.type_id))
            .collect();

        let mut registry = ComponentRegistry::new();
        registry.wire(&ordered, self.inspector.as_ref())?;
        Ok(registry)
    }

    fn run_phase(&self, phase: Phase, components: &[&Instance]) -> Result<(), LifecycleError> {
        for instance in components {
            let Some(hook) = self.inspector.hook_for(instance, phase) else {
                continue;
            };

            tracing::debug!("Invoking {phase} hook of '{}'", instance.name());
            hook.invoke(instance).map_err(|error| {
                tracing::error!(
                    "The {phase} hook of '{}' failed, skipping the remaining hooks: {error}",
                    instance.name()
                );
                LifecycleError::Hook {
                    component: instance.name().to_string(),
                    phase,
                    error: Arc::new(error),
                }
            })?;
        }

        Ok(())
    }
}
