use std::sync::Arc;

use crate::{
    discovery::{Catalog, Discovery},
    inspect::{DescriptorInspector, Inspector},
    lifecycle::LifecycleManager,
};

/// Order in which stop hooks are invoked
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StopOrder {
    /// Same order as start, dependencies are stopped before their dependents
    #[default]
    Registration,
    /// Dependents are stopped before their dependencies
    Reverse,
}

/// Settings of a [LifecycleManager]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Discovery scope, component names are unique within it
    pub namespace: String,
    pub stop_order: StopOrder,
}

impl ManagerConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        ManagerConfig {
            namespace: namespace.into(),
            stop_order: StopOrder::default(),
        }
    }
}

//////////////////////////////////////////////////////////////////////
///
/// Collects the collaborators of a [LifecycleManager]
///
/// Without an explicit discovery an empty [Catalog] is used, which fails to
/// resolve any namespace. The inspector defaults to [DescriptorInspector].
pub struct LifecycleManagerBuilder {
    config: ManagerConfig,
    discovery: Option<Arc<dyn Discovery>>,
    inspector: Arc<dyn Inspector>,
}

impl LifecycleManagerBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        LifecycleManagerBuilder {
            config: ManagerConfig::new(namespace),
            discovery: None,
            inspector: Arc::new(DescriptorInspector),
        }
    }

    pub fn from_config(config: ManagerConfig) -> Self {
        LifecycleManagerBuilder {
            config,
            discovery: None,
            inspector: Arc::new(DescriptorInspector),
        }
    }

    pub fn discovery<D: Discovery + 'static>(mut self, discovery: D) -> Self {
        self.discovery = Some(Arc::new(discovery));
        self
    }

    pub fn inspector<I: Inspector + 'static>(mut self, inspector: I) -> Self {
        self.inspector = Arc::new(inspector);
        self
    }

    pub fn stop_order(mut self, stop_order: StopOrder) -> Self {
        self.config.stop_order = stop_order;
        self
    }

    pub fn build(self) -> LifecycleManager {
        let discovery = self
            .discovery
            .unwrap_or_else(|| Arc::new(Catalog::default()));

        LifecycleManager::from_parts(self.config, discovery, self.inspector)
    }
}
