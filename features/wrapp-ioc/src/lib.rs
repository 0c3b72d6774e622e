//! Wrapp IoC manages the lifecycle of the components within a namespace.
//!
//! Components declare the peers they depend on. The manager orders them so that every
//! component comes after its dependencies, constructs them, fills their dependency slots
//! and finally drives them through a start and a stop phase.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! use wrapp_ioc::{Catalog, Depends, LifecycleManager, LifecycleState, TypeDescriptor};
//!
//! #[derive(Default)]
//! struct Database {
//!     connected: AtomicBool,
//! }
//! impl Database {
//!     fn connect(&self) -> Result<(), String> {
//!         self.connected.store(true, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Default)]
//! struct UserService {
//!     database: Depends<Database>,
//! }
//! impl UserService {
//!     fn start(&self) -> Result<(), String> {
//!         // Dependencies are started first
//!         assert!(self.database.connected.load(Ordering::SeqCst));
//!         Ok(())
//!     }
//! }
//!
//! let catalog = Catalog::new()
//!     .register(
//!         "app",
//!         TypeDescriptor::managed::<UserService>()
//!             .depends_on("database", |service: &UserService| &service.database)
//!             .on_start(UserService::start),
//!     )
//!     .register(
//!         "app",
//!         TypeDescriptor::managed::<Database>()
//!             .named("database")
//!             .on_start(Database::connect),
//!     );
//!
//! let manager = LifecycleManager::new("app", catalog);
//! manager.initialize().unwrap();
//! manager.start().unwrap();
//! assert_eq!(manager.state(), LifecycleState::Started);
//!
//! let service = manager.require::<UserService>().unwrap();
//! assert!(service.database.connected.load(Ordering::SeqCst));
//!
//! manager.stop().unwrap();
//! ```
//!
//! Wrapp IoC consists of the following components:
//!
//! 1. Descriptor - describing a component: its factory, dependency slots and hooks
//! 2. Discovery & Inspector - finding the candidates of a namespace and reading their metadata
//! 3. Dependency Graph & Topological - ordering components by their dependencies
//! 4. Registry - constructing components and injecting their dependencies
//! 5. Lifecycle - the manager driving initialize, start and stop

pub mod builder;
pub mod dependency_graph;
pub mod descriptor;
pub mod discovery;
pub mod errors;
pub mod factories;
pub mod inspect;
pub mod lifecycle;
pub mod registry;
pub mod slot;
pub mod topological;
pub mod types;

pub use builder::{LifecycleManagerBuilder, ManagerConfig, StopOrder};
pub use dependency_graph::{DependencyGraph, DependencyGraphError};
pub use descriptor::{ComponentBuilder, DependencySlot, Hook, TypeDescriptor};
pub use discovery::{Catalog, Discovery};
pub use errors::{DiscoveryError, InjectError, LifecycleError, RequireError, WireError};
pub use factories::{DefaultFactory, DynFactory, FnFactory, InstanceFactory};
pub use inspect::{DescriptorInspector, Inspector};
pub use lifecycle::{LifecycleManager, LifecycleState};
pub use registry::ComponentRegistry;
pub use slot::Depends;
pub use types::{DynError, Injectable, Instance, Phase, TypeInfo};
