use std::{
    any::TypeId,
    collections::{hash_map::Entry, HashMap},
    fmt::Debug,
    sync::Arc,
};

use crate::{
    descriptor::TypeDescriptor,
    errors::WireError,
    inspect::Inspector,
    types::Instance,
};

/// Holds all wired components of a namespace, by name
///
/// Components are kept in registration order, which is the order they were wired in.
#[derive(Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Instance>,
    names: HashMap<TypeId, String>,
    order: Vec<Instance>,
}

impl Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.order.iter().map(Instance::name))
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates every descriptor, then injects their dependencies
    ///
    /// All instances must exist before any can be injected, so this runs in two passes.
    /// Descriptors are expected in dependency order.
    /// Returns the wired instances in registration order.
    pub fn wire(
        &mut self,
        ordered: &[TypeDescriptor],
        inspector: &dyn Inspector,
    ) -> Result<Vec<Instance>, WireError> {
        tracing::debug!("Wiring {} components", ordered.len());

        let mut constructed = Vec::with_capacity(ordered.len());
        for descriptor in ordered {
            constructed.push(self.instantiate(descriptor, inspector)?);
        }

        for owner in &constructed {
            self.inject(owner, inspector)?;
        }

        Ok(self.order.clone())
    }

    /// Looks up a component by its registered name
    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.components.get(name)
    }

    /// Looks up a component by its type
    pub fn get_by_type(&self, type_id: TypeId) -> Option<&Instance> {
        self.names.get(&type_id).and_then(|name| self.get(name))
    }

    /// All components in registration order
    pub fn instances(&self) -> &[Instance] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn instantiate(
        &mut self,
        descriptor: &TypeDescriptor,
        inspector: &dyn Inspector,
    ) -> Result<Instance, WireError> {
        let info = descriptor.info();
        let component = descriptor
            .construct()
            .map_err(|error| WireError::Construction {
                component: info,
                error: Arc::new(error),
            })?;

        let name = inspector.resolved_name(descriptor);
        let instance = Instance::new(name.clone(), descriptor.clone(), component);
        match self.components.entry(name) {
            Entry::Occupied(existing) => {
                tracing::error!(
                    "'{}' and '{info}' both resolve to the name '{}'",
                    existing.get().info(),
                    existing.key()
                );
                return Err(WireError::DuplicateName {
                    name: existing.key().clone(),
                    existing: existing.get().info(),
                    duplicate: info,
                });
            }
            Entry::Vacant(vacant) => {
                if let Some(registered) = self.names.get(&info.type_id) {
                    return Err(WireError::DuplicateType {
                        component: info,
                        name: registered.clone(),
                        duplicate_name: vacant.into_key(),
                    });
                }
                tracing::debug!("Constructed '{}' as '{}'", info, vacant.key());
                self.names.insert(info.type_id, vacant.key().clone());
                vacant.insert(instance.clone());
            }
        }

        self.order.push(instance.clone());
        Ok(instance)
    }

    fn inject(&self, owner: &Instance, inspector: &dyn Inspector) -> Result<(), WireError> {
        let info = owner.info();
        for slot in inspector.dependency_slots(owner.descriptor()) {
            let dependency = self.get_by_type(slot.target().type_id).ok_or_else(|| {
                WireError::UnresolvedDependency {
                    component: info,
                    slot: slot.name(),
                    dependency: slot.target(),
                }
            })?;

            slot.inject(owner, dependency)
                .map_err(|error| WireError::Injection {
                    component: info,
                    slot: slot.name(),
                    error,
                })?;

            tracing::debug!(
                "Injected '{}' into slot '{}' of '{}'",
                dependency.name(),
                slot.name(),
                owner.name()
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        descriptor::{DependencySlot, Hook},
        factories::FnFactory,
        inspect::DescriptorInspector,
        slot::Depends,
        types::{Phase, TypeInfo},
    };

    /// Hands out a new name on every lookup
    #[derive(Default)]
    struct RenamingInspector(AtomicUsize);

    impl Inspector for RenamingInspector {
        fn is_managed(&self, ty: &TypeDescriptor) -> bool {
            DescriptorInspector.is_managed(ty)
        }

        fn declared_name(&self, ty: &TypeDescriptor) -> Option<String> {
            let generation = self.0.fetch_add(1, Ordering::SeqCst);
            Some(format!("{}#{generation}", ty.info().type_name))
        }

        fn dependency_slots(&self, ty: &TypeDescriptor) -> Vec<DependencySlot> {
            DescriptorInspector.dependency_slots(ty)
        }

        fn hook_for(&self, instance: &Instance, phase: Phase) -> Option<Hook> {
            DescriptorInspector.hook_for(instance, phase)
        }
    }

    #[derive(Default)]
    struct Disk;

    #[derive(Default)]
    struct Index {
        disk: Depends<Disk>,
    }

    #[derive(Default)]
    struct Search {
        index: Depends<Index>,
        disk: Depends<Disk>,
    }

    fn descriptors() -> Vec<TypeDescriptor> {
        vec![
            TypeDescriptor::managed::<Disk>().named("disk").build(),
            TypeDescriptor::managed::<Index>()
                .depends_on("disk", |index: &Index| &index.disk)
                .build(),
            TypeDescriptor::managed::<Search>()
                .named("search")
                .depends_on("index", |search: &Search| &search.index)
                .depends_on("disk", |search: &Search| &search.disk)
                .build(),
        ]
    }

    #[test]
    fn test_every_slot_holds_its_peer() {
        let mut registry = ComponentRegistry::new();
        let wired = registry.wire(&descriptors(), &DescriptorInspector).unwrap();

        assert_eq!(wired.len(), 3);
        let names: Vec<&str> = wired.iter().map(Instance::name).collect();
        assert_eq!(names, vec!["disk", std::any::type_name::<Index>(), "search"]);

        let disk = registry.get("disk").unwrap().downcast::<Disk>().unwrap();
        let index = registry
            .get_by_type(TypeId::of::<Index>())
            .unwrap()
            .downcast::<Index>()
            .unwrap();
        let search = registry.get("search").unwrap().downcast::<Search>().unwrap();

        assert!(Arc::ptr_eq(index.disk.get(), &disk));
        assert!(Arc::ptr_eq(search.index.get(), &index));
        assert!(Arc::ptr_eq(search.disk.get(), &disk));
    }

    #[test]
    fn test_duplicate_name() {
        let descriptors = vec![
            TypeDescriptor::managed::<Disk>().named("X").build(),
            TypeDescriptor::managed::<Index>().named("X").build(),
        ];

        let result = ComponentRegistry::new().wire(&descriptors, &DescriptorInspector);
        match result {
            Err(WireError::DuplicateName {
                name,
                existing,
                duplicate,
            }) => {
                assert_eq!(name, "X");
                assert_eq!(existing, TypeInfo::of::<Disk>());
                assert_eq!(duplicate, TypeInfo::of::<Index>());
            }
            other => panic!("expected a duplicate name, got {other:?}"),
        }
    }

    #[test]
    fn test_same_type_under_two_names() {
        let descriptors = vec![
            TypeDescriptor::managed::<Disk>().named("disk").build(),
            TypeDescriptor::managed::<Disk>().named("backup").build(),
        ];

        let mut registry = ComponentRegistry::new();
        let result = registry.wire(&descriptors, &DescriptorInspector);
        match result {
            Err(WireError::DuplicateType {
                component,
                name,
                duplicate_name,
            }) => {
                assert_eq!(component, TypeInfo::of::<Disk>());
                assert_eq!(name, "disk");
                assert_eq!(duplicate_name, "backup");
            }
            other => panic!("expected a duplicate type, got {other:?}"),
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_construction_failure_aborts() {
        let descriptors = vec![
            TypeDescriptor::managed::<Disk>().build(),
            TypeDescriptor::with_factory(FnFactory(|| Err::<Index, _>("index corrupted"))).build(),
        ];

        let result = ComponentRegistry::new().wire(&descriptors, &DescriptorInspector);
        assert!(matches!(
            result,
            Err(WireError::Construction { component, .. }) if component == TypeInfo::of::<Index>()
        ));
    }

    #[test]
    fn test_dependency_outside_of_wired_set() {
        // Index without Disk
        let descriptors = vec![descriptors().remove(1)];

        let result = ComponentRegistry::new().wire(&descriptors, &DescriptorInspector);
        assert!(matches!(
            result,
            Err(WireError::UnresolvedDependency { slot: "disk", dependency, .. })
                if dependency == TypeInfo::of::<Disk>()
        ));
    }

    #[test]
    fn test_wiring_twice_into_one_registry_is_rejected() {
        let mut registry = ComponentRegistry::new();
        registry.wire(&descriptors(), &DescriptorInspector).unwrap();

        let result = registry.wire(&descriptors(), &DescriptorInspector);
        assert!(matches!(result, Err(WireError::DuplicateName { .. })));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_injection_targets_the_constructed_instances() {
        let mut registry = ComponentRegistry::new();
        let wired = registry
            .wire(&descriptors(), &RenamingInspector::default())
            .unwrap();

        // Names are only resolved once, while constructing
        assert_eq!(wired.len(), 3);
        assert!(registry.get("search").is_none());
        assert!(wired[0].ptr_eq(registry.get(wired[0].name()).unwrap()));
        assert!(!wired[0].ptr_eq(&wired[1]));

        let disk = wired[0].downcast::<Disk>().unwrap();
        let index = wired[1].downcast::<Index>().unwrap();
        let search = wired[2].downcast::<Search>().unwrap();
        assert!(Arc::ptr_eq(index.disk.get(), &disk));
        assert!(Arc::ptr_eq(search.index.get(), &index));
        assert!(Arc::ptr_eq(search.disk.get(), &disk));
    }
}
