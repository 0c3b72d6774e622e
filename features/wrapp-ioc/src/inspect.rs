use crate::{
    descriptor::{DependencySlot, Hook, TypeDescriptor},
    types::{Instance, Phase},
};

/// Reports the management metadata of discovered types
///
/// The manager never looks at a type directly, all it knows about a component
/// is what an Inspector reports for it.
pub trait Inspector: Send + Sync {
    /// Whether the type carries the managed marker
    fn is_managed(&self, ty: &TypeDescriptor) -> bool;

    /// The custom name of the component, if any
    fn declared_name(&self, ty: &TypeDescriptor) -> Option<String>;

    /// Declared dependency slots, in declaration order
    fn dependency_slots(&self, ty: &TypeDescriptor) -> Vec<DependencySlot>;

    /// The hook to invoke on `instance` for `phase`
    fn hook_for(&self, instance: &Instance, phase: Phase) -> Option<Hook>;

    /// The name a component is registered under: its custom name, or its type name
    fn resolved_name(&self, ty: &TypeDescriptor) -> String {
        self.declared_name(ty)
            .unwrap_or_else(|| ty.info().type_name.to_string())
    }
}

/// Reports the metadata registered on each [TypeDescriptor]
#[derive(Debug, Default, Clone, Copy)]
pub struct DescriptorInspector;

impl Inspector for DescriptorInspector {
    fn is_managed(&self, ty: &TypeDescriptor) -> bool {
        ty.is_managed()
    }

    fn declared_name(&self, ty: &TypeDescriptor) -> Option<String> {
        ty.declared_name().map(str::to_string)
    }

    fn dependency_slots(&self, ty: &TypeDescriptor) -> Vec<DependencySlot> {
        ty.slots().to_vec()
    }

    fn hook_for(&self, instance: &Instance, phase: Phase) -> Option<Hook> {
        instance.descriptor().hook(phase).cloned()
    }
}
