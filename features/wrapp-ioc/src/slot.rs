use std::{
    any::type_name,
    fmt::Debug,
    ops::Deref,
    sync::{Arc, OnceLock},
};

use crate::{
    errors::InjectError,
    types::{Injectable, Instance},
};

/// A dependency slot on a managed component
///
/// Components are constructed with empty slots. Once every component of the namespace exists,
/// the manager fills each declared slot with the peer instance it points to.
///
/// ### Panics
///
/// Dereferencing panics if the slot is accessed before wiring completed, e.g. from
/// within a factory. Use [Depends::try_get] where that can happen.
pub struct Depends<T: Injectable> {
    cell: OnceLock<Arc<T>>,
}

impl<T: Injectable> Default for Depends<T> {
    fn default() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }
}

impl<T: Injectable + Debug> Debug for Depends<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.cell.get() {
            Some(dependency) => f.debug_tuple("Depends").field(dependency).finish(),
            None => f.debug_tuple("Depends").field(&"<unfilled>").finish(),
        }
    }
}

impl<T: Injectable> Deref for Depends<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.get()
    }
}

impl<T: Injectable> Depends<T> {
    /// Accesses the dependency
    ///
    /// # Panics
    /// - When accessed before the component was wired
    pub fn get(&self) -> &Arc<T> {
        self.try_get()
            .expect("Dependency slot accessed before wiring completed")
    }

    pub fn try_get(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }

    pub fn is_filled(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Fills the slot with the given instance
    pub(crate) fn fill(&self, instance: &Instance) -> Result<(), InjectError> {
        let dependency = instance
            .downcast::<T>()
            .map_err(|actual_type| InjectError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })?;

        self.cell
            .set(dependency)
            .map_err(|_| InjectError::AlreadyFilled(type_name::<T>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;

    #[derive(Default, Debug)]
    struct Database {
        url: String,
    }

    #[derive(Default)]
    struct Cache;

    fn instance_of<T: Injectable + Default>(name: &str) -> Instance {
        let descriptor = TypeDescriptor::managed::<T>().build();
        let component = descriptor.construct().unwrap();
        Instance::new(name.to_string(), descriptor, component)
    }

    #[test]
    fn test_fill_then_access() {
        let slot = Depends::<Database>::default();
        assert!(!slot.is_filled());
        assert!(slot.try_get().is_none());

        let database = instance_of::<Database>("db");
        slot.fill(&database).unwrap();

        assert!(slot.is_filled());
        assert_eq!(slot.url, "");
        assert!(Arc::ptr_eq(slot.get(), &database.downcast::<Database>().unwrap()));
    }

    #[test]
    fn test_fill_twice_fails() {
        let slot = Depends::<Database>::default();
        slot.fill(&instance_of::<Database>("db")).unwrap();

        let result = slot.fill(&instance_of::<Database>("other"));
        assert!(matches!(result, Err(InjectError::AlreadyFilled(_))));
    }

    #[test]
    fn test_fill_with_wrong_type_fails() {
        let slot = Depends::<Database>::default();

        let result = slot.fill(&instance_of::<Cache>("cache"));
        assert!(matches!(result, Err(InjectError::DowncastFailed { .. })));
        assert!(!slot.is_filled());
    }

    #[test]
    #[should_panic(expected = "before wiring")]
    fn test_access_before_wiring_panics() {
        let slot = Depends::<Database>::default();
        let _ = &slot.url;
    }
}
