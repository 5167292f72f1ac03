//! Type-keyed service registry.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use cube_core::error::AppError;
use cube_core::result::AppResult;

/// Maps a service type to a shared instance.
///
/// Services are keyed by the type they are requested as, which may be a
/// trait object (`registry.get_service::<dyn Foo>()`). The registry is built
/// once at startup and then shared read-only.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.services.len())
            .finish()
    }
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `service` as `T`, replacing any existing binding.
    pub fn register<T>(&mut self, service: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        debug!(service = type_name::<T>(), "Registered service");
        self.services.insert(TypeId::of::<T>(), Box::new(service));
        self
    }

    /// Binds `service` as `T` unless `T` is already bound.
    ///
    /// Returns whether the binding was installed.
    pub fn register_default<T>(&mut self, service: Arc<T>) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        if self.contains::<T>() {
            return false;
        }
        self.register(service);
        true
    }

    /// Resolves a service by type.
    pub fn get_service<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<Arc<T>>())
            .cloned()
    }

    /// Resolves a service that must have been registered.
    pub fn require<T>(&self) -> AppResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_service::<T>().ok_or_else(|| {
            AppError::configuration(format!("Service '{}' is not registered", type_name::<T>()))
        })
    }

    pub fn contains<T>(&self) -> bool
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_core::error::ErrorKind;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;
    struct French;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    impl Greeter for French {
        fn greet(&self) -> String {
            "bonjour".into()
        }
    }

    #[test]
    fn test_trait_object_binding() {
        let mut registry = ServiceRegistry::new();
        registry.register::<dyn Greeter>(Arc::new(English));

        let greeter = registry.get_service::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet(), "hello");
    }

    #[test]
    fn test_register_default_keeps_existing() {
        let mut registry = ServiceRegistry::new();
        assert!(registry.register_default::<dyn Greeter>(Arc::new(English)));
        assert!(!registry.register_default::<dyn Greeter>(Arc::new(French)));
        assert_eq!(registry.require::<dyn Greeter>().unwrap().greet(), "hello");

        registry.register::<dyn Greeter>(Arc::new(French));
        assert_eq!(registry.require::<dyn Greeter>().unwrap().greet(), "bonjour");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_service() {
        let registry = ServiceRegistry::new();
        assert!(registry.get_service::<String>().is_none());
        let err = registry.require::<String>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
        assert!(!registry.contains::<u32>());
    }

    #[test]
    fn test_concrete_and_trait_bindings_are_distinct() {
        let mut registry = ServiceRegistry::new();
        registry.register(Arc::new(English));
        assert!(registry.contains::<English>());
        assert!(!registry.contains::<dyn Greeter>());
    }
}
