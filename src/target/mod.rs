//! Move dialect profiles.
//!
//! A profile captures everything that differs between Move platforms: framework imports, the
//! shape of the state object, how it is created and handed to its owner, and how containers
//! are constructed. Adding a dialect means adding one [`TargetProfile`] implementation and
//! registering it.

pub mod aptos;
pub mod sui;

use crate::error::{Result, TranspileError};
use crate::transpiler::module::{Field, Param};

pub use aptos::AptosTarget;
pub use sui::SuiTarget;

pub trait TargetProfile: Send + Sync {
    /// Registry key, lowercase.
    fn name(&self) -> &'static str;

    /// Imports every generated module starts with.
    fn imports(&self) -> Vec<String>;

    /// Fields the state struct carries before the contract's own state variables.
    fn bookkeeping_fields(&self) -> Vec<Field>;

    /// Parameters of the generated `init` function.
    fn init_params(&self) -> Vec<Param>;

    /// Body lines of `init`, given the state struct name and `field: value` initializers.
    fn init_body(&self, contract_name: &str, field_initializers: &[String]) -> Vec<String>;

    /// Expression creating an empty key/value container.
    fn container_constructor(&self, key_type: &str, value_type: &str) -> String;

    /// Call that hands a freshly created object to its owner.
    fn ownership_transfer(&self) -> &'static str;

    /// Trailing parameter of state-mutating entry functions.
    fn context_param(&self) -> Param;

    /// Expression evaluating to the transaction sender inside an entry function.
    fn sender_expr(&self) -> &'static str;

    fn table_import(&self) -> &'static str;

    fn event_import(&self) -> &'static str;

    fn abort_import(&self) -> Option<&'static str> {
        None
    }

    fn vector_import(&self) -> &'static str {
        "use std::vector;"
    }

    /// Guard statement comparing the sender with the stored owner.
    fn owner_assertion(&self) -> String {
        format!("assert!({} == self.owner, 0);", self.sender_expr())
    }
}

pub struct TargetRegistry {
    profiles: Vec<Box<dyn TargetProfile>>,
}

impl TargetRegistry {
    pub fn empty() -> Self {
        Self {
            profiles: Vec::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(SuiTarget));
        registry.register(Box::new(AptosTarget));
        registry
    }

    /// Register a profile. A later profile with the same name shadows an earlier one.
    pub fn register(&mut self, profile: Box<dyn TargetProfile>) {
        self.profiles.insert(0, profile);
    }

    pub fn resolve(&self, name: &str) -> Result<&dyn TargetProfile> {
        let wanted = name.to_lowercase();
        self.profiles
            .iter()
            .find(|p| p.name() == wanted)
            .map(|p| p.as_ref())
            .ok_or_else(|| TranspileError::UnknownTarget(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.profiles.iter().rev().map(|p| p.name()).collect()
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubTarget;

    impl TargetProfile for StubTarget {
        fn name(&self) -> &'static str {
            "sui"
        }
        fn imports(&self) -> Vec<String> {
            vec!["use stub::object;".to_string()]
        }
        fn bookkeeping_fields(&self) -> Vec<Field> {
            Vec::new()
        }
        fn init_params(&self) -> Vec<Param> {
            Vec::new()
        }
        fn init_body(&self, _contract_name: &str, _fields: &[String]) -> Vec<String> {
            Vec::new()
        }
        fn container_constructor(&self, _key: &str, _value: &str) -> String {
            "stub::new()".to_string()
        }
        fn ownership_transfer(&self) -> &'static str {
            "stub::give"
        }
        fn context_param(&self) -> Param {
            Param::new("ctx", "&mut Stub")
        }
        fn sender_expr(&self) -> &'static str {
            "stub::sender()"
        }
        fn table_import(&self) -> &'static str {
            "use stub::table;"
        }
        fn event_import(&self) -> &'static str {
            "use stub::event;"
        }
    }

    #[test]
    fn test_resolve_builtins_case_insensitive() -> Result<()> {
        let registry = TargetRegistry::with_builtins();
        assert_eq!(registry.resolve("sui")?.name(), "sui");
        assert_eq!(registry.resolve("Aptos")?.name(), "aptos");
        assert_eq!(registry.names(), ["sui", "aptos"]);
        Ok(())
    }

    #[test]
    fn test_unknown_target() {
        let registry = TargetRegistry::with_builtins();
        assert!(matches!(
            registry.resolve("unknown"),
            Err(TranspileError::UnknownTarget(name)) if name == "unknown"
        ));
    }

    #[test]
    fn test_registered_profile_shadows_builtin() -> Result<()> {
        let mut registry = TargetRegistry::with_builtins();
        registry.register(Box::new(StubTarget));
        let profile = registry.resolve("sui")?;
        assert_eq!(profile.ownership_transfer(), "stub::give");
        assert_eq!(
            profile.owner_assertion(),
            "assert!(stub::sender() == self.owner, 0);"
        );
        Ok(())
    }
}
