//! Capability-table method registry
//!
//! Method chains dispatch through an explicit table keyed by the
//! receiver's type tag: `tag -> method name -> parameter kinds ->
//! handler`. Tables are immutable `Arc` snapshots behind an `RwLock`;
//! expose and unexpose swap whole tables, so evaluations running
//! concurrently keep a consistent view and changes take effect for the
//! next dispatch of already-parsed scripts.

pub mod builtin;
pub mod error;

pub use error::{RegistryError, RegistryResult};

use crate::logging::codes;
use crate::value::{TypeTag, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Handler signature: `args[0]` is the receiver
///
/// A handler error is an invocation failure: it is reported to the error
/// channel and the chain degrades to false, it never unwinds evaluation.
pub type MethodHandler = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// One method registration: name, parameter kinds (receiver first), handler
pub struct MethodDef {
    name: String,
    params: Vec<TypeTag>,
    handler: MethodHandler,
}

impl MethodDef {
    pub fn new<F>(name: &str, params: &[TypeTag], handler: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            params: params.to_vec(),
            handler: Arc::new(handler),
        }
    }
}

/// Immutable method table for one type tag
#[derive(Default)]
pub struct TypeMethods {
    methods: HashMap<String, HashMap<Vec<TypeTag>, MethodHandler>>,
}

impl TypeMethods {
    fn from_defs(defs: Vec<MethodDef>) -> Self {
        let mut methods: HashMap<String, HashMap<Vec<TypeTag>, MethodHandler>> = HashMap::new();
        for def in defs {
            methods
                .entry(def.name)
                .or_default()
                .insert(def.params, def.handler);
        }
        Self { methods }
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

/// Why a dispatch lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMiss {
    UnknownType,
    UnknownMethod,
    NoMatchingOverload,
}

/// The registry: one capability table per exposed type tag
pub struct MethodRegistry {
    tables: RwLock<HashMap<TypeTag, Arc<TypeMethods>>>,
    aliases: RwLock<HashMap<String, TypeTag>>,
}

impl MethodRegistry {
    /// Empty registry with the seeded type-name aliases
    pub fn new() -> Self {
        let mut aliases = HashMap::new();
        for (name, tag) in [
            ("string", TypeTag::Str),
            ("str", TypeTag::Str),
            ("text", TypeTag::Str),
            ("int", TypeTag::Int),
            ("integer", TypeTag::Int),
            ("double", TypeTag::Double),
            ("float", TypeTag::Double),
            ("number", TypeTag::Double),
            ("bool", TypeTag::Bool),
            ("boolean", TypeTag::Bool),
        ] {
            aliases.insert(name.to_string(), tag);
        }

        Self {
            tables: RwLock::new(HashMap::new()),
            aliases: RwLock::new(aliases),
        }
    }

    /// Registry with the built-in string method table exposed
    pub fn with_builtin_strings() -> Self {
        let registry = Self::new();
        registry.expose(TypeTag::Str, builtin::string_methods());
        registry
    }

    /// Expose a type's method table
    ///
    /// Idempotent: re-exposing an already-exposed tag returns the existing
    /// table unchanged.
    pub fn expose(&self, tag: TypeTag, defs: Vec<MethodDef>) -> Arc<TypeMethods> {
        let mut tables = write_guard(&self.tables);
        if let Some(existing) = tables.get(&tag) {
            return existing.clone();
        }
        let table = Arc::new(TypeMethods::from_defs(defs));
        tables.insert(tag, table.clone());
        log_success!(
            codes::success::REGISTRY_UPDATED,
            "Type exposed",
            "type" => tag,
            "methods" => table.method_count(),
        );
        table
    }

    /// Remove a type's method table
    ///
    /// Takes effect for subsequent evaluations of already-parsed scripts.
    pub fn unexpose(&self, tag: TypeTag) -> Option<Arc<TypeMethods>> {
        let removed = write_guard(&self.tables).remove(&tag);
        if removed.is_some() {
            log_success!(
                codes::success::REGISTRY_UPDATED,
                "Type unexposed",
                "type" => tag,
            );
        }
        removed
    }

    pub fn is_exposed(&self, tag: TypeTag) -> bool {
        read_guard(&self.tables).contains_key(&tag)
    }

    /// Snapshot of a type's method table
    pub fn methods_for(&self, tag: TypeTag) -> Option<Arc<TypeMethods>> {
        read_guard(&self.tables).get(&tag).cloned()
    }

    /// Resolve a dispatch: receiver tag, method name, argument kinds
    /// (receiver kind first)
    pub fn find(
        &self,
        tag: TypeTag,
        name: &str,
        kinds: &[TypeTag],
    ) -> Result<MethodHandler, DispatchMiss> {
        let table = self.methods_for(tag).ok_or(DispatchMiss::UnknownType)?;
        let overloads = table.methods.get(name).ok_or(DispatchMiss::UnknownMethod)?;
        overloads
            .get(kinds)
            .cloned()
            .ok_or(DispatchMiss::NoMatchingOverload)
    }

    /// Resolve a textual type name through the alias table
    pub fn resolve_type_name(&self, name: &str) -> RegistryResult<TypeTag> {
        read_guard(&self.aliases)
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::unknown_type_name(name))
    }

    /// Register or remove a type-name alias
    ///
    /// `set_type_alias("decimal", "double", true)` lets registration-time
    /// parameter lists spell the kind as `decimal`.
    pub fn set_type_alias(&self, from: &str, to: &str, enabled: bool) -> RegistryResult<()> {
        if enabled {
            let tag = self.resolve_type_name(to)?;
            write_guard(&self.aliases).insert(from.to_string(), tag);
        } else {
            write_guard(&self.aliases).remove(from);
        }
        Ok(())
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::with_builtin_strings()
    }
}

fn read_guard<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_guard<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expose_is_idempotent() {
        let registry = MethodRegistry::new();
        let first = registry.expose(TypeTag::Str, builtin::string_methods());
        let second = registry.expose(TypeTag::Str, Vec::new());
        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.has_method("length"));
    }

    #[test]
    fn test_unexpose_removes_table() {
        let registry = MethodRegistry::with_builtin_strings();
        assert!(registry.is_exposed(TypeTag::Str));

        let removed = registry.unexpose(TypeTag::Str);
        assert!(removed.is_some());
        assert!(!registry.is_exposed(TypeTag::Str));
        assert!(matches!(
            registry.find(TypeTag::Str, "length", &[TypeTag::Str]),
            Err(DispatchMiss::UnknownType)
        ));
    }

    #[test]
    fn test_find_distinguishes_misses() {
        let registry = MethodRegistry::with_builtin_strings();

        assert!(registry
            .find(TypeTag::Str, "length", &[TypeTag::Str])
            .is_ok());
        assert!(matches!(
            registry.find(TypeTag::Str, "no_such", &[TypeTag::Str]),
            Err(DispatchMiss::UnknownMethod)
        ));
        assert!(matches!(
            registry.find(TypeTag::Str, "length", &[TypeTag::Str, TypeTag::Int]),
            Err(DispatchMiss::NoMatchingOverload)
        ));
        assert!(matches!(
            registry.find(TypeTag::Int, "length", &[TypeTag::Int]),
            Err(DispatchMiss::UnknownType)
        ));
    }

    #[test]
    fn test_overload_resolution() {
        let registry = MethodRegistry::with_builtin_strings();

        let one_arg = registry.find(
            TypeTag::Str,
            "substring",
            &[TypeTag::Str, TypeTag::Int],
        );
        let two_arg = registry.find(
            TypeTag::Str,
            "substring",
            &[TypeTag::Str, TypeTag::Int, TypeTag::Int],
        );
        assert!(one_arg.is_ok());
        assert!(two_arg.is_ok());
    }

    #[test]
    fn test_type_aliases() {
        let registry = MethodRegistry::new();
        assert_eq!(registry.resolve_type_name("text"), Ok(TypeTag::Str));
        assert_eq!(registry.resolve_type_name("float"), Ok(TypeTag::Double));

        registry
            .set_type_alias("decimal", "double", true)
            .expect("alias target is known");
        assert_eq!(registry.resolve_type_name("decimal"), Ok(TypeTag::Double));

        registry
            .set_type_alias("decimal", "double", false)
            .expect("removal cannot fail on a known target");
        assert_eq!(
            registry.resolve_type_name("decimal"),
            Err(RegistryError::unknown_type_name("decimal"))
        );
    }
}
