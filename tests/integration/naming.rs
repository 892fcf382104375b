//! Property tests for module name derivation and collision handling.

use std::path::PathBuf;

use proptest::prelude::*;

use camrig::loader::module::{LoadedModule, ModuleOrigin};
use camrig::loader::registry::ModuleRegistry;
use camrig::loader::{classify_source, resolve_name};

proptest! {
    #[test]
    fn resolved_names_are_never_already_registered(
        base in "[a-z][a-z0-9]{0,8}",
        taken in prop::collection::hash_set(1usize..6, 0..5),
    ) {
        let mut registry = ModuleRegistry::new();
        registry.insert(LoadedModule::new(base.clone(), ModuleOrigin::Host));
        for i in &taken {
            registry.insert(LoadedModule::new(format!("{base}_{i}"), ModuleOrigin::Host));
        }

        let resolved = resolve_name(&registry, &base);
        prop_assert!(!registry.contains(&resolved));
        prop_assert!(resolved.starts_with(&base));
    }

    #[test]
    fn repeated_collisions_count_upward(base in "[a-z]{1,6}", n in 1usize..8) {
        let mut registry = ModuleRegistry::new();
        let mut names = Vec::new();
        for _ in 0..n {
            let name = resolve_name(&registry, &base);
            registry.insert(LoadedModule::new(name.clone(), ModuleOrigin::Host));
            names.push(name);
        }

        prop_assert_eq!(&names[0], &base);
        for (i, name) in names.iter().enumerate().skip(1) {
            prop_assert_eq!(name, &format!("{base}_{i}"));
        }
    }

    #[test]
    fn file_stems_survive_classification(stem in "[a-zA-Z][a-zA-Z0-9_]{0,12}") {
        let path = PathBuf::from(format!("/captures/{stem}.rig"));
        let shape = classify_source(&path).unwrap();
        prop_assert_eq!(shape.module_name, stem);
    }

    #[test]
    fn other_extensions_never_classify(
        name in "[a-zA-Z][a-zA-Z0-9_]{0,12}",
        ext in "(txt|py|rs|json|toml)",
    ) {
        let path = PathBuf::from(format!("/captures/{name}.{ext}"));
        prop_assert!(classify_source(&path).is_none());
    }
}
