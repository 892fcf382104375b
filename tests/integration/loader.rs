//! Loader integration tests
//!
//! Exercises loading, reloading and unloading of rig sources on a real
//! filesystem, through the stock script engine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use camrig::loader::engine::SourceEngine;
use camrig::loader::error::LoadError;
use camrig::loader::module::{ModuleHandle, ModuleOrigin};
use camrig::loader::registry::ModuleRegistry;
use camrig::loader::SourceLoader;
use camrig::script::value::Value;
use camrig::script::ScriptError;

fn write_source(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn write_package(dir: &Path, name: &str, body: &str) -> PathBuf {
    let pkg = dir.join(name);
    fs::create_dir(&pkg).unwrap();
    fs::write(pkg.join("mod.rig"), body).unwrap();
    pkg
}

fn registered_names(loader: &SourceLoader) -> Vec<String> {
    loader.registry().names().map(str::to_string).collect()
}

#[test]
fn file_modules_register_under_the_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "calib.rig", "let focal = 35;");

    let mut loader = SourceLoader::new();
    let module = loader.load(&path).unwrap();

    assert_eq!(module.name, "calib");
    assert_eq!(module.get("focal"), Some(Value::Int(35)));
    assert!(matches!(module.origin, ModuleOrigin::File(_)));
    assert!(loader.registry().contains("calib"));
}

#[test]
fn package_modules_register_under_the_directory_name() {
    let dir = tempfile::tempdir().unwrap();
    let pkg = write_package(dir.path(), "lens", "let kind = \"fisheye\";");

    let mut loader = SourceLoader::new();
    let module = loader.load(&pkg).unwrap();

    assert_eq!(module.name, "lens");
    assert_eq!(module.get("kind"), Some(Value::str("fisheye")));
    assert!(matches!(module.origin, ModuleOrigin::Package { .. }));
}

#[test]
fn load_then_unload_restores_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "calib.rig", "let focal = 35;");

    let mut loader = SourceLoader::new();
    let before = registered_names(&loader);

    loader.load(&path).unwrap();
    loader.unload(&path);

    assert_eq!(registered_names(&loader), before);
}

#[test]
fn reloading_a_path_keeps_its_registered_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "calib.rig", "let rev = 1;");

    let mut loader = SourceLoader::new();
    let first = loader.load(&path).unwrap();
    assert_eq!(first.get("rev"), Some(Value::Int(1)));

    fs::write(&path, "let rev = 2;").unwrap();
    let second = loader.load(&path).unwrap();

    assert_eq!(second.name, "calib");
    assert_eq!(second.get("rev"), Some(Value::Int(2)));
    assert_eq!(registered_names(&loader), vec!["calib"]);
    // The first handle still sees its own namespace, untouched by the reload.
    assert_eq!(first.get("rev"), Some(Value::Int(1)));
}

#[test]
fn colliding_names_get_numeric_suffixes() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_source(dir.path(), "calib.rig", "let site = 1;");
    let spare = dir.path().join("spare");
    fs::create_dir(&spare).unwrap();
    let second = write_source(&spare, "calib.rig", "let site = 2;");

    let mut loader = SourceLoader::new();
    let a = loader.load(&first).unwrap();
    let b = loader.load(&second).unwrap();

    assert_eq!(a.name, "calib");
    assert_eq!(b.name, "calib_1");
    assert_eq!(a.get("site"), Some(Value::Int(1)));
    assert_eq!(b.get("site"), Some(Value::Int(2)));
}

#[test]
fn suffixed_duplicates_are_independently_unloadable() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_source(dir.path(), "calib.rig", "let site = 1;");
    let spare = dir.path().join("spare");
    fs::create_dir(&spare).unwrap();
    let second = write_source(&spare, "calib.rig", "let site = 2;");

    let mut loader = SourceLoader::new();
    loader.load(&first).unwrap();
    loader.load(&second).unwrap();

    // Unloading the first path leaves the suffixed duplicate registered.
    loader.unload(&first);
    assert_eq!(registered_names(&loader), vec!["calib_1"]);

    loader.unload(&second);
    assert!(loader.registry().is_empty());
}

#[test]
fn a_loading_source_can_use_itself() {
    let dir = tempfile::tempdir().unwrap();
    let body = "let focal = 35;\nuse station;\nlet doubled = station.focal * 2;\n";
    let path = write_source(dir.path(), "station.rig", body);

    let mut loader = SourceLoader::new();
    let module = loader.load(&path).unwrap();

    assert_eq!(module.get("doubled"), Some(Value::Int(70)));
}

#[test]
fn a_failing_source_is_not_left_registered() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "broken.rig", "let x = missing + 1;");

    let mut loader = SourceLoader::new();
    let before = registered_names(&loader);
    let err = loader.load(&path).unwrap_err();

    assert!(matches!(err, LoadError::Script(_)));
    assert_eq!(registered_names(&loader), before);
}

#[test]
fn a_failed_reload_drops_the_previous_module_too() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "calib.rig", "let rev = 1;");

    let mut loader = SourceLoader::new();
    loader.load(&path).unwrap();

    fs::write(&path, "let rev = ;").unwrap();
    assert!(loader.load(&path).is_err());

    // The reload unregistered the old module before execution failed.
    assert!(loader.registry().is_empty());
}

#[test]
fn unloadable_paths_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let notes = write_source(dir.path(), "notes.txt", "not a script");

    let mut loader = SourceLoader::new();
    let err = loader.load(&notes).unwrap_err();
    assert!(matches!(err, LoadError::InvalidSource { .. }));

    // A directory without an entry script is not a package.
    let err = loader.load(dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidSource { .. }));
    assert!(loader.registry().is_empty());
}

#[test]
fn a_missing_source_file_fails_at_read_time() {
    let mut loader = SourceLoader::new();
    let err = loader.load("/nowhere/ghost.rig").unwrap_err();

    assert!(matches!(err, LoadError::Script(ScriptError::Io { .. })));
    assert!(loader.registry().is_empty());
}

#[test]
fn unloading_an_unknown_path_is_a_silent_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "calib.rig", "let focal = 35;");

    let mut loader = SourceLoader::new();
    loader.load(&path).unwrap();

    loader.unload("/nowhere/ghost.rig");
    loader.unload("/nowhere/notes.txt");
    assert_eq!(registered_names(&loader), vec!["calib"]);
}

#[test]
fn unload_tolerates_relative_spellings_of_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "calib.rig", "let focal = 35;");

    let mut loader = SourceLoader::new();
    loader.load(&path).unwrap();

    // The recorded absolute path contains this relative spelling.
    loader.unload("calib.rig");
    assert!(loader.registry().is_empty());
}

#[test]
fn a_package_does_not_unload_through_its_entry_script() {
    let dir = tempfile::tempdir().unwrap();
    let pkg = write_package(dir.path(), "lens", "let kind = \"fisheye\";");

    let mut loader = SourceLoader::new();
    loader.load(&pkg).unwrap();

    // The entry script is a different source path than the package itself.
    loader.unload(pkg.join("mod.rig"));
    assert_eq!(registered_names(&loader), vec!["lens"]);

    loader.unload(&pkg);
    assert!(loader.registry().is_empty());
}

#[test]
fn a_loaded_module_can_use_an_earlier_one() {
    let dir = tempfile::tempdir().unwrap();
    let lib = write_source(dir.path(), "optics.rig", "fn double(x) { return x * 2; }");
    let main = write_source(
        dir.path(),
        "session.rig",
        "use optics;\nlet result = optics.double(21);",
    );

    let mut loader = SourceLoader::new();
    loader.load(&lib).unwrap();
    let module = loader.load(&main).unwrap();

    assert_eq!(module.get("result"), Some(Value::Int(42)));
}

/// Marks the module instead of running rig code, and checks the registry
/// already lists it.
struct ProbeEngine;

impl SourceEngine for ProbeEngine {
    fn execute_str(
        &self,
        _source: &str,
        module: &ModuleHandle,
        registry: &ModuleRegistry,
    ) -> Result<Value, ScriptError> {
        assert!(registry.contains(&module.name));
        module.set("probed", Value::Bool(true));
        Ok(Value::Unit)
    }
}

#[test]
fn a_substituted_engine_sees_the_module_pre_registered() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "calib.rig", "");

    let mut loader = SourceLoader::with_engine(ProbeEngine);
    let module = loader.load(&path).unwrap();

    assert_eq!(module.get("probed"), Some(Value::Bool(true)));
}

struct RefusingEngine;

impl SourceEngine for RefusingEngine {
    fn execute_str(
        &self,
        _source: &str,
        _module: &ModuleHandle,
        _registry: &ModuleRegistry,
    ) -> Result<Value, ScriptError> {
        Err(ScriptError::Io {
            path: PathBuf::from("refused"),
            source: io::Error::other("engine refused"),
        })
    }
}

#[test]
fn rollback_holds_for_any_engine_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(dir.path(), "calib.rig", "let focal = 35;");

    let mut loader = SourceLoader::with_engine(RefusingEngine);
    assert!(loader.load(&path).is_err());
    assert!(loader.registry().is_empty());
}

#[test]
fn captured_functions_outlive_their_module_registration() {
    let dir = tempfile::tempdir().unwrap();
    let lib = write_source(dir.path(), "optics.rig", "fn double(x) { return x * 2; }");
    let main = write_source(
        dir.path(),
        "session.rig",
        "use optics;\nlet double = optics.double;",
    );

    let mut loader = SourceLoader::new();
    loader.load(&lib).unwrap();
    let session = loader.load(&main).unwrap();

    loader.unload(&lib);
    assert!(!loader.registry().contains("optics"));

    // The captured function still runs against its defining module.
    loader
        .engine()
        .execute_str("let answer = double(21);", &session, loader.registry())
        .unwrap();
    assert_eq!(session.get("answer"), Some(Value::Int(42)));

    // But resolving the module afresh now fails.
    let err = loader
        .engine()
        .execute_str("use optics;", &session, loader.registry())
        .unwrap_err();
    assert!(matches!(err, ScriptError::Eval(_)));
}
