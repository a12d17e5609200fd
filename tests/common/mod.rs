#![allow(dead_code)]

use gershwin::runtime::{
    data_structures::value::Value,
    error::Result,
    interpreter::{driver::load, Config, Runtime},
};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

/// Absolute path of a file relative to the crate root.
pub fn manifest_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(relative)
}

/// A fresh runtime with the core words and the built in host.
pub fn runtime() -> Runtime {
    Runtime::default()
}

/// Load the source into a fresh runtime and hand back the runtime.
pub fn run(source: &str) -> Result<Runtime> {
    let mut runtime = runtime();

    load(&mut runtime, "<test>", source)?;

    Ok(runtime)
}

/// The data stack, bottom first.
pub fn stack_of(runtime: &Runtime) -> Vec<Value> {
    runtime.stack().seq().rev().cloned().collect()
}

/// The data stack after loading the source, bottom first.
pub fn stack_after(source: &str) -> Vec<Value> {
    let runtime = run(source).unwrap();
    stack_of(&runtime)
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|value| Value::Int(*value)).collect()
}

/// A new, empty directory under the system temp directory.
pub fn temp_dir(name: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    let path = std::env::temp_dir().join(format!(
        "gershwin-{}-{}-{}",
        name,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    ));

    let _ = fs::remove_dir_all(&path);
    fs::create_dir_all(&path).unwrap();

    path
}

/// A runtime that compiles into the given directory.
pub fn compiling_runtime(compile_path: &Path) -> Runtime {
    Runtime::with_config(Config::default().with_compile_path(compile_path))
}
