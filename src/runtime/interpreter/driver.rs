use crate::{
    lang::{compilation::analyze, forms::Form, reader::Reader, source_buffer::SourceLocation},
    runtime::{
        data_structures::value::Value,
        error::{self, ErrorKind, ScriptError},
        interpreter::Runtime,
    },
};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info};

/// Source id used for forms that don't come from any file.
pub const EVAL_SOURCE: &str = "<eval>";

/// Analyze and evaluate a single form.
pub fn eval_one(runtime: &mut Runtime, form: &Form) -> error::Result<Value> {
    let location = SourceLocation::new_from_path(EVAL_SOURCE);
    eval_at(runtime, form, &location)
}

/// Analyze and evaluate a form that was read at the given location.  Errors that don't already
/// know where they happened are reported there.
pub fn eval_at(
    runtime: &mut Runtime,
    form: &Form,
    location: &SourceLocation,
) -> error::Result<Value> {
    let expr = analyze(runtime, form, location)?;

    expr.eval(runtime)
        .map_err(|error| error.with_location(location))
}

/// Read every form in the source and evaluate them in order.  Returns the value of the last
/// form, or nil if there weren't any.
pub fn load(runtime: &mut Runtime, source_id: &str, source: &str) -> error::Result<Value> {
    let mut reader = Reader::new(source_id, source);
    let mut result = Value::Nil;

    while let Some(form) = reader.read(false)? {
        let location = reader.form_location().clone();
        result = eval_at(runtime, &form, &location)?;
    }

    debug!(source = source_id, "Loaded source.");

    Ok(result)
}

/// Load a source file from disk.
pub fn load_file(runtime: &mut Runtime, path: &Path) -> error::Result<Value> {
    let source = read_source(path)?;
    load(runtime, &path.to_string_lossy(), &source)
}

/// Compile the source to host text.  Every form is emitted and then evaluated so that later
/// forms can use the words defined by earlier ones.  The text is written to the compile path
/// under the source's internal name, and the path of the new artifact is returned.
pub fn compile(runtime: &mut Runtime, source_id: &str, source: &str) -> error::Result<PathBuf> {
    let compile_path = match &runtime.config().compile_path {
        Some(path) => path.clone(),
        None => {
            return ScriptError::new_as_result(
                ErrorKind::Config,
                None,
                "*compile-path* not set".to_string(),
            );
        }
    };

    let mut reader = Reader::new(source_id, source);
    let mut text = String::new();

    while let Some(form) = reader.read(false)? {
        let location = reader.form_location().clone();
        let expr = analyze(runtime, &form, &location)?;

        let line = expr
            .emit(runtime)
            .map_err(|error| error.with_location(&location))?;

        text.push_str(&line);
        text.push('\n');

        let _ = expr
            .eval(runtime)
            .map_err(|error| error.with_location(&location))?;
    }

    let artifact = compile_path.join(format!(
        "{}.{}",
        internal_name(source_id),
        runtime.config().artifact_extension
    ));

    write_artifact(&artifact, &text)?;
    info!(source = source_id, artifact = %artifact.display(), "Wrote compiled artifact.");

    Ok(artifact)
}

/// Compile a source file from disk.
pub fn compile_file(runtime: &mut Runtime, path: &Path) -> error::Result<PathBuf> {
    let source = read_source(path)?;
    compile(runtime, &path.to_string_lossy(), &source)
}

/// The name an artifact is stored under.  Only the plain components of the source path are kept,
/// joined with `/`, and the extension is dropped.
pub fn internal_name(source_id: &str) -> String {
    let path = Path::new(source_id).with_extension("");

    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn read_source(path: &Path) -> error::Result<String> {
    fs::read_to_string(path).map_err(|error| {
        ScriptError::new_with_cause(
            ErrorKind::Io,
            None,
            format!("Could not read source file {}.", path.display()),
            error.into(),
        )
    })
}

fn write_artifact(artifact: &Path, text: &str) -> error::Result<()> {
    let wrap = |error: std::io::Error| {
        ScriptError::new_with_cause(
            ErrorKind::Io,
            None,
            format!("Could not write compiled artifact {}.", artifact.display()),
            error.into(),
        )
    };

    if let Some(parent) = artifact.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }

    fs::write(artifact, text).map_err(wrap)
}
