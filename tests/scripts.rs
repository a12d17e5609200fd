mod common;

use common::{manifest_path, runtime, stack_of};
use gershwin::runtime::{data_structures::value::Value, interpreter::driver::{load, load_file}};

#[test]
fn squares_script() {
    let mut runtime = runtime();

    load_file(&mut runtime, &manifest_path("tests/scripts/squares.gwn")).unwrap();

    let stack = stack_of(&runtime);

    assert_eq!(stack.len(), 4);
    assert_eq!(stack[0], Value::Int(9));
    assert_eq!(stack[1], Value::Int(8));
    assert_eq!(stack[2].to_string(), "< 1 + >");
    assert_eq!(stack[3], Value::String("squares 2".to_string()));

    assert_eq!(runtime.environment().current_namespace(), "demo.squares");

    let sq = runtime.environment().lookup("sq__GWN__").unwrap();
    assert_eq!(sq.meta().doc().map(String::as_str), Some("Square a number."));
    assert_eq!(sq.namespace(), "demo.squares");
}

#[test]
fn quotations_from_scripts_can_be_called_later() {
    let mut runtime = runtime();

    load_file(&mut runtime, &manifest_path("tests/scripts/squares.gwn")).unwrap();
    load(&mut runtime, "<test>", "drop call").unwrap();

    assert_eq!(runtime.stack().peek().unwrap(), Value::Int(9));
}

#[test]
fn missing_files_are_io_errors() {
    let mut runtime = runtime();
    let error = load_file(&mut runtime, &manifest_path("tests/scripts/missing.gwn")).err().unwrap();

    assert_eq!(error.kind(), gershwin::runtime::error::ErrorKind::Io);
    assert!(error.cause().is_some());
}
