// Parameterised checks of the core words, run against a preloaded stack.

mod common;

use gershwin::runtime::{
    data_structures::value::Value,
    error::{ErrorKind, Result},
    interpreter::driver::load,
};
use test_case::test_case;

fn eval_and_stack(source: &str, init_stack: &[i64]) -> Result<Vec<Value>> {
    let mut runtime = common::runtime();

    for &value in init_stack {
        runtime.push(Value::Int(value));
    }

    load(&mut runtime, "<test>", source)?;

    Ok(common::stack_of(&runtime))
}

#[test_case("0", &[], &[0]; "zero")]
#[test_case("42", &[], &[42]; "number")]
#[test_case("-17", &[], &[-17]; "negative number")]
#[test_case("0x1F", &[], &[31]; "hex number")]
#[test_case("1_000", &[], &[1000]; "separated number")]
#[test_case("+", &[2, 2], &[4]; "simple add")]
#[test_case("-", &[5, 2], &[3]; "simple sub")]
#[test_case("*", &[3, 4], &[12]; "simple mul")]
#[test_case("/", &[12, 3], &[4]; "simple div")]
#[test_case("mod", &[13, 5], &[3]; "simple mod")]
#[test_case("dup", &[1], &[1, 1]; "dup")]
#[test_case("drop", &[1, 2], &[1]; "drop")]
#[test_case("swap", &[1, 2], &[2, 1]; "swap")]
#[test_case("over", &[1, 2], &[1, 2, 1]; "over")]
#[test_case("rot", &[1, 2, 3], &[2, 3, 1]; "rot")]
#[test_case("nip", &[1, 2], &[2]; "nip")]
#[test_case("depth", &[5, 6, 7], &[5, 6, 7, 3]; "depth")]
#[test_case("clear", &[5, 6, 7], &[]; "clear")]
#[test_case("(+ (pop-it!) (pop-it!))", &[3, 4], &[7]; "host code pops")]
#[test_case("(* (peek!) 2)", &[3], &[3, 6]; "host code peeks")]
#[test_case("< dup * > call", &[9], &[81]; "call")]
#[test_case("dup 0 > < 1 > < -1 > if", &[5], &[5, 1]; "if true")]
#[test_case("dup 0 > < 1 > < -1 > if", &[-5], &[-5, -1]; "if false")]
#[test_case(": sq [ n -- n*n ] dup * ; sq", &[7], &[49]; "defined word")]
#[test_case(": dup2 [ a b -- a b a b ] over over ; dup2", &[1, 2], &[1, 2, 1, 2]; "dup2")]
fn core_words(source: &str, init_stack: &[i64], expected: &[i64]) {
    let expected: Vec<Value> = expected.iter().map(|value| Value::Int(*value)).collect();

    assert_eq!(eval_and_stack(source, init_stack).unwrap(), expected);
}

#[test_case("+", &[1]; "add")]
#[test_case("dup", &[]; "dup")]
#[test_case("drop", &[]; "drop")]
#[test_case("call", &[]; "call")]
#[test_case("if", &[1, 2]; "if")]
#[test_case("(pop-it!)", &[]; "host pop")]
#[test_case("(peek!)", &[]; "host peek")]
fn stack_underflow(source: &str, init_stack: &[i64]) {
    let error = eval_and_stack(source, init_stack).err().unwrap();

    assert_eq!(error.kind(), ErrorKind::StackUnderflow);
}
