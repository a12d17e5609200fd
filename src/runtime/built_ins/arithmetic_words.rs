use crate::{
    add_native_word,
    host::functions::{add, compare, divide, modulo, multiply, subtract},
    runtime::{data_structures::value::Value, error, interpreter::Runtime},
};
use std::cmp::Ordering;

/// Replace the two operands of a binary word with its result.  The first operand pushed is the
/// left hand side.  If the operation fails both operands stay on the stack.
fn binary_op(
    runtime: &mut Runtime,
    op: impl FnOnce(&Value, &Value) -> error::Result<Value>,
) -> error::Result<()> {
    runtime.stack_mut().replace_top(|[a, b]: [Value; 2]| Ok((vec![op(&a, &b)?], ())))
}

fn comparison_op(runtime: &mut Runtime, test: fn(Ordering) -> bool) -> error::Result<()> {
    binary_op(runtime, |a, b| Ok(Value::Bool(test(compare(a, b)?))))
}

fn word_add(runtime: &mut Runtime) -> error::Result<()> {
    binary_op(runtime, add)
}

fn word_subtract(runtime: &mut Runtime) -> error::Result<()> {
    binary_op(runtime, subtract)
}

fn word_multiply(runtime: &mut Runtime) -> error::Result<()> {
    binary_op(runtime, multiply)
}

fn word_divide(runtime: &mut Runtime) -> error::Result<()> {
    binary_op(runtime, divide)
}

fn word_mod(runtime: &mut Runtime) -> error::Result<()> {
    binary_op(runtime, modulo)
}

fn word_equal(runtime: &mut Runtime) -> error::Result<()> {
    binary_op(runtime, |a, b| Ok(Value::Bool(a == b)))
}

fn word_less(runtime: &mut Runtime) -> error::Result<()> {
    comparison_op(runtime, |ordering| ordering == Ordering::Less)
}

fn word_greater(runtime: &mut Runtime) -> error::Result<()> {
    comparison_op(runtime, |ordering| ordering == Ordering::Greater)
}

/// Logical not, only nil and false are false.
///
/// Signature: `value -- bool`
fn word_not(runtime: &mut Runtime) -> error::Result<()> {
    let value = runtime.pop()?;

    runtime.push(Value::Bool(!value.is_truthy()));

    Ok(())
}

/// Register the arithmetic, comparison and logic words.
pub fn register_arithmetic_words(runtime: &mut Runtime) {
    add_native_word!(runtime, "+", word_add, "Add 2 numbers.", "a b -- sum");
    add_native_word!(runtime, "-", word_subtract, "Subtract b from a.", "a b -- difference");
    add_native_word!(runtime, "*", word_multiply, "Multiply 2 numbers.", "a b -- product");
    add_native_word!(runtime, "/", word_divide, "Divide a by b.", "a b -- quotient");
    add_native_word!(runtime, "mod", word_mod, "Remainder of dividing a by b.", "a b -- remainder");

    add_native_word!(runtime, "=", word_equal, "Are the 2 values equal?", "a b -- bool");
    add_native_word!(runtime, "<", word_less, "Is a less than b?", "a b -- bool");
    add_native_word!(runtime, ">", word_greater, "Is a greater than b?", "a b -- bool");
    add_native_word!(runtime, "not", word_not, "Logical not of the value.", "value -- bool");
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        data_structures::value::Value,
        error::ErrorKind,
        interpreter::{driver::load, Runtime},
    };
    use test_case::test_case;

    fn top_after(source: &str) -> Value {
        let mut runtime = Runtime::default();

        load(&mut runtime, "<test>", source).unwrap();

        assert_eq!(runtime.stack().depth(), 1);
        runtime.stack().peek().unwrap()
    }

    #[test_case("2 3 +", Value::Int(5); "add")]
    #[test_case("2 3 -", Value::Int(-1); "subtract")]
    #[test_case("2 3 *", Value::Int(6); "multiply")]
    #[test_case("6 3 /", Value::Int(2); "divide evenly")]
    #[test_case("7 2 /", Value::Float(3.5); "divide unevenly")]
    #[test_case("1.5 2 +", Value::Float(3.5); "mixed numbers")]
    #[test_case("7 3 mod", Value::Int(1); "mod")]
    #[test_case("-7 3 mod", Value::Int(2); "mod of negative")]
    #[test_case("2 2 =", Value::Bool(true); "equal")]
    #[test_case("\"a\" \"b\" =", Value::Bool(false); "not equal")]
    #[test_case("1 2 <", Value::Bool(true); "less")]
    #[test_case("1 2 >", Value::Bool(false); "greater")]
    #[test_case("nil not", Value::Bool(true); "not nil")]
    #[test_case("0 not", Value::Bool(false); "zero is true")]
    fn arithmetic_words(source: &str, expected: Value) {
        assert_eq!(top_after(source), expected);
    }

    #[test_case("-9223372036854775807 1 - -1 /"; "divide")]
    #[test_case("-9223372036854775807 1 - -1 mod"; "mod")]
    fn smallest_integer_over_minus_one_is_a_host_error(source: &str) {
        let mut runtime = Runtime::default();
        let error = load(&mut runtime, "<test>", source).err().unwrap();

        assert_eq!(error.kind(), ErrorKind::Host);
        assert_eq!(runtime.stack().depth(), 2);
    }

    #[test_case("1 +", &[Value::Int(1)]; "add underflow")]
    #[test_case("1 \"a\" +", &[Value::Int(1), Value::String("a".to_string())]; "add type error")]
    #[test_case("1 0 mod", &[Value::Int(1), Value::Int(0)]; "mod by zero")]
    #[test_case("1 :a <", &[Value::Int(1), Value::keyword("a")]; "compare type error")]
    fn failed_words_leave_the_stack_alone(source: &str, expected: &[Value]) {
        let mut runtime = Runtime::default();

        assert!(load(&mut runtime, "<test>", source).is_err());
        assert_eq!(runtime.stack().seq().rev().cloned().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn division_by_zero_is_a_host_error() {
        let mut runtime = Runtime::default();
        let error = load(&mut runtime, "<test>", "1 0 /").err().unwrap();

        assert_eq!(error.kind(), ErrorKind::Host);
    }
}
