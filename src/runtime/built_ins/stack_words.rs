use crate::{
    add_native_word,
    runtime::{
        data_structures::value::{ToValue, Value},
        error,
        interpreter::Runtime,
    },
};

/// Duplicate the top value on the data stack.
///
/// Signature: `value -- value value`
fn word_dup(runtime: &mut Runtime) -> error::Result<()> {
    let value = runtime.stack().peek()?;

    runtime.push(value);

    Ok(())
}

/// Drop the top value on the data stack.
///
/// Signature: `value -- `
fn word_drop(runtime: &mut Runtime) -> error::Result<()> {
    let _ = runtime.pop()?;

    Ok(())
}

/// Swap the top 2 values on the data stack.
///
/// Signature: `a b -- b a`
fn word_swap(runtime: &mut Runtime) -> error::Result<()> {
    runtime.stack_mut().replace_top(|[a, b]: [Value; 2]| Ok((vec![b, a], ())))
}

/// Copy the second value over the top one.
///
/// Signature: `a b -- a b a`
fn word_over(runtime: &mut Runtime) -> error::Result<()> {
    runtime.stack_mut().replace_top(|[a, b]: [Value; 2]| Ok((vec![a.clone(), b, a], ())))
}

/// Rotate the third value up to the top of the stack.
///
/// Signature: `a b c -- b c a`
fn word_rot(runtime: &mut Runtime) -> error::Result<()> {
    runtime.stack_mut().replace_top(|[a, b, c]: [Value; 3]| Ok((vec![b, c, a], ())))
}

/// Drop the second value on the stack.
///
/// Signature: `a b -- b`
fn word_nip(runtime: &mut Runtime) -> error::Result<()> {
    runtime.stack_mut().replace_top(|[_, b]: [Value; 2]| Ok((vec![b], ())))
}

/// Empty the data stack.
///
/// Signature: `... -- `
fn word_clear(runtime: &mut Runtime) -> error::Result<()> {
    runtime.stack_mut().clear();
    Ok(())
}

/// Get the depth of the data stack before calling this word.
///
/// Signature: ` -- depth`
fn word_depth(runtime: &mut Runtime) -> error::Result<()> {
    let depth = runtime.stack().depth().to_value();

    runtime.push(depth);

    Ok(())
}

/// Register the stack manipulation words.
pub fn register_stack_words(runtime: &mut Runtime) {
    add_native_word!(runtime, "dup", word_dup, "Duplicate the top value on the data stack.", "value -- value value");

    add_native_word!(runtime, "drop", word_drop, "Discard the top value on the data stack.", "value --");

    add_native_word!(runtime, "swap", word_swap, "Swap the top 2 values on the data stack.", "a b -- b a");

    add_native_word!(runtime, "over", word_over, "Make a copy of the second value on the top of the stack.",
                     "a b -- a b a");

    add_native_word!(runtime, "rot", word_rot, "Rotate the third value to the top of the stack.",
                     "a b c -- b c a");

    add_native_word!(runtime, "nip", word_nip, "Discard the second value on the data stack.", "a b -- b");

    add_native_word!(runtime, "clear", word_clear, "Remove every value from the data stack.", "... --");

    add_native_word!(runtime, "depth", word_depth, "Get the depth of the data stack.", "-- depth");
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        data_structures::value::Value, interpreter::driver::load, interpreter::Runtime,
    };
    use test_case::test_case;

    fn stack_after(source: &str) -> Vec<Value> {
        let mut runtime = Runtime::default();

        load(&mut runtime, "<test>", source).unwrap();

        runtime.stack().seq().rev().cloned().collect()
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|value| Value::Int(*value)).collect()
    }

    #[test_case("1 dup", &[1, 1]; "dup")]
    #[test_case("1 2 drop", &[1]; "drop")]
    #[test_case("1 2 swap", &[2, 1]; "swap")]
    #[test_case("1 2 over", &[1, 2, 1]; "over")]
    #[test_case("1 2 3 rot", &[2, 3, 1]; "rot")]
    #[test_case("1 2 nip", &[2]; "nip")]
    #[test_case("1 2 3 clear", &[]; "clear")]
    #[test_case("7 7 depth", &[7, 7, 2]; "depth")]
    fn stack_words(source: &str, expected: &[i64]) {
        assert_eq!(stack_after(source), ints(expected));
    }

    #[test_case("dup"; "dup")]
    #[test_case("drop"; "drop")]
    #[test_case("1 swap"; "swap")]
    #[test_case("1 over"; "over")]
    #[test_case("1 2 rot"; "rot")]
    fn underflow_is_reported(source: &str) {
        let mut runtime = Runtime::default();
        let error = load(&mut runtime, "<test>", source).err().unwrap();

        assert!(error.is_stack_underflow());
    }

    #[test_case("1 swap", &[1]; "swap")]
    #[test_case("1 over", &[1]; "over")]
    #[test_case("1 2 rot", &[1, 2]; "rot")]
    #[test_case("1 nip", &[1]; "nip")]
    fn failed_words_leave_the_stack_alone(source: &str, expected: &[i64]) {
        let mut runtime = Runtime::default();

        assert!(load(&mut runtime, "<test>", source).is_err());
        assert_eq!(runtime.stack().seq().rev().cloned().collect::<Vec<_>>(), ints(expected));
    }
}
