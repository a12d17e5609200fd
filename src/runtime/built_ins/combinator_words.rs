use crate::{
    add_native_word,
    runtime::{data_structures::value::Value, error, interpreter::Runtime},
};

/// Invoke the quotation on the top of the stack.
///
/// Signature: `quotation -- ...`
fn word_call(runtime: &mut Runtime) -> error::Result<()> {
    let quotation = runtime.pop()?;
    let _ = runtime.invoke(&quotation)?;

    Ok(())
}

/// Invoke one of two quotations depending on a condition.
///
/// Signature: `condition then-quotation else-quotation -- ...`
fn word_if(runtime: &mut Runtime) -> error::Result<()> {
    let [condition, then_branch, else_branch] =
        runtime.stack_mut().replace_top(|operands: [Value; 3]| Ok((Vec::new(), operands)))?;

    let branch = if condition.is_truthy() {
        then_branch
    } else {
        else_branch
    };

    let _ = runtime.invoke(&branch)?;

    Ok(())
}

/// Register the words that run quotations.
pub fn register_combinator_words(runtime: &mut Runtime) {
    add_native_word!(runtime, "call", word_call, "Invoke the quotation on the top of the stack.",
                     "quotation -- ...");

    add_native_word!(runtime, "if", word_if,
                     "Invoke the then quotation if the condition is true, otherwise the else one.",
                     "condition then else -- ...");
}
