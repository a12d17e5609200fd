use crate::{
    add_host_function,
    lang::compilation::{push_host_result, quotation_forms},
    runtime::{
        data_structures::{
            value::Value,
            word::{Quotation, WordBody},
        },
        error::{self, host_error},
        interpreter::Runtime,
    },
};
use std::rc::Rc;

fn single_arg(name: &str, args: Vec<Value>) -> error::Result<Value> {
    match <[Value; 1]>::try_from(args) {
        Ok([arg]) => Ok(arg),
        Err(args) => host_error(format!("Wrong number of args ({}) passed to {}", args.len(), name)),
    }
}

/// `(conj-it! value)`  Push the value the way a host form's result is pushed.
fn conj_it(runtime: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    let value = single_arg("conj-it!", args)?;
    push_host_result(runtime, value)
}

/// `(invoke! word)`
fn invoke(runtime: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    let callee = single_arg("invoke!", args)?;
    runtime.invoke(&callee)
}

/// `(quotation (fn [] ...) "< forms >")`  Wrap a function taking no arguments as a quotation.  The
/// optional text restores the forms the quotation prints as.
fn quotation(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    let (callee, forms) = match args.as_slice() {
        [callee] => (callee.clone(), None),
        [callee, Value::String(text)] => (callee.clone(), Some(quotation_forms(text)?)),
        _ => {
            return host_error(format!(
                "Wrong number of args ({}) passed to quotation",
                args.len()
            ));
        }
    };

    let body: WordBody = Rc::new(move |runtime: &mut Runtime| runtime.apply(&callee, Vec::new()));

    Ok(Value::Quotation(Rc::new(Quotation::new(body, forms))))
}

/// `(pop-it!)`
fn pop_it(runtime: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    if !args.is_empty() {
        return host_error(format!("Wrong number of args ({}) passed to pop-it!", args.len()));
    }

    runtime.pop()
}

/// `(peek!)`
fn peek(runtime: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    if !args.is_empty() {
        return host_error(format!("Wrong number of args ({}) passed to peek!", args.len()));
    }

    runtime.stack().peek()
}

/// Register the host functions that give host code, and the code emitted by the compiler, access
/// to the data stack.
pub fn register_intrinsics(runtime: &mut Runtime) {
    add_host_function!(runtime, "conj-it!", conj_it, "Push a value onto the data stack.");
    add_host_function!(runtime, "invoke!", invoke, "Invoke a word or quotation.");
    add_host_function!(runtime, "quotation", quotation, "Wrap a function as a quotation.");
    add_host_function!(runtime, "pop-it!", pop_it, "Remove and return the top of the data stack.");
    add_host_function!(runtime, "peek!", peek, "Return the top of the data stack.");
}
