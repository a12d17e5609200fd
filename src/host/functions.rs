use crate::{
    add_host_function,
    runtime::{
        data_structures::value::{ToValue, Value, ValueList},
        error::{self, host_error},
        interpreter::Runtime,
    },
};
use std::cmp::Ordering;

/// Register a native host function in the core namespace, documented with the given text.
#[macro_export]
macro_rules! add_host_function {
    (
        $runtime:expr ,
        $name:expr ,
        $function:expr ,
        $description:expr
    ) => {{
        use std::rc::Rc;
        use $crate::runtime::{
            data_structures::{
                environment::Metadata,
                value::{NativeFunction, Value},
            },
            names::{CORE_NAMESPACE, DOC_KEY},
        };

        let function = NativeFunction {
            name: $name.to_string(),
            handler: Box::new($function),
        };

        let meta = Metadata::new().with(&DOC_KEY, Value::String($description.to_string()));

        $runtime.environment_mut().bind_in(
            CORE_NAMESPACE,
            $name,
            Some(Value::Function(Rc::new(function))),
            meta,
        );
    }};
}

fn expect_args(name: &str, args: &[Value], count: usize) -> error::Result<()> {
    if args.len() != count {
        return host_error(format!("Wrong number of args ({}) passed to {}", args.len(), name));
    }

    Ok(())
}

/// Add two numbers.  Integer overflow is an error.
pub fn add(a: &Value, b: &Value) -> error::Result<Value> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => match a.checked_add(*b) {
            Some(result) => Ok(Value::Int(result)),
            None => host_error("integer overflow".to_string()),
        },

        _ => Ok(Value::Float(a.get_float_val()? + b.get_float_val()?)),
    }
}

pub fn subtract(a: &Value, b: &Value) -> error::Result<Value> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => match a.checked_sub(*b) {
            Some(result) => Ok(Value::Int(result)),
            None => host_error("integer overflow".to_string()),
        },

        _ => Ok(Value::Float(a.get_float_val()? - b.get_float_val()?)),
    }
}

pub fn multiply(a: &Value, b: &Value) -> error::Result<Value> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => match a.checked_mul(*b) {
            Some(result) => Ok(Value::Int(result)),
            None => host_error("integer overflow".to_string()),
        },

        _ => Ok(Value::Float(a.get_float_val()? * b.get_float_val()?)),
    }
}

/// Divide two numbers.  Integer division that doesn't come out even produces a float.
pub fn divide(a: &Value, b: &Value) -> error::Result<Value> {
    match (a, b) {
        (Value::Int(_), Value::Int(0)) => host_error("Divide by zero".to_string()),

        (Value::Int(a), Value::Int(b)) => match a.checked_rem(*b) {
            Some(0) => match a.checked_div(*b) {
                Some(result) => Ok(Value::Int(result)),
                None => host_error("integer overflow".to_string()),
            },
            Some(_) => Ok(Value::Float(*a as f64 / *b as f64)),
            None => host_error("integer overflow".to_string()),
        },

        _ => Ok(Value::Float(a.get_float_val()? / b.get_float_val()?)),
    }
}

/// The remainder of integer division, with the sign of the divisor.
pub fn modulo(a: &Value, b: &Value) -> error::Result<Value> {
    let a = *a.as_int()?;
    let b = *b.as_int()?;

    if b == 0 {
        return host_error("Divide by zero".to_string());
    }

    let remainder = match a.checked_rem(b) {
        Some(remainder) => remainder,
        None => return host_error("integer overflow".to_string()),
    };

    // A nonzero remainder is smaller than the divisor, so adding it back can't overflow.
    if remainder != 0 && (remainder < 0) != (b < 0) {
        Ok(Value::Int(remainder + b))
    } else {
        Ok(Value::Int(remainder))
    }
}

/// Order two numbers.
pub fn compare(a: &Value, b: &Value) -> error::Result<Ordering> {
    let ordering = match (a, b) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        _ => a.get_float_val()?.partial_cmp(&b.get_float_val()?),
    };

    match ordering {
        Some(ordering) => Ok(ordering),
        None => host_error(format!("Can not compare {} and {}", a, b)),
    }
}

/// Apply a binary operation across all of the arguments, left to right.
fn fold(
    name: &str,
    args: Vec<Value>,
    identity: Value,
    operation: fn(&Value, &Value) -> error::Result<Value>,
) -> error::Result<Value> {
    let mut iter = args.into_iter();

    let mut result = match iter.next() {
        Some(first) => first,
        None => return Ok(identity),
    };

    if !result.is_numeric() {
        return host_error(format!("{} expects numbers, found {}", name, result));
    }

    for next in iter {
        result = operation(&result, &next)?;
    }

    Ok(result)
}

/// Check that each neighbouring pair of arguments is ordered as the test requires.
fn chain(args: &[Value], test: fn(Ordering) -> bool) -> error::Result<Value> {
    for pair in args.windows(2) {
        if !test(compare(&pair[0], &pair[1])?) {
            return Ok(Value::Bool(false));
        }
    }

    Ok(Value::Bool(true))
}

fn sequence_items(name: &str, value: &Value) -> error::Result<ValueList> {
    match value {
        Value::Nil => Ok(ValueList::new()),
        Value::List(items) | Value::Vector(items) => Ok(items.clone()),
        Value::Map(map) => Ok(map
            .iter()
            .map(|(key, value)| Value::vector(vec![key.clone(), value.clone()]))
            .collect()),
        Value::String(text) => Ok(text.chars().map(|next| Value::String(next.to_string())).collect()),
        _ => host_error(format!("{} does not support {}", name, value.type_name())),
    }
}

fn host_add(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    fold("+", args, Value::Int(0), add)
}

fn host_subtract(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    match args.as_slice() {
        [] => host_error("Wrong number of args (0) passed to -".to_string()),
        [only] => subtract(&Value::Int(0), only),
        _ => fold("-", args, Value::Int(0), subtract),
    }
}

fn host_multiply(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    fold("*", args, Value::Int(1), multiply)
}

fn host_divide(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    match args.as_slice() {
        [] => host_error("Wrong number of args (0) passed to /".to_string()),
        [only] => divide(&Value::Int(1), only),
        _ => fold("/", args, Value::Int(1), divide),
    }
}

fn host_equal(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    Ok(Value::Bool(args.windows(2).all(|pair| pair[0] == pair[1])))
}

fn host_not(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    expect_args("not", &args, 1)?;
    Ok(Value::Bool(!args[0].is_truthy()))
}

fn host_inc(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    expect_args("inc", &args, 1)?;
    add(&args[0], &Value::Int(1))
}

fn host_dec(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    expect_args("dec", &args, 1)?;
    subtract(&args[0], &Value::Int(1))
}

fn host_str(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    let text: String = args.iter().map(Value::to_plain_string).collect();
    Ok(text.to_value())
}

fn host_count(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    expect_args("count", &args, 1)?;

    match &args[0] {
        Value::String(text) => Ok(text.chars().count().to_value()),
        Value::Map(map) => Ok(map.len().to_value()),
        other => Ok(sequence_items("count", other)?.len().to_value()),
    }
}

fn host_first(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    expect_args("first", &args, 1)?;
    Ok(sequence_items("first", &args[0])?.front().cloned().unwrap_or(Value::Nil))
}

fn host_rest(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    expect_args("rest", &args, 1)?;

    let items = sequence_items("rest", &args[0])?;
    Ok(Value::List(items.skip(1.min(items.len()))))
}

fn host_nth(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    expect_args("nth", &args, 2)?;

    let items = sequence_items("nth", &args[0])?;
    let index = *args[1].as_int()?;

    match usize::try_from(index).ok().and_then(|index| items.get(index)) {
        Some(value) => Ok(value.clone()),
        None => host_error(format!("Index {} out of bounds", index)),
    }
}

fn host_get(_: &mut Runtime, args: Vec<Value>) -> error::Result<Value> {
    let (collection, key, default) = match args.as_slice() {
        [collection, key] => (collection, key, Value::Nil),
        [collection, key, default] => (collection, key, default.clone()),
        _ => return host_error(format!("Wrong number of args ({}) passed to get", args.len())),
    };

    let found = match (collection, key) {
        (Value::Map(map), key) => map.get(key).cloned(),
        (Value::Vector(items), Value::Int(index)) => {
            usize::try_from(*index).ok().and_then(|index| items.get(index)).cloned()
        }
        _ => None,
    };

    Ok(found.unwrap_or(default))
}

/// Register the host's function library.
pub fn register_host_functions(runtime: &mut Runtime) {
    add_host_function!(runtime, "+", host_add, "Add the numbers together.");
    add_host_function!(runtime, "-", host_subtract, "Subtract the rest of the numbers from the first.");
    add_host_function!(runtime, "*", host_multiply, "Multiply the numbers together.");
    add_host_function!(runtime, "/", host_divide, "Divide the first number by the rest.");
    add_host_function!(runtime, "=", host_equal, "Are all of the values equal?");

    add_host_function!(
        runtime,
        "<",
        |_: &mut Runtime, args: Vec<Value>| chain(&args, |ordering| ordering == Ordering::Less),
        "Are the numbers in increasing order?"
    );

    add_host_function!(
        runtime,
        ">",
        |_: &mut Runtime, args: Vec<Value>| chain(&args, |ordering| ordering == Ordering::Greater),
        "Are the numbers in decreasing order?"
    );

    add_host_function!(
        runtime,
        "<=",
        |_: &mut Runtime, args: Vec<Value>| chain(&args, |ordering| ordering != Ordering::Greater),
        "Are the numbers in non-decreasing order?"
    );

    add_host_function!(
        runtime,
        ">=",
        |_: &mut Runtime, args: Vec<Value>| chain(&args, |ordering| ordering != Ordering::Less),
        "Are the numbers in non-increasing order?"
    );

    add_host_function!(runtime, "not", host_not, "True if the value is nil or false.");
    add_host_function!(runtime, "inc", host_inc, "Add one to the number.");
    add_host_function!(runtime, "dec", host_dec, "Subtract one from the number.");
    add_host_function!(runtime, "str", host_str, "Concatenate the values as text.");

    add_host_function!(
        runtime,
        "vector",
        |_: &mut Runtime, args: Vec<Value>| Ok(Value::vector(args)),
        "Make a vector of the arguments."
    );

    add_host_function!(
        runtime,
        "list",
        |_: &mut Runtime, args: Vec<Value>| Ok(Value::list(args)),
        "Make a list of the arguments."
    );

    add_host_function!(runtime, "count", host_count, "The number of items in the collection.");
    add_host_function!(runtime, "first", host_first, "The first item of the collection, or nil.");
    add_host_function!(runtime, "rest", host_rest, "Everything after the first item, as a list.");
    add_host_function!(runtime, "nth", host_nth, "The item at the given index.");
    add_host_function!(runtime, "get", host_get, "Look up a key in a map or an index in a vector.");
}
