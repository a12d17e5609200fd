/// The host's literal reader.  Numbers, strings, keywords, symbols and the host collections.
pub mod literals;

/// The library of native host functions.
pub mod functions;

use crate::runtime::{
    data_structures::{
        environment::Metadata,
        value::{Closure, Locals, Symbol, Value, ValueList, ValueMap},
    },
    error::{self, host_error},
    interpreter::Runtime,
    names::DOC_KEY,
};
use std::rc::Rc;

/// The capability the concatenative core needs from the language it is layered over.  The core
/// treats evaluation as a black box, everything it knows about host semantics goes through here.
pub trait Host {
    /// Evaluate a host form and return its value.
    fn evaluate(&self, runtime: &mut Runtime, form: &Value) -> error::Result<Value>;

    /// Call a host closure with the given arguments.
    fn apply_closure(
        &self,
        runtime: &mut Runtime,
        closure: &Closure,
        args: Vec<Value>,
    ) -> error::Result<Value>;

    /// Bind the host's native functions into a freshly created runtime.
    fn install(&self, runtime: &mut Runtime);
}

/// A small Clojure flavoured evaluator.  Enough of a host to run programs, their tests and the
/// code emitted when compiling them ahead of time.
#[derive(Default)]
pub struct BasicHost;

impl BasicHost {
    pub fn new() -> BasicHost {
        BasicHost
    }

    fn eval(&self, runtime: &mut Runtime, form: &Value, locals: &Locals) -> error::Result<Value> {
        match form {
            Value::Symbol(symbol) => self.resolve_symbol(runtime, symbol, locals),

            Value::List(items) if items.is_empty() => Ok(form.clone()),
            Value::List(items) => self.eval_list(runtime, items, locals),

            Value::Vector(items) => {
                let evaluated = items
                    .iter()
                    .map(|item| self.eval(runtime, item, locals))
                    .collect::<error::Result<ValueList>>()?;

                Ok(Value::Vector(evaluated))
            }

            Value::Map(map) => {
                let mut evaluated = ValueMap::new();

                for (key, value) in map.iter() {
                    let key = self.eval(runtime, key, locals)?;
                    let value = self.eval(runtime, value, locals)?;

                    evaluated = evaluated.assoc(key, value);
                }

                Ok(Value::Map(evaluated))
            }

            _ => Ok(form.clone()),
        }
    }

    fn eval_body(
        &self,
        runtime: &mut Runtime,
        forms: &[Value],
        locals: &Locals,
    ) -> error::Result<Value> {
        let mut result = Value::Nil;

        for form in forms {
            result = self.eval(runtime, form, locals)?;
        }

        Ok(result)
    }

    fn resolve_symbol(
        &self,
        runtime: &mut Runtime,
        symbol: &Symbol,
        locals: &Locals,
    ) -> error::Result<Value> {
        if !symbol.is_qualified() {
            if let Some(value) = locals.get(symbol.name()) {
                return Ok(value.clone());
            }
        }

        match runtime.environment().resolve(symbol) {
            Some(var) => match var.value() {
                Some(value) => Ok(value.clone()),
                None => host_error(format!(
                    "Attempting to use unbound var: #'{}/{}",
                    var.namespace(),
                    var.name()
                )),
            },

            None => host_error(format!("Unable to resolve symbol: {} in this context", symbol)),
        }
    }

    fn eval_list(
        &self,
        runtime: &mut Runtime,
        items: &ValueList,
        locals: &Locals,
    ) -> error::Result<Value> {
        let forms: Vec<Value> = items.iter().cloned().collect();
        let (head, args) = match forms.split_first() {
            Some(split) => split,
            None => return Ok(Value::List(ValueList::new())),
        };

        if let Value::Symbol(symbol) = head {
            if !symbol.is_qualified() {
                match symbol.name().as_str() {
                    "quote" => return self.eval_quote(args),
                    "do" => return self.eval_body(runtime, args, locals),
                    "if" => return self.eval_if(runtime, args, locals),
                    "def" => return self.eval_def(runtime, args, locals),
                    "fn" => return self.eval_fn(args, locals),
                    "ns" => return self.eval_ns(runtime, args),
                    "var" => return self.eval_var(runtime, args),
                    _ => {}
                }
            }
        }

        let callee = self.eval(runtime, head, locals)?;
        let mut evaluated = Vec::with_capacity(args.len());

        for arg in args {
            evaluated.push(self.eval(runtime, arg, locals)?);
        }

        runtime.apply(&callee, evaluated)
    }

    fn eval_quote(&self, args: &[Value]) -> error::Result<Value> {
        match args {
            [quoted] => Ok(quoted.clone()),
            _ => host_error(format!("Wrong number of args ({}) passed to quote", args.len())),
        }
    }

    fn eval_if(&self, runtime: &mut Runtime, args: &[Value], locals: &Locals) -> error::Result<Value> {
        let (test, then, otherwise) = match args {
            [test, then] => (test, then, None),
            [test, then, otherwise] => (test, then, Some(otherwise)),
            _ => return host_error("Malformed if, expected (if test then else?)".to_string()),
        };

        if self.eval(runtime, test, locals)?.is_truthy() {
            self.eval(runtime, then, locals)
        } else {
            match otherwise {
                Some(otherwise) => self.eval(runtime, otherwise, locals),
                None => Ok(Value::Nil),
            }
        }
    }

    /// `(def name)`, `(def name init)` or `(def name doc-or-meta init)`.  The middle argument is
    /// evaluated and must produce a string or a map.
    fn eval_def(&self, runtime: &mut Runtime, args: &[Value], locals: &Locals) -> error::Result<Value> {
        let (name, meta, init) = match args {
            [name] => (name, None, None),
            [name, init] => (name, None, Some(init)),
            [name, meta, init] => (name, Some(meta), Some(init)),
            _ => return host_error(format!("Wrong number of args ({}) passed to def", args.len())),
        };

        let symbol = name.as_symbol()?;

        if let Some(namespace) = symbol.namespace() {
            if namespace != runtime.environment().current_namespace() {
                return host_error(format!("Can't create defs outside of current ns: {}", symbol));
            }
        }

        let metadata = match meta {
            None => Metadata::new(),
            Some(meta) => match self.eval(runtime, meta, locals)? {
                Value::String(doc) => Metadata::new().with(&DOC_KEY, Value::String(doc)),
                Value::Map(map) => Metadata::from_map(map),
                other => {
                    return host_error(format!("Expected a doc string or metadata map, found {}", other))
                }
            },
        };

        let value = match init {
            Some(init) => Some(self.eval(runtime, init, locals)?),
            None => None,
        };

        let name = symbol.name().clone();
        Ok(Value::Var(runtime.environment_mut().bind(&name, value, metadata)))
    }

    fn eval_fn(&self, args: &[Value], locals: &Locals) -> error::Result<Value> {
        let (params, body) = match args.split_first() {
            Some((Value::Vector(params), body)) => (params, body),
            _ => return host_error("Malformed fn, expected (fn [params] body...)".to_string()),
        };

        let mut names = Vec::with_capacity(params.len());

        for param in params.iter() {
            match param {
                Value::Symbol(symbol) if !symbol.is_qualified() => names.push(symbol.name().clone()),
                other => return host_error(format!("Unsupported fn parameter: {}", other)),
            }
        }

        Ok(Value::Closure(Rc::new(Closure {
            params: names,
            body: body.to_vec(),
            locals: locals.clone(),
        })))
    }

    /// `(ns name ...)` switches to the namespace, creating it if needed.  Any further clauses are
    /// ignored.
    fn eval_ns(&self, runtime: &mut Runtime, args: &[Value]) -> error::Result<Value> {
        match args.first() {
            Some(Value::Symbol(symbol)) if !symbol.is_qualified() => {
                runtime.environment_mut().switch_namespace(symbol.name());
                Ok(Value::Nil)
            }

            _ => host_error("Malformed ns, expected (ns name ...)".to_string()),
        }
    }

    fn eval_var(&self, runtime: &mut Runtime, args: &[Value]) -> error::Result<Value> {
        match args {
            [Value::Symbol(symbol)] => match runtime.environment().resolve(symbol) {
                Some(var) => Ok(Value::Var(var)),
                None => host_error(format!("Unable to resolve var: {} in this context", symbol)),
            },

            _ => host_error("Malformed var, expected (var symbol)".to_string()),
        }
    }
}

impl Host for BasicHost {
    fn evaluate(&self, runtime: &mut Runtime, form: &Value) -> error::Result<Value> {
        self.eval(runtime, form, &Locals::new())
    }

    fn apply_closure(
        &self,
        runtime: &mut Runtime,
        closure: &Closure,
        args: Vec<Value>,
    ) -> error::Result<Value> {
        if args.len() != closure.params.len() {
            return host_error(format!("Wrong number of args ({}) passed to fn", args.len()));
        }

        let mut locals = closure.locals.clone();

        for (name, value) in closure.params.iter().zip(args) {
            locals.insert(name.clone(), value);
        }

        self.eval_body(runtime, &closure.body, &locals)
    }

    fn install(&self, runtime: &mut Runtime) {
        functions::register_host_functions(runtime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::literals::read_form;
    use crate::lang::source_buffer::SourceBuffer;

    fn eval(runtime: &mut Runtime, source: &str) -> error::Result<Value> {
        let mut buffer = SourceBuffer::new("<test>", source);
        buffer.skip_whitespace();

        let form = read_form(&mut buffer)?;
        runtime.evaluate_host(&form)
    }

    #[test]
    fn evaluates_special_forms() {
        let mut runtime = Runtime::default();

        assert_eq!(eval(&mut runtime, "(quote (a b))").unwrap().to_string(), "(a b)");
        assert_eq!(eval(&mut runtime, "(if nil 1 2)").unwrap(), Value::Int(2));
        assert_eq!(eval(&mut runtime, "(do 1 2 3)").unwrap(), Value::Int(3));
        assert_eq!(eval(&mut runtime, "((fn [x y] (+ x y)) 3 4)").unwrap(), Value::Int(7));
    }

    #[test]
    fn closures_capture_locals() {
        let mut runtime = Runtime::default();

        let value = eval(&mut runtime, "(((fn [x] (fn [y] (* x y))) 6) 7)").unwrap();
        assert_eq!(value, Value::Int(42));
    }

    #[test]
    fn def_binds_in_the_current_namespace() {
        let mut runtime = Runtime::default();

        let var = eval(&mut runtime, "(def answer \"The answer.\" 42)").unwrap();
        assert!(var.is_var());

        assert_eq!(eval(&mut runtime, "answer").unwrap(), Value::Int(42));
        assert_eq!(eval(&mut runtime, "user/answer").unwrap(), Value::Int(42));

        let found = runtime.environment().lookup("answer").unwrap();
        assert_eq!(found.meta().doc().map(String::as_str), Some("The answer."));
    }

    #[test]
    fn ns_switches_namespaces() {
        let mut runtime = Runtime::default();

        assert_eq!(eval(&mut runtime, "(ns demo.other)").unwrap(), Value::Nil);
        assert_eq!(runtime.environment().current_namespace(), "demo.other");

        eval(&mut runtime, "(def x 1)").unwrap();
        assert!(eval(&mut runtime, "user/x").is_err());
        assert_eq!(eval(&mut runtime, "demo.other/x").unwrap(), Value::Int(1));
    }

    #[test]
    fn unknown_symbols_are_host_errors() {
        let mut runtime = Runtime::default();
        let error = eval(&mut runtime, "nothing-here").unwrap_err();

        assert_eq!(error.kind(), crate::runtime::error::ErrorKind::Host);
    }
}
