use crate::{
    host::{BasicHost, Host},
    lang::{compilation::analyze, forms::Form, source_buffer::SourceLocation},
    runtime::{
        built_ins::register_core_words,
        data_structures::{
            environment::{Environment, Metadata},
            stack::Stack,
            value::Value,
        },
        error::{self, host_error},
        names::CORE_NAMESPACE,
    },
};
use std::rc::Rc;

/// Runtime settings, where compiled artifacts go.
pub mod config;

/// The load, compile and evaluate entry points.
pub mod driver;

/// The interactive read, evaluate, print loop.
pub mod repl;

pub use config::Config;

/// Everything a running program can touch: the data stack, the binding environment and the host
/// that evaluates host forms.  Independent runtimes share nothing.
pub struct Runtime {
    stack: Stack,
    environment: Environment,
    host: Rc<dyn Host>,
    config: Config,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime::new(Rc::new(BasicHost::new()), Config::default())
    }
}

impl Runtime {
    /// Create a runtime around the given host.  The host's functions, the core bindings and the
    /// core words are all registered before it's returned.
    pub fn new(host: Rc<dyn Host>, config: Config) -> Runtime {
        let mut runtime = Runtime {
            stack: Stack::new(),
            environment: Environment::new(),
            host: host.clone(),
            config,
        };

        host.install(&mut runtime);

        runtime.environment.bind_in(
            CORE_NAMESPACE,
            "stack-void",
            Some(Value::StackVoid),
            Metadata::new(),
        );

        register_core_words(&mut runtime);

        runtime
    }

    /// A runtime using the built in host.
    pub fn with_config(config: Config) -> Runtime {
        Runtime::new(Rc::new(BasicHost::new()), config)
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Push a value onto the data stack.
    pub fn push(&mut self, value: Value) {
        let _ = self.stack.push_mutable(value);
    }

    /// Pop the top value off of the data stack.
    pub fn pop(&mut self) -> error::Result<Value> {
        self.stack.pop_it()
    }

    /// Push the result of a host evaluation, ignoring the "no value" sentinel.
    pub fn conj_it(&mut self, value: Value) {
        self.stack.conj_it(value);
    }

    /// Hand a host form to the host for evaluation.
    pub fn evaluate_host(&mut self, form: &Value) -> error::Result<Value> {
        let host = self.host.clone();
        host.evaluate(self, form)
    }

    /// Run a word, quotation or host function that takes no arguments.  Vars are followed to
    /// their values.
    pub fn invoke(&mut self, callee: &Value) -> error::Result<Value> {
        match callee {
            Value::Word(word) => word.clone().invoke(self),
            Value::Quotation(quotation) => quotation.clone().invoke(self),

            Value::Var(var) => match var.value() {
                Some(value) => {
                    let value = value.clone();
                    self.invoke(&value)
                }

                None => host_error(format!(
                    "Attempting to invoke unbound var: #'{}/{}",
                    var.namespace(),
                    var.name()
                )),
            },

            Value::Function(_) | Value::Closure(_) => self.apply(callee, Vec::new()),

            _ => host_error(format!("{} can not be invoked", callee)),
        }
    }

    /// Call a host callable with arguments.  Words and quotations can be called as long as no
    /// arguments are given.  Keywords look themselves up in a map.
    pub fn apply(&mut self, callee: &Value, args: Vec<Value>) -> error::Result<Value> {
        match callee {
            Value::Function(function) => {
                let function = function.clone();
                (function.handler)(self, args)
            }

            Value::Closure(closure) => {
                let host = self.host.clone();
                let closure = closure.clone();

                host.apply_closure(self, &closure, args)
            }

            Value::Word(_) | Value::Quotation(_) | Value::Var(_) if args.is_empty() => {
                self.invoke(callee)
            }

            Value::Var(var) => match var.value() {
                Some(value) => {
                    let value = value.clone();
                    self.apply(&value, args)
                }

                None => self.invoke(callee),
            },

            Value::Keyword(_) => match args.as_slice() {
                [Value::Map(map)] => Ok(map.get(callee).cloned().unwrap_or(Value::Nil)),
                [_] => Ok(Value::Nil),
                _ => host_error(format!("Wrong number of args ({}) passed to {}", args.len(), callee)),
            },

            _ => host_error(format!("{} can not be called as a function", callee)),
        }
    }

    /// Evaluate a value as though it had been read as a top level form.
    pub fn eval_value(&mut self, value: &Value) -> error::Result<Value> {
        let location = SourceLocation::new_from_path(driver::EVAL_SOURCE);
        let expr = analyze(self, &Form::Host(value.clone()), &location)?;

        expr.eval(self)
    }
}
