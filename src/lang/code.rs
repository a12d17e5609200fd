use crate::{
    lang::{
        compilation::{analyze, Expr, HostExpr, QuotationExpr, SymbolExpr},
        forms::Form,
        source_buffer::SourceLocation,
    },
    runtime::{
        data_structures::{
            value::Value,
            word::WordBody,
        },
        error::{self, definition_error},
        interpreter::Runtime,
        names::STACK_VOID_SYMBOL,
    },
};
use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// The operations a compiled word or quotation body is made of.
#[derive(Clone)]
pub enum Op {
    /// Invoke a word.  The word was looked up when the body was compiled, redefining it later
    /// doesn't change what this body runs.
    Invoke(SymbolExpr),

    /// Construct a fresh quotation from an already compiled body and push it.
    PushQuotation(QuotationExpr),

    /// Evaluate a host form and push the result.
    PushHostResult(HostExpr),
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Op::Invoke(expr) => write!(f, "invoke       {}", expr.symbol()),
            Op::PushQuotation(expr) => write!(f, "push-quote   {}", expr),
            Op::PushHostResult(expr) => write!(f, "push-result  {}", expr.form()),
        }
    }
}

impl Op {
    /// Run the operation.  Pushes hand back the "no value" sentinel, invocations hand back
    /// whatever the word produced.
    fn execute(&self, runtime: &mut Runtime) -> error::Result<Value> {
        match self {
            Op::Invoke(expr) => runtime.invoke(expr.target()),
            Op::PushQuotation(expr) => {
                runtime.push(expr.construct());
                Ok(Value::StackVoid)
            }
            Op::PushHostResult(expr) => expr.eval_and_push(runtime),
        }
    }

    /// The host form that performs the same operation.
    fn emit_form(&self) -> Value {
        match self {
            Op::Invoke(expr) => expr.emit_form(),
            Op::PushQuotation(expr) => expr.emit_form(),
            Op::PushHostResult(expr) => expr.emit_form(),
        }
    }
}

/// A word or quotation body.  The same operations produce both the closure that runs the body
/// and the equivalent host source text.
#[derive(Clone)]
pub struct CompiledBody {
    ops: Rc<Vec<Op>>,
    location: SourceLocation,
}

impl Display for CompiledBody {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for (index, op) in self.ops.iter().enumerate() {
            writeln!(f, "{:4}  {}", index, op)?;
        }

        Ok(())
    }
}

impl CompiledBody {
    /// Compile each of the raw body forms, in order.  Bare symbols naming a word become
    /// invocations, quotation literals are compiled in place and anything else is left for the
    /// host to evaluate.
    pub fn compile(
        runtime: &Runtime,
        forms: &[Form],
        location: &SourceLocation,
    ) -> error::Result<CompiledBody> {
        let mut ops = Vec::with_capacity(forms.len());

        for form in forms {
            let op = match analyze(runtime, form, location)? {
                Expr::Symbol(expr) => Op::Invoke(expr),
                Expr::Quotation(expr) => Op::PushQuotation(expr),
                Expr::Host(expr) => Op::PushHostResult(expr),

                Expr::WordDefinition(_) => {
                    return definition_error(
                        location,
                        "Word definitions can not be nested inside a body.".to_string(),
                    );
                }
            };

            ops.push(op);
        }

        Ok(CompiledBody {
            ops: Rc::new(ops),
            location: location.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Build the closure that runs the body.  Errors raised inside the body without a location
    /// are reported at the body's definition.
    pub fn closure(&self) -> WordBody {
        let ops = self.ops.clone();
        let location = self.location.clone();

        Rc::new(move |runtime: &mut Runtime| {
            let mut result = Value::StackVoid;

            for op in ops.iter() {
                result = op
                    .execute(runtime)
                    .map_err(|error| error.with_location(&location))?;
            }

            Ok(result)
        })
    }

    /// The host function form equivalent to the body, `(fn [] ...)`.
    pub fn emit_form(&self) -> Value {
        let mut items = vec![Value::symbol("fn"), Value::vector(Vec::new())];

        if self.ops.is_empty() {
            items.push(Value::Symbol(STACK_VOID_SYMBOL.clone()));
        } else {
            items.extend(self.ops.iter().map(Op::emit_form));
        }

        Value::list(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::reader::read_all;

    fn compile(runtime: &Runtime, source: &str) -> error::Result<CompiledBody> {
        let forms = read_all("<test>", source)?;
        CompiledBody::compile(runtime, &forms, &SourceLocation::new())
    }

    #[test]
    fn words_are_invoked_and_everything_else_pushed() {
        let runtime = Runtime::default();
        let body = compile(&runtime, "1 dup (+ 1 2) < 3 >").unwrap();

        assert_eq!(body.len(), 4);
        assert_eq!(
            body.emit_form().to_string(),
            "(fn [] (gershwin.core/conj-it! 1) \
                    (gershwin.core/invoke! gershwin.core/dup__GWN__) \
                    (gershwin.core/conj-it! (+ 1 2)) \
                    (gershwin.core/conj-it! (gershwin.core/quotation \
                        (fn [] (gershwin.core/conj-it! 3)) \"< 3 >\")))"
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        );
    }

    #[test]
    fn empty_bodies_emit_stack_void() {
        let runtime = Runtime::default();
        let body = compile(&runtime, "").unwrap();

        assert!(body.is_empty());
        assert_eq!(body.emit_form().to_string(), "(fn [] gershwin.core/stack-void)");
    }

    #[test]
    fn running_the_closure_runs_each_step() {
        let mut runtime = Runtime::default();
        let body = compile(&runtime, "2 dup *").unwrap();

        let result = (body.closure())(&mut runtime).unwrap();

        assert!(result.is_stack_void());
        assert_eq!(runtime.stack().peek().unwrap(), Value::Int(4));
    }

    #[test]
    fn nested_definitions_are_rejected() {
        let runtime = Runtime::default();
        let error = compile(&runtime, "1 : inner [ ] 2 ;").err().unwrap();

        assert_eq!(error.kind(), crate::runtime::error::ErrorKind::Definition);
    }
}
