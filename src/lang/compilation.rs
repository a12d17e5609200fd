use crate::{
    lang::{
        code::CompiledBody,
        forms::{write_forms, Form},
        reader::read_all,
        source_buffer::SourceLocation,
    },
    runtime::{
        data_structures::{
            environment::Metadata,
            value::{Symbol, Value, ValueMap},
            word::{Quotation, Word},
        },
        error::{self, definition_error},
        interpreter::Runtime,
        names::{
            mangle, CONJ_IT_SYMBOL, INVOKE_SYMBOL, QUOTATION_SYMBOL, STACK_VOID_SYMBOL,
        },
    },
};
use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};
use tracing::debug;

/// The analyzed form of a top level form.  There are exactly four kinds.
#[derive(Clone)]
pub enum Expr {
    WordDefinition(WordDefinitionExpr),
    Quotation(QuotationExpr),
    Symbol(SymbolExpr),
    Host(HostExpr),
}

impl Expr {
    /// Execute the expression against the runtime.
    pub fn eval(&self, runtime: &mut Runtime) -> error::Result<Value> {
        match self {
            Expr::WordDefinition(expr) => expr.eval(runtime),
            Expr::Quotation(expr) => expr.eval(runtime),
            Expr::Symbol(expr) => expr.eval(runtime),
            Expr::Host(expr) => expr.eval(runtime),
        }
    }

    /// The host form that does the same thing as evaluating the expression.
    pub fn emit_form(&self, runtime: &Runtime) -> error::Result<Value> {
        match self {
            Expr::WordDefinition(expr) => expr.emit_form(runtime),
            Expr::Quotation(expr) => Ok(expr.emit_form()),
            Expr::Symbol(expr) => Ok(expr.emit_form()),
            Expr::Host(expr) => Ok(expr.emit_form()),
        }
    }

    /// Source text equivalent to the expression, one line of a compiled artifact.
    pub fn emit(&self, runtime: &Runtime) -> error::Result<String> {
        Ok(self.emit_form(runtime)?.to_string())
    }
}

/// Classify a form.  Word definitions and quotations get their own expressions, a symbol that
/// names a word becomes an invocation, and everything else goes to the host.
pub fn analyze(runtime: &Runtime, form: &Form, location: &SourceLocation) -> error::Result<Expr> {
    match form {
        Form::WordDefinition(forms) => Ok(Expr::WordDefinition(WordDefinitionExpr::new(
            forms, location,
        )?)),

        Form::Quotation(forms) => Ok(Expr::Quotation(QuotationExpr::new(
            runtime, forms, location,
        )?)),

        Form::Host(Value::Symbol(symbol)) => Ok(analyze_symbol(runtime, symbol)),

        Form::Host(value) => Ok(Expr::Host(HostExpr::new(value.clone()))),
    }
}

/// Look for a binding under the symbol's mangled name.  A bound word is invoked, any other bound
/// value is pushed, and a symbol with no mangled binding at all is left to the host.
fn analyze_symbol(runtime: &Runtime, symbol: &Symbol) -> Expr {
    let mangled = match symbol.namespace() {
        Some(namespace) => Symbol::qualified(namespace, &mangle(symbol.name())),
        None => Symbol::new(&mangle(symbol.name())),
    };

    if let Some(var) = runtime.environment().resolve(&mangled) {
        if let Some(value) = var.value() {
            if var.is_word() {
                return Expr::Symbol(SymbolExpr {
                    symbol: var.symbol(),
                    target: value.clone(),
                });
            }

            return Expr::Host(HostExpr::new(Value::Symbol(var.symbol())));
        }
    }

    Expr::Host(HostExpr::new(Value::Symbol(symbol.clone())))
}

/// Apply the push rule to the result of evaluating a host form.  A Var bound to a word is invoked,
/// anything else is pushed unless it's the "no value" sentinel.
pub fn push_host_result(runtime: &mut Runtime, value: Value) -> error::Result<Value> {
    if let Value::Var(var) = &value {
        if var.is_word() && var.value().is_some() {
            return runtime.invoke(&value);
        }
    }

    runtime.conj_it(value);
    Ok(Value::StackVoid)
}

/// A list form whose head is the given special symbol.
fn list_headed_by(value: &Value, head: &str) -> bool {
    match value {
        Value::List(items) => {
            matches!(items.front(), Some(Value::Symbol(symbol)) if !symbol.is_qualified()
                                                                 && symbol.name() == head)
        }
        _ => false,
    }
}

/// `(do form gershwin.core/stack-void)`
fn with_stack_void(form: Value) -> Value {
    Value::list(vec![
        Value::symbol("do"),
        form,
        Value::Symbol(STACK_VOID_SYMBOL.clone()),
    ])
}

/// `(gershwin.core/conj-it! form)`
fn with_conj_it(form: Value) -> Value {
    Value::list(vec![Value::Symbol(CONJ_IT_SYMBOL.clone()), form])
}

/// `: name [doc-or-meta] stack-effect body... ;`
#[derive(Clone)]
pub struct WordDefinitionExpr {
    name: String,
    doc: Option<String>,
    meta: ValueMap,
    stack_effect: Value,
    body: Vec<Form>,
    location: SourceLocation,
}

impl WordDefinitionExpr {
    /// Pull the definition apart.  The shape is checked here so a malformed definition is reported
    /// as soon as it's analyzed.
    pub fn new(forms: &[Form], location: &SourceLocation) -> error::Result<WordDefinitionExpr> {
        if forms.len() < 3 {
            return definition_error(
                location,
                format!(
                    "Too few forms in word definition, expected a name, a stack effect and a \
                     body, found {}.",
                    forms.len()
                ),
            );
        }

        let name = match &forms[0] {
            Form::Host(Value::Symbol(symbol)) if !symbol.is_qualified() => symbol.name().clone(),
            other => {
                return definition_error(
                    location,
                    format!("First form of a word definition must be a bare name, found {}.", other),
                );
            }
        };

        let (doc, meta, rest) = match &forms[1] {
            Form::Host(Value::String(doc)) => (Some(doc.clone()), ValueMap::new(), &forms[2..]),
            Form::Host(Value::Map(map)) => (None, map.clone(), &forms[2..]),
            _ => (None, ValueMap::new(), &forms[1..]),
        };

        let stack_effect = match rest.first() {
            Some(Form::Host(effect)) if effect.is_collection() => effect.clone(),
            Some(other) => {
                return definition_error(
                    location,
                    format!("Stack effect of word {} must be a collection, found {}.", name, other),
                );
            }
            None => {
                return definition_error(location, format!("Word {} has no stack effect.", name));
            }
        };

        let body = rest[1..].to_vec();
        reject_nested_definitions(&body, location)?;

        Ok(WordDefinitionExpr {
            name,
            doc,
            meta,
            stack_effect,
            body,
            location: location.clone(),
        })
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    /// The metadata the word is bound with.  User supplied entries first, then the stack effect,
    /// the word marker and the documentation.
    fn metadata(&self) -> Metadata {
        let word = Metadata::for_word(&self.stack_effect, self.doc.as_deref());

        Metadata::from_map(self.meta.clone()).merge(word.as_map())
    }

    fn definition_form(&self, body: &CompiledBody) -> Value {
        let def = Value::list(vec![
            Value::symbol("def"),
            Value::symbol(&mangle(&self.name)),
            Value::list(vec![
                Value::symbol("quote"),
                Value::Map(self.metadata().as_map().clone()),
            ]),
            body.emit_form(),
        ]);

        with_stack_void(def)
    }

    /// Compile the body, bind the new word under its mangled name and return it.
    fn eval(&self, runtime: &mut Runtime) -> error::Result<Value> {
        let body = CompiledBody::compile(runtime, &self.body, &self.location)?;
        let metadata = self.metadata();

        let word = Word::new(
            &self.name,
            Some(self.stack_effect.clone()),
            body.closure(),
            metadata.clone(),
            self.location.clone(),
        );

        let word = Value::Word(Rc::new(word));
        let var = runtime
            .environment_mut()
            .bind(&mangle(&self.name), Some(word.clone()), metadata);

        debug!(word = %self.name,
               var = %var.symbol(),
               location = %self.location,
               "Defined word.");

        Ok(word)
    }

    fn emit_form(&self, runtime: &Runtime) -> error::Result<Value> {
        let body = CompiledBody::compile(runtime, &self.body, &self.location)?;
        Ok(self.definition_form(&body))
    }
}

fn reject_nested_definitions(forms: &[Form], location: &SourceLocation) -> error::Result<()> {
    for form in forms {
        match form {
            Form::WordDefinition(_) => {
                return definition_error(
                    location,
                    "Word definitions can not be nested inside a body.".to_string(),
                );
            }

            Form::Quotation(inner) => reject_nested_definitions(inner, location)?,
            Form::Host(_) => {}
        }
    }

    Ok(())
}

/// `< body... >`  The body is compiled as soon as the expression is created so that quotations
/// nested in other bodies are fully resolved first.
#[derive(Clone)]
pub struct QuotationExpr {
    forms: Rc<Vec<Form>>,
    body: CompiledBody,
}

impl Display for QuotationExpr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write_forms(f, "<", &self.forms, ">")
    }
}

impl QuotationExpr {
    pub fn new(
        runtime: &Runtime,
        forms: &[Form],
        location: &SourceLocation,
    ) -> error::Result<QuotationExpr> {
        reject_nested_definitions(forms, location)?;

        Ok(QuotationExpr {
            forms: Rc::new(forms.to_vec()),
            body: CompiledBody::compile(runtime, forms, location)?,
        })
    }

    /// A new Quotation value.  Every evaluation of the literal makes a new one.
    pub fn construct(&self) -> Value {
        let quotation = Quotation::new(self.body.closure(), Some(self.forms.as_ref().clone()));

        Value::Quotation(Rc::new(quotation))
    }

    fn eval(&self, runtime: &mut Runtime) -> error::Result<Value> {
        let quotation = self.construct();
        runtime.push(quotation.clone());

        Ok(quotation)
    }

    /// `(gershwin.core/conj-it! (gershwin.core/quotation (fn [] ...) "< ... >"))`
    pub fn emit_form(&self) -> Value {
        with_conj_it(Value::list(vec![
            Value::Symbol(QUOTATION_SYMBOL.clone()),
            self.body.emit_form(),
            Value::String(self.to_string()),
        ]))
    }
}

/// Rebuild the forms of a quotation from their printed text.
pub fn quotation_forms(text: &str) -> error::Result<Vec<Form>> {
    match read_all("<quotation>", text)?.as_slice() {
        [Form::Quotation(forms)] => Ok(forms.clone()),
        _ => error::host_error(format!("Not the text of a quotation: {}", text)),
    }
}

/// A reference to a word, resolved when the expression was analyzed.
#[derive(Clone)]
pub struct SymbolExpr {
    /// The qualified, mangled name of the word's binding.
    symbol: Symbol,

    /// The value bound to that name at analysis time.
    target: Value,
}

impl SymbolExpr {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn target(&self) -> &Value {
        &self.target
    }

    fn eval(&self, runtime: &mut Runtime) -> error::Result<Value> {
        runtime.invoke(&self.target)
    }

    /// `(gershwin.core/invoke! ns/name__GWN__)`
    pub fn emit_form(&self) -> Value {
        Value::list(vec![
            Value::Symbol(INVOKE_SYMBOL.clone()),
            Value::Symbol(self.symbol.clone()),
        ])
    }
}

/// Any other form, evaluated by the host.
#[derive(Clone)]
pub struct HostExpr {
    form: Value,

    /// Namespace declarations are wrapped so they never touch the stack.
    is_namespace: bool,
}

impl HostExpr {
    pub fn new(form: Value) -> HostExpr {
        if list_headed_by(&form, "ns") {
            HostExpr {
                form: with_stack_void(form),
                is_namespace: true,
            }
        } else {
            HostExpr {
                form,
                is_namespace: false,
            }
        }
    }

    pub fn form(&self) -> &Value {
        &self.form
    }

    /// Evaluate the form, apply the push rule and return the evaluated value.
    fn eval(&self, runtime: &mut Runtime) -> error::Result<Value> {
        let result = runtime.evaluate_host(&self.form)?;
        let _ = push_host_result(runtime, result.clone())?;

        Ok(result)
    }

    /// Evaluate the form and apply the push rule, as a step of a compiled body.
    pub fn eval_and_push(&self, runtime: &mut Runtime) -> error::Result<Value> {
        let result = runtime.evaluate_host(&self.form)?;
        push_host_result(runtime, result)
    }

    /// `(gershwin.core/conj-it! form)`, or the wrapped form itself for a namespace declaration.
    pub fn emit_form(&self) -> Value {
        if self.is_namespace {
            self.form.clone()
        } else {
            with_conj_it(self.form.clone())
        }
    }
}
