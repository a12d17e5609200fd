use crate::{
    lang::{
        forms::{write_forms, Form},
        source_buffer::SourceLocation,
    },
    runtime::{
        data_structures::{environment::Metadata, value::Value},
        error,
        interpreter::Runtime,
    },
};
use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// A compiled body.  Runs each of its steps in order against the runtime and returns the value
/// produced by the last one.
pub type WordBody = Rc<dyn Fn(&mut Runtime) -> error::Result<Value>>;

/// A named, reusable callable.  Words take no arguments and return nothing directly, everything
/// goes through the data stack.
pub struct Word {
    /// The surface name of the word, not the mangled name it's bound under.
    name: String,

    /// The declared stack effect, kept as documentation.  Never checked.
    stack_effect: Option<Value>,

    body: WordBody,

    meta: Metadata,

    /// Where the word was defined, either in script source or in the Rust code for native words.
    location: SourceLocation,
}

pub type WordPtr = Rc<Word>;

impl Display for Word {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#<word {}>", self.name)
    }
}

impl Word {
    pub fn new(
        name: &str,
        stack_effect: Option<Value>,
        body: WordBody,
        meta: Metadata,
        location: SourceLocation,
    ) -> Word {
        Word {
            name: name.to_string(),
            stack_effect,
            body,
            meta,
            location,
        }
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn stack_effect(&self) -> &Option<Value> {
        &self.stack_effect
    }

    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Run the word's body.
    pub fn invoke(&self, runtime: &mut Runtime) -> error::Result<Value> {
        (self.body)(runtime)
    }
}

/// An anonymous callable that sits on the data stack as a value until something invokes it.
pub struct Quotation {
    body: WordBody,

    /// The forms the quotation was read from, kept for printing.
    forms: Option<Vec<Form>>,
}

pub type QuotationPtr = Rc<Quotation>;

impl Display for Quotation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match &self.forms {
            Some(forms) => write_forms(f, "<", forms, ">"),
            None => write!(f, "#<quotation>"),
        }
    }
}

impl Quotation {
    pub fn new(body: WordBody, forms: Option<Vec<Form>>) -> Quotation {
        Quotation { body, forms }
    }

    /// Run the quotation's body.  Whatever the body's last step hands back, other than the "no
    /// value" sentinel, is evaluated in turn as a top level form.  That evaluation does its own
    /// pushing so the caller always gets the sentinel back.
    pub fn invoke(&self, runtime: &mut Runtime) -> error::Result<Value> {
        let result = (self.body)(runtime)?;

        if !result.is_stack_void() {
            let _ = runtime.eval_value(&result)?;
        }

        Ok(Value::StackVoid)
    }
}
