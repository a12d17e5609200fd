use crate::runtime::data_structures::value::Value;
use std::fmt::{self, Display, Formatter};

/// A unit of source produced by the reader.  Host literals pass through untouched, the two
/// constructs the concatenative layer adds get their own variants.  Comments never produce a form.
#[derive(Clone, PartialEq, Debug)]
pub enum Form {
    /// Any host literal or host collection.
    Host(Value),

    /// `: name [doc-or-meta] stack-effect body... ;`
    WordDefinition(Vec<Form>),

    /// `< body... >`
    Quotation(Vec<Form>),
}

impl Display for Form {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Form::Host(value) => write!(f, "{}", value),
            Form::WordDefinition(forms) => write_forms(f, ":", forms, ";"),
            Form::Quotation(forms) => write_forms(f, "<", forms, ">"),
        }
    }
}

/// Print a delimited run of forms, `< 1 2 + >` style.
pub fn write_forms(f: &mut Formatter, open: &str, forms: &[Form], close: &str) -> fmt::Result {
    write!(f, "{}", open)?;

    for form in forms {
        write!(f, " {}", form)?;
    }

    write!(f, " {}", close)
}

impl Form {
    /// The host value, if this is a host form.
    pub fn as_host(&self) -> Option<&Value> {
        match self {
            Form::Host(value) => Some(value),
            _ => None,
        }
    }
}
