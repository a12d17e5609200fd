/// Module contains the Value enumeration and it's implementation.  Values represent both the host
/// language's data and the words and quotations layered on top of it.
pub mod value;

/// The data stack that words and quotations communicate through.
pub mod stack;

/// Words and quotations, the concatenative callables.
pub mod word;

/// Namespaces, vars and the metadata attached to them.
pub mod environment;
