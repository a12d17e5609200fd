//! Gershwin, a concatenative stack language layered over a small Clojure flavoured host language.

/// Module for the managing source code, reading forms and compiling them.
#[macro_use]
pub mod lang;

/// Module for the runtime and the data structures used by it.  As well as the native words.
#[macro_use]
pub mod runtime;

/// The host language the concatenative core is layered over.
#[macro_use]
pub mod host;
