/// Module for managing the original source code and tracking locations within it.
#[macro_use]
pub mod source_buffer;

/// The raw forms produced by the reader.
pub mod forms;

/// Module for turning source text into forms.  Word definitions, quotations and comments are
/// handled here, everything else is handed to the host's literal reader.
pub mod reader;

/// Compiled word and quotation bodies, the steps they run and the host code they emit.
pub mod code;

/// Module for analyzing forms into expressions that can be evaluated directly or emitted as host
/// source.  Analysis needs the runtime so that it can tell which names refer to words.
pub mod compilation;
