/// All of the core data structures used by the Gershwin runtime.
pub mod data_structures;

/// Module for defining the built-in native words that are available to every program.
pub mod built_ins;

/// Module for defining the error reporting of the runtime.
pub mod error;

/// Module for defining the runtime context and the entry points that load, compile and evaluate
/// source code.
pub mod interpreter;

/// Well known names shared by the reader, the compiler and the emitted code.
pub mod names;
