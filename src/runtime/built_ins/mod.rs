/// Words that manipulate the data stack.
pub mod stack_words;

/// Arithmetic, comparison and logic words.
pub mod arithmetic_words;

/// Words that invoke quotations.
pub mod combinator_words;

/// Host functions that emitted code uses to reach the data stack.
pub mod intrinsics;

use crate::runtime::{
    built_ins::{
        arithmetic_words::register_arithmetic_words,
        combinator_words::register_combinator_words, intrinsics::register_intrinsics,
        stack_words::register_stack_words,
    },
    interpreter::Runtime,
};

/// Simplify registering a native word with the runtime.
///
/// Required parameters are the runtime to register with, the name of the word, the handler to run
/// when the word is invoked, a simple description of the word and the word's stack signature.
/// The word is bound under its mangled name in the core namespace and records where in the Rust
/// code it was registered from.
#[macro_export]
macro_rules! add_native_word {
    (
        $runtime:expr ,
        $name:expr ,
        $function:expr ,
        $description:expr ,
        $signature:expr
    ) => {{
        use std::rc::Rc;
        use $crate::runtime::{
            data_structures::{
                environment::Metadata,
                value::Value,
                word::{Word, WordBody},
            },
            error,
            interpreter::Runtime,
            names::{mangle, CORE_NAMESPACE},
        };

        let handler = $function;
        let body: WordBody = Rc::new(move |runtime: &mut Runtime| -> error::Result<Value> {
            handler(runtime)?;
            Ok(Value::StackVoid)
        });

        let stack_effect = Value::vector($signature.split_whitespace().map(Value::symbol).collect());
        let meta = Metadata::for_word(&stack_effect, Some($description));

        let word = Word::new(
            $name,
            Some(stack_effect),
            body,
            meta.clone(),
            $crate::location_here!(),
        );

        $runtime.environment_mut().bind_in(
            CORE_NAMESPACE,
            &mangle($name),
            Some(Value::Word(Rc::new(word))),
            meta,
        );
    }};
}

/// Called to register all of the native words and intrinsics of the language.
pub fn register_core_words(runtime: &mut Runtime) {
    register_stack_words(runtime);
    register_arithmetic_words(runtime);
    register_combinator_words(runtime);
    register_intrinsics(runtime);
}
