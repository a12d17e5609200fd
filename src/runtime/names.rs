use crate::runtime::data_structures::value::{Keyword, Symbol};
use lazy_static::lazy_static;

/// Suffix appended to a word's name to form the name it is bound under.  Keeps a word named `foo`
/// from colliding with a host binding also named `foo`.
pub const WORD_SUFFIX: &str = "__GWN__";

/// The program entry point.  Bound under its own name, never mangled.
pub const ENTRY_POINT: &str = "-main";

/// Namespace holding the native words, host functions and the intrinsics used by emitted code.
pub const CORE_NAMESPACE: &str = "gershwin.core";

/// The namespace that is current when a runtime starts.
pub const USER_NAMESPACE: &str = "user";

lazy_static! {
    /// Metadata key for a word's documentation string.
    pub static ref DOC_KEY: Keyword = Keyword::new("doc");

    /// Metadata key mirroring a word's declared stack effect.
    pub static ref STACK_EFFECT_KEY: Keyword = Keyword::new("stack-effect");

    /// Metadata key that marks a binding as a word.
    pub static ref WORD_KEY: Keyword = Keyword::new("word");

    /// Keywords that end an interactive session.
    pub static ref EXIT_KEYWORD: Keyword = Keyword::qualified(CORE_NAMESPACE, "exit");
    pub static ref QUIT_KEYWORD: Keyword = Keyword::qualified(CORE_NAMESPACE, "quit");

    /// Core bindings referenced by emitted code.
    pub static ref STACK_VOID_SYMBOL: Symbol = Symbol::qualified(CORE_NAMESPACE, "stack-void");
    pub static ref CONJ_IT_SYMBOL: Symbol = Symbol::qualified(CORE_NAMESPACE, "conj-it!");
    pub static ref INVOKE_SYMBOL: Symbol = Symbol::qualified(CORE_NAMESPACE, "invoke!");
    pub static ref QUOTATION_SYMBOL: Symbol = Symbol::qualified(CORE_NAMESPACE, "quotation");
}

/// The name a word is bound under in the environment.
pub fn mangle(name: &str) -> String {
    if name == ENTRY_POINT {
        name.to_string()
    } else {
        format!("{}{}", name, WORD_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_point_is_never_mangled() {
        assert_eq!(mangle("double"), "double__GWN__");
        assert_eq!(mangle(ENTRY_POINT), "-main");
    }
}
