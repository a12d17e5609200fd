use crate::runtime::{
    data_structures::value::{Keyword, Symbol, Value, ValueMap},
    names::{CORE_NAMESPACE, DOC_KEY, STACK_EFFECT_KEY, USER_NAMESPACE, WORD_KEY},
};
use std::{collections::HashMap, rc::Rc};

/// The metadata attached to a binding.  Lookups are total, a binding with no metadata at all
/// simply isn't a word and has no documentation.
#[derive(Clone, Default, PartialEq)]
pub struct Metadata {
    map: ValueMap,
}

impl Metadata {
    pub fn new() -> Metadata {
        Metadata {
            map: ValueMap::new(),
        }
    }

    pub fn from_map(map: ValueMap) -> Metadata {
        Metadata { map }
    }

    /// The metadata for a word, optionally documented.
    pub fn for_word(stack_effect: &Value, doc: Option<&str>) -> Metadata {
        let metadata = Metadata::new()
            .with(&STACK_EFFECT_KEY, stack_effect.clone())
            .with(&WORD_KEY, Value::Bool(true));

        match doc {
            Some(doc) => metadata.with(&DOC_KEY, Value::String(doc.to_string())),
            None => metadata,
        }
    }

    /// Produce new metadata with the key set.
    pub fn with(&self, key: &Keyword, value: Value) -> Metadata {
        Metadata {
            map: self.map.assoc(Value::Keyword(key.clone()), value),
        }
    }

    /// Merge all of the entries of another map, the other map's entries win.
    pub fn merge(&self, other: &ValueMap) -> Metadata {
        let mut map = self.map.clone();

        for (key, value) in other.iter() {
            map = map.assoc(key.clone(), value.clone());
        }

        Metadata { map }
    }

    pub fn get(&self, key: &Keyword) -> Option<&Value> {
        self.map.get(&Value::Keyword(key.clone()))
    }

    pub fn as_map(&self) -> &ValueMap {
        &self.map
    }

    /// Does the metadata mark its binding as a word?
    pub fn is_word(&self) -> bool {
        self.get(&WORD_KEY).is_some_and(Value::is_truthy)
    }

    pub fn doc(&self) -> Option<&String> {
        match self.get(&DOC_KEY) {
            Some(Value::String(doc)) => Some(doc),
            _ => None,
        }
    }

    pub fn stack_effect(&self) -> Option<&Value> {
        self.get(&STACK_EFFECT_KEY)
    }
}

/// A named binding in a namespace.  Vars are immutable, binding a name again replaces the Var so
/// anything holding the old one keeps seeing the old value.
pub struct Var {
    namespace: String,
    name: String,
    value: Option<Value>,
    meta: Metadata,
}

pub type VarRef = Rc<Var>;

impl Var {
    pub fn namespace(&self) -> &String {
        &self.namespace
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    /// The bound value, or None if the name was declared without one.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    /// Is this Var bound to a word?
    pub fn is_word(&self) -> bool {
        self.meta.is_word()
    }

    /// The fully qualified symbol that names this Var.
    pub fn symbol(&self) -> Symbol {
        Symbol::qualified(&self.namespace, &self.name)
    }
}

/// A namespace is a simple table of names to Vars.
#[derive(Default)]
pub struct Namespace {
    name: String,
    vars: HashMap<String, VarRef>,
}

impl Namespace {
    pub fn new(name: &str) -> Namespace {
        Namespace {
            name: name.to_string(),
            vars: HashMap::new(),
        }
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&VarRef> {
        self.vars.get(name)
    }
}

/// The shared binding environment.  Words and host bindings live side by side in the same
/// namespaces, the mangled names keep them apart.
pub struct Environment {
    namespaces: HashMap<String, Namespace>,
    current: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Create an environment with the core and user namespaces, the user namespace is current.
    pub fn new() -> Environment {
        let mut namespaces = HashMap::new();

        namespaces.insert(CORE_NAMESPACE.to_string(), Namespace::new(CORE_NAMESPACE));
        namespaces.insert(USER_NAMESPACE.to_string(), Namespace::new(USER_NAMESPACE));

        Environment {
            namespaces,
            current: USER_NAMESPACE.to_string(),
        }
    }

    pub fn current_namespace(&self) -> &String {
        &self.current
    }

    /// Make the named namespace current, creating it if needed.
    pub fn switch_namespace(&mut self, name: &str) {
        self.namespaces
            .entry(name.to_string())
            .or_insert_with(|| Namespace::new(name));

        self.current = name.to_string();
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    /// Bind a name in the current namespace.
    pub fn bind(&mut self, name: &str, value: Option<Value>, meta: Metadata) -> VarRef {
        let namespace = self.current.clone();
        self.bind_in(&namespace, name, value, meta)
    }

    /// Bind a name in the given namespace, creating the namespace if needed.  Any earlier binding
    /// of the name is replaced.
    pub fn bind_in(
        &mut self,
        namespace: &str,
        name: &str,
        value: Option<Value>,
        meta: Metadata,
    ) -> VarRef {
        let var = Rc::new(Var {
            namespace: namespace.to_string(),
            name: name.to_string(),
            value,
            meta,
        });

        self.namespaces
            .entry(namespace.to_string())
            .or_insert_with(|| Namespace::new(namespace))
            .vars
            .insert(name.to_string(), var.clone());

        var
    }

    /// Look up an unqualified name, first in the current namespace then in the core namespace.
    pub fn lookup(&self, name: &str) -> Option<VarRef> {
        self.namespaces
            .get(&self.current)
            .and_then(|namespace| namespace.get(name))
            .or_else(|| {
                self.namespaces
                    .get(CORE_NAMESPACE)
                    .and_then(|namespace| namespace.get(name))
            })
            .cloned()
    }

    /// Resolve a symbol.  A qualified symbol is only looked for in its own namespace.
    pub fn resolve(&self, symbol: &Symbol) -> Option<VarRef> {
        match symbol.namespace() {
            Some(namespace) => self
                .namespaces
                .get(namespace)
                .and_then(|found| found.get(symbol.name()))
                .cloned(),

            None => self.lookup(symbol.name()),
        }
    }
}
