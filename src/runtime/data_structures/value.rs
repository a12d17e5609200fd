#![allow(clippy::collapsible_match)]

use std::{ fmt::{ self,
                   Display,
                   Formatter },
           rc::Rc };
use crate::runtime::{ data_structures::{ environment::VarRef,
                                         word::{ QuotationPtr,
                                                 WordPtr } },
                      error::{ self,
                               host_error },
                      interpreter::Runtime };



/// An ordered, persistent sequence of values.  Used for host lists and vectors.
pub type ValueList = im::Vector<Value>;


/// The local bindings visible to a host function body.
pub type Locals = im::HashMap<String, Value>;


/// The handler of a native host function.
pub type HostFunction = Box<dyn Fn(&mut Runtime, Vec<Value>) -> error::Result<Value>>;



/// A host symbol, optionally qualified by a namespace as in `ns/name`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Symbol
{
    namespace: Option<String>,
    name: String
}


impl Display for Symbol
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match &self.namespace
        {
            Some(namespace) => write!(f, "{}/{}", namespace, self.name),
            None => write!(f, "{}", self.name)
        }
    }
}


impl Symbol
{
    /// Parse the text of a symbol, splitting out the namespace if there is one.  A lone `/` is
    /// the division symbol, not an empty qualified name.
    pub fn parse(text: &str) -> Symbol
    {
        let (namespace, name) = split_qualified(text);
        Symbol { namespace, name }
    }

    /// Create an unqualified symbol.
    pub fn new(name: &str) -> Symbol
    {
        Symbol { namespace: None, name: name.to_string() }
    }

    /// Create a symbol qualified with the given namespace.
    pub fn qualified(namespace: &str, name: &str) -> Symbol
    {
        Symbol { namespace: Some(namespace.to_string()), name: name.to_string() }
    }

    pub fn namespace(&self) -> &Option<String>
    {
        &self.namespace
    }

    pub fn name(&self) -> &String
    {
        &self.name
    }

    pub fn is_qualified(&self) -> bool
    {
        self.namespace.is_some()
    }
}



/// A host keyword, `:name` or `:ns/name`.  Keywords evaluate to themselves.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Keyword
{
    namespace: Option<String>,
    name: String
}


impl Display for Keyword
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match &self.namespace
        {
            Some(namespace) => write!(f, ":{}/{}", namespace, self.name),
            None => write!(f, ":{}", self.name)
        }
    }
}


impl Keyword
{
    /// Parse the text of a keyword, without the leading colon.
    pub fn parse(text: &str) -> Keyword
    {
        let (namespace, name) = split_qualified(text);
        Keyword { namespace, name }
    }

    pub fn new(name: &str) -> Keyword
    {
        Keyword { namespace: None, name: name.to_string() }
    }

    pub fn qualified(namespace: &str, name: &str) -> Keyword
    {
        Keyword { namespace: Some(namespace.to_string()), name: name.to_string() }
    }

    pub fn namespace(&self) -> &Option<String>
    {
        &self.namespace
    }

    pub fn name(&self) -> &String
    {
        &self.name
    }
}


fn split_qualified(text: &str) -> (Option<String>, String)
{
    match text.find('/')
    {
        Some(index) if index > 0 && index + 1 < text.len() =>
            (Some(text[..index].to_string()), text[index + 1..].to_string()),

        _ => (None, text.to_string())
    }
}



/// A host map literal.  Entries keep their insertion order for printing but equality ignores
/// order.
#[derive(Clone, Default)]
pub struct ValueMap
{
    entries: im::Vector<(Value, Value)>
}


impl PartialEq for ValueMap
{
    fn eq(&self, other: &ValueMap) -> bool
    {
        self.len() == other.len()
            && self.entries.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}


impl Display for ValueMap
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{{")?;

        for (index, (key, value)) in self.entries.iter().enumerate()
        {
            if index > 0
            {
                write!(f, ", ")?;
            }

            write!(f, "{} {}", key, value)?;
        }

        write!(f, "}}")
    }
}


impl ValueMap
{
    pub fn new() -> ValueMap
    {
        ValueMap { entries: im::Vector::new() }
    }

    /// Build a map from a flat list of alternating keys and values.  Later keys replace earlier
    /// ones.
    pub fn from_pairs(items: &[Value]) -> ValueMap
    {
        let mut map = ValueMap::new();

        for pair in items.chunks(2)
        {
            if let [ key, value ] = pair
            {
                map = map.assoc(key.clone(), value.clone());
            }
        }

        map
    }

    /// Look up the value stored under a key.
    pub fn get(&self, key: &Value) -> Option<&Value>
    {
        self.entries.iter().find(|(found, _)| found == key).map(|(_, value)| value)
    }

    /// Produce a new map with the key set to the given value.
    pub fn assoc(&self, key: Value, value: Value) -> ValueMap
    {
        let mut entries = self.entries.clone();

        match entries.iter().position(|(found, _)| *found == key)
        {
            Some(index) => { entries.set(index, (key, value)); },
            None => entries.push_back((key, value))
        }

        ValueMap { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)>
    {
        self.entries.iter()
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }
}



/// A function implemented natively in Rust and callable from host code.
pub struct NativeFunction
{
    /// The name the function was registered under, used when printing.
    pub name: String,

    /// The function handler.
    pub handler: HostFunction
}


pub type NativeFunctionPtr = Rc<NativeFunction>;



/// A host function created by evaluating a `(fn [params] body...)` form.  The closure captures the
/// local bindings that were visible when it was created.
pub struct Closure
{
    pub params: Vec<String>,
    pub body: Vec<Value>,
    pub locals: Locals
}


pub type ClosurePtr = Rc<Closure>;



/// Core value enumeration.  Used to represent both the host language's data, which is also its
/// code, and the runtime values that the concatenative layer adds on top of it.
#[derive(Clone)]
pub enum Value
{
    /// The host's nil value.
    Nil,

    Bool(bool),

    /// We have an integer value.  Represented as an i64.
    Int(i64),

    /// A floating-point value  Represented as a f64.
    Float(f64),

    String(String),

    Keyword(Keyword),

    Symbol(Symbol),

    /// A host list, `(a b c)`.  When evaluated a non-empty list is an application or special form.
    List(ValueList),

    /// A host vector, `[a b c]`.
    Vector(ValueList),

    /// A host map, `{k v}`.
    Map(ValueMap),

    /// A binding in the environment.  Returned by `def` and used to detect references to words.
    Var(VarRef),

    /// A native host function.
    Function(NativeFunctionPtr),

    /// A host closure.
    Closure(ClosurePtr),

    /// A named, reusable, stack based callable.
    Word(WordPtr),

    /// An anonymous stack based callable.
    Quotation(QuotationPtr),

    /// The "no value produced" sentinel.  It is never placed on the data stack.
    StackVoid
}


/// Convert an arbitrary data type to a Value.
pub trait ToValue
{
    /// Implement to handle the actual conversion.
    fn to_value(&self) -> Value;
}


impl ToValue for &str
{
    fn to_value(&self) -> Value
    {
        Value::String(self.to_string())
    }
}


impl ToValue for usize
{
    fn to_value(&self) -> Value
    {
        Value::Int(*self as i64)
    }
}


/// Allow code to create a default Value object.
impl Default for Value
{
    fn default() -> Value
    {
        Value::Nil
    }
}


/// Equality follows the host's rules.  Numbers of different types are never equal, lists and
/// vectors with the same elements are.  Functions, words and quotations compare by identity.
impl PartialEq for Value
{
    fn eq(&self, other: &Value) -> bool
    {
        match ( self, other )
        {
            ( Value::Nil,           Value::Nil           ) => true,
            ( Value::Bool(a),       Value::Bool(b)       ) => a == b,
            ( Value::Int(a),        Value::Int(b)        ) => a == b,
            ( Value::Float(a),      Value::Float(b)      ) => a == b,
            ( Value::String(a),     Value::String(b)     ) => a == b,
            ( Value::Keyword(a),    Value::Keyword(b)    ) => a == b,
            ( Value::Symbol(a),     Value::Symbol(b)     ) => a == b,
            ( Value::Map(a),        Value::Map(b)        ) => a == b,
            ( Value::Var(a),        Value::Var(b)        ) => Rc::ptr_eq(a, b),
            ( Value::Function(a),   Value::Function(b)   ) => Rc::ptr_eq(a, b),
            ( Value::Closure(a),    Value::Closure(b)    ) => Rc::ptr_eq(a, b),
            ( Value::Word(a),       Value::Word(b)       ) => Rc::ptr_eq(a, b),
            ( Value::Quotation(a),  Value::Quotation(b)  ) => Rc::ptr_eq(a, b),
            ( Value::StackVoid,     Value::StackVoid     ) => true,

            ( Value::List(a) | Value::Vector(a), Value::List(b) | Value::Vector(b) ) => a == b,

            _ => false
        }
    }
}


/// Print the value in a form the host literal reader can read back, where such a form exists.
impl Display for Value
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match self
        {
            Value::Nil               => write!(f, "nil"),
            Value::Bool(value)       => write!(f, "{}", value),
            Value::Int(value)        => write!(f, "{}", value),
            Value::Float(value)      => write!(f, "{:?}", value),
            Value::String(value)     => write_string_literal(f, value),
            Value::Keyword(value)    => write!(f, "{}", value),
            Value::Symbol(value)     => write!(f, "{}", value),
            Value::List(items)       => write_sequence(f, "(", items, ")"),
            Value::Vector(items)     => write_sequence(f, "[", items, "]"),
            Value::Map(map)          => write!(f, "{}", map),
            Value::Var(var)          => write!(f, "#'{}/{}", var.namespace(), var.name()),
            Value::Function(func)    => write!(f, "#<fn {}>", func.name),
            Value::Closure(_)        => write!(f, "#<fn>"),
            Value::Word(word)        => write!(f, "{}", word),
            Value::Quotation(quote)  => write!(f, "{}", quote),
            Value::StackVoid         => write!(f, "#<stack-void>")
        }
    }
}


impl fmt::Debug for Value
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{}", self)
    }
}


fn write_string_literal(f: &mut Formatter, text: &str) -> fmt::Result
{
    write!(f, "\"")?;

    for next in text.chars()
    {
        match next
        {
            '"'  => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            _    => write!(f, "{}", next)?
        }
    }

    write!(f, "\"")
}


fn write_sequence(f: &mut Formatter, open: &str, items: &ValueList, close: &str) -> fmt::Result
{
    write!(f, "{}", open)?;

    for (index, item) in items.iter().enumerate()
    {
        if index > 0
        {
            write!(f, " ")?;
        }

        write!(f, "{}", item)?;
    }

    write!(f, "{}", close)
}


/// Define implementations for converting between Values and the raw data types they represent.
macro_rules! value_conversion
{
    ($data_type:ty , $variant:ident , $as_ident:ident) =>
    {
        #[doc = concat!("Convert a value to ", stringify!($data_type), ".")]
        impl Value
        {
            pub fn $as_ident(&self) -> error::Result<&$data_type>
            {
                match self
                {
                    Value::$variant(value) => Ok(value),
                    _ => host_error(format!("Value {} could not be converted to {}.",
                                            self,
                                            stringify!($data_type)))
                }
            }
        }


        #[doc = concat!("Allow conversion from ", stringify!($data_type), " to a Value.")]
        impl ToValue for $data_type
        {
            fn to_value(&self) -> Value
            {
                Value::$variant(self.clone())
            }
        }
    };
}


value_conversion!(i64,       Int,     as_int);
value_conversion!(f64,       Float,   as_float);
value_conversion!(bool,      Bool,    as_bool);
value_conversion!(String,    String,  as_string);
value_conversion!(Symbol,    Symbol,  as_symbol);
value_conversion!(Keyword,   Keyword, as_keyword);
value_conversion!(ValueMap,  Map,     as_map);


/// Generate the functions for checking the variant of a Value.
macro_rules! is_variant
{
    ($name:ident , $variant:ident) =>
    {
        #[doc = concat!("Check if the value is the variant ", stringify!($variant), ".")]
        pub fn $name(&self) -> bool
        {
            matches!(self, Value::$variant(..))
        }
    };
}


impl Value
{
    is_variant!(is_int,       Int);
    is_variant!(is_float,     Float);
    is_variant!(is_string,    String);
    is_variant!(is_keyword,   Keyword);
    is_variant!(is_symbol,    Symbol);
    is_variant!(is_list,      List);
    is_variant!(is_vector,    Vector);
    is_variant!(is_map,       Map);
    is_variant!(is_var,       Var);
    is_variant!(is_word,      Word);
    is_variant!(is_quotation, Quotation);

    /// Is this the "no value produced" sentinel?
    pub fn is_stack_void(&self) -> bool
    {
        matches!(self, Value::StackVoid)
    }

    /// Is the value a number, integer or floating point?
    pub fn is_numeric(&self) -> bool
    {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Is the value any of the host's collection types?
    pub fn is_collection(&self) -> bool
    {
        matches!(self, Value::List(_) | Value::Vector(_) | Value::Map(_))
    }

    /// Only nil and false are false.  Everything else, including 0 and empty collections, is true.
    pub fn is_truthy(&self) -> bool
    {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Build a host list from the given items.
    pub fn list(items: Vec<Value>) -> Value
    {
        Value::List(items.into_iter().collect())
    }

    /// Build a host vector from the given items.
    pub fn vector(items: Vec<Value>) -> Value
    {
        Value::Vector(items.into_iter().collect())
    }

    /// Shorthand for a symbol value.
    pub fn symbol(text: &str) -> Value
    {
        Value::Symbol(Symbol::parse(text))
    }

    /// Shorthand for a keyword value, the text is given without the leading colon.
    pub fn keyword(text: &str) -> Value
    {
        Value::Keyword(Keyword::parse(text))
    }

    /// If this value is a list or a vector get at its items.
    pub fn as_sequence(&self) -> Option<&ValueList>
    {
        match self
        {
            Value::List(items) | Value::Vector(items) => Some(items),
            _ => None
        }
    }

    /// Get the value as a floating point number, promoting integers.
    pub fn get_float_val(&self) -> error::Result<f64>
    {
        match self
        {
            Value::Int(value) => Ok(*value as f64),
            Value::Float(value) => Ok(*value),
            _ => host_error(format!("Expected a number, found {}.", self))
        }
    }

    /// A short name for the type of the value, used in error messages.
    pub fn type_name(&self) -> &'static str
    {
        match self
        {
            Value::Nil          => "nil",
            Value::Bool(_)      => "boolean",
            Value::Int(_)       => "integer",
            Value::Float(_)     => "float",
            Value::String(_)    => "string",
            Value::Keyword(_)   => "keyword",
            Value::Symbol(_)    => "symbol",
            Value::List(_)      => "list",
            Value::Vector(_)    => "vector",
            Value::Map(_)       => "map",
            Value::Var(_)       => "var",
            Value::Function(_)  => "function",
            Value::Closure(_)   => "function",
            Value::Word(_)      => "word",
            Value::Quotation(_) => "quotation",
            Value::StackVoid    => "stack-void"
        }
    }

    /// The value as the host's `str` function sees it.  Strings are not quoted and nil is empty.
    pub fn to_plain_string(&self) -> String
    {
        match self
        {
            Value::Nil => String::new(),
            Value::String(text) => text.clone(),
            _ => self.to_string()
        }
    }
}



#[cfg(test)]
mod tests
{
    use super::*;
    use test_case::test_case;

    #[test_case(Value::Nil, "nil"; "nil")]
    #[test_case(Value::Float(2.0), "2.0"; "whole float keeps its point")]
    #[test_case("a\"b\n".to_value(), "\"a\\\"b\\n\""; "escaped string")]
    #[test_case(Value::keyword("gershwin.core/exit"), ":gershwin.core/exit"; "qualified keyword")]
    #[test_case(Value::list(vec![ Value::symbol("+"), Value::Int(1) ]), "(+ 1)"; "list")]
    #[test_case(Value::vector(vec![ Value::symbol("x"), Value::symbol("--") ]), "[x --]"; "vector")]
    fn prints_readably(value: Value, expected: &str)
    {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn lone_slash_is_not_qualified()
    {
        assert_eq!(Symbol::parse("/"), Symbol::new("/"));
        assert_eq!(Symbol::parse("user/double"), Symbol::qualified("user", "double"));
    }

    #[test]
    fn map_equality_ignores_order()
    {
        let a = ValueMap::from_pairs(&[ Value::keyword("a"), Value::Int(1),
                                        Value::keyword("b"), Value::Int(2) ]);
        let b = ValueMap::from_pairs(&[ Value::keyword("b"), Value::Int(2),
                                        Value::keyword("a"), Value::Int(1) ]);

        assert!(a == b);
        assert_eq!(a.assoc(Value::keyword("a"), Value::Int(3)).len(), 2);
    }

    #[test]
    fn numbers_of_different_types_are_not_equal()
    {
        assert!(Value::Int(1) != Value::Float(1.0));
        assert!(Value::list(vec![ Value::Int(1) ]) == Value::vector(vec![ Value::Int(1) ]));
    }

    #[test]
    fn only_nil_and_false_are_falsey()
    {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::StackVoid.is_truthy());
    }
}
