
use crate::{ lang::source_buffer::{ is_whitespace,
                                    SourceBuffer,
                                    SourceLocation },
             runtime::{ data_structures::value::{ Keyword,
                                                  Symbol,
                                                  Value,
                                                  ValueList,
                                                  ValueMap },
                        error::{ self,
                                 ErrorKind,
                                 ScriptError } } };



/// Characters that end a token even without whitespace.
const DELIMITERS: &str = "()[]{}\";";



/// Does this character end a token?
pub fn is_delimiter(next: char) -> bool
{
    is_whitespace(next) || DELIMITERS.contains(next)
}



fn read_error<T>(location: &SourceLocation, message: String) -> error::Result<T>
{
    ScriptError::new_as_result(ErrorKind::Read, Some(location.clone()), message)
}


fn eof_error<T>(location: &SourceLocation, start: &SourceLocation) -> error::Result<T>
{
    ScriptError::new_as_result(ErrorKind::UnexpectedEof,
                               Some(location.clone()),
                               format!("EOF while reading, starting at line {}", start.line()))
}



/// Read one host form from the buffer.  Whitespace must already have been skipped.  Host lists
/// are read entirely by this reader, the concatenative extensions do not apply inside them.
pub fn read_form(buffer: &mut SourceBuffer) -> error::Result<Value>
{
    let location = buffer.location().clone();

    match buffer.peek_next()
    {
        None =>
            ScriptError::new_as_result(ErrorKind::UnexpectedEof,
                                       Some(location),
                                       "EOF while reading.".to_string()),

        Some('(') =>
            {
                let _ = buffer.next_char();
                Ok(Value::List(read_sequence(buffer, ')', &location)?))
            },

        Some('[') =>
            {
                let _ = buffer.next_char();
                Ok(Value::Vector(read_sequence(buffer, ']', &location)?))
            },

        Some('{') =>
            {
                let _ = buffer.next_char();
                let items = read_sequence(buffer, '}', &location)?;

                build_map(items.iter().cloned().collect(), &location)
            },

        Some(next @ (')' | ']' | '}' | ';')) =>
            read_error(&location, format!("Unmatched delimiter: {}", next)),

        Some('"') => read_string(buffer, &location),

        Some('\'') =>
            {
                let _ = buffer.next_char();
                buffer.skip_whitespace();

                let quoted = read_form(buffer)?;
                Ok(Value::list(vec![ Value::symbol("quote"), quoted ]))
            },

        Some(_) => read_token(buffer, &location)
    }
}


/// Read forms up to the terminator character, which is consumed.
fn read_sequence(buffer: &mut SourceBuffer,
                 terminator: char,
                 start: &SourceLocation) -> error::Result<ValueList>
{
    let mut items = ValueList::new();

    loop
    {
        buffer.skip_whitespace();

        match buffer.peek_next()
        {
            None => return eof_error(buffer.location(), start),

            Some(next) if next == terminator =>
                {
                    let _ = buffer.next_char();
                    return Ok(items);
                },

            Some(_) => items.push_back(read_form(buffer)?)
        }
    }
}


/// Build a map from the flat list of forms found between braces.
pub fn build_map(items: Vec<Value>, location: &SourceLocation) -> error::Result<Value>
{
    if items.len() % 2 != 0
    {
        return read_error(location, "Map literal must contain an even number of forms".to_string());
    }

    Ok(Value::Map(ValueMap::from_pairs(&items)))
}


fn read_string(buffer: &mut SourceBuffer, location: &SourceLocation) -> error::Result<Value>
{
    let _ = buffer.next_char();
    let mut text = String::new();

    loop
    {
        match buffer.next_char()
        {
            None => return eof_error(buffer.location(), location),

            Some('"') => return Ok(Value::String(text)),

            Some('\\') =>
                {
                    let escaped = match buffer.next_char()
                        {
                            Some('n') => '\n',
                            Some('r') => '\r',
                            Some('t') => '\t',
                            Some('0') => '\0',
                            Some(next) => next,
                            None => return eof_error(buffer.location(), location)
                        };

                    text.push(escaped);
                },

            Some(next) => text.push(next)
        }
    }
}


fn read_token(buffer: &mut SourceBuffer, location: &SourceLocation) -> error::Result<Value>
{
    let mut text = String::new();

    while let Some(next) = buffer.peek_next()
    {
        if is_delimiter(next)
        {
            break;
        }

        text.push(next);
        let _ = buffer.next_char();
    }

    parse_token(&text, location)
}


/// Decide what kind of literal a bare token is.
fn parse_token(text: &str, location: &SourceLocation) -> error::Result<Value>
{
    match text
    {
        "nil" => Ok(Value::Nil),
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),

        _ if text.starts_with(':') =>
            {
                let name = &text[1..];

                if name.is_empty() || name.starts_with(':') || name.ends_with('/')
                {
                    return read_error(location, format!("Invalid token: {}", text));
                }

                Ok(Value::Keyword(Keyword::parse(name)))
            },

        _ if is_number(text) =>
            match to_numeric(text)
            {
                Some(number) => Ok(number),
                None => read_error(location, format!("Invalid number: {}", text))
            },

        _ => Ok(Value::Symbol(Symbol::parse(text)))
    }
}


/// Numbers start with a digit, optionally after a sign.
fn is_number(text: &str) -> bool
{
    let mut chars = text.chars();

    match chars.next()
    {
        Some('-') | Some('+') => chars.next().is_some_and(|next| next.is_ascii_digit()),
        Some(first) => first.is_ascii_digit(),
        None => false
    }
}


/// Attempt to convert the text into a numeric literal.  This can be either an integer or floating
/// point number.  We also support hexadecimal and binary literals, and using _ as a separator for
/// readability.
fn to_numeric(text: &str) -> Option<Value>
{
    let (negative, digits) = match text.strip_prefix('-')
        {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text))
        };

    let cleaned = digits.replace('_', "");

    let value = if let Some(stripped) = cleaned.strip_prefix("0x")
        {
            Value::Int(i64::from_str_radix(stripped, 16).ok()?)
        }
        else if let Some(stripped) = cleaned.strip_prefix("0b")
        {
            Value::Int(i64::from_str_radix(stripped, 2).ok()?)
        }
        else if cleaned.contains(&[ '.', 'e', 'E' ][..])
        {
            Value::Float(cleaned.parse().ok()?)
        }
        else
        {
            Value::Int(cleaned.parse().ok()?)
        };

    match ( negative, value )
    {
        ( true, Value::Int(value) ) => Some(Value::Int(-value)),
        ( true, Value::Float(value) ) => Some(Value::Float(-value)),
        ( _, value ) => Some(value)
    }
}



#[cfg(test)]
mod tests
{
    use super::*;
    use test_case::test_case;

    fn read(source: &str) -> error::Result<Value>
    {
        let mut buffer = SourceBuffer::new("<test>", source);
        buffer.skip_whitespace();

        read_form(&mut buffer)
    }

    #[test_case("42", Value::Int(42); "integer")]
    #[test_case("-7", Value::Int(-7); "negative integer")]
    #[test_case("1_000", Value::Int(1000); "separated integer")]
    #[test_case("0xff", Value::Int(255); "hex")]
    #[test_case("0b101", Value::Int(5); "binary")]
    #[test_case("2.5", Value::Float(2.5); "float")]
    #[test_case("nil", Value::Nil; "nil")]
    #[test_case("false", Value::Bool(false); "false")]
    #[test_case(":doc", Value::keyword("doc"); "keyword")]
    #[test_case("-", Value::symbol("-"); "minus is a symbol")]
    #[test_case("-main", Value::symbol("-main"); "entry point symbol")]
    #[test_case("\"a\\tb\"", Value::String("a\tb".to_string()); "escaped string")]
    #[test_case("'x", Value::list(vec![ Value::symbol("quote"), Value::symbol("x") ]); "quote shorthand")]
    fn reads_literals(source: &str, expected: Value)
    {
        assert_eq!(read(source).unwrap(), expected);
    }

    #[test]
    fn reads_nested_collections()
    {
        let value = read("(+ 1 [2 3], {:a 1})").unwrap();

        assert_eq!(value.to_string(), "(+ 1 [2 3] {:a 1})");
    }

    #[test]
    fn tokens_stop_at_delimiters()
    {
        let value = read("[dup;]");

        assert_eq!(value.unwrap_err().kind(), ErrorKind::Read);
    }

    #[test_case(")"; "close paren")]
    #[test_case("]"; "close bracket")]
    #[test_case("{:a}"; "odd map")]
    #[test_case("12abc"; "bad number")]
    fn rejects_malformed_input(source: &str)
    {
        assert_eq!(read(source).unwrap_err().kind(), ErrorKind::Read);
    }

    #[test]
    fn unterminated_list_names_its_starting_line()
    {
        let error = read("\n(+ 1\n 2").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::UnexpectedEof);
        assert_eq!(error.error(), "EOF while reading, starting at line 2");
    }
}
