use std::{ collections::VecDeque,
           fmt::{ self,
                  Display,
                  Formatter },
           str::Chars };



/// The location in the source code where a form was found.  This structure is used all over the
/// reader, the compiler and the driver to keep track of where important things are found in the
/// source code.  It is used extensively in the error reporting.
///
/// This is a read-only structure.  Use the field accessor methods to get the values.
#[derive(Clone, PartialEq, PartialOrd, Eq, Hash, Debug)]
pub struct SourceLocation
{
    /// Either the path to the file or a description of the source code.  For example code entered
    /// in the REPL will have a tag of "\<repl\>".
    path: String,

    /// The 1 based line number in the source code where the form was found.
    line: usize,

    /// The 1 based column number in the source code where the form was found.
    column: usize
}


/// Used for error reporting to show where in the source code an error originated.
impl Display for SourceLocation
{
    fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), fmt::Error>
    {
        write!(formatter, "{} ({}, {})", self.path, self.line, self.column)
    }
}


impl Default for SourceLocation
{
    fn default() -> Self
    {
        Self::new()
    }
}


impl SourceLocation
{
    /// Crate a new SourceLocation with default values.
    pub fn new() -> SourceLocation
    {
        SourceLocation { path: "unspecified".to_string(), line: 1, column: 1 }
    }

    /// Create a new SourceLocation with the path to the source code.
    pub fn new_from_path(path: &str) -> Self
    {
        SourceLocation { path: path.to_owned(), line: 1, column: 1 }
    }

    /// Create a new SourceLocation with all of the needed information.  This is useful in
    /// conjunction with the location_here! macro.
    pub fn new_from_info(path: &str, line: usize, column: usize) -> Self
    {
        SourceLocation { path: path.to_owned(), line, column }
    }

    /// The path to the source code or a meaningful description of the source code.
    pub fn path(&self) -> &String
    {
        &self.path
    }

    /// The 1 based line number in the source code.
    pub fn line(&self) -> usize
    {
        self.line
    }

    /// The 1 based column number in the source code.
    pub fn column(&self) -> usize
    {
        self.column
    }
}



/// Helper macro to get the location of the macro invocation.  Native words record where in the
/// Rust code they were registered from.
#[macro_export]
macro_rules! location_here
{
    () =>
    {
        $crate::lang::source_buffer::SourceLocation::new_from_info(file!(),
                                                                   line!() as usize,
                                                                   column!() as usize)
    };
}



/// Check if the given character is considered whitespace by the reader.  Commas are whitespace,
/// following the host language's convention.
pub fn is_whitespace(next: char) -> bool
{
    next.is_whitespace() || next == ','
}



/// A buffer for processing source code.  This buffer acts as a forward only cursor over the code
/// with a small lookahead window.  As characters are consumed the location of the cursor in that
/// source is maintained, allowing the reader to report where forms and errors were found.
///
/// The SourceBuffer only holds a reference to the source code, the code is not copied.
pub struct SourceBuffer<'a>
{
    /// An iterator over the source code being processed.
    chars: Chars<'a>,

    /// The logical location of the cursor in the source code.
    location: SourceLocation,

    /// Characters pulled from the iterator but not yet consumed.  The reader needs one character
    /// of lookahead past the character that triggers a dispatch decision.
    lookahead: VecDeque<char>
}


impl<'a> SourceBuffer<'a>
{
    /// Create a new SourceBuffer with the path to, or meaningful tag for the source code and the
    /// source code itself.
    pub fn new(path: &str, source: &'a str) -> Self
    {
        SourceBuffer
            {
                chars: source.chars(),
                location: SourceLocation::new_from_path(path),
                lookahead: VecDeque::with_capacity(2)
            }
    }

    /// Number lines from `line` instead of 1, for source that continues earlier input.
    pub fn starting_at_line(mut self, line: usize) -> Self
    {
        let path = self.location.path().clone();

        self.location = SourceLocation::new_from_info(&path, line, 1);
        self
    }

    /// The location the cursor is at in the source code being processed.
    pub fn location(&self) -> &SourceLocation
    {
        &self.location
    }

    /// Take a peek at the next character in the source code without consuming it.
    pub fn peek_next(&mut self) -> Option<char>
    {
        self.peek_at(0)
    }

    /// Peek `offset` characters past the cursor without consuming anything.
    pub fn peek_at(&mut self, offset: usize) -> Option<char>
    {
        while self.lookahead.len() <= offset
        {
            match self.chars.next()
            {
                Some(next) => self.lookahead.push_back(next),
                None => return None
            }
        }

        self.lookahead.get(offset).copied()
    }

    /// Get and consume the next character in the source code.
    pub fn next_char(&mut self) -> Option<char>
    {
        let next = match self.lookahead.pop_front()
            {
                Some(next) => Some(next),
                None => self.chars.next()
            };

        if let Some(next_char) = next
        {
            self.increment_location(next_char);
        }

        next
    }

    /// Skip over whitespace in the text.  Stopping only at either the end of the buffer or the
    /// next non-whitespace character.
    pub fn skip_whitespace(&mut self)
    {
        while let Some(next) = self.peek_next()
        {
            if !is_whitespace(next)
            {
                break;
            }

            let _ = self.next_char();
        }
    }

    /// Increment the location based on the next character.  Advance one column for regular
    /// characters.  Reset the column to 1 and increment the line for new line characters.
    fn increment_location(&mut self, next: char)
    {
        if next == '\n'
        {
            self.location.line += 1;
            self.location.column = 1;
        }
        else
        {
            self.location.column += 1;
        }
    }
}
