
use std::{ error::Error,
           process::Termination,
           fmt::{ self, Debug, Display, Formatter }, process::ExitCode };
use crate::lang::source_buffer::SourceLocation;



pub type Result<T> = std::result::Result<T, ScriptError>;



/// The broad category of an error.  Callers such as the REPL special case some of these, stack
/// underflow in particular.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind
{
    /// Malformed source text.
    Read,

    /// The source ended in the middle of a form.
    UnexpectedEof,

    /// A malformed word definition.
    Definition,

    /// Something tried to take a value off of an empty data stack.
    StackUnderflow,

    /// Raised by the host evaluator while running a host form.
    Host,

    /// Reading or writing a file failed.
    Io,

    /// A required setting was missing or invalid.
    Config
}


impl Display for ErrorKind
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        let text = match self
            {
                ErrorKind::Read => "read error",
                ErrorKind::UnexpectedEof => "unexpected end of input",
                ErrorKind::Definition => "definition error",
                ErrorKind::StackUnderflow => "stack underflow",
                ErrorKind::Host => "host error",
                ErrorKind::Io => "I/O error",
                ErrorKind::Config => "configuration error"
            };

        write!(f, "{}", text)
    }
}



/// Any error that occurs while reading, compiling or running a Gershwin program.
#[derive(Clone)]
pub struct ScriptError
{
    /// What sort of error this is.
    kind: ErrorKind,

    /// The location in the source code the error occurred, if available.
    location: Option<SourceLocation>,

    /// The description of the error.
    error: String,

    /// The error that caused this one, if any.
    cause: Option<Box<ScriptError>>
}


impl Error for ScriptError
{
    fn source(&self) -> Option<&(dyn Error + 'static)>
    {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}


/// When returned from main, convert the error result to an operating system exit code.
impl Termination for ScriptError
{
    /// Because this type represents an error, the exit code is always FAILURE.
    fn report(self) -> ExitCode
    {
        eprintln!("Error: {}", self);
        ExitCode::FAILURE
    }
}


/// Pretty print the ScriptError, prefixed with where it happened when that is known.
impl Display for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match &self.location
        {
            Some(location) => write!(f, "{}: {}", location, self.error)?,
            None => write!(f, "{}", self.error)?
        }

        if let Some(cause) = &self.cause
        {
            write!(f, "\n  caused by: {}", cause)?;
        }

        Ok(())
    }
}


impl Debug for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{}", self)
    }
}


impl ScriptError
{
    /// Create a new ScriptError.
    pub fn new(kind: ErrorKind, location: Option<SourceLocation>, error: String) -> ScriptError
    {
        ScriptError
            {
                kind,
                location,
                error,
                cause: None
            }
    }

    /// Create a new Script Error and wrap it in a Result::Err.
    pub fn new_as_result<T>(kind: ErrorKind,
                            location: Option<SourceLocation>,
                            error: String) -> Result<T>
    {
        Err(ScriptError::new(kind, location, error))
    }

    /// Create a new error of the given kind that records an earlier error as its cause.
    pub fn new_with_cause(kind: ErrorKind,
                          location: Option<SourceLocation>,
                          error: String,
                          cause: ScriptError) -> ScriptError
    {
        ScriptError
            {
                kind,
                location,
                error,
                cause: Some(Box::new(cause))
            }
    }

    /// Attach a location to the error, unless it already knows where it came from.
    pub fn with_location(mut self, location: &SourceLocation) -> ScriptError
    {
        if self.location.is_none()
        {
            self.location = Some(location.clone());
        }

        self
    }

    /// The category of the error.
    pub fn kind(&self) -> ErrorKind
    {
        self.kind
    }

    /// If available, the location in the source code the error occurred.
    pub fn location(&self) -> &Option<SourceLocation>
    {
        &self.location
    }

    /// The description of the error.
    pub fn error(&self) -> &String
    {
        &self.error
    }

    /// The error that caused this one.
    pub fn cause(&self) -> Option<&ScriptError>
    {
        self.cause.as_deref()
    }

    /// Walk the chain of causes down to the original error.
    pub fn root_cause(&self) -> &ScriptError
    {
        let mut current = self;

        while let Some(cause) = current.cause()
        {
            current = cause;
        }

        current
    }

    /// Was the root of this error an attempt to use an empty data stack?
    pub fn is_stack_underflow(&self) -> bool
    {
        self.root_cause().kind == ErrorKind::StackUnderflow
    }
}


/// Allow for the conversion of a std::io::Error into a ScriptError.
impl From<std::io::Error> for ScriptError
{
    fn from(error: std::io::Error) -> ScriptError
    {
        ScriptError::new(ErrorKind::Io, None, format!("I/O error: {}", error))
    }
}



/// Shorthand for reporting an error raised while running host code.
pub fn host_error<T>(message: String) -> Result<T>
{
    ScriptError::new_as_result(ErrorKind::Host, None, message)
}


/// Shorthand for reporting a malformed word definition found at the given location.
pub fn definition_error<T>(location: &SourceLocation, message: String) -> Result<T>
{
    ScriptError::new_as_result(ErrorKind::Definition, Some(location.clone()), message)
}



#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn display_includes_location_when_known()
    {
        let location = SourceLocation::new_from_info("demo.gwn", 3, 7);
        let error = ScriptError::new(ErrorKind::Read, Some(location), "Bad form.".to_string());

        assert_eq!(error.to_string(), "demo.gwn (3, 7): Bad form.");
    }

    #[test]
    fn with_location_keeps_the_original_location()
    {
        let first = SourceLocation::new_from_info("a", 1, 1);
        let second = SourceLocation::new_from_info("b", 2, 2);

        let error = ScriptError::new(ErrorKind::Host, Some(first.clone()), "x".to_string())
            .with_location(&second);

        assert_eq!(error.location(), &Some(first));
    }

    #[test]
    fn root_cause_walks_the_chain()
    {
        let inner = ScriptError::new(ErrorKind::StackUnderflow, None, "empty".to_string());
        let outer = ScriptError::new_with_cause(ErrorKind::Host,
                                                None,
                                                "failed".to_string(),
                                                inner);

        assert_eq!(outer.root_cause().error(), "empty");
        assert!(outer.is_stack_underflow());
        assert_eq!(outer.kind(), ErrorKind::Host);
    }
}
