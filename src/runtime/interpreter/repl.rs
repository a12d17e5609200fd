use crate::{
    lang::{forms::Form, reader::Reader, source_buffer::SourceLocation},
    runtime::{
        data_structures::value::Value,
        error::{self, ErrorKind, ScriptError},
        interpreter::{driver::eval_at, Runtime},
        names::{EXIT_KEYWORD, QUIT_KEYWORD},
    },
};
use std::io::{BufRead, Write};
use tracing::warn;

/// Source id reported for forms typed at the prompt.
pub const REPL_SOURCE: &str = "<repl>";

/// What reading the pending input produced.
enum Pending {
    /// Every form in the input, with where it was read.
    Complete(Vec<(Form, SourceLocation)>),

    /// The input ends in the middle of a form, more lines are needed.
    Incomplete,
}

/// Read everything buffered so far, which starts at `first_line` of the session.  Running out of
/// input inside a form isn't an error here, the user simply hasn't finished typing it.
fn read_pending(source: &str, first_line: usize) -> error::Result<Pending> {
    let mut reader = Reader::new_at_line(REPL_SOURCE, source, first_line);
    let mut forms = Vec::new();

    loop {
        match reader.read(false) {
            Ok(Some(form)) => forms.push((form, reader.form_location().clone())),
            Ok(None) => return Ok(Pending::Complete(forms)),
            Err(error) if error.kind() == ErrorKind::UnexpectedEof => return Ok(Pending::Incomplete),
            Err(error) => return Err(error),
        }
    }
}

fn is_exit_request(form: &Form) -> bool {
    match form {
        Form::Host(Value::Keyword(keyword)) => *keyword == *EXIT_KEYWORD || *keyword == *QUIT_KEYWORD,
        _ => false,
    }
}

/// Print the innermost cause of an error along with the best location we know for it.
fn report_error(output: &mut impl Write, error: &ScriptError) -> error::Result<()> {
    let root = error.root_cause();

    warn!(error = %error, "Recovered from error.");

    match root.location().as_ref().or(error.location().as_ref()) {
        Some(location) => writeln!(output, "Error: {}: {}", location, root.error())?,
        None => writeln!(output, "Error: {}", root.error())?,
    }

    if root.kind() == ErrorKind::StackUnderflow {
        writeln!(output, "The data stack doesn't hold enough values for that.")?;
    }

    Ok(())
}

fn print_stack(runtime: &Runtime, output: &mut impl Write) -> error::Result<()> {
    writeln!(output, "--- Data Stack:")?;

    for value in runtime.stack().seq() {
        writeln!(output, "{}", value)?;
    }

    Ok(())
}

/// Run the interactive loop until the input runs out or the user asks to leave.  Each form is
/// evaluated on its own, a form that fails leaves the stack the way it was before that form ran.
pub fn run_repl(
    runtime: &mut Runtime,
    mut input: impl BufRead,
    output: &mut impl Write,
) -> error::Result<()> {
    let mut pending = String::new();

    // The session line the pending input starts on.
    let mut first_line = 1;

    loop {
        if pending.is_empty() {
            write!(output, "{}=> ", runtime.environment().current_namespace())?;
        } else {
            write!(output, "#_=> ")?;
        }

        output.flush()?;

        let mut line = String::new();

        if input.read_line(&mut line)? == 0 {
            if !pending.is_empty() {
                let error = ScriptError::new(
                    ErrorKind::UnexpectedEof,
                    None,
                    "EOF while reading".to_string(),
                );
                report_error(output, &error)?;
            }

            writeln!(output)?;
            return Ok(());
        }

        pending.push_str(&line);

        let read = read_pending(&pending, first_line);

        if matches!(read, Ok(Pending::Incomplete)) {
            continue;
        }

        first_line += pending.matches('\n').count();
        pending.clear();

        let forms = match read {
            Ok(Pending::Complete(forms)) => forms,
            Ok(Pending::Incomplete) => continue,

            Err(error) => {
                report_error(output, &error)?;
                continue;
            }
        };

        for (form, location) in forms {
            if is_exit_request(&form) {
                return Ok(());
            }

            let snapshot = runtime.stack().snapshot();

            match eval_at(runtime, &form, &location) {
                Ok(_) if matches!(form, Form::WordDefinition(_)) => {
                    writeln!(output, "ok -- word defined")?
                }
                Ok(_) => {}

                Err(error) => {
                    runtime.stack_mut().restore(snapshot);
                    report_error(output, &error)?;
                }
            }
        }

        print_stack(runtime, output)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> (Runtime, String) {
        let mut runtime = Runtime::default();
        let mut output = Vec::new();

        run_repl(&mut runtime, input.as_bytes(), &mut output).unwrap();

        (runtime, String::from_utf8(output).unwrap())
    }

    #[test]
    fn prints_the_stack_top_first() {
        let (_, output) = session("1 2 3\n");

        assert!(output.contains("--- Data Stack:\n3\n2\n1\n"));
    }

    #[test]
    fn reports_word_definitions() {
        let (runtime, output) = session(": sq [ n -- n*n ] dup * ;\n4 sq\n");

        assert!(output.contains("ok -- word defined"));
        assert_eq!(runtime.stack().peek().unwrap(), Value::Int(16));
    }

    #[test]
    fn forms_can_span_lines() {
        let (runtime, output) = session(": sq [ n -- n*n ]\n  dup * ;\n3 sq\n");

        assert!(output.contains("#_=> "));
        assert_eq!(runtime.stack().peek().unwrap(), Value::Int(9));
    }

    #[test]
    fn failed_forms_leave_the_stack_alone() {
        let (runtime, output) = session("1 2\n(+ 1 :a) 3\n");

        assert!(output.contains("Error: <repl> (2, 1):"));
        assert_eq!(runtime.stack().seq().cloned().collect::<Vec<_>>(),
                   vec![Value::Int(3), Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn underflow_gets_a_friendly_message() {
        let (runtime, output) = session("drop\n");

        assert!(output.contains("doesn't hold enough values"));
        assert!(runtime.stack().is_empty());
    }

    #[test]
    fn exit_keywords_end_the_session() {
        let (runtime, output) = session("1\n:gershwin.core/quit\n2\n");

        assert_eq!(runtime.stack().depth(), 1);
        assert_eq!(output.matches("=> ").count(), 2);
    }

    #[test]
    fn read_errors_drop_the_line() {
        let (runtime, output) = session("1 )\n2\n");

        assert!(output.contains("Error:"));
        assert_eq!(runtime.stack().peek().unwrap(), Value::Int(2));
        assert_eq!(runtime.stack().depth(), 1);
    }

    #[test]
    fn errors_report_the_session_line() {
        let (_, output) = session("1\n: sq [ n -- n*n ]\n  dup * ;\n2 sq\n(+ 1 :a)\n");

        assert!(output.contains("Error: <repl> (5, 1):"));
    }

    #[test]
    fn read_errors_report_the_session_line() {
        let (_, output) = session("1\n2\n3 )\n");

        assert!(output.contains("<repl> (3, "));
    }
}
