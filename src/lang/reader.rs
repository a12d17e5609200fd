use crate::{
    host::literals::{self, is_delimiter},
    lang::{
        forms::Form,
        source_buffer::{is_whitespace, SourceBuffer, SourceLocation},
    },
    runtime::{
        data_structures::value::Value,
        error::{self, ErrorKind, ScriptError},
    },
};
use tracing::trace;

/// Starts a line comment.
const COMMENT_START: char = '!';

/// Starts and ends a word definition.
const DEFINITION_START: char = ':';
const DEFINITION_END: char = ';';

/// Starts and ends a quotation.
const QUOTATION_START: char = '<';
const QUOTATION_END: char = '>';

/// The result of one attempt at reading.
enum ReadResult {
    Form(Form),

    /// A comment was consumed.  The caller should try again.
    Nothing,

    Eof,
}

/// Reads the source text of a program one form at a time.  Understands word definitions,
/// quotations and comments, everything else is handed off to the host literal reader.
pub struct Reader<'a> {
    buffer: SourceBuffer<'a>,

    /// Where the most recently started form began.
    form_location: SourceLocation,
}

impl<'a> Reader<'a> {
    /// Create a reader over the given source.  The id is used in locations, usually a file path.
    pub fn new(source_id: &str, source: &'a str) -> Reader<'a> {
        Reader {
            buffer: SourceBuffer::new(source_id, source),
            form_location: SourceLocation::new_from_path(source_id),
        }
    }

    /// Create a reader over source that continues earlier input, numbering lines from `line`.
    pub fn new_at_line(source_id: &str, source: &'a str, line: usize) -> Reader<'a> {
        Reader {
            buffer: SourceBuffer::new(source_id, source).starting_at_line(line),
            form_location: SourceLocation::new_from_info(source_id, line, 1),
        }
    }

    /// Where the last form read, or the form being read when an error occurred, started.
    pub fn form_location(&self) -> &SourceLocation {
        &self.form_location
    }

    /// Read the next form.  At the end of the input either raise an error or return None,
    /// depending on `eof_is_error`.
    pub fn read(&mut self, eof_is_error: bool) -> error::Result<Option<Form>> {
        loop {
            match self.read_one()? {
                ReadResult::Form(form) => {
                    trace!(location = %self.form_location, form = %form, "Read form.");
                    return Ok(Some(form));
                }

                ReadResult::Nothing => continue,

                ReadResult::Eof if eof_is_error => {
                    return ScriptError::new_as_result(
                        ErrorKind::UnexpectedEof,
                        Some(self.buffer.location().clone()),
                        "EOF while reading".to_string(),
                    );
                }

                ReadResult::Eof => return Ok(None),
            }
        }
    }

    fn read_one(&mut self) -> error::Result<ReadResult> {
        self.buffer.skip_whitespace();
        self.form_location = self.buffer.location().clone();

        let next = match self.buffer.peek_next() {
            Some(next) => next,
            None => return Ok(ReadResult::Eof),
        };

        let followed_by_whitespace = self.buffer.peek_at(1).is_some_and(is_whitespace);
        let location = self.form_location.clone();

        match next {
            COMMENT_START => {
                self.skip_comment();
                Ok(ReadResult::Nothing)
            }

            DEFINITION_START if followed_by_whitespace => {
                let _ = self.buffer.next_char();
                let forms = self.read_delimited_list(DEFINITION_END, &location)?;

                Ok(ReadResult::Form(Form::WordDefinition(forms)))
            }

            QUOTATION_START if followed_by_whitespace => {
                let _ = self.buffer.next_char();
                let forms = self.read_delimited_list(QUOTATION_END, &location)?;

                Ok(ReadResult::Form(Form::Quotation(forms)))
            }

            '[' => {
                let _ = self.buffer.next_char();
                let items = self.read_host_items(']', "vector", &location)?;

                Ok(ReadResult::Form(Form::Host(Value::Vector(items.into_iter().collect()))))
            }

            '{' => {
                let _ = self.buffer.next_char();
                let items = self.read_host_items('}', "map", &location)?;

                Ok(ReadResult::Form(Form::Host(literals::build_map(items, &location)?)))
            }

            _ => Ok(ReadResult::Form(Form::Host(literals::read_form(&mut self.buffer)?))),
        }
    }

    /// Consume everything through the end of the line.
    fn skip_comment(&mut self) {
        while let Some(next) = self.buffer.next_char() {
            if next == '\n' {
                break;
            }
        }
    }

    /// Is the terminator at the cursor?  A `>` only closes a quotation when it stands alone, so
    /// that words such as `>=` can be used inside one.
    fn at_terminator(&mut self, terminator: char) -> bool {
        match self.buffer.peek_next() {
            Some(next) if next == terminator => {
                terminator != QUOTATION_END
                    || self
                        .buffer
                        .peek_at(1)
                        .is_none_or(|after| is_delimiter(after) || after == QUOTATION_END)
            }

            _ => false,
        }
    }

    /// Read forms until the terminator, which is consumed.  Comments inside the list are skipped.
    fn read_delimited_list(
        &mut self,
        terminator: char,
        start: &SourceLocation,
    ) -> error::Result<Vec<Form>> {
        let mut forms = Vec::new();

        loop {
            self.buffer.skip_whitespace();

            if self.buffer.peek_next().is_none() {
                return ScriptError::new_as_result(
                    ErrorKind::UnexpectedEof,
                    Some(self.buffer.location().clone()),
                    format!("EOF while reading, starting at line {}", start.line()),
                );
            }

            if self.at_terminator(terminator) {
                let _ = self.buffer.next_char();
                break;
            }

            match self.read_one()? {
                ReadResult::Form(form) => forms.push(form),
                ReadResult::Nothing => {}
                ReadResult::Eof => {
                    return ScriptError::new_as_result(
                        ErrorKind::UnexpectedEof,
                        Some(self.buffer.location().clone()),
                        format!("EOF while reading, starting at line {}", start.line()),
                    );
                }
            }
        }

        self.form_location = start.clone();
        Ok(forms)
    }

    /// Read the elements of a vector or map literal.  Only host forms may appear in one.
    fn read_host_items(
        &mut self,
        terminator: char,
        kind: &str,
        start: &SourceLocation,
    ) -> error::Result<Vec<Value>> {
        let forms = self.read_delimited_list(terminator, start)?;
        let mut items = Vec::with_capacity(forms.len());

        for form in forms {
            match form {
                Form::Host(value) => items.push(value),
                other => {
                    return ScriptError::new_as_result(
                        ErrorKind::Read,
                        Some(start.clone()),
                        format!("A {} literal may only hold host forms, found {}", kind, other),
                    );
                }
            }
        }

        Ok(items)
    }
}

/// Read every form in the source.
pub fn read_all(source_id: &str, source: &str) -> error::Result<Vec<Form>> {
    let mut reader = Reader::new(source_id, source);
    let mut forms = Vec::new();

    while let Some(form) = reader.read(false)? {
        forms.push(form);
    }

    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forms(source: &str) -> Vec<Form> {
        read_all("<test>", source).unwrap()
    }

    #[test]
    fn reads_a_word_definition() {
        let read = forms(": double [ x -- x*2 ] dup + ;");

        assert_eq!(read.len(), 1);
        assert_eq!(read[0].to_string(), ": double [x -- x*2] dup + ;");
        assert!(matches!(&read[0], Form::WordDefinition(items) if items.len() == 4));
    }

    #[test]
    fn reads_a_quotation() {
        let read = forms("< 1 2 + >");

        assert_eq!(read, vec![Form::Quotation(vec![
            Form::Host(Value::Int(1)),
            Form::Host(Value::Int(2)),
            Form::Host(Value::symbol("+")),
        ])]);
    }

    #[test]
    fn colon_without_whitespace_is_a_keyword() {
        assert_eq!(forms(":doc"), vec![Form::Host(Value::keyword("doc"))]);
    }

    #[test]
    fn angle_without_whitespace_is_a_symbol() {
        assert_eq!(forms("<= <x"), vec![
            Form::Host(Value::symbol("<=")),
            Form::Host(Value::symbol("<x")),
        ]);
    }

    #[test]
    fn comments_produce_nothing() {
        let read = forms("! a comment\n1 ! another\n! last");

        assert_eq!(read, vec![Form::Host(Value::Int(1))]);
    }

    #[test]
    fn comments_inside_definitions_are_skipped() {
        let read = forms(": x [ ] ! note\n 1 ;");

        assert!(matches!(&read[0], Form::WordDefinition(items) if items.len() == 3));
    }

    #[test]
    fn quotations_nest() {
        let read = forms("< 1 < 2 > >");

        assert_eq!(read[0].to_string(), "< 1 < 2 > >");
    }

    #[test]
    fn comparison_words_fit_inside_quotations() {
        let read = forms("< 1 2 >= >");

        assert!(matches!(&read[0], Form::Quotation(items) if items.len() == 3));
    }

    #[test]
    fn eof_in_a_definition_names_the_starting_line() {
        let error = read_all("<test>", "1\n: broken [ ] dup").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::UnexpectedEof);
        assert_eq!(error.error(), "EOF while reading, starting at line 2");
    }

    #[test]
    fn eof_can_be_an_error() {
        let mut reader = Reader::new("<test>", "  ");

        assert_eq!(reader.read(true).unwrap_err().kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn vectors_reject_quotations() {
        let error = read_all("<test>", "[ 1 < 2 > ]").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Read);
    }

    #[test]
    fn odd_maps_are_rejected() {
        let error = read_all("<test>", "{ :a 1 :b }").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Read);
    }

    #[test]
    fn forms_record_where_they_start() {
        let mut reader = Reader::new("<test>", "1\n  two");

        let _ = reader.read(false).unwrap();
        let _ = reader.read(false).unwrap();

        assert_eq!(reader.form_location().line(), 2);
        assert_eq!(reader.form_location().column(), 3);
    }
}
