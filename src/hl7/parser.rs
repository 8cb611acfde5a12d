//! Payload parsing.

use thiserror::Error;

use super::{Delimiters, Field, HEADER_SEGMENT, Message, Segment};

/// Errors raised while parsing a frame payload.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The payload held no segments.
    #[error("message is empty")]
    Empty,
    /// The first segment is not `MSH`.
    #[error("message does not start with an MSH segment (found {found:?})")]
    MissingHeader {
        /// Leading characters of the first segment.
        found: String,
    },
    /// The header ends before the field separator or MSH-2.
    #[error("MSH segment is missing its encoding characters")]
    MissingEncodingCharacters,
    /// A segment identifier is not three upper-case letters or digits.
    #[error("invalid segment name {name:?}")]
    InvalidSegmentName {
        /// The offending identifier.
        name: String,
    },
}

/// Turns decoded payload text into a [`Message`].
///
/// Closures of the right shape implement this trait, which makes swapping
/// the parser in tests a one-liner.
pub trait Parser: Send + Sync + 'static {
    /// Parse `text`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when `text` is not a well-formed message.
    fn parse(&self, text: &str) -> Result<Message, ParseError>;
}

impl<F> Parser for F
where
    F: Fn(&str) -> Result<Message, ParseError> + Send + Sync + 'static,
{
    fn parse(&self, text: &str) -> Result<Message, ParseError> { self(text) }
}

/// Pipe-delimited HL7 v2 parser.
///
/// Segments are separated by `CR`; `LF` and `CRLF` are tolerated. Blank
/// lines are skipped. Delimiters are taken from the header.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultParser;

impl Parser for DefaultParser {
    fn parse(&self, text: &str) -> Result<Message, ParseError> {
        let mut lines = text.split(['\r', '\n']).filter(|line| !line.is_empty());
        let first = lines.next().ok_or(ParseError::Empty)?;
        let (delimiters, header) = parse_header(first)?;
        let segments = lines
            .map(|line| parse_segment(line, &delimiters))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Message::from_parts(delimiters, header, segments))
    }
}

fn parse_header(line: &str) -> Result<(Delimiters, Segment), ParseError> {
    let rest = line
        .strip_prefix(HEADER_SEGMENT)
        .ok_or_else(|| ParseError::MissingHeader {
            found: line.chars().take(3).collect(),
        })?;
    let mut chars = rest.chars();
    let field = chars.next().ok_or(ParseError::MissingEncodingCharacters)?;
    let mut parts = chars.as_str().split(field);

    let defaults = Delimiters::default();
    let mut encoding = parts.next().unwrap_or_default().chars();
    let component = encoding
        .next()
        .ok_or(ParseError::MissingEncodingCharacters)?;
    let delimiters = Delimiters {
        field,
        component,
        repetition: encoding.next().unwrap_or(defaults.repetition),
        escape: encoding.next().unwrap_or(defaults.escape),
        subcomponent: encoding.next().unwrap_or(defaults.subcomponent),
    };

    let fields = parts.map(|part| Field::parse(part, &delimiters)).collect();
    Ok((delimiters, Segment::new(HEADER_SEGMENT, fields)))
}

fn parse_segment(line: &str, delimiters: &Delimiters) -> Result<Segment, ParseError> {
    let mut parts = line.split(delimiters.field);
    let name = parts.next().unwrap_or_default();
    if !is_segment_name(name) {
        return Err(ParseError::InvalidSegmentName {
            name: name.to_owned(),
        });
    }
    let fields = parts.map(|part| Field::parse(part, delimiters)).collect();
    Ok(Segment::new(name, fields))
}

fn is_segment_name(name: &str) -> bool {
    name.len() == 3
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
