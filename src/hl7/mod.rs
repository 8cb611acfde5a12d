//! Minimal HL7 v2 message model.
//!
//! [`Message`] is what a [`Parser`] produces from a frame payload and what
//! the acknowledgment builder serialises. Fields are addressed by 1-based
//! position. The header segment (`MSH`) is numbered from the first field
//! after the encoding characters, so header field 1 is MSH-3 (sending
//! application) and header field 8 is MSH-10 (message control id).

mod builder;
mod parser;

use std::fmt;

pub use builder::HeaderFields;
pub use parser::{DefaultParser, ParseError, Parser};

/// Name of the header segment.
pub const HEADER_SEGMENT: &str = "MSH";

/// Separator characters in effect for a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delimiters {
    /// Field separator, `|` by default.
    pub field: char,
    /// Component separator, `^` by default.
    pub component: char,
    /// Repetition separator, `~` by default.
    pub repetition: char,
    /// Escape character, `\` by default.
    pub escape: char,
    /// Sub-component separator, `&` by default.
    pub subcomponent: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Delimiters {
    /// The MSH-2 value for these delimiters.
    #[must_use]
    pub fn encoding_characters(&self) -> String {
        [self.component, self.repetition, self.escape, self.subcomponent]
            .iter()
            .collect()
    }
}

/// Result of a field lookup.
///
/// A field with a single occurrence is a [`FieldValue::Scalar`]; a repeated
/// field is a [`FieldValue::List`] holding one string per repetition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// Single occurrence, components joined by the component separator.
    Scalar(String),
    /// One entry per repetition.
    List(Vec<String>),
}

impl Default for FieldValue {
    fn default() -> Self { Self::Scalar(String::new()) }
}

impl FieldValue {
    /// The value when it is a scalar.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::List(_) => None,
        }
    }

    /// Every occurrence, in order. A scalar yields one entry.
    #[must_use]
    pub fn occurrences(&self) -> Vec<&str> {
        match self {
            Self::Scalar(value) => vec![value.as_str()],
            Self::List(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Returns `true` for an empty scalar or an empty list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(value) => value.is_empty(),
            Self::List(values) => values.is_empty(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.write_str(value),
            Self::List(values) => {
                let repetition = Delimiters::default().repetition;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{repetition}")?;
                    }
                    f.write_str(value)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self { Self::Scalar(value.to_owned()) }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self { Self::Scalar(value) }
}

impl PartialEq<&str> for FieldValue {
    fn eq(&self, other: &&str) -> bool { self.as_scalar() == Some(*other) }
}

/// A field: one or more repetitions, each made of components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    repetitions: Vec<Vec<String>>,
}

impl Field {
    /// Split `text` into repetitions and components.
    #[must_use]
    pub fn parse(text: &str, delimiters: &Delimiters) -> Self {
        Self {
            repetitions: text
                .split(delimiters.repetition)
                .map(|rep| rep.split(delimiters.component).map(str::to_owned).collect())
                .collect(),
        }
    }

    /// A field holding `text` verbatim as its only component.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            repetitions: vec![vec![text.into()]],
        }
    }

    /// A single occurrence made of `components`.
    #[must_use]
    pub fn components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut components: Vec<String> = components.into_iter().map(Into::into).collect();
        if components.is_empty() {
            components.push(String::new());
        }
        Self {
            repetitions: vec![components],
        }
    }

    /// Number of repetitions.
    #[must_use]
    pub fn repetition_count(&self) -> usize { self.repetitions.len() }

    /// Component `n` (1-based) of the first repetition.
    #[must_use]
    pub fn component(&self, n: usize) -> Option<&str> {
        let index = n.checked_sub(1)?;
        self.repetitions
            .first()
            .and_then(|rep| rep.get(index))
            .map(String::as_str)
    }

    /// Scalar-or-list view of this field.
    #[must_use]
    pub fn value(&self, delimiters: &Delimiters) -> FieldValue {
        let mut rendered = self
            .repetitions
            .iter()
            .map(|rep| join(rep, delimiters.component));
        if self.repetitions.len() > 1 {
            FieldValue::List(rendered.collect())
        } else {
            FieldValue::Scalar(rendered.next().unwrap_or_default())
        }
    }

    /// Serialise with `delimiters`.
    #[must_use]
    pub fn render(&self, delimiters: &Delimiters) -> String {
        let reps: Vec<String> = self
            .repetitions
            .iter()
            .map(|rep| join(rep, delimiters.component))
            .collect();
        join(&reps, delimiters.repetition)
    }
}

impl Default for Field {
    fn default() -> Self { Self::text(String::new()) }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self { Self::text(value) }
}

fn join(parts: &[String], separator: char) -> String {
    let mut buf = [0; 4];
    parts.join(&*separator.encode_utf8(&mut buf))
}

/// A named segment and its fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    name: String,
    fields: Vec<Field>,
}

impl Segment {
    /// Create a segment.
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Three-character segment identifier.
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Field `n` (1-based).
    #[must_use]
    pub fn field(&self, n: usize) -> Option<&Field> { self.fields.get(n.checked_sub(1)?) }

    /// All fields in order.
    #[must_use]
    pub fn fields(&self) -> &[Field] { &self.fields }
}

/// A decoded HL7 v2 message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    delimiters: Delimiters,
    header: Segment,
    segments: Vec<Segment>,
}

impl Message {
    pub(crate) fn from_parts(delimiters: Delimiters, header: Segment, segments: Vec<Segment>) -> Self {
        Self {
            delimiters,
            header,
            segments,
        }
    }

    /// Delimiters declared by the header.
    #[must_use]
    pub fn delimiters(&self) -> &Delimiters { &self.delimiters }

    /// The `MSH` segment.
    #[must_use]
    pub fn header(&self) -> &Segment { &self.header }

    /// Segments following the header.
    #[must_use]
    pub fn segments(&self) -> &[Segment] { &self.segments }

    /// First segment called `name`. `"MSH"` returns the header.
    #[must_use]
    pub fn segment(&self, name: &str) -> Option<&Segment> {
        if name == HEADER_SEGMENT {
            return Some(&self.header);
        }
        self.segments.iter().find(|segment| segment.name == name)
    }

    /// Every segment called `name`, header excluded.
    pub fn segments_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments.iter().filter(move |segment| segment.name == name)
    }

    /// Field `n` of the first segment called `name`.
    #[must_use]
    pub fn segment_field(&self, name: &str, n: usize) -> Option<FieldValue> {
        self.segment(name)?
            .field(n)
            .map(|field| field.value(&self.delimiters))
    }

    /// Header field `n`; missing fields read as an empty scalar.
    #[must_use]
    pub fn header_field(&self, n: usize) -> FieldValue {
        self.header
            .field(n)
            .map(|field| field.value(&self.delimiters))
            .unwrap_or_default()
    }

    /// Component `component` of header field `field`; empty when absent.
    #[must_use]
    pub fn header_component(&self, field: usize, component: usize) -> &str {
        self.header
            .field(field)
            .and_then(|f| f.component(component))
            .unwrap_or_default()
    }

    /// MSH-3.
    #[must_use]
    pub fn sending_application(&self) -> FieldValue { self.header_field(1) }

    /// MSH-4.
    #[must_use]
    pub fn sending_facility(&self) -> FieldValue { self.header_field(2) }

    /// MSH-5.
    #[must_use]
    pub fn receiving_application(&self) -> FieldValue { self.header_field(3) }

    /// MSH-6.
    #[must_use]
    pub fn receiving_facility(&self) -> FieldValue { self.header_field(4) }

    /// MSH-9.1, for example `ADT`.
    #[must_use]
    pub fn message_type(&self) -> &str { self.header_component(7, 1) }

    /// MSH-9.2, for example `A01`.
    #[must_use]
    pub fn trigger_event(&self) -> &str { self.header_component(7, 2) }

    /// MSH-10.
    #[must_use]
    pub fn control_id(&self) -> String { self.header_field(8).to_string() }
}

#[cfg(test)]
mod tests;
