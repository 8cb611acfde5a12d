//! Message construction and serialisation.

use std::fmt;

use super::{Delimiters, Field, HEADER_SEGMENT, Message, Segment};

/// Header values for a newly built message.
///
/// Routing fields are whole [`Field`]s so fields taken from another
/// message's header keep their repetitions and components whatever
/// delimiters that message declared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderFields {
    /// MSH-3.
    pub sending_application: Field,
    /// MSH-4.
    pub sending_facility: Field,
    /// MSH-5.
    pub receiving_application: Field,
    /// MSH-6.
    pub receiving_facility: Field,
    /// MSH-7.
    pub timestamp: String,
    /// MSH-8.
    pub security: String,
    /// MSH-9 components, for example `["ACK"]` or `["ADT", "A01"]`.
    pub message_type: Vec<String>,
    /// MSH-10.
    pub control_id: String,
    /// MSH-11.
    pub processing_id: String,
    /// MSH-12.
    pub version_id: String,
}

impl Message {
    /// Start a message with the default delimiters and the given header.
    #[must_use]
    pub fn new(header: HeaderFields) -> Self {
        let fields = vec![
            header.sending_application,
            header.sending_facility,
            header.receiving_application,
            header.receiving_facility,
            Field::text(header.timestamp),
            Field::text(header.security),
            Field::components(header.message_type),
            Field::text(header.control_id),
            Field::text(header.processing_id),
            Field::text(header.version_id),
        ];
        Self::from_parts(
            Delimiters::default(),
            Segment::new(HEADER_SEGMENT, fields),
            Vec::new(),
        )
    }

    /// Append a segment. Each field string is split on this message's
    /// repetition and component separators.
    pub fn add_segment<I, S>(&mut self, name: impl Into<String>, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = fields
            .into_iter()
            .map(|field| Field::parse(field.as_ref(), &self.delimiters))
            .collect();
        self.segments.push(Segment::new(name, fields));
        self
    }
}

impl fmt::Display for Message {
    /// Segments joined by `CR`, without a trailing terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.delimiters;
        write!(f, "{}{}{}", self.header.name(), d.field, d.encoding_characters())?;
        for field in self.header.fields() {
            write!(f, "{}{}", d.field, field.render(d))?;
        }
        for segment in &self.segments {
            write!(f, "\r{}", segment.name())?;
            for field in segment.fields() {
                write!(f, "{}{}", d.field, field.render(d))?;
            }
        }
        Ok(())
    }
}
