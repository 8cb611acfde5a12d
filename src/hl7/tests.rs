//! Tests for the HL7 message model, parser and builder.

use rstest::{fixture, rstest};

use super::*;

const ADT: &str = "MSH|^~\\&|LAB|NORTH|EHR|SOUTH|20240101120000||ADT^A01|MSG1|P|2.3\r\
                   PID|1||12345^^^HOSP~67890^^^STATE||DOE^JOHN\r\
                   NK1|1|DOE^JANE\r\
                   NK1|2|DOE^JIM";

#[fixture]
fn adt() -> Message { DefaultParser.parse(ADT).expect("sample parses") }

#[rstest]
fn header_fields_are_numbered_after_encoding_characters(adt: Message) {
    assert_eq!(adt.sending_application(), "LAB");
    assert_eq!(adt.sending_facility(), "NORTH");
    assert_eq!(adt.receiving_application(), "EHR");
    assert_eq!(adt.receiving_facility(), "SOUTH");
    assert_eq!(adt.header_field(5), "20240101120000");
    assert_eq!(adt.message_type(), "ADT");
    assert_eq!(adt.trigger_event(), "A01");
    assert_eq!(adt.control_id(), "MSG1");
}

#[rstest]
fn missing_header_fields_read_empty(adt: Message) {
    assert!(adt.header_field(40).is_empty());
    assert_eq!(adt.header_component(7, 9), "");
    assert_eq!(adt.header_component(0, 1), "");
}

#[rstest]
fn repeated_field_yields_list(adt: Message) {
    let ids = adt.segment_field("PID", 3).expect("PID-3 present");
    assert_eq!(
        ids,
        FieldValue::List(vec!["12345^^^HOSP".into(), "67890^^^STATE".into()])
    );
    assert_eq!(ids.occurrences().len(), 2);
    assert_eq!(ids.to_string(), "12345^^^HOSP~67890^^^STATE");
    assert!(ids.as_scalar().is_none());
}

#[rstest]
fn single_field_yields_scalar_with_components(adt: Message) {
    let name = adt.segment_field("PID", 5).expect("PID-5 present");
    assert_eq!(name, "DOE^JOHN");
    let pid = adt.segment("PID").expect("PID present");
    assert_eq!(pid.field(5).and_then(|f| f.component(2)), Some("JOHN"));
}

#[rstest]
fn segment_lookup(adt: Message) {
    assert_eq!(adt.segment("MSH").map(Segment::name), Some("MSH"));
    assert_eq!(adt.segments().len(), 3);
    assert_eq!(adt.segments_named("NK1").count(), 2);
    assert!(adt.segment("OBX").is_none());
}

#[rstest]
#[case("MSH|^~\\&|A|B\nPID|1")]
#[case("MSH|^~\\&|A|B\r\nPID|1")]
#[case("MSH|^~\\&|A|B\r\rPID|1\r")]
fn line_endings_are_tolerated(#[case] text: &str) {
    let message = DefaultParser.parse(text).expect("parses");
    assert_eq!(message.sending_application(), "A");
    assert_eq!(message.segments().len(), 1);
}

#[test]
fn custom_delimiters_are_honoured() {
    let message = DefaultParser
        .parse("MSH#$*\\&#APP#FAC###X$Y*Z##ORU$R01#C9")
        .expect("parses");
    assert_eq!(message.delimiters().field, '#');
    assert_eq!(message.delimiters().component, '$');
    assert_eq!(message.delimiters().repetition, '*');
    assert_eq!(message.sending_application(), "APP");
    assert_eq!(
        message.header_field(5),
        FieldValue::List(vec!["X$Y".into(), "Z".into()])
    );
    assert_eq!(message.message_type(), "ORU");
    assert_eq!(message.trigger_event(), "R01");
    assert_eq!(message.control_id(), "C9");
}

#[rstest]
#[case("", ParseError::Empty)]
#[case("\r\n", ParseError::Empty)]
#[case("PID|1||123", ParseError::MissingHeader { found: "PID".into() })]
#[case("MSH", ParseError::MissingEncodingCharacters)]
#[case("MSH||A", ParseError::MissingEncodingCharacters)]
#[case(
    "MSH|^~\\&|A\r\u{1c}",
    ParseError::InvalidSegmentName { name: "\u{1c}".into() }
)]
#[case(
    "MSH|^~\\&|A\rpid|1",
    ParseError::InvalidSegmentName { name: "pid".into() }
)]
fn malformed_payloads_are_rejected(#[case] text: &str, #[case] expected: ParseError) {
    assert_eq!(DefaultParser.parse(text), Err(expected));
}

#[test]
fn closures_act_as_parsers() {
    let parser = |_: &str| -> Result<Message, ParseError> { Err(ParseError::Empty) };
    assert_eq!(Parser::parse(&parser, "MSH|^~\\&"), Err(ParseError::Empty));
}

#[test]
fn built_message_serialises_header_and_segments() {
    let mut message = Message::new(HeaderFields {
        sending_application: "EHR".into(),
        sending_facility: "SOUTH".into(),
        receiving_application: "LAB".into(),
        receiving_facility: Field::parse("N1~N2^X", &Delimiters::default()),
        timestamp: "20240101120000".into(),
        message_type: vec!["ACK".into()],
        control_id: "ACK20240101120000".into(),
        processing_id: "P".into(),
        version_id: "2.3".into(),
        ..HeaderFields::default()
    });
    message.add_segment("MSA", ["AA", "MSG1"]);

    assert_eq!(
        message.to_string(),
        "MSH|^~\\&|EHR|SOUTH|LAB|N1~N2^X|20240101120000||ACK|ACK20240101120000|P|2.3\r\
         MSA|AA|MSG1"
    );
}

#[test]
fn fields_keep_repetitions_and_components() {
    let field = Field::parse("N1~N2^X", &Delimiters::default());
    assert_eq!(field.repetition_count(), 2);
    assert_eq!(field.component(1), Some("N1"));
    assert_eq!(Field::default().repetition_count(), 1);
    assert_eq!(Field::default().render(&Delimiters::default()), "");
    assert_eq!(Field::from("A^B").component(1), Some("A^B"));
}

#[rstest]
fn built_message_round_trips_through_parser(adt: Message) {
    let reparsed = DefaultParser.parse(&adt.to_string()).expect("reparses");
    assert_eq!(reparsed, adt);
}

#[test]
fn empty_message_type_renders_empty_field() {
    let message = Message::new(HeaderFields::default());
    assert_eq!(message.to_string(), "MSH|^~\\&||||||||||");
}
