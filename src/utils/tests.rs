use super::error::Error;
use super::logging;

#[test]
fn logging_init_accepts_levels() {
    // Should not panic
    logging::init("info");
    logging::init("debug");
    logging::init("warn");
}

#[test]
fn parse_level_falls_back_to_info() {
    assert_eq!(logging::parse_level("WARNING"), tracing::Level::WARN);
    assert_eq!(logging::parse_level(" trace "), tracing::Level::TRACE);
    assert_eq!(logging::parse_level("verbose"), tracing::Level::INFO);
}

#[test]
fn error_messages_name_the_topic() {
    let err = Error::TopicTypeMismatch {
        topic: "HelloWorldTopic".to_string(),
        existing: "Other".to_string(),
        requested: "HelloWorldMsg".to_string(),
    };
    let text = err.to_string();
    assert!(text.contains("HelloWorldTopic"));
    assert!(text.contains("Other"));
}

#[test]
fn serde_errors_convert() {
    let parse = serde_json::from_str::<u32>("not a number").unwrap_err();
    let err: Error = parse.into();
    assert!(matches!(err, Error::Serialization(_)));
}

#[test]
fn only_transport_failures_end_a_read_loop() {
    assert!(Error::WebSocket(tungstenite::Error::ConnectionClosed).is_connection_lost());
    assert!(Error::ConnectionClosed.is_connection_lost());
    assert!(Error::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe)).is_connection_lost());

    let decode: Error = serde_json::from_str::<u32>("{}").unwrap_err().into();
    assert!(!decode.is_connection_lost());
    assert!(!Error::Remote("not subscribed".to_string()).is_connection_lost());
    assert!(!Error::TypeMismatch {
        topic_type: "HelloWorldMsg".to_string(),
        requested: "Other".to_string(),
    }
    .is_connection_lost());
}
