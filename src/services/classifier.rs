//! Frame classification: heartbeat vs. structured event vs. malformed.

use serde_json::Value;
use tracing::debug;

use crate::models::event::{Classified, InboundEvent, PollMessage, DISCRIMINATOR};
use crate::models::poll::{Label, PollOption, PollSnapshot};

/// Classify one raw inbound frame.
///
/// Stage one decides whether the frame is structured at all: anything that
/// does not parse as JSON is a heartbeat. Stage two reads the discriminator
/// and decodes the event body.
pub fn classify(raw: &str) -> Classified {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => return Classified::Heartbeat(raw.to_string()),
    };
    classify_value(value)
}

fn classify_value(value: Value) -> Classified {
    let Value::Object(fields) = value else {
        return Classified::Malformed("structured frame is not an object".to_string());
    };
    let kind = match fields.get(DISCRIMINATOR) {
        Some(Value::String(kind)) => kind.clone(),
        Some(other) => {
            return Classified::Malformed(format!("{} is not a string: {}", DISCRIMINATOR, other))
        }
        None => return Classified::Malformed(format!("missing {}", DISCRIMINATOR)),
    };
    debug!(kind = %kind, "structured frame");

    match kind.as_str() {
        "poll" => match decode_poll(Value::Object(fields)) {
            Ok(snapshot) => Classified::Event(InboundEvent::Poll(snapshot)),
            Err(reason) => Classified::Malformed(reason),
        },
        "call" => Classified::Event(InboundEvent::Call),
        _ => Classified::Event(InboundEvent::Unrecognized(kind)),
    }
}

fn decode_poll(value: Value) -> Result<PollSnapshot, String> {
    let msg: PollMessage =
        serde_json::from_value(value).map_err(|e| format!("poll event: {}", e))?;
    let mut options = Vec::with_capacity(msg.options.len());
    for (key, text) in msg.options {
        let label = Label::parse(&key).ok_or_else(|| format!("invalid option label {:?}", key))?;
        let Value::String(text) = text else {
            return Err(format!("option {:?} text is not a string", key));
        };
        options.push(PollOption::new(label, text));
    }
    Ok(PollSnapshot::new(msg.title, msg.ends, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::poll::EndTime;

    #[test]
    fn non_structured_is_heartbeat() {
        assert_eq!(classify("ping"), Classified::Heartbeat("ping".into()));
        assert_eq!(classify(""), Classified::Heartbeat(String::new()));
        assert_eq!(
            classify("{not json"),
            Classified::Heartbeat("{not json".into())
        );
    }

    #[test]
    fn poll_frame_decodes_in_order() {
        let raw = r#"{"Mtype":"poll","Title":"X","Ends":1700000000,"Options":{"66":"Dogs","65":"Cats"}}"#;
        let Classified::Event(InboundEvent::Poll(snapshot)) = classify(raw) else {
            panic!("expected poll");
        };
        assert_eq!(snapshot.title, "X");
        assert_eq!(snapshot.ends, EndTime::Unix(1_700_000_000));
        let codes: Vec<u32> = snapshot.options.iter().map(|o| o.label.code()).collect();
        assert_eq!(codes, [66, 65]);
        assert_eq!(snapshot.options[0].text, "Dogs");
    }

    #[test]
    fn poll_with_fractional_end_decodes() {
        let raw = r#"{"Mtype":"poll","Title":"X","Ends":1700000000.5,"Options":{"65":"Cats"}}"#;
        let Classified::Event(InboundEvent::Poll(snapshot)) = classify(raw) else {
            panic!("expected poll");
        };
        assert!(matches!(snapshot.ends, EndTime::Number(_)));
        assert_eq!(snapshot.ends.file_stamp(), "2023-11-14_22-13-20");
        assert_eq!(snapshot.options.len(), 1);
    }

    #[test]
    fn call_and_unknown_kinds() {
        assert_eq!(
            classify(r#"{"Mtype":"call"}"#),
            Classified::Event(InboundEvent::Call)
        );
        assert_eq!(
            classify(r#"{"Mtype":"results","Data":[]}"#),
            Classified::Event(InboundEvent::Unrecognized("results".into()))
        );
    }

    #[test]
    fn missing_discriminator_is_malformed() {
        assert!(matches!(classify(r#"{"Title":"X"}"#), Classified::Malformed(_)));
        assert!(matches!(classify(r#"{"Mtype":7}"#), Classified::Malformed(_)));
        assert!(matches!(classify("42"), Classified::Malformed(_)));
    }

    #[test]
    fn poll_missing_fields_is_malformed() {
        assert!(matches!(
            classify(r#"{"Mtype":"poll","Title":"X","Ends":1}"#),
            Classified::Malformed(_)
        ));
        assert!(matches!(
            classify(r#"{"Mtype":"poll","Title":"X","Ends":1,"Options":{"65":3}}"#),
            Classified::Malformed(_)
        ));
        assert!(matches!(
            classify(r#"{"Mtype":"poll","Title":"X","Ends":1,"Options":{"AB":"x"}}"#),
            Classified::Malformed(_)
        ));
    }
}
