use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Split a line of whitespace separated `key:value` tokens.
///
/// Only the first `:` separates key from value, so values may contain
/// further colons.
pub fn parse_tokens(line: &str) -> Result<BTreeMap<String, String>, ProtocolError> {
    let mut fields = BTreeMap::new();
    for token in line.split_whitespace() {
        let (key, value) = token
            .split_once(':')
            .ok_or_else(|| ProtocolError::MalformedToken(token.to_string()))?;
        if key.is_empty() {
            return Err(ProtocolError::MalformedToken(token.to_string()));
        }
        fields.insert(key.to_string(), value.to_string());
    }
    Ok(fields)
}

fn parse_number<T: FromStr>(
    fields: &BTreeMap<String, String>,
    field: &'static str,
) -> Result<Option<T>, ProtocolError> {
    match fields.get(field) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ProtocolError::InvalidField {
                field,
                value: value.clone(),
            }),
    }
}

/// Event header sent by supervisord before each payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub ver: String,
    pub server: String,
    pub serial: u64,
    pub pool: String,
    pub pool_serial: u64,
    pub event_name: String,
    /// Payload length in bytes.
    pub len: usize,
}

impl Header {
    /// Parse a header line (without its trailing newline).
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let fields = parse_tokens(line)?;

        let event_name = fields
            .get("eventname")
            .filter(|name| !name.is_empty())
            .cloned()
            .ok_or(ProtocolError::MissingField("eventname"))?;
        let len = parse_number::<usize>(&fields, "len")?.ok_or(ProtocolError::MissingField("len"))?;

        Ok(Self {
            ver: fields.get("ver").cloned().unwrap_or_default(),
            server: fields.get("server").cloned().unwrap_or_default(),
            serial: parse_number(&fields, "serial")?.unwrap_or_default(),
            pool: fields.get("pool").cloned().unwrap_or_default(),
            pool_serial: parse_number(&fields, "poolserial")?.unwrap_or_default(),
            event_name,
            len,
        })
    }
}

/// Event payload: a line of `key:value` tokens, optionally followed by
/// free-form data (process log and communication events).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    pub fields: BTreeMap<String, String>,
    pub data: Option<String>,
}

impl Payload {
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        let (line, data) = match raw.split_once('\n') {
            Some((line, data)) => (line, Some(data.to_string())),
            None => (raw, None),
        };
        Ok(Self {
            fields: parse_tokens(line)?,
            data,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// One decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub header: Header,
    pub payload: Payload,
}

impl Notification {
    pub fn event_name(&self) -> &str {
        &self.header.event_name
    }
}

/// Messages a listener writes back to supervisord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Ready to accept the next event.
    Ready,
    /// The event was processed.
    Ok,
    /// The event was rejected; supervisord will rebuffer it.
    Fail,
}

impl Reply {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Ready => b"READY\n",
            Self::Ok => b"RESULT 2\nOK",
            Self::Fail => b"RESULT 4\nFAIL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_header() {
        let header = Header::parse(
            "ver:3.0 server:supervisor serial:21 pool:listener poolserial:10 eventname:PROCESS_STATE_EXITED len:84",
        )
        .unwrap();

        assert_eq!(header.ver, "3.0");
        assert_eq!(header.server, "supervisor");
        assert_eq!(header.serial, 21);
        assert_eq!(header.pool, "listener");
        assert_eq!(header.pool_serial, 10);
        assert_eq!(header.event_name, "PROCESS_STATE_EXITED");
        assert_eq!(header.len, 84);
    }

    #[rstest]
    #[case("ver:3.0 len:10", "eventname")]
    #[case("eventname:TICK_5", "len")]
    #[case("eventname: len:3", "eventname")]
    fn test_header_missing_field(#[case] line: &str, #[case] field: &str) {
        match Header::parse(line) {
            Err(ProtocolError::MissingField(missing)) => assert_eq!(missing, field),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_header_invalid_len() {
        let err = Header::parse("eventname:TICK_5 len:ten").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidField { field: "len", .. }));
    }

    #[test]
    fn test_malformed_token() {
        let err = parse_tokens("processname:cat garbage").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedToken(t) if t == "garbage"));
    }

    #[test]
    fn test_value_keeps_extra_colons() {
        let fields = parse_tokens("url:http://x:9001/rpc").unwrap();
        assert_eq!(fields["url"], "http://x:9001/rpc");
    }

    #[test]
    fn test_parse_state_payload() {
        let payload =
            Payload::parse("processname:cat groupname:cat from_state:RUNNING expected:0 pid:2766")
                .unwrap();
        assert_eq!(payload.get("processname"), Some("cat"));
        assert_eq!(payload.get("from_state"), Some("RUNNING"));
        assert_eq!(payload.get("pid"), Some("2766"));
        assert!(payload.data.is_none());
    }

    #[test]
    fn test_parse_log_payload_with_data() {
        let payload =
            Payload::parse("processname:web groupname:web pid:7 channel:stdout\nline one\nline two")
                .unwrap();
        assert_eq!(payload.get("channel"), Some("stdout"));
        assert_eq!(payload.data.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_reply_bytes() {
        assert_eq!(Reply::Ready.as_bytes(), b"READY\n");
        assert_eq!(Reply::Ok.as_bytes(), b"RESULT 2\nOK");
        assert_eq!(Reply::Fail.as_bytes(), b"RESULT 4\nFAIL");
    }
}
