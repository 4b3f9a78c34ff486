//! Pure encode/decode for the flat call-bridge wire format.
//!
//! Every message is a single string whose fields are separated by ASCII 0x01.
//! Outbound calls look like `functionName \x01 token \x01 arg...`, successful
//! replies like `token \x01 field...`, and out-of-band errors are free text
//! behind the literal `Error:` prefix.

use crate::registry::CallToken;

// -------------------------------------------------------------------------------------------------------

/// Field separator of the wire format. Never escaped: a field that contains
/// this character corrupts framing. That is a known limitation of the
/// protocol, kept as-is for compatibility with existing remote modules.
pub const FIELD_SEPARATOR: char = '\u{0001}';

/// Literal prefix of an out-of-band error notification.
pub const ERROR_PREFIX: &str = "Error:";

// -------------------------------------------------------------------------------------------------------

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Free-form error text from the remote side. Carries no token and
    /// matches no pending call.
    ErrorNotification(String),
    /// A reply to an earlier call, addressed by its correlation token.
    Reply { token: String, fields: Vec<String> },
}

// -------------------------------------------------------------------------------------------------------

/// Encodes an outbound call: `[function, token, args...]` joined with the
/// field separator. No trailing separator.
pub fn encode_call(function: &str, token: &CallToken, args: &[String]) -> String {
    let mut message = String::from(function);
    message.push(FIELD_SEPARATOR);
    message.push_str(token.as_str());
    for arg in args {
        message.push(FIELD_SEPARATOR);
        message.push_str(arg);
    }
    message
}

/// Encodes a reply the way a remote module does: `[token, fields...]` joined
/// with the field separator.
pub fn encode_reply(token: &str, fields: &[String]) -> String {
    let mut message = String::from(token);
    for field in fields {
        message.push(FIELD_SEPARATOR);
        message.push_str(field);
    }
    message
}

/// True iff the first six characters of `message` are exactly `Error:`.
/// A prefix test only; never scans the rest of the message.
pub fn is_error_notification(message: &str) -> bool {
    message.starts_with(ERROR_PREFIX)
}

/// Decodes one inbound message.
///
/// A message without any separator decodes to a reply whose token is the
/// whole message and whose field list is empty; the token lookup downstream
/// then simply fails, so malformed input is handled as an unmatched reply.
pub fn decode_inbound(message: &str) -> Inbound {
    if is_error_notification(message) {
        Inbound::ErrorNotification(message[ERROR_PREFIX.len()..].to_string())
    } else {
        let mut fields = message.split(FIELD_SEPARATOR);
        let token = fields.next().unwrap_or_default().to_string();
        Inbound::Reply {
            token,
            fields: fields.map(str::to_string).collect(),
        }
    }
}

// -------------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------------
