//! MIME message composition.
//!
//! Builds the transport-ready representation of a logical send request:
//! an ordered header block, a CRLF-separated body in base64 transport
//! encoding, and a whole-message base64url envelope for providers that
//! accept a raw-message blob.

use crate::encoding::{b64_encode, b64url_encode};
use crate::models::SendEmailRequest;

/// Sentinel sender meaning "the authenticated identity". Suppresses the
/// From header so the provider fills it in.
pub const SELF_SENDER: &str = "self";

const CRLF: &str = "\r\n";

/// A composed email: ordered headers plus a transport-encoded body.
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    headers: Vec<(String, String)>,
    body: String,
}

impl ComposedMessage {
    /// Header name/value pairs in assembly order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Value of the first header with the given name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Base64 transport-encoded body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Render the RFC 2822 message: CRLF-joined headers, exactly one blank
    /// line, then the body.
    pub fn to_mime(&self) -> String {
        let header_block = self
            .headers
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join(CRLF);
        format!("{}{}{}{}", header_block, CRLF, CRLF, self.body)
    }

    /// The whole message as an unpadded base64url envelope, the form
    /// raw-blob provider endpoints expect.
    pub fn raw(&self) -> String {
        b64url_encode(self.to_mime())
    }
}

/// Build a transport-ready message from a logical send request.
pub fn compose(request: &SendEmailRequest) -> ComposedMessage {
    let mut headers: Vec<(String, String)> = Vec::new();

    headers.push(("To".to_string(), request.to.clone()));
    headers.push(("Subject".to_string(), encode_header_value(&request.subject)));

    if let Some(from) = &request.from {
        if from != SELF_SENDER {
            headers.push(("From".to_string(), from.clone()));
        }
    }

    if !request.cc.is_empty() {
        headers.push(("Cc".to_string(), request.cc.join(", ")));
    }

    if !request.bcc.is_empty() {
        headers.push(("Bcc".to_string(), request.bcc.join(", ")));
    }

    if let Some(reply_to) = &request.reply_to {
        headers.push(("Reply-To".to_string(), reply_to.clone()));
    }

    let content_type = if request.is_html {
        "text/html; charset=utf-8"
    } else {
        "text/plain; charset=utf-8"
    };
    headers.push(("Content-Type".to_string(), content_type.to_string()));
    headers.push(("MIME-Version".to_string(), "1.0".to_string()));
    headers.push(("Content-Transfer-Encoding".to_string(), "base64".to_string()));

    ComposedMessage {
        headers,
        body: b64_encode(request.content.as_bytes()),
    }
}

/// RFC 2047 encoded-word wrapping for header values with bytes outside
/// the ASCII range. ASCII values pass through untouched.
fn encode_header_value(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", b64_encode(value.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::b64url_decode;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    #[test]
    fn test_plain_text_headers() {
        let request = SendEmailRequest::new("a@example.com", "Hi", "Hello");
        let message = compose(&request);

        assert_eq!(message.header("To"), Some("a@example.com"));
        assert_eq!(message.header("Subject"), Some("Hi"));
        assert_eq!(
            message.header("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
        assert_eq!(message.header("MIME-Version"), Some("1.0"));
        assert_eq!(message.header("Content-Transfer-Encoding"), Some("base64"));
        assert_eq!(message.header("From"), None);
    }

    #[test]
    fn test_html_content_type() {
        let request = SendEmailRequest::new("a@example.com", "Hi", "<p>Hello</p>").html();
        let message = compose(&request);
        assert_eq!(
            message.header("Content-Type"),
            Some("text/html; charset=utf-8")
        );
    }

    #[test]
    fn test_header_assembly_order() {
        let request = SendEmailRequest::new("a@example.com", "Hi", "Hello")
            .with_from("sender@example.com")
            .with_cc(vec!["c1@example.com".to_string(), "c2@example.com".to_string()])
            .with_bcc(vec!["b@example.com".to_string()])
            .with_reply_to("r@example.com");
        let message = compose(&request);

        let names: Vec<&str> = message
            .headers()
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "To",
                "Subject",
                "From",
                "Cc",
                "Bcc",
                "Reply-To",
                "Content-Type",
                "MIME-Version",
                "Content-Transfer-Encoding"
            ]
        );
        assert_eq!(message.header("Cc"), Some("c1@example.com, c2@example.com"));
    }

    #[test]
    fn test_self_sender_suppresses_from() {
        let request = SendEmailRequest::new("a@example.com", "Hi", "Hello").with_from(SELF_SENDER);
        let message = compose(&request);
        assert_eq!(message.header("From"), None);
    }

    #[test]
    fn test_ascii_subject_passes_through() {
        let request = SendEmailRequest::new("a@example.com", "Quarterly report", "Hello");
        let message = compose(&request);
        assert_eq!(message.header("Subject"), Some("Quarterly report"));
    }

    #[test]
    fn test_non_ascii_subject_is_encoded_word() {
        let subject = "Grüße aus Zürich";
        let request = SendEmailRequest::new("a@example.com", subject, "Hello");
        let message = compose(&request);

        let encoded = message.header("Subject").unwrap();
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));

        let inner = &encoded["=?UTF-8?B?".len()..encoded.len() - 2];
        let decoded = STANDARD.decode(inner).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), subject);
    }

    #[test]
    fn test_body_is_base64_of_content() {
        let request = SendEmailRequest::new("a@example.com", "Hi", "Hello, world");
        let message = compose(&request);
        let decoded = STANDARD.decode(message.body()).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "Hello, world");
    }

    #[test]
    fn test_mime_has_exactly_one_blank_line() {
        let request = SendEmailRequest::new("a@example.com", "Hi", "Hello");
        let mime = compose(&request).to_mime();
        assert_eq!(mime.matches("\r\n\r\n").count(), 1);
    }

    #[test]
    fn test_raw_envelope_round_trips() {
        let request = SendEmailRequest::new("a@example.com", "Hi", "Hello");
        let message = compose(&request);
        let decoded = b64url_decode(&message.raw()).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), message.to_mime());
    }
}
