//! Wire models shared by the API surface and the provider adapters.

use serde::{Deserialize, Serialize};

/// Logical request to send one email, independent of the transmitting
/// provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    /// Recipient email address
    pub to: String,
    /// Email subject
    pub subject: String,
    /// Body content, plain text or HTML depending on `is_html`
    pub content: String,
    /// Whether `content` is HTML
    #[serde(default)]
    pub is_html: bool,
    /// Sender address; omitted or `"self"` means the authenticated identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// CC recipients
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    /// BCC recipients
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    /// Reply-to address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl SendEmailRequest {
    /// Create a plain-text request with the required fields.
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            content: content.into(),
            is_html: false,
            from: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: None,
        }
    }

    /// Mark the content as HTML.
    pub fn html(mut self) -> Self {
        self.is_html = true;
        self
    }

    /// Set an explicit sender address.
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set CC recipients.
    pub fn with_cc(mut self, cc: Vec<String>) -> Self {
        self.cc = cc;
        self
    }

    /// Set BCC recipients.
    pub fn with_bcc(mut self, bcc: Vec<String>) -> Self {
        self.bcc = bcc;
        self
    }

    /// Set the reply-to address.
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

/// Result of a successful provider send.
///
/// Identifiers are opaque beyond equality and display; the thread id is
/// absent for providers without a correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Details of a previously sent message, as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDetails {
    pub id: String,
    pub thread_id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = SendEmailRequest::new("a@example.com", "Hi", "<p>Hello</p>")
            .html()
            .with_cc(vec!["b@example.com".to_string()])
            .with_reply_to("c@example.com");

        assert_eq!(request.to, "a@example.com");
        assert!(request.is_html);
        assert_eq!(request.cc.len(), 1);
        assert_eq!(request.reply_to.as_deref(), Some("c@example.com"));
    }

    #[test]
    fn test_request_wire_casing() {
        let json = serde_json::to_value(
            SendEmailRequest::new("a@example.com", "Hi", "Hello")
                .html()
                .with_reply_to("c@example.com"),
        )
        .unwrap();

        assert_eq!(json["isHtml"], true);
        assert_eq!(json["replyTo"], "c@example.com");
    }

    #[test]
    fn test_request_defaults_on_deserialize() {
        let request: SendEmailRequest = serde_json::from_str(
            r#"{"to": "a@example.com", "subject": "Hi", "content": "Hello"}"#,
        )
        .unwrap();

        assert!(!request.is_html);
        assert!(request.cc.is_empty());
        assert!(request.from.is_none());
    }

    #[test]
    fn test_send_result_wire_casing() {
        let result = SendResult {
            message_id: "m-1".to_string(),
            thread_id: Some("t-1".to_string()),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["messageId"], "m-1");
        assert_eq!(json["threadId"], "t-1");
    }
}
