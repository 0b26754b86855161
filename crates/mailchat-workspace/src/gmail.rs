//! Minimal Gmail REST client: send, delete, list, and per-message metadata.

use std::time::Duration;

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use mailchat_core::EmailSummary;
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use crate::error::WorkspaceError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Listings are capped; no pagination.
pub const MAX_LIST_RESULTS: u32 = 10;

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageMetadata {
    id: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    payload: Option<Payload>,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

impl MessageMetadata {
    fn header(&self, name: &str) -> String {
        self.payload
            .as_ref()
            .and_then(|p| p.headers.iter().find(|h| h.name.eq_ignore_ascii_case(name)))
            .map(|h| h.value.clone())
            .unwrap_or_default()
    }

    fn into_summary(self) -> EmailSummary {
        EmailSummary {
            from: self.header("From"),
            subject: self.header("Subject"),
            id: self.id,
            snippet: self.snippet,
        }
    }
}

// ─────────────────────────────────────────────
// GmailClient
// ─────────────────────────────────────────────

pub struct GmailClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl std::fmt::Debug for GmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GmailClient {
    pub fn new(base_url: &str, access_token: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: base_url.to_string(),
            access_token: access_token.to_string(),
        }
    }

    /// `{base}/users/me/messages[/extra...]`
    fn messages_url(&self, extra: &[&str]) -> Result<Url, WorkspaceError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(["users", "me", "messages"])
            .extend(extra);
        Ok(url)
    }

    /// Send a plain-text message; returns the Gmail message id.
    pub async fn send_message(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<String, WorkspaceError> {
        let raw = URL_SAFE.encode(build_rfc2822(to, subject, body));
        let url = self.messages_url(&["send"])?;

        debug!(to = %to, "sending Gmail message");
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "raw": raw }))
            .send()
            .await?;
        let sent: SendResponse = check(response).await?.json().await?;
        Ok(sent.id)
    }

    /// Permanently delete a message.
    pub async fn delete_message(&self, message_id: &str) -> Result<(), WorkspaceError> {
        let url = self.messages_url(&[message_id])?;

        debug!(message_id = %message_id, "deleting Gmail message");
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// List up to [`MAX_LIST_RESULTS`] messages, then fetch From/Subject for each.
    ///
    /// Any failing metadata fetch fails the whole listing.
    pub async fn list_messages(&self, query: &str) -> Result<Vec<EmailSummary>, WorkspaceError> {
        let mut url = self.messages_url(&[])?;
        {
            let mut pairs = url.query_pairs_mut();
            if !query.is_empty() {
                pairs.append_pair("q", query);
            }
            pairs.append_pair("maxResults", &MAX_LIST_RESULTS.to_string());
        }

        debug!(query = %query, "listing Gmail messages");
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let listing: ListResponse = check(response).await?.json().await?;

        let mut summaries = Vec::with_capacity(listing.messages.len());
        for message in listing.messages {
            summaries.push(self.message_metadata(&message.id).await?.into_summary());
        }
        Ok(summaries)
    }

    async fn message_metadata(&self, message_id: &str) -> Result<MessageMetadata, WorkspaceError> {
        let mut url = self.messages_url(&[message_id])?;
        url.query_pairs_mut()
            .append_pair("format", "metadata")
            .append_pair("metadataHeaders", "From")
            .append_pair("metadataHeaders", "Subject");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Pass 2xx responses through; turn anything else into `WorkspaceError::Api`.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, WorkspaceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    error!(status = %status, body = %body, "Gmail API error");
    Err(WorkspaceError::from_api_body(status.as_u16(), &body))
}

// ─────────────────────────────────────────────
// Message encoding
// ─────────────────────────────────────────────

/// Build a UTF-8 plain-text RFC 2822 message.
fn build_rfc2822(to: &str, subject: &str, body: &str) -> String {
    format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=\"utf-8\"\r\nContent-Transfer-Encoding: 8bit\r\n\r\n{}",
        header_value(to),
        encode_subject(&header_value(subject)),
        body
    )
}

/// Header values cannot contain line breaks.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// RFC 2047 encoded-word for non-ASCII subjects.
fn encode_subject(subject: &str) -> String {
    if subject.is_ascii() {
        subject.to_string()
    } else {
        format!("=?utf-8?b?{}?=", STANDARD.encode(subject))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_messages_url_handles_trailing_slash() {
        let client = GmailClient::new("https://gmail.googleapis.com/gmail/v1/", "t");
        assert_eq!(
            client.messages_url(&["abc"]).unwrap().as_str(),
            "https://gmail.googleapis.com/gmail/v1/users/me/messages/abc"
        );
    }

    #[test]
    fn test_rfc2822_strips_header_injection() {
        let raw = build_rfc2822("a@b.com\r\nBcc: evil@x.com", "Hi", "Body text");
        assert!(raw.starts_with("To: a@b.com  Bcc: evil@x.com\r\nSubject: Hi\r\n"));
        assert!(raw.ends_with("\r\n\r\nBody text"));
    }

    #[test]
    fn test_non_ascii_subject_is_encoded() {
        assert_eq!(encode_subject("Plain"), "Plain");
        let encoded = encode_subject("Grüße");
        assert!(encoded.starts_with("=?utf-8?b?"));
        let inner = encoded.trim_start_matches("=?utf-8?b?").trim_end_matches("?=");
        assert_eq!(STANDARD.decode(inner).unwrap(), "Grüße".as_bytes());
    }

    #[tokio::test]
    async fn test_send_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/me/messages/send"))
            .and(header("authorization", "Bearer access-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "18c0ffee",
                "threadId": "18c0ffee",
                "labelIds": ["SENT"]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GmailClient::new(&mock_server.uri(), "access-1");
        let id = client.send_message("a@b.com", "Hi", "Hello").await.unwrap();
        assert_eq!(id, "18c0ffee");

        let requests = mock_server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let raw = URL_SAFE.decode(body["raw"].as_str().unwrap()).unwrap();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.contains("To: a@b.com\r\n"));
        assert!(text.ends_with("Hello"));
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users/me/messages/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": 404, "message": "Requested entity was not found."}
            })))
            .mount(&mock_server)
            .await;

        let client = GmailClient::new(&mock_server.uri(), "t");
        let err = client.delete_message("missing").await.unwrap_err();
        match err {
            WorkspaceError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Requested entity was not found.");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_messages_fetches_metadata() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/messages"))
            .and(query_param("q", "from:boss"))
            .and(query_param("maxResults", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{"id": "m1", "threadId": "t1"}],
                "resultSizeEstimate": 1
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/me/messages/m1"))
            .and(query_param("format", "metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "m1",
                "snippet": "Quarterly numbers",
                "payload": {"headers": [
                    {"name": "From", "value": "Boss <boss@corp.com>"},
                    {"name": "Subject", "value": "Q3"}
                ]}
            })))
            .mount(&mock_server)
            .await;

        let client = GmailClient::new(&mock_server.uri(), "t");
        let emails = client.list_messages("from:boss").await.unwrap();
        assert_eq!(
            emails,
            vec![EmailSummary {
                id: "m1".into(),
                from: "Boss <boss@corp.com>".into(),
                subject: "Q3".into(),
                snippet: "Quarterly numbers".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_list_empty_mailbox() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me/messages"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"resultSizeEstimate": 0})),
            )
            .mount(&mock_server)
            .await;

        let client = GmailClient::new(&mock_server.uri(), "t");
        assert!(client.list_messages("").await.unwrap().is_empty());
    }
}
