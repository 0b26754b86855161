//! Intent parser for the chat command language.
//!
//! Patterns are tried in order and the first match wins:
//!
//! ```text
//! send email to <recipient> [subject <subject>] [body|message <body>]
//! delete email <id>
//! list emails [<query>]
//! ```
//!
//! Matching is case-insensitive. Send and delete match anywhere in the
//! message; list must be the whole (trimmed) message.

use std::sync::OnceLock;

use regex::{Captures, Regex};

const SEND_PATTERN: &str = r"(?is)send\s+email\s+to\s+(\S+)(.*)";
const SEND_CLAUSES_PATTERN: &str =
    r"(?is)^\s*(?:subject\s+(.*?))?(?:\s*\b(?:body|message)\s+(.*))?\s*$";
const LEADING_SUBJECT_PATTERN: &str = r"(?i)^\s*subject\b";
const DELETE_PATTERN: &str = r"(?i)delete\s+email\s+([\w-]+)";
const LIST_PATTERN: &str = r"(?is)^list\s+emails(?:\s+(.*))?$";

/// Structured action inferred from a chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedIntent {
    SendEmail {
        to: String,
        subject: String,
        body: String,
    },
    DeleteEmail {
        message_id: String,
    },
    ListEmails {
        query: String,
    },
    /// Plain chat; goes to a language model.
    None,
}

impl ParsedIntent {
    pub fn is_email_action(&self) -> bool {
        !matches!(self, ParsedIntent::None)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ParsedIntent::SendEmail { .. } => "send_email",
            ParsedIntent::DeleteEmail { .. } => "delete_email",
            ParsedIntent::ListEmails { .. } => "list_emails",
            ParsedIntent::None => "none",
        }
    }
}

/// Compile `source` once into `cell`. A pattern that fails to compile never
/// matches.
fn pattern(cell: &'static OnceLock<Option<Regex>>, source: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(source).ok()).as_ref()
}

fn send_re() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&CELL, SEND_PATTERN)
}

fn send_clauses_re() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&CELL, SEND_CLAUSES_PATTERN)
}

fn leading_subject_re() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&CELL, LEADING_SUBJECT_PATTERN)
}

fn delete_re() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&CELL, DELETE_PATTERN)
}

fn list_re() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(&CELL, LIST_PATTERN)
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Classify `message` as an email action or plain chat.
pub fn parse_intent(message: &str) -> ParsedIntent {
    if let Some(caps) = send_re().and_then(|re| re.captures(message)) {
        let to = group(&caps, 1);
        let rest = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let (subject, body) = parse_send_clauses(rest);
        return ParsedIntent::SendEmail { to, subject, body };
    }

    if let Some(caps) = delete_re().and_then(|re| re.captures(message)) {
        return ParsedIntent::DeleteEmail {
            message_id: group(&caps, 1),
        };
    }

    if let Some(caps) = list_re().and_then(|re| re.captures(message.trim())) {
        return ParsedIntent::ListEmails {
            query: group(&caps, 1),
        };
    }

    ParsedIntent::None
}

/// Split what follows the recipient into `(subject, body)`.
///
/// Without an explicit `body`/`message` clause the whole remainder becomes
/// the body, minus a leading `subject` keyword.
fn parse_send_clauses(rest: &str) -> (String, String) {
    let caps = send_clauses_re().and_then(|re| re.captures(rest));
    let subject = caps.as_ref().map(|c| group(c, 1)).unwrap_or_default();
    let explicit_body = caps
        .as_ref()
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().trim().to_string());

    let body = match explicit_body {
        Some(body) => body,
        None => match leading_subject_re() {
            Some(re) => re.replace(rest, "").trim().to_string(),
            None => rest.trim().to_string(),
        },
    };
    (subject, body)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn send(to: &str, subject: &str, body: &str) -> ParsedIntent {
        ParsedIntent::SendEmail {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    #[test]
    fn test_send_with_subject_and_body() {
        assert_eq!(
            parse_intent("send email to alice@example.com subject Lunch body See you at noon"),
            send("alice@example.com", "Lunch", "See you at noon")
        );
    }

    #[test]
    fn test_send_is_case_insensitive_and_accepts_message_keyword() {
        assert_eq!(
            parse_intent("Please SEND EMAIL TO bob@x.io Subject Report Message attached below  "),
            send("bob@x.io", "Report", "attached below")
        );
    }

    #[test]
    fn test_send_free_text_becomes_body() {
        assert_eq!(
            parse_intent("send email to bob@x.io are we still on for friday?"),
            send("bob@x.io", "", "are we still on for friday?")
        );
    }

    #[test]
    fn test_send_subject_only_falls_back_to_remainder() {
        assert_eq!(
            parse_intent("send email to bob@x.io subject Status update"),
            send("bob@x.io", "Status update", "Status update")
        );
    }

    #[test]
    fn test_send_body_only() {
        assert_eq!(
            parse_intent("send email to bob@x.io body hi there"),
            send("bob@x.io", "", "hi there")
        );
    }

    #[test]
    fn test_send_spans_lines() {
        assert_eq!(
            parse_intent("send email to bob@x.io subject Notes\nbody line one\nline two"),
            send("bob@x.io", "Notes", "line one\nline two")
        );
    }

    #[test]
    fn test_send_body_keyword_needs_word_boundary() {
        assert_eq!(
            parse_intent("send email to bob@x.io subject nobody came body sad"),
            send("bob@x.io", "nobody came", "sad")
        );
    }

    #[test]
    fn test_send_without_remainder() {
        assert_eq!(parse_intent("send email to bob@x.io"), send("bob@x.io", "", ""));
    }

    #[test]
    fn test_delete() {
        assert_eq!(
            parse_intent("delete email abc-123"),
            ParsedIntent::DeleteEmail {
                message_id: "abc-123".into()
            }
        );
        assert_eq!(
            parse_intent("could you Delete Email 18c_9f now"),
            ParsedIntent::DeleteEmail {
                message_id: "18c_9f".into()
            }
        );
    }

    #[test]
    fn test_list() {
        assert_eq!(
            parse_intent("list emails from boss"),
            ParsedIntent::ListEmails {
                query: "from boss".into()
            }
        );
        assert_eq!(
            parse_intent("  List Emails  "),
            ParsedIntent::ListEmails { query: "".into() }
        );
    }

    #[test]
    fn test_list_must_be_whole_message() {
        assert_eq!(parse_intent("please list emails"), ParsedIntent::None);
        assert_eq!(parse_intent("list emailsfrom"), ParsedIntent::None);
    }

    #[test]
    fn test_plain_chat() {
        let intent = parse_intent("hello there");
        assert_eq!(intent, ParsedIntent::None);
        assert!(!intent.is_email_action());
        assert_eq!(intent.kind(), "none");
    }

    #[test]
    fn test_send_wins_over_delete() {
        let intent = parse_intent("send email to a@b.com body delete email xyz");
        assert_eq!(intent, send("a@b.com", "", "delete email xyz"));
    }
}
