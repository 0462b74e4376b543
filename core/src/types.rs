//! Identifiers and request DTOs.
//!
//! # Design
//! RT addresses queues, assets and users by either their numeric id or their
//! name, so `ResourceId` carries both forms and renders itself as a single,
//! percent-encoded path segment. Ticket operations that take more than a name
//! and a field map get their own input struct, mirroring `CreateTodo`-style
//! payload types.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::fields::Fields;

/// Characters that may not appear raw inside one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A record's numeric id or its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    Id(u64),
    Name(String),
}

impl From<u64> for ResourceId {
    fn from(id: u64) -> Self {
        ResourceId::Id(id)
    }
}

impl From<&str> for ResourceId {
    fn from(name: &str) -> Self {
        ResourceId::Name(name.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(name: String) -> Self {
        ResourceId::Name(name)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Id(id) => write!(f, "{id}"),
            ResourceId::Name(name) => write!(f, "{}", utf8_percent_encode(name, PATH_SEGMENT)),
        }
    }
}

/// Input for `POST /ticket`. `subject` and `queue` are always sent.
#[derive(Debug, Clone, Default)]
pub struct CreateTicket {
    pub subject: String,
    pub queue: String,
    pub fields: Fields,
    pub custom_fields: Fields,
}

impl CreateTicket {
    pub fn new(subject: impl Into<String>, queue: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            queue: queue.into(),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(name, value);
        self
    }

    /// Add a custom field, e.g. `custom_field("CF.{IPv4}", "8.8.8.8")`.
    pub fn custom_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.custom_fields.insert(name, value);
        self
    }
}

/// Input for `PUT /ticket/{id}`. Only the supplied fields are sent.
#[derive(Debug, Clone, Default)]
pub struct UpdateTicket {
    pub fields: Fields,
    pub custom_fields: Fields,
}

impl UpdateTicket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(name, value);
        self
    }

    pub fn custom_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.custom_fields.insert(name, value);
        self
    }
}

/// Input for `POST /ticket/{id}/comment`.
#[derive(Debug, Clone)]
pub struct Comment {
    pub content: String,
    /// `text/plain` unless set otherwise.
    pub content_type: String,
    pub fields: Fields,
    pub custom_fields: Fields,
}

impl Comment {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: "text/plain".to_string(),
            fields: Fields::new(),
            custom_fields: Fields::new(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(name, value);
        self
    }

    pub fn custom_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.custom_fields.insert(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_render_verbatim() {
        assert_eq!(ResourceId::from(42).to_string(), "42");
    }

    #[test]
    fn names_are_encoded_as_one_segment() {
        assert_eq!(ResourceId::from("General").to_string(), "General");
        assert_eq!(ResourceId::from("Help Desk/EU").to_string(), "Help%20Desk%2FEU");
    }

    #[test]
    fn comment_defaults_to_plain_text() {
        let comment = Comment::new("looks good");
        assert_eq!(comment.content_type, "text/plain");
        assert!(comment.fields.is_empty());
        let html = Comment::new("<b>hi</b>").content_type("text/html");
        assert_eq!(html.content_type, "text/html");
    }

    #[test]
    fn create_ticket_collects_fields() {
        let input = CreateTicket::new("Printer on fire", "General")
            .field("Owner", "root")
            .custom_field("CF.{IPv4}", "8.8.8.8");
        assert_eq!(input.fields.get("Owner").unwrap(), "root");
        assert_eq!(input.custom_fields.get("CF.{IPv4}").unwrap(), "8.8.8.8");
    }
}
