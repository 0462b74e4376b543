//! Field allow-lists and the ordered field map used for optional attributes.
//!
//! # Design
//! Each resource kind owns a constant table of the attribute names RT accepts
//! on create and update. `validate` compares caller-supplied names against
//! that table (exact, case-sensitive) and stops at the first stranger, before
//! any payload is assembled.

use std::fmt;
use std::ops::Deref;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

use crate::error::ApiError;

pub const QUEUE_FIELDS: &[&str] = &[
    "Name",
    "Description",
    "Lifecycle",
    "SubjectTag",
    "CorrespondAddress",
    "CommentAddress",
];

pub const TICKET_FIELDS: &[&str] = &[
    "Queue",
    "Status",
    "Owner",
    "Requestors",
    "Cc",
    "AdminCc",
    "Content",
    "ContentType",
];

pub const ASSET_FIELDS: &[&str] = &["Name", "Description", "Status", "Owner", "HeldBy", "Contact"];

pub const USER_FIELDS: &[&str] = &[
    "EmailAddress",
    "RealName",
    "NickName",
    "Gecos",
    "Lang",
    "Timezone",
    "FreeformContactInfo",
    "SetEnabled",
    "Enabled",
    "SetPrivileged",
    "CurrentPass",
    "Pass1",
    "Pass2",
    "Organization",
    "Address1",
    "Address2",
    "City",
    "State",
    "Zip",
    "Country",
    "HomePhone",
    "WorkPhone",
    "MobilePhone",
    "PagerPhone",
    "Comments",
];

/// The four kinds of record the client manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Queue,
    Ticket,
    Asset,
    User,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Queue,
        ResourceKind::Ticket,
        ResourceKind::Asset,
        ResourceKind::User,
    ];

    /// Attribute names accepted on create and update.
    pub fn allowed_fields(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Queue => QUEUE_FIELDS,
            ResourceKind::Ticket => TICKET_FIELDS,
            ResourceKind::Asset => ASSET_FIELDS,
            ResourceKind::User => USER_FIELDS,
        }
    }

    /// Singular path segment used by the REST API (`/queue`, `/ticket`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Queue => "queue",
            ResourceKind::Ticket => "ticket",
            ResourceKind::Asset => "asset",
            ResourceKind::User => "user",
        }
    }

    pub fn is_allowed(self, field: &str) -> bool {
        self.allowed_fields().contains(&field)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check every name against the allow-list for `kind`.
///
/// Returns `ApiError::InvalidField` for the first name that is not listed.
pub fn validate<'a, I>(kind: ResourceKind, names: I) -> Result<(), ApiError>
where
    I: IntoIterator<Item = &'a str>,
{
    for name in names {
        if !kind.is_allowed(name) {
            let allowed = kind.allowed_fields();
            error!(
                field = name,
                resource = %kind,
                "{name} not a valid {kind} field; valid {kind} fields: {}",
                allowed.join(", ")
            );
            return Err(ApiError::InvalidField {
                field: name.to_string(),
                resource: kind,
                allowed,
            });
        }
    }
    Ok(())
}

/// Ordered attribute map: field name to JSON value.
///
/// Insertion order is preserved in the serialized payload. Inserting a name
/// that is already present replaces its value in place. Read access goes
/// through the underlying `serde_json::Map`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fields(Map<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace `name`, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Deref for Fields {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Map<String, Value>> for Fields {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
