//! Default request headers and the scoped override used for uploads.
//!
//! # Design
//! `RtClient` attaches the same header set to every JSON request. A multipart
//! upload needs a different `Content-Type` for exactly one call, so the swap is
//! expressed as a guard: `RtClient::override_header` installs the new value and
//! the guard puts the previous one back when it is dropped, whichever way the
//! call ends.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::client::RtClient;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const AUTHORIZATION: &str = "Authorization";

pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Case-insensitive, ordered header list.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set `name`, returning the value it replaced.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name.to_string(), value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_vec(&self) -> Vec<(String, String)> {
        self.entries.clone()
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.entries {
            if k.eq_ignore_ascii_case(AUTHORIZATION) {
                map.entry(k, &"<redacted>");
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}

/// Restores a client's header to its previous value on drop.
///
/// Derefs to the client so requests built through the guard see the
/// overridden header.
pub struct HeaderOverride<'a> {
    client: &'a mut RtClient,
    name: &'static str,
    previous: Option<String>,
}

impl<'a> HeaderOverride<'a> {
    pub(crate) fn new(client: &'a mut RtClient, name: &'static str, value: String) -> Self {
        let previous = client.headers_mut().set(name, value);
        Self {
            client,
            name,
            previous,
        }
    }
}

impl Deref for HeaderOverride<'_> {
    type Target = RtClient;

    fn deref(&self) -> &RtClient {
        self.client
    }
}

impl DerefMut for HeaderOverride<'_> {
    fn deref_mut(&mut self) -> &mut RtClient {
        self.client
    }
}

impl Drop for HeaderOverride<'_> {
    fn drop(&mut self) {
        let headers = self.client.headers_mut();
        match self.previous.take() {
            Some(value) => {
                headers.set(self.name, value);
            }
            None => {
                headers.remove(self.name);
            }
        }
    }
}
