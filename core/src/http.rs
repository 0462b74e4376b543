//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! ever touching the network; the host (`rt-client`, or a test) executes the
//! actual I/O.
//!
//! Query parameters are kept apart from `path` so they stay exactly as the
//! caller supplied them until `url()` encodes them.

use std::fmt;

use url::form_urlencoded;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body, tagged by encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    Json(String),
    /// `application/x-www-form-urlencoded`
    Form(String),
    Multipart(Vec<u8>),
}

impl HttpBody {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            HttpBody::Json(s) | HttpBody::Form(s) => s.as_bytes(),
            HttpBody::Multipart(b) => b,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            HttpBody::Json(s) | HttpBody::Form(s) => s.into_bytes(),
            HttpBody::Multipart(b) => b,
        }
    }

    /// The JSON text, if this is a JSON body.
    pub fn as_json(&self) -> Option<&str> {
        match self {
            HttpBody::Json(s) => Some(s),
            _ => None,
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `RtClient::build_*` methods. The caller is responsible for
/// executing this request against the network and returning the corresponding
/// `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    /// `path` with the query parameters form-url-encoded and appended.
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish();
        format!("{}?{query}", self.path)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an `HttpRequest`, then passed
/// to `RtClient::parse_*` methods for interpretation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: Vec<(String, String)>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: "http://rt.example/REST/2.0/tickets".to_string(),
            query,
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn url_without_query_is_path() {
        assert_eq!(request(Vec::new()).url(), "http://rt.example/REST/2.0/tickets");
    }

    #[test]
    fn url_encodes_query() {
        let req = request(vec![("query".to_string(), "Queue = 'General'".to_string())]);
        assert_eq!(
            req.url(),
            "http://rt.example/REST/2.0/tickets?query=Queue+%3D+%27General%27"
        );
    }

    #[test]
    fn url_keeps_every_pair() {
        let req = request(vec![
            ("query".to_string(), "Subject = 'a&b' AND Owner = 'Åse'".to_string()),
            ("page".to_string(), "2".to_string()),
        ]);
        assert_eq!(
            req.url(),
            "http://rt.example/REST/2.0/tickets?query=Subject+%3D+%27a%26b%27+AND+Owner+%3D+%27%C3%85se%27&page=2"
        );
    }

    #[test]
    fn body_bytes() {
        assert_eq!(HttpBody::Json("{}".to_string()).as_bytes(), b"{}");
        assert_eq!(HttpBody::Multipart(vec![1, 2]).into_bytes(), vec![1, 2]);
        assert_eq!(HttpBody::Form("a=b".to_string()).as_json(), None);
    }
}
