//! Stateless HTTP request builder and response parser for RT REST 2.0.
//!
//! # Design
//! `RtClient` holds the API base URL, the server root used for logging in,
//! the credential mode and the default header set. It carries no other state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip.
//!
//! Every operation has exactly one success status. Anything else is an
//! `ApiError`; there is no generic 2xx check.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::fields::{validate, Fields, ResourceKind};
use crate::headers::{
    HeaderOverride, Headers, APPLICATION_JSON, AUTHORIZATION, CONTENT_TYPE, FORM_URLENCODED,
};
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
use crate::multipart::Multipart;
use crate::types::{Comment, CreateTicket, ResourceId, UpdateTicket};

/// Path appended to the server address to reach the API.
pub const API_PATH: &str = "/REST/2.0";

/// How the client proves who it is.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Auth {
    /// `Authorization: token <value>` on every request.
    Token(String),
    /// One form login against the server root; the session cookie does the rest.
    Login { username: String, password: String },
    /// No credentials. Requests are still sent and will be rejected remotely.
    #[default]
    None,
}

impl Auth {
    pub fn token(token: impl Into<String>) -> Self {
        Auth::Token(token.into())
    }

    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Login {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Blank credentials count as none: an empty token, or a login missing
    /// either half.
    fn usable(self) -> Self {
        match self {
            Auth::Token(token) if token.is_empty() => Auth::None,
            Auth::Login { username, password } if username.is_empty() || password.is_empty() => Auth::None,
            auth => auth,
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Auth::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Auth::None => f.write_str("None"),
        }
    }
}

/// Synchronous, stateless client for the RT REST 2.0 API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct RtClient {
    server: String,
    base_url: String,
    auth: Auth,
    headers: Headers,
}

impl RtClient {
    /// `server` may carry a scheme and port; trailing slashes are dropped.
    ///
    /// Never fails. Without credentials the client is flagged as
    /// unauthenticated and a warning is logged.
    pub fn new(server: &str, auth: Auth) -> Self {
        let server = server.trim_end_matches('/').to_string();
        let auth = auth.usable();
        let base_url = format!("{server}{API_PATH}");

        let mut headers = Headers::new();
        match &auth {
            Auth::Token(token) => {
                headers.set(AUTHORIZATION, format!("token {token}"));
            }
            Auth::Login { .. } => {}
            Auth::None => {
                warn!(%server, "no token or credentials supplied; requests will likely be rejected");
            }
        }
        headers.set(CONTENT_TYPE, APPLICATION_JSON);

        Self {
            server,
            base_url,
            auth,
            headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self.auth, Auth::None)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Replace header `name` until the returned guard is dropped.
    pub fn override_header(&mut self, name: &'static str, value: impl Into<String>) -> HeaderOverride<'_> {
        HeaderOverride::new(self, name, value.into())
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    /// The session login request, if this client authenticates with a
    /// username and password. It targets the server root, not the API base.
    pub fn build_login(&self) -> Result<Option<HttpRequest>, ApiError> {
        let Auth::Login { username, password } = &self.auth else {
            return Ok(None);
        };
        let form = serde_urlencoded::to_string([("user", username), ("pass", password)])
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Some(HttpRequest {
            method: HttpMethod::Post,
            path: self.server.clone(),
            query: Vec::new(),
            headers: vec![(CONTENT_TYPE.to_string(), FORM_URLENCODED.to_string())],
            body: Some(HttpBody::Form(form)),
        }))
    }

    /// RT answers a login with the web UI, possibly via a redirect; any 2xx
    /// or 3xx counts as accepted.
    pub fn parse_login(&self, response: HttpResponse) -> Result<(), ApiError> {
        if (200..400).contains(&response.status) {
            return Ok(());
        }
        Err(ApiError::UnexpectedStatus {
            expected: 200,
            status: response.status,
            body: error_body(&response.body),
        })
    }

    // -----------------------------------------------------------------------
    // Queues
    // -----------------------------------------------------------------------

    pub fn build_get_queues(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/queues/all")
    }

    pub fn build_get_queue(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/queue/{id}"))
    }

    pub fn build_get_queue_history(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/queue/{id}/history"))
    }

    pub fn build_create_queue(&self, name: &str, fields: &Fields) -> Result<HttpRequest, ApiError> {
        validate(ResourceKind::Queue, fields.names())?;
        let payload = payload(&[("Name", Value::from(name))], fields, None);
        self.json_request(HttpMethod::Post, "/queue", &payload)
    }

    pub fn build_update_queue(&self, id: &ResourceId, fields: &Fields) -> Result<HttpRequest, ApiError> {
        validate(ResourceKind::Queue, fields.names())?;
        self.json_request(HttpMethod::Put, &format!("/queue/{id}"), &payload(&[], fields, None))
    }

    pub fn build_disable_queue(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/queue/{id}"))
    }

    pub fn parse_get_queues(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_get_queue(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_get_queue_history(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_create_queue(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn parse_update_queue(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn parse_disable_queue(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    // -----------------------------------------------------------------------
    // Tickets
    // -----------------------------------------------------------------------

    pub fn build_get_ticket(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/ticket/{id}"))
    }

    pub fn build_get_ticket_history(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/ticket/{id}/history"))
    }

    pub fn build_create_ticket(&self, input: &CreateTicket) -> Result<HttpRequest, ApiError> {
        validate(ResourceKind::Ticket, input.fields.names())?;
        let payload = payload(
            &[
                ("Queue", Value::from(input.queue.as_str())),
                ("Subject", Value::from(input.subject.as_str())),
            ],
            &input.fields,
            Some(&input.custom_fields),
        );
        self.json_request(HttpMethod::Post, "/ticket", &payload)
    }

    pub fn build_update_ticket(&self, id: &ResourceId, input: &UpdateTicket) -> Result<HttpRequest, ApiError> {
        validate(ResourceKind::Ticket, input.fields.names())?;
        let payload = payload(&[], &input.fields, Some(&input.custom_fields));
        self.json_request(HttpMethod::Put, &format!("/ticket/{id}"), &payload)
    }

    pub fn build_post_comment(&self, id: &ResourceId, comment: &Comment) -> Result<HttpRequest, ApiError> {
        validate(ResourceKind::Ticket, comment.fields.names())?;
        let payload = payload(
            &[
                ("Content", Value::from(comment.content.as_str())),
                ("ContentType", Value::from(comment.content_type.as_str())),
            ],
            &comment.fields,
            Some(&comment.custom_fields),
        );
        self.json_request(HttpMethod::Post, &format!("/ticket/{id}/comment"), &payload)
    }

    /// Multipart comment carrying one attachment under the `file` key, with
    /// an `Attachment` field naming it.
    ///
    /// Uses the client's current headers, so call this through
    /// `override_header(CONTENT_TYPE, form.content_type())` on the form's
    /// boundary; see `upload_form`.
    pub fn build_upload_file(&self, id: &ResourceId, form: Multipart) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: self.url(&format!("/ticket/{id}/comment")),
            query: Vec::new(),
            headers: self.headers.to_vec(),
            body: Some(HttpBody::Multipart(form.into_body())),
        }
    }

    pub fn build_delete_ticket(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/ticket/{id}"))
    }

    /// `query` is handed to RT as-is in the `query` parameter.
    pub fn build_raw_search(&self, query: &str) -> HttpRequest {
        let mut request = self.request(HttpMethod::Get, "/tickets");
        request.query.push(("query".to_string(), query.to_string()));
        request
    }

    pub fn parse_get_ticket(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_get_ticket_history(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(&response, 200)
    }

    /// Returns the new ticket's `_url`.
    pub fn parse_create_ticket(&self, response: HttpResponse) -> Result<String, ApiError> {
        let body = parse_json(&response, 201)?;
        body.get("_url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ApiError::MissingField("_url"))
    }

    pub fn parse_update_ticket(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)
    }

    pub fn parse_post_comment(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn parse_upload_file(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)
    }

    pub fn parse_delete_ticket(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn parse_raw_search(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(&response, 200)
    }

    // -----------------------------------------------------------------------
    // Assets
    // -----------------------------------------------------------------------

    pub fn build_get_asset(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/asset/{id}"))
    }

    pub fn build_create_asset(&self, name: &str, fields: &Fields) -> Result<HttpRequest, ApiError> {
        validate(ResourceKind::Asset, fields.names())?;
        let payload = payload(&[("Name", Value::from(name))], fields, None);
        self.json_request(HttpMethod::Post, "/asset", &payload)
    }

    pub fn build_update_asset(&self, id: &ResourceId, fields: &Fields) -> Result<HttpRequest, ApiError> {
        validate(ResourceKind::Asset, fields.names())?;
        self.json_request(HttpMethod::Put, &format!("/asset/{id}"), &payload(&[], fields, None))
    }

    pub fn build_delete_asset(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/asset/{id}"))
    }

    pub fn parse_get_asset(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_create_asset(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn parse_update_asset(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn parse_delete_asset(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    pub fn build_get_user(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/user/{id}"))
    }

    pub fn build_get_user_history(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/user/{id}/history"))
    }

    pub fn build_create_user(&self, username: &str, fields: &Fields) -> Result<HttpRequest, ApiError> {
        validate(ResourceKind::User, fields.names())?;
        let payload = payload(&[("Name", Value::from(username))], fields, None);
        self.json_request(HttpMethod::Post, "/user", &payload)
    }

    pub fn build_update_user(&self, id: &ResourceId, fields: &Fields) -> Result<HttpRequest, ApiError> {
        validate(ResourceKind::User, fields.names())?;
        self.json_request(HttpMethod::Put, &format!("/user/{id}"), &payload(&[], fields, None))
    }

    pub fn build_disable_user(&self, id: &ResourceId) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/user/{id}"))
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_get_user_history(&self, response: HttpResponse) -> Result<Value, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn parse_disable_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: self.url(path),
            query: Vec::new(),
            headers: self.headers.to_vec(),
            body: None,
        }
    }

    fn json_request(&self, method: HttpMethod, path: &str, payload: &Map<String, Value>) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload)?;
        let mut request = self.request(method, path);
        request.body = Some(HttpBody::Json(body));
        Ok(request)
    }
}

/// Build a multipart form for one attachment: the `Attachment` field names
/// the file, the file itself goes under `file`.
pub fn upload_form(file_name: &str, contents: Vec<u8>) -> Multipart {
    Multipart::new()
        .text("Attachment", file_name)
        .file("file", file_name, contents)
}

/// Required keys first, then optional fields, then `CustomFields` when any
/// were supplied. Optional fields never replace a required key.
fn payload(required: &[(&str, Value)], fields: &Fields, custom_fields: Option<&Fields>) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in required {
        map.insert((*name).to_string(), value.clone());
    }
    if let Some(custom) = custom_fields.filter(|c| !c.is_empty()) {
        map.insert("CustomFields".to_string(), Value::Object((**custom).clone()));
    }
    for (name, value) in fields.iter() {
        if required.iter().any(|(r, _)| *r == name.as_str()) {
            continue;
        }
        map.insert(name.clone(), value.clone());
    }
    map
}

/// Non-empty error bodies are kept, as JSON when they parse and as a string
/// otherwise.
fn error_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

/// Map any status other than `expected` to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let body = error_body(&response.body);
    if response.status == 404 {
        return Err(ApiError::NotFound { body });
    }
    Err(ApiError::UnexpectedStatus {
        expected,
        status: response.status,
        body,
    })
}

fn parse_json(response: &HttpResponse, expected: u16) -> Result<Value, ApiError> {
    check_status(response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
