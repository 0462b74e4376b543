//! Executes `rt-core` requests with ureq.
//!
//! # Design
//! The agent never turns 4xx/5xx into `Err`, so every status reaches the
//! core's parse methods as data. Only failures below HTTP (DNS, connect, TLS,
//! body read) come back as `ureq::Error`.

use rt_core::{HttpBody, HttpMethod, HttpRequest, HttpResponse};
use tracing::debug;
use ureq::http::Response;
use ureq::tls::TlsConfig;
use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

/// Agent with a cookie jar for session logins and the given certificate
/// policy. No timeouts are configured.
pub fn agent(verify_tls: bool) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .tls_config(TlsConfig::builder().disable_verification(!verify_tls).build())
        .build()
        .new_agent()
}

/// Send one request and collect the response as plain data.
pub fn execute(agent: &Agent, request: HttpRequest) -> Result<HttpResponse, ureq::Error> {
    let url = request.url();
    debug!(method = %request.method, %url, "sending request");

    let HttpRequest {
        method, headers, body, ..
    } = request;
    let mut response = match method {
        HttpMethod::Get => with_headers(agent.get(url.as_str()), &headers).call(),
        HttpMethod::Delete => with_headers(agent.delete(url.as_str()), &headers).call(),
        HttpMethod::Post => send(with_headers(agent.post(url.as_str()), &headers), body),
        HttpMethod::Put => send(with_headers(agent.put(url.as_str()), &headers), body),
    }?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response.body_mut().read_to_string()?;
    debug!(status, %url, "received response");

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(builder: RequestBuilder<WithBody>, body: Option<HttpBody>) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(&body.into_bytes()[..]),
        None => builder.send_empty(),
    }
}
