//! Small helpers shared by the HTTP clients.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

/// Build a client whose every request is bounded by `timeout`.
pub(crate) fn build_client(timeout: Duration, user_agent: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    builder.build().context("Failed to build HTTP client")
}

/// Describe a transport error without leaking the request URL (it carries the API key).
pub(crate) fn describe_transport_error(err: reqwest::Error) -> String {
    let err = err.without_url();
    if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
