//! Splitting raw origin responses into status, headers and body.
//!
//! # Responsibilities
//! - Capture the session cookie (`Set-Cookie`) for re-emission
//! - Reject every status other than 200
//! - Cut the body at the first blank line (CRLF or bare LF framing)

use crate::net::TransportError;

const COOKIE_HEADER: &str = "Set-Cookie: ";

/// One parsed origin response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpExchange {
    status_line: String,
    headers: Vec<String>,
    cookie: Option<String>,
    body: String,
}

impl HttpExchange {
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// Header lines in arrival order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Same exchange with a rewritten body.
    pub fn with_body(self, body: String) -> Self {
        Self { body, ..self }
    }

    /// Give up the cookie and body.
    pub fn into_parts(self) -> (Option<String>, String) {
        (self.cookie, self.body)
    }
}

/// Status code of an `HTTP/x.y <code> <reason>` line.
fn status_code(status_line: &str) -> Option<&str> {
    status_line.split_whitespace().nth(1)
}

/// Split a complete raw response.
pub fn split(raw: &str) -> Result<HttpExchange, TransportError> {
    let cookie = raw.find(COOKIE_HEADER).map(|pos| {
        let value = &raw[pos + COOKIE_HEADER.len()..];
        let end = value.find(['\r', '\n']).unwrap_or(value.len());
        value[..end].to_string()
    });

    let Some(start) = raw.find("HTTP/") else {
        return Err(TransportError::Malformed("expecting HTTP response".to_string()));
    };
    let response = &raw[start..];

    let (head, body) = if let Some(pos) = response.find("\r\n\r\n") {
        (&response[..pos], &response[pos + 4..])
    } else if let Some(pos) = response.find("\n\n") {
        (&response[..pos], &response[pos + 2..])
    } else {
        return Err(TransportError::Malformed("no header/body separator".to_string()));
    };

    let mut lines = head.lines();
    let status_line = lines.next().unwrap_or_default().trim_end().to_string();
    if status_code(&status_line) != Some("200") {
        return Err(TransportError::BadStatus(status_line));
    }
    let headers = lines.map(|l| l.trim_end().to_string()).collect();

    Ok(HttpExchange {
        status_line,
        headers,
        cookie,
        body: body.to_string(),
    })
}
