//! HTTP responses.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::embed::serve::{hotreload_js, script_tag};
use crate::utils::mime::{self, types};

/// Respond with a file from the output tree. HTML gets the live reload
/// script when `ws_port` is set.
pub fn respond_file(request: Request, path: &Path, ws_port: Option<u16>) -> Result<()> {
    let content_type = mime::from_path(path);
    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = match ws_port {
        Some(_) if mime::is_html(content_type) => inject_reload_script(&body),
        _ => body,
    };
    send_body(request, 200, content_type, body)
}

/// Respond with 404: the site's own `404.html` when present.
pub fn respond_not_found(request: Request, root: &Path, ws_port: Option<u16>) -> Result<()> {
    let custom = root.join("404.html");
    if custom.is_file() && !is_head_request(&request) {
        let body = fs::read(&custom)
            .with_context(|| format!("failed to read {}", custom.display()))?;
        let body = match ws_port {
            Some(_) => inject_reload_script(&body),
            None => body,
        };
        return send_body(request, 404, types::HTML, body);
    }
    send_body(request, 404, types::PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 while shutting down.
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, types::PLAIN, b"503 Service Unavailable".to_vec())
}

/// Respond with the live reload client.
pub fn respond_hotreload_js(request: Request, ws_port: u16) -> Result<()> {
    let body = hotreload_js(ws_port);
    send_body(request, 200, types::JAVASCRIPT, body.into_bytes())
}

/// Insert the live reload script before the last `</body>`, or append it.
pub fn inject_reload_script(content: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";
    let tag = script_tag();
    let tag = tag.as_bytes();

    let pos = content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
        .unwrap_or(content.len());

    let mut result = Vec::with_capacity(content.len() + tag.len());
    result.extend_from_slice(&content[..pos]);
    result.extend_from_slice(tag);
    result.extend_from_slice(&content[pos..]);
    result
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response = Response::empty(StatusCode(status))
        .with_header(header("Content-Type", content_type)?)
        .with_header(header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn send_body(request: Request, status: u16, content_type: &'static str, body: Vec<u8>) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type)?)
        .with_header(header("Cache-Control", "no-store")?);
    request.respond(response)?;
    Ok(())
}

fn header(key: &'static str, value: &'static str) -> Result<Header> {
    Header::from_bytes(key, value).map_err(|()| anyhow!("invalid header {key}: {value}"))
}
