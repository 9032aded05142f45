//! Static file server.
//!
//! Maps `/` to the default document and every other path to a file under
//! the root directory. Paths are joined as given; there is no traversal
//! protection, so only point this at a directory you are happy to expose.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tiny_http::{Method, Server};

use super::{Reply, access_log, request_path};
use crate::config::schema::StaticServerConfig;

/// Body of the 404 page.
pub const NOT_FOUND_BODY: &str = "<h1>404 - File not found</h1>";

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// Where files are served from.
#[derive(Debug, Clone)]
pub struct SiteRoot {
    pub root: PathBuf,
    pub default_document: String,
}

impl SiteRoot {
    pub fn from_config(config: &StaticServerConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            default_document: config.default_document.clone(),
        }
    }

    /// Local file for a request URL. The query string is ignored.
    pub fn resolve(&self, url: &str) -> PathBuf {
        match request_path(url) {
            "/" | "" => self.root.join(&self.default_document),
            path => self.root.join(path.trim_start_matches('/')),
        }
    }
}

/// Content type guessed from the file extension; `text/html` otherwise.
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        _ => "text/html",
    }
}

/// Answer one request.
///
/// `OPTIONS` gets an empty 200. Every other method is served like `GET`.
pub fn handle(method: &Method, url: &str, site: &SiteRoot) -> Reply {
    let reply = if *method == Method::Options {
        Reply {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        }
    } else {
        let path = site.resolve(url);
        match fs::read(&path) {
            Ok(bytes) => Reply::new(200, content_type_for(&path), bytes),
            Err(_) => Reply::new(404, "text/html", NOT_FOUND_BODY),
        }
    };

    with_cors(reply)
}

fn with_cors(reply: Reply) -> Reply {
    CORS_HEADERS
        .into_iter()
        .fold(reply, |reply, (name, value)| reply.with_header(name, value))
}

/// Serve `site` on `addr`. Blocks the current thread.
pub fn serve_files(addr: &str, site: &SiteRoot) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!(
        "Serving {} at http://{addr}",
        site.root.canonicalize().unwrap_or_else(|_| site.root.clone()).display()
    );

    for request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let reply = handle(&method, &url, site);
        let status = reply.status;
        let _ = request.respond(reply.into_response());

        access_log(&method, &url, status);
    }

    Ok(())
}
