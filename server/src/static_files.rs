//! Static hosting for the built frontend: SPA fallback to `index.html`,
//! MIME by extension, root confinement and optional CDN rewriting of bare
//! module imports in JavaScript.

use axum::{
    extract::State,
    http::{header, Uri},
    response::{IntoResponse, Response},
    Router,
};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::error::ServeError;

pub const INDEX_FILE: &str = "index.html";
pub const DEFAULT_MIME: &str = "application/octet-stream";
pub const NO_CACHE: &str = "no-cache";
pub const IMMUTABLE: &str = "public, max-age=31536000, immutable";

const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("ts", "application/typescript"),
    ("css", "text/css"),
    ("json", "application/json"),
    ("wasm", "application/wasm"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("eot", "application/vnd.ms-fontobject"),
];

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn mime_type(path: &Path) -> &'static str {
    extension(path)
        .and_then(|ext| {
            MIME_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(DEFAULT_MIME)
}

/// Source files revalidate on every load; everything else is fingerprinted.
pub fn cache_control(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("js" | "mjs" | "ts" | "css" | "html") => NO_CACHE,
        _ => IMMUTABLE,
    }
}

fn is_javascript(path: &Path) -> bool {
    matches!(extension(path).as_deref(), Some("js" | "mjs"))
}

/// Client routes have no extension and resolve to the app shell.
pub fn is_spa_route(pathname: &str) -> bool {
    pathname == "/" || Path::new(pathname).extension().is_none()
}

fn is_bare_specifier(spec: &str) -> bool {
    !spec.is_empty() && !spec.starts_with(['.', '/']) && !spec.contains("://")
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Points `from 'pkg'` specifiers at `{cdn_base_url}/pkg`; relative,
/// absolute and URL specifiers are left alone.
pub fn rewrite_bare_imports(source: &str, cdn_base_url: &str) -> String {
    let cdn_base_url = cdn_base_url.trim_end_matches('/');
    let mut out = String::with_capacity(source.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(found) = source[search..].find("from") {
        let at = search + found;
        search = at + "from".len();
        if source[..at].chars().next_back().is_some_and(is_ident_char) {
            continue;
        }
        let after = &source[search..];
        let trimmed = after.trim_start();
        let Some(quote) = trimmed.chars().next().filter(|c| *c == '\'' || *c == '"') else {
            continue;
        };
        let spec_start = search + (after.len() - trimmed.len()) + 1;
        let Some(len) = source[spec_start..].find(quote) else {
            break;
        };
        let spec = &source[spec_start..spec_start + len];
        if is_bare_specifier(spec) {
            out.push_str(&source[copied..spec_start]);
            out.push_str(cdn_base_url);
            out.push('/');
            out.push_str(spec);
            copied = spec_start + len;
        }
        search = spec_start + len;
    }

    out.push_str(&source[copied..]);
    out
}

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    cdn_rewrite: Option<String>,
}

fn io_error(err: std::io::Error) -> ServeError {
    if err.kind() == ErrorKind::NotFound {
        ServeError::NotFound
    } else {
        ServeError::Io(err)
    }
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, cdn_rewrite: Option<String>) -> Self {
        Self {
            root: root.into(),
            cdn_rewrite,
        }
    }

    /// File under the root for `pathname`; anything escaping it is refused.
    pub async fn resolve(&self, pathname: &str) -> Result<PathBuf, ServeError> {
        let root = tokio::fs::canonicalize(&self.root).await.map_err(io_error)?;
        let mut path = root.clone();
        for segment in pathname.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(ServeError::Forbidden),
                s if s.contains('\\') => return Err(ServeError::Forbidden),
                s => path.push(s),
            }
        }

        let resolved = tokio::fs::canonicalize(&path).await.map_err(io_error)?;
        if !resolved.starts_with(&root) {
            tracing::warn!(path = %pathname, "request escapes static root");
            return Err(ServeError::Forbidden);
        }
        if !tokio::fs::metadata(&resolved).await?.is_file() {
            return Err(ServeError::NotFound);
        }
        Ok(resolved)
    }

    pub async fn respond(&self, pathname: &str) -> Result<Response, ServeError> {
        let target = if is_spa_route(pathname) {
            format!("/{}", INDEX_FILE)
        } else {
            pathname.to_string()
        };
        let path = self.resolve(&target).await?;
        let body = tokio::fs::read(&path).await?;

        let body = match (&self.cdn_rewrite, is_javascript(&path)) {
            (Some(cdn), true) => match String::from_utf8(body) {
                Ok(source) => rewrite_bare_imports(&source, cdn).into_bytes(),
                Err(err) => err.into_bytes(),
            },
            _ => body,
        };

        Ok((
            [
                (header::CONTENT_TYPE, mime_type(&path)),
                (header::CACHE_CONTROL, cache_control(&path)),
            ],
            body,
        )
            .into_response())
    }
}

pub async fn serve(State(files): State<Arc<StaticFiles>>, uri: Uri) -> Result<Response, ServeError> {
    files.respond(uri.path()).await
}

pub fn router(files: StaticFiles) -> Router {
    Router::new().fallback(serve).with_state(Arc::new(files))
}
