use anyhow::anyhow;
use std::{env, net::SocketAddr, path::PathBuf};

pub const DEFAULT_STATIC_ROOT: &str = "frontend/dist";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_CDN_BASE_URL: &str = "https://esm.sh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub static_root: PathBuf,
    pub bind_addr: SocketAddr,
    pub cdn_base_url: String,
    pub rewrite_bare_imports: bool,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let static_root = lookup("STATIC_ROOT").unwrap_or_else(|| DEFAULT_STATIC_ROOT.to_string());

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|_| anyhow!("Invalid BIND_ADDR value: {}", bind_addr))?;

        let cdn_base_url = lookup("CDN_BASE_URL")
            .unwrap_or_else(|| DEFAULT_CDN_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let rewrite_bare_imports = lookup("REWRITE_BARE_IMPORTS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            static_root: PathBuf::from(static_root),
            bind_addr,
            cdn_base_url,
            rewrite_bare_imports,
        })
    }

    /// CDN base used for rewriting, when enabled.
    pub fn rewrite_target(&self) -> Option<String> {
        self.rewrite_bare_imports.then(|| self.cdn_base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.static_root, PathBuf::from(DEFAULT_STATIC_ROOT));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.cdn_base_url, DEFAULT_CDN_BASE_URL);
        assert!(!config.rewrite_bare_imports);
        assert_eq!(config.rewrite_target(), None);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("STATIC_ROOT", "/srv/qams"),
            ("BIND_ADDR", "0.0.0.0:3000"),
            ("CDN_BASE_URL", "https://cdn.example/"),
            ("REWRITE_BARE_IMPORTS", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(config.static_root, PathBuf::from("/srv/qams"));
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.rewrite_target().as_deref(), Some("https://cdn.example"));
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = Config::from_lookup(lookup(&[("BIND_ADDR", "localhost")])).unwrap_err();
        assert!(err.to_string().contains("BIND_ADDR"));
    }
}
