use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::UTC;

/// Raw settings as found in `window.__QAMS_ENV` or `./config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default, alias = "SUPABASE_URL")]
    pub supabase_url: Option<String>,
    #[serde(default, alias = "SUPABASE_ANON_KEY")]
    pub supabase_anon_key: Option<String>,
    #[serde(default, alias = "TIME_ZONE")]
    pub time_zone: Option<String>,
}

impl RuntimeConfig {
    /// Fills keys missing here from `other`.
    pub fn or(self, other: RuntimeConfig) -> RuntimeConfig {
        fn pick(a: Option<String>, b: Option<String>) -> Option<String> {
            a.filter(|v| !v.trim().is_empty()).or(b)
        }
        RuntimeConfig {
            supabase_url: pick(self.supabase_url, other.supabase_url),
            supabase_anon_key: pick(self.supabase_anon_key, other.supabase_anon_key),
            time_zone: pick(self.time_zone, other.time_zone),
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn is_empty(&self) -> bool {
        self.supabase_url.is_none() && self.supabase_anon_key.is_none() && self.time_zone.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub time_zone: Tz,
    pub time_zone_is_fallback: bool,
}

pub fn parse_time_zone(value: Option<&str>) -> (Tz, bool) {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(name) => match name.parse::<Tz>() {
            Ok(tz) => (tz, false),
            Err(_) => {
                log::warn!("unknown time zone {:?}, using UTC", name);
                (DEFAULT_TIME_ZONE, true)
            }
        },
        None => (DEFAULT_TIME_ZONE, true),
    }
}

impl AppConfig {
    pub fn from_runtime(raw: RuntimeConfig) -> Self {
        let supabase_url = raw.supabase_url.unwrap_or_default().trim().to_string();
        let supabase_anon_key = raw.supabase_anon_key.unwrap_or_default().trim().to_string();
        if supabase_url.is_empty() || supabase_anon_key.is_empty() {
            log::warn!("Supabase URL or anon key missing; backend calls will fail");
        }
        let (time_zone, time_zone_is_fallback) = parse_time_zone(raw.time_zone.as_deref());
        Self {
            supabase_url,
            supabase_anon_key,
            time_zone,
            time_zone_is_fallback,
        }
    }

    pub fn is_backend_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

#[cfg(target_arch = "wasm32")]
fn from_globals() -> RuntimeConfig {
    let Some(window) = web_sys::window() else {
        return RuntimeConfig::default();
    };
    let Ok(env) = js_sys::Reflect::get(&window, &"__QAMS_ENV".into()) else {
        return RuntimeConfig::default();
    };
    if env.is_undefined() || env.is_null() {
        return RuntimeConfig::default();
    }
    let read = |upper: &str, lower: &str| {
        js_sys::Reflect::get(&env, &upper.into())
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
            .or_else(|| js_sys::Reflect::get(&env, &lower.into()).ok())
            .and_then(|v| v.as_string())
    };
    RuntimeConfig {
        supabase_url: read("SUPABASE_URL", "supabase_url"),
        supabase_anon_key: read("SUPABASE_ANON_KEY", "supabase_anon_key"),
        time_zone: read("TIME_ZONE", "time_zone"),
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_runtime_config() -> Option<RuntimeConfig> {
    let origin = crate::utils::storage::origin().ok()?;
    let resp = reqwest::get(format!("{}/config.json", origin)).await.ok()?;
    if !resp.status().is_success() {
        return None;
    }
    resp.json::<RuntimeConfig>().await.ok()
}

/// Globals first, then `./config.json`, then defaults.
#[cfg(target_arch = "wasm32")]
pub async fn load() -> AppConfig {
    let globals = from_globals();
    let raw = if globals.supabase_url.is_some() && globals.supabase_anon_key.is_some() {
        globals
    } else {
        let file = fetch_runtime_config().await.unwrap_or_default();
        if globals.is_empty() && file.is_empty() {
            log::warn!("no runtime config found; using defaults");
        }
        globals.or(file)
    };
    AppConfig::from_runtime(raw)
}
