use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn strip_origin(path: &str) -> &str {
    match path.find("://") {
        Some(scheme_end) => {
            let rest = &path[scheme_end + 3..];
            rest.find('/').map(|i| &rest[i..]).unwrap_or("/")
        }
        None => path,
    }
}

fn split_suffix(path: &str) -> (&str, &str) {
    match path.find(&['?', '#'][..]) {
        Some(i) => (&path[..i], &path[i..]),
        None => (path, ""),
    }
}

/// Path used for route lookup: no origin, query or hash, a leading slash,
/// and no trailing slash except on `/`.
pub fn normalize_path(path: &str) -> String {
    let (bare, _) = split_suffix(strip_origin(path.trim()));
    let mut normalized = if bare.starts_with('/') {
        bare.to_string()
    } else {
        format!("/{}", bare)
    };
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// Query string of `path` without the leading `?`, hash excluded.
pub fn query_of(path: &str) -> Option<&str> {
    let (_, suffix) = split_suffix(strip_origin(path.trim()));
    let query = suffix.strip_prefix('?')?;
    let query = query.split('#').next().unwrap_or_default();
    (!query.is_empty()).then_some(query)
}

/// URL written to history: the normalized path plus the original query.
pub fn history_url(path: &str) -> String {
    match query_of(path) {
        Some(query) => format!("{}?{}", normalize_path(path), query),
        None => normalize_path(path),
    }
}

fn decode(part: &str) -> String {
    let spaced = part.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (decode(key), decode(value)),
            None => (decode(pair), String::new()),
        })
        .collect()
}

pub fn build_query(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// `*` matches any run of characters, including `/`. Everything else is literal.
pub fn wildcard_matches(pattern: &str, path: &str) -> bool {
    if !pattern.contains('*') {
        return false;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return false,
    };
    let Some(mut remaining) = path.strip_prefix(*first) else {
        return false;
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return remaining.is_empty(),
    };
    for part in middle {
        match remaining.find(*part) {
            Some(i) => remaining = &remaining[i + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(*last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_slashes_query_and_hash() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("staff/dashboard/"), "/staff/dashboard");
        assert_eq!(normalize_path("/login?redirect=%2Fadmin#top"), "/login");
        assert_eq!(normalize_path("/about#team"), "/about");
        assert_eq!(
            normalize_path("https://qams.example/scan/success?name=Ada"),
            "/scan/success"
        );
    }

    #[test]
    fn history_url_keeps_the_query() {
        assert_eq!(history_url("/scan/success/?name=Ada#x"), "/scan/success?name=Ada");
        assert_eq!(history_url("/login?"), "/login");
        assert_eq!(query_of("/about#a?b"), None);
    }

    #[test]
    fn query_pairs_are_decoded() {
        assert_eq!(
            parse_query("?name=Ada+L&time=08%3A05&flag"),
            vec![
                ("name".to_string(), "Ada L".to_string()),
                ("time".to_string(), "08:05".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn component_encoding_matches_browsers() {
        assert_eq!(encode_component("/admin/staff"), "%2Fadmin%2Fstaff");
        assert_eq!(encode_component("a b&c"), "a%20b%26c");
        assert_eq!(encode_component("it's-(ok)"), "it's-(ok)");
        assert_eq!(build_query(&[("name", "Ada L"), ("t", "08:05")]), "name=Ada%20L&t=08%3A05");
    }

    #[test]
    fn wildcards_match_any_run() {
        assert!(wildcard_matches("/scan/*", "/scan/anything/deep"));
        assert!(wildcard_matches("/scan/*", "/scan/"));
        assert!(!wildcard_matches("/scan/*", "/scanner"));
        assert!(wildcard_matches("/*/reports", "/admin/reports"));
        assert!(!wildcard_matches("/*/reports", "/admin/reports/1"));
        assert!(wildcard_matches("*", "/whatever"));
        assert!(!wildcard_matches("/about", "/about"));
    }
}
