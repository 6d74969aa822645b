//! Redirect URL parameter extraction.
//!
//! The identity provider returns its result either in the fragment
//! (`#id_token=...&state=...`) or in the query string, depending on the
//! response mode. Both components are read and merged into one flat map.

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use tracing::trace;

/// Flat parameter map extracted from a redirect URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams(BTreeMap<String, String>);

impl RedirectParams {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn id_token(&self) -> Option<&str> {
        self.get("id_token")
    }

    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Extract parameters from both the fragment and the query of `url`.
///
/// Fragment pairs are collected first and query pairs second, so a key present
/// in both components takes its query value. Pairs without a key or a value,
/// and pairs that do not percent-decode to UTF-8, are skipped. Never fails.
pub fn parse_redirect_url(url: &str) -> RedirectParams {
    let mut params = BTreeMap::new();

    if let Some((_, fragment)) = url.split_once('#') {
        collect_pairs(fragment, &mut params);
    }

    if let Some((_, rest)) = url.split_once('?') {
        let query = rest.split_once('#').map_or(rest, |(query, _)| query);
        collect_pairs(query, &mut params);
    }

    RedirectParams(params)
}

fn collect_pairs(component: &str, params: &mut BTreeMap<String, String>) {
    for pair in component.split('&') {
        let Some((raw_key, raw_value)) = pair.split_once('=') else {
            continue;
        };
        if raw_key.is_empty() || raw_value.is_empty() {
            continue;
        }
        match (decode_component(raw_key), decode_component(raw_value)) {
            (Some(key), Some(value)) => {
                params.insert(key, value);
            }
            _ => trace!(pair, "skipping undecodable redirect parameter"),
        }
    }
}

/// Percent-decode one key or value. `+` is kept literally.
///
/// A `%` that is not followed by two hex digits, or an escape sequence that
/// does not form valid UTF-8, makes the whole component undecodable.
fn decode_component(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fragment_parameters() {
        let params = parse_redirect_url("https://www.kvcm.io/#id_token=ABC&state=XYZ");
        assert_eq!(params.id_token(), Some("ABC"));
        assert_eq!(params.state(), Some("XYZ"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn reads_query_parameters() {
        let params = parse_redirect_url("https://www.kvcm.io/?id_token=ABC&state=XYZ");
        assert_eq!(params.id_token(), Some("ABC"));
        assert_eq!(params.state(), Some("XYZ"));
    }

    #[test]
    fn query_value_wins_over_fragment() {
        let params = parse_redirect_url("https://www.kvcm.io/?state=from-query#state=from-fragment");
        assert_eq!(params.state(), Some("from-query"));
    }

    #[test]
    fn query_stops_at_fragment() {
        let params = parse_redirect_url("https://www.kvcm.io/?foo=bar#id_token=T");
        assert_eq!(params.get("foo"), Some("bar"));
        assert_eq!(params.id_token(), Some("T"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn fragment_is_everything_after_first_hash() {
        let params = parse_redirect_url("https://x.test/#a=1#b=2");
        assert_eq!(params.get("a"), Some("1#b=2"));
    }

    #[test]
    fn percent_decodes_keys_and_values() {
        let params = parse_redirect_url("https://x.test/#redirect%5Furi=https%3A%2F%2Fa.test%2F");
        assert_eq!(params.get("redirect_uri"), Some("https://a.test/"));
    }

    #[test]
    fn plus_is_not_a_space() {
        let params = parse_redirect_url("https://x.test/?q=a+b");
        assert_eq!(params.get("q"), Some("a+b"));
    }

    #[test]
    fn value_keeps_text_after_first_equals() {
        let params = parse_redirect_url("https://x.test/#id_token=abc==");
        assert_eq!(params.id_token(), Some("abc=="));
    }

    #[test]
    fn drops_pairs_missing_key_or_value() {
        let params = parse_redirect_url("https://x.test/?a&b=c&=d&e=");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("b"), Some("c"));
    }

    #[test]
    fn drops_malformed_escapes() {
        let params = parse_redirect_url("https://x.test/?bad=%zz&short=%4&ok=%41");
        assert_eq!(params.get("bad"), None);
        assert_eq!(params.get("short"), None);
        assert_eq!(params.get("ok"), Some("A"));
    }

    #[test]
    fn drops_invalid_utf8() {
        let params = parse_redirect_url("https://x.test/?k=%FF%FE&other=1");
        assert_eq!(params.get("k"), None);
        assert_eq!(params.get("other"), Some("1"));
    }

    #[test]
    fn decodes_multibyte_utf8() {
        let params = parse_redirect_url("https://x.test/#name=%EA%B5%AC%EA%B8%80");
        assert_eq!(params.get("name"), Some("구글"));
    }

    #[test]
    fn tolerates_degenerate_input() {
        for input in ["", "no-separators", "?", "#", "?#", "#?", "&&&", "https://x.test/?=&=#&"] {
            assert!(parse_redirect_url(input).is_empty(), "input {input:?}");
        }
    }

    #[test]
    fn bare_pair_list_without_url() {
        let params = parse_redirect_url("?a&b=c");
        assert_eq!(params.into_inner().into_iter().collect::<Vec<_>>(), vec![(
            "b".to_string(),
            "c".to_string()
        )]);
    }
}
