//! `url(...)` discovery and cache-buster injection for CSS text
//!
//! This is a lexical pass, not a CSS parser. It finds `url(` tokens, looks
//! the captured body up in the digest map, and rewrites hits in place.
//!
//! The pattern accepts an optional quote on either side without requiring
//! the two to match (`url('a.png")` is a hit). Tightening it would stop
//! matching stylesheets that are rewritten today, so it stays loose.

use std::borrow::Cow;
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};
use url::form_urlencoded;

use super::types::DigestMap;
use crate::utils::CACHE_BUSTER_PARAM;

/// Prefix, lazily captured URL body, suffix
static CSS_URL_MATCHER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(url\s*\(\s*['"]?)(.*?)(['"]?\s*\))"#)
        .expect("CSS_URL_MATCHER: hardcoded regex is valid")
});

/// Bytes left unescaped in query keys and values: ASCII alphanumerics and
/// `- _ . ! ~ * ' ( )`, as a browser's `encodeURIComponent` leaves them.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Rewrite every `url(...)` whose body is a key of `digests`
///
/// Occurrences whose body is absent from the map are emitted verbatim, as
/// is all text between occurrences.
#[must_use]
pub fn rewrite(css: &str, digests: &DigestMap) -> String {
    if digests.is_empty() {
        return css.to_string();
    }

    CSS_URL_MATCHER
        .replace_all(css, |caps: &Captures| {
            let url = &caps[2];
            match digests.get(url) {
                Some(digest) => {
                    format!("{}{}{}", &caps[1], with_cache_buster(url, digest), &caps[3])
                }
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Set the cache-buster query parameter on a (possibly relative) URL
///
/// The URL is split into everything before `?`, the query, and the `#`
/// fragment. The part before the query is kept byte for byte. An existing
/// cache-buster parameter keeps its position and takes the new value;
/// further duplicates of it are dropped. Other parameters keep their order.
#[must_use]
pub fn with_cache_buster(url: &str, digest: &str) -> String {
    let (rest, fragment) = match url.find('#') {
        Some(idx) => (&url[..idx], &url[idx..]),
        None => (url, ""),
    };
    let (base, query) = match rest.find('?') {
        Some(idx) => (&rest[..idx], &rest[idx + 1..]),
        None => (rest, ""),
    };

    let mut params: Vec<(Cow<'_, str>, Cow<'_, str>)> =
        form_urlencoded::parse(query.as_bytes()).collect();

    match params.iter().position(|(key, _)| key == CACHE_BUSTER_PARAM) {
        Some(first) => {
            params[first].1 = Cow::Borrowed(digest);
            let mut idx = 0;
            params.retain(|(key, _)| {
                let keep = idx == first || key != CACHE_BUSTER_PARAM;
                idx += 1;
                keep
            });
        }
        None => params.push((Cow::Borrowed(CACHE_BUSTER_PARAM), Cow::Borrowed(digest))),
    }

    let query = params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, QUERY_COMPONENT),
                utf8_percent_encode(value, QUERY_COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{query}{fragment}")
}
