//! Binding tokens to destination URLs via the `pv2` query parameter.
//!
//! URLs are treated as plain strings: nothing here validates or normalises
//! them, so relative and malformed links pass through untouched. Tokens are
//! base64url plus `.`, so they need no percent-encoding; parameter names are
//! compared after form-urlencoded decoding.

use ::url::form_urlencoded;

/// Query parameter carrying the discount token.
pub const PARAM: &str = "pv2";

/// Splits `url` into (before query, query without `?`, fragment including `#`).
fn split_url(url: &str) -> (&str, Option<&str>, &str) {
    let (rest, fragment) = match url.find('#') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };
    match rest.split_once('?') {
        Some((base, query)) => (base, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

/// Append `pv2=<token>` to `url`.
///
/// Uses `&` when the URL already has a query string and `?` otherwise; the
/// parameter goes before any `#fragment`. Appending is not idempotent: a URL
/// that already carries a token ends up with two `pv2` parameters. Use
/// [`attach_replacing`] when that matters.
pub fn attach(url: &str, token: &str) -> String {
    let (base, query, fragment) = split_url(url);
    match query {
        None => format!("{base}?{PARAM}={token}{fragment}"),
        Some(q) if q.is_empty() || q.ends_with('&') => {
            format!("{base}?{q}{PARAM}={token}{fragment}")
        }
        Some(q) => format!("{base}?{q}&{PARAM}={token}{fragment}"),
    }
}

/// Like [`attach`], but first removes every existing `pv2` parameter.
pub fn attach_replacing(url: &str, token: &str) -> String {
    let (base, query, fragment) = split_url(url);
    let kept = query
        .map(|q| {
            q.split('&')
                .filter(|pair| !pair.is_empty() && !is_token_param(pair))
                .collect::<Vec<_>>()
                .join("&")
        })
        .unwrap_or_default();

    if kept.is_empty() {
        attach(&format!("{base}{fragment}"), token)
    } else {
        attach(&format!("{base}?{kept}{fragment}"), token)
    }
}

/// Whether the raw `key[=value]` pair names the token parameter once decoded.
fn is_token_param(pair: &str) -> bool {
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .is_some_and(|(key, _)| key == PARAM)
}

/// Extract the first non-empty `pv2` value from `url`.
///
/// A parameter counts when it follows any `?` or `&`, even one that is not
/// the start of a well-formed query (`?a=1?pv2=..`, or `#section?pv2=..`
/// on links that were annotated after their fragment). The value runs to
/// the next `&`, `#` or the end of the string.
///
/// Returns `None` when the URL carries no token; this never fails.
pub fn extract(url: &str) -> Option<&str> {
    url.match_indices(['?', '&'])
        .filter_map(|(i, _)| {
            let rest = &url[i + 1..];
            let pair = &rest[..rest.find(['&', '#']).unwrap_or(rest.len())];
            let (_, value) = pair.split_once('=')?;
            is_token_param(pair).then_some(value)
        })
        .find(|value| !value.is_empty())
}

/// Attaches tokens to URLs with a fixed replacement policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlBinder {
    replace_existing: bool,
}

impl UrlBinder {
    pub fn new(replace_existing: bool) -> Self {
        Self { replace_existing }
    }

    pub fn attach(&self, url: &str, token: &str) -> String {
        if self.replace_existing {
            attach_replacing(url, token)
        } else {
            attach(url, token)
        }
    }

    pub fn extract<'a>(&self, url: &'a str) -> Option<&'a str> {
        extract(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "aGVhZGVy.Y2xhaW1z.c2ln";

    #[test]
    fn test_attach_without_query() {
        assert_eq!(
            attach("https://example.com/product.html", TOKEN),
            format!("https://example.com/product.html?pv2={TOKEN}")
        );
    }

    #[test]
    fn test_attach_with_query() {
        assert_eq!(
            attach("https://x/y?a=1", TOKEN),
            format!("https://x/y?a=1&pv2={TOKEN}")
        );
    }

    #[test]
    fn test_attach_before_fragment() {
        assert_eq!(
            attach("https://x/y?a=1#reviews", TOKEN),
            format!("https://x/y?a=1&pv2={TOKEN}#reviews")
        );
    }

    #[test]
    fn test_attach_dangling_question_mark() {
        assert_eq!(attach("https://x/y?", TOKEN), format!("https://x/y?pv2={TOKEN}"));
    }

    #[test]
    fn test_attach_twice_appends() {
        let once = attach("https://x/y", "first");
        let twice = attach(&once, "second");
        assert_eq!(twice, "https://x/y?pv2=first&pv2=second");
        assert_eq!(extract(&twice), Some("first"));
    }

    #[test]
    fn test_attach_replacing() {
        let url = "https://x/y?a=1&pv2=old&b=2&pv2=older#top";
        assert_eq!(
            attach_replacing(url, "new"),
            "https://x/y?a=1&b=2&pv2=new#top"
        );
        assert_eq!(attach_replacing("https://x/y?pv2=old", "new"), "https://x/y?pv2=new");
    }

    #[test]
    fn test_extract_roundtrip() {
        for url in ["https://x/y", "https://x/y?a=1", "https://x/y?a=1&b=2#frag"] {
            assert_eq!(extract(&attach(url, TOKEN)), Some(TOKEN));
        }
    }

    #[test]
    fn test_extract_absent() {
        assert_eq!(extract("https://x/y"), None);
        assert_eq!(extract("https://x/y?a=1"), None);
        assert_eq!(extract("https://x/y?pv2="), None);
        assert_eq!(extract("https://x/y?xpv2=abc"), None);
        assert_eq!(extract("https://x/y?pv22=abc"), None);
        assert_eq!(extract("https://x/y#pv2=abc"), None);
    }

    #[test]
    fn test_extract_skips_empty_value() {
        assert_eq!(extract("https://x/y?pv2=&pv2=abc"), Some("abc"));
    }

    #[test]
    fn test_extract_after_stray_question_mark() {
        assert_eq!(extract("https://x/y?a=1?pv2=aaa.bbb.ccc"), Some("aaa.bbb.ccc"));
        assert_eq!(
            extract("https://x/y#reviews?pv2=aaa.bbb.ccc"),
            Some("aaa.bbb.ccc")
        );
        assert_eq!(extract("/relative?pv2=aaa.bbb.ccc#top"), Some("aaa.bbb.ccc"));
    }

    #[test]
    fn test_encoded_parameter_name() {
        assert_eq!(extract("https://x/y?pv%32=abc"), Some("abc"));
        assert_eq!(
            attach_replacing("https://x/y?pv%32=old&a=1", "new"),
            "https://x/y?a=1&pv2=new"
        );
    }

    #[test]
    fn test_binder_policy() {
        let url = "https://x/y?pv2=old";
        assert_eq!(UrlBinder::new(false).attach(url, "new"), "https://x/y?pv2=old&pv2=new");
        assert_eq!(UrlBinder::new(true).attach(url, "new"), "https://x/y?pv2=new");
    }
}
