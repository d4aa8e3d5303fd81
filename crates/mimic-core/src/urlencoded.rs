//! `application/x-www-form-urlencoded` decoding for query strings and form
//! bodies.

use std::borrow::Cow;

use crate::matcher::MultiMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlEncodedError {
    #[error("invalid semicolon separator in {0:?}")]
    Semicolon(String),

    #[error("invalid URL escape in {0:?}")]
    InvalidEscape(String),

    #[error("invalid UTF-8 after decoding {0:?}")]
    InvalidUtf8(String),
}

/// Strictly decode `key=value` pairs separated by `&`.
///
/// `+` decodes to a space. A pair without `=` has an empty value. Empty
/// segments are skipped.
pub fn parse(input: &str) -> Result<Vec<(String, String)>, UrlEncodedError> {
    let mut pairs = Vec::new();
    for segment in input.split('&') {
        if segment.is_empty() {
            continue;
        }
        if segment.contains(';') {
            return Err(UrlEncodedError::Semicolon(segment.to_string()));
        }
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        pairs.push((unescape(key)?.into_owned(), unescape(value)?.into_owned()));
    }
    Ok(pairs)
}

/// Decode a query string, keeping undecodable segments verbatim.
pub fn parse_query(query: &str) -> MultiMap {
    let mut params = MultiMap::new();
    for segment in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        let key = unescape(key).map_or_else(|_| key.to_string(), Cow::into_owned);
        let value = unescape(value).map_or_else(|_| value.to_string(), Cow::into_owned);
        params.entry(key).or_default().push(value);
    }
    params
}

/// Group decoded pairs by key, keeping value order.
pub fn group(pairs: Vec<(String, String)>) -> MultiMap {
    let mut grouped = MultiMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }
    grouped
}

fn unescape(raw: &str) -> Result<Cow<'_, str>, UrlEncodedError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(UrlEncodedError::InvalidEscape(raw.to_string()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    if !raw.contains(|c: char| c == '+' || c == '%') {
        return Ok(Cow::Borrowed(raw));
    }
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| Cow::Owned(decoded.into_owned()))
        .map_err(|_| UrlEncodedError::InvalidUtf8(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        let pairs = parse("name=alice&age=30&tag=a&tag=b").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "alice".to_string()),
                ("age".to_string(), "30".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_decodes() {
        let pairs = parse("greeting=hello+world&path=%2Fapi%2Fv1&flag").unwrap();
        assert_eq!(pairs[0].1, "hello world");
        assert_eq!(pairs[1].1, "/api/v1");
        assert_eq!(pairs[2], ("flag".to_string(), String::new()));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse("a=1;b=2"), Err(UrlEncodedError::Semicolon(_))));
        assert!(matches!(parse("a=%zz"), Err(UrlEncodedError::InvalidEscape(_))));
        assert!(matches!(parse("a=%4"), Err(UrlEncodedError::InvalidEscape(_))));
        assert!(matches!(parse("a=%ff"), Err(UrlEncodedError::InvalidUtf8(_))));
    }

    #[test]
    fn test_parse_query_is_lenient() {
        let params = parse_query("page=1&sort=desc&sort=asc&bad=%zz");
        assert_eq!(params["page"], vec!["1"]);
        assert_eq!(params["sort"], vec!["desc", "asc"]);
        assert_eq!(params["bad"], vec!["%zz"]);
    }

    #[test]
    fn test_group() {
        let grouped = group(parse("a=1&b=2&a=3").unwrap());
        assert_eq!(grouped["a"], vec!["1", "3"]);
        assert_eq!(grouped["b"], vec!["2"]);
    }
}
