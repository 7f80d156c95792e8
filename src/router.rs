//! Versioned deep link router for shelbyx
//!
//! ## Supported Routes (v1)
//!
//! - `shelbyx://v1/home` (alias `media`) - media tab
//! - `shelbyx://v1/documents` - documents tab
//! - `shelbyx://v1/upload` - open the upload dialog
//! - `shelbyx://v1/blob/<suffix...>` - open the preview for a blob path
//!
//! Scheme matching is case-insensitive, extra slashes after the colon are
//! tolerated and query/fragment are stripped. Web builds use the same paths
//! as hash routes: `#/v1/documents`.

/// Strip query and fragment from URL path
#[inline]
fn strip_query_frag(s: &str) -> &str {
    match s.find(['?', '#']) {
        Some(i) => &s[..i],
        None => s,
    }
}

/// Extract path after the shelbyx scheme (case-insensitive, handles variants)
#[inline]
fn after_scheme(raw: &str) -> Option<&str> {
    let s = raw.trim();
    let (scheme, rest) = s.split_once(':')?;
    if !scheme.eq_ignore_ascii_case("shelbyx") {
        return None;
    }
    Some(rest.trim_start_matches('/'))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteV1 {
    /// Media tab (`home` or `media`)
    Home,
    Documents,
    Upload,
    /// Preview modal for the blob with this display path
    Blob { suffix: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    V1(RouteV1),
}

/// Parse a route from a deep link, a hash (`#/v1/...`) or a bare path.
/// Returns `None` for unsupported versions or unknown pages.
pub fn parse(raw: &str) -> Option<Route> {
    let s = raw.trim();
    if s.is_empty() || s == "#" || s == "#/" {
        return Some(Route::V1(RouteV1::Home));
    }

    let path = if let Some(rest) = after_scheme(s) {
        rest
    } else if let Some(rest) = s.strip_prefix("#/") {
        rest
    } else if let Some(rest) = s.strip_prefix('/') {
        rest
    } else {
        s
    };
    let path = strip_query_frag(path);

    let mut segments = path.split('/').filter(|s| !s.is_empty());

    let version = segments.next()?.to_ascii_lowercase();
    if version != "v1" {
        return None;
    }

    let page = segments.next().unwrap_or("").to_ascii_lowercase();
    match page.as_str() {
        "" | "home" | "media" => Some(Route::V1(RouteV1::Home)),
        "documents" | "docs" => Some(Route::V1(RouteV1::Documents)),
        "upload" => Some(Route::V1(RouteV1::Upload)),
        "blob" => {
            let decoded: Vec<String> = segments
                .map(|seg| {
                    urlencoding::decode(seg)
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| seg.to_string())
                })
                .collect();
            if decoded.is_empty() {
                None
            } else {
                Some(Route::V1(RouteV1::Blob {
                    suffix: decoded.join("/"),
                }))
            }
        }
        _ => None,
    }
}

/// Hash form of a route, for `location.hash`.
pub fn to_hash(route: &Route) -> String {
    match route {
        Route::V1(RouteV1::Home) => "#/v1/home".to_string(),
        Route::V1(RouteV1::Documents) => "#/v1/documents".to_string(),
        Route::V1(RouteV1::Upload) => "#/v1/upload".to_string(),
        Route::V1(RouteV1::Blob { suffix }) => {
            format!("#/v1/blob/{}", crate::preview::encode_blob_path(suffix))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1(r: RouteV1) -> Option<Route> {
        Some(Route::V1(r))
    }

    #[test]
    fn test_parse_pages() {
        assert_eq!(parse("shelbyx://v1/home"), v1(RouteV1::Home));
        assert_eq!(parse("shelbyx://v1/media"), v1(RouteV1::Home));
        assert_eq!(parse("shelbyx://v1/"), v1(RouteV1::Home));
        assert_eq!(parse("shelbyx://v1"), v1(RouteV1::Home));
        assert_eq!(parse(""), v1(RouteV1::Home));
        assert_eq!(parse("#/v1/documents"), v1(RouteV1::Documents));
        assert_eq!(parse("/v1/upload"), v1(RouteV1::Upload));
    }

    #[test]
    fn test_parse_blob_keeps_nested_path() {
        assert_eq!(
            parse("shelbyx://v1/blob/photos/b%20c.png"),
            v1(RouteV1::Blob {
                suffix: "photos/b c.png".into()
            })
        );
        assert_eq!(
            parse("#/v1/blob/notes.md?x=1"),
            v1(RouteV1::Blob {
                suffix: "notes.md".into()
            })
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("shelbyx://v2/home").is_none());
        assert!(parse("shelbyx://v1/blob/").is_none());
        assert!(parse("shelbyx://v1/unknown").is_none());
        assert!(parse("shelby://v1/home").is_none());
    }

    #[test]
    fn test_parse_scheme_variants() {
        assert_eq!(parse("SHELBYX://v1/documents"), v1(RouteV1::Documents));
        assert_eq!(parse("shelbyx:/v1/upload"), v1(RouteV1::Upload));
        assert_eq!(parse("shelbyx:////v1/upload#frag"), v1(RouteV1::Upload));
    }

    #[test]
    fn test_hash_round_trip() {
        let r = Route::V1(RouteV1::Blob {
            suffix: "a/b c.png".into(),
        });
        assert_eq!(to_hash(&r), "#/v1/blob/a/b%20c.png");
        assert_eq!(parse(&to_hash(&r)), Some(r));
    }
}
