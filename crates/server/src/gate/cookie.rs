//! The opt-out cookie letting users continue with an unsupported browser.

use http::{HeaderMap, HeaderValue, header};

/// Value of the named cookie, searching every `Cookie` header of the request.
pub(super) fn find<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim())
        })
}

/// Whether the user asked to ignore the warning. An emptied cookie does not count.
pub(super) fn is_set(headers: &HeaderMap, name: &str) -> bool {
    find(headers, name).is_some_and(|value| !value.is_empty())
}

pub(super) fn opt_out(name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!("{name}=1; Path=/; SameSite=Lax")).ok()
}

pub(super) fn expired(name: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{name}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, HeaderValue, header};

    fn headers(cookies: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();

        for cookie in cookies {
            headers.append(header::COOKIE, HeaderValue::from_static(cookie));
        }

        headers
    }

    #[test]
    fn finds_cookie_among_others() {
        let headers = headers(&["session=abc; badbrowser_ignore=1; theme=dark"]);

        assert_eq!(super::find(&headers, "badbrowser_ignore"), Some("1"));
        assert_eq!(super::find(&headers, "theme"), Some("dark"));
        assert_eq!(super::find(&headers, "badbrowser"), None);
    }

    #[test]
    fn searches_every_cookie_header() {
        let headers = headers(&["session=abc", "badbrowser_ignore=True"]);
        assert!(super::is_set(&headers, "badbrowser_ignore"));
    }

    #[test]
    fn empty_value_is_not_set() {
        assert!(!super::is_set(&headers(&["badbrowser_ignore="]), "badbrowser_ignore"));
        assert!(!super::is_set(&headers(&[]), "badbrowser_ignore"));
    }

    #[test]
    fn set_cookie_values() {
        insta::assert_debug_snapshot!(
            (super::opt_out("badbrowser_ignore"), super::expired("badbrowser_ignore")),
            @r#"
        (
            Some(
                "badbrowser_ignore=1; Path=/; SameSite=Lax",
            ),
            Some(
                "badbrowser_ignore=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            ),
        )
        "#
        );
    }
}
