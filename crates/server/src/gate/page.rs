//! The unsupported browser page.

use axum::body::Body;
use config::GateConfig;
use http::{HeaderValue, Response, header};
use url::form_urlencoded;

/// Known browsers that can be suggested: key, display name, download page.
const BROWSERS: &[(&str, &str, &str)] = &[
    ("firefox", "Mozilla Firefox", "https://www.mozilla.org/firefox/"),
    ("chrome", "Google Chrome", "https://www.google.com/chrome/"),
    ("safari", "Apple Safari", "https://www.apple.com/safari/"),
    ("opera", "Opera", "https://www.opera.com/"),
    ("edge", "Microsoft Edge", "https://www.microsoft.com/edge/"),
];

/// Redirect target the user returns to, restricted to paths on this site.
pub(super) fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next)
            if next.starts_with('/')
                && !next.starts_with("//")
                && !next.contains('\\')
                && HeaderValue::from_str(next).is_ok() =>
        {
            next
        }
        _ => "/",
    }
}

pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }

    escaped
}

fn suggestion(key: &str) -> String {
    let known = BROWSERS
        .iter()
        .find(|(candidate, _, _)| candidate.eq_ignore_ascii_case(key.trim()));

    match known {
        Some((_, name, url)) => format!("      <li><a href=\"{url}\">{name}</a></li>\n"),
        None => format!("      <li>{}</li>\n", escape(key)),
    }
}

pub(super) fn render(gate: &GateConfig, next: &str) -> String {
    let ignore_href = format!(
        "{}?{}",
        gate.ignore_path(),
        form_urlencoded::Serializer::new(String::new())
            .append_pair("next", safe_next(Some(next)))
            .finish()
    );

    let mut html = String::from(concat!(
        "<!DOCTYPE html>\n",
        "<html lang=\"en\">\n",
        "  <head>\n",
        "    <meta charset=\"utf-8\">\n",
        "    <title>Unsupported browser</title>\n",
        "  </head>\n",
        "  <body>\n",
        "    <h1>Your browser is not supported</h1>\n",
    ));

    if !gate.suggest.is_empty() {
        html.push_str("    <p>Please upgrade to one of the following browsers:</p>\n");
        html.push_str("    <ul>\n");

        for key in &gate.suggest {
            html.push_str(&suggestion(key));
        }

        html.push_str("    </ul>\n");
    }

    html.push_str(&format!(
        "    <p><a href=\"{}\">Continue anyway</a></p>\n",
        escape(&ignore_href)
    ));

    html.push_str("  </body>\n</html>\n");
    html
}

pub(super) fn response(gate: &GateConfig, next: &str) -> Response<Body> {
    let mut response = Response::new(Body::from(render(gate, next)));
    let headers = response.headers_mut();

    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    response
}

#[cfg(test)]
mod tests {
    use config::GateConfig;

    #[test]
    fn default_page() {
        insta::assert_snapshot!(super::render(&GateConfig::default(), "/news?page=2"), @r#"
        <!DOCTYPE html>
        <html lang="en">
          <head>
            <meta charset="utf-8">
            <title>Unsupported browser</title>
          </head>
          <body>
            <h1>Your browser is not supported</h1>
            <p>Please upgrade to one of the following browsers:</p>
            <ul>
              <li><a href="https://www.mozilla.org/firefox/">Mozilla Firefox</a></li>
            </ul>
            <p><a href="/badbrowser/ignore?next=%2Fnews%3Fpage%3D2">Continue anyway</a></p>
          </body>
        </html>
        "#);
    }

    #[test]
    fn unknown_suggestions_are_escaped() {
        let gate = GateConfig {
            suggest: vec!["Chrome".to_string(), "<blink>".to_string()],
            ..Default::default()
        };

        let page = super::render(&gate, "/");

        assert!(page.contains(r#"<li><a href="https://www.google.com/chrome/">Google Chrome</a></li>"#));
        assert!(page.contains("<li>&lt;blink&gt;</li>"));
    }

    #[test]
    fn no_suggestions() {
        let gate = GateConfig {
            suggest: Vec::new(),
            ..Default::default()
        };

        assert!(!super::render(&gate, "/").contains("<ul>"));
    }

    #[test]
    fn unsafe_next() {
        assert_eq!(super::safe_next(Some("/account?tab=1")), "/account?tab=1");
        assert_eq!(super::safe_next(None), "/");
        assert_eq!(super::safe_next(Some("")), "/");
        assert_eq!(super::safe_next(Some("https://evil.example.com/")), "/");
        assert_eq!(super::safe_next(Some("//evil.example.com/")), "/");
        assert_eq!(super::safe_next(Some("/\\evil.example.com")), "/");
        assert_eq!(super::safe_next(Some("/line\nbreak")), "/");
    }

    #[test]
    fn escape() {
        assert_eq!(super::escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;/a&gt;");
    }
}
