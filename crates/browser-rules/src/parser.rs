//! Turning raw `User-Agent` headers into a [`ParsedIdentity`].

use std::sync::OnceLock;

use regex::Regex;

use crate::identity::{Browser, OperatingSystem, ParsedIdentity};

/// Something that can make sense of a raw `User-Agent` header.
///
/// Implementations must not fail: anything they cannot recognize is left out of the
/// returned identity, which the evaluator treats as unknown.
pub trait UserAgentParser: Send + Sync {
    fn parse(&self, user_agent: &str) -> ParsedIdentity;
}

impl<F> UserAgentParser for F
where
    F: Fn(&str) -> ParsedIdentity + Send + Sync,
{
    fn parse(&self, user_agent: &str) -> ParsedIdentity {
        self(user_agent)
    }
}

/// Recognizes the mainstream browsers and operating systems.
///
/// Browser names follow the names requirement lists are written with, e.g.
/// `Microsoft Internet Explorer` rather than `IE`. Versions are kept verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultParser;

impl UserAgentParser for DefaultParser {
    fn parse(&self, user_agent: &str) -> ParsedIdentity {
        let browser = detect(browser_rules(), user_agent).map(|(name, version)| Browser {
            name: Some(name.to_string()),
            version,
        });

        let os = detect(os_rules(), user_agent).map(|(name, version)| OperatingSystem {
            name: Some(name.to_string()),
            version: version.map(|version| version.replace('_', ".")),
        });

        ParsedIdentity {
            browser,
            os,
            ..Default::default()
        }
    }
}

struct Rule {
    name: &'static str,
    marker: Regex,
    /// Tried in order, the first capture wins.
    versions: Vec<Regex>,
}

impl Rule {
    fn new(name: &'static str, marker: &str, versions: &[&str]) -> Self {
        Self {
            name,
            marker: Regex::new(marker).expect("static user agent pattern must be valid"),
            versions: versions
                .iter()
                .map(|pattern| Regex::new(pattern).expect("static user agent pattern must be valid"))
                .collect(),
        }
    }

    fn version(&self, user_agent: &str) -> Option<String> {
        self.versions.iter().find_map(|pattern| {
            pattern
                .captures(user_agent)
                .and_then(|captures| captures.get(1))
                .map(|version| version.as_str().to_string())
        })
    }
}

fn detect(rules: &[Rule], user_agent: &str) -> Option<(&'static str, Option<String>)> {
    let rule = rules.iter().find(|rule| rule.marker.is_match(user_agent))?;
    Some((rule.name, rule.version(user_agent)))
}

/// Appends the version capture group to a pattern prefix.
macro_rules! versioned {
    ($prefix:literal) => {
        concat!($prefix, r"(\d[\w.]*)")
    };
}

// Order matters: most browsers also claim to be the ones they descend from.
fn browser_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();

    RULES.get_or_init(|| {
        vec![
            Rule::new("Opera", r"\bOPR/", &[versioned!(r"\bOPR/")]),
            Rule::new(
                "Opera",
                r"\bOpera\b",
                &[versioned!(r"\bVersion/"), versioned!(r"\bOpera[/ ]")],
            ),
            Rule::new(
                "Microsoft Edge",
                r"\bEdg(?:e|A|iOS)?/",
                &[versioned!(r"\bEdg(?:e|A|iOS)?/")],
            ),
            Rule::new("Microsoft Internet Explorer", r"\bMSIE\b", &[versioned!(r"\bMSIE ")]),
            Rule::new("Microsoft Internet Explorer", r"\bTrident/", &[versioned!(r"\brv:")]),
            Rule::new(
                "Chrome",
                r"\b(?:Chrome|CriOS)/",
                &[versioned!(r"\b(?:Chrome|CriOS)/")],
            ),
            Rule::new(
                "Firefox",
                r"\b(?:Firefox|FxiOS)/",
                &[versioned!(r"\b(?:Firefox|FxiOS)/")],
            ),
            Rule::new("Konqueror", r"\bKonqueror/", &[versioned!(r"\bKonqueror/")]),
            Rule::new("Safari", r"\bSafari/", &[versioned!(r"\bVersion/")]),
        ]
    })
}

fn os_rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();

    RULES.get_or_init(|| {
        vec![
            Rule::new("Windows", r"\bWindows\b", &[r"\bWindows NT (\d[\d.]*)"]),
            Rule::new("Android", r"\bAndroid\b", &[r"\bAndroid (\d[\d.]*)"]),
            Rule::new("iOS", r"\b(?:iPhone|iPad|iPod)\b", &[r"\bOS (\d[\d_]*) like Mac OS X"]),
            Rule::new("Macintosh", r"\bMacintosh\b", &[r"\bMac OS X (\d[\d_.]*)"]),
            Rule::new("Linux", r"\bLinux\b", &[]),
        ]
    })
}
