//! Ordering of browser version strings.
//!
//! Browsers do not agree on a version format. User agents and requirement lists
//! carry things like `5.0.375.126`, `7.0b`, `3.1b3` or `3.1 beta 3`, so versions
//! are split into numeric and label components instead of being parsed as semver.
//!
//! Labels always sort below numbers and every version ends with an implicit
//! `final` label. That makes pre-releases older than their release (`7b < 7`),
//! and trailing zeros are dropped so `5.0 == 5`.

use std::{cmp::Ordering, convert::Infallible, fmt, hash, str::FromStr};

use serde::{Deserialize, Serialize};

const FINAL: &str = "final";
const FINAL_SEPARATOR: &str = "final-";

/// A browser version, ordered by its normalized components.
///
/// Any string is accepted. Strings that do not look like versions still get a
/// consistent position in the order, they just compare lexically.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Version {
    raw: String,
    components: Vec<Component>,
}

impl Version {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let components = components(raw.trim());

        Self { raw, components }
    }

    /// The version as it was written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for Version {}

impl hash::Hash for Version {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Version").field(&self.raw).finish()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Version {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Self::parse(value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.raw
    }
}

/// Compares two version strings.
pub fn compare(a: &str, b: &str) -> Ordering {
    Version::parse(a).cmp(&Version::parse(b))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Component {
    Label(String),
    /// Decimal digits with leading zeros stripped, zero itself is `"0"`.
    Number(String),
}

impl Component {
    fn number(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');

        if trimmed.is_empty() {
            Component::Number("0".to_string())
        } else {
            Component::Number(trimmed.to_string())
        }
    }

    fn is_zero(&self) -> bool {
        matches!(self, Component::Number(digits) if digits == "0")
    }

    fn is_final_separator(&self) -> bool {
        matches!(self, Component::Label(label) if label == FINAL_SEPARATOR)
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // no leading zeros, so a longer number is a bigger number
            (Component::Number(a), Component::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Component::Label(a), Component::Label(b)) => a.cmp(b),
            (Component::Label(_), Component::Number(_)) => Ordering::Less,
            (Component::Number(_), Component::Label(_)) => Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Digit,
    Letter,
    Dot,
    Hyphen,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        match c {
            '0'..='9' => CharClass::Digit,
            'a'..='z' => CharClass::Letter,
            '.' => CharClass::Dot,
            '-' => CharClass::Hyphen,
            _ => CharClass::Other,
        }
    }
}

enum Token<'a> {
    Number(&'a str),
    Label(&'a str),
}

/// Splits a lower-cased version into runs of digits, letters and anything else.
/// Dots only separate, every hyphen is a label of its own.
fn tokenize(version: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = version;

    while let Some(first) = rest.chars().next() {
        let class = CharClass::of(first);
        let end = rest.find(|c| CharClass::of(c) != class).unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        rest = tail;

        match class {
            CharClass::Digit => tokens.push(Token::Number(run)),
            CharClass::Letter | CharClass::Other => tokens.push(Token::Label(run)),
            CharClass::Hyphen => tokens.extend(run.chars().map(|_| Token::Label("-"))),
            CharClass::Dot => (),
        }
    }

    tokens
}

fn alias(label: &str) -> &str {
    match label {
        "pre" | "preview" | "rc" => "c",
        "dev" => "@",
        "-" => FINAL_SEPARATOR,
        other => other,
    }
}

fn components(raw: &str) -> Vec<Component> {
    let lowered = raw.to_lowercase();
    let mut components = Vec::new();

    for token in tokenize(&lowered).into_iter().chain(std::iter::once(Token::Label(FINAL))) {
        let label = match token {
            Token::Number(digits) => {
                components.push(Component::number(digits));
                continue;
            }
            Token::Label(label) => alias(label),
        };

        // a pre-release label cancels the separator in front of it: `1.0-b2` is `1.0b2`
        if label < FINAL {
            while components.last().is_some_and(Component::is_final_separator) {
                components.pop();
            }
        }

        while components.last().is_some_and(Component::is_zero) {
            components.pop();
        }

        components.push(Component::Label(label.to_string()));
    }

    components
}
