use std::{borrow::Cow, collections::BTreeMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parser::UserAgentParser;

/// Structured form of a client's self-reported browser and operating system.
///
/// Mirrors the shape user-agent parsers usually produce, so a JSON mapping such as
/// `{"browser": {"name": "Chrome", "version": "5.0.375.126"}}` deserializes into it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<Browser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OperatingSystem>,
    /// Any other fields the parser produced.
    #[serde(flatten)]
    pub additional: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Browser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ParsedIdentity {
    /// An identity with both a browser name and version.
    pub fn browser(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            browser: Some(Browser {
                name: Some(name.into()),
                version: Some(version.into()),
            }),
            ..Default::default()
        }
    }

    /// The browser name and version, if both are known and non-empty.
    pub fn browser_name_and_version(&self) -> Option<(&str, &str)> {
        let browser = self.browser.as_ref()?;
        let name = browser.name.as_deref().filter(|name| !name.is_empty())?;
        let version = browser.version.as_deref().filter(|version| !version.is_empty())?;

        Some((name, version))
    }

    /// Whether the evaluator has nothing to decide on.
    pub fn is_unknown(&self) -> bool {
        self.browser_name_and_version().is_none()
    }
}

/// What a caller can hand to the gate: the raw `User-Agent` header, or an identity
/// some other component already parsed.
#[derive(Debug, Clone, Copy)]
pub enum UserAgentInput<'a> {
    Raw(&'a str),
    Parsed(&'a ParsedIdentity),
}

impl<'a> From<&'a str> for UserAgentInput<'a> {
    fn from(value: &'a str) -> Self {
        UserAgentInput::Raw(value)
    }
}

impl<'a> From<&'a String> for UserAgentInput<'a> {
    fn from(value: &'a String) -> Self {
        UserAgentInput::Raw(value)
    }
}

impl<'a> From<&'a ParsedIdentity> for UserAgentInput<'a> {
    fn from(value: &'a ParsedIdentity) -> Self {
        UserAgentInput::Parsed(value)
    }
}

/// Turns any input into a parsed identity. Missing or empty input yields an unknown identity.
pub fn normalize<'a, P>(input: Option<UserAgentInput<'a>>, parser: &P) -> Cow<'a, ParsedIdentity>
where
    P: UserAgentParser + ?Sized,
{
    match input {
        None => Cow::Owned(ParsedIdentity::default()),
        Some(UserAgentInput::Parsed(identity)) => Cow::Borrowed(identity),
        Some(UserAgentInput::Raw(user_agent)) if user_agent.trim().is_empty() => {
            Cow::Owned(ParsedIdentity::default())
        }
        Some(UserAgentInput::Raw(user_agent)) => Cow::Owned(parser.parse(user_agent)),
    }
}
