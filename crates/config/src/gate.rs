//! Browser gate configuration.

use std::{fmt, str::FromStr};

use browser_rules::Requirement;
use serde::Deserialize;
use url::Url;

/// Configuration for intercepting outdated browsers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Whether the gate inspects requests at all.
    pub enabled: bool,
    /// Path of the unsupported browser page. The opt-out endpoint lives at `{path}/ignore`.
    pub path: String,
    /// Cookie set by the opt-out endpoint.
    pub cookie_name: String,
    /// Browsers recommended on the unsupported browser page.
    pub suggest: Vec<String>,
    /// Request paths never subject to the gate, typically static assets.
    pub static_paths: Vec<StaticPath>,
    /// Ordered browser requirements, the first one naming a browser decides.
    pub requirements: Vec<Requirement>,
}

impl GateConfig {
    /// Whether any request can be intercepted with this configuration.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.requirements.is_empty()
    }

    /// Path of the endpoint that sets the opt-out cookie.
    pub fn ignore_path(&self) -> String {
        format!("{}/ignore", self.path.trim_end_matches('/'))
    }

    /// Whether the request targets a static asset.
    pub fn is_static(&self, host: Option<&str>, path: &str) -> bool {
        self.static_paths.iter().any(|static_path| static_path.matches(host, path))
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/badbrowser".to_string(),
            cookie_name: "badbrowser_ignore".to_string(),
            suggest: vec!["firefox".to_string()],
            static_paths: Vec::new(),
            requirements: Vec::new(),
        }
    }
}

/// A path prefix exempt from the gate, optionally bound to a host.
///
/// Written either as a path (`/static/`) or as an absolute URL
/// (`https://cdn.example.com/media/`), in which case both the request host and
/// the path prefix must match.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct StaticPath {
    pub host: Option<String>,
    pub prefix: String,
}

impl StaticPath {
    pub fn matches(&self, host: Option<&str>, path: &str) -> bool {
        if !path.starts_with(&self.prefix) {
            return false;
        }

        match &self.host {
            Some(expected) => host.is_some_and(|host| host.eq_ignore_ascii_case(expected)),
            None => true,
        }
    }
}

impl FromStr for StaticPath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('/') {
            return Ok(Self {
                host: None,
                prefix: s.to_string(),
            });
        }

        let url = Url::parse(s).map_err(|err| format!("static path '{s}' is neither a path nor a URL: {err}"))?;

        let Some(host) = url.host_str() else {
            return Err(format!("static path URL '{s}' has no host"));
        };

        let host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            host: Some(host),
            prefix: url.path().to_string(),
        })
    }
}

impl TryFrom<String> for StaticPath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for StaticPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Some(host) => write!(f, "//{host}{}", self.prefix),
            None => f.write_str(&self.prefix),
        }
    }
}
