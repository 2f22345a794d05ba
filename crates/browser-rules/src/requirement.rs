use serde::{Deserialize, Serialize};

use crate::{ParsedIdentity, Version};

/// A browser the gate knows about, with the oldest acceptable version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Requirement {
    /// Browser name, matched case-insensitively.
    pub browser: String,
    /// Oldest acceptable version. Without one the browser is never acceptable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_version: Option<Version>,
}

impl Requirement {
    pub fn minimum(browser: impl Into<String>, version: impl Into<Version>) -> Self {
        Self {
            browser: browser.into(),
            minimum_version: Some(version.into()),
        }
    }

    pub fn banned(browser: impl Into<String>) -> Self {
        Self {
            browser: browser.into(),
            minimum_version: None,
        }
    }

    fn matches(&self, lowercase_name: &str) -> bool {
        self.browser.to_lowercase() == lowercase_name
    }

    /// The oldest acceptable version. A blank minimum bans the browser like a missing one.
    fn effective_minimum(&self) -> Option<&Version> {
        self.minimum_version
            .as_ref()
            .filter(|minimum| !minimum.as_str().trim().is_empty())
    }

    fn accepts(&self, version: &Version) -> bool {
        self.effective_minimum().is_some_and(|minimum| version >= minimum)
    }
}

/// Decides whether a client may proceed.
///
/// Fails open: an unknown identity, an empty requirement list, or a browser no
/// requirement names are all allowed. Otherwise the first requirement naming the
/// browser decides, later ones for the same name are never consulted.
pub fn is_allowed(identity: &ParsedIdentity, requirements: &[Requirement]) -> bool {
    if requirements.is_empty() {
        return true;
    }

    let Some((name, version)) = identity.browser_name_and_version() else {
        return true;
    };

    let name = name.to_lowercase();

    let Some(requirement) = requirements.iter().find(|requirement| requirement.matches(&name)) else {
        log::trace!("No requirement for browser '{name}'");
        return true;
    };

    let version = Version::parse(version);
    let allowed = requirement.accepts(&version);

    if !allowed {
        match requirement.effective_minimum() {
            Some(minimum) => log::debug!("Browser '{name}' {version} is older than the required {minimum}"),
            None => log::debug!("Browser '{name}' is not supported in any version"),
        }
    }

    allowed
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Requirement, is_allowed};
    use crate::ParsedIdentity;

    fn chrome(version: &str) -> ParsedIdentity {
        ParsedIdentity::browser("Chrome", version)
    }

    #[test]
    fn no_requirements_allow_everything() {
        assert!(is_allowed(&chrome("1"), &[]));
        assert!(is_allowed(&ParsedIdentity::default(), &[]));
    }

    #[test]
    fn unknown_identity_is_allowed() {
        let requirements = [Requirement::minimum("Chrome", "5"), Requirement::banned("Firefox")];

        assert!(is_allowed(&ParsedIdentity::default(), &requirements));

        let no_version: ParsedIdentity = serde_json::from_value(json!({"browser": {"name": "Firefox"}})).unwrap();
        assert!(is_allowed(&no_version, &requirements));
    }

    #[test]
    fn unlisted_browser_is_allowed() {
        let requirements = [Requirement::minimum("Firefox", "3")];
        assert!(is_allowed(&chrome("1.0"), &requirements));
    }

    #[test]
    fn newer_and_equal_versions_pass() {
        let requirements = [Requirement::minimum("Chrome", "5.0.175.126")];

        assert!(is_allowed(&chrome("5.0.375.126"), &requirements));
        assert!(is_allowed(&chrome("5.0.175.126"), &requirements));
    }

    #[test]
    fn older_versions_fail() {
        assert!(!is_allowed(&chrome("4.0.375.126"), &[Requirement::minimum("Chrome", "5.0.175.126")]));
        assert!(!is_allowed(&chrome("5.1.375.126"), &[Requirement::minimum("Chrome", "5.2.375.126")]));
        assert!(!is_allowed(
            &ParsedIdentity::browser("Firefox", "1.0"),
            &[Requirement::minimum("Firefox", "3")]
        ));
    }

    #[test]
    fn banned_browser_fails_in_any_version() {
        let requirements = [Requirement::banned("Chrome")];

        assert!(!is_allowed(&chrome("5.0.375.126"), &requirements));
        assert!(!is_allowed(&chrome("999"), &requirements));
    }

    #[test]
    fn blank_minimum_bans_browser() {
        assert!(!is_allowed(&chrome("1.0"), &[Requirement::minimum("Chrome", "")]));
        assert!(!is_allowed(&chrome("999"), &[Requirement::minimum("Chrome", "  ")]));

        let requirements: Vec<Requirement> =
            serde_json::from_value(json!([{"browser": "Chrome", "minimum_version": ""}])).unwrap();

        assert!(!is_allowed(&chrome("1.0"), &requirements));
    }

    #[test]
    fn names_match_case_insensitively() {
        let identity = chrome("6.0.458.1");

        assert!(is_allowed(&identity, &[Requirement::minimum("chromE", "6.0.458.1")]));
        assert!(!is_allowed(&identity, &[Requirement::minimum("chromE", "6.0.458.2")]));
        assert!(!is_allowed(&identity, &[Requirement::banned("CHROME")]));
    }

    #[test]
    fn pre_release_requirements() {
        let identity = ParsedIdentity::browser("Microsoft Internet Explorer", "7b");

        assert!(is_allowed(&identity, &[Requirement::minimum("Microsoft Internet Explorer", "7b")]));
        assert!(!is_allowed(&identity, &[Requirement::minimum("Microsoft Internet Explorer", "7.0")]));
    }

    #[test]
    fn first_matching_requirement_decides() {
        let identity = chrome("5");

        let allow_first = [Requirement::minimum("Chrome", "4"), Requirement::banned("chrome")];
        assert!(is_allowed(&identity, &allow_first));

        let deny_first = [Requirement::minimum("Chrome", "6"), Requirement::minimum("chrome", "1")];
        assert!(!is_allowed(&identity, &deny_first));
    }

    #[test]
    fn deserializes_from_config_shape() {
        let requirements: Vec<Requirement> = serde_json::from_value(json!([
            {"browser": "Chrome", "minimum_version": "5.0.175.126"},
            {"browser": "Microsoft Internet Explorer"}
        ]))
        .unwrap();

        assert_eq!(
            requirements,
            vec![
                Requirement::minimum("Chrome", "5.0.175.126"),
                Requirement::banned("Microsoft Internet Explorer"),
            ]
        );
    }
}
