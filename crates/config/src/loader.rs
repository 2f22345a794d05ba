use std::{collections::BTreeSet, path::Path};

use indoc::indoc;

use crate::{Config, Error};

pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config: Config = toml::from_str(&content)?;

    let warnings = validate(&config)?;

    for warning in warnings {
        log::warn!("{warning}");
    }

    Ok(config)
}

/// Validates the configuration, returning the warnings worth logging.
pub(crate) fn validate(config: &Config) -> crate::Result<Vec<String>> {
    let mut warnings = Vec::new();
    let gate = &config.gate;
    let health = &config.server.health;

    if health.enabled {
        validate_route_path("Health endpoint path", &health.path)?;
    }

    if !gate.enabled {
        return Ok(warnings);
    }

    validate_route_path("Gate path", &gate.path)?;

    if health.enabled {
        let health_path = health.path.trim_end_matches('/');

        if health_path == gate.path.trim_end_matches('/') {
            return Err(Error::Validation(format!(
                "Gate path and health endpoint path cannot be the same ({})",
                gate.path
            )));
        }

        if health_path == gate.ignore_path() {
            return Err(Error::Validation(format!(
                "Health endpoint path '{}' is already used by the gate's ignore endpoint",
                health.path
            )));
        }
    }

    if !is_cookie_name(&gate.cookie_name) {
        return Err(Error::Validation(format!(
            "Gate cookie name '{}' is not a valid cookie name",
            gate.cookie_name
        )));
    }

    if gate.requirements.is_empty() {
        warnings.push(
            indoc! {r#"
                The browser gate is enabled but no requirements are configured, every browser will be allowed.
                Add requirements to your configuration, for example:

                  [[gate.requirements]]
                  browser = "Firefox"
                  minimum_version = "115"
            "#}
            .to_string(),
        );
    }

    for static_path in &gate.static_paths {
        log::debug!("Requests to {static_path} bypass the browser gate");
    }

    let mut seen = BTreeSet::new();

    for (i, requirement) in gate.requirements.iter().enumerate() {
        if requirement.browser.trim().is_empty() {
            return Err(Error::Validation(format!("Gate requirement at index {i} has an empty browser name")));
        }

        if requirement
            .minimum_version
            .as_ref()
            .is_some_and(|minimum| minimum.as_str().trim().is_empty())
        {
            warnings.push(format!(
                "Browser '{}' has an empty minimum_version and is blocked in every version",
                requirement.browser
            ));
        }

        if !seen.insert(requirement.browser.to_lowercase()) {
            warnings.push(format!(
                "Browser '{}' is listed more than once in gate requirements, only the first entry is used",
                requirement.browser
            ));
        }
    }

    Ok(warnings)
}

fn validate_route_path(what: &str, path: &str) -> crate::Result<()> {
    if !path.starts_with('/') || path.trim_end_matches('/').is_empty() {
        return Err(Error::Validation(format!(
            "{what} '{path}' must start with '/' and cannot be the root path"
        )));
    }

    if path.contains(['{', '}', '*']) {
        return Err(Error::Validation(format!(
            "{what} '{path}' cannot contain '{{', '}}' or '*'"
        )));
    }

    Ok(())
}

fn is_cookie_name(name: &str) -> bool {
    const SEPARATORS: &[char] = &[
        '(', ')', '<', '>', '@', ',', ';', ':', '\\', '"', '/', '[', ']', '?', '=', '{', '}',
    ];

    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_graphic() && !SEPARATORS.contains(&c))
}
