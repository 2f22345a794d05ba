//! Browser requirement evaluation.
//!
//! Decides whether a client's declared browser is recent enough, given an ordered
//! list of [`Requirement`]s. Every decision fails open: whenever the information
//! needed to deny a client is missing, the client is allowed.

mod identity;
mod parser;
mod requirement;
mod version;

pub use identity::{Browser, OperatingSystem, ParsedIdentity, UserAgentInput, normalize};
pub use parser::{DefaultParser, UserAgentParser};
pub use requirement::{Requirement, is_allowed};
pub use version::{Version, compare};

/// Parses the input with the [`DefaultParser`] if needed and evaluates the requirements.
pub fn check_user_agent<'a>(input: impl Into<UserAgentInput<'a>>, requirements: &[Requirement]) -> bool {
    if requirements.is_empty() {
        return true;
    }

    let identity = normalize(Some(input.into()), &DefaultParser);
    is_allowed(&identity, requirements)
}
