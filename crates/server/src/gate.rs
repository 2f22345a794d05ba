//! Browser gate: intercepts requests from browsers that do not meet the configured requirements.

mod cookie;
mod endpoints;
mod layer;
mod page;

pub(crate) use endpoints::routes;
pub use layer::*;
pub(crate) use page::escape;
