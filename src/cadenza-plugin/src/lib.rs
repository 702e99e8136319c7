//! Plugin contract for Cadenza playback providers.
//!
//! Every provider - local files, streaming services, feed players -
//! implements the [`Plugin`] trait and is driven through the same command
//! surface. Providers never see raw argument shapes: command input is
//! normalized into [`PlayArgs`] before it reaches them, and their result
//! lists travel back as uniform selection triples.

mod args;
mod contract;
mod registry;

pub use args::{PlayArgs, PlayRequest};
pub use contract::{validate_volume, CommandOutcome, Plugin, PluginError, PluginResult};
pub use registry::{LoadFailure, PluginRegistration, PluginRegistry};
