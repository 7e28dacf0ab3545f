//! HLS relay
//!
//! Fetches HLS playlists from upstream servers on behalf of a client and
//! rewrites every segment, key, map and variant reference so that later
//! requests come back through `/proxy/<percent-encoded url>`. Master
//! playlists are collapsed to their highest-bandwidth variant. Anything
//! that is not a playlist is passed through unchanged.

pub mod config;
pub mod config_file;
pub mod error;
pub mod fetch;
pub mod http;
pub mod playlist;
pub mod relay;
pub mod state;
pub mod user_agent;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{RelayError, Result};
pub use fetch::{Fetch, FetchResult, ForwardHeaders, HttpFetcher};
pub use relay::Relay;
