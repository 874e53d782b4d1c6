//! Compiler settings supplied by the deployment.

use serde::{Deserialize, Serialize};

use crate::Encoding;

/// Query length past which geohash cells stop being added under GET-only
/// transport.
pub const DEFAULT_GEOHASH_QUERY_LIMIT: usize = 1900;

/// Longest request URL sent with GET before switching to POST.
pub const DEFAULT_URL_LENGTH_LIMIT: usize = 2000;

/// How a request reaches the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transport {
    /// Query in the URL.
    Get,
    /// Query in the request body.
    Post,
}

/// Settings that shape a compiled query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Only GET requests are possible, so long queries must be cut short.
    pub disable_query_posts: bool,
    /// The map filter is offered in this deployment.
    pub spatial_enabled: bool,
    /// How values are encoded.
    pub encoding: Encoding,
    /// Query length limit for geohash truncation.
    pub geohash_query_limit: usize,
    /// URL length limit for choosing GET over POST.
    pub url_length_limit: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            disable_query_posts: false,
            spatial_enabled: true,
            encoding: Encoding::Url,
            geohash_query_limit: DEFAULT_GEOHASH_QUERY_LIMIT,
            url_length_limit: DEFAULT_URL_LENGTH_LIMIT,
        }
    }
}

impl CompilerConfig {
    /// Picks the transport for a request of `request_len` characters.
    pub fn transport_for(&self, request_len: usize) -> Transport {
        if self.disable_query_posts || request_len <= self.url_length_limit {
            Transport::Get
        } else {
            Transport::Post
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_requests_use_get() {
        let config = CompilerConfig::default();
        assert_eq!(config.transport_for(120), Transport::Get);
        assert_eq!(config.transport_for(2000), Transport::Get);
        assert_eq!(config.transport_for(2001), Transport::Post);
    }

    #[test]
    fn get_only_never_posts() {
        let config = CompilerConfig {
            disable_query_posts: true,
            ..CompilerConfig::default()
        };
        assert_eq!(config.transport_for(10_000), Transport::Get);
    }
}
