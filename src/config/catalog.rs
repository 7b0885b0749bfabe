//! Resolver and domain catalogs.
//!
//! Both catalogs are plain values handed to the engine, so tests and
//! callers can substitute their own.

use crate::dns::types::Resolver;
use serde::{Deserialize, Serialize};

/// Domains probed by default.
const DEFAULT_DOMAINS: &[&str] = &[
    "example.com", "google.com", "amazon.com", "apple.com", "microsoft.com",
    "facebook.com", "yahoo.com", "wikipedia.org", "github.com", "stackoverflow.com",
    "netflix.com", "reddit.com", "linkedin.com", "bing.com", "quora.com",
    "twitter.com", "instagram.com", "nytimes.com", "cnn.com", "bbc.com",
    "whatsapp.com", "tiktok.com", "paypal.com", "ebay.com", "adobe.com",
    "dropbox.com", "cloudflare.com", "spotify.com", "pinterest.com", "zoom.us",
    "salesforce.com", "wordpress.com", "medium.com", "bitbucket.org", "archive.org",
    "live.com", "msn.com", "weebly.com", "mozilla.org", "oracle.com",
    "booking.com", "airbnb.com", "twitch.tv", "imgur.com", "duckduckgo.com",
    "ikea.com", "hulu.com", "bloomberg.com", "forbes.com", "telegram.org",
];

/// Resolvers probed by default.
const DEFAULT_RESOLVERS: &[(&str, &str)] = &[
    ("8.8.8.8", "Google Public DNS"),
    ("1.1.1.1", "Cloudflare DNS"),
    ("9.9.9.9", "Quad9 DNS"),
    ("208.67.222.222", "OpenDNS"),
];

/// Resolver catalog file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverList {
    pub resolvers: Vec<Resolver>,
}

/// The static inputs of a run: which resolvers, which domains.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub resolvers: Vec<Resolver>,
    pub domains: Vec<String>,
}

impl Catalog {
    #[must_use]
    pub fn new(resolvers: Vec<Resolver>, domains: Vec<String>) -> Self {
        Self { resolvers, domains }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(default_resolvers(), default_domains())
    }
}

/// Return the well-known public resolvers.
#[must_use]
pub fn default_resolvers() -> Vec<Resolver> {
    DEFAULT_RESOLVERS
        .iter()
        .map(|(address, description)| Resolver::new(*address, *description))
        .collect()
}

/// Return the 50 popular domains used for probing.
#[must_use]
pub fn default_domains() -> Vec<String> {
    DEFAULT_DOMAINS.iter().map(|d| (*d).to_string()).collect()
}
