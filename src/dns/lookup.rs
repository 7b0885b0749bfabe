//! DNS resolution primitive.
//!
//! The probe executor does not speak the DNS wire protocol itself. It drives
//! a [`Lookup`] implementation that resolves one name against one resolver
//! and classifies the failure. [`TrustDnsLookup`] is the implementation used
//! by the binary; tests substitute scripted ones.

#![allow(clippy::missing_errors_doc)]

use crate::dns::types::Resolver;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::error::ProtoErrorKind;
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::proto::rr::RecordType;
use trust_dns_resolver::TokioAsyncResolver;

/// Classified failure of a single resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The name has no records of the requested type, or does not exist.
    #[error("no record: {0}")]
    NoRecord(String),
    /// The attempt did not complete within its deadline.
    #[error("timed out")]
    Timeout,
    /// Anything else: network errors, malformed responses, server failures.
    #[error("{0}")]
    Other(String),
}

impl From<ResolveError> for LookupError {
    fn from(e: ResolveError) -> Self {
        match e.kind() {
            // SERVFAIL, REFUSED and other error rcodes also arrive as NoRecordsFound
            ResolveErrorKind::NoRecordsFound {
                response_code: ResponseCode::NXDomain | ResponseCode::NoError,
                ..
            } => Self::NoRecord(e.to_string()),
            ResolveErrorKind::Timeout => Self::Timeout,
            ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
                Self::Timeout
            }
            _ => Self::Other(e.to_string()),
        }
    }
}

/// A single DNS resolution attempt against one resolver.
///
/// `timeout` is both the per-attempt deadline and the overall lifetime of
/// the attempt; implementations must give up and return
/// [`LookupError::Timeout`] once it elapses.
pub trait Lookup: Send + Sync + 'static {
    fn lookup(
        &self,
        resolver: &str,
        domain: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), LookupError>> + Send;
}

/// `A` record lookups through `trust-dns-resolver`.
///
/// A fresh resolver is built for every attempt, so answers are never served
/// from a cache warmed by an earlier probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustDnsLookup;

impl TrustDnsLookup {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn build(resolver: &str, timeout: Duration) -> Result<TokioAsyncResolver, LookupError> {
        let addr = Resolver::new(resolver, "")
            .socket_addr()
            .ok_or_else(|| LookupError::Other(format!("invalid resolver address: {resolver}")))?;

        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(&[addr.ip()], addr.port(), true),
        );

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.use_hosts_file = false;

        TokioAsyncResolver::tokio(config, opts).map_err(LookupError::from)
    }
}

impl Lookup for TrustDnsLookup {
    async fn lookup(&self, resolver: &str, domain: &str, timeout: Duration) -> Result<(), LookupError> {
        let client = Self::build(resolver, timeout)?;

        // Fully qualify so search domains never apply
        let name = if domain.ends_with('.') {
            domain.to_string()
        } else {
            format!("{domain}.")
        };

        match tokio::time::timeout(timeout, client.lookup(name, RecordType::A)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(LookupError::Timeout),
        }
    }
}
