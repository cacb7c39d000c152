//! DNS lookups for host and MX checks.

use std::net::ToSocketAddrs;

use serde::Deserialize;
use tracing::debug;

use crate::foundation::ServiceError;

/// DNS record types the e-mail checks ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Mail exchanger.
    Mx,
    /// IPv4 address.
    A,
    /// IPv6 address.
    Aaaa,
}

/// Resolves DNS records.
pub trait DnsResolver: Send + Sync {
    /// Whether `host` has at least one record of `kind`.
    fn has_record(&self, host: &str, kind: RecordKind) -> Result<bool, ServiceError>;
}

impl<F> DnsResolver for F
where
    F: Fn(&str, RecordKind) -> Result<bool, ServiceError> + Send + Sync,
{
    fn has_record(&self, host: &str, kind: RecordKind) -> Result<bool, ServiceError> {
        self(host, kind)
    }
}

/// Resolver backed by the operating system's address lookup.
///
/// Answers A and AAAA queries; MX queries are unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl DnsResolver for SystemResolver {
    fn has_record(&self, host: &str, kind: RecordKind) -> Result<bool, ServiceError> {
        let want_v4 = match kind {
            RecordKind::A => true,
            RecordKind::Aaaa => false,
            RecordKind::Mx => {
                return Err(ServiceError::Unsupported(
                    "MX lookups need a full DNS resolver".to_owned(),
                ));
            }
        };
        debug!(host, ?kind, "resolving host");
        match (host, 0).to_socket_addrs() {
            Ok(mut addrs) => Ok(addrs.any(|addr| addr.is_ipv4() == want_v4)),
            // Resolution failures mean "no such record", not a broken service.
            Err(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_resolver_rejects_mx() {
        let err = SystemResolver.has_record("example.com", RecordKind::Mx).unwrap_err();
        assert!(matches!(err, ServiceError::Unsupported(_)));
    }

    #[test]
    fn system_resolver_answers_literal_addresses() {
        assert!(SystemResolver.has_record("127.0.0.1", RecordKind::A).unwrap());
        assert!(!SystemResolver.has_record("127.0.0.1", RecordKind::Aaaa).unwrap());
    }
}
