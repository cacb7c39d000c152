//! IP addresses.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::Deserialize;

use crate::constraints::basic::Normalizer;
use crate::constraints::report;
use crate::foundation::{ExecutionContext, Groups, Validate, ValidatorError, Value, text_input};

/// Address families and ranges an [`Ip`] constraint accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum IpVersion {
    /// IPv4.
    #[serde(rename = "4")]
    #[default]
    V4,
    /// IPv6.
    #[serde(rename = "6")]
    V6,
    /// Either family.
    #[serde(rename = "all")]
    All,
    /// IPv4 outside private ranges.
    #[serde(rename = "4_no_priv")]
    V4NoPrivate,
    /// IPv6 outside private ranges.
    #[serde(rename = "6_no_priv")]
    V6NoPrivate,
    /// Either family, outside private ranges.
    #[serde(rename = "all_no_priv")]
    AllNoPrivate,
    /// IPv4 outside reserved ranges.
    #[serde(rename = "4_no_res")]
    V4NoReserved,
    /// IPv6 outside reserved ranges.
    #[serde(rename = "6_no_res")]
    V6NoReserved,
    /// Either family, outside reserved ranges.
    #[serde(rename = "all_no_res")]
    AllNoReserved,
    /// Public IPv4.
    #[serde(rename = "4_public")]
    V4Public,
    /// Public IPv6.
    #[serde(rename = "6_public")]
    V6Public,
    /// Any public address.
    #[serde(rename = "all_public")]
    AllPublic,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Family {
    V4,
    V6,
    Any,
}

impl IpVersion {
    /// (family, reject private, reject reserved)
    fn rules(self) -> (Family, bool, bool) {
        match self {
            Self::V4 => (Family::V4, false, false),
            Self::V6 => (Family::V6, false, false),
            Self::All => (Family::Any, false, false),
            Self::V4NoPrivate => (Family::V4, true, false),
            Self::V6NoPrivate => (Family::V6, true, false),
            Self::AllNoPrivate => (Family::Any, true, false),
            Self::V4NoReserved => (Family::V4, false, true),
            Self::V6NoReserved => (Family::V6, false, true),
            Self::AllNoReserved => (Family::Any, false, true),
            Self::V4Public => (Family::V4, true, true),
            Self::V6Public => (Family::V6, true, true),
            Self::AllPublic => (Family::Any, true, true),
        }
    }
}

fn in_v4_net(ip: Ipv4Addr, net: [u8; 4], prefix: u32) -> bool {
    let mask = u32::MAX.checked_shl(32 - prefix).unwrap_or(0);
    u32::from(ip) & mask == u32::from(Ipv4Addr::from(net)) & mask
}

fn in_v6_net(ip: Ipv6Addr, net: u128, prefix: u32) -> bool {
    let mask = u128::MAX.checked_shl(128 - prefix).unwrap_or(0);
    u128::from(ip) & mask == net & mask
}

fn is_private(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ip) => {
            in_v4_net(ip, [10, 0, 0, 0], 8)
                || in_v4_net(ip, [172, 16, 0, 0], 12)
                || in_v4_net(ip, [192, 168, 0, 0], 16)
        }
        IpAddr::V6(ip) => in_v6_net(ip, 0xfc00 << 112, 7),
    }
}

fn is_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ip) => {
            in_v4_net(ip, [0, 0, 0, 0], 8)
                || in_v4_net(ip, [127, 0, 0, 0], 8)
                || in_v4_net(ip, [169, 254, 0, 0], 16)
                || in_v4_net(ip, [240, 0, 0, 0], 4)
        }
        IpAddr::V6(ip) => {
            ip.is_loopback()
                || ip.is_unspecified()
                || in_v6_net(ip, 0xffff << 32, 96)
                || in_v6_net(ip, 0xfe80 << 112, 10)
        }
    }
}

/// The value must be an IP address of the configured family and range.
/// IPv4 in any range is the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ip {
    /// Accepted family and ranges.
    pub version: IpVersion,
    /// Applied before checking.
    pub normalizer: Option<Normalizer>,
    /// Message override.
    pub message: Option<String>,
    /// Validation groups.
    pub groups: Groups,
}

impl Ip {
    crate::error_codes! {
        INVALID_IP_ERROR = "b1b427ae-9f6f-41b0-aa9b-84511fbb3c5b";
    }

    const MESSAGE: &'static str = "This is not a valid IP address.";

    /// Accepts `version`.
    pub fn new(version: IpVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    fn accepts(&self, text: &str) -> bool {
        let (family, no_private, no_reserved) = self.version.rules();
        let ip = match family {
            Family::V4 => text.parse::<Ipv4Addr>().map(IpAddr::V4),
            Family::V6 => text.parse::<Ipv6Addr>().map(IpAddr::V6),
            Family::Any => text.parse::<IpAddr>(),
        };
        let Ok(ip) = ip else {
            return false;
        };
        !(no_private && is_private(ip)) && !(no_reserved && is_reserved(ip))
    }
}

impl Validate for Ip {
    fn validate(&self, value: &Value, ctx: &mut ExecutionContext<'_>) -> Result<(), ValidatorError> {
        let Some(text) = text_input(value)? else {
            return Ok(());
        };
        let text = match self.normalizer {
            Some(normalizer) => normalizer.apply(&text),
            None => text.as_ref(),
        };
        if !self.accepts(text) {
            report(ctx, self.message.as_deref(), Self::MESSAGE, value, Self::INVALID_IP_ERROR);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_no_violation, single_code, validate};
    use rstest::rstest;

    #[rstest]
    #[case(IpVersion::V4, "0.0.0.0")]
    #[case(IpVersion::V4, "10.0.0.0")]
    #[case(IpVersion::V4, "255.255.255.255")]
    #[case(IpVersion::V4, "192.168.1.0")]
    #[case(IpVersion::V6, "2001:0db8:85a3:0000:0000:8a2e:0370:7334")]
    #[case(IpVersion::V6, "::1")]
    #[case(IpVersion::V6, "fe80::1")]
    #[case(IpVersion::All, "127.0.0.1")]
    #[case(IpVersion::All, "::ffff:192.0.2.128")]
    #[case(IpVersion::V4Public, "8.8.8.8")]
    #[case(IpVersion::V6Public, "2001:4860:4860::8888")]
    #[case(IpVersion::AllPublic, "1.1.1.1")]
    #[case(IpVersion::V4NoPrivate, "127.0.0.1")]
    #[case(IpVersion::V4NoReserved, "192.168.0.1")]
    fn accepted(#[case] version: IpVersion, #[case] ip: &str) {
        assert_no_violation(&Ip::new(version), &Value::from(ip));
    }

    #[rstest]
    #[case(IpVersion::V4, "0")]
    #[case(IpVersion::V4, "256.0.0.0")]
    #[case(IpVersion::V4, "0.0.0.-1")]
    #[case(IpVersion::V4, "010.0.0.1")]
    #[case(IpVersion::V4, "::1")]
    #[case(IpVersion::V6, "127.0.0.1")]
    #[case(IpVersion::V6, "z001:0db8:85a3:0000:0000:8a2e:0370:7334")]
    #[case(IpVersion::V6, "2001:0db8:85a3::8a2e::7334")]
    #[case(IpVersion::V4NoPrivate, "10.0.0.1")]
    #[case(IpVersion::V4NoPrivate, "172.16.0.1")]
    #[case(IpVersion::V4NoPrivate, "172.31.255.255")]
    #[case(IpVersion::V4NoPrivate, "192.168.200.1")]
    #[case(IpVersion::V6NoPrivate, "fdfe:dcba:9876:ffff:fdc6:c46b:bb8f:7d4c")]
    #[case(IpVersion::V4NoReserved, "0.0.0.0")]
    #[case(IpVersion::V4NoReserved, "127.0.0.1")]
    #[case(IpVersion::V4NoReserved, "169.254.1.1")]
    #[case(IpVersion::V4NoReserved, "240.0.0.1")]
    #[case(IpVersion::V6NoReserved, "::1")]
    #[case(IpVersion::V6NoReserved, "fe80::1")]
    #[case(IpVersion::V6NoReserved, "::ffff:10.0.0.1")]
    #[case(IpVersion::AllPublic, "192.168.1.1")]
    #[case(IpVersion::AllPublic, "fe80::1")]
    fn rejected(#[case] version: IpVersion, #[case] ip: &str) {
        let violations = validate(&Ip::new(version), &Value::from(ip));
        assert_eq!(single_code(&violations), Ip::INVALID_IP_ERROR);
    }

    #[test]
    fn private_range_edges() {
        let rule = Ip::new(IpVersion::V4NoPrivate);
        assert_no_violation(&rule, &Value::from("172.15.255.255"));
        assert_no_violation(&rule, &Value::from("172.32.0.0"));
    }

    #[test]
    fn defaults_to_any_ipv4() {
        assert_no_violation(&Ip::default(), &Value::from("10.0.0.1"));
        assert_eq!(validate(&Ip::default(), &Value::from("::1")).len(), 1);
    }

    #[test]
    fn version_names_in_rule_files() {
        let rule: Ip = serde_json::from_str(r#"{"version": "6_no_priv"}"#).unwrap();
        assert_eq!(rule.version, IpVersion::V6NoPrivate);
    }
}
