//! CIDR membership checks.
//!
//! Matching fails closed: malformed addresses, mixed address families and
//! out-of-range prefix lengths all report "no match" instead of erroring.

use std::net::IpAddr;

/// A parsed `address[/prefix]` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrBlock {
    base: IpAddr,
    prefix: u32,
}

impl CidrBlock {
    /// Parse `address` or `address/prefix`
    ///
    /// A missing prefix covers the full address width, so the block holds
    /// exactly one address. Prefixes that are not plain decimal integers
    /// within `0..=width` are rejected.
    pub fn parse(mask: &str) -> Option<Self> {
        let (address, prefix) = match mask.trim().split_once('/') {
            Some((address, prefix)) => (address, Some(prefix)),
            None => (mask.trim(), None),
        };

        let base: IpAddr = address.parse().ok()?;
        let width = bit_width(&base);
        let prefix = match prefix {
            None => width,
            Some(prefix) if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) => {
                prefix.parse::<u32>().ok()?
            }
            Some(_) => return None,
        };

        (prefix <= width).then_some(Self { base, prefix })
    }

    /// The base address as written
    pub fn base(&self) -> IpAddr {
        self.base
    }

    /// Number of leading bits that must match
    pub fn prefix_len(&self) -> u32 {
        self.prefix
    }

    /// Does `ip` share the block's leading `prefix` bits?
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (self.base, ip) {
            (IpAddr::V4(base), IpAddr::V4(ip)) => {
                let mask = prefix_mask_u32(self.prefix);
                u32::from(base) & mask == u32::from(*ip) & mask
            }
            (IpAddr::V6(base), IpAddr::V6(ip)) => {
                let mask = prefix_mask_u128(self.prefix);
                u128::from(base) & mask == u128::from(*ip) & mask
            }
            _ => false,
        }
    }
}

/// Is `ip` inside the CIDR block described by `mask`?
///
/// ```
/// use http_helpers::ip_match;
///
/// assert!(ip_match("192.168.1.5", "192.168.1.0/24"));
/// assert!(!ip_match("::1", "10.0.0.0/8"));
/// ```
pub fn ip_match(ip: &str, mask: &str) -> bool {
    let Ok(ip) = ip.trim().parse::<IpAddr>() else {
        tracing::trace!(ip, "unparseable address never matches");
        return false;
    };

    match CidrBlock::parse(mask) {
        Some(block) => block.contains(&ip),
        None => {
            tracing::trace!(mask, "invalid CIDR mask never matches");
            false
        }
    }
}

fn bit_width(ip: &IpAddr) -> u32 {
    match ip {
        IpAddr::V4(_) => u32::BITS,
        IpAddr::V6(_) => u128::BITS,
    }
}

fn prefix_mask_u32(prefix: u32) -> u32 {
    u32::MAX.checked_shl(u32::BITS - prefix).unwrap_or(0)
}

fn prefix_mask_u128(prefix: u32) -> u128 {
    u128::MAX.checked_shl(u128::BITS - prefix).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_prefix_match() {
        assert!(ip_match("192.168.1.5", "192.168.1.0/24"));
        assert!(!ip_match("192.168.2.5", "192.168.1.0/24"));
        assert!(ip_match("10.255.0.1", "10.0.0.0/8"));
        assert!(ip_match("172.31.255.255", "172.16.0.0/12"));
        assert!(!ip_match("172.32.0.0", "172.16.0.0/12"));
    }

    #[test]
    fn test_missing_prefix_means_exact_match() {
        assert!(ip_match("10.0.0.1", "10.0.0.1"));
        assert!(!ip_match("10.0.0.2", "10.0.0.1"));
        assert!(ip_match("2001:db8::1", "2001:db8::1"));
        assert!(!ip_match("2001:db8::2", "2001:db8::1"));
    }

    #[test]
    fn test_zero_prefix_matches_whole_family() {
        assert!(ip_match("8.8.8.8", "0.0.0.0/0"));
        assert!(ip_match("1.2.3.4", "192.168.0.0/0"));
        assert!(ip_match("2001:db8::1", "::/0"));
        assert!(!ip_match("::1", "0.0.0.0/0"));
    }

    #[test]
    fn test_full_width_prefix() {
        assert!(ip_match("10.0.0.1", "10.0.0.1/32"));
        assert!(!ip_match("10.0.0.2", "10.0.0.1/32"));
        assert!(ip_match("::1", "::1/128"));
        assert!(!ip_match("::2", "::1/128"));
    }

    #[test]
    fn test_ipv6_prefix_match() {
        assert!(ip_match("2001:db8:abcd::1", "2001:db8::/32"));
        assert!(!ip_match("2001:db9::1", "2001:db8::/32"));
        assert!(ip_match("fe80::1234", "fe80::/10"));
        assert!(ip_match("febf::1", "fe80::/10"));
        assert!(!ip_match("fec0::1", "fe80::/10"));
    }

    #[test]
    fn test_prefix_not_aligned_to_octets() {
        assert!(ip_match("192.168.1.127", "192.168.1.0/25"));
        assert!(!ip_match("192.168.1.128", "192.168.1.0/25"));
    }

    #[test]
    fn test_family_mismatch_fails_closed() {
        assert!(!ip_match("::1", "10.0.0.0/8"));
        assert!(!ip_match("10.0.0.1", "::/0"));
        assert!(!ip_match("::ffff:10.0.0.1", "10.0.0.0/8"));
    }

    #[test]
    fn test_out_of_range_prefix_fails_closed() {
        assert!(!ip_match("10.0.0.1", "10.0.0.1/33"));
        assert!(!ip_match("10.0.0.1", "10.0.0.1/-1"));
        assert!(!ip_match("::1", "::1/129"));
        assert!(!ip_match("::1", "::1/-5"));
        assert!(!ip_match("10.0.0.1", "10.0.0.0/99999999999999999999"));
    }

    #[test]
    fn test_non_numeric_prefix_fails_closed() {
        assert!(!ip_match("10.0.0.1", "10.0.0.0/abc"));
        assert!(!ip_match("10.0.0.1", "10.0.0.0/"));
        assert!(!ip_match("10.0.0.1", "10.0.0.0/+8"));
        assert!(!ip_match("10.0.0.1", "10.0.0.0/8/8"));
    }

    #[test]
    fn test_malformed_addresses_fail_closed() {
        assert!(!ip_match("", "10.0.0.0/8"));
        assert!(!ip_match("not-an-ip", "10.0.0.0/8"));
        assert!(!ip_match("10.0.0.256", "10.0.0.0/8"));
        assert!(!ip_match("10.0.0.1", ""));
        assert!(!ip_match("10.0.0.1", "/8"));
        assert!(!ip_match("10.0.0.1", "ten.0.0.0/8"));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(ip_match(" 192.168.1.5 ", " 192.168.1.0/24 "));
    }

    #[test]
    fn test_cidr_block_parse() {
        let block = CidrBlock::parse("192.168.0.0/16").unwrap();
        assert_eq!(block.base(), "192.168.0.0".parse::<IpAddr>().unwrap());
        assert_eq!(block.prefix_len(), 16);
        assert!(block.contains(&"192.168.44.1".parse().unwrap()));

        assert_eq!(CidrBlock::parse("::1").unwrap().prefix_len(), 128);
        assert!(CidrBlock::parse("10.0.0.0/33").is_none());
        assert!(CidrBlock::parse("garbage").is_none());
    }

    #[test]
    fn test_prefix_masks() {
        assert_eq!(prefix_mask_u32(0), 0);
        assert_eq!(prefix_mask_u32(8), 0xff00_0000);
        assert_eq!(prefix_mask_u32(32), u32::MAX);
        assert_eq!(prefix_mask_u128(0), 0);
        assert_eq!(prefix_mask_u128(128), u128::MAX);
    }
}
