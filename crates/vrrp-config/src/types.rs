//! VRRP configuration data types and constants.
//!
//! Defaults and limits follow keepalived's VRRP configuration semantics.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use serde::Serialize;

/// Ticks per second of the internal timer
pub const TIMER_HZ: u64 = 1_000_000;

/// Largest delay in seconds the timer accepts
pub const TIMER_MAX_SEC: i64 = 1000;

/// Default capacity of the virtual address list
pub const VRRP_MAX_VIP: usize = 20;

/// Default priority
pub const VRRP_PRIO_DFL: u8 = 100;

/// Default advertisement interval (centiseconds)
pub const DEFAULT_ADVERT_INTERVAL: u64 = 100; // 1 second

/// Default number of gratuitous ARPs sent on transition to master
pub const VRRP_GARP_REP: u32 = 5;

/// Default number of gratuitous ARPs sent per refresh
pub const VRRP_GARP_REFRESH_REP: u32 = 1;

/// Default delay before the second GARP burst (seconds)
pub const VRRP_GARP_DELAY: u64 = 5;

/// Capacity of the authentication secret (bytes)
pub const VRRP_AUTH_LEN: usize = 8;

/// Capacity of an interface name (IFNAMSIZ - 1)
pub const IF_NAME_LEN: usize = 15;

/// Default health-check script interval (seconds)
pub const VRRP_SCRIPT_DI: u64 = 1;

/// Default health-check script timeout (seconds)
pub const VRRP_SCRIPT_DT: u64 = 2;

/// Largest absolute weight of a tracked interface or script
pub const VRRP_MAX_TRACK_WEIGHT: i64 = 254;

/// VRRP state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VRRPState {
    /// Initial state - not yet initialized
    Init,
    /// Backup state - monitoring for master failures
    Backup,
    /// Master state - sending advertisements
    Master,
}

impl fmt::Display for VRRPState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VRRPState::Init => write!(f, "INIT"),
            VRRPState::Backup => write!(f, "BACKUP"),
            VRRPState::Master => write!(f, "MASTER"),
        }
    }
}

impl VRRPState {
    /// Parse a configured state keyword. Only MASTER and BACKUP can be requested.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "MASTER" => Some(VRRPState::Master),
            "BACKUP" => Some(VRRPState::Backup),
            _ => None,
        }
    }
}

/// Address family of an instance or entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressFamily {
    #[serde(rename = "inet")]
    V4,
    #[serde(rename = "inet6")]
    V6,
}

impl AddressFamily {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// Full-length prefix for this family
    pub fn max_prefix_len(self) -> u8 {
        match self {
            AddressFamily::V4 => 32,
            AddressFamily::V6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => write!(f, "IPv4"),
            AddressFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// VRRP protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProtocolVersion {
    /// RFC 3768
    V2,
    /// RFC 5798
    V3,
}

impl ProtocolVersion {
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            2 => Some(ProtocolVersion::V2),
            3 => Some(ProtocolVersion::V3),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            ProtocolVersion::V2 => 2,
            ProtocolVersion::V3 => 3,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Interval or delay in timer ticks (1 tick = 1/TIMER_HZ second)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Ticks(u64);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    pub const fn from_secs(secs: u64) -> Self {
        Ticks(secs.saturating_mul(TIMER_HZ))
    }

    /// Centiseconds are the unit advertisement intervals are configured in.
    pub const fn from_centis(centis: u64) -> Self {
        Ticks(centis.saturating_mul(TIMER_HZ / 100))
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whole seconds, rounded down
    pub const fn as_secs(self) -> u64 {
        self.0 / TIMER_HZ
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0 / TIMER_HZ)
            + Duration::from_nanos((self.0 % TIMER_HZ) * 1_000_000_000 / TIMER_HZ)
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(VRRPState::Init.to_string(), "INIT");
        assert_eq!(VRRPState::Master.to_string(), "MASTER");
        assert_eq!(VRRPState::from_keyword("BACKUP"), Some(VRRPState::Backup));
        assert_eq!(VRRPState::from_keyword("master"), None);
    }

    #[test]
    fn test_ticks_conversions() {
        assert_eq!(Ticks::from_secs(1).raw(), TIMER_HZ);
        assert_eq!(Ticks::from_centis(DEFAULT_ADVERT_INTERVAL), Ticks::from_secs(1));
        assert_eq!(Ticks::from_centis(1).as_duration(), Duration::from_millis(10));
        assert_eq!(Ticks::from_secs(10).as_duration(), Duration::from_secs(10));
        assert_eq!(Ticks::from_centis(250).as_secs(), 2);
    }

    #[test]
    fn test_family_of_address() {
        assert_eq!(AddressFamily::of(&"10.0.0.1".parse().unwrap()), AddressFamily::V4);
        assert_eq!(AddressFamily::of(&"fe80::1".parse().unwrap()), AddressFamily::V6);
        assert_eq!(AddressFamily::V6.max_prefix_len(), 128);
    }

    #[test]
    fn test_protocol_version_numbers() {
        assert_eq!(ProtocolVersion::from_number(2), Some(ProtocolVersion::V2));
        assert_eq!(ProtocolVersion::from_number(4), None);
        assert_eq!(ProtocolVersion::V3.number(), 3);
    }
}
