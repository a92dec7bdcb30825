//! Entities of the configuration object graph.

use std::net::IpAddr;
use std::time::Instant;

use serde::Serialize;

use crate::address::{IpAddress, Route, Rule};
use crate::bounded::{AuthSecret, IfName};
use crate::types::{
    AddressFamily, DEFAULT_ADVERT_INTERVAL, ProtocolVersion, Ticks, VRRP_GARP_DELAY,
    VRRP_GARP_REFRESH_REP, VRRP_GARP_REP, VRRP_PRIO_DFL, VRRP_SCRIPT_DI, VRRP_SCRIPT_DT,
    VRRPState,
};

/// Authentication method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum AuthType {
    #[default]
    None,
    /// Simple password (PASS)
    Password,
    /// Legacy IPSEC-AH
    Ah,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Authentication {
    pub auth_type: AuthType,
    #[serde(skip_serializing)]
    pub secret: AuthSecret,
}

/// Commands run on state transitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotifyScripts {
    pub master: Option<String>,
    pub backup: Option<String>,
    pub fault: Option<String>,
    /// Only instances have a stop command
    pub stop: Option<String>,
    /// Generic command called with the new state as argument
    pub generic: Option<String>,
}

impl NotifyScripts {
    /// Whether any command has been configured
    pub fn any(&self) -> bool {
        self.master.is_some()
            || self.backup.is_some()
            || self.fault.is_some()
            || self.stop.is_some()
            || self.generic.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedInterface {
    pub name: IfName,
    pub weight: i32,
}

/// Reference to a `vrrp_script` by name, resolved by the health-check engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedScript {
    pub name: String,
    /// Overrides the script's own weight when present
    pub weight: Option<i32>,
}

/// Virtual MAC settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vmac {
    pub enabled: bool,
    pub ifname: Option<IfName>,
    pub xmit_base: bool,
}

/// Gratuitous ARP behaviour on and after becoming master
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Garp {
    /// Delay before the second burst
    pub delay: Ticks,
    /// Refresh period in seconds, 0 disables refresh
    pub refresh_secs: u64,
    pub repeat: u32,
    pub refresh_repeat: u32,
}

impl Default for Garp {
    fn default() -> Self {
        Self {
            delay: Ticks::from_secs(VRRP_GARP_DELAY),
            refresh_secs: 0,
            repeat: VRRP_GARP_REP,
            refresh_repeat: VRRP_GARP_REFRESH_REP,
        }
    }
}

/// One VRRP instance (`vrrp_instance` block)
#[derive(Debug, Clone, Serialize)]
pub struct VRRPInstance {
    pub name: String,

    /// Fixed by the first address-bearing field
    pub family: Option<AddressFamily>,
    pub version: Option<ProtocolVersion>,

    /// Virtual Router ID (1-255), 0 while unset
    pub vrid: u8,

    /// Configured priority (1-255)
    pub base_priority: u8,
    /// Priority after tracking adjustments; starts equal to the base
    pub effective_priority: u8,

    pub advert_int: Ticks,

    pub want_state: VRRPState,
    pub init_state: VRRPState,

    pub preempt: bool,
    pub preempt_delay: Ticks,
    /// Earliest time preemption is allowed
    #[serde(skip)]
    pub preempt_time: Option<Instant>,

    pub auth: Authentication,

    pub interface: Option<IfName>,
    pub dont_track_primary: bool,
    /// Source address for adverts (multicast or unicast)
    pub source_address: Option<IpAddr>,
    pub unicast_peers: Vec<IpAddr>,

    pub vips: Vec<IpAddress>,
    pub excluded_vips: Vec<IpAddress>,
    pub virtual_routes: Vec<Route>,
    pub virtual_rules: Vec<Rule>,

    pub notify: NotifyScripts,
    pub notify_exec: bool,
    pub smtp_alert: bool,

    pub track_interfaces: Vec<TrackedInterface>,
    pub track_scripts: Vec<TrackedScript>,

    pub vmac: Vmac,
    pub accept: bool,
    pub lvs_sync_daemon_interface: Option<String>,
    pub garp: Garp,
    pub debug: u8,

    /// Owning sync group, set when groups are linked
    pub sync_group: Option<String>,
}

impl VRRPInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            family: None,
            version: None,
            vrid: 0,
            base_priority: VRRP_PRIO_DFL,
            effective_priority: VRRP_PRIO_DFL,
            advert_int: Ticks::from_centis(DEFAULT_ADVERT_INTERVAL),
            want_state: VRRPState::Backup,
            init_state: VRRPState::Backup,
            preempt: true,
            preempt_delay: Ticks::ZERO,
            preempt_time: None,
            auth: Authentication::default(),
            interface: None,
            dont_track_primary: false,
            source_address: None,
            unicast_peers: Vec::new(),
            vips: Vec::new(),
            excluded_vips: Vec::new(),
            virtual_routes: Vec::new(),
            virtual_rules: Vec::new(),
            notify: NotifyScripts::default(),
            notify_exec: false,
            smtp_alert: false,
            track_interfaces: Vec::new(),
            track_scripts: Vec::new(),
            vmac: Vmac::default(),
            accept: false,
            lvs_sync_daemon_interface: None,
            garp: Garp::default(),
            debug: 0,
            sync_group: None,
        }
    }

    /// Adverts go to explicit peers instead of the multicast group
    pub fn is_unicast(&self) -> bool {
        !self.unicast_peers.is_empty()
    }
}

/// A `vrrp_sync_group` block
#[derive(Debug, Clone, Serialize)]
pub struct VRRPSyncGroup {
    pub name: String,
    /// Member instance names in declaration order
    pub members: Vec<String>,
    pub state: VRRPState,
    pub notify: NotifyScripts,
    pub notify_exec: bool,
    pub smtp_alert: bool,
    pub global_tracking: bool,
}

impl VRRPSyncGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            state: VRRPState::Backup,
            notify: NotifyScripts::default(),
            notify_exec: false,
            smtp_alert: false,
            global_tracking: false,
        }
    }
}

/// A `vrrp_script` health check
#[derive(Debug, Clone, Serialize)]
pub struct VRRPScript {
    pub name: String,
    pub command: Option<String>,
    pub interval: Ticks,
    pub timeout: Ticks,
    pub weight: i32,
    pub rise: u32,
    pub fall: u32,
}

impl VRRPScript {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: None,
            interval: Ticks::from_secs(VRRP_SCRIPT_DI),
            timeout: Ticks::from_secs(VRRP_SCRIPT_DT),
            weight: 0,
            rise: 1,
            fall: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_defaults() {
        let vrrp = VRRPInstance::new("VI_1");
        assert_eq!(vrrp.vrid, 0);
        assert_eq!(vrrp.base_priority, 100);
        assert_eq!(vrrp.effective_priority, 100);
        assert_eq!(vrrp.advert_int, Ticks::from_secs(1));
        assert_eq!(vrrp.want_state, VRRPState::Backup);
        assert!(vrrp.preempt);
        assert!(vrrp.preempt_time.is_none());
        assert_eq!(vrrp.garp.repeat, 5);
        assert_eq!(vrrp.garp.delay, Ticks::from_secs(5));
        assert!(vrrp.family.is_none());
        assert!(!vrrp.is_unicast());
    }

    #[test]
    fn test_script_defaults() {
        let script = VRRPScript::new("chk_haproxy");
        assert_eq!(script.interval, Ticks::from_secs(1));
        assert_eq!(script.timeout, Ticks::from_secs(2));
        assert_eq!((script.rise, script.fall, script.weight), (1, 1, 0));
    }

    #[test]
    fn test_notify_any() {
        let mut notify = NotifyScripts::default();
        assert!(!notify.any());
        notify.stop = Some("/bin/true".into());
        assert!(notify.any());
    }
}
