//! VRRP configuration object model
//!
//! Turns keepalived-style configuration text into a validated
//! [`Configuration`]: VRRP instances, sync groups, health-check scripts and
//! static network objects, with every field defaulted and range-checked.
//!
//! # Features
//!
//! - Keyword tables per nesting level, dispatched over any [`BlockSource`]
//! - Per-field domains with explicit recovery (default, unset, keep, clamp)
//! - Address family unification per instance
//! - Virtual address overflow into the excluded list
//! - Collected [`Diagnostics`], also emitted through `tracing`
//!
//! Loading never fails on malformed content: bad lines are reported and
//! skipped, the rest of the file still loads.
//!
//! # Example
//!
//! ```
//! use vrrp_config::{ConfigBuilder, VRRPState};
//!
//! let text = r#"
//! vrrp_instance VI_1 {
//!     state MASTER
//!     virtual_router_id 51
//!     priority 150
//!     virtual_ipaddress {
//!         192.168.1.10/24 dev eth0
//!     }
//! }
//! "#;
//!
//! let build = ConfigBuilder::new().load_str(text);
//! let vrrp = build.config.instance("VI_1").unwrap();
//! assert_eq!(vrrp.want_state, VRRPState::Master);
//! assert_eq!(vrrp.vips.len(), 1);
//! assert!(build.diagnostics.is_empty());
//! ```

pub mod address;
pub mod bounded;
pub mod builder;
pub mod configuration;
pub mod diagnostics;
pub mod keywords;
pub mod model;
pub mod source;
pub mod types;
pub mod validate;

pub use address::{AddressError, IpAddress, IpPrefix, Route, Rule, Scope};
pub use bounded::{AuthSecret, BoundedString, IfName};
pub use builder::{
    AnyInterface, Build, Clock, ConfigBuilder, Directive, InterfaceResolver, MonotonicClock,
    SystemInterfaces,
};
pub use configuration::Configuration;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use model::{
    AuthType, Authentication, Garp, NotifyScripts, TrackedInterface, TrackedScript,
    VRRPInstance, VRRPScript, VRRPSyncGroup, Vmac,
};
pub use source::{BlockSource, Line, TextSource, TokenLine};
pub use types::{AddressFamily, ProtocolVersion, Ticks, VRRPState};

/// Load `text` with default collaborators and link sync groups.
pub fn parse_str(text: &str) -> Build {
    let mut build = ConfigBuilder::new().load_str(text);
    build.link_sync_groups();
    build
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_links_groups() {
        let build = parse_str(
            "vrrp_sync_group G {\n group {\n VI_1\n }\n}\nvrrp_instance VI_1 {\n state MASTER\n}\n",
        );

        assert_eq!(
            build.config.instance("VI_1").unwrap().sync_group.as_deref(),
            Some("G")
        );
        assert_eq!(build.config.sync_groups[0].state, VRRPState::Master);
    }

    #[test]
    fn test_empty_input() {
        let build = parse_str("");
        assert!(build.config.is_empty());
        assert!(build.diagnostics.is_empty());
    }
}
