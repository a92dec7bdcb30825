//! Rendering of a load result

use std::fmt::Write as _;

use clap::ValueEnum;
use serde::Serialize;
use vrrp_config::{Build, Configuration, Diagnostics, VRRPInstance};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Summary per entity followed by the diagnostics
    #[default]
    Text,
    /// The full object model and diagnostics as JSON
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    configuration: &'a Configuration,
    diagnostics: &'a Diagnostics,
}

pub fn render(build: &Build, format: ReportFormat) -> common::Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(build)),
        ReportFormat::Json => {
            let report = JsonReport {
                configuration: &build.config,
                diagnostics: &build.diagnostics,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
    }
}

fn describe_instance(vrrp: &VRRPInstance) -> String {
    let mut line = format!(
        "vrrp_instance {}: vrid {}, priority {}, state {}, advert {}",
        vrrp.name, vrrp.vrid, vrrp.base_priority, vrrp.want_state, vrrp.advert_int
    );

    if let Some(family) = vrrp.family {
        let _ = write!(line, ", {family}");
    }
    if let Some(version) = vrrp.version {
        let _ = write!(line, ", VRRPv{version}");
    }
    if let Some(ifname) = &vrrp.interface {
        let _ = write!(line, ", interface {ifname}");
    }
    let _ = write!(
        line,
        ", {} VIPs ({} excluded)",
        vrrp.vips.len(),
        vrrp.excluded_vips.len()
    );
    if vrrp.is_unicast() {
        let _ = write!(line, ", {} unicast peers", vrrp.unicast_peers.len());
    }
    if let Some(group) = &vrrp.sync_group {
        let _ = write!(line, ", sync group {group}");
    }
    line
}

fn render_text(build: &Build) -> String {
    let config = &build.config;
    let mut out = String::new();

    for vrrp in &config.instances {
        let _ = writeln!(out, "{}", describe_instance(vrrp));
    }

    for group in &config.sync_groups {
        let _ = writeln!(
            out,
            "vrrp_sync_group {}: {} ({})",
            group.name,
            group.members.join(", "),
            group.state
        );
    }

    for script in &config.scripts {
        let _ = writeln!(
            out,
            "vrrp_script {}: interval {}, timeout {}, weight {}, rise {}, fall {}",
            script.name, script.interval, script.timeout, script.weight, script.rise, script.fall
        );
    }

    let statics =
        config.static_addresses.len() + config.static_routes.len() + config.static_rules.len();
    if statics > 0 {
        let _ = writeln!(
            out,
            "static: {} addresses, {} routes, {} rules",
            config.static_addresses.len(),
            config.static_routes.len(),
            config.static_rules.len()
        );
    }

    let diagnostics = &build.diagnostics;
    let _ = writeln!(
        out,
        "{} diagnostics ({} errors)",
        diagnostics.len(),
        diagnostics.errors().count()
    );
    for diagnostic in diagnostics {
        let _ = writeln!(out, "  {diagnostic}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "\
vrrp_instance VI_1 {
    state MASTER
    virtual_router_id 51
    priority 300
    virtual_ipaddress {
        10.0.0.1
    }
}
";

    #[test]
    fn test_text_report() {
        let build = vrrp_config::parse_str(CONFIG);
        let text = render(&build, ReportFormat::Text).unwrap();

        assert!(text.starts_with("vrrp_instance VI_1: vrid 51, priority 100, state MASTER"));
        assert!(text.contains("IPv4"));
        assert!(text.contains("1 VIPs (0 excluded)"));
        assert!(text.contains("1 diagnostics (0 errors)"));
        assert!(text.contains("INFO (VI_1)"));
    }

    #[test]
    fn test_json_report() {
        let build = vrrp_config::parse_str(CONFIG);
        let json = render(&build, ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["configuration"]["instances"][0]["vrid"], 51);
        assert_eq!(value["configuration"]["instances"][0]["name"], "VI_1");
        assert_eq!(value["diagnostics"].as_array().unwrap().len(), 1);
        assert_eq!(value["diagnostics"][0]["entity"], "VI_1");
    }
}
