//! Keyword tables and the dispatcher that walks them.
//!
//! Each nesting level has its own table. A keyword either runs a handler,
//! descends into a sub-table for its block, or both (`vrrp_instance` creates
//! the instance, then its body is dispatched against [`INSTANCE`]).

use crate::builder::{ConfigBuilder, Directive};
use crate::source::{BlockSource, Line};

/// Signature shared by all keyword handlers. Field 0 is the keyword.
pub type Handler = fn(&mut ConfigBuilder, &[String], &mut dyn BlockSource) -> Directive;

/// What follows a keyword line
#[derive(Clone, Copy)]
pub enum Body {
    None,
    /// A value block the handler reads itself
    Raw,
    /// A block of nested keywords
    Keywords(&'static [Keyword]),
}

#[derive(Clone, Copy)]
pub struct Keyword {
    pub name: &'static str,
    pub handler: Option<Handler>,
    pub body: Body,
}

const fn kw(name: &'static str, handler: Handler) -> Keyword {
    Keyword {
        name,
        handler: Some(handler),
        body: Body::None,
    }
}

const fn raw(name: &'static str, handler: Handler) -> Keyword {
    Keyword {
        name,
        handler: Some(handler),
        body: Body::Raw,
    }
}

const fn block(name: &'static str, handler: Option<Handler>, body: &'static [Keyword]) -> Keyword {
    Keyword {
        name,
        handler,
        body: Body::Keywords(body),
    }
}

pub const ROOT: &[Keyword] = &[
    block("vrrp_sync_group", Some(ConfigBuilder::vrrp_sync_group), SYNC_GROUP),
    block("vrrp_instance", Some(ConfigBuilder::vrrp_instance), INSTANCE),
    block("vrrp_script", Some(ConfigBuilder::vrrp_script), SCRIPT),
    raw("static_ipaddress", ConfigBuilder::static_ipaddress),
    raw("static_routes", ConfigBuilder::static_routes),
    raw("static_rules", ConfigBuilder::static_rules),
];

pub const SYNC_GROUP: &[Keyword] = &[
    raw("group", ConfigBuilder::sync_group_members),
    kw("notify_backup", ConfigBuilder::group_notify_backup),
    kw("notify_master", ConfigBuilder::group_notify_master),
    kw("notify_fault", ConfigBuilder::group_notify_fault),
    kw("notify", ConfigBuilder::group_notify),
    kw("smtp_alert", ConfigBuilder::group_smtp_alert),
    kw("global_tracking", ConfigBuilder::global_tracking),
];

pub const INSTANCE: &[Keyword] = &[
    kw("use_vmac", ConfigBuilder::use_vmac),
    kw("vmac_xmit_base", ConfigBuilder::vmac_xmit_base),
    raw("unicast_peer", ConfigBuilder::unicast_peer),
    kw("native_ipv6", ConfigBuilder::native_ipv6),
    kw("state", ConfigBuilder::state),
    kw("interface", ConfigBuilder::interface),
    kw("dont_track_primary", ConfigBuilder::dont_track_primary),
    raw("track_interface", ConfigBuilder::track_interface),
    raw("track_script", ConfigBuilder::track_script),
    kw("mcast_src_ip", ConfigBuilder::source_address),
    kw("unicast_src_ip", ConfigBuilder::source_address),
    kw("virtual_router_id", ConfigBuilder::virtual_router_id),
    kw("version", ConfigBuilder::version),
    kw("priority", ConfigBuilder::priority),
    kw("advert_int", ConfigBuilder::advert_int),
    raw("virtual_ipaddress", ConfigBuilder::virtual_ipaddress),
    raw("virtual_ipaddress_excluded", ConfigBuilder::virtual_ipaddress_excluded),
    raw("virtual_routes", ConfigBuilder::virtual_routes),
    raw("virtual_rules", ConfigBuilder::virtual_rules),
    kw("accept", ConfigBuilder::accept),
    kw("preempt", ConfigBuilder::preempt),
    kw("nopreempt", ConfigBuilder::nopreempt),
    kw("preempt_delay", ConfigBuilder::preempt_delay),
    kw("debug", ConfigBuilder::debug),
    kw("notify_backup", ConfigBuilder::notify_backup),
    kw("notify_master", ConfigBuilder::notify_master),
    kw("notify_fault", ConfigBuilder::notify_fault),
    kw("notify_stop", ConfigBuilder::notify_stop),
    kw("notify", ConfigBuilder::notify),
    kw("smtp_alert", ConfigBuilder::smtp_alert),
    kw("lvs_sync_daemon_interface", ConfigBuilder::lvs_sync_daemon_interface),
    kw("garp_master_delay", ConfigBuilder::garp_master_delay),
    kw("garp_master_refresh", ConfigBuilder::garp_master_refresh),
    kw("garp_master_repeat", ConfigBuilder::garp_master_repeat),
    kw("garp_master_refresh_repeat", ConfigBuilder::garp_master_refresh_repeat),
    block("authentication", None, AUTHENTICATION),
];

pub const AUTHENTICATION: &[Keyword] = &[
    kw("auth_type", ConfigBuilder::auth_type),
    kw("auth_pass", ConfigBuilder::auth_pass),
];

pub const SCRIPT: &[Keyword] = &[
    kw("script", ConfigBuilder::script_command),
    kw("interval", ConfigBuilder::script_interval),
    kw("timeout", ConfigBuilder::script_timeout),
    kw("weight", ConfigBuilder::script_weight),
    kw("rise", ConfigBuilder::script_rise),
    kw("fall", ConfigBuilder::script_fall),
];

fn lookup(table: &'static [Keyword], name: &str) -> Option<&'static Keyword> {
    table.iter().find(|k| k.name == name)
}

/// Feed every line of `source` through the keyword tables.
pub(crate) fn dispatch(builder: &mut ConfigBuilder, source: &mut dyn BlockSource) {
    process_level(builder, source, ROOT, 0);
}

fn process_level(
    builder: &mut ConfigBuilder,
    source: &mut dyn BlockSource,
    table: &'static [Keyword],
    depth: usize,
) {
    loop {
        let line = match source.next_line_tokens() {
            Line::Tokens(line) => line,
            Line::EndOfBlock if depth == 0 => {
                builder.diagnostics_mut().info(None, "unmatched '}' - ignoring");
                continue;
            }
            Line::EndOfBlock => return,
            Line::EndOfFile => {
                if depth > 0 {
                    builder
                        .diagnostics_mut()
                        .error(None, "unexpected end of configuration, missing '}'");
                }
                return;
            }
        };

        let Some(name) = line.fields.first().map(String::as_str) else {
            continue;
        };
        let Some(keyword) = lookup(table, name) else {
            builder
                .diagnostics_mut()
                .info(None, format!("Unknown keyword '{name}'"));
            source.skip_to_block_end();
            continue;
        };

        let directive = match keyword.handler {
            Some(handler) => handler(builder, &line.fields, source),
            None => Directive::Continue,
        };

        match (directive, keyword.body) {
            (Directive::SkipBlock, _) => {
                source.skip_to_block_end();
            }
            (Directive::Continue, Body::Keywords(sub)) => {
                process_level(builder, source, sub, depth + 1)
            }
            (Directive::Continue, Body::None) => {
                if source.skip_to_block_end() {
                    builder
                        .diagnostics_mut()
                        .info(None, format!("{name} does not take a block - skipping it"));
                }
            }
            (Directive::Continue, Body::Raw) => {}
        }

        if depth == 0 {
            builder.leave_root_block();
        }
    }
}
