//! `vrrp_instance` keywords.

use std::net::IpAddr;

use tracing::debug;

use super::{ConfigBuilder, Directive, arg, block_name, joined_value};
use crate::address::{IpAddress, Route, Rule};
use crate::bounded::{AuthSecret, IfName};
use crate::model::{AuthType, TrackedInterface, TrackedScript, VRRPInstance};
use crate::source::BlockSource;
use crate::types::{
    AddressFamily, DEFAULT_ADVERT_INTERVAL, ProtocolVersion, Ticks, VRRP_AUTH_LEN,
    VRRP_GARP_DELAY, VRRP_GARP_REFRESH_REP, VRRP_GARP_REP, VRRP_PRIO_DFL, VRRPState,
};
use crate::validate;

/// Fix the instance family on first use. False when `family` conflicts.
fn unify_family(vrrp: &mut VRRPInstance, family: AddressFamily) -> bool {
    match vrrp.family {
        None => {
            vrrp.family = Some(family);
            true
        }
        Some(fixed) => fixed == family,
    }
}

/// Parse `weight N` following a tracked object's name
fn track_weight(fields: &[String]) -> Option<(i64, Option<validate::FieldError>)> {
    match fields.get(1).map(String::as_str) {
        Some("weight") => Some(validate::TRACK_WEIGHT.apply(
            fields.get(2).map(String::as_str),
            0,
            0,
        )),
        _ => None,
    }
}

impl ConfigBuilder {
    pub(crate) fn vrrp_instance(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.context = Default::default();

        let Some(name) = block_name(fields) else {
            self.diagnostics.info(None, "vrrp_instance must have a name - skipping");
            return Directive::SkipBlock;
        };

        if self.config.instance(name).is_some() {
            self.diagnostics.info(
                Some(name),
                format!("vrrp instance {name} already defined - skipping"),
            );
            return Directive::SkipBlock;
        }

        let pos = self.config.push_instance(VRRPInstance::new(name));
        self.context.instance = Some(pos);
        debug!(instance = %name, "New vrrp instance");
        Directive::Continue
    }

    pub(crate) fn use_vmac(&mut self, fields: &[String], _source: &mut dyn BlockSource) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];
        vrrp.vmac.enabled = true;

        if let Some(raw) = arg(fields) {
            let (ifname, truncated) = IfName::truncating(raw);
            if truncated {
                self.diagnostics.info(
                    Some(&vrrp.name),
                    format!("vmac interface name {raw} truncated to {ifname}"),
                );
            }
            vrrp.vmac.ifname = Some(ifname);
        }
        Directive::Continue
    }

    pub(crate) fn vmac_xmit_base(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.instance_in_scope(fields) {
            self.config.instances[pos].vmac.xmit_base = true;
        }
        Directive::Continue
    }

    pub(crate) fn unicast_peer(
        &mut self,
        fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::SkipBlock;
        };

        for line in self.read_value_block(source) {
            let vrrp = &mut self.config.instances[pos];
            let peer: IpAddr = match line[0].parse() {
                Ok(peer) => peer,
                Err(_) => {
                    self.diagnostics.error(
                        Some(&vrrp.name),
                        format!("malformed unicast peer address [{}] - skipping", line[0]),
                    );
                    continue;
                }
            };

            if !unify_family(vrrp, AddressFamily::of(&peer)) {
                self.diagnostics.info(
                    Some(&vrrp.name),
                    format!("unicast peer {peer} does not match the instance address family - ignoring"),
                );
                continue;
            }
            vrrp.unicast_peers.push(peer);
        }
        Directive::Continue
    }

    pub(crate) fn native_ipv6(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        if vrrp.family == Some(AddressFamily::V4) {
            self.diagnostics
                .info(Some(&vrrp.name), "Cannot specify native_ipv6 with IPv4 addresses");
        } else if vrrp.version == Some(ProtocolVersion::V2) {
            // keepalived would force version 3 here; an explicit version wins
            self.diagnostics
                .info(Some(&vrrp.name), "Cannot specify native_ipv6 with VRRP version 2");
        } else {
            vrrp.family = Some(AddressFamily::V6);
            vrrp.version = Some(ProtocolVersion::V3);
        }
        Directive::Continue
    }

    pub(crate) fn state(&mut self, fields: &[String], _source: &mut dyn BlockSource) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        match arg(fields).and_then(VRRPState::from_keyword) {
            Some(state) => {
                vrrp.want_state = state;
                vrrp.init_state = state;
            }
            None => self.diagnostics.info(
                Some(&vrrp.name),
                format!(
                    "unknown state '{}', expected MASTER or BACKUP - ignoring",
                    arg(fields).unwrap_or_default()
                ),
            ),
        }
        Directive::Continue
    }

    pub(crate) fn interface(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let Some(raw) = arg(fields) else {
            self.diagnostics.info(Some(&vrrp.name), "interface requires a name");
            return Directive::Continue;
        };

        let (ifname, truncated) = IfName::truncating(raw);
        if truncated {
            self.diagnostics.info(
                Some(&vrrp.name),
                format!("interface name {raw} truncated to {ifname}"),
            );
        }

        if !self.interfaces.exists(&ifname) {
            self.diagnostics.info(
                Some(&vrrp.name),
                format!("Cant find interface {ifname} for vrrp_instance {} !!!", vrrp.name),
            );
            return Directive::Continue;
        }
        vrrp.interface = Some(ifname);
        Directive::Continue
    }

    pub(crate) fn dont_track_primary(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.instance_in_scope(fields) {
            self.config.instances[pos].dont_track_primary = true;
        }
        Directive::Continue
    }

    pub(crate) fn track_interface(
        &mut self,
        fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::SkipBlock;
        };

        for line in self.read_value_block(source) {
            let vrrp = &mut self.config.instances[pos];
            let (name, truncated) = IfName::truncating(&line[0]);
            if truncated {
                self.diagnostics.info(
                    Some(&vrrp.name),
                    format!("tracked interface name {} truncated to {name}", line[0]),
                );
            }

            if !self.interfaces.exists(&name) {
                self.diagnostics.info(
                    Some(&vrrp.name),
                    format!("Cant find tracked interface {name} - skipping"),
                );
                continue;
            }

            let weight = match track_weight(&line) {
                None => 0,
                Some((w, err)) => {
                    if let Some(err) = err {
                        self.diagnostics.info(
                            Some(&vrrp.name),
                            format!("track_interface {name}: {err}, using {w}"),
                        );
                    }
                    w as i32
                }
            };
            vrrp.track_interfaces.push(TrackedInterface { name, weight });
        }
        Directive::Continue
    }

    pub(crate) fn track_script(
        &mut self,
        fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::SkipBlock;
        };

        for line in self.read_value_block(source) {
            let vrrp = &mut self.config.instances[pos];
            let weight = track_weight(&line).map(|(w, err)| {
                if let Some(err) = err {
                    self.diagnostics.info(
                        Some(&vrrp.name),
                        format!("track_script {}: {err}, using {w}", line[0]),
                    );
                }
                w as i32
            });
            vrrp.track_scripts.push(TrackedScript {
                name: line[0].clone(),
                weight,
            });
        }
        Directive::Continue
    }

    /// `mcast_src_ip` and `unicast_src_ip`
    pub(crate) fn source_address(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];
        let raw = arg(fields).unwrap_or_default();

        let addr: IpAddr = match raw.parse() {
            Ok(addr) => addr,
            Err(_) => {
                self.diagnostics.error(
                    Some(&vrrp.name),
                    format!(
                        "Configuration error: VRRP instance[{}] malformed unicast src address[{raw}]. Skipping...",
                        vrrp.name
                    ),
                );
                return Directive::Continue;
            }
        };

        if unify_family(vrrp, AddressFamily::of(&addr)) {
            vrrp.source_address = Some(addr);
        } else {
            vrrp.source_address = None;
            self.diagnostics.error(
                Some(&vrrp.name),
                format!(
                    "Configuration error: VRRP instance[{}] and unicast src address[{raw}] MUST be of the same family !!! Skipping...",
                    vrrp.name
                ),
            );
        }
        Directive::Continue
    }

    pub(crate) fn virtual_router_id(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };

        let vrrp = &mut self.config.instances[pos];
        let (vrid, err) = validate::ROUTER_ID.apply(arg(fields), vrrp.vrid.into(), 0);
        vrrp.vrid = vrid as u8;
        if let Some(err) = err {
            self.diagnostics
                .info(Some(&vrrp.name), format!("VRRP Error : {err}. reconfigure !"));
        }

        // 0 is unset
        if vrid == 0 {
            self.config.unindex_vrid(pos);
        } else {
            self.config.index_vrid(pos);
        }
        Directive::Continue
    }

    pub(crate) fn version(&mut self, fields: &[String], _source: &mut dyn BlockSource) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let current = vrrp.version.map_or(0, |v| i64::from(v.number()));
        let (n, err) = validate::VERSION.apply(arg(fields), current, current);
        if let Some(err) = err {
            self.diagnostics
                .info(Some(&vrrp.name), format!("VRRP Error : {err}. reconfigure !"));
        }
        let Some(version) = ProtocolVersion::from_number(n) else {
            return Directive::Continue;
        };

        let conflicts = vrrp.version.is_some_and(|current| current != version)
            || (version == ProtocolVersion::V2 && vrrp.family == Some(AddressFamily::V6));
        if conflicts {
            self.diagnostics.info(
                Some(&vrrp.name),
                "vrrp_version conflicts with configured or deduced version; ignoring.",
            );
            return Directive::Continue;
        }

        vrrp.version = Some(version);
        Directive::Continue
    }

    pub(crate) fn priority(&mut self, fields: &[String], _source: &mut dyn BlockSource) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let (priority, err) = validate::PRIORITY.apply(
            arg(fields),
            vrrp.base_priority.into(),
            VRRP_PRIO_DFL.into(),
        );
        if let Some(err) = err {
            self.diagnostics.info(
                Some(&vrrp.name),
                format!("VRRP Error : {err}. Using value : {priority}"),
            );
        }
        let priority = priority as u8;
        vrrp.base_priority = priority;
        vrrp.effective_priority = priority;
        Directive::Continue
    }

    pub(crate) fn advert_int(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        vrrp.advert_int = match validate::advert_interval(arg(fields), vrrp.version) {
            Ok(ticks) => ticks,
            Err(err) => {
                self.diagnostics.info(
                    Some(&vrrp.name),
                    format!("Advert interval not valid: {err}. Using default value : 1sec"),
                );
                Ticks::from_centis(DEFAULT_ADVERT_INTERVAL)
            }
        };
        Directive::Continue
    }

    /// The virtual address block. Addresses beyond the capacity overflow
    /// into the excluded list; entries of the wrong family are dropped.
    pub(crate) fn virtual_ipaddress(
        &mut self,
        fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::SkipBlock;
        };
        let max_vips = self.max_vips;

        for line in self.read_value_block(source) {
            let vrrp = &mut self.config.instances[pos];
            let entry = match IpAddress::parse(&line) {
                Ok(entry) => entry,
                Err(err) => {
                    self.diagnostics.info(
                        Some(&vrrp.name),
                        format!("invalid virtual address [{}]: {err} - skipping", line.join(" ")),
                    );
                    continue;
                }
            };

            if !unify_family(vrrp, entry.family()) {
                self.diagnostics.info(
                    Some(&vrrp.name),
                    format!(
                        "address family must match VRRP instance [{}] - ignoring",
                        line.join(" ")
                    ),
                );
                continue;
            }

            if vrrp.vips.len() < max_vips {
                vrrp.vips.push(entry);
            } else {
                self.diagnostics.info(
                    Some(&vrrp.name),
                    format!(
                        "more than {max_vips} VIPs: extra added to the excluded vip block [{}]",
                        entry
                    ),
                );
                vrrp.excluded_vips.push(entry);
            }
        }
        Directive::Continue
    }

    pub(crate) fn virtual_ipaddress_excluded(
        &mut self,
        fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::SkipBlock;
        };

        for line in self.read_value_block(source) {
            let vrrp = &mut self.config.instances[pos];
            match IpAddress::parse(&line) {
                Ok(entry) if unify_family(vrrp, entry.family()) => vrrp.excluded_vips.push(entry),
                Ok(_) => self.diagnostics.info(
                    Some(&vrrp.name),
                    format!(
                        "address family must match VRRP instance [{}] - ignoring",
                        line.join(" ")
                    ),
                ),
                Err(err) => self.diagnostics.info(
                    Some(&vrrp.name),
                    format!("invalid excluded address [{}]: {err} - skipping", line.join(" ")),
                ),
            }
        }
        Directive::Continue
    }

    pub(crate) fn virtual_routes(
        &mut self,
        fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::SkipBlock;
        };

        for line in self.read_value_block(source) {
            let vrrp = &mut self.config.instances[pos];
            match Route::parse(&line) {
                Ok(route) => vrrp.virtual_routes.push(route),
                Err(err) => self.diagnostics.info(
                    Some(&vrrp.name),
                    format!("invalid virtual route [{}]: {err} - skipping", line.join(" ")),
                ),
            }
        }
        Directive::Continue
    }

    pub(crate) fn virtual_rules(
        &mut self,
        fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::SkipBlock;
        };

        for line in self.read_value_block(source) {
            let vrrp = &mut self.config.instances[pos];
            match Rule::parse(&line) {
                Ok(rule) => vrrp.virtual_rules.push(rule),
                Err(err) => self.diagnostics.info(
                    Some(&vrrp.name),
                    format!("invalid virtual rule [{}]: {err} - skipping", line.join(" ")),
                ),
            }
        }
        Directive::Continue
    }

    pub(crate) fn accept(&mut self, fields: &[String], _source: &mut dyn BlockSource) -> Directive {
        if let Some(pos) = self.instance_in_scope(fields) {
            self.config.instances[pos].accept = true;
        }
        Directive::Continue
    }

    pub(crate) fn preempt(&mut self, fields: &[String], _source: &mut dyn BlockSource) -> Directive {
        if let Some(pos) = self.instance_in_scope(fields) {
            self.config.instances[pos].preempt = true;
        }
        Directive::Continue
    }

    pub(crate) fn nopreempt(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.instance_in_scope(fields) {
            self.config.instances[pos].preempt = false;
        }
        Directive::Continue
    }

    pub(crate) fn preempt_delay(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let (secs, err) =
            validate::PREEMPT_DELAY.apply(arg(fields), vrrp.preempt_delay.as_secs() as i64, 0);
        vrrp.preempt_delay = Ticks::from_secs(secs as u64);

        // No timestamp unless the delay was accepted as written
        match err {
            None => {
                vrrp.preempt_time = Some(self.clock.now() + vrrp.preempt_delay.as_duration());
            }
            Some(err) => {
                vrrp.preempt_time = None;
                self.diagnostics
                    .info(Some(&vrrp.name), format!("VRRP Error : {err}"));
            }
        }
        Directive::Continue
    }

    pub(crate) fn debug(&mut self, fields: &[String], _source: &mut dyn BlockSource) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let (level, err) = validate::DEBUG_LEVEL.apply(arg(fields), vrrp.debug.into(), 0);
        if let Some(err) = err {
            self.diagnostics
                .info(Some(&vrrp.name), format!("VRRP Error : {err}, using {level}"));
        }
        vrrp.debug = level as u8;
        Directive::Continue
    }

    /// Shared body of the `notify*` keywords
    fn set_notify(
        &mut self,
        fields: &[String],
        slot: fn(&mut VRRPInstance) -> &mut Option<String>,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        match joined_value(fields) {
            Some(command) => {
                *slot(vrrp) = Some(command);
                vrrp.notify_exec = true;
            }
            None => self.diagnostics.info(
                Some(&vrrp.name),
                format!("{} requires a command - ignoring", fields[0]),
            ),
        }
        Directive::Continue
    }

    pub(crate) fn notify_backup(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.set_notify(fields, |v| &mut v.notify.backup)
    }

    pub(crate) fn notify_master(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.set_notify(fields, |v| &mut v.notify.master)
    }

    pub(crate) fn notify_fault(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.set_notify(fields, |v| &mut v.notify.fault)
    }

    pub(crate) fn notify_stop(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.set_notify(fields, |v| &mut v.notify.stop)
    }

    pub(crate) fn notify(&mut self, fields: &[String], _source: &mut dyn BlockSource) -> Directive {
        self.set_notify(fields, |v| &mut v.notify.generic)
    }

    pub(crate) fn smtp_alert(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.instance_in_scope(fields) {
            self.config.instances[pos].smtp_alert = true;
        }
        Directive::Continue
    }

    pub(crate) fn lvs_sync_daemon_interface(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        self.config.instances[pos].lvs_sync_daemon_interface = joined_value(fields);
        Directive::Continue
    }

    pub(crate) fn garp_master_delay(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let (secs, err) = validate::GARP_DELAY.apply(
            arg(fields),
            vrrp.garp.delay.as_secs() as i64,
            VRRP_GARP_DELAY as i64,
        );
        if let Some(err) = err {
            self.diagnostics
                .info(Some(&vrrp.name), format!("{err}, using {secs}"));
        }
        vrrp.garp.delay = Ticks::from_secs(secs as u64);
        Directive::Continue
    }

    pub(crate) fn garp_master_refresh(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let (secs, err) =
            validate::GARP_REFRESH.apply(arg(fields), vrrp.garp.refresh_secs as i64, 0);
        if let Some(err) = err {
            self.diagnostics
                .info(Some(&vrrp.name), format!("{err}, using {secs}"));
        }
        vrrp.garp.refresh_secs = secs as u64;
        Directive::Continue
    }

    pub(crate) fn garp_master_repeat(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let (count, err) = validate::GARP_REPEAT.apply(
            arg(fields),
            vrrp.garp.repeat.into(),
            VRRP_GARP_REP.into(),
        );
        if let Some(err) = err {
            self.diagnostics
                .info(Some(&vrrp.name), format!("{err}, using {count}"));
        }
        vrrp.garp.repeat = count as u32;
        Directive::Continue
    }

    pub(crate) fn garp_master_refresh_repeat(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let (count, err) = validate::GARP_REFRESH_REPEAT.apply(
            arg(fields),
            vrrp.garp.refresh_repeat.into(),
            VRRP_GARP_REFRESH_REP.into(),
        );
        if let Some(err) = err {
            self.diagnostics
                .info(Some(&vrrp.name), format!("{err}, using {count}"));
        }
        vrrp.garp.refresh_repeat = count as u32;
        Directive::Continue
    }

    pub(crate) fn auth_type(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        match arg(fields) {
            Some("AH") => vrrp.auth.auth_type = AuthType::Ah,
            Some("PASS") => vrrp.auth.auth_type = AuthType::Password,
            other => self.diagnostics.info(
                Some(&vrrp.name),
                format!(
                    "unknown auth_type '{}', expected PASS or AH - ignoring",
                    other.unwrap_or_default()
                ),
            ),
        }
        Directive::Continue
    }

    pub(crate) fn auth_pass(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.instance_in_scope(fields) else {
            return Directive::Continue;
        };
        let vrrp = &mut self.config.instances[pos];

        let (secret, truncated) = AuthSecret::truncating(arg(fields).unwrap_or_default());
        if truncated {
            self.diagnostics.info(
                Some(&vrrp.name),
                format!("Truncating auth_pass to {VRRP_AUTH_LEN} characters"),
            );
        }
        vrrp.auth.secret = secret;
        Directive::Continue
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::super::{Clock, MockInterfaceResolver};
    use super::*;

    struct FixedClock(Instant);

    impl Clock for FixedClock {
        fn now(&self) -> Instant {
            self.0
        }
    }

    fn load(text: &str) -> super::super::Build {
        ConfigBuilder::new().load_str(text)
    }

    #[test]
    fn test_preempt_delay_is_scheduled_from_now() {
        let now = Instant::now();
        let build = ConfigBuilder::new()
            .with_clock(FixedClock(now))
            .load_str("vrrp_instance VI_1 {\n preempt_delay 10\n}\n");

        let vrrp = build.config.instance("VI_1").unwrap();
        assert_eq!(vrrp.preempt_delay, Ticks::from_secs(10));
        assert_eq!(vrrp.preempt_time, Some(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_interface_lookup_uses_resolver() {
        let mut resolver = MockInterfaceResolver::new();
        resolver.expect_exists().returning(|name| name == "eth0");

        let build = ConfigBuilder::new().with_interfaces(resolver).load_str(
            "vrrp_instance A {\n interface eth0\n}\nvrrp_instance B {\n interface eth9\n}\n",
        );

        assert_eq!(
            build.config.instance("A").unwrap().interface.as_deref(),
            Some("eth0")
        );
        assert!(build.config.instance("B").unwrap().interface.is_none());
        assert_eq!(build.diagnostics.for_entity("B").count(), 1);
    }

    #[test]
    fn test_track_interface_skips_unknown() {
        let mut resolver = MockInterfaceResolver::new();
        resolver
            .expect_exists()
            .returning(|name| name.starts_with("eth"));

        let build = ConfigBuilder::new().with_interfaces(resolver).load_str(
            "vrrp_instance A {\n track_interface {\n eth0 weight 10\n bond0\n eth1 weight 999\n }\n}\n",
        );

        let tracked = &build.config.instance("A").unwrap().track_interfaces;
        assert_eq!(tracked.len(), 2);
        assert_eq!(tracked[0].name, "eth0");
        assert_eq!(tracked[0].weight, 10);
        assert_eq!(tracked[1].weight, 0);
        assert_eq!(build.diagnostics.for_entity("A").count(), 2);
    }

    #[test]
    fn test_advert_int_depends_on_version() {
        let build = load(
            "vrrp_instance A {\n version 2\n advert_int 0.5\n}\nvrrp_instance B {\n version 3\n advert_int 0.5\n}\n",
        );
        assert_eq!(build.config.instance("A").unwrap().advert_int, Ticks::from_secs(1));
        assert_eq!(build.config.instance("B").unwrap().advert_int, Ticks::from_centis(50));
    }

    #[test]
    fn test_native_ipv6_rejected_after_ipv4() {
        let build = load("vrrp_instance A {\n mcast_src_ip 10.0.0.1\n native_ipv6\n}\n");
        let vrrp = build.config.instance("A").unwrap();
        assert_eq!(vrrp.family, Some(AddressFamily::V4));
        assert_eq!(vrrp.version, None);
    }

    #[test]
    fn test_source_address_family_mismatch_clears_it() {
        let build = load("vrrp_instance A {\n native_ipv6\n unicast_src_ip 10.0.0.1\n}\n");
        let vrrp = build.config.instance("A").unwrap();
        assert_eq!(vrrp.family, Some(AddressFamily::V6));
        assert!(vrrp.source_address.is_none());
        assert_eq!(build.diagnostics.errors().count(), 1);
    }

    #[test]
    fn test_auth_pass_truncation_warns() {
        let build = load(
            "vrrp_instance A {\n authentication {\n auth_type PASS\n auth_pass 0123456789\n }\n}\n",
        );
        let vrrp = build.config.instance("A").unwrap();
        assert_eq!(vrrp.auth.auth_type, AuthType::Password);
        assert_eq!(vrrp.auth.secret, "01234567");
        assert_eq!(build.diagnostics.for_entity("A").count(), 1);
    }

    #[test]
    fn test_notify_commands_are_joined() {
        let build = load(
            "vrrp_instance A {\n notify_master /etc/notify.sh master now\n notify_stop \"/bin/stop it\"\n}\n",
        );
        let vrrp = build.config.instance("A").unwrap();
        assert_eq!(vrrp.notify.master.as_deref(), Some("/etc/notify.sh master now"));
        assert_eq!(vrrp.notify.stop.as_deref(), Some("/bin/stop it"));
        assert!(vrrp.notify_exec);
    }

    #[test]
    fn test_garp_settings_are_clamped() {
        let build = load(
            "vrrp_instance A {\n garp_master_delay 0\n garp_master_repeat -3\n garp_master_refresh_repeat 0\n garp_master_refresh -1\n}\n",
        );
        let garp = &build.config.instance("A").unwrap().garp;
        assert_eq!(garp.delay, Ticks::from_secs(1));
        assert_eq!(garp.repeat, 1);
        assert_eq!(garp.refresh_repeat, 1);
        assert_eq!(garp.refresh_secs, 0);
        assert_eq!(build.diagnostics.for_entity("A").count(), 4);
    }
}
