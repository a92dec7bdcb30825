//! `vrrp_sync_group` keywords.

use tracing::debug;

use super::{ConfigBuilder, Directive, block_name, joined_value};
use crate::model::VRRPSyncGroup;
use crate::source::BlockSource;

impl ConfigBuilder {
    pub(crate) fn vrrp_sync_group(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.context = Default::default();

        let Some(name) = block_name(fields) else {
            self.diagnostics.info(None, "vrrp_sync_group must have a name - skipping");
            return Directive::SkipBlock;
        };

        if self.config.sync_group(name).is_some() {
            self.diagnostics.info(
                Some(name),
                format!("vrrp sync group {name} already defined - skipping"),
            );
            return Directive::SkipBlock;
        }

        let pos = self.config.push_sync_group(VRRPSyncGroup::new(name));
        self.context.sync_group = Some(pos);
        debug!(sync_group = %name, "New vrrp sync group");
        Directive::Continue
    }

    /// Member names, any number per line
    pub(crate) fn sync_group_members(
        &mut self,
        fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.sync_group_in_scope(fields) else {
            return Directive::SkipBlock;
        };

        for name in self.read_value_block(source).into_iter().flatten() {
            let group = &mut self.config.sync_groups[pos];
            if group.members.contains(&name) {
                self.diagnostics.info(
                    Some(&group.name),
                    format!("virtual router {name} listed twice in sync group - ignoring"),
                );
                continue;
            }
            group.members.push(name);
        }
        Directive::Continue
    }

    fn set_group_notify(
        &mut self,
        fields: &[String],
        slot: fn(&mut VRRPSyncGroup) -> &mut Option<String>,
    ) -> Directive {
        let Some(pos) = self.sync_group_in_scope(fields) else {
            return Directive::Continue;
        };
        let group = &mut self.config.sync_groups[pos];

        match joined_value(fields) {
            Some(command) => {
                *slot(group) = Some(command);
                group.notify_exec = true;
            }
            None => self.diagnostics.info(
                Some(&group.name),
                format!("{} requires a command - ignoring", fields[0]),
            ),
        }
        Directive::Continue
    }

    pub(crate) fn group_notify_backup(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.set_group_notify(fields, |g| &mut g.notify.backup)
    }

    pub(crate) fn group_notify_master(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.set_group_notify(fields, |g| &mut g.notify.master)
    }

    pub(crate) fn group_notify_fault(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.set_group_notify(fields, |g| &mut g.notify.fault)
    }

    pub(crate) fn group_notify(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.set_group_notify(fields, |g| &mut g.notify.generic)
    }

    pub(crate) fn group_smtp_alert(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.sync_group_in_scope(fields) {
            self.config.sync_groups[pos].smtp_alert = true;
        }
        Directive::Continue
    }

    pub(crate) fn global_tracking(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.sync_group_in_scope(fields) {
            self.config.sync_groups[pos].global_tracking = true;
        }
        Directive::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_are_flattened_in_order() {
        let build = ConfigBuilder::new().load_str(
            "vrrp_sync_group G1 {\n group {\n VI_1 VI_2\n VI_3\n VI_1\n }\n notify_master \"/bin/up g1\"\n global_tracking\n}\n",
        );

        let group = build.config.sync_group("G1").unwrap();
        assert_eq!(group.members, vec!["VI_1", "VI_2", "VI_3"]);
        assert_eq!(group.notify.master.as_deref(), Some("/bin/up g1"));
        assert!(group.notify_exec);
        assert!(group.global_tracking);
        assert_eq!(build.diagnostics.for_entity("G1").count(), 1);
    }

    #[test]
    fn test_duplicate_group_is_skipped_whole() {
        let build = ConfigBuilder::new().load_str(
            "vrrp_sync_group G1 {\n group {\n VI_1\n }\n}\nvrrp_sync_group G1 {\n group {\n VI_2\n }\n smtp_alert\n}\n",
        );

        assert_eq!(build.config.sync_groups.len(), 1);
        let group = &build.config.sync_groups[0];
        assert_eq!(group.members, vec!["VI_1"]);
        assert!(!group.smtp_alert);
    }
}
