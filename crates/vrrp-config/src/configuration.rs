//! The configuration aggregate produced by one load.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::address::{IpAddress, Route, Rule};
use crate::diagnostics::Diagnostics;
use crate::model::{VRRPInstance, VRRPScript, VRRPSyncGroup};
use crate::types::VRRPState;

/// Everything one configuration load produced.
///
/// Entities are only ever appended while loading; positions returned by the
/// `push_*` methods stay valid for the lifetime of the aggregate.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Configuration {
    pub instances: Vec<VRRPInstance>,
    pub sync_groups: Vec<VRRPSyncGroup>,
    pub scripts: Vec<VRRPScript>,
    pub static_addresses: Vec<IpAddress>,
    pub static_routes: Vec<Route>,
    pub static_rules: Vec<Rule>,

    /// Instance positions by router id
    #[serde(skip)]
    vrid_index: BTreeMap<u8, Vec<usize>>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// A load that yields no instance is valid, just useless.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn push_instance(&mut self, instance: VRRPInstance) -> usize {
        self.instances.push(instance);
        self.instances.len() - 1
    }

    pub fn push_sync_group(&mut self, group: VRRPSyncGroup) -> usize {
        self.sync_groups.push(group);
        self.sync_groups.len() - 1
    }

    pub fn push_script(&mut self, script: VRRPScript) -> usize {
        self.scripts.push(script);
        self.scripts.len() - 1
    }

    pub fn instance(&self, name: &str) -> Option<&VRRPInstance> {
        self.instances.iter().find(|i| i.name == name)
    }

    pub fn sync_group(&self, name: &str) -> Option<&VRRPSyncGroup> {
        self.sync_groups.iter().find(|g| g.name == name)
    }

    pub fn script(&self, name: &str) -> Option<&VRRPScript> {
        self.scripts.iter().find(|s| s.name == name)
    }

    /// Most recently appended instance
    pub fn last_instance(&self) -> Option<&VRRPInstance> {
        self.instances.last()
    }

    pub fn last_sync_group(&self) -> Option<&VRRPSyncGroup> {
        self.sync_groups.last()
    }

    pub fn last_script(&self) -> Option<&VRRPScript> {
        self.scripts.last()
    }

    /// Instances registered under `vrid`
    pub fn instances_by_vrid(&self, vrid: u8) -> impl Iterator<Item = &VRRPInstance> {
        self.vrid_index
            .get(&vrid)
            .into_iter()
            .flatten()
            .filter_map(|&pos| self.instances.get(pos))
    }

    /// Register the instance at `pos` under its current router id.
    pub(crate) fn index_vrid(&mut self, pos: usize) {
        self.unindex_vrid(pos);
        let Some(vrid) = self.instances.get(pos).map(|i| i.vrid) else {
            return;
        };
        if vrid != 0 {
            self.vrid_index.entry(vrid).or_default().push(pos);
        }
    }

    /// Remove the instance at `pos` from the router id index.
    pub(crate) fn unindex_vrid(&mut self, pos: usize) {
        self.vrid_index.retain(|_, positions| {
            positions.retain(|&p| p != pos);
            !positions.is_empty()
        });
    }

    /// Resolve sync-group member names to instances.
    ///
    /// Runs once after loading. Unknown members and instances already owned
    /// by another group are reported and left out. A group wants MASTER as
    /// soon as one linked member does.
    pub fn link_sync_groups(&mut self, diagnostics: &mut Diagnostics) {
        for group in &mut self.sync_groups {
            let mut linked_master = false;

            for member in &group.members {
                let Some(vrrp) = self.instances.iter_mut().find(|i| &i.name == member) else {
                    diagnostics.info(
                        Some(&group.name),
                        format!(
                            "virtual router {member} configured in sync group {} does not exist",
                            group.name
                        ),
                    );
                    continue;
                };

                match &vrrp.sync_group {
                    Some(owner) if owner != &group.name => {
                        diagnostics.info(
                            Some(&group.name),
                            format!(
                                "virtual router {member} already belongs to sync group {owner}, skipping"
                            ),
                        );
                        continue;
                    }
                    _ => {}
                }

                vrrp.sync_group = Some(group.name.clone());
                linked_master |= vrrp.want_state == VRRPState::Master;
            }

            if linked_master {
                group.state = VRRPState::Master;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_instances(names: &[&str]) -> Configuration {
        let mut config = Configuration::new();
        for name in names {
            config.push_instance(VRRPInstance::new(*name));
        }
        config
    }

    #[test]
    fn test_push_and_find() {
        let mut config = with_instances(&["VI_1", "VI_2"]);
        assert_eq!(config.push_script(VRRPScript::new("chk")), 0);
        assert_eq!(config.instance("VI_2").map(|i| i.name.as_str()), Some("VI_2"));
        assert!(config.instance("VI_3").is_none());
        assert_eq!(config.last_instance().unwrap().name, "VI_2");
        assert_eq!(config.last_script().unwrap().name, "chk");
        assert!(config.last_sync_group().is_none());
    }

    #[test]
    fn test_vrid_index_moves_and_clears() {
        let mut config = with_instances(&["VI_1", "VI_2"]);
        config.instances[0].vrid = 51;
        config.index_vrid(0);
        config.instances[1].vrid = 51;
        config.index_vrid(1);
        assert_eq!(config.instances_by_vrid(51).count(), 2);

        config.instances[0].vrid = 52;
        config.index_vrid(0);
        assert_eq!(config.instances_by_vrid(51).count(), 1);
        assert_eq!(config.instances_by_vrid(52).next().unwrap().name, "VI_1");

        config.instances[0].vrid = 0;
        config.unindex_vrid(0);
        assert_eq!(config.instances_by_vrid(52).count(), 0);
    }

    #[test]
    fn test_link_sync_groups() {
        let mut config = with_instances(&["VI_1", "VI_2"]);
        config.instances[1].want_state = VRRPState::Master;

        let mut g1 = VRRPSyncGroup::new("G1");
        g1.members = vec!["VI_1".into(), "VI_2".into(), "VI_9".into()];
        config.push_sync_group(g1);
        let mut g2 = VRRPSyncGroup::new("G2");
        g2.members = vec!["VI_1".into()];
        config.push_sync_group(g2);

        let mut diags = Diagnostics::new();
        config.link_sync_groups(&mut diags);

        assert_eq!(config.instances[0].sync_group.as_deref(), Some("G1"));
        assert_eq!(config.instances[1].sync_group.as_deref(), Some("G1"));
        assert_eq!(config.sync_groups[0].state, VRRPState::Master);
        assert_eq!(config.sync_groups[1].state, VRRPState::Backup);
        assert_eq!(diags.for_entity("G1").count(), 1);
        assert_eq!(diags.for_entity("G2").count(), 1);
    }
}
