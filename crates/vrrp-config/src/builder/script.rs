//! `vrrp_script` keywords.

use tracing::debug;

use super::{ConfigBuilder, Directive, arg, block_name, joined_value};
use crate::model::VRRPScript;
use crate::source::BlockSource;
use crate::types::{Ticks, VRRP_SCRIPT_DI, VRRP_SCRIPT_DT};
use crate::validate::{self, FieldRule};

impl ConfigBuilder {
    pub(crate) fn vrrp_script(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        self.context = Default::default();

        let Some(name) = block_name(fields) else {
            self.diagnostics.info(None, "vrrp_script must have a name - skipping");
            return Directive::SkipBlock;
        };

        if self.config.script(name).is_some() {
            self.diagnostics.info(
                Some(name),
                format!("vrrp script {name} already defined - skipping"),
            );
            return Directive::SkipBlock;
        }

        let pos = self.config.push_script(VRRPScript::new(name));
        self.context.script = Some(pos);
        debug!(script = %name, "New vrrp script");
        Directive::Continue
    }

    pub(crate) fn script_command(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        let Some(pos) = self.script_in_scope(fields) else {
            return Directive::Continue;
        };
        let script = &mut self.config.scripts[pos];

        match joined_value(fields) {
            Some(command) => script.command = Some(command),
            None => self
                .diagnostics
                .info(Some(&script.name), "script requires a command - ignoring"),
        }
        Directive::Continue
    }

    /// Value for a script field, reported when `rule` had to recover
    fn script_value(
        &mut self,
        pos: usize,
        rule: &FieldRule,
        fields: &[String],
        previous: i64,
        default: i64,
    ) -> i64 {
        let (value, err) = rule.apply(arg(fields), previous, default);
        if let Some(err) = err {
            self.diagnostics.info(
                Some(&self.config.scripts[pos].name),
                format!("{err}, using {value}"),
            );
        }
        value
    }

    pub(crate) fn script_interval(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.script_in_scope(fields) {
            let previous = self.config.scripts[pos].interval.as_secs() as i64;
            let secs = self.script_value(
                pos,
                &validate::SCRIPT_INTERVAL,
                fields,
                previous,
                VRRP_SCRIPT_DI as i64,
            );
            self.config.scripts[pos].interval = Ticks::from_secs(secs as u64);
        }
        Directive::Continue
    }

    pub(crate) fn script_timeout(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.script_in_scope(fields) {
            let previous = self.config.scripts[pos].timeout.as_secs() as i64;
            let secs = self.script_value(
                pos,
                &validate::SCRIPT_TIMEOUT,
                fields,
                previous,
                VRRP_SCRIPT_DT as i64,
            );
            self.config.scripts[pos].timeout = Ticks::from_secs(secs as u64);
        }
        Directive::Continue
    }

    pub(crate) fn script_rise(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.script_in_scope(fields) {
            let previous = self.config.scripts[pos].rise.into();
            let count = self.script_value(pos, &validate::SCRIPT_RISE, fields, previous, 1);
            self.config.scripts[pos].rise = count as u32;
        }
        Directive::Continue
    }

    pub(crate) fn script_fall(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.script_in_scope(fields) {
            let previous = self.config.scripts[pos].fall.into();
            let count = self.script_value(pos, &validate::SCRIPT_FALL, fields, previous, 1);
            self.config.scripts[pos].fall = count as u32;
        }
        Directive::Continue
    }

    pub(crate) fn script_weight(
        &mut self,
        fields: &[String],
        _source: &mut dyn BlockSource,
    ) -> Directive {
        if let Some(pos) = self.script_in_scope(fields) {
            let previous = self.config.scripts[pos].weight.into();
            let weight = self.script_value(pos, &validate::SCRIPT_WEIGHT, fields, previous, 0);
            self.config.scripts[pos].weight = weight as i32;
        }
        Directive::Continue
    }
}
