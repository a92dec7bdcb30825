//! Static addresses, routes and rules, installed independently of any
//! instance state.

use super::{ConfigBuilder, Directive};
use crate::address::{IpAddress, Route, Rule};
use crate::source::BlockSource;

impl ConfigBuilder {
    pub(crate) fn static_ipaddress(
        &mut self,
        _fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        for line in self.read_value_block(source) {
            match IpAddress::parse(&line) {
                Ok(addr) => self.config.static_addresses.push(addr),
                Err(err) => self.diagnostics.info(
                    None,
                    format!("invalid static address [{}]: {err} - skipping", line.join(" ")),
                ),
            }
        }
        Directive::Continue
    }

    pub(crate) fn static_routes(
        &mut self,
        _fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        for line in self.read_value_block(source) {
            match Route::parse(&line) {
                Ok(route) => self.config.static_routes.push(route),
                Err(err) => self.diagnostics.info(
                    None,
                    format!("invalid static route [{}]: {err} - skipping", line.join(" ")),
                ),
            }
        }
        Directive::Continue
    }

    pub(crate) fn static_rules(
        &mut self,
        _fields: &[String],
        source: &mut dyn BlockSource,
    ) -> Directive {
        for line in self.read_value_block(source) {
            match Rule::parse(&line) {
                Ok(rule) => self.config.static_rules.push(rule),
                Err(err) => self.diagnostics.info(
                    None,
                    format!("invalid static rule [{}]: {err} - skipping", line.join(" ")),
                ),
            }
        }
        Directive::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_blocks() {
        let build = ConfigBuilder::new().load_str(
            "static_ipaddress {\n 192.168.1.1/24 dev eth0 scope link\n fe80::1/64 dev eth1\n not-an-ip\n}\n\
             static_routes {\n 10.1.0.0/16 via 192.168.1.254 dev eth0\n}\n\
             static_rules {\n from 10.1.0.0/16 table 100\n}\n",
        );

        assert_eq!(build.config.static_addresses.len(), 2);
        assert_eq!(build.config.static_routes.len(), 1);
        assert_eq!(build.config.static_rules.len(), 1);
        assert_eq!(build.diagnostics.len(), 1);
        assert!(build.config.is_empty());
    }
}
