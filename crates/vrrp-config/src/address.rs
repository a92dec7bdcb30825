//! Address, route and rule entries.
//!
//! Each entry is parsed from the fields of one line of a value block, e.g.
//!
//! ```text
//! 192.168.200.16/24 dev eth0 scope link label eth0:1
//! 10.1.0.0/16 via 192.168.200.1 dev eth0 metric 10 table 100
//! from 192.168.28.0/24 table 100
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::bounded::IfName;
use crate::types::AddressFamily;

/// Error for a single malformed entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("empty entry")]
    Empty,

    #[error("invalid address '{0}'")]
    InvalidAddress(String),

    #[error("invalid prefix length in '{0}'")]
    InvalidPrefix(String),

    #[error("missing value after '{0}'")]
    MissingValue(&'static str),

    #[error("invalid value '{value}' for '{option}'")]
    InvalidValue { option: &'static str, value: String },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("'{0}' is not of the same family as the destination")]
    FamilyMismatch(String),

    #[error("rule needs at least one of 'from' or 'to'")]
    EmptyRule,
}

/// Address with a prefix length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IpPrefix {
    pub addr: IpAddr,
    pub len: u8,
}

impl IpPrefix {
    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.addr)
    }
}

impl FromStr for IpPrefix {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_part, len_part) = match s.split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (s, None),
        };

        let addr: IpAddr = addr_part
            .parse()
            .map_err(|_| AddressError::InvalidAddress(s.to_owned()))?;
        let max = AddressFamily::of(&addr).max_prefix_len();

        let len = match len_part {
            None => max,
            Some(len) => len
                .parse::<u8>()
                .ok()
                .filter(|l| *l <= max)
                .ok_or_else(|| AddressError::InvalidPrefix(s.to_owned()))?,
        };

        Ok(IpPrefix { addr, len })
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

/// Address scope, as in `ip addr ... scope`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Scope(pub u8);

impl Scope {
    pub const GLOBAL: Scope = Scope(0);
    pub const SITE: Scope = Scope(200);
    pub const LINK: Scope = Scope(253);
    pub const HOST: Scope = Scope(254);
    pub const NOWHERE: Scope = Scope(255);
}

impl FromStr for Scope {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(Scope::GLOBAL),
            "site" => Ok(Scope::SITE),
            "link" => Ok(Scope::LINK),
            "host" => Ok(Scope::HOST),
            "nowhere" => Ok(Scope::NOWHERE),
            other => other.parse().map(Scope).map_err(|_| AddressError::InvalidValue {
                option: "scope",
                value: other.to_owned(),
            }),
        }
    }
}

/// Cursor over the option part of an entry
struct Options<'a> {
    fields: std::slice::Iter<'a, String>,
}

impl<'a> Options<'a> {
    fn new(fields: &'a [String]) -> Self {
        Self {
            fields: fields.iter(),
        }
    }

    fn next_option(&mut self) -> Option<&'a str> {
        self.fields.next().map(String::as_str)
    }

    fn value(&mut self, option: &'static str) -> Result<&'a str, AddressError> {
        self.fields
            .next()
            .map(String::as_str)
            .ok_or(AddressError::MissingValue(option))
    }

    fn parsed<T: FromStr>(&mut self, option: &'static str) -> Result<T, AddressError> {
        let raw = self.value(option)?;
        raw.parse().map_err(|_| AddressError::InvalidValue {
            option,
            value: raw.to_owned(),
        })
    }

    fn ifname(&mut self, option: &'static str) -> Result<IfName, AddressError> {
        let raw = self.value(option)?;
        match IfName::truncating(raw) {
            (name, false) => Ok(name),
            (_, true) => Err(AddressError::InvalidValue {
                option,
                value: raw.to_owned(),
            }),
        }
    }
}

/// Virtual or static address entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpAddress {
    pub prefix: IpPrefix,
    pub interface: Option<IfName>,
    pub scope: Scope,
    pub label: Option<String>,
    pub broadcast: Option<Ipv4Addr>,
}

impl IpAddress {
    /// Parse `<addr>[/len] [dev IF] [scope S] [label L] [brd B]`
    pub fn parse(fields: &[String]) -> Result<Self, AddressError> {
        let (first, rest) = fields.split_first().ok_or(AddressError::Empty)?;
        let prefix: IpPrefix = first.parse()?;

        let mut entry = IpAddress {
            prefix,
            interface: None,
            scope: Scope::GLOBAL,
            label: None,
            broadcast: None,
        };

        let mut opts = Options::new(rest);
        while let Some(option) = opts.next_option() {
            match option {
                "dev" => entry.interface = Some(opts.ifname("dev")?),
                "scope" => entry.scope = opts.parsed("scope")?,
                "label" => entry.label = Some(opts.value("label")?.to_owned()),
                "brd" | "broadcast" => {
                    if prefix.family() != AddressFamily::V4 {
                        return Err(AddressError::FamilyMismatch("brd".to_owned()));
                    }
                    entry.broadcast = Some(opts.parsed("brd")?);
                }
                other => return Err(AddressError::UnknownOption(other.to_owned())),
            }
        }

        Ok(entry)
    }

    pub fn addr(&self) -> IpAddr {
        self.prefix.addr
    }

    pub fn family(&self) -> AddressFamily {
        self.prefix.family()
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix)?;
        if let Some(dev) = &self.interface {
            write!(f, " dev {dev}")?;
        }
        if self.scope != Scope::GLOBAL {
            write!(f, " scope {}", self.scope.0)?;
        }
        if let Some(label) = &self.label {
            write!(f, " label {label}")?;
        }
        Ok(())
    }
}

/// Virtual or static route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub destination: IpPrefix,
    pub gateway: Option<IpAddr>,
    pub interface: Option<IfName>,
    pub source: Option<IpAddr>,
    pub metric: Option<u32>,
    pub table: Option<u32>,
    pub scope: Option<Scope>,
    pub blackhole: bool,
}

impl Route {
    /// Parse `[blackhole] <dst>[/len] [via|gw GW] [dev IF] [src A] [metric N] [table N] [scope S]`
    pub fn parse(fields: &[String]) -> Result<Self, AddressError> {
        let (blackhole, fields) = match fields.split_first() {
            Some((first, rest)) if first == "blackhole" => (true, rest),
            _ => (false, fields),
        };
        let (first, rest) = fields.split_first().ok_or(AddressError::Empty)?;
        let destination: IpPrefix = first.parse()?;
        let family = destination.family();

        let mut route = Route {
            destination,
            gateway: None,
            interface: None,
            source: None,
            metric: None,
            table: None,
            scope: None,
            blackhole,
        };

        let mut opts = Options::new(rest);
        while let Some(option) = opts.next_option() {
            match option {
                "via" | "gw" => {
                    let gw: IpAddr = opts.parsed("via")?;
                    same_family(family, &gw)?;
                    route.gateway = Some(gw);
                }
                "src" => {
                    let src: IpAddr = opts.parsed("src")?;
                    same_family(family, &src)?;
                    route.source = Some(src);
                }
                "dev" => route.interface = Some(opts.ifname("dev")?),
                "metric" => route.metric = Some(opts.parsed("metric")?),
                "table" => route.table = Some(opts.parsed("table")?),
                "scope" => route.scope = Some(opts.parsed("scope")?),
                other => return Err(AddressError::UnknownOption(other.to_owned())),
            }
        }

        Ok(route)
    }

    pub fn family(&self) -> AddressFamily {
        self.destination.family()
    }
}

/// Virtual or static policy-routing rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub from: Option<IpPrefix>,
    pub to: Option<IpPrefix>,
    pub table: Option<u32>,
}

impl Rule {
    /// Parse `[from P] [to P] [table N]`
    pub fn parse(fields: &[String]) -> Result<Self, AddressError> {
        if fields.is_empty() {
            return Err(AddressError::Empty);
        }

        let mut rule = Rule {
            from: None,
            to: None,
            table: None,
        };

        let mut opts = Options::new(fields);
        while let Some(option) = opts.next_option() {
            match option {
                "from" => rule.from = Some(opts.parsed("from")?),
                "to" => rule.to = Some(opts.parsed("to")?),
                "table" => rule.table = Some(opts.parsed("table")?),
                other => return Err(AddressError::UnknownOption(other.to_owned())),
            }
        }

        match (&rule.from, &rule.to) {
            (None, None) => Err(AddressError::EmptyRule),
            (Some(from), Some(to)) if from.family() != to.family() => {
                Err(AddressError::FamilyMismatch(to.to_string()))
            }
            _ => Ok(rule),
        }
    }

    pub fn family(&self) -> Option<AddressFamily> {
        self.from.or(self.to).map(|p| p.family())
    }
}

fn same_family(family: AddressFamily, addr: &IpAddr) -> Result<(), AddressError> {
    if AddressFamily::of(addr) == family {
        Ok(())
    } else {
        Err(AddressError::FamilyMismatch(addr.to_string()))
    }
}
