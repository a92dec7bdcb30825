//! Field domains and invalid-input policies.
//!
//! Every integer keyword goes through a [`FieldRule`]. The rule decides
//! whether a value is in its domain and, through its [`InvalidAction`], what
//! the field becomes when it is not. Handlers only supply the previous value
//! and the default.

use std::fmt;

use thiserror::Error;

use crate::types::{
    DEFAULT_ADVERT_INTERVAL, ProtocolVersion, TIMER_MAX_SEC, Ticks, VRRP_MAX_TRACK_WEIGHT,
};

use self::InvalidAction::{Clamp, KeepPrevious, ResetToDefault, ResetToUnset};

/// What happens to a field when its value is out of domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidAction {
    /// Use the field's default
    ResetToDefault,
    /// Clear the field (and drop it from any index)
    ResetToUnset,
    /// Ignore the new value, keep what was there
    KeepPrevious,
    /// Use the nearest bound
    Clamp,
}

/// Domain of an integer keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub keyword: &'static str,
    pub min: i64,
    pub max: i64,
    pub on_invalid: InvalidAction,
}

/// Out-of-domain value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{keyword} requires a value")]
    Missing { keyword: &'static str },

    #[error("{keyword} '{value}' not valid, {domain}")]
    OutOfDomain {
        keyword: &'static str,
        value: String,
        domain: Domain,
    },
}

/// Human readable domain, used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Range(i64, i64),
    AtLeast(i64),
    Interval(ProtocolVersion),
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Range(min, max) => write!(f, "must be between {min} and {max}"),
            Domain::AtLeast(min) => write!(f, "must be at least {min}"),
            Domain::Interval(ProtocolVersion::V2) => {
                write!(f, "must be between 1 and {TIMER_MAX_SEC}sec for VRRPv2")
            }
            Domain::Interval(ProtocolVersion::V3) => {
                write!(f, "must be between 0.01 and {TIMER_MAX_SEC}sec for VRRPv3")
            }
        }
    }
}

impl FieldRule {
    const fn new(keyword: &'static str, min: i64, max: i64, on_invalid: InvalidAction) -> Self {
        Self {
            keyword,
            min,
            max,
            on_invalid,
        }
    }

    fn domain(&self) -> Domain {
        if self.max >= u32::MAX as i64 {
            Domain::AtLeast(self.min)
        } else {
            Domain::Range(self.min, self.max)
        }
    }

    /// Check `raw` against the domain. Non-numeric input is out of domain.
    pub fn check(&self, raw: Option<&str>) -> Result<i64, FieldError> {
        let raw = raw.ok_or(FieldError::Missing {
            keyword: self.keyword,
        })?;

        match raw.parse::<i64>() {
            Ok(v) if (self.min..=self.max).contains(&v) => Ok(v),
            _ => Err(FieldError::OutOfDomain {
                keyword: self.keyword,
                value: raw.to_owned(),
                domain: self.domain(),
            }),
        }
    }

    /// Check `raw` and recover as [`on_invalid`](Self::on_invalid) says.
    ///
    /// `default` is the field's default, or its unset value for
    /// [`InvalidAction::ResetToUnset`]. Returns the value to store and the
    /// error that caused the recovery, if any.
    pub fn apply(
        &self,
        raw: Option<&str>,
        previous: i64,
        default: i64,
    ) -> (i64, Option<FieldError>) {
        let err = match self.check(raw) {
            Ok(v) => return (v, None),
            Err(err) => err,
        };

        let value = match self.on_invalid {
            ResetToDefault | ResetToUnset => default,
            KeepPrevious => previous,
            // Unparseable input clamps to the minimum
            Clamp => raw
                .and_then(|r| r.parse::<i64>().ok())
                .map_or(self.min, |v| v.clamp(self.min, self.max)),
        };
        (value, Some(err))
    }
}

pub const ROUTER_ID: FieldRule = FieldRule::new("virtual_router_id", 1, 255, ResetToUnset);
pub const PRIORITY: FieldRule = FieldRule::new("priority", 1, 255, ResetToDefault);
pub const DEBUG_LEVEL: FieldRule = FieldRule::new("debug", 0, 4, ResetToDefault);
pub const PREEMPT_DELAY: FieldRule =
    FieldRule::new("preempt_delay", 0, TIMER_MAX_SEC, ResetToDefault);
pub const VERSION: FieldRule = FieldRule::new("version", 2, 3, KeepPrevious);
pub const GARP_DELAY: FieldRule =
    FieldRule::new("garp_master_delay", 1, u32::MAX as i64, Clamp);
pub const GARP_REFRESH: FieldRule =
    FieldRule::new("garp_master_refresh", 0, u32::MAX as i64, ResetToDefault);
pub const GARP_REPEAT: FieldRule = FieldRule::new("garp_master_repeat", 1, u32::MAX as i64, Clamp);
pub const GARP_REFRESH_REPEAT: FieldRule =
    FieldRule::new("garp_master_refresh_repeat", 1, u32::MAX as i64, Clamp);
pub const TRACK_WEIGHT: FieldRule = FieldRule::new(
    "weight",
    -VRRP_MAX_TRACK_WEIGHT,
    VRRP_MAX_TRACK_WEIGHT,
    ResetToDefault,
);
pub const SCRIPT_INTERVAL: FieldRule = FieldRule::new("interval", 1, u32::MAX as i64, Clamp);
pub const SCRIPT_TIMEOUT: FieldRule = FieldRule::new("timeout", 1, u32::MAX as i64, Clamp);
pub const SCRIPT_WEIGHT: FieldRule = FieldRule::new(
    "weight",
    -VRRP_MAX_TRACK_WEIGHT,
    VRRP_MAX_TRACK_WEIGHT,
    KeepPrevious,
);
pub const SCRIPT_RISE: FieldRule = FieldRule::new("rise", 1, u32::MAX as i64, Clamp);
pub const SCRIPT_FALL: FieldRule = FieldRule::new("fall", 1, u32::MAX as i64, Clamp);

/// Advertisement interval, configured in (fractional) seconds.
///
/// The floor depends on the version: 1s for VRRPv2, one centisecond for
/// VRRPv3 or when the version is not known yet.
pub fn advert_interval(
    raw: Option<&str>,
    version: Option<ProtocolVersion>,
) -> Result<Ticks, FieldError> {
    const KEYWORD: &str = "advert_int";
    let raw = raw.ok_or(FieldError::Missing { keyword: KEYWORD })?;
    let version = version.unwrap_or(ProtocolVersion::V3);
    let floor = match version {
        ProtocolVersion::V2 => DEFAULT_ADVERT_INTERVAL,
        ProtocolVersion::V3 => 1,
    };

    let ceiling = TIMER_MAX_SEC * 100;

    let centis = raw
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite())
        .map(|secs| (secs * 100.0) as i64);

    match centis {
        Some(c) if (floor as i64..=ceiling).contains(&c) => Ok(Ticks::from_centis(c as u64)),
        _ => Err(FieldError::OutOfDomain {
            keyword: KEYWORD,
            value: raw.to_owned(),
            domain: Domain::Interval(version),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_id_domain() {
        assert_eq!(ROUTER_ID.check(Some("1")), Ok(1));
        assert_eq!(ROUTER_ID.check(Some("255")), Ok(255));
        assert!(ROUTER_ID.check(Some("0")).is_err());
        assert!(ROUTER_ID.check(Some("256")).is_err());
        assert!(ROUTER_ID.check(Some("abc")).is_err());
        assert_eq!(
            ROUTER_ID.check(None),
            Err(FieldError::Missing {
                keyword: "virtual_router_id"
            })
        );
        assert_eq!(ROUTER_ID.on_invalid, InvalidAction::ResetToUnset);
    }

    #[test]
    fn test_error_message_names_domain() {
        let err = PRIORITY.check(Some("300")).unwrap_err();
        assert_eq!(err.to_string(), "priority '300' not valid, must be between 1 and 255");
        let err = GARP_REPEAT.check(Some("0")).unwrap_err();
        assert_eq!(err.to_string(), "garp_master_repeat '0' not valid, must be at least 1");
    }

    #[test]
    fn test_apply_clamps() {
        assert_eq!(GARP_REPEAT.apply(Some("3"), 5, 5), (3, None));
        let (v, err) = GARP_REPEAT.apply(Some("-5"), 5, 5);
        assert_eq!(v, 1);
        assert!(err.is_some());
        assert_eq!(GARP_REPEAT.apply(Some("junk"), 5, 5).0, 1);
        assert_eq!(SCRIPT_INTERVAL.apply(Some("0"), 4, 1).0, 1);
        assert_eq!(GARP_REPEAT.apply(None, 5, 5).0, 1);
    }

    #[test]
    fn test_apply_follows_invalid_action() {
        assert_eq!(PRIORITY.apply(Some("300"), 150, 100).0, 100);
        assert_eq!(ROUTER_ID.apply(Some("0"), 51, 0).0, 0);
        assert_eq!(SCRIPT_WEIGHT.apply(Some("300"), 10, 0).0, 10);
        assert_eq!(VERSION.apply(Some("4"), 3, 3).0, 3);

        let keep = FieldRule::new("priority", 1, 255, KeepPrevious);
        assert_eq!(keep.apply(Some("300"), 150, 100).0, 150);
        let clamp = FieldRule::new("priority", 1, 255, Clamp);
        assert_eq!(clamp.apply(Some("300"), 150, 100).0, 255);
    }

    #[test]
    fn test_preempt_delay_bounds() {
        assert_eq!(PREEMPT_DELAY.check(Some("0")), Ok(0));
        assert_eq!(PREEMPT_DELAY.check(Some("1000")), Ok(1000));
        assert!(PREEMPT_DELAY.check(Some("-1")).is_err());
        assert!(PREEMPT_DELAY.check(Some("1001")).is_err());
    }

    #[test]
    fn test_advert_interval() {
        assert_eq!(advert_interval(Some("1"), None), Ok(Ticks::from_secs(1)));
        assert_eq!(
            advert_interval(Some("0.5"), Some(ProtocolVersion::V3)),
            Ok(Ticks::from_centis(50))
        );
        assert_eq!(advert_interval(Some("0.01"), None), Ok(Ticks::from_centis(1)));
        assert!(advert_interval(Some("0.5"), Some(ProtocolVersion::V2)).is_err());
        assert!(advert_interval(Some("0"), None).is_err());
        assert!(advert_interval(Some("-3"), None).is_err());
        assert!(advert_interval(Some("fast"), None).is_err());
        assert_eq!(advert_interval(Some("1000"), None), Ok(Ticks::from_secs(1000)));
        assert!(advert_interval(Some("1000.01"), None).is_err());
        assert!(advert_interval(Some("1e300"), Some(ProtocolVersion::V2)).is_err());
    }
}
