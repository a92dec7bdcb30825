//! Fixed-capacity strings.
//!
//! Some configuration values end up in fixed-size kernel or packet fields
//! (interface names, the VRRPv2 password). They are truncated on
//! construction and the caller is told so it can warn.

use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use crate::types::{IF_NAME_LEN, VRRP_AUTH_LEN};

/// A string of at most `N` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BoundedString<const N: usize>(String);

/// Interface name (IFNAMSIZ without the terminator)
pub type IfName = BoundedString<IF_NAME_LEN>;

/// VRRPv2 authentication data
pub type AuthSecret = BoundedString<VRRP_AUTH_LEN>;

impl<const N: usize> BoundedString<N> {
    /// Build from `value`, cutting it to `N` bytes on a character boundary.
    ///
    /// Returns the value and whether anything was cut.
    pub fn truncating(value: &str) -> (Self, bool) {
        if value.len() <= N {
            return (BoundedString(value.to_owned()), false);
        }

        let mut end = N;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        (BoundedString(value[..end].to_owned()), true)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> Deref for BoundedString<N> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> fmt::Display for BoundedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const N: usize> PartialEq<str> for BoundedString<N> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl<const N: usize> PartialEq<&str> for BoundedString<N> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
