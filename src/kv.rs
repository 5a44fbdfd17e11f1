// Copyright 2018-2022 argmin developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::collections::HashMap;
use std::fmt;
use std::fmt::{Debug, Display};

/// Types a [`KV`] value can hold.
#[derive(Clone, PartialEq, Debug)]
pub enum KvValue {
    /// Floating point values
    Float(f64),
    /// Unsigned integers
    Uint(u64),
    /// Boolean values
    Bool(bool),
    /// Strings
    Str(String),
}

impl Display for KvValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KvValue::Float(x) => write!(f, "{x}"),
            KvValue::Uint(x) => write!(f, "{x}"),
            KvValue::Bool(x) => write!(f, "{x}"),
            KvValue::Str(x) => write!(f, "{x}"),
        }
    }
}

impl From<f64> for KvValue {
    fn from(x: f64) -> KvValue {
        KvValue::Float(x)
    }
}

impl From<u64> for KvValue {
    fn from(x: u64) -> KvValue {
        KvValue::Uint(x)
    }
}

impl From<bool> for KvValue {
    fn from(x: bool) -> KvValue {
        KvValue::Bool(x)
    }
}

impl From<&str> for KvValue {
    fn from(x: &str) -> KvValue {
        KvValue::Str(x.to_string())
    }
}

/// A small key-value record attached to a single iteration, used to carry
/// auxiliary facts (a BFGS curvature reset, a CG restart, the trust-region
/// radius) to an [`Observe`](crate::observer::Observe) implementation
/// without growing the core iteration record with fields most methods never
/// populate.
#[derive(Clone, Default, PartialEq)]
pub struct KV {
    kv: HashMap<&'static str, KvValue>,
}

impl Debug for KV {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{self}")
    }
}

impl Display for KV {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "KV")?;
        for (key, val) in self.kv.iter() {
            writeln!(f, "   {key}: {val}")?;
        }
        Ok(())
    }
}

impl KV {
    /// Construct an empty `KV`.
    pub fn new() -> Self {
        KV::default()
    }

    /// Insert a key-value pair, chainable.
    #[must_use]
    pub fn with(mut self, key: &'static str, val: impl Into<KvValue>) -> Self {
        self.kv.insert(key, val.into());
        self
    }

    /// Retrieve an entry by key.
    pub fn get(&self, key: &str) -> Option<&KvValue> {
        self.kv.get(key)
    }

    /// Merge with another `KV`, `other` taking precedence on key clashes.
    #[must_use]
    pub fn merge(mut self, other: KV) -> Self {
        self.kv.extend(other.kv);
        self
    }

    /// `true` if no entries are present.
    pub fn is_empty(&self) -> bool {
        self.kv.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_roundtrip() {
        let kv = KV::new().with("radius", 1.5f64).with("accepted", true);
        assert_eq!(kv.get("radius"), Some(&KvValue::Float(1.5)));
        assert_eq!(kv.get("accepted"), Some(&KvValue::Bool(true)));
        assert_eq!(kv.get("missing"), None);
    }

    #[test]
    fn merge_prefers_other() {
        let a = KV::new().with("x", 1.0f64);
        let b = KV::new().with("x", 2.0f64);
        let merged = a.merge(b);
        assert_eq!(merged.get("x"), Some(&KvValue::Float(2.0)));
    }

    #[test]
    fn display_is_stable_for_empty_kv() {
        assert_eq!(format!("{}", KV::new()), "KV\n");
    }
}
