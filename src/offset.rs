//! Resolution of a schedule's offset specifier into minutes east of UTC.
//!
//! A specifier is `auto` (the viewer's own offset), the name of a bucket table
//! in [`OffsetTables`], or a literal number of minutes.

use crate::errors::OffsetFault;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const AUTO: &str = "auto";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetBucket {
    pub target: i32,
    /// Inclusive, `None` for the unbounded last bucket.
    pub upper_bound: Option<i32>,
}

/// Buckets a continuous client offset into one of a few canonical offsets.
///
/// Deserializes from `[[target, upper], ..., [target]]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Vec<i32>>")]
pub struct OffsetMap(Vec<OffsetBucket>);

impl OffsetMap {
    pub fn new(buckets: Vec<OffsetBucket>) -> Result<Self, OffsetFault> {
        if buckets.is_empty() {
            return Err(OffsetFault::InvalidMap("no buckets".into()));
        }
        let bounded = &buckets[..buckets.len() - 1];
        if bounded.iter().any(|bucket| bucket.upper_bound.is_none()) {
            return Err(OffsetFault::InvalidMap(
                "only the last bucket may omit its upper bound".into(),
            ));
        }
        Ok(OffsetMap(buckets))
    }

    /// Target of the first bucket whose upper bound is at or above `client_offset`.
    pub fn bucket(&self, client_offset: i32) -> Option<i32> {
        self.0
            .iter()
            .find(|bucket| bucket.upper_bound.map_or(true, |upper| upper >= client_offset))
            .map(|bucket| bucket.target)
    }
}

impl TryFrom<Vec<Vec<i32>>> for OffsetMap {
    type Error = OffsetFault;

    fn try_from(entries: Vec<Vec<i32>>) -> Result<Self, Self::Error> {
        let buckets = entries
            .into_iter()
            .map(|entry| match entry.as_slice() {
                [target] => Ok(OffsetBucket {
                    target: *target,
                    upper_bound: None,
                }),
                [target, upper] => Ok(OffsetBucket {
                    target: *target,
                    upper_bound: Some(*upper),
                }),
                other => Err(OffsetFault::InvalidMap(format!(
                    "bucket needs 1 or 2 values, got {}",
                    other.len()
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        OffsetMap::new(buckets)
    }
}

/// Named offset maps, loaded once and merged as more data arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct OffsetTables {
    maps: HashMap<String, OffsetMap>,
}

impl OffsetTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `{"name": [[target, upper], ..., [target]], ...}`.
    pub fn from_json(json: &str) -> Result<Self, OffsetFault> {
        serde_json::from_str(json).map_err(|e| OffsetFault::InvalidMap(e.to_string()))
    }

    pub fn insert(&mut self, name: impl Into<String>, map: OffsetMap) -> Option<OffsetMap> {
        self.maps.insert(name.into(), map)
    }

    pub fn get(&self, name: &str) -> Option<&OffsetMap> {
        self.maps.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Merges incoming maps, replacing those with the same name.
    pub fn merge(&mut self, incoming: OffsetTables) {
        self.maps.extend(incoming.maps);
    }

    pub fn lookup(&self, name: &str, client_offset: i32) -> Result<i32, OffsetFault> {
        self.get(name)
            .and_then(|map| map.bucket(client_offset))
            .ok_or_else(|| OffsetFault::LookupMiss(name.into(), client_offset))
    }
}

/// Resolves `spec` to the offset, in minutes east of UTC, the schedule's triggers
/// are expressed in. Never fails: an unresolvable specifier yields 0.
///
/// ```rust
/// use cron_countdown::{resolve_offset_minutes, OffsetTables};
///
/// let tables = OffsetTables::from_json(r#"{"eu": [[-300, -180], [60]]}"#).unwrap();
/// assert_eq!(-300, resolve_offset_minutes("eu", -200, &tables));
/// assert_eq!(60, resolve_offset_minutes("eu", 30, &tables));
/// assert_eq!(180, resolve_offset_minutes("180", 30, &tables));
/// assert_eq!(30, resolve_offset_minutes("auto", 30, &tables));
/// ```
pub fn resolve_offset_minutes(spec: &str, client_offset_minutes: i32, tables: &OffsetTables) -> i32 {
    let spec = spec.trim();
    if spec == AUTO {
        return client_offset_minutes;
    }
    if tables.get(spec).is_some() {
        return match tables.lookup(spec, client_offset_minutes) {
            Ok(offset) => offset,
            Err(fault) => {
                warn!(%fault, "falling back to offset 0");
                0
            }
        };
    }
    spec.parse::<i32>().unwrap_or_else(|_| {
        debug!(spec, "unknown offset, using 0");
        0
    })
}
