//! Reservation identifiers and the string-keyed property bags exchanged with
//! the host.
//!
//! A [`Properties`] bag is owned by a single call. Handlers clone and merge
//! bags rather than sharing them, so concurrent calls never observe each
//! other's values.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Property key used as an out-of-band channel for reservation identifiers.
///
/// As an input in the scheduler bag it overrides the reservation id passed to
/// the script. As an output it carries the id reported by the script back to
/// the host.
pub const NEW_RESERVATION_ID: &str = "new.reservationid";

/// Opaque identifier for a lease.
///
/// The adapter never interprets the value; it only passes it through and
/// compares it when deciding which id to hand to a script.
///
/// # Example
///
/// ```
/// use lease_exec::ReservationId;
///
/// let id = ReservationId::new("lease-42");
/// assert_eq!(id.as_str(), "lease-42");
/// assert_eq!(id.to_string(), "lease-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(String);

impl ReservationId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReservationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ReservationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// String-keyed, string-valued property bag.
///
/// Backed by a [`BTreeMap`] so iteration (and therefore serialised output) is
/// deterministic.
///
/// # Example
///
/// ```
/// use lease_exec::Properties;
///
/// let scheduler: Properties = [("unit", "4"), ("site", "a")].into_iter().collect();
/// let caller: Properties = [("unit", "8")].into_iter().collect();
///
/// let merged = scheduler.merged_with(&caller);
/// assert_eq!(merged.get("unit"), Some("8"));
/// assert_eq!(merged.get("site"), Some("a"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Creates an empty bag.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Returns whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the bag has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy of this bag with `other` written over it.
    ///
    /// Keys present in both bags take the value from `other`.
    #[must_use]
    pub fn merged_with(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Reservation id and property bag returned by every lifecycle handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseReturn {
    reservation_id: ReservationId,
    properties: Properties,
}

impl LeaseReturn {
    /// Pairs a reservation id with its result properties.
    #[must_use]
    pub const fn new(reservation_id: ReservationId, properties: Properties) -> Self {
        Self {
            reservation_id,
            properties,
        }
    }

    /// Reservation id handed back to the host.
    #[must_use]
    pub const fn reservation_id(&self) -> &ReservationId {
        &self.reservation_id
    }

    /// Result property bag.
    #[must_use]
    pub const fn properties(&self) -> &Properties {
        &self.properties
    }
}
