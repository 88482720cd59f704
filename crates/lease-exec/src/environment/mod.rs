//! Conversion of property bags into script environment variables.
//!
//! Keys are upper-cased and every `.` becomes `_`; values pass through
//! untouched. `new.reservationid` therefore reaches a script as
//! `NEW_RESERVATIONID`.

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::properties::Properties;

/// Converts a property key into its environment variable name.
///
/// # Example
///
/// ```
/// use lease_exec::environment_key;
///
/// assert_eq!(environment_key("unit.ip.address"), "UNIT_IP_ADDRESS");
/// ```
#[must_use]
pub fn environment_key(key: &str) -> String {
    key.to_uppercase().replace('.', "_")
}

/// Environment overlay handed to a script process.
///
/// Keys that collide after conversion keep the value written last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Creates an empty overlay.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vars: BTreeMap::new(),
        }
    }

    /// Converts a single property bag.
    #[must_use]
    pub fn from_properties(properties: &Properties) -> Self {
        let mut environment = Self::new();
        environment.overlay(properties);
        environment
    }

    /// Writes the converted `properties` over the current values.
    pub fn overlay(&mut self, properties: &Properties) -> &mut Self {
        self.vars.extend(
            properties
                .iter()
                .map(|(key, value)| (environment_key(key), value.clone())),
        );
        self
    }

    /// Returns the value of variable `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Iterates over variables in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.vars.iter()
    }

    /// Number of variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns whether the overlay is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.iter()
    }
}

#[cfg(test)]
mod tests;
