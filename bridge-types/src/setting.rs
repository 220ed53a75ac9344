//! Tri-state option fields.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An optional configuration field that distinguishes "not mentioned" from
/// "explicitly cleared".
///
/// Both [`Setting::Absent`] and [`Setting::Unset`] travel as an omitted field;
/// the difference only matters when layering option objects with
/// [`Setting::overlay`]. Decoding a `null` yields `Unset`, a missing field
/// (with `#[serde(default)]`) yields `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting<T> {
    /// Field not mentioned; a lower layer may supply it
    Absent,
    /// Field explicitly cleared; lower layers must not supply it
    Unset,
    /// Field set to a value
    Value(T),
}

impl<T> Setting<T> {
    /// Layer `later` on top of `self`.
    ///
    /// `Absent` keeps the current state; `Unset` and `Value` replace it.
    pub fn overlay(self, later: Setting<T>) -> Setting<T> {
        match later {
            Setting::Absent => self,
            other => other,
        }
    }

    /// The value, if one is set.
    pub fn value(&self) -> Option<&T> {
        match self {
            Setting::Value(v) => Some(v),
            _ => None,
        }
    }

    /// True if a value is set.
    pub fn is_value(&self) -> bool {
        matches!(self, Setting::Value(_))
    }

    /// True if no value is set (absent or unset).
    pub fn is_unspecified(&self) -> bool {
        !self.is_value()
    }
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Absent
    }
}

impl<T> From<T> for Setting<T> {
    fn from(value: T) -> Self {
        Setting::Value(value)
    }
}

impl<T: Serialize> Serialize for Setting<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Setting::Value(v) => v.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Setting<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Setting::Value(v),
            None => Setting::Unset,
        })
    }
}
