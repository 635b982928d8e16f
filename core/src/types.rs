//! Core types for FLIPNET
//!
//! Defines the tri-valued proposal domain, the phase tag, and the state
//! snapshot reported over the control surface.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Proposal value carried by protocol messages.
///
/// `Zero` and `One` are the binary opinions. `Maybe` means "no majority
/// observed" and is only produced by an inconclusive phase 1; it never
/// appears at the start of a round.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Value {
    Zero,
    One,
    Maybe,
}

impl Value {
    /// Build a binary value from a bit.
    pub fn from_bit(bit: u8) -> Option<Self> {
        match bit {
            0 => Some(Value::Zero),
            1 => Some(Value::One),
            _ => None,
        }
    }

    /// The bit behind a binary value, `None` for `Maybe`.
    pub fn as_bit(&self) -> Option<u8> {
        match self {
            Value::Zero => Some(0),
            Value::One => Some(1),
            Value::Maybe => None,
        }
    }

    /// True for `Zero` and `One`.
    pub fn is_binary(&self) -> bool {
        !matches!(self, Value::Maybe)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Zero => write!(f, "0"),
            Value::One => write!(f, "1"),
            Value::Maybe => write!(f, "?"),
        }
    }
}

// Wire encoding is heterogeneous: 0 and 1 are JSON numbers, the
// no-majority sentinel is the JSON string "?".
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Zero => serializer.serialize_u8(0),
            Value::One => serializer.serialize_u8(1),
            Value::Maybe => serializer.serialize_str("?"),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0, 1, or the string \"?\"")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        match v {
            0 => Ok(Value::Zero),
            1 => Ok(Value::One),
            other => Err(E::custom(format!("value out of range: {}", other))),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        if v < 0 {
            return Err(E::custom(format!("value out of range: {}", v)));
        }
        self.visit_u64(v as u64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        match v {
            "?" => Ok(Value::Maybe),
            other => Err(E::custom(format!("unknown value: {:?}", other))),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Message-exchange phase within a round.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Phase {
    One,
    Two,
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> u8 {
        match phase {
            Phase::One => 1,
            Phase::Two => 2,
        }
    }
}

impl TryFrom<u8> for Phase {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Phase::One),
            2 => Ok(Phase::Two),
            other => Err(format!("invalid phase: {}", other)),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Point-in-time view of a participant, as reported by `/getState`.
///
/// A faulty participant reports `x`, `decided`, and `k` as JSON `null`;
/// `killed` is always a concrete boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub killed: bool,
    pub x: Option<Value>,
    pub decided: Option<bool>,
    pub k: Option<u64>,
}

impl StateSnapshot {
    /// Snapshot of a live participant.
    pub fn active(killed: bool, x: Value, decided: bool, k: u64) -> Self {
        Self {
            killed,
            x: Some(x),
            decided: Some(decided),
            k: Some(k),
        }
    }

    /// Snapshot of a faulty participant: all consensus fields unset.
    pub fn faulty(killed: bool) -> Self {
        Self {
            killed,
            x: None,
            decided: None,
            k: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_wire_encoding() {
        assert_eq!(serde_json::to_value(Value::Zero).unwrap(), json!(0));
        assert_eq!(serde_json::to_value(Value::One).unwrap(), json!(1));
        assert_eq!(serde_json::to_value(Value::Maybe).unwrap(), json!("?"));
    }

    #[test]
    fn test_value_wire_decoding() {
        assert_eq!(serde_json::from_value::<Value>(json!(0)).unwrap(), Value::Zero);
        assert_eq!(serde_json::from_value::<Value>(json!(1)).unwrap(), Value::One);
        assert_eq!(serde_json::from_value::<Value>(json!("?")).unwrap(), Value::Maybe);

        assert!(serde_json::from_value::<Value>(json!(2)).is_err());
        assert!(serde_json::from_value::<Value>(json!("x")).is_err());
    }

    #[test]
    fn test_phase_encoding() {
        assert_eq!(serde_json::to_value(Phase::One).unwrap(), json!(1));
        assert_eq!(serde_json::from_value::<Phase>(json!(2)).unwrap(), Phase::Two);
        assert!(serde_json::from_value::<Phase>(json!(3)).is_err());
    }

    #[test]
    fn test_faulty_snapshot_is_null() {
        let snapshot = StateSnapshot::faulty(false);
        let encoded = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            encoded,
            json!({"killed": false, "x": null, "decided": null, "k": null})
        );
    }

    #[test]
    fn test_active_snapshot_round_trip() {
        let snapshot = StateSnapshot::active(false, Value::One, true, 3);
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let restored: StateSnapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(snapshot, restored);
    }
}
