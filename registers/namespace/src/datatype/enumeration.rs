// Licensed under the Apache-2.0 license

use super::unknown;
use crate::error::DatatypeError;
use crate::value::Value;

/// A name <-> value table in declaration order.
///
/// Names are unique; declaring a name twice is an authoring bug and panics.
#[derive(Clone, Debug, Default)]
pub struct EnumDatatype {
    entries: Vec<(String, Value)>,
    unknown: Option<String>,
}

impl EnumDatatype {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`EnumDatatype::add_value`].
    pub fn value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.add_value(name, value);
        self
    }

    /// Render unmatched values as `name` instead of the unknown marker.
    pub fn with_unknown(mut self, name: impl Into<String>) -> Self {
        self.unknown = Some(name.into());
        self
    }

    /// # Panics
    ///
    /// Panics if `name` is already declared.
    pub fn add_value(&mut self, name: &str, value: impl Into<Value>) {
        assert!(
            !self.entries.iter().any(|(n, _)| n == name),
            "duplicate enum name '{name}'"
        );
        self.entries.push((name.to_string(), value.into()));
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn evaluate(&self, value: &Value) -> String {
        match self.entries.iter().find(|(_, v)| v == value) {
            Some((name, _)) => name.clone(),
            None => self.unknown.clone().unwrap_or_else(|| unknown(value)),
        }
    }

    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        self.entries
            .iter()
            .find(|(name, _)| name == text)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| DatatypeError::invalid("enum", text))
    }

    pub fn lookup_value(&self, value: &Value) -> Result<Value, DatatypeError> {
        if self.entries.iter().any(|(_, v)| v == value) {
            Ok(value.clone())
        } else {
            Err(DatatypeError::invalid("enum", value))
        }
    }
}

/// A two-entry enum where any nonzero value counts as true.
#[derive(Clone, Debug)]
pub struct BoolDatatype {
    table: EnumDatatype,
}

impl BoolDatatype {
    pub fn new(true_name: &str, false_name: &str) -> Self {
        Self {
            table: EnumDatatype::new().value(true_name, 1).value(false_name, 0),
        }
    }

    pub fn yes_no() -> Self {
        Self::new("yes", "no")
    }

    pub fn true_false() -> Self {
        Self::new("true", "false")
    }

    pub fn on_off() -> Self {
        Self::new("on", "off")
    }

    pub fn enabled_disabled() -> Self {
        Self::new("enabled", "disabled")
    }

    pub fn evaluate(&self, value: &Value) -> String {
        self.table.evaluate(&self.lookup_value(value))
    }

    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        self.table
            .lookup(text)
            .map_err(|_| DatatypeError::invalid("bool", text))
    }

    pub fn lookup_value(&self, value: &Value) -> Value {
        if value.is_zero() {
            Value::zero()
        } else {
            Value::one()
        }
    }
}

/// Names for individual bits.
///
/// String lookup resolves a single declared name to its bit's value; lists
/// of names are not parsed.
#[derive(Clone, Debug, Default)]
pub struct BitmaskDatatype {
    bits: Vec<(String, u32)>,
}

impl BitmaskDatatype {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`BitmaskDatatype::add_bit`].
    pub fn bit(mut self, name: &str, bit: u32) -> Self {
        self.add_bit(name, bit);
        self
    }

    /// # Panics
    ///
    /// Panics if `name` is already declared.
    pub fn add_bit(&mut self, name: &str, bit: u32) {
        assert!(
            !self.bits.iter().any(|(n, _)| n == name),
            "duplicate bitmask name '{name}'"
        );
        self.bits.push((name.to_string(), bit));
    }

    pub fn bits(&self) -> &[(String, u32)] {
        &self.bits
    }

    /// Names of set bits from lowest to highest, then an unknown marker for
    /// every set bit without a name.
    pub fn evaluate(&self, value: &Value) -> String {
        let mut declared: Vec<&(String, u32)> = self.bits.iter().collect();
        declared.sort_by_key(|(_, bit)| *bit);

        let mut words: Vec<String> = declared
            .iter()
            .filter(|(_, bit)| value.bit(u64::from(*bit)))
            .map(|(name, _)| name.clone())
            .collect();

        let mut rest = value.abs();
        let mut bit = 0u64;
        while !rest.is_zero() {
            if rest.bit(0) && !self.bits.iter().any(|(_, b)| u64::from(*b) == bit) {
                words.push(unknown(bit));
            }
            rest >>= 1;
            bit += 1;
        }
        words.join(" ")
    }

    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        self.bits
            .iter()
            .find(|(name, _)| name == text)
            .map(|(_, bit)| Value::pow2(*bit))
            .ok_or_else(|| DatatypeError::invalid("bitmask", text))
    }

    pub fn lookup_value(&self, value: &Value) -> Result<Value, DatatypeError> {
        if value.is_negative() {
            Err(DatatypeError::invalid("bitmask", value))
        } else {
            Ok(value.clone())
        }
    }
}
