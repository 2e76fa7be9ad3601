// Licensed under the Apache-2.0 license

//! Value encodings.
//!
//! A [`Datatype`] converts raw register [`Value`]s to display strings
//! (`evaluate`) and back (`lookup`). The set of encodings is closed:
//!
//! | Variant     | Renders                                   |
//! |-------------|-------------------------------------------|
//! | `Int`       | decimal, optional units                   |
//! | `Hex`       | zero-padded `0x` hex                      |
//! | `Bool`      | one of two names                          |
//! | `Enum`      | a declared name per value                 |
//! | `Bitmask`   | space-separated names of set bits         |
//! | `Multi`     | dispatches on value range                 |
//! | `String`    | value bytes as little-endian text         |
//! | `Fixed`     | fixed-point decimal                       |
//! | `Transform` | another datatype after a decode function  |
//!
//! Values a datatype cannot name render as an unknown marker, `<!N!>`.

mod enumeration;
mod multi;
mod numeric;
mod text;
mod transform;

pub use enumeration::{BitmaskDatatype, BoolDatatype, EnumDatatype};
pub use multi::{MultiDatatype, MultiRange};
pub use numeric::{FixedDatatype, HexDatatype, IntDatatype};
pub use text::StringDatatype;
pub use transform::{TransformDatatype, TransformFn};

use crate::error::DatatypeError;
use crate::value::Value;
use std::fmt;

/// Render the marker for a value a datatype has no name for.
pub(crate) fn unknown(value: impl fmt::Display) -> String {
    format!("<!{value}!>")
}

/// The right-hand side of a lookup, compare or test: display text or a raw value.
#[derive(Clone, Copy, Debug)]
pub enum Operand<'a> {
    Str(&'a str),
    Value(&'a Value),
}

impl<'a> From<&'a str> for Operand<'a> {
    fn from(s: &'a str) -> Self {
        Operand::Str(s)
    }
}

impl<'a> From<&'a String> for Operand<'a> {
    fn from(s: &'a String) -> Self {
        Operand::Str(s)
    }
}

impl<'a> From<&'a Value> for Operand<'a> {
    fn from(v: &'a Value) -> Self {
        Operand::Value(v)
    }
}

#[derive(Clone, Debug)]
pub enum Datatype {
    Int(IntDatatype),
    Hex(HexDatatype),
    Bool(BoolDatatype),
    Enum(EnumDatatype),
    Bitmask(BitmaskDatatype),
    Multi(MultiDatatype),
    String(StringDatatype),
    Fixed(FixedDatatype),
    Transform(TransformDatatype),
}

impl Datatype {
    /// Short kind name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Datatype::Int(_) => "int",
            Datatype::Hex(_) => "hex",
            Datatype::Bool(_) => "bool",
            Datatype::Enum(_) => "enum",
            Datatype::Bitmask(_) => "bitmask",
            Datatype::Multi(_) => "multi",
            Datatype::String(_) => "string",
            Datatype::Fixed(_) => "fixed",
            Datatype::Transform(_) => "transform",
        }
    }

    /// Render `value` for display.
    pub fn evaluate(&self, value: &Value) -> String {
        match self {
            Datatype::Int(dt) => dt.evaluate(value),
            Datatype::Hex(dt) => dt.evaluate(value),
            Datatype::Bool(dt) => dt.evaluate(value),
            Datatype::Enum(dt) => dt.evaluate(value),
            Datatype::Bitmask(dt) => dt.evaluate(value),
            Datatype::Multi(dt) => dt.evaluate(value),
            Datatype::String(dt) => dt.evaluate(value),
            Datatype::Fixed(dt) => dt.evaluate(value),
            Datatype::Transform(dt) => dt.evaluate(value),
        }
    }

    /// Convert display text to a raw value.
    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        match self {
            Datatype::Int(dt) => dt.lookup(text),
            Datatype::Hex(dt) => dt.lookup(text),
            Datatype::Bool(dt) => dt.lookup(text),
            Datatype::Enum(dt) => dt.lookup(text),
            Datatype::Bitmask(dt) => dt.lookup(text),
            Datatype::Multi(dt) => dt.lookup(text),
            Datatype::String(dt) => dt.lookup(text),
            Datatype::Fixed(dt) => dt.lookup(text),
            Datatype::Transform(dt) => dt.lookup(text),
        }
    }

    /// Validate (and for some encodings normalize) a raw value.
    pub fn lookup_value(&self, value: &Value) -> Result<Value, DatatypeError> {
        match self {
            Datatype::Int(_) | Datatype::Hex(_) | Datatype::Fixed(_) => Ok(value.clone()),
            Datatype::Bool(dt) => Ok(dt.lookup_value(value)),
            Datatype::Enum(dt) => dt.lookup_value(value),
            Datatype::Bitmask(dt) => dt.lookup_value(value),
            Datatype::Multi(dt) => dt.lookup_value(value),
            Datatype::String(dt) => dt.lookup_value(value),
            Datatype::Transform(dt) => dt.lookup_value(value),
        }
    }

    pub fn lookup_operand(&self, operand: Operand<'_>) -> Result<Value, DatatypeError> {
        match operand {
            Operand::Str(text) => self.lookup(text),
            Operand::Value(value) => self.lookup_value(value),
        }
    }

    /// `lhs - lookup(rhs)`: zero when equal, sign gives ordering.
    pub fn compare<'a>(
        &self,
        lhs: &Value,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Value, DatatypeError> {
        Ok(lhs - &self.lookup_operand(rhs.into())?)
    }

    /// `lhs & lookup(rhs)`: nonzero when any looked-up bit is set.
    pub fn test<'a>(
        &self,
        lhs: &Value,
        rhs: impl Into<Operand<'a>>,
    ) -> Result<Value, DatatypeError> {
        Ok(lhs & &self.lookup_operand(rhs.into())?)
    }
}

macro_rules! datatype_from {
    ($($variant:ident($t:ty)),* $(,)?) => {
        $(
            impl From<$t> for Datatype {
                fn from(dt: $t) -> Self {
                    Datatype::$variant(dt)
                }
            }
        )*
    };
}

datatype_from!(
    Int(IntDatatype),
    Hex(HexDatatype),
    Bool(BoolDatatype),
    Enum(EnumDatatype),
    Bitmask(BitmaskDatatype),
    Multi(MultiDatatype),
    String(StringDatatype),
    Fixed(FixedDatatype),
    Transform(TransformDatatype),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_and_test_defaults() {
        let dt: Datatype = EnumDatatype::new().value("low", 1).value("high", 4).into();
        let v = Value::from(4);
        assert!(dt.compare(&v, "high").unwrap().is_zero());
        assert!(dt.compare(&v, "low").unwrap() > Value::zero());
        assert_eq!(dt.test(&Value::from(5), "high").unwrap(), Value::from(4));
        assert!(dt.test(&Value::from(5), &Value::from(2)).is_err());
        assert!(dt.compare(&v, "medium").is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(Datatype::from(IntDatatype::new()).name(), "int");
        assert_eq!(Datatype::from(StringDatatype::new()).name(), "string");
    }

    #[test]
    fn test_unknown_marker() {
        assert_eq!(unknown(7), "<!7!>");
    }
}
