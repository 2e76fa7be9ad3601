// Licensed under the Apache-2.0 license

//! Arbitrary-precision signed register values.

use crate::bitbuffer::BitBuffer;
use crate::error::ValueError;
use num_bigint::{BigInt, Sign};
use num_traits::{Num, One, Signed, ToPrimitive, Zero};
use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div, DivAssign,
    Mul, MulAssign, Neg, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub, SubAssign,
};
use std::str::FromStr;

/// An arbitrary-width signed integer.
///
/// Register contents, addresses and datatype domains are all `Value`s. Only
/// non-negative values have a [`BitBuffer`] form.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value(BigInt);

impl Value {
    pub fn zero() -> Self {
        Value(BigInt::zero())
    }

    pub fn one() -> Self {
        Value(BigInt::one())
    }

    /// `2^n`.
    pub fn pow2(n: u32) -> Self {
        Value(BigInt::one() << n)
    }

    /// A mask of the low `width` bits, `2^width - 1`.
    pub fn mask(width: u32) -> Self {
        Value((BigInt::one() << width) - BigInt::one())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Number of bits needed to hold the magnitude.
    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    /// Whether bit `n` is set (two's complement for negative values).
    pub fn bit(&self, n: u64) -> bool {
        self.0.bit(n)
    }

    pub fn pow(&self, exp: u32) -> Self {
        Value(self.0.pow(exp))
    }

    pub fn abs(&self) -> Self {
        Value(self.0.abs())
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    pub fn to_u32(&self) -> Option<u32> {
        self.0.to_u32()
    }

    pub fn to_str_radix(&self, radix: u32) -> String {
        self.0.to_str_radix(radix)
    }

    /// Parse a numeral: an optional sign, then `0x` hex, `0`-prefixed octal,
    /// or decimal.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let err = || ValueError::Parse(text.to_string());
        let trimmed = text.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (radix, digits) = if let Some(hex) = unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
        {
            (16, hex)
        } else if unsigned.len() > 1 && unsigned.starts_with('0') {
            (8, &unsigned[1..])
        } else {
            (10, unsigned)
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(err());
        }
        let magnitude = BigInt::from_str_radix(digits, radix).map_err(|_| err())?;
        Ok(Value(if negative { -magnitude } else { magnitude }))
    }

    /// Interpret the bytes of `buf` as a little-endian unsigned integer.
    pub fn from_bitbuffer(buf: &BitBuffer) -> Self {
        Value(BigInt::from_bytes_le(Sign::Plus, buf.as_bytes()))
    }

    /// Serialize to a little-endian buffer.
    ///
    /// With `bits == None` the buffer is exactly as wide as the value needs.
    /// Negative values and values wider than a requested `bits` are rejected.
    pub fn to_bitbuffer(&self, bits: Option<usize>) -> Result<BitBuffer, ValueError> {
        if self.is_negative() {
            return Err(ValueError::Negative(self.to_string()));
        }
        let needed = self.0.bits() as usize;
        let width = match bits {
            Some(bits) if needed > bits => {
                return Err(ValueError::Overflow {
                    value: self.to_string(),
                    bits,
                })
            }
            Some(bits) => bits,
            None => needed,
        };
        let (_, bytes) = self.0.to_bytes_le();
        Ok(BitBuffer::from_bytes(width, &bytes))
    }
}

impl FromStr for Value {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Value::parse(s)
    }
}

impl From<BigInt> for Value {
    fn from(val: BigInt) -> Self {
        Value(val)
    }
}

impl From<Value> for BigInt {
    fn from(val: Value) -> Self {
        val.0
    }
}

macro_rules! value_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(val: $t) -> Self {
                    Value(BigInt::from(val))
                }
            }
        )*
    };
}

value_from_primitive!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize
);

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::from(u8::from(val))
    }
}

macro_rules! value_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident) => {
        impl $trait for Value {
            type Output = Value;
            fn $method(self, rhs: Value) -> Value {
                Value($trait::$method(self.0, rhs.0))
            }
        }

        impl $trait<&Value> for Value {
            type Output = Value;
            fn $method(self, rhs: &Value) -> Value {
                Value($trait::$method(self.0, &rhs.0))
            }
        }

        impl $trait<&Value> for &Value {
            type Output = Value;
            fn $method(self, rhs: &Value) -> Value {
                Value($trait::$method(&self.0, &rhs.0))
            }
        }

        impl $assign_trait for Value {
            fn $assign_method(&mut self, rhs: Value) {
                $assign_trait::$assign_method(&mut self.0, rhs.0);
            }
        }

        impl $assign_trait<&Value> for Value {
            fn $assign_method(&mut self, rhs: &Value) {
                $assign_trait::$assign_method(&mut self.0, &rhs.0);
            }
        }
    };
}

value_binop!(Add, add, AddAssign, add_assign);
value_binop!(Sub, sub, SubAssign, sub_assign);
value_binop!(Mul, mul, MulAssign, mul_assign);
value_binop!(Div, div, DivAssign, div_assign);
value_binop!(Rem, rem, RemAssign, rem_assign);
value_binop!(BitAnd, bitand, BitAndAssign, bitand_assign);
value_binop!(BitOr, bitor, BitOrAssign, bitor_assign);
value_binop!(BitXor, bitxor, BitXorAssign, bitxor_assign);

macro_rules! value_shift {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident) => {
        impl $trait<u32> for Value {
            type Output = Value;
            fn $method(self, rhs: u32) -> Value {
                Value($trait::$method(self.0, rhs))
            }
        }

        impl $trait<u32> for &Value {
            type Output = Value;
            fn $method(self, rhs: u32) -> Value {
                Value($trait::$method(&self.0, rhs))
            }
        }

        impl $assign_trait<u32> for Value {
            fn $assign_method(&mut self, rhs: u32) {
                $assign_trait::$assign_method(&mut self.0, rhs);
            }
        }
    };
}

value_shift!(Shl, shl, ShlAssign, shl_assign);
value_shift!(Shr, shr, ShrAssign, shr_assign);

impl Neg for Value {
    type Output = Value;
    fn neg(self) -> Value {
        Value(-self.0)
    }
}

impl Neg for &Value {
    type Output = Value;
    fn neg(self) -> Value {
        Value(-&self.0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::UpperHex for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

impl fmt::Octal for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Octal::fmt(&self.0, f)
    }
}

impl fmt::Binary for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_radixes() {
        assert_eq!(Value::parse("18").unwrap(), Value::from(18));
        assert_eq!(Value::parse("0x12").unwrap(), Value::from(18));
        assert_eq!(Value::parse("0X1f").unwrap(), Value::from(31));
        assert_eq!(Value::parse("022").unwrap(), Value::from(18));
        assert_eq!(Value::parse("0").unwrap(), Value::zero());
        assert_eq!(Value::parse("-0x10").unwrap(), Value::from(-16));
        assert_eq!(Value::parse(" 7 ").unwrap(), Value::from(7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "-", "0x", "abc", "08", "1_000", "12z", "--1"] {
            assert!(Value::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_parse_wide() {
        let v = Value::parse("0x1_0000_0000_0000_0000");
        assert!(v.is_err());
        let v = Value::parse("0x10000000000000000").unwrap();
        assert_eq!(v, Value::pow2(64));
        assert_eq!(v.bits(), 65);
    }

    #[test]
    fn test_operators() {
        let a = Value::from(0x2211);
        let b = Value::from(0x0f0f);
        assert_eq!(&a & &b, Value::from(0x0201));
        assert_eq!(&a | &b, Value::from(0x2f1f));
        assert_eq!(&a ^ &b, Value::from(0x2d1e));
        assert_eq!(&a >> 8, Value::from(0x22));
        assert_eq!(&a << 4, Value::from(0x22110));
        assert_eq!(&a - &b, Value::from(0x2211 - 0x0f0f));
        assert_eq!(-&a, Value::from(-0x2211));
        let mut c = a.clone();
        c += Value::one();
        c <<= 1;
        assert_eq!(c, Value::from(0x4424));
    }

    #[test]
    fn test_mask_and_bits() {
        assert_eq!(Value::mask(0), Value::zero());
        assert_eq!(Value::mask(8), Value::from(0xff));
        assert_eq!(Value::mask(70).bits(), 70);
        assert!(Value::from(0x10).bit(4));
        assert!(!Value::from(0x10).bit(3));
    }

    #[test]
    fn test_formatting() {
        let v = Value::from(255);
        assert_eq!(v.to_string(), "255");
        assert_eq!(format!("{v:x}"), "ff");
        assert_eq!(format!("{v:X}"), "FF");
        assert_eq!(format!("{v:o}"), "377");
        assert_eq!(v.to_str_radix(2), "11111111");
    }

    #[test]
    fn test_bitbuffer_roundtrip() {
        for v in [0u128, 1, 0xff, 0x100, 0x1_0000_0000, u128::MAX] {
            let v = Value::from(v);
            let buf = v.to_bitbuffer(None).unwrap();
            assert_eq!(buf.bits() as u64, v.bits());
            assert_eq!(Value::from_bitbuffer(&buf), v);
        }
    }

    #[test]
    fn test_bitbuffer_fixed_width() {
        let v = Value::from(0x1234);
        let buf = v.to_bitbuffer(Some(32)).unwrap();
        assert_eq!(buf.as_bytes(), &[0x34, 0x12, 0, 0]);
        assert_eq!(Value::from_bitbuffer(&buf), v);
        assert!(matches!(
            v.to_bitbuffer(Some(8)),
            Err(ValueError::Overflow { bits: 8, .. })
        ));
    }

    #[test]
    fn test_bitbuffer_rejects_negative() {
        assert!(matches!(
            Value::from(-1).to_bitbuffer(None),
            Err(ValueError::Negative(_))
        ));
    }
}
