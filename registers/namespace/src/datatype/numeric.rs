// Licensed under the Apache-2.0 license

use crate::binding::BitWidth;
use crate::error::DatatypeError;
use crate::value::Value;

fn with_units(rendered: String, units: &Option<String>) -> String {
    match units {
        Some(units) => format!("{rendered} {units}"),
        None => rendered,
    }
}

fn strip_units<'a>(text: &'a str, units: &Option<String>) -> &'a str {
    let text = text.trim();
    match units {
        Some(units) => match text.strip_suffix(units.as_str()) {
            Some(number) => number.trim_end(),
            None => text,
        },
        None => text,
    }
}

fn parse_numeral(datatype: &'static str, text: &str) -> Result<Value, DatatypeError> {
    Value::parse(text).map_err(|_| DatatypeError::invalid(datatype, text))
}

/// Plain decimal integers.
#[derive(Clone, Debug, Default)]
pub struct IntDatatype {
    units: Option<String>,
}

impl IntDatatype {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(units: impl Into<String>) -> Self {
        Self {
            units: Some(units.into()),
        }
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn evaluate(&self, value: &Value) -> String {
        with_units(value.to_string(), &self.units)
    }

    /// Parse a decimal, `0x` hex or `0`-octal numeral, with optional units.
    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        parse_numeral("int", strip_units(text, &self.units))
    }
}

/// Integers rendered as zero-padded hex.
#[derive(Clone, Debug, Default)]
pub struct HexDatatype {
    width: BitWidth,
    units: Option<String>,
}

impl HexDatatype {
    /// Pad to the digit count of a `width`-bit value; `0` means no padding.
    pub fn new(width: BitWidth) -> Self {
        Self { width, units: None }
    }

    pub fn with_units(width: BitWidth, units: impl Into<String>) -> Self {
        Self {
            width,
            units: Some(units.into()),
        }
    }

    pub fn width(&self) -> BitWidth {
        self.width
    }

    pub fn evaluate(&self, value: &Value) -> String {
        let digits = value.abs().to_str_radix(16);
        let pad = ((self.width as usize + 3) / 4).saturating_sub(digits.len());
        let sign = if value.is_negative() { "-" } else { "" };
        with_units(format!("{sign}0x{}{digits}", "0".repeat(pad)), &self.units)
    }

    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        parse_numeral("hex", strip_units(text, &self.units))
    }
}

/// Unsigned fixed-point numbers with `frac_bits` fractional bits.
#[derive(Clone, Debug)]
pub struct FixedDatatype {
    frac_bits: u32,
    units: Option<String>,
}

impl FixedDatatype {
    pub fn new(frac_bits: u32) -> Self {
        Self {
            frac_bits,
            units: None,
        }
    }

    pub fn with_units(frac_bits: u32, units: impl Into<String>) -> Self {
        Self {
            frac_bits,
            units: Some(units.into()),
        }
    }

    pub fn frac_bits(&self) -> u32 {
        self.frac_bits
    }

    /// Render as `I.F` with trailing zero digits of `F` trimmed (at least one
    /// digit is kept).
    pub fn evaluate(&self, value: &Value) -> String {
        let n = self.frac_bits;
        let magnitude = value.abs();
        let integral = &magnitude >> n;
        let mut out = format!("{}{integral}", if value.is_negative() { "-" } else { "" });
        if n > 0 {
            let frac = &magnitude & &Value::mask(n);
            // frac / 2^n has exactly n decimal digits.
            let scaled = (frac * Value::from(10u32).pow(n)) / Value::pow2(n);
            let digits = format!("{:0>width$}", scaled.to_string(), width = n as usize);
            let trimmed = digits.trim_end_matches('0');
            out.push('.');
            out.push_str(if trimmed.is_empty() { "0" } else { trimmed });
        }
        with_units(out, &self.units)
    }

    /// Parse `[-]I[.F]`, rounding to the nearest representable raw value.
    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        let invalid = || DatatypeError::invalid("fixed", text);
        let body = strip_units(text, &self.units);
        let (negative, body) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
            return Err(invalid());
        }
        if body.ends_with('.') {
            return Err(invalid());
        }

        let digits = format!("{int_part}{frac_part}");
        let scaled = Value::parse(digits.trim_start_matches('0'))
            .unwrap_or_else(|_| Value::zero());
        let denominator = Value::from(10u32).pow(frac_part.len() as u32);
        let numerator = scaled * Value::pow2(self.frac_bits);
        // Round half up.
        let raw = (numerator * Value::from(2) + &denominator) / (denominator * Value::from(2));
        Ok(if negative { -raw } else { raw })
    }
}
