// Licensed under the Apache-2.0 license

use super::unknown;
use crate::bitbuffer::BitBuffer;
use crate::error::DatatypeError;
use crate::value::Value;

/// Values holding a little-endian byte string, lowest byte first.
///
/// Each byte maps to the char with the same code point, so non-printing
/// bytes survive a round trip unchanged.
#[derive(Clone, Debug, Default)]
pub struct StringDatatype;

impl StringDatatype {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, value: &Value) -> String {
        match value.to_bitbuffer(None) {
            Ok(buf) => buf.as_bytes().iter().map(|&b| char::from(b)).collect(),
            Err(_) => unknown(value),
        }
    }

    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        let bytes = text
            .chars()
            .map(|c| u8::try_from(c).map_err(|_| DatatypeError::invalid("string", text)))
            .collect::<Result<Vec<u8>, _>>()?;
        Ok(Value::from_bitbuffer(&BitBuffer::from_bytes(
            bytes.len() * 8,
            &bytes,
        )))
    }

    pub fn lookup_value(&self, value: &Value) -> Result<Value, DatatypeError> {
        if value.is_negative() {
            Err(DatatypeError::invalid("string", value))
        } else {
            Ok(value.clone())
        }
    }
}
