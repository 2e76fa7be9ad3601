// Licensed under the Apache-2.0 license

//! Register-space bindings.
//!
//! A [`Binding`] is the accessor for one physical register space (PCI config
//! space, I/O ports, MSRs, ...). Bound registers call into it with an address
//! and a width. Concrete hardware drivers live outside this crate;
//! [`SimBinding`] is an in-memory register space for tests and tooling.

use crate::bitbuffer::BitBuffer;
use crate::error::BindingError;
use crate::value::Value;
use log::trace;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

/// Width of a register access in bits.
pub type BitWidth = u32;

/// Accessor for a register space.
///
/// Methods take `&self`: hardware access is not a mutation of the namespace,
/// so implementations use interior mutability where they keep state.
pub trait Binding: fmt::Display {
    /// Read `width` bits at `address`.
    fn read(&self, address: &Value, width: BitWidth) -> Result<Value, BindingError>;

    /// Write the low `width` bits of `value` at `address`.
    fn write(&self, address: &Value, width: BitWidth, value: &Value) -> Result<(), BindingError>;
}

/// An in-memory register space.
///
/// Addresses never written read back as the fill byte repeated across the
/// access width.
pub struct SimBinding {
    name: String,
    fill: u8,
    limit: Option<Value>,
    read_only: bool,
    cells: RefCell<BTreeMap<Value, Value>>,
}

impl SimBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fill: 0,
            limit: None,
            read_only: false,
            cells: RefCell::new(BTreeMap::new()),
        }
    }

    /// Set the byte pattern returned for unwritten addresses.
    pub fn with_fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    /// Reject addresses at or above `limit`.
    pub fn with_limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Reject all writes.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// The stored value at `address`, if it was ever written.
    pub fn peek(&self, address: &Value) -> Option<Value> {
        self.cells.borrow().get(address).cloned()
    }

    /// Store `value` at `address` without width masking or access checks.
    pub fn poke(&self, address: impl Into<Value>, value: impl Into<Value>) {
        self.cells.borrow_mut().insert(address.into(), value.into());
    }

    fn check_access(&self, address: &Value, width: BitWidth) -> Result<(), BindingError> {
        if width == 0 {
            return Err(BindingError::Args(format!("{}: zero-width access", self.name)));
        }
        if address.is_negative() {
            return Err(BindingError::Args(format!(
                "{}: negative address {address}",
                self.name
            )));
        }
        if let Some(limit) = &self.limit {
            if address >= limit {
                return Err(BindingError::Args(format!(
                    "{}: address 0x{address:x} beyond limit 0x{limit:x}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

impl Binding for SimBinding {
    fn read(&self, address: &Value, width: BitWidth) -> Result<Value, BindingError> {
        self.check_access(address, width)?;
        let raw = match self.cells.borrow().get(address) {
            Some(value) => value.clone(),
            None => Value::from_bitbuffer(&BitBuffer::with_fill(width as usize, self.fill)),
        };
        let value = raw & Value::mask(width);
        trace!("{}: read{width} 0x{address:x} -> 0x{value:x}", self.name);
        Ok(value)
    }

    fn write(&self, address: &Value, width: BitWidth, value: &Value) -> Result<(), BindingError> {
        self.check_access(address, width)?;
        if self.read_only {
            return Err(BindingError::NotSupported(format!(
                "{}: write to read-only space",
                self.name
            )));
        }
        let value = value & &Value::mask(width);
        trace!("{}: write{width} 0x{address:x} <- 0x{value:x}", self.name);
        self.cells.borrow_mut().insert(address.clone(), value);
        Ok(())
    }
}

impl fmt::Display for SimBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sim:{}", self.name)
    }
}
