// Licensed under the Apache-2.0 license

//! Bit ranges within registers.

use crate::binding::BitWidth;
use crate::dirent::{DirentId, Register};
use crate::error::{NamespaceError, Result};
use crate::namespace::Namespace;
use crate::value::Value;
use std::ops::{Add, AddAssign};

/// An ordered set of register bit ranges read and written as one value.
///
/// A composite is most-significant part first: `hi_part + lo_part` reads as
/// `hi_part << lo_part.width() | lo_part`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegBits {
    Simple {
        register: DirentId,
        hi: BitWidth,
        lo: BitWidth,
    },
    Composite(Vec<RegBits>),
}

fn register_of(ns: &Namespace, id: DirentId) -> Result<&Register> {
    ns.get(id)
        .and_then(|d| d.as_register())
        .ok_or_else(|| NamespaceError::conversion(format!("{} is not a register", ns.path_of(id))))
}

impl RegBits {
    /// Bits `hi..=lo` of `register`.
    pub fn new(ns: &Namespace, register: DirentId, hi: BitWidth, lo: BitWidth) -> Result<Self> {
        let width = register_of(ns, register)?.width();
        if hi < lo || hi >= width {
            return Err(NamespaceError::range(format!(
                "bits [{hi}:{lo}] do not fit {width}-bit register {}",
                ns.path_of(register)
            )));
        }
        Ok(RegBits::Simple { register, hi, lo })
    }

    /// Every bit of `register`.
    pub fn whole(ns: &Namespace, register: DirentId) -> Result<Self> {
        let width = register_of(ns, register)?.width();
        if width == 0 {
            return Err(NamespaceError::range(format!(
                "register {} has no bits",
                ns.path_of(register)
            )));
        }
        Self::new(ns, register, width - 1, 0)
    }

    pub fn width(&self) -> BitWidth {
        match self {
            RegBits::Simple { hi, lo, .. } => hi - lo + 1,
            RegBits::Composite(parts) => parts.iter().map(RegBits::width).sum(),
        }
    }

    pub fn read(&self, ns: &Namespace) -> Result<Value> {
        match self {
            RegBits::Simple { register, hi, lo } => {
                let raw = register_of(ns, *register)?.read(ns)?;
                Ok((raw >> *lo) & Value::mask(hi - lo + 1))
            }
            RegBits::Composite(parts) => parts.iter().try_fold(Value::zero(), |acc, part| {
                Ok((acc << part.width()) | part.read(ns)?)
            }),
        }
    }

    /// Read-modify-write; bits outside the range keep their current value.
    pub fn write(&self, ns: &Namespace, value: &Value) -> Result<()> {
        match self {
            RegBits::Simple { register, hi, lo } => {
                let reg = register_of(ns, *register)?;
                let mask = Value::mask(hi - lo + 1);
                let shifted_mask = &mask << *lo;
                let current = reg.read(ns)?;
                let cleared = &current ^ &(&current & &shifted_mask);
                let update = (value & &mask) << *lo;
                reg.write(ns, &(cleared | update))
            }
            RegBits::Composite(parts) => {
                let mut rest = value.clone();
                for part in parts.iter().rev() {
                    let width = part.width();
                    part.write(ns, &(&rest & &Value::mask(width)))?;
                    rest >>= width;
                }
                Ok(())
            }
        }
    }

    /// Registers touched, most significant part first.
    pub fn registers(&self) -> Vec<DirentId> {
        match self {
            RegBits::Simple { register, .. } => vec![*register],
            RegBits::Composite(parts) => parts.iter().flat_map(RegBits::registers).collect(),
        }
    }
}

impl Add for RegBits {
    type Output = RegBits;

    /// `self` becomes the more significant part.
    fn add(mut self, rhs: RegBits) -> RegBits {
        self += rhs;
        self
    }
}

impl AddAssign for RegBits {
    fn add_assign(&mut self, rhs: RegBits) {
        if let RegBits::Simple { .. } = self {
            let simple = std::mem::replace(self, RegBits::Composite(Vec::new()));
            if let RegBits::Composite(parts) = self {
                parts.push(simple);
            }
        }
        if let RegBits::Composite(parts) = self {
            parts.push(rhs);
        }
    }
}
