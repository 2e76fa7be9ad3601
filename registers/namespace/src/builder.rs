// Licensed under the Apache-2.0 license

//! Cursor-based namespace construction.
//!
//! [`NamespaceBuilder`] keeps a stack of open scopes. Every definition lands
//! in the innermost open scope, and registers pick up the binding of the
//! nearest bound scope.
//!
//! ```
//! use registers_namespace::{AliasMode, IntDatatype, NamespaceBuilder, SimBinding};
//! use std::rc::Rc;
//!
//! let mut b = NamespaceBuilder::new();
//! b.open_bound_scope("dev", Rc::new(SimBinding::new("dev")))?;
//! b.reg("%status", 0x4, 16)?;
//! let count = b.define_datatype("count", IntDatatype::new())?;
//! let bits = b.bits("%status", 7, 0)?;
//! b.field("errors", count, bits)?;
//! b.close_scope()?;
//! let ns = b.finish();
//! assert!(ns.lookup_str(ns.root(), "dev/errors", AliasMode::Follow)?.is_some());
//! # Ok::<(), registers_namespace::NamespaceError>(())
//! ```

use crate::binding::{Binding, BitWidth};
use crate::config::NamespaceConfig;
use crate::datatype::Datatype;
use crate::dirent::{DirentId, Field, Procedures, Register, Scope};
use crate::error::{NamespaceError, PathError, Result};
use crate::namespace::{AliasMode, Namespace};
use crate::path::Path;
use crate::regbits::RegBits;
use crate::value::Value;
use std::rc::Rc;

pub struct NamespaceBuilder {
    ns: Namespace,
    cursor: Vec<DirentId>,
}

impl Default for NamespaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceBuilder {
    pub fn new() -> Self {
        Self::with_config(NamespaceConfig::default())
    }

    pub fn with_config(config: NamespaceConfig) -> Self {
        let ns = Namespace::with_config(config);
        let root = ns.root();
        Self {
            ns,
            cursor: vec![root],
        }
    }

    /// The namespace built so far.
    pub fn namespace(&self) -> &Namespace {
        &self.ns
    }

    /// The innermost open scope.
    pub fn cursor(&self) -> DirentId {
        self.cursor.last().copied().unwrap_or(self.ns.root())
    }

    /// Number of scopes open below the root.
    pub fn depth(&self) -> usize {
        self.cursor.len() - 1
    }

    /// Bind the current scope to a register space.
    pub fn bind(&mut self, binding: Rc<dyn Binding>) -> Result<()> {
        let cursor = self.cursor();
        self.ns.bind(cursor, binding)
    }

    /// Add a scope under `name` (or append to `name[]`) and make it current.
    pub fn open_scope(&mut self, name: &str) -> Result<DirentId> {
        let cursor = self.cursor();
        let id = self.ns.add_named(cursor, name, Scope::new().into())?;
        self.cursor.push(id);
        Ok(id)
    }

    pub fn open_bound_scope(&mut self, name: &str, binding: Rc<dyn Binding>) -> Result<DirentId> {
        let cursor = self.cursor();
        let id = self
            .ns
            .add_named(cursor, name, Scope::with_binding(binding).into())?;
        self.cursor.push(id);
        Ok(id)
    }

    /// Close the current scope, returning to its parent.
    pub fn close_scope(&mut self) -> Result<DirentId> {
        if self.cursor.len() <= 1 {
            return Err(NamespaceError::construction("cannot close the root scope"));
        }
        let closed = self.cursor.pop();
        Ok(closed.unwrap_or(self.ns.root()))
    }

    /// A register at `address` in the nearest bound scope's register space.
    pub fn reg(
        &mut self,
        name: &str,
        address: impl Into<Value>,
        width: BitWidth,
    ) -> Result<DirentId> {
        let cursor = self.cursor();
        let binding = self.ns.binding(cursor).ok_or_else(|| {
            NamespaceError::construction(format!(
                "register '{name}' at {} has no binding in scope",
                self.ns.path_of(cursor)
            ))
        })?;
        let register = Register::bound(binding, address, width);
        self.ns.add_named(cursor, name, register.into())
    }

    pub fn proc_reg(&mut self, name: &str, width: BitWidth, procs: Procedures) -> Result<DirentId> {
        let cursor = self.cursor();
        self.ns
            .add_named(cursor, name, Register::proc(procs, cursor, width).into())
    }

    pub fn field(&mut self, name: &str, datatype: Rc<Datatype>, bits: RegBits) -> Result<DirentId> {
        let cursor = self.cursor();
        self.ns
            .add_named(cursor, name, Field::direct(datatype, bits).into())
    }

    pub fn proc_field(
        &mut self,
        name: &str,
        datatype: Rc<Datatype>,
        procs: Procedures,
    ) -> Result<DirentId> {
        let cursor = self.cursor();
        self.ns
            .add_named(cursor, name, Field::proc(datatype, procs, cursor).into())
    }

    pub fn constant_field(
        &mut self,
        name: &str,
        datatype: Rc<Datatype>,
        value: impl Into<Value>,
    ) -> Result<DirentId> {
        let cursor = self.cursor();
        self.ns
            .add_named(cursor, name, Field::constant(datatype, value).into())
    }

    /// An alias to `target`, which must already resolve from the current scope.
    pub fn alias(&mut self, name: &str, target: &str) -> Result<DirentId> {
        let cursor = self.cursor();
        let alias = self.ns.new_alias(cursor, &Path::parse(target)?)?;
        self.ns.add_named(cursor, name, alias.into())
    }

    pub fn bookmark(&mut self, name: &str) -> Result<()> {
        let cursor = self.cursor();
        self.ns.add_bookmark(cursor, name)
    }

    /// Declare a datatype in the current scope, visible to its descendants.
    pub fn define_datatype(
        &mut self,
        name: &str,
        datatype: impl Into<Datatype>,
    ) -> Result<Rc<Datatype>> {
        let cursor = self.cursor();
        let datatype = Rc::new(datatype.into());
        self.ns.add_datatype(cursor, name, datatype.clone())?;
        Ok(datatype)
    }

    /// The nearest declaration of datatype `name`.
    pub fn datatype(&self, name: &str) -> Result<Rc<Datatype>> {
        self.ns.find_datatype(self.cursor(), name).ok_or_else(|| {
            NamespaceError::construction(format!(
                "no datatype '{name}' visible from {}",
                self.ns.path_of(self.cursor())
            ))
        })
    }

    /// Bits `hi..=lo` of the register at `path`, relative to the current scope.
    pub fn bits(&self, path: &str, hi: BitWidth, lo: BitWidth) -> Result<RegBits> {
        let register = self
            .ns
            .lookup(self.cursor(), &Path::parse(path)?, AliasMode::Follow)?
            .ok_or_else(|| PathError::NotFound(path.to_string()))?;
        RegBits::new(&self.ns, register, hi, lo)
    }

    pub fn finish(self) -> Namespace {
        self.ns
    }
}
