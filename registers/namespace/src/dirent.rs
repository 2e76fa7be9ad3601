// Licensed under the Apache-2.0 license

//! Namespace nodes.
//!
//! Every node in the tree is a [`Dirent`]: a register, a field, a scope, an
//! array of like-kinded dirents, or an alias to another path. Dirents live in
//! the [`Namespace`] arena and refer to each other by [`DirentId`].

use crate::binding::{Binding, BitWidth};
use crate::datatype::{Datatype, Operand};
use crate::error::{BindingError, NamespaceError, Result};
use crate::namespace::Namespace;
use crate::path::Path;
use crate::regbits::RegBits;
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Index into the namespace arena.
pub type DirentId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirentKind {
    Register,
    Field,
    Scope,
    Array,
    Alias,
}

impl fmt::Display for DirentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DirentKind::Register => "register",
            DirentKind::Field => "field",
            DirentKind::Scope => "scope",
            DirentKind::Array => "array",
            DirentKind::Alias => "alias",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum Dirent {
    Register(Register),
    Field(Field),
    Scope(Scope),
    Array(Array),
    Alias(Alias),
}

impl Dirent {
    pub fn kind(&self) -> DirentKind {
        match self {
            Dirent::Register(_) => DirentKind::Register,
            Dirent::Field(_) => DirentKind::Field,
            Dirent::Scope(_) => DirentKind::Scope,
            Dirent::Array(_) => DirentKind::Array,
            Dirent::Alias(_) => DirentKind::Alias,
        }
    }

    pub fn as_register(&self) -> Option<&Register> {
        if let Dirent::Register(reg) = self {
            Some(reg)
        } else {
            None
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        if let Dirent::Field(field) = self {
            Some(field)
        } else {
            None
        }
    }

    pub fn as_scope(&self) -> Option<&Scope> {
        if let Dirent::Scope(scope) = self {
            Some(scope)
        } else {
            None
        }
    }

    pub fn as_scope_mut(&mut self) -> Option<&mut Scope> {
        if let Dirent::Scope(scope) = self {
            Some(scope)
        } else {
            None
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        if let Dirent::Array(array) = self {
            Some(array)
        } else {
            None
        }
    }

    pub fn as_alias(&self) -> Option<&Alias> {
        if let Dirent::Alias(alias) = self {
            Some(alias)
        } else {
            None
        }
    }
}

macro_rules! dirent_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Dirent {
                fn from(d: $variant) -> Self {
                    Dirent::$variant(d)
                }
            }
        )*
    };
}

dirent_from!(Register, Field, Scope, Array, Alias);

//=============================================================================
// Procedures
//=============================================================================

pub type ReadProc = Rc<dyn Fn(&Namespace, DirentId) -> Result<Value>>;
pub type WriteProc = Rc<dyn Fn(&Namespace, DirentId, &Value) -> Result<()>>;

/// Read/write procedures for procedure-backed registers and fields.
///
/// Both receive the namespace and the scope the dirent was defined in, so
/// they can resolve names relative to their definition site.
#[derive(Clone)]
pub struct Procedures {
    read: ReadProc,
    write: WriteProc,
}

impl Procedures {
    pub fn new(
        read: impl Fn(&Namespace, DirentId) -> Result<Value> + 'static,
        write: impl Fn(&Namespace, DirentId, &Value) -> Result<()> + 'static,
    ) -> Self {
        Self {
            read: Rc::new(read),
            write: Rc::new(write),
        }
    }

    /// Procedures whose write fails with `NotSupported`.
    pub fn read_only(read: impl Fn(&Namespace, DirentId) -> Result<Value> + 'static) -> Self {
        Self::new(read, |_, _, _| {
            Err(BindingError::NotSupported("write to read-only procedure".into()).into())
        })
    }

    pub fn read(&self, ns: &Namespace, context: DirentId) -> Result<Value> {
        (self.read)(ns, context)
    }

    pub fn write(&self, ns: &Namespace, context: DirentId, value: &Value) -> Result<()> {
        (self.write)(ns, context, value)
    }
}

impl fmt::Debug for Procedures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedures").finish_non_exhaustive()
    }
}

//=============================================================================
// Register
//=============================================================================

/// A fixed-width register.
pub enum Register {
    /// An address in a binding's register space.
    Bound {
        binding: Rc<dyn Binding>,
        address: Value,
        width: BitWidth,
    },
    /// Backed by procedures run against the namespace.
    Proc {
        procs: Procedures,
        context: DirentId,
        width: BitWidth,
    },
}

impl Register {
    pub fn bound(binding: Rc<dyn Binding>, address: impl Into<Value>, width: BitWidth) -> Self {
        Register::Bound {
            binding,
            address: address.into(),
            width,
        }
    }

    pub fn proc(procs: Procedures, context: DirentId, width: BitWidth) -> Self {
        Register::Proc {
            procs,
            context,
            width,
        }
    }

    pub fn width(&self) -> BitWidth {
        match self {
            Register::Bound { width, .. } | Register::Proc { width, .. } => *width,
        }
    }

    pub fn read(&self, ns: &Namespace) -> Result<Value> {
        match self {
            Register::Bound {
                binding,
                address,
                width,
            } => Ok(binding.read(address, *width)?),
            Register::Proc { procs, context, .. } => procs.read(ns, *context),
        }
    }

    pub fn write(&self, ns: &Namespace, value: &Value) -> Result<()> {
        match self {
            Register::Bound {
                binding,
                address,
                width,
            } => Ok(binding.write(address, *width, value)?),
            Register::Proc { procs, context, .. } => procs.write(ns, *context, value),
        }
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Register::Bound {
                binding,
                address,
                width,
            } => f
                .debug_struct("Bound")
                .field("binding", &binding.to_string())
                .field("address", address)
                .field("width", width)
                .finish(),
            Register::Proc { context, width, .. } => f
                .debug_struct("Proc")
                .field("context", context)
                .field("width", width)
                .finish(),
        }
    }
}

//=============================================================================
// Field
//=============================================================================

/// A typed view of register bits, a procedure, or a constant.
#[derive(Debug)]
pub enum Field {
    Direct {
        datatype: Rc<Datatype>,
        bits: RegBits,
    },
    Proc {
        datatype: Rc<Datatype>,
        procs: Procedures,
        context: DirentId,
    },
    Constant {
        datatype: Rc<Datatype>,
        value: Value,
    },
}

impl Field {
    pub fn direct(datatype: Rc<Datatype>, bits: RegBits) -> Self {
        Field::Direct { datatype, bits }
    }

    pub fn proc(datatype: Rc<Datatype>, procs: Procedures, context: DirentId) -> Self {
        Field::Proc {
            datatype,
            procs,
            context,
        }
    }

    pub fn constant(datatype: Rc<Datatype>, value: impl Into<Value>) -> Self {
        Field::Constant {
            datatype,
            value: value.into(),
        }
    }

    pub fn datatype(&self) -> &Rc<Datatype> {
        match self {
            Field::Direct { datatype, .. }
            | Field::Proc { datatype, .. }
            | Field::Constant { datatype, .. } => datatype,
        }
    }

    pub fn read(&self, ns: &Namespace) -> Result<Value> {
        match self {
            Field::Direct { bits, .. } => bits.read(ns),
            Field::Proc { procs, context, .. } => procs.read(ns, *context),
            Field::Constant { value, .. } => Ok(value.clone()),
        }
    }

    /// Write a raw value. Writes to constant fields are ignored.
    pub fn write(&self, ns: &Namespace, value: &Value) -> Result<()> {
        match self {
            Field::Direct { bits, .. } => bits.write(ns, value),
            Field::Proc { procs, context, .. } => procs.write(ns, *context, value),
            Field::Constant { .. } => Ok(()),
        }
    }

    /// Read and render through the datatype.
    pub fn evaluate(&self, ns: &Namespace) -> Result<String> {
        Ok(self.datatype().evaluate(&self.read(ns)?))
    }

    pub fn lookup<'a>(&self, input: impl Into<Operand<'a>>) -> Result<Value> {
        Ok(self.datatype().lookup_operand(input.into())?)
    }

    pub fn compare<'a>(&self, ns: &Namespace, rhs: impl Into<Operand<'a>>) -> Result<Value> {
        Ok(self.datatype().compare(&self.read(ns)?, rhs)?)
    }

    pub fn test<'a>(&self, ns: &Namespace, rhs: impl Into<Operand<'a>>) -> Result<Value> {
        Ok(self.datatype().test(&self.read(ns)?, rhs)?)
    }
}

//=============================================================================
// Scope
//=============================================================================

/// A directory of named dirents, datatypes and bookmarks.
#[derive(Default)]
pub struct Scope {
    pub(crate) parent: Option<DirentId>,
    order: Vec<String>,
    children: HashMap<String, DirentId>,
    datatypes: HashMap<String, Rc<Datatype>>,
    bookmarks: HashSet<String>,
    binding: Option<Rc<dyn Binding>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binding(binding: Rc<dyn Binding>) -> Self {
        Self {
            binding: Some(binding),
            ..Self::default()
        }
    }

    /// The enclosing scope, or `None` for the root.
    pub fn parent(&self) -> Option<DirentId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child(&self, name: &str) -> Option<DirentId> {
        self.children.get(name).copied()
    }

    /// Children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, DirentId)> + '_ {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.children[name]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert or replace a child, returning the replaced id.
    pub(crate) fn insert(&mut self, name: &str, id: DirentId) -> Option<DirentId> {
        let previous = self.children.insert(name.to_string(), id);
        if previous.is_none() {
            self.order.push(name.to_string());
        }
        previous
    }

    /// A datatype declared in this scope (ancestors are not searched).
    pub fn datatype(&self, name: &str) -> Option<&Rc<Datatype>> {
        self.datatypes.get(name)
    }

    pub fn add_datatype(&mut self, name: &str, datatype: Rc<Datatype>) -> Option<Rc<Datatype>> {
        self.datatypes.insert(name.to_string(), datatype)
    }

    pub fn add_bookmark(&mut self, name: &str) {
        self.bookmarks.insert(name.to_string());
    }

    pub fn has_bookmark(&self, name: &str) -> bool {
        self.bookmarks.contains(name)
    }

    /// This scope's own binding (ancestors are not searched).
    pub fn binding(&self) -> Option<&Rc<dyn Binding>> {
        self.binding.as_ref()
    }

    pub fn set_binding(&mut self, binding: Rc<dyn Binding>) {
        self.binding = Some(binding);
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("parent", &self.parent)
            .field("children", &self.order)
            .field("binding", &self.binding.as_ref().map(|b| b.to_string()))
            .finish_non_exhaustive()
    }
}

//=============================================================================
// Array
//=============================================================================

/// An append-only sequence of dirents of one kind.
#[derive(Debug)]
pub struct Array {
    kind: DirentKind,
    items: Vec<DirentId>,
}

impl Array {
    pub fn new(kind: DirentKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    pub fn kind(&self) -> DirentKind {
        self.kind
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn at(&self, index: usize) -> Option<DirentId> {
        self.items.get(index).copied()
    }

    pub fn items(&self) -> &[DirentId] {
        &self.items
    }

    /// Map a possibly negative index to a slot; negative counts from the end.
    pub fn resolve_index(&self, index: i64) -> Option<usize> {
        let size = i64::try_from(self.items.len()).ok()?;
        let slot = if index < 0 { size + index } else { index };
        if (0..size).contains(&slot) {
            usize::try_from(slot).ok()
        } else {
            None
        }
    }

    pub(crate) fn append(&mut self, kind: DirentKind, id: DirentId) -> Result<()> {
        if kind != self.kind {
            return Err(NamespaceError::conversion(format!(
                "cannot append a {kind} to an array of {}",
                self.kind
            )));
        }
        self.items.push(id);
        Ok(())
    }
}

//=============================================================================
// Alias
//=============================================================================

/// A link to another path, re-resolved on every traversal.
#[derive(Clone, Debug)]
pub struct Alias {
    target: Path,
}

impl Alias {
    /// Create an alias without checking the target; see
    /// [`Namespace::new_alias`] for the checked constructor.
    pub(crate) fn new(target: Path) -> Self {
        Self { target }
    }

    pub fn link_path(&self) -> &Path {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_order_and_overwrite() {
        let mut scope = Scope::new();
        assert_eq!(scope.insert("b", 1), None);
        assert_eq!(scope.insert("a", 2), None);
        assert_eq!(scope.insert("b", 3), Some(1));
        let children: Vec<_> = scope.children().collect();
        assert_eq!(children, vec![("b", 3), ("a", 2)]);
        assert_eq!(scope.len(), 2);
    }

    #[test]
    fn test_array_indexing() {
        let mut array = Array::new(DirentKind::Register);
        array.append(DirentKind::Register, 10).unwrap();
        array.append(DirentKind::Register, 11).unwrap();
        assert_eq!(array.resolve_index(-1), Some(1));
        assert_eq!(array.resolve_index(-2), Some(0));
        assert_eq!(array.resolve_index(-3), None);
        assert_eq!(array.resolve_index(2), None);
        let err = array.append(DirentKind::Field, 12).unwrap_err();
        assert!(err.is_conversion());
        assert_eq!(array.size(), 2);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(DirentKind::Scope.to_string(), "scope");
        let array = Dirent::from(Array::new(DirentKind::Field));
        assert_eq!(array.kind(), DirentKind::Array);
    }
}
