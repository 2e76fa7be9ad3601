// Licensed under the Apache-2.0 license

//! A typed, path-addressable namespace over hardware registers.
//!
//! Registers, fields, scopes, arrays and aliases form a tree that is queried
//! with filesystem-like paths (`/pci/dev[0]/%command`, `$bus/..`,
//! `regs[-1]`). Fields view bit ranges of one or more registers through a
//! [`Datatype`] that renders raw [`Value`]s as text and parses text back.
//! Registers reach hardware through a [`Binding`].

mod binding;
mod bitbuffer;
mod builder;
mod config;
pub mod datatype;
mod dirent;
mod error;
mod namespace;
mod path;
mod regbits;
mod value;

pub use binding::{Binding, BitWidth, SimBinding};
pub use bitbuffer::BitBuffer;
pub use builder::NamespaceBuilder;
pub use config::{NamespaceConfig, DEFAULT_MAX_ALIAS_DEPTH};
pub use datatype::{
    BitmaskDatatype, BoolDatatype, Datatype, EnumDatatype, FixedDatatype, HexDatatype, IntDatatype,
    MultiDatatype, Operand, StringDatatype, TransformDatatype,
};
pub use dirent::{
    Alias, Array, Dirent, DirentId, DirentKind, Field, Procedures, ReadProc, Register, Scope,
    WriteProc,
};
pub use error::{BindingError, DatatypeError, NamespaceError, PathError, Result, ValueError};
pub use namespace::{AliasMode, Namespace};
pub use path::{Path, PathElement};
pub use regbits::RegBits;
pub use value::Value;
