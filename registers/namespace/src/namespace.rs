// Licensed under the Apache-2.0 license

//! The dirent arena and path resolution.

use crate::binding::Binding;
use crate::config::NamespaceConfig;
use crate::datatype::Datatype;
use crate::dirent::{Alias, Array, Dirent, DirentId, DirentKind, Scope};
use crate::error::{NamespaceError, PathError, Result};
use crate::path::{Path, PathElement};
use crate::value::Value;
use log::{debug, trace, warn};
use std::rc::Rc;

/// Whether a terminal alias is replaced by its target.
///
/// Aliases in the middle of a path are always followed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AliasMode {
    Follow,
    NoFollow,
}

/// Where a dirent was inserted: its scope and the element it was added under.
#[derive(Clone, Debug)]
struct Placement {
    scope: DirentId,
    element: PathElement,
}

/// Result of walking a path.
struct Walk {
    at: DirentId,
    /// Scope that holds `at` (the root holds itself).
    container: DirentId,
    /// Canonical path from the start scope to `at`.
    path: Path,
}

/// A tree of register dirents rooted at an unnamed scope.
#[derive(Debug)]
pub struct Namespace {
    config: NamespaceConfig,
    dirents: Vec<Dirent>,
    placements: Vec<Option<Placement>>,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespace {
    pub fn new() -> Self {
        Self::with_config(NamespaceConfig::default())
    }

    pub fn with_config(config: NamespaceConfig) -> Self {
        Self {
            config,
            dirents: vec![Scope::new().into()],
            placements: vec![None],
        }
    }

    pub fn config(&self) -> &NamespaceConfig {
        &self.config
    }

    pub fn root(&self) -> DirentId {
        0
    }

    pub fn is_root(&self, id: DirentId) -> bool {
        id == self.root()
    }

    pub fn get(&self, id: DirentId) -> Option<&Dirent> {
        self.dirents.get(id)
    }

    fn dirent(&self, id: DirentId) -> Result<&Dirent> {
        self.get(id)
            .ok_or_else(|| NamespaceError::conversion(format!("no dirent with id {id}")))
    }

    pub fn kind(&self, id: DirentId) -> Result<DirentKind> {
        Ok(self.dirent(id)?.kind())
    }

    pub fn scope(&self, id: DirentId) -> Result<&Scope> {
        let dirent = self.dirent(id)?;
        dirent
            .as_scope()
            .ok_or_else(|| self.not_a(id, dirent.kind(), "scope"))
    }

    fn scope_mut(&mut self, id: DirentId) -> Result<&mut Scope> {
        self.scope(id)?;
        self.dirents[id]
            .as_scope_mut()
            .ok_or_else(|| NamespaceError::conversion(format!("dirent {id} is not a scope")))
    }

    fn not_a(&self, id: DirentId, kind: DirentKind, wanted: &str) -> NamespaceError {
        NamespaceError::conversion(format!("{} is a {kind}, not a {wanted}", self.path_of(id)))
    }

    /// The enclosing scope of a scope; the root is its own parent.
    pub fn parent(&self, scope: DirentId) -> DirentId {
        self.get(scope)
            .and_then(Dirent::as_scope)
            .and_then(Scope::parent)
            .unwrap_or(self.root())
    }

    /// The scope a dirent was inserted into.
    pub fn container(&self, id: DirentId) -> DirentId {
        match self.placements.get(id) {
            Some(Some(placement)) => placement.scope,
            _ => self.root(),
        }
    }

    /// Absolute path of a dirent, built from where it was inserted.
    ///
    /// Dirents replaced by a later insertion keep the path they were added
    /// under.
    pub fn path_of(&self, id: DirentId) -> Path {
        let mut elements = Vec::new();
        let mut cursor = id;
        while let Some(Some(placement)) = self.placements.get(cursor) {
            elements.push(placement.element.clone());
            cursor = placement.scope;
        }
        let mut path = Path::root();
        for element in elements.into_iter().rev() {
            path.push(element);
        }
        path
    }

    /// Children of `scope` in insertion order.
    pub fn children(&self, scope: DirentId) -> Result<Vec<(String, DirentId)>> {
        Ok(self
            .scope(scope)?
            .children()
            .map(|(name, id)| (name.to_string(), id))
            .collect())
    }

    /// The binding of the nearest enclosing scope that has one.
    pub fn binding(&self, scope: DirentId) -> Option<Rc<dyn Binding>> {
        self.ancestors(scope).find_map(|s| s.binding().cloned())
    }

    /// The nearest declaration of datatype `name`, searching outwards.
    pub fn find_datatype(&self, scope: DirentId, name: &str) -> Option<Rc<Datatype>> {
        self.ancestors(scope)
            .find_map(|s| s.datatype(name).cloned())
    }

    pub fn has_bookmark(&self, scope: DirentId, name: &str) -> bool {
        self.scope(scope).is_ok_and(|s| s.has_bookmark(name))
    }

    /// `scope` and its ancestors, innermost first.
    fn ancestors(&self, scope: DirentId) -> impl Iterator<Item = &Scope> + '_ {
        let mut next = self.get(scope).and_then(Dirent::as_scope);
        std::iter::from_fn(move || {
            let current = next?;
            next = current
                .parent()
                .and_then(|p| self.get(p))
                .and_then(Dirent::as_scope);
            Some(current)
        })
    }

    //=========================================================================
    // Construction
    //=========================================================================

    fn alloc(&mut self, dirent: Dirent, placement: Placement) -> DirentId {
        let id = self.dirents.len();
        self.dirents.push(dirent);
        self.placements.push(Some(placement));
        id
    }

    /// Insert `dirent` into `scope` under `element`.
    ///
    /// A plain name replaces any existing entry (with a warning when
    /// configured). `name[]` appends to the array `name`, creating it on
    /// first use with the kind of `dirent`. Other element forms are invalid.
    pub fn add(
        &mut self,
        scope: DirentId,
        element: &PathElement,
        mut dirent: Dirent,
    ) -> Result<DirentId> {
        self.scope(scope)?;
        if let Dirent::Scope(child) = &mut dirent {
            child.parent = Some(scope);
        }
        match element {
            PathElement::Name(name) => {
                let id = self.alloc(
                    dirent,
                    Placement {
                        scope,
                        element: element.clone(),
                    },
                );
                let warn_on_overwrite = self.config.warn_on_overwrite;
                let replaced = self.scope_mut(scope)?.insert(name, id);
                let path = self.path_of(id);
                if replaced.is_some() && warn_on_overwrite {
                    warn!("{path}: replacing existing entry");
                }
                debug!("{path}: added {}", self.dirents[id].kind());
                Ok(id)
            }
            PathElement::ArrayAppend(name) => {
                let kind = dirent.kind();
                let existing = self.scope(scope)?.child(name);
                let array = match existing {
                    Some(existing) => match &self.dirents[existing] {
                        Dirent::Array(items) if items.kind() != kind => {
                            return Err(NamespaceError::conversion(format!(
                                "cannot append a {kind} to {}, an array of {}",
                                self.path_of(existing),
                                items.kind()
                            )));
                        }
                        Dirent::Array(_) => existing,
                        other => return Err(self.not_a(existing, other.kind(), "array")),
                    },
                    None => {
                        let array = self.alloc(
                            Array::new(kind).into(),
                            Placement {
                                scope,
                                element: PathElement::new(name.clone()),
                            },
                        );
                        self.scope_mut(scope)?.insert(name, array);
                        array
                    }
                };
                let index = match &self.dirents[array] {
                    Dirent::Array(items) => items.size(),
                    _ => 0,
                };
                let id = self.alloc(
                    dirent,
                    Placement {
                        scope,
                        element: PathElement::indexed(name.clone(), index as i64),
                    },
                );
                if let Dirent::Array(items) = &mut self.dirents[array] {
                    items.append(kind, id)?;
                }
                debug!("{}: added {kind}", self.path_of(id));
                Ok(id)
            }
            _ => Err(PathError::Invalid(element.to_string()).into()),
        }
    }

    /// [`Namespace::add`] with the element given as text.
    pub fn add_named(
        &mut self,
        scope: DirentId,
        element: &str,
        dirent: Dirent,
    ) -> Result<DirentId> {
        let element = PathElement::parse(element)?;
        self.add(scope, &element, dirent)
    }

    pub fn add_datatype(
        &mut self,
        scope: DirentId,
        name: &str,
        datatype: Rc<Datatype>,
    ) -> Result<()> {
        let previous = self.scope_mut(scope)?.add_datatype(name, datatype);
        if previous.is_some() {
            warn!("{}: redefining datatype '{name}'", self.path_of(scope));
        }
        Ok(())
    }

    pub fn add_bookmark(&mut self, scope: DirentId, name: &str) -> Result<()> {
        self.scope_mut(scope)?.add_bookmark(name);
        Ok(())
    }

    /// Attach a register-space binding to `scope`.
    pub fn bind(&mut self, scope: DirentId, binding: Rc<dyn Binding>) -> Result<()> {
        debug!("{}: bound to {binding}", self.path_of(scope));
        self.scope_mut(scope)?.set_binding(binding);
        Ok(())
    }

    /// Create an alias to `target`, resolved from `context`.
    ///
    /// The target must resolve now; the alias stores its absolute canonical
    /// path and re-resolves it on every traversal.
    pub fn new_alias(&self, context: DirentId, target: &Path) -> Result<Alias> {
        let walk = self
            .walk(context, target, AliasMode::NoFollow, 0)?
            .ok_or_else(|| PathError::NotFound(target.to_string()))?;
        let mut link = self.path_of(context);
        for element in &walk.path {
            link.push_canonical(element.clone());
        }
        debug!("{}: alias to {target} links {link}", self.path_of(context));
        Ok(Alias::new(link))
    }

    //=========================================================================
    // Resolution
    //=========================================================================

    /// Find the dirent `path` names, starting from `scope`.
    ///
    /// Returns `Ok(None)` when any element is absent, an array index is out
    /// of range, an array append marker is used, or a bookmark is not
    /// declared on any enclosing scope.
    pub fn lookup(
        &self,
        scope: DirentId,
        path: &Path,
        mode: AliasMode,
    ) -> Result<Option<DirentId>> {
        Ok(self.walk(scope, path, mode, 0)?.map(|walk| walk.at))
    }

    pub fn lookup_str(
        &self,
        scope: DirentId,
        path: &str,
        mode: AliasMode,
    ) -> Result<Option<DirentId>> {
        self.lookup(scope, &Path::parse(path)?, mode)
    }

    /// Canonicalize `path` relative to `scope`.
    ///
    /// Bookmarks become `..` hops, negative indices become forward indices,
    /// `..` cancels the preceding element and aliases in the middle of the
    /// path are replaced by their targets. A terminal alias is kept.
    pub fn resolve(&self, scope: DirentId, path: &Path) -> Result<Option<Path>> {
        Ok(self
            .walk(scope, path, AliasMode::NoFollow, 0)?
            .map(|walk| walk.path))
    }

    pub fn resolve_str(&self, scope: DirentId, path: &str) -> Result<Option<Path>> {
        self.resolve(scope, &Path::parse(path)?)
    }

    /// Replace an alias by the dirent it names; other dirents are returned
    /// as is.
    pub fn follow(&self, id: DirentId) -> Result<DirentId> {
        match self.dirent(id)? {
            Dirent::Alias(alias) => {
                let walk = self
                    .walk(self.root(), alias.link_path(), AliasMode::Follow, 1)?
                    .ok_or_else(|| PathError::NotFound(alias.link_path().to_string()))?;
                Ok(walk.at)
            }
            _ => Ok(id),
        }
    }

    fn walk(
        &self,
        start: DirentId,
        path: &Path,
        mode: AliasMode,
        depth: usize,
    ) -> Result<Option<Walk>> {
        self.scope(start)?;
        let mut current = start;
        let mut acc = Path::default();

        if path.is_absolute() {
            while !self.is_root(current) {
                acc.push_canonical(PathElement::Parent);
                current = self.parent(current);
            }
        }

        let mut at = current;
        let mut container = self.parent(current);
        for (i, element) in path.iter().enumerate() {
            let remaining = i + 1 < path.len();
            let scope = self.scope(current)?;
            let mut next = match element {
                PathElement::Parent => {
                    if let Some(parent) = scope.parent() {
                        acc.push_canonical(PathElement::Parent);
                        current = parent;
                    }
                    container = self.parent(current);
                    current
                }
                PathElement::Bookmark(name) => {
                    let mut marked = current;
                    while !self.has_bookmark(marked, name) {
                        match self.scope(marked)?.parent() {
                            Some(parent) => {
                                acc.push_canonical(PathElement::Parent);
                                marked = parent;
                            }
                            None => return Ok(None),
                        }
                    }
                    container = self.parent(marked);
                    marked
                }
                PathElement::Name(name) => {
                    let Some(child) = scope.child(name) else {
                        return Ok(None);
                    };
                    acc.push(element.clone());
                    container = current;
                    child
                }
                PathElement::ArrayIndex(name, index) => {
                    let Some(child) = scope.child(name) else {
                        return Ok(None);
                    };
                    let dirent = &self.dirents[child];
                    let array = dirent
                        .as_array()
                        .ok_or_else(|| self.not_a(child, dirent.kind(), "array"))?;
                    let Some(slot) = array.resolve_index(*index) else {
                        return Ok(None);
                    };
                    let Some(item) = array.at(slot) else {
                        return Ok(None);
                    };
                    acc.push(PathElement::indexed(name.clone(), slot as i64));
                    container = current;
                    item
                }
                PathElement::ArrayAppend(_) => return Ok(None),
            };

            let mut hops = depth;
            while let Dirent::Alias(alias) = &self.dirents[next] {
                if !remaining && mode == AliasMode::NoFollow {
                    break;
                }
                hops += 1;
                if hops > self.config.max_alias_depth {
                    return Err(NamespaceError::AliasCycle(path.to_string()));
                }
                trace!(
                    "{}: following alias to {}",
                    self.path_of(next),
                    alias.link_path()
                );
                acc.pop();
                let Some(target) =
                    self.walk(container, alias.link_path(), AliasMode::NoFollow, hops)?
                else {
                    return Ok(None);
                };
                for element in &target.path {
                    acc.push_canonical(element.clone());
                }
                next = target.at;
                container = target.container;
            }

            if remaining {
                let kind = self.dirents[next].kind();
                if kind != DirentKind::Scope {
                    return Err(self.not_a(next, kind, "scope"));
                }
                current = next;
            }
            at = next;
        }

        Ok(Some(Walk {
            at,
            container,
            path: acc,
        }))
    }

    //=========================================================================
    // Access
    //=========================================================================

    /// Raw value of a register or field, following aliases.
    pub fn read(&self, id: DirentId) -> Result<Value> {
        let id = self.follow(id)?;
        match self.dirent(id)? {
            Dirent::Register(reg) => reg.read(self),
            Dirent::Field(field) => field.read(self),
            other => Err(self.not_a(id, other.kind(), "register or field")),
        }
    }

    pub fn write(&self, id: DirentId, value: &Value) -> Result<()> {
        let id = self.follow(id)?;
        match self.dirent(id)? {
            Dirent::Register(reg) => reg.write(self, value),
            Dirent::Field(field) => field.write(self, value),
            other => Err(self.not_a(id, other.kind(), "register or field")),
        }
    }

    /// Display text: a field renders through its datatype, a register as
    /// zero-padded hex.
    pub fn evaluate(&self, id: DirentId) -> Result<String> {
        let id = self.follow(id)?;
        match self.dirent(id)? {
            Dirent::Register(reg) => {
                let digits = reg.width().div_ceil(4).max(1) as usize;
                Ok(format!("0x{:0digits$x}", reg.read(self)?))
            }
            Dirent::Field(field) => field.evaluate(self),
            other => Err(self.not_a(id, other.kind(), "register or field")),
        }
    }

    /// Write display text: a field looks it up through its datatype, a
    /// register parses it as a numeral.
    pub fn write_str(&self, id: DirentId, text: &str) -> Result<()> {
        let id = self.follow(id)?;
        match self.dirent(id)? {
            Dirent::Register(reg) => reg.write(self, &Value::parse(text)?),
            Dirent::Field(field) => field.write(self, &field.lookup(text)?),
            other => Err(self.not_a(id, other.kind(), "register or field")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::SimBinding;
    use crate::datatype::IntDatatype;
    use crate::dirent::{Field, Register};

    fn path(text: &str) -> Path {
        Path::parse(text).unwrap()
    }

    fn find(ns: &Namespace, scope: DirentId, text: &str) -> Option<DirentId> {
        ns.lookup_str(scope, text, AliasMode::Follow).unwrap()
    }

    fn locate(ns: &Namespace, scope: DirentId, text: &str) -> DirentId {
        find(ns, scope, text).unwrap()
    }

    fn canonical(ns: &Namespace, scope: DirentId, text: &str) -> String {
        ns.resolve_str(scope, text).unwrap().unwrap().to_string()
    }

    /// `/dev/{ctrl, regs[0..2]/val}` with `dev` bookmarked.
    fn sample() -> (Namespace, Rc<SimBinding>) {
        let sim = Rc::new(SimBinding::new("t"));
        let mut ns = Namespace::new();
        let root = ns.root();
        let dev = ns.add_named(root, "dev", Scope::new().into()).unwrap();
        ns.bind(dev, sim.clone()).unwrap();
        ns.add_bookmark(dev, "dev").unwrap();
        let ctrl = Register::bound(sim.clone(), 0x10, 8);
        ns.add_named(dev, "ctrl", ctrl.into()).unwrap();
        for i in 0..2 {
            let item = ns.add_named(dev, "regs[]", Scope::new().into()).unwrap();
            let val = Register::bound(sim.clone(), 0x20 + i, 16);
            ns.add_named(item, "val", val.into()).unwrap();
        }
        (ns, sim)
    }

    #[test]
    fn test_add_then_lookup() {
        let (ns, _) = sample();
        let dev = locate(&ns, ns.root(), "dev");
        assert_eq!(ns.kind(dev).unwrap(), DirentKind::Scope);
        let ctrl = locate(&ns, dev, "ctrl");
        assert_eq!(ns.path_of(ctrl).to_string(), "/dev/ctrl");
        assert_eq!(ns.container(ctrl), dev);
        assert_eq!(find(&ns, dev, "missing"), None);
    }

    #[test]
    fn test_overwrite_replaces() {
        let (mut ns, sim) = sample();
        let dev = locate(&ns, ns.root(), "dev");
        let newer = Register::bound(sim, 0x11, 8);
        let newer = ns.add_named(dev, "ctrl", newer.into()).unwrap();
        assert_eq!(find(&ns, dev, "ctrl"), Some(newer));
        assert_eq!(ns.children(dev).unwrap().len(), 2);
    }

    #[test]
    fn test_overwrite_without_warning() {
        let config = NamespaceConfig::with_defaults().warn_on_overwrite(false);
        let mut ns = Namespace::with_config(config);
        assert!(!ns.config().warn_on_overwrite);
        let root = ns.root();
        let first = ns.add_named(root, "x", Scope::new().into()).unwrap();
        let second = ns.add_named(root, "x", Scope::new().into()).unwrap();
        assert_ne!(first, second);
        assert_eq!(find(&ns, root, "x"), Some(second));
        assert_eq!(ns.children(root).unwrap(), vec![("x".to_string(), second)]);
        // The replaced dirent still knows where it was added.
        assert_eq!(ns.path_of(first).to_string(), "/x");
    }

    #[test]
    fn test_add_rejects_non_name_elements() {
        let (mut ns, _) = sample();
        let root = ns.root();
        for element in ["..", "$dev", "regs[0]"] {
            let err = ns.add_named(root, element, Scope::new().into());
            assert!(err.unwrap_err().is_invalid_path(), "{element}");
        }
        // Appending a field to an array of scopes.
        let dev = locate(&ns, root, "dev");
        let field = Field::constant(Rc::new(IntDatatype::new().into()), 1);
        let err = ns.add_named(dev, "regs[]", field.into()).unwrap_err();
        assert!(err.is_conversion());
    }

    #[test]
    fn test_array_paths() {
        let (ns, _) = sample();
        let root = ns.root();
        let last = find(&ns, root, "/dev/regs[-1]/val");
        let second = find(&ns, root, "/dev/regs[1]/val");
        assert!(last.is_some());
        assert_eq!(last, second);
        assert_eq!(find(&ns, root, "dev/regs[-3]"), None);
        assert_eq!(find(&ns, root, "dev/regs[2]"), None);
        assert_eq!(find(&ns, root, "dev/regs[]"), None);
        let err = ns.lookup_str(root, "dev/ctrl[0]", AliasMode::Follow);
        assert!(err.unwrap_err().is_conversion());
        let item = second.map(|val| ns.container(val)).unwrap();
        assert_eq!(ns.path_of(item).to_string(), "/dev/regs[1]");
    }

    #[test]
    fn test_non_scope_mid_path() {
        let (ns, _) = sample();
        let err = ns.lookup_str(ns.root(), "dev/ctrl/bit", AliasMode::Follow);
        assert!(err.unwrap_err().is_conversion());
    }

    #[test]
    fn test_parent_and_bookmark() {
        let (ns, _) = sample();
        let root = ns.root();
        let item = ns.container(locate(&ns, root, "dev/regs[0]/val"));
        let ctrl = find(&ns, root, "dev/ctrl");
        assert_eq!(find(&ns, item, "../ctrl"), ctrl);
        assert_eq!(find(&ns, item, "$dev/ctrl"), ctrl);
        assert_eq!(find(&ns, item, "$nowhere/ctrl"), None);
        assert_eq!(find(&ns, root, "../../dev/ctrl"), ctrl);
        assert_eq!(find(&ns, item, "/"), Some(root));
    }

    #[test]
    fn test_resolve_canonical() {
        let (ns, _) = sample();
        let root = ns.root();
        let item = locate(&ns, root, "dev/regs[1]");
        assert_eq!(canonical(&ns, root, "dev/regs[-1]/../ctrl"), "dev/ctrl");
        assert_eq!(canonical(&ns, item, "$dev/regs[0x0]/val"), "../regs[0]/val");
        assert_eq!(canonical(&ns, item, "/dev/ctrl"), "../../dev/ctrl");
        assert_eq!(ns.resolve_str(root, "dev/nothing").unwrap(), None);
    }

    #[test]
    fn test_alias_follow_and_resolve() {
        let (mut ns, _) = sample();
        let root = ns.root();
        let dev = locate(&ns, root, "dev");
        let alias = ns.new_alias(dev, &path("regs[-1]")).unwrap();
        assert_eq!(alias.link_path().to_string(), "/dev/regs[1]");
        let link = ns.add_named(root, "last", alias.into()).unwrap();

        let direct = find(&ns, root, "dev/regs[1]/val");
        let through = ns.lookup_str(root, "last/val", AliasMode::NoFollow);
        assert_eq!(through.unwrap(), direct);
        let terminal = ns.lookup_str(root, "last", AliasMode::NoFollow);
        assert_eq!(terminal.unwrap(), Some(link));
        let target = ns.follow(link).unwrap();
        assert_eq!(ns.kind(target).unwrap(), DirentKind::Scope);
        assert_eq!(canonical(&ns, root, "last/val"), "dev/regs[1]/val");
        assert_eq!(canonical(&ns, root, "last"), "last");
    }

    #[test]
    fn test_alias_target_must_exist() {
        let (ns, _) = sample();
        let err = ns.new_alias(ns.root(), &path("dev/missing")).unwrap_err();
        assert!(matches!(err, NamespaceError::Path(PathError::NotFound(_))));
    }

    #[test]
    fn test_alias_cycle_is_an_error() {
        let (mut ns, _) = sample();
        let root = ns.root();
        ns.add_named(root, "b", Scope::new().into()).unwrap();
        let to_b = ns.new_alias(root, &path("b")).unwrap();
        ns.add_named(root, "a", to_b.into()).unwrap();
        let to_a = ns.new_alias(root, &path("a")).unwrap();
        ns.add_named(root, "b", to_a.into()).unwrap();

        let err = ns.lookup_str(root, "a/x", AliasMode::Follow).unwrap_err();
        assert!(matches!(err, NamespaceError::AliasCycle(_)));
        let err = ns.lookup_str(root, "a", AliasMode::Follow).unwrap_err();
        assert!(matches!(err, NamespaceError::AliasCycle(_)));
        // Not following the terminal alias never loops.
        let kept = ns.lookup_str(root, "a", AliasMode::NoFollow).unwrap();
        assert!(kept.is_some());
    }

    #[test]
    fn test_binding_and_datatype_inheritance() {
        let (mut ns, _) = sample();
        let root = ns.root();
        let item = locate(&ns, root, "dev/regs[0]");
        assert_eq!(ns.binding(item).unwrap().to_string(), "sim:t");
        assert!(ns.binding(root).is_none());
        let count: Rc<Datatype> = Rc::new(IntDatatype::new().into());
        ns.add_datatype(root, "count", count).unwrap();
        assert_eq!(ns.find_datatype(item, "count").unwrap().name(), "int");
        assert!(ns.find_datatype(item, "other").is_none());
    }

    #[test]
    fn test_access_by_id() {
        let (ns, sim) = sample();
        let root = ns.root();
        let ctrl = locate(&ns, root, "dev/ctrl");
        ns.write_str(ctrl, "0x1f").unwrap();
        assert_eq!(sim.peek(&Value::from(0x10)), Some(Value::from(0x1f)));
        assert_eq!(ns.read(ctrl).unwrap(), Value::from(0x1f));
        assert_eq!(ns.evaluate(ctrl).unwrap(), "0x1f");
        let val = locate(&ns, root, "dev/regs[0]/val");
        assert_eq!(ns.evaluate(val).unwrap(), "0x0000");
        assert!(ns.read(root).unwrap_err().is_conversion());
        assert!(ns.write_str(ctrl, "twelve").is_err());
    }
}
