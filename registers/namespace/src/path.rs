// Licensed under the Apache-2.0 license

//! Namespace paths.
//!
//! A [`Path`] is a sequence of [`PathElement`]s plus an absolute flag. The
//! textual grammar is:
//!
//! ```text
//! path     := ["/"] element ("/" element)*
//! element  := ".."                  parent
//!           | "$" ident             bookmark
//!           | ["%"] ident           plain name
//!           | ["%"] ident "[]"      array append
//!           | ["%"] ident "[" N "]" array index
//! ident    := [A-Za-z_][A-Za-z0-9_]*
//! ```
//!
//! Index literals are decimal, 0-octal or 0x-hex; a negative index counts
//! from the end of the array.
//!
//! Empty elements (from `//` or a trailing `/`) are skipped. Index literals
//! are canonicalized to decimal by `Display`, so `foo[010]` prints as `foo[8]`.

use crate::error::PathError;
use std::fmt;
use std::ops::{Add, AddAssign, Index};
use std::str::FromStr;

/// One step in a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathElement {
    Name(String),
    Parent,
    Bookmark(String),
    ArrayAppend(String),
    ArrayIndex(String, i64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    Start,
    Percent,
    Name,
    BookmarkStart,
    Bookmark,
    IndexOpen,
    Index,
    Closed,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn parse_index(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
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
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

impl PathElement {
    /// Parse a single element (no `/`).
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let invalid = || PathError::Invalid(text.to_string());
        if text == ".." {
            return Ok(PathElement::Parent);
        }

        let mut state = ScanState::Start;
        let mut name_end = text.len();
        let mut index_start = 0;
        let mut index_end = 0;
        for (pos, c) in text.char_indices() {
            state = match (state, c) {
                (ScanState::Start, '%') => ScanState::Percent,
                (ScanState::Start, '$') => ScanState::BookmarkStart,
                (ScanState::Start | ScanState::Percent, c) if is_ident_start(c) => ScanState::Name,
                (ScanState::Name, c) if is_ident_char(c) => ScanState::Name,
                (ScanState::Name, '[') => {
                    name_end = pos;
                    index_start = pos + 1;
                    ScanState::IndexOpen
                }
                (ScanState::BookmarkStart, c) if is_ident_start(c) => ScanState::Bookmark,
                (ScanState::Bookmark, c) if is_ident_char(c) => ScanState::Bookmark,
                (ScanState::IndexOpen | ScanState::Index, ']') => {
                    index_end = pos;
                    ScanState::Closed
                }
                (ScanState::IndexOpen | ScanState::Index, _) => ScanState::Index,
                _ => return Err(invalid()),
            };
        }

        match state {
            ScanState::Name => Ok(PathElement::Name(text.to_string())),
            ScanState::Bookmark => Ok(PathElement::Bookmark(text[1..].to_string())),
            ScanState::Closed => {
                let name = text[..name_end].to_string();
                let literal = &text[index_start..index_end];
                if literal.is_empty() {
                    Ok(PathElement::ArrayAppend(name))
                } else {
                    let index = parse_index(literal).ok_or_else(invalid)?;
                    Ok(PathElement::ArrayIndex(name, index))
                }
            }
            _ => Err(invalid()),
        }
    }

    pub fn new(name: impl Into<String>) -> Self {
        PathElement::Name(name.into())
    }

    pub fn indexed(name: impl Into<String>, index: i64) -> Self {
        PathElement::ArrayIndex(name.into(), index)
    }

    pub fn append(name: impl Into<String>) -> Self {
        PathElement::ArrayAppend(name.into())
    }

    pub fn bookmark(name: impl Into<String>) -> Self {
        PathElement::Bookmark(name.into())
    }

    /// The name an element looks up in its scope. Array elements yield the
    /// array's name; `..` yields `".."`.
    pub fn base_name(&self) -> &str {
        match self {
            PathElement::Name(name)
            | PathElement::Bookmark(name)
            | PathElement::ArrayAppend(name)
            | PathElement::ArrayIndex(name, _) => name,
            PathElement::Parent => "..",
        }
    }

    pub fn is_parent(&self) -> bool {
        matches!(self, PathElement::Parent)
    }

    pub fn is_bookmark(&self) -> bool {
        matches!(self, PathElement::Bookmark(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            PathElement::ArrayAppend(_) | PathElement::ArrayIndex(_, _)
        )
    }

    pub fn is_append(&self) -> bool {
        matches!(self, PathElement::ArrayAppend(_))
    }

    pub fn index(&self) -> Option<i64> {
        match self {
            PathElement::ArrayIndex(_, index) => Some(*index),
            _ => None,
        }
    }
}

impl FromStr for PathElement {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathElement::parse(s)
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Name(name) => write!(f, "{name}"),
            PathElement::Parent => write!(f, ".."),
            PathElement::Bookmark(name) => write!(f, "${name}"),
            PathElement::ArrayAppend(name) => write!(f, "{name}[]"),
            PathElement::ArrayIndex(name, index) => write!(f, "{name}[{index}]"),
        }
    }
}

/// A parsed namespace path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    absolute: bool,
    elements: Vec<PathElement>,
}

impl Path {
    /// The absolute empty path, naming the tree root.
    pub fn root() -> Self {
        Self {
            absolute: true,
            elements: Vec::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, PathError> {
        let invalid = |_: PathError| PathError::Invalid(text.to_string());
        let absolute = text.starts_with('/');
        let elements = text
            .split('/')
            .filter(|elem| !elem.is_empty())
            .map(|elem| PathElement::parse(elem).map_err(invalid))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { absolute, elements })
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn set_absolute(&mut self, absolute: bool) {
        self.absolute = absolute;
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathElement> {
        self.elements.iter()
    }

    pub fn first(&self) -> Option<&PathElement> {
        self.elements.first()
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    pub fn push(&mut self, element: PathElement) {
        self.elements.push(element);
    }

    pub fn pop(&mut self) -> Option<PathElement> {
        self.elements.pop()
    }

    /// Push `element`, letting `..` cancel the previous named hop.
    ///
    /// On an absolute path `..` at the root is dropped, since the root is its
    /// own parent.
    pub fn push_canonical(&mut self, element: PathElement) {
        if element.is_parent() {
            match self.elements.last() {
                Some(last) if !last.is_parent() => {
                    self.elements.pop();
                    return;
                }
                None if self.absolute => return,
                _ => {}
            }
        }
        self.elements.push(element);
    }

    /// Append `other`; an absolute `other` replaces `self`.
    pub fn join(&self, other: &Path) -> Path {
        if other.absolute {
            return other.clone();
        }
        let mut joined = self.clone();
        joined.elements.extend(other.elements.iter().cloned());
        joined
    }

    /// All but the last element.
    pub fn parent(&self) -> Path {
        let mut parent = self.clone();
        parent.elements.pop();
        parent
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.absolute == prefix.absolute && self.elements.starts_with(&prefix.elements)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "/")?;
        }
        for (i, element) in self.elements.iter().enumerate() {
            if i != 0 {
                write!(f, "/")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

impl Index<usize> for Path {
    type Output = PathElement;

    fn index(&self, index: usize) -> &PathElement {
        &self.elements[index]
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl Add<&Path> for Path {
    type Output = Path;

    fn add(self, rhs: &Path) -> Path {
        self.join(rhs)
    }
}

impl AddAssign<&Path> for Path {
    fn add_assign(&mut self, rhs: &Path) {
        *self = self.join(rhs);
    }
}

impl From<PathElement> for Path {
    fn from(element: PathElement) -> Self {
        Self {
            absolute: false,
            elements: vec![element],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elements() {
        let cases = [
            ("foo", PathElement::new("foo")),
            ("%bar_1", PathElement::new("%bar_1")),
            ("..", PathElement::Parent),
            ("$pci", PathElement::bookmark("pci")),
            ("regs[]", PathElement::append("regs")),
            ("regs[3]", PathElement::indexed("regs", 3)),
            ("regs[-1]", PathElement::indexed("regs", -1)),
            ("regs[0x10]", PathElement::indexed("regs", 16)),
            ("regs[010]", PathElement::indexed("regs", 8)),
            ("regs[0]", PathElement::indexed("regs", 0)),
        ];
        for (text, expected) in cases {
            assert_eq!(PathElement::parse(text).unwrap(), expected, "{text}");
        }
    }

    #[test]
    fn test_parse_invalid_elements() {
        for bad in [
            "", ".", "...", "1abc", "a-b", "%", "%%a", "$", "$%a", "$a[1]", "a[", "a[1", "a[1]x",
            "a[x]", "a[08]", "a[-]", "a]", "a b",
        ] {
            assert!(PathElement::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_parse_paths() {
        let p = Path::parse("/a/b[2]/../$bm/c").unwrap();
        assert!(p.is_absolute());
        assert_eq!(p.len(), 5);
        assert_eq!(p[1], PathElement::indexed("b", 2));
        assert_eq!(p.to_string(), "/a/b[2]/../$bm/c");

        let p = Path::parse("a//b/").unwrap();
        assert!(!p.is_absolute());
        assert_eq!(p.to_string(), "a/b");

        assert_eq!(Path::parse("/").unwrap(), Path::root());
        assert!(Path::parse("").unwrap().is_empty());
        let err = Path::parse("/a/1b").unwrap_err();
        assert!(matches!(err, PathError::Invalid(s) if s == "/a/1b"));
    }

    #[test]
    fn test_canonical_literals() {
        let p = Path::parse("foo[010]").unwrap();
        assert_eq!(p.to_string(), "foo[8]");
        assert_eq!(p, Path::parse("foo[0x8]").unwrap());
        assert_ne!(Path::parse("/foo").unwrap(), Path::parse("foo").unwrap());
    }

    #[test]
    fn test_push_canonical() {
        let mut p = Path::parse("a/b").unwrap();
        p.push_canonical(PathElement::Parent);
        assert_eq!(p.to_string(), "a");
        p.push_canonical(PathElement::Parent);
        p.push_canonical(PathElement::Parent);
        assert_eq!(p.to_string(), "..");
        p.push_canonical(PathElement::Parent);
        assert_eq!(p.to_string(), "../..");

        let mut p = Path::root();
        p.push_canonical(PathElement::Parent);
        assert_eq!(p, Path::root());
    }

    #[test]
    fn test_join() {
        let base = Path::parse("/a").unwrap();
        let rel = Path::parse("b/c").unwrap();
        assert_eq!((base.clone() + &rel).to_string(), "/a/b/c");
        assert_eq!(base.join(&Path::parse("/x").unwrap()).to_string(), "/x");
        let mut p = rel.clone();
        p += &Path::parse("d").unwrap();
        assert_eq!(p.to_string(), "b/c/d");
        assert!(p.starts_with(&rel));
        assert_eq!(p.parent(), rel);
    }
}
