// Licensed under the Apache-2.0 license

use anyhow::Result;
use registers_namespace::{Dirent, DirentId, Namespace};
use std::io::Write;

/// One line per leaf under `id`, arrays flattened to their items.
pub fn dump(ns: &Namespace, id: DirentId, out: &mut impl Write) -> Result<()> {
    let Some(dirent) = ns.get(id) else {
        return Ok(());
    };
    let path = ns.path_of(id);
    match dirent {
        Dirent::Scope(scope) => {
            for (_, child) in scope.children() {
                dump(ns, child, out)?;
            }
        }
        Dirent::Array(array) => {
            for &item in array.items() {
                dump(ns, item, out)?;
            }
        }
        Dirent::Alias(alias) => writeln!(out, "{path} -> {}", alias.link_path())?,
        Dirent::Register(_) | Dirent::Field(_) => match ns.evaluate(id) {
            Ok(text) => writeln!(out, "{path}: {text}")?,
            Err(err) => writeln!(out, "{path}: <{err}>")?,
        },
    }
    Ok(())
}

/// Immediate children of the scope `id` with their kinds.
pub fn list(ns: &Namespace, id: DirentId, out: &mut impl Write) -> Result<()> {
    for (name, child) in ns.children(id)? {
        match ns.get(child) {
            Some(Dirent::Array(array)) => {
                writeln!(out, "{name}[]  array of {} {}", array.size(), array.kind())?
            }
            Some(Dirent::Alias(alias)) => writeln!(out, "{name}  alias -> {}", alias.link_path())?,
            Some(dirent) => writeln!(out, "{name}  {}", dirent.kind())?,
            None => {}
        }
    }
    Ok(())
}
