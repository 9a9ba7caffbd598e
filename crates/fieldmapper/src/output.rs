//! Caller-owned output of a generation pass, keyed by `<Source>_Mapper`.

use crate::error::{Error, Result};
use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::path::Path;

/// File every unit is concatenated into; include it with
/// `include!(concat!(env!("OUT_DIR"), "/fieldmapper.rs"));`.
pub const AGGREGATE_FILE: &str = "fieldmapper.rs";
/// Directory, next to the aggregate, holding one file per unit.
pub const UNIT_DIR: &str = "fieldmapper";
pub const UNIT_EXTENSION: &str = ".g.rs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
  pub key: String,
  /// Canonical path of the annotated struct.
  pub source: String,
  /// Canonical path of the target struct.
  pub target: String,
  /// Fields copied, in order.
  pub fields: Vec<String>,
  pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteSummary {
  pub written: usize,
  pub unchanged: usize,
  pub removed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeneratedUnits {
  units: BTreeMap<String, GeneratedUnit>,
}

impl GeneratedUnits {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `unit`, replacing and returning any unit with the same key.
  pub fn insert(&mut self, unit: GeneratedUnit) -> Option<GeneratedUnit> {
    self.units.insert(unit.key.clone(), unit)
  }

  pub fn get(&self, key: &str) -> Option<&GeneratedUnit> {
    self.units.get(key)
  }

  pub fn len(&self) -> usize {
    self.units.len()
  }

  pub fn is_empty(&self) -> bool {
    self.units.is_empty()
  }

  pub fn keys(&self) -> impl Iterator<Item = &str> {
    self.units.keys().map(String::as_str)
  }

  pub fn iter(&self) -> btree_map::Values<'_, String, GeneratedUnit> {
    self.units.values()
  }

  /// Every unit in key order, as one includable source text.
  pub fn render(&self) -> String {
    if self.units.is_empty() {
      return format!("{}\n", crate::emit::HEADER)
    }
    self
      .units
      .values()
      .map(|unit| unit.text.as_str())
      .collect::<Vec<_>>()
      .join("\n")
  }

  /// Writes the aggregate file and one file per unit into `dir`.
  ///
  /// Files whose content is unchanged are left untouched so their mtime does
  /// not trigger rebuilds. Unit files from earlier passes that this pass did
  /// not produce are removed.
  #[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display(), units = self.units.len()))]
  pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<WriteSummary> {
    let dir = dir.as_ref();
    let unit_dir = dir.join(UNIT_DIR);
    fs::create_dir_all(&unit_dir).map_err(|source| Error::Write {
      path: unit_dir.clone(),
      source,
    })?;

    let mut summary = WriteSummary::default();
    for unit in self.units.values() {
      let path = unit_dir.join(format!("{}{}", unit.key, UNIT_EXTENSION));
      if write_if_changed(&path, &unit.text)? {
        summary.written += 1;
      } else {
        summary.unchanged += 1;
      }
    }

    let entries = fs::read_dir(&unit_dir).map_err(|source| Error::Read {
      path: unit_dir.clone(),
      source,
    })?;
    for entry in entries {
      let path = entry
        .map_err(|source| Error::Read {
          path: unit_dir.clone(),
          source,
        })?
        .path();
      let stale = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.strip_suffix(UNIT_EXTENSION))
        .map(|key| !self.units.contains_key(key))
        .unwrap_or_default();
      if stale {
        fs::remove_file(&path).map_err(|source| Error::Write {
          path: path.clone(),
          source,
        })?;
        tracing::debug!(path = %path.display(), "removed stale unit");
        summary.removed += 1;
      }
    }

    let aggregate = dir.join(AGGREGATE_FILE);
    if write_if_changed(&aggregate, &self.render())? {
      summary.written += 1;
    } else {
      summary.unchanged += 1;
    }
    Ok(summary)
  }
}

impl<'a> IntoIterator for &'a GeneratedUnits {
  type Item = &'a GeneratedUnit;
  type IntoIter = btree_map::Values<'a, String, GeneratedUnit>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
  if fs::read_to_string(path).ok().as_deref() == Some(contents) {
    return Ok(false)
  }
  fs::write(path, contents).map_err(|source| Error::Write {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(true)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_util::temp_dir;

  fn unit(key: &str, text: &str) -> GeneratedUnit {
    GeneratedUnit {
      key: key.to_string(),
      source: format!("crate::{}", key),
      target: "crate::Target".to_string(),
      fields: vec![],
      text: text.to_string(),
    }
  }

  #[test]
  fn test_insert_replaces() {
    let mut units = GeneratedUnits::new();
    assert!(units.insert(unit("A_Mapper", "first")).is_none());
    let prev = units.insert(unit("A_Mapper", "second")).unwrap();
    assert_eq!(prev.text, "first");
    assert_eq!(units.len(), 1);
    assert_eq!(units.get("A_Mapper").unwrap().text, "second");
  }

  #[test]
  fn test_render_in_key_order() {
    let mut units = GeneratedUnits::new();
    units.insert(unit("B_Mapper", "b\n"));
    units.insert(unit("A_Mapper", "a\n"));
    assert_eq!(units.keys().collect::<Vec<_>>(), vec!["A_Mapper", "B_Mapper"]);
    assert_eq!(units.render(), "a\n\nb\n");
    assert!(GeneratedUnits::new().render().starts_with(crate::emit::HEADER));
  }

  #[test]
  fn test_write_to() {
    let dir = temp_dir("output");
    let mut units = GeneratedUnits::new();
    units.insert(unit("A_Mapper", "a\n"));
    units.insert(unit("B_Mapper", "b\n"));

    let summary = units.write_to(&dir).unwrap();
    assert_eq!(summary, WriteSummary { written: 3, unchanged: 0, removed: 0 });
    assert_eq!(fs::read_to_string(dir.join(UNIT_DIR).join("A_Mapper.g.rs")).unwrap(), "a\n");
    assert_eq!(fs::read_to_string(dir.join(AGGREGATE_FILE)).unwrap(), "a\n\nb\n");

    // Same content again: nothing is rewritten.
    let summary = units.write_to(&dir).unwrap();
    assert_eq!(summary, WriteSummary { written: 0, unchanged: 3, removed: 0 });

    // A unit disappearing removes its file instead of leaving residue.
    let mut next = GeneratedUnits::new();
    next.insert(unit("A_Mapper", "a2\n"));
    let summary = next.write_to(&dir).unwrap();
    assert_eq!(summary, WriteSummary { written: 2, unchanged: 0, removed: 1 });
    assert!(!dir.join(UNIT_DIR).join("B_Mapper.g.rs").exists());
    assert_eq!(fs::read_to_string(dir.join(AGGREGATE_FILE)).unwrap(), "a2\n");

    let _ = fs::remove_dir_all(&dir);
  }
}
