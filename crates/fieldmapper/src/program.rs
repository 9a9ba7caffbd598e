//! The crate under compilation: parsed files tagged with their module paths.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use syn::ext::IdentExt;
use syn::{Expr, ExprLit, Item, ItemMod, Lit, Meta};

/// `["crate", "inputs"]` for `crate::inputs`.
pub type ModulePath = Vec<String>;

#[derive(Debug, Clone)]
pub struct SourceFile {
  pub module: ModulePath,
  /// `None` for sources added from memory.
  pub path: Option<PathBuf>,
  pub syntax: syn::File,
}

#[derive(Debug, Clone, Default)]
pub struct Program {
  files: Vec<SourceFile>,
}

impl Program {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a program from in-memory sources, each paired with the module
  /// path it is mounted at (`"crate"`, `"crate::inputs"`, ...).
  pub fn from_sources<'s, I>(sources: I) -> Result<Self>
  where
    I: IntoIterator<Item = (&'s str, &'s str)>,
  {
    let mut program = Self::new();
    for (module, src) in sources {
      program.add_source(module, src)?;
    }
    Ok(program)
  }

  pub fn add_source(&mut self, module: &str, src: &str) -> Result<()> {
    let module = parse_module_path(module)?;
    let syntax = syn::parse_file(src).map_err(|source| Error::Parse {
      path: PathBuf::from(module.join("::")),
      source,
    })?;
    self.files.push(SourceFile {
      module,
      path: None,
      syntax,
    });
    Ok(())
  }

  /// Loads a crate starting at its root file (`src/lib.rs`), following
  /// out-of-line `mod name;` declarations the way rustc does.
  #[tracing::instrument(skip_all, fields(root = %root.as_ref().display()))]
  pub fn load(root: impl AsRef<Path>) -> Result<Self> {
    let root = root.as_ref();
    let dir = root.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut program = Self::new();
    program.load_file(vec!["crate".to_string()], root.to_path_buf(), dir)?;
    tracing::debug!(files = program.files.len(), "program loaded");
    Ok(program)
  }

  pub fn files(&self) -> &[SourceFile] {
    &self.files
  }

  /// On-disk files backing this program.
  pub fn paths(&self) -> impl Iterator<Item = &Path> {
    self.files.iter().filter_map(|file| file.path.as_deref())
  }

  fn load_file(&mut self, module: ModulePath, path: PathBuf, child_dir: PathBuf) -> Result<()> {
    let src = fs::read_to_string(&path).map_err(|source| Error::Read {
      path: path.clone(),
      source,
    })?;
    let syntax = syn::parse_file(&src).map_err(|source| Error::Parse {
      path: path.clone(),
      source,
    })?;

    let file_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut pending = Vec::new();
    collect_mod_decls(&module, &child_dir, &file_dir, &syntax.items, &mut pending);

    tracing::trace!(path = %path.display(), module = %module.join("::"), "parsed");
    self.files.push(SourceFile {
      module,
      path: Some(path),
      syntax,
    });

    for decl in pending {
      if let Some((path, child_dir)) = decl.locate()? {
        self.load_file(decl.module, path, child_dir)?;
      }
    }
    Ok(())
  }
}

fn parse_module_path(src: &str) -> Result<ModulePath> {
  let src = src.trim();
  let mut module = vec!["crate".to_string()];
  if src.is_empty() {
    return Ok(module)
  }
  for (i, segment) in src.split("::").enumerate() {
    let segment = segment.trim();
    if i == 0 && segment == "crate" {
      continue
    }
    if syn::parse_str::<syn::Ident>(segment).is_err() {
      return Err(Error::InvalidModulePath(src.to_string()))
    }
    module.push(segment.to_string());
  }
  Ok(module)
}

#[derive(Debug)]
struct PendingMod {
  name: String,
  module: ModulePath,
  dir: PathBuf,
  path_attr: Option<PathBuf>,
  // `#[cfg(..)]` modules may legitimately have no file in this configuration.
  optional: bool,
}

impl PendingMod {
  fn locate(&self) -> Result<Option<(PathBuf, PathBuf)>> {
    let candidates = if let Some(ref path) = self.path_attr {
      if path.is_file() {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        return Ok(Some((path.clone(), dir)))
      }
      vec![path.clone()]
    } else {
      let flat = self.dir.join(format!("{}.rs", self.name));
      if flat.is_file() {
        return Ok(Some((flat, self.dir.join(&self.name))))
      }
      let nested = self.dir.join(&self.name).join("mod.rs");
      if nested.is_file() {
        return Ok(Some((nested, self.dir.join(&self.name))))
      }
      vec![flat, nested]
    };

    if self.optional {
      tracing::debug!(module = %self.module.join("::"), "skipping conditional module without a file");
      return Ok(None)
    }
    Err(Error::ModuleNotFound {
      name: self.module.join("::"),
      candidates,
    })
  }
}

fn collect_mod_decls(
  module: &ModulePath,
  dir: &Path,
  path_base: &Path,
  items: &[Item],
  out: &mut Vec<PendingMod>,
) {
  for item in items {
    let item_mod = match item {
      Item::Mod(item_mod) => item_mod,
      _ => continue,
    };
    let name = item_mod.ident.unraw().to_string();
    let mut child = module.clone();
    child.push(name.clone());
    match item_mod.content {
      Some((_, ref items)) => {
        let dir = dir.join(&name);
        collect_mod_decls(&child, &dir, &dir, items, out)
      }
      None => out.push(PendingMod {
        name,
        module: child,
        dir: dir.to_path_buf(),
        path_attr: path_attr(item_mod).map(|path| path_base.join(path)),
        optional: item_mod.attrs.iter().any(|attr| attr.path().is_ident("cfg")),
      }),
    }
  }
}

fn path_attr(item: &ItemMod) -> Option<String> {
  item.attrs.iter().find_map(|attr| match attr.meta {
    Meta::NameValue(ref nv) if nv.path.is_ident("path") => match nv.value {
      Expr::Lit(ExprLit {
        lit: Lit::Str(ref lit),
        ..
      }) => Some(lit.value()),
      _ => None,
    },
    _ => None,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_util::temp_dir;

  fn modules(program: &Program) -> Vec<String> {
    program.files().iter().map(|f| f.module.join("::")).collect()
  }

  #[test]
  fn test_module_path() {
    assert_eq!(parse_module_path("").unwrap(), vec!["crate"]);
    assert_eq!(parse_module_path("crate").unwrap(), vec!["crate"]);
    assert_eq!(parse_module_path("crate::inputs").unwrap(), vec!["crate", "inputs"]);
    assert_eq!(parse_module_path("inputs::v2").unwrap(), vec!["crate", "inputs", "v2"]);
    assert!(matches!(
      parse_module_path("crate::::x"),
      Err(Error::InvalidModulePath(_))
    ));
  }

  #[test]
  fn test_from_sources() {
    let program = Program::from_sources(vec![
      ("crate", "mod inputs;"),
      ("crate::inputs", "pub struct A { pub x: i32 }"),
    ])
    .unwrap();
    assert_eq!(modules(&program), vec!["crate", "crate::inputs"]);
    assert_eq!(program.paths().count(), 0);
  }

  #[test]
  fn test_parse_error() {
    let err = Program::from_sources(vec![("crate", "struct {")]).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
  }

  #[test]
  fn test_load_tree() {
    let dir = temp_dir("load");
    fs::write(
      dir.join("lib.rs"),
      r#"
        mod inputs;
        mod entities;
        #[path = "extra_file.rs"]
        mod extra;
        mod nested {
          mod deep;
        }
        #[cfg(feature = "missing")]
        mod gone;
      "#,
    )
    .unwrap();
    fs::write(dir.join("inputs.rs"), "mod v2;").unwrap();
    fs::create_dir_all(dir.join("inputs")).unwrap();
    fs::write(dir.join("inputs").join("v2.rs"), "pub struct V2 {}").unwrap();
    fs::create_dir_all(dir.join("entities")).unwrap();
    fs::write(dir.join("entities").join("mod.rs"), "pub struct Book {}").unwrap();
    fs::write(dir.join("extra_file.rs"), "").unwrap();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(dir.join("nested").join("deep.rs"), "").unwrap();

    let program = Program::load(dir.join("lib.rs")).unwrap();
    assert_eq!(
      modules(&program),
      vec![
        "crate",
        "crate::inputs",
        "crate::inputs::v2",
        "crate::entities",
        "crate::extra",
        "crate::nested::deep",
      ]
    );
    assert_eq!(program.paths().count(), 6);
    let _ = fs::remove_dir_all(&dir);
  }

  #[test]
  fn test_load_missing_module() {
    let dir = temp_dir("missing");
    fs::write(dir.join("lib.rs"), "mod nowhere;").unwrap();
    let err = Program::load(dir.join("lib.rs")).unwrap_err();
    match err {
      Error::ModuleNotFound { name, candidates } => {
        assert_eq!(name, "crate::nowhere");
        assert_eq!(candidates.len(), 2);
      }
      other => panic!("unexpected error: {}", other),
    }
    let _ = fs::remove_dir_all(&dir);
  }
}
