//! Name resolution over the crate's module tree.
//!
//! Every module records the names it declares and the names its `use` items
//! bind. Paths resolve to canonical absolute paths: `crate::...` for items
//! declared in the program, or the path as written for anything that lives in
//! another crate. Identity of an item is the equality of these paths, so
//! aliases, renames, re-exports and shadowing all behave as rustc sees them.

use crate::program::{ModulePath, Program};
use std::collections::{HashMap, HashSet};
use syn::ext::IdentExt;
use syn::{AttrStyle, Attribute, Item, ItemStruct, ItemType, UseTree};

// Bounds import chains; cyclic `use` items fail to resolve instead of looping.
const MAX_DEPTH: usize = 32;

/// Marks an extern-only path (`::name::...`) while flattening `use` trees.
const EXTERN_ROOT: &str = "::";

/// A struct found while scanning the program.
#[derive(Debug, Clone)]
pub struct Declaration<'a> {
  pub module: ModulePath,
  pub item: &'a ItemStruct,
  /// `#[cfg(..)]` gates of the enclosing modules and of the struct itself,
  /// outermost first.
  pub cfgs: Vec<Attribute>,
}

impl<'a> Declaration<'a> {
  pub fn path(&self) -> ModulePath {
    let mut path = self.module.clone();
    path.push(self.item.ident.unraw().to_string());
    path
  }
}

#[derive(Debug, Default)]
struct Scope<'a> {
  items: HashSet<String>,
  structs: HashMap<String, &'a ItemStruct>,
  aliases: HashMap<String, &'a ItemType>,
  uses: HashMap<String, Vec<String>>,
  globs: Vec<Vec<String>>,
}

impl<'a> Scope<'a> {
  fn declare(&mut self, ident: &syn::Ident) -> String {
    let name = ident.unraw().to_string();
    self.items.insert(name.clone());
    name
  }
}

#[derive(Debug, Default)]
pub struct ModuleTree<'a> {
  scopes: HashMap<ModulePath, Scope<'a>>,
  module_cfgs: HashMap<ModulePath, Vec<Attribute>>,
  declarations: Vec<Declaration<'a>>,
}

impl<'a> ModuleTree<'a> {
  pub fn build(program: &'a Program) -> Self {
    let mut tree = Self::default();
    for file in program.files() {
      tree.add_cfgs(&file.module, &file.syntax.attrs);
      tree.collect(&file.module, &file.syntax.items);
    }
    // Module gates may come from a file loaded after the module's own file.
    for index in 0..tree.declarations.len() {
      let decl = &tree.declarations[index];
      let mut cfgs = tree.module_chain_cfgs(&decl.module);
      cfgs.extend(cfg_attrs(&decl.item.attrs));
      tree.declarations[index].cfgs = cfgs;
    }
    tree
  }

  /// Every struct in the program, in file and declaration order.
  pub fn declarations(&self) -> &[Declaration<'a>] {
    &self.declarations
  }

  /// Resolves `path` as written inside `module`.
  pub fn resolve_path(&self, module: &[String], path: &[String]) -> Option<ModulePath> {
    self.resolve_in(module, path, 0)
  }

  /// Every path `path` may denote inside `module`.
  ///
  /// Usually the single result of [`ModuleTree::resolve_path`]. A lone name
  /// that nothing in the crate binds may instead come from a glob over
  /// another crate (`use fieldmapper::*;`), whose contents are unknown here, so
  /// each such glob contributes one candidate ahead of the bare name.
  pub fn resolve_candidates(&self, module: &[String], path: &[String]) -> Vec<ModulePath> {
    if let [name] = path {
      let keyword = matches!(name.as_str(), "crate" | "self" | "super" | EXTERN_ROOT);
      if !keyword && self.binding(module, name, 0).is_none() {
        let mut candidates = Vec::new();
        self.extern_glob_candidates(module, name, 0, &mut candidates);
        candidates.push(vec![name.clone()]);
        return candidates
      }
    }
    self.resolve_path(module, path).into_iter().collect()
  }

  pub fn struct_def(&self, path: &[String]) -> Option<&'a ItemStruct> {
    let (name, module) = path.split_last()?;
    self.scopes.get(module)?.structs.get(name).copied()
  }

  pub fn type_alias(&self, path: &[String]) -> Option<&'a ItemType> {
    let (name, module) = path.split_last()?;
    self.scopes.get(module)?.aliases.get(name).copied()
  }

  fn collect(&mut self, module: &ModulePath, items: &'a [Item]) {
    self.scopes.entry(module.clone()).or_default();
    for item in items {
      match item {
        Item::Struct(item) => {
          let scope = self.scope_mut(module);
          let name = scope.declare(&item.ident);
          scope.structs.insert(name, item);
          self.declarations.push(Declaration {
            module: module.clone(),
            item,
            cfgs: Vec::new(),
          });
        }
        Item::Type(item) => {
          let scope = self.scope_mut(module);
          let name = scope.declare(&item.ident);
          scope.aliases.insert(name, item);
        }
        Item::Enum(item) => {
          self.scope_mut(module).declare(&item.ident);
        }
        Item::Union(item) => {
          self.scope_mut(module).declare(&item.ident);
        }
        Item::Trait(item) => {
          self.scope_mut(module).declare(&item.ident);
        }
        Item::Mod(item) => {
          let name = self.scope_mut(module).declare(&item.ident);
          let mut child = module.clone();
          child.push(name);
          self.add_cfgs(&child, &item.attrs);
          if let Some((_, ref items)) = item.content {
            self.collect(&child, items);
          }
        }
        Item::Use(item) => {
          let mut prefix = Vec::new();
          if item.leading_colon.is_some() {
            prefix.push(EXTERN_ROOT.to_string());
          }
          flatten_use(&mut prefix, &item.tree, self.scope_mut(module));
        }
        Item::ExternCrate(item) => {
          let name = item.ident.unraw().to_string();
          let path = if name == "self" {
            vec!["crate".to_string()]
          } else {
            vec![EXTERN_ROOT.to_string(), name.clone()]
          };
          let binding = item
            .rename
            .as_ref()
            .map(|(_, rename)| rename.unraw().to_string())
            .unwrap_or(name);
          self.scope_mut(module).uses.insert(binding, path);
        }
        _ => {}
      }
    }
  }

  fn add_cfgs(&mut self, module: &ModulePath, attrs: &[Attribute]) {
    let cfgs = cfg_attrs(attrs);
    if !cfgs.is_empty() {
      self.module_cfgs.entry(module.clone()).or_default().extend(cfgs);
    }
  }

  fn module_chain_cfgs(&self, module: &[String]) -> Vec<Attribute> {
    (1..=module.len())
      .filter_map(|len| self.module_cfgs.get(&module[..len]))
      .flatten()
      .cloned()
      .collect()
  }

  fn scope_mut(&mut self, module: &ModulePath) -> &mut Scope<'a> {
    self.scopes.entry(module.clone()).or_default()
  }

  fn resolve_in(&self, module: &[String], path: &[String], depth: usize) -> Option<ModulePath> {
    if depth > MAX_DEPTH {
      tracing::debug!(module = %module.join("::"), path = %path.join("::"), "import chain too deep");
      return None
    }

    let (first, rest) = path.split_first()?;
    let mut resolved = match first.as_str() {
      EXTERN_ROOT => {
        return if rest.is_empty() { None } else { Some(rest.to_vec()) }
      }
      "crate" => vec!["crate".to_string()],
      "self" => module.to_vec(),
      "super" => parent(module)?,
      // Not bound in this module: an extern crate or a prelude name.
      name => self
        .binding(module, name, depth)
        .unwrap_or_else(|| vec![name.to_string()]),
    };

    for segment in rest {
      resolved = match segment.as_str() {
        "self" => resolved,
        "super" => parent(&resolved)?,
        name if is_local(&resolved) => self.binding(&resolved, name, depth)?,
        name => {
          resolved.push(name.to_string());
          resolved
        }
      };
    }
    Some(resolved)
  }

  /// What `name` means inside the local module `module`, if it is bound there.
  fn binding(&self, module: &[String], name: &str, depth: usize) -> Option<ModulePath> {
    let scope = self.scopes.get(module)?;
    if scope.items.contains(name) {
      let mut path = module.to_vec();
      path.push(name.to_string());
      return Some(path)
    }
    if let Some(path) = scope.uses.get(name) {
      return self.resolve_in(module, path, depth + 1)
    }
    scope.globs.iter().find_map(|glob| {
      let base = self.resolve_in(module, glob, depth + 1)?;
      if is_local(&base) {
        self.binding(&base, name, depth + 1)
      } else {
        None
      }
    })
  }

  fn extern_glob_candidates(
    &self,
    module: &[String],
    name: &str,
    depth: usize,
    out: &mut Vec<ModulePath>,
  ) {
    if depth > MAX_DEPTH {
      return
    }
    let scope = match self.scopes.get(module) {
      Some(scope) => scope,
      None => return,
    };
    for glob in &scope.globs {
      match self.resolve_in(module, glob, depth + 1) {
        Some(base) if is_local(&base) => self.extern_glob_candidates(&base, name, depth + 1, out),
        Some(mut base) => {
          base.push(name.to_string());
          if !out.contains(&base) {
            out.push(base);
          }
        }
        None => {}
      }
    }
  }
}

/// `#[cfg(..)]` attributes among `attrs`, as outer attributes.
fn cfg_attrs(attrs: &[Attribute]) -> Vec<Attribute> {
  attrs
    .iter()
    .filter(|attr| attr.path().is_ident("cfg"))
    .map(|attr| Attribute {
      style: AttrStyle::Outer,
      ..attr.clone()
    })
    .collect()
}

/// `a::b::C` => `["a", "b", "C"]`, with `::` kept as a leading marker.
pub fn path_segments(path: &syn::Path) -> Vec<String> {
  let mut segments = Vec::with_capacity(path.segments.len() + 1);
  if path.leading_colon.is_some() {
    segments.push(EXTERN_ROOT.to_string());
  }
  segments.extend(path.segments.iter().map(|s| s.ident.unraw().to_string()));
  segments
}

fn is_local(path: &[String]) -> bool {
  path.first().map(|s| s == "crate").unwrap_or_default()
}

fn parent(module: &[String]) -> Option<ModulePath> {
  if module.len() > 1 && is_local(module) {
    Some(module[..module.len() - 1].to_vec())
  } else {
    None
  }
}

fn flatten_use(prefix: &mut Vec<String>, tree: &UseTree, scope: &mut Scope<'_>) {
  match tree {
    UseTree::Path(path) => {
      prefix.push(path.ident.unraw().to_string());
      flatten_use(prefix, &path.tree, scope);
      prefix.pop();
    }
    UseTree::Name(name) => {
      let name = name.ident.unraw().to_string();
      bind_use(prefix, name.clone(), name, scope);
    }
    UseTree::Rename(rename) => {
      bind_use(
        prefix,
        rename.ident.unraw().to_string(),
        rename.rename.unraw().to_string(),
        scope,
      );
    }
    UseTree::Glob(_) => scope.globs.push(prefix.clone()),
    UseTree::Group(group) => {
      for tree in &group.items {
        flatten_use(prefix, tree, scope);
      }
    }
  }
}

fn bind_use(prefix: &[String], ident: String, binding: String, scope: &mut Scope<'_>) {
  if binding == "_" {
    return
  }
  let mut path = prefix.to_vec();
  // `use a::b::{self}` binds `b`
  if ident == "self" {
    let binding = if binding == "self" {
      match prefix.last() {
        Some(last) => last.clone(),
        None => return,
      }
    } else {
      binding
    };
    scope.uses.insert(binding, path);
    return
  }
  path.push(ident);
  scope.uses.insert(binding, path);
}
