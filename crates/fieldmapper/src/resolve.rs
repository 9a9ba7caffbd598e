//! Binds a struct's attributes to the marker and the marker's argument to a
//! target struct. Binding goes through [`ModuleTree`] path resolution, never
//! through the spelling of the attribute.

use crate::config::Config;
use crate::program::ModulePath;
use crate::scope::{path_segments, Declaration, ModuleTree};
use quote::ToTokens;
use syn::{Attribute, Fields, ItemStruct, PathArguments, Type, TypePath};

const MAX_ALIAS_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct Target<'a> {
  pub path: ModulePath,
  pub item: &'a ItemStruct,
  /// Generic arguments written on the target, `<u32>` in `Page<u32>`.
  pub arguments: PathArguments,
}

#[derive(Debug, Clone)]
pub struct Resolved<'a> {
  pub source: Declaration<'a>,
  pub target: Target<'a>,
}

/// Cheap rejection: a struct without attributes cannot carry the marker.
pub fn has_attributes(item: &ItemStruct) -> bool {
  !item.attrs.is_empty()
}

/// Resolves a candidate to its target, or `None` when it should be skipped.
#[tracing::instrument(level = "debug", skip_all, fields(source = %decl.item.ident))]
pub fn resolve<'a>(
  tree: &ModuleTree<'a>,
  config: &Config,
  decl: &Declaration<'a>,
) -> Option<Resolved<'a>> {
  if !has_attributes(decl.item) {
    return None
  }
  let ty = marker_argument(tree, config, decl)?;
  match resolve_target(tree, &decl.module, &ty) {
    Some(target) => Some(Resolved {
      source: decl.clone(),
      target,
    }),
    None => {
      tracing::debug!(
        target_type = %ty.to_token_stream(),
        "target is not a struct with named fields in this crate"
      );
      None
    }
  }
}

/// The type argument of the first attribute bound to the marker.
pub fn marker_argument(tree: &ModuleTree<'_>, config: &Config, decl: &Declaration<'_>) -> Option<Type> {
  let mut markers = decl
    .item
    .attrs
    .iter()
    .filter(|attr| is_marker(tree, config, &decl.module, attr));
  let first = markers.next()?;
  if markers.next().is_some() {
    tracing::debug!("more than one marker attribute, using the first");
  }
  match first.parse_args::<Type>() {
    Ok(ty) => Some(ty),
    Err(err) => {
      tracing::debug!(%err, "marker attribute does not name exactly one type");
      None
    }
  }
}

fn is_marker(tree: &ModuleTree<'_>, config: &Config, module: &[String], attr: &Attribute) -> bool {
  tree
    .resolve_candidates(module, &path_segments(attr.path()))
    .iter()
    .any(|canonical| config.is_marker(canonical))
}

/// Resolves `ty`, as written in `module`, to a struct with named fields.
pub fn resolve_target<'a>(tree: &ModuleTree<'a>, module: &[String], ty: &Type) -> Option<Target<'a>> {
  resolve_target_in(tree, module, ty, 0)
}

fn resolve_target_in<'a>(
  tree: &ModuleTree<'a>,
  module: &[String],
  ty: &Type,
  depth: usize,
) -> Option<Target<'a>> {
  if depth > MAX_ALIAS_DEPTH {
    return None
  }

  let path = match ty {
    Type::Path(TypePath { qself: None, path }) => path,
    Type::Paren(paren) => return resolve_target_in(tree, module, &paren.elem, depth),
    Type::Group(group) => return resolve_target_in(tree, module, &group.elem, depth),
    _ => return None,
  };
  let canonical = tree.resolve_path(module, &path_segments(path))?;
  let arguments = path.segments.last()?.arguments.clone();

  if let Some(item) = tree.struct_def(&canonical) {
    return match item.fields {
      Fields::Named(_) | Fields::Unit => Some(Target {
        path: canonical,
        item,
        arguments,
      }),
      Fields::Unnamed(_) => None,
    }
  }

  // `type Alias = Book;` stands for `Book`; generic aliases are not followed.
  let alias = tree.type_alias(&canonical)?;
  if !alias.generics.params.is_empty() || !arguments.is_empty() {
    return None
  }
  let (_, alias_module) = canonical.split_last()?;
  resolve_target_in(tree, alias_module, &alias.ty, depth + 1)
}
