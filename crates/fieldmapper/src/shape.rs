//! Field shapes and the mapping plan computed from them.

use proc_macro2::Ident;
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::{Fields, ItemStruct};

/// Named fields of a struct in declaration order. Tuple and unit structs have none.
///
/// No visibility filtering: private fields are part of the shape, and
/// referencing one the generated code cannot see is reported by rustc.
/// Fields holding other structs are not flattened.
pub fn field_names(item: &ItemStruct) -> Vec<Ident> {
  match item.fields {
    Fields::Named(ref fields) => fields
      .named
      .iter()
      .filter_map(|field| field.ident.clone())
      .collect(),
    Fields::Unnamed(_) | Fields::Unit => Vec::new(),
  }
}

/// Fields copied by a generated mapper, in source declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MappingPlan {
  fields: Vec<Ident>,
}

impl MappingPlan {
  pub fn fields(&self) -> &[Ident] {
    &self.fields
  }

  pub fn names(&self) -> Vec<String> {
    self.fields.iter().map(|f| f.unraw().to_string()).collect()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }
}

/// Intersection of `source` and `target` by name, keeping the source order.
/// Each name appears once even if an input repeats it.
pub fn plan(source: &[Ident], target: &[Ident]) -> MappingPlan {
  let target: HashSet<String> = target.iter().map(|f| f.unraw().to_string()).collect();
  let mut seen = HashSet::new();
  let fields = source
    .iter()
    .filter(|field| {
      let name = field.unraw().to_string();
      target.contains(&name) && seen.insert(name)
    })
    .cloned()
    .collect();
  MappingPlan { fields }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proc_macro2::Span;

  fn idents(names: &[&str]) -> Vec<Ident> {
    names.iter().map(|name| Ident::new(name, Span::call_site())).collect()
  }

  #[test]
  fn test_field_names() {
    let item: ItemStruct = syn::parse_quote! {
      pub struct UpdateBookInput {
        pub id: u64,
        pub name: String,
        author: String,
        pub(crate) page_count: u32,
      }
    };
    let names: Vec<_> = field_names(&item).iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["id", "name", "author", "page_count"]);

    let item: ItemStruct = syn::parse_quote!(struct Tuple(u32, String););
    assert!(field_names(&item).is_empty());
    let item: ItemStruct = syn::parse_quote!(struct Unit;);
    assert!(field_names(&item).is_empty());
  }

  #[test]
  fn test_embedded_struct_not_flattened() {
    let item: ItemStruct = syn::parse_quote! {
      struct Wrapper {
        base: Base,
        extra: u32,
      }
    };
    let names: Vec<_> = field_names(&item).iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["base", "extra"]);
  }

  #[test]
  fn test_plan_keeps_source_order() {
    let source = idents(&["A", "B", "C"]);
    assert_eq!(plan(&source, &idents(&["B", "C", "D"])).names(), vec!["B", "C"]);
    assert_eq!(plan(&source, &idents(&["D", "C", "B"])).names(), vec!["B", "C"]);
  }

  #[test]
  fn test_plan_disjoint() {
    let plan = plan(&idents(&["a", "b"]), &idents(&["c"]));
    assert!(plan.is_empty());
    assert!(plan.fields().is_empty());
  }

  #[test]
  fn test_plan_dedup() {
    let source = idents(&["a", "b", "a"]);
    let target = idents(&["a", "a", "b"]);
    assert_eq!(plan(&source, &target).names(), vec!["a", "b"]);
  }

  #[test]
  fn test_plan_raw_idents() {
    let source = vec![Ident::new_raw("type", Span::call_site()), Ident::new("name", Span::call_site())];
    let target = idents(&["name"]).into_iter().chain(vec![Ident::new_raw("type", Span::call_site())]).collect::<Vec<_>>();
    let plan = plan(&source, &target);
    assert_eq!(plan.names(), vec!["type", "name"]);
    assert_eq!(plan.fields()[0].to_string(), "r#type");
  }

  #[test]
  fn test_book_plan() {
    let source = idents(&["id", "name", "author", "page_count"]);
    let target = idents(&["name", "author", "page_count"]);
    assert_eq!(plan(&source, &target).names(), vec!["name", "author", "page_count"]);
  }
}
