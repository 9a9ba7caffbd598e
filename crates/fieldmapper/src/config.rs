//! Generator configuration.

use proc_macro2::{Ident, Span};
use syn::ext::IdentExt;

/// Paths the marker attribute may resolve to. The facade re-exports the
/// attribute from the codegen crate, so both name the same item.
pub const MARKER_PATHS: &[&str] = &[
  "fieldmapper::generate_mapper",
  "fieldmapper_codegen::generate_mapper",
];

pub const METHOD_PREFIX: &str = "to_";
pub const KEY_SUFFIX: &str = "_Mapper";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  markers: Vec<Vec<String>>,
  method_prefix: String,
  key_suffix: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      markers: MARKER_PATHS.iter().map(|path| split_path(path)).collect(),
      method_prefix: METHOD_PREFIX.to_string(),
      key_suffix: KEY_SUFFIX.to_string(),
    }
  }
}

impl Config {
  pub fn new() -> Self {
    Self::default()
  }

  /// Accept one more canonical path as the marker, e.g. when the attribute is
  /// re-exported from another crate.
  pub fn with_marker(mut self, path: &str) -> Self {
    let path = split_path(path);
    if !self.markers.contains(&path) {
      self.markers.push(path);
    }
    self
  }

  pub fn with_method_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.method_prefix = prefix.into();
    self
  }

  pub fn with_key_suffix(mut self, suffix: impl Into<String>) -> Self {
    self.key_suffix = suffix.into();
    self
  }

  /// Whether a resolved attribute path is the marker's identity.
  pub fn is_marker(&self, canonical: &[String]) -> bool {
    self.markers.iter().any(|marker| marker.as_slice() == canonical)
  }

  /// `Book` => `to_book`
  pub fn method_name(&self, target: &Ident) -> Ident {
    let name = format!("{}{}", self.method_prefix, snake_case(&target.unraw().to_string()));
    Ident::new(&name, Span::call_site())
  }

  /// `UpdateBookInput` => `UpdateBookInput_Mapper`
  pub fn unit_key(&self, source: &Ident) -> String {
    format!("{}{}", source.unraw(), self.key_suffix)
  }
}

fn split_path(path: &str) -> Vec<String> {
  path
    .trim_start_matches("::")
    .split("::")
    .map(|segment| segment.trim().to_string())
    .collect()
}

fn snake_case(name: &str) -> String {
  let chars: Vec<char> = name.chars().collect();
  let mut out = String::with_capacity(name.len() + 4);
  for (i, &c) in chars.iter().enumerate() {
    if c.is_uppercase() {
      if i > 0 {
        let prev = chars[i - 1];
        let next_lower = chars.get(i + 1).map(|c| c.is_lowercase()).unwrap_or_default();
        if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
          out.push('_');
        }
      }
      out.extend(c.to_lowercase());
    } else {
      out.push(c);
    }
  }
  out
}

#[test]
fn test_snake_case() {
  assert_eq!(snake_case("Book"), "book");
  assert_eq!(snake_case("BookEntity"), "book_entity");
  assert_eq!(snake_case("HTTPServer"), "http_server");
  assert_eq!(snake_case("BookV2"), "book_v2");
  assert_eq!(snake_case("already_snake"), "already_snake");
}

#[test]
fn test_method_name() {
  let config = Config::default();
  let ident = Ident::new("Book", Span::call_site());
  assert_eq!(config.method_name(&ident).to_string(), "to_book");

  let config = Config::default().with_method_prefix("into_");
  assert_eq!(config.method_name(&ident).to_string(), "into_book");
}

#[test]
fn test_markers() {
  let config = Config::default();
  assert!(config.is_marker(&split_path("fieldmapper::generate_mapper")));
  assert!(config.is_marker(&split_path("fieldmapper_codegen::generate_mapper")));
  assert!(!config.is_marker(&split_path("other::generate_mapper")));
  assert!(!config.is_marker(&split_path("generate_mapper")));

  let config = config.with_marker("::my_prelude::generate_mapper");
  assert!(config.is_marker(&split_path("my_prelude::generate_mapper")));
}

#[test]
fn test_unit_key() {
  let ident = Ident::new("UpdateBookInput", Span::call_site());
  assert_eq!(Config::default().unit_key(&ident), "UpdateBookInput_Mapper");
}
