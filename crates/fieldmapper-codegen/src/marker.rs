use proc_macro2::TokenStream;
use proc_macro_error::{abort, abort_call_site};
use quote::ToTokens;
use syn::{Fields, Item, ItemStruct, Type};

#[derive(Debug)]
pub struct Marker {
  item: ItemStruct,
}

impl Marker {
  pub fn from_tokens(args: TokenStream, item: TokenStream) -> Self {
    if args.is_empty() {
      abort_call_site!("Expected a target type: `#[generate_mapper(Target)]`");
    }

    // Resolution of the target happens at build time; here it only has to be a type.
    if let Err(err) = syn::parse2::<Type>(args.clone()) {
      abort!(args, "Expected exactly one target type: {}", err);
    }

    let item = match syn::parse2::<Item>(item) {
      Ok(Item::Struct(item)) => item,
      Ok(other) => abort!(other, "`#[generate_mapper]` can only be used on structs."),
      Err(err) => abort_call_site!("Invalid item: {}", err),
    };

    if !matches!(item.fields, Fields::Named(_)) {
      abort!(item.fields, "Only support named fields.");
    }

    Self { item }
  }
}

impl ToTokens for Marker {
  // The item passes through unchanged; the build-time generator does the rest.
  fn to_tokens(&self, tokens: &mut TokenStream) {
    self.item.to_tokens(tokens)
  }
}

#[test]
fn test_passthrough() {
  let item = quote::quote! {
    pub struct UpdateBookInput {
      pub id: u64,
      pub name: String,
    }
  };
  let marker = Marker::from_tokens(quote::quote!(crate::entities::Book), item.clone());
  assert_eq!(marker.to_token_stream().to_string(), item.to_string());
}

#[test]
fn test_generic_target() {
  let item = quote::quote! {
    struct Input {
      value: i32,
    }
  };
  let marker = Marker::from_tokens(quote::quote!(Output<i32>), item.clone());
  assert_eq!(marker.to_token_stream().to_string(), item.to_string());
}
