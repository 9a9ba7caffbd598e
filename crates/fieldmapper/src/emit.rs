//! Renders a generated unit: an inherent `impl` block on the source struct
//! holding one method that builds the target from the planned fields.
//!
//! Paths are emitted from `crate::`, so the unit compiles wherever the crate
//! includes it.

use crate::config::Config;
use crate::resolve::Resolved;
use crate::shape::MappingPlan;
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{PathArguments, PathSegment};

pub const HEADER: &str = "// @generated by fieldmapper. Do not edit.";

/// Formatted source text for one generated unit.
pub fn emit(config: &Config, resolved: &Resolved<'_>, plan: &MappingPlan) -> syn::Result<String> {
  let tokens = mapper_tokens(config, resolved, plan);
  let file: syn::File = syn::parse2(tokens)?;
  Ok(format!(
    "{}\n// source: {}\n\n{}",
    HEADER,
    resolved.source.path().join("::"),
    prettyplease::unparse(&file)
  ))
}

pub fn mapper_tokens(config: &Config, resolved: &Resolved<'_>, plan: &MappingPlan) -> TokenStream {
  let source = &resolved.source;
  let target = &resolved.target;

  let cfgs = &source.cfgs;
  let source_path = path(&source.path(), PathArguments::None);
  let (impl_generics, ty_generics, where_clause) = source.item.generics.split_for_impl();
  let target_ty = path(&target.path, target.arguments.clone());
  let target_expr = path(&target.path, turbofish(target.arguments.clone()));
  let method = config.method_name(&target.item.ident);
  let doc = format!(
    " Builds a `{}` from the fields it shares with `{}`.",
    target.item.ident.unraw(),
    source.item.ident.unraw()
  );

  let assign_items = plan.fields().iter().map(|field| {
    quote! {
      #field: ::core::clone::Clone::clone(&self.#field)
    }
  });

  quote! {
    #(#cfgs)*
    impl #impl_generics #source_path #ty_generics #where_clause {
      #[doc = #doc]
      pub fn #method(&self) -> #target_ty {
        #target_expr {
          #(#assign_items),*
        }
      }
    }
  }
}

fn path(segments: &[String], arguments: PathArguments) -> syn::Path {
  let mut path = syn::Path {
    leading_colon: None,
    segments: Punctuated::new(),
  };
  for segment in segments {
    path.segments.push(PathSegment::from(ident(segment)));
  }
  if let Some(last) = path.segments.last_mut() {
    last.arguments = arguments;
  }
  path
}

fn ident(name: &str) -> Ident {
  match name {
    "crate" | "self" | "super" | "Self" => Ident::new(name, Span::call_site()),
    _ if syn::parse_str::<Ident>(name).is_ok() => Ident::new(name, Span::call_site()),
    _ => Ident::new_raw(name, Span::call_site()),
  }
}

// `Page<u32>` in type position is `Page::<u32>` in a struct expression.
fn turbofish(arguments: PathArguments) -> PathArguments {
  match arguments {
    PathArguments::AngleBracketed(mut args) => {
      args.colon2_token = Some(Default::default());
      PathArguments::AngleBracketed(args)
    }
    other => other,
  }
}
