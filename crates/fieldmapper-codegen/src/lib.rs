extern crate proc_macro;

use quote::quote;

mod marker;

use marker::Marker;

/// Opts a struct into mapper generation. `Target` names the struct that the
/// generated `to_<target>()` method builds.
///
/// The attribute itself leaves the item untouched. The conversion method is
/// produced by the `fieldmapper` build-time generator, which finds structs
/// carrying this attribute by path resolution.
#[proc_macro_attribute]
#[proc_macro_error::proc_macro_error]
pub fn generate_mapper(
  args: proc_macro::TokenStream,
  item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
  let marker = Marker::from_tokens(args.into(), item.into());
  let tokens = quote!(#marker);
  tokens.into()
}
