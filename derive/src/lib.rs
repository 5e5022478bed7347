extern crate proc_macro;

mod common;
mod migrate;

use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;

/// Builds a static migrations catalog from the `version_<VERSION>.rs` files
/// of a directory, relative to the crate manifest.
///
/// ```ignore
/// migrations!(pub MIGRATIONS<MySchema>, "migrations");
/// ```
#[proc_macro]
pub fn migrations(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as migrate::MigrationsInput);
    match migrate::expand_migrations_from_lit_dir(input) {
        Ok(ts) => ts.into(),
        Err(e) => {
            if let Some(parse_err) = e.downcast_ref::<syn::Error>() {
                parse_err.to_compile_error().into()
            } else {
                let msg = e.to_string();
                quote!(::std::compile_error!(#msg)).into()
            }
        }
    }
}
