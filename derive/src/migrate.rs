use crate::common::{resolve_migrations_dir, Result};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote, ToTokens, TokenStreamExt};
use std::fs::{metadata, read_dir, read_to_string};
use std::path::Path;
use syn::parse::Parse;
use syn::token::Super;
use syn::{Item, LitStr, Token, Type, VisRestricted, Visibility};

pub(crate) struct MigrationsInput {
    pub_token: Option<Token![pub]>,
    ident: Ident,
    _lt: Token![<],
    schema: Type,
    _gt: Token![>],
    _comma: Token![,],
    path: LitStr,
}

impl Parse for MigrationsInput {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let pub_token = if input.peek(Token![pub]) {
            Some(input.parse()?)
        } else {
            None
        };

        Ok(Self {
            pub_token,
            ident: input.parse()?,
            _lt: input.parse()?,
            schema: input.parse()?,
            _gt: input.parse()?,
            _comma: input.parse()?,
            path: input.parse()?,
        })
    }
}

struct QuotedMigration {
    version: String,
    mod_name: Ident,

    has_is_transactional: bool,
    has_pre_up: bool,
    has_post_up: bool,
    has_pre_down: bool,
    has_post_down: bool,
}

impl QuotedMigration {
    fn optional(&self, present: bool, func: &str) -> TokenStream {
        let mod_name = &self.mod_name;
        let func = format_ident!("{}", func);
        if present {
            quote! { Some(&#mod_name::#func) }
        } else {
            quote! { None }
        }
    }
}

impl ToTokens for QuotedMigration {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let version = &self.version;
        let mod_name = &self.mod_name;

        let is_transactional_ref = self.optional(self.has_is_transactional, "is_transactional");
        let pre_up_ref = self.optional(self.has_pre_up, "pre_up");
        let post_up_ref = self.optional(self.has_post_up, "post_up");
        let pre_down_ref = self.optional(self.has_pre_down, "pre_down");
        let post_down_ref = self.optional(self.has_post_down, "post_down");

        tokens.append_all(quote! {
            ::creed_migrate::migrate::FnMigration {
                version: #version,
                description: &#mod_name::description,
                is_transactional: #is_transactional_ref,
                up: &#mod_name::up,
                down: &#mod_name::down,
                pre_up: #pre_up_ref,
                post_up: #post_up_ref,
                pre_down: #pre_down_ref,
                post_down: #post_down_ref,
            }
        });
    }
}

fn is_valid_version(version: &str) -> bool {
    !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn expand_migrations_from_lit_dir(input: MigrationsInput) -> Result<TokenStream> {
    let path = resolve_migrations_dir(input.path.value(), input.path.span())?;
    expand_migrations(&path, &input.ident, &input.schema, &input.pub_token)
}

pub(crate) fn expand_migrations(
    path: &Path,
    name: &Ident,
    schema: &Type,
    pub_token: &Option<Token![pub]>,
) -> Result<TokenStream> {
    let mut files = Vec::new();
    for entry in read_dir(path)? {
        let entry = entry?;
        if !metadata(entry.path())?.is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.starts_with("version_") || !file_name.ends_with(".rs") {
            // not of the format: version_<VERSION>.rs; ignore
            continue;
        }

        files.push((file_name, entry.path()));
    }

    // read_dir order is platform dependent
    files.sort();

    let mut migrations = Vec::new();
    let mut migrations_mods = Vec::new();

    for (file_name, file_path) in files {
        let version = file_name["version_".len()..file_name.len() - 3].to_string();
        if !is_valid_version(&version) {
            return Err(syn::Error::new(
                Span::call_site(),
                format!("invalid migration version \"{}\" in {}", version, file_name),
            )
            .into());
        }

        let mod_name = format_ident!("version_{}", version);
        let migration_file = read_to_string(&file_path)?;
        let mut program = syn::parse_file(&migration_file)?;

        let mut quoted_migration = QuotedMigration {
            version,
            mod_name: mod_name.clone(),
            has_is_transactional: false,
            has_pre_up: false,
            has_post_up: false,
            has_pre_down: false,
            has_post_down: false,
        };

        let mut has_description = false;
        let mut has_up = false;
        let mut has_down = false;

        for item in program.items.iter_mut() {
            if let Item::Fn(func) = item {
                func.vis = Visibility::Restricted(VisRestricted {
                    pub_token: Default::default(),
                    paren_token: Default::default(),
                    in_token: None,
                    path: Box::new(syn::Path::from(syn::parse_str::<Super>("super")?)),
                });

                match func.sig.ident.to_string().as_str() {
                    "description" => has_description = true,
                    "is_transactional" => quoted_migration.has_is_transactional = true,
                    "up" => has_up = true,
                    "down" => has_down = true,
                    "pre_up" => quoted_migration.has_pre_up = true,
                    "post_up" => quoted_migration.has_post_up = true,
                    "pre_down" => quoted_migration.has_pre_down = true,
                    "post_down" => quoted_migration.has_post_down = true,
                    _ => {}
                }
            }
        }

        if !has_up || !has_down {
            return Err(syn::Error::new(
                Span::call_site(),
                format!("{} must define both `up` and `down` functions", file_name),
            )
            .into());
        }

        let default_description = if has_description {
            quote! {}
        } else {
            quote! {
                pub(super) fn description() -> &'static str {
                    ""
                }
            }
        };

        // makes the compiler watch the file for changes
        let tracked_path = file_path.to_string_lossy().into_owned();

        migrations_mods.push(quote! {
            mod #mod_name {
                const _: &str = include_str!(#tracked_path);

                #default_description
                #program
            }
        });
        migrations.push(quoted_migration);
    }

    Ok(quote! {
        #pub_token static #name: ::creed_migrate::migrate::StaticMigrations<#schema> =
            ::creed_migrate::migrate::StaticMigrations::new(&[
                #(#migrations),*
            ]);

        #(#migrations_mods)*
    })
}
