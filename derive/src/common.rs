use proc_macro2::Span;
use std::env;
use std::path::{Path, PathBuf};

/// Resolves the migrations directory against the invoking crate's manifest.
pub(crate) fn resolve_migrations_dir(
    path: impl AsRef<Path>,
    err_span: Span,
) -> syn::Result<PathBuf> {
    let path = path.as_ref();
    if path.is_absolute() {
        return Err(syn::Error::new(
            err_span,
            "the migrations directory must be relative to the crate manifest",
        ));
    }

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").map_err(|_| {
        syn::Error::new(
            err_span,
            "CARGO_MANIFEST_DIR is not set; please use Cargo to build",
        )
    })?;

    let dir = Path::new(&manifest_dir).join(path);
    if !dir.is_dir() {
        return Err(syn::Error::new(
            err_span,
            format!("migrations directory {} does not exist", dir.display()),
        ));
    }

    Ok(dir)
}

pub(crate) type Error = Box<dyn std::error::Error>;
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::resolve_migrations_dir;
    use proc_macro2::Span;

    #[test]
    fn resolves_relative_directories() {
        let dir = resolve_migrations_dir("src", Span::call_site()).unwrap();
        assert!(dir.ends_with("src"));
        assert!(dir.is_absolute());
    }

    #[test]
    fn rejects_absolute_and_missing_directories() {
        assert!(resolve_migrations_dir("/tmp", Span::call_site()).is_err());
        assert!(resolve_migrations_dir("no_such_dir", Span::call_site()).is_err());
    }
}
