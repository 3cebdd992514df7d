//! Resolvable name syntax: a bare key, or `family:arg1;arg2;...;argN`.

/// Split `name` into its family and ordered argument list.
///
/// Only the first `:` separates the family; the rest is the argument blob,
/// split on `;`. A name without `:` is its own family with no arguments.
pub fn split(name: &str) -> (&str, Vec<String>) {
    match name.split_once(':') {
        Some((family, blob)) => (family, blob.split(';').map(str::to_owned).collect()),
        None => (name, Vec::new()),
    }
}
