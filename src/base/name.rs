//! Display-name normalization.

use smol_str::SmolStr;

/// Normalize a name for use as a model identifier.
///
/// Spaces and hyphens become underscores and `&` becomes `and`. The same
/// rule applies to object names, package path segments and token literals
/// that could not be linked to an object.
pub fn normalize_name(name: &str) -> SmolStr {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            ' ' | '-' => out.push('_'),
            '&' => out.push_str("and"),
            other => out.push(other),
        }
    }
    SmolStr::from(out)
}
