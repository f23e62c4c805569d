//! URL and file path helpers

use url::Url;

/// Resolve a module specifier against a card URL
///
/// Absolute specifiers are normalized; relative ones are joined the way a
/// browser resolves `new URL(specifier, base)`.
///
/// # Examples
///
/// ```
/// use cardstack_compiler::utils::resolve_card_url;
///
/// assert_eq!(
///     resolve_card_url("../person", "https://demo.com/cards/user").unwrap(),
///     "https://demo.com/person"
/// );
/// assert_eq!(
///     resolve_card_url("https://cardstack.com/base/string", "https://demo.com/user").unwrap(),
///     "https://cardstack.com/base/string"
/// );
/// ```
pub fn resolve_card_url(specifier: &str, base: &str) -> Result<String, url::ParseError> {
    let base = Url::parse(base)?;
    Ok(base.join(specifier)?.to_string())
}

/// Split a file path into its basename and extension (with the dot)
///
/// ```
/// use cardstack_compiler::utils::basename_and_extension;
///
/// assert_eq!(basename_and_extension("embedded.js"), ("embedded", ".js"));
/// assert_eq!(basename_and_extension("templates/isolated.hbs"), ("templates/isolated", ".hbs"));
/// assert_eq!(basename_and_extension("README"), ("README", ""));
/// ```
pub fn basename_and_extension(path: &str) -> (&str, &str) {
    let file_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => path.split_at(file_start + dot),
        _ => (path, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sibling_card() {
        assert_eq!(
            resolve_card_url("./date", "https://cardstack.com/base/string").unwrap(),
            "https://cardstack.com/base/date"
        );
    }

    #[test]
    fn test_resolve_requires_absolute_base() {
        assert!(resolve_card_url("../person", "cards/user").is_err());
    }

    #[test]
    fn test_dotfile_has_no_extension() {
        assert_eq!(basename_and_extension(".eslintrc"), (".eslintrc", ""));
    }
}
