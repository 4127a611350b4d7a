//! Mapping of repository and series names onto single path components.

/// Placeholder for names that would otherwise be empty or refer to a directory itself
const RESERVED_REPLACEMENT: &str = "_";

/// Turn a name into a string usable as one path component inside the datastore.
///
/// GitHub owner and repository names consist of ASCII letters, digits, `-`, `_` and `.`, so those
/// pass through unchanged and everything else becomes `_`. Names that the filesystem gives a
/// meaning of its own (empty, `.`, `..`) are escaped as well so a component never leaves its parent.
#[must_use]
pub fn safe_component(name: &str) -> String {
    if name.is_empty() || name.chars().all(|c| c == '.') {
        return RESERVED_REPLACEMENT.repeat(name.len().max(1));
    }

    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') { c } else { '_' })
        .collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_github_names_unchanged() {
        assert_eq!(safe_component("octocat"), "octocat");
        assert_eq!(safe_component("Hello-World_2"), "Hello-World_2");
        assert_eq!(safe_component("dotted.repo"), "dotted.repo");
        assert_eq!(safe_component(".github"), ".github");
        assert_eq!(safe_component("GITHUB_C_D.csv"), "GITHUB_C_D.csv");
    }

    #[test]
    fn test_separators_replaced() {
        assert_eq!(safe_component("a/x"), "a_x");
        assert_eq!(safe_component("a\\x"), "a_x");
        assert_eq!(safe_component("c:x"), "c_x");
        assert_eq!(safe_component("what?*"), "what__");
    }

    #[test]
    fn test_directory_names_escaped() {
        assert_eq!(safe_component(""), "_");
        assert_eq!(safe_component("."), "_");
        assert_eq!(safe_component(".."), "__");
        assert_eq!(safe_component("../etc"), ".._etc");
    }

    #[test]
    fn test_non_ascii_replaced() {
        assert_eq!(safe_component("répo"), "r_po");
    }
}
