//! Naming rules for Entities and Attributes
//!
//! ## Validation
//!
//! - Entity and Attribute names: `[A-Za-z0-9]+`
//! - Entity namespaces and listing fragments: `[A-Za-z0-9.]+`
//!
//! ## Full names
//!
//! An Entity is addressed by `namespace.name`. The namespace is omitted when
//! it is empty, so `foo` and `a.b.foo` are both full names. Splitting happens
//! on the last dot: everything before it is the namespace.

/// Check a name against `[A-Za-z0-9]+`
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Check a namespace (or full-name fragment) against `[A-Za-z0-9.]+`
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.')
}

/// Join a namespace and a name into a full name
///
/// The namespace is omitted when empty.
pub fn join_full_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// A full name split into its parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullName<'a> {
    /// Everything before the last dot (empty when there is no dot)
    pub namespace: &'a str,
    /// Everything after the last dot
    pub name: &'a str,
    /// Whether the input contained a dot at all
    pub qualified: bool,
}

impl<'a> FullName<'a> {
    /// Split on the last `.`
    pub fn parse(full_name: &'a str) -> Self {
        match full_name.rsplit_once('.') {
            Some((namespace, name)) => FullName {
                namespace,
                name,
                qualified: true,
            },
            None => FullName {
                namespace: "",
                name: full_name,
                qualified: false,
            },
        }
    }
}

/// Strip one stray leading and one stray trailing dot from a key
///
/// Used to tidy keys like `".foo"` or `"a."` before quoting them in messages.
pub fn trim_dots(key: &str) -> &str {
    let key = key.strip_prefix('.').unwrap_or(key);
    key.strip_suffix('.').unwrap_or(key)
}
