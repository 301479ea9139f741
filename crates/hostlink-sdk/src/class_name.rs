//! Fully-qualified managed class names

use std::borrow::Cow;
use std::fmt;

use crate::error::{BridgeError, BridgeResult};

/// A fully-qualified class name, stored in internal (`a/b/C`) form.
///
/// Accepts either the dotted source form (`com.firelord.Test`) or the
/// internal form (`com/firelord/Test`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassName(Cow<'static, str>);

impl ClassName {
    /// Parse and normalize a class name.
    pub fn new(name: &str) -> BridgeResult<Self> {
        if name.is_empty() || has_empty_segment(name) {
            return Err(BridgeError::InvalidClassName(name.to_string()));
        }
        // Mixed separators are ambiguous
        if name.contains('.') && name.contains('/') {
            return Err(BridgeError::InvalidClassName(name.to_string()));
        }
        let valid = name
            .split(['.', '/'])
            .all(|seg| seg.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$'));
        if !valid || name.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(BridgeError::InvalidClassName(name.to_string()));
        }
        Ok(Self(Cow::Owned(name.replace('.', "/"))))
    }

    /// Wrap a name already in internal form, without validation.
    ///
    /// For compile-time constants; runtime input goes through [`ClassName::new`].
    pub const fn from_static(internal: &'static str) -> Self {
        Self(Cow::Borrowed(internal))
    }

    /// Internal form used for host lookups, e.g. `com/firelord/Test`.
    pub fn internal(&self) -> &str {
        &self.0
    }

    /// Dotted source form, e.g. `com.firelord.Test`.
    pub fn dotted(&self) -> String {
        self.0.replace('/', ".")
    }

    /// Unqualified name, e.g. `Test`.
    pub fn simple_name(&self) -> &str {
        let name = self.internal();
        name.rsplit('/').next().unwrap_or(name)
    }

    /// Package in internal form, empty for the default package.
    pub fn package(&self) -> &str {
        let name = self.internal();
        match name.rfind('/') {
            Some(idx) => &name[..idx],
            None => "",
        }
    }
}

fn has_empty_segment(name: &str) -> bool {
    name.split(['.', '/']).any(str::is_empty)
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ClassName {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_and_internal_agree() {
        let a = ClassName::new("com.firelord.Test").unwrap();
        let b = ClassName::new("com/firelord/Test").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.internal(), "com/firelord/Test");
        assert_eq!(a.dotted(), "com.firelord.Test");
        assert_eq!(a.simple_name(), "Test");
        assert_eq!(a.package(), "com/firelord");
    }

    #[test]
    fn test_default_package() {
        let n = ClassName::new("Main").unwrap();
        assert_eq!(n.simple_name(), "Main");
        assert_eq!(n.package(), "");
    }

    #[test]
    fn test_nested_class() {
        let n = ClassName::new("com.firelord.Test$Inner").unwrap();
        assert_eq!(n.simple_name(), "Test$Inner");
    }

    #[test]
    fn test_rejects_malformed() {
        let malformed = [
            "",
            "com..Test",
            "com/firelord.Test",
            "/Test",
            "Test/",
            "com.fire-lord.Test",
            "9Test",
        ];
        for bad in malformed {
            assert!(ClassName::new(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_static_matches_parsed() {
        const TEST: ClassName = ClassName::from_static("com/firelord/Test");
        assert_eq!(TEST, ClassName::new("com.firelord.Test").unwrap());
        assert_eq!(TEST.simple_name(), "Test");
        assert_eq!(TEST.package(), "com/firelord");
    }
}
