//! Rule filters.
//!
//! A filter pairs a path pattern (engine regex syntax) with a namespace. An
//! empty namespace means the default `"file"` namespace. An empty pattern
//! matches nothing; use [`filters::ALL_FILES`] to match everything.

use serde::{Deserialize, Serialize};

/// Scope of a resolve rule, matched against the unresolved import path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolveFilter {
    pub pattern: String,
    pub namespace: String,
}

impl ResolveFilter {
    pub fn new(pattern: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            namespace: namespace.into(),
        }
    }

    /// Match `pattern` in the file namespace.
    pub fn path(pattern: impl Into<String>) -> Self {
        Self::new(pattern, "")
    }

    pub fn path_in(pattern: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(pattern, namespace)
    }

    /// Whether the rule can ever fire.
    pub fn is_active(&self) -> bool {
        !self.pattern.is_empty()
    }
}

/// Scope of a load rule, matched against the resolved module path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadFilter {
    pub pattern: String,
    pub namespace: String,
}

impl LoadFilter {
    pub fn new(pattern: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            namespace: namespace.into(),
        }
    }

    pub fn path(pattern: impl Into<String>) -> Self {
        Self::new(pattern, "")
    }

    /// Every module in `namespace`.
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self::new(filters::ALL_FILES, namespace)
    }

    pub fn path_in(pattern: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::new(pattern, namespace)
    }

    pub fn is_active(&self) -> bool {
        !self.pattern.is_empty()
    }
}

/// Common path patterns.
pub mod filters {
    /// Matches every path.
    pub const ALL_FILES: &str = ".*";
    pub const JS_FILES: &str = r"\.(js|mjs|cjs)$";
    pub const JSX_FILES: &str = r"\.jsx$";
    pub const TS_FILES: &str = r"\.(ts|mts|cts)$";
    pub const TSX_FILES: &str = r"\.tsx$";
    pub const SCRIPT_FILES: &str = r"\.(js|mjs|cjs|jsx|ts|mts|cts|tsx)$";
    pub const CSS_FILES: &str = r"\.css$";
    pub const JSON_FILES: &str = r"\.json$";
    pub const TEXT_FILES: &str = r"\.txt$";
    pub const IMAGE_FILES: &str = r"\.(png|jpe?g|gif|webp|svg)$";
    /// Bare specifiers: anything not starting with `.` or `/`.
    pub const BARE_IMPORTS: &str = r"^[^./]";
    pub const RELATIVE_IMPORTS: &str = r"^\.\.?/";
    pub const SCSS_FILES: &str = r"\.(scss|sass)$";
    pub const LESS_FILES: &str = r"\.less$";
    pub const FONT_FILES: &str = r"\.(woff2?|ttf|otf|eot)$";

    /// Exact package imports.
    pub const REACT: &str = r"^react$";
    pub const REACT_DOM: &str = r"^react-dom(/.*)?$";
    /// `lodash` and its per-method entry points.
    pub const LODASH: &str = r"^lodash(/.*)?$";
    pub const JQUERY: &str = r"^jquery$";
}

/// Common namespaces.
pub mod namespaces {
    /// Modules on the file system.
    pub const FILE: &str = "file";
    pub const VIRTUAL: &str = "virtual";
    pub const GLOBAL_EXTERNAL: &str = "global-external";
    pub const ENV: &str = "env";
    /// Modules fetched over the network.
    pub const HTTP: &str = "http";
    pub const HTTPS: &str = "https";
    pub const GENERATED: &str = "generated";
    pub const TRANSFORMED: &str = "transformed";
    /// Paths kept out of the bundle.
    pub const EXTERNAL: &str = "external";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(ResolveFilter::path("^a$"), ResolveFilter::new("^a$", ""));
        assert_eq!(
            LoadFilter::namespace(namespaces::VIRTUAL),
            LoadFilter::new(".*", "virtual")
        );
    }

    #[test]
    fn test_empty_pattern_is_inactive() {
        assert!(!ResolveFilter::default().is_active());
        assert!(!LoadFilter::path("").is_active());
        assert!(LoadFilter::path(filters::ALL_FILES).is_active());
    }

    #[test]
    fn test_patterns_compile() {
        for pattern in [
            filters::ALL_FILES,
            filters::SCRIPT_FILES,
            filters::IMAGE_FILES,
            filters::BARE_IMPORTS,
            filters::RELATIVE_IMPORTS,
            filters::SCSS_FILES,
            filters::LESS_FILES,
            filters::FONT_FILES,
            filters::REACT,
            filters::REACT_DOM,
            filters::LODASH,
            filters::JQUERY,
        ] {
            assert!(regex::Regex::new(pattern).is_ok(), "{}", pattern);
        }
    }

    #[test]
    fn test_package_patterns() {
        let matches = |pattern: &str, path: &str| regex::Regex::new(pattern).unwrap().is_match(path);
        assert!(matches(filters::REACT, "react"));
        assert!(!matches(filters::REACT, "react-dom"));
        assert!(matches(filters::REACT_DOM, "react-dom/client"));
        assert!(matches(filters::LODASH, "lodash/merge"));
        assert!(!matches(filters::LODASH, "lodash-es"));
        assert!(matches(filters::JQUERY, "jquery"));
        assert!(matches(filters::SCSS_FILES, "theme.sass"));
        assert!(matches(filters::LESS_FILES, "theme.less"));
        assert!(matches(filters::FONT_FILES, "inter.woff2"));
        assert!(!matches(filters::FONT_FILES, "inter.woff3"));
        assert_eq!(namespaces::HTTPS, "https");
        assert_eq!(namespaces::EXTERNAL, "external");
    }
}
