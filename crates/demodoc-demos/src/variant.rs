//! Source variant for demo files.
//!
//! The variant decides which transform branch a source file takes and which
//! display language the highlighter receives.

use std::path::Path;

/// Content category of a referenced demo source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// Single-file component (`.vue`). The default.
    #[default]
    Component,
    /// Alternate-framework component (`.tsx`/`.jsx`).
    AltFramework,
    /// Plain markup (`.html`), previewed in an iframe.
    Markup,
    /// Typed script (`.ts`), rendered both typed and de-typed.
    TypedScript,
    /// Plain script (`.js`).
    Script,
}

impl Variant {
    /// Parse a declared variant from tag attributes.
    ///
    /// Accepts both the canonical names and the file-type spellings used by
    /// authors (`vue`, `react`, `html`, `ts`, `js`). Returns None for
    /// anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "component" | "vue" => Some(Self::Component),
            "alt-framework" | "react" => Some(Self::AltFramework),
            "markup" | "html" => Some(Self::Markup),
            "typed-script" | "ts" => Some(Self::TypedScript),
            "script" | "js" => Some(Self::Script),
            _ => None,
        }
    }

    /// Infer the variant from a file extension where unambiguous, falling
    /// back to the declared variant otherwise.
    #[must_use]
    pub fn infer(declared: Self, path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("html") => Self::Markup,
            Some("js") => Self::Script,
            Some("ts") => Self::TypedScript,
            Some("tsx" | "jsx") => Self::AltFramework,
            _ => declared,
        }
    }

    /// Display language handed to the highlighter.
    ///
    /// Alt-framework sources highlight as `tsx` or `jsx` depending on the
    /// file extension; every other variant has a fixed language.
    #[must_use]
    pub fn display_lang(self, path: &Path) -> &'static str {
        match self {
            Self::Component => "vue",
            Self::Markup => "html",
            Self::Script => "js",
            Self::TypedScript => "ts",
            Self::AltFramework => {
                if path.extension().and_then(|e| e.to_str()) == Some("tsx") {
                    "tsx"
                } else {
                    "jsx"
                }
            }
        }
    }

    /// Canonical name, used in diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::AltFramework => "alt-framework",
            Self::Markup => "markup",
            Self::TypedScript => "typed-script",
            Self::Script => "script",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        assert_eq!(Variant::parse("component"), Some(Variant::Component));
        assert_eq!(Variant::parse("alt-framework"), Some(Variant::AltFramework));
        assert_eq!(Variant::parse("markup"), Some(Variant::Markup));
        assert_eq!(Variant::parse("typed-script"), Some(Variant::TypedScript));
        assert_eq!(Variant::parse("script"), Some(Variant::Script));
    }

    #[test]
    fn test_parse_file_type_spellings() {
        assert_eq!(Variant::parse("vue"), Some(Variant::Component));
        assert_eq!(Variant::parse("react"), Some(Variant::AltFramework));
        assert_eq!(Variant::parse("html"), Some(Variant::Markup));
        assert_eq!(Variant::parse("ts"), Some(Variant::TypedScript));
        assert_eq!(Variant::parse("js"), Some(Variant::Script));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Variant::parse("svelte"), None);
        assert_eq!(Variant::parse(""), None);
    }

    #[test]
    fn test_infer_overrides_declared() {
        let declared = Variant::Component;
        assert_eq!(
            Variant::infer(declared, Path::new("a.html")),
            Variant::Markup
        );
        assert_eq!(Variant::infer(declared, Path::new("a.js")), Variant::Script);
        assert_eq!(
            Variant::infer(declared, Path::new("a.ts")),
            Variant::TypedScript
        );
        assert_eq!(
            Variant::infer(declared, Path::new("a.tsx")),
            Variant::AltFramework
        );
        assert_eq!(
            Variant::infer(declared, Path::new("a.jsx")),
            Variant::AltFramework
        );
    }

    #[test]
    fn test_infer_falls_back_to_declared() {
        assert_eq!(
            Variant::infer(Variant::Component, Path::new("a.vue")),
            Variant::Component
        );
        assert_eq!(
            Variant::infer(Variant::AltFramework, Path::new("noext")),
            Variant::AltFramework
        );
    }

    #[test]
    fn test_display_lang() {
        assert_eq!(Variant::Component.display_lang(Path::new("a.vue")), "vue");
        assert_eq!(Variant::Markup.display_lang(Path::new("a.html")), "html");
        assert_eq!(Variant::Script.display_lang(Path::new("a.js")), "js");
        assert_eq!(Variant::TypedScript.display_lang(Path::new("a.ts")), "ts");
        assert_eq!(
            Variant::AltFramework.display_lang(Path::new("a.tsx")),
            "tsx"
        );
        assert_eq!(
            Variant::AltFramework.display_lang(Path::new("a.jsx")),
            "jsx"
        );
    }

    #[test]
    fn test_default_is_component() {
        assert_eq!(Variant::default(), Variant::Component);
    }
}
