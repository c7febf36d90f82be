//! Variant transform pipeline.
//!
//! Turns one resolved source file into paired typed/untyped code strings,
//! their highlighted-markup equivalents and file metadata, branching on the
//! inferred [`Variant`]. Transform-service failures degrade to pass-through
//! of the unformatted code; they never fail the render.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::error::ServiceError;
use crate::resolve::{ResolvedFile, normalize_path};
use crate::services::{Detyper, Formatter, Highlighter, TargetLang};
use crate::variant::Variant;

/// Lexical marker for a typed script block inside component source.
static TYPED_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"lang=['"]ts['"]"#).expect("valid regex"));

/// File metadata attached to every transform result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Absolute path, forward slashes.
    pub absolute_path: String,
    /// Project-root-relative path, forward slashes.
    pub relative_path: String,
    /// Final path component.
    pub file_name: String,
}

impl Metadata {
    /// Compute metadata for a resolved file.
    #[must_use]
    pub fn of(file: &ResolvedFile) -> Self {
        Self {
            absolute_path: normalize_path(&file.absolute_path),
            relative_path: file.relative_path.clone(),
            file_name: file.file_name.clone(),
        }
    }
}

/// Output of the transform pipeline for one source file.
///
/// Immutable once produced; each tag render produces fresh instances.
#[derive(Debug, Clone)]
pub struct VariantResult {
    /// Typed source rendering (empty when the variant has no typed form).
    pub typed_code: String,
    /// De-typed (or verbatim) source rendering.
    pub untyped_code: String,
    /// Highlighted, escaped markup of the typed rendering.
    pub typed_markup: String,
    /// Highlighted, escaped markup of the untyped rendering.
    pub untyped_markup: String,
    /// File metadata, computed once and attached unchanged.
    pub metadata: Metadata,
    /// Whether the source was detected as typed.
    pub uses_typed: bool,
    /// The resolved (inferred or declared) variant.
    pub variant: Variant,
}

/// Listing entry for one resolved file of a multi-file demo.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    /// File name shown in the listing tab.
    pub name: String,
    /// Typed code, empty when absent.
    pub typed_code: String,
    /// Untyped code.
    pub untyped_code: String,
    /// Highlighted typed markup.
    pub typed_markup: String,
    /// Highlighted untyped markup.
    pub untyped_markup: String,
}

impl FileItem {
    /// Build a listing entry from a transform result.
    #[must_use]
    pub fn of(result: &VariantResult) -> Self {
        Self {
            name: result.metadata.file_name.clone(),
            typed_code: result.typed_code.clone(),
            untyped_code: result.untyped_code.clone(),
            typed_markup: result.typed_markup.clone(),
            untyped_markup: result.untyped_markup.clone(),
        }
    }
}

/// The transform pipeline over the three external collaborators.
pub struct TransformPipeline<'a> {
    /// Syntax highlighter.
    pub highlighter: &'a dyn Highlighter,
    /// De-typing service.
    pub detyper: &'a dyn Detyper,
    /// Formatting service.
    pub formatter: &'a dyn Formatter,
}

impl TransformPipeline<'_> {
    /// Transform one resolved file.
    ///
    /// The variant is inferred from the file extension where unambiguous,
    /// falling back to `declared`. `attrs`/`js_attrs` are the raw
    /// highlighter option strings for the typed and untyped listings; with
    /// `twoslash` the typed options additionally carry the `twoslash`
    /// token. When the source is not actually typed, the untyped options
    /// fall back to the typed option set.
    #[must_use]
    pub fn transform(
        &self,
        file: &ResolvedFile,
        declared: Variant,
        attrs: &str,
        js_attrs: &str,
        twoslash: bool,
    ) -> VariantResult {
        let path = &file.absolute_path;
        let variant = Variant::infer(declared, path);
        let lang = variant.display_lang(path);
        let code = file.code.as_str();

        let mut attr_tokens = merge_attrs(attrs);
        if twoslash {
            attr_tokens.push("twoslash".to_owned());
        }
        let attr = attr_tokens.join(",");

        let ext = path.extension().and_then(|e| e.to_str());
        let uses_typed = TYPED_MARKER_RE.is_match(code) || matches!(ext, Some("ts" | "tsx"));

        let js_attr = if uses_typed {
            merge_attrs(js_attrs).join(",")
        } else {
            attr.clone()
        };

        let mut typed_code = String::new();
        let mut untyped_code;
        let mut typed_markup = String::new();
        let untyped_markup;

        match variant {
            Variant::Component => {
                if uses_typed {
                    typed_code = degrade(
                        self.detyper.detype_component(code, TargetLang::Typed, false),
                        code,
                    );
                    typed_markup = pre(&self.highlighter.highlight(&typed_code, lang, &attr));
                }
                untyped_code = degrade(
                    self.detyper
                        .detype_component(code, TargetLang::Untyped, uses_typed),
                    code,
                );
                untyped_markup = pre(&self.highlighter.highlight(&untyped_code, lang, &js_attr));
            }
            Variant::Markup | Variant::Script => {
                untyped_code = code.to_owned();
                untyped_markup = pre(&self.highlighter.highlight(code, lang, &js_attr));
            }
            Variant::TypedScript => {
                typed_code = code.to_owned();
                typed_markup = pre(&self.highlighter.highlight(code, lang, &attr));
                untyped_code = degrade(self.detyper.detype_script(code, false), code);
                untyped_code = degrade(self.formatter.format(&untyped_code, "js"), &untyped_code);
                untyped_markup = pre(&self.highlighter.highlight(&untyped_code, lang, &js_attr));
            }
            Variant::AltFramework => {
                if uses_typed {
                    typed_code = code.to_owned();
                    typed_markup = pre(&self.highlighter.highlight(code, lang, &attr));
                    untyped_code = degrade(self.detyper.detype_script(code, true), code);
                    untyped_code =
                        degrade(self.formatter.format(&untyped_code, "jsx"), &untyped_code);
                    untyped_markup =
                        pre(&self.highlighter.highlight(&untyped_code, lang, &js_attr));
                } else {
                    untyped_code = code.to_owned();
                    untyped_markup = pre(&self.highlighter.highlight(code, lang, &js_attr));
                }
            }
        }

        VariantResult {
            typed_code,
            untyped_code,
            typed_markup,
            untyped_markup,
            metadata: Metadata::of(file),
            uses_typed,
            variant,
        }
    }
}

/// Escape literal interpolation delimiters so highlighted markup is safe to
/// embed as static text.
#[must_use]
pub fn pre(markup: &str) -> String {
    markup
        .replace("{{", "&#123;&#123;")
        .replace("}}", "&#125;&#125;")
}

/// Tokenize a raw highlighter option string: comma/whitespace separated,
/// trimmed, de-duplicated, order preserved.
#[must_use]
pub fn merge_attrs(raw: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for token in raw.split([',', ' ', '\t']) {
        let token = token.trim();
        if !token.is_empty() && !seen.iter().any(|t| t == token) {
            seen.push(token.to_owned());
        }
    }
    seen
}

/// Degrade a transform-service failure to pass-through.
fn degrade(result: Result<String, ServiceError>, fallback: &str) -> String {
    match result {
        Ok(out) => out,
        Err(err) => {
            warn!("transform service degraded to pass-through: {err}");
            fallback.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    /// Highlighter stub that wraps code and records the options it saw.
    struct TagHighlighter;

    impl Highlighter for TagHighlighter {
        fn highlight(&self, code: &str, lang: &str, attrs: &str) -> String {
            format!("<pre lang={lang} attrs={attrs}>{code}</pre>")
        }
    }

    /// De-typer stub that strips a leading marker line.
    struct MarkerDetyper;

    impl Detyper for MarkerDetyper {
        fn detype_component(
            &self,
            code: &str,
            target: TargetLang,
            _fix: bool,
        ) -> Result<String, ServiceError> {
            match target {
                TargetLang::Typed => Ok(code.to_owned()),
                TargetLang::Untyped => Ok(code.replace(" lang=\"ts\"", "")),
            }
        }

        fn detype_script(&self, code: &str, _preserve_markup: bool) -> Result<String, ServiceError> {
            Ok(code.replace(": number", ""))
        }
    }

    struct UpperFormatter;

    impl Formatter for UpperFormatter {
        fn format(&self, code: &str, _lang: &str) -> Result<String, ServiceError> {
            Ok(format!("{code}\n"))
        }
    }

    struct FailingService;

    impl Detyper for FailingService {
        fn detype_component(
            &self,
            _code: &str,
            _target: TargetLang,
            _fix: bool,
        ) -> Result<String, ServiceError> {
            Err(ServiceError::new("decode failure"))
        }

        fn detype_script(&self, _code: &str, _preserve_markup: bool) -> Result<String, ServiceError> {
            Err(ServiceError::new("decode failure"))
        }
    }

    impl Formatter for FailingService {
        fn format(&self, _code: &str, _lang: &str) -> Result<String, ServiceError> {
            Err(ServiceError::new("format failure"))
        }
    }

    fn resolved(name: &str, code: &str) -> ResolvedFile {
        ResolvedFile {
            absolute_path: PathBuf::from(format!("/docs/{name}")),
            relative_path: format!("docs/{name}"),
            file_name: name.to_owned(),
            code: code.to_owned(),
        }
    }

    fn pipeline<'a>(detyper: &'a dyn Detyper, formatter: &'a dyn Formatter) -> TransformPipeline<'a> {
        TransformPipeline {
            highlighter: &TagHighlighter,
            detyper,
            formatter,
        }
    }

    #[test]
    fn test_typed_component_produces_both_renderings() {
        let file = resolved("Foo.vue", "<script lang=\"ts\" setup>const n: number = 1</script>");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "",
            "",
            false,
        );

        assert!(result.uses_typed);
        assert_eq!(result.variant, Variant::Component);
        assert!(result.typed_code.contains("lang=\"ts\""));
        assert!(!result.untyped_code.contains("lang=\"ts\""));
        assert!(result.typed_markup.contains("lang=vue"));
        assert!(!result.typed_markup.is_empty());
        assert!(!result.untyped_markup.is_empty());
    }

    #[test]
    fn test_untyped_component_has_no_typed_rendering() {
        let file = resolved("Foo.vue", "<script setup>const n = 1</script>");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "",
            "",
            false,
        );

        assert!(!result.uses_typed);
        assert!(result.typed_code.is_empty());
        assert!(result.typed_markup.is_empty());
        assert!(!result.untyped_code.is_empty());
    }

    #[test]
    fn test_untyped_attrs_fall_back_to_typed_attrs() {
        let file = resolved("Foo.vue", "<script setup>const n = 1</script>");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "no-line-numbers",
            "unused",
            false,
        );
        // Source is not typed, so the untyped listing uses the typed options.
        assert!(result.untyped_markup.contains("attrs=no-line-numbers"));
    }

    #[test]
    fn test_markup_and_script_are_verbatim() {
        for (name, variant) in [("a.html", Variant::Markup), ("a.js", Variant::Script)] {
            let file = resolved(name, "content");
            let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
                &file,
                Variant::Component,
                "",
                "",
                false,
            );
            assert_eq!(result.variant, variant);
            assert_eq!(result.untyped_code, "content");
            assert!(result.typed_code.is_empty());
        }
    }

    #[test]
    fn test_typed_script_is_detyped_and_formatted() {
        let file = resolved("a.ts", "const n: number = 1");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "",
            "",
            false,
        );

        assert_eq!(result.variant, Variant::TypedScript);
        assert_eq!(result.typed_code, "const n: number = 1");
        assert_eq!(result.untyped_code, "const n = 1\n");
    }

    #[test]
    fn test_typed_script_untyped_parses_as_plain_script() {
        let file = resolved("a.ts", "const n: number = 1");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "",
            "",
            false,
        );
        // No residual type-only syntax under the de-typer contract.
        assert!(!result.untyped_code.contains(": number"));
    }

    #[test]
    fn test_alt_framework_typed() {
        let file = resolved("a.tsx", "export const C = (p: {}) => <div />");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "",
            "",
            false,
        );
        assert_eq!(result.variant, Variant::AltFramework);
        assert!(result.uses_typed);
        assert_eq!(result.typed_code, file.code);
        assert!(result.typed_markup.contains("lang=tsx"));
    }

    #[test]
    fn test_alt_framework_untyped_is_verbatim() {
        let file = resolved("a.jsx", "export const C = () => <div />");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "",
            "",
            false,
        );
        assert!(!result.uses_typed);
        assert!(result.typed_code.is_empty());
        assert_eq!(result.untyped_code, file.code);
        assert!(result.untyped_markup.contains("lang=jsx"));
    }

    #[test]
    fn test_service_failure_degrades_to_passthrough() {
        let file = resolved("a.ts", "const n: number = 1");
        let result = pipeline(&FailingService, &FailingService).transform(
            &file,
            Variant::Component,
            "",
            "",
            false,
        );
        // Both de-type and format failed: untyped is the raw source.
        assert_eq!(result.untyped_code, "const n: number = 1");
        assert!(!result.untyped_markup.is_empty());
    }

    #[test]
    fn test_escaping_invariant() {
        let file = resolved("a.html", "<p>{{ message }} and {{other}}</p>");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "",
            "",
            false,
        );
        assert!(!result.untyped_markup.contains("{{"));
        assert!(!result.untyped_markup.contains("}}"));
        assert!(result.untyped_markup.contains("&#123;&#123;"));
        assert!(result.untyped_markup.contains("&#125;&#125;"));
    }

    #[test]
    fn test_twoslash_appends_to_typed_attrs() {
        let file = resolved("a.ts", "const n: number = 1");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "no-line-numbers",
            "",
            true,
        );
        assert!(result.typed_markup.contains("attrs=no-line-numbers,twoslash"));
    }

    #[test]
    fn test_metadata() {
        let file = resolved("Foo.vue", "<template/>");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Component,
            "",
            "",
            false,
        );
        assert_eq!(
            result.metadata,
            Metadata {
                absolute_path: "/docs/Foo.vue".to_owned(),
                relative_path: "docs/Foo.vue".to_owned(),
                file_name: "Foo.vue".to_owned(),
            }
        );
    }

    #[test]
    fn test_merge_attrs() {
        assert_eq!(
            merge_attrs("a, b  c,a"),
            vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]
        );
        assert!(merge_attrs("  ").is_empty());
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let meta = Metadata {
            absolute_path: "/a".to_owned(),
            relative_path: "a".to_owned(),
            file_name: "a".to_owned(),
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("\"absolutePath\""));
        assert!(json.contains("\"relativePath\""));
        assert!(json.contains("\"fileName\""));
    }

    #[test]
    fn test_variant_inference_respects_declared_fallback() {
        let file = resolved("widget.custom", "code");
        let result = pipeline(&MarkerDetyper, &UpperFormatter).transform(
            &file,
            Variant::Script,
            "",
            "",
            false,
        );
        assert_eq!(result.variant, Variant::Script);
    }
}
