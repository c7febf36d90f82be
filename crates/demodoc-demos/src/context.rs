//! Document context: the shared, host-owned state of one document build.
//!
//! The script region is process-external mutable state owned by the host
//! document context; the core only reads and appends to it through the
//! [`DocumentContext`] trait, never holding it beyond one render call.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// `<script ... lang="ts" ...>` marker.
static LANG_TS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<\s*script[^>]*\blang=['"]ts['"][^>]*"#).expect("valid regex")
});
/// Closing script boundary.
static CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</script>").expect("valid regex"));
/// `<script ... setup ...>` marker (auto-executing initialization block).
static SETUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*script[^>]*\bsetup\b[^>]*").expect("valid regex"));

/// One script block of a document's shared script region.
///
/// Setup mode and typed mode are structural properties of the block's
/// content; they are detected rather than stored so host-authored blocks
/// and generated blocks answer consistently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    /// Raw block text, including its `<script>` boundaries when present.
    pub content: String,
}

impl ScriptBlock {
    /// Create a block from raw text.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Whether this block auto-executes its contents on initialization.
    #[must_use]
    pub fn is_setup(&self) -> bool {
        SETUP_RE.is_match(&self.content)
    }

    /// Whether this block declares the typed script language.
    #[must_use]
    pub fn is_typed(&self) -> bool {
        LANG_TS_RE.is_match(&self.content)
    }

    /// Whether this block has a well-formed closing boundary.
    #[must_use]
    pub fn has_closing_boundary(&self) -> bool {
        CLOSE_RE.is_match(&self.content)
    }

    /// Splice a statement immediately before the closing boundary, or
    /// append it when no well-formed boundary is found.
    pub fn insert_statement(&mut self, statement: &str) {
        if self.has_closing_boundary() {
            // NoExpand: statements may contain `$` (template literals).
            self.content = CLOSE_RE
                .replace(
                    &self.content,
                    regex::NoExpand(&format!("{statement}\n</script>")),
                )
                .into_owned();
        } else {
            self.content = format!("{}\n{statement}\n", self.content);
        }
    }
}

/// Whether raw document source text declares setup mode itself,
/// independent of any generated blocks.
#[must_use]
pub fn source_declares_setup(source: &str) -> bool {
    SETUP_RE.is_match(source)
}

/// Host-owned state of the document being rendered.
///
/// Injected by reference into every render call. Implementations expose the
/// mutable script-region collection, the document's own file path (so the
/// injection engine can check for author-declared setup mode), an inline
/// description renderer, and a per-document name sequence.
pub trait DocumentContext {
    /// Mutable script-region collection, or None when the host did not set
    /// one up. A missing region is an injection precondition error.
    fn script_blocks(&mut self) -> Option<&mut Vec<ScriptBlock>>;

    /// Path of the document source file on disk, if known.
    fn document_path(&self) -> Option<&Path>;

    /// Render inline description markup to output markup.
    fn render_inline(&self, text: &str) -> String;

    /// Next value of the per-document demo name sequence, starting at 1.
    fn next_demo_index(&mut self) -> usize;
}

/// Simple [`DocumentContext`] for hosts without their own environment type
/// (and for tests).
///
/// The inline renderer is pluggable; the default passes text through
/// unchanged.
pub struct DemoEnv {
    /// Script region, present by default.
    pub script_blocks: Option<Vec<ScriptBlock>>,
    /// Document source path, if any.
    pub path: Option<std::path::PathBuf>,
    /// Inline description renderer.
    pub render_inline: Box<dyn Fn(&str) -> String + Send>,
    index: usize,
}

impl Default for DemoEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoEnv {
    /// Create an environment with an empty script region.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script_blocks: Some(Vec::new()),
            path: None,
            render_inline: Box::new(str::to_owned),
            index: 0,
        }
    }

    /// Set the document source path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the inline description renderer.
    #[must_use]
    pub fn with_render_inline<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + 'static,
    {
        self.render_inline = Box::new(f);
        self
    }
}

impl DocumentContext for DemoEnv {
    fn script_blocks(&mut self) -> Option<&mut Vec<ScriptBlock>> {
        self.script_blocks.as_mut()
    }

    fn document_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn render_inline(&self, text: &str) -> String {
        (self.render_inline)(text)
    }

    fn next_demo_index(&mut self) -> usize {
        self.index += 1;
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_setup_detection() {
        let block = ScriptBlock::new("<script setup>\nlet a = 1\n</script>");
        assert!(block.is_setup());
        assert!(!block.is_typed());

        let plain = ScriptBlock::new("<script>\nlet a = 1\n</script>");
        assert!(!plain.is_setup());
    }

    #[test]
    fn test_typed_detection() {
        let block = ScriptBlock::new(r#"<script lang="ts" setup></script>"#);
        assert!(block.is_typed());
        let single = ScriptBlock::new("<script lang='ts'></script>");
        assert!(single.is_typed());
    }

    #[test]
    fn test_insert_before_closing_boundary() {
        let mut block = ScriptBlock::new("<script setup>\nlet a = 1\n</script>");
        block.insert_statement("import B from './b'");
        assert_eq!(
            block.content,
            "<script setup>\nlet a = 1\nimport B from './b'\n</script>"
        );
    }

    #[test]
    fn test_insert_keeps_dollar_sequences_verbatim() {
        let mut block = ScriptBlock::new("<script setup>\n</script>");
        block.insert_statement("const s = `${value}`");
        assert!(block.content.contains("const s = `${value}`"));
    }

    #[test]
    fn test_insert_appends_without_boundary() {
        let mut block = ScriptBlock::new("<script setup>\nlet a = 1");
        block.insert_statement("import B from './b'");
        assert_eq!(block.content, "<script setup>\nlet a = 1\nimport B from './b'\n");
    }

    #[test]
    fn test_source_declares_setup() {
        assert!(source_declares_setup("# Doc\n\n<script setup>\n</script>"));
        assert!(!source_declares_setup("# Doc\n\n<script>\n</script>"));
    }

    #[test]
    fn test_demo_env_sequence() {
        let mut env = DemoEnv::new();
        assert_eq!(env.next_demo_index(), 1);
        assert_eq!(env.next_demo_index(), 2);
        assert_eq!(env.next_demo_index(), 3);
    }

    #[test]
    fn test_demo_env_render_inline_default() {
        let env = DemoEnv::new();
        assert_eq!(
            DocumentContext::render_inline(&env, "**bold**"),
            "**bold**"
        );
    }
}
