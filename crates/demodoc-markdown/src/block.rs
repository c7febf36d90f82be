//! Inline-tag invocation style.
//!
//! Handles `<demo ... />` occurrences in document flow. Configuration and
//! resolution errors fall back to default rendering so one bad tag never
//! fails a whole document build.

use std::path::{Path, PathBuf};

use demodoc_demos::{
    DemoConfig, DemoError, DemoGenerator, DocumentContext, parse_props, resolve_config,
};
use tracing::error;

/// Extract the inner attribute text of a demo tag.
///
/// Returns None when the content is not a demo tag at all.
///
/// # Example
///
/// ```
/// use demodoc_markdown::extract_demo_tag;
///
/// assert_eq!(extract_demo_tag(r#"<demo src="./a.vue" />"#), Some(r#"src="./a.vue""#));
/// assert_eq!(extract_demo_tag("<div>hi</div>"), None);
/// ```
#[must_use]
pub fn extract_demo_tag(content: &str) -> Option<&str> {
    let rest = content.trim().strip_prefix("<demo")?;
    // Reject tags like <demo-container>.
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '/' || c == '>') {
        return None;
    }
    let rest = rest
        .strip_suffix("/>")
        .or_else(|| rest.strip_suffix('>'))?;
    Some(rest.trim())
}

/// Render an inline demo tag occurrence.
///
/// Returns `Ok(None)` when the content is not a demo tag, or when a
/// recoverable configuration/resolution error was logged and the caller
/// should fall back to default rendering.
///
/// # Errors
///
/// Non-recoverable errors (missing script region, IO failures past
/// resolution) propagate.
pub fn render_demo_tag(
    generator: &DemoGenerator,
    ctx: &mut dyn DocumentContext,
    content: &str,
) -> Result<Option<String>, DemoError> {
    let Some(attrs) = extract_demo_tag(content) else {
        return Ok(None);
    };

    match render(generator, ctx, attrs) {
        Ok(markup) => Ok(Some(markup)),
        Err(err) if err.is_recoverable() => {
            let doc = document_label(ctx);
            error!("rendering {doc}: {err}; falling back to default rendering");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn render(
    generator: &DemoGenerator,
    ctx: &mut dyn DocumentContext,
    attrs: &str,
) -> Result<String, DemoError> {
    let mut config = DemoConfig::from_props(parse_props(attrs)?);
    config.validate()?;
    let doc_dir = document_dir(ctx);
    let resolved = resolve_config(&config, &doc_dir, generator.project_root())?;
    generator.generate(ctx, &config, &resolved)
}

/// Directory the tag's relative paths resolve against.
pub(crate) fn document_dir(ctx: &dyn DocumentContext) -> PathBuf {
    ctx.document_path()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

pub(crate) fn document_label(ctx: &dyn DocumentContext) -> String {
    ctx.document_path()
        .map_or_else(|| "<unknown document>".to_owned(), |p| p.display().to_string())
}
