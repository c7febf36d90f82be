//! Block-container invocation style.
//!
//! A delimited `demo` block carries its attributes on the opening line and
//! its description as inner content. Unlike the inline style, configuration
//! and resolution errors fail the document build: a block the author spelled
//! out deliberately should never silently disappear.

use demodoc_demos::{
    DemoConfig, DemoError, DemoGenerator, DocumentContext, parse_props, resolve_config,
};

use crate::block::document_dir;

/// Render the opening of a block-delimited demo.
///
/// `info` is the attribute text following the block name (e.g.
/// `src="./Foo.vue" twoslash`). Close the block with [`render_demo_close`].
///
/// # Errors
///
/// All configuration, resolution and injection errors propagate.
pub fn render_demo_open(
    generator: &DemoGenerator,
    ctx: &mut dyn DocumentContext,
    info: &str,
) -> Result<String, DemoError> {
    let mut config = DemoConfig::from_props(parse_props(info)?);
    config.validate()?;
    let doc_dir = document_dir(ctx);
    let resolved = resolve_config(&config, &doc_dir, generator.project_root())?;
    generator.generate_prefix(ctx, &config, &resolved)
}

/// Render the closing of a block-delimited demo.
#[must_use]
pub fn render_demo_close() -> String {
    DemoGenerator::generate_suffix()
}
