//! Script injection engine.
//!
//! Merges generated import and initialization statements into the shared
//! script region of the enclosing document. Every statement is inserted at
//! most once per document, and the document's own authored initialization
//! structure is respected rather than duplicated.

use crate::context::{DocumentContext, ScriptBlock, source_declares_setup};
use crate::error::DemoError;

/// A statement to merge into the document's script region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `import Name from 'path'`
    ImportBinding {
        /// Imported binding (a name or a destructuring pattern).
        name: String,
        /// Module specifier.
        path: String,
    },
    /// `import 'path'`
    ImportSideEffect {
        /// Module specifier.
        path: String,
    },
    /// Verbatim statement text.
    Raw(String),
}

impl Statement {
    /// Exact statement text, used both for insertion and for the
    /// duplicate scan.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::ImportBinding { name, path } => format!("import {name} from '{path}'"),
            Self::ImportSideEffect { path } => format!("import '{path}'"),
            Self::Raw(code) => code.trim().to_owned(),
        }
    }
}

/// Merge one statement into the document's script region.
///
/// Placement:
/// 1. If any block already contains the exact statement text, no-op.
/// 2. If a setup block exists, splice the statement before its closing
///    boundary (or append when the boundary is malformed).
/// 3. Else, if the document source itself does not declare setup mode,
///    prepend a brand-new setup block holding exactly this statement,
///    tagged typed when any existing block is typed.
/// 4. Else append to the first existing block, or create one when the
///    region is empty.
///
/// # Errors
///
/// [`DemoError::MissingScriptBlocks`] when the context has no script
/// region: the core is being invoked outside its host contract.
pub fn inject(ctx: &mut dyn DocumentContext, statement: &Statement) -> Result<(), DemoError> {
    let text = statement.render();

    // Document-level setup signal, checked against the source on disk
    // independent of already-generated blocks.
    let doc_declares_setup = ctx
        .document_path()
        .and_then(|p| std::fs::read_to_string(p).ok())
        .is_some_and(|source| source_declares_setup(&source));

    let blocks = ctx.script_blocks().ok_or(DemoError::MissingScriptBlocks)?;

    if blocks.iter().any(|block| block.content.contains(&text)) {
        return Ok(());
    }

    let any_typed = blocks.iter().any(ScriptBlock::is_typed);

    if let Some(setup) = blocks.iter_mut().find(|block| block.is_setup()) {
        setup.insert_statement(&text);
    } else if !doc_declares_setup {
        let lang = if any_typed { r#" lang="ts""# } else { "" };
        blocks.insert(
            0,
            ScriptBlock::new(format!("\n<script{lang} setup>\n{text}\n</script>")),
        );
    } else if let Some(first) = blocks.first_mut() {
        first.content = format!("{}\n{text}\n", first.content);
    } else {
        blocks.push(ScriptBlock::new(text));
    }

    Ok(())
}

/// Observer snippet for the iframe preview path. Mirrors the rendered
/// content's height and theme class into the iframe on an animation-frame
/// loop, torn down on unmount.
const IFRAME_OBSERVER: &str = r#"const html__NAME__ref = ref()
const isEnd__NAME__ = ref(false)
onMounted(async () => {
  await nextTick()
  const iframe = html__NAME__ref.value.querySelector('iframe');
  const iframeDocument = iframe.contentDocument || iframe.contentWindow.document;
  const styles = document.head.querySelectorAll('style');
  const styleLinks = document.head.querySelectorAll('link[as="style"]');
  const fontLinks = document.head.querySelectorAll('link[as="font"]');
  const styleString = Array.from(styles).map((style) => `<style replace="true">${style.innerText}</style>`).join('\n');
  const styleLinkString = Array.from(styleLinks).map((link) => link.outerHTML).join('\n');
  const fontLinkString = Array.from(fontLinks).map((link) => link.outerHTML).join('\n');
  iframeDocument.write(`
    <!DOCTYPE html>
    <html lang="en">
      <head>
        <meta charset="UTF-8" />
        <meta name="viewport" content="width=device-width, initial-scale=1.0" />
        ${styleString}
        ${styleLinkString}
        ${fontLinkString}
        <style>
          body {
            min-height: 0;
          }
        </style>
      </head>
      <body>
        ${__NAME__}
      </body>
    </html>
  `)
  iframeDocument.close();
  function synchronous() {
    if (isEnd__NAME__.value) return;
    iframe.style.height = iframeDocument.body.scrollHeight + 'px';
    iframeDocument.documentElement.className = document.documentElement.className;
    requestAnimationFrame(synchronous);
  }
  synchronous();
})
onUnmounted(() => isEnd__NAME__.value = true)"#;

/// Inject the two statements of the iframe preview path: an import of the
/// raw asset text plus the generated observer snippet.
pub fn inject_iframe(
    ctx: &mut dyn DocumentContext,
    name: &str,
    path: &str,
) -> Result<(), DemoError> {
    inject(
        ctx,
        &Statement::ImportBinding {
            name: name.to_owned(),
            path: format!("{path}?raw"),
        },
    )?;
    inject(ctx, &Statement::Raw(IFRAME_OBSERVER.replace("__NAME__", name)))
}
