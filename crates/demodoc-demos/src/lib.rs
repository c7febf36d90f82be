//! Embedded demo-preview generation for markdown documents.
//!
//! This crate turns a demo reference tag inside documentation source into
//! syntax-highlighted code listings, a mountable live preview and the
//! bootstrap statements the preview needs, merged exactly once into the
//! document's shared script region.
//!
//! # Architecture
//!
//! The pipeline runs once per tag occurrence:
//!
//! 1. [`props`]: the compact attribute syntax is parsed into a
//!    [`DemoConfig`] (bound attributes go through the constrained literal
//!    evaluator in [`expr`]).
//! 2. [`resolve`]: `src`/`files` are resolved against the containing
//!    document's directory and read from disk.
//! 3. [`TransformPipeline`]: each resolved file is branched on its
//!    [`Variant`] to produce paired typed/untyped code and highlighted
//!    markup.
//! 4. [`inject`]: bootstrap imports and initialization snippets are merged
//!    into the document's script region, idempotently.
//! 5. [`DemoGenerator`]: the results are assembled into the final
//!    `<demo-container>` markup returned to the host renderer.
//!
//! Highlighting, de-typing and formatting are external collaborators behind
//! the [`Highlighter`], [`Detyper`] and [`Formatter`] traits; the host
//! document is reached through the [`DocumentContext`] trait.
//!
//! # Example
//!
//! ```
//! use demodoc_demos::{DemoConfig, DemoEnv, DemoGenerator, Highlighter, parse_props, resolve_config};
//!
//! struct NullHighlighter;
//! impl Highlighter for NullHighlighter {
//!     fn highlight(&self, code: &str, lang: &str, _attrs: &str) -> String {
//!         format!("<pre class=\"language-{lang}\">{code}</pre>")
//!     }
//! }
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("Foo.vue"), "<template><div /></template>").unwrap();
//!
//! let mut config = DemoConfig::from_props(parse_props(r#"src="./Foo.vue""#).unwrap());
//! config.validate().unwrap();
//! let resolved = resolve_config(&config, dir.path(), dir.path()).unwrap();
//!
//! let generator = DemoGenerator::new(NullHighlighter).with_project_root(dir.path());
//! let mut env = DemoEnv::new();
//! let markup = generator.generate(&mut env, &config, &resolved).unwrap();
//! assert!(markup.contains("<demo-container"));
//! ```

pub mod context;
pub mod error;
pub mod expr;
mod generator;
pub mod inject;
pub mod props;
pub mod resolve;
mod services;
mod transform;
mod variant;

pub use context::{DemoEnv, DocumentContext, ScriptBlock};
pub use error::{DemoError, ServiceError};
pub use generator::{DemoGenerator, encode_attr};
pub use inject::{Statement, inject, inject_iframe};
pub use props::{DemoConfig, parse_props};
pub use resolve::{ResolvedDemo, ResolvedFile, resolve_config, resolve_file};
pub use services::{
    Detyper, Formatter, Highlighter, PassthroughDetyper, PassthroughFormatter, TargetLang,
};
pub use transform::{FileItem, Metadata, TransformPipeline, VariantResult};
pub use variant::Variant;
