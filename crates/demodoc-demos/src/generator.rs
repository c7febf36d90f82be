//! Demo container generation.
//!
//! Orchestrates one tag render: runs the transform pipeline over the
//! resolved file set, injects bootstrap statements into the document's
//! script region and assembles the final `<demo-container>` markup returned
//! to the host renderer.

use std::path::PathBuf;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::context::DocumentContext;
use crate::error::DemoError;
use crate::inject::{Statement, inject, inject_iframe};
use crate::props::DemoConfig;
use crate::resolve::{ResolvedDemo, normalize_path};
use crate::services::{
    Detyper, Formatter, Highlighter, PassthroughDetyper, PassthroughFormatter,
};
use crate::transform::{FileItem, TransformPipeline, VariantResult};
use crate::variant::Variant;

/// JS `encodeURIComponent` leaves alphanumerics and `- _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Runtime bindings every preview template relies on.
const RUNTIME_IMPORT: &str = "{ ref, onMounted, onUnmounted, nextTick }";

/// Mount/unmount snippet for the alt-framework bridge.
const BRIDGE_MOUNT: &str = r"const react__NAME__ref = ref()
const root__NAME__ = ref()
onMounted(async () => {
  await nextTick()
  root__NAME__.value = createRoot(react__NAME__ref.value)
  root__NAME__.value.render(createElement(__NAME__, {}, null))
})
onUnmounted(() => root__NAME__.value?.unmount())";

/// Demo generator: one per document build.
///
/// Configured with the external collaborators through builder methods, in
/// the manner of the other processors in this workspace.
///
/// # Example
///
/// ```ignore
/// let generator = DemoGenerator::new(my_highlighter)
///     .with_detyper(my_detyper)
///     .with_formatter(my_formatter)
///     .with_scratch_dir("/tmp/demo-scratch");
///
/// let markup = generator.generate(&mut env, &config, &resolved)?;
/// ```
pub struct DemoGenerator {
    highlighter: Box<dyn Highlighter>,
    detyper: Box<dyn Detyper>,
    formatter: Box<dyn Formatter>,
    scratch_dir: PathBuf,
    project_root: PathBuf,
}

/// Everything the assembler needs for one rendered tag.
struct DemoParts {
    props: String,
    template: String,
    typed_markup: String,
    untyped_markup: String,
    description: String,
}

impl DemoGenerator {
    /// Create a generator with the given highlighter and pass-through
    /// de-typing/formatting services.
    #[must_use]
    pub fn new(highlighter: impl Highlighter + 'static) -> Self {
        Self {
            highlighter: Box::new(highlighter),
            detyper: Box::new(PassthroughDetyper),
            formatter: Box::new(PassthroughFormatter),
            scratch_dir: std::env::temp_dir().join("demodoc-scratch"),
            project_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Set the de-typing service.
    #[must_use]
    pub fn with_detyper(mut self, detyper: impl Detyper + 'static) -> Self {
        self.detyper = Box::new(detyper);
        self
    }

    /// Set the formatting service.
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Set the scratch directory for persisted de-typed copies.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Set the project root that `relativePath` metadata is computed
    /// against. Defaults to the process current directory.
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    /// Project root the resolver should use for this generator.
    #[must_use]
    pub fn project_root(&self) -> &std::path::Path {
        &self.project_root
    }

    /// Render a full demo container, description included.
    pub fn generate(
        &self,
        ctx: &mut dyn DocumentContext,
        config: &DemoConfig,
        resolved: &ResolvedDemo,
    ) -> Result<String, DemoError> {
        let parts = self.render_parts(ctx, config, resolved)?;
        Ok(format!(
            "<demo-container {props}>\n{slots}\n  {template}\n  <template #demo:description>\n    {description}\n  </template>\n</demo-container>",
            props = parts.props,
            slots = listing_slots(&parts.typed_markup, &parts.untyped_markup),
            template = parts.template,
            description = parts.description,
        ))
    }

    /// Render the opening of a block-delimited demo container. The block's
    /// inner content becomes the description; close with
    /// [`generate_suffix`](Self::generate_suffix).
    pub fn generate_prefix(
        &self,
        ctx: &mut dyn DocumentContext,
        config: &DemoConfig,
        resolved: &ResolvedDemo,
    ) -> Result<String, DemoError> {
        let parts = self.render_parts(ctx, config, resolved)?;
        Ok(format!(
            "<demo-container {props}>\n{slots}\n  {template}\n  <template #demo:description>\n",
            props = parts.props,
            slots = listing_slots(&parts.typed_markup, &parts.untyped_markup),
            template = parts.template,
        ))
    }

    /// Close a block-delimited demo container.
    #[must_use]
    pub fn generate_suffix() -> String {
        "  </template>\n</demo-container>".to_owned()
    }

    fn render_parts(
        &self,
        ctx: &mut dyn DocumentContext,
        config: &DemoConfig,
        resolved: &ResolvedDemo,
    ) -> Result<DemoParts, DemoError> {
        let name = format!("DemoComponent{}", ctx.next_demo_index());
        let src = &resolved.src;
        let path = normalize_path(&src.absolute_path);
        let variant = Variant::infer(config.variant, &src.absolute_path);

        inject(
            ctx,
            &Statement::ImportBinding {
                name: RUNTIME_IMPORT.to_owned(),
                path: "vue".to_owned(),
            },
        )?;

        let template = match variant {
            Variant::Markup => {
                inject_iframe(ctx, &name, &path)?;
                format!(
                    "<div ref=\"html{name}ref\">\n    <iframe style=\"width: 100%; height: auto; border: none\"></iframe>\n  </div>"
                )
            }
            Variant::Component => {
                inject(
                    ctx,
                    &Statement::ImportBinding {
                        name: name.clone(),
                        path: path.clone(),
                    },
                )?;
                inject(
                    ctx,
                    &Statement::ImportBinding {
                        name: format!("{name}Raw"),
                        path: format!("{path}?raw"),
                    },
                )?;
                format!("<{name} />")
            }
            Variant::AltFramework => {
                inject(
                    ctx,
                    &Statement::ImportBinding {
                        name: name.clone(),
                        path: path.clone(),
                    },
                )?;
                inject(
                    ctx,
                    &Statement::ImportBinding {
                        name: format!("{name}Raw"),
                        path: format!("{path}?raw"),
                    },
                )?;
                inject(
                    ctx,
                    &Statement::ImportBinding {
                        name: "{ createElement }".to_owned(),
                        path: "react".to_owned(),
                    },
                )?;
                inject(
                    ctx,
                    &Statement::ImportBinding {
                        name: "{ createRoot }".to_owned(),
                        path: "react-dom/client".to_owned(),
                    },
                )?;
                inject(ctx, &Statement::Raw(BRIDGE_MOUNT.replace("__NAME__", &name)))?;
                format!("<div ref=\"react{name}ref\" />")
            }
            Variant::TypedScript | Variant::Script => String::new(),
        };

        let pipeline = TransformPipeline {
            highlighter: self.highlighter.as_ref(),
            detyper: self.detyper.as_ref(),
            formatter: self.formatter.as_ref(),
        };
        let result = pipeline.transform(
            src,
            config.variant,
            &config.attributes,
            &config.js_attributes,
            config.twoslash,
        );

        match result.variant {
            Variant::Script => {
                inject(ctx, &Statement::ImportSideEffect { path: path.clone() })?;
            }
            Variant::TypedScript => {
                let scratch = self.persist_untyped(&result)?;
                inject(ctx, &Statement::ImportSideEffect { path: scratch })?;
            }
            _ => {}
        }

        let files: Vec<FileItem> = resolved
            .files
            .iter()
            .map(|file| {
                FileItem::of(&pipeline.transform(file, Variant::default(), "", "", false))
            })
            .collect();

        let description = ctx.render_inline(&config.description);
        let props = container_props(&result, &files, &config.extra)?;

        Ok(DemoParts {
            props,
            template,
            typed_markup: result.typed_markup,
            untyped_markup: result.untyped_markup,
            description,
        })
    }

    /// Persist the de-typed copy of a typed-script source to the scratch
    /// directory so downstream bundling sees plain script. Returns the
    /// normalized scratch path to import.
    fn persist_untyped(&self, result: &VariantResult) -> Result<String, DemoError> {
        let mut file_name = result.metadata.relative_path.replace('/', "_");
        if let Some(stem) = file_name.strip_suffix(".ts") {
            file_name = format!("{stem}.js");
        }
        std::fs::create_dir_all(&self.scratch_dir)?;
        let scratch_path = self.scratch_dir.join(file_name);
        std::fs::write(&scratch_path, &result.untyped_code)?;
        Ok(normalize_path(&scratch_path))
    }
}

/// URL-encode a container attribute payload (`encodeURIComponent`
/// compatible).
#[must_use]
pub fn encode_attr(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// JSON-encode a bound attribute payload, escaping single quotes so the
/// value survives single-quoted attribute delimiters.
fn safe_stringify<T: serde::Serialize>(value: &T) -> Result<String, DemoError> {
    Ok(serde_json::to_string(value)?.replace('\'', "&#39;"))
}

fn container_props(
    result: &VariantResult,
    files: &[FileItem],
    extra: &serde_json::Map<String, Value>,
) -> Result<String, DemoError> {
    Ok(format!(
        "typedCode=\"{typed}\"\nuntypedCode=\"{untyped}\"\ntypedMarkup=\"{typed_markup}\"\nuntypedMarkup=\"{untyped_markup}\"\n:metadata='{metadata}'\n:files='{files}'\nv-bind='{extra}'",
        typed = encode_attr(&result.typed_code),
        untyped = encode_attr(&result.untyped_code),
        typed_markup = encode_attr(&result.typed_markup),
        untyped_markup = encode_attr(&result.untyped_markup),
        metadata = safe_stringify(&result.metadata)?,
        files = safe_stringify(&files)?,
        extra = safe_stringify(&extra)?,
    ))
}

/// Slots carrying the highlighted typed and untyped listings.
fn listing_slots(typed_markup: &str, untyped_markup: &str) -> String {
    format!(
        "  <template #demo:typed>\n    <div class=\"language-vue\" style=\"flex: 1;\">\n      {typed_markup}\n    </div>\n  </template>\n  <template #demo:untyped>\n    <div class=\"language-vue\" style=\"flex: 1;\">\n      {untyped_markup}\n    </div>\n  </template>"
    )
}
