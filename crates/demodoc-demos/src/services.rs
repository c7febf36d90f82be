//! External collaborator traits.
//!
//! Syntax highlighting, de-typing and formatting are external services the
//! pipeline delegates to. The highlighter is infallible from the core's
//! perspective; the de-typer and formatter may fail and every call site
//! degrades to pass-through of the input code.

use crate::error::ServiceError;

/// Syntax highlighter collaborator.
///
/// Must be synchronous and side-effect-free from the core's perspective.
pub trait Highlighter: Send {
    /// Highlight `code` as `lang` with a raw, comma-separated option string.
    fn highlight(&self, code: &str, lang: &str, attrs: &str) -> String;
}

/// Target language for a component de-typing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetLang {
    /// Keep the typed form.
    Typed,
    /// Produce the behavior-preserving de-typed form.
    Untyped,
}

/// De-typing collaborator: rewrites typed source into plain script.
pub trait Detyper: Send {
    /// Rewrite a single-file component toward `target`.
    ///
    /// With `fix`, the output is additionally cleaned up (the typed source
    /// really was typed, so the de-typed rendering needs repair passes).
    fn detype_component(
        &self,
        code: &str,
        target: TargetLang,
        fix: bool,
    ) -> Result<String, ServiceError>;

    /// Rewrite plain typed script to untyped script.
    ///
    /// With `preserve_markup`, embedded markup syntax (JSX-style) is kept
    /// verbatim rather than lowered.
    fn detype_script(&self, code: &str, preserve_markup: bool) -> Result<String, ServiceError>;
}

/// Formatting collaborator for de-typed output.
pub trait Formatter: Send {
    /// Reformat `code` for the given display language.
    fn format(&self, code: &str, lang: &str) -> Result<String, ServiceError>;
}

/// No-op de-typer: returns the input unchanged.
///
/// Useful for hosts whose documents never reference typed sources, and as
/// the degraded behavior when no real service is wired up.
#[derive(Debug, Default)]
pub struct PassthroughDetyper;

impl Detyper for PassthroughDetyper {
    fn detype_component(
        &self,
        code: &str,
        _target: TargetLang,
        _fix: bool,
    ) -> Result<String, ServiceError> {
        Ok(code.to_owned())
    }

    fn detype_script(&self, code: &str, _preserve_markup: bool) -> Result<String, ServiceError> {
        Ok(code.to_owned())
    }
}

/// No-op formatter: returns the input unchanged.
#[derive(Debug, Default)]
pub struct PassthroughFormatter;

impl Formatter for PassthroughFormatter {
    fn format(&self, code: &str, _lang: &str) -> Result<String, ServiceError> {
        Ok(code.to_owned())
    }
}
