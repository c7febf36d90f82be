//! Demo tag attribute parsing.
//!
//! Parses the compact attribute syntax of a demo tag
//! (`src="./a.vue" :foo="1+1" bar`) into a structured property map and a
//! [`DemoConfig`].

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::DemoError;
use crate::expr;
use crate::variant::Variant;

/// Parsed configuration of one demo tag occurrence.
///
/// Immutable after parse. At least one of `src`/`files` must be non-empty
/// before resolution; [`DemoConfig::validate`] enforces this.
#[derive(Debug, Clone, Default)]
pub struct DemoConfig {
    /// Primary source file, relative to the containing document.
    pub src: Option<String>,
    /// Additional listed files, relative to the containing document.
    pub files: Vec<String>,
    /// Description text rendered below the preview.
    pub description: String,
    /// Declared source variant (may be overridden by extension inference).
    pub variant: Variant,
    /// Raw highlighter option string for the typed listing.
    pub attributes: String,
    /// Raw highlighter option string for the untyped listing.
    pub js_attributes: String,
    /// Append the `twoslash` token to the typed highlight attributes.
    pub twoslash: bool,
    /// Unrecognized keys, forwarded to the container via `v-bind`.
    pub extra: Map<String, Value>,
}

impl DemoConfig {
    /// Build a config from a parsed property map, consuming the recognized
    /// keys and keeping the rest as pass-through properties.
    #[must_use]
    pub fn from_props(mut props: Map<String, Value>) -> Self {
        let src = take_string(&mut props, "src");
        let files = match props.remove("files") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    other => {
                        warn!("ignoring non-string 'files' entry: {other}");
                        None
                    }
                })
                .collect(),
            Some(Value::String(s)) => vec![s],
            Some(other) => {
                warn!("ignoring non-list 'files' value: {other}");
                Vec::new()
            }
            None => Vec::new(),
        };
        let description = take_string(&mut props, "description").unwrap_or_default();
        let variant = take_string(&mut props, "variant").map_or_else(Variant::default, |s| {
            Variant::parse(&s).unwrap_or_else(|| {
                warn!("unknown demo variant '{s}', using 'component'");
                Variant::default()
            })
        });
        let attributes = take_string(&mut props, "attributes").unwrap_or_default();
        let js_attributes = take_string(&mut props, "jsAttributes").unwrap_or_default();
        let twoslash = matches!(props.remove("twoslash"), Some(Value::Bool(true)));

        Self {
            src,
            files,
            description,
            variant,
            attributes,
            js_attributes,
            twoslash,
            extra: props,
        }
    }

    /// Check the source invariant and promote the first listed file to
    /// `src` when no primary source was given.
    pub fn validate(&mut self) -> Result<(), DemoError> {
        if self.src.is_none() {
            if self.files.is_empty() {
                return Err(DemoError::MissingSource);
            }
            self.src = Some(self.files[0].clone());
        }
        Ok(())
    }
}

/// Parse the inner attribute text of a demo tag into a property map.
///
/// Values may be single-quoted, double-quoted or bare tokens, with optional
/// whitespace around `=`, as in markup attribute syntax. Bound attributes (`:key="expr"` or `v-bind:key="expr"`) are evaluated as
/// literal expressions with a strict-JSON fallback; on double failure the
/// attribute is dropped with a diagnostic. Boolean shorthand and literal
/// `"true"`/`"false"` values map to booleans; everything else is kept as a
/// string. Keys are normalized hyphen-to-camel.
///
/// # Example
///
/// ```
/// use demodoc_demos::props::parse_props;
///
/// let props = parse_props(r#"src="./a.vue" :count="1+1" plain"#).unwrap();
/// assert_eq!(props["src"], serde_json::json!("./a.vue"));
/// assert_eq!(props["count"], serde_json::json!(2));
/// assert_eq!(props["plain"], serde_json::json!(true));
/// ```
pub fn parse_props(attrs_text: &str) -> Result<Map<String, Value>, DemoError> {
    let mut props = Map::new();
    let mut remaining = attrs_text.trim();

    while !remaining.is_empty() {
        remaining = remaining.trim_start();
        if remaining.is_empty() {
            break;
        }

        let name_end = remaining
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(remaining.len());
        let name = &remaining[..name_end];
        if name.is_empty() {
            return Err(DemoError::MalformedTag(attrs_text.to_owned()));
        }
        remaining = &remaining[name_end..];

        let value = if let Some(rest) = remaining.trim_start().strip_prefix('=') {
            let (raw, rest) = parse_value(rest)
                .ok_or_else(|| DemoError::MalformedTag(attrs_text.to_owned()))?;
            remaining = rest;
            Some(raw)
        } else {
            None
        };

        let bound = name
            .strip_prefix("v-bind:")
            .or_else(|| name.strip_prefix(':'));

        if let Some(key) = bound {
            let Some(raw) = value else {
                warn!("bound attribute ':{key}' has no value, dropping it");
                continue;
            };
            match eval_bound(raw) {
                Some(parsed) => {
                    props.insert(camel_case(key), parsed);
                }
                None => {
                    warn!("failed to parse bound attribute '{key}' with value '{raw}'");
                }
            }
        } else {
            let parsed = match value {
                None | Some("") => Value::Bool(true),
                Some("true") => Value::Bool(true),
                Some("false") => Value::Bool(false),
                Some(other) => Value::String(other.to_owned()),
            };
            props.insert(camel_case(name), parsed);
        }
    }

    Ok(props)
}

/// Literal-expression evaluation with strict-JSON fallback.
fn eval_bound(raw: &str) -> Option<Value> {
    expr::eval(raw)
        .ok()
        .or_else(|| serde_json::from_str(raw).ok())
}

/// Parse an attribute value, returning the value and the rest of the input.
/// Accepts single quotes, double quotes and bare tokens, with optional
/// whitespace before the value.
fn parse_value(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    match s.chars().next()? {
        quote @ ('"' | '\'') => {
            let body = &s[1..];
            let end = body.find(quote)?;
            Some((&body[..end], &body[end + 1..]))
        }
        _ => {
            let end = s.find(char::is_whitespace).unwrap_or(s.len());
            Some((&s[..end], &s[end..]))
        }
    }
}

/// Normalize `kebab-case` attribute names to `camelCase` keys.
fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for c in s.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Remove and return a string-valued key.
fn take_string(props: &mut Map<String, Value>, key: &str) -> Option<String> {
    match props.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            warn!("ignoring non-string '{key}' value: {other}");
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_plain_string_attribute() {
        let props = parse_props(r#"src="./Foo.vue""#).unwrap();
        assert_eq!(props["src"], json!("./Foo.vue"));
    }

    #[test]
    fn test_boolean_shorthand() {
        let props = parse_props("twoslash").unwrap();
        assert_eq!(props["twoslash"], json!(true));
    }

    #[test]
    fn test_literal_booleans() {
        let props = parse_props(r#"a="true" b="false""#).unwrap();
        assert_eq!(props["a"], json!(true));
        assert_eq!(props["b"], json!(false));
    }

    #[test]
    fn test_empty_value_is_presence_flag() {
        // An explicitly empty value marks the attribute present, same as
        // the bare-name shorthand.
        let props = parse_props(r#"twoslash="""#).unwrap();
        assert_eq!(props["twoslash"], json!(true));
    }

    #[test]
    fn test_whitespace_around_equals() {
        let props = parse_props(r#"src = "./Foo.vue" :count ="1+1" desc= 'hi'"#).unwrap();
        assert_eq!(props["src"], json!("./Foo.vue"));
        assert_eq!(props["count"], json!(2));
        assert_eq!(props["desc"], json!("hi"));
    }

    #[test]
    fn test_unquoted_value() {
        let props = parse_props(r#"title=plain :count=2*3 src="./a.vue""#).unwrap();
        assert_eq!(props["title"], json!("plain"));
        assert_eq!(props["count"], json!(6));
        assert_eq!(props["src"], json!("./a.vue"));
    }

    #[test]
    fn test_bound_expression() {
        let props = parse_props(r#":count="1+1""#).unwrap();
        assert_eq!(props["count"], json!(2));
    }

    #[test]
    fn test_bound_array() {
        let props = parse_props(r#":files="['./a.vue', './b.ts']""#).unwrap();
        assert_eq!(props["files"], json!(["./a.vue", "./b.ts"]));
    }

    #[test]
    fn test_bound_json_fallback() {
        // Exponent notation is outside the literal-expression grammar but
        // valid JSON, so the fallback picks it up.
        let props = parse_props(r#":big="1e3""#).unwrap();
        assert_eq!(props["big"], json!(1000.0));
    }

    #[test]
    fn test_bound_failure_drops_attribute_only() {
        let props = parse_props(r#":bad="window.open()" src="./a.vue""#).unwrap();
        assert!(!props.contains_key("bad"));
        assert_eq!(props["src"], json!("./a.vue"));
    }

    #[test]
    fn test_v_bind_prefix() {
        let props = parse_props(r#"v-bind:count="2*3""#).unwrap();
        assert_eq!(props["count"], json!(6));
    }

    #[test]
    fn test_kebab_to_camel() {
        let props = parse_props(r#"js-attributes="no-line-numbers""#).unwrap();
        assert_eq!(props["jsAttributes"], json!("no-line-numbers"));
    }

    #[test]
    fn test_single_quoted_value() {
        let props = parse_props("description='Hello world'").unwrap();
        assert_eq!(props["description"], json!("Hello world"));
    }

    #[test]
    fn test_unterminated_quote_is_malformed() {
        let err = parse_props(r#"src="./a.vue"#).unwrap_err();
        assert!(matches!(err, DemoError::MalformedTag(_)));
    }

    #[test]
    fn test_deterministic() {
        let text = r#"src="./a.vue" :n="1+2" flag"#;
        assert_eq!(parse_props(text).unwrap(), parse_props(text).unwrap());
    }

    #[test]
    fn test_config_from_props() {
        let props = parse_props(
            r#"src="./Foo.vue" description="A demo" variant="ts" twoslash :count="3" title="x""#,
        )
        .unwrap();
        let config = DemoConfig::from_props(props);
        assert_eq!(config.src.as_deref(), Some("./Foo.vue"));
        assert_eq!(config.description, "A demo");
        assert_eq!(config.variant, Variant::TypedScript);
        assert!(config.twoslash);
        assert_eq!(config.extra["count"], json!(3));
        assert_eq!(config.extra["title"], json!("x"));
        assert!(!config.extra.contains_key("src"));
    }

    #[test]
    fn test_config_files_list() {
        let props = parse_props(r#":files="['./a.vue', './b.ts']""#).unwrap();
        let mut config = DemoConfig::from_props(props);
        assert_eq!(config.files, vec!["./a.vue", "./b.ts"]);
        // No src given: first file is promoted.
        config.validate().unwrap();
        assert_eq!(config.src.as_deref(), Some("./a.vue"));
    }

    #[test]
    fn test_config_missing_source() {
        let mut config = DemoConfig::from_props(Map::new());
        assert!(matches!(config.validate(), Err(DemoError::MissingSource)));
    }

    #[test]
    fn test_unknown_variant_falls_back() {
        let props = parse_props(r#"variant="svelte""#).unwrap();
        let config = DemoConfig::from_props(props);
        assert_eq!(config.variant, Variant::Component);
    }
}
