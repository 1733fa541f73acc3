/*!
 * JSON document support: a value tree plus a named schema enumerating the
 * translatable leaf paths (dotted keys, `[n]` for array indices).
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{placeholder, Extraction, Segment, Template};
use crate::errors::ExtractionError;

static PATH_TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([^.\[\]]+)|\[(\d+)\]").unwrap()
});

/// A JSON tree with its translation schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonDocument {
    /// Document name (usually the payload or file name)
    pub name: String,

    /// Schema naming the translatable leaves
    pub schema: JsonSchema,

    /// The parsed tree
    pub root: Value,
}

impl JsonDocument {
    pub fn new(name: &str, schema: JsonSchema, root: Value) -> Self {
        Self {
            name: name.to_string(),
            schema,
            root,
        }
    }
}

/// Named schema describing which leaf paths of a JSON tree are translatable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema name
    pub name: String,

    /// Translatable leaf paths in extraction order, e.g. `items[2].title`
    pub translatable_paths: Vec<String>,
}

impl JsonSchema {
    pub fn new(name: &str, translatable_paths: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            translatable_paths,
        }
    }

    /// Infer a schema covering every string leaf of the tree, in a stable
    /// depth-first order. This stands in for an external schema detector
    /// when a payload arrives without one.
    pub fn infer(name: &str, root: &Value) -> Self {
        let mut paths = Vec::new();
        collect_string_paths(root, String::new(), &mut paths);
        Self::new(name, paths)
    }
}

fn collect_string_paths(value: &Value, prefix: String, out: &mut Vec<String>) {
    match value {
        Value::String(_) => out.push(prefix),
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect_string_paths(child, path, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_string_paths(child, format!("{}[{}]", prefix, index), out);
            }
        }
        _ => {}
    }
}

/// One step of a parsed leaf path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathToken {
    Key(String),
    Index(usize),
}

fn parse_path(path: &str) -> Result<Vec<PathToken>, ExtractionError> {
    let mut tokens = Vec::new();
    for captures in PATH_TOKEN_REGEX.captures_iter(path) {
        if let Some(key) = captures.get(1) {
            tokens.push(PathToken::Key(key.as_str().to_string()));
        } else {
            let index = captures[2].parse().map_err(|_| {
                ExtractionError::MalformedDocument(format!(
                    "schema path '{}' has an out-of-range array index",
                    path
                ))
            })?;
            tokens.push(PathToken::Index(index));
        }
    }
    if tokens.is_empty() {
        return Err(ExtractionError::MalformedDocument(format!(
            "empty schema path: '{}'",
            path
        )));
    }
    Ok(tokens)
}

fn lookup<'a>(root: &'a Value, tokens: &[PathToken]) -> Option<&'a Value> {
    let mut current = root;
    for token in tokens {
        current = match token {
            PathToken::Key(key) => current.get(key.as_str())?,
            PathToken::Index(index) => current.get(index)?,
        };
    }
    Some(current)
}

fn lookup_mut<'a>(root: &'a mut Value, tokens: &[PathToken]) -> Option<&'a mut Value> {
    let mut current = root;
    for token in tokens {
        current = match token {
            PathToken::Key(key) => current.get_mut(key.as_str())?,
            PathToken::Index(index) => current.get_mut(index)?,
        };
    }
    Some(current)
}

/// Template for a JSON document: the original tree with every extracted leaf
/// replaced by its `{Tn}` marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonTemplate {
    /// Document name
    pub name: String,

    /// Schema the template was extracted against
    pub schema: JsonSchema,

    /// Tree with `{Tn}` markers at extracted leaves
    pub root: Value,
}

/// Extract one segment per translatable string leaf named by the schema.
///
/// A schema path that resolves to a missing node or a non-string value fails
/// the whole extraction; a path whose string is empty after trimming is left
/// in place without a segment.
pub(crate) fn extract(doc: &JsonDocument) -> Result<Extraction, ExtractionError> {
    let mut segments = Vec::new();
    let mut template_root = doc.root.clone();

    for path in &doc.schema.translatable_paths {
        let tokens = parse_path(path)?;
        let leaf = lookup(&doc.root, &tokens).ok_or_else(|| {
            ExtractionError::MalformedDocument(format!(
                "document '{}': schema path '{}' not found in tree",
                doc.name, path
            ))
        })?;
        let text = leaf.as_str().ok_or_else(|| {
            ExtractionError::MalformedDocument(format!(
                "document '{}': schema path '{}' is not a string leaf",
                doc.name, path
            ))
        })?;
        if text.trim().is_empty() {
            continue;
        }

        let segment = Segment::new(segments.len() + 1, text, Some(path.clone()));
        let marker = placeholder(&segment.id);
        // The lookup succeeded on the original tree, so the clone has the node
        if let Some(slot) = lookup_mut(&mut template_root, &tokens) {
            *slot = Value::String(marker);
        }
        segments.push(segment);
    }

    Ok(Extraction {
        segments,
        template: Template::Json(JsonTemplate {
            name: doc.name.clone(),
            schema: doc.schema.clone(),
            root: template_root,
        }),
    })
}

/// Rebuild the tree by writing resolved text back at each segment's path.
///
/// Everything outside the extracted leaves is the template's own clone of the
/// original tree, untouched.
pub(crate) fn rebuild(
    template: &JsonTemplate,
    segments: &[Segment],
    resolve: &dyn Fn(&str) -> Option<String>,
) -> JsonDocument {
    let mut root = template.root.clone();
    for segment in segments {
        let Some(path) = &segment.path else { continue };
        let Ok(tokens) = parse_path(path) else { continue };
        if let Some(slot) = lookup_mut(&mut root, &tokens) {
            if let Some(text) = resolve(&segment.id) {
                *slot = Value::String(text);
            }
        }
    }
    JsonDocument {
        name: template.name.clone(),
        schema: template.schema.clone(),
        root,
    }
}
