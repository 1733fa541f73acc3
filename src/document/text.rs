/*!
 * Text document support: pasted plain text or HTML fragments.
 *
 * HTML input is split on tag boundaries so that markup and attributes are
 * never sent for translation; only the text runs between tags become
 * segments. Plain text is split on blank-line paragraph boundaries. In both
 * cases the template is the original string with each run's trimmed core
 * replaced by a `{Tn}` marker, so surrounding whitespace and every tag byte
 * survive the round trip unchanged.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{placeholder, Extraction, Segment, Template};
use crate::errors::ExtractionError;

static HTML_MARKUP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[a-zA-Z!/][^>]*>").unwrap()
});

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(T\d+)\}").unwrap()
});

/// Flavor of a text document, detected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFlavor {
    Plain,
    Html,
}

/// A pasted text or HTML fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDocument {
    /// Document name
    pub name: String,

    /// The raw content
    pub content: String,

    /// Plain or HTML
    pub flavor: TextFlavor,
}

impl TextDocument {
    /// Create a text document, detecting HTML-like markup automatically.
    pub fn new(name: &str, content: &str) -> Self {
        let flavor = if HTML_MARKUP_REGEX.is_match(content) {
            TextFlavor::Html
        } else {
            TextFlavor::Plain
        };
        Self {
            name: name.to_string(),
            content: content.to_string(),
            flavor,
        }
    }

    /// Create a text document with an explicit flavor.
    pub fn with_flavor(name: &str, content: &str, flavor: TextFlavor) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            flavor,
        }
    }
}

/// Template for a text document: the original string with each extracted run
/// replaced by its `{Tn}` marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextTemplate {
    /// Document name
    pub name: String,

    /// Content with `{Tn}` markers
    pub content: String,

    /// Flavor carried over for the rebuilt document
    pub flavor: TextFlavor,
}

/// A half-open byte range of translatable text inside the content.
struct Run {
    start: usize,
    end: usize,
}

/// Extract text runs between HTML tags.
///
/// The contents of `<script>` and `<style>` elements are never translatable
/// and are treated as markup.
fn html_runs(content: &str) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut cursor = 0;
    let mut skip_until: Option<&'static str> = None;

    for tag in HTML_MARKUP_REGEX.find_iter(content) {
        if let Some(closer) = skip_until {
            // Inside <script>/<style>: markup and text alike are opaque
            if tag.as_str().to_ascii_lowercase().starts_with(closer) {
                skip_until = None;
                cursor = tag.end();
            }
            continue;
        }
        if tag.start() > cursor {
            runs.push(Run {
                start: cursor,
                end: tag.start(),
            });
        }
        let lowered = tag.as_str().to_ascii_lowercase();
        if lowered.starts_with("<script") {
            skip_until = Some("</script");
        } else if lowered.starts_with("<style") {
            skip_until = Some("</style");
        }
        cursor = tag.end();
    }
    if skip_until.is_none() && cursor < content.len() {
        runs.push(Run {
            start: cursor,
            end: content.len(),
        });
    }
    runs
}

/// Extract paragraph runs from plain text, splitting on blank lines.
fn plain_runs(content: &str) -> Vec<Run> {
    static PARAGRAPH_BREAK_REGEX: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

    let mut runs = Vec::new();
    let mut cursor = 0;
    for gap in PARAGRAPH_BREAK_REGEX.find_iter(content) {
        if gap.start() > cursor {
            runs.push(Run {
                start: cursor,
                end: gap.start(),
            });
        }
        cursor = gap.end();
    }
    if cursor < content.len() {
        runs.push(Run {
            start: cursor,
            end: content.len(),
        });
    }
    runs
}

/// Trim a run to its non-whitespace core, returning `None` for all-blank runs.
fn trimmed_core(content: &str, run: &Run) -> Option<(usize, usize)> {
    let slice = &content[run.start..run.end];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let leading = slice.len() - slice.trim_start().len();
    let start = run.start + leading;
    Some((start, start + trimmed.len()))
}

/// Extract one segment per non-blank text run.
pub(crate) fn extract(doc: &TextDocument) -> Result<Extraction, ExtractionError> {
    let runs = match doc.flavor {
        TextFlavor::Html => html_runs(&doc.content),
        TextFlavor::Plain => plain_runs(&doc.content),
    };

    let mut segments = Vec::new();
    let mut template_content = String::with_capacity(doc.content.len());
    let mut cursor = 0;

    for run in &runs {
        let Some((core_start, core_end)) = trimmed_core(&doc.content, run) else {
            continue;
        };
        let segment = Segment::new(
            segments.len() + 1,
            &doc.content[core_start..core_end],
            None,
        );
        template_content.push_str(&doc.content[cursor..core_start]);
        template_content.push_str(&placeholder(&segment.id));
        cursor = core_end;
        segments.push(segment);
    }
    template_content.push_str(&doc.content[cursor..]);

    Ok(Extraction {
        segments,
        template: Template::Text(TextTemplate {
            name: doc.name.clone(),
            content: template_content,
            flavor: doc.flavor,
        }),
    })
}

/// Rebuild the string by substituting every `{Tn}` marker.
///
/// Markers the resolver cannot answer are left in place so the gap is
/// visible rather than silently dropped.
pub(crate) fn rebuild(
    template: &TextTemplate,
    resolve: &dyn Fn(&str) -> Option<String>,
) -> TextDocument {
    let content = PLACEHOLDER_REGEX
        .replace_all(&template.content, |captures: &regex::Captures<'_>| {
            resolve(&captures[1]).unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned();
    TextDocument {
        name: template.name.clone(),
        content,
        flavor: template.flavor,
    }
}
