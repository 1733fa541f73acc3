/*!
 * Subtitle document support: an ordered cue list with start/end timestamps.
 *
 * Timestamps are never touched by translation; only cue text is extracted,
 * and the rebuilt cue list preserves index and timing exactly. SRT
 * parse/format helpers are provided so the CLI can round-trip subtitle
 * files without an external parser.
 */

use std::fmt;

use anyhow::{anyhow, Result};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Extraction, Segment, Template};
use crate::errors::ExtractionError;

static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2})[,.](\d{3}) --> (\d{2}):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

/// A single subtitle cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Sequence number from the source file
    pub index: usize,

    /// Start time in milliseconds
    pub start_ms: u64,

    /// End time in milliseconds
    pub end_ms: u64,

    /// Cue text, possibly multi-line
    pub text: String,
}

impl SubtitleCue {
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: String) -> Self {
        Self {
            index,
            start_ms,
            end_ms,
            text,
        }
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm).
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;
        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Parse an SRT/VTT timestamp (HH:MM:SS,mmm or HH:MM:SS.mmm) to milliseconds.
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();
        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse()?;
        let minutes: u64 = parts[1].parse()?;
        let seconds: u64 = parts[2].parse()?;
        let millis: u64 = parts[3].parse()?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// An ordered cue list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleDocument {
    /// Document name (usually the file stem)
    pub name: String,

    /// Cues in display order
    pub cues: Vec<SubtitleCue>,
}

impl SubtitleDocument {
    pub fn new(name: &str, cues: Vec<SubtitleCue>) -> Self {
        Self {
            name: name.to_string(),
            cues,
        }
    }

    /// Parse SRT content into a subtitle document.
    ///
    /// Cues with broken timestamps are skipped with a warning rather than
    /// failing the whole file.
    pub fn parse_srt(name: &str, content: &str) -> Result<Self> {
        let mut cues = Vec::new();

        let mut current_index: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text = String::new();

        let flush = |index: &mut Option<usize>,
                         times: &mut Option<(u64, u64)>,
                         text: &mut String,
                         cues: &mut Vec<SubtitleCue>| {
            if let (Some(seq), Some((start_ms, end_ms))) = (*index, *times) {
                if end_ms <= start_ms {
                    warn!("Skipping cue {} with inverted time range", seq);
                } else {
                    cues.push(SubtitleCue::new(seq, start_ms, end_ms, text.clone()));
                }
            }
            *index = None;
            *times = None;
            text.clear();
        };

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if current_times.is_some() {
                    flush(&mut current_index, &mut current_times, &mut current_text, &mut cues);
                }
                continue;
            }

            if current_index.is_none() && current_text.is_empty() {
                if let Ok(num) = trimmed.parse::<usize>() {
                    current_index = Some(num);
                    continue;
                }
            }

            if current_index.is_some() && current_times.is_none() {
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    let start = parse_capture_ms(&caps, 1);
                    let end = parse_capture_ms(&caps, 5);
                    if let (Ok(start_ms), Ok(end_ms)) = (start, end) {
                        current_times = Some((start_ms, end_ms));
                        continue;
                    }
                    warn!("Invalid timestamp line: {}", trimmed);
                }
            }

            if current_times.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            }
        }
        flush(&mut current_index, &mut current_times, &mut current_text, &mut cues);

        Ok(Self::new(name, cues))
    }

    /// Serialize the cue list back to SRT.
    pub fn to_srt_string(&self) -> String {
        let mut out = String::new();
        for cue in &self.cues {
            out.push_str(&cue.to_string());
        }
        out
    }
}

fn parse_capture_ms(caps: &regex::Captures<'_>, first_group: usize) -> Result<u64> {
    let hours: u64 = caps[first_group].parse()?;
    let minutes: u64 = caps[first_group + 1].parse()?;
    let seconds: u64 = caps[first_group + 2].parse()?;
    let millis: u64 = caps[first_group + 3].parse()?;
    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Template for a subtitle document: the ordered cue list with text replaced
/// by segment references, timestamps untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleTemplate {
    /// Document name
    pub name: String,

    /// One slot per cue, in order
    pub cues: Vec<CueSlot>,
}

/// One templated cue: timing plus either a segment reference or the original
/// text of a cue that produced no segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueSlot {
    /// Sequence number from the source file
    pub index: usize,

    /// Start time in milliseconds
    pub start_ms: u64,

    /// End time in milliseconds
    pub end_ms: u64,

    /// Segment holding this cue's translatable text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_id: Option<String>,

    /// Verbatim text of a non-translatable (blank) cue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

/// Extract one segment per cue with non-blank text.
pub(crate) fn extract(doc: &SubtitleDocument) -> Result<Extraction, ExtractionError> {
    let mut segments = Vec::new();
    let mut cues = Vec::with_capacity(doc.cues.len());

    for cue in &doc.cues {
        let (segment_id, literal) = if cue.text.trim().is_empty() {
            (None, Some(cue.text.clone()))
        } else {
            let segment = Segment::new(
                segments.len() + 1,
                &cue.text,
                Some(cue.index.to_string()),
            );
            let id = segment.id.clone();
            segments.push(segment);
            (Some(id), None)
        };
        cues.push(CueSlot {
            index: cue.index,
            start_ms: cue.start_ms,
            end_ms: cue.end_ms,
            segment_id,
            literal,
        });
    }

    Ok(Extraction {
        segments,
        template: Template::Subtitle(SubtitleTemplate {
            name: doc.name.clone(),
            cues,
        }),
    })
}

/// Rebuild the cue list, substituting translated text per slot.
pub(crate) fn rebuild(
    template: &SubtitleTemplate,
    resolve: &dyn Fn(&str) -> Option<String>,
) -> SubtitleDocument {
    let cues = template
        .cues
        .iter()
        .map(|slot| {
            let text = match (&slot.segment_id, &slot.literal) {
                (Some(id), _) => resolve(id).unwrap_or_default(),
                (None, Some(literal)) => literal.clone(),
                (None, None) => String::new(),
            };
            SubtitleCue::new(slot.index, slot.start_ms, slot.end_ms, text)
        })
        .collect();
    SubtitleDocument {
        name: template.name.clone(),
        cues,
    }
}
