//! Splitter for the tag-delimited format the generation prompt asks for:
//!
//! ```text
//! [TITLE]...[/TITLE][COVER_PROMPT]...[/COVER_PROMPT][CONTENT]...[/CONTENT]
//! ```
//!
//! Models are not reliable about the envelope, so anything outside the tags
//! (preambles, code fences, trailing chatter) is ignored and sections may come
//! in any order. A missing delimiter is an error the caller surfaces to the
//! user, never a panic.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Title,
    CoverPrompt,
    Content,
}

impl Section {
    pub const ALL: &[Section] = &[Section::Title, Section::CoverPrompt, Section::Content];

    pub fn tag(&self) -> &'static str {
        match self {
            Section::Title => "TITLE",
            Section::CoverPrompt => "COVER_PROMPT",
            Section::Content => "CONTENT",
        }
    }

    pub fn open(&self) -> &'static str {
        match self {
            Section::Title => "[TITLE]",
            Section::CoverPrompt => "[COVER_PROMPT]",
            Section::Content => "[CONTENT]",
        }
    }

    pub fn close(&self) -> &'static str {
        match self {
            Section::Title => "[/TITLE]",
            Section::CoverPrompt => "[/COVER_PROMPT]",
            Section::Content => "[/CONTENT]",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.open())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing opening tag {0}")]
    MissingOpenTag(Section),

    #[error("missing closing tag for {0}")]
    MissingCloseTag(Section),

    #[error("section {0} is empty")]
    EmptySection(Section),
}

impl ParseError {
    /// Message suitable for showing to the person who submitted the idea.
    pub fn user_message(&self) -> String {
        format!("the model did not return the expected format ({self}); please try again")
    }
}

/// The three parts of a generated book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedBook {
    pub title: String,
    pub cover_prompt: String,
    pub content: String,
}

/// Return the trimmed text between the first `[TAG]` and its `[/TAG]`.
///
/// The closing tag is only searched for up to the next repeated opening tag,
/// so `[TITLE]a[TITLE]b[/TITLE]` yields a `MissingCloseTag` for the first
/// occurrence instead of silently spanning both.
pub fn extract_section(raw: &str, section: Section) -> Result<&str, ParseError> {
    let open = section.open();
    let start = raw
        .find(open)
        .ok_or(ParseError::MissingOpenTag(section))?
        + open.len();
    let rest = &raw[start..];
    let segment = match rest.find(open) {
        Some(next) => &rest[..next],
        None => rest,
    };
    let end = segment
        .find(section.close())
        .ok_or(ParseError::MissingCloseTag(section))?;
    Ok(segment[..end].trim())
}

/// Split a raw model response into title, cover prompt and content.
///
/// Title and content must be non-blank. A blank cover prompt is accepted;
/// callers fall back to the title when illustrating.
pub fn parse_generated_book(raw: &str) -> Result<GeneratedBook, ParseError> {
    let title = extract_section(raw, Section::Title)?;
    let cover_prompt = extract_section(raw, Section::CoverPrompt)?;
    let content = extract_section(raw, Section::Content)?;

    if title.is_empty() {
        return Err(ParseError::EmptySection(Section::Title));
    }
    if content.is_empty() {
        return Err(ParseError::EmptySection(Section::Content));
    }

    Ok(GeneratedBook {
        title: title.to_string(),
        cover_prompt: cover_prompt.to_string(),
        content: content.to_string(),
    })
}
