use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    pub const ALL: &[Visibility] = &[Visibility::Private, Visibility::Public];

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Visibility::Private => "Private",
            Visibility::Public => "Public",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "private" => Some(Visibility::Private),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    /// The reader's original story idea.
    pub idea: String,
    /// One-sentence scene description used to illustrate the cover.
    pub cover_prompt: String,
    /// Chaptered narrative, markdown.
    pub content: String,
    /// Object store key of the current cover image.
    pub cover_key: String,
    #[serde(default)]
    pub author: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn word_count(&self) -> usize {
        pagination::word_count(&self.content)
    }

    pub fn summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            visibility: self.visibility,
            word_count: self.word_count(),
            created_at: self.created_at,
        }
    }
}

/// Shelf entry for library and gallery listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    pub author: String,
    pub visibility: Visibility,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBook {
    pub title: String,
    #[serde(default)]
    pub idea: String,
    #[serde(default)]
    pub cover_prompt: String,
    pub content: String,
    pub cover_key: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub visibility: Option<Visibility>,
    pub cover_key: Option<String>,
}

impl UpdateBook {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.visibility.is_none()
            && self.cover_key.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub visibility: Option<Visibility>,
    pub author: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl BookFilter {
    pub fn public() -> Self {
        Self {
            visibility: Some(Visibility::Public),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book(content: &str) -> Book {
        let now = Utc::now();
        Book {
            id: "b-1".into(),
            title: "The Lighthouse".into(),
            idea: "a keeper who talks to whales".into(),
            cover_prompt: "a lighthouse at dusk".into(),
            content: content.into(),
            cover_key: "covers/c-1.png".into(),
            author: "ana".into(),
            visibility: Visibility::Public,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn visibility_string_mapping() {
        for v in Visibility::ALL {
            assert_eq!(Visibility::parse_str(v.as_str()), Some(*v));
        }
        assert_eq!(Visibility::parse_str("unlisted"), None);
        assert_eq!(Visibility::default(), Visibility::Private);
    }

    #[test]
    fn visibility_serializes_snake_case() {
        let json = serde_json::to_string(&Visibility::Public).unwrap();
        assert_eq!(json, "\"public\"");
    }

    #[test]
    fn summary_counts_words_and_drops_content() {
        let book = sample_book("## Chapter 1\n\nThe sea was calm.");
        let summary = book.summary();
        assert_eq!(summary.word_count, 7);
        assert_eq!(summary.title, "The Lighthouse");
        assert_eq!(summary.visibility, Visibility::Public);
    }

    #[test]
    fn create_book_defaults_to_private() {
        let input: CreateBook = serde_json::from_str(
            r#"{"title":"T","content":"C","cover_key":"covers/x.png"}"#,
        )
        .unwrap();
        assert_eq!(input.visibility, Visibility::Private);
        assert!(input.author.is_empty());
    }

    #[test]
    fn update_book_is_empty() {
        assert!(UpdateBook::default().is_empty());
        let update = UpdateBook {
            visibility: Some(Visibility::Public),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
