//! The in-progress submission aggregate.
//!
//! A [`SubmissionDraft`] is created empty when the wizard starts and is only
//! mutated through the step-scoped editors in [`crate::forms`].

use std::collections::BTreeSet;

use serde::Serialize;

use crate::attachments::AttachmentRegistry;
use crate::authors::AuthorList;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Checklist
// ---------------------------------------------------------------------------

/// Attestations the author must confirm on the start step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistItem {
    Originality,
    FileFormat,
    ReferencesHaveIdentifiers,
    Formatting,
    GuidelineCompliance,
    BlindReviewReadiness,
}

impl ChecklistItem {
    /// Every required item, in display order.
    pub const ALL: [ChecklistItem; 6] = [
        Self::Originality,
        Self::FileFormat,
        Self::ReferencesHaveIdentifiers,
        Self::Formatting,
        Self::GuidelineCompliance,
        Self::BlindReviewReadiness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Originality => "originality",
            Self::FileFormat => "file_format",
            Self::ReferencesHaveIdentifiers => "references_have_identifiers",
            Self::Formatting => "formatting",
            Self::GuidelineCompliance => "guideline_compliance",
            Self::BlindReviewReadiness => "blind_review_readiness",
        }
    }

    /// Human-readable statement shown next to the checkbox.
    pub fn label(self) -> &'static str {
        match self {
            Self::Originality => {
                "The submission has not been previously published nor is it under review elsewhere"
            }
            Self::FileFormat => "The manuscript file is in PDF, DOC, DOCX or RTF format",
            Self::ReferencesHaveIdentifiers => {
                "DOIs or URLs are provided for references where available"
            }
            Self::Formatting => {
                "The text follows the required formatting for spacing, fonts, figures and tables"
            }
            Self::GuidelineCompliance => {
                "The text adheres to the stylistic and bibliographic requirements in the author guidelines"
            }
            Self::BlindReviewReadiness => {
                "Author identification has been removed to ensure a blind review"
            }
        }
    }
}

/// Set of confirmed checklist attestations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Checklist {
    confirmed: BTreeSet<ChecklistItem>,
}

impl Checklist {
    pub fn set(&mut self, item: ChecklistItem, confirmed: bool) {
        if confirmed {
            self.confirmed.insert(item);
        } else {
            self.confirmed.remove(&item);
        }
    }

    pub fn is_confirmed(&self, item: ChecklistItem) -> bool {
        self.confirmed.contains(&item)
    }

    /// Required items not yet confirmed, in display order.
    pub fn missing(&self) -> impl Iterator<Item = ChecklistItem> + '_ {
        ChecklistItem::ALL
            .into_iter()
            .filter(|item| !self.confirmed.contains(item))
    }

    pub fn is_complete(&self) -> bool {
        self.missing().next().is_none()
    }

    /// Confirmed items, in display order.
    pub fn confirmed(&self) -> Vec<ChecklistItem> {
        self.confirmed.iter().copied().collect()
    }

    /// A checklist with every required item confirmed.
    pub fn all_confirmed() -> Self {
        Self {
            confirmed: ChecklistItem::ALL.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Language the manuscript is written in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Spanish,
    Portuguese,
    French,
}

impl Language {
    /// Parse an ISO 639-1 code.
    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::English),
            "es" => Ok(Self::Spanish),
            "pt" => Ok(Self::Portuguese),
            "fr" => Ok(Self::French),
            other => Err(CoreError::Validation(format!(
                "Invalid language code '{other}'. Must be one of: en, es, pt, fr"
            ))),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::Portuguese => "pt",
            Self::French => "fr",
        }
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Everything the wizard has collected so far.
///
/// `keywords` and `agencies` are `;`-separated; `references` holds one entry
/// per blank-line-delimited block. They are normalized only at assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmissionDraft {
    pub checklist: Checklist,
    pub copyright_agreed: bool,
    pub comments: String,
    pub authors: AuthorList,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: String,
    pub language: Language,
    pub agencies: String,
    pub references: String,
    pub attachments: AttachmentRegistry,
}

impl SubmissionDraft {
    pub fn new() -> Self {
        Self::default()
    }
}
