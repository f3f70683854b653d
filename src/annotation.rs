use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Stable identifier of an annotation, assigned by the document engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal alignment of the overlay text inside a redaction box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// The visual style of a redaction mark. These are the fields the viewer's
/// active redaction tool carries and the fields a bulk style update overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionStyle {
    pub fill_color: String,
    pub overlay_text: String,
    pub text_color: String,
    pub stroke_color: String,
    pub font: String,
    pub font_size: u16,
    pub opacity: f32,
    pub stroke_thickness: f32,
    pub text_align: TextAlign,
}

impl Default for RedactionStyle {
    fn default() -> Self {
        Self {
            fill_color: "#000000".to_string(),
            overlay_text: String::new(),
            text_color: "#ffffff".to_string(),
            stroke_color: "#ff0000".to_string(),
            font: "Helvetica".to_string(),
            font_size: 12,
            opacity: 1.0,
            stroke_thickness: 1.0,
            text_align: TextAlign::default(),
        }
    }
}

/// A redaction annotation as mirrored from the document engine.
///
/// The engine owns the canonical object; this is the panel-side view of it.
/// `mark_checked` is a transient UI flag and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub page_number: u32,
    #[serde(default)]
    pub author: String,
    pub created_at: DateTime<Utc>,
    /// The marked text, present when the redaction covers a text selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
    /// True for a whole-page redaction mark.
    #[serde(default)]
    pub full_page: bool,
    #[serde(default)]
    pub style: RedactionStyle,
    #[serde(skip)]
    pub mark_checked: bool,
}

impl Annotation {
    pub fn new(id: AnnotationId, page_number: u32) -> Self {
        Self {
            id,
            page_number,
            author: String::new(),
            created_at: Utc::now(),
            text_preview: None,
            full_page: false,
            style: RedactionStyle::default(),
            mark_checked: false,
        }
    }
}

/// Classification of a redaction mark, derived purely from the annotation's
/// own fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionKind {
    /// Covers a text selection.
    Text,
    /// Covers a drawn region with no text under it.
    Region,
    /// Covers an entire page.
    FullPage,
}

impl RedactionKind {
    pub fn classify(annotation: &Annotation) -> Self {
        if annotation.full_page {
            RedactionKind::FullPage
        } else if annotation.text_preview.is_some() {
            RedactionKind::Text
        } else {
            RedactionKind::Region
        }
    }

    /// Built-in label used when the dictionary has no entry for this kind.
    pub fn fallback_label(&self) -> &'static str {
        match self {
            RedactionKind::Text => "Text",
            RedactionKind::Region => "Region",
            RedactionKind::FullPage => "Full page",
        }
    }

    /// Built-in glyph used when the dictionary has no entry for this kind.
    pub fn fallback_icon(&self) -> &'static str {
        match self {
            RedactionKind::Text => "≡",
            RedactionKind::Region => "▦",
            RedactionKind::FullPage => "□",
        }
    }

    pub fn all() -> &'static [RedactionKind] {
        &[
            RedactionKind::Text,
            RedactionKind::Region,
            RedactionKind::FullPage,
        ]
    }
}

/// Display metadata for one redaction kind.
#[derive(Debug, Clone, PartialEq)]
pub struct KindInfo {
    pub label: String,
    pub icon: String,
}

/// Dictionary mapping redaction kinds to their display label and icon.
///
/// Callers are expected to keep it exhaustive over all classifiable kinds;
/// lookups for a missing kind are handled fail-soft by the index builder.
#[derive(Debug, Clone, Default)]
pub struct RedactionKinds {
    entries: HashMap<RedactionKind, KindInfo>,
}

impl RedactionKinds {
    /// Dictionary covering every built-in kind with its default display data.
    pub fn standard() -> Self {
        let mut kinds = Self::default();
        for kind in RedactionKind::all() {
            kinds.insert(*kind, kind.fallback_label(), kind.fallback_icon());
        }
        kinds
    }

    pub fn insert(&mut self, kind: RedactionKind, label: &str, icon: &str) {
        self.entries.insert(
            kind,
            KindInfo {
                label: label.to_string(),
                icon: icon.to_string(),
            },
        );
    }

    pub fn info(&self, kind: RedactionKind) -> Option<&KindInfo> {
        self.entries.get(&kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_prefers_full_page_over_text() {
        let mut annotation = Annotation::new(AnnotationId(1), 1);
        annotation.text_preview = Some("secret".to_string());
        annotation.full_page = true;
        assert_eq!(
            RedactionKind::classify(&annotation),
            RedactionKind::FullPage
        );
    }

    #[test]
    fn classify_text_and_region() {
        let mut annotation = Annotation::new(AnnotationId(1), 1);
        assert_eq!(RedactionKind::classify(&annotation), RedactionKind::Region);
        annotation.text_preview = Some("secret".to_string());
        assert_eq!(RedactionKind::classify(&annotation), RedactionKind::Text);
    }

    #[test]
    fn standard_dictionary_covers_every_kind() {
        let kinds = RedactionKinds::standard();
        for kind in RedactionKind::all() {
            assert!(kinds.info(*kind).is_some(), "missing entry for {kind:?}");
        }
    }

    #[test]
    fn annotation_round_trips_through_json_without_checked_flag() {
        let mut annotation = Annotation::new(AnnotationId(7), 3);
        annotation.author = "alice".to_string();
        annotation.mark_checked = true;

        let json = serde_json::to_string(&annotation).unwrap();
        let restored: Annotation = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, AnnotationId(7));
        assert_eq!(restored.page_number, 3);
        assert!(!restored.mark_checked, "checked flag must not persist");
    }
}
