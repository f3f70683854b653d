use crate::annotation::{Annotation, AnnotationId, RedactionStyle};
use log::debug;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("annotation {0} not found")]
    NotFound(AnnotationId),
}

/// A mutation requested against the annotation store.
///
/// The panel never writes annotation fields directly; every edit travels as a
/// command so the ownership boundary with the engine stays auditable.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetChecked {
        id: AnnotationId,
        checked: bool,
    },
    /// Overwrite the annotation's style fields from the given style.
    SetStyle {
        id: AnnotationId,
        style: RedactionStyle,
    },
    Delete {
        ids: Vec<AnnotationId>,
    },
}

/// Owns the redaction annotations in arrival order.
///
/// `revision` moves on structural changes (insert/delete) only. Flag and style
/// edits leave it alone, so the page index is not rebuilt for them and bucket
/// order stays stable between list refreshes.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    revision: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_annotations(annotations: Vec<Annotation>) -> Self {
        Self {
            annotations,
            revision: 0,
        }
    }

    /// All annotations in arrival order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn insert(&mut self, annotation: Annotation) {
        debug!(
            "annotation {} added on page {}",
            annotation.id, annotation.page_number
        );
        self.annotations.push(annotation);
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        if !self.annotations.is_empty() {
            self.annotations.clear();
            self.revision += 1;
        }
    }

    pub fn apply(&mut self, command: Command) -> Result<(), StoreError> {
        match command {
            Command::SetChecked { id, checked } => {
                let annotation = self.get_mut(id)?;
                annotation.mark_checked = checked;
                Ok(())
            }
            Command::SetStyle { id, style } => {
                let annotation = self.get_mut(id)?;
                annotation.style = style;
                Ok(())
            }
            Command::Delete { ids } => {
                let before = self.annotations.len();
                self.annotations.retain(|a| !ids.contains(&a.id));
                let removed = before - self.annotations.len();
                if removed > 0 {
                    self.revision += 1;
                }
                if removed < ids.len() {
                    debug!("delete skipped {} unknown annotations", ids.len() - removed);
                }
                Ok(())
            }
        }
    }

    fn get_mut(&mut self, id: AnnotationId) -> Result<&mut Annotation, StoreError> {
        self.annotations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(pages: &[(u64, u32)]) -> AnnotationStore {
        AnnotationStore::from_annotations(
            pages
                .iter()
                .map(|(id, page)| Annotation::new(AnnotationId(*id), *page))
                .collect(),
        )
    }

    #[test]
    fn set_checked_does_not_move_revision() {
        let mut store = store_with(&[(1, 1), (2, 1)]);
        let before = store.revision();
        store
            .apply(Command::SetChecked {
                id: AnnotationId(2),
                checked: true,
            })
            .unwrap();
        assert!(store.get(AnnotationId(2)).unwrap().mark_checked);
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn set_style_overwrites_only_style() {
        let mut store = store_with(&[(1, 4)]);
        let mut style = RedactionStyle::default();
        style.overlay_text = "CLASSIFIED".to_string();
        style.font_size = 18;
        store
            .apply(Command::SetStyle {
                id: AnnotationId(1),
                style: style.clone(),
            })
            .unwrap();

        let annotation = store.get(AnnotationId(1)).unwrap();
        assert_eq!(annotation.style, style);
        assert_eq!(annotation.page_number, 4);
        assert!(!annotation.mark_checked);
    }

    #[test]
    fn commands_on_unknown_annotation_report_not_found() {
        let mut store = store_with(&[(1, 1)]);
        let err = store
            .apply(Command::SetChecked {
                id: AnnotationId(9),
                checked: true,
            })
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound(AnnotationId(9)));
    }

    #[test]
    fn delete_moves_revision_and_skips_unknown_ids() {
        let mut store = store_with(&[(1, 1), (2, 2), (3, 2)]);
        let before = store.revision();
        store
            .apply(Command::Delete {
                ids: vec![AnnotationId(2), AnnotationId(9)],
            })
            .unwrap();
        assert_eq!(store.len(), 2);
        assert!(!store.contains(AnnotationId(2)));
        assert_eq!(store.revision(), before + 1);

        // Deleting nothing leaves the revision alone.
        let before = store.revision();
        store
            .apply(Command::Delete {
                ids: vec![AnnotationId(9)],
            })
            .unwrap();
        assert_eq!(store.revision(), before);
    }
}
