use crate::annotation::{Annotation, AnnotationId, RedactionKind, RedactionKinds};
use crate::store::AnnotationStore;
use log::warn;
use std::collections::HashMap;

/// One entry in a page bucket: the annotation reference plus the display
/// classification derived when the index was built.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionEntry {
    pub id: AnnotationId,
    pub kind: RedactionKind,
    pub label: String,
    pub icon: String,
}

/// The redaction marks of one page, newest-processed first.
#[derive(Debug, Clone)]
pub struct PageBucket {
    pub page: u32,
    pub entries: Vec<RedactionEntry>,
}

/// Groups a flat annotation list by page.
///
/// Buckets appear in first-encounter order of their page numbers, and within
/// a bucket entries are in reverse encounter order (each annotation is
/// prepended to its page). Both orders are load-bearing: they define the
/// default traversal used by previous/next navigation. A rebuild is the only
/// way a page-number change is picked up.
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    buckets: Vec<PageBucket>,
    by_page: HashMap<u32, usize>,
    positions: HashMap<AnnotationId, (usize, usize)>,
}

impl PageIndex {
    pub fn build<'a>(
        annotations: impl IntoIterator<Item = &'a Annotation>,
        kinds: &RedactionKinds,
    ) -> Self {
        let mut buckets: Vec<PageBucket> = Vec::new();
        let mut by_page: HashMap<u32, usize> = HashMap::new();

        for annotation in annotations {
            let kind = RedactionKind::classify(annotation);
            let (label, icon) = match kinds.info(kind) {
                Some(info) => (info.label.clone(), info.icon.clone()),
                None => {
                    warn!("redaction kind {kind:?} missing from dictionary, using fallback");
                    (
                        kind.fallback_label().to_string(),
                        kind.fallback_icon().to_string(),
                    )
                }
            };
            let entry = RedactionEntry {
                id: annotation.id,
                kind,
                label,
                icon,
            };

            let slot = *by_page.entry(annotation.page_number).or_insert_with(|| {
                buckets.push(PageBucket {
                    page: annotation.page_number,
                    entries: Vec::new(),
                });
                buckets.len() - 1
            });
            // Newest first within a page.
            buckets[slot].entries.insert(0, entry);
        }

        let mut positions = HashMap::new();
        for (b, bucket) in buckets.iter().enumerate() {
            for (i, entry) in bucket.entries.iter().enumerate() {
                positions.insert(entry.id, (b, i));
            }
        }

        Self {
            buckets,
            by_page,
            positions,
        }
    }

    pub fn buckets(&self) -> &[PageBucket] {
        &self.buckets
    }

    /// Distinct page numbers in first-encounter order.
    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.buckets.iter().map(|b| b.page)
    }

    pub fn bucket(&self, page: u32) -> Option<&PageBucket> {
        self.by_page.get(&page).map(|&i| &self.buckets[i])
    }

    /// `(bucket index, position within bucket)` of an annotation.
    pub fn position(&self, id: AnnotationId) -> Option<(usize, usize)> {
        self.positions.get(&id).copied()
    }

    pub fn entry(&self, id: AnnotationId) -> Option<&RedactionEntry> {
        let (b, i) = self.position(id)?;
        Some(&self.buckets[b].entries[i])
    }

    pub fn contains(&self, id: AnnotationId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Entries flattened in page-key-then-bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &RedactionEntry> {
        self.buckets.iter().flat_map(|b| b.entries.iter())
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Ids of all checked annotations in page-key-then-bucket order.
pub fn collect_checked(index: &PageIndex, store: &AnnotationStore) -> Vec<AnnotationId> {
    index
        .iter()
        .filter(|entry| store.get(entry.id).is_some_and(|a| a.mark_checked))
        .map(|entry| entry.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Command;

    fn annotations(pages: &[(u64, u32)]) -> Vec<Annotation> {
        pages
            .iter()
            .map(|(id, page)| Annotation::new(AnnotationId(*id), *page))
            .collect()
    }

    fn ids(entries: &[RedactionEntry]) -> Vec<u64> {
        entries.iter().map(|e| e.id.0).collect()
    }

    #[test]
    fn empty_input_builds_empty_index() {
        let empty: Vec<Annotation> = Vec::new();
        let index = PageIndex::build(&empty, &RedactionKinds::standard());
        assert!(index.is_empty());
        assert_eq!(index.pages().count(), 0);
    }

    #[test]
    fn every_annotation_lands_in_exactly_one_bucket() {
        let source = annotations(&[(1, 1), (2, 3), (3, 1), (4, 2), (5, 3)]);
        let index = PageIndex::build(&source, &RedactionKinds::standard());

        assert_eq!(index.len(), source.len());
        for annotation in &source {
            let (b, _) = index.position(annotation.id).unwrap();
            assert_eq!(index.buckets()[b].page, annotation.page_number);
        }
    }

    #[test]
    fn buckets_hold_reverse_encounter_order() {
        let source = annotations(&[(1, 1), (2, 1), (3, 2)]);
        let index = PageIndex::build(&source, &RedactionKinds::standard());

        assert_eq!(ids(&index.bucket(1).unwrap().entries), vec![2, 1]);
        assert_eq!(ids(&index.bucket(2).unwrap().entries), vec![3]);
        assert_eq!(index.pages().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn pages_keep_first_encounter_order() {
        // Page keys are deliberately NOT sorted numerically: traversal order
        // is the order pages were first seen in the input list.
        let source = annotations(&[(1, 5), (2, 2), (3, 5), (4, 9)]);
        let index = PageIndex::build(&source, &RedactionKinds::standard());

        assert_eq!(index.pages().collect::<Vec<_>>(), vec![5, 2, 9]);
        assert_eq!(ids(&index.bucket(5).unwrap().entries), vec![3, 1]);
    }

    #[test]
    fn entries_carry_labels_from_the_dictionary() {
        let mut kinds = RedactionKinds::standard();
        kinds.insert(RedactionKind::Text, "Marked text", "T");

        let mut source = annotations(&[(1, 1)]);
        source[0].text_preview = Some("secret".to_string());
        let index = PageIndex::build(&source, &kinds);

        let entry = index.entry(AnnotationId(1)).unwrap();
        assert_eq!(entry.kind, RedactionKind::Text);
        assert_eq!(entry.label, "Marked text");
        assert_eq!(entry.icon, "T");
    }

    #[test]
    fn missing_dictionary_entry_falls_back_without_dropping_the_annotation() {
        let empty = RedactionKinds::default();
        let index = PageIndex::build(&annotations(&[(1, 1)]), &empty);

        let entry = index.entry(AnnotationId(1)).unwrap();
        assert_eq!(entry.label, RedactionKind::Region.fallback_label());
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn collect_checked_returns_checked_ids_in_traversal_order() {
        let source = annotations(&[(1, 1), (2, 1), (3, 2), (4, 2)]);
        let mut store = AnnotationStore::from_annotations(source);
        let index = PageIndex::build(store.annotations(), &RedactionKinds::standard());

        assert!(collect_checked(&index, &store).is_empty());

        for id in [AnnotationId(1), AnnotationId(3)] {
            store
                .apply(Command::SetChecked { id, checked: true })
                .unwrap();
        }

        // Page 1 bucket is [2, 1], page 2 bucket is [4, 3].
        assert_eq!(
            collect_checked(&index, &store),
            vec![AnnotationId(1), AnnotationId(3)]
        );
    }
}
