use crate::annotation::AnnotationId;
use crate::engine::DocumentEngine;
use crate::page_index::PageIndex;
use log::debug;

/// Brings the visual representation of an annotation into view.
///
/// Targets are named by the stable scheme of [`scroll_target`], keeping the
/// navigation logic free of any knowledge of how the list is drawn.
pub trait Scroller {
    fn bring_into_view(&mut self, target: &str);
}

/// Stable identifier of an annotation's visual representation.
pub fn scroll_target(id: AnnotationId) -> String {
    format!("annotation-{id}")
}

/// The annotation before `selected` in traversal order: its predecessor
/// within the same page bucket, else the last entry of the preceding page
/// key. `None` at the start of the traversal or when `selected` is not in
/// the index. No wraparound.
pub fn previous(index: &PageIndex, selected: AnnotationId) -> Option<AnnotationId> {
    let (bucket, pos) = index.position(selected)?;
    if pos > 0 {
        return Some(index.buckets()[bucket].entries[pos - 1].id);
    }
    let mut b = bucket;
    while b > 0 {
        b -= 1;
        if let Some(last) = index.buckets()[b].entries.last() {
            return Some(last.id);
        }
    }
    None
}

/// The annotation after `selected` in traversal order: its successor within
/// the same page bucket, else the first entry of the following page key.
/// `None` at the end of the traversal or when `selected` is not in the
/// index. No wraparound.
pub fn next(index: &PageIndex, selected: AnnotationId) -> Option<AnnotationId> {
    let (bucket, pos) = index.position(selected)?;
    let entries = &index.buckets()[bucket].entries;
    if pos + 1 < entries.len() {
        return Some(entries[pos + 1].id);
    }
    for b in index.buckets().iter().skip(bucket + 1) {
        if let Some(first) = b.entries.first() {
            return Some(first.id);
        }
    }
    None
}

/// Side effects of landing on an annotation: make it the engine's sole
/// selection, jump the viewport to it, and scroll its list row into view.
pub fn activate(
    engine: &mut dyn DocumentEngine,
    scroller: &mut dyn Scroller,
    id: AnnotationId,
) {
    debug!("navigating to annotation {id}");
    engine.deselect_all_annotations();
    engine.select_annotation(id);
    engine.jump_to_annotation(id);
    scroller.bring_into_view(&scroll_target(id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{Annotation, RedactionKinds};
    use crate::engine::LocalEngine;
    use crate::store::AnnotationStore;

    fn index(pages: &[(u64, u32)]) -> PageIndex {
        let annotations: Vec<Annotation> = pages
            .iter()
            .map(|(id, page)| Annotation::new(AnnotationId(*id), *page))
            .collect();
        PageIndex::build(&annotations, &RedactionKinds::standard())
    }

    #[test]
    fn walks_within_a_bucket_and_across_page_keys() {
        // Buckets: page 1 -> [2, 1], page 2 -> [3].
        let index = index(&[(1, 1), (2, 1), (3, 2)]);

        assert_eq!(next(&index, AnnotationId(2)), Some(AnnotationId(1)));
        assert_eq!(next(&index, AnnotationId(1)), Some(AnnotationId(3)));
        assert_eq!(previous(&index, AnnotationId(1)), Some(AnnotationId(2)));
        assert_eq!(previous(&index, AnnotationId(3)), Some(AnnotationId(1)));
    }

    #[test]
    fn stops_at_both_boundaries() {
        let index = index(&[(1, 1), (2, 1), (3, 2)]);

        // Id 2 heads the first bucket, id 3 ends the last one.
        assert_eq!(previous(&index, AnnotationId(2)), None);
        assert_eq!(next(&index, AnnotationId(3)), None);
    }

    #[test]
    fn previous_and_next_are_inverse_along_the_traversal() {
        let index = index(&[(1, 3), (2, 1), (3, 3), (4, 2), (5, 1)]);

        let flattened: Vec<AnnotationId> = index.iter().map(|e| e.id).collect();
        for window in flattened.windows(2) {
            assert_eq!(next(&index, window[0]), Some(window[1]));
            assert_eq!(previous(&index, window[1]), Some(window[0]));
        }
    }

    #[test]
    fn unknown_selection_is_a_no_op() {
        let index = index(&[(1, 1)]);
        assert_eq!(previous(&index, AnnotationId(42)), None);
        assert_eq!(next(&index, AnnotationId(42)), None);
    }

    #[test]
    fn activate_selects_jumps_and_scrolls() {
        struct RecordingScroller(Vec<String>);
        impl Scroller for RecordingScroller {
            fn bring_into_view(&mut self, target: &str) {
                self.0.push(target.to_string());
            }
        }

        let store =
            AnnotationStore::from_annotations(vec![Annotation::new(AnnotationId(5), 1)]);
        let mut engine = LocalEngine::new(store);
        let mut scroller = RecordingScroller(Vec::new());

        activate(&mut engine, &mut scroller, AnnotationId(5));

        assert_eq!(engine.selected(), Some(AnnotationId(5)));
        assert_eq!(engine.last_jump(), Some(AnnotationId(5)));
        assert_eq!(scroller.0, vec!["annotation-5".to_string()]);
    }
}
