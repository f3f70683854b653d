use crate::annotation::{AnnotationId, RedactionStyle};
use crate::store::{AnnotationStore, Command};
use log::{info, warn};
use std::collections::HashMap;

/// Events forwarded to the engine's annotation manager. The redaction
/// operation itself is the engine's business; the panel only requests it.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Commit (burn in) the given checked annotations.
    CommitRequested { ids: Vec<AnnotationId> },
    /// Every marked redaction in the document was applied.
    AllRedactionsApplied { count: usize },
    /// Every marked redaction annotation was removed without applying.
    MarkedCleared { count: usize },
}

/// The seam to the external document engine.
///
/// The engine owns the canonical annotation model; the panel talks to it
/// through selection/viewport calls and [`Command`]s against its store.
pub trait DocumentEngine {
    fn store(&self) -> &AnnotationStore;

    /// Request a store mutation. Failures are the engine's to log; the
    /// panel treats them as no-ops.
    fn command(&mut self, command: Command);

    fn select_annotation(&mut self, id: AnnotationId);
    fn deselect_all_annotations(&mut self);
    fn jump_to_annotation(&mut self, id: AnnotationId);
    fn delete_annotations(&mut self, ids: &[AnnotationId]);
    fn trigger(&mut self, event: EngineEvent);

    /// Apply every marked redaction in the document.
    fn apply_all_redactions(&mut self);
    /// Remove every marked redaction annotation without applying it.
    fn delete_all_redaction_annotations(&mut self);

    /// Resolve an author name to its display form.
    fn display_author(&self, author: &str) -> String;
    /// The viewer's current redaction tool style.
    fn active_style(&self) -> RedactionStyle;

    fn selected(&self) -> Option<AnnotationId>;
}

/// In-memory document engine used by the binary and as the test double.
#[derive(Debug, Default)]
pub struct LocalEngine {
    store: AnnotationStore,
    selected: Option<AnnotationId>,
    last_jump: Option<AnnotationId>,
    display_names: HashMap<String, String>,
    active_style: RedactionStyle,
    events: Vec<EngineEvent>,
}

impl LocalEngine {
    pub fn new(store: AnnotationStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn set_display_name(&mut self, author: &str, display: &str) {
        self.display_names
            .insert(author.to_string(), display.to_string());
    }

    pub fn set_active_style(&mut self, style: RedactionStyle) {
        self.active_style = style;
    }

    pub fn last_jump(&self) -> Option<AnnotationId> {
        self.last_jump
    }

    /// Events triggered since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}

impl DocumentEngine for LocalEngine {
    fn store(&self) -> &AnnotationStore {
        &self.store
    }

    fn command(&mut self, command: Command) {
        if let Err(err) = self.store.apply(command) {
            warn!("store command failed: {err}");
        }
    }

    fn select_annotation(&mut self, id: AnnotationId) {
        if self.store.contains(id) {
            self.selected = Some(id);
        } else {
            warn!("cannot select unknown annotation {id}");
        }
    }

    fn deselect_all_annotations(&mut self) {
        self.selected = None;
    }

    fn jump_to_annotation(&mut self, id: AnnotationId) {
        info!("viewport jump to annotation {id}");
        self.last_jump = Some(id);
    }

    fn delete_annotations(&mut self, ids: &[AnnotationId]) {
        if self.selected.is_some_and(|selected| ids.contains(&selected)) {
            self.selected = None;
        }
        if let Err(err) = self.store.apply(Command::Delete { ids: ids.to_vec() }) {
            warn!("delete failed: {err}");
        }
    }

    fn trigger(&mut self, event: EngineEvent) {
        info!("engine event: {event:?}");
        self.events.push(event);
    }

    fn apply_all_redactions(&mut self) {
        let count = self.store.len();
        if count == 0 {
            return;
        }
        self.store.clear();
        self.selected = None;
        self.trigger(EngineEvent::AllRedactionsApplied { count });
    }

    fn delete_all_redaction_annotations(&mut self) {
        let count = self.store.len();
        if count == 0 {
            return;
        }
        self.store.clear();
        self.selected = None;
        self.trigger(EngineEvent::MarkedCleared { count });
    }

    fn display_author(&self, author: &str) -> String {
        if author.is_empty() {
            return "Guest".to_string();
        }
        self.display_names
            .get(author)
            .cloned()
            .unwrap_or_else(|| author.to_string())
    }

    fn active_style(&self) -> RedactionStyle {
        self.active_style.clone()
    }

    fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }
}
