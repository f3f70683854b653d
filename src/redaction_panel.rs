use crate::annotation::{AnnotationId, RedactionKinds};
use crate::cursor::{self, Scroller};
use crate::engine::{DocumentEngine, EngineEvent};
use crate::page_index::{PageIndex, collect_checked};
use crate::store::{AnnotationStore, Command};
use crate::theme::Base16Palette;
use crossterm::event::{KeyCode, KeyEvent};
use log::debug;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const PREVIEW_WIDTH: usize = 28;

/// One row of the flattened panel list: a page header or an annotation item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelRow {
    PageHeader(u32),
    Item(AnnotationId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NavDirection {
    Previous,
    Next,
}

/// Review panel over the marked redaction annotations: a page-grouped list
/// with a visual cursor, a single selection, per-item checkboxes and the
/// bulk commit/style/clear/apply actions.
pub struct RedactionPanel {
    kinds: RedactionKinds,
    index: PageIndex,
    rows: Vec<PanelRow>,
    cursor: usize,
    list_state: ListState,
    selected_id: Option<AnnotationId>,
    seen_revision: Option<u64>,
    last_list_area: Rect,
}

impl RedactionPanel {
    pub fn new(kinds: RedactionKinds) -> Self {
        Self {
            kinds,
            index: PageIndex::default(),
            rows: Vec::new(),
            cursor: 0,
            list_state: ListState::default(),
            selected_id: None,
            seen_revision: None,
            last_list_area: Rect::default(),
        }
    }

    pub fn selected_id(&self) -> Option<AnnotationId> {
        self.selected_id
    }

    pub fn index(&self) -> &PageIndex {
        &self.index
    }

    /// Rebuild the page index when the store's annotation list changed.
    ///
    /// This is the only point where page-number changes and deletions are
    /// picked up; checkbox and style edits never trigger a rebuild.
    pub fn sync(&mut self, store: &AnnotationStore) {
        if self.seen_revision == Some(store.revision()) {
            return;
        }
        debug!("rebuilding page index for revision {}", store.revision());
        self.index = PageIndex::build(store.annotations(), &self.kinds);
        self.rows.clear();
        for bucket in self.index.buckets() {
            self.rows.push(PanelRow::PageHeader(bucket.page));
            for entry in &bucket.entries {
                self.rows.push(PanelRow::Item(entry.id));
            }
        }
        if self
            .selected_id
            .is_some_and(|id| !self.index.contains(id))
        {
            self.selected_id = None;
        }
        self.cursor = self
            .nearest_item_row(self.cursor.min(self.rows.len().saturating_sub(1)))
            .unwrap_or(0);
        if self.rows.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(self.cursor));
        }
        self.seen_revision = Some(store.revision());
    }

    pub fn handle_key(&mut self, key: KeyEvent, engine: &mut dyn DocumentEngine) {
        match key.code {
            KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Enter => self.select_highlighted(engine),
            KeyCode::Char(' ') => self.toggle_highlighted(engine),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_highlighted(engine),
            KeyCode::Left | KeyCode::Up => self.navigate(NavDirection::Previous, engine),
            KeyCode::Right | KeyCode::Down => self.navigate(NavDirection::Next, engine),
            KeyCode::Char('c') => self.commit_checked(engine),
            KeyCode::Char('u') => self.update_checked_style(engine),
            KeyCode::Char('R') => {
                if !engine.store().is_empty() {
                    engine.apply_all_redactions();
                    self.selected_id = None;
                }
            }
            KeyCode::Char('X') => {
                if !engine.store().is_empty() {
                    engine.delete_all_redaction_annotations();
                    self.selected_id = None;
                }
            }
            _ => {}
        }
    }

    /// Click selection: the clicked item becomes the engine's sole selection,
    /// same side effects as pressing Enter on it.
    pub fn handle_mouse_click(&mut self, x: u16, y: u16, engine: &mut dyn DocumentEngine) {
        let area = self.last_list_area;
        // Inside the list block, past its border.
        if x <= area.x
            || x >= area.x + area.width.saturating_sub(1)
            || y <= area.y
            || y >= area.y + area.height.saturating_sub(1)
        {
            return;
        }
        let row = self.list_state.offset() + (y - area.y - 1) as usize;
        if row >= self.rows.len() {
            return;
        }
        // Page headers are not selectable; the cursor stays on an item row.
        if !matches!(self.rows[row], PanelRow::Item(_)) {
            return;
        }
        self.cursor = row;
        self.list_state.select(Some(row));
        self.select_highlighted(engine);
    }

    fn highlighted(&self) -> Option<AnnotationId> {
        match self.rows.get(self.cursor) {
            Some(PanelRow::Item(id)) => Some(*id),
            _ => None,
        }
    }

    /// Closest item row to `from`, looking forward first.
    fn nearest_item_row(&self, from: usize) -> Option<usize> {
        let forward = self.rows[from..]
            .iter()
            .position(|r| matches!(r, PanelRow::Item(_)))
            .map(|i| from + i);
        forward.or_else(|| {
            self.rows[..from]
                .iter()
                .rposition(|r| matches!(r, PanelRow::Item(_)))
        })
    }

    fn move_cursor(&mut self, delta: i32) {
        let mut row = self.cursor;
        loop {
            let candidate = if delta > 0 {
                row.checked_add(1).filter(|&r| r < self.rows.len())
            } else {
                row.checked_sub(1)
            };
            match candidate {
                Some(r) => row = r,
                None => return,
            }
            if matches!(self.rows[row], PanelRow::Item(_)) {
                self.cursor = row;
                self.list_state.select(Some(row));
                return;
            }
        }
    }

    fn select_highlighted(&mut self, engine: &mut dyn DocumentEngine) {
        let Some(id) = self.highlighted() else {
            return;
        };
        engine.deselect_all_annotations();
        engine.select_annotation(id);
        engine.jump_to_annotation(id);
        self.selected_id = Some(id);
    }

    fn toggle_highlighted(&mut self, engine: &mut dyn DocumentEngine) {
        let Some(id) = self.highlighted() else {
            return;
        };
        let checked = engine.store().get(id).is_some_and(|a| a.mark_checked);
        engine.command(Command::SetChecked {
            id,
            checked: !checked,
        });
    }

    fn delete_highlighted(&mut self, engine: &mut dyn DocumentEngine) {
        let Some(id) = self.highlighted() else {
            return;
        };
        engine.delete_annotations(&[id]);
        if self.selected_id == Some(id) {
            self.selected_id = None;
        }
    }

    fn navigate(&mut self, direction: NavDirection, engine: &mut dyn DocumentEngine) {
        let Some(selected) = self.selected_id else {
            return;
        };
        let target = match direction {
            NavDirection::Previous => cursor::previous(&self.index, selected),
            NavDirection::Next => cursor::next(&self.index, selected),
        };
        let Some(id) = target else {
            return;
        };
        let mut scroller = RowScroller {
            rows: &self.rows,
            cursor: &mut self.cursor,
            list_state: &mut self.list_state,
        };
        cursor::activate(engine, &mut scroller, id);
        self.selected_id = Some(id);
    }

    fn commit_checked(&mut self, engine: &mut dyn DocumentEngine) {
        let ids = collect_checked(&self.index, engine.store());
        if ids.is_empty() {
            return;
        }
        engine.trigger(EngineEvent::CommitRequested { ids });
    }

    fn update_checked_style(&mut self, engine: &mut dyn DocumentEngine) {
        let ids = collect_checked(&self.index, engine.store());
        if ids.is_empty() {
            return;
        }
        let style = engine.active_style();
        debug!("applying active style to {} annotations", ids.len());
        for id in ids {
            engine.command(Command::SetStyle {
                id,
                style: style.clone(),
            });
        }
    }

    pub fn render(
        &mut self,
        f: &mut Frame,
        area: Rect,
        engine: &dyn DocumentEngine,
        palette: &Base16Palette,
        date_format: &str,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);

        let store = engine.store();
        let checked = collect_checked(&self.index, store).len();
        let mut counter = vec![
            Span::styled(
                "Marked for redaction",
                Style::default().fg(palette.base_05),
            ),
            Span::styled(
                format!(" ({})", store.len()),
                Style::default().fg(palette.base_0a),
            ),
        ];
        if checked > 0 {
            counter.push(Span::styled(
                format!("  {checked} checked"),
                Style::default().fg(palette.base_0b),
            ));
        }
        f.render_widget(
            Paragraph::new(Line::from(counter)).style(Style::default().bg(palette.base_00)),
            chunks[0],
        );

        self.last_list_area = chunks[1];
        if self.rows.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from("No redactions marked"),
                Line::from(""),
                Line::from(Span::styled(
                    "Mark content for redaction in the viewer to review it here",
                    Style::default().fg(palette.base_03),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_03))
                    .style(Style::default().bg(palette.base_00)),
            )
            .style(Style::default().fg(palette.base_04));
            f.render_widget(empty, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| self.render_row(row, store, engine, palette, date_format))
            .collect();

        let (selection_bg, selection_fg) = palette.selection_colors();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Redactions")
                    .border_style(Style::default().fg(palette.base_04))
                    .style(Style::default().bg(palette.base_00)),
            )
            .highlight_style(Style::default().bg(selection_bg).fg(selection_fg))
            .style(Style::default().bg(palette.base_00));

        f.render_stateful_widget(list, chunks[1], &mut self.list_state);
    }

    fn render_row(
        &self,
        row: &PanelRow,
        store: &AnnotationStore,
        engine: &dyn DocumentEngine,
        palette: &Base16Palette,
        date_format: &str,
    ) -> ListItem<'static> {
        match row {
            PanelRow::PageHeader(page) => ListItem::new(Line::from(Span::styled(
                format!("Page {page}"),
                Style::default()
                    .fg(palette.base_0a)
                    .add_modifier(Modifier::BOLD),
            ))),
            PanelRow::Item(id) => {
                let (Some(entry), Some(annotation)) = (self.index.entry(*id), store.get(*id))
                else {
                    // Rows and index are rebuilt together; a miss here means a
                    // stale frame and gets fixed on the next sync.
                    return ListItem::new(Line::from("  …"));
                };

                let checkbox_style = if annotation.mark_checked {
                    Style::default().fg(palette.base_0b)
                } else {
                    Style::default().fg(palette.base_03)
                };
                let label_style = if self.selected_id == Some(*id) {
                    Style::default()
                        .fg(palette.base_0c)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.base_06)
                };

                let mut spans = vec![
                    Span::raw("  "),
                    Span::styled(
                        if annotation.mark_checked { "[x]" } else { "[ ]" },
                        checkbox_style,
                    ),
                    Span::raw(" "),
                    Span::styled(
                        format!("{} {}", entry.icon, entry.label),
                        label_style,
                    ),
                ];
                if let Some(preview) = &annotation.text_preview {
                    spans.push(Span::styled(
                        format!(" \u{201c}{}\u{201d}", truncate_to_width(preview, PREVIEW_WIDTH)),
                        Style::default().fg(palette.base_05),
                    ));
                }
                spans.push(Span::styled(
                    format!(
                        " · {}, {}",
                        engine.display_author(&annotation.author),
                        annotation.created_at.format(date_format)
                    ),
                    Style::default().fg(palette.base_04),
                ));
                ListItem::new(Line::from(spans))
            }
        }
    }
}

struct RowScroller<'a> {
    rows: &'a [PanelRow],
    cursor: &'a mut usize,
    list_state: &'a mut ListState,
}

impl Scroller for RowScroller<'_> {
    fn bring_into_view(&mut self, target: &str) {
        let id = target
            .strip_prefix("annotation-")
            .and_then(|raw| raw.parse().ok())
            .map(AnnotationId);
        let Some(id) = id else {
            return;
        };
        if let Some(row) = self
            .rows
            .iter()
            .position(|r| matches!(r, PanelRow::Item(i) if *i == id))
        {
            *self.cursor = row;
            self.list_state.select(Some(row));
        }
    }
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            break;
        }
        width += w;
        out.push(ch);
    }
    out.push('…');
    out
}
