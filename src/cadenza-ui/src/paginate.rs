use cadenza_core::{SelectionItem, SpecialAction};

/// Navigation input fed into a pagination session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavInput {
    NextPage,
    PrevPage,
    CursorUp,
    CursorDown,
    Confirm,
    Cancel,
    Key(char),
}

/// What one input did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Cursor or page moved (or clamped); redraw and keep going.
    Moved,
    /// Selection confirmed; the session is finished.
    Selected(SelectionItem),
    /// Cancelled with no side effect; the session is finished.
    Cancelled,
    /// A registered special action fired on the highlighted item; the
    /// session continues.
    Special { key: char, item: SelectionItem },
    /// Unbound key; nothing happened.
    Ignored,
}

/// Transient, single-use state for one interactive browse.
///
/// Page navigation clamps at the ends; the row cursor wraps within the page
/// and resets to the top on page change. `metadata` on the items is never
/// interpreted here.
#[derive(Debug, Clone)]
pub struct PaginationSession {
    items: Vec<SelectionItem>,
    page_size: usize,
    page: usize,
    cursor: usize,
    special_actions: Vec<SpecialAction>,
}

impl PaginationSession {
    pub fn new(
        items: Vec<SelectionItem>,
        page_size: usize,
        special_actions: Vec<SpecialAction>,
    ) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            page: 0,
            cursor: 0,
            special_actions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    /// Current page, 0-based.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Highlighted row within the current page, 0-based.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn special_actions(&self) -> &[SpecialAction] {
        &self.special_actions
    }

    /// Items visible on the current page.
    pub fn visible_items(&self) -> &[SelectionItem] {
        let start = self.page * self.page_size;
        let end = (start + self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    /// Flat index of the highlighted item across all pages.
    pub fn flat_index(&self) -> usize {
        self.page * self.page_size + self.cursor
    }

    pub fn highlighted(&self) -> Option<&SelectionItem> {
        self.items.get(self.flat_index())
    }

    pub fn handle(&mut self, input: NavInput) -> PageEvent {
        if self.items.is_empty() {
            return match input {
                NavInput::Cancel => PageEvent::Cancelled,
                _ => PageEvent::Ignored,
            };
        }

        match input {
            NavInput::NextPage => {
                // Clamp: moving right on the last page is a no-op.
                if self.page + 1 < self.page_count() {
                    self.page += 1;
                    self.cursor = 0;
                }
                PageEvent::Moved
            }
            NavInput::PrevPage => {
                if self.page > 0 {
                    self.page -= 1;
                    self.cursor = 0;
                }
                PageEvent::Moved
            }
            NavInput::CursorUp => {
                let rows = self.visible_items().len();
                self.cursor = if self.cursor == 0 {
                    rows - 1
                } else {
                    self.cursor - 1
                };
                PageEvent::Moved
            }
            NavInput::CursorDown => {
                let rows = self.visible_items().len();
                self.cursor = if self.cursor + 1 >= rows {
                    0
                } else {
                    self.cursor + 1
                };
                PageEvent::Moved
            }
            NavInput::Confirm => match self.highlighted() {
                Some(item) => PageEvent::Selected(item.clone()),
                None => PageEvent::Ignored,
            },
            NavInput::Cancel => PageEvent::Cancelled,
            NavInput::Key(key) => {
                let bound = self.special_actions.iter().any(|action| action.key == key);
                match (bound, self.highlighted()) {
                    (true, Some(item)) => PageEvent::Special {
                        key,
                        item: item.clone(),
                    },
                    _ => PageEvent::Ignored,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(count: usize) -> Vec<SelectionItem> {
        (0..count)
            .map(|i| SelectionItem::new(format!("Item {i}"), format!("id-{i}")))
            .collect()
    }

    #[test]
    fn twenty_five_items_page_size_ten_gives_three_pages() {
        let session = PaginationSession::new(items(25), 10, Vec::new());
        assert_eq!(session.page_count(), 3);
    }

    #[test]
    fn right_twice_then_left_once_lands_on_middle_page() {
        let mut session = PaginationSession::new(items(25), 10, Vec::new());
        session.handle(NavInput::NextPage);
        session.handle(NavInput::NextPage);
        session.handle(NavInput::PrevPage);
        assert_eq!(session.page(), 1);
    }

    #[test]
    fn left_on_first_page_clamps() {
        let mut session = PaginationSession::new(items(25), 10, Vec::new());
        assert_eq!(session.handle(NavInput::PrevPage), PageEvent::Moved);
        assert_eq!(session.page(), 0);
    }

    #[test]
    fn right_on_last_page_clamps() {
        let mut session = PaginationSession::new(items(25), 10, Vec::new());
        for _ in 0..5 {
            session.handle(NavInput::NextPage);
        }
        assert_eq!(session.page(), 2);
    }

    #[test]
    fn confirm_on_page_two_row_three_returns_flat_index_thirteen() {
        let all = items(25);
        let mut session = PaginationSession::new(all.clone(), 10, Vec::new());
        session.handle(NavInput::NextPage);
        for _ in 0..3 {
            session.handle(NavInput::CursorDown);
        }
        assert_eq!(session.flat_index(), 13);
        match session.handle(NavInput::Confirm) {
            PageEvent::Selected(item) => assert_eq!(item, all[13]),
            other => panic!("expected selection, got {other:?}"),
        }
    }

    #[test]
    fn cursor_wraps_within_page() {
        let mut session = PaginationSession::new(items(5), 10, Vec::new());
        session.handle(NavInput::CursorUp);
        assert_eq!(session.cursor(), 4);
        session.handle(NavInput::CursorDown);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn page_change_resets_cursor() {
        let mut session = PaginationSession::new(items(25), 10, Vec::new());
        session.handle(NavInput::CursorDown);
        session.handle(NavInput::CursorDown);
        session.handle(NavInput::NextPage);
        assert_eq!(session.cursor(), 0);
    }

    #[test]
    fn short_last_page_exposes_only_remaining_rows() {
        let mut session = PaginationSession::new(items(25), 10, Vec::new());
        session.handle(NavInput::NextPage);
        session.handle(NavInput::NextPage);
        assert_eq!(session.visible_items().len(), 5);
        // Wrap happens over the short row count, not the page size.
        session.handle(NavInput::CursorUp);
        assert_eq!(session.cursor(), 4);
    }

    #[test]
    fn special_action_fires_without_ending_session() {
        let mut session = PaginationSession::new(
            items(25),
            10,
            vec![SpecialAction::new('a', "Add to playlist")],
        );
        session.handle(NavInput::CursorDown);
        match session.handle(NavInput::Key('a')) {
            PageEvent::Special { key, item } => {
                assert_eq!(key, 'a');
                assert_eq!(item.item_id, "id-1");
            }
            other => panic!("expected special action, got {other:?}"),
        }
        // Session still navigable afterwards.
        assert_eq!(session.handle(NavInput::NextPage), PageEvent::Moved);
    }

    #[test]
    fn unbound_key_is_ignored() {
        let mut session = PaginationSession::new(items(3), 10, Vec::new());
        assert_eq!(session.handle(NavInput::Key('z')), PageEvent::Ignored);
    }

    #[test]
    fn cancel_works_even_on_empty_list() {
        let mut session = PaginationSession::new(Vec::new(), 10, Vec::new());
        assert_eq!(session.handle(NavInput::Cancel), PageEvent::Cancelled);
        assert_eq!(session.handle(NavInput::Confirm), PageEvent::Ignored);
    }
}
