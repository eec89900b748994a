//! Input normalization and click hit-testing.
//!
//! Keyboard and pointer events both end up as an [`InputEvent`]. Pointer
//! events are resolved against the click targets that the last render
//! registered in [`ClickState`].

use ratzilla::ratatui::layout::Rect;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(char),
    /// A tap on a registered target, carrying its action id.
    Click(u16),
}

#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Targets registered by the current frame plus the terminal size they were
/// laid out for.
#[derive(Debug, Default)]
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register one full-width row of `area`. Rows outside `area` are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if (area.y..area.y + area.height).contains(&row) {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Split a tab bar row into one target per tab.
    ///
    /// `tabs` holds `(label_width, action_id)` in display order, with
    /// `separator_width` columns between labels. Each boundary falls in the
    /// middle of its separator; the outer tabs stretch to the edges.
    pub fn register_tab_targets(
        &mut self,
        tabs: &[(u16, u16)],
        separator_width: u16,
        x: u16,
        y: u16,
        total_width: u16,
        height: u16,
    ) {
        if tabs.is_empty() || total_width == 0 {
            return;
        }

        let mut spans = Vec::with_capacity(tabs.len());
        let mut col = 0u16;
        for &(width, _) in tabs {
            spans.push((col, col + width));
            col += width + separator_width;
        }

        let last = tabs.len() - 1;
        let mut left = 0u16;
        for (i, &(_, action_id)) in tabs.iter().enumerate() {
            let right = if i == last {
                total_width
            } else {
                let end = spans[i].1;
                end + (spans[i + 1].0 - end) / 2
            };
            if right > left {
                self.add_click_target(Rect::new(x + left, y, right - left, height), action_id);
            }
            left = right;
        }
    }

    /// Action at a cell. Later targets sit on top of earlier ones.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets
            .iter()
            .rev()
            .find(|t| {
                let r = t.rect;
                col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
            })
            .map(|t| t.action_id)
    }
}

/// Phones and split windows get the stacked layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Map a pixel offset along one axis of the terminal grid to a cell index.
/// `None` when the offset falls outside the grid.
pub fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    (cell < cells).then_some(cell)
}
