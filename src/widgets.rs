//! Widgets that draw themselves and register their own click targets.
//!
//! A click target is only valid for the frame that drew it, so the widget
//! that knows where a row landed is the one that records it.

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

const TAB_SEPARATOR: &str = "│";

/// One-row tab strip. The selected tab is highlighted.
pub struct TabBar<'a> {
    labels: Vec<(&'a str, u16)>,
    selected: usize,
}

impl<'a> TabBar<'a> {
    pub fn new(selected: usize) -> Self {
        Self { labels: Vec::new(), selected }
    }

    pub fn tab(mut self, label: &'a str, action_id: u16) -> Self {
        self.labels.push((label, action_id));
        self
    }

    /// Spans for the strip plus `(width, action_id)` per tab.
    fn layout(&self) -> (Vec<Span<'a>>, Vec<(u16, u16)>) {
        let mut spans = Vec::new();
        let mut widths = Vec::new();
        for (i, &(label, action_id)) in self.labels.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(TAB_SEPARATOR, Style::default().fg(Color::DarkGray)));
            }
            let style = if i == self.selected {
                Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let text = format!(" {} ", label);
            widths.push((Line::from(text.as_str()).width() as u16, action_id));
            spans.push(Span::styled(text, style));
        }
        (spans, widths)
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let (spans, widths) = self.layout();
        f.render_widget(Paragraph::new(Line::from(spans)), area);
        let sep = Line::from(TAB_SEPARATOR).width() as u16;
        cs.register_tab_targets(&widths, sep, area.x, area.y, area.width, area.height.max(1));
    }
}

/// Bordered panel of lines where some lines are buttons.
///
/// Every line is one row; panels never wrap. Lines clipped below the
/// bottom border get no target.
pub struct ClickableList<'a> {
    title: String,
    lines: Vec<Line<'a>>,
    actions: Vec<(usize, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: impl Into<Line<'a>>) {
        self.lines.push(line.into());
    }

    pub fn push_clickable(&mut self, line: impl Into<Line<'a>>, action_id: u16) {
        self.actions.push((self.lines.len(), action_id));
        self.lines.push(line.into());
    }

    /// Record a target for each visible button line inside the borders of
    /// `area`.
    pub fn register_targets(&self, area: Rect, cs: &mut ClickState) {
        let top = area.y + 1;
        let visible = area.height.saturating_sub(2) as usize;
        for &(idx, action_id) in &self.actions {
            if idx < visible {
                cs.add_row_target(area, top + idx as u16, action_id);
            }
        }
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        self.register_targets(area, cs);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(self.title);
        let widget = Paragraph::new(self.lines).block(block);
        f.render_widget(widget, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_bar_widths_include_padding() {
        let bar = TabBar::new(1).tab("Farm", 10).tab("Shop", 12);
        let (spans, widths) = bar.layout();
        assert_eq!(widths, vec![(6, 10), (6, 12)]);
        // two labels and one separator
        assert_eq!(spans.len(), 3);
    }

    #[test]
    fn buttons_land_below_top_border() {
        let mut list = ClickableList::new("t");
        list.push("header");
        list.push_clickable("sell", 7);
        list.push_clickable("buy", 8);
        let mut cs = ClickState::new();
        list.register_targets(Rect::new(0, 3, 30, 8), &mut cs);
        assert_eq!(cs.targets.len(), 2);
        assert_eq!(cs.hit_test(5, 4), None);
        assert_eq!(cs.hit_test(5, 5), Some(7));
        assert_eq!(cs.hit_test(5, 6), Some(8));
    }

    #[test]
    fn clipped_buttons_have_no_target() {
        let mut list = ClickableList::new("t");
        for i in 0..10 {
            list.push_clickable(format!("row {}", i), i);
        }
        let mut cs = ClickState::new();
        // three content rows between the borders
        list.register_targets(Rect::new(0, 0, 30, 5), &mut cs);
        assert_eq!(cs.targets.len(), 3);
        assert_eq!(cs.hit_test(1, 4), None);
    }

    #[test]
    fn empty_list() {
        let list = ClickableList::new("t");
        let mut cs = ClickState::new();
        list.register_targets(Rect::new(0, 0, 30, 5), &mut cs);
        assert!(cs.targets.is_empty());
    }
}
