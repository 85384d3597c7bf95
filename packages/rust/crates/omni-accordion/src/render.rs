//! Terminal rendering of an accordion view

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::panel::{PanelContent, PanelWrapper};
use crate::view::AccordionView;

/// Height of a closed panel
pub const FOLDED_HEIGHT: u16 = 3;

/// Maximum height of an open panel, borders included
pub const MAX_EXPANDED_HEIGHT: u16 = 20;

/// Text content of a child view
pub trait PanelBody {
    /// Lines to show when the panel is open
    fn body_lines(&self) -> Vec<String>;
}

impl PanelBody for String {
    fn body_lines(&self) -> Vec<String> {
        self.lines().map(ToString::to_string).collect()
    }
}

impl PanelBody for Vec<String> {
    fn body_lines(&self) -> Vec<String> {
        self.clone()
    }
}

/// Widget drawing every panel of a view, top to bottom
pub struct AccordionWidget<'a, V> {
    view: &'a AccordionView<V>,
    focused: Option<usize>,
}

impl<'a, V: PanelBody> AccordionWidget<'a, V> {
    /// Create a widget for `view`
    pub fn new(view: &'a AccordionView<V>) -> Self {
        Self {
            view,
            focused: None,
        }
    }

    /// Highlight the panel at `ordinal`
    #[must_use]
    pub fn focused(mut self, ordinal: Option<usize>) -> Self {
        self.focused = ordinal;
        self
    }

    fn body(&self, panel: &PanelWrapper<V>) -> Vec<String> {
        let placeholder = &self.view.config().placeholder_text;
        match (panel.content(), panel.is_open()) {
            (PanelContent::Pending { .. }, _) => vec![placeholder.clone()],
            (PanelContent::Failed(error), _) => vec![error.to_string()],
            (PanelContent::Ready(view), true) => view.body_lines(),
            (PanelContent::Ready(view), false) => {
                vec![format!("[{} lines hidden]", view.body_lines().len())]
            }
        }
    }
}

/// Rows a panel occupies, borders included
pub fn panel_height(panel: &PanelWrapper<impl PanelBody>) -> u16 {
    if !panel.is_open() {
        return FOLDED_HEIGHT;
    }
    let lines = match panel.content() {
        PanelContent::Ready(view) => view.body_lines().len().max(1),
        _ => 1,
    };
    let capped = lines.min(usize::from(MAX_EXPANDED_HEIGHT - 2));
    u16::try_from(capped).unwrap_or(MAX_EXPANDED_HEIGHT - 2) + 2
}

impl<V: PanelBody> Widget for AccordionWidget<'_, V> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut y = area.y;
        for panel in self.view.panels() {
            if y >= area.bottom() {
                break;
            }
            let height = panel_height(panel).min(area.bottom() - y);
            let rect = Rect {
                x: area.x,
                y,
                width: area.width,
                height,
            };

            let focused = self.focused == Some(panel.ordinal());
            let border_style = match (focused, panel.is_open()) {
                (true, _) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                (false, true) => Style::default().fg(Color::Cyan),
                (false, false) => Style::default().fg(Color::DarkGray),
            };
            let marker = if panel.is_open() { '▾' } else { '▸' };

            let block = Block::default()
                .borders(Borders::ALL)
                .title(format!("{marker} {}", panel.label()))
                .border_style(border_style);

            Paragraph::new(self.body(panel).join("\n"))
                .block(block)
                .wrap(Wrap { trim: true })
                .render(rect, buf);

            y += height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccordionConfig;
    use crate::host::{Completion, RecordingHost};
    use crate::model::ChildId;
    use omni_events::Origin;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn rendered(view: &AccordionView<String>, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, 30, height);
        let mut buf = Buffer::empty(area);
        AccordionWidget::new(view).render(area, &mut buf);
        (0..height).map(|y| row(&buf, y)).collect()
    }

    fn view_with(children: &[&str]) -> (AccordionView<String>, RecordingHost<String>) {
        let mut view = AccordionView::new(Origin::new(), AccordionConfig::default());
        let mut host = RecordingHost::new();
        let ids: Vec<ChildId> = children.iter().map(|s| ChildId::from(*s)).collect();
        view.sync_children(&ids, &mut host).unwrap();
        (view, host)
    }

    #[test]
    fn test_closed_panels_stack_at_folded_height() {
        let (view, _) = view_with(&["a", "b"]);
        let rows = rendered(&view, 8);

        assert!(rows[0].contains("▸ Page 0"));
        assert!(rows[1].contains("Loading..."));
        assert!(rows[3].contains("▸ Page 1"));
        assert!(rows[6].trim().is_empty());
    }

    #[test]
    fn test_open_panel_shows_body() {
        let (mut view, mut host) = view_with(&["a", "b"]);
        let ticket = host.ticket_for("a").unwrap();
        view.complete_materialization(Completion::ready(ticket, "a", "one\ntwo".to_string()), &mut host);
        view.activate(0).unwrap();

        assert_eq!(panel_height(view.panel(0).unwrap()), 4);
        let rows = rendered(&view, 8);
        assert!(rows[0].contains("▾ Page 0"));
        assert!(rows[1].contains("one"));
        assert!(rows[2].contains("two"));
        assert!(rows[4].contains("▸ Page 1"));
    }

    #[test]
    fn test_closed_ready_panel_summarises() {
        let (mut view, mut host) = view_with(&["a"]);
        let ticket = host.ticket_for("a").unwrap();
        view.complete_materialization(Completion::ready(ticket, "a", "x\ny\nz".to_string()), &mut host);

        let rows = rendered(&view, 3);
        assert!(rows[1].contains("[3 lines hidden]"));
    }

    #[test]
    fn test_tall_body_is_capped() {
        let (mut view, mut host) = view_with(&["a"]);
        let ticket = host.ticket_for("a").unwrap();
        let body = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        view.complete_materialization(Completion::ready(ticket, "a", body), &mut host);
        view.activate(0).unwrap();

        assert_eq!(panel_height(view.panel(0).unwrap()), MAX_EXPANDED_HEIGHT);
    }
}
