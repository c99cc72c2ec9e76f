use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Row, Table, Widget},
};

use crate::store::{AgentStatus, Snapshot};

use super::theme::{TEXT_BRIGHT, TEXT_FAINT, TEXT_MUTED, TEXT_SECONDARY};

/// Agent table for the last accepted snapshot.
pub struct SnapshotPanel<'a> {
    snapshot: Option<&'a Snapshot>,
    loading: bool,
}

impl<'a> SnapshotPanel<'a> {
    pub fn new(snapshot: Option<&'a Snapshot>, loading: bool) -> Self {
        Self { snapshot, loading }
    }

    fn title(&self) -> String {
        match self.snapshot {
            Some(snapshot) => format!(" Agents · {} ({}) ", snapshot.point, snapshot.agents.len()),
            None => " Agents ".to_string(),
        }
    }
}

fn coordinate(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.5}")).unwrap_or_else(|| "-".to_string())
}

fn agent_row(agent: &AgentStatus) -> Row<'static> {
    Row::new(vec![
        agent.id.to_string(),
        coordinate(agent.lng),
        coordinate(agent.lat),
        agent.action.clone().unwrap_or_default(),
    ])
    .style(Style::default().fg(TEXT_SECONDARY))
}

impl Widget for SnapshotPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(TEXT_FAINT))
            .title(self.title());

        let Some(snapshot) = self.snapshot else {
            let message = if self.loading {
                "Loading snapshot…"
            } else {
                "No snapshot loaded"
            };
            Paragraph::new(Line::styled(message, Style::default().fg(TEXT_MUTED)))
                .block(block)
                .render(area, buf);
            return;
        };

        let header = Row::new(vec!["ID", "Lng", "Lat", "Action"]).style(
            Style::default()
                .fg(TEXT_BRIGHT)
                .add_modifier(Modifier::BOLD),
        );
        let widths = [
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(10),
        ];

        Table::new(snapshot.agents.iter().map(agent_row), widths)
            .header(header)
            .block(block)
            .render(area, buf);
    }
}
