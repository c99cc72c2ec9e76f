//! Plain-text rendering of the workflow table for the command line.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::workflow::{WorkflowConfig, WorkflowTable};

const NAME_WIDTH: usize = 28;
const DESCRIPTION_WIDTH: usize = 36;
const STEPS_WIDTH: usize = 5;
const UPDATED_WIDTH: usize = 19;

/// Cut `text` to at most `width` display columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Left-align `text` in a column of `width` display columns.
fn cell(text: &str, width: usize) -> String {
    let text = truncate_to_width(text, width);
    let pad = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(pad))
}

fn row(workflow: &WorkflowConfig) -> String {
    // Newlines in descriptions would break the row.
    let description = workflow.description_or_empty().replace(['\n', '\r'], " ");
    format!(
        "{}  {}  {:>steps$}  {}  {}",
        cell(&workflow.name, NAME_WIDTH),
        cell(&description, DESCRIPTION_WIDTH),
        workflow.config.len(),
        cell(&workflow.updated_label(), UPDATED_WIDTH),
        workflow.id,
        steps = STEPS_WIDTH,
    )
}

/// Header, the rows of the current page, and a page footer.
pub fn render_page(table: &WorkflowTable) -> String {
    let mut lines = vec![format!(
        "{}  {}  {:>steps$}  {}  {}",
        cell("NAME", NAME_WIDTH),
        cell("DESCRIPTION", DESCRIPTION_WIDTH),
        "STEPS",
        cell("UPDATED", UPDATED_WIDTH),
        "ID",
        steps = STEPS_WIDTH,
    )];

    if table.is_empty() {
        lines.push(if table.total() == 0 {
            "No workflows yet".to_string()
        } else {
            format!("No workflows match \"{}\"", table.search())
        });
    } else {
        lines.extend(table.page_rows().map(row));
    }

    lines.push(format!(
        "Page {}/{} · {} of {} workflows",
        table.current_page() + 1,
        table.page_count(),
        table.len(),
        table.total()
    ));

    let mut out = lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}
