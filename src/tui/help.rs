use super::draw::Palette;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const BINDINGS: &[(&str, &str)] = &[
    ("Ctrl-Enter", "Run code (Ctrl-J on terminals without key disambiguation)"),
    ("F5", "Run code"),
    ("Ctrl-S", "Save to server"),
    ("Ctrl-O", "Open saved files"),
    ("Ctrl-N", "New file"),
    ("Ctrl-L", "Clear editor"),
    ("Tab", "Indent (4 spaces)"),
    ("Shift-Tab", "Outdent"),
    ("F2", "Show/hide program input"),
    ("F4", "Switch focus between code and input"),
    ("Ctrl-Y", "Copy output to clipboard"),
    ("PgUp/PgDn", "Scroll output"),
    ("F6", "Start/pause timer"),
    ("F7", "Reset timer"),
    ("Ctrl-T", "Toggle light/dark theme"),
    ("F1", "Show/hide this help"),
    ("Ctrl-Q / Ctrl-C", "Quit"),
];

const FILE_BINDINGS: &[(&str, &str)] = &[
    ("↑/↓", "Navigate"),
    ("Enter", "Load selected"),
    ("d / Del", "Delete selected"),
    ("r", "Refresh"),
    ("Esc", "Close"),
];

fn binding_lines(title: &str, bindings: &[(&str, &str)], palette: &Palette) -> Vec<Line<'static>> {
    let width = bindings
        .iter()
        .map(|(k, _)| k.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines = vec![Line::from(title.to_string())];
    for (keys, what) in bindings {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{keys:<width$}"), Style::default().fg(palette.key)),
            Span::raw("  "),
            Span::raw(what.to_string()),
        ]));
    }
    lines
}

pub(crate) fn draw_help(area: Rect, f: &mut Frame, palette: &Palette) {
    let mut lines = binding_lines("Keybinds:", BINDINGS, palette);
    lines.push(Line::from(""));
    lines.extend(binding_lines("File list:", FILE_BINDINGS, palette));

    let p = Paragraph::new(lines)
        .style(palette.base())
        .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
