use super::help::draw_help;
use super::state::{Focus, UiState, TAB_HELP};
use crate::editor::EditorBuffer;
use crate::model::Outcome;
use crate::orchestrator::ListingState;
use crate::session::Session;
use crate::text_summary::format_execution_time;
use crate::theme::ThemeMode;
use crate::timer::{Stopwatch, TimerPhase};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

/// Colors for one theme.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub muted: Color,
    pub error: Color,
    pub success: Color,
    pub key: Color,
    pub selection: Color,
}

impl Palette {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self {
                fg: Color::Black,
                bg: Color::White,
                accent: Color::Blue,
                muted: Color::DarkGray,
                error: Color::Red,
                success: Color::Green,
                key: Color::Magenta,
                selection: Color::LightBlue,
            },
            ThemeMode::Dark => Self {
                fg: Color::Gray,
                bg: Color::Black,
                accent: Color::Cyan,
                muted: Color::DarkGray,
                error: Color::LightRed,
                success: Color::LightGreen,
                key: Color::LightMagenta,
                selection: Color::Blue,
            },
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent)
        } else {
            Style::default().fg(self.muted)
        }
    }
}

pub(crate) fn draw(f: &mut Frame, session: &Session, ui: &UiState, stopwatch: &Stopwatch) {
    let palette = Palette::for_mode(session.theme);
    let area = f.area();
    f.render_widget(Block::default().style(palette.base()), area);

    let banner_height = if session.banner.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(chunks[0], f, session, ui, stopwatch, &palette);
    if let Some(banner) = session.banner.as_deref() {
        let p = Paragraph::new(banner)
            .style(Style::default().fg(palette.error).bg(palette.bg))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.error))
                    .title("Backend"),
            );
        f.render_widget(p, chunks[1]);
    }

    if ui.tab == TAB_HELP {
        draw_help(chunks[2], f, &palette);
    } else {
        draw_workspace(chunks[2], f, session, ui, &palette);
    }
    draw_info(chunks[3], f, ui, &palette);

    if ui.listing.is_visible() {
        draw_file_list(area, f, ui, &palette);
    }
    if let Some(prompt) = ui.prompt.as_ref() {
        let rect = centered(area, 50, 3);
        f.render_widget(Clear, rect);
        let p = Paragraph::new(Line::from(vec![
            Span::styled("Save as: ", Style::default().fg(palette.muted)),
            Span::raw(prompt.value.as_str()),
        ]))
        .style(palette.base())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(true))
                .title("Save (Enter to confirm, Esc to cancel)"),
        );
        f.render_widget(p, rect);
        let x = rect.x + 1 + 9 + prompt.value.chars().count() as u16;
        f.set_cursor_position(Position::new(x.min(rect.right().saturating_sub(2)), rect.y + 1));
    }
    if let Some(confirm) = ui.confirm.as_ref() {
        let rect = centered(area, 60, 4);
        f.render_widget(Clear, rect);
        let p = Paragraph::new(vec![
            Line::from(confirm.question()),
            Line::from(vec![
                Span::styled("[y]", Style::default().fg(palette.key)),
                Span::raw(" Yes   "),
                Span::styled("[n]", Style::default().fg(palette.key)),
                Span::raw(" No"),
            ]),
        ])
        .style(palette.base())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.border(true))
                .title("Confirm"),
        );
        f.render_widget(p, rect);
    }
}

fn draw_header(
    area: Rect,
    f: &mut Frame,
    session: &Session,
    ui: &UiState,
    stopwatch: &Stopwatch,
    palette: &Palette,
) {
    let name = session.current_filename.as_deref().unwrap_or("Untitled");
    let dirty = if session.has_unsaved_edits() { "*" } else { "" };
    let timer_mark = match stopwatch.phase() {
        TimerPhase::Running => "▶",
        TimerPhase::Paused => "⏸",
        TimerPhase::Idle => "■",
    };
    let run_state = if session.is_executing {
        Span::styled(" Running... ", Style::default().fg(palette.accent))
    } else {
        Span::raw("")
    };
    let status = Line::from(vec![
        run_state,
        Span::raw(format!(" {name}{dirty} ")),
        Span::styled("│", Style::default().fg(palette.muted)),
        Span::raw(format!(" {} ", session.language.label())),
        Span::styled("│", Style::default().fg(palette.muted)),
        Span::styled(
            format!(" {timer_mark} {} ", stopwatch.display()),
            if stopwatch.state().running {
                Style::default().fg(palette.success)
            } else {
                Style::default()
            },
        ),
        Span::styled("│", Style::default().fg(palette.muted)),
        Span::raw(format!(" {} ", session.theme.as_str())),
    ])
    .right_aligned();

    let tabs = Tabs::new(vec![Line::from("Editor"), Line::from("Help")])
        .select(ui.tab)
        .style(palette.base())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.muted))
                .title(format!("{} Playground", session.language.label()))
                .title(status),
        )
        .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn draw_workspace(area: Rect, f: &mut Frame, session: &Session, ui: &UiState, palette: &Palette) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let overlay = ui.is_modal() || ui.listing.is_visible();
    let code_focused = ui.focus == Focus::Code || !session.stdin_visible;
    draw_buffer(
        cols[0],
        f,
        &session.code,
        BufferView {
            title: "Code",
            placeholder: "Write your Python code here...",
            gutter: true,
            focused: code_focused,
            show_cursor: code_focused && !overlay,
        },
        palette,
    );

    let right = if session.stdin_visible {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(cols[1]);
        let stdin_focused = ui.focus == Focus::Stdin;
        draw_buffer(
            rows[0],
            f,
            &session.input,
            BufferView {
                title: "Input (stdin)",
                placeholder: "Enter input data for your program...",
                gutter: false,
                focused: stdin_focused,
                show_cursor: stdin_focused && !overlay,
            },
            palette,
        );
        rows[1]
    } else {
        cols[1]
    };
    draw_output(right, f, session, ui, palette);
}

struct BufferView {
    title: &'static str,
    placeholder: &'static str,
    gutter: bool,
    focused: bool,
    show_cursor: bool,
}

fn draw_buffer(area: Rect, f: &mut Frame, buf: &EditorBuffer, view: BufferView, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(view.focused))
        .title(view.title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let (line, col) = buf.cursor_position();
    let gutter_width = if view.gutter {
        buf.line_count().to_string().len() + 3
    } else {
        0
    };
    let text_width = (inner.width as usize).saturating_sub(gutter_width).max(1);
    let v_scroll = line.saturating_sub(inner.height as usize - 1);
    let h_scroll = col.saturating_sub(text_width - 1);

    let lines: Vec<Line> = if buf.text().is_empty() {
        let mut spans = Vec::new();
        if view.gutter {
            spans.push(gutter_span(1, gutter_width, palette));
        }
        spans.push(Span::styled(
            view.placeholder,
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::ITALIC),
        ));
        vec![Line::from(spans)]
    } else {
        buf.text()
            .split('\n')
            .enumerate()
            .skip(v_scroll)
            .take(inner.height as usize)
            .map(|(i, text)| {
                let visible: String = text.chars().skip(h_scroll).take(text_width).collect();
                let mut spans = Vec::with_capacity(2);
                if view.gutter {
                    spans.push(gutter_span(i + 1, gutter_width, palette));
                }
                spans.push(Span::raw(visible));
                Line::from(spans)
            })
            .collect()
    };
    f.render_widget(Paragraph::new(lines).style(palette.base()), inner);

    if view.show_cursor {
        let x = inner.x + (gutter_width + col - h_scroll) as u16;
        let y = inner.y + (line - v_scroll) as u16;
        f.set_cursor_position(Position::new(x, y));
    }
}

fn gutter_span(number: usize, width: usize, palette: &Palette) -> Span<'static> {
    Span::styled(
        format!("{:>w$} │ ", number, w = width.saturating_sub(3)),
        Style::default().fg(palette.muted),
    )
}

fn draw_output(area: Rect, f: &mut Frame, session: &Session, ui: &UiState, palette: &Palette) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(false))
        .title("Output");
    if !session.is_executing {
        if let Some(secs) = session.result.as_ref().and_then(|r| r.execution_time_seconds) {
            block = block.title(
                Line::styled(format_execution_time(secs), Style::default().fg(palette.muted))
                    .right_aligned(),
            );
        }
    }

    let (text, style) = if session.is_executing {
        (
            format!("Executing code... {}", ui.spinner_frame()),
            Style::default().fg(palette.accent),
        )
    } else {
        match session.result.as_ref().map(|r| &r.outcome) {
            Some(Outcome::Success { output }) => (output.clone(), palette.base()),
            Some(Outcome::ProgramError { error }) => {
                (error.clone(), Style::default().fg(palette.error))
            }
            Some(Outcome::ValidationError { message }) => {
                (message.clone(), Style::default().fg(palette.error))
            }
            None => (
                "Output will appear here after running your code...".to_string(),
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::ITALIC),
            ),
        }
    };

    let p = Paragraph::new(text)
        .style(style.bg(palette.bg))
        .wrap(Wrap { trim: false })
        .scroll((ui.output_scroll, 0))
        .block(block);
    f.render_widget(p, area);
}

fn draw_info(area: Rect, f: &mut Frame, ui: &UiState, palette: &Palette) {
    let line = if ui.info.is_empty() {
        Line::from(vec![
            Span::styled("Ctrl-Enter", Style::default().fg(palette.key)),
            Span::raw(" run  "),
            Span::styled("Ctrl-S", Style::default().fg(palette.key)),
            Span::raw(" save  "),
            Span::styled("Ctrl-O", Style::default().fg(palette.key)),
            Span::raw(" open  "),
            Span::styled("F1", Style::default().fg(palette.key)),
            Span::raw(" help"),
        ])
    } else {
        Line::from(ui.info.as_str())
    };
    f.render_widget(Paragraph::new(line).style(palette.base()), area);
}

fn draw_file_list(area: Rect, f: &mut Frame, ui: &UiState, palette: &Palette) {
    let rect = centered(area, 70, 16);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(true))
        .title("Saved files");

    let message = |text: String, style: Style| {
        Paragraph::new(text)
            .style(style.bg(palette.bg))
            .wrap(Wrap { trim: true })
            .block(block.clone())
    };

    match ui.listing.state() {
        ListingState::Hidden => {}
        ListingState::Loading => f.render_widget(
            message("Loading files...".into(), Style::default().fg(palette.muted)),
            rect,
        ),
        ListingState::Failed(e) => f.render_widget(
            message(format!("{e}\n\nPress r to retry."), Style::default().fg(palette.error)),
            rect,
        ),
        ListingState::Ready(files) if files.is_empty() => f.render_widget(
            message("No saved files".into(), Style::default().fg(palette.muted)),
            rect,
        ),
        ListingState::Ready(files) => {
            let width = files
                .iter()
                .map(|e| e.filename.chars().count())
                .max()
                .unwrap_or(0);
            let items: Vec<ListItem> = files
                .iter()
                .map(|e| {
                    ListItem::new(Line::from(vec![
                        Span::raw(format!("{:<width$}  ", e.filename)),
                        Span::styled(
                            format!("{:>9}  {}", e.size_display(), e.modified_display()),
                            Style::default().fg(palette.muted),
                        ),
                    ]))
                })
                .collect();
            let list = List::new(items)
                .style(palette.base())
                .block(block)
                .highlight_style(Style::default().bg(palette.selection).fg(palette.fg))
                .highlight_symbol("> ");
            let mut state = ListState::default().with_selected(Some(ui.listing.selected_index()));
            f.render_stateful_widget(list, rect, &mut state);
        }
    }
}

/// A `width`% wide, `height`-row tall rect in the middle of `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = area.width * width.min(100) / 100;
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
