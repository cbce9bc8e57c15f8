//! # TUI Rendering
//!
//! Menu line, personality list, chat pane, input line and status bar, plus
//! the "add personality" popup.

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::app::{AddPersonalityForm, App, FormField};
use super::typing::typing_text;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Menu
            Constraint::Min(0),    // Personalities + chat
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_menu(frame, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4), Constraint::Ratio(3, 4)])
        .split(chunks[1]);

    render_personalities(frame, app, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(columns[1]);

    render_chat(frame, app, right[0]);
    render_input(frame, app, right[1]);
    render_status_bar(frame, app, chunks[2]);

    if let Some(form) = &app.popup {
        render_add_personality(frame, form);
    }
}

fn render_menu(frame: &mut Frame, area: Rect) {
    let menu = Line::from(vec![
        Span::styled(
            " Add Personality (Ctrl+N) ",
            Style::default().fg(Color::Black).bg(Color::Gray),
        ),
        Span::styled(
            " Up/Down: switch  PgUp/PgDn: scroll  Ctrl+C or \"quit\": exit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(menu), area);
}

fn render_personalities(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .session
        .catalog()
        .iter()
        .map(|p| {
            let marker = if app.session.is_awaiting(p.key()) { " …" } else { "" };
            ListItem::new(format!("{}{}", p.key(), marker))
        })
        .collect();

    let list = List::new(items)
        .block(titled_block("Personalities"))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default().with_selected(Some(app.session.active_index()));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Lines of the chat pane for the active personality
pub fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for message in app.conversation() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{}: ", message.role),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(message.content.clone()),
        ]));
        lines.push(Line::from(""));
    }

    if let Some(error) = app.active_error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(""));
    }

    if app.active_is_awaiting() {
        lines.push(Line::from(Span::styled(
            typing_text(app.typing_dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Rows a borderless paragraph occupies when word-wrapped to `width` columns
pub fn wrapped_height(paragraph: &Paragraph, width: u16) -> u16 {
    u16::try_from(paragraph.line_count(width.max(1))).unwrap_or(u16::MAX)
}

fn render_chat(frame: &mut Frame, app: &App, area: Rect) {
    let chat = Paragraph::new(chat_lines(app)).wrap(Wrap { trim: false });

    let inner_height = area.height.saturating_sub(2);
    let total = wrapped_height(&chat, area.width.saturating_sub(2));
    let bottom = total.saturating_sub(inner_height);
    let offset = bottom.saturating_sub(app.scroll_back);

    let chat = chat
        .block(titled_block(&app.chat_title()))
        .scroll((offset, 0));

    frame.render_widget(chat, area);
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let prompt = "You: ";
    let input = Paragraph::new(Line::from(vec![
        Span::styled(prompt, Style::default().fg(Color::Cyan)),
        Span::raw(app.input.as_str()),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(input, area);

    if app.popup.is_none() {
        let x = area.x + 1 + (prompt.len() + app.input.chars().count()) as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let state = if app.any_awaiting() {
        Span::styled("● Waiting", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("● Idle", Style::default().fg(Color::Green))
    };

    let message = match &app.status_message {
        Some(status) if app.active_error().is_some() => {
            Span::styled(format!(" Error: {} ", status), Style::default().fg(Color::Red))
        }
        Some(status) => Span::styled(format!(" {} ", status), Style::default().fg(Color::Green)),
        None => Span::raw(""),
    };

    frame.render_widget(
        Paragraph::new(Line::from(vec![state, Span::raw(" |"), message])),
        area,
    );
}

fn render_add_personality(frame: &mut Frame, form: &AddPersonalityForm) {
    let area = centered_rect(50, 50, frame.area());
    frame.render_widget(Clear, area);

    let block = titled_block("Add New Personality");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let field = |label: &str, value: &str, focused: bool| {
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Paragraph::new(value.to_string())
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(label.to_string()).border_style(style))
    };

    frame.render_widget(
        field("Name", &form.name, form.focus == FormField::Name),
        rows[0],
    );
    frame.render_widget(
        field("Description", &form.description, form.focus == FormField::Description),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Enter: Save  Tab: next field  Esc: Cancel",
            Style::default().fg(Color::DarkGray),
        ))),
        rows[2],
    );

    let (row, text) = match form.focus {
        FormField::Name => (rows[0], &form.name),
        FormField::Description => (rows[1], &form.description),
    };
    let x = row.x + 1 + text.chars().count() as u16;
    frame.set_cursor_position((x.min(row.right().saturating_sub(2)), row.y + 1));
}

/// Create a standard titled block
pub fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title))
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChatSession;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(app: &App) -> String {
        screen_text_sized(app, 100, 30)
    }

    fn screen_text_sized(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_wrapped_height_breaks_at_words() {
        // 17 columns, but no word fits next to its neighbour in 9
        let words = Paragraph::new(Line::from("aaaaa bbbbb ccccc")).wrap(Wrap { trim: false });
        assert_eq!(wrapped_height(&words, 9), 3);
        assert_eq!(wrapped_height(&words, 17), 1);

        let long = Paragraph::new(Line::from("x".repeat(25))).wrap(Wrap { trim: false });
        assert_eq!(wrapped_height(&long, 10), 3);
    }

    #[test]
    fn test_chat_pane_follows_newest_wrapped_lines() {
        let sentence = |word: &str| vec![word.repeat(15); 8].join(" ");

        let mut app = App::new(ChatSession::default());
        let pending = app.session.submit(&sentence("a")).unwrap();
        app.apply_reply(&pending.key, Ok(sentence("b")));
        app.session.submit(&format!("{} tail", sentence("c"))).unwrap();

        let text = screen_text_sized(&app, 60, 14);
        assert!(text.contains("AI is typing"));
        assert!(text.contains("tail"));
    }

    #[test]
    fn test_chat_lines_with_typing_and_error() {
        let mut app = App::new(ChatSession::default());
        let pending = app.session.submit("hi").unwrap();
        app.typing_dots = 2;

        let lines = chat_lines(&app);
        assert_eq!(lines[0].to_string(), "Human: hi");
        assert_eq!(lines.last().unwrap().to_string(), "AI is typing..");

        app.apply_reply(&pending.key, Err(crate::core::ChatError::UnexpectedResponse));
        let lines = chat_lines(&app);
        assert_eq!(lines[2].to_string(), "Unexpected response format from the server.");
    }

    #[test]
    fn test_render_main_screen() {
        let mut app = App::new(ChatSession::default());
        app.session.submit("hello").unwrap();
        app.input = "typing".into();

        let text = screen_text(&app);
        assert!(text.contains("Personalities"));
        assert!(text.contains("tech_geek"));
        assert!(text.contains(" Flirty "));
        assert!(text.contains("Human: hello"));
        assert!(text.contains("You: typing"));
    }

    #[test]
    fn test_render_popup() {
        let mut app = App::new(ChatSession::default());
        app.popup = Some(AddPersonalityForm {
            name: "poet".into(),
            ..Default::default()
        });

        let text = screen_text(&app);
        assert!(text.contains("Add New Personality"));
        assert!(text.contains("poet"));
    }
}
