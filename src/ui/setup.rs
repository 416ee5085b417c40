use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;
use crate::session::{QuizLength, TIME_LIMIT_SECS};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(12),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "EXAM DRILL",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} questions in the bank", app.bank().len()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        length_menu(app.selected_length()),
        Line::from(""),
        Line::from(Span::styled(
            format!("You have {} minutes to finish.", TIME_LIMIT_SECS / 60),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "ENTER",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from("to start  ·  h/l choose length  ·  q quit".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );

    frame.render_widget(widget, chunks[1]);
    super::render_message(frame, chunks[2], app.message());
}

fn length_menu(selected: QuizLength) -> Line<'static> {
    let mut spans = vec![Span::styled("Questions: ", Style::default().fg(Color::Gray))];
    for length in QuizLength::ALL {
        let style = if length == selected {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", length.count()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}
