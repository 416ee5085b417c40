use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use crate::app::App;
use crate::models::{Label, QuestionOption};

/// Below this many seconds the timer turns red.
const LOW_TIME_SECS: u64 = 5 * 60;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let snapshot = app.snapshot();
    let Some(question) = snapshot.current_question.as_ref() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(2)
    .split(area);

    render_status(
        frame,
        chunks[0],
        snapshot.current_index + 1,
        snapshot.requested_count,
        snapshot.remaining_seconds,
    );
    render_question_text(frame, chunks[1], &question.text);
    render_options(
        frame,
        chunks[2],
        &question.options,
        app.cursor(),
        snapshot.current_answer(),
    );
    super::render_message(frame, chunks[3], app.message());
    render_controls(frame, chunks[4], snapshot.is_last_question());
}

fn render_status(frame: &mut Frame, area: Rect, number: usize, total: usize, remaining: u64) {
    let halves = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);

    let timer_color = if remaining <= LOW_TIME_SECS {
        Color::Red
    } else {
        Color::Cyan
    };
    let timer = Paragraph::new(format!("time left {}", super::format_clock(remaining)))
        .fg(timer_color);
    frame.render_widget(timer, halves[0]);

    let progress = Paragraph::new(format!("{}/{}", number, total))
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);
    frame.render_widget(progress, halves[1]);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold();
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    options: &[QuestionOption],
    cursor: usize,
    answer: Option<Label>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_selected = index == cursor;
        let is_answer = answer == Some(option.label);
        let style = if is_selected {
            Style::default().fg(Color::Cyan).bold()
        } else if is_answer {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { ">" } else { " " };
        let check = if is_answer { "●" } else { "○" };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} {} ", marker, check), style),
            Span::styled(format!("{}. ", option.label), style),
            Span::styled(option.text.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect, is_last: bool) {
    let hint = if is_last {
        "j/k move  ·  enter/a-e answer  ·  h back  ·  s submit  ·  q quit"
    } else {
        "j/k move  ·  enter/a-e answer  ·  h/l back/next  ·  q quit"
    };
    let widget = Paragraph::new(hint)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
