use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::session::{EndReason, QuestionResult, ScoreReport};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let Some(report) = app.report() else {
        return;
    };
    let grade_color = get_grade_color(report.percent);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_score_summary(frame, chunks[1], report, app.snapshot().end_reason, grade_color);
    render_question_breakdown(frame, chunks[2], report, app.result_scroll());
    render_controls(frame, chunks[3]);
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        90..=100 => Color::Green,
        70..=89 => Color::Cyan,
        50..=69 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_score_summary(
    frame: &mut Frame,
    area: Rect,
    report: &ScoreReport,
    reason: Option<EndReason>,
    grade_color: Color,
) {
    let subtitle = match reason {
        Some(EndReason::TimeExpired) => "time is up",
        _ => "submitted",
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(subtitle.fg(Color::DarkGray)),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "{} / {}  ({:.1}%)",
                report.correct_count,
                report.total,
                report.percent
            ),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(""),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn render_question_breakdown(frame: &mut Frame, area: Rect, report: &ScoreReport, scroll: usize) {
    let lines: Vec<Line> = report.per_question.iter().flat_map(breakdown_lines).collect();

    // Each question takes two lines.
    let offset = u16::try_from(scroll * 2).unwrap_or(u16::MAX);
    let widget = Paragraph::new(lines)
        .block(Block::default().padding(Padding::horizontal(1)))
        .scroll((offset, 0));
    frame.render_widget(widget, area);
}

fn breakdown_lines(result: &QuestionResult) -> [Line<'static>; 2] {
    let (symbol, color) = if result.is_correct {
        ("+", Color::Green)
    } else {
        ("-", Color::Red)
    };

    let headline = Line::from(vec![
        Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
        Span::styled(
            format!("{:2}. ", result.index + 1),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            truncate_question(&result.question_text),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let yours = result
        .user_label
        .map_or_else(|| "-".to_string(), |label| label.to_string());
    let mut detail = format!("     yours {}  ·  key {}", yours, result.correct_label);
    if !result.is_correct {
        let source = [result.reference.as_deref(), result.clause.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ");
        if !source.is_empty() {
            detail.push_str("  ·  ");
            detail.push_str(&source);
        }
    }

    [headline, Line::from(Span::styled(detail, Style::default().fg(Color::DarkGray)))]
}

fn truncate_question(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  r restart  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Label;

    #[test]
    fn test_truncate_question_counts_chars() {
        let long = "ă".repeat(60);
        let preview = truncate_question(&long);
        assert_eq!(preview.chars().count(), QUESTION_PREVIEW_LENGTH + 3);
        assert_eq!(truncate_question("short"), "short");
    }

    #[test]
    fn test_wrong_answer_detail_shows_reference() {
        let result = QuestionResult {
            index: 0,
            question_text: "Q".to_string(),
            user_label: Some(Label::B),
            correct_label: "A".to_string(),
            is_correct: false,
            reference: Some("Decree 5".to_string()),
            clause: Some("Art. 3".to_string()),
        };
        let [_, detail] = breakdown_lines(&result);
        let text: String = detail.spans.iter().map(|span| span.content.as_ref()).collect();
        assert!(text.contains("yours B"));
        assert!(text.contains("Decree 5, Art. 3"));
    }
}
