mod quiz;
mod result;
mod setup;

use ratatui::{prelude::*, widgets::Block};

use crate::app::App;
use crate::session::Phase;

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.phase() {
        Phase::Setup => setup::render(frame, area, app),
        Phase::InProgress => quiz::render(frame, area, app),
        Phase::Ended => result::render(frame, area, app),
    }
}

/// Formats seconds as `mm:ss`.
fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn render_message(frame: &mut Frame, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        let widget = ratatui::widgets::Paragraph::new(message)
            .alignment(Alignment::Center)
            .fg(Color::Red);
        frame.render_widget(widget, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(3600), "60:00");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(0), "00:00");
    }
}
