use crate::app::App;
use crate::util::strip_control_chars;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::films::spinner;

/// Render the comments view for the current film.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let film_title = app
        .comments_for
        .as_ref()
        .map(|(_, title)| strip_control_chars(title).into_owned())
        .unwrap_or_default();
    let title = if app.comments_loading {
        format!("Comments - {} {}", film_title, spinner(app.spinner_frame))
    } else {
        format!("Comments - {} ({})", film_title, app.comments.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    if app.comments.is_empty() {
        let msg = if app.comments_loading {
            "Loading..."
        } else {
            "No comments for this film"
        };
        f.render_widget(Paragraph::new(msg).block(block), area);
        return;
    }

    let mut lines = Vec::with_capacity(app.comments.len() * 3);
    for comment in app.comments.iter().skip(app.comments_scroll) {
        lines.push(Line::from(Span::styled(
            strip_control_chars(&comment.user_email).into_owned(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        for text in strip_control_chars(&comment.comment).lines() {
            lines.push(Line::from(format!("  {}", text)));
        }
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
