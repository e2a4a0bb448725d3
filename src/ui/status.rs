use crate::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.search_mode {
        Cow::Borrowed("Type to search | ESC close search | ENTER keep results")
    } else {
        match app.view {
            View::Browse => {
                if app.browser.genres().is_empty() && !app.browser.genres_pending() {
                    Cow::Borrowed(
                        "No genres loaded: [g] retry | [/]search [f]avorite [c]omments [F]avorites [o]pen [q]uit",
                    )
                } else {
                    Cow::Borrowed(
                        "[j/k]move [/]search [f]avorite [c]omments [F]avorites [g]enres [o]pen [q]uit",
                    )
                }
            }
            View::Favorites => {
                Cow::Borrowed("[j/k]move [f]remove [c]omments [r]eload [o]pen [b]ack [q]uit")
            }
            View::Comments => Cow::Borrowed("[j/k]scroll [b]ack [q]uit"),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
