//! Render functions for the TUI.
//!
//! Dispatches to the view renderer for the current application state.

use crate::app::{App, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use super::{comments, detail, films, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match app.view {
        View::Browse => render_with_detail(f, app, chunks[0], films::render),
        View::Favorites => render_with_detail(f, app, chunks[0], films::render_favorites),
        View::Comments => comments::render(f, app, chunks[0]),
    }
    status::render(f, app, chunks[1]);
}

/// Film list on the left, detail pane for the cursor film on the right.
fn render_with_detail(f: &mut Frame, app: &App, area: Rect, list: fn(&mut Frame, &App, Rect)) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    list(f, app, columns[0]);
    detail::render(f, app, columns[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{CatalogueClient, Film};
    use ratatui::{backend::TestBackend, Terminal};
    use secrecy::SecretString;

    fn test_app() -> App {
        let catalogue = CatalogueClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9",
            SecretString::from("k".to_string()),
            "en-US",
        )
        .unwrap();
        App::with_clients(catalogue, None, None)
    }

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_too_small_terminal() {
        let app = test_app();
        assert!(screen(&app, 40, 8).contains("Terminal too small"));
    }

    #[test]
    fn test_browse_shows_films_and_detail() {
        let mut app = test_app();
        app.browser.start();
        let _ = app.browser.on_genres_loaded(Ok(Vec::new()));
        let generation = app.browser.generation();
        app.browser.on_films_loaded(
            generation,
            Ok(vec![Film {
                id: 1,
                title: "Heat".into(),
                genre_ids: Vec::new(),
                genres: Vec::new(),
                poster_path: None,
                overview: "A heist.".into(),
                vote_average: 7.9,
                release_date: Some("1995-12-15".into()),
            }]),
        );

        let text = screen(&app, 100, 20);
        assert!(text.contains("Heat (1995)"));
        assert!(text.contains("A heist."));
        assert!(text.contains("7.9/10"));
    }

    #[test]
    fn test_comments_view_empty() {
        let mut app = test_app();
        app.enter_comments(3, "Alien".into());
        app.comments_loading = false;
        assert!(screen(&app, 80, 12).contains("No comments for this film"));
    }
}
