use crate::app::App;
use crate::util::strip_control_chars;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the detail pane for the film under the cursor.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default().borders(Borders::ALL).title("Details");

    let Some(film) = app.selected_film() else {
        f.render_widget(Paragraph::new("No film selected").block(block), area);
        return;
    };

    let dim = Style::default().fg(Color::DarkGray);
    let genres = film.genre_names();
    let genres = if genres.is_empty() {
        // Genre table unavailable or the film lists none
        "-".to_string()
    } else {
        genres
    };
    let year = film
        .release_year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        Line::from(Span::styled(
            strip_control_chars(&film.title).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![Span::styled("Year    ", dim), Span::raw(year)]),
        Line::from(vec![Span::styled("Genres  ", dim), Span::raw(genres)]),
        Line::from(vec![
            Span::styled("Rating  ", dim),
            Span::raw(format!("{:.1}/10", film.vote_average)),
        ]),
    ];

    if app.is_favorite(film.id) {
        lines.push(Line::from(Span::styled(
            "♥ In your favorites",
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(poster) = &film.poster_path {
        lines.push(Line::from(vec![
            Span::styled("Poster  ", dim),
            Span::raw(strip_control_chars(poster).into_owned()),
        ]));
    }

    lines.push(Line::from(""));
    if film.overview.is_empty() {
        lines.push(Line::from(Span::styled("No overview.", dim)));
    } else {
        for paragraph in strip_control_chars(&film.overview).lines() {
            lines.push(Line::from(paragraph.to_string()));
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
