use crate::app::App;
use crate::browse::Mode;
use crate::catalogue::Film;
use crate::util::{display_width, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn spinner(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

/// One list row: favorite marker, title, year, genres.
fn film_line(film: &Film, favorite: bool, selected: bool, width: usize) -> Line<'static> {
    let mut spans = Vec::with_capacity(4);

    if favorite {
        spans.push(Span::styled("♥ ", Style::default().fg(Color::Red)));
    } else {
        spans.push(Span::raw("  "));
    }

    let year = film
        .release_year()
        .map(|y| format!(" ({})", y))
        .unwrap_or_default();
    let genres = film.genre_names();
    let genres = if genres.is_empty() {
        String::new()
    } else {
        format!("  {}", genres)
    };

    // Title gets the room left after the marker and year; genres take the rest
    let fixed = 2 + display_width(&year);
    let title_room = width.saturating_sub(fixed).max(1);
    let title = strip_control_chars(&film.title);
    let title = truncate_to_width(&title, title_room).into_owned();
    let used = fixed + display_width(&title);

    let title_style = if selected {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    spans.push(Span::styled(title, title_style));
    spans.push(Span::styled(year, Style::default().fg(Color::Gray)));

    let genre_room = width.saturating_sub(used);
    if genre_room > 4 && !genres.is_empty() {
        spans.push(Span::styled(
            truncate_to_width(&genres, genre_room).into_owned(),
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}

/// Render a list of films with the cursor on `selected`.
pub(super) fn render_list<'a>(
    f: &mut Frame,
    app: &App,
    area: Rect,
    films: impl Iterator<Item = &'a Film>,
    selected: usize,
    title: String,
    empty: &str,
) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = films
        .enumerate()
        .map(|(i, film)| {
            ListItem::new(film_line(film, app.is_favorite(film.id), i == selected, width))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    if items.is_empty() {
        let list = List::new(vec![ListItem::new(empty.to_string())]).block(block);
        f.render_widget(list, area);
        return;
    }

    // ListState keeps the cursor row scrolled into view
    let mut state = ListState::default().with_selected(Some(selected));
    let list = List::new(items).block(block);
    f.render_stateful_widget(list, area, &mut state);
}

/// Render the browse list.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let browser = &app.browser;
    let loading = if browser.is_loading() {
        format!(" {}", spinner(app.spinner_frame))
    } else {
        String::new()
    };

    let title = if app.search_mode {
        format!("Search: {}_{}", app.search_input, loading)
    } else {
        match browser.mode() {
            Mode::Searching => format!(
                "Results for \"{}\" ({}){}",
                browser.query(),
                browser.films().len(),
                loading
            ),
            Mode::Browsing => {
                let end = if browser.is_exhausted() { ", end" } else { "" };
                format!(
                    "Films ({}, page {}{}){}",
                    browser.films().len(),
                    browser.page(),
                    end,
                    loading
                )
            }
        }
    };

    let empty = if browser.is_loading() {
        "Loading..."
    } else if browser.mode() == Mode::Searching {
        "No matches"
    } else {
        "No films"
    };

    render_list(
        f,
        app,
        area,
        browser.films().iter(),
        app.selected_film,
        title,
        empty,
    );
}

/// Render the favorites list.
pub fn render_favorites(f: &mut Frame, app: &App, area: Rect) {
    let title = match (&app.user_email, app.liked_loading) {
        (Some(email), true) => format!("Favorites - {} {}", email, spinner(app.spinner_frame)),
        (Some(email), false) => format!("Favorites - {} ({})", email, app.liked.len()),
        (None, _) => "Favorites".to_string(),
    };
    let empty = if app.liked_loading {
        "Loading..."
    } else {
        "No favorites yet"
    };

    render_list(
        f,
        app,
        area,
        app.liked.iter().map(|l| &l.film),
        app.selected_liked,
        title,
        empty,
    );
}
