//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a header line, the scrollable product list, and a
//!   one-line status bar (replaced by the search prompt while typing).
//! * The product detail view is drawn as a popup over the list.
//! * [`draw_product_list`] records the visible row count on [`App`]; the
//!   scroll signal depends on it.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::catalog::{ListingMode, Product};
use crate::pager::{Outcome, Phase};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [header_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(app, frame, header_area);
    draw_product_list(app, frame, main_area);

    match &app.input {
        InputMode::Search { query } => draw_search_prompt(query, frame, status_area),
        InputMode::Browse => draw_status_bar(app, frame, status_area),
    }

    if app.show_detail {
        if let Some(product) = app.selected_product() {
            draw_detail(product, frame, main_area);
        }
    }
}

fn draw_header(app: &App, frame: &mut Frame, area: Rect) {
    let listing = match app.mode() {
        ListingMode::All => Span::styled("All products", Style::default().fg(Color::White)),
        ListingMode::Search(keyword) => Span::styled(
            format!("Search: {keyword}"),
            Style::default().fg(Color::Yellow),
        ),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " CATALOG ",
            Style::default().add_modifier(Modifier::BOLD).bg(Color::Red),
        ),
        Span::raw(" "),
        listing,
    ]));
    frame.render_widget(header, area);
}

/// Render the scrollable product list.
fn draw_product_list(app: &mut App, frame: &mut Frame, area: Rect) {
    app.list_height = area.height.saturating_sub(2);

    let list_items: Vec<ListItem> = app
        .view
        .products
        .iter()
        .map(|p| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>9}", p.price), Style::default().fg(Color::Green)),
                Span::raw("  "),
                Span::styled(&p.title, Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(
                    format!("{} reviews", p.review),
                    Style::default().fg(Color::Red),
                ),
            ]))
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(" Products ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Short description of the controller state.
fn phase_text(phase: Phase) -> String {
    match phase {
        Phase::Idle => "ready".into(),
        Phase::Fetching { page } => format!("loading page {page}…"),
        Phase::Settling => "settling".into(),
    }
}

fn outcome_text(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Loaded { page, count, at } => {
            format!("page {page}: +{count} at {}", at.format("%H:%M:%S"))
        }
        Outcome::Empty { page } => format!("page {page} was empty"),
        Outcome::Failed { page } => format!("page {page} failed, scroll to retry"),
    }
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let message = if app.status.is_empty() {
        app.view
            .last_outcome
            .as_ref()
            .map(outcome_text)
            .unwrap_or_default()
    } else {
        app.status.clone()
    };

    let status = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled(phase_text(app.view.phase), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(message, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} products", app.view.products.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("next page {}", app.view.next_page),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  Enter: detail  /: search"),
    ]));
    frame.render_widget(status, area);
}

fn draw_search_prompt(query: &str, frame: &mut Frame, area: Rect) {
    let prompt = Paragraph::new(Line::from(vec![
        Span::styled(" search: ", Style::default().fg(Color::Yellow)),
        Span::raw(query),
        Span::styled("▏", Style::default().fg(Color::Yellow)),
        Span::styled(
            "  Enter: go (empty = all)  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    frame.render_widget(prompt, area);
}

/// A rectangle `pct_x`% by `pct_y`% of `area`, centred in it.
fn centered(area: Rect, pct_x: u16, pct_y: u16) -> Rect {
    let scale = |len: u16, pct: u16| (u32::from(len) * u32::from(pct.min(100)) / 100) as u16;
    let width = scale(area.width, pct_x);
    let height = scale(area.height, pct_y);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_detail(product: &Product, frame: &mut Frame, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("{name:<10}"), label), Span::raw(value)])
    };

    let lines = vec![
        Line::from(Span::styled(
            product.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        field("id", product.id.to_string()),
        field("price", product.price.to_string()),
        field("reviews", product.review.to_string()),
        field("detail", product.detail_path()),
        field("shop", product.landing_url.clone()),
        field("image", product.thumbnail.clone()),
    ];

    let popup = centered(area, 80, 60);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(" Detail ").borders(Borders::ALL)),
        popup,
    );
}

// ---------------------------------------------------------------------------
// Tests (rendering smoke tests)
// ---------------------------------------------------------------------------
