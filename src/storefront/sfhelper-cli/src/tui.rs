//! Interactive TUI for browsing the catalog.

use crate::fetch::{FetchOutcome, FetchRequest, FetchResponse, Fetcher};
use crate::router::Route;
use crate::screens::{DetailScreen, ListingScreen};
use crate::state::Status;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use sfhelper_catalog::{CatalogSource, ListQuery, ProductSummary, display_value};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const CAROUSEL_BACKGROUND: Color = Color::Rgb(0x36, 0x4d, 0x79);

// ============================================================================
// Public entry points
// ============================================================================

/// Settings the TUI needs beyond the catalog source.
#[derive(Clone, Debug)]
pub struct TuiOptions {
    pub query: ListQuery,
    pub carousel_interval: Duration,
}

impl Default for TuiOptions {
    fn default() -> Self {
        Self {
            query: ListQuery::default(),
            carousel_interval: Duration::from_millis(3000),
        }
    }
}

/// Run the TUI starting at `path`.
pub fn run(source: CatalogSource, path: &str, options: TuiOptions) -> Result<()> {
    let app = App::new(source, path, options);
    app.run()
}

// ============================================================================
// App state
// ============================================================================

struct App {
    fetcher: Fetcher,
    options: TuiOptions,
    /// Path of the current screen, matched or not.
    path: String,
    /// Paths visited before the current one, most recent last.
    history: Vec<String>,
    screen: Screen,
    should_quit: bool,
    pending_action: Option<PendingAction>,
}

enum Screen {
    /// No route matched the path; nothing is drawn.
    Blank,
    Listing(ListingScreen),
    Detail(DetailScreen),
}

enum PendingAction {
    OpenUrl { url: String },
}

fn wait_for_enter() {
    // ratatui::restore() leaves the alternate screen and disables raw mode but
    // does not re-show the cursor, so we do it explicitly here.
    let _ = crossterm::execute!(std::io::stdout(), crossterm::cursor::Show);
    println!("\nPress Enter to return to TUI...");
    let _ = std::io::stdin().read_line(&mut String::new());
}

// ============================================================================
// App implementation
// ============================================================================

impl App {
    fn new(source: CatalogSource, path: &str, options: TuiOptions) -> Self {
        let mut app = Self {
            fetcher: Fetcher::new(source),
            options,
            path: String::new(),
            history: Vec::new(),
            screen: Screen::Blank,
            should_quit: false,
            pending_action: None,
        };
        app.mount(path.to_string());
        app
    }

    fn run(mut self) -> Result<()> {
        // Install a panic hook that restores the terminal before printing the
        // panic message, so the user isn't left with a broken terminal.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = ratatui::try_restore();
            let _ = crossterm::execute!(std::io::stdout(), crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_inner();

        // Always restore the terminal, even if run_inner returned an error.
        ratatui::restore();
        let _ = crossterm::execute!(std::io::stdout(), crossterm::cursor::Show);

        // Drop the restoring hook; this falls back to the default hook.
        let _ = std::panic::take_hook();

        result
    }

    fn run_inner(&mut self) -> Result<()> {
        let mut terminal = ratatui::init();

        loop {
            // Fold in whatever fetches finished since the last frame, then
            // let the carousel autoplay before drawing.
            let now = Instant::now();
            self.drain_responses(now);
            self.tick(now);

            terminal.draw(|frame| self.render(frame))?;

            if let Some(action) = self.pending_action.take() {
                ratatui::restore();
                self.execute_action(&action);
                terminal = ratatui::init();
                continue;
            }

            if event::poll(Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
            {
                // Windows compatibility: only handle Press events
                if key.kind == KeyEventKind::Press {
                    // Ctrl+C quits immediately
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c')
                    {
                        break;
                    }
                    self.handle_key(key.code);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Follow a link: remember the current path, then mount `path`.
    fn navigate(&mut self, path: String) {
        let previous = std::mem::take(&mut self.path);
        self.history.push(previous);
        self.mount(path);
    }

    /// Go back one step in history, or quit when there is nowhere to go.
    fn back(&mut self) {
        match self.history.pop() {
            Some(path) => self.mount(path),
            None => self.should_quit = true,
        }
    }

    /// Build the screen for `path` and issue its request.
    fn mount(&mut self, path: String) {
        let route = Route::parse(&path);
        info!(path = %path, matched = route.is_some(), "route change");
        self.screen = match route {
            Some(Route::Products) => {
                let mut screen = ListingScreen::default();
                let ticket = self
                    .fetcher
                    .request(FetchRequest::List(self.options.query.clone()));
                screen.activate(ticket);
                Screen::Listing(screen)
            }
            Some(Route::ProductDetails(params)) => {
                let mut screen = DetailScreen::new(&params.id, self.options.carousel_interval);
                let ticket = self.fetcher.request(FetchRequest::Detail {
                    id: params.id.clone(),
                });
                screen.activate(params.id, ticket);
                Screen::Detail(screen)
            }
            None => Screen::Blank,
        };
        self.path = path;
    }

    /// Change the `id` of the detail route in place. The detail screen is
    /// kept and refetches; any response for the old id is discarded.
    fn change_detail_id(&mut self, id: String) {
        let Screen::Detail(screen) = &mut self.screen else {
            return;
        };
        let ticket = self
            .fetcher
            .request(FetchRequest::Detail { id: id.clone() });
        screen.activate(id.clone(), ticket);

        let previous = std::mem::replace(&mut self.path, Route::product_details(id).to_string());
        self.history.push(previous);
    }

    /// Reissue the current screen's request.
    fn retry(&mut self) {
        match &mut self.screen {
            Screen::Blank => {}
            Screen::Listing(screen) => {
                let ticket = self
                    .fetcher
                    .request(FetchRequest::List(self.options.query.clone()));
                screen.activate(ticket);
            }
            Screen::Detail(screen) => {
                let id = screen.id().to_string();
                let ticket = self
                    .fetcher
                    .request(FetchRequest::Detail { id: id.clone() });
                screen.activate(id, ticket);
            }
        }
    }

    // ========================================================================
    // Responses
    // ========================================================================

    fn drain_responses(&mut self, now: Instant) {
        while let Some(response) = self.fetcher.try_recv() {
            self.receive(response, now);
        }
    }

    /// Hand a response to the active screen. Responses for a screen that is
    /// no longer mounted, or for a superseded request, are dropped.
    fn receive(&mut self, response: FetchResponse, now: Instant) {
        let FetchResponse { ticket, outcome } = response;
        let accepted = match (&mut self.screen, outcome) {
            (Screen::Listing(screen), FetchOutcome::List(result)) => screen.resolve(ticket, result),
            (Screen::Detail(screen), FetchOutcome::Detail(result)) => {
                screen.resolve(ticket, result, now)
            }
            _ => false,
        };
        if !accepted {
            debug!(%ticket, "discarding stale response");
        }
    }

    fn tick(&mut self, now: Instant) {
        if let Screen::Detail(screen) = &mut self.screen
            && *screen.status() == Status::Loaded
        {
            screen.carousel_mut().tick(now);
        }
    }

    fn execute_action(&self, action: &PendingAction) {
        match action {
            PendingAction::OpenUrl { url } => {
                if let Err(e) = open::that(url) {
                    println!("Failed to open browser: {}", e);
                    println!("URL: {}", url);
                    wait_for_enter();
                }
            }
        }
    }

    // ========================================================================
    // Key handling
    // ========================================================================

    fn handle_key(&mut self, key: KeyCode) {
        // Extract needed data to avoid borrow conflicts
        enum Action {
            None,
            Quit,
            Back,
            Retry,
            ListUp,
            ListDown,
            Follow(String),
            OpenUrl(String),
            CarouselStep(bool),
            ChangeId(String),
        }

        let action = match &self.screen {
            Screen::Blank => match key {
                KeyCode::Esc => Action::Back,
                KeyCode::Char('q') => Action::Quit,
                _ => Action::None,
            },
            Screen::Listing(screen) => {
                let failed = matches!(screen.status(), Status::Failed(_));
                match key {
                    KeyCode::Up | KeyCode::Char('k') => Action::ListUp,
                    KeyCode::Down | KeyCode::Char('j') => Action::ListDown,
                    KeyCode::Enter | KeyCode::Char('r') if failed => Action::Retry,
                    KeyCode::Enter => screen
                        .selected()
                        .map_or(Action::None, |p| Action::Follow(p.detail_path())),
                    KeyCode::Char('o') => screen
                        .selected()
                        .filter(|p| !p.thumbnail.is_empty())
                        .map_or(Action::None, |p| Action::OpenUrl(p.thumbnail.clone())),
                    KeyCode::Esc => Action::Back,
                    KeyCode::Char('q') => Action::Quit,
                    _ => Action::None,
                }
            }
            Screen::Detail(screen) => {
                let settled_without_data =
                    matches!(screen.status(), Status::Failed(_) | Status::Empty);
                match key {
                    KeyCode::Left | KeyCode::Char('h') => Action::CarouselStep(false),
                    KeyCode::Right | KeyCode::Char('l') => Action::CarouselStep(true),
                    KeyCode::Char('n') => screen
                        .adjacent_id(true)
                        .map_or(Action::None, Action::ChangeId),
                    KeyCode::Char('p') => screen
                        .adjacent_id(false)
                        .map_or(Action::None, Action::ChangeId),
                    KeyCode::Char('o') => screen
                        .carousel()
                        .current()
                        .map_or(Action::None, |url| Action::OpenUrl(url.to_string())),
                    KeyCode::Enter | KeyCode::Char('r') if settled_without_data => {
                        Action::Retry
                    }
                    KeyCode::Esc => Action::Back,
                    KeyCode::Char('q') => Action::Quit,
                    _ => Action::None,
                }
            }
        };

        match action {
            Action::None => {}
            Action::Quit => self.should_quit = true,
            Action::Back => self.back(),
            Action::Retry => self.retry(),
            Action::ListUp => {
                if let Screen::Listing(screen) = &mut self.screen {
                    screen.select_prev();
                }
            }
            Action::ListDown => {
                if let Screen::Listing(screen) = &mut self.screen {
                    screen.select_next();
                }
            }
            Action::Follow(path) => self.navigate(path),
            Action::OpenUrl(url) => self.pending_action = Some(PendingAction::OpenUrl { url }),
            Action::CarouselStep(forward) => {
                if let Screen::Detail(screen) = &mut self.screen {
                    screen.carousel_mut().step(forward, Instant::now());
                }
            }
            Action::ChangeId(id) => self.change_detail_id(id),
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn render(&mut self, frame: &mut Frame) {
        let back_hint = if self.history.is_empty() {
            "Esc/q Quit"
        } else {
            "Esc Back | q Quit"
        };
        match &mut self.screen {
            Screen::Blank => {}
            Screen::Listing(state) => render_listing(frame, state, back_hint),
            Screen::Detail(state) => render_detail(frame, state, back_hint),
        }
    }
}

// ============================================================================
// Screen renderers
// ============================================================================

fn render_loading(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let text = Paragraph::new(message)
        .style(Style::default().fg(Color::Cyan))
        .centered();

    let vertical = Layout::vertical([Constraint::Length(1)]).flex(Flex::Center);
    let [center] = vertical.areas(area);
    frame.render_widget(text, center);
}

fn render_footer(frame: &mut Frame, text: String, area: Rect) {
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .centered(),
        area,
    );
}

/// Skeleton row shown while the product list is loading.
fn placeholder_list_item() -> ListItem<'static> {
    let bar = |width: usize| Line::styled("░".repeat(width), Style::default().fg(Color::DarkGray));
    ListItem::new(Text::from(vec![
        bar(28),
        bar(56),
        bar(40),
        Line::from(""),
    ]))
}

fn product_list_item(product: &ProductSummary) -> ListItem<'_> {
    let description = product.description.lines().next().unwrap_or("");
    let title = Line::from(vec![
        Span::styled(
            product.title.as_str(),
            Style::default().fg(Color::Green).bold(),
        ),
        Span::raw("  "),
        Span::styled(
            product.detail_path(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
        ),
    ]);
    let actions = Line::from(vec![
        Span::styled("★ ", Style::default().fg(Color::Yellow)),
        Span::raw(product.rating.to_string()),
        Span::raw("   "),
        Span::raw(format!(
            "{} ({})",
            product.stock, product.availability_status
        )),
        Span::raw("   "),
        Span::raw(format!("{} $", product.price)),
    ]);
    ListItem::new(Text::from(vec![
        title,
        Line::from(description),
        actions,
        Line::styled(
            product.thumbnail.as_str(),
            Style::default().fg(Color::DarkGray),
        ),
        Line::from(""),
    ]))
}

fn render_listing(frame: &mut Frame, state: &mut ListingScreen, back_hint: &str) {
    let area = frame.area();

    let [header, main, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let title = if state.status().is_loading() {
        Line::from(vec![
            Span::styled("Product List", Style::default().bold()),
            Span::styled("  Loading products...", Style::default().fg(Color::Cyan)),
        ])
    } else {
        Line::styled("Product List", Style::default().bold())
    };
    frame.render_widget(Paragraph::new(title).centered(), header);

    let footer_text = match state.status() {
        Status::Idle | Status::Loading => back_hint.to_string(),
        Status::Failed(reason) => {
            let text = Text::from(vec![
                Line::styled(
                    "Could not load products",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
                Line::from(reason.as_str()),
            ]);
            frame.render_widget(
                Paragraph::new(text)
                    .block(Block::default().borders(Borders::ALL))
                    .wrap(Wrap { trim: false })
                    .centered(),
                main,
            );
            render_footer(frame, format!("Enter/r Retry | {}", back_hint), footer);
            return;
        }
        Status::Loaded | Status::Empty => {
            format!("↑↓/jk Navigate | Enter Details | o Thumbnail | {}", back_hint)
        }
    };

    if state.status().is_loading() {
        let items: Vec<ListItem> = (0..state.row_count())
            .map(|_| placeholder_list_item())
            .collect();
        frame.render_widget(
            List::new(items).block(Block::default().borders(Borders::ALL)),
            main,
        );
    } else {
        let items: Vec<ListItem> = state.state.data().iter().map(product_list_item).collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, main, &mut state.list_state);
    }

    render_footer(frame, footer_text, footer);
}

fn render_no_data(frame: &mut Frame, reason: Option<&str>) {
    let area = frame.area();

    let mut lines = vec![Line::styled("No data", Style::default().bold())];
    if let Some(reason) = reason {
        lines.push(Line::from(""));
        lines.push(Line::styled(reason, Style::default().fg(Color::DarkGray)));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "Press Enter or r to retry, Esc to go back",
        Style::default().fg(Color::DarkGray),
    ));

    let height = lines.len() as u16;
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let [center] = vertical.areas(area);
    frame.render_widget(Paragraph::new(Text::from(lines)).centered(), center);
}

fn render_detail(frame: &mut Frame, state: &DetailScreen, back_hint: &str) {
    match state.status() {
        Status::Idle | Status::Loading => {
            return render_loading(frame, &format!("Loading product {}...", state.id()));
        }
        Status::Empty => return render_no_data(frame, None),
        Status::Failed(reason) => return render_no_data(frame, Some(reason.as_str())),
        Status::Loaded => {}
    }

    let area = frame.area();
    let carousel = state.carousel();
    let carousel_height = if carousel.slides().is_empty() { 0 } else { 4 };

    let [header, images, main, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(carousel_height),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new("Product Details")
            .style(Style::default().bold())
            .centered(),
        header,
    );

    if let Some(current) = carousel.current() {
        let dots: Vec<Span> = (0..carousel.slides().len())
            .map(|i| {
                if i == carousel.index() {
                    Span::styled("● ", Style::default().fg(Color::White))
                } else {
                    Span::styled("○ ", Style::default().fg(Color::Gray))
                }
            })
            .collect();
        let text = Text::from(vec![
            Line::from(vec![
                Span::raw(format!(
                    "‹ {}/{} ›  ",
                    carousel.index() + 1,
                    carousel.slides().len()
                )),
                Span::raw(current),
            ]),
            Line::from(dots).centered(),
        ]);
        frame.render_widget(
            Paragraph::new(text).block(
                Block::default()
                    .borders(Borders::ALL)
                    .style(Style::default().bg(CAROUSEL_BACKGROUND).fg(Color::White)),
            ),
            images,
        );
    }

    let detail = state.detail();
    let mut lines: Vec<Line> = Vec::new();

    if !state.chips().is_empty() {
        let mut spans = vec![Span::styled("Keywords  ", Style::default().bold())];
        for chip in state.chips() {
            spans.push(Span::styled(
                format!(" {} ", chip.label),
                Style::default().bg(chip.color).fg(Color::Black),
            ));
            spans.push(Span::raw(" "));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }

    let label_width = detail
        .listed_fields()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);
    for (key, value) in detail.listed_fields() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$}  ", key, width = label_width),
                Style::default().bold(),
            ),
            Span::raw(display_value(value)),
        ]));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        main,
    );

    render_footer(
        frame,
        format!(
            "←→/hl Slide | n/p Next/prev product | o Open image | {}",
            back_hint
        ),
        footer,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::PLACEHOLDER_ROWS;
    use crate::state::Ticket;
    use expect_test::expect;
    use serde_json::json;
    use sfhelper_catalog::{FetchError, ProductDetail, ProductPage};
    use std::path::PathBuf;

    // ====================================================================
    // Fixture helpers
    // ====================================================================

    /// Create an App whose fetches can never succeed; tests feed responses
    /// in by hand through `receive`.
    fn make_app(path: &str) -> App {
        App::new(
            CatalogSource::Local(PathBuf::from("/nonexistent/catalog")),
            path,
            TuiOptions::default(),
        )
    }

    fn product(id: u64, title: &str) -> ProductSummary {
        ProductSummary {
            id,
            title: title.to_string(),
            description: format!("About {}", title),
            thumbnail: format!("https://cdn.example/{}.png", id),
            price: 9.99,
            stock: 5,
            rating: 4.5,
            availability_status: "Low Stock".to_string(),
        }
    }

    fn page(products: Vec<ProductSummary>) -> ProductPage {
        ProductPage {
            products,
            ..Default::default()
        }
    }

    fn sample_detail() -> ProductDetail {
        ProductDetail::from(json!({
            "id": 1,
            "title": "A",
            "images": ["u1", "u2"],
            "tags": ["x", "x", "y"]
        }))
    }

    fn listing(app: &App) -> &ListingScreen {
        match &app.screen {
            Screen::Listing(state) => state,
            _ => panic!("Expected Listing screen"),
        }
    }

    fn detail(app: &App) -> &DetailScreen {
        match &app.screen {
            Screen::Detail(state) => state,
            _ => panic!("Expected Detail screen"),
        }
    }

    fn pending_ticket(app: &App) -> Ticket {
        match &app.screen {
            Screen::Listing(state) => state.state.pending(),
            Screen::Detail(state) => state.state.pending(),
            Screen::Blank => None,
        }
        .expect("screen should be waiting for a response")
    }

    fn deliver_list(app: &mut App, ticket: Ticket, result: Result<ProductPage, FetchError>) {
        app.receive(
            FetchResponse {
                ticket,
                outcome: FetchOutcome::List(result),
            },
            Instant::now(),
        );
    }

    fn deliver_detail(app: &mut App, ticket: Ticket, result: Result<ProductDetail, FetchError>) {
        app.receive(
            FetchResponse {
                ticket,
                outcome: FetchOutcome::Detail(result),
            },
            Instant::now(),
        );
    }

    fn network_error() -> FetchError {
        FetchError::Status {
            url: "https://dummyjson.com/products/1".to_string(),
            status: 503,
        }
    }

    fn loaded_listing_app() -> App {
        let mut app = make_app("/products");
        let ticket = pending_ticket(&app);
        deliver_list(
            &mut app,
            ticket,
            Ok(page(vec![product(1, "Apple"), product(2, "Banana")])),
        );
        app
    }

    fn loaded_detail_app() -> App {
        let mut app = make_app("/product-details/1");
        let ticket = pending_ticket(&app);
        deliver_detail(&mut app, ticket, Ok(sample_detail()));
        app
    }

    // ====================================================================
    // Routing and responses
    // ====================================================================

    #[test]
    fn start_path_selects_screen() {
        assert!(listing(&make_app("/products")).status().is_loading());
        assert_eq!(detail(&make_app("/product-details/7")).id(), "7");
        assert!(matches!(make_app("/nowhere").screen, Screen::Blank));
    }

    #[test]
    fn listing_enter_follows_link_to_detail() {
        let mut app = loaded_listing_app();
        app.handle_key(KeyCode::Char('j'));
        app.handle_key(KeyCode::Enter);

        assert_eq!(detail(&app).id(), "2");
        assert!(detail(&app).status().is_loading());
        assert_eq!(app.path, "/product-details/2");
        assert_eq!(app.history, ["/products"]);
    }

    #[test]
    fn listing_response_after_leaving_is_ignored() {
        let mut app = make_app("/products");
        let list_ticket = pending_ticket(&app);
        app.navigate("/product-details/3".to_string());

        deliver_list(&mut app, list_ticket, Ok(page(vec![product(1, "Apple")])));
        assert!(detail(&app).status().is_loading());
    }

    #[test]
    fn detail_esc_goes_back_and_remounts_listing() {
        let mut app = loaded_listing_app();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Esc);

        assert!(listing(&app).status().is_loading());
        assert_eq!(listing(&app).row_count(), PLACEHOLDER_ROWS);
        assert!(app.history.is_empty());
        assert!(!app.should_quit);
    }

    #[test]
    fn esc_without_history_quits() {
        let mut app = loaded_detail_app();
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn q_quits_everywhere() {
        for path in ["/products", "/product-details/1", "/nowhere"] {
            let mut app = make_app(path);
            app.handle_key(KeyCode::Char('q'));
            assert!(app.should_quit, "q should quit on {path}");
        }
    }

    #[test]
    fn detail_id_change_discards_older_response() {
        let mut app = make_app("/product-details/1");
        let first = pending_ticket(&app);

        app.handle_key(KeyCode::Char('n'));
        let second = pending_ticket(&app);
        assert!(second > first);
        assert_eq!(app.path, "/product-details/2");

        // The response for id 1 lands after the switch and must not show.
        deliver_detail(&mut app, first, Ok(sample_detail()));
        assert!(detail(&app).status().is_loading());

        let record = ProductDetail::from(json!({"id": 2, "title": "B"}));
        deliver_detail(&mut app, second, Ok(record));
        assert_eq!(detail(&app).detail().title(), Some("B"));
    }

    #[test]
    fn detail_settles_exactly_once() {
        let mut app = make_app("/product-details/1");
        let ticket = pending_ticket(&app);

        deliver_detail(&mut app, ticket, Ok(ProductDetail::from(json!({}))));
        assert_eq!(*detail(&app).status(), Status::Empty);

        deliver_detail(&mut app, ticket, Ok(sample_detail()));
        assert_eq!(*detail(&app).status(), Status::Empty);
    }

    #[test]
    fn listing_failure_retries_with_new_ticket() {
        let mut app = make_app("/products");
        let first = pending_ticket(&app);
        deliver_list(&mut app, first, Err(network_error()));
        assert!(matches!(listing(&app).status(), Status::Failed(_)));

        app.handle_key(KeyCode::Char('r'));
        assert!(listing(&app).status().is_loading());
        assert!(pending_ticket(&app) > first);
    }

    #[test]
    fn detail_failure_retry_keeps_id() {
        let mut app = make_app("/product-details/9");
        let ticket = pending_ticket(&app);
        deliver_detail(&mut app, ticket, Err(network_error()));

        app.handle_key(KeyCode::Enter);
        assert!(detail(&app).status().is_loading());
        assert_eq!(detail(&app).id(), "9");
    }

    #[test]
    fn detail_o_opens_current_slide() {
        let mut app = loaded_detail_app();
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Char('o'));

        let Some(PendingAction::OpenUrl { url }) = &app.pending_action else {
            panic!("expected an OpenUrl action");
        };
        assert_eq!(url, "u2");
    }

    #[test]
    fn listing_o_opens_thumbnail() {
        let mut app = loaded_listing_app();
        app.handle_key(KeyCode::Char('o'));
        let Some(PendingAction::OpenUrl { url }) = &app.pending_action else {
            panic!("expected an OpenUrl action");
        };
        assert_eq!(url, "https://cdn.example/1.png");
    }

    #[test]
    fn tick_advances_carousel_only_when_loaded() {
        let mut app = loaded_detail_app();
        let later = Instant::now() + Duration::from_secs(10);
        app.tick(later);
        assert_eq!(detail(&app).carousel().index(), 1);
    }

    // ====================================================================
    // Rendering
    // ====================================================================

    /// Helper: render into an in-memory terminal and return the buffer content
    /// as a string (one line per row, padded with spaces).
    fn render_to_string(app: &mut App, width: u16, height: u16) -> String {
        use ratatui::Terminal;
        use ratatui::backend::TestBackend;

        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal.backend().to_string()
    }

    #[test]
    fn render_listing_loading_shows_ten_placeholders() {
        let mut app = make_app("/products");
        let output = render_to_string(&mut app, 80, 60);
        assert!(output.contains("Loading products..."), "{output}");
        let skeleton_rows = output
            .lines()
            .filter(|line| line.contains(&"░".repeat(56)))
            .count();
        assert_eq!(skeleton_rows, PLACEHOLDER_ROWS, "{output}");
    }

    #[test]
    fn render_listing_loaded_rows() {
        let mut app = loaded_listing_app();
        let output = render_to_string(&mut app, 80, 20);
        assert!(output.contains("Apple  /product-details/1"), "{output}");
        assert!(output.contains("Banana  /product-details/2"), "{output}");
        assert!(output.contains("★ 4.5   5 (Low Stock)   9.99 $"), "{output}");
        assert!(!output.contains("░"), "{output}");
        assert!(!output.contains("Loading"), "{output}");
    }

    #[test]
    fn render_listing_highlights_selected_row() {
        let mut app = loaded_listing_app();
        app.handle_key(KeyCode::Char('j'));

        let output = render_to_string(&mut app, 80, 20);
        assert!(output.contains("> Banana  /product-details/2"), "{output}");
        assert!(!output.contains("> Apple"), "{output}");
    }

    #[test]
    fn render_listing_empty_response_has_no_placeholders() {
        let mut app = make_app("/products");
        let ticket = pending_ticket(&app);
        deliver_list(&mut app, ticket, Ok(page(vec![])));

        let output = render_to_string(&mut app, 60, 12);
        assert!(output.contains("Product List"), "{output}");
        assert!(!output.contains("░"), "{output}");
    }

    #[test]
    fn render_listing_failure() {
        let mut app = make_app("/products");
        let ticket = pending_ticket(&app);
        deliver_list(&mut app, ticket, Err(network_error()));

        let output = render_to_string(&mut app, 80, 12);
        assert!(output.contains("Could not load products"), "{output}");
        assert!(output.contains("returned status 503"), "{output}");
        assert!(output.contains("Enter/r Retry"), "{output}");
        assert!(!output.contains("░"), "{output}");
    }

    #[test]
    fn render_detail_loading() {
        let mut app = make_app("/product-details/4");
        let output = render_to_string(&mut app, 40, 5);
        expect![[r#"
            "                                        "
            "                                        "
            "          Loading product 4...          "
            "                                        "
            "                                        "
        "#]]
        .assert_eq(&output);
    }

    #[test]
    fn render_detail_empty_record() {
        let mut app = make_app("/product-details/1");
        let ticket = pending_ticket(&app);
        deliver_detail(&mut app, ticket, Ok(ProductDetail::from(json!({}))));

        let output = render_to_string(&mut app, 50, 5);
        expect![[r#"
            "                                                  "
            "                      No data                     "
            "                                                  "
            "     Press Enter or r to retry, Esc to go back    "
            "                                                  "
        "#]]
        .assert_eq(&output);
    }

    #[test]
    fn render_detail_failure_shows_no_data() {
        let mut app = make_app("/product-details/1");
        let ticket = pending_ticket(&app);
        deliver_detail(&mut app, ticket, Err(network_error()));

        let output = render_to_string(&mut app, 80, 9);
        assert!(output.contains("No data"), "{output}");
        assert!(output.contains("returned status 503"), "{output}");
        assert!(!output.contains("Loading"), "{output}");
    }

    #[test]
    fn render_detail_loaded() {
        let mut app = loaded_detail_app();
        let output = render_to_string(&mut app, 70, 14);

        assert!(output.contains("Product Details"), "{output}");
        assert!(output.contains("‹ 1/2 ›  u1"), "{output}");
        assert_eq!(output.matches(" x ").count(), 1, "{output}");
        assert_eq!(output.matches(" y ").count(), 1, "{output}");
        assert!(output.contains("id     1"), "{output}");
        assert!(output.contains("title  A"), "{output}");
        assert!(!output.contains("images"), "{output}");
        assert!(!output.contains("tags"), "{output}");
    }

    #[test]
    fn render_blank_route_draws_nothing() {
        let mut app = make_app("/nowhere");
        let output = render_to_string(&mut app, 20, 3);
        expect![[r#"
            "                    "
            "                    "
            "                    "
        "#]]
        .assert_eq(&output);
    }
}
