use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine, Points, Rectangle};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use lineup_terminal::api_config::ApiConfig;
use lineup_terminal::feed::spawn_provider;
use lineup_terminal::field::{FIELD_HEIGHT, FIELD_WIDTH, FieldLayout};
use lineup_terminal::panel::{Gesture, PanelPhase, Tab};
use lineup_terminal::player::Position;
use lineup_terminal::radar::{Point, RadarChart, polygon_edges};
use lineup_terminal::roster::{RosterAction, RosterRow};
use lineup_terminal::sample_roster::auto_lineup;
use lineup_terminal::state::{
    self, AppState, CatalogOrigin, GameRole, ProviderCommand, apply_delta,
};
use lineup_terminal::team_stats::{EMPTY_STATS_MESSAGE, TeamAbilities, TeamReport};

/// Panel units per terminal row; drag thresholds are expressed in these units.
const UNITS_PER_ROW: f64 = 16.0;
const IDLE_TICK: Duration = Duration::from_millis(250);
const ANIMATION_TICK: Duration = Duration::from_millis(16);
const ICON_HIT_RADIUS: f64 = 0.07;

const GRASS: Color = Color::Rgb(46, 125, 50);
const GRASS_DARK: Color = Color::Rgb(38, 104, 42);
const DIRT: Color = Color::Rgb(181, 136, 99);
const CHALK: Color = Color::White;

#[derive(Debug, Clone, Copy, Default)]
struct ScreenLayout {
    header: Rect,
    body: Rect,
    field: Rect,
    console: Rect,
    nav: [Rect; 3],
    footer: Rect,
    panel_rows: u16,
}

fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);
    let body = chunks[1];
    let body_parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(5)])
        .split(body);
    let nav = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[2]);

    ScreenLayout {
        header: chunks[0],
        body,
        field: body_parts[0],
        console: body_parts[1],
        nav: [nav[0], nav[1], nav[2]],
        footer: chunks[3],
        panel_rows: (body.height * 3 / 4).max(4),
    }
}

/// Visible slice of the panel, anchored to the bottom of the body.
fn panel_rect(layout: &ScreenLayout, open_fraction: f64) -> Option<Rect> {
    let rows = (layout.panel_rows as f64 * open_fraction).round() as u16;
    let rows = rows.min(layout.body.height);
    if rows == 0 {
        return None;
    }
    Some(Rect {
        x: layout.body.x,
        y: layout.body.y + layout.body.height - rows,
        width: layout.body.width,
        height: rows,
    })
}

fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

/// First list index to draw so that `cursor` stays on screen.
fn scroll_start(cursor: usize, len: usize, visible: usize) -> usize {
    if visible == 0 || cursor < visible {
        return 0;
    }
    (cursor + 1 - visible).min(len.saturating_sub(visible))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MouseGesture {
    Idle,
    /// Pressed on a nav tab; becomes a drag if the pointer moves vertically.
    NavPress { tab: Tab, row: u16, at_ms: f64 },
    Dragging { last_row: u16 },
}

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    started: Instant,
    layout: ScreenLayout,
    mouse: MouseGesture,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, area: Rect) -> Self {
        let layout = screen_layout(area);
        Self {
            state: AppState::new(layout.panel_rows as f64 * UNITS_PER_ROW),
            should_quit: false,
            cmd_tx,
            started: Instant::now(),
            layout,
            mouse: MouseGesture::Idle,
        }
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn sync_layout(&mut self, area: Rect) {
        self.layout = screen_layout(area);
        let extent = self.layout.panel_rows as f64 * UNITS_PER_ROW;
        if (self.state.panel.extent() - extent).abs() > f64::EPSILON {
            self.state.panel.resize(extent);
        }
    }

    fn panel_rect(&self) -> Option<Rect> {
        panel_rect(&self.layout, self.state.panel.open_fraction())
    }

    /// Tab whose content is currently on screen.
    fn shown_tab(&self) -> Option<Tab> {
        if self.state.panel.is_visible() {
            self.state.active_tab()
        } else {
            None
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else if self.shown_tab() == Some(Tab::Roster)
                    && self.state.roster.expanded().is_some()
                {
                    let st = &mut self.state;
                    st.roster.collapse(&st.catalog);
                } else if matches!(
                    self.state.panel.phase(),
                    PanelPhase::Open | PanelPhase::Opening
                ) {
                    let now = self.now_ms();
                    self.state.panel.close(now);
                }
            }
            KeyCode::Char('1') => self.select_tab(Tab::Album),
            KeyCode::Char('2') => self.select_tab(Tab::Roster),
            KeyCode::Char('3') => self.select_tab(Tab::Stats),
            KeyCode::Char(' ') => self.toggle_panel(),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::PageDown => self.move_cursor(5),
            KeyCode::PageUp => self.move_cursor(-5),
            KeyCode::Enter => self.activate(),
            KeyCode::Char('c') | KeyCode::Backspace | KeyCode::Delete => self.clear_current(),
            KeyCode::Char('C') => {
                self.state.roster.clear_all();
                self.state.album_cursor = 0;
                self.state.simulation = None;
                self.state.push_log("[INFO] Lineup cleared");
            }
            KeyCode::Char('a') => self.auto_fill(),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('g') => self.request_recent_games(),
            KeyCode::Char('x') => self.request_simulation(),
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        let now = self.now_ms();
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(tab) = self.nav_tab_at(col, row) {
                    self.mouse = MouseGesture::NavPress {
                        tab,
                        row,
                        at_ms: now,
                    };
                } else if let Some(rect) = self.panel_rect()
                    && contains(rect, col, row)
                {
                    if row == rect.y {
                        self.state.panel.drag_start(now);
                        self.mouse = MouseGesture::Dragging { last_row: row };
                    } else {
                        self.click_panel(rect, row);
                    }
                } else if contains(self.layout.field, col, row) {
                    self.click_field(col, row);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => match self.mouse {
                MouseGesture::NavPress {
                    row: start, at_ms, ..
                } if row != start => {
                    self.state.panel.drag_start(at_ms);
                    let dy = row as f64 - start as f64;
                    self.state.panel.drag_move(dy * UNITS_PER_ROW, now);
                    self.mouse = MouseGesture::Dragging { last_row: row };
                }
                MouseGesture::Dragging { last_row } => {
                    let dy = row as f64 - last_row as f64;
                    self.state.panel.drag_move(dy * UNITS_PER_ROW, now);
                    self.mouse = MouseGesture::Dragging { last_row: row };
                }
                _ => {}
            },
            MouseEventKind::Up(MouseButton::Left) => {
                match std::mem::replace(&mut self.mouse, MouseGesture::Idle) {
                    MouseGesture::NavPress { tab, .. } => self.select_tab(tab),
                    MouseGesture::Dragging { .. } => self.state.panel.drag_end(now),
                    MouseGesture::Idle => {}
                }
            }
            MouseEventKind::ScrollDown => self.move_cursor(1),
            MouseEventKind::ScrollUp => self.move_cursor(-1),
            _ => {}
        }
    }

    fn nav_tab_at(&self, col: u16, row: u16) -> Option<Tab> {
        self.layout
            .nav
            .iter()
            .zip(Tab::ALL)
            .find(|(rect, _)| contains(**rect, col, row))
            .map(|(_, tab)| tab)
    }

    fn select_tab(&mut self, tab: Tab) {
        let now = self.now_ms();
        self.state.panel.select_tab(tab, now);
        if tab == Tab::Album {
            self.state.move_album_cursor(0);
        }
    }

    fn toggle_panel(&mut self) {
        let now = self.now_ms();
        match self.state.panel.phase() {
            PanelPhase::Open | PanelPhase::Opening => self.state.panel.close(now),
            PanelPhase::Closed | PanelPhase::Closing => self.state.panel.open(now, 0.0),
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let tab = self.shown_tab();
        let st = &mut self.state;
        match tab {
            Some(Tab::Roster) => st.roster.move_cursor(delta, &st.catalog),
            Some(Tab::Album) => st.move_album_cursor(delta),
            _ => {}
        }
    }

    fn activate(&mut self) {
        if self.shown_tab() != Some(Tab::Roster) {
            return;
        }
        let st = &mut self.state;
        let action = st.roster.activate(&st.catalog);
        if let RosterAction::Selected(pos, player) = action {
            self.state
                .push_log(format!("[INFO] {} -> {}", pos.label(), player.name));
            if self.state.catalog_origin == Some(CatalogOrigin::Api) {
                self.send(
                    ProviderCommand::FetchPlayerDetail {
                        player_id: player.id,
                    },
                    "Player detail",
                );
            }
        }
    }

    fn clear_current(&mut self) {
        let position = match self.shown_tab() {
            Some(Tab::Roster) => match self.state.roster.current_row(&self.state.catalog) {
                Some(RosterRow::Header(pos)) | Some(RosterRow::Candidate(pos, _)) => Some(pos),
                None => None,
            },
            Some(Tab::Album) => self.state.album_selected().map(|(pos, _)| pos),
            _ => None,
        };
        let Some(position) = position else {
            return;
        };
        if let Some(player) = self.state.roster.clear(position) {
            self.state
                .push_log(format!("[INFO] Cleared {} ({})", position.label(), player.name));
            self.state.move_album_cursor(0);
        }
    }

    fn auto_fill(&mut self) {
        let picks = auto_lineup(&self.state.catalog);
        let mut filled = 0;
        for (pos, player) in picks {
            if self.state.roster.selected_for(pos).is_none() {
                self.state.roster.select(pos, player);
                filled += 1;
            }
        }
        self.state
            .push_log(format!("[INFO] Auto-filled {filled} open positions"));
    }

    fn refresh(&mut self) {
        let expanded = self.state.roster.expanded();
        let by_position = self.shown_tab() == Some(Tab::Roster)
            && self.state.catalog_origin == Some(CatalogOrigin::Api);
        match expanded {
            Some(position) if by_position => {
                if self.send(ProviderCommand::FetchPosition { position }, "Position refresh") {
                    self.state
                        .push_log(format!("[INFO] Refreshing {}", position.label()));
                }
            }
            _ => {
                if self.send(ProviderCommand::FetchCatalog, "Player list") {
                    self.state.catalog_loading = true;
                    self.state.push_log("[INFO] Player list request sent");
                }
            }
        }
    }

    fn request_recent_games(&mut self) {
        let Some((pos, player)) = self.state.album_selected() else {
            self.state
                .push_log("[INFO] Pick a lineup card in the Album tab first");
            return;
        };
        let name = player.name.clone();
        if self.state.recent_loading.contains(&name) {
            return;
        }
        let cmd = ProviderCommand::FetchRecentGames {
            player_name: name.clone(),
            role: GameRole::for_position(pos),
        };
        if self.send(cmd, "Recent games") {
            self.state.recent_loading.insert(name);
        }
    }

    fn request_simulation(&mut self) {
        if self.state.simulating {
            return;
        }
        let Some((batter, pitcher)) = self.state.matchup() else {
            self.state
                .push_log("[INFO] Highlight a batter and select a pitcher to simulate");
            return;
        };
        if self.send(ProviderCommand::SimulateAtBat { batter, pitcher }, "Simulation") {
            self.state.simulating = true;
        }
    }

    fn click_panel(&mut self, rect: Rect, row: u16) {
        // Inside the border.
        let Some(line) = row.checked_sub(rect.y + 1) else {
            return;
        };
        let line = line as usize;
        let inner_height = rect.height.saturating_sub(2) as usize;
        match self.shown_tab() {
            Some(Tab::Roster) => {
                let notice = usize::from(roster_notice(&self.state).is_some());
                let Some(idx) = line.checked_sub(notice) else {
                    return;
                };
                let len = self.state.roster.rows(&self.state.catalog).len();
                let visible = inner_height.saturating_sub(notice);
                let start = scroll_start(self.state.roster.cursor, len, visible);
                if start + idx < len {
                    self.state.roster.cursor = start + idx;
                    self.activate();
                }
            }
            Some(Tab::Album) => {
                if line < self.state.roster.selected_count() {
                    self.state.album_cursor = line;
                }
            }
            _ => {}
        }
    }

    fn click_field(&mut self, col: u16, row: u16) {
        let area = self.layout.field;
        let x = ((col - area.x) as f64 + 0.5) / area.width.max(1) as f64 * FIELD_WIDTH;
        let y = (1.0 - ((row - area.y) as f64 + 0.5) / area.height.max(1) as f64) * FIELD_HEIGHT;
        let Some(position) = FieldLayout::default().hit_test(Point::new(x, y), ICON_HIT_RADIUS)
        else {
            return;
        };

        let roster_open = self.state.active_tab() == Some(Tab::Roster)
            && matches!(
                self.state.panel.phase(),
                PanelPhase::Open | PanelPhase::Opening
            );
        if !roster_open {
            self.select_tab(Tab::Roster);
        }
        let st = &mut self.state;
        if st.roster.expanded() != Some(position) {
            st.roster.toggle(position);
        }
        st.roster.cursor_to_header(Some(position), &st.catalog);
    }

    fn send(&mut self, cmd: ProviderCommand, what: &str) -> bool {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {what} unavailable"));
            return false;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {what} request failed"));
            return false;
        }
        true
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let cfg = ApiConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(cfg, tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx), terminal.size()?);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.sync_layout(terminal.size()?);
        let now = app.now_ms();
        app.state.panel.tick(now);

        terminal.draw(|f| ui(f, app))?;

        let busy = app.state.panel.is_animating() || app.state.panel.gesture() == Gesture::Dragging;
        let timeout = if busy { ANIMATION_TICK } else { IDLE_TICK };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let layout = &app.layout;

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, layout.header);

    render_field(frame, layout.field, &app.state);
    render_console(frame, layout.console, &app.state);
    if let Some(rect) = app.panel_rect() {
        render_panel(frame, rect, &app.state);
    }
    render_nav(frame, layout, &app.state);

    let footer = Paragraph::new(footer_text(app.shown_tab()))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, layout.footer);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let source = match (state.catalog_loading, state.catalog_origin) {
        (true, _) => "loading".to_string(),
        (false, Some(origin)) => format!("{} ({} players)", origin.label(), state.catalog.len()),
        (false, None) => "offline".to_string(),
    };
    let report = state.report();
    let line1 = format!(
        "  .-.  LINEUP MAKER | Source: {source} | {}/9 selected",
        state.roster.selected_count()
    );
    let line2 = if report.stats.has_data() {
        format!(
            " (   ) Expected win rate {:.1}% | {}",
            report.win_rate * 100.0,
            report.traits
        )
    } else {
        " (   )".to_string()
    };
    let line3 = "  '-'".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(tab: Option<Tab>) -> String {
    match tab {
        Some(Tab::Roster) => {
            "j/k Move | Enter Expand/Pick | Esc Collapse/Close | c Clear | C Clear all | a Auto-fill | r Refresh | ? Help | q Quit".to_string()
        }
        Some(Tab::Stats) => "1 Album | 2 Roster | 3 Stats | Esc Close | ? Help | q Quit".to_string(),
        Some(Tab::Album) => {
            "j/k Move | g Recent games | x Simulate at-bat | c Remove | Esc Close | ? Help | q Quit".to_string()
        }
        None => {
            "1 Album | 2 Roster | 3 Stats | Space Panel | click a position | drag the tabs up | ? Help | q Quit".to_string()
        }
    }
}

fn render_field(frame: &mut Frame, area: Rect, state: &AppState) {
    let layout = FieldLayout::default();
    let cols = area.width.max(1) as f64;
    let rows = area.height.max(1) as f64;
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .background_color(GRASS)
        .x_bounds([0.0, FIELD_WIDTH])
        .y_bounds([0.0, FIELD_HEIGHT])
        .paint(|ctx| {
            paint_stripes(ctx, &layout, cols);
            ctx.layer();
            paint_infield(ctx, &layout, rows);
            ctx.layer();
            paint_icons(ctx, &layout, state, cols);
        });
    frame.render_widget(canvas, area);
}

fn paint_stripes(ctx: &mut Context, layout: &FieldLayout, cols: f64) {
    // Braille gives two dots per column.
    let dot = FIELD_WIDTH / (cols * 2.0);
    for stripe in layout.mower_stripes() {
        let steps = (stripe.width / dot).ceil().max(1.0) as usize;
        for i in 0..steps {
            let x = stripe.x + i as f64 * dot;
            ctx.draw(&CanvasLine {
                x1: x,
                y1: stripe.y,
                x2: x,
                y2: stripe.y + stripe.height,
                color: GRASS_DARK,
            });
        }
    }
}

fn paint_infield(ctx: &mut Context, layout: &FieldLayout, rows: f64) {
    let dot = FIELD_HEIGHT / (rows * 4.0);
    fill_diamond(ctx, layout.infield_dirt(), DIRT, dot);
    fill_diamond(ctx, layout.infield_grass(), GRASS, dot);

    let home = layout.home_plate();
    for (dx, edge) in [(1.0, FIELD_WIDTH), (-1.0, 0.0)] {
        // Foul lines run at 45 degrees from home plate to the field edge.
        let run = (edge - home.x).abs();
        ctx.draw(&CanvasLine {
            x1: home.x,
            y1: home.y,
            x2: home.x + dx * run,
            y2: home.y + run,
            color: CHALK,
        });
    }

    let (mound, radius) = layout.mound();
    let mut r = radius;
    while r > 0.0 {
        ctx.draw(&Circle {
            x: mound.x,
            y: mound.y,
            radius: r,
            color: DIRT,
        });
        r -= dot;
    }
    ctx.draw(&CanvasLine {
        x1: mound.x - radius * 0.3,
        y1: mound.y,
        x2: mound.x + radius * 0.3,
        y2: mound.y,
        color: CHALK,
    });

    for b in layout.batters_boxes() {
        ctx.draw(&Rectangle {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
            color: CHALK,
        });
    }

    let base = 0.018;
    for p in layout.bases() {
        ctx.draw(&Rectangle {
            x: p.x - base / 2.0,
            y: p.y - base / 2.0,
            width: base,
            height: base,
            color: CHALK,
        });
    }
    ctx.draw(&Points {
        coords: &[(home.x, home.y)],
        color: CHALK,
    });
}

fn fill_diamond(ctx: &mut Context, corners: [Point; 4], color: Color, dot: f64) {
    let [bottom, right, top, _] = corners;
    let cx = bottom.x;
    let cy = (bottom.y + top.y) / 2.0;
    let r = right.x - cx;
    let mut y = bottom.y;
    while y <= top.y {
        let half = r - (y - cy).abs();
        ctx.draw(&CanvasLine {
            x1: cx - half,
            y1: y,
            x2: cx + half,
            y2: y,
            color,
        });
        y += dot;
    }
}

fn paint_icons(ctx: &mut Context, layout: &FieldLayout, state: &AppState, cols: f64) {
    for pos in Position::ALL {
        let at = layout.icon_position(pos);
        let span = match state.roster.selected_for(pos) {
            Some(player) => Span::styled(
                format!(" {} {} ", player.number_label(), player.short_name()),
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ),
            None => Span::styled(
                format!(" {} ", pos.abbr()),
                Style::default().fg(Color::Black).bg(Color::Gray),
            ),
        };
        let width = span.width() as f64 / cols * FIELD_WIDTH;
        ctx.print((at.x - width / 2.0).max(0.0), at.y, span);
    }
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = area.height.saturating_sub(2) as usize;
    let console = Paragraph::new(console_text(state, visible))
        .block(Block::default().title("Console").borders(Borders::ALL))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(console, area);
}

fn console_text(state: &AppState, lines: usize) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(lines);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_nav(frame: &mut Frame, layout: &ScreenLayout, state: &AppState) {
    let open = matches!(
        state.panel.phase(),
        PanelPhase::Open | PanelPhase::Opening
    );
    for (i, (rect, tab)) in layout.nav.iter().zip(Tab::ALL).enumerate() {
        let active = open && state.active_tab() == Some(tab);
        let style = if active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let item = Paragraph::new(format!("{} {}", i + 1, tab.label()))
            .alignment(Alignment::Center)
            .style(style)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(item, *rect);
    }
}

fn render_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    frame.render_widget(Clear, area);
    let tab = state.active_tab().unwrap_or(Tab::Roster);
    let block = Block::default()
        .title(format!(" == {} == ", tab.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }
    match tab {
        Tab::Roster => render_roster(frame, inner, state),
        Tab::Stats => render_stats(frame, inner, state),
        Tab::Album => render_album(frame, inner, state),
    }
}

fn roster_notice(state: &AppState) -> Option<Line<'static>> {
    if let Some(err) = &state.catalog_error {
        let suffix = if state.catalog_origin == Some(CatalogOrigin::Sample) {
            " (showing sample roster)"
        } else {
            ""
        };
        return Some(Line::styled(
            format!("Player list unavailable: {err}{suffix}"),
            Style::default().fg(Color::Red),
        ));
    }
    if state.catalog_loading {
        return Some(Line::styled(
            "Loading players...",
            Style::default().fg(Color::DarkGray),
        ));
    }
    None
}

fn render_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut lines = Vec::new();
    let notice = roster_notice(state);
    let notice_rows = usize::from(notice.is_some());
    lines.extend(notice);

    let rows = state.roster.rows(&state.catalog);
    let visible = (area.height as usize).saturating_sub(notice_rows);
    let start = scroll_start(state.roster.cursor, rows.len(), visible);
    for (idx, row) in rows.iter().enumerate().skip(start).take(visible) {
        let mut line = roster_line(state, *row);
        if idx == state.roster.cursor {
            line = line.patch_style(Style::default().add_modifier(Modifier::REVERSED));
        }
        lines.push(line);
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn roster_line(state: &AppState, row: RosterRow) -> Line<'static> {
    match row {
        RosterRow::Header(pos) => {
            let marker = if state.roster.expanded() == Some(pos) {
                "v"
            } else {
                ">"
            };
            let pick = state
                .roster
                .selected_for(pos)
                .map(|p| format!("{} {}", p.number_label(), p.name))
                .unwrap_or_else(|| "(empty)".to_string());
            Line::from(vec![
                Span::raw(format!("{marker} {:<3}", pos.abbr())),
                Span::styled(
                    format!("{:<13}", pos.label()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("{pick}  ")),
                Span::styled(
                    format!("[{}]", state.candidates(pos).count()),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        RosterRow::Candidate(pos, idx) => {
            let Some(player) = state.catalog.get(idx) else {
                return Line::from("");
            };
            let chosen = state.roster.selected_for(pos).map(|p| p.id) == Some(player.id);
            let mark = if chosen { "*" } else { " " };
            let style = if chosen {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            Line::styled(
                format!(
                    "   {mark} {:<5}{}  {}  {}",
                    player.number_label(),
                    player.name,
                    player.team,
                    player.headline_stats()
                ),
                style,
            )
        }
    }
}

fn render_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let report = state.report();
    if !report.stats.has_data() {
        let empty = Paragraph::new(EMPTY_STATS_MESSAGE)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let text = Paragraph::new(stats_lines(&report)).wrap(Wrap { trim: false });
    frame.render_widget(text, cols[0]);
    render_radar(frame, cols[1], &report);
}

fn stats_lines(report: &TeamReport) -> Vec<Line<'static>> {
    let s = &report.stats;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::styled(format!("Batting ({} players)", s.batter_count), bold),
        Line::from(format!(
            "  AVG {:.3}  RBI {:.1}  HR {:.1}  SB {:.1}",
            s.batting_avg, s.rbis, s.home_runs, s.stolen_bases
        )),
    ];
    if s.has_pitcher() {
        lines.push(Line::styled("Pitching", bold));
        lines.push(Line::from(format!(
            "  ERA {:.2}  W {:.1}  L {:.1}  SV {:.1}  HLD {:.1}  SO {:.1}",
            s.era, s.wins, s.losses, s.saves, s.holds, s.strikeouts
        )));
    }
    lines.push(Line::from(""));
    for (label, value) in TeamAbilities::LABELS
        .iter()
        .zip(report.abilities.as_array())
    {
        lines.push(Line::from(vec![
            Span::raw(format!("  {label:<9}{value:>3} ")),
            Span::styled(
                "|".repeat(usize::from(value / 5)),
                Style::default().fg(Color::Yellow),
            ),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(format!("Team color: {}", report.traits)));
    lines.push(Line::styled(
        format!("Expected win rate: {:.1}%", report.win_rate * 100.0),
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(report.message));
    lines
}

fn render_radar(frame: &mut Frame, area: Rect, report: &TeamReport) {
    let chart = RadarChart::default();
    let vertices = chart.vertices(&report.abilities);
    let half = chart.size / 2.0;
    let units_per_col = chart.size / area.width.max(1) as f64;
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-half, half])
        .y_bounds([-half, half])
        .paint(|ctx| {
            for ring in chart.grid_rings() {
                for (a, b) in polygon_edges(&ring) {
                    ctx.draw(&CanvasLine {
                        x1: a.x,
                        y1: a.y,
                        x2: b.x,
                        y2: b.y,
                        color: Color::DarkGray,
                    });
                }
            }
            for end in chart.axis_ends() {
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2: end.x,
                    y2: end.y,
                    color: Color::DarkGray,
                });
            }
            ctx.layer();
            for (a, b) in polygon_edges(&vertices) {
                ctx.draw(&CanvasLine {
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                    color: Color::Yellow,
                });
            }
            for (anchor, label) in chart.label_anchors().iter().zip(TeamAbilities::LABELS) {
                let width = label.len() as f64 * units_per_col;
                ctx.print(
                    anchor.x - width / 2.0,
                    anchor.y,
                    Span::styled(label, Style::default().fg(Color::Cyan)),
                );
            }
        });
    frame.render_widget(canvas, area);
}

fn render_album(frame: &mut Frame, area: Rect, state: &AppState) {
    let entries = state.album_entries();
    if entries.is_empty() {
        let empty = Paragraph::new("No lineup yet. Pick players in the Roster tab (2).")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(entries.len() as u16 + 1),
            Constraint::Min(1),
        ])
        .split(area);

    let cards: Vec<Line> = entries
        .iter()
        .enumerate()
        .map(|(i, (pos, player))| {
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<3}", pos.abbr()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    "{:<5}{}  {}  ",
                    player.number_label(),
                    player.name,
                    player.team
                )),
                Span::styled(player.headline_stats(), Style::default().fg(Color::Cyan)),
            ]);
            if i == state.album_cursor {
                line.patch_style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                line
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(cards), parts[0]);

    let detail = Paragraph::new(album_detail_lines(state))
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, parts[1]);
}

fn album_detail_lines(state: &AppState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let dim = Style::default().fg(Color::DarkGray);

    if state.simulating {
        lines.push(Line::styled("Simulating at-bat...", dim));
    } else if let Some(sim) = &state.simulation {
        lines.push(Line::styled(
            format!("{} vs {}: {}", sim.batter, sim.pitcher, sim.result),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
        let odds = sim
            .probabilities
            .iter()
            .take(5)
            .map(|(k, p)| {
                let pct = if *p <= 1.0 { p * 100.0 } else { *p };
                format!("{k} {pct:.1}%")
            })
            .collect::<Vec<_>>()
            .join("  ");
        if !odds.is_empty() {
            lines.push(Line::styled(format!("  {odds}"), dim));
        }
    } else if let Some((batter, pitcher)) = state.matchup() {
        lines.push(Line::styled(
            format!("x: simulate {batter} vs {pitcher}"),
            dim,
        ));
    }

    let Some((_, player)) = state.album_selected() else {
        return lines;
    };
    lines.push(Line::styled(
        format!("Recent games: {}", player.name),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    if state.recent_loading.contains(&player.name) {
        lines.push(Line::styled("Loading...", dim));
        return lines;
    }
    match state.recent_games_for(&player.name) {
        None => lines.push(Line::styled("Press g to load recent games", dim)),
        Some([]) => lines.push(Line::styled("No recent games", dim)),
        Some(games) => {
            for game in games {
                lines.push(Line::from(format!(
                    "  {}  vs {}  {}",
                    game.date_label(),
                    game.opponent,
                    game.summary()
                )));
            }
        }
    }
    lines
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Lineup Maker - Help",
        "",
        "Global:",
        "  1 / 2 / 3    Album / Roster / Stats (again to close)",
        "  Space        Open or close the panel",
        "  Esc          Close panel or help",
        "  Mouse        Click tabs or field positions; drag the panel edge",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Roster:",
        "  j/k or ↑/↓   Move",
        "  Enter        Expand position / pick player",
        "  Esc          Collapse the open position list",
        "  c            Clear position",
        "  C            Clear lineup",
        "  a            Auto-fill open positions",
        "  r            Refresh players",
        "",
        "Album:",
        "  g            Load recent games",
        "  x            Simulate at-bat vs selected pitcher",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use lineup_terminal::player::Player;
    use ratatui::backend::TestBackend;

    use super::*;

    fn draw_stats(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                render_stats(f, area, state);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer.get(x, y).symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn stats_view_without_players_shows_empty_message() {
        let state = AppState::new(320.0);
        let screen = draw_stats(&state);
        assert!(screen.contains(EMPTY_STATS_MESSAGE), "{screen}");
        assert!(!screen.contains("NaN"));
        assert!(!screen.contains("AVG"));
    }

    #[test]
    fn stats_view_with_statless_players_has_no_nan() {
        let mut state = AppState::new(320.0);
        state
            .roster
            .select(Position::Left, Player::new(1, "L", "T", Position::Left));
        state
            .roster
            .select(Position::Pitcher, Player::new(2, "P", "T", Position::Pitcher));
        let screen = draw_stats(&state);
        assert!(!screen.contains(EMPTY_STATS_MESSAGE));
        assert!(!screen.contains("NaN"), "{screen}");
        assert!(screen.contains("AVG 0.000"), "{screen}");
        assert!(screen.contains("Expected win rate"), "{screen}");
    }

    #[test]
    fn scroll_keeps_cursor_visible() {
        assert_eq!(scroll_start(0, 20, 5), 0);
        assert_eq!(scroll_start(4, 20, 5), 0);
        assert_eq!(scroll_start(5, 20, 5), 1);
        assert_eq!(scroll_start(19, 20, 5), 15);
        assert_eq!(scroll_start(3, 20, 0), 0);
    }

    #[test]
    fn panel_rect_grows_from_bottom() {
        let layout = screen_layout(Rect::new(0, 0, 80, 40));
        assert!(panel_rect(&layout, 0.0).is_none());
        let full = panel_rect(&layout, 1.0).unwrap();
        assert_eq!(full.height, layout.panel_rows);
        assert_eq!(full.y + full.height, layout.body.y + layout.body.height);
        let half = panel_rect(&layout, 0.5).unwrap();
        assert!(half.height < full.height);
    }
}
