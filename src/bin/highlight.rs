use std::{
    io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use tracing::{error, info};

use highlight_tui::config::{Config, ViewConfig};
use highlight_tui::editor::{HighlightEditor, HighlightError};
use highlight_tui::editor_display::HighlightDisplay;
use highlight_tui::highlights_file::{HighlightsFile, SaveTracker, sidecar_path};
use highlight_tui::loader::{DocumentFormat, load_document};
use highlight_tui::logging::try_init_file_logging;
use highlight_tui::render::LayoutPoint;
use highlight_tui::theme::Theme;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const SNIPPET_CHARS: usize = 40;

#[derive(Parser, Debug)]
#[command(name = "highlight")]
#[command(about = "Highlight passages of a document in the terminal", long_about = None)]
struct Args {
    /// Document to open (.ftml, .md or plain text)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Highlights file (default: <FILE>.highlights.toml)
    #[arg(long, value_name = "PATH")]
    highlights: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write log events to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    run(Args::parse())
}

fn editor_wrap_configuration(width: usize, max_text_width: usize) -> (usize, usize) {
    if width == 0 {
        return (1, 0);
    }
    if width < 60 {
        let wrap_width = width.saturating_sub(1).max(1);
        return (wrap_width, 0);
    }
    if width < max_text_width {
        let padding = 2.min(width / 2);
        let wrap_width = width.saturating_sub(padding.saturating_mul(2)).max(1);
        return (wrap_width, padding);
    }
    let mut left_padding = width.saturating_sub(max_text_width) / 2 + 4;
    let max_padding = width.saturating_sub(1) / 2;
    if left_padding > max_padding {
        left_padding = max_padding;
    }
    let wrap_width = width.saturating_sub(left_padding.saturating_mul(2)).max(1);
    (wrap_width, left_padding)
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    if let Some(log_file) = args.log_file.as_ref().or(config.log.file.as_ref()) {
        try_init_file_logging(log_file, config.log.level_filter()?)?;
    }

    let (document, format) = load_document(&args.file)?;
    let highlights_path = args
        .highlights
        .clone()
        .unwrap_or_else(|| sidecar_path(&args.file));
    let editor = match HighlightsFile::load(&highlights_path, &document)? {
        Some(selections) => HighlightEditor::with_selections(document, selections)?,
        None => HighlightEditor::new(document),
    };
    info!(
        file = %args.file.display(),
        highlights = %highlights_path.display(),
        intervals = editor.selections().interval_count(),
        "opened document"
    );

    let mut app = App::new(editor, args.file, highlights_path, format, &config);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to initialize terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    while !app.should_quit() {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt);
            needs_redraw = true;
        }

        if last_tick.elapsed() >= tick_rate {
            let had_message_before = app.has_status_message();
            app.on_tick();
            last_tick = Instant::now();
            if had_message_before && !app.has_status_message() {
                needs_redraw = true;
            }
        }
    }

    Ok(())
}

struct App {
    display: HighlightDisplay,
    theme: Theme,
    view: ViewConfig,
    file_path: PathBuf,
    highlights_path: PathBuf,
    document_format: DocumentFormat,
    scroll_top: usize,
    should_quit: bool,
    saved: SaveTracker,
    status_message: Option<(String, Instant)>,
    /// Anchor and focus of the left-button drag in progress.
    drag: Option<(LayoutPoint, LayoutPoint)>,
}

impl App {
    fn new(
        mut editor: HighlightEditor,
        file_path: PathBuf,
        highlights_path: PathBuf,
        document_format: DocumentFormat,
        config: &Config,
    ) -> Self {
        let saved = SaveTracker::new(editor.selections());
        editor.set_observer(saved.observer());

        Self {
            display: HighlightDisplay::new(editor),
            theme: Theme::from_config(&config.theme),
            view: config.view.clone(),
            file_path,
            highlights_path,
            document_format,
            scroll_top: 0,
            should_quit: false,
            saved,
            status_message: None,
            drag: None,
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn has_status_message(&self) -> bool {
        self.status_message.is_some()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let text_area = vertical[0];
        let status_area = vertical[1];

        let width = text_area.width.max(1) as usize;
        let (wrap_width, left_padding) =
            editor_wrap_configuration(width, self.view.max_text_width);
        let render = self
            .display
            .render_document(wrap_width, left_padding, &self.theme, self.drag);
        self.display
            .update_after_render(text_area, render.total_lines);
        self.scroll_top = self.scroll_top.min(self.display.max_scroll());

        let paragraph = Paragraph::new(Text::from(render.lines))
            .block(Block::default().borders(Borders::NONE))
            .scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, text_area);

        let status_widget = Paragraph::new(self.status_line())
            .block(Block::default().borders(Borders::NONE))
            .style(self.theme.status_bar_style());
        frame.render_widget(status_widget, status_area);
    }

    fn status_line(&mut self) -> Line<'static> {
        self.prune_status_message();
        if let Some((message, _)) = &self.status_message {
            return Line::from(vec![Span::raw(message.clone())]);
        }

        let marker = if self.saved.is_dirty() { "*" } else { "" };
        let count = self.display.selections().interval_count();
        Line::from(vec![
            Span::styled(
                format!("{}{}", self.file_path.display(), marker),
                self.theme.filename_style(),
            ),
            Span::raw(format!(
                " [{}] {} highlight{}",
                self.document_format.label(),
                count,
                if count == 1 { "" } else { "s" }
            )),
            Span::raw("  ^S:Save ^Q:Quit Drag:Highlight Right-click:Remove"),
        ])
    }

    fn prune_status_message(&mut self) {
        if let Some((_, instant)) = &self.status_message
            && instant.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
        }
    }

    fn on_tick(&mut self) {
        self.prune_status_message();
    }

    fn scroll_by_lines(&mut self, delta: isize) {
        let max_scroll = self.display.max_scroll();
        self.scroll_top = self.scroll_top.saturating_add_signed(delta).min(max_scroll);
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code, modifiers),
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let page = self.display.page_jump_distance() as isize;
        match (code, modifiers) {
            (KeyCode::Char('q'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => self.save(),
            (KeyCode::Char('q'), m) if m.is_empty() => self.should_quit = true,
            (KeyCode::Esc, _) => self.drag = None,
            (KeyCode::Up, _) => self.scroll_by_lines(-1),
            (KeyCode::Down, _) => self.scroll_by_lines(1),
            (KeyCode::PageUp, _) => self.scroll_by_lines(-page),
            (KeyCode::PageDown, _) => self.scroll_by_lines(page),
            (KeyCode::Home, _) => self.scroll_top = 0,
            (KeyCode::End, _) => self.scroll_top = self.display.max_scroll(),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent) {
        let step = self.view.scroll_lines as isize;
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_by_lines(-step),
            MouseEventKind::ScrollDown => self.scroll_by_lines(step),
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag = self
                    .point_from_mouse(event)
                    .map(|point| (point, point));
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(point) = self.point_from_mouse(event)
                    && let Some((_, focus)) = self.drag.as_mut()
                {
                    *focus = point;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.commit_drag(),
            MouseEventKind::Down(MouseButton::Right) => {
                self.drag = None;
                if let Some(point) = self.point_from_mouse(event) {
                    self.remove_run(point);
                }
            }
            _ => {}
        }
    }

    fn point_from_mouse(&self, event: MouseEvent) -> Option<LayoutPoint> {
        self.display
            .point_from_mouse(event.column, event.row, self.scroll_top)
    }

    fn commit_drag(&mut self) {
        let Some((anchor, focus)) = self.drag.take() else {
            return;
        };
        if anchor == focus {
            return;
        }
        let range = self.display.drag_range(anchor, focus);
        match self.display.commit_drag(anchor, focus) {
            Ok(true) => {
                let snippet = range.and_then(|range| self.display.highlighted_text_in(range));
                match snippet {
                    Some(text) => self.set_status(format!("Highlighted \"{}\"", shorten(&text))),
                    None => self.set_status("Highlighted"),
                }
            }
            Ok(false) => self.set_status("No change"),
            Err(err) => self.report(&err),
        }
    }

    fn remove_run(&mut self, point: LayoutPoint) {
        match self.display.activate_run(point) {
            Ok(true) => self.set_status("Highlight removed"),
            Ok(false) => {}
            Err(err) => self.report(&err),
        }
    }

    fn report(&mut self, err: &HighlightError) {
        self.set_status(format!("Not applied: {err}"));
    }

    fn save(&mut self) {
        match save_highlights(&self.highlights_path, &self.display) {
            Ok(()) => {
                self.saved.mark_saved(self.display.selections());
                self.set_status(format!("Saved {}", self.highlights_path.display()));
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "saving highlights failed");
                self.set_status(format!("{err:#}"));
            }
        }
    }
}

fn save_highlights(path: &Path, display: &HighlightDisplay) -> Result<()> {
    HighlightsFile::new(display.document(), display.selections()).save(path)
}

fn shorten(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > SNIPPET_CHARS || line.len() < text.len() {
        let head: String = line.chars().take(SNIPPET_CHARS).collect();
        format!("{}…", head.trim_end())
    } else {
        line.to_string()
    }
}
