//! TUI rendering and terminal management (impure shell).
//!
//! One cooperative loop owns the terminal, the [`AppState`] and the
//! [`DetailCache`]: user input, the ~50ms redraw tick and drained tailer
//! batches are processed strictly in sequence, so no state mutation ever
//! overlaps another. The tail thread only ever talks to this loop through
//! its channel.

mod details_pane;
mod requests_pane;
pub mod styles;

pub use styles::{ColorConfig, Styles};

use crate::clipboard::{copy_text_for, ClipboardSink, SystemClipboard};
use crate::config::ResolvedConfig;
use crate::integration;
use crate::model::AppError;
use crate::parser::ClassifiedLine;
use crate::source::{spawn_tailer, LogTailer};
use crate::state::AppState;
use crate::view_state::DetailCache;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Terminal,
};
use std::io::{self, Stdout};
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Redraw / channel-drain cadence of the render loop.
const TICK: Duration = Duration::from_millis(50);

/// How long a transient status message stays on screen.
const FLASH_TTL: Duration = Duration::from_secs(2);

/// Main TUI application.
///
/// Generic over the backend so tests can drive it with `TestBackend`.
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    state: AppState,
    cache: DetailCache,
    rx: Receiver<Vec<ClassifiedLine>>,
    clipboard: Box<dyn ClipboardSink>,
    styles: Styles,
    /// Width the detail pane had on the last draw; the copy handler needs
    /// it to rebuild the same lines the user is looking at.
    last_detail_width: u16,
    flash: Option<(String, Instant)>,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Put the terminal into raw mode on the alternate screen and build the
    /// application around it.
    pub fn new(
        state: AppState,
        rx: Receiver<Vec<ClassifiedLine>>,
        styles: Styles,
    ) -> Result<Self, AppError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            state,
            cache: DetailCache::new(),
            rx,
            clipboard: Box::new(SystemClipboard),
            styles,
            last_detail_width: 80,
            flash: None,
        })
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Run the main event loop until the user quits.
    ///
    /// Every key event mutates the state to completion before the next
    /// event is read; tailer batches are drained on the same loop.
    pub fn run(&mut self) -> Result<(), AppError> {
        self.draw()?;

        while self.state.running() {
            if event::poll(TICK)? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        self.handle_key(key);
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(width, height) => {
                        // The next draw recomputes layout and the cache key
                        // picks up the new width by itself.
                        debug!(width, height, "terminal resized");
                    }
                    _ => {}
                }
            }

            let drained = integration::drain_batches(&mut self.state, &self.rx);
            if drained > 0 {
                debug!(drained, "merged tailer batches");
            }
            self.draw()?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.state.stop();
            return;
        }

        // While a filter is being edited, keys go to it and nowhere else.
        if self.state.filter_editing() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.state.exit_filter_mode(),
                KeyCode::Backspace => self.state.backspace_filter(),
                KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.state.push_filter_char(ch);
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.state.stop(),
            KeyCode::Tab => self.state.toggle_focus(),
            KeyCode::Left => self.state.switch_to_left_pane(),
            KeyCode::Right => self.state.switch_to_right_pane(),
            KeyCode::Up | KeyCode::Char('k') => self.navigate(-1),
            KeyCode::Down | KeyCode::Char('j') => self.navigate(1),
            KeyCode::Char('f') => self.state.enter_filter_mode(),
            KeyCode::Char('C') => self.state.clear_filter(),
            KeyCode::Char('c') => self.state.clear_requests(),
            KeyCode::Char('u') => self.state.undo_clear_requests(),
            KeyCode::Char('s') => self.state.cycle_sort_mode(),
            KeyCode::Char('a') => self.state.toggle_auto_scroll(),
            KeyCode::Char('t') => {
                self.state.toggle_text_selection_mode();
                self.sync_mouse_capture();
            }
            KeyCode::Char('y') => self.copy_selection(),
            _ => {}
        }
    }

    /// Move the focused pane's selection. A left-pane move lands on a
    /// different request, so the detail selection starts over.
    fn navigate(&mut self, delta: i32) {
        let was_left = self.state.left_pane_focused();
        let before = self.state.selected;
        if delta < 0 {
            self.state.navigate_up();
        } else {
            self.state.navigate_down();
        }
        if was_left && self.state.selected != before {
            self.state.reset_detail_selection();
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.navigate(-1),
            MouseEventKind::ScrollDown => self.navigate(1),
            _ => {}
        }
    }

    /// Text-selection mode hands the mouse back to the terminal so its own
    /// selection works; leaving it re-enables capture. Best-effort.
    fn sync_mouse_capture(&mut self) {
        let result = if self.state.text_selection_mode() {
            io::stdout().execute(DisableMouseCapture).map(|_| ())
        } else {
            io::stdout().execute(EnableMouseCapture).map(|_| ())
        };
        if let Err(error) = result {
            warn!(%error, "mouse capture toggle failed");
        }
    }

    fn copy_selection(&mut self) {
        let lines = match self.state.current_request() {
            Some(request) => {
                self.cache
                    .lines_for(request, self.state.detail_filter(), self.last_detail_width)
            }
            None => {
                self.flash("Nothing to copy");
                return;
            }
        };

        match copy_text_for(&self.state, &lines) {
            Some(text) if self.clipboard.copy(&text) => self.flash("Copied to clipboard"),
            Some(_) => self.flash("Copy failed"),
            None => self.flash("Nothing to copy"),
        }
    }

    fn flash(&mut self, message: &str) {
        self.flash = Some((message.to_string(), Instant::now()));
    }

    fn draw(&mut self) -> Result<(), AppError> {
        let size = self.terminal.size()?;
        let area = Rect::new(0, 0, size.width.max(2), size.height.max(3));
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        let [left_area, right_area] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                .areas(main_area);

        // Scroll corrections run against the exact geometry being drawn.
        let left_height = requests_pane::visible_height(left_area, &self.state);
        self.state.adjust_auto_scroll(left_height);
        self.state.adjust_scroll_for_selection(left_height);
        self.state.adjust_scroll_bounds(left_height);

        self.last_detail_width = right_area.width;
        let lines = match self.state.current_request() {
            Some(request) => {
                self.cache
                    .lines_for(request, self.state.detail_filter(), right_area.width)
            }
            None => Rc::new(Vec::new()),
        };
        let right_height = details_pane::visible_height(right_area);
        self.state.adjust_detail_scroll_bounds(lines.len(), right_height);
        self.state
            .adjust_detail_scroll_for_entry_selection(right_height, &lines);

        if let Some((_, since)) = &self.flash {
            if since.elapsed() > FLASH_TTL {
                self.flash = None;
            }
        }
        let flash = self.flash.as_ref().map(|(text, _)| text.clone());

        let state = &self.state;
        let styles = &self.styles;
        self.terminal.draw(|frame| {
            requests_pane::render(frame, left_area, state, styles);
            details_pane::render(frame, right_area, state, &lines, styles);
            render_status_line(frame, status_area, state, flash.as_deref(), styles);
        })?;
        Ok(())
    }
}

fn render_status_line(
    frame: &mut ratatui::Frame,
    area: Rect,
    state: &AppState,
    flash: Option<&str>,
    styles: &Styles,
) {
    let line = match flash {
        Some(message) => Line::from(Span::styled(format!(" {message}"), styles.filter())),
        None => {
            let mut hints = String::from(
                " q quit | tab focus | j/k move | f filter | C clear filter | c clear | s sort | a auto | t select | y copy",
            );
            if state.can_undo_clear() {
                hints.push_str(" | u undo");
            }
            if state.text_selection_mode() {
                hints.push_str(" | TEXT SELECTION");
            }
            Line::from(Span::styled(
                hints,
                Style::default().add_modifier(Modifier::DIM),
            ))
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Initialize the terminal, run the viewer over the given tailer, and
/// restore the terminal on the way out - including on the error path.
///
/// The initial whole-file read happens *before* the alternate screen, so a
/// missing or unreadable file is reported plainly to the operator.
pub fn run(mut tailer: LogTailer, config: &ResolvedConfig) -> Result<(), AppError> {
    let initial = tailer.initial_read()?;
    let mut state = AppState::new();
    integration::ingest_raw_lines(&mut state, &initial);
    debug!(
        lines = initial.len(),
        requests = state.requests().len(),
        "initial dataset loaded"
    );

    let rx = spawn_tailer(tailer, config.poll_intervals());
    let styles = Styles::new(ColorConfig::with_colors(!config.no_color));

    let mut app = TuiApp::new(state, rx, styles)?;
    let result = app.run();

    restore_terminal()?;
    result
}

/// Restore the terminal to its normal state.
fn restore_terminal() -> Result<(), AppError> {
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

// ===== Tests =====
