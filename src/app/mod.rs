pub mod backdrop;
pub mod registry;
pub mod scheduler;
pub mod stage;

use std::error::Error;
use std::io::{stdout, Stdout};
use std::sync::mpsc;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::backdrop::{PageSize, Placement};
use crate::app::stage::Stage;
use crate::config::Settings;
use crate::game::Input;
use crate::io::{spawn_control_listener, ControlEvent};
use crate::ui::draw_stage;
use crate::{FRAME_INTERVAL, TERM_COL_UNITS, TERM_ROW_UNITS};

type Term = Terminal<CrosstermBackend<Stdout>>;

pub fn run(settings: Settings, placement: Placement, boards: u32) -> Result<(), Box<dyn Error>> {
    let mut tui = TuiGuard::new()?;
    run_loop(tui.terminal_mut(), settings, placement, boards)
}

fn page_size(cols: u16, rows: u16) -> PageSize {
    PageSize {
        width: cols as u32 * TERM_COL_UNITS,
        height: rows as u32 * TERM_ROW_UNITS,
    }
}

fn run_loop(
    terminal: &mut Term,
    settings: Settings,
    placement: Placement,
    boards: u32,
) -> Result<(), Box<dyn Error>> {
    let area = terminal.size()?;
    let mut stage = Stage::new(settings, page_size(area.width, area.height));
    stage.spawn_columns(boards, placement, Instant::now());

    let (tx, rx) = mpsc::channel();
    spawn_control_listener(tx);

    loop {
        for ev in rx.try_iter() {
            apply_control(ev, &mut stage);
        }

        stage.frame(Instant::now());
        terminal.draw(|frame| draw_stage(frame, &stage))?;

        if event::poll(FRAME_INTERVAL)? {
            match event::read()? {
                Event::Key(key) => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        break;
                    }
                    handle_key(key.code, &mut stage);
                }
                Event::Resize(cols, rows) => {
                    stage.page_resized(page_size(cols, rows), Instant::now());
                }
                _ => {}
            }
        }
    }
    Ok(())
}

struct TuiGuard {
    terminal: Term,
}

impl TuiGuard {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        Ok(Self { terminal })
    }

    fn terminal_mut(&mut self) -> &mut Term {
        &mut self.terminal
    }
}

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn key_input(code: KeyCode) -> Option<Input> {
    match code {
        KeyCode::Left => Some(Input::Left),
        KeyCode::Right => Some(Input::Right),
        KeyCode::Down => Some(Input::Down),
        KeyCode::Up | KeyCode::Char(' ') => Some(Input::Rotate),
        _ => None,
    }
}

fn handle_key(code: KeyCode, stage: &mut Stage) {
    if let Some(input) = key_input(code) {
        stage.handle_input(input);
        return;
    }
    match code {
        KeyCode::Char('r') => stage.reset_all(Instant::now()),
        KeyCode::Char('p') => stage.toggle_prepopulate(),
        _ => {}
    }
}

fn apply_control(ev: ControlEvent, stage: &mut Stage) {
    match ev {
        ControlEvent::Reset => stage.reset_all(Instant::now()),
        ControlEvent::Prepopulate(enabled) => stage.set_prepopulate(enabled),
        ControlEvent::Resize { width, height } => {
            stage.adjust_size(width, height);
        }
        ControlEvent::Refresh => {
            stage.refresh_from_document();
        }
        ControlEvent::Speed(factor) => stage.set_speed_factor(factor),
    }
}
