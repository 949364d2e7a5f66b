use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style, terminal};

use crate::state::{GameState, Input, BORDER_PADDING};
use crate::{Cell, Coord};

const WALL_CHAR: char = '#';
const FOOD_CHAR: char = '*';
const SNAKE_HEAD_CHAR: char = '@';
const SNAKE_BODY_CHAR: char = 'o';

/// Owns the terminal: raw mode, alternate screen, drawing and key
/// decoding. The simulation core never touches this type.
pub struct TermManager {
    width: u16,
    height: u16,
    stdout: Stdout,
}

impl TermManager {
    pub fn new() -> Self {
        let (width, height) = terminal::size().expect("Error reading size.");
        TermManager { width, height, stdout: stdout() }
    }

    pub fn setup(&mut self) {
        execute!(self.stdout, EnterAlternateScreen, cursor::Hide).expect("Error entering alt screen");
        terminal::enable_raw_mode().expect("Error enabling raw mode.");
    }

    pub fn restore(&mut self) {
        terminal::disable_raw_mode().expect("Error disabling raw mode.");
        execute!(self.stdout, cursor::Show, LeaveAlternateScreen).expect("Error leaving alt screen");
    }

    /// Viewport size as (height, width), matching cell coordinates.
    pub fn size(&self) -> (Coord, Coord) {
        (self.height as Coord, self.width as Coord)
    }

    /// Drains every pending event and keeps the last recognized input,
    /// so held-down keys don't queue up stale turns.
    pub fn poll_input(&self) -> Option<Input> {
        let mut input = None;

        while poll(Duration::from_millis(1)).unwrap() {
            if let Event::Key(ev) = read().unwrap() {
                if let Some(mapped) = map_key(&ev) {
                    input = Some(mapped);
                }
            }
        }

        input
    }

    /// Blocks until a recognized input arrives.
    pub fn read_input_blocking(&self) -> Input {
        loop {
            if let Event::Key(ev) = read().unwrap() {
                if let Some(input) = map_key(&ev) {
                    return input;
                }
            }
        }
    }

    /// Blocks until any key at all is pressed.
    pub fn read_any_key(&self) {
        loop {
            if let Event::Key(_) = read().unwrap() {
                return;
            }
        }
    }

    /// Draws a complete frame: border, HUD, food, snake.
    pub fn render(&mut self, state: &GameState) {
        let _ = queue!(self.stdout, terminal::Clear(ClearType::All));

        self.draw_border();
        self.draw_hud(state);

        if let Some(food) = state.food {
            self.print_at(food, FOOD_CHAR, Color::Red);
        }

        for (i, cell) in state.snake.iter().enumerate() {
            let ch = if i == 0 { SNAKE_HEAD_CHAR } else { SNAKE_BODY_CHAR };
            self.print_at(*cell, ch, Color::Green);
        }

        let _ = queue!(self.stdout, style::ResetColor);
        self.flush();
    }

    pub fn show_splash(&mut self) {
        let _ = queue!(self.stdout, terminal::Clear(ClearType::All));
        self.show_message(&[
            "T E R M S N A K E",
            "",
            "Arrows or WASD to steer",
            "(P)ause  (Q)uit",
            "",
            "Press any key to begin...",
        ]);
    }

    pub fn show_game_over(&mut self, score: u32) {
        self.show_message(&[
            " GAME OVER ",
            &*format!(" Score: {} ", score),
            "",
            " Press R to restart or Q to quit ",
        ]);
    }

    pub fn show_resize_prompt(&mut self, min_height: Coord, min_width: Coord) {
        let _ = queue!(self.stdout, terminal::Clear(ClearType::All));
        self.show_message(&[
            &*format!("Terminal too small: need at least {}x{}.", min_width, min_height),
            "",
            "Enlarge the window and run again.",
            "Press any key to exit...",
        ]);
    }

    ///////////////////////////////////////////////////////////////////////////

    fn draw_border(&mut self) {
        let (y0, y1) = (BORDER_PADDING, self.height as Coord - BORDER_PADDING - 1);
        let (x0, x1) = (BORDER_PADDING, self.width as Coord - BORDER_PADDING - 1);

        for x in x0..=x1 {
            self.print_at((y0, x), WALL_CHAR, Color::White);
            self.print_at((y1, x), WALL_CHAR, Color::White);
        }

        for y in y0..=y1 {
            self.print_at((y, x0), WALL_CHAR, Color::White);
            self.print_at((y, x1), WALL_CHAR, Color::White);
        }
    }

    fn draw_hud(&mut self, state: &GameState) {
        let fps = 1000 / state.speed_ms.max(1);
        let mut info = format!(
            " Score: {}  Speed: {}fps  Arrows/WASD  (P)ause (Q)uit ",
            state.score, fps
        );
        if state.paused {
            info.push_str(" [PAUSED] ");
        }
        info.truncate(self.width.saturating_sub(2) as usize);

        self.print_str((0, 1), &info, Color::Cyan);
    }

    fn show_message(&mut self, lines: &[&str]) {
        let top = self.height as Coord / 2 - lines.len() as Coord / 2;

        for (i, line) in lines.iter().enumerate() {
            let x = (self.width as Coord - line.len() as Coord) / 2;
            self.print_str((top + i as Coord, x), line, Color::White);
        }

        let _ = queue!(self.stdout, style::ResetColor);
        self.flush();
    }

    fn print_str(&mut self, pos: Cell, s: &str, color: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.print_at((pos.0, pos.1 + i as Coord), ch, color);
        }
    }

    // Out-of-viewport cells and write errors are dropped silently, so a
    // resize mid-game degrades to a clipped frame instead of a crash.
    fn print_at(&mut self, pos: Cell, ch: char, color: Color) {
        let (row, col) = pos;
        if row < 0 || col < 0 || row >= self.height as Coord || col >= self.width as Coord {
            return;
        }

        let _ = queue!(
            self.stdout,
            cursor::MoveTo(col as u16, row as u16),
            style::SetForegroundColor(color),
            style::Print(ch)
        );
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

/// Raw key codes to the closed input alphabet the core understands.
fn map_key(ev: &KeyEvent) -> Option<Input> {
    if is_ctrl_c(ev) {
        return Some(Input::Quit);
    }

    match ev.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Input::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Input::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Input::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Input::Right),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Input::Pause),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Input::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Input::Restart),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
