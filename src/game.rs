use std::{thread::sleep, time::{Duration, Instant}};

use crate::state::{self, Board, Input, StepOutcome};
use crate::term::TermManager;
use crate::Coord;

const MIN_HEIGHT: Coord = 20;
const MIN_WIDTH: Coord = 40;

/// One play session: owns the terminal and the board bounds, threads a
/// single `GameState` through the timed tick loop.
pub struct Session {
    board: Board,
    term: TermManager,
}

impl Session {
    pub fn new() -> Self {
        Session { board: Board { height: 0, width: 0 }, term: TermManager::new() }
    }

    pub fn run(&mut self) {
        self.term.setup();

        let (height, width) = self.term.size();
        self.board = Board { height, width };

        if height < MIN_HEIGHT || width < MIN_WIDTH {
            self.term.show_resize_prompt(MIN_HEIGHT, MIN_WIDTH);
            self.term.read_any_key();
            self.term.restore();
            return;
        }

        self.term.show_splash();
        self.term.read_any_key();

        let mut rng = rand::thread_rng();
        let mut state = state::initial_state(self.board, &mut rng);

        loop {
            let tick_start = Instant::now();

            self.term.render(&state);

            let input = self.term.poll_input();
            let (next, outcome) = state::step(state, self.board, input, &mut rng);
            state = next;

            match outcome {
                StepOutcome::Quit => break,
                StepOutcome::GameOver => {
                    self.term.render(&state);
                    self.term.show_game_over(state.score);

                    if self.wait_restart_or_quit() {
                        state = state::initial_state(self.board, &mut rng);
                        continue;
                    }
                    break;
                }
                StepOutcome::Running => {}
            }

            // Aim for one tick every speed_ms; a slow frame just sleeps zero.
            let elapsed = tick_start.elapsed().as_millis() as u64;
            sleep(Duration::from_millis(state.speed_ms.saturating_sub(elapsed)));
        }

        self.term.restore();
    }

    fn wait_restart_or_quit(&mut self) -> bool {
        loop {
            match self.term.read_input_blocking() {
                Input::Restart => return true,
                Input::Quit => return false,
                _ => {}
            }
        }
    }
}
