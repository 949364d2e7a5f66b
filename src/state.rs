//! The simulation core: game state and the per-tick transition function.
//!
//! Everything here is a total function over a well-formed `GameState`.
//! The only outside effect is drawing cells from a caller-supplied RNG,
//! which keeps every rule testable with a seeded generator.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Cell, Coord};
use Direction::*;

pub const INITIAL_SPEED_MS: u64 = 120;
pub const MIN_SPEED_MS: u64 = 50;
pub const SPEED_STEP_MS: u64 = 3;
pub const BORDER_PADDING: Coord = 1;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector as a (row, column) delta.
    pub fn delta(self) -> (Coord, Coord) {
        match self {
            Up => (-1, 0),
            Down => (1, 0),
            Left => (0, -1),
            Right => (0, 1),
        }
    }

    /// True iff the two directions are componentwise negations.
    pub fn is_opposite(self, other: Direction) -> bool {
        let (dy, dx) = self.delta();
        let (oy, ox) = other.delta();
        dy == -oy && dx == -ox
    }
}

/// A recognized key press, already decoded by the display layer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    Pause,
    Quit,
    Restart,
}

impl Input {
    fn direction(self) -> Option<Direction> {
        match self {
            Input::Up => Some(Up),
            Input::Down => Some(Down),
            Input::Left => Some(Left),
            Input::Right => Some(Right),
            _ => None,
        }
    }
}

/// Playable area bounds, fixed for the whole session.
#[derive(Copy, Clone, Debug)]
pub struct Board {
    pub height: Coord,
    pub width: Coord,
}

#[derive(Clone, Debug)]
pub struct GameState {
    /// Head at index 0, tail at the end.
    pub snake: Vec<Cell>,
    pub direction: Direction,
    pub food: Option<Cell>,
    pub speed_ms: u64,
    pub score: u32,
    pub paused: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    Running,
    GameOver,
    Quit,
}

/// Snake of length 3 at the board center heading right, food placed,
/// full tick interval, score zero.
pub fn initial_state(board: Board, rng: &mut impl Rng) -> GameState {
    let (cy, cx) = (board.height / 2, board.width / 2);
    let snake = vec![(cy, cx), (cy, cx - 1), (cy, cx - 2)];
    let food = place_food(board, &snake, BORDER_PADDING, rng);

    GameState {
        snake,
        direction: Right,
        food,
        speed_ms: INITIAL_SPEED_MS,
        score: 0,
        paused: false,
    }
}

/// Picks a free cell uniformly at random from the playable rectangle
/// inside the border, or `None` if the snake fills it.
pub fn place_food(board: Board, snake: &[Cell], padding: Coord, rng: &mut impl Rng) -> Option<Cell> {
    let mut free = vec![];

    for row in (padding + 1)..(board.height - padding - 1) {
        for col in (padding + 1)..(board.width - padding - 1) {
            if !snake.contains(&(row, col)) {
                free.push((row, col));
            }
        }
    }

    free.choose(rng).copied()
}

/// Tick interval for a given score: shrinks by `SPEED_STEP_MS` per point,
/// floored at `MIN_SPEED_MS`.
pub fn adjust_speed(score: u32) -> u64 {
    INITIAL_SPEED_MS
        .saturating_sub(score as u64 * SPEED_STEP_MS)
        .clamp(MIN_SPEED_MS, INITIAL_SPEED_MS)
}

/// Advances the game by one tick: consumes the current state and one
/// optional input, returns the next state plus the loop outcome.
pub fn step(
    mut state: GameState,
    board: Board,
    input: Option<Input>,
    rng: &mut impl Rng,
) -> (GameState, StepOutcome) {
    match input {
        Some(Input::Quit) => return (state, StepOutcome::Quit),
        Some(Input::Pause) => {
            // A pause toggle never moves the snake, not even when resuming.
            state.paused = !state.paused;
            return (state, StepOutcome::Running);
        }
        _ => {}
    }

    if state.paused {
        return (state, StepOutcome::Running);
    }

    if let Some(dir) = input.and_then(Input::direction) {
        if !dir.is_opposite(state.direction) {
            state.direction = dir;
        }
    }

    // Standard shift move: new head in front, tail cell dropped.
    let (dy, dx) = state.direction.delta();
    let (head_row, head_col) = state.snake[0];
    let new_head = (head_row + dy, head_col + dx);
    state.snake.pop();
    state.snake.insert(0, new_head);

    if state.food == Some(new_head) {
        // Grow by duplicating the tail; the copies separate next tick.
        let tail = *state.snake.last().unwrap();
        state.snake.push(tail);
        state.score += 1;
        state.food = place_food(board, &state.snake, BORDER_PADDING, rng);
        state.speed_ms = adjust_speed(state.score);
    }

    if hits_wall_or_self(&state.snake, board) {
        // Keep the colliding body so the final frame can show it.
        return (state, StepOutcome::GameOver);
    }

    (state, StepOutcome::Running)
}

/// The border itself is wall: touching row/column `padding` or
/// `extent - padding - 1` counts as a crash, as does any body overlap.
fn hits_wall_or_self(snake: &[Cell], board: Board) -> bool {
    let (row, col) = snake[0];

    row <= BORDER_PADDING
        || row >= board.height - BORDER_PADDING - 1
        || col <= BORDER_PADDING
        || col >= board.width - BORDER_PADDING - 1
        || snake[1..].contains(&snake[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn board() -> Board {
        Board { height: 20, width: 40 }
    }

    fn mid_state(food: Option<Cell>) -> GameState {
        GameState {
            snake: vec![(10, 20), (10, 19), (10, 18)],
            direction: Right,
            food,
            speed_ms: INITIAL_SPEED_MS,
            score: 0,
            paused: false,
        }
    }

    #[test]
    fn opposite_direction_table() {
        let pairs = [(Up, Down), (Down, Up), (Left, Right), (Right, Left)];
        for &(a, b) in &pairs {
            assert!(a.is_opposite(b), "{:?} must oppose {:?}", a, b);
        }
        for &d in &[Up, Down, Left, Right] {
            assert!(!d.is_opposite(d));
        }
        assert!(!Up.is_opposite(Left));
        assert!(!Right.is_opposite(Down));
    }

    #[test]
    fn plain_move_shifts_without_growth() {
        let (next, outcome) = step(mid_state(Some((5, 5))), board(), None, &mut rng());

        assert_eq!(outcome, StepOutcome::Running);
        assert_eq!(next.snake, vec![(10, 21), (10, 20), (10, 19)]);
        assert_eq!(next.score, 0);
        assert_eq!(next.speed_ms, INITIAL_SPEED_MS);
        assert_eq!(next.food, Some((5, 5)));
    }

    #[test]
    fn eating_grows_scores_and_speeds_up() {
        let (next, outcome) = step(mid_state(Some((10, 21))), board(), None, &mut rng());

        assert_eq!(outcome, StepOutcome::Running);
        assert_eq!(next.snake, vec![(10, 21), (10, 20), (10, 19), (10, 19)]);
        assert_eq!(next.score, 1);
        assert_eq!(next.speed_ms, 117);

        let food = next.food.expect("board is nowhere near full");
        assert!(!next.snake.contains(&food));
    }

    #[test]
    fn reversal_request_is_rejected() {
        let (next, _) = step(mid_state(None), board(), Some(Input::Left), &mut rng());

        assert_eq!(next.direction, Right);
        assert_eq!(next.snake[0], (10, 21));
    }

    #[test]
    fn perpendicular_turn_is_applied() {
        let (next, _) = step(mid_state(None), board(), Some(Input::Up), &mut rng());

        assert_eq!(next.direction, Up);
        assert_eq!(next.snake[0], (9, 20));
    }

    #[test]
    fn paused_tick_changes_nothing() {
        let mut state = mid_state(Some((5, 5)));
        state.paused = true;
        let before = state.clone();

        let (next, outcome) = step(state, board(), Some(Input::Up), &mut rng());

        assert_eq!(outcome, StepOutcome::Running);
        assert!(next.paused);
        assert_eq!(next.snake, before.snake);
        assert_eq!(next.food, before.food);
        assert_eq!(next.score, before.score);
        assert_eq!(next.direction, before.direction);
    }

    #[test]
    fn pause_toggle_never_moves_the_snake() {
        let (paused, _) = step(mid_state(None), board(), Some(Input::Pause), &mut rng());
        assert!(paused.paused);
        assert_eq!(paused.snake, mid_state(None).snake);

        let (resumed, _) = step(paused, board(), Some(Input::Pause), &mut rng());
        assert!(!resumed.paused);
        assert_eq!(resumed.snake, mid_state(None).snake);
    }

    #[test]
    fn quit_leaves_state_untouched() {
        let before = mid_state(Some((5, 5)));
        let (next, outcome) = step(before.clone(), board(), Some(Input::Quit), &mut rng());

        assert_eq!(outcome, StepOutcome::Quit);
        assert_eq!(next.snake, before.snake);
        assert_eq!(next.score, before.score);
    }

    #[test]
    fn wall_collision_at_top_border() {
        let state = GameState {
            snake: vec![(2, 20), (3, 20), (4, 20)],
            direction: Up,
            ..mid_state(None)
        };

        let (next, outcome) = step(state, board(), None, &mut rng());

        assert_eq!(outcome, StepOutcome::GameOver);
        // The colliding body survives for the final render.
        assert_eq!(next.snake, vec![(1, 20), (2, 20), (3, 20)]);
    }

    #[test]
    fn wall_collision_at_right_border() {
        let state = GameState {
            snake: vec![(10, 37), (10, 36), (10, 35)],
            direction: Right,
            ..mid_state(None)
        };

        let (next, outcome) = step(state, board(), None, &mut rng());

        assert_eq!(outcome, StepOutcome::GameOver);
        assert_eq!(next.snake[0], (10, 38));
    }

    #[test]
    fn self_collision_ends_the_game() {
        // Head turns down into a body cell that is not the tail.
        let state = GameState {
            snake: vec![(5, 7), (5, 6), (5, 5), (6, 5), (6, 6), (6, 7), (6, 8)],
            direction: Down,
            ..mid_state(None)
        };

        let (next, outcome) = step(state, board(), None, &mut rng());

        assert_eq!(outcome, StepOutcome::GameOver);
        assert_eq!(next.snake[0], (6, 7));
    }

    #[test]
    fn chasing_the_tail_is_not_a_collision() {
        // The tail cell is vacated in the same tick the head enters it.
        let state = GameState {
            snake: vec![(5, 5), (5, 6), (6, 6), (6, 5)],
            direction: Down,
            ..mid_state(None)
        };

        let (next, outcome) = step(state, board(), None, &mut rng());

        assert_eq!(outcome, StepOutcome::Running);
        assert_eq!(next.snake, vec![(6, 5), (5, 5), (5, 6), (6, 6)]);
    }

    #[test]
    fn food_lands_inside_the_walls_and_off_the_snake() {
        // 5x6 board leaves exactly two playable cells: (2,2) and (2,3).
        let tiny = Board { height: 5, width: 6 };
        let snake = [(2, 2)];

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let food = place_food(tiny, &snake, BORDER_PADDING, &mut rng);
            assert_eq!(food, Some((2, 3)));
        }
    }

    #[test]
    fn full_board_yields_no_food() {
        let tiny = Board { height: 5, width: 6 };
        let snake = [(2, 2), (2, 3)];

        assert_eq!(place_food(tiny, &snake, BORDER_PADDING, &mut rng()), None);
    }

    #[test]
    fn absent_food_is_tolerated() {
        let (next, outcome) = step(mid_state(None), board(), None, &mut rng());

        assert_eq!(outcome, StepOutcome::Running);
        assert_eq!(next.food, None);
        assert_eq!(next.score, 0);
        assert_eq!(next.snake.len(), 3);
    }

    #[test]
    fn speed_is_floored_at_the_minimum() {
        assert_eq!(adjust_speed(0), 120);
        assert_eq!(adjust_speed(1), 117);
        assert_eq!(adjust_speed(23), 51);
        assert_eq!(adjust_speed(24), 50);
        assert_eq!(adjust_speed(1_000), 50);
        assert_eq!(adjust_speed(u32::MAX), 50);
    }

    #[test]
    fn initial_state_is_centered_and_fed() {
        let state = initial_state(board(), &mut rng());

        assert_eq!(state.snake, vec![(10, 20), (10, 19), (10, 18)]);
        assert_eq!(state.direction, Right);
        assert_eq!(state.speed_ms, INITIAL_SPEED_MS);
        assert_eq!(state.score, 0);
        assert!(!state.paused);

        let food = state.food.expect("fresh board has free cells");
        assert!(!state.snake.contains(&food));
        assert!(food.0 > BORDER_PADDING && food.0 < board().height - BORDER_PADDING - 1);
        assert!(food.1 > BORDER_PADDING && food.1 < board().width - BORDER_PADDING - 1);
    }
}
