mod game;
mod state;
mod term;

pub type Coord = i16;
/// A board position as (row, column), in terminal cells.
pub type Cell = (Coord, Coord);

fn main() {
    // The session restores the terminal itself on every exit path.
    let mut session = game::Session::new();
    session.run();
}
