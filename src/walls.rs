use std::collections::BTreeSet;

use crate::constants::{HEIGHT, INITIAL_HORIZONTAL_EDGES, INITIAL_VERTICAL_EDGES, WIDTH};
use crate::types::{Direction, EdgeState};

/// Wall and door network of the house.
///
/// Each physical edge is stored exactly once: `vertical[y][i]` sits
/// between columns i and i+1 of row y, `horizontal[j][x]` between rows
/// j and j+1 of column x. Reads from either adjacent cell resolve to
/// the same storage slot. Edges on the outer boundary of the grid do
/// not exist; accessors report them as `None` and writes to them are
/// ignored.
#[derive(Clone, Debug)]
pub struct WallGrid {
    vertical: [[EdgeState; (WIDTH - 1) as usize]; HEIGHT as usize],
    horizontal: [[EdgeState; WIDTH as usize]; (HEIGHT - 1) as usize],
    exits: BTreeSet<(i32, i32)>,
}

fn decode(code: u8) -> EdgeState {
    match code {
        1 => EdgeState::Intact,
        2 => EdgeState::DoorOpen,
        3 => EdgeState::DoorClosed,
        _ => EdgeState::Destroyed,
    }
}

pub fn in_bounds(x: i32, y: i32) -> bool {
    (0..WIDTH).contains(&x) && (0..HEIGHT).contains(&y)
}

pub fn on_perimeter(x: i32, y: i32) -> bool {
    in_bounds(x, y) && (x == 0 || x == WIDTH - 1 || y == 0 || y == HEIGHT - 1)
}

impl Default for WallGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl WallGrid {
    pub fn new() -> Self {
        let mut vertical =
            [[EdgeState::Destroyed; (WIDTH - 1) as usize]; HEIGHT as usize];
        let mut horizontal =
            [[EdgeState::Destroyed; WIDTH as usize]; (HEIGHT - 1) as usize];

        for (y, row) in INITIAL_VERTICAL_EDGES.iter().enumerate() {
            for (i, code) in row.iter().enumerate() {
                vertical[y][i] = decode(*code);
            }
        }
        for (j, row) in INITIAL_HORIZONTAL_EDGES.iter().enumerate() {
            for (x, code) in row.iter().enumerate() {
                horizontal[j][x] = decode(*code);
            }
        }

        let mut grid = Self {
            vertical,
            horizontal,
            exits: BTreeSet::new(),
        };
        grid.seed_exits();
        grid
    }

    fn seed_exits(&mut self) {
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                if !on_perimeter(x, y) {
                    continue;
                }
                let open = Direction::CARDINALS
                    .iter()
                    .any(|dir| matches!(self.get_edge(x, y, *dir), Some(state) if state.is_traversable()));
                if open {
                    self.exits.insert((x, y));
                }
            }
        }
    }

    /// State of the edge leaving (x, y) toward `dir`, or `None` when the
    /// neighbor in that direction lies outside the grid.
    pub fn get_edge(&self, x: i32, y: i32, dir: Direction) -> Option<EdgeState> {
        if !in_bounds(x, y) {
            return None;
        }
        match dir {
            Direction::Up => {
                if y <= 0 {
                    None
                } else {
                    Some(self.horizontal[(y - 1) as usize][x as usize])
                }
            }
            Direction::Down => {
                if y >= HEIGHT - 1 {
                    None
                } else {
                    Some(self.horizontal[y as usize][x as usize])
                }
            }
            Direction::Left => {
                if x <= 0 {
                    None
                } else {
                    Some(self.vertical[y as usize][(x - 1) as usize])
                }
            }
            Direction::Right => {
                if x >= WIDTH - 1 {
                    None
                } else {
                    Some(self.vertical[y as usize][x as usize])
                }
            }
            Direction::Here => None,
        }
    }

    /// Writes the edge leaving (x, y) toward `dir`. Out-of-bounds writes
    /// are ignored. A perimeter cell whose edge turns traversable is
    /// registered as an exit for victim rescue.
    pub fn set_edge(&mut self, x: i32, y: i32, dir: Direction, state: EdgeState) {
        if !in_bounds(x, y) {
            return;
        }
        match dir {
            Direction::Up if y > 0 => {
                self.horizontal[(y - 1) as usize][x as usize] = state;
            }
            Direction::Down if y < HEIGHT - 1 => {
                self.horizontal[y as usize][x as usize] = state;
            }
            Direction::Left if x > 0 => {
                self.vertical[y as usize][(x - 1) as usize] = state;
            }
            Direction::Right if x < WIDTH - 1 => {
                self.vertical[y as usize][x as usize] = state;
            }
            _ => return,
        }

        if state.is_traversable() {
            let (nx, ny) = dir.offset(x, y);
            for (cx, cy) in [(x, y), (nx, ny)] {
                if on_perimeter(cx, cy) {
                    self.exits.insert((cx, cy));
                }
            }
        }
    }

    /// Cells reachable from (x, y) through a traversable edge.
    pub fn neighbors(&self, x: i32, y: i32) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for dir in Direction::CARDINALS {
            if matches!(self.get_edge(x, y, dir), Some(state) if state.is_traversable()) {
                out.push(dir.offset(x, y));
            }
        }
        out
    }

    /// Cells adjacent to (x, y) behind a closed door.
    pub fn closed_door_neighbors(&self, x: i32, y: i32) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for dir in Direction::CARDINALS {
            if self.get_edge(x, y, dir) == Some(EdgeState::DoorClosed) {
                out.push(dir.offset(x, y));
            }
        }
        out
    }

    pub fn is_exit(&self, x: i32, y: i32) -> bool {
        self.exits.contains(&(x, y))
    }

    pub fn exits(&self) -> &BTreeSet<(i32, i32)> {
        &self.exits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opposite(dir: Direction) -> Direction {
        match dir {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Here => Direction::Here,
        }
    }

    #[test]
    fn every_edge_reads_the_same_from_both_sides() {
        let grid = WallGrid::new();
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                for dir in Direction::CARDINALS {
                    let (nx, ny) = dir.offset(x, y);
                    if !in_bounds(nx, ny) {
                        continue;
                    }
                    assert_eq!(
                        grid.get_edge(x, y, dir),
                        grid.get_edge(nx, ny, opposite(dir)),
                        "asymmetric edge at ({x},{y}) {dir:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn boundary_reads_return_sentinel() {
        let grid = WallGrid::new();
        assert_eq!(grid.get_edge(0, 3, Direction::Left), None);
        assert_eq!(grid.get_edge(9, 3, Direction::Right), None);
        assert_eq!(grid.get_edge(4, 0, Direction::Up), None);
        assert_eq!(grid.get_edge(4, 7, Direction::Down), None);
        assert_eq!(grid.get_edge(-1, 2, Direction::Right), None);
        assert_eq!(grid.get_edge(3, 8, Direction::Up), None);
    }

    #[test]
    fn boundary_writes_are_ignored() {
        let mut grid = WallGrid::new();
        let before = grid.clone();
        grid.set_edge(0, 3, Direction::Left, EdgeState::Intact);
        grid.set_edge(9, 3, Direction::Right, EdgeState::Intact);
        grid.set_edge(4, 0, Direction::Up, EdgeState::Intact);
        grid.set_edge(4, 7, Direction::Down, EdgeState::Intact);
        grid.set_edge(-3, -3, Direction::Up, EdgeState::Intact);
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                for dir in Direction::CARDINALS {
                    assert_eq!(grid.get_edge(x, y, dir), before.get_edge(x, y, dir));
                }
            }
        }
    }

    #[test]
    fn neighbors_follow_traversable_edges_only() {
        let grid = WallGrid::new();
        // (4, 1) has a closed door to the left and an intact wall above
        // on the initial board.
        let neighbors = grid.neighbors(4, 1);
        assert!(neighbors.contains(&(5, 1)));
        assert!(!neighbors.contains(&(4, 0)));
        assert!(grid.closed_door_neighbors(4, 1).contains(&(3, 1)));
    }

    #[test]
    fn closed_door_is_not_a_neighbor_until_opened() {
        let mut grid = WallGrid::new();
        assert_eq!(grid.get_edge(4, 1, Direction::Left), Some(EdgeState::DoorClosed));
        assert!(!grid.neighbors(4, 1).contains(&(3, 1)));
        grid.set_edge(4, 1, Direction::Left, EdgeState::DoorOpen);
        assert!(grid.neighbors(4, 1).contains(&(3, 1)));
        assert!(grid.neighbors(3, 1).contains(&(4, 1)));
    }

    #[test]
    fn initial_board_registers_the_full_perimeter_as_exits() {
        // The starting layout keeps the outer ring of cells connected to
        // each other, so every perimeter cell is rescue-capable from the
        // first turn.
        let grid = WallGrid::new();
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                if on_perimeter(x, y) {
                    assert!(grid.is_exit(x, y), "missing exit at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn traversable_writes_keep_perimeter_cells_registered() {
        let mut grid = WallGrid::new();
        assert_eq!(grid.get_edge(1, 0, Direction::Down), Some(EdgeState::Intact));
        grid.set_edge(1, 0, Direction::Down, EdgeState::Destroyed);
        assert!(grid.is_exit(1, 0));
        // Interior cells never become exits.
        grid.set_edge(4, 4, Direction::Right, EdgeState::Destroyed);
        assert!(!grid.is_exit(4, 4));
        assert!(!grid.is_exit(5, 4));
    }

    #[test]
    fn exits_only_live_on_the_perimeter() {
        let grid = WallGrid::new();
        assert!(!grid.exits().is_empty());
        for (x, y) in grid.exits() {
            assert!(on_perimeter(*x, *y), "interior exit at ({x},{y})");
        }
    }
}
