pub const WIDTH: i32 = 10;
pub const HEIGHT: i32 = 8;

pub const AGENT_COUNT: usize = 6;
pub const ACTION_POINTS_PER_TURN: i32 = 4;
pub const MAX_STORED_POINTS: i32 = 4;

pub const VICTIM_TOKENS: usize = 12;
pub const FALSE_ALARM_TOKENS: usize = 6;
pub const MIN_LIVE_POIS: i32 = 3;

pub const RESCUE_TARGET: i32 = 7;
pub const SCARED_LIMIT: i32 = 4;
pub const DAMAGE_LIMIT: i32 = 24;

// Edge codes for the initial board: 0 destroyed/open passage, 1 intact
// wall, 2 open door, 3 closed door. Damaged states only appear at runtime.
// vertical[y][i] is the edge between columns i and i+1 in row y.
pub const INITIAL_VERTICAL_EDGES: [[u8; 9]; 8] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 0, 0, 3, 0, 1, 0, 0, 1],
    [1, 0, 0, 1, 0, 3, 0, 0, 1],
    [2, 0, 3, 0, 0, 0, 1, 0, 1],
    [1, 0, 1, 0, 0, 0, 3, 0, 2],
    [1, 0, 0, 0, 0, 1, 0, 1, 1],
    [1, 0, 0, 0, 0, 3, 0, 3, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0],
];

// horizontal[j][x] is the edge between rows j and j+1 in column x.
pub const INITIAL_HORIZONTAL_EDGES: [[u8; 10]; 7] = [
    [0, 1, 1, 1, 1, 1, 2, 1, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 1, 1, 1, 1, 1, 3, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 1, 3, 1, 1, 1, 1, 0],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [0, 1, 1, 2, 1, 1, 1, 1, 1, 0],
];

pub const INITIAL_GHOST_CELLS: [(i32, i32); 10] = [
    (2, 2),
    (3, 2),
    (2, 3),
    (3, 3),
    (4, 3),
    (5, 3),
    (4, 4),
    (6, 5),
    (7, 5),
    (6, 6),
];

pub const INITIAL_POI_CELLS: [(i32, i32); 3] = [(4, 2), (1, 5), (8, 5)];

pub const INITIAL_AGENT_POSITIONS: [(i32, i32); AGENT_COUNT] =
    [(6, 0), (9, 4), (3, 7), (0, 3), (4, 7), (5, 0)];

pub const SPAWN_POINTS: [(i32, i32); 8] = [
    (6, 0),
    (5, 0),
    (9, 4),
    (9, 3),
    (3, 7),
    (4, 7),
    (0, 3),
    (0, 4),
];
