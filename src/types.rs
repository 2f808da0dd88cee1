use serde::Serialize;

/// Direction of an action or edge lookup, relative to a cell.
/// Wire encoding matches the replay contract: up=0, right=1, down=2,
/// left=3, here=4.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
    Here,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn offset(self, x: i32, y: i32) -> (i32, i32) {
        match self {
            Direction::Up => (x, y - 1),
            Direction::Right => (x + 1, y),
            Direction::Down => (x, y + 1),
            Direction::Left => (x - 1, y),
            Direction::Here => (x, y),
        }
    }

    pub fn index(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
            Direction::Here => 4,
        }
    }
}

/// Structural state of one boundary between two adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeState {
    Destroyed,
    Damaged,
    Intact,
    DoorOpen,
    DoorClosed,
    DoorDestroyed,
}

impl EdgeState {
    /// Numeric encoding used by the board data and the replay log:
    /// 0, 0.5, 1, 2, 3, 4.
    pub fn wire(self) -> f32 {
        match self {
            EdgeState::Destroyed => 0.0,
            EdgeState::Damaged => 0.5,
            EdgeState::Intact => 1.0,
            EdgeState::DoorOpen => 2.0,
            EdgeState::DoorClosed => 3.0,
            EdgeState::DoorDestroyed => 4.0,
        }
    }

    /// An agent or a hazard can cross this edge without further work.
    pub fn is_traversable(self) -> bool {
        matches!(
            self,
            EdgeState::Destroyed | EdgeState::DoorOpen | EdgeState::DoorDestroyed
        )
    }
}

/// Haunting level of a cell: fog thickens into a ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Hazard {
    Clear,
    Fog,
    Ghost,
}

impl Hazard {
    pub fn wire(self) -> u8 {
        match self {
            Hazard::Clear => 0,
            Hazard::Fog => 1,
            Hazard::Ghost => 2,
        }
    }

    /// Path cost weight: fog slows, a ghost has to be dealt with.
    pub fn severity(self) -> i32 {
        match self {
            Hazard::Clear => 0,
            Hazard::Fog => 1,
            Hazard::Ghost => 2,
        }
    }
}

/// Marker occupying a cell in the point-of-interest layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoiCell {
    Empty,
    Unrevealed,
    Victim,
    FalseAlarm,
}

impl PoiCell {
    pub fn wire(self) -> u8 {
        match self {
            PoiCell::Empty => 0,
            PoiCell::Unrevealed => 3,
            PoiCell::Victim => 4,
            PoiCell::FalseAlarm => 5,
        }
    }
}

/// One token drawn from the hidden pool when a POI is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoiToken {
    Victim,
    FalseAlarm,
}

impl PoiToken {
    pub fn cell(self) -> PoiCell {
        match self {
            PoiToken::Victim => PoiCell::Victim,
            PoiToken::FalseAlarm => PoiCell::FalseAlarm,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    Naive,
    Strategic,
}

impl PolicyMode {
    pub fn parse(value: &str) -> Self {
        if value == "naive" {
            PolicyMode::Naive
        } else {
            PolicyMode::Strategic
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AgentChange {
    pub x: i32,
    pub y: i32,
    pub id: u32,
    pub carrying: bool,
    pub energy: i32,
    pub action: String,
    pub order: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct HazardChange {
    pub x: i32,
    pub y: i32,
    pub status: u8,
    pub order: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct WallChange {
    pub x: i32,
    pub y: i32,
    pub direction: u8,
    pub status: f32,
    pub order: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct PoiChange {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "oldStatus")]
    pub old_status: u8,
    #[serde(rename = "newStatus")]
    pub new_status: u8,
    pub order: u32,
}

/// Everything that happened during one agent's turn, in replay order.
/// The four lists are ordered by their `order` fields: agent actions
/// first, then hazard placement, then POI removals, then POI additions,
/// then ghost-relocation evictions.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TurnReport {
    #[serde(rename = "numSteps")]
    pub num_steps: u32,
    #[serde(rename = "savedVictims")]
    pub saved_victims: i32,
    #[serde(rename = "scaredVictims")]
    pub scared_victims: i32,
    #[serde(rename = "damagePoints")]
    pub damage_points: i32,
    pub agents: Vec<AgentChange>,
    pub hazards: Vec<HazardChange>,
    pub walls: Vec<WallChange>,
    pub pois: Vec<PoiChange>,
}
