use crate::constants::MAX_STORED_POINTS;
use crate::hazard::HazardGrid;
use crate::poi::PoiRegistry;
use crate::types::{Direction, EdgeState, Hazard, WallChange};
use crate::walls::WallGrid;

use super::Agent;

/// Everything an agent can spend action points on during its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    MoveWithVictim(Direction),
    OpenDoor(Direction),
    CloseDoor(Direction),
    DamageWall(Direction),
    DestroyWall(Direction),
    ClearFog(Direction),
    ScareGhost(Direction),
    RemoveGhost(Direction),
    DoNothing,
}

/// Directions a hazard-clearing action may aim at: the agent's own cell
/// plus the four cardinals.
const HAZARD_TARGETS: [Direction; 5] = [
    Direction::Here,
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

impl Action {
    pub fn cost(self) -> i32 {
        match self {
            Action::Move(_) => 1,
            Action::MoveWithVictim(_) => 2,
            Action::OpenDoor(_) | Action::CloseDoor(_) => 1,
            Action::DamageWall(_) | Action::DestroyWall(_) => 2,
            Action::ClearFog(_) => 1,
            Action::ScareGhost(_) => 1,
            Action::RemoveGhost(_) => 2,
            Action::DoNothing => 0,
        }
    }

    /// Name written into the agent change log.
    pub fn label(self) -> &'static str {
        match self {
            Action::Move(_) => "move",
            Action::MoveWithVictim(_) => "move_with_victim",
            Action::OpenDoor(_) => "open_door",
            Action::CloseDoor(_) => "close_door",
            Action::DamageWall(_) => "damage_wall",
            Action::DestroyWall(_) => "destroy_wall",
            Action::ClearFog(_) => "clear_fog",
            Action::ScareGhost(_) => "scare_ghost",
            Action::RemoveGhost(_) => "remove_ghost",
            Action::DoNothing => "do_nothing",
        }
    }

    pub(super) fn is_legal(self, agent: &Agent, walls: &WallGrid, hazard: &HazardGrid) -> bool {
        let edge = |dir| walls.get_edge(agent.x, agent.y, dir);
        match self {
            Action::Move(dir) => {
                !agent.carrying && can_walk(agent, dir, walls, hazard)
            }
            Action::MoveWithVictim(dir) => {
                agent.carrying && can_walk(agent, dir, walls, hazard)
            }
            Action::OpenDoor(dir) => edge(dir) == Some(EdgeState::DoorClosed),
            Action::CloseDoor(dir) => edge(dir) == Some(EdgeState::DoorOpen),
            Action::DamageWall(dir) => !agent.carrying && edge(dir) == Some(EdgeState::Intact),
            Action::DestroyWall(dir) => !agent.carrying && edge(dir) == Some(EdgeState::Damaged),
            Action::ClearFog(dir) => {
                matches!(hazard_target(agent, dir, walls), Some((tx, ty)) if hazard.get(tx, ty) == Hazard::Fog)
            }
            Action::ScareGhost(dir) | Action::RemoveGhost(dir) => {
                matches!(hazard_target(agent, dir, walls), Some((tx, ty)) if hazard.get(tx, ty) == Hazard::Ghost)
            }
            Action::DoNothing => true,
        }
    }

    /// Applies a validated action, spending its cost. Returns the damage
    /// dealt; wall transitions are pushed onto `wall_log`.
    pub(super) fn apply(
        self,
        agent: &mut Agent,
        walls: &mut WallGrid,
        hazard: &mut HazardGrid,
        pois: &mut PoiRegistry,
        wall_log: &mut Vec<WallChange>,
        order: u32,
    ) -> i32 {
        agent.budget -= self.cost();
        match self {
            Action::Move(dir) => {
                let (nx, ny) = dir.offset(agent.x, agent.y);
                agent.x = nx;
                agent.y = ny;
                0
            }
            Action::MoveWithVictim(dir) => {
                let (nx, ny) = dir.offset(agent.x, agent.y);
                agent.x = nx;
                agent.y = ny;
                if walls.is_exit(nx, ny) {
                    pois.mark_rescued();
                    agent.carrying = false;
                }
                0
            }
            Action::OpenDoor(dir) => {
                set_and_log(walls, agent.x, agent.y, dir, EdgeState::DoorOpen, wall_log, order);
                0
            }
            Action::CloseDoor(dir) => {
                set_and_log(walls, agent.x, agent.y, dir, EdgeState::DoorClosed, wall_log, order);
                0
            }
            Action::DamageWall(dir) => {
                set_and_log(walls, agent.x, agent.y, dir, EdgeState::Damaged, wall_log, order);
                1
            }
            Action::DestroyWall(dir) => {
                set_and_log(walls, agent.x, agent.y, dir, EdgeState::Destroyed, wall_log, order);
                1
            }
            Action::ClearFog(dir) => {
                if let Some((tx, ty)) = hazard_target(agent, dir, walls) {
                    hazard.set(tx, ty, Hazard::Clear);
                }
                0
            }
            Action::ScareGhost(dir) => {
                if let Some((tx, ty)) = hazard_target(agent, dir, walls) {
                    hazard.set(tx, ty, Hazard::Fog);
                }
                0
            }
            Action::RemoveGhost(dir) => {
                if let Some((tx, ty)) = hazard_target(agent, dir, walls) {
                    hazard.set(tx, ty, Hazard::Clear);
                }
                0
            }
            Action::DoNothing => {
                agent.stored = agent.budget.min(MAX_STORED_POINTS);
                agent.budget = 0;
                0
            }
        }
    }
}

fn set_and_log(
    walls: &mut WallGrid,
    x: i32,
    y: i32,
    dir: Direction,
    state: EdgeState,
    wall_log: &mut Vec<WallChange>,
    order: u32,
) {
    walls.set_edge(x, y, dir, state);
    wall_log.push(WallChange {
        x,
        y,
        direction: dir.index(),
        status: state.wire(),
        order,
    });
}

fn can_walk(agent: &Agent, dir: Direction, walls: &WallGrid, hazard: &HazardGrid) -> bool {
    match walls.get_edge(agent.x, agent.y, dir) {
        Some(edge) if edge.is_traversable() => {
            let (nx, ny) = dir.offset(agent.x, agent.y);
            hazard.get(nx, ny) != Hazard::Ghost
        }
        _ => false,
    }
}

/// Cell a hazard action aims at, when that cell is reachable: the
/// agent's own cell, or a neighbor behind a traversable edge.
fn hazard_target(agent: &Agent, dir: Direction, walls: &WallGrid) -> Option<(i32, i32)> {
    if dir == Direction::Here {
        return Some((agent.x, agent.y));
    }
    match walls.get_edge(agent.x, agent.y, dir) {
        Some(edge) if edge.is_traversable() => Some(dir.offset(agent.x, agent.y)),
        _ => None,
    }
}

/// Every action the agent could pay for right now. Standing on a ghost
/// cell removes the option to pass, which is what empties the set.
pub(super) fn candidates(agent: &Agent, walls: &WallGrid, hazard: &HazardGrid) -> Vec<Action> {
    let mut out = Vec::new();
    for dir in Direction::CARDINALS {
        let moves = [
            Action::Move(dir),
            Action::MoveWithVictim(dir),
            Action::OpenDoor(dir),
            Action::CloseDoor(dir),
            Action::DamageWall(dir),
            Action::DestroyWall(dir),
        ];
        for action in moves {
            if action.cost() <= agent.budget && action.is_legal(agent, walls, hazard) {
                out.push(action);
            }
        }
    }
    for dir in HAZARD_TARGETS {
        let clears = [
            Action::ClearFog(dir),
            Action::ScareGhost(dir),
            Action::RemoveGhost(dir),
        ];
        for action in clears {
            if action.cost() <= agent.budget && action.is_legal(agent, walls, hazard) {
                out.push(action);
            }
        }
    }
    if hazard.get(agent.x, agent.y) != Hazard::Ghost {
        out.push(Action::DoNothing);
    }
    out
}
