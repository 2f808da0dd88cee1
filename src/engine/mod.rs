use crate::constants::{
    ACTION_POINTS_PER_TURN, DAMAGE_LIMIT, INITIAL_AGENT_POSITIONS, MIN_LIVE_POIS, RESCUE_TARGET,
    SCARED_LIMIT,
};
use crate::hazard::HazardGrid;
use crate::poi::PoiRegistry;
use crate::rng::Rng;
use crate::types::{
    AgentChange, EdgeState, GameStatus, Hazard, HazardChange, PoiCell, PoiToken, PolicyMode,
    TurnReport,
};
use crate::walls::WallGrid;

pub mod actions;
mod pathfinder;
mod utils;

pub use self::actions::Action;

use self::pathfinder::{claim_pois, explore, nearest_exit, nearest_ghost, Intent, PathField};
use self::utils::{direction_toward, nearest_spawn};

/// One rescue agent. Owned by the engine and addressed by index.
#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub(crate) id: u32,
    pub(crate) x: i32,
    pub(crate) y: i32,
    /// Points left to spend in the running turn.
    pub(crate) budget: i32,
    /// Points banked by passing, added to the next refill.
    pub(crate) stored: i32,
    pub(crate) carrying: bool,
}

/// Deterministic turn-based simulation of the rescue. One call to
/// `advance_one_agent` plays a full agent turn plus the end-of-turn
/// hazard, replenishment and eviction phases.
#[derive(Clone, Debug)]
pub struct GameEngine {
    mode: PolicyMode,
    rng: Rng,
    walls: WallGrid,
    hazard: HazardGrid,
    pois: PoiRegistry,
    agents: Vec<Agent>,
    next_agent: usize,
    steps: u32,
    damage: i32,
    status: GameStatus,
}

impl GameEngine {
    pub fn new(mode: PolicyMode, seed: u32) -> Self {
        let agents = INITIAL_AGENT_POSITIONS
            .iter()
            .enumerate()
            .map(|(index, &(x, y))| Agent {
                id: index as u32,
                x,
                y,
                budget: 0,
                stored: 0,
                carrying: false,
            })
            .collect();
        Self {
            mode,
            rng: Rng::new(seed),
            walls: WallGrid::new(),
            hazard: HazardGrid::new(),
            pois: PoiRegistry::new(),
            agents,
            next_agent: 0,
            steps: 0,
            damage: 0,
            status: GameStatus::InProgress,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn rescued(&self) -> i32 {
        self.pois.rescued()
    }

    pub fn scared(&self) -> i32 {
        self.pois.scared()
    }

    /// Cumulative structural damage, clamped to the losing threshold.
    pub fn damage_points(&self) -> i32 {
        self.damage.min(DAMAGE_LIMIT)
    }

    /// Plays the next agent's turn and the phases that follow it.
    /// Returns `None` once the game is over.
    pub fn advance_one_agent(&mut self) -> Option<TurnReport> {
        if self.status != GameStatus::InProgress {
            return None;
        }
        self.steps += 1;
        let idx = self.next_agent;
        self.next_agent = (self.next_agent + 1) % self.agents.len();

        let mut order: u32 = 0;
        let mut agent_changes = Vec::new();
        let mut wall_changes = Vec::new();
        let hazard_before = self.hazard.clone();

        self.agents[idx].budget = self.agents[idx].stored + ACTION_POINTS_PER_TURN;
        self.agents[idx].stored = 0;

        while self.agents[idx].budget > 0 {
            let Some(action) = self.choose_action(idx) else {
                break;
            };
            self.damage += action.apply(
                &mut self.agents[idx],
                &mut self.walls,
                &mut self.hazard,
                &mut self.pois,
                &mut wall_changes,
                order,
            );
            self.check_pickup(idx);
            let agent = &self.agents[idx];
            agent_changes.push(AgentChange {
                x: agent.x,
                y: agent.y,
                id: agent.id,
                carrying: agent.carrying,
                energy: agent.budget,
                action: action.label().to_string(),
                order,
            });
            order += 1;
        }

        let hazard_order = order;
        self.damage += self.hazard.place_hazard(
            &mut self.walls,
            &mut self.pois,
            &mut self.rng,
            &mut wall_changes,
            hazard_order,
        );

        while self.pois.live_count() < MIN_LIVE_POIS {
            let positions: Vec<(i32, i32)> = self.agents.iter().map(|a| (a.x, a.y)).collect();
            if !self
                .pois
                .place(&mut self.hazard, &positions, &mut self.rng)
            {
                break;
            }
        }

        let hazards: Vec<HazardChange> = self
            .hazard
            .diff(&hazard_before)
            .into_iter()
            .map(|(x, y, h)| HazardChange {
                x,
                y,
                status: h.wire(),
                order: hazard_order,
            })
            .collect();
        let pois = self.pois.drain_changes(hazard_order + 1, hazard_order + 2);

        let evict_order = hazard_order + 3;
        for i in 0..self.agents.len() {
            let (x, y) = (self.agents[i].x, self.agents[i].y);
            if self.hazard.get(x, y) != Hazard::Ghost {
                continue;
            }
            if self.agents[i].carrying {
                self.agents[i].carrying = false;
                self.pois.scare_carried();
            }
            let (sx, sy) = nearest_spawn(x, y);
            let agent = &mut self.agents[i];
            agent.x = sx;
            agent.y = sy;
            agent.stored = 0;
            agent_changes.push(AgentChange {
                x: sx,
                y: sy,
                id: agent.id,
                carrying: false,
                energy: agent.budget,
                action: "evicted".to_string(),
                order: evict_order,
            });
        }

        if self.pois.rescued() >= RESCUE_TARGET {
            self.status = GameStatus::Won;
        } else if self.pois.scared() >= SCARED_LIMIT || self.damage >= DAMAGE_LIMIT {
            self.status = GameStatus::Lost;
        }

        Some(TurnReport {
            num_steps: self.steps,
            saved_victims: self.pois.rescued(),
            scared_victims: self.pois.scared(),
            damage_points: self.damage_points(),
            agents: agent_changes,
            hazards,
            walls: wall_changes,
            pois,
        })
    }

    fn choose_action(&mut self, idx: usize) -> Option<Action> {
        match self.mode {
            PolicyMode::Naive => self.naive_action(idx),
            PolicyMode::Strategic => Some(self.strategic_action(idx)),
        }
    }

    fn naive_action(&mut self, idx: usize) -> Option<Action> {
        let mut options = actions::candidates(&self.agents[idx], &self.walls, &self.hazard);
        if options.is_empty() {
            return None;
        }
        self.rng.shuffle(&mut options);
        Some(options[0])
    }

    /// Picks the next step toward the agent's goal: the nearest exit
    /// while carrying, the cheapest claimed marker otherwise, falling
    /// back to hunting the nearest ghost.
    fn strategic_action(&mut self, idx: usize) -> Action {
        let start = (self.agents[idx].x, self.agents[idx].y);
        let (field, goal) = if self.agents[idx].carrying {
            let field = explore(start, &self.walls, &self.hazard, Intent::Cautious);
            let goal = nearest_exit(&field, &self.walls);
            (field, goal)
        } else {
            let fields: Vec<(usize, PathField)> = self
                .agents
                .iter()
                .enumerate()
                .filter(|(_, a)| !a.carrying)
                .map(|(i, a)| {
                    (
                        i,
                        explore((a.x, a.y), &self.walls, &self.hazard, Intent::Cautious),
                    )
                })
                .collect();
            let claims = claim_pois(&fields, &self.pois);
            let mine = fields
                .iter()
                .find(|(i, _)| *i == idx)
                .map(|(_, f)| f)
                .and_then(|field| {
                    let mut best: Option<((i32, i32), i32)> = None;
                    for (&cell, &owner) in &claims {
                        if owner != idx {
                            continue;
                        }
                        let Some(cost) = field.cost_to(cell) else {
                            continue;
                        };
                        if best.is_none_or(|(_, c)| cost < c) {
                            best = Some((cell, cost));
                        }
                    }
                    best.map(|(cell, _)| cell)
                });
            match mine {
                Some(cell) => {
                    let field = explore(start, &self.walls, &self.hazard, Intent::Cautious);
                    (field, Some(cell))
                }
                None => {
                    let field = explore(start, &self.walls, &self.hazard, Intent::SeekGhost);
                    let goal = nearest_ghost(&field, &self.hazard, &self.walls);
                    (field, goal)
                }
            }
        };

        let Some(goal) = goal else {
            return Action::DoNothing;
        };
        let path = field.path_to(goal);
        let Some(&(nx, ny)) = path.first() else {
            return Action::DoNothing;
        };
        let dir = direction_toward(start, (nx, ny));
        let agent = &self.agents[idx];

        if self.walls.get_edge(start.0, start.1, dir) == Some(EdgeState::DoorClosed) {
            return Action::OpenDoor(dir);
        }
        if self.hazard.get(nx, ny) == Hazard::Ghost {
            return if agent.budget >= Action::RemoveGhost(dir).cost() {
                Action::RemoveGhost(dir)
            } else {
                Action::ScareGhost(dir)
            };
        }
        let step = if agent.carrying {
            Action::MoveWithVictim(dir)
        } else {
            Action::Move(dir)
        };
        if step.cost() <= agent.budget && step.is_legal(agent, &self.walls, &self.hazard) {
            step
        } else {
            Action::DoNothing
        }
    }

    /// After every action: a marker under the agent is revealed, and a
    /// victim is picked up when the agent has free hands. Picking one up
    /// on an exit cell rescues it on the spot.
    fn check_pickup(&mut self, idx: usize) {
        let (x, y) = (self.agents[idx].x, self.agents[idx].y);
        match self.pois.get(x, y) {
            PoiCell::Empty => {}
            PoiCell::Unrevealed => match self.pois.reveal(x, y, &mut self.rng) {
                Ok(PoiToken::Victim) => self.claim_victim(idx, x, y),
                Ok(PoiToken::FalseAlarm) => self.pois.resolve_false_alarm(x, y),
                Err(_) => {}
            },
            PoiCell::Victim => self.claim_victim(idx, x, y),
            PoiCell::FalseAlarm => self.pois.resolve_false_alarm(x, y),
        }
    }

    fn claim_victim(&mut self, idx: usize, x: i32, y: i32) {
        if self.agents[idx].carrying {
            return;
        }
        self.pois.mark_carried(x, y);
        if self.walls.is_exit(x, y) {
            self.pois.mark_rescued();
        } else {
            self.agents[idx].carrying = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SPAWN_POINTS;

    const TURN_SAFETY_LIMIT: u32 = 5_000;

    fn run_to_end(engine: &mut GameEngine) -> Vec<TurnReport> {
        let mut reports = Vec::new();
        for _ in 0..TURN_SAFETY_LIMIT {
            match engine.advance_one_agent() {
                Some(report) => reports.push(report),
                None => return reports,
            }
        }
        panic!("game did not terminate within {TURN_SAFETY_LIMIT} turns");
    }

    #[test]
    fn same_seed_replays_the_same_game() {
        for mode in [PolicyMode::Naive, PolicyMode::Strategic] {
            let mut a = GameEngine::new(mode, 424_242);
            let mut b = GameEngine::new(mode, 424_242);
            let reports_a = run_to_end(&mut a);
            let reports_b = run_to_end(&mut b);
            let json_a = serde_json::to_string(&reports_a).unwrap();
            let json_b = serde_json::to_string(&reports_b).unwrap();
            assert_eq!(json_a, json_b);
            assert_eq!(a.status(), b.status());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = GameEngine::new(PolicyMode::Naive, 1);
        let mut b = GameEngine::new(PolicyMode::Naive, 2);
        let reports_a = run_to_end(&mut a);
        let reports_b = run_to_end(&mut b);
        assert_ne!(
            serde_json::to_string(&reports_a).unwrap(),
            serde_json::to_string(&reports_b).unwrap()
        );
    }

    #[test]
    fn every_game_terminates_and_stays_terminal() {
        for seed in [3, 17, 99] {
            let mut engine = GameEngine::new(PolicyMode::Strategic, seed);
            run_to_end(&mut engine);
            assert_ne!(engine.status(), GameStatus::InProgress);
            assert!(engine.advance_one_agent().is_none());
        }
    }

    #[test]
    fn tokens_stay_accounted_for_at_every_turn_boundary() {
        let mut engine = GameEngine::new(PolicyMode::Strategic, 7);
        for _ in 0..TURN_SAFETY_LIMIT {
            let Some(report) = engine.advance_one_agent() else {
                break;
            };
            let carried = engine.agents.iter().filter(|a| a.carrying).count() as i32;
            let total = engine.pois.pool_remaining() as i32
                + engine.pois.revealed_count()
                + carried
                + engine.pois.rescued()
                + engine.pois.scared()
                + engine.pois.resolved_false_alarms();
            assert_eq!(total, 18);

            // Replenishment tops the board back up to the minimum unless
            // the pool is dry. Evictions run after it and can each scare
            // one carried victim, so allow that much slack.
            let evicted = report
                .agents
                .iter()
                .filter(|c| c.action == "evicted")
                .count() as i32;
            assert!(
                engine.pois.pool_remaining() == 0
                    || engine.pois.live_count() >= MIN_LIVE_POIS - evicted
            );
        }
    }

    #[test]
    fn reported_damage_is_monotone_and_clamped() {
        let mut engine = GameEngine::new(PolicyMode::Naive, 55);
        let reports = run_to_end(&mut engine);
        let mut last = 0;
        for report in &reports {
            assert!(report.damage_points >= last);
            assert!(report.damage_points <= DAMAGE_LIMIT);
            last = report.damage_points;
        }
    }

    #[test]
    fn a_ghost_under_an_agent_evicts_it_and_scares_its_victim() {
        let mut engine = GameEngine::new(PolicyMode::Strategic, 13);
        // Agent 1 starts at (9, 4) carrying a victim; a ghost appears
        // under it before agent 0's turn resolves.
        engine.agents[1].carrying = true;
        let (x, y) = (engine.agents[1].x, engine.agents[1].y);
        engine
            .hazard
            .set_ghost(x, y, &mut engine.pois, &mut engine.rng);
        let scared_before = engine.pois.scared();

        let report = engine.advance_one_agent().unwrap();
        assert!(!engine.agents[1].carrying);
        assert_eq!(engine.pois.scared(), scared_before + 1);
        assert!(SPAWN_POINTS.contains(&(engine.agents[1].x, engine.agents[1].y)));
        assert_eq!(engine.agents[1].stored, 0);
        assert!(report
            .agents
            .iter()
            .any(|change| change.action == "evicted" && change.id == 1));
    }

    #[test]
    fn seven_rescues_win_the_game() {
        let mut engine = GameEngine::new(PolicyMode::Strategic, 5);
        for _ in 0..RESCUE_TARGET {
            engine.pois.mark_rescued();
        }
        engine.advance_one_agent();
        assert_eq!(engine.status(), GameStatus::Won);
        assert!(engine.advance_one_agent().is_none());
    }

    #[test]
    fn event_orders_are_phased_within_a_turn() {
        let mut engine = GameEngine::new(PolicyMode::Naive, 21);
        for _ in 0..40 {
            let Some(report) = engine.advance_one_agent() else {
                break;
            };
            let action_orders: Vec<u32> = report
                .agents
                .iter()
                .filter(|c| c.action != "evicted")
                .map(|c| c.order)
                .collect();
            for (i, &o) in action_orders.iter().enumerate() {
                assert_eq!(o, i as u32);
            }
            let hazard_order = action_orders.len() as u32;
            for change in &report.hazards {
                assert_eq!(change.order, hazard_order);
            }
            for change in &report.walls {
                assert!(change.order <= hazard_order);
            }
            for change in &report.pois {
                assert!(change.order == hazard_order + 1 || change.order == hazard_order + 2);
            }
            for change in report.agents.iter().filter(|c| c.action == "evicted") {
                assert_eq!(change.order, hazard_order + 3);
            }
        }
    }

    #[test]
    fn strategic_mode_rescues_more_often_than_naive() {
        let mut strategic_rescues = 0;
        let mut naive_rescues = 0;
        for seed in 0..5 {
            let mut s = GameEngine::new(PolicyMode::Strategic, seed);
            run_to_end(&mut s);
            strategic_rescues += s.rescued();
            let mut n = GameEngine::new(PolicyMode::Naive, seed);
            run_to_end(&mut n);
            naive_rescues += n.rescued();
        }
        assert!(strategic_rescues >= naive_rescues);
    }
}
