use engine::{AgentState, BattleAgent, Fighter, FighterIntent, Vec2};
use tracing::{debug, info};

use super::brawler::{Brawler, Facing};
use crate::app::roster::Roster;

pub(crate) const STATE_SIZE: usize = 10;
const DECISION_INTERVAL_FRAMES: u32 = 6;
/// Horizontal gap between bodies at which the agent swings.
const STRIKE_GAP: f32 = 35.0;
/// Gap inside which an enemy swing is worth jumping over.
const THREAT_GAP: f32 = 60.0;
const LOW_HEALTH_RATIO: f32 = 0.25;
/// Distance from the right edge where the agent spawns.
pub(crate) const SPAWN_OFFSET_RIGHT: f32 = 200.0;

mod feature {
    pub const OWN_X: usize = 0;
    pub const OWN_Y: usize = 1;
    pub const OPPONENT_X: usize = 2;
    pub const OPPONENT_Y: usize = 3;
    pub const GAP_X: usize = 4;
    pub const DELTA_Y: usize = 5;
    pub const OWN_HEALTH: usize = 6;
    pub const OPPONENT_HEALTH: usize = 7;
    pub const OWN_ATTACKING: usize = 8;
    pub const OPPONENT_ATTACKING: usize = 9;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AgentAction {
    Idle,
    MoveLeft,
    MoveRight,
    Jump,
    Attack,
    JumpAttack,
}

impl AgentAction {
    fn held_horizontal(self) -> f32 {
        match self {
            AgentAction::MoveLeft => -1.0,
            AgentAction::MoveRight => 1.0,
            _ => 0.0,
        }
    }
}

/// Hand-written opponent: closes distance, swings in range, hops over incoming swings, and
/// backs off when losing badly. Re-decides every few frames and holds movement in between.
pub(crate) struct RuleBasedAgent {
    roster: Roster,
    screen_width: f32,
    screen_height: f32,
    state: AgentState,
    action: AgentAction,
    frames_until_decision: u32,
}

impl RuleBasedAgent {
    pub(crate) fn new(roster: Roster, screen_size: (u32, u32)) -> Self {
        Self {
            roster,
            screen_width: screen_size.0.max(1) as f32,
            screen_height: screen_size.1.max(1) as f32,
            state: AgentState {
                features: vec![0.0; STATE_SIZE],
            },
            action: AgentAction::Idle,
            frames_until_decision: 0,
        }
    }

    /// Maps the opponent's horizontal screen position onto the roster, left to right.
    fn roster_index_for(&self, opponent_x: f32) -> usize {
        let ratio = (opponent_x / self.screen_width).clamp(0.0, 1.0);
        let index = (ratio * self.roster.len() as f32) as usize;
        index.min(self.roster.len().saturating_sub(1))
    }

    fn decide(&self) -> AgentAction {
        let features = &self.state.features;
        let own_health = features[feature::OWN_HEALTH];
        let opponent_health = features[feature::OPPONENT_HEALTH];
        if own_health <= 0.0 || opponent_health <= 0.0 {
            return AgentAction::Idle;
        }

        let gap = features[feature::GAP_X] * self.screen_width;
        let toward = if features[feature::OPPONENT_X] < features[feature::OWN_X] {
            AgentAction::MoveLeft
        } else {
            AgentAction::MoveRight
        };
        let away = match toward {
            AgentAction::MoveLeft => AgentAction::MoveRight,
            _ => AgentAction::MoveLeft,
        };
        let threatened = features[feature::OPPONENT_ATTACKING] > 0.5 && gap <= THREAT_GAP;
        let opponent_above = features[feature::DELTA_Y] < -0.05;

        if threatened && own_health < LOW_HEALTH_RATIO && own_health < opponent_health {
            return away;
        }
        if threatened {
            return if gap <= STRIKE_GAP {
                AgentAction::JumpAttack
            } else {
                AgentAction::Jump
            };
        }
        if gap <= STRIKE_GAP {
            return if opponent_above {
                AgentAction::JumpAttack
            } else {
                AgentAction::Attack
            };
        }
        toward
    }
}

impl BattleAgent for RuleBasedAgent {
    fn select_character(&mut self, opponent_position: Vec2) -> Box<dyn Fighter> {
        let index = self.roster_index_for(opponent_position.x);
        let entry = &self.roster.entries()[index];
        let descriptor = self.roster.descriptor(entry);
        info!(character = %entry.name, opponent_x = opponent_position.x, "agent_character_selected");
        Box::new(Brawler::spawn(
            entry,
            &descriptor.base_folder,
            Vec2::new(self.screen_width - SPAWN_OFFSET_RIGHT, self.screen_height),
            Facing::Left,
            self.screen_height as u32,
        ))
    }

    fn update_state(&mut self, own: &dyn Fighter, opponent: &dyn Fighter) -> AgentState {
        let own_box = own.hurtbox();
        let opponent_box = opponent.hurtbox();
        let gap_x = if opponent_box.left() >= own_box.right() {
            opponent_box.left() - own_box.right()
        } else if own_box.left() >= opponent_box.right() {
            own_box.left() - opponent_box.right()
        } else {
            0.0
        };
        let health_ratio =
            |fighter: &dyn Fighter| fighter.health() as f32 / fighter.max_health().max(1) as f32;
        let flag = |value: bool| if value { 1.0 } else { 0.0 };

        let mut features = vec![0.0; STATE_SIZE];
        features[feature::OWN_X] = own_box.center().x / self.screen_width;
        features[feature::OWN_Y] = own_box.bottom() / self.screen_height;
        features[feature::OPPONENT_X] = opponent_box.center().x / self.screen_width;
        features[feature::OPPONENT_Y] = opponent_box.bottom() / self.screen_height;
        features[feature::GAP_X] = gap_x / self.screen_width;
        features[feature::DELTA_Y] = (opponent_box.bottom() - own_box.bottom()) / self.screen_height;
        features[feature::OWN_HEALTH] = health_ratio(own);
        features[feature::OPPONENT_HEALTH] = health_ratio(opponent);
        features[feature::OWN_ATTACKING] = flag(own.attack_box().is_some());
        features[feature::OPPONENT_ATTACKING] = flag(opponent.attack_box().is_some());

        self.state = AgentState { features };
        self.state.clone()
    }

    fn rational_behavior(&mut self, own: &mut dyn Fighter, _opponent: &dyn Fighter) {
        let decided_now = self.frames_until_decision == 0;
        if decided_now {
            let next = self.decide();
            if next != self.action {
                debug!(from = ?self.action, to = ?next, "agent_action_changed");
            }
            self.action = next;
            self.frames_until_decision = DECISION_INTERVAL_FRAMES;
        }
        self.frames_until_decision -= 1;

        let intent = FighterIntent {
            horizontal: self.action.held_horizontal(),
            jump: decided_now && matches!(self.action, AgentAction::Jump | AgentAction::JumpAttack),
            attack: decided_now
                && matches!(self.action, AgentAction::Attack | AgentAction::JumpAttack),
        };
        own.set_intent(intent);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use engine::Containable;

    use super::*;
    use crate::app::roster::FighterStats;

    const SCREEN: (u32, u32) = (800, 600);

    fn agent() -> RuleBasedAgent {
        RuleBasedAgent::new(Roster::builtin(Path::new("assets/characters")), SCREEN)
    }

    fn fighter_at(x: f32, name: &str) -> Box<dyn Fighter> {
        let roster = Roster::builtin(Path::new("assets/characters"));
        let entry = roster.find(name).expect("entry");
        let mut brawler = Brawler::new(entry, Vec2::new(x, 600.0), Facing::Right, SCREEN.1);
        brawler.apply_gravity();
        brawler.update();
        Box::new(brawler)
    }

    #[test]
    fn character_choice_follows_opponent_position() {
        let mut agent = agent();
        let left = agent.select_character(Vec2::new(100.0, 600.0));
        let middle = agent.select_character(Vec2::new(400.0, 600.0));
        let right = agent.select_character(Vec2::new(790.0, 600.0));

        assert_eq!(left.name(), "Fighter");
        assert_eq!(middle.name(), "Shinobi");
        assert_eq!(right.name(), "Archer");
        assert_eq!(left.position(), Vec2::new(600.0, 600.0));
    }

    #[test]
    fn state_has_ten_normalized_features() {
        let mut agent = agent();
        let own = fighter_at(600.0, "Fighter");
        let opponent = fighter_at(100.0, "Fighter");

        let state = agent.update_state(own.as_ref(), opponent.as_ref());
        assert_eq!(state.features.len(), STATE_SIZE);
        let width = FighterStats::default().width;
        let expected_gap = (600.0 - (100.0 + width)) / SCREEN.0 as f32;
        assert!((state.features[feature::GAP_X] - expected_gap).abs() < 1e-6);
        assert_eq!(state.features[feature::OWN_HEALTH], 1.0);
        assert_eq!(state.features[feature::OPPONENT_ATTACKING], 0.0);
    }

    #[test]
    fn far_opponent_is_approached_and_movement_is_held() {
        let mut agent = agent();
        let mut own = fighter_at(600.0, "Fighter");
        let opponent = fighter_at(100.0, "Fighter");

        for _ in 0..3 {
            agent.update_state(own.as_ref(), opponent.as_ref());
            agent.rational_behavior(own.as_mut(), opponent.as_ref());
            own.update();
        }
        assert_eq!(agent.action, AgentAction::MoveLeft);
        assert_eq!(own.position().x, 600.0 - 3.0 * 5.0);
    }

    #[test]
    fn close_opponent_gets_one_swing_per_decision() {
        let mut agent = agent();
        let mut own = fighter_at(180.0, "Fighter");
        let opponent = fighter_at(100.0, "Fighter");

        agent.update_state(own.as_ref(), opponent.as_ref());
        agent.rational_behavior(own.as_mut(), opponent.as_ref());
        assert_eq!(agent.action, AgentAction::Attack);
        own.update();
        assert!(own.attack_box().is_some());

        agent.update_state(own.as_ref(), opponent.as_ref());
        agent.rational_behavior(own.as_mut(), opponent.as_ref());
        assert_eq!(agent.frames_until_decision, DECISION_INTERVAL_FRAMES - 2);
    }

    #[test]
    fn incoming_swing_triggers_a_jump() {
        let mut agent = agent();
        let own = fighter_at(220.0, "Fighter");
        let mut opponent = fighter_at(110.0, "Fighter");
        opponent.set_intent(FighterIntent {
            attack: true,
            ..FighterIntent::default()
        });
        opponent.update();

        agent.update_state(own.as_ref(), opponent.as_ref());
        assert_eq!(agent.decide(), AgentAction::Jump);
    }

    #[test]
    fn nothing_to_do_once_someone_is_down() {
        let mut agent = agent();
        let own = fighter_at(180.0, "Fighter");
        let mut opponent = fighter_at(100.0, "Fighter");
        opponent.take_damage(1_000);

        agent.update_state(own.as_ref(), opponent.as_ref());
        assert_eq!(agent.decide(), AgentAction::Idle);
    }
}
