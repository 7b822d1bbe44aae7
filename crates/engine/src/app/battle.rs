use tracing::{debug, trace};

use crate::environment::{Containable, Environment};

use super::geometry::{Rect, Vec2};
use super::input::InputSnapshot;
use super::rendering::Surface;

pub const CLEAR_COLOR: [u8; 4] = [0, 0, 0, 255];
pub const HIT_DAMAGE: u32 = 1;
pub const HEALTH_BAR_Y_OFFSET: i32 = 20;

/// What a fighter wants to do this frame. Written by controls or AI, consumed by `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FighterIntent {
    /// -1.0 is full speed left, 1.0 full speed right.
    pub horizontal: f32,
    pub jump: bool,
    pub attack: bool,
}

pub trait Fighter: Containable {
    fn name(&self) -> &str;
    fn set_intent(&mut self, intent: FighterIntent);
    fn apply_gravity(&mut self);
    fn update(&mut self);
    fn draw(&self, surface: &mut dyn Surface);
    fn take_damage(&mut self, amount: u32);
    fn health(&self) -> u32;
    fn max_health(&self) -> u32;
    /// Active hit area while an attack is live.
    fn attack_box(&self) -> Option<Rect>;

    fn hurtbox(&self) -> Rect {
        Rect {
            position: self.position(),
            size: self.extent(),
        }
    }

    fn is_defeated(&self) -> bool {
        self.health() == 0
    }
}

/// Feature vector an agent builds from the current match state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentState {
    pub features: Vec<f32>,
}

pub trait BattleAgent {
    /// Picks and builds the agent's own fighter. Called once while the match is set up.
    fn select_character(&mut self, opponent_position: Vec2) -> Box<dyn Fighter>;
    fn update_state(&mut self, own: &dyn Fighter, opponent: &dyn Fighter) -> AgentState;
    /// Decides and writes this frame's intent for `own`.
    fn rational_behavior(&mut self, own: &mut dyn Fighter, opponent: &dyn Fighter);

    fn apply_gravity(&mut self, own: &mut dyn Fighter) {
        own.apply_gravity();
    }
}

pub trait CombatMechanics {
    fn update(&mut self, player: &mut dyn Fighter, opponent: &mut dyn Fighter);
    fn check_attack_collision(&mut self, attacker: &dyn Fighter, defender: &dyn Fighter) -> bool;
    fn draw_health_bar(
        &self,
        surface: &mut dyn Surface,
        player: &dyn Fighter,
        opponent: &dyn Fighter,
        y_offset: i32,
    );
}

pub trait Controls {
    fn handle_player_input(&mut self, input: &InputSnapshot, character: &mut dyn Fighter);
}

/// Collaborators a match is assembled from.
pub struct MatchParts {
    pub player: Box<dyn Fighter>,
    pub opponent: Box<dyn Fighter>,
    pub agent: Box<dyn BattleAgent>,
    pub mechanics: Box<dyn CombatMechanics>,
    pub controls: Box<dyn Controls>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub opponent_hit: bool,
    pub player_hit: bool,
}

/// One running duel: the environment plus both fighters and the collaborators that drive
/// them. `run_frame` is the only place the per-frame order is defined.
pub struct Match {
    environment: Environment,
    player: Box<dyn Fighter>,
    opponent: Box<dyn Fighter>,
    agent: Box<dyn BattleAgent>,
    mechanics: Box<dyn CombatMechanics>,
    controls: Box<dyn Controls>,
    agent_state: AgentState,
    frame_index: u64,
}

impl Match {
    pub fn new(environment: Environment, parts: MatchParts) -> Self {
        Self {
            environment,
            player: parts.player,
            opponent: parts.opponent,
            agent: parts.agent,
            mechanics: parts.mechanics,
            controls: parts.controls,
            agent_state: AgentState::default(),
            frame_index: 0,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn player(&self) -> &dyn Fighter {
        self.player.as_ref()
    }

    pub fn opponent(&self) -> &dyn Fighter {
        self.opponent.as_ref()
    }

    pub fn agent_state(&self) -> &AgentState {
        &self.agent_state
    }

    /// Simulates and draws one frame into `surface`. Presenting the frame and draining
    /// window events are left to the caller.
    pub fn run_frame(&mut self, input: &InputSnapshot, surface: &mut dyn Surface) -> FrameReport {
        surface.clear(CLEAR_COLOR);
        self.environment.draw(surface);

        self.controls
            .handle_player_input(input, self.player.as_mut());

        self.agent_state = self
            .agent
            .update_state(self.opponent.as_ref(), self.player.as_ref());
        self.agent
            .rational_behavior(self.opponent.as_mut(), self.player.as_ref());

        self.player.apply_gravity();
        self.agent.apply_gravity(self.opponent.as_mut());

        self.player.update();
        self.opponent.update();

        self.environment
            .constrain_character_position(self.player.as_mut());
        self.environment
            .constrain_character_position(self.opponent.as_mut());

        self.mechanics
            .update(self.player.as_mut(), self.opponent.as_mut());

        let opponent_hit = self
            .mechanics
            .check_attack_collision(self.player.as_ref(), self.opponent.as_ref());
        if opponent_hit {
            self.opponent.take_damage(HIT_DAMAGE);
        }
        let player_hit = self
            .mechanics
            .check_attack_collision(self.opponent.as_ref(), self.player.as_ref());
        if player_hit {
            self.player.take_damage(HIT_DAMAGE);
        }
        if opponent_hit || player_hit {
            debug!(
                frame = self.frame_index,
                opponent_hit,
                player_hit,
                player_health = self.player.health(),
                opponent_health = self.opponent.health(),
                "attack_landed"
            );
        }

        self.player.draw(surface);
        self.opponent.draw(surface);
        self.mechanics.draw_health_bar(
            surface,
            self.player.as_ref(),
            self.opponent.as_ref(),
            HEALTH_BAR_Y_OFFSET,
        );

        let report = FrameReport {
            frame_index: self.frame_index,
            opponent_hit,
            player_hit,
        };
        trace!(frame = self.frame_index, "frame_simulated");
        self.frame_index = self.frame_index.saturating_add(1);
        report
    }
}
