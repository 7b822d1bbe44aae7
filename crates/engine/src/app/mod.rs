mod battle;
mod geometry;
mod input;
mod lifecycle;
mod loop_runner;
mod metrics;
mod rendering;

pub use battle::{
    AgentState, BattleAgent, CombatMechanics, Controls, Fighter, FighterIntent, FrameReport,
    Match, MatchParts, CLEAR_COLOR, HEALTH_BAR_Y_OFFSET, HIT_DAMAGE,
};
pub use geometry::{Rect, Vec2};
pub use input::{InputAction, InputSnapshot};
pub use lifecycle::{
    CharacterDescriptor, FlowStatus, GameSetup, InitStep, Lifecycle, LoopPhase, MatchSelection,
};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{draw_text, text_width, FrameBuffer, RectPx, Renderer, Surface};
