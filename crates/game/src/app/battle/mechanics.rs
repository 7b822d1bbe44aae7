use engine::{draw_text, text_width, CombatMechanics, Fighter, RectPx, Surface};
use tracing::info;

const BAR_MARGIN: i32 = 20;
const BAR_HEIGHT: i32 = 16;
const BAR_WIDTH_RATIO: f32 = 0.35;
const LABEL_SCALE: i32 = 2;
const BANNER_SCALE: i32 = 5;
const BAR_BACK_COLOR: [u8; 4] = [70, 18, 18, 255];
const BAR_FILL_COLOR: [u8; 4] = [64, 200, 96, 255];
const BAR_LOW_COLOR: [u8; 4] = [230, 170, 40, 255];
const LABEL_COLOR: [u8; 4] = [240, 240, 240, 255];
const BANNER_BG_COLOR: [u8; 4] = [0, 0, 0, 170];
const BANNER_TEXT_COLOR: [u8; 4] = [255, 222, 89, 255];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RoundOutcome {
    Winner(String),
    Draw,
}

/// Overlap-based hit detection plus the health UI. Tracks when the round is decided.
#[derive(Debug, Default)]
pub(crate) struct DuelMechanics {
    outcome: Option<RoundOutcome>,
}

impl DuelMechanics {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl CombatMechanics for DuelMechanics {
    fn update(&mut self, player: &mut dyn Fighter, opponent: &mut dyn Fighter) {
        if self.outcome.is_some() {
            return;
        }
        let outcome = match (player.is_defeated(), opponent.is_defeated()) {
            (false, false) => return,
            (true, true) => RoundOutcome::Draw,
            (false, true) => RoundOutcome::Winner(player.name().to_string()),
            (true, false) => RoundOutcome::Winner(opponent.name().to_string()),
        };
        info!(
            outcome = ?outcome,
            player_health = player.health(),
            opponent_health = opponent.health(),
            "round_over"
        );
        self.outcome = Some(outcome);
    }

    fn check_attack_collision(&mut self, attacker: &dyn Fighter, defender: &dyn Fighter) -> bool {
        if attacker.is_defeated() || defender.is_defeated() {
            return false;
        }
        attacker
            .attack_box()
            .is_some_and(|hit| hit.intersects(&defender.hurtbox()))
    }

    fn draw_health_bar(
        &self,
        surface: &mut dyn Surface,
        player: &dyn Fighter,
        opponent: &dyn Fighter,
        y_offset: i32,
    ) {
        let (width, height) = surface.size();
        let width = width as i32;
        let bar_width = (width as f32 * BAR_WIDTH_RATIO) as i32;

        draw_bar(surface, BAR_MARGIN, y_offset, bar_width, player);
        draw_bar(
            surface,
            width - BAR_MARGIN - bar_width,
            y_offset,
            bar_width,
            opponent,
        );

        if let Some(outcome) = &self.outcome {
            let text = match outcome {
                RoundOutcome::Winner(name) => format!("{} WINS", name.to_uppercase()),
                RoundOutcome::Draw => "DRAW".to_string(),
            };
            draw_banner(surface, &text, width, height as i32);
        }
    }
}

fn draw_bar(surface: &mut dyn Surface, x: i32, y: i32, bar_width: i32, fighter: &dyn Fighter) {
    let ratio = fighter.health() as f32 / fighter.max_health().max(1) as f32;
    let filled = (bar_width as f32 * ratio.clamp(0.0, 1.0)).round() as i32;
    let fill_color = if ratio < 0.25 {
        BAR_LOW_COLOR
    } else {
        BAR_FILL_COLOR
    };
    surface.fill_rect(RectPx::new(x, y, bar_width, BAR_HEIGHT), BAR_BACK_COLOR);
    surface.fill_rect(RectPx::new(x, y, filled, BAR_HEIGHT), fill_color);
    draw_text(
        surface,
        x,
        y + BAR_HEIGHT + 4,
        &fighter.name().to_uppercase(),
        LABEL_COLOR,
        LABEL_SCALE,
    );
}

fn draw_banner(surface: &mut dyn Surface, text: &str, width: i32, height: i32) {
    let text_w = text_width(text, BANNER_SCALE);
    let text_h = 5 * BANNER_SCALE;
    let x = (width - text_w) / 2;
    let y = (height - text_h) / 2;
    surface.fill_rect(
        RectPx::new(0, y - BANNER_SCALE * 3, width, text_h + BANNER_SCALE * 6),
        BANNER_BG_COLOR,
    );
    draw_text(surface, x, y, text, BANNER_TEXT_COLOR, BANNER_SCALE);
}
