use engine::{
    draw_text, text_width, Environment, FlowStatus, InputAction, InputSnapshot, MatchSelection,
    RectPx, Surface,
};
use tracing::{debug, info};

use crate::app::roster::Roster;

const TITLE_BG_COLOR: [u8; 4] = [14, 16, 28, 255];
const TITLE_COLOR: [u8; 4] = [255, 222, 89, 255];
const TEXT_COLOR: [u8; 4] = [236, 240, 246, 255];
const HINT_COLOR: [u8; 4] = [150, 160, 178, 255];
const PANEL_COLOR: [u8; 4] = [0, 0, 0, 160];
const HIGHLIGHT_COLOR: [u8; 4] = [255, 222, 89, 255];
const TITLE_SCALE: i32 = 8;
const TEXT_SCALE: i32 = 3;
const HINT_SCALE: i32 = 2;
const SWATCH_SIZE: i32 = 48;
const SWATCH_GAP: i32 = 40;

/// "Press Enter to fight, Escape to quit."
#[derive(Debug, Default)]
pub(crate) struct TitleScreen;

impl TitleScreen {
    pub(crate) fn poll(&mut self, input: &InputSnapshot, surface: &mut dyn Surface) -> FlowStatus<()> {
        if input.quit_requested() || input.was_pressed(InputAction::Quit) {
            return FlowStatus::Aborted;
        }
        if input.was_pressed(InputAction::Confirm) {
            return FlowStatus::Complete(());
        }

        let (width, height) = surface.size();
        let (width, height) = (width as i32, height as i32);
        surface.clear(TITLE_BG_COLOR);
        draw_centered(surface, "DUEL ARENA", width, height / 3, TITLE_COLOR, TITLE_SCALE);
        draw_centered(
            surface,
            "PRESS ENTER TO FIGHT",
            width,
            height / 2 + 20,
            TEXT_COLOR,
            TEXT_SCALE,
        );
        draw_centered(
            surface,
            "ESC TO QUIT",
            width,
            height / 2 + 60,
            HINT_COLOR,
            HINT_SCALE,
        );
        FlowStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionStage {
    Background,
    Character { background_index: usize },
}

/// Two stages: browse background sets live on the environment, then pick a character.
#[derive(Debug)]
pub(crate) struct SelectionFlow {
    stage: SelectionStage,
    character_cursor: usize,
}

impl Default for SelectionFlow {
    fn default() -> Self {
        Self {
            stage: SelectionStage::Background,
            character_cursor: 0,
        }
    }
}

impl SelectionFlow {
    pub(crate) fn poll(
        &mut self,
        input: &InputSnapshot,
        environment: &mut Environment,
        roster: &Roster,
        surface: &mut dyn Surface,
    ) -> FlowStatus<MatchSelection> {
        if input.quit_requested() || input.was_pressed(InputAction::Quit) {
            return FlowStatus::Aborted;
        }

        match self.stage {
            SelectionStage::Background => {
                if input.was_pressed(InputAction::MoveLeft) {
                    environment.previous_background_set();
                    debug!(set = environment.current_set_name(), "background_browsed");
                } else if input.was_pressed(InputAction::MoveRight) {
                    environment.next_background_set();
                    debug!(set = environment.current_set_name(), "background_browsed");
                }
                if input.was_pressed(InputAction::Confirm) {
                    let background_index = environment.current_set();
                    info!(
                        background_index,
                        set = environment.current_set_name(),
                        "background_chosen"
                    );
                    self.stage = SelectionStage::Character { background_index };
                }
            }
            SelectionStage::Character { background_index } => {
                let count = roster.len().max(1);
                if input.was_pressed(InputAction::MoveLeft) {
                    self.character_cursor = (self.character_cursor + count - 1) % count;
                } else if input.was_pressed(InputAction::MoveRight) {
                    self.character_cursor = (self.character_cursor + 1) % count;
                }
                if input.was_pressed(InputAction::Confirm) {
                    if let Some(entry) = roster.get(self.character_cursor) {
                        info!(character = %entry.name, "character_chosen");
                        return FlowStatus::Complete(MatchSelection {
                            background_index,
                            character: roster.descriptor(entry),
                        });
                    }
                }
            }
        }

        self.draw(environment, roster, surface);
        FlowStatus::Pending
    }

    fn draw(&self, environment: &Environment, roster: &Roster, surface: &mut dyn Surface) {
        let (width, height) = surface.size();
        let (width, height) = (width as i32, height as i32);
        environment.draw(surface);
        surface.fill_rect(RectPx::new(0, 0, width, 90), PANEL_COLOR);

        match self.stage {
            SelectionStage::Background => {
                let caption = format!(
                    "STAGE: {} ({}/{})",
                    environment.current_set_name().to_uppercase(),
                    environment.current_set() + 1,
                    environment.set_count()
                );
                draw_centered(surface, &caption, width, 24, TEXT_COLOR, TEXT_SCALE);
            }
            SelectionStage::Character { .. } => {
                draw_centered(surface, "CHOOSE YOUR FIGHTER", width, 24, TEXT_COLOR, TEXT_SCALE);
                self.draw_roster(roster, surface, width, height);
            }
        }
        draw_centered(
            surface,
            "LEFT/RIGHT TO BROWSE, ENTER TO CONFIRM",
            width,
            62,
            HINT_COLOR,
            HINT_SCALE,
        );
    }

    fn draw_roster(&self, roster: &Roster, surface: &mut dyn Surface, width: i32, height: i32) {
        let count = roster.len() as i32;
        let row_width = count * SWATCH_SIZE + (count - 1).max(0) * SWATCH_GAP;
        let mut x = (width - row_width) / 2;
        let y = height / 2 - SWATCH_SIZE / 2;
        for (index, entry) in roster.entries().iter().enumerate() {
            if index == self.character_cursor {
                surface.fill_rect(
                    RectPx::new(x - 4, y - 4, SWATCH_SIZE + 8, SWATCH_SIZE + 8),
                    HIGHLIGHT_COLOR,
                );
            }
            let [r, g, b] = entry.color;
            surface.fill_rect(RectPx::new(x, y, SWATCH_SIZE, SWATCH_SIZE), [r, g, b, 255]);
            let label = entry.name.to_uppercase();
            let label_x = x + (SWATCH_SIZE - text_width(&label, HINT_SCALE)) / 2;
            draw_text(surface, label_x, y + SWATCH_SIZE + 12, &label, TEXT_COLOR, HINT_SCALE);
            x += SWATCH_SIZE + SWATCH_GAP;
        }
    }
}

fn draw_centered(
    surface: &mut dyn Surface,
    text: &str,
    width: i32,
    y: i32,
    color: [u8; 4],
    scale: i32,
) {
    let x = (width - text_width(text, scale)) / 2;
    draw_text(surface, x, y, text, color, scale);
}
