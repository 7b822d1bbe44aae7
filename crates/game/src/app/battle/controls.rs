use engine::{Controls, Fighter, FighterIntent, InputAction, InputSnapshot};

/// Held left/right moves, jump and attack fire on the press edge only.
#[derive(Debug, Default)]
pub(crate) struct KeyboardControls;

impl Controls for KeyboardControls {
    fn handle_player_input(&mut self, input: &InputSnapshot, character: &mut dyn Fighter) {
        character.set_intent(intent_from_input(input));
    }
}

fn intent_from_input(input: &InputSnapshot) -> FighterIntent {
    let axis = |action| if input.is_down(action) { 1.0 } else { 0.0 };
    FighterIntent {
        horizontal: axis(InputAction::MoveRight) - axis(InputAction::MoveLeft),
        jump: input.was_pressed(InputAction::Jump),
        attack: input.was_pressed(InputAction::Attack),
    }
}
