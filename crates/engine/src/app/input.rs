#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Attack,
    Confirm,
    ToggleOverlay,
    Quit,
}

const ACTION_COUNT: usize = 7;

/// Held state plus press edges for every action. Edges live for exactly one frame.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = true;
        }
        self.down[index] = is_down;
    }

    pub(crate) fn set_pressed(&mut self, action: InputAction, pressed: bool) {
        self.pressed[action.index()] = pressed;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }

    pub(crate) fn clear_edges(&mut self) {
        self.pressed = [false; ACTION_COUNT];
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Attack => 3,
            InputAction::Confirm => 4,
            InputAction::ToggleOverlay => 5,
            InputAction::Quit => 6,
        }
    }
}

/// Input as seen by one frame of the game.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(quit_requested: bool, actions: ActionStates) -> Self {
        Self {
            quit_requested,
            actions,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self.actions.set_pressed(action, false);
        self
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self.actions.set_pressed(action, true);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_press_sets_edge_and_hold_does_not() {
        let mut states = ActionStates::default();
        states.set(InputAction::Jump, true);
        assert!(states.was_pressed(InputAction::Jump));

        states.clear_edges();
        states.set(InputAction::Jump, true);
        assert!(!states.was_pressed(InputAction::Jump));
        assert!(states.is_down(InputAction::Jump));
    }

    #[test]
    fn release_then_press_sets_new_edge() {
        let mut states = ActionStates::default();
        states.set(InputAction::Attack, true);
        states.clear_edges();
        states.set(InputAction::Attack, false);
        states.set(InputAction::Attack, true);
        assert!(states.was_pressed(InputAction::Attack));
    }

    #[test]
    fn snapshot_builders_separate_held_from_pressed() {
        let held = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
        assert!(held.is_down(InputAction::MoveLeft));
        assert!(!held.was_pressed(InputAction::MoveLeft));

        let pressed = InputSnapshot::empty().with_action_pressed(InputAction::Confirm);
        assert!(pressed.is_down(InputAction::Confirm));
        assert!(pressed.was_pressed(InputAction::Confirm));
    }
}
