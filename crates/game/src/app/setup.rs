use engine::{
    BattleAgent, Environment, FlowStatus, GameSetup, InputSnapshot, MatchParts, MatchSelection,
    Surface, Vec2,
};
use tracing::warn;

use super::battle::{Brawler, DuelMechanics, Facing, KeyboardControls, RuleBasedAgent};
use super::menus::{SelectionFlow, TitleScreen};
use super::roster::Roster;

const PLAYER_SPAWN_X: f32 = 100.0;

/// Wires the menus, roster, and reference collaborators into the engine lifecycle.
pub(crate) struct DuelSetup {
    roster: Roster,
    title: TitleScreen,
    selection: SelectionFlow,
}

impl DuelSetup {
    pub(crate) fn new(roster: Roster) -> Self {
        Self {
            roster,
            title: TitleScreen,
            selection: SelectionFlow::default(),
        }
    }
}

impl GameSetup for DuelSetup {
    fn show_title_screen(
        &mut self,
        input: &InputSnapshot,
        surface: &mut dyn Surface,
    ) -> FlowStatus<()> {
        self.title.poll(input, surface)
    }

    fn selection_flow(
        &mut self,
        input: &InputSnapshot,
        environment: &mut Environment,
        surface: &mut dyn Surface,
    ) -> FlowStatus<MatchSelection> {
        self.selection
            .poll(input, environment, &self.roster, surface)
    }

    fn build_match(&mut self, selection: &MatchSelection, screen_size: (u32, u32)) -> MatchParts {
        let (_, screen_height) = screen_size;
        let entry = match self.roster.find(&selection.character.name) {
            Some(entry) => entry,
            None => {
                warn!(
                    character = %selection.character.name,
                    "selected_character_not_in_roster_using_first"
                );
                &self.roster.entries()[0]
            }
        };
        let player = Brawler::spawn(
            entry,
            &selection.character.base_folder,
            Vec2::new(PLAYER_SPAWN_X, screen_height as f32),
            Facing::Right,
            screen_height,
        );

        let mut agent = RuleBasedAgent::new(self.roster.clone(), screen_size);
        let opponent = agent.select_character(Vec2::new(PLAYER_SPAWN_X, screen_height as f32));

        MatchParts {
            player: Box::new(player),
            opponent,
            agent: Box::new(agent),
            mechanics: Box::new(DuelMechanics::new()),
            controls: Box::new(KeyboardControls),
        }
    }
}
