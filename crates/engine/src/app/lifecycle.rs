use std::mem;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::environment::Environment;

use super::battle::{Fighter, Match, MatchParts};
use super::input::InputSnapshot;
use super::rendering::Surface;

/// Result of polling a frame-driven flow once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus<T> {
    Pending,
    Complete(T),
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDescriptor {
    pub name: String,
    pub base_folder: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSelection {
    pub background_index: usize,
    pub character: CharacterDescriptor,
}

/// Pre-game screens plus the factory for the match collaborators.
///
/// The flows are polled once per frame until they stop returning `Pending`; each call is
/// expected to draw its own screen into `surface`.
pub trait GameSetup {
    fn show_title_screen(&mut self, input: &InputSnapshot, surface: &mut dyn Surface)
        -> FlowStatus<()>;

    fn selection_flow(
        &mut self,
        input: &InputSnapshot,
        environment: &mut Environment,
        surface: &mut dyn Surface,
    ) -> FlowStatus<MatchSelection>;

    fn build_match(&mut self, selection: &MatchSelection, screen_size: (u32, u32)) -> MatchParts;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    TitleScreen,
    Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Init(InitStep),
    Running,
    Terminated,
}

enum LoopState {
    Init {
        step: InitStep,
        environment: Environment,
    },
    Running(Box<Match>),
    Terminated,
}

/// `Init -> Running -> Terminated`, advanced one frame at a time by the window loop.
pub struct Lifecycle {
    setup: Box<dyn GameSetup>,
    state: LoopState,
}

impl Lifecycle {
    pub fn new(setup: Box<dyn GameSetup>, environment: Environment) -> Self {
        Self {
            setup,
            state: LoopState::Init {
                step: InitStep::TitleScreen,
                environment,
            },
        }
    }

    pub fn phase(&self) -> LoopPhase {
        match &self.state {
            LoopState::Init { step, .. } => LoopPhase::Init(*step),
            LoopState::Running(_) => LoopPhase::Running,
            LoopState::Terminated => LoopPhase::Terminated,
        }
    }

    pub fn environment(&self) -> Option<&Environment> {
        match &self.state {
            LoopState::Init { environment, .. } => Some(environment),
            LoopState::Running(duel) => Some(duel.environment()),
            LoopState::Terminated => None,
        }
    }

    pub fn active_match(&self) -> Option<&Match> {
        match &self.state {
            LoopState::Running(duel) => Some(duel.as_ref()),
            _ => None,
        }
    }

    /// Runs one frame of whatever phase is active and returns the phase after it.
    pub fn advance(&mut self, input: &InputSnapshot, surface: &mut dyn Surface) -> LoopPhase {
        let state = mem::replace(&mut self.state, LoopState::Terminated);
        self.state = match state {
            LoopState::Init {
                step: InitStep::TitleScreen,
                environment,
            } => match self.setup.show_title_screen(input, surface) {
                FlowStatus::Pending => LoopState::Init {
                    step: InitStep::TitleScreen,
                    environment,
                },
                FlowStatus::Complete(()) => {
                    info!("title_screen_accepted");
                    LoopState::Init {
                        step: InitStep::Selection,
                        environment,
                    }
                }
                FlowStatus::Aborted => {
                    info!(reason = "title_declined", "shutdown_requested");
                    LoopState::Terminated
                }
            },
            LoopState::Init {
                step: InitStep::Selection,
                mut environment,
            } => match self.setup.selection_flow(input, &mut environment, surface) {
                FlowStatus::Pending => LoopState::Init {
                    step: InitStep::Selection,
                    environment,
                },
                FlowStatus::Complete(selection) => self.start_match(environment, &selection),
                FlowStatus::Aborted => {
                    info!(reason = "selection_aborted", "shutdown_requested");
                    LoopState::Terminated
                }
            },
            LoopState::Running(mut duel) => {
                duel.run_frame(input, surface);
                LoopState::Running(duel)
            }
            LoopState::Terminated => LoopState::Terminated,
        };
        self.phase()
    }

    /// Quit from the window; there is no way back to `Init`.
    pub fn request_shutdown(&mut self) {
        if !matches!(self.state, LoopState::Terminated) {
            info!(from = ?self.phase(), "lifecycle_terminated");
        }
        self.state = LoopState::Terminated;
    }

    fn start_match(&mut self, mut environment: Environment, selection: &MatchSelection) -> LoopState {
        if let Err(error) = environment.set_background_set(selection.background_index) {
            warn!(
                error = %error,
                kept = environment.current_set(),
                "background_selection_rejected"
            );
        }
        let parts = self.setup.build_match(selection, environment.screen_size());
        info!(
            background_set = environment.current_set_name(),
            character = %selection.character.name,
            player = parts.player.name(),
            opponent = parts.opponent.name(),
            "match_started"
        );
        LoopState::Running(Box::new(Match::new(environment, parts)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::fs;
    use std::rc::Rc;

    use tempfile::TempDir;

    use super::*;
    use crate::app::battle::test_support::*;
    use crate::app::geometry::Vec2;
    use crate::environment::EnvironmentConfig;
    use crate::BattleAgent;

    struct ScriptedSetup {
        log: CallLog,
        title: VecDeque<FlowStatus<()>>,
        selection: VecDeque<FlowStatus<MatchSelection>>,
    }

    impl ScriptedSetup {
        fn new(
            log: &CallLog,
            title: Vec<FlowStatus<()>>,
            selection: Vec<FlowStatus<MatchSelection>>,
        ) -> Self {
            Self {
                log: Rc::clone(log),
                title: title.into(),
                selection: selection.into(),
            }
        }
    }

    impl GameSetup for ScriptedSetup {
        fn show_title_screen(
            &mut self,
            _input: &InputSnapshot,
            _surface: &mut dyn Surface,
        ) -> FlowStatus<()> {
            record(&self.log, "setup.title");
            self.title.pop_front().unwrap_or(FlowStatus::Pending)
        }

        fn selection_flow(
            &mut self,
            _input: &InputSnapshot,
            environment: &mut Environment,
            _surface: &mut dyn Surface,
        ) -> FlowStatus<MatchSelection> {
            record(&self.log, "setup.selection");
            environment.next_background_set();
            self.selection.pop_front().unwrap_or(FlowStatus::Pending)
        }

        fn build_match(
            &mut self,
            _selection: &MatchSelection,
            screen_size: (u32, u32),
        ) -> MatchParts {
            record(&self.log, format!("setup.build_match({screen_size:?})"));
            let mut agent = StubAgent {
                log: Rc::clone(&self.log),
            };
            let player = StubFighter::new("player", &self.log, Vec2::new(100.0, 0.0));
            let opponent = agent.select_character(player.position);
            MatchParts {
                player: Box::new(player),
                opponent,
                agent: Box::new(agent),
                mechanics: Box::new(StubMechanics {
                    log: Rc::clone(&self.log),
                }),
                controls: Box::new(StubControls {
                    log: Rc::clone(&self.log),
                }),
            }
        }
    }

    fn two_set_environment() -> (TempDir, Environment) {
        let temp = TempDir::new().expect("tempdir");
        for set in ["arena", "dojo"] {
            fs::create_dir_all(temp.path().join(set)).expect("set dir");
            fs::write(temp.path().join(set).join("01_back.png"), b"").expect("layer");
        }
        let environment = EnvironmentConfig::new(temp.path(), 160, 120)
            .load(&SolidLoader)
            .expect("environment");
        (temp, environment)
    }

    fn selection(index: usize) -> MatchSelection {
        MatchSelection {
            background_index: index,
            character: CharacterDescriptor {
                name: "Shinobi".to_string(),
                base_folder: PathBuf::from("assets/characters/shinobi"),
            },
        }
    }

    fn surface(log: &CallLog) -> RecordingSurface {
        RecordingSurface {
            log: Rc::clone(log),
            size: (160, 120),
        }
    }

    #[test]
    fn flows_are_polled_until_they_complete() {
        let log = CallLog::default();
        let (_temp, environment) = two_set_environment();
        let setup = ScriptedSetup::new(
            &log,
            vec![FlowStatus::Pending, FlowStatus::Complete(())],
            vec![FlowStatus::Pending, FlowStatus::Complete(selection(1))],
        );
        let mut lifecycle = Lifecycle::new(Box::new(setup), environment);
        let mut surface = surface(&log);
        let input = InputSnapshot::empty();

        assert_eq!(lifecycle.phase(), LoopPhase::Init(InitStep::TitleScreen));
        assert_eq!(
            lifecycle.advance(&input, &mut surface),
            LoopPhase::Init(InitStep::TitleScreen)
        );
        assert_eq!(
            lifecycle.advance(&input, &mut surface),
            LoopPhase::Init(InitStep::Selection)
        );
        assert_eq!(
            lifecycle.advance(&input, &mut surface),
            LoopPhase::Init(InitStep::Selection)
        );
        assert_eq!(lifecycle.advance(&input, &mut surface), LoopPhase::Running);

        let environment = lifecycle.environment().expect("environment");
        assert_eq!(environment.current_set(), 1);
        assert_eq!(environment.current_set_name(), "dojo");
        assert!(log
            .borrow()
            .iter()
            .any(|entry| entry == "setup.build_match((160, 120))"));
    }

    #[test]
    fn running_phase_runs_one_match_frame_per_advance() {
        let log = CallLog::default();
        let (_temp, environment) = two_set_environment();
        let setup = ScriptedSetup::new(
            &log,
            vec![FlowStatus::Complete(())],
            vec![FlowStatus::Complete(selection(0))],
        );
        let mut lifecycle = Lifecycle::new(Box::new(setup), environment);
        let mut surface = surface(&log);
        let input = InputSnapshot::empty();
        lifecycle.advance(&input, &mut surface);
        lifecycle.advance(&input, &mut surface);
        log.borrow_mut().clear();

        lifecycle.advance(&input, &mut surface);
        lifecycle.advance(&input, &mut surface);

        let updates = log
            .borrow()
            .iter()
            .filter(|entry| *entry == "mechanics.update")
            .count();
        assert_eq!(updates, 2);
        assert!(lifecycle.active_match().is_some());
    }

    #[test]
    fn declined_title_terminates_without_selection() {
        let log = CallLog::default();
        let (_temp, environment) = two_set_environment();
        let setup = ScriptedSetup::new(&log, vec![FlowStatus::Aborted], Vec::new());
        let mut lifecycle = Lifecycle::new(Box::new(setup), environment);
        let mut surface = surface(&log);

        let phase = lifecycle.advance(&InputSnapshot::empty(), &mut surface);
        assert_eq!(phase, LoopPhase::Terminated);
        assert!(lifecycle.environment().is_none());

        lifecycle.advance(&InputSnapshot::empty(), &mut surface);
        assert_eq!(*log.borrow(), vec!["setup.title"]);
    }

    #[test]
    fn out_of_range_selection_keeps_the_browsed_set() {
        let log = CallLog::default();
        let (_temp, environment) = two_set_environment();
        let setup = ScriptedSetup::new(
            &log,
            vec![FlowStatus::Complete(())],
            vec![FlowStatus::Complete(selection(9))],
        );
        let mut lifecycle = Lifecycle::new(Box::new(setup), environment);
        let mut surface = surface(&log);
        lifecycle.advance(&InputSnapshot::empty(), &mut surface);

        let phase = lifecycle.advance(&InputSnapshot::empty(), &mut surface);
        assert_eq!(phase, LoopPhase::Running);
        let duel = lifecycle.active_match().expect("match");
        assert_eq!(duel.environment().current_set(), 1);
        assert_eq!(duel.player().name(), "player");
    }

    #[test]
    fn shutdown_is_final() {
        let log = CallLog::default();
        let (_temp, environment) = two_set_environment();
        let setup = ScriptedSetup::new(
            &log,
            vec![FlowStatus::Complete(())],
            vec![FlowStatus::Complete(selection(0))],
        );
        let mut lifecycle = Lifecycle::new(Box::new(setup), environment);
        let mut surface = surface(&log);
        lifecycle.advance(&InputSnapshot::empty(), &mut surface);
        lifecycle.advance(&InputSnapshot::empty(), &mut surface);

        lifecycle.request_shutdown();
        assert_eq!(lifecycle.phase(), LoopPhase::Terminated);
        assert_eq!(
            lifecycle.advance(&InputSnapshot::empty(), &mut surface),
            LoopPhase::Terminated
        );
    }
}
