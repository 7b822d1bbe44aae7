mod agent;
mod brawler;
mod controls;
mod mechanics;

pub(crate) use agent::RuleBasedAgent;
pub(crate) use brawler::{Brawler, Facing};
pub(crate) use controls::KeyboardControls;
pub(crate) use mechanics::DuelMechanics;
