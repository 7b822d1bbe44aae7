pub(crate) mod bootstrap;
pub(crate) mod loop_runner;

mod battle;
mod menus;
mod roster;
mod setup;
