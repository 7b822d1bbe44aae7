use std::env;

use engine::{resolve_app_paths, AppPaths, LoopConfig, StartupError};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::roster::{Roster, RosterError};
use super::setup::DuelSetup;

const TARGET_FPS_ENV_VAR: &str = "DUEL_TARGET_FPS";
const WINDOW_SIZE_ENV_VAR: &str = "DUEL_WINDOW_SIZE";
const MAX_TARGET_FPS: u32 = 1_000;

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
    pub(crate) setup: DuelSetup,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Duel Arena Startup ===");

    let paths = resolve_app_paths()?;
    let roster = Roster::load(&paths.characters_dir)?;
    let config = apply_env_overrides(
        LoopConfig::default(),
        read_env(TARGET_FPS_ENV_VAR).as_deref(),
        read_env(WINDOW_SIZE_ENV_VAR).as_deref(),
    );

    Ok(AppWiring {
        config,
        paths,
        setup: DuelSetup::new(roster),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn read_env(var: &'static str) -> Option<String> {
    match env::var(var) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(error) => {
            warn!(env_var = var, error = %error, "unable to read env var; using default");
            None
        }
    }
}

fn apply_env_overrides(
    mut config: LoopConfig,
    target_fps: Option<&str>,
    window_size: Option<&str>,
) -> LoopConfig {
    if let Some(raw) = target_fps {
        match parse_target_fps(raw) {
            Some(fps) => config.target_fps = fps,
            None => warn!(
                env_var = TARGET_FPS_ENV_VAR,
                value = raw,
                "invalid target fps; using default"
            ),
        }
    }
    if let Some(raw) = window_size {
        match parse_window_size(raw) {
            Some((width, height)) => {
                config.window_width = width;
                config.window_height = height;
            }
            None => warn!(
                env_var = WINDOW_SIZE_ENV_VAR,
                value = raw,
                "invalid window size, expected WIDTHxHEIGHT; using default"
            ),
        }
    }
    config
}

fn parse_target_fps(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|fps| (1..=MAX_TARGET_FPS).contains(fps))
}

fn parse_window_size(raw: &str) -> Option<(u32, u32)> {
    let (width, height) = raw.trim().split_once(['x', 'X'])?;
    let width = width.trim().parse::<u32>().ok()?;
    let height = height.trim().parse::<u32>().ok()?;
    (width > 0 && height > 0).then_some((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_fps_accepts_sane_values_only() {
        assert_eq!(parse_target_fps("144"), Some(144));
        assert_eq!(parse_target_fps(" 30 "), Some(30));
        assert_eq!(parse_target_fps("0"), None);
        assert_eq!(parse_target_fps("fast"), None);
        assert_eq!(parse_target_fps("5000"), None);
    }

    #[test]
    fn window_size_parses_width_by_height() {
        assert_eq!(parse_window_size("1024x768"), Some((1024, 768)));
        assert_eq!(parse_window_size("640X480"), Some((640, 480)));
        assert_eq!(parse_window_size("0x480"), None);
        assert_eq!(parse_window_size("1024"), None);
        assert_eq!(parse_window_size("axb"), None);
    }

    #[test]
    fn invalid_overrides_keep_defaults() {
        let config = apply_env_overrides(LoopConfig::default(), Some("-3"), Some("huge"));
        assert_eq!(config.target_fps, 60);
        assert_eq!((config.window_width, config.window_height), (800, 600));

        let config = apply_env_overrides(LoopConfig::default(), Some("30"), Some("320x240"));
        assert_eq!(config.target_fps, 30);
        assert_eq!((config.window_width, config.window_height), (320, 240));
    }
}
