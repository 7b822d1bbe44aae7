use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::environment::{EnvironmentConfig, EnvironmentError, ImageLayerLoader};
use crate::AppPaths;

use super::input::ActionStates;
use super::lifecycle::{GameSetup, Lifecycle, LoopPhase};
use super::metrics::MetricsAccumulator;
use super::rendering::{draw_overlay, OverlayData, Renderer};
use super::{InputAction, InputSnapshot};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub metrics_log_interval: Duration,
    pub overlay_visible: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Duel Arena".to_string(),
            window_width: 800,
            window_height: 600,
            target_fps: 60,
            metrics_log_interval: Duration::from_secs(1),
            overlay_visible: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load background sets: {0}")]
    Environment(#[from] EnvironmentError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window, loads the background sets, and drives `setup` through the
/// `Init -> Running -> Terminated` lifecycle until the window closes.
pub fn run_app(
    config: LoopConfig,
    paths: &AppPaths,
    setup: Box<dyn GameSetup>,
) -> Result<(), AppError> {
    info!(
        root = %paths.root.display(),
        backgrounds_dir = %paths.backgrounds_dir.display(),
        characters_dir = %paths.characters_dir.display(),
        "startup"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(
        Arc::clone(&window),
        config.window_width,
        config.window_height,
    )
    .map_err(AppError::CreateRenderer)?;

    let environment =
        EnvironmentConfig::new(&paths.backgrounds_dir, config.window_width, config.window_height)
            .load(&ImageLayerLoader)?;
    let mut lifecycle = Lifecycle::new(setup, environment);

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_fps = config.target_fps.max(1);
    let frame_target = target_frame_duration(target_fps);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    info!(
        target_fps,
        width = config.window_width,
        height = config.window_height,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_frame_instant = Instant::now();
    let mut overlay_visible = config.overlay_visible;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize_surface(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let was_quit = input_collector.quit_requested;
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested && !was_quit {
                        info!(reason = "escape_key", "shutdown_requested");
                    }
                }
                WindowEvent::RedrawRequested => {
                    let frame_start = Instant::now();
                    let frame_dt = frame_start.saturating_duration_since(last_frame_instant);
                    last_frame_instant = frame_start;

                    let input = input_collector.snapshot_for_frame();
                    if input.was_pressed(InputAction::ToggleOverlay) {
                        overlay_visible = !overlay_visible;
                        info!(overlay_visible, "overlay_toggled");
                    }

                    let phase = {
                        let mut frame = renderer.frame();
                        let phase = lifecycle.advance(&input, &mut frame);
                        if overlay_visible {
                            let overlay = OverlayData {
                                metrics: metrics_accumulator.latest(),
                                target_fps,
                                phase,
                                background_set: lifecycle
                                    .environment()
                                    .map(|environment| environment.current_set_name().to_string()),
                            };
                            draw_overlay(&mut frame, &overlay);
                        }
                        phase
                    };

                    if let Err(error) = renderer.present() {
                        warn!(error = %error, "renderer_draw_failed");
                        lifecycle.request_shutdown();
                        window_target.exit();
                        return;
                    }

                    metrics_accumulator.record_frame(frame_dt);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(frame_start) {
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            phase = ?phase,
                            "loop_metrics"
                        );
                    }

                    if phase == LoopPhase::Terminated {
                        window_target.exit();
                        return;
                    }

                    let cap_sleep = compute_cap_sleep(frame_start.elapsed(), frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }
                }
                _ => {}
            },
            // Every pending window event has been handled by the time this arrives, so a quit
            // seen during the drain ends the loop before the next frame starts.
            Event::AboutToWait => {
                if input_collector.quit_requested {
                    lifecycle.request_shutdown();
                    window_target.exit();
                } else {
                    window.request_redraw();
                }
            }
            Event::LoopExiting => {
                info!(phase = ?lifecycle.phase(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Folds window key events into action states between frames.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.update_action_state_from_physical_key(key_event.physical_key, is_pressed);
    }

    fn snapshot_for_frame(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(self.quit_requested, self.action_states);
        self.action_states.clear_edges();
        snapshot
    }

    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let Some(action) = action_for_key(code) else {
            return;
        };
        self.action_states.set(action, is_pressed);
        if action == InputAction::Quit && is_pressed {
            self.mark_quit_requested();
        }
    }
}

fn action_for_key(code: KeyCode) -> Option<InputAction> {
    match code {
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::KeyW | KeyCode::ArrowUp | KeyCode::Space => Some(InputAction::Jump),
        KeyCode::KeyJ | KeyCode::KeyF => Some(InputAction::Attack),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(InputAction::Confirm),
        KeyCode::F3 => Some(InputAction::ToggleOverlay),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn target_frame_duration(target_fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / target_fps.max(1) as f64)
}

fn compute_cap_sleep(elapsed: Duration, target: Duration) -> Duration {
    target.saturating_sub(elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.update_action_state_from_physical_key(PhysicalKey::Code(code), true);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.update_action_state_from_physical_key(PhysicalKey::Code(code), false);
    }

    #[test]
    fn movement_keys_and_arrows_map_to_the_same_actions() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyA);
        press(&mut input, KeyCode::ArrowUp);

        let snapshot = input.snapshot_for_frame();
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::Jump));
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn press_edge_lasts_exactly_one_frame() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Enter);

        let first = input.snapshot_for_frame();
        let second = input.snapshot_for_frame();

        assert!(first.was_pressed(InputAction::Confirm));
        assert!(!second.was_pressed(InputAction::Confirm));
        assert!(second.is_down(InputAction::Confirm));
    }

    #[test]
    fn held_key_repeat_does_not_retrigger() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyJ);
        input.snapshot_for_frame();
        press(&mut input, KeyCode::KeyJ);
        let repeated = input.snapshot_for_frame();
        release(&mut input, KeyCode::KeyJ);
        press(&mut input, KeyCode::KeyJ);
        let fresh = input.snapshot_for_frame();

        assert!(!repeated.was_pressed(InputAction::Attack));
        assert!(fresh.was_pressed(InputAction::Attack));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyD);
        release(&mut input, KeyCode::KeyD);

        assert!(!input.snapshot_for_frame().is_down(InputAction::MoveRight));
    }

    #[test]
    fn escape_marks_quit_and_stays_marked() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Escape);
        release(&mut input, KeyCode::Escape);

        assert!(input.snapshot_for_frame().quit_requested());
        assert!(input.snapshot_for_frame().quit_requested());
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyQ);
        let snapshot = input.snapshot_for_frame();

        assert!(!snapshot.quit_requested());
        assert_eq!(action_for_key(KeyCode::Tab), None);
        assert_eq!(action_for_key(KeyCode::F3), Some(InputAction::ToggleOverlay));
    }

    #[test]
    fn target_frame_duration_for_60hz_is_expected() {
        let duration = target_frame_duration(60);
        assert!((duration.as_secs_f64() - (1.0 / 60.0)).abs() < 0.000_001);
        assert_eq!(target_frame_duration(0), Duration::from_secs(1));
    }

    #[test]
    fn compute_cap_sleep_zero_when_over_budget() {
        let sleep = compute_cap_sleep(Duration::from_millis(20), target_frame_duration(60));
        assert_eq!(sleep, Duration::ZERO);
    }

    #[test]
    fn compute_cap_sleep_fills_remaining_budget() {
        let target = Duration::from_millis(16);
        let sleep = compute_cap_sleep(Duration::from_millis(5), target);
        assert_eq!(sleep, Duration::from_millis(11));
    }

    #[test]
    fn zero_metrics_interval_falls_back() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(500), Duration::from_secs(1)),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn default_config_is_800_by_600_at_60() {
        let config = LoopConfig::default();
        assert_eq!((config.window_width, config.window_height), (800, 600));
        assert_eq!(config.target_fps, 60);
        assert!(!config.overlay_visible);
    }
}
