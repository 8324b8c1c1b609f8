#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Math Snake.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! All `macroquad::ui` calls live inside the local `ui` module.

mod ui;

use self::ui::{draw_side_panel_ui, SidePanelUiContext};
use anyhow::Result;
use log::info;
use macroquad::{
    input::{is_key_pressed, KeyCode},
    math::Vec2 as MacroquadVec2,
};
use math_snake_core::{FatalCollision, GridPosition, Heading, Operation};
use math_snake_rendering::{
    Color, FrameInput, GridPresentation, Overlay, Presentation, RenderingBackend, Scene,
};
use std::time::Duration;

const PANEL_WIDTH: f32 = 280.0;
const SCENE_MARGIN: f32 = 24.0;

/// Tracks UI-sourced interactions so they can be merged with physical input on the next frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlPanelInputState {
    steer_latched: Option<Heading>,
    operation_latched: Option<Operation>,
    pause_latched: bool,
    restart_latched: bool,
    menu_latched: bool,
}

impl ControlPanelInputState {
    /// Returns the latched D-pad heading, clearing it so the action fires once.
    pub fn take_steer(&mut self) -> Option<Heading> {
        self.steer_latched.take()
    }

    /// Records that a D-pad button was pressed this frame.
    pub fn register_steer(&mut self, heading: Heading) {
        self.steer_latched = Some(heading);
    }

    /// Returns the latched operation choice, clearing it so the action fires once.
    pub fn take_operation(&mut self) -> Option<Operation> {
        self.operation_latched.take()
    }

    /// Records that an operation button was pressed this frame.
    pub fn register_operation(&mut self, operation: Operation) {
        self.operation_latched = Some(operation);
    }

    /// Returns whether the pause button was pressed and clears the latch.
    pub fn take_pause_toggle(&mut self) -> bool {
        std::mem::take(&mut self.pause_latched)
    }

    /// Records that the pause button was pressed this frame.
    pub fn register_pause_toggle(&mut self) {
        self.pause_latched = true;
    }

    /// Returns whether the restart button was pressed and clears the latch.
    pub fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_latched)
    }

    /// Records that the restart button was pressed this frame.
    pub fn register_restart(&mut self) {
        self.restart_latched = true;
    }

    /// Returns whether the menu button was pressed and clears the latch.
    pub fn take_return_to_menu(&mut self) -> bool {
        std::mem::take(&mut self.menu_latched)
    }

    /// Records that the menu button was pressed this frame.
    pub fn register_return_to_menu(&mut self) {
        self.menu_latched = true;
    }
}

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct KeyboardShortcuts {
    /// `Q` quits the game loop.
    quit_requested: bool,
    /// Arrow keys, in `Up`, `Down`, `Left`, `Right` order.
    steer: Vec<Heading>,
    /// `Space` toggles pause.
    toggle_pause: bool,
    /// `R` restarts.
    restart: bool,
    /// `M` or `Escape` returns to the menu.
    return_to_menu: bool,
    /// `1` to `4` pick an operation.
    operation: Option<Operation>,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        let arrows = [
            (KeyCode::Up, Heading::Up),
            (KeyCode::Down, Heading::Down),
            (KeyCode::Left, Heading::Left),
            (KeyCode::Right, Heading::Right),
        ];
        let digits = [KeyCode::Key1, KeyCode::Key2, KeyCode::Key3, KeyCode::Key4];

        Self {
            quit_requested: is_key_pressed(KeyCode::Q),
            steer: arrows
                .into_iter()
                .filter(|(key, _)| is_key_pressed(*key))
                .map(|(_, heading)| heading)
                .collect(),
            toggle_pause: is_key_pressed(KeyCode::Space),
            restart: is_key_pressed(KeyCode::R),
            return_to_menu: is_key_pressed(KeyCode::M) || is_key_pressed(KeyCode::Escape),
            operation: digits
                .into_iter()
                .zip(Operation::ALL)
                .find(|(key, _)| is_key_pressed(*key))
                .map(|(_, operation)| operation),
        }
    }
}

fn frame_input_from_observations(
    keyboard: KeyboardShortcuts,
    panel: &mut ControlPanelInputState,
) -> FrameInput {
    let mut steer = keyboard.steer;
    if let Some(heading) = panel.take_steer() {
        steer.push(heading);
    }

    FrameInput {
        steer,
        toggle_pause: keyboard.toggle_pause | panel.take_pause_toggle(),
        select_operation: panel.take_operation().or(keyboard.operation),
        restart: keyboard.restart | panel.take_restart(),
        return_to_menu: keyboard.return_to_menu | panel.take_return_to_menu(),
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the average rate once one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;
        scene.grid.validate()?;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 860,
            window_height: 560,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let panel_background = to_macroquad_color(clear_color.lighten(0.08));
            let mut fps_counter = FpsCounter::default();
            let mut panel_input = ControlPanelInputState::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = frame_input_from_observations(keyboard, &mut panel_input);

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_grid(&scene.grid, screen_width, screen_height);
                draw_grid(&scene.grid, &metrics);
                draw_targets(&scene, &metrics);
                draw_actor(&scene, &metrics);
                draw_overlay(scene.overlay, &metrics);

                let panel_left = (screen_width - PANEL_WIDTH).max(0.0);
                macroquad::shapes::draw_rectangle(
                    panel_left,
                    0.0,
                    PANEL_WIDTH,
                    screen_height,
                    panel_background,
                );
                let mut side_panel_ui = macroquad::ui::root_ui();
                let result = draw_side_panel_ui(
                    &mut side_panel_ui,
                    SidePanelUiContext {
                        origin: MacroquadVec2::new(panel_left, 0.0),
                        size: MacroquadVec2::new(PANEL_WIDTH, screen_height),
                        background: panel_background,
                        hud: &scene.hud,
                        overlay: scene.overlay,
                    },
                );
                if let Some(heading) = result.steer {
                    panel_input.register_steer(heading);
                }
                if let Some(operation) = result.operation {
                    panel_input.register_operation(operation);
                }
                if result.toggle_pause {
                    panel_input.register_pause_toggle();
                }
                if result.restart {
                    panel_input.register_restart();
                }
                if result.return_to_menu {
                    panel_input.register_return_to_menu();
                }

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        info!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Screen-space placement of the grid for the current window size.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    offset_x: f32,
    offset_y: f32,
    cell_step: f32,
    grid_length: f32,
}

impl SceneMetrics {
    fn from_grid(grid: &GridPresentation, screen_width: f32, screen_height: f32) -> Self {
        let available_width = (screen_width - PANEL_WIDTH - 2.0 * SCENE_MARGIN).max(0.0);
        let available_height = (screen_height - 2.0 * SCENE_MARGIN).max(0.0);
        let world_length = grid.length();
        let scale = if world_length <= f32::EPSILON {
            0.0
        } else {
            (available_width.min(available_height) / world_length).max(0.0)
        };
        let grid_length = world_length * scale;

        Self {
            offset_x: SCENE_MARGIN + (available_width - grid_length) * 0.5,
            offset_y: SCENE_MARGIN + (available_height - grid_length) * 0.5,
            cell_step: grid.cell_length * scale,
            grid_length,
        }
    }

    fn cell_origin(&self, grid: &GridPresentation, cell: GridPosition) -> (f32, f32) {
        let world = grid.cell_origin(cell);
        self.to_screen(grid, world.x, world.y)
    }

    fn cell_center(&self, grid: &GridPresentation, cell: GridPosition) -> (f32, f32) {
        let world = grid.cell_center(cell);
        self.to_screen(grid, world.x, world.y)
    }

    fn to_screen(&self, grid: &GridPresentation, x: f32, y: f32) -> (f32, f32) {
        let scale = if grid.cell_length <= f32::EPSILON {
            0.0
        } else {
            self.cell_step / grid.cell_length
        };
        (self.offset_x + x * scale, self.offset_y + y * scale)
    }
}

fn draw_grid(grid: &GridPresentation, metrics: &SceneMetrics) {
    let grid_color = to_macroquad_color(grid.line_color);
    for index in 0..=grid.side {
        let step = index as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(
            metrics.offset_x + step,
            metrics.offset_y,
            metrics.offset_x + step,
            metrics.offset_y + metrics.grid_length,
            1.0,
            grid_color,
        );
        macroquad::shapes::draw_line(
            metrics.offset_x,
            metrics.offset_y + step,
            metrics.offset_x + metrics.grid_length,
            metrics.offset_y + step,
            1.0,
            grid_color,
        );
    }
}

fn draw_targets(scene: &Scene, metrics: &SceneMetrics) {
    let fill = to_macroquad_color(scene.palette.target);
    let text = to_macroquad_color(scene.palette.text);
    let inset = metrics.cell_step * 0.08;

    for target in &scene.targets {
        let (x, y) = metrics.cell_origin(&scene.grid, target.position);
        let size = metrics.cell_step - 2.0 * inset;
        macroquad::shapes::draw_rectangle(x + inset, y + inset, size, size, fill);
        let (center_x, center_y) = metrics.cell_center(&scene.grid, target.position);
        draw_centered_text(
            &target.value.to_string(),
            center_x,
            center_y,
            metrics.cell_step * 0.55,
            text,
        );
    }
}

fn draw_actor(scene: &Scene, metrics: &SceneMetrics) {
    let head = to_macroquad_color(scene.palette.head);
    let body = to_macroquad_color(scene.palette.body);
    let inset = metrics.cell_step * 0.05;

    for cell in scene.actor.iter().rev() {
        let (x, y) = metrics.cell_origin(&scene.grid, cell.position);
        let size = metrics.cell_step - 2.0 * inset;
        let color = if cell.is_head { head } else { body };
        macroquad::shapes::draw_rectangle(x + inset, y + inset, size, size, color);
    }

    if let Some(cell) = scene.actor.iter().find(|cell| cell.is_head) {
        let center = metrics.cell_center(&scene.grid, cell.position);
        let reach = metrics.cell_step * 0.25;
        let (dx, dy) = match scene.heading {
            Heading::Up => (0.0, -reach),
            Heading::Down => (0.0, reach),
            Heading::Left => (-reach, 0.0),
            Heading::Right => (reach, 0.0),
        };
        macroquad::shapes::draw_circle(
            center.0 + dx,
            center.1 + dy,
            metrics.cell_step * 0.1,
            macroquad::color::WHITE,
        );
    }
}

fn draw_overlay(overlay: Option<Overlay>, metrics: &SceneMetrics) {
    let Some(overlay) = overlay else {
        return;
    };

    let shade = macroquad::color::Color::new(0.0, 0.0, 0.0, 0.55);
    macroquad::shapes::draw_rectangle(
        metrics.offset_x,
        metrics.offset_y,
        metrics.grid_length,
        metrics.grid_length,
        shade,
    );

    let headline = match overlay {
        Overlay::OperationMenu => "Pick an operation to start".to_owned(),
        Overlay::Paused => "Paused".to_owned(),
        Overlay::GameOver { cause, score } => {
            let reason = match cause {
                Some(FatalCollision::OutOfBounds) => "Hit the wall",
                Some(FatalCollision::SelfCollision) => "Ran into yourself",
                None => "Game over",
            };
            format!("{reason}! Final score: {score}")
        }
    };

    draw_centered_text(
        &headline,
        metrics.offset_x + metrics.grid_length * 0.5,
        metrics.offset_y + metrics.grid_length * 0.5,
        (metrics.grid_length / 16.0).max(14.0),
        macroquad::color::WHITE,
    );
}

fn draw_centered_text(
    text: &str,
    center_x: f32,
    center_y: f32,
    font_size: f32,
    color: macroquad::color::Color,
) {
    let size = font_size.clamp(1.0, f32::from(u16::MAX)) as u16;
    let dimensions = macroquad::text::measure_text(text, None, size, 1.0);
    let _ = macroquad::text::draw_text(
        text,
        center_x - dimensions.width * 0.5,
        center_y + dimensions.offset_y * 0.5,
        font_size,
        color,
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridPresentation {
        GridPresentation {
            side: 15,
            cell_length: 32.0,
            line_color: Color::from_rgb_u8(0, 0, 0),
        }
    }

    #[test]
    fn panel_latches_merge_with_keyboard_input() {
        let mut panel = ControlPanelInputState::default();
        panel.register_steer(Heading::Down);
        panel.register_pause_toggle();

        let keyboard = KeyboardShortcuts {
            steer: vec![Heading::Left],
            ..KeyboardShortcuts::default()
        };
        let input = frame_input_from_observations(keyboard, &mut panel);

        assert_eq!(input.steer, vec![Heading::Left, Heading::Down]);
        assert!(input.toggle_pause);
        assert!(!input.restart);

        let next = frame_input_from_observations(KeyboardShortcuts::default(), &mut panel);
        assert!(next.is_empty());
    }

    #[test]
    fn panel_operation_wins_over_keyboard_digit() {
        let mut panel = ControlPanelInputState::default();
        panel.register_operation(Operation::Divide);
        let keyboard = KeyboardShortcuts {
            operation: Some(Operation::Add),
            ..KeyboardShortcuts::default()
        };

        let input = frame_input_from_observations(keyboard, &mut panel);

        assert_eq!(input.select_operation, Some(Operation::Divide));
    }

    #[test]
    fn metrics_fit_the_grid_left_of_the_panel() {
        let metrics = SceneMetrics::from_grid(&grid(), 860.0, 560.0);

        assert!(metrics.grid_length <= 560.0 - 2.0 * SCENE_MARGIN + 1e-3);
        assert!(metrics.offset_x + metrics.grid_length <= 860.0 - PANEL_WIDTH);
        assert!((metrics.cell_step * 15.0 - metrics.grid_length).abs() < 1e-3);
    }

    #[test]
    fn cell_origin_scales_from_the_grid_offset() {
        let grid = grid();
        let metrics = SceneMetrics::from_grid(&grid, 860.0, 560.0);

        let (x, y) = metrics.cell_origin(&grid, GridPosition::new(2, 3));

        assert!((x - (metrics.offset_x + 2.0 * metrics.cell_step)).abs() < 1e-3);
        assert!((y - (metrics.offset_y + 3.0 * metrics.cell_step)).abs() < 1e-3);

        let (center_x, center_y) = metrics.cell_center(&grid, GridPosition::new(2, 3));
        assert!((center_x - (x + 0.5 * metrics.cell_step)).abs() < 1e-3);
        assert!((center_y - (y + 0.5 * metrics.cell_step)).abs() < 1e-3);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        for _ in 0..59 {
            assert!(counter.record_frame(Duration::from_millis(16)).is_none());
        }
        let rate = counter
            .record_frame(Duration::from_millis(100))
            .expect("one second elapsed");
        assert!(rate > 50.0 && rate < 70.0);
    }
}
