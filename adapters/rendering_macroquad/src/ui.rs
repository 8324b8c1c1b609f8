//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};
use math_snake_core::{Heading, Operation};
use math_snake_rendering::{HudPresentation, Overlay};

/// Outcome of drawing the side panel during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SidePanelUiResult {
    /// D-pad button pressed this frame.
    pub steer: Option<Heading>,
    /// Operation button pressed this frame.
    pub operation: Option<Operation>,
    /// Whether the pause button was pressed.
    pub toggle_pause: bool,
    /// Whether the restart button was pressed.
    pub restart: bool,
    /// Whether the menu button was pressed.
    pub return_to_menu: bool,
}

/// Snapshot of the side panel's layout and data for the current frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SidePanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub origin: Vec2,
    /// Panel dimensions in screen space.
    pub size: Vec2,
    /// Background colour applied to the window skin.
    pub background: Color,
    /// Text describing the session.
    pub hud: &'a HudPresentation,
    /// Overlay of the active phase.
    pub overlay: Option<Overlay>,
}

/// Renders the side panel's labels and buttons for the current frame.
pub(crate) fn draw_side_panel_ui(
    ui: &mut Ui,
    context: SidePanelUiContext<'_>,
) -> SidePanelUiResult {
    let mut skin = ui.default_skin();
    skin.margin = 0.0;

    let window_style = ui
        .style_builder()
        .color(context.background)
        .color_hovered(context.background)
        .color_clicked(context.background)
        .color_selected(context.background)
        .color_selected_hovered(context.background)
        .color_inactive(context.background)
        .text_color(WHITE)
        .margin(RectOffset::new(16.0, 16.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .margin(RectOffset::new(0.0, 0.0, 4.0, 4.0))
        .build();
    skin.label_style = label_style;

    let button_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .color(Color::from_rgba(70, 70, 70, 255))
        .color_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_clicked(Color::from_rgba(56, 56, 56, 255))
        .margin(RectOffset::new(8.0, 8.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let mut result = SidePanelUiResult::default();
    let hud = context.hud;
    let _ = ui.window(hash!("side_panel"), context.origin, context.size, |ui| {
        ui.label(None, "Math Snake");
        ui.label(None, hud.question.as_deref().unwrap_or("Question: -"));
        ui.label(None, &format!("Score: {}", hud.score));
        ui.label(
            None,
            &format!(
                "Speed: {}% ({} ms)",
                hud.speed_percent,
                hud.tick_period.as_millis()
            ),
        );
        ui.label(None, &format!("Length: {}", hud.length));

        match context.overlay {
            Some(Overlay::OperationMenu) => {
                ui.label(None, "Choose an operation (1-4):");
                for operation in Operation::ALL {
                    if ui.button(None, operation.label()) {
                        result.operation = Some(operation);
                    }
                }
            }
            Some(Overlay::GameOver { .. }) => {
                result.restart = ui.button(None, "Restart");
                result.return_to_menu = ui.button(None, "Menu");
            }
            Some(Overlay::Paused) | None => {
                let pause_label = if context.overlay.is_some() {
                    "Resume"
                } else {
                    "Pause"
                };
                result.toggle_pause = ui.button(None, pause_label);
                result.restart = ui.button(None, "Restart");
                result.return_to_menu = ui.button(None, "Menu");

                ui.label(None, "Steer:");
                if ui.button(None, "Up") {
                    result.steer = Some(Heading::Up);
                }
                if ui.button(None, "Left") {
                    result.steer = Some(Heading::Left);
                }
                ui.same_line(0.0);
                if ui.button(None, "Right") {
                    result.steer = Some(Heading::Right);
                }
                if ui.button(None, "Down") {
                    result.steer = Some(Heading::Down);
                }
            }
        }

        ui.label(None, "Arrows steer, Space pauses, R restarts, M menu, Q quits.");
    });

    ui.pop_skin();

    result
}
