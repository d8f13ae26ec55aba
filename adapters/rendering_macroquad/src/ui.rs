//! Immediate-mode UI helpers for the Macroquad rendering backend.
//!
//! This module hosts all uses of `macroquad::ui` so the rest of the adapter can
//! remain agnostic of Macroquad's UI types.

use isogrid_rendering::GridStatus;
use macroquad::{
    color::{Color, WHITE},
    math::{RectOffset, Vec2},
    ui::{hash, Ui},
};

/// Interactions captured from the control panel during the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ControlPanelUiResult {
    /// Whether the generate button was pressed.
    pub(crate) generate_pressed: bool,
    /// Width stepper delta.
    pub(crate) width_delta: i32,
    /// Height stepper delta.
    pub(crate) height_delta: i32,
    /// Obstacle stepper delta.
    pub(crate) obstacle_delta: i32,
}

/// Snapshot of the control panel's UI layout and data for the current frame.
#[derive(Clone, Debug)]
pub(crate) struct ControlPanelUiContext<'a> {
    /// Top-left corner of the panel in screen coordinates.
    pub(crate) origin: Vec2,
    /// Panel dimensions in screen space.
    pub(crate) size: Vec2,
    /// Background colour applied to the window skin so the UI matches the
    /// adapter's solid rectangle.
    pub(crate) background: Color,
    /// Grid summary shown above the controls.
    pub(crate) status: &'a GridStatus,
}

/// Renders the control panel's widgets and reports what was pressed.
pub(crate) fn draw_control_panel_ui(
    ui: &mut Ui,
    context: ControlPanelUiContext<'_>,
) -> ControlPanelUiResult {
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
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
        .margin(RectOffset::new(16.0, 16.0, 16.0, 16.0))
        .build();
    skin.window_style = window_style;

    let label_style = ui
        .style_builder()
        .text_color(WHITE)
        .text_color_hovered(WHITE)
        .text_color_clicked(WHITE)
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
        .color_selected(Color::from_rgba(70, 70, 70, 255))
        .color_selected_hovered(Color::from_rgba(96, 96, 96, 255))
        .color_inactive(Color::from_rgba(56, 56, 56, 200))
        .margin(RectOffset::new(0.0, 0.0, 8.0, 8.0))
        .build();
    skin.button_style = button_style;

    ui.push_skin(&skin);

    let status = context.status;
    let parameters = status.parameters;
    let mut result = ControlPanelUiResult::default();
    let _ = ui.window(hash!("control_panel"), context.origin, context.size, |ui| {
        ui.label(
            None,
            &format!("Grid: {} x {}", parameters.width(), parameters.height()),
        );
        ui.label(None, &format!("Obstacles: {}", parameters.obstacle_count()));

        let progress = if status.generating {
            "Generating...".to_string()
        } else {
            format!("Placed: {} tiles, {} obstacles", status.tiles, status.obstacles)
        };
        ui.label(None, &progress);
        if let Some(error) = &status.last_error {
            ui.label(None, error);
        }

        result.generate_pressed = ui.button(None, "Generate grid");
        result.width_delta = stepper(ui, "Width");
        result.height_delta = stepper(ui, "Height");
        result.obstacle_delta = stepper(ui, "Obstacles");

        ui.label(None, "G or Space generates, Esc quits.");
    });

    ui.pop_skin();

    result
}

fn stepper(ui: &mut Ui, name: &str) -> i32 {
    let mut delta = 0;
    if ui.button(None, format!("{name} -").as_str()) {
        delta -= 1;
    }
    if ui.button(None, format!("{name} +").as_str()) {
        delta += 1;
    }
    delta
}
