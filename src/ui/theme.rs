use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

pub struct ThemePlugin;

impl Plugin for ThemePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, apply_dark_theme);
    }
}

pub mod colors {
    use bevy_egui::egui::Color32;

    pub const BG_DARKEST: Color32 = Color32::from_rgb(20, 20, 22);
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(25, 25, 28, 245);
    pub const WIDGET_BG: Color32 = Color32::from_rgb(50, 50, 53);
    pub const WIDGET_BORDER: Color32 = Color32::from_rgb(70, 70, 75);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(220, 220, 220);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(130, 130, 130);

    pub const ACCENT_BLUE: Color32 = Color32::from_rgb(86, 156, 214);
    pub const ACCENT_ORANGE: Color32 = Color32::from_rgb(255, 153, 26);

    pub const STATUS_SUCCESS: Color32 = Color32::from_rgb(80, 200, 120);
    pub const STATUS_WARNING: Color32 = Color32::from_rgb(230, 180, 80);
    pub const STATUS_ERROR: Color32 = Color32::from_rgb(230, 90, 90);

    /// Provenance badges
    pub const SOURCE_LOCAL: Color32 = Color32::from_rgb(78, 201, 176);
    pub const SOURCE_REMOTE: Color32 = Color32::from_rgb(86, 156, 214);
    pub const SOURCE_PROCEDURAL: Color32 = Color32::from_rgb(180, 142, 210);
    pub const SOURCE_PRIMITIVE: Color32 = Color32::from_rgb(255, 75, 43);
}

/// Badge color for a model source
pub fn source_color(source: crate::resolver::SourceType) -> egui::Color32 {
    use crate::resolver::SourceType;
    match source {
        SourceType::Local => colors::SOURCE_LOCAL,
        SourceType::Remote => colors::SOURCE_REMOTE,
        SourceType::Procedural => colors::SOURCE_PROCEDURAL,
        SourceType::Primitive => colors::SOURCE_PRIMITIVE,
    }
}

/// Runs until the primary context exists, then once
fn apply_dark_theme(mut contexts: EguiContexts, mut applied: Local<bool>) {
    if *applied {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(6.0, 5.0);
    style.spacing.button_padding = egui::vec2(10.0, 3.0);
    style.visuals.window_corner_radius = egui::CornerRadius::same(4);
    style.visuals.window_fill = colors::PANEL_BG;
    style.visuals.window_stroke = egui::Stroke::new(1.0, colors::WIDGET_BORDER);
    style.visuals.panel_fill = colors::PANEL_BG;
    style.visuals.extreme_bg_color = colors::BG_DARKEST;
    style.visuals.widgets.inactive.bg_fill = colors::WIDGET_BG;
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, colors::ACCENT_BLUE);
    style.visuals.selection.stroke = egui::Stroke::new(1.0, colors::ACCENT_BLUE);
    style.visuals.override_text_color = Some(colors::TEXT_PRIMARY);

    ctx.set_style(style);
    *applied = true;
}
