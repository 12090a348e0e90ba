use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use super::theme::{colors, source_color};
use crate::editor::{StatusLevel, StatusLine};
use crate::persistence::Autosave;
use crate::placement::GhostPlacement;
use crate::scene::PlacedObject;

pub struct PanelsPlugin;

impl Plugin for PanelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, draw_status_bar);
    }
}

fn level_color(level: StatusLevel) -> egui::Color32 {
    match level {
        StatusLevel::Info => colors::TEXT_PRIMARY,
        StatusLevel::Warning => colors::STATUS_WARNING,
        StatusLevel::Error => colors::STATUS_ERROR,
    }
}

/// Short label for the autosave indicator
pub fn autosave_label(autosave: &Autosave) -> &'static str {
    if autosave.is_in_flight() {
        "Saving..."
    } else if autosave.is_dirty() {
        "Unsaved"
    } else {
        "Saved"
    }
}

/// Draw status bar showing the latest message, placement state and save state
fn draw_status_bar(
    mut contexts: EguiContexts,
    time: Res<Time>,
    status: Res<StatusLine>,
    ghost: Res<GhostPlacement>,
    autosave: Res<Autosave>,
    objects: Query<(), With<PlacedObject>>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if let Some(preview) = ghost.preview() {
                ui.colored_label(colors::ACCENT_ORANGE, "[PLACING]");
                ui.label(&preview.request.keyword);
                match preview.source {
                    Some(source) => {
                        ui.colored_label(source_color(source), source.label());
                    }
                    None => {
                        ui.spinner();
                    }
                }
                if ghost.queued() > 0 {
                    ui.label(format!("+{} queued", ghost.queued()));
                }
                ui.label(
                    egui::RichText::new("Click to place, R rotate, Shift snap, Esc cancel")
                        .small()
                        .color(colors::TEXT_MUTED),
                );
            } else {
                ui.colored_label(colors::ACCENT_BLUE, "[BUILD]");
            }

            ui.separator();

            if let Some(message) = status.current(time.elapsed_secs_f64()) {
                ui.colored_label(level_color(message.level), &message.text);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = autosave_label(&autosave);
                let color = if label == "Saved" {
                    colors::STATUS_SUCCESS
                } else {
                    colors::TEXT_MUTED
                };
                ui.colored_label(color, label);
                ui.separator();
                ui.label(format!("Objects: {}", objects.iter().count()));
            });
        });
    });
    Ok(())
}
