//! Property panel for the selected object, opened by double-clicking it.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use super::theme::{colors, source_color};
use crate::catalog::MaterialPreset;
use crate::constants::lights::MAX_RELATIVE_INTENSITY;
use crate::constants::placement::ROTATION_STEP_DEGREES;
use crate::constants::selection::{SCALE_SLIDER_MAX, SCALE_SLIDER_MIN};
use crate::scene::{Appearance, BaseDimensions, LightRef, PlacedObject};
use crate::selection::{current_step, EditSelected, PropertyEdit, Selection};
use crate::utils::yaw_of;

/// Slider value as last dragged, kept apart from the snapped scale so the handle moves smoothly
#[derive(Resource, Default)]
pub struct PropertiesPanel {
    entity: Option<Entity>,
    slider: f32,
}

pub struct PropertiesPlugin;

impl Plugin for PropertiesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PropertiesPanel>()
            .add_systems(EguiPrimaryContextPass, draw_properties);
    }
}

/// Whether the panel offers a light intensity control for this object
pub fn has_light_control(keyword: &str, has_light: bool) -> bool {
    has_light || keyword == "lamp"
}

fn draw_properties(
    mut contexts: EguiContexts,
    mut selection: ResMut<Selection>,
    mut panel: ResMut<PropertiesPanel>,
    objects: Query<(&PlacedObject, &BaseDimensions, &Transform, &Appearance, Option<&LightRef>)>,
    mut edits: MessageWriter<EditSelected>,
) -> Result {
    let Some(entity) = selection.entity.filter(|_| selection.properties_open) else {
        panel.entity = None;
        return Ok(());
    };
    let Ok((object, base, transform, appearance, light)) = objects.get(entity) else {
        return Ok(());
    };
    if panel.entity != Some(entity) {
        panel.entity = Some(entity);
        panel.slider = current_step(base, transform.scale);
    }

    let ctx = contexts.ctx_mut()?;
    let mut open = true;
    let mut pending = Vec::new();

    egui::Window::new("Properties")
        .open(&mut open)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&object.keyword);
                ui.label(egui::RichText::new(object.source.label()).color(source_color(object.source)));
            });
            ui.separator();

            egui::Grid::new("properties_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Scale:");
                    let slider = egui::Slider::new(&mut panel.slider, SCALE_SLIDER_MIN..=SCALE_SLIDER_MAX).suffix("x");
                    if ui.add(slider).changed() {
                        pending.push(PropertyEdit::Scale(panel.slider));
                    }
                    ui.end_row();

                    ui.label("Rotation:");
                    ui.horizontal(|ui| {
                        ui.label(format!("{:.0}°", yaw_of(transform.rotation).to_degrees()));
                        let step = ROTATION_STEP_DEGREES.to_radians();
                        if ui.button("⟲").clicked() {
                            pending.push(PropertyEdit::Rotate(step));
                        }
                        if ui.button("⟳").clicked() {
                            pending.push(PropertyEdit::Rotate(-step));
                        }
                    });
                    ui.end_row();

                    ui.label("Color:");
                    let srgba = appearance.color.unwrap_or(Color::WHITE).to_srgba();
                    let mut rgb = [srgba.red, srgba.green, srgba.blue];
                    if ui.color_edit_button_rgb(&mut rgb).changed() {
                        pending.push(PropertyEdit::Color(Color::srgb(rgb[0], rgb[1], rgb[2])));
                    }
                    ui.end_row();

                    ui.label("Material:");
                    ui.horizontal_wrapped(|ui| {
                        for preset in MaterialPreset::ALL {
                            let selected = appearance.material == Some(preset);
                            if ui.selectable_label(selected, preset.label()).clicked() {
                                pending.push(PropertyEdit::Material(preset));
                            }
                        }
                    });
                    ui.end_row();

                    if has_light_control(&object.keyword, light.is_some()) {
                        ui.label("Light:");
                        let mut intensity = appearance.light_intensity.unwrap_or(1.0);
                        let slider = egui::Slider::new(&mut intensity, 0.0..=MAX_RELATIVE_INTENSITY);
                        if ui.add(slider).changed() {
                            pending.push(PropertyEdit::LightIntensity(intensity));
                        }
                        ui.end_row();
                    }
                });

            ui.add_space(8.0);
            let delete = egui::Button::new(egui::RichText::new("Delete").color(colors::STATUS_ERROR));
            if ui.add(delete).clicked() {
                pending.push(PropertyEdit::Delete);
            }
        });

    for edit in pending {
        edits.write(EditSelected(edit));
    }
    if !open {
        selection.properties_open = false;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lamps_always_get_light_control() {
        assert!(has_light_control("lamp", false));
        assert!(has_light_control("bookshelf", true));
        assert!(!has_light_control("sofa", false));
    }
}
