//! Object palette: a filterable list of placeable objects.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::theme::colors;
use crate::catalog::{local_asset, palette_keywords};
use crate::commands::{PlaceObjects, PlacementRequest};
use crate::editor::StatusLine;
use crate::placement::GhostPlacement;

#[derive(Resource, Default)]
pub struct PaletteState {
    pub query: String,
}

pub struct PalettePlugin;

impl Plugin for PalettePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PaletteState>()
            .add_systems(EguiPrimaryContextPass, draw_palette);
    }
}

/// Items matching `query`, best match first. An empty query keeps the original order.
pub fn filter_items<'a>(items: &[&'a str], query: &str) -> Vec<&'a str> {
    let query = query.trim();
    if query.is_empty() {
        return items.to_vec();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &str)> = items
        .iter()
        .filter_map(|item| matcher.fuzzy_match(item, query).map(|score| (score, *item)))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, item)| item).collect()
}

fn draw_palette(
    mut contexts: EguiContexts,
    mut state: ResMut<PaletteState>,
    ghost: Res<GhostPlacement>,
    mut place: MessageWriter<PlaceObjects>,
    mut status: ResMut<StatusLine>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let items: Vec<&str> = palette_keywords().collect();

    egui::SidePanel::left("object_palette")
        .resizable(false)
        .default_width(170.0)
        .show(ctx, |ui| {
            ui.heading("Objects");
            ui.add(egui::TextEdit::singleline(&mut state.query).hint_text("Filter..."));
            ui.add_space(4.0);

            let active = ghost.preview().map(|preview| preview.request.keyword.as_str());
            egui::ScrollArea::vertical().show(ui, |ui| {
                for keyword in filter_items(&items, &state.query) {
                    let mut text = egui::RichText::new(keyword);
                    if active == Some(keyword) {
                        text = text.color(colors::ACCENT_ORANGE);
                    }
                    let response = ui.add_sized([ui.available_width(), 22.0], egui::Button::new(text));
                    let response = if local_asset(keyword).is_some() {
                        response.on_hover_text("Built-in model")
                    } else {
                        response.on_hover_text("Searched online, or built from shapes")
                    };
                    if response.clicked() {
                        match PlacementRequest::keyword(keyword) {
                            Ok(request) => {
                                place.write(PlaceObjects(vec![request]));
                            }
                            Err(e) => status.error(e.to_string()),
                        }
                    }
                }
            });
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_keeps_order() {
        let items = ["sofa", "bed", "lamp"];
        assert_eq!(filter_items(&items, "  "), items);
    }

    #[test]
    fn fuzzy_query_ranks_matches() {
        let items = ["sofa", "officechair", "chair", "lamp"];
        let found = filter_items(&items, "chair");
        assert!(found.contains(&"chair"));
        assert!(found.contains(&"officechair"));
        assert!(!found.contains(&"lamp"));
    }
}
