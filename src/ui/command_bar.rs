//! Free-text command entry.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};

use crate::commands::SubmitCommand;

#[derive(Resource, Default)]
pub struct CommandBar {
    pub text: String,
    /// Most recent first
    pub history: Vec<String>,
}

const HISTORY_LEN: usize = 20;

impl CommandBar {
    /// Take the typed text for submission, recording it in the history
    pub fn take(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.text);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.history.retain(|entry| entry != text);
        self.history.insert(0, text.to_string());
        self.history.truncate(HISTORY_LEN);
        Some(text.to_string())
    }
}

pub struct CommandBarPlugin;

impl Plugin for CommandBarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CommandBar>()
            .add_systems(EguiPrimaryContextPass, draw_command_bar);
    }
}

fn draw_command_bar(
    mut contexts: EguiContexts,
    mut bar: ResMut<CommandBar>,
    mut submit: MessageWriter<SubmitCommand>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    egui::TopBottomPanel::top("command_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let input = egui::TextEdit::singleline(&mut bar.text)
                .hint_text("place a red sofa and two lamps")
                .desired_width(ui.available_width() - 150.0);
            let response = ui.add(input);
            let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.button("Build").clicked() || entered {
                if let Some(text) = bar.take() {
                    submit.write(SubmitCommand(text));
                }
            }
            if ui.button("🎤 Voice").clicked() {
                submit.write(SubmitCommand("voice".to_string()));
            }

            if !bar.history.is_empty() {
                ui.menu_button("⏷", |ui| {
                    let mut chosen = None;
                    for entry in &bar.history {
                        if ui.button(entry).clicked() {
                            chosen = Some(entry.clone());
                            ui.close();
                        }
                    }
                    if let Some(entry) = chosen {
                        bar.text = entry;
                    }
                });
            }
        });
    });
    Ok(())
}
