use bevy::prelude::*;
use bevy_egui::{egui, EguiContextSettings, EguiContext, EguiContexts, EguiPrimaryContextPass};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::persistence::StoreError;
use crate::resolver::ClearModelCache;

/// Environment variable holding the remote model-search API key
pub const API_KEY_VAR: &str = "POLY_PIZZA_API_KEY";

const APP_DIR: &str = "bevy_scene_builder";

/// User preferences, stored as RON in the config directory
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub ui_scale: f32,
    pub camera_speed: f32,
    /// Radians per pixel of mouse motion
    pub camera_sensitivity: f32,
    /// Grid used while the snap modifier is held
    pub grid_snap: f32,
    /// Query the remote model search when no built-in asset matches
    pub remote_search_enabled: bool,
    pub search_endpoint: String,
    pub search_timeout_secs: f32,
    pub search_cache_ttl_secs: f32,
    pub download_timeout_secs: f32,
    /// Bevy asset folder, relative to the crate or executable
    pub asset_root: String,
    /// Subfolder of the asset root that receives downloaded models
    pub download_dir: String,
    /// Scene name used by the persistence store
    pub project_id: String,
    /// Quiet period before an edit is written to disk
    pub autosave_delay_secs: f32,
    pub show_physics_debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ui_scale: 1.0,
            camera_speed: 8.0,
            camera_sensitivity: 0.003,
            grid_snap: 0.5,
            remote_search_enabled: true,
            search_endpoint: "https://api.poly.pizza/v1/search".to_string(),
            search_timeout_secs: 5.0,
            search_cache_ttl_secs: 300.0,
            download_timeout_secs: 30.0,
            asset_root: "assets".to_string(),
            download_dir: "downloads".to_string(),
            project_id: "default".to_string(),
            autosave_delay_secs: 1.0,
            show_physics_debug: false,
        }
    }
}

impl Settings {
    fn config_file() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(APP_DIR).join("settings.ron"))
    }

    /// Stored settings, or defaults when there are none or they don't parse
    pub fn load() -> Self {
        let Some(path) = Self::config_file() else {
            return Self::default();
        };
        let Ok(text) = fs::read_to_string(&path) else {
            return Self::default();
        };
        ron::from_str(&text).unwrap_or_else(|e| {
            warn!("Ignoring unreadable settings at {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_error)?;
        }
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, text).map_err(io_error)
    }

    /// Persist to the user config directory, logging failures
    pub fn save(&self) {
        let Some(path) = Self::config_file() else {
            warn!("No config directory; settings not saved");
            return;
        };
        match self.write_to(&path) {
            Ok(()) => debug!("Settings written to {}", path.display()),
            Err(e) => error!("Failed to save settings: {}", e),
        }
    }

    /// Remote search key from the environment, never stored on disk
    pub fn api_key() -> Option<String> {
        std::env::var(API_KEY_VAR).ok().filter(|key| !key.trim().is_empty())
    }

    /// Absolute path of the asset folder, resolved the way Bevy's file reader does
    pub fn asset_root_path(&self) -> PathBuf {
        let root = PathBuf::from(&self.asset_root);
        if root.is_absolute() {
            return root;
        }
        let base = std::env::var_os("BEVY_ASSET_ROOT")
            .or_else(|| std::env::var_os("CARGO_MANIFEST_DIR"))
            .map(PathBuf::from)
            .or_else(|| {
                std::env::current_exe()
                    .ok()
                    .and_then(|exe| exe.parent().map(PathBuf::from))
            })
            .unwrap_or_default();
        base.join(root)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.search_timeout_secs.max(0.1))
    }

    pub fn search_cache_ttl(&self) -> Duration {
        Duration::from_secs_f32(self.search_cache_ttl_secs.max(0.0))
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.download_timeout_secs.max(0.1))
    }
}

#[derive(Resource, Default)]
pub struct SettingsWindowState {
    pub open: bool,
}

pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Settings::load())
            .init_resource::<SettingsWindowState>()
            .add_systems(Update, (apply_ui_scale, toggle_settings_window))
            .add_systems(EguiPrimaryContextPass, draw_settings_window);
    }
}

fn apply_ui_scale(
    settings: Res<Settings>,
    mut query: Query<&mut EguiContextSettings, With<EguiContext>>,
) {
    if !settings.is_changed() {
        return;
    }
    for mut ctx_settings in &mut query {
        ctx_settings.scale_factor = settings.ui_scale;
    }
}

fn toggle_settings_window(keyboard: Res<ButtonInput<KeyCode>>, mut window_state: ResMut<SettingsWindowState>) {
    if keyboard.just_pressed(KeyCode::F2) {
        window_state.open = !window_state.open;
    }
}

fn draw_settings_window(
    mut contexts: EguiContexts,
    mut settings: ResMut<Settings>,
    mut window_state: ResMut<SettingsWindowState>,
    mut clear_cache: MessageWriter<ClearModelCache>,
) -> Result {
    if !window_state.open {
        return Ok(());
    }

    let ctx = contexts.ctx_mut()?;
    let mut changed = false;

    egui::Window::new("Settings")
        .open(&mut window_state.open)
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Interface");
            egui::Grid::new("settings_ui_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("UI Scale:");
                    changed |= ui
                        .add(egui::Slider::new(&mut settings.ui_scale, 0.75..=3.0).step_by(0.25).suffix("x"))
                        .changed();
                    ui.end_row();

                    ui.label("Camera Speed:");
                    changed |= ui.add(egui::Slider::new(&mut settings.camera_speed, 1.0..=30.0)).changed();
                    ui.end_row();

                    ui.label("Grid Snap:");
                    changed |= ui
                        .add(egui::Slider::new(&mut settings.grid_snap, 0.1..=2.0).step_by(0.05).suffix(" m"))
                        .changed();
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.separator();
            ui.heading("Models");
            egui::Grid::new("settings_model_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Remote Search:");
                    changed |= ui.checkbox(&mut settings.remote_search_enabled, "").changed();
                    ui.end_row();

                    ui.label("API Key:");
                    ui.label(if Settings::api_key().is_some() {
                        "found".to_string()
                    } else {
                        format!("set {API_KEY_VAR}")
                    });
                    ui.end_row();

                    ui.label("Autosave Delay:");
                    changed |= ui
                        .add(egui::Slider::new(&mut settings.autosave_delay_secs, 0.2..=10.0).suffix(" s"))
                        .changed();
                    ui.end_row();

                    ui.label("Physics Debug:");
                    changed |= ui.checkbox(&mut settings.show_physics_debug, "").changed();
                    ui.end_row();

                    ui.label("Model Cache:");
                    if ui.button("Clear").on_hover_text("Resolve every keyword again").clicked() {
                        clear_cache.write(ClearModelCache);
                    }
                    ui.end_row();
                });
            ui.label(egui::RichText::new("Search changes apply on restart").small().weak());
        });

    if changed {
        settings.save();
    }
    Ok(())
}
