//! Result windows and overlays: mode notice, import/export results, clear
//! confirmation and the config reset notice.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::annotation::{Annotations, ClearAllRequest};
use crate::config::ConfigResetNotification;
use crate::theme;

use super::file_ops::{ExportOutcome, ImportOutcome};

/// Whether the "Clear all" confirmation is showing
#[derive(Resource, Default)]
pub struct ClearConfirmation {
    pub show: bool,
}

/// Brief overlay naming the new mode after a switch.
pub fn mode_notice_ui(mut contexts: EguiContexts, annotations: Res<Annotations>) -> Result {
    let Some(notice) = annotations.mode_notice() else {
        return Ok(());
    };

    egui::Area::new(egui::Id::new("mode_notice"))
        .anchor(egui::Align2::CENTER_TOP, [0.0, 24.0])
        .interactable(false)
        .show(contexts.ctx_mut()?, |ui| {
            egui::Frame::new()
                .fill(theme::ui::NOTICE_BACKGROUND)
                .corner_radius(6.0)
                .inner_margin(egui::Margin::symmetric(16, 8))
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(notice.mode.hint())
                            .size(16.0)
                            .color(egui::Color32::WHITE),
                    );
                });
        });

    Ok(())
}

pub fn clear_confirmation_ui(
    mut contexts: EguiContexts,
    mut confirmation: ResMut<ClearConfirmation>,
    mut clear_events: MessageWriter<ClearAllRequest>,
) -> Result {
    if !confirmation.show {
        return Ok(());
    }

    egui::Window::new("Clear All")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Remove every marker and polygon? This cannot be undone.");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Clear All").clicked() {
                    clear_events.write(ClearAllRequest);
                    confirmation.show = false;
                }
                if ui.button("Cancel").clicked() {
                    confirmation.show = false;
                }
            });
        });

    Ok(())
}

pub fn export_result_ui(mut contexts: EguiContexts, mut outcome: ResMut<ExportOutcome>) -> Result {
    let Some(result) = &outcome.result else {
        return Ok(());
    };

    let mut close = false;
    match result {
        Ok(file) => {
            egui::Window::new("Export Complete")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(contexts.ctx_mut()?, |ui| {
                    ui.colored_label(
                        theme::ui::SUCCESS_TEXT,
                        format!(
                            "Exported {} markers and {} polygons",
                            file.markers, file.polygons
                        ),
                    );
                    ui.add_space(5.0);
                    ui.label(egui::RichText::new(file.path.to_string_lossy()).weak());
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if let Some(dir) = file.path.parent()
                            && ui.button("Show in folder").clicked()
                        {
                            let _ = open::that(dir);
                        }
                        if ui.button("OK").clicked() {
                            close = true;
                        }
                    });
                });
        }
        Err(error) => {
            egui::Window::new("Export Failed")
                .collapsible(false)
                .resizable(true)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(contexts.ctx_mut()?, |ui| {
                    ui.colored_label(theme::ui::ERROR_TEXT, "Could not export annotations");
                    ui.add_space(8.0);
                    egui::ScrollArea::vertical().max_height(150.0).show(ui, |ui| {
                        ui.label(error);
                    });
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
        }
    }

    if close {
        outcome.result = None;
    }
    Ok(())
}

pub fn import_result_ui(mut contexts: EguiContexts, mut outcome: ResMut<ImportOutcome>) -> Result {
    let Some(result) = &outcome.result else {
        return Ok(());
    };

    let mut close = false;
    match result {
        Ok(file) => {
            egui::Window::new("Import Complete")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(contexts.ctx_mut()?, |ui| {
                    let name = file
                        .path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("file");
                    ui.label(format!("Imported {}", name));
                    ui.add_space(5.0);
                    ui.colored_label(
                        theme::ui::SUCCESS_TEXT,
                        format!(
                            "{} markers, {} polygons",
                            file.summary.markers, file.summary.polygons
                        ),
                    );
                    if file.summary.skipped > 0 {
                        ui.label(
                            egui::RichText::new(format!(
                                "{} features of other types were skipped",
                                file.summary.skipped
                            ))
                            .color(theme::ui::HINT_TEXT),
                        );
                    }
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
        }
        Err(error) => {
            egui::Window::new("Import Failed")
                .collapsible(false)
                .resizable(true)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(contexts.ctx_mut()?, |ui| {
                    ui.colored_label(
                        theme::ui::ERROR_TEXT,
                        "Invalid GeoJSON file. Your annotations were not changed.",
                    );
                    ui.add_space(8.0);
                    egui::ScrollArea::vertical().max_height(150.0).show(ui, |ui| {
                        ui.label(error);
                    });
                    ui.add_space(8.0);
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
        }
    }

    if close {
        outcome.result = None;
    }
    Ok(())
}

/// Renders the config reset notification dialog (shown when config was corrupted)
pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Configuration Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be loaded and were reset to defaults.");
            if let Some(ref reason) = notification.reason {
                ui.add_space(5.0);
                ui.label(egui::RichText::new(reason).weak());
            }
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                notification.show = false;
                notification.reason = None;
            }
        });

    Ok(())
}
