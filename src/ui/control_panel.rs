use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::annotation::widget::DrawingWidget;
use crate::annotation::{
    Annotations, FinishPolygonRequest, Mode, RemoveMarkerRequest, SelectMarkerRequest,
    SetModeRequest,
};
use crate::theme;

use super::dialogs::ClearConfirmation;
use super::file_ops::{ExportRequest, FileOperations, ImportRequest};

/// Area readout with thousands separators, e.g. `1,234,567.89 m²`.
pub fn format_area(square_meters: f64) -> String {
    let text = format!("{:.2}", square_meters);
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", whole),
    };

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}.{} m²", sign, grouped, fraction)
}

/// Messages the control panel can send
#[derive(bevy::ecs::system::SystemParam)]
pub struct PanelActions<'w> {
    set_mode: MessageWriter<'w, SetModeRequest>,
    finish: MessageWriter<'w, FinishPolygonRequest>,
    remove: MessageWriter<'w, RemoveMarkerRequest>,
    select: MessageWriter<'w, SelectMarkerRequest>,
    export: MessageWriter<'w, ExportRequest>,
    import: MessageWriter<'w, ImportRequest>,
}

pub fn control_panel_ui(
    mut contexts: EguiContexts,
    annotations: Res<Annotations>,
    operations: Res<FileOperations>,
    mut clear_confirmation: ResMut<ClearConfirmation>,
    mut actions: PanelActions,
) -> Result {
    egui::SidePanel::right("control_panel")
        .default_width(280.0)
        .resizable(false)
        .show(contexts.ctx_mut()?, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Map Controls").heading().size(18.0));
            ui.add_space(4.0);
            ui.separator();

            // =========================================
            // MODE
            // =========================================
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Select Mode").size(14.0).strong());
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                for mode in Mode::all() {
                    let is_active = annotations.mode() == *mode;
                    let button = egui::Button::new(mode.display_name()).fill(if is_active {
                        theme::ui::ACTIVE_FILL
                    } else {
                        theme::ui::PANEL_BACKGROUND
                    });
                    if ui.add(button).clicked() {
                        actions.set_mode.write(SetModeRequest(*mode));
                    }
                }
            });
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(annotations.mode().hint())
                    .size(12.0)
                    .color(theme::ui::HINT_TEXT),
            );

            if annotations.mode() == Mode::Polygon {
                ui.add_space(4.0);
                let vertices = annotations.widget().pending_vertices().len();
                let finish = ui
                    .add_enabled(vertices >= 3, egui::Button::new("Finish Polygon (Enter)"))
                    .on_hover_text("Close the shape being drawn (needs 3 points)");
                if finish.clicked() {
                    actions.finish.write(FinishPolygonRequest);
                }
                if vertices > 0 {
                    ui.label(
                        egui::RichText::new(format!("{} points placed", vertices))
                            .size(11.0)
                            .color(theme::ui::HINT_TEXT),
                    );
                }
            }

            ui.add_space(8.0);
            ui.separator();

            // =========================================
            // FILE ACTIONS
            // =========================================
            ui.add_space(4.0);
            ui.add_enabled_ui(annotations.is_ready() && !operations.is_busy(), |ui| {
                ui.horizontal_wrapped(|ui| {
                    if ui.button("Clear All").clicked() {
                        clear_confirmation.show = true;
                    }
                    if ui.button("Export GeoJSON").clicked() {
                        actions.export.write(ExportRequest);
                    }
                    if ui.button("Import GeoJSON").clicked() {
                        actions.import.write(ImportRequest);
                    }
                });
            });
            if operations.is_busy() {
                ui.label(
                    egui::RichText::new("Waiting for file dialog...")
                        .size(11.0)
                        .italics()
                        .color(theme::ui::HINT_TEXT),
                );
            }

            ui.add_space(8.0);
            ui.separator();

            // =========================================
            // AREA
            // =========================================
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Polygon Area").size(14.0).strong());
            match annotations.area() {
                Some(area) => {
                    ui.label(
                        egui::RichText::new(format_area(area))
                            .size(16.0)
                            .color(theme::ui::SUCCESS_TEXT),
                    );
                }
                None => {
                    ui.label(
                        egui::RichText::new("Draw a polygon to see its area")
                            .size(12.0)
                            .color(theme::ui::HINT_TEXT),
                    );
                }
            }
            let polygons = annotations.widget().collection().len();
            if polygons > 1 {
                ui.label(
                    egui::RichText::new(format!("Total of {} polygons", polygons))
                        .size(11.0)
                        .color(theme::ui::HINT_TEXT),
                );
            }

            ui.add_space(8.0);
            ui.separator();

            // =========================================
            // MARKERS
            // =========================================
            ui.add_space(4.0);
            ui.label(
                egui::RichText::new(format!("Markers ({})", annotations.marker_count()))
                    .size(14.0)
                    .strong(),
            );
            ui.add_space(4.0);

            if annotations.marker_count() == 0 {
                ui.label(
                    egui::RichText::new("No markers yet")
                        .size(12.0)
                        .color(theme::ui::HINT_TEXT),
                );
                return;
            }

            let selected = annotations.selected_marker();
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    for marker in annotations.markers() {
                        let is_selected = selected == Some(marker.id);
                        let frame = egui::Frame::new()
                            .inner_margin(egui::Margin::symmetric(4, 4))
                            .fill(if is_selected {
                                theme::ui::ACTIVE_FILL
                            } else {
                                egui::Color32::TRANSPARENT
                            });
                        frame.show(ui, |ui| {
                            ui.horizontal(|ui| {
                                let label = ui.add(
                                    egui::Label::new(
                                        egui::RichText::new(marker.short_label())
                                            .strong()
                                            .color(theme::ui::LABEL_TEXT),
                                    )
                                    .sense(egui::Sense::click()),
                                );
                                if label.clicked() {
                                    actions.select.write(SelectMarkerRequest(marker.id));
                                }
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.small_button("Remove").clicked() {
                                            actions.remove.write(RemoveMarkerRequest(marker.id));
                                        }
                                    },
                                );
                            });
                            ui.label(
                                egui::RichText::new(format!(
                                    "Lat: {:.6}, Lng: {:.6}",
                                    marker.lat, marker.lng
                                ))
                                .size(11.0)
                                .monospace(),
                            );
                        });
                    }
                });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_area_small() {
        assert_eq!(format_area(0.0), "0.00 m²");
        assert_eq!(format_area(12.346), "12.35 m²");
    }

    #[test]
    fn test_format_area_groups_thousands() {
        assert_eq!(format_area(1234567.891), "1,234,567.89 m²");
        assert_eq!(format_area(100000.0), "100,000.00 m²");
        assert_eq!(format_area(999.0), "999.00 m²");
    }

    #[test]
    fn test_format_area_negative() {
        assert_eq!(format_area(-1234.5), "-1,234.50 m²");
    }
}
