mod control_panel;
mod dialogs;
mod file_ops;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::annotation::{AnnotationUpdate, Annotations};
use crate::config::ConfigResetNotification;

/// Resource that tracks whether any modal dialog is currently open.
/// Map input handlers should check this to avoid processing input
/// when the user is interacting with a dialog.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block map input
    pub any_modal_open: bool,
}

/// Run condition: returns true when no modal dialog is open.
///
/// Usage: `.run_if(no_dialog_open)`
pub fn no_dialog_open(dialog_state: Res<DialogState>) -> bool {
    !dialog_state.any_modal_open
}

/// System to aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    clear_confirmation: Res<dialogs::ClearConfirmation>,
    export_outcome: Res<file_ops::ExportOutcome>,
    import_outcome: Res<file_ops::ImportOutcome>,
    operations: Res<file_ops::FileOperations>,
    config_reset: Res<ConfigResetNotification>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = clear_confirmation.show
        || export_outcome.result.is_some()
        || import_outcome.result.is_some()
        || operations.is_busy()
        || config_reset.show;
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<dialogs::ClearConfirmation>()
            .init_resource::<file_ops::FileOperations>()
            .init_resource::<file_ops::ExportOutcome>()
            .init_resource::<file_ops::ImportOutcome>()
            .add_message::<file_ops::ExportRequest>()
            .add_message::<file_ops::ImportRequest>()
            .add_systems(
                Update,
                (
                    file_ops::start_export.run_if(on_message::<file_ops::ExportRequest>),
                    file_ops::poll_export_task,
                    file_ops::start_import.run_if(on_message::<file_ops::ImportRequest>),
                    file_ops::poll_import_task,
                )
                    .before(AnnotationUpdate)
                    .run_if(resource_exists::<Annotations>),
            )
            .add_systems(
                EguiPrimaryContextPass,
                control_panel::control_panel_ui.run_if(resource_exists::<Annotations>),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Dialogs/overlays after the side panel
                    dialogs::mode_notice_ui.run_if(resource_exists::<Annotations>),
                    dialogs::clear_confirmation_ui,
                    dialogs::export_result_ui,
                    dialogs::import_result_ui,
                    dialogs::config_reset_notification_ui,
                )
                    .after(control_panel::control_panel_ui),
            )
            // Update dialog state at the start of each frame
            .add_systems(First, update_dialog_state);
    }
}
