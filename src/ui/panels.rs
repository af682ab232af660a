use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use data_dashboard::chart::ChartKind;
use data_dashboard::data::format::DataFormat;
use data_dashboard::export::EXPORT_STEM;
use data_dashboard::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter, chart and download controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        ui.heading("Controls");
        ui.separator();
        ui.label("No data loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the widgets.
    let columns: Vec<String> = table.column_names().iter().map(|c| c.to_string()).collect();
    let numeric: Vec<String> = table
        .numeric_columns()
        .iter()
        .map(|c| c.to_string())
        .collect();
    let choices = state.filter_choices();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Filter ----
            ui.heading("Filter Data by Column");
            ui.separator();

            let current_col = state.filter_column.clone().unwrap_or_default();
            egui::ComboBox::from_label("Column")
                .selected_text(&current_col)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if ui.selectable_label(current_col == *col, col).clicked() {
                            state.select_filter_column(col);
                        }
                    }
                });

            let current_value = state.filter_value.clone();
            egui::ComboBox::from_label("Value")
                .selected_text(
                    current_value
                        .as_ref()
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                )
                .show_ui(ui, |ui: &mut Ui| {
                    for val in &choices {
                        let selected = current_value.as_ref() == Some(val);
                        if ui.selectable_label(selected, val.to_string()).clicked() {
                            state.select_filter_value(val.clone());
                        }
                    }
                });

            ui.add_space(12.0);

            // ---- Visualization ----
            ui.heading("Generate Visualizations");
            ui.separator();

            let current_kind = state.chart_kind;
            egui::ComboBox::from_label("Chart type")
                .selected_text(current_kind.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in ChartKind::ALL {
                        if ui
                            .selectable_label(current_kind == kind, kind.to_string())
                            .clicked()
                        {
                            state.select_chart_kind(kind);
                        }
                    }
                });

            if numeric.is_empty() {
                ui.label("No numeric columns to chart.");
            } else {
                let current_chart_col = state.chart_column.clone().unwrap_or_default();
                egui::ComboBox::from_label("Chart column")
                    .selected_text(&current_chart_col)
                    .show_ui(ui, |ui: &mut Ui| {
                        for col in &numeric {
                            if ui.selectable_label(current_chart_col == *col, col).clicked() {
                                state.select_chart_column(col);
                            }
                        }
                    });
            }

            ui.add_space(12.0);

            // ---- Download ----
            ui.heading("Download Processed Data");
            ui.separator();
            if ui
                .add_enabled(
                    state.filtered.is_some(),
                    egui::Button::new("Download Filtered Data as CSV"),
                )
                .clicked()
            {
                save_file_dialog(state);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("📊 Interactive Data Dashboard");
        ui.separator();

        if let (Some(name), Some(table)) = (&state.source_name, &state.table) {
            ui.label(format!(
                "{name}: {} rows × {} columns",
                table.num_rows(),
                table.num_columns()
            ));
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GREEN
            };
            ui.separator();
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload your CSV or Excel file")
        .add_filter("Supported files", DataFormat::supported_extensions())
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(format!("{EXPORT_STEM}.csv"))
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.save_filtered(&path);
    }
}
