use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as GridColumn, TableBuilder};

use data_dashboard::data::stats::{self, ColumnStats, Summary};
use data_dashboard::state::AppState;
use data_dashboard::{CellValue, Table};

const ROW_HEIGHT: f32 = 18.0;
const GRID_MAX_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Raw, summary and filtered data grids
// ---------------------------------------------------------------------------

pub fn data_sections(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };

    ui.heading("Raw Data");
    data_grid(ui, "raw_data", table);
    ui.separator();

    ui.horizontal(|ui| {
        ui.heading("Summary Statistics");
        if ui.small_button("Copy as JSON").clicked() {
            match stats::to_json(&state.summary) {
                Ok(json) => ui.ctx().copy_text(json),
                Err(e) => log::error!("Failed to serialize summary: {e}"),
            }
        }
    });
    summary_grid(ui, &state.summary);
    ui.separator();

    if let (Some(filtered), Some(spec)) = (&state.filtered, state.filter_spec()) {
        ui.heading(format!(
            "Filtered Data ({} = {}) – {} rows",
            spec.column,
            spec.value,
            filtered.num_rows()
        ));
        data_grid(ui, "filtered_data", filtered);
    }
}

/// Virtualised grid of every row of `table`.
fn data_grid(ui: &mut Ui, id: &str, table: &Table) {
    let columns = table.columns();
    ui.push_id(id, |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(GRID_MAX_HEIGHT)
            .column(GridColumn::auto().at_least(40.0))
            .columns(GridColumn::auto().at_least(60.0), columns.len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                for col in columns {
                    header.col(|ui| {
                        ui.strong(col.name());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.num_rows(), |mut row| {
                    let index = row.index();
                    row.col(|ui| {
                        ui.label(index.to_string());
                    });
                    for col in columns {
                        row.col(|ui| {
                            cell_label(ui, &col.values()[index]);
                        });
                    }
                });
            });
    });
}

fn cell_label(ui: &mut Ui, value: &CellValue) {
    match value {
        CellValue::Missing => {
            ui.label(RichText::new("NaN").weak());
        }
        other => {
            ui.label(other.to_string());
        }
    }
}

/// One row per statistic, one column per table column.
fn summary_grid(ui: &mut Ui, summary: &Summary) {
    const STATS: [&str; 11] = [
        "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
    ];

    ui.push_id("summary", |ui| {
        egui::Grid::new("summary_grid")
            .striped(true)
            .min_col_width(60.0)
            .show(ui, |ui| {
                ui.label("");
                for name in summary.keys() {
                    ui.strong(name);
                }
                ui.end_row();

                for stat in STATS {
                    ui.strong(stat);
                    for stats in summary.values() {
                        ui.label(stat_cell(stats, stat));
                    }
                    ui.end_row();
                }
            });
    });
}

fn stat_cell(stats: &ColumnStats, stat: &str) -> String {
    fn num(v: Option<f64>) -> String {
        v.map(|v| format!("{v:.4}")).unwrap_or_else(|| "NaN".to_string())
    }
    match stats {
        ColumnStats::Numeric(s) => match stat {
            "count" => s.count.to_string(),
            "mean" => num(s.mean),
            "std" => num(s.std),
            "min" => num(s.min),
            "25%" => num(s.p25),
            "50%" => num(s.p50),
            "75%" => num(s.p75),
            "max" => num(s.max),
            _ => String::new(),
        },
        ColumnStats::Text(s) => match stat {
            "count" => s.count.to_string(),
            "unique" => s.unique.to_string(),
            "top" => s.top.clone().unwrap_or_default(),
            "freq" => s.freq.map(|f| f.to_string()).unwrap_or_default(),
            _ => String::new(),
        },
    }
}
