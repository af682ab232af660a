use std::f64::consts::TAU;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Polygon, Text};

use data_dashboard::chart::{BarDatum, ChartArtifact, PieSlice};
use data_dashboard::color::ColorMap;
use data_dashboard::state::AppState;

const CHART_HEIGHT: f32 = 340.0;

/// Points per full turn used to approximate pie arcs.
const ARC_RESOLUTION: f64 = 180.0;

// ---------------------------------------------------------------------------
// Chart (central panel, below the grids)
// ---------------------------------------------------------------------------

/// Render the current chart, or the reason it could not be drawn.
pub fn chart_section(ui: &mut Ui, state: &AppState) {
    ui.heading("Visualization");

    let chart = match &state.chart {
        Some(Ok(chart)) => chart,
        Some(Err(msg)) => {
            ui.label(RichText::new(msg).color(Color32::RED));
            return;
        }
        None => {
            ui.label("Select a numeric column to chart.");
            return;
        }
    };

    if chart.total() == 0 {
        ui.label("No values to plot for the filtered rows.");
        return;
    }

    let color_map = state.color_map.as_ref();
    match chart {
        ChartArtifact::Bar { column, bars } => bar_plot(ui, column, bars, color_map),
        ChartArtifact::Line { column, points } => line_plot(ui, column, points),
        ChartArtifact::Pie { column, slices } => pie_plot(ui, column, slices, color_map),
    }
}

fn value_color(color_map: Option<&ColorMap>, value: &data_dashboard::CellValue) -> Color32 {
    color_map
        .map(|cm| cm.color_for(value))
        .unwrap_or(Color32::LIGHT_BLUE)
}

fn bar_plot(ui: &mut Ui, column: &str, bars: &[BarDatum], color_map: Option<&ColorMap>) {
    let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
    let chart_bars: Vec<Bar> = bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::new(i as f64, b.count as f64)
                .name(&b.label)
                .fill(value_color(color_map, &b.value))
                .width(0.7)
        })
        .collect();

    Plot::new("bar_chart")
        .height(CHART_HEIGHT)
        .x_axis_label(column.to_string())
        .y_axis_label("count")
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(chart_bars).name(column));
        });
}

fn line_plot(ui: &mut Ui, column: &str, points: &[[f64; 2]]) {
    let series: PlotPoints = points.iter().copied().collect();
    Plot::new("line_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("row")
        .y_axis_label(column.to_string())
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(series).name(column).width(1.5));
        });
}

fn pie_plot(ui: &mut Ui, column: &str, slices: &[PieSlice], color_map: Option<&ColorMap>) {
    Plot::new("pie_chart")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for slice in slices {
                let sweep = slice.fraction * TAU;
                let color = value_color(color_map, &slice.value);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(slice_outline(start, sweep)))
                        .fill_color(color)
                        .name(format!("{} ({})", slice.label, slice.percent_label())),
                );

                let [x, y] = arc_point(start + sweep / 2.0, 0.65);
                plot_ui.text(Text::new(
                    PlotPoint::new(x, y),
                    RichText::new(slice.percent_label()).strong(),
                ));
                start += sweep;
            }
        });
    ui.label(format!("Share of each distinct value of '{column}'"));
}

/// Point on a circle of `radius`, angles measured clockwise from 12 o'clock.
fn arc_point(angle: f64, radius: f64) -> [f64; 2] {
    [radius * angle.sin(), radius * angle.cos()]
}

/// Closed wedge outline of a unit-radius pie slice.
fn slice_outline(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep / TAU) * ARC_RESOLUTION).ceil().max(1.0) as usize;
    let mut outline = Vec::with_capacity(steps + 2);
    outline.push([0.0, 0.0]);
    for i in 0..=steps {
        outline.push(arc_point(start + sweep * i as f64 / steps as f64, 1.0));
    }
    outline
}
