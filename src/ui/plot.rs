use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Line, Plot, PlotPoints, PlotUi, Points,
};

use crate::color::{diverging, CategoryPalette};
use crate::data::analysis::{
    density_curve, histogram, AnalysisKind, BoxSummary, CategoryCount, ChartData,
    CorrelationMatrix, GroupRate, ValueGroup, DENSITY_POINTS, HISTOGRAM_BINS,
};

const CHART_HEIGHT: f32 = 220.0;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Draw one analysis panel.
pub fn chart(ui: &mut Ui, kind: AnalysisKind, data: &ChartData) {
    let id = kind.title();
    match data {
        ChartData::Counts(counts) => count_chart(ui, id, counts),
        ChartData::Rates(rates) => rate_chart(ui, id, rates),
        ChartData::Values(values) => histogram_chart(ui, id, values, value_axis(kind)),
        ChartData::GroupedValues(groups) => box_chart(ui, id, groups, value_axis(kind)),
        ChartData::Correlation(matrix) => correlation_grid(ui, matrix),
    }
}

fn value_axis(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::FareHistogram | AnalysisKind::FareByClass => "fare",
        _ => "age",
    }
}

/// Plot with category labels under the integer x positions.
fn show_category_plot(
    ui: &mut Ui,
    id: &str,
    labels: Vec<String>,
    y_label: &str,
    unit_interval: bool,
    add_contents: impl FnOnce(&mut PlotUi),
) {
    let mut plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let v = mark.value;
            if v.fract() != 0.0 || v < 0.0 {
                return String::new();
            }
            labels.get(v as usize).cloned().unwrap_or_default()
        });
    if unit_interval {
        plot = plot.include_y(0.0).include_y(1.0);
    }
    plot.show(ui, add_contents);
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

fn count_chart(ui: &mut Ui, id: &str, counts: &[CategoryCount]) {
    let palette = CategoryPalette::new(counts.len());
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(i as f64, c.count as f64)
                .name(&c.label)
                .fill(palette.color_for(i))
                .width(0.7)
        })
        .collect();
    let labels = counts.iter().map(|c| c.label.clone()).collect();

    show_category_plot(ui, id, labels, "count", false, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars));
    });
}

/// Groups without rows get no bar and are listed as "no data".
fn rate_chart(ui: &mut Ui, id: &str, rates: &[GroupRate]) {
    let palette = CategoryPalette::new(rates.len());
    let bars: Vec<Bar> = rates
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            let rate = g.rate?;
            Some(
                Bar::new(i as f64, rate)
                    .name(&g.label)
                    .fill(palette.color_for(i))
                    .width(0.7),
            )
        })
        .collect();
    let labels = rates.iter().map(|g| g.label.clone()).collect();

    show_category_plot(ui, id, labels, "survived", true, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars));
    });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for g in rates {
            let text = match g.rate {
                Some(rate) => format!("{}: {:.1}% of {}", g.label, rate * 100.0, g.count),
                None => format!("{}: no data", g.label),
            };
            ui.label(RichText::new(text).small());
        }
    });
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

fn histogram_chart(ui: &mut Ui, id: &str, values: &[f64], x_label: &str) {
    if values.is_empty() {
        ui.label("no data");
        return;
    }
    let bins = histogram(values, HISTOGRAM_BINS);
    let bin_width = bins.first().map_or(1.0, |b| b.end - b.start);
    let bars: Vec<Bar> = bins
        .into_iter()
        .map(|bin| {
            Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
                .width(bin.end - bin.start)
                .fill(Color32::from_rgb(100, 140, 220))
        })
        .collect();

    // Density scaled to the bar heights.
    let scale = values.len() as f64 * bin_width;
    let kde: Option<Vec<[f64; 2]>> = density_curve(values, DENSITY_POINTS)
        .map(|curve| curve.into_iter().map(|[x, y]| [x, y * scale]).collect());

    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_label(x_label)
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
            if let Some(points) = kde {
                plot_ui.line(
                    Line::new(PlotPoints::from(points))
                        .color(Color32::from_rgb(30, 60, 140))
                        .width(2.0),
                );
            }
        });
}

fn box_chart(ui: &mut Ui, id: &str, groups: &[ValueGroup], y_label: &str) {
    let palette = CategoryPalette::new(groups.len());
    let mut boxes = Vec::new();
    let mut outliers: Vec<[f64; 2]> = Vec::new();

    for (i, group) in groups.iter().enumerate() {
        let Some(summary) = BoxSummary::from_values(&group.values) else {
            continue;
        };
        let x = i as f64;
        boxes.push(
            BoxElem::new(
                x,
                BoxSpread::new(
                    summary.lower_whisker,
                    summary.q1,
                    summary.median,
                    summary.q3,
                    summary.upper_whisker,
                ),
            )
            .name(&group.label)
            .fill(palette.color_for(i).linear_multiply(0.5))
            .box_width(0.6),
        );
        outliers.extend(summary.outliers.iter().map(|&y| [x, y]));
    }
    let labels = groups.iter().map(|g| g.label.clone()).collect();

    show_category_plot(ui, id, labels, y_label, false, |plot_ui| {
        plot_ui.box_plot(BoxPlot::new(boxes));
        plot_ui.points(
            Points::new(PlotPoints::from(outliers))
                .radius(2.0)
                .color(Color32::DARK_GRAY),
        );
    });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

fn correlation_grid(ui: &mut Ui, matrix: &CorrelationMatrix) {
    egui::Grid::new("correlation_grid")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in &matrix.columns {
                ui.strong(col);
            }
            ui.end_row();

            for (row_name, row) in matrix.columns.iter().zip(&matrix.values) {
                ui.strong(row_name);
                for cell in row {
                    let (text, fill) = match cell {
                        Some(r) => (format!("{r:.2}"), diverging(*r)),
                        None => ("no data".to_string(), Color32::LIGHT_GRAY),
                    };
                    ui.label(
                        RichText::new(text)
                            .monospace()
                            .color(Color32::BLACK)
                            .background_color(fill),
                    );
                }
                ui.end_row();
            }
        });
}
