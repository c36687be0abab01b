use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{Dataset, Passenger};
use crate::data::summary::ColumnSummary;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Passenger rows
// ---------------------------------------------------------------------------

/// Render passengers with every source column. `rows` pairs the dataset
/// row index with the passenger.
pub fn passenger_table(ui: &mut Ui, id: &str, dataset: &Dataset, rows: &[(usize, &Passenger)]) {
    let columns = dataset.column_names();

    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(true)
            .max_scroll_height(260.0)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(40.0))
            .columns(Column::auto().at_least(60.0), columns.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
                for col in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(col);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let (index, passenger) = rows[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.label(index.to_string());
                    });
                    for col in columns {
                        row.col(|ui: &mut Ui| {
                            ui.label(passenger.cell(col).to_string());
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// `describe()` layout: one row per statistic, one column per attribute.
pub fn summary_table(ui: &mut Ui, summaries: &[ColumnSummary]) {
    ui.push_id("summary_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(50.0))
            .columns(Column::auto().at_least(80.0), summaries.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|_ui: &mut Ui| {});
                for s in summaries {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&s.column);
                    });
                }
            })
            .body(|mut body| {
                for (i, label) in ColumnSummary::STAT_LABELS.iter().enumerate() {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.strong(*label);
                        });
                        for s in summaries {
                            row.col(|ui: &mut Ui| {
                                ui.label(format_stat(s.stats()[i]));
                            });
                        }
                    });
                }
            });
    });
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.6}"),
        None => "no data".to_string(),
    }
}
