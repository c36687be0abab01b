use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::analysis::{extract, AnalysisKind};
use crate::data::filter::{apply_filters, FilterSelection, SurvivalLabel};
use crate::data::model::Dataset;
use crate::data::summary::describe;
use crate::state::{AppState, FilterWidgets};
use crate::ui::{plot, table};

const OVERVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the filter widgets. Choices come from the loaded data only.
pub fn filter_panel(ui: &mut Ui, widgets: &mut FilterWidgets) {
    ui.heading("🔍 Explore Data with Filters");
    ui.separator();

    ui.strong("Select Passenger Class:");
    egui::ComboBox::from_id_salt("class_filter")
        .selected_text(widgets.class.label())
        .show_ui(ui, |ui: &mut Ui| {
            for class in widgets.classes.clone() {
                ui.selectable_value(&mut widgets.class, class, class.label());
            }
        });
    ui.add_space(6.0);

    ui.strong("Select Gender:");
    for sex in widgets.sexes.clone() {
        ui.radio_value(&mut widgets.sex, sex, sex.label());
    }
    ui.add_space(6.0);

    ui.strong("Select Age Range:");
    let (lo, hi) = widgets.age_bounds;
    ui.add(egui::Slider::new(&mut widgets.age_lower, lo..=hi).text("from"));
    ui.add(egui::Slider::new(&mut widgets.age_upper, lo..=hi).text("to"));
    if widgets.age_lower > widgets.age_upper {
        widgets.age_upper = widgets.age_lower;
    }
    ui.add_space(6.0);

    ui.strong("Survival Status:");
    for label in SurvivalLabel::ALL {
        let mut checked = widgets.survival.contains(&label);
        if ui.checkbox(&mut checked, label.label()).changed() {
            widgets.toggle_survival(label);
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – the report
// ---------------------------------------------------------------------------

/// Header, overview, charts and the filtered rows, top to bottom.
/// Everything is recomputed from the dataset on each call.
pub fn report(ui: &mut Ui, state: &AppState, dataset: &Dataset, selection: &FilterSelection) {
    header(ui, state);

    ui.heading("Dataset Overview");
    let head: Vec<_> = dataset.head(OVERVIEW_ROWS).iter().enumerate().collect();
    table::passenger_table(ui, "overview_table", dataset, &head);
    ui.add_space(12.0);

    ui.heading("Summary Statistics");
    table::summary_table(ui, &describe(dataset));
    ui.add_space(12.0);

    ui.heading("Graphs and Analysis");
    for kind in AnalysisKind::ALL {
        ui.add_space(8.0);
        ui.label(RichText::new(kind.title()).strong().size(16.0));
        plot::chart(ui, kind, &extract(dataset, kind));
    }
    ui.add_space(12.0);

    ui.heading("🔍 Filtered Passengers");
    let view = apply_filters(dataset, selection);
    let rows: Vec<_> = view.indices().iter().copied().zip(view.rows()).collect();
    table::passenger_table(ui, "filtered_table", dataset, &rows);
    ui.label(format!(
        "Showing {} passengers matching the selected criteria",
        view.len()
    ));
}

/// Optional image next to the title. A missing image file is skipped.
fn header(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        if state.image_path.exists() {
            let uri = format!("file://{}", state.image_path.display());
            ui.add(
                egui::Image::new(uri)
                    .max_width(state.image_width)
                    .rounding(4.0),
            );
        }
        ui.heading(RichText::new("Titanic Data Analysis").size(28.0));
    });
    ui.separator();
}

// ---------------------------------------------------------------------------
// Load failure
// ---------------------------------------------------------------------------

/// Shown instead of the report when no dataset could be materialized.
pub fn load_failure(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading("The Titanic dataset could not be loaded.");
        ui.add_space(8.0);
        match &state.load_error {
            Some(e) => {
                ui.label(RichText::new(e.to_string()).color(Color32::RED));
            }
            None => {
                ui.label("No dataset loaded.");
            }
        }
        ui.add_space(12.0);
        if ui.button("Open local copy…").clicked() {
            open_file_dialog(state);
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
            if ui.button("Open local copy…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            ui.label(format!(
                "{} passengers loaded from {}",
                session.dataset.len(),
                state.origin
            ));
        }

        if let Some(e) = &state.load_error {
            ui.label(RichText::new(format!("Error: {e}")).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open a local copy of the Titanic dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_local_copy(&path);
    }
}
