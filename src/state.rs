use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::data::error::DataError;
use crate::data::filter::{age_bounds, AgeRange, FilterSelection, SurvivalLabel};
use crate::data::loader::{load_from, DataSource};
use crate::data::model::{Dataset, PassengerClass, Sex};

// ---------------------------------------------------------------------------
// Filter widget state
// ---------------------------------------------------------------------------

/// What the filter widgets hold between frames. The [`FilterSelection`]
/// handed to the view model is rebuilt from this every frame.
#[derive(Debug, Clone)]
pub struct FilterWidgets {
    pub classes: Vec<PassengerClass>,
    pub sexes: Vec<Sex>,
    /// Slider limits.
    pub age_bounds: (i64, i64),

    pub class: PassengerClass,
    pub sex: Sex,
    pub age_lower: i64,
    pub age_upper: i64,
    pub survival: BTreeSet<SurvivalLabel>,
}

impl FilterWidgets {
    pub fn new(dataset: &Dataset) -> Self {
        let initial = FilterSelection::initial(dataset);
        Self {
            classes: dataset.classes(),
            sexes: dataset.sexes(),
            age_bounds: age_bounds(dataset).unwrap_or((0, 0)),
            class: initial.class,
            sex: initial.sex,
            age_lower: initial.age_range.lower,
            age_upper: initial.age_range.upper,
            survival: initial.survival,
        }
    }

    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            class: self.class,
            sex: self.sex,
            age_range: AgeRange {
                lower: self.age_lower,
                upper: self.age_upper,
            },
            survival: self.survival.clone(),
        }
    }

    pub fn toggle_survival(&mut self, label: SurvivalLabel) {
        if !self.survival.remove(&label) {
            self.survival.insert(label);
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A loaded dataset plus the widgets exploring it.
pub struct Session {
    pub dataset: Arc<Dataset>,
    pub widgets: FilterWidgets,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// `None` until a dataset has been materialized.
    pub session: Option<Session>,

    /// Why the dataset could not be materialized.
    pub load_error: Option<DataError>,

    pub origin: DataSource,

    pub image_path: PathBuf,
    pub image_width: f32,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            session: None,
            load_error: None,
            origin: config.source(),
            image_path: config.image.clone(),
            image_width: config.image_width,
        }
    }

    /// Ingest a loaded dataset and reset the filters to their defaults.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        let widgets = FilterWidgets::new(&dataset);
        self.session = Some(Session { dataset, widgets });
        self.load_error = None;
    }

    pub fn set_load_error(&mut self, error: DataError) {
        self.session = None;
        self.load_error = Some(error);
    }

    /// Replace the session with a local copy picked by the user.
    /// On failure a loaded session stays on screen and the error goes to
    /// the top bar.
    pub fn open_local_copy(&mut self, path: &Path) {
        let source = DataSource::File(path.to_path_buf());
        match load_from(&source) {
            Ok(dataset) => {
                self.origin = source;
                self.set_dataset(Arc::new(dataset));
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                if self.session.is_some() {
                    self.load_error = Some(e);
                } else {
                    self.set_load_error(e);
                }
            }
        }
    }
}
