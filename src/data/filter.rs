use std::collections::BTreeSet;
use std::fmt;

use super::model::{Dataset, Passenger, PassengerClass, Sex};

// ---------------------------------------------------------------------------
// Selection: what the filter widgets currently say
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SurvivalLabel {
    Survived,
    DidNotSurvive,
}

impl SurvivalLabel {
    pub const ALL: [SurvivalLabel; 2] = [SurvivalLabel::Survived, SurvivalLabel::DidNotSurvive];

    pub fn of(survived: bool) -> Self {
        if survived {
            SurvivalLabel::Survived
        } else {
            SurvivalLabel::DidNotSurvive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SurvivalLabel::Survived => "Survived",
            SurvivalLabel::DidNotSurvive => "Did not survive",
        }
    }
}

impl fmt::Display for SurvivalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive integer age bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub lower: i64,
    pub upper: i64,
}

impl AgeRange {
    pub fn contains(&self, age: f64) -> bool {
        self.lower as f64 <= age && age <= self.upper as f64
    }
}

/// The four filter widgets' values. Rebuilt every frame, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub class: PassengerClass,
    pub sex: Sex,
    pub age_range: AgeRange,
    pub survival: BTreeSet<SurvivalLabel>,
}

impl FilterSelection {
    /// Widget defaults: first class and sex seen in the data, ages from
    /// zero (or the youngest passenger) to the oldest, both outcomes.
    pub fn initial(dataset: &Dataset) -> Self {
        let class = dataset
            .classes()
            .first()
            .copied()
            .unwrap_or(PassengerClass::First);
        let sex = dataset.sexes().first().copied().unwrap_or(Sex::Male);
        let age_range = match age_bounds(dataset) {
            Some((lo, hi)) => AgeRange {
                lower: lo.max(0),
                upper: hi,
            },
            None => AgeRange { lower: 0, upper: 0 },
        };
        FilterSelection {
            class,
            sex,
            age_range,
            survival: SurvivalLabel::ALL.into_iter().collect(),
        }
    }

    /// Whether one passenger passes all four predicates.
    pub fn matches(&self, passenger: &Passenger) -> bool {
        passenger.class == self.class
            && passenger.sex == self.sex
            && passenger.age.is_some_and(|age| self.age_range.contains(age))
            && self.survival.contains(&SurvivalLabel::of(passenger.survived))
    }
}

/// Slider bounds: whole-year floor of the youngest and oldest known ages.
pub fn age_bounds(dataset: &Dataset) -> Option<(i64, i64)> {
    let mut ages = dataset.passengers().iter().filter_map(|p| p.age);
    let first = ages.next()?;
    let (min, max) = ages.fold((first, first), |(lo, hi), a| (lo.min(a), hi.max(a)));
    Some((min.floor() as i64, max.floor() as i64))
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// Rows of a dataset that pass a selection, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Passenger> + '_ {
        let passengers = self.dataset.passengers();
        self.indices.iter().map(move |&i| &passengers[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Fresh pass over the full dataset. A class or sex with no rows simply
/// matches nothing; an empty survival set hides everything.
pub fn apply_filters<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    let indices: Vec<usize> = dataset
        .passengers()
        .iter()
        .enumerate()
        .filter(|(_, p)| selection.matches(p))
        .map(|(i, _)| i)
        .collect();

    log::debug!(
        "filter {:?}/{:?}/{}..={} kept {} of {} rows",
        selection.class,
        selection.sex,
        selection.age_range.lower,
        selection.age_range.upper,
        indices.len(),
        dataset.len()
    );

    FilteredView { dataset, indices }
}
