use std::fmt;

use super::model::Dataset;

/// Five fixed age groups. Each bin includes its upper edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeBucket {
    /// [0, 12]
    Child,
    /// (12, 18]
    Teen,
    /// (18, 30]
    YoungAdult,
    /// (30, 50]
    Adult,
    /// (50, 80]
    Senior,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 5] = [
        AgeBucket::Child,
        AgeBucket::Teen,
        AgeBucket::YoungAdult,
        AgeBucket::Adult,
        AgeBucket::Senior,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Child => "Child",
            AgeBucket::Teen => "Teen",
            AgeBucket::YoungAdult => "Young Adult",
            AgeBucket::Adult => "Adult",
            AgeBucket::Senior => "Senior",
        }
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket for an age. Missing, NaN, negative and >80 ages have no bucket.
pub fn derive_age_bucket(age: Option<f64>) -> Option<AgeBucket> {
    let age = age?;
    if !(0.0..=80.0).contains(&age) {
        return None;
    }
    let bucket = if age <= 12.0 {
        AgeBucket::Child
    } else if age <= 18.0 {
        AgeBucket::Teen
    } else if age <= 30.0 {
        AgeBucket::YoungAdult
    } else if age <= 50.0 {
        AgeBucket::Adult
    } else {
        AgeBucket::Senior
    };
    Some(bucket)
}

/// The derived `age_group` column, row-aligned with a dataset.
///
/// Lives beside the dataset instead of inside it, so deriving it any
/// number of times leaves the loaded table untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeBucketColumn {
    buckets: Vec<Option<AgeBucket>>,
}

impl AgeBucketColumn {
    pub fn derive(dataset: &Dataset) -> Self {
        Self {
            buckets: dataset
                .passengers()
                .iter()
                .map(|p| derive_age_bucket(p.age))
                .collect(),
        }
    }

    pub fn get(&self, row: usize) -> Option<AgeBucket> {
        self.buckets.get(row).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<AgeBucket>> + '_ {
        self.buckets.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
