//! Chart data for the ten fixed dashboard panels.
//!
//! Every extraction is a pure function of the dataset. A row with a
//! missing value only drops out of the analyses that read that value.

use std::fmt;

use super::bucket::{AgeBucket, AgeBucketColumn};
use super::model::{first_appearance, Dataset, Passenger, PassengerClass, Sex};

/// Bin count for the age and fare histograms.
pub const HISTOGRAM_BINS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    ClassDistribution,
    SurvivalBySex,
    EmbarkTownCounts,
    SurvivalByClass,
    AgeHistogram,
    SurvivalByAgeBucket,
    FareHistogram,
    FareByClass,
    AgeByClass,
    Correlation,
}

impl AnalysisKind {
    /// Page order.
    pub const ALL: [AnalysisKind; 10] = [
        AnalysisKind::ClassDistribution,
        AnalysisKind::SurvivalBySex,
        AnalysisKind::EmbarkTownCounts,
        AnalysisKind::SurvivalByClass,
        AnalysisKind::AgeHistogram,
        AnalysisKind::SurvivalByAgeBucket,
        AnalysisKind::FareHistogram,
        AnalysisKind::FareByClass,
        AnalysisKind::AgeByClass,
        AnalysisKind::Correlation,
    ];

    pub fn title(self) -> &'static str {
        match self {
            AnalysisKind::ClassDistribution => "Class Distribution",
            AnalysisKind::SurvivalBySex => "Survival Rate by Gender",
            AnalysisKind::EmbarkTownCounts => "Passenger Count by Embarkation Port",
            AnalysisKind::SurvivalByClass => "Survival Rate by Passenger Class",
            AnalysisKind::AgeHistogram => "Age Distribution",
            AnalysisKind::SurvivalByAgeBucket => "Survival Rate by Age Group",
            AnalysisKind::FareHistogram => "Fare Distribution",
            AnalysisKind::FareByClass => "Fare Distribution by Passenger Class",
            AnalysisKind::AgeByClass => "Age Distribution by Passenger Class",
            AnalysisKind::Correlation => "Correlation Heatmap",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// ChartData
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Share of survivors in a group. `rate` is `None` for an empty group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRate {
    pub label: String,
    pub rate: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueGroup {
    pub label: String,
    pub values: Vec<f64>,
}

/// Square Pearson matrix; `values[i][j]` pairs `columns[i]` with `columns[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Counts(Vec<CategoryCount>),
    Rates(Vec<GroupRate>),
    /// Raw values for a histogram.
    Values(Vec<f64>),
    /// Raw values per category for box plots.
    GroupedValues(Vec<ValueGroup>),
    Correlation(CorrelationMatrix),
}

pub fn extract(dataset: &Dataset, kind: AnalysisKind) -> ChartData {
    let passengers = dataset.passengers();
    match kind {
        AnalysisKind::ClassDistribution => ChartData::Counts(count_by(
            &PassengerClass::ALL,
            |c: PassengerClass| c.label().to_string(),
            passengers.iter().map(|p| Some(p.class)),
        )),
        AnalysisKind::SurvivalBySex => ChartData::Rates(rates_by(
            &dataset.sexes(),
            |s: Sex| s.label().to_string(),
            passengers.iter().map(|p| (Some(p.sex), p.survived)),
        )),
        AnalysisKind::EmbarkTownCounts => {
            let towns =
                first_appearance(passengers.iter().filter_map(|p| p.embark_town.as_deref()));
            ChartData::Counts(count_by(
                &towns,
                |t: &str| t.to_string(),
                passengers.iter().map(|p| p.embark_town.as_deref()),
            ))
        }
        AnalysisKind::SurvivalByClass => ChartData::Rates(rates_by(
            &PassengerClass::ALL,
            |c: PassengerClass| c.label().to_string(),
            passengers.iter().map(|p| (Some(p.class), p.survived)),
        )),
        AnalysisKind::AgeHistogram => {
            ChartData::Values(passengers.iter().filter_map(|p| p.age).collect())
        }
        AnalysisKind::SurvivalByAgeBucket => {
            let buckets = AgeBucketColumn::derive(dataset);
            ChartData::Rates(rates_by(
                &AgeBucket::ALL,
                |b: AgeBucket| b.label().to_string(),
                buckets.iter().zip(passengers).map(|(b, p)| (b, p.survived)),
            ))
        }
        AnalysisKind::FareHistogram => {
            ChartData::Values(passengers.iter().filter_map(|p| p.fare).collect())
        }
        AnalysisKind::FareByClass => ChartData::GroupedValues(values_by_class(dataset, |p| p.fare)),
        AnalysisKind::AgeByClass => ChartData::GroupedValues(values_by_class(dataset, |p| p.age)),
        AnalysisKind::Correlation => ChartData::Correlation(correlation(dataset)),
    }
}

fn count_by<K: PartialEq + Copy>(
    groups: &[K],
    label: impl Fn(K) -> String,
    keys: impl Iterator<Item = Option<K>>,
) -> Vec<CategoryCount> {
    let mut counts = vec![0usize; groups.len()];
    for key in keys.flatten() {
        if let Some(i) = groups.iter().position(|g| *g == key) {
            counts[i] += 1;
        }
    }
    groups
        .iter()
        .zip(counts)
        .map(|(g, count)| CategoryCount {
            label: label(*g),
            count,
        })
        .collect()
}

fn rates_by<K: PartialEq + Copy>(
    groups: &[K],
    label: impl Fn(K) -> String,
    rows: impl Iterator<Item = (Option<K>, bool)>,
) -> Vec<GroupRate> {
    let mut tallies = vec![(0usize, 0usize); groups.len()];
    for (key, survived) in rows {
        let Some(key) = key else { continue };
        if let Some(i) = groups.iter().position(|g| *g == key) {
            tallies[i].0 += 1;
            tallies[i].1 += survived as usize;
        }
    }
    groups
        .iter()
        .zip(tallies)
        .map(|(g, (count, survivors))| GroupRate {
            label: label(*g),
            rate: survival_rate(count, survivors),
            count,
        })
        .collect()
}

/// Mean of the survival flag; undefined for an empty group.
pub fn survival_rate(count: usize, survivors: usize) -> Option<f64> {
    (count > 0).then(|| survivors as f64 / count as f64)
}

fn values_by_class(
    dataset: &Dataset,
    value: impl Fn(&Passenger) -> Option<f64>,
) -> Vec<ValueGroup> {
    PassengerClass::ALL
        .iter()
        .map(|&class| ValueGroup {
            label: class.label().to_string(),
            values: dataset
                .passengers()
                .iter()
                .filter(|p| p.class == class)
                .filter_map(&value)
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson matrix over the numeric columns. Each pair only uses the rows
/// where both columns have a value.
pub fn correlation(dataset: &Dataset) -> CorrelationMatrix {
    let columns = dataset.numeric_columns();
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| dataset.passengers().iter().map(|p| p.numeric(c)).collect())
        .collect();

    let values = series
        .iter()
        .map(|a| series.iter().map(|b| pearson(a, b)).collect())
        .collect();

    CorrelationMatrix {
        columns: columns.into_iter().map(str::to_string).collect(),
        values,
    }
}

/// `None` with fewer than two complete pairs or a constant side.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Histogram and box-plot helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over [min, max]; the last bin also holds `max`.
/// A constant sample is spread over [v - 0.5, v + 0.5].
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Linear-interpolated quantile of an ascending slice, `q` in [0, 1].
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Sample points of the counts histogram overlay.
pub const DENSITY_POINTS: usize = 200;

/// Gaussian kernel density over [min, max] with Scott's bandwidth,
/// as `(x, density)` pairs. `None` for fewer than two values or a
/// constant sample.
pub fn density_curve(values: &[f64], points: usize) -> Option<Vec<[f64; 2]>> {
    if values.len() < 2 || points < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    if var == 0.0 {
        return None;
    }
    let bandwidth = var.sqrt() * n.powf(-0.2);
    let norm = n * bandwidth * (2.0 * std::f64::consts::PI).sqrt();

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let step = (max - min) / (points - 1) as f64;

    let curve = (0..points)
        .map(|i| {
            let x = min + step * i as f64;
            let sum: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            [x, sum / norm]
        })
        .collect();
    Some(curve)
}

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;
        let reach = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - reach, q3 + reach);

        let within = |v: &f64| (low_fence..=high_fence).contains(v);
        let lower_whisker = sorted.iter().copied().find(within).unwrap_or(q1);
        let upper_whisker = sorted.iter().copied().rev().find(within).unwrap_or(q3);
        let outliers = sorted.iter().copied().filter(|v| !within(v)).collect();

        Some(BoxSummary {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
            outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{dataset, passenger};
    use crate::data::model::MetadataValue;

    fn sample() -> Dataset {
        let mut rows = vec![
            passenger(PassengerClass::Third, Sex::Female, Some(10.0), true),
            passenger(PassengerClass::Third, Sex::Male, Some(25.0), false),
            passenger(PassengerClass::First, Sex::Female, Some(40.0), true),
            passenger(PassengerClass::Third, Sex::Female, None, false),
        ];
        let fares = [7.25, 8.05, 71.28, 12.0];
        let towns = [Some("Southampton"), None, Some("Cherbourg"), Some("Southampton")];
        for ((p, fare), town) in rows.iter_mut().zip(fares).zip(towns) {
            p.fare = Some(fare);
            p.fields.insert("fare".into(), MetadataValue::Float(fare));
            p.embark_town = town.map(str::to_string);
        }
        dataset(rows)
    }

    fn rates(data: ChartData) -> Vec<GroupRate> {
        match data {
            ChartData::Rates(r) => r,
            other => panic!("expected rates, got {other:?}"),
        }
    }

    #[test]
    fn rate_of_mixed_group_is_half_and_empty_is_undefined() {
        assert_eq!(survival_rate(2, 1), Some(0.5));
        assert_eq!(survival_rate(0, 0), None);
    }

    #[test]
    fn class_counts_keep_empty_classes() {
        let ChartData::Counts(counts) = extract(&sample(), AnalysisKind::ClassDistribution) else {
            panic!("expected counts");
        };
        let pairs: Vec<_> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("First", 1), ("Second", 0), ("Third", 3)]);
    }

    #[test]
    fn class_rates_mark_empty_group_as_no_data() {
        let r = rates(extract(&sample(), AnalysisKind::SurvivalByClass));
        assert_eq!(r[0].rate, Some(1.0));
        assert_eq!(r[1].rate, None);
        assert_eq!(r[1].count, 0);
        assert_eq!(r[2].rate, Some(1.0 / 3.0));
    }

    #[test]
    fn sex_rates_follow_first_appearance() {
        let r = rates(extract(&sample(), AnalysisKind::SurvivalBySex));
        assert_eq!(r[0].label, "female");
        assert_eq!(r[0].rate, Some(2.0 / 3.0));
        assert_eq!(r[1].label, "male");
        assert_eq!(r[1].rate, Some(0.0));
    }

    #[test]
    fn age_bucket_rates_skip_missing_ages() {
        let r = rates(extract(&sample(), AnalysisKind::SurvivalByAgeBucket));
        let total: usize = r.iter().map(|g| g.count).sum();
        assert_eq!(total, 3);
        assert_eq!(r[0].label, "Child");
        assert_eq!(r[0].rate, Some(1.0));
        assert_eq!(r[1].rate, None);
        assert_eq!(r[2].rate, Some(0.0));
        assert_eq!(r[3].rate, Some(1.0));
        assert_eq!(r[4].rate, None);
    }

    #[test]
    fn town_counts_exclude_missing() {
        let ChartData::Counts(counts) = extract(&sample(), AnalysisKind::EmbarkTownCounts) else {
            panic!("expected counts");
        };
        let pairs: Vec<_> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("Southampton", 2), ("Cherbourg", 1)]);
    }

    #[test]
    fn histograms_and_groups_drop_missing_values() {
        let ds = sample();
        assert_eq!(
            extract(&ds, AnalysisKind::AgeHistogram),
            ChartData::Values(vec![10.0, 25.0, 40.0])
        );
        let ChartData::GroupedValues(groups) = extract(&ds, AnalysisKind::AgeByClass) else {
            panic!("expected groups");
        };
        assert_eq!(groups[0].values, vec![40.0]);
        assert!(groups[1].values.is_empty());
        assert_eq!(groups[2].values, vec![10.0, 25.0]);
    }

    #[test]
    fn extraction_is_pure() {
        let ds = sample();
        for kind in AnalysisKind::ALL {
            let first = extract(&ds, kind);
            let _ = extract(&ds, AnalysisKind::SurvivalByAgeBucket);
            assert_eq!(first, extract(&ds, kind), "{kind}");
        }
    }

    #[test]
    fn correlation_skips_text_columns_and_incomplete_pairs() {
        let matrix = correlation(&sample());
        assert_eq!(matrix.columns, vec!["survived", "pclass", "age", "fare"]);
        assert!(matrix.get("sex", "age").is_none());

        // age is missing on row 3, so age pairs use rows 0..3 only.
        let survived = [Some(1.0), Some(0.0), Some(1.0)];
        let age = [Some(10.0), Some(25.0), Some(40.0)];
        let expected = pearson(&survived, &age).unwrap();
        let got = matrix.get("survived", "age").unwrap();
        assert!((got - expected).abs() < 1e-12);

        assert_eq!(matrix.get("age", "age"), Some(1.0));
    }

    #[test]
    fn pearson_of_constant_is_undefined() {
        let a = [Some(1.0), Some(1.0), Some(1.0)];
        let b = [Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(pearson(&a, &b), None);
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
        let c = [Some(3.0), Some(2.0), Some(1.0)];
        assert!((pearson(&b, &c).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn histogram_closes_last_bin() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[1].count, 3);
        assert_eq!(bins[1].end, 4.0);

        let single = histogram(&[5.0, 5.0], 30);
        assert_eq!(single.iter().map(|b| b.count).sum::<usize>(), 2);
        assert!(histogram(&[], 30).is_empty());
    }

    #[test]
    fn density_peaks_at_the_centre_of_a_symmetric_sample() {
        let curve = density_curve(&[0.0, 1.0, 2.0, 3.0, 4.0], 101).unwrap();
        assert_eq!(curve.len(), 101);
        assert_eq!(curve[0][0], 0.0);
        assert_eq!(curve[100][0], 4.0);
        assert!((curve[0][1] - curve[100][1]).abs() < 1e-12);

        let peak = curve
            .iter()
            .max_by(|a, b| a[1].total_cmp(&b[1]))
            .unwrap();
        assert!((peak[0] - 2.0).abs() < 1e-9);

        assert!(density_curve(&[3.0, 3.0, 3.0], 10).is_none());
        assert!(density_curve(&[3.0], 10).is_none());
    }

    #[test]
    fn box_summary_flags_outliers() {
        let summary = BoxSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 4.0);
        assert_eq!(summary.outliers, vec![100.0]);
        assert!(BoxSummary::from_values(&[]).is_none());
    }
}
