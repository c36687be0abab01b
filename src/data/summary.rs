use super::analysis::quantile;
use super::model::{ColumnKind, Dataset};

/// `describe()`-style statistics for one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    pub const STAT_LABELS: [&'static str; 8] =
        ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    fn from_values(column: &str, mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        let count = values.len();
        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|m| {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        ColumnSummary {
            column: column.to_string(),
            count,
            mean,
            std,
            min: values.first().copied(),
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied(),
        }
    }

    /// Values in [`Self::STAT_LABELS`] order.
    pub fn stats(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Summary of every integer and float column, in source order.
/// Boolean and text columns are left out.
pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset
        .column_names()
        .iter()
        .filter(|c| {
            matches!(
                dataset.column_kind(c),
                Some(ColumnKind::Integer | ColumnKind::Float)
            )
        })
        .map(|c| {
            let values = dataset
                .passengers()
                .iter()
                .filter_map(|p| p.numeric(c))
                .collect();
            ColumnSummary::from_values(c, values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{dataset, passenger};
    use crate::data::model::{PassengerClass, Sex};

    #[test]
    fn describes_numeric_columns_only() {
        let ds = dataset(vec![
            passenger(PassengerClass::Third, Sex::Female, Some(10.0), true),
            passenger(PassengerClass::Third, Sex::Male, Some(20.0), false),
            passenger(PassengerClass::First, Sex::Female, Some(30.0), true),
            passenger(PassengerClass::Second, Sex::Female, Some(40.0), false),
            passenger(PassengerClass::Third, Sex::Female, None, false),
        ]);
        let summaries = describe(&ds);
        let columns: Vec<_> = summaries.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(columns, vec!["survived", "pclass", "age"]);

        let age = &summaries[2];
        assert_eq!(age.count, 4);
        assert_eq!(age.mean, Some(25.0));
        assert_eq!(age.min, Some(10.0));
        assert_eq!(age.q25, Some(17.5));
        assert_eq!(age.median, Some(25.0));
        assert_eq!(age.q75, Some(32.5));
        assert_eq!(age.max, Some(40.0));
        let std = age.std.unwrap();
        assert!((std - 12.909944487358056).abs() < 1e-9);

        let survived = &summaries[0];
        assert_eq!(survived.count, 5);
        assert_eq!(survived.mean, Some(0.4));
    }

    #[test]
    fn single_value_has_no_spread() {
        let ds = dataset(vec![passenger(PassengerClass::First, Sex::Male, Some(5.0), true)]);
        let age = describe(&ds).into_iter().find(|s| s.column == "age").unwrap();
        assert_eq!(age.count, 1);
        assert_eq!(age.std, None);
        assert_eq!(age.median, Some(5.0));
        assert_eq!(age.stats()[0], Some(1.0));
    }
}
