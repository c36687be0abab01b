use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

// ---------------------------------------------------------------------------
// MetadataValue – a single cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
/// Source columns are kept verbatim in this form for the table views.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v:.4}"),
            MetadataValue::Bool(b) => write!(f, "{b}"),
            MetadataValue::Null => write!(f, "<null>"),
        }
    }
}

impl MetadataValue {
    /// Interpret the value as a number. Booleans count as 0/1, the way
    /// Pandas treats them in `corr(numeric_only=True)`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetadataValue::Float(v) if !v.is_nan() => Some(*v),
            MetadataValue::Integer(i) => Some(*i as f64),
            MetadataValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            MetadataValue::Null => true,
            MetadataValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Ticket class. Ordered First < Second < Third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PassengerClass {
    First,
    Second,
    Third,
}

impl PassengerClass {
    pub const ALL: [PassengerClass; 3] = [
        PassengerClass::First,
        PassengerClass::Second,
        PassengerClass::Third,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PassengerClass::First => "First",
            PassengerClass::Second => "Second",
            PassengerClass::Third => "Third",
        }
    }

    /// Map the numeric `pclass` column (1, 2, 3).
    pub fn from_rank(rank: i64) -> Option<Self> {
        match rank {
            1 => Some(PassengerClass::First),
            2 => Some(PassengerClass::Second),
            3 => Some(PassengerClass::Third),
            _ => None,
        }
    }
}

impl fmt::Display for PassengerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PassengerClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(PassengerClass::First),
            "second" => Ok(PassengerClass::Second),
            "third" => Ok(PassengerClass::Third),
            other => bail!("unknown passenger class '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sex {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => bail!("unknown sex '{other}'"),
        }
    }
}

// ---------------------------------------------------------------------------
// Passenger – one row of the DataFrame
// ---------------------------------------------------------------------------

/// A single passenger record.
///
/// The typed fields drive every computation; `fields` keeps every source
/// column as it was read so the table views show the original cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Passenger {
    pub survived: bool,
    pub class: PassengerClass,
    pub sex: Sex,
    pub age: Option<f64>,
    pub fare: Option<f64>,
    pub embark_town: Option<String>,
    /// column_name → value, for every source column.
    pub fields: BTreeMap<String, MetadataValue>,
}

impl Passenger {
    /// Build a passenger from one raw row. Errors name the offending column.
    pub fn from_fields(fields: BTreeMap<String, MetadataValue>) -> Result<Self> {
        let survived = match fields.get("survived") {
            Some(MetadataValue::Bool(b)) => *b,
            Some(MetadataValue::Integer(0)) => false,
            Some(MetadataValue::Integer(1)) => true,
            Some(other) => bail!("'survived' must be 0/1 or a boolean, got {other}"),
            None => bail!("missing 'survived' column"),
        };

        let class = match (fields.get("class"), fields.get("pclass")) {
            (Some(MetadataValue::String(s)), _) => s.parse::<PassengerClass>()?,
            (_, Some(MetadataValue::Integer(rank))) => PassengerClass::from_rank(*rank)
                .with_context(|| format!("'pclass' out of range: {rank}"))?,
            _ => bail!("missing 'class' / 'pclass' column"),
        };

        let sex = fields
            .get("sex")
            .and_then(MetadataValue::as_str)
            .context("missing 'sex' column")?
            .parse::<Sex>()?;

        let age = non_negative(&fields, "age")?;
        let fare = non_negative(&fields, "fare")?;

        let embark_town = fields
            .get("embark_town")
            .and_then(MetadataValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Passenger {
            survived,
            class,
            sex,
            age,
            fare,
            embark_town,
            fields,
        })
    }

    /// The verbatim cell for a source column.
    pub fn cell(&self, column: &str) -> &MetadataValue {
        static NULL: MetadataValue = MetadataValue::Null;
        self.fields.get(column).unwrap_or(&NULL)
    }

    /// Numeric reading of a source column, `None` when missing or textual.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.fields.get(column).and_then(MetadataValue::as_f64)
    }
}

fn non_negative(fields: &BTreeMap<String, MetadataValue>, column: &str) -> Result<Option<f64>> {
    let Some(value) = fields.get(column) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let v = value
        .as_f64()
        .filter(|_| !matches!(value, MetadataValue::Bool(_)))
        .with_context(|| format!("'{column}' is not a number: {value}"))?;
    if !v.is_finite() || v < 0.0 {
        bail!("'{column}' must be a finite non-negative number, got {v}");
    }
    Ok(Some(v))
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Inferred type of a whole source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
    /// No non-null value at all.
    Empty,
}

impl ColumnKind {
    fn widen(self, value: &MetadataValue) -> ColumnKind {
        use ColumnKind::*;
        let cell = match value {
            v if v.is_null() => return self,
            MetadataValue::Integer(_) => Integer,
            MetadataValue::Float(_) => Float,
            MetadataValue::Bool(_) => Bool,
            _ => Text,
        };
        match (self, cell) {
            (Empty, c) => c,
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Text,
        }
    }

    /// Columns that take part in the correlation matrix.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float | ColumnKind::Bool)
    }
}

/// The full parsed dataset. Shared read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    passengers: Vec<Passenger>,
    /// Source column names in source order.
    column_names: Vec<String>,
    column_kinds: BTreeMap<String, ColumnKind>,
}

impl Dataset {
    /// Build column indices from the loaded passengers.
    pub fn new(column_names: Vec<String>, passengers: Vec<Passenger>) -> Self {
        let mut column_kinds: BTreeMap<String, ColumnKind> = column_names
            .iter()
            .map(|c| (c.clone(), ColumnKind::Empty))
            .collect();

        for p in &passengers {
            for (col, val) in &p.fields {
                if let Some(kind) = column_kinds.get_mut(col) {
                    *kind = kind.widen(val);
                }
            }
        }

        Dataset {
            passengers,
            column_names,
            column_kinds,
        }
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.column_kinds.get(column).copied()
    }

    /// Numeric columns in source order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.column_names
            .iter()
            .filter(|c| self.column_kind(c).is_some_and(ColumnKind::is_numeric))
            .map(String::as_str)
            .collect()
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> &[Passenger] {
        &self.passengers[..n.min(self.passengers.len())]
    }

    /// Classes present, in order of first appearance.
    pub fn classes(&self) -> Vec<PassengerClass> {
        first_appearance(self.passengers.iter().map(|p| p.class))
    }

    /// Sexes present, in order of first appearance.
    pub fn sexes(&self) -> Vec<Sex> {
        first_appearance(self.passengers.iter().map(|p| p.sex))
    }

    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }
}

pub(crate) fn first_appearance<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}
