//! Measurement-scale classification of columns.
//!
//! A column's statistical role is inferred from its name and its declared
//! storage type by an ordered list of rules; the first rule that matches
//! decides. Name rules come before type rules, so an integer identifier such
//! as `id_cliente` is never treated as a measured quantity.
//!
//! | # | Rule                                               | Scale                     |
//! |---|----------------------------------------------------|---------------------------|
//! | 1 | name has a marker token and contains `id`          | Nominal (identifier)      |
//! | 2 | name has a marker token                            | Nominal (categorical)     |
//! | 3 | type is a date, timestamp or time                  | Temporal                  |
//! | 4 | type is numeric and name has a measure token       | Ratio (numeric)           |
//! | 5 | type is numeric                                    | Interval/Ratio (numeric)  |
//! | - | anything else                                      | Nominal                   |
//!
//! Tokens are matched as case-insensitive substrings.

use datafusion::arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier and categorical marker tokens (English and Spanish variants).
pub const CATEGORICAL_MARKERS: &[&str] = &[
    "id_",
    "id",
    "email",
    "name",
    "nombre",
    "city",
    "ciudad",
    "category",
    "categoria",
    "categoría",
    "payment_method",
    "medio_pago",
];

/// The marker that singles out identifiers among categorical columns.
pub const IDENTIFIER_MARKER: &str = "id";

/// Monetary and quantity tokens.
pub const MEASURE_MARKERS: &[&str] = &[
    "quantity", "cantidad", "price", "precio", "amount", "importe", "monto", "total",
];

/// Statistical role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementScale {
    /// Names a row or an entity; only equality is meaningful
    NominalIdentifier,
    /// A label from a set of categories
    NominalCategorical,
    /// A point in time
    Temporal,
    /// A measured quantity or amount with a true zero
    Ratio,
    /// Numeric, but nothing in the name says whether zero is meaningful
    IntervalRatio,
    /// Fallback for everything else
    Nominal,
}

impl MeasurementScale {
    /// Display label used in data dictionaries.
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementScale::NominalIdentifier => "Nominal (identifier)",
            MeasurementScale::NominalCategorical => "Nominal (categorical)",
            MeasurementScale::Temporal => "Temporal",
            MeasurementScale::Ratio => "Ratio (numeric)",
            MeasurementScale::IntervalRatio => "Interval/Ratio (numeric)",
            MeasurementScale::Nominal => "Nominal",
        }
    }
}

impl fmt::Display for MeasurementScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the rules look at: the lowercased name and the declared type.
#[derive(Debug)]
pub struct ColumnFacts<'a> {
    name: String,
    data_type: &'a DataType,
}

impl<'a> ColumnFacts<'a> {
    pub fn new(name: &str, data_type: &'a DataType) -> Self {
        Self {
            name: name.to_lowercase(),
            data_type,
        }
    }

    fn name_contains_any(&self, tokens: &[&str]) -> bool {
        tokens.iter().any(|token| self.name.contains(token))
    }

    fn has_categorical_marker(&self) -> bool {
        self.name_contains_any(CATEGORICAL_MARKERS)
    }

    fn has_measure_marker(&self) -> bool {
        self.name_contains_any(MEASURE_MARKERS)
    }

    fn is_temporal(&self) -> bool {
        matches!(
            self.data_type,
            DataType::Date32
                | DataType::Date64
                | DataType::Timestamp(_, _)
                | DataType::Time32(_)
                | DataType::Time64(_)
        )
    }

    fn is_numeric(&self) -> bool {
        self.data_type.is_numeric()
    }
}

/// One entry of the ordered rule list.
pub struct ScaleRule {
    /// Short name for logs and tests
    pub name: &'static str,
    predicate: fn(&ColumnFacts<'_>) -> bool,
    /// Scale assigned when the rule matches
    pub scale: MeasurementScale,
}

impl ScaleRule {
    /// Evaluates the rule's predicate.
    pub fn matches(&self, facts: &ColumnFacts<'_>) -> bool {
        (self.predicate)(facts)
    }
}

impl fmt::Debug for ScaleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaleRule")
            .field("name", &self.name)
            .field("scale", &self.scale)
            .finish()
    }
}

static RULES: [ScaleRule; 5] = [
    ScaleRule {
        name: "identifier_marker",
        predicate: |c| c.has_categorical_marker() && c.name.contains(IDENTIFIER_MARKER),
        scale: MeasurementScale::NominalIdentifier,
    },
    ScaleRule {
        name: "categorical_marker",
        predicate: |c| c.has_categorical_marker(),
        scale: MeasurementScale::NominalCategorical,
    },
    ScaleRule {
        name: "temporal_type",
        predicate: |c| c.is_temporal(),
        scale: MeasurementScale::Temporal,
    },
    ScaleRule {
        name: "numeric_measure",
        predicate: |c| c.is_numeric() && c.has_measure_marker(),
        scale: MeasurementScale::Ratio,
    },
    ScaleRule {
        name: "numeric",
        predicate: |c| c.is_numeric(),
        scale: MeasurementScale::IntervalRatio,
    },
];

/// Assigns a [`MeasurementScale`] to a column. Pure and total.
///
/// # Examples
///
/// ```rust
/// use aurelion_analytics::analyzers::{MeasurementScale, ScaleClassifier};
/// use datafusion::arrow::datatypes::DataType;
///
/// assert_eq!(
///     ScaleClassifier::classify("id_cliente", &DataType::Int64),
///     MeasurementScale::NominalIdentifier
/// );
/// assert_eq!(
///     ScaleClassifier::classify("precio_unitario", &DataType::Float64),
///     MeasurementScale::Ratio
/// );
/// ```
pub struct ScaleClassifier;

impl ScaleClassifier {
    /// The rules in evaluation order.
    pub fn rules() -> &'static [ScaleRule] {
        &RULES
    }

    /// The first rule matching the column, or `None` when the fallback applies.
    pub fn matching_rule(name: &str, data_type: &DataType) -> Option<&'static ScaleRule> {
        let facts = ColumnFacts::new(name, data_type);
        RULES.iter().find(|rule| rule.matches(&facts))
    }

    /// Classifies a column by name and declared type.
    pub fn classify(name: &str, data_type: &DataType) -> MeasurementScale {
        Self::matching_rule(name, data_type)
            .map(|rule| rule.scale)
            .unwrap_or(MeasurementScale::Nominal)
    }
}
