use std::collections::{BTreeMap, BTreeSet};
use std::fmt;


// ---------------------------------------------------------------------------
// CellValue – a single decoded cell, before column mapping
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as read from a spreadsheet, CSV, Parquet or JSON
/// source. Every reader produces these so the row builder can apply one set
/// of coercion rules regardless of format.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Empty => Ok(()),
        }
    }
}

impl CellValue {
    /// Whether the cell carries no value (empty text counts as empty).
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Interpret the value as an `f64`. Text is parsed, so `"NaN"` yields NaN.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Facet – the three categorical filter dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facet {
    City,
    CustomerType,
    Gender,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::City, Facet::CustomerType, Facet::Gender];

    pub fn label(self) -> &'static str {
        match self {
            Facet::City => "City",
            Facet::CustomerType => "Customer type",
            Facet::Gender => "Gender",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Transaction – one row of the sales sheet
// ---------------------------------------------------------------------------

/// A single sales transaction after loading and coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Order identifier. Not required to be unique.
    pub order_id: String,
    pub city: String,
    pub customer_type: String,
    pub gender: String,
    pub product_line: String,
    /// Total price; never NaN after load.
    pub total: f64,
    /// Customer rating on a 0–10 scale; missing values are stored as 0.
    pub rating: f64,
    /// Wall-clock time as `HH:MM:SS`.
    pub time: String,
    /// Hour bucket (0–23) derived from `time`.
    pub hour: u8,
}

impl Transaction {
    /// The value of this row for a filter facet.
    pub fn facet(&self, facet: Facet) -> &str {
        match facet {
            Facet::City => &self.city,
            Facet::CustomerType => &self.customer_type,
            Facet::Gender => &self.gender,
        }
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full loaded dataset with pre-computed facet indices.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    /// All transactions in source order.
    pub rows: Vec<Transaction>,
    /// For each facet the sorted set of distinct values.
    distinct: BTreeMap<Facet, BTreeSet<String>>,
}

impl SalesDataset {
    /// Build facet indices from the loaded rows.
    pub fn from_rows(rows: Vec<Transaction>) -> Self {
        let mut distinct: BTreeMap<Facet, BTreeSet<String>> =
            Facet::ALL.iter().map(|f| (*f, BTreeSet::new())).collect();

        for row in &rows {
            for facet in Facet::ALL {
                distinct
                    .entry(facet)
                    .or_default()
                    .insert(row.facet(facet).to_string());
            }
        }

        SalesDataset { rows, distinct }
    }

    /// Distinct values of a facet column, used to populate selection widgets.
    pub fn distinct_values(&self, facet: Facet) -> &BTreeSet<String> {
        // Every facet is seeded in `from_rows`; `Default` datasets are empty.
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.distinct.get(&facet).unwrap_or(&EMPTY)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn transaction(
    city: &str,
    customer_type: &str,
    gender: &str,
    product_line: &str,
    total: f64,
    rating: f64,
    time: &str,
) -> Transaction {
    let hour = time
        .split(':')
        .next()
        .and_then(|h| h.parse().ok())
        .unwrap_or(0);
    Transaction {
        order_id: format!("{city}-{time}"),
        city: city.to_string(),
        customer_type: customer_type.to_string(),
        gender: gender.to_string(),
        product_line: product_line.to_string(),
        total,
        rating,
        time: time.to_string(),
        hour,
    }
}
