use std::collections::BTreeMap;

use super::model::Transaction;

/// Summary of a non-empty selection of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesSummary {
    pub transaction_count: usize,
    pub total_sales: f64,
    /// Mean rating rounded to one decimal.
    pub average_rating: f64,
    /// Whole stars for display; never negative.
    pub star_count: u32,
    /// Mean total per transaction rounded to two decimals.
    pub average_transaction_value: f64,
    /// Hour bucket → sales. Only hours that occur are present.
    pub sales_by_hour: BTreeMap<u8, f64>,
    /// Product line → sales, smallest first.
    pub sales_by_product_line: Vec<(String, f64)>,
}

/// Aggregation outcome. An empty selection is `NoData`, never a zeroed summary.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateResult {
    NoData,
    Summary(SalesSummary),
}

impl AggregateResult {
    pub fn summary(&self) -> Option<&SalesSummary> {
        match self {
            AggregateResult::Summary(s) => Some(s),
            AggregateResult::NoData => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, AggregateResult::NoData)
    }
}

pub fn nan_to_zero(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v }
}

/// Round half to even at `decimals` places.
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round_ties_even() / scale
}

/// Compute the dashboard metrics over the given rows.
pub fn aggregate<'a, I>(rows: I) -> AggregateResult
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut count = 0usize;
    let mut total_sales = 0.0;
    let mut rating_sum = 0.0;
    let mut by_hour: BTreeMap<u8, f64> = BTreeMap::new();
    let mut by_line: BTreeMap<&str, f64> = BTreeMap::new();

    for row in rows {
        let total = nan_to_zero(row.total);
        count += 1;
        total_sales += total;
        rating_sum += nan_to_zero(row.rating);
        *by_hour.entry(row.hour).or_default() += total;
        *by_line.entry(row.product_line.as_str()).or_default() += total;
    }

    if count == 0 {
        return AggregateResult::NoData;
    }

    let n = count as f64;
    let average_rating = round_to(nan_to_zero(rating_sum / n), 1);
    let average_transaction_value = round_to(nan_to_zero(total_sales / n), 2);

    // Stable sort keeps equal sums in name order.
    let mut sales_by_product_line: Vec<(String, f64)> = by_line
        .into_iter()
        .map(|(line, sum)| (line.to_string(), sum))
        .collect();
    sales_by_product_line.sort_by(|a, b| a.1.total_cmp(&b.1));

    AggregateResult::Summary(SalesSummary {
        transaction_count: count,
        total_sales: nan_to_zero(total_sales),
        average_rating,
        star_count: star_count(average_rating),
        average_transaction_value,
        sales_by_hour: by_hour,
        sales_by_product_line,
    })
}

fn star_count(average_rating: f64) -> u32 {
    if average_rating.is_finite() && average_rating > 0.0 {
        average_rating.round_ties_even() as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::transaction;

    #[test]
    fn single_row_summary() {
        let rows = [transaction("A", "Member", "F", "Food", 100.0, 8.0, "09:15:00")];
        let AggregateResult::Summary(s) = aggregate(&rows) else {
            panic!("expected a summary");
        };
        assert_eq!(s.total_sales, 100.0);
        assert_eq!(s.average_rating, 8.0);
        assert_eq!(s.star_count, 8);
        assert_eq!(s.average_transaction_value, 100.0);
        assert_eq!(s.sales_by_hour, BTreeMap::from([(9, 100.0)]));
        assert_eq!(s.sales_by_product_line, vec![("Food".to_string(), 100.0)]);
    }

    #[test]
    fn empty_input_is_no_data() {
        let rows: Vec<Transaction> = Vec::new();
        assert_eq!(aggregate(&rows), AggregateResult::NoData);
    }

    #[test]
    fn partitions_share_the_total() {
        let rows = [
            transaction("A", "Member", "F", "Food", 10.25, 7.0, "09:00:00"),
            transaction("A", "Member", "F", "Sports", 40.5, 5.0, "09:59:59"),
            transaction("B", "Normal", "M", "Food", 3.0, 9.0, "18:10:00"),
            transaction("B", "Normal", "M", "Home", 22.0, 4.0, "20:00:00"),
        ];
        let s = aggregate(&rows).summary().cloned().unwrap();

        let by_hour: f64 = s.sales_by_hour.values().sum();
        let by_line: f64 = s.sales_by_product_line.iter().map(|(_, v)| v).sum();
        assert!((by_hour - s.total_sales).abs() < 1e-9);
        assert!((by_line - s.total_sales).abs() < 1e-9);
        assert_eq!(s.sales_by_hour.len(), 3, "no zero-filled hours");

        let sums: Vec<f64> = s.sales_by_product_line.iter().map(|(_, v)| *v).collect();
        assert!(sums.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(s.sales_by_product_line[0].0, "Food");
    }

    #[test]
    fn nan_values_count_as_zero() {
        let rows = [
            transaction("A", "Member", "F", "Food", f64::NAN, f64::NAN, "09:00:00"),
            transaction("A", "Member", "F", "Food", 30.0, 6.0, "10:00:00"),
        ];
        let s = aggregate(&rows).summary().cloned().unwrap();
        assert_eq!(s.total_sales, 30.0);
        assert_eq!(s.average_rating, 3.0);
        assert_eq!(s.average_transaction_value, 15.0);
        assert_eq!(s.sales_by_hour[&9], 0.0);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(7.25, 1), 7.2);
        assert_eq!(star_count(8.5), 8);
        assert_eq!(star_count(7.6), 8);
        assert_eq!(star_count(-1.0), 0);
        assert_eq!(star_count(f64::NAN), 0);
    }
}
