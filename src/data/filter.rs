use std::collections::{BTreeMap, BTreeSet};

use super::error::FilterError;
use super::model::{Facet, SalesDataset, Transaction};

// ---------------------------------------------------------------------------
// Filter selection: which values are selected per facet
// ---------------------------------------------------------------------------

/// Per-facet selection state. An empty (or absent) set is the "select all"
/// sentinel for that facet, not "select nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selected: BTreeMap<Facet, BTreeSet<String>>,
}

impl FilterSelection {
    /// Selection from explicit city, customer-type and gender sets.
    pub fn new(
        cities: BTreeSet<String>,
        customer_types: BTreeSet<String>,
        genders: BTreeSet<String>,
    ) -> Self {
        Self {
            selected: BTreeMap::from([
                (Facet::City, cities),
                (Facet::CustomerType, customer_types),
                (Facet::Gender, genders),
            ]),
        }
    }

    /// Every distinct value of every facet selected.
    pub fn all(dataset: &SalesDataset) -> Self {
        Self {
            selected: Facet::ALL
                .iter()
                .map(|f| (*f, dataset.distinct_values(*f).clone()))
                .collect(),
        }
    }

    pub fn values(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.selected.get(&facet)
    }

    pub fn is_selected(&self, facet: Facet, value: &str) -> bool {
        self.selected
            .get(&facet)
            .is_some_and(|set| set.contains(value))
    }

    /// Add or remove a single value.
    pub fn toggle(&mut self, facet: Facet, value: &str) {
        let set = self.selected.entry(facet).or_default();
        if !set.remove(value) {
            set.insert(value.to_string());
        }
    }

    pub fn set(&mut self, facet: Facet, values: BTreeSet<String>) {
        self.selected.insert(facet, values);
    }

    /// Select every distinct value of one facet.
    pub fn select_all(&mut self, facet: Facet, dataset: &SalesDataset) {
        self.set(facet, dataset.distinct_values(facet).clone());
    }

    /// Deselect everything in one facet, which resolves to "all".
    pub fn clear(&mut self, facet: Facet) {
        self.selected.insert(facet, BTreeSet::new());
    }

    /// Expand the empty sentinel of each facet to the facet's full distinct
    /// set and check that every selected value exists in the dataset.
    pub fn resolve<'a>(
        &'a self,
        dataset: &'a SalesDataset,
    ) -> Result<BTreeMap<Facet, &'a BTreeSet<String>>, FilterError> {
        let mut resolved = BTreeMap::new();
        for facet in Facet::ALL {
            let all = dataset.distinct_values(facet);
            let chosen = match self.selected.get(&facet) {
                Some(set) if !set.is_empty() => {
                    if let Some(unknown) = set.iter().find(|v| !all.contains(*v)) {
                        return Err(FilterError::UnknownValue {
                            facet,
                            value: unknown.clone(),
                        });
                    }
                    set
                }
                _ => all,
            };
            resolved.insert(facet, chosen);
        }
        Ok(resolved)
    }
}

// ---------------------------------------------------------------------------
// FilteredView – non-destructive subset of a dataset
// ---------------------------------------------------------------------------

/// Rows of a dataset that passed the filter, in source order. The dataset
/// itself is only borrowed.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a SalesDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view that selects nothing.
    pub fn empty(dataset: &'a SalesDataset) -> Self {
        Self {
            dataset,
            indices: Vec::new(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.rows[i])
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Detach the index list from the borrow, e.g. to keep it in UI state.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }
}

/// Return the rows whose city, customer type and gender are all in the
/// resolved selection (AND across facets, OR within one).
pub fn filter_rows<'a>(
    dataset: &'a SalesDataset,
    selection: &FilterSelection,
) -> Result<FilteredView<'a>, FilterError> {
    let resolved = selection.resolve(dataset)?;

    let indices = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            resolved
                .iter()
                .all(|(facet, allowed)| allowed.contains(row.facet(*facet)))
        })
        .map(|(i, _)| i)
        .collect();

    Ok(FilteredView { dataset, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::transaction;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn sample() -> SalesDataset {
        SalesDataset::from_rows(vec![
            transaction("A", "Member", "F", "Food", 100.0, 8.0, "09:15:00"),
            transaction("B", "Normal", "M", "Food", 50.0, 6.0, "09:30:00"),
            transaction("C", "Member", "M", "Home", 20.0, 5.0, "14:00:00"),
            transaction("A", "Normal", "M", "Sports", 70.0, 7.0, "19:45:00"),
        ])
    }

    #[test]
    fn empty_sets_select_everything() {
        let ds = sample();
        let view = filter_rows(&ds, &FilterSelection::default()).unwrap();
        assert_eq!(view.indices(), &[0, 1, 2, 3]);

        let view = filter_rows(&ds, &FilterSelection::new(set(&[]), set(&[]), set(&[]))).unwrap();
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn facets_combine_with_and_values_with_or() {
        let ds = sample();
        let sel = FilterSelection::new(set(&["A", "C"]), set(&[]), set(&["M"]));
        let view = filter_rows(&ds, &sel).unwrap();
        assert_eq!(view.indices(), &[2, 3]);
        for row in view.rows() {
            assert!(["A", "C"].contains(&row.city.as_str()));
            assert_eq!(row.gender, "M");
        }
    }

    #[test]
    fn filtering_twice_is_stable_and_non_destructive() {
        let ds = sample();
        let before = ds.rows.clone();
        let sel = FilterSelection::new(set(&["A"]), set(&["Normal"]), set(&[]));

        let first = filter_rows(&ds, &sel).unwrap().into_indices();
        let second = filter_rows(&ds, &sel).unwrap().into_indices();
        assert_eq!(first, vec![3]);
        assert_eq!(first, second);
        assert_eq!(ds.rows, before);
    }

    #[test]
    fn no_match_is_an_empty_view() {
        let ds = sample();
        let sel = FilterSelection::new(set(&["B"]), set(&["Member"]), set(&[]));
        assert!(filter_rows(&ds, &sel).unwrap().is_empty());
    }

    #[test]
    fn unknown_value_is_a_filter_error() {
        let ds = sample();
        let sel = FilterSelection::new(set(&["Atlantis"]), set(&[]), set(&[]));
        let err = filter_rows(&ds, &sel).unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownValue {
                facet: Facet::City,
                value: "Atlantis".into()
            }
        );
    }

    #[test]
    fn toggle_select_all_and_clear() {
        let ds = sample();
        let mut sel = FilterSelection::all(&ds);
        assert!(sel.is_selected(Facet::City, "B"));

        sel.toggle(Facet::City, "B");
        assert!(!sel.is_selected(Facet::City, "B"));
        assert_eq!(filter_rows(&ds, &sel).unwrap().len(), 3);

        sel.clear(Facet::City);
        assert_eq!(filter_rows(&ds, &sel).unwrap().len(), 4);

        sel.toggle(Facet::City, "B");
        assert_eq!(filter_rows(&ds, &sel).unwrap().indices(), &[1]);

        sel.select_all(Facet::City, &ds);
        assert_eq!(sel.values(Facet::City).map(BTreeSet::len), Some(3));
    }
}
