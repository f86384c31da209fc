use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::aggregate::AggregateResult;
use crate::data::cache::DatasetCache;
use crate::data::error::FilterError;
use crate::data::filter::FilterSelection;
use crate::data::model::{Facet, SalesDataset};
use crate::data::pipeline;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. Each window owns its own
/// cache and selection.
pub struct AppState {
    pub config: DashboardConfig,

    cache: DatasetCache,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<SalesDataset>>,

    /// Per-facet filter selections.
    pub selection: FilterSelection,

    /// Indices of transactions passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Metrics over `visible_indices`.
    pub summary: AggregateResult,

    /// Last recovered filter failure, shown as a warning.
    pub filter_error: Option<FilterError>,

    /// Bar colours per product line.
    pub product_colors: Option<ColorMap>,

    /// Fatal load error shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
            selection: FilterSelection::default(),
            visible_indices: Vec::new(),
            summary: AggregateResult::NoData,
            filter_error: None,
            product_colors: None,
            status_message: None,
        }
    }

    /// Load (or reuse) the dataset at `path`. A load failure halts the
    /// dashboard: the previous dataset is dropped and only the error shows.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path, &self.config.source) {
            Ok(dataset) => {
                self.config.data_path = path.to_path_buf();
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.dataset = None;
                self.visible_indices.clear();
                self.summary = AggregateResult::NoData;
                self.filter_error = None;
                self.product_colors = None;
                self.status_message = Some(format!("Error reading {}: {e}", path.display()));
            }
        }
    }

    /// Ingest a newly loaded dataset, select everything and recompute.
    pub fn set_dataset(&mut self, dataset: Arc<SalesDataset>) {
        self.selection = FilterSelection::all(&dataset);

        let lines: BTreeSet<String> = dataset
            .rows
            .iter()
            .map(|r| r.product_line.clone())
            .collect();
        self.product_colors = Some(ColorMap::new(&lines));

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Re-run filter + aggregate after a selection change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let out = pipeline::run(ds, &self.selection);
        self.summary = out.summary;
        self.filter_error = out.filter_error;
        self.visible_indices = out.view.into_indices();
    }

    /// Toggle a single value in a facet's selection.
    pub fn toggle_filter_value(&mut self, facet: Facet, value: &str) {
        self.selection.toggle(facet, value);
        self.refilter();
    }

    pub fn select_all(&mut self, facet: Facet) {
        if let Some(ds) = &self.dataset {
            self.selection.select_all(facet, ds);
            self.refilter();
        }
    }

    /// Clear a facet; an empty facet selection shows every value.
    pub fn select_none(&mut self, facet: Facet) {
        self.selection.clear(facet);
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnMapping, SourceConfig};
    use std::io::Write;

    fn config() -> DashboardConfig {
        DashboardConfig {
            data_path: "unused.csv".into(),
            source: SourceConfig {
                sheet: String::new(),
                header_offset: 0,
                columns: ColumnMapping {
                    order_id: "id".into(),
                    city: "city".into(),
                    customer_type: "customer_type".into(),
                    gender: "gender".into(),
                    product_line: "product_line".into(),
                    total: "total".into(),
                    rating: "rating".into(),
                    time: "time".into(),
                },
            },
        }
    }

    fn csv_file() -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(f, "id,city,customer_type,gender,product_line,total,rating,time").unwrap();
        writeln!(f, "1,A,Member,F,Food,100,8,09:15:00").unwrap();
        writeln!(f, "2,B,Normal,M,Food,50,6,09:30:00").unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn open_selects_everything() {
        let f = csv_file();
        let mut state = AppState::new(config());
        state.open(f.path());

        assert!(state.status_message.is_none());
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.summary.summary().map(|s| s.total_sales), Some(150.0));
        assert_eq!(state.config.data_path, f.path());
    }

    #[test]
    fn deselecting_narrows_and_clearing_restores() {
        let f = csv_file();
        let mut state = AppState::new(config());
        state.open(f.path());

        state.toggle_filter_value(Facet::City, "B");
        assert_eq!(state.visible_indices, vec![0]);

        state.toggle_filter_value(Facet::City, "A");
        assert_eq!(state.visible_indices, vec![0, 1], "empty facet means all");

        state.select_none(Facet::Gender);
        state.toggle_filter_value(Facet::Gender, "M");
        assert_eq!(state.visible_indices, vec![1]);

        state.select_all(Facet::Gender);
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn load_failure_halts() {
        let f = csv_file();
        let mut state = AppState::new(config());
        state.open(f.path());
        state.open(Path::new("/missing/sales.csv"));

        assert!(state.dataset.is_none());
        assert!(state.visible_indices.is_empty());
        assert!(state.summary.is_no_data());
        assert!(state.status_message.is_some());
    }
}
