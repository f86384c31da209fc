use super::aggregate::{AggregateResult, aggregate};
use super::error::FilterError;
use super::filter::{FilterSelection, FilteredView, filter_rows};
use super::model::SalesDataset;

/// Result of one filter + aggregate pass.
#[derive(Debug, Clone)]
pub struct PipelineOutput<'a> {
    pub view: FilteredView<'a>,
    pub summary: AggregateResult,
    /// Set when the filter failed and an empty view was substituted.
    pub filter_error: Option<FilterError>,
}

/// Filter then aggregate. A filter failure degrades to an empty selection
/// (and therefore `NoData`) instead of aborting.
pub fn run<'a>(dataset: &'a SalesDataset, selection: &FilterSelection) -> PipelineOutput<'a> {
    let (view, filter_error) = match filter_rows(dataset, selection) {
        Ok(view) => (view, None),
        Err(e) => {
            log::warn!("Filter failed, showing no rows: {e}");
            (FilteredView::empty(dataset), Some(e))
        }
    };

    let summary = aggregate(view.rows());
    log::debug!(
        "Pipeline: {} of {} rows selected",
        view.len(),
        dataset.len()
    );

    PipelineOutput {
        view,
        summary,
        filter_error,
    }
}
