/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RawTable → SalesDataset (hour bucket, 0-filled numbers)
///   └──────────┘
///        │            cache: reload only when the path changes
///        ▼
///   ┌──────────────┐
///   │ SalesDataset │  Vec<Transaction>, distinct values per facet
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  city × customer type × gender → FilteredView (indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  totals, means, sales by hour / product line
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
