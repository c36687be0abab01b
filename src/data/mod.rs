/// Data layer: core types, loading, filtering and chart data.
///
/// Architecture:
/// ```text
///  seaborn URL / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse once → Arc<Dataset>
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Passenger>, column kinds
///   └──────────┘
///        │
///        ├──────────────┬─────────────────┐
///        ▼              ▼                 ▼
///   ┌──────────┐  ┌────────────┐  ┌────────────┐
///   │  filter   │  │  analysis   │  │  summary    │
///   └──────────┘  └────────────┘  └────────────┘
///   selection →      ten chart       describe()
///   row indices      datasets        statistics
/// ```

pub mod analysis;
pub mod bucket;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
