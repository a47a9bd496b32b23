/// Data layer: core types, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  data/all.{parquet,csv,json}   data/mean_by_year.{parquet,csv,json}
///        │                              │
///        ▼                              ▼
///   ┌──────────┐
///   │  loader   │  parse file → RaceTable / YearlyMeansTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ DataStore  │  OnceCell per table, MemoCache per year
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year equality filter, distinct years
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod store;

pub use error::DataError;
pub use store::DataStore;
