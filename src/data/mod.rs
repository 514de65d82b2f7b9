/// Data layer: core types, loading, normalization and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Vec<RawRow>
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  RawRow → JobRecord (region, salary, skills)
///   └───────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ repository  │  drop invalid, attach categorize labels,
///   └────────────┘  cache region stats + national median
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterState → record subset
///   └──────────┘
/// ```

pub mod categorize;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod regions;
pub mod repository;
