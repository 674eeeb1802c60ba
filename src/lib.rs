//! series_data: columnar, chunked dataset container backing chart series

pub mod chunk;
pub mod data_types;
pub mod decimation;
pub mod differ;
pub mod error;
pub mod identity;
pub mod index_view;
pub mod inverted_index;
#[cfg(feature = "polars")]
pub mod polars_source;
pub mod series_data;
pub mod simd;
pub mod sources;

pub use data_types::{
    DimensionInfo, DimensionKind, DimensionRole, Extent, OrdinalMeta, RawItem, RawValue,
    SourceShape, StoreConfig, MISSING,
};
pub use decimation::Sampler;
pub use differ::{DataDiffer, DiffResult};
pub use error::{StoreError, StoreResult};
pub use series_data::{MapValue, SeriesData};
pub use sources::{KeyedColumnsSource, ObjectsSource, RowArraysSource, TypedArraySource};
