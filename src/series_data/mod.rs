//! The columnar store backing one chart series.
//!
//! Values live in per-dimension chunked columns addressed by raw position.
//! What callers see is the logical view: raw positions translated through an
//! [`IndexView`]. Filters and samplers only ever replace the view; raw
//! storage changes through ingestion and through the value-rewriting
//! transforms, which write into their own copy of the touched columns.

mod filter;
mod ingest;
mod query;
mod stats;
mod transform;
mod visual;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;

use crate::chunk::ChunkedColumn;
use crate::data_types::{
    DimensionInfo, Dimensions, Extent, GraphicElement, ItemLayout, ItemVisual, SharedProvider,
    StoreConfig,
};
use crate::error::StoreResult;
use crate::identity::IdentityTable;
use crate::index_view::IndexView;
use crate::inverted_index::InvertedIndex;

pub use transform::MapValue;

pub struct SeriesData {
    dims: Arc<Dimensions>,
    config: Arc<StoreConfig>,
    columns: Vec<ChunkedColumn>,
    raw_count: usize,
    view: IndexView,

    /// Extent over every raw value written, per dimension.
    raw_extents: Vec<Extent>,
    /// Extent over the visible rows, filled on first request after a view change.
    view_extents: Mutex<Vec<Option<Extent>>>,
    approximate_extents: Vec<Option<Extent>>,

    inverted: Arc<Vec<Option<InvertedIndex>>>,
    identity: Arc<IdentityTable>,
    provider: Option<SharedProvider>,
    /// False on clones and transform outputs: they read the provider but
    /// never push into it, so raw positions stay tied to this store's rows.
    owns_provider: bool,

    // Rendering-layer annotations, keyed by logical position.
    visual: HashMap<String, Value>,
    item_visuals: HashMap<usize, ItemVisual>,
    item_layouts: HashMap<usize, ItemLayout>,
    graphic_els: HashMap<usize, GraphicElement>,
}

impl SeriesData {
    pub fn new(dimensions: Vec<DimensionInfo>) -> StoreResult<Self> {
        Self::with_config(dimensions, StoreConfig::default())
    }

    pub fn with_config(dimensions: Vec<DimensionInfo>, config: StoreConfig) -> StoreResult<Self> {
        let config = config.normalized();
        let dims = Dimensions::new(dimensions, config.max_dimensions)?;
        let n = dims.len();
        let columns = dims.iter().map(|d| ChunkedColumn::new(d.kind)).collect();

        Ok(Self {
            dims: Arc::new(dims),
            config: Arc::new(config),
            columns,
            raw_count: 0,
            view: IndexView::Identity,
            raw_extents: vec![Extent::EMPTY; n],
            view_extents: Mutex::new(vec![None; n]),
            approximate_extents: vec![None; n],
            inverted: Arc::new(vec![None; n]),
            identity: Arc::new(IdentityTable::default()),
            provider: None,
            owns_provider: false,
            visual: HashMap::new(),
            item_visuals: HashMap::new(),
            item_layouts: HashMap::new(),
            graphic_els: HashMap::new(),
        })
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn dimension_info(&self, name: &str) -> Option<&DimensionInfo> {
        self.dims.get(name)
    }

    /// Name of the data dimension mapped onto coordinate dimension `coord_dim`.
    pub fn map_dimension(&self, coord_dim: &str) -> Option<&str> {
        self.dims.map_dimension(coord_dim)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of visible rows.
    pub fn count(&self) -> usize {
        self.view.count(self.raw_count)
    }

    /// Number of rows ever ingested.
    pub fn raw_count(&self) -> usize {
        self.raw_count
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// True when no index view is installed.
    pub fn is_unfiltered(&self) -> bool {
        self.view.is_identity()
    }

    /// True when the column of `dim` shares its chunks with the same column of `other`.
    pub fn shares_column_with(&self, other: &SeriesData, dim: &str) -> bool {
        match (self.dims.index_of(dim), other.dims.index_of(dim)) {
            (Some(a), Some(b)) => self.columns[a].shares_chunks_with(&other.columns[b]),
            _ => false,
        }
    }

    #[inline]
    fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    fn reset_view_extents(&mut self) {
        self.view_extents.get_mut().iter_mut().for_each(|e| *e = None);
    }

    fn resolve_dims(&self, dims: &[&str]) -> StoreResult<Vec<usize>> {
        dims.iter().map(|d| self.dims.require(d)).collect()
    }
}

impl fmt::Debug for SeriesData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesData")
            .field("dimensions", &self.dims.names())
            .field("raw_count", &self.raw_count)
            .field("count", &self.count())
            .field("filtered", &!self.view.is_identity())
            .field("chunk_size", &self.chunk_size())
            .finish()
    }
}
