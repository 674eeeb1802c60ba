//! Chunked numeric columns.
//!
//! A column is an ordered list of chunks; chunk `i` holds raw positions
//! `[i * chunk_size, (i + 1) * chunk_size)`. The chunk list sits behind an
//! `Arc` and every write goes through `Arc::make_mut`, so a column that is
//! shared with a clone is copied before it is written.

use std::sync::Arc;

use crate::data_types::{DimensionKind, Extent, MISSING};
use crate::simd::extent_f64;

#[derive(Clone, Debug, PartialEq)]
pub enum Chunk {
    /// Fixed-width `f64` buffer, allocated at full capacity.
    Float(Vec<f64>),
    /// Fixed-width `i32` buffer, allocated at full capacity. NaN is stored as 0.
    Int(Vec<i32>),
    /// Growable buffer for ordinal, time and generic number dimensions.
    Generic(Vec<f64>),
}

impl Chunk {
    fn empty(kind: DimensionKind) -> Self {
        match kind {
            DimensionKind::Float => Chunk::Float(Vec::new()),
            DimensionKind::Int => Chunk::Int(Vec::new()),
            DimensionKind::Ordinal | DimensionKind::Number | DimensionKind::Time => {
                Chunk::Generic(Vec::new())
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Chunk::Float(v) | Chunk::Generic(v) => v.len(),
            Chunk::Int(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fixed(&self) -> bool {
        !matches!(self, Chunk::Generic(_))
    }

    fn resize(&mut self, len: usize) {
        match self {
            Chunk::Float(v) => v.resize(len, 0.0),
            Chunk::Int(v) => v.resize(len, 0),
            Chunk::Generic(v) => v.resize(len, MISSING),
        }
    }

    #[inline]
    pub fn get(&self, offset: usize) -> Option<f64> {
        match self {
            Chunk::Float(v) | Chunk::Generic(v) => v.get(offset).copied(),
            Chunk::Int(v) => v.get(offset).map(|x| *x as f64),
        }
    }

    #[inline]
    pub fn set(&mut self, offset: usize, value: f64) {
        match self {
            Chunk::Float(v) | Chunk::Generic(v) => v[offset] = value,
            // `as` saturates and maps NaN to 0.
            Chunk::Int(v) => v[offset] = value as i32,
        }
    }

    /// Iterates the first `len` values as `f64`.
    pub fn values(&self, len: usize) -> ChunkValues<'_> {
        match self {
            Chunk::Float(v) | Chunk::Generic(v) => ChunkValues::Float(v[..len.min(v.len())].iter()),
            Chunk::Int(v) => ChunkValues::Int(v[..len.min(v.len())].iter()),
        }
    }

    /// Float view of the buffer, when it is already stored as `f64`.
    pub fn as_f64_slice(&self) -> Option<&[f64]> {
        match self {
            Chunk::Float(v) | Chunk::Generic(v) => Some(v),
            Chunk::Int(_) => None,
        }
    }
}

pub enum ChunkValues<'a> {
    Float(std::slice::Iter<'a, f64>),
    Int(std::slice::Iter<'a, i32>),
}

impl Iterator for ChunkValues<'_> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        match self {
            ChunkValues::Float(it) => it.next().copied(),
            ChunkValues::Int(it) => it.next().map(|x| *x as f64),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            ChunkValues::Float(it) => it.size_hint(),
            ChunkValues::Int(it) => it.size_hint(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChunkedColumn {
    kind: DimensionKind,
    chunks: Arc<Vec<Chunk>>,
}

impl ChunkedColumn {
    pub fn new(kind: DimensionKind) -> Self {
        Self {
            kind,
            chunks: Arc::new(Vec::new()),
        }
    }

    pub fn kind(&self) -> DimensionKind {
        self.kind
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Total number of allocated slots over all chunks.
    pub fn capacity(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }

    /// True when both columns point at the same chunk list.
    pub fn shares_chunks_with(&self, other: &ChunkedColumn) -> bool {
        Arc::ptr_eq(&self.chunks, &other.chunks)
    }

    /// Gives this column its own copy of the chunk list.
    pub fn detach(&mut self) {
        self.chunks = Arc::new(self.chunks.as_ref().clone());
    }

    /// Grows the chunk list so that raw positions `0..to_raw` are addressable.
    pub fn ensure_capacity(&mut self, to_raw: usize, chunk_size: usize) {
        if self.capacity() >= to_raw {
            return;
        }
        let kind = self.kind;
        let chunks = Arc::make_mut(&mut self.chunks);
        let needed_chunks = to_raw.div_ceil(chunk_size);

        for i in 0..needed_chunks {
            if i == chunks.len() {
                tracing::trace!(chunk = i, ?kind, "allocating chunk");
                chunks.push(Chunk::empty(kind));
            }
            let chunk = &mut chunks[i];
            let wanted = if chunk.is_fixed() {
                chunk_size
            } else {
                (to_raw - i * chunk_size).min(chunk_size)
            };
            if chunk.len() < wanted {
                chunk.resize(wanted);
            }
        }
    }

    /// The value a write of `value` actually stores, i.e. truncated for int columns.
    #[inline]
    pub fn storable(&self, value: f64) -> f64 {
        match self.kind {
            DimensionKind::Int => value as i32 as f64,
            _ => value,
        }
    }

    #[inline]
    pub fn get(&self, raw: usize, chunk_size: usize) -> f64 {
        self.chunks
            .get(raw / chunk_size)
            .and_then(|c| c.get(raw % chunk_size))
            .unwrap_or(MISSING)
    }

    /// Writes one value. The position must be within [`capacity`](Self::capacity).
    #[inline]
    pub fn set(&mut self, raw: usize, value: f64, chunk_size: usize) {
        Arc::make_mut(&mut self.chunks)[raw / chunk_size].set(raw % chunk_size, value);
    }

    /// Extent over raw positions `0..raw_count`, NaN skipped.
    pub fn extent(&self, raw_count: usize, chunk_size: usize) -> Extent {
        let mut extent = Extent::EMPTY;
        for (i, chunk) in self.chunks.iter().enumerate() {
            let start = i * chunk_size;
            if start >= raw_count {
                break;
            }
            let len = (raw_count - start).min(chunk_size);
            match chunk.as_f64_slice() {
                Some(values) => extent.merge(extent_f64(&values[..len])),
                None => chunk.values(len).for_each(|v| extent.fold(v)),
            }
        }
        extent
    }

    /// Iterates values at raw positions `0..raw_count`, chunk by chunk.
    pub fn iter_raw(&self, raw_count: usize, chunk_size: usize) -> impl Iterator<Item = f64> + '_ {
        self.chunks.iter().enumerate().flat_map(move |(i, chunk)| {
            let start = i * chunk_size;
            let len = raw_count.saturating_sub(start).min(chunk_size);
            chunk.values(len)
        })
    }
}
