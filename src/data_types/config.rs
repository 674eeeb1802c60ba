use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Capacity of one chunk, in rows.
    pub chunk_size: usize,
    /// Upper bound on the number of dimensions a store accepts.
    pub max_dimensions: Option<usize>,
    /// chrono formats tried after the built-in ones when parsing time cells.
    pub time_parse_formats: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_dimensions: None,
            time_parse_formats: Vec::new(),
        }
    }
}

impl StoreConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).wrap_err("failed to parse store configuration")?;
        Ok(config.normalized())
    }

    pub(crate) fn normalized(mut self) -> Self {
        self.chunk_size = self.chunk_size.max(1);
        self
    }
}
