use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::ordinal::OrdinalMeta;
use super::value::{parse_number, parse_time, RawValue, MISSING};
use crate::error::{violation, StoreError, StoreResult};

pub type SharedOrdinalMeta = Arc<RwLock<OrdinalMeta>>;

/// Storage kind of a dimension. Decides both the coercion applied at
/// ingestion and the buffer type of its chunks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKind {
    Float,
    Int,
    Ordinal,
    #[default]
    Number,
    Time,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DimensionRole {
    #[default]
    Value,
    /// Values of this dimension name the row.
    IsName,
    /// Values of this dimension identify the row.
    IsId,
}

#[derive(Clone, Debug)]
pub struct DimensionInfo {
    pub name: String,
    pub kind: DimensionKind,
    pub role: DimensionRole,
    pub coord_dim: Option<String>,
    pub ordinal_meta: Option<SharedOrdinalMeta>,
    pub create_inverted_index: bool,
}

impl DimensionInfo {
    pub fn new(name: impl Into<String>, kind: DimensionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            role: DimensionRole::Value,
            coord_dim: None,
            ordinal_meta: None,
            create_inverted_index: false,
        }
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, DimensionKind::Number)
    }

    pub fn ordinal(name: impl Into<String>) -> Self {
        Self::new(name, DimensionKind::Ordinal)
    }

    pub fn with_role(mut self, role: DimensionRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_coord_dim(mut self, coord_dim: impl Into<String>) -> Self {
        self.coord_dim = Some(coord_dim.into());
        self
    }

    pub fn with_ordinal_meta(mut self, meta: OrdinalMeta) -> Self {
        self.ordinal_meta = Some(Arc::new(RwLock::new(meta)));
        self
    }

    /// Shares an existing category table, e.g. one owned by an axis.
    pub fn with_shared_ordinal_meta(mut self, meta: SharedOrdinalMeta) -> Self {
        self.ordinal_meta = Some(meta);
        self
    }

    pub fn with_inverted_index(mut self, enabled: bool) -> Self {
        self.create_inverted_index = enabled;
        self
    }

    pub fn is_ordinal(&self) -> bool {
        self.kind == DimensionKind::Ordinal
    }

    /// Coerces a provider cell into the value stored for this dimension.
    ///
    /// Ordinal strings are interned through the category table, time cells
    /// become UTC milliseconds, anything else goes through numeric parsing.
    /// Int dimensions are truncated toward zero, with NaN stored as 0.
    pub fn parse_value(&self, cell: &RawValue, time_formats: &[String]) -> f64 {
        match self.kind {
            DimensionKind::Ordinal => match cell {
                RawValue::Str(s) if s.is_empty() => MISSING,
                RawValue::Str(s) => self
                    .ordinal_meta
                    .as_ref()
                    .map(|m| m.write().parse_and_collect(s))
                    .unwrap_or(MISSING),
                other => parse_number(other),
            },
            DimensionKind::Time => parse_time(cell, time_formats),
            DimensionKind::Float | DimensionKind::Number => parse_number(cell),
            DimensionKind::Int => parse_number(cell) as i32 as f64,
        }
    }

    /// Decodes a stored value into its category label.
    pub fn category_label(&self, value: f64) -> Option<String> {
        let meta = self.ordinal_meta.as_ref()?;
        meta.read().category(value).map(str::to_string)
    }
}

/// Immutable, validated list of dimensions.
#[derive(Clone, Debug)]
pub struct Dimensions {
    infos: Vec<DimensionInfo>,
    by_name: HashMap<String, usize>,
    name_dim: Option<usize>,
    id_dim: Option<usize>,
}

impl Dimensions {
    pub fn new(mut infos: Vec<DimensionInfo>, max_dimensions: Option<usize>) -> StoreResult<Self> {
        if let Some(limit) = max_dimensions {
            if infos.len() > limit {
                return Err(violation(StoreError::TooManyDimensions {
                    count: infos.len(),
                    limit,
                }));
            }
        }

        let mut by_name = HashMap::with_capacity(infos.len());
        let mut name_dim = None;
        let mut id_dim = None;

        for (i, info) in infos.iter_mut().enumerate() {
            if by_name.insert(info.name.clone(), i).is_some() {
                return Err(violation(StoreError::DuplicateDimension(info.name.clone())));
            }
            if info.create_inverted_index && !info.is_ordinal() {
                return Err(violation(StoreError::InvertedIndexOnNonOrdinal(
                    info.name.clone(),
                )));
            }
            if info.is_ordinal() && info.ordinal_meta.is_none() {
                info.ordinal_meta = Some(Arc::new(RwLock::new(OrdinalMeta::collecting())));
            }
            match info.role {
                DimensionRole::IsName if name_dim.replace(i).is_some() => {
                    return Err(violation(StoreError::DuplicateRole("is-name")));
                }
                DimensionRole::IsId if id_dim.replace(i).is_some() => {
                    return Err(violation(StoreError::DuplicateRole("is-id")));
                }
                _ => {}
            }
        }

        Ok(Self {
            infos,
            by_name,
            name_dim,
            id_dim,
        })
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Same as [`index_of`](Self::index_of) but a miss is a contract violation.
    pub fn require(&self, name: &str) -> StoreResult<usize> {
        self.index_of(name)
            .ok_or_else(|| violation(StoreError::UnknownDimension(name.to_string())))
    }

    pub fn get(&self, name: &str) -> Option<&DimensionInfo> {
        self.index_of(name).map(|i| &self.infos[i])
    }

    pub fn at(&self, index: usize) -> &DimensionInfo {
        &self.infos[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionInfo> {
        self.infos.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.infos.iter().map(|d| d.name.as_str()).collect()
    }

    /// First dimension mapped onto the coordinate dimension `coord_dim`.
    pub fn map_dimension(&self, coord_dim: &str) -> Option<&str> {
        self.infos
            .iter()
            .find(|d| d.coord_dim.as_deref() == Some(coord_dim))
            .map(|d| d.name.as_str())
    }

    pub fn name_dimension(&self) -> Option<usize> {
        self.name_dim
    }

    pub fn id_dimension(&self) -> Option<usize> {
        self.id_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_duplicates() {
        let err = Dimensions::new(
            vec![DimensionInfo::number("x"), DimensionInfo::number("x")],
            None,
        )
        .unwrap_err();
        assert_eq!(err, StoreError::DuplicateDimension("x".into()));
    }

    #[test]
    fn test_inverted_index_requires_ordinal() {
        let err = Dimensions::new(
            vec![DimensionInfo::number("x").with_inverted_index(true)],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::InvertedIndexOnNonOrdinal(_)));
    }

    #[test]
    fn test_parse_value_by_kind() {
        let ordinal = DimensionInfo::ordinal("c").with_ordinal_meta(OrdinalMeta::collecting());
        assert_eq!(ordinal.parse_value(&RawValue::from("a"), &[]), 0.0);
        assert_eq!(ordinal.parse_value(&RawValue::from("b"), &[]), 1.0);
        assert_eq!(ordinal.parse_value(&RawValue::from("a"), &[]), 0.0);
        assert_eq!(ordinal.category_label(1.0).as_deref(), Some("b"));

        let int = DimensionInfo::new("i", DimensionKind::Int);
        assert_eq!(int.parse_value(&RawValue::from(-2.7), &[]), -2.0);
        assert_eq!(int.parse_value(&RawValue::from("-"), &[]), 0.0);

        let number = DimensionInfo::number("n");
        assert!(number.parse_value(&RawValue::from("-"), &[]).is_nan());

        let time = DimensionInfo::new("t", DimensionKind::Time);
        assert_eq!(time.parse_value(&RawValue::from("1970-01-02"), &[]), 86_400_000.0);
    }

    #[test]
    fn test_roles_and_coord_mapping() {
        let dims = Dimensions::new(
            vec![
                DimensionInfo::ordinal("city").with_role(DimensionRole::IsName),
                DimensionInfo::number("v").with_coord_dim("y"),
            ],
            Some(4),
        )
        .unwrap();
        assert_eq!(dims.name_dimension(), Some(0));
        assert_eq!(dims.id_dimension(), None);
        assert_eq!(dims.map_dimension("y"), Some("v"));
        assert!(dims.at(0).ordinal_meta.is_some());
    }
}
