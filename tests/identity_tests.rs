use series_data::data_types::OrdinalMeta;
use series_data::{
    DimensionInfo, DimensionKind, DimensionRole, Extent, RawValue, SeriesData, StoreError,
};

fn cities() -> SeriesData {
    let mut data = SeriesData::new(vec![
        DimensionInfo::ordinal("city")
            .with_role(DimensionRole::IsName)
            .with_inverted_index(true),
        DimensionInfo::number("pop"),
    ])
    .unwrap();
    data.append_values(
        vec![
            vec!["Oslo".into(), 0.7.into()],
            vec!["Rome".into(), 2.8.into()],
            vec!["Lima".into(), 9.7.into()],
        ],
        None,
    )
    .unwrap();
    data
}

#[test]
fn test_inverted_index_lookup() {
    let data = cities();
    assert_eq!(data.raw_index_of("city", 0.0).unwrap(), Some(0));
    assert_eq!(data.raw_index_of("city", 2.0).unwrap(), Some(2));
    assert_eq!(data.raw_index_of("city", 3.0).unwrap(), None);
    assert_eq!(data.raw_index_of_category("city", "Rome").unwrap(), Some(1));
    assert_eq!(data.raw_index_of_category("city", "Paris").unwrap(), None);
}

#[test]
fn test_inverted_index_on_plain_dimension_is_an_error() {
    let data = cities();
    assert_eq!(
        data.raw_index_of("pop", 1.0),
        Err(StoreError::NotIndexed("pop".into()))
    );
    assert!(matches!(
        data.raw_index_of_category("pop", "x"),
        Err(StoreError::NotIndexed(_))
    ));
    assert!(matches!(
        data.raw_index_of("missing", 1.0),
        Err(StoreError::UnknownDimension(_))
    ));
}

#[test]
fn test_inverted_index_rebuilt_on_append() {
    let mut data = cities();
    data.append_values(vec![vec!["Kyiv".into(), 2.9.into()]], None)
        .unwrap();
    assert_eq!(data.raw_index_of_category("city", "Kyiv").unwrap(), Some(3));
}

#[test]
fn test_identity_keyed_by_raw_position() {
    let mut data = cities();
    data.select_range(&[("pop", Extent::new(2.0, 10.0))]).unwrap();
    assert_eq!(data.count(), 2);
    assert_eq!(data.get_name(0), Some("Rome"));
    assert_eq!(data.get_id(1).as_deref(), Some("Lima"));
    assert_eq!(data.index_of_name("Lima"), Some(1));
    assert_eq!(data.index_of_name("Oslo"), None);
    assert_eq!(data.get_id(5), None);
}

#[test]
fn test_id_dimension() {
    let mut data = SeriesData::new(vec![
        DimensionInfo::new("key", DimensionKind::Int).with_role(DimensionRole::IsId),
        DimensionInfo::number("v"),
    ])
    .unwrap();
    data.append_values(
        vec![
            vec![RawValue::from(7.0), RawValue::from(1.0)],
            vec![RawValue::from("8"), RawValue::from(2.0)],
        ],
        Some(vec!["seven".into()]),
    )
    .unwrap();
    assert_eq!(data.get_id(0).as_deref(), Some("7"));
    assert_eq!(data.get_id(1).as_deref(), Some("8"));
    assert_eq!(data.get_name(0), Some("seven"));
    assert_eq!(data.get_name(1), None);
}

#[test]
fn test_shared_ordinal_meta_with_fixed_categories() {
    let meta = OrdinalMeta::from_categories(["low", "high"]);
    let mut data = SeriesData::new(vec![DimensionInfo::ordinal("level").with_ordinal_meta(meta)])
        .unwrap();
    data.append_values(
        vec![vec!["high".into()], vec!["unknown".into()], vec![0.0.into()]],
        None,
    )
    .unwrap();
    assert_eq!(data.get("level", 0), 1.0);
    assert!(data.get("level", 1).is_nan());
    assert_eq!(data.get("level", 2), 0.0);
}

#[test]
fn test_construction_rejects_bad_dimensions() {
    assert!(matches!(
        SeriesData::new(vec![
            DimensionInfo::number("a").with_role(DimensionRole::IsName),
            DimensionInfo::number("b").with_role(DimensionRole::IsName),
        ]),
        Err(StoreError::DuplicateRole("is-name"))
    ));
    assert!(matches!(
        SeriesData::new(vec![DimensionInfo::number("a").with_inverted_index(true)]),
        Err(StoreError::InvertedIndexOnNonOrdinal(_))
    ));
}
