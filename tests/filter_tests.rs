use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use series_data::{DimensionInfo, Extent, RowArraysSource, SeriesData, StoreConfig, StoreError};
use std::time::Instant;

fn xy_store(rows: &[Vec<f64>]) -> SeriesData {
    let mut data =
        SeriesData::new(vec![DimensionInfo::number("x"), DimensionInfo::number("y")]).unwrap();
    data.init_data(RowArraysSource::from_numbers(rows), None)
        .unwrap();
    data
}

#[test]
fn test_select_range_keeps_missing_values() {
    let mut data = xy_store(&[vec![1.0, 10.0], vec![2.0, f64::NAN], vec![3.0, 30.0]]);
    assert_eq!(data.data_extent("x").as_array(), [1.0, 3.0]);

    data.select_range(&[("y", Extent::new(5.0, 15.0))]).unwrap();
    assert_eq!(data.count(), 2);
    assert_eq!(data.indices(), vec![0, 1]);
    assert_eq!(data.get("x", 1), 2.0);
    assert_eq!(data.data_extent("x").as_array(), [1.0, 2.0]);
    // Raw extent is not narrowed by the view.
    assert_eq!(data.raw_extent("x").as_array(), [1.0, 3.0]);
}

#[test]
fn test_filter_is_order_preserving_subsequence() {
    let rows: Vec<Vec<f64>> = (0..100).map(|i| vec![i as f64, (i % 7) as f64]).collect();
    let mut data = xy_store(&rows);
    data.filter_self(&["y"], |v, _| v[0] == 3.0).unwrap();

    let expected: Vec<usize> = (0..100).filter(|i| i % 7 == 3).collect();
    assert_eq!(data.count(), expected.len());
    for (idx, raw) in expected.iter().enumerate() {
        assert_eq!(data.raw_index(idx), Some(*raw));
        assert_eq!(data.get("x", idx), *raw as f64);
        assert_eq!(data.index_of_raw_index(*raw), Some(idx));
    }
    assert_eq!(data.index_of_raw_index(4), None);
}

#[test]
fn test_filter_keeping_everything_stays_unfiltered() {
    let mut data = xy_store(&[vec![1.0, 1.0], vec![2.0, 2.0]]);
    data.filter_self(&["x"], |_, _| true).unwrap();
    assert!(data.is_unfiltered());

    data.filter_self(&["x"], |v, _| v[0] > 1.0).unwrap();
    assert!(!data.is_unfiltered());
    data.filter_self(&["x"], |_, _| true).unwrap();
    assert_eq!(data.indices(), vec![1]);
}

#[test]
fn test_nested_filters_use_generic_path() {
    let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (20 - i) as f64]).collect();
    let mut data = xy_store(&rows);
    data.select_range(&[("x", Extent::new(5.0, 15.0))]).unwrap();
    data.select_range(&[("y", Extent::new(8.0, 12.0))]).unwrap();
    assert_eq!(data.indices(), vec![8, 9, 10, 11, 12]);
    assert_eq!(data.data_extent("y").as_array(), [8.0, 12.0]);
}

#[test]
fn test_unknown_dimension_is_rejected() {
    let mut data = xy_store(&[vec![1.0, 1.0]]);
    let err = data
        .select_range(&[("z", Extent::new(0.0, 1.0))])
        .unwrap_err();
    assert_eq!(err, StoreError::UnknownDimension("z".into()));
    assert!(data.filter_self(&["x", "w"], |_, _| true).is_err());
    assert_eq!(data.count(), 1);
}

#[test]
fn test_each_and_map_array_follow_view() {
    let mut data = xy_store(&[vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    data.select_range(&[("x", Extent::new(2.0, 3.0))]).unwrap();

    let sums = data.map_array(&["x", "y"], |v, _| v[0] + v[1]).unwrap();
    assert_eq!(sums, vec![7.0, 9.0]);

    let mut seen = Vec::new();
    data.each(&["y"], |v, idx| seen.push((idx, v[0]))).unwrap();
    assert_eq!(seen, vec![(0, 5.0), (1, 6.0)]);
}

#[test]
fn test_select_range_fast_path_matches_generic_on_1m_rows() {
    let n = 1_000_000;
    let mut rng = StdRng::seed_from_u64(42);
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|_| {
            let x = if rng.random_bool(0.01) {
                f64::NAN
            } else {
                rng.random_range(0.0..1000.0)
            };
            vec![x, rng.random_range(-50.0..50.0)]
        })
        .collect();

    let config = StoreConfig::default().with_chunk_size(65_536);
    let mut data =
        SeriesData::with_config(vec![DimensionInfo::number("x"), DimensionInfo::number("y")], config)
            .unwrap();
    data.init_data(RowArraysSource::from_numbers(&rows), None)
        .unwrap();

    let range = Extent::new(250.0, 500.0);

    let mut fast = data.clone_shallow();
    let start = Instant::now();
    fast.select_range(&[("x", range)]).unwrap();
    println!("select_range fast path over {} rows: {:?}", n, start.elapsed());

    let mut generic = data.clone_shallow();
    let start = Instant::now();
    generic
        .filter_self(&["x"], |v, _| v[0].is_nan() || (v[0] >= range.min && v[0] <= range.max))
        .unwrap();
    println!("filter_self over {} rows: {:?}", n, start.elapsed());

    assert_eq!(fast.indices(), generic.indices());
    for (raw, row) in rows.iter().enumerate() {
        if row[0].is_nan() {
            assert!(fast.index_of_raw_index(raw).is_some(), "NaN row {raw} dropped");
        }
    }

    // Two-dimension fast path against the same predicate.
    let mut fast2 = data.clone_shallow();
    fast2
        .select_range(&[("x", range), ("y", Extent::new(0.0, 10.0))])
        .unwrap();
    let mut generic2 = data.clone_shallow();
    generic2
        .filter_self(&["x", "y"], |v, _| {
            (v[0].is_nan() || (v[0] >= 250.0 && v[0] <= 500.0)) && (v[1] >= 0.0 && v[1] <= 10.0)
        })
        .unwrap();
    assert_eq!(fast2.indices(), generic2.indices());
}
