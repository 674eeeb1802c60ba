use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use series_data::{
    DimensionInfo, DimensionKind, Extent, Sampler, SeriesData, TypedArraySource,
};
use std::time::Instant;

fn random_store(n: usize) -> SeriesData {
    let mut rng = StdRng::seed_from_u64(7);
    let mut values = Vec::with_capacity(n * 2);
    for i in 0..n {
        values.push(i as f64);
        values.push(rng.random_range(-100.0..100.0));
    }
    let mut data = SeriesData::new(vec![
        DimensionInfo::new("x", DimensionKind::Float),
        DimensionInfo::new("y", DimensionKind::Float),
    ])
    .unwrap();
    data.init_data(TypedArraySource::new(values, 2), None)
        .unwrap();
    data
}

#[test]
fn test_ingest_and_extent_performance() {
    let n = 1_000_000;

    let start = Instant::now();
    let data = random_store(n);
    println!("Ingestion of {} rows: {:?}", n, start.elapsed());
    assert_eq!(data.count(), n);

    let start = Instant::now();
    for _ in 0..1000 {
        let _ = data.data_extent("y");
    }
    let duration = start.elapsed() / 1000;
    println!("Unfiltered data_extent: {:?}", duration);
    assert!(duration.as_micros() < 50, "Unfiltered extent is maintained at ingestion");
}

#[test]
fn test_filtered_extent_is_cached() {
    let mut data = random_store(1_000_000);
    data.select_range(&[("x", Extent::new(100_000.0, 900_000.0))])
        .unwrap();
    assert_eq!(data.count(), 800_001);

    let start = Instant::now();
    let first = data.data_extent("y");
    let scan = start.elapsed();

    let start = Instant::now();
    let second = data.data_extent("y");
    let cached = start.elapsed();
    println!("Filtered data_extent scan: {:?}, cached: {:?}", scan, cached);

    assert_eq!(first, second);
    assert!(first.min >= -100.0 && first.max <= 100.0);
}

#[test]
fn test_down_sample_performance() {
    let data = random_store(1_000_000);

    let start = Instant::now();
    let sampled = data.down_sample_by("y", 0.001, Sampler::Average).unwrap();
    println!("down_sample (average, 1000 rows/frame): {:?}", start.elapsed());
    assert_eq!(sampled.count(), 1000);

    let start = Instant::now();
    let lttb = data.lttb_down_sample("y", 0.001).unwrap();
    println!("lttb_down_sample (1000 rows/frame): {:?}", start.elapsed());
    assert!(lttb.count() >= 1000 && lttb.count() <= 1002);
}
