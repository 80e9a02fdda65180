//! Performance benchmarks for photo-route-lib
//!
//! Run with: cargo bench --package photo-route-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use photo_route_lib::{
    PhotoCollection, PhotoRecord, RawTagBag, TagName, TagRecord, TagValue, build_route,
    compute_viewport, normalize,
};

/// Tag bag of a camera walking a wavy line, one shot per minute.
/// Every seventh photo has no GPS block, every fifth only text descriptions.
fn generate_tags(i: usize, base_lat: f64, base_lon: f64) -> RawTagBag {
    let t = i as f64 / 1000.0;
    let lat = base_lat + t * 0.1 + (t * 50.0).sin() * 0.001;
    let lon = base_lon + t * 0.1 + (t * 30.0).cos() * 0.001;
    let minutes = i % 60;
    let hours = (i / 60) % 24;
    let day = 1 + (i / 1440) % 28;

    let mut tags = RawTagBag::new()
        .with(TagName::Make, TagRecord::from_description("Canon"))
        .with(TagName::Model, TagRecord::from_description("EOS R5"))
        .with(TagName::FocalLength, TagRecord::from_description("35 mm"))
        .with(TagName::FNumber, TagRecord::from_description("f/2.8"))
        .with(
            TagName::DateTimeOriginal,
            TagRecord::from_description(format!(
                "2024:03:{:02} {:02}:{:02}:00",
                day, hours, minutes
            )),
        );

    if i % 7 == 0 {
        return tags;
    }
    if i % 5 == 0 {
        tags.insert(
            TagName::GpsLatitude,
            TagRecord::from_description(format!("{:.6}", lat)),
        );
        tags.insert(
            TagName::GpsLongitude,
            TagRecord::from_description(format!("{:.6}", lon)),
        );
    } else {
        let dms = |v: f64| {
            let deg = v.trunc();
            let min = ((v - deg) * 60.0).trunc();
            let sec = ((v - deg) * 60.0 - min) * 60.0;
            TagValue::Numbers(vec![deg, min, sec])
        };
        tags.insert(TagName::GpsLatitude, TagRecord::from_value(dms(lat)));
        tags.insert(TagName::GpsLatitudeRef, TagRecord::from_description("N"));
        tags.insert(TagName::GpsLongitude, TagRecord::from_value(dms(lon)));
        tags.insert(TagName::GpsLongitudeRef, TagRecord::from_description("E"));
    }
    tags
}

/// Photos in shuffled insertion order
fn generate_photos(count: usize) -> Vec<PhotoRecord> {
    (0..count)
        .map(|i| {
            // Deterministic shuffle
            let j = (i * 7919) % count;
            PhotoRecord::new(
                format!("IMG_{:06}.JPG", j),
                generate_tags(j, 37.5, 127.0),
                j as i64 * 60_000,
            )
        })
        .collect()
}

// ============================================================================
// Core Benchmarks
// ============================================================================

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let tags: Vec<RawTagBag> = (0..1_000).map(|i| generate_tags(i, 37.5, 127.0)).collect();
    group.throughput(Throughput::Elements(tags.len() as u64));
    group.bench_function("1k_tag_bags", |b| {
        b.iter(|| tags.iter().map(normalize).count());
    });

    group.finish();
}

fn bench_build_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_route");
    group.sample_size(20);

    for count in [1_000, 10_000] {
        let photos = generate_photos(count);
        // Derivation is cached per record; measure ordering and filtering only
        for photo in &photos {
            photo.metadata();
            photo.capture_time();
        }
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &photos, |b, photos| {
            b.iter(|| build_route(photos));
        });
    }

    group.finish();
}

fn bench_collection_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    group.sample_size(10);

    let photos = generate_photos(10_000);
    group.throughput(Throughput::Elements(photos.len() as u64));
    group.bench_function("add_many_10k", |b| {
        b.iter(|| {
            let mut collection = PhotoCollection::new();
            collection.add_many(photos.clone()).unwrap();
            collection.route()
        });
    });

    group.finish();
}

fn bench_viewport(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport");

    let mut collection = PhotoCollection::new();
    collection.add_many(generate_photos(10_000)).unwrap();
    let coords = collection.gps_coordinates();

    group.bench_function("compute_viewport_10k", |b| {
        b.iter(|| compute_viewport(&coords));
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_normalize,
    bench_build_route,
    bench_collection_ingest,
    bench_viewport,
);

criterion_main!(benches);
