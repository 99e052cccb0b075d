use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::{polygon, MultiPolygon, Point};
use noise_atlas::models::{Complaint, ComplaintRecord, Crs, Layer, Park};
use noise_atlas::processors::{DistanceStrategy, ProximityAnalyzer};
use noise_atlas::utils::LocalProjection;

// Complaints and square parks scattered over a 20 km city-sized grid
fn create_test_layers(complaint_count: usize, park_count: usize) -> (Layer<Complaint>, Layer<Park>) {
    let crs = Crs::Local(LocalProjection::default());

    let complaints = (0..complaint_count)
        .map(|i| Complaint {
            record: ComplaintRecord {
                unique_key: i.to_string(),
                created_date: None,
                complaint_type: "Noise - Vehicle".to_string(),
                descriptor: "Noise, Ice Cream Truck (NR4)".to_string(),
                city: String::new(),
                community_board: String::new(),
                borough: String::new(),
                latitude: None,
                longitude: None,
            },
            location: Point::new(((i * 7919) % 20_000) as f64, ((i * 104_729) % 20_000) as f64),
        })
        .collect();

    let parks = (0..park_count)
        .map(|i| {
            let x = ((i * 3571) % 19_800) as f64;
            let y = ((i * 6143) % 19_800) as f64;
            Park::new(
                "Playground".to_string(),
                format!("Park {}", i),
                MultiPolygon::new(vec![polygon![
                    (x: x, y: y),
                    (x: x + 150.0, y: y),
                    (x: x + 150.0, y: y + 120.0),
                    (x: x, y: y + 120.0),
                    (x: x, y: y),
                ]]),
            )
        })
        .collect();

    (Layer::new(crs, complaints), Layer::new(crs, parks))
}

fn benchmark_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_park_by_park_count");

    for park_count in [100, 500, 2000] {
        let (complaints, parks) = create_test_layers(2000, park_count);

        for strategy in [DistanceStrategy::AllPairs, DistanceStrategy::Indexed] {
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", strategy), park_count),
                &park_count,
                |b, _| {
                    let analyzer = ProximityAnalyzer::new(strategy);
                    b.iter(|| {
                        analyzer
                            .nearest_park_distances(black_box(&complaints), black_box(&parks))
                            .unwrap()
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_strategies);
criterion_main!(benches);
