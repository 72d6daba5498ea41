use chrono::{Duration as Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use room_availability::{
    BlockoutDate, EvaluationMode, Hotel, HotelId, InMemoryRepository, Reservation, Room, RoomId,
    RoomSearchService, RoomType, RoomTypeId, SearchConfig, SearchRequest,
};
use std::sync::Arc;
use std::time::Duration;

const ROOMS: i64 = 200;

// One hotel, a few hundred rooms, random bookings over a season
fn seeded_repository() -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    let mut rng = StdRng::seed_from_u64(42);
    let season_start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    repo.insert_hotel(Hotel {
        id: HotelId(1),
        name: "Amara Hotel".to_string(),
    });
    for occupancy in 1..=4u32 {
        repo.insert_room_type(RoomType {
            id: RoomTypeId(occupancy as i64),
            hotel_id: HotelId(1),
            name: format!("Type {occupancy}"),
            max_occupancy: occupancy,
            base_price_per_night: Some(60.0 * occupancy as f64),
            amenities: vec!["Wi-Fi".to_string()],
        });
    }

    for id in 1..=ROOMS {
        repo.insert_room(Room {
            id: RoomId(id),
            hotel_id: HotelId(1),
            room_type_id: RoomTypeId(rng.gen_range(1..=4)),
            room_number: format!("{id:03}"),
            is_active: rng.gen_bool(0.95),
        });
        for n in 0..rng.gen_range(0..6) {
            let check_in = season_start + Days::days(rng.gen_range(0..90));
            repo.insert_reservation(Reservation {
                id: id * 100 + n,
                room_id: RoomId(id),
                check_in,
                check_out: check_in + Days::days(rng.gen_range(1..8)),
            });
        }
        if rng.gen_bool(0.2) {
            repo.insert_blockout(BlockoutDate {
                room_id: RoomId(id),
                block_date: season_start + Days::days(rng.gen_range(0..90)),
            });
        }
    }
    repo
}

pub fn availability_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let repo = seeded_repository();
    // Simulated round trip to the hosted store
    repo.set_delay(Duration::from_millis(1));

    let request = SearchRequest::from_form("Amara Hotel", "2", "2025-07-01", "2025-07-05").unwrap();

    let mut group = c.benchmark_group("room_availability_search");
    group.sample_size(10);

    let strategies = [
        ("sequential", EvaluationMode::Sequential, false),
        ("concurrent_8", EvaluationMode::Concurrent { max_in_flight: 8 }, false),
        ("concurrent_32", EvaluationMode::Concurrent { max_in_flight: 32 }, false),
        ("batch", EvaluationMode::Sequential, true),
    ];

    for (name, evaluation, batch) in strategies {
        let config = SearchConfig {
            evaluation,
            prefer_batch: batch,
            ..SearchConfig::default()
        };
        let service = RoomSearchService::new(repo.clone(), config);
        group.bench_with_input(BenchmarkId::from_parameter(name), &batch, |b, &batch| {
            repo.set_batch_enabled(batch);
            b.iter(|| {
                let outcome = runtime.block_on(service.search(&request)).unwrap();
                black_box(outcome)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, availability_benchmark);
criterion_main!(benches);
