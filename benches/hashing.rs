use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use machine_merkle::{
    calculate_region_hash, calculate_root_hash, Keccak256Hasher, MemoryImage, MemoryRegion,
    Sha256Hasher, ZeroHashTable,
};

fn region_hash_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_hash");
    let zeros = ZeroHashTable::new(Keccak256Hasher);

    // 4KB to 4MB
    for log2_size in [12u32, 16, 20, 22] {
        let size = 1usize << log2_size;
        group.throughput(Throughput::Bytes(size as u64));
        let data = generate_test_data(size);

        group.bench_with_input(
            BenchmarkId::new("recursive", size),
            &data,
            |b, data| b.iter(|| calculate_root_hash(&Keccak256Hasher, black_box(data), log2_size).unwrap()),
        );
        group.bench_with_input(
            BenchmarkId::new("paged", size),
            &data,
            |b, data| b.iter(|| calculate_region_hash(&zeros, black_box(data), 12, log2_size).unwrap()),
        );
    }

    group.finish();
}

fn zero_table_benchmark(c: &mut Criterion) {
    c.bench_function("zero_table_keccak256", |b| {
        b.iter(|| ZeroHashTable::new(black_box(Keccak256Hasher)))
    });
    c.bench_function("zero_table_sha256", |b| {
        b.iter(|| ZeroHashTable::new(black_box(Sha256Hasher)))
    });
}

fn proof_benchmark(c: &mut Criterion) {
    let zeros = ZeroHashTable::new(Keccak256Hasher);
    let mut image = MemoryImage::new(&zeros, 12).unwrap();
    image
        .add_region(MemoryRegion::new(0x8000_0000, 20, generate_test_data(1 << 20)).unwrap())
        .unwrap();
    // Warm the cached region root
    image.root_hash().unwrap();

    c.bench_function("prove_word", |b| {
        b.iter(|| image.prove(black_box(0x8000_1008), 3).unwrap())
    });

    let proof = image.prove(0x8000_1008, 3).unwrap();
    c.bench_function("verify_word", |b| {
        b.iter(|| black_box(&proof).verify(&Keccak256Hasher))
    });
}

fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i * 31 % 251) as u8).collect()
}

criterion_group!(
    benches,
    region_hash_benchmark,
    zero_table_benchmark,
    proof_benchmark
);
criterion_main!(benches);
