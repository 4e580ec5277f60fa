use criterion::{black_box, criterion_group, criterion_main, Criterion};
use primekex::sieve::{self, SmallPrimeTable};
use rug::Integer;

fn bench_generate_primes_10k(c: &mut Criterion) {
    c.bench_function("generate_primes(10_000)", |b| {
        b.iter(|| sieve::generate_primes(black_box(10_000)));
    });
}

fn bench_generate_primes_1m(c: &mut Criterion) {
    c.bench_function("generate_primes(1_000_000)", |b| {
        b.iter(|| sieve::generate_primes(black_box(1_000_000)));
    });
}

fn bench_smallest_factor_survivor(c: &mut Criterion) {
    // No factor below 10,000: the scan walks the whole table
    let table = SmallPrimeTable::new(sieve::SMALL_PRIME_BOUND);
    let n = (Integer::from(1) << 255) - 19u32;
    c.bench_function("smallest_factor(2^255 - 19)", |b| {
        b.iter(|| table.smallest_factor(black_box(&n)));
    });
}

criterion_group!(
    benches,
    bench_generate_primes_10k,
    bench_generate_primes_1m,
    bench_smallest_factor_survivor,
);
criterion_main!(benches);
