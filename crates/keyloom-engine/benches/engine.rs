use keyloom_crypto::{derive_password_seed, DerivedKey, Seed};
use keyloom_engine::PasswordGenerator;
use keyloom_ppd::Ppd;

fn password_seed() -> DerivedKey {
    let seed = Seed::from_bytes(vec![7u8; 16]).unwrap();
    derive_password_seed(&seed).unwrap()
}

#[divan::bench(args = [8, 32, 50])]
fn bench_generate(bencher: divan::Bencher, length: u32) {
    let ppd = Ppd::from_json(&format!(r#"{{"minLength": 8, "maxLength": {length}}}"#)).unwrap();
    let generator =
        PasswordGenerator::new("bench-user", "bench-site", &password_seed(), Some(&ppd)).unwrap();
    bencher.bench(|| generator.generate(divan::black_box(0), None).unwrap());
}

#[divan::bench]
fn bench_calculate_offset(bencher: divan::Bencher) {
    let generator =
        PasswordGenerator::new("bench-user", "bench-site", &password_seed(), None).unwrap();
    let (password, index) = generator.generate(0, None).unwrap();
    bencher.bench(|| {
        generator
            .calculate_offset(divan::black_box(index), divan::black_box(&password))
            .unwrap()
    });
}

#[divan::bench]
fn bench_regenerate_with_offset(bencher: divan::Bencher) {
    let generator =
        PasswordGenerator::new("bench-user", "bench-site", &password_seed(), None).unwrap();
    let (password, index) = generator.generate(0, None).unwrap();
    let offset = generator.calculate_offset(index, &password).unwrap();
    bencher.bench(|| generator.generate(divan::black_box(index), Some(&offset)).unwrap());
}

fn main() {
    divan::main();
}
