use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::prelude::*;
use rand::rngs::StdRng;

use atmstar::{
    AtmConfig, AtmDissector, ControlWordOptions, PwAtmDissector, PwEncapsulationMode,
    SubDissectorRegistry,
    atm::{AalKind, AtmPseudoHeader, HeaderErrorCorrector, sniff_aal5_payload},
    crc::{CrcCalculators, calculate_hec},
    pw::ControlWordValidator,
    serialization::{build_aal5_cpcs_pdu, build_oam_cell},
};

const BENCH_SEED: u64 = 0x00A7_4D5A;

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf[..]);
    buf
}

// UNI cell with a valid HEC and a random payload
fn create_cell(rng: &mut StdRng, first4: [u8; 4]) -> Vec<u8> {
    let mut cell = first4.to_vec();
    cell.push(calculate_hec(&first4));
    cell.extend(random_bytes(rng, 48));
    cell
}

fn bench_hec(c: &mut Criterion) {
    let mut group = c.benchmark_group("hec");
    let corrector = HeaderErrorCorrector::new();
    let first4 = [0x01, 0x23, 0x45, 0x60];
    let clean = [first4[0], first4[1], first4[2], first4[3], calculate_hec(&first4)];
    let mut damaged = clean;
    damaged[1] ^= 0x04;

    group.bench_function("generate", |b| b.iter(|| calculate_hec(black_box(&first4))));
    group.bench_function("check_clean", |b| {
        b.iter(|| corrector.correct(black_box(&clean)))
    });
    group.bench_function("locate_single_bit", |b| {
        b.iter(|| corrector.correct(black_box(&damaged)))
    });
    group.finish();
}

fn bench_crc(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc");
    let crcs = CrcCalculators::new();
    let mut rng = StdRng::seed_from_u64(BENCH_SEED);

    for cells in [1usize, 8, 32] {
        let pdu = random_bytes(&mut rng, cells * 48);
        group.throughput(Throughput::Bytes(pdu.len() as u64));
        group.bench_with_input(BenchmarkId::new("aal5_residue", cells), &pdu, |b, pdu| {
            b.iter(|| crcs.aal5_crc_ok(black_box(pdu)))
        });
    }
    let oam = build_oam_cell(atmstar::atm::OamType::FaultManagement, 8, &[]).unwrap();
    group.bench_function("crc10_oam", |b| {
        b.iter(|| crcs.crc10_residue(black_box(&oam)))
    });
    group.finish();
}

fn bench_reassembled(c: &mut Criterion) {
    let mut group = c.benchmark_group("reassembled");
    let dissector = AtmDissector::new(AtmConfig::default(), SubDissectorRegistry::new());
    let ph = AtmPseudoHeader::new(AalKind::Aal5);
    let mut rng = StdRng::seed_from_u64(BENCH_SEED);

    for size in [40usize, 1500, 9180] {
        let mut sdu = vec![0xAA, 0xAA, 0x03, 0x00, 0x00, 0x00, 0x08, 0x00];
        sdu.extend(random_bytes(&mut rng, size - sdu.len()));
        let pdu = build_aal5_cpcs_pdu(&sdu, 0, 0).unwrap();
        group.throughput(Throughput::Bytes(pdu.len() as u64));
        group.bench_with_input(BenchmarkId::new("aal5_llc", size), &pdu, |b, pdu| {
            b.iter(|| dissector.dissect_reassembled(&ph, black_box(pdu), pdu.len()))
        });
    }

    let ip = random_bytes(&mut rng, 64);
    group.bench_function("sniff", |b| b.iter(|| sniff_aal5_payload(black_box(&ip))));
    group.finish();
}

fn bench_cells(c: &mut Criterion) {
    let mut group = c.benchmark_group("cells");
    let dissector = AtmDissector::default();
    let mut rng = StdRng::seed_from_u64(BENCH_SEED);
    let run: Vec<u8> = (0..64)
        .flat_map(|_| create_cell(&mut rng, [0x00, 0x10, 0x02, 0x00]))
        .collect();

    group.throughput(Throughput::Bytes(run.len() as u64));
    group.bench_function("aal5_run_64", |b| {
        let ph = AtmPseudoHeader::new(AalKind::Aal5);
        b.iter(|| dissector.dissect_cells(&ph, black_box(&run)))
    });
    group.bench_function("user_aal_run_64", |b| {
        let ph = AtmPseudoHeader::new(AalKind::UserAal);
        b.iter(|| dissector.dissect_cells(&ph, black_box(&run)))
    });
    group.finish();
}

fn bench_pseudowire(c: &mut Criterion) {
    let mut group = c.benchmark_group("pseudowire");
    let dissector = PwAtmDissector::default();
    let mut rng = StdRng::seed_from_u64(BENCH_SEED);

    let mut n1 = vec![0x00, 0x00, 0x00, 0x01];
    for _ in 0..28 {
        n1.extend_from_slice(&[0x00, 0x10, 0x02, 0x00]);
        n1.extend(random_bytes(&mut rng, 48));
    }
    group.throughput(Throughput::Bytes(n1.len() as u64));
    group.bench_function("n1_cw_28_cells", |b| {
        b.iter(|| dissector.dissect(PwEncapsulationMode::NToOneCw, black_box(&n1)))
    });

    let mut sdu = vec![0x00, 0x00, 0x00, 0x01];
    sdu.extend(random_bytes(&mut rng, 1500));
    group.throughput(Throughput::Bytes(sdu.len() as u64));
    group.bench_function("aal5_sdu_1500", |b| {
        b.iter(|| dissector.dissect(PwEncapsulationMode::Aal5Sdu, black_box(&sdu)))
    });

    group.bench_function("validate_cw", |b| {
        b.iter(|| {
            ControlWordValidator::validate(
                black_box([0x08, 0x32, 0x00, 0x05]),
                PwEncapsulationMode::Aal5Sdu,
                102,
                ControlWordOptions::default(),
            )
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_hec,
    bench_crc,
    bench_reassembled,
    bench_cells,
    bench_pseudowire
);
criterion_main!(benches);
