use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyedit_parser::{parse_listing, KeyAssembler};

/// Edit-key `list` output with one primary, `subkeys` subkeys and three uids.
fn edit_listing(subkeys: usize) -> String {
    let mut text = String::from(
        "sec  rsa3072/ABCDEF0123456789\n     created: 2020-01-01  expires: 2030-01-01  usage: SC\n     trust: ultimate      validity: ultimate\n",
    );
    for i in 0..subkeys {
        text.push_str(&format!(
            "ssb  rsa3072/{i:016X}\n     created: 2020-01-01  expires: never       usage: E\n"
        ));
    }
    for i in 1..=3 {
        text.push_str(&format!("[ultimate] ({i}). User {i} <user{i}@example.com>\n"));
    }
    text
}

/// Colon listing with `keys` keys of two subkeys each.
fn colon_listing(keys: usize) -> String {
    let mut text = String::from("tru::1:1700000000:0:3:1:5\n");
    for i in 0..keys {
        text.push_str(&format!(
            "pub:u:3072:1:{i:016X}:1577836800:::u:::scESC:::::::23::0:\n\
             fpr:::::::::{i:040X}:\n\
             grp:::::::::{i:040X}:\n\
             uid:u::::1577836800::HASH::User {i} <user{i}@example.com>::::::::::0:\n\
             sig:!::1:{i:016X}:1577836800::::User {i}:13x:::::10:\n\
             sub:u:3072:1:{i:016X}:1577836800::::::e::::::23:\n\
             fpr:::::::::{i:040X}:\n\
             sub:u:3072:1:{i:016X}:1577836800::::::s::::::23:\n\
             fpr:::::::::{i:040X}:\n"
        ));
    }
    text
}

fn bench_edit_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit_listing");

    for subkeys in [1usize, 8, 32].iter() {
        let text = edit_listing(*subkeys);
        group.bench_with_input(BenchmarkId::from_parameter(subkeys), &text, |b, t| {
            b.iter(|| {
                let listing = parse_listing(black_box(t)).unwrap();
                black_box(listing);
            });
        });
    }

    group.finish();
}

fn bench_colon_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("colon_assembly");

    for keys in [10usize, 100, 1000].iter() {
        let text = colon_listing(*keys);
        group.bench_with_input(BenchmarkId::from_parameter(keys), &text, |b, t| {
            b.iter(|| {
                let keys = KeyAssembler::assemble(black_box(t));
                black_box(keys);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_edit_listing, bench_colon_assembly);
criterion_main!(benches);
