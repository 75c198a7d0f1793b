mod common;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pyfront::{ParseMode, check_syntax, parse, tokenizer};

fn bench_frontend(c: &mut Criterion) {
    for (label, path) in common::WORKLOADS {
        let source = common::load_source(path);

        c.bench_function(&format!("frontend_tokenize_{label}"), |b| {
            b.iter(|| {
                let out = tokenizer::tokenize(black_box(&source));
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_parse_{label}"), |b| {
            b.iter(|| {
                let out = parse(black_box(&source), ParseMode::Module).expect("parse");
                black_box(out);
            })
        });

        c.bench_function(&format!("frontend_check_syntax_{label}"), |b| {
            b.iter(|| {
                check_syntax(black_box(&source), ParseMode::Module).expect("check");
            })
        });
    }
}

criterion_group!(benches, bench_frontend);
criterion_main!(benches);
