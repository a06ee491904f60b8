use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dsv_tokenizer::TokenizerBuilder;

fn sample_lines(rows: usize) -> Vec<String> {
    (0..rows)
        .map(|i| format!(r#"{i},"plain field",,"a quoted, field with a "", escaped quote""#))
        .collect()
}

fn tokenize_all(lines: Vec<String>) -> usize {
    let mut tokenizer = TokenizerBuilder::new().build(lines.into_iter()).unwrap();
    let mut columns = 0;
    while tokenizer.next_record().unwrap() {
        while tokenizer.has_next_column() {
            black_box(tokenizer.next_column().unwrap());
            columns += 1;
        }
    }
    columns
}

pub fn tokenize_plain_records(c: &mut Criterion) {
    let lines = sample_lines(1_000);
    c.bench_function("tokenize_1000_records", |b| {
        b.iter(|| tokenize_all(black_box(lines.clone())))
    });
}

pub fn tokenize_multiline_quoted_field(c: &mut Criterion) {
    let mut lines = Vec::new();
    lines.push(r#""start of a field"#.to_string());
    for _ in 0..200 {
        lines.push("a physical line absorbed into the same quoted field".to_string());
    }
    lines.push(r#"end of the field",trailing"#.to_string());

    c.bench_function("tokenize_200_line_quoted_field", |b| {
        b.iter(|| tokenize_all(black_box(lines.clone())))
    });
}

criterion_group!(benches, tokenize_plain_records, tokenize_multiline_quoted_field);
criterion_main!(benches);
