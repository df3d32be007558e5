//! Extraction pipeline benchmarks
//!
//! Compares the three strategy layers over synthetic wishlist pages of a
//! realistic size. The state blob should dominate, and the DOM scan sets
//! the worst-case budget per poll cycle.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use wishwatch::infrastructure::extraction::{ExtractContext, ExtractionPipeline, PipelineOptions};

fn blob_page(item_count: usize) -> String {
    let items: Vec<String> = (0..item_count)
        .map(|i| {
            format!(
                r#"{{"id": "i{}", "name": "Benchmark Item {}", "price": {}, "url": "https://shop.test/item/{}"}}"#,
                i,
                i,
                (i + 1) * 100,
                i
            )
        })
        .collect();
    format!(
        r#"<html><body><script id="__NEXT_DATA__" type="application/json">{{"props": {{"items": [{}]}}}}</script></body></html>"#,
        items.join(",")
    )
}

fn json_ld_page(item_count: usize) -> String {
    let elements: Vec<String> = (0..item_count)
        .map(|i| {
            format!(
                r#"{{"@type": "Product", "name": "Benchmark Item {}", "url": "https://shop.test/item/{}", "offers": {{"price": {}.99, "priceCurrency": "USD"}}}}"#,
                i, i, i + 1
            )
        })
        .collect();
    format!(
        r#"<html><head><script type="application/ld+json">{{"@type": "ItemList", "itemListElement": [{}]}}</script></head><body></body></html>"#,
        elements.join(",")
    )
}

fn grid_page(item_count: usize) -> String {
    let mut cells = String::new();
    for i in 0..item_count {
        cells.push_str(&format!(
            r#"<div class="cell"><a href="/u/bench/item/{}">Benchmark Item {}</a><span>${}.99</span></div>"#,
            i,
            i,
            i + 1
        ));
    }
    format!("<html><body><main>{}</main></body></html>", cells)
}

fn extraction_benchmarks(c: &mut Criterion) {
    let pipeline = ExtractionPipeline::new(PipelineOptions::default()).unwrap();
    let context = ExtractContext::new("https://throne.com/u/bench/wishlist");

    let blob = blob_page(50);
    c.bench_function("state_blob_50_items", |b| {
        b.iter(|| pipeline.extract(black_box(&blob), &context))
    });

    let json_ld = json_ld_page(50);
    c.bench_function("json_ld_50_items", |b| {
        b.iter(|| pipeline.extract(black_box(&json_ld), &context))
    });

    let grid = grid_page(50);
    c.bench_function("dom_scan_50_items", |b| {
        b.iter(|| pipeline.extract(black_box(&grid), &context))
    });
}

criterion_group!(benches, extraction_benchmarks);
criterion_main!(benches);
