use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rift_request_pattern::{
    BodyPattern, HeadersMatcher, PatternOptions, RequestPattern, RequestSignature, UriMatcher,
    ValueMatcher,
};
use serde_json::json;

fn exact_patterns(count: usize) -> Vec<RequestPattern> {
    (0..count)
        .map(|i| {
            RequestPattern::parse("get", &format!("http://localhost/api/v1/endpoint{i}")).unwrap()
        })
        .collect()
}

fn regex_patterns(count: usize) -> Vec<RequestPattern> {
    (0..count)
        .map(|i| {
            RequestPattern::new(
                "get",
                UriMatcher::regex(&format!(r"/api/v\d+/endpoint{i}$")).unwrap(),
                PatternOptions::default(),
            )
        })
        .collect()
}

fn first_match(patterns: &[RequestPattern], signature: &RequestSignature) -> Option<usize> {
    patterns
        .iter()
        .position(|pattern| pattern.matches(signature).unwrap_or(false))
}

fn bench_uri_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("uri_matching");

    for pattern_count in [10, 100, 500].iter() {
        let exact = exact_patterns(*pattern_count);
        let regex = regex_patterns(*pattern_count);

        let last = pattern_count - 1;
        let signature =
            RequestSignature::parse("GET", &format!("http://localhost:80/api/v1/endpoint{last}"))
                .unwrap();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("exact_last", pattern_count),
            pattern_count,
            |b, _| b.iter(|| first_match(black_box(&exact), black_box(&signature))),
        );
        group.bench_with_input(
            BenchmarkId::new("regex_last", pattern_count),
            pattern_count,
            |b, _| b.iter(|| first_match(black_box(&regex), black_box(&signature))),
        );

        let none = RequestSignature::parse("GET", "http://localhost/not/found").unwrap();
        group.bench_with_input(
            BenchmarkId::new("regex_none", pattern_count),
            pattern_count,
            |b, _| b.iter(|| first_match(black_box(&regex), black_box(&none))),
        );
    }

    group.finish();
}

fn bench_body_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("body_matching");

    let pattern = RequestPattern::new(
        "post",
        UriMatcher::exact("http://localhost/api/orders").unwrap(),
        PatternOptions::new()
            .headers(HeadersMatcher::new([("Content-Type", "application/json")]))
            .body(
                BodyPattern::mapping()
                    .entry("id", ValueMatcher::regex(r"^\d+$").unwrap())
                    .entry(
                        "customer",
                        BodyPattern::mapping()
                            .entry("name", "Alice")
                            .entry("email", ValueMatcher::regex("@example\\.com$").unwrap()),
                    )
                    .entry("items", json!(["a", "b", "c"])),
            ),
    );

    let json_body = json!({
        "id": "1234",
        "customer": {"name": "Alice", "email": "alice@example.com"},
        "items": ["a", "b", "c"],
    })
    .to_string();
    let json_request = RequestSignature::parse("POST", "http://localhost/api/orders")
        .unwrap()
        .with_header("Content-Type", "application/json")
        .with_body(json_body);

    group.bench_function("json_structured", |b| {
        b.iter(|| pattern.matches(black_box(&json_request)))
    });

    let xml_pattern = RequestPattern::new(
        "post",
        UriMatcher::exact("http://localhost/api/orders").unwrap(),
        PatternOptions::new().body(json!({"order": {"id": "1234", "item": ["a", "b", "c"]}})),
    );
    let xml_request = RequestSignature::parse("POST", "http://localhost/api/orders")
        .unwrap()
        .with_header("Content-Type", "application/xml")
        .with_body("<order><id>1234</id><item>a</item><item>b</item><item>c</item></order>");

    group.bench_function("xml_structured", |b| {
        b.iter(|| xml_pattern.matches(black_box(&xml_request)))
    });

    let form_pattern = RequestPattern::new(
        "post",
        UriMatcher::exact("http://localhost/login").unwrap(),
        PatternOptions::new().body(json!({"user": "alice", "remember": "1"})),
    );
    let form_request = RequestSignature::parse("POST", "http://localhost/login")
        .unwrap()
        .with_body("user=alice&remember=1");

    group.bench_function("form_structured", |b| {
        b.iter(|| form_pattern.matches(black_box(&form_request)))
    });

    group.finish();
}

criterion_group!(benches, bench_uri_matching, bench_body_matching);
criterion_main!(benches);
