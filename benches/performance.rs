use highlight_tui::{
    editor::{
        HighlightDocument, HighlightEditor, LogicalPosition, LogicalRange, SelectionSet, insert,
        project, remove,
    },
    render,
    theme::Theme,
};
use std::time::{Duration, Instant};

/// Performance benchmark suite for highlight operations
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - Inserting ranges into sparse and dense selection sets
/// - Exact-match removal
/// - Run projection
/// - Rendering with highlights
const SMALL_DOC_PARAGRAPHS: usize = 10;
const MEDIUM_DOC_PARAGRAPHS: usize = 100;
const LARGE_DOC_PARAGRAPHS: usize = 1000;

const ITERATIONS: usize = 100;

const SAMPLE_WORDS: &[&str] = &[
    "Lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
];

/// Create a test document with the specified number of paragraphs
fn create_test_document(num_paragraphs: usize, avg_words_per_para: usize) -> HighlightDocument {
    let paragraphs = (0..num_paragraphs)
        .map(|_| {
            (0..avg_words_per_para)
                .map(|j| SAMPLE_WORDS[j % SAMPLE_WORDS.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    HighlightDocument::new("Benchmark document", paragraphs)
}

/// Highlights every `stride`-th word of every paragraph.
fn create_dense_selection(document: &HighlightDocument, stride: usize) -> SelectionSet {
    let mut selections = SelectionSet::empty(document);
    for segment in 1..document.segment_count() {
        let Some(text) = document.segment_text(segment) else {
            continue;
        };
        let mut offset = 0;
        for (index, word) in text.split(' ').enumerate() {
            let len = word.chars().count();
            if index % stride == 0 {
                let range = LogicalRange::within_segment(segment, offset, offset + len);
                selections = insert(document, &selections, range).unwrap();
            }
            offset += len + 1;
        }
    }
    selections
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);

        if self.avg_duration.as_millis() > 16 {
            println!("\nWARNING: Average duration > 16ms (may drop frames)");
        }
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    for _ in 0..10 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = *durations.iter().min().unwrap();
    let max_duration = *durations.iter().max().unwrap();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

fn documents() -> Vec<(&'static str, HighlightDocument)> {
    vec![
        (
            "Small (10 paras)",
            create_test_document(SMALL_DOC_PARAGRAPHS, 40),
        ),
        (
            "Medium (100 paras)",
            create_test_document(MEDIUM_DOC_PARAGRAPHS, 40),
        ),
        (
            "Large (1000 paras)",
            create_test_document(LARGE_DOC_PARAGRAPHS, 40),
        ),
    ]
}

#[test]
fn bench_insert_into_dense_selection() {
    for (name, doc) in documents() {
        let selections = create_dense_selection(&doc, 2);
        let middle = doc.segment_count() / 2;
        let range = LogicalRange::within_segment(middle, 3, 40);
        let result = benchmark(&format!("insert (dense) - {}", name), ITERATIONS, || {
            let _ = insert(&doc, &selections, range).unwrap();
        });
        result.print();
    }
}

#[test]
fn bench_insert_across_segments() {
    for (name, doc) in documents() {
        let selections = create_dense_selection(&doc, 3);
        let last = doc.segment_count() - 1;
        let range = LogicalRange::new(LogicalPosition::new(1, 5), LogicalPosition::new(last, 5));
        let result = benchmark(&format!("insert (all segments) - {}", name), ITERATIONS, || {
            let _ = insert(&doc, &selections, range).unwrap();
        });
        result.print();
    }
}

#[test]
fn bench_remove_exact_match() {
    for (name, doc) in documents() {
        let selections = create_dense_selection(&doc, 2);
        let middle = doc.segment_count() / 2;
        let Some(target) = selections
            .segment(middle)
            .and_then(|list| list.iter().nth(list.len() / 2).copied())
        else {
            continue;
        };
        let range = LogicalRange::within_segment(middle, target.start, target.end);
        let result = benchmark(&format!("remove - {}", name), ITERATIONS, || {
            let _ = remove(&doc, &selections, range).unwrap();
        });
        result.print();
    }
}

#[test]
fn bench_project_segment() {
    let doc = create_test_document(1, 2000);
    let selections = create_dense_selection(&doc, 2);
    let text = doc.segment_text(1).unwrap();
    let intervals = selections.segment(1).unwrap();
    let result = benchmark("project (2000 words, 1000 runs)", ITERATIONS, || {
        let runs = project(text, intervals);
        assert!(!runs.is_empty());
    });
    result.print();
}

#[test]
fn bench_rendering_with_highlights() {
    let theme = Theme::default();
    for (name, doc) in documents() {
        let selections = create_dense_selection(&doc, 4);
        let result = benchmark(
            &format!("render_document - {}", name),
            if name.contains("Large") { 10 } else { ITERATIONS },
            || {
                let _ = render::render_document(&doc, &selections, 80, 0, &theme, None);
            },
        );
        result.print();
    }
}

#[test]
fn bench_editor_gesture_cycle() {
    let doc = create_test_document(MEDIUM_DOC_PARAGRAPHS, 40);
    let mut editor = HighlightEditor::new(doc);
    let range = LogicalRange::within_segment(50, 10, 30);
    let result = benchmark("insert + remove through editor", ITERATIONS, || {
        editor.insert_range(range).unwrap();
        editor.remove_range(range).unwrap();
    });
    result.print();
    assert!(editor.selections().is_empty());
}
