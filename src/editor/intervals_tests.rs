use pretty_assertions::assert_eq;

use super::*;

fn list(intervals: &[(usize, usize)]) -> SegmentIntervals {
    intervals
        .iter()
        .fold(SegmentIntervals::new(), |acc, &(start, end)| {
            acc.with_inserted(Interval::new(start, end))
        })
}

fn bounds(intervals: &SegmentIntervals) -> Vec<(usize, usize)> {
    intervals.iter().map(|iv| (iv.start, iv.end)).collect()
}

fn covered(intervals: &SegmentIntervals, len: usize) -> Vec<bool> {
    (0..len)
        .map(|offset| intervals.iter().any(|iv| iv.contains(offset)))
        .collect()
}

fn assert_maximal_merge(intervals: &SegmentIntervals) {
    for interval in intervals {
        assert!(interval.start < interval.end, "empty interval {interval}");
    }
    for pair in intervals.as_slice().windows(2) {
        assert!(
            pair[0].end < pair[1].start,
            "{} and {} overlap or touch",
            pair[0],
            pair[1]
        );
    }
}

/// Small deterministic generator so the property checks stay reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound as u64) as usize
    }

    fn interval(&mut self, len: usize) -> Interval {
        let a = self.next(len + 1);
        let b = self.next(len + 1);
        Interval::new(a.min(b), a.max(b))
    }
}

#[test]
fn insert_into_empty_list() {
    let merged = SegmentIntervals::new().with_inserted(Interval::new(4, 7));
    assert_eq!(bounds(&merged), vec![(4, 7)]);
}

#[test]
fn insert_overlapping_range_widens_existing_interval() {
    let merged = list(&[(4, 7)]).with_inserted(Interval::new(6, 10));
    assert_eq!(bounds(&merged), vec![(4, 10)]);
}

#[test]
fn insert_disjoint_then_bridging_range() {
    let disjoint = list(&[(0, 3)]).with_inserted(Interval::new(10, 14));
    assert_eq!(bounds(&disjoint), vec![(0, 3), (10, 14)]);

    let bridged = disjoint.with_inserted(Interval::new(3, 10));
    assert_eq!(bounds(&bridged), vec![(0, 14)]);
}

#[test]
fn insert_touching_range_merges() {
    let merged = list(&[(2, 5)]).with_inserted(Interval::new(5, 8));
    assert_eq!(bounds(&merged), vec![(2, 8)]);

    let merged = list(&[(5, 8)]).with_inserted(Interval::new(2, 5));
    assert_eq!(bounds(&merged), vec![(2, 8)]);
}

#[test]
fn insert_before_all_existing_intervals() {
    let merged = list(&[(10, 12), (20, 22)]).with_inserted(Interval::new(1, 3));
    assert_eq!(bounds(&merged), vec![(1, 3), (10, 12), (20, 22)]);
}

#[test]
fn insert_between_existing_intervals() {
    let merged = list(&[(1, 3), (20, 22)]).with_inserted(Interval::new(10, 12));
    assert_eq!(bounds(&merged), vec![(1, 3), (10, 12), (20, 22)]);
}

#[test]
fn insert_swallows_several_intervals() {
    let merged =
        list(&[(0, 1), (3, 4), (6, 7), (9, 10), (15, 16)]).with_inserted(Interval::new(2, 9));
    assert_eq!(bounds(&merged), vec![(0, 1), (2, 10), (15, 16)]);
}

#[test]
fn insert_covered_range_is_idempotent() {
    let original = list(&[(2, 12), (20, 25)]);
    assert_eq!(original.with_inserted(Interval::new(4, 8)), original);
    assert_eq!(original.with_inserted(Interval::new(2, 12)), original);
}

#[test]
fn insert_empty_range_keeps_list() {
    let original = list(&[(2, 4)]);
    assert_eq!(original.with_inserted(Interval::new(9, 9)), original);
}

#[test]
fn without_removes_exact_match_only() {
    let original = list(&[(1, 3), (4, 10), (12, 13)]);

    let removed = original.without(Interval::new(4, 10)).expect("exact match");
    assert_eq!(bounds(&removed), vec![(1, 3), (12, 13)]);

    assert!(original.without(Interval::new(5, 9)).is_none());
    assert!(original.without(Interval::new(4, 11)).is_none());
    assert!(original.without(Interval::new(20, 22)).is_none());
}

#[test]
fn from_intervals_rejects_malformed_lists() {
    let valid = vec![Interval::new(1, 3), Interval::new(5, 6)];
    assert!(SegmentIntervals::from_intervals(valid, 6).is_ok());

    for bad in [
        vec![Interval::new(3, 3)],
        vec![Interval::new(1, 7)],
        vec![Interval::new(1, 3), Interval::new(3, 5)],
        vec![Interval::new(4, 5), Interval::new(1, 2)],
        vec![Interval::new(1, 4), Interval::new(2, 5)],
    ] {
        let result = SegmentIntervals::from_intervals(bad.clone(), 6);
        assert!(
            matches!(result, Err(HighlightError::InvalidSelectionSet(_))),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn random_insert_sequences_keep_maximal_merge() {
    let len = 40;
    let mut rng = Lcg(7);
    for _ in 0..200 {
        let mut intervals = SegmentIntervals::new();
        let mut expected = vec![false; len];
        for _ in 0..rng.next(8) + 1 {
            let range = rng.interval(len);
            for slot in &mut expected[range.start..range.end] {
                *slot = true;
            }
            intervals = intervals.with_inserted(range);
            assert_maximal_merge(&intervals);
        }
        assert_eq!(covered(&intervals, len), expected);
    }
}

#[test]
fn random_insertions_are_idempotent() {
    let len = 30;
    let mut rng = Lcg(11);
    for _ in 0..200 {
        let mut intervals = SegmentIntervals::new();
        for _ in 0..rng.next(5) {
            intervals = intervals.with_inserted(rng.interval(len));
        }
        let range = rng.interval(len);
        let once = intervals.with_inserted(range);
        assert_eq!(once.with_inserted(range), once);
    }
}

#[test]
fn insertion_order_does_not_change_coverage() {
    let len = 30;
    let mut rng = Lcg(23);
    for _ in 0..200 {
        let mut base = SegmentIntervals::new();
        for _ in 0..rng.next(4) {
            base = base.with_inserted(rng.interval(len));
        }
        let r1 = rng.interval(len);
        let r2 = rng.interval(len);
        let forward = base.with_inserted(r1).with_inserted(r2);
        let backward = base.with_inserted(r2).with_inserted(r1);
        assert_eq!(covered(&forward, len), covered(&backward, len));
    }
}

#[test]
fn selection_set_round_trips_through_toml() {
    #[derive(serde::Serialize, serde::Deserialize)]
    struct Wrapper {
        segments: SelectionSet,
    }

    let document = HighlightDocument::new("Title", vec!["first paragraph".to_string()]);
    let selections = SelectionSet::from_segments(
        &document,
        vec![list(&[(0, 2)]), list(&[(1, 3), (6, 9)])],
    )
    .expect("valid set");

    let encoded = toml::to_string(&Wrapper {
        segments: selections.clone(),
    })
    .expect("serialize");
    let decoded: Wrapper = toml::from_str(&encoded).expect("deserialize");
    assert_eq!(decoded.segments, selections);
}
