use std::sync::Arc;

use markdown_basis_engine::{RangeMapper, SourceView, TrackerDirection};
use pretty_assertions::assert_eq;
use rstest::rstest;

const TEXT: &str = "hello world, with a tail";

#[rstest]
#[case(0, 0)]
#[case(0, 5)]
#[case(6, 11)]
#[case(3, 24)]
#[case(24, 24)]
fn test_views_over_a_range_have_its_length_and_chars(#[case] start: usize, #[case] end: usize) {
    let view = SourceView::of_range(TEXT, start, end).unwrap();
    assert_eq!(view.len(), end - start);
    for (k, expected) in TEXT[start..end].chars().enumerate() {
        assert_eq!(view.char_at(k).unwrap(), expected);
    }
}

#[test]
fn test_derived_views_round_trip_through_the_base() {
    let root = SourceView::of(TEXT);
    let derived = [
        root.sub_sequence(6, 11).unwrap(),
        root.sub_sequence_from(13).unwrap().trim(),
        root.sub_sequence(5, 12).unwrap().trim_start(),
        root.empty_suffix(),
    ];
    for view in derived {
        let again = view
            .base_sub_sequence(view.start_offset(), view.end_offset())
            .unwrap();
        assert_eq!(again, view);
        assert_eq!(again.source_range(), view.source_range());
    }
}

#[test]
fn test_adjacent_views_splice() {
    let text: Arc<str> = Arc::from("adjacent views");
    let head = SourceView::of_range(text.clone(), 0, 5).unwrap();
    let tail = SourceView::of_range(text.clone(), 5, 9).unwrap();
    assert!(head.is_continued_by(&tail));
    assert!(tail.is_continuation_of(&head));
    assert_eq!(
        head.splice_at_end(&tail),
        SourceView::of_range(text, 0, 9).unwrap()
    );
}

#[test]
fn test_splicing_views_over_different_text_is_an_error() {
    let head = SourceView::of_range("adjacent views", 0, 5).unwrap();
    let tail = SourceView::of_range("adjacent views", 5, 9).unwrap();
    assert!(!head.same_base(&tail));
    assert!(head.try_splice_at_end(&tail).is_err());
}

#[test]
#[should_panic(expected = "different base buffers")]
fn test_containment_across_bases_panics() {
    let one = SourceView::of("same text");
    let other = SourceView::of("same text");
    one.contains_all_of(&other);
}

#[test]
fn test_tracked_index_survives_only_where_the_point_does() {
    let view = SourceView::of("hello world")
        .track_index(6, TrackerDirection::Right)
        .unwrap();
    assert_eq!(view.sub_sequence(0, 5).unwrap().tracked_index(), None);
    assert_eq!(view.sub_sequence(0, 11).unwrap().tracked_index(), Some(6));
    assert_eq!(view.sub_sequence(6, 11).unwrap().tracked_index(), Some(0));
}

#[rstest]
#[case("no escapes here")]
#[case("a & b; 1 < 2")]
#[case("")]
fn test_unescape_without_escapes_is_identity(#[case] text: &str) {
    let view = SourceView::of(text);
    assert_eq!(view.unescape(), text);
}

#[test]
fn test_mapper_points_synthesized_text_back_at_the_source() {
    let view = SourceView::of(r"a\*b &amp; c");
    let mut mapper = RangeMapper::new();
    let out = view.unescape_mapped(&mut mapper);
    assert_eq!(out, "a*b & c");
    let sources: Vec<usize> = (0..=out.len()).map(|i| mapper.original_offset(i)).collect();
    assert_eq!(sources, vec![0, 1, 3, 4, 5, 10, 11, 12]);
}

#[test]
fn test_line_columns_follow_any_eol() {
    let view = SourceView::of("one\r\ntwo\nthree");
    let three = view.sub_sequence(9, 14).unwrap();
    assert_eq!(three.base_line_column_at_start().to_string(), "3:1");
    assert_eq!(three.base_line_column_at_end().to_string(), "3:6");
    assert_eq!(view.base_line_range_at(6), 5..8);
}
