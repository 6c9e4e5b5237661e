//! Tests for run-length encoding

use super::*;
use crate::column::CompressedColumn;
use crate::config::{CodecConfig, RunMerge};
use crate::error::Error;
use crate::types::{ColumnIdentity, ElementType};
use crate::value::Value;

fn column_with(merge: RunMerge, values: &[i32]) -> RleColumn<i32> {
    let identity = ColumnIdentity::new("price", ElementType::Int32).expect("valid name");
    let mut config = CodecConfig::default();
    config.rle.merge = merge;
    let mut column = RleColumn::with_config(identity, &config).expect("matching type");
    column.extend_from_slice(values).expect("append");
    column
}

fn column_of(values: &[i32]) -> RleColumn<i32> {
    column_with(RunMerge::Eager, values)
}

fn pairs(column: &RleColumn<i32>) -> Vec<(i32, u32)> {
    column.runs().iter().map(|r| (r.value, r.length)).collect()
}

// ========== Run editing helpers ==========

#[test]
fn test_locate() {
    let runs = vec![Run::new('a', 3), Run::new('b', 1), Run::new('c', 2)];

    assert_eq!(locate(&runs, 0), Some((0, 0)));
    assert_eq!(locate(&runs, 2), Some((0, 2)));
    assert_eq!(locate(&runs, 3), Some((1, 0)));
    assert_eq!(locate(&runs, 5), Some((2, 1)));
    assert_eq!(locate(&runs, 6), None);
}

#[test]
fn test_push_value_extends_or_starts_run() {
    let mut runs: Vec<Run<i32>> = Vec::new();

    for v in [1, 1, 2, 1] {
        push_value(&mut runs, v);
    }

    assert_eq!(
        runs,
        vec![Run::new(1, 2), Run::new(2, 1), Run::new(1, 1)]
    );
}

#[test]
fn test_push_value_starts_new_run_when_length_saturates() {
    let mut runs = vec![Run::new(7i32, u32::MAX)];

    push_value(&mut runs, 7);

    assert_eq!(runs, vec![Run::new(7, u32::MAX), Run::new(7, 1)]);
}

#[test]
fn test_split_update_in_the_middle() {
    // Arrange
    let mut runs = vec![Run::new(5i32, 5)];

    // Act
    let idx = split_update(&mut runs, 0, 2, 9);

    // Assert
    assert_eq!(idx, 1);
    assert_eq!(runs, vec![Run::new(5, 2), Run::new(9, 1), Run::new(5, 2)]);
}

#[test]
fn test_split_update_at_run_edges() {
    let mut runs = vec![Run::new(5i32, 3)];
    assert_eq!(split_update(&mut runs, 0, 0, 1), 0);
    assert_eq!(runs, vec![Run::new(1, 1), Run::new(5, 2)]);

    let mut runs = vec![Run::new(5i32, 3)];
    assert_eq!(split_update(&mut runs, 0, 2, 1), 1);
    assert_eq!(runs, vec![Run::new(5, 2), Run::new(1, 1)]);
}

#[test]
fn test_split_update_same_value_is_noop() {
    let mut runs = vec![Run::new(5i32, 3)];

    let idx = split_update(&mut runs, 0, 1, 5);

    assert_eq!(idx, 0);
    assert_eq!(runs, vec![Run::new(5, 3)]);
}

#[test]
fn test_remove_at() {
    let mut runs = vec![Run::new(1i32, 2), Run::new(2, 1), Run::new(1, 1)];

    assert_eq!(remove_at(&mut runs, 0), None);
    assert_eq!(runs[0].length, 1);
    assert_eq!(remove_at(&mut runs, 1), Some(1));
    assert_eq!(runs, vec![Run::new(1, 1), Run::new(1, 1)]);
}

#[test]
fn test_merge_around_both_sides() {
    let mut runs = vec![Run::new(1i32, 2), Run::new(1, 1), Run::new(1, 3), Run::new(4, 1)];

    let idx = merge_around(&mut runs, 1);

    assert_eq!(idx, 0);
    assert_eq!(runs, vec![Run::new(1, 6), Run::new(4, 1)]);
}

#[test]
fn test_merge_around_respects_length_limit() {
    let mut runs = vec![Run::new(1i32, u32::MAX), Run::new(1, 1)];

    merge_around(&mut runs, 1);

    assert_eq!(runs.len(), 2);
}

// ========== Column: insert / get ==========

#[test]
fn test_insert_builds_runs() {
    // Arrange & Act
    let column = column_of(&[5, 5, 5, 7, 7]);

    // Assert
    assert_eq!(pairs(&column), vec![(5, 3), (7, 2)]);
    assert_eq!(column.size(), 5);
    assert_eq!(column.run_count(), 2);
}

#[test]
fn test_get_every_position() {
    let column = column_of(&[5, 5, 5, 7, 7]);

    let values: Vec<Value> = (0..5).map(|tid| column.get(tid).expect("in range")).collect();

    assert_eq!(
        values,
        [5, 5, 5, 7, 7].map(Value::Int32).to_vec()
    );
    assert!(matches!(
        column.get(5),
        Err(Error::OutOfRange { tid: 5, size: 5 })
    ));
}

#[test]
fn test_insert_value_empty_box() {
    let mut column = column_of(&[]);

    assert!(matches!(
        column.insert_value(&Value::Empty),
        Err(Error::EmptyValue)
    ));
    assert!(column.is_empty());
}

// ========== Column: update ==========

#[test]
fn test_update_splits_run() {
    // Arrange
    let mut column = column_of(&[5, 5, 5, 7, 7]);

    // Act
    column.update(1, &Value::Int32(9)).expect("update");

    // Assert
    assert_eq!(pairs(&column), vec![(5, 1), (9, 1), (5, 1), (7, 2)]);
    assert_eq!(column.decode_all(), vec![5, 9, 5, 7, 7]);
}

#[test]
fn test_update_merges_with_neighbour() {
    let mut column = column_of(&[5, 5, 5, 7, 7]);

    column.update(2, &Value::Int32(7)).expect("update");

    assert_eq!(pairs(&column), vec![(5, 2), (7, 3)]);
}

#[test]
fn test_update_bridges_two_runs() {
    let mut column = column_of(&[1, 1, 2, 1, 1]);

    column.update(2, &Value::Int32(1)).expect("update");

    assert_eq!(pairs(&column), vec![(1, 5)]);
}

#[test]
fn test_lazy_merge_keeps_fragmented_runs() {
    let mut column = column_with(RunMerge::Lazy, &[1, 1, 2, 1, 1]);

    column.update(2, &Value::Int32(1)).expect("update");

    assert_eq!(pairs(&column), vec![(1, 2), (1, 1), (1, 2)]);
    assert_eq!(column.decode_all(), vec![1; 5]);
    assert_eq!(column.merge_policy(), RunMerge::Lazy);
}

#[test]
fn test_update_out_of_range_changes_nothing() {
    let mut column = column_of(&[1, 1]);

    let result = column.update(2, &Value::Int32(3));

    assert!(matches!(result, Err(Error::OutOfRange { .. })));
    assert_eq!(pairs(&column), vec![(1, 2)]);
}

#[test]
fn test_update_wrong_type_reports_mismatch_even_out_of_range() {
    let mut column = column_of(&[1]);

    let result = column.update(10, &Value::from("x"));

    assert!(matches!(result, Err(Error::TypeMismatch { .. })));
}

#[test]
fn test_update_many() {
    // Arrange
    let mut column = column_of(&[1, 1, 1, 1, 1, 1]);

    // Act
    column
        .update_many(&[4, 1, 5], &Value::Int32(0))
        .expect("update");

    // Assert
    assert_eq!(column.decode_all(), vec![1, 0, 1, 1, 0, 0]);
    assert_eq!(pairs(&column), vec![(1, 1), (0, 1), (1, 2), (0, 2)]);
}

// ========== Column: remove ==========

#[test]
fn test_remove_shortens_run() {
    let mut column = column_of(&[5, 5, 5, 7, 7]);

    column.remove(0).expect("remove");

    assert_eq!(pairs(&column), vec![(5, 2), (7, 2)]);
    assert_eq!(column.size(), 4);
}

#[test]
fn test_remove_singleton_merges_neighbours() {
    let mut column = column_of(&[1, 1, 2, 1]);

    column.remove(2).expect("remove");

    assert_eq!(pairs(&column), vec![(1, 3)]);
}

#[test]
fn test_remove_many() {
    // Arrange
    let mut column = column_of(&[1, 2, 2, 3, 1, 1]);

    // Act
    column.remove_many(&[1, 2, 3]).expect("remove");

    // Assert
    assert_eq!(pairs(&column), vec![(1, 3)]);
    assert_eq!(column.size(), 3);
}

#[test]
fn test_remove_many_validation_happens_first() {
    let mut column = column_of(&[1, 2, 3]);

    assert!(matches!(
        column.remove_many(&[0, 5]),
        Err(Error::OutOfRange { tid: 5, .. })
    ));
    assert!(matches!(
        column.remove_many(&[1, 0]),
        Err(Error::UnsortedPositionList)
    ));
    assert_eq!(column.decode_all(), vec![1, 2, 3]);
}

#[test]
fn test_clear_content() {
    let mut column = column_of(&[1, 1, 2]);

    column.clear_content();

    assert_eq!(column.size(), 0);
    assert_eq!(column.run_count(), 0);
    assert!(column.get(0).is_err());
}

// ========== Footprint ==========

#[test]
fn test_long_runs_compress() {
    let column = column_of(&[3; 10_000]);

    let stats = column.stats();

    assert_eq!(column.run_count(), 1);
    assert!(stats.compression_ratio > 100.0);
}

#[test]
fn test_string_runs() {
    // Arrange
    let identity = ColumnIdentity::new("tag", ElementType::Varchar).expect("valid name");
    let mut column = RleColumn::<String>::new(identity).expect("matching type");

    // Act
    for v in ["x", "x", "y"] {
        column.insert_value(&Value::from(v)).expect("insert");
    }

    // Assert
    assert_eq!(column.run_count(), 2);
    assert_eq!(column.get(1).expect("in range"), Value::from("x"));
    assert!(column.size_in_bytes() > 0);
}

#[test]
fn test_display_expands_runs() {
    let column = column_of(&[8, 8]);

    let rendered = column.to_string();

    assert_eq!(rendered.matches("| 8 |").count(), 2);
}

#[test]
fn test_update_grows_run_count_by_at_most_two() {
    for tid in 0..6 {
        let mut column = column_of(&[4, 4, 4, 4, 4, 4]);
        let before = column.run_count();

        column.update(tid, &Value::Int32(1)).expect("update");

        assert!(column.run_count() <= before + 2);
        assert_eq!(column.size(), 6);
    }
}
