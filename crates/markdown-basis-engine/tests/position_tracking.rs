use markdown_basis_engine::PositionTracker;
use pretty_assertions::assert_eq;

#[test]
fn test_position_follows_its_element_when_earlier_ones_are_removed() {
    let mut tracker: PositionTracker<char> = "ABC".chars().collect();
    let p = tracker.position(1).unwrap();
    tracker.remove_range(0, 1).unwrap();
    assert_eq!(p.index(), 0);
    assert!(p.is_valid());
    assert_eq!(tracker.get(p.index()).unwrap(), &'B');
}

#[test]
fn test_position_of_a_removed_element_is_invalid() {
    let mut tracker: PositionTracker<char> = "AB".chars().collect();
    let p = tracker.position(1).unwrap();
    tracker.remove_range(1, 2).unwrap();
    assert!(!p.is_valid());
    assert_eq!(p.valid_index(), None);
    assert_eq!(tracker.element(&p), None);
}

#[test]
fn test_live_positions_count_surviving_predecessors() {
    let mut tracker: PositionTracker<u32> = (0..10).collect();
    let positions: Vec<_> = (0..10).map(|i| tracker.position(i).unwrap()).collect();

    tracker.remove_range(2, 4).unwrap();
    tracker.insert(0, 100).unwrap();
    tracker.remove(5).unwrap();
    tracker.add_all([200, 201]);
    tracker.insert_all(3, [300, 301, 302]).unwrap();

    for (original, position) in positions.iter().enumerate() {
        let Some(index) = position.valid_index() else {
            assert!(matches!(original, 2 | 3 | 6));
            continue;
        };
        assert_eq!(tracker.get(index).unwrap(), &(original as u32));
        let preceding = tracker.items()[..index]
            .iter()
            .filter(|&&value| value < original as u32)
            .count();
        assert_eq!(preceding, (0..original).filter(|&i| !matches!(i, 2 | 3 | 6)).count());
    }
}

#[test]
fn test_cursor_walks_while_items_are_inserted_behind_it() {
    let mut tracker: PositionTracker<i32> = vec![3, 1, 2].into();
    let mut cursor = tracker.cursor();
    let mut visited = Vec::new();
    while let Some(position) = cursor.next(&tracker) {
        let value = *tracker.element(&position).unwrap();
        visited.push(value);
        if value == 1 {
            tracker.insert(0, 0).unwrap();
        }
    }
    assert_eq!(visited, vec![3, 1, 2]);
    assert_eq!(tracker.items(), &[0, 3, 1, 2]);
}

#[test]
fn test_positions_are_released_when_dropped() {
    let tracker: PositionTracker<&str> = vec!["a", "b"].into();
    {
        let first = tracker.first();
        let _copy = first.clone();
        assert_eq!(tracker.live_positions(), 2);
    }
    assert_eq!(tracker.live_positions(), 0);
}
