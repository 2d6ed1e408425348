// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use flow_graphs::arena::Arena;
use flow_graphs::arena::HandleSet;

#[test]
fn handles_are_stable_and_distinct() {
    let mut arena: Arena<String> = Arena::new();
    let a = arena.add("a".to_string());
    let b = arena.add("b".to_string());
    assert_ne!(a, b);
    assert_eq!(arena[a], "a");
    assert_eq!(arena[b], "b");
    assert_eq!(arena.len(), 2);
    assert!(!arena.is_empty());
}

#[test]
fn handle_set_add_is_idempotent() {
    let mut arena: Arena<u32> = Arena::new();
    let h = arena.add(42);
    let mut set = HandleSet::new();
    assert!(set.add(h));
    assert!(!set.add(h));
    assert!(set.contains(h));
    assert_eq!(set.len(), 1);
}

#[test]
fn handle_set_iterates_in_ascending_handle_order() {
    let mut arena: Arena<u32> = Arena::new();
    let handles: Vec<_> = (0..5).map(|i| arena.add(i)).collect();
    let mut set = HandleSet::new();
    for h in handles.iter().rev() {
        set.add(*h);
    }
    let collected: Vec<_> = set.iter().collect();
    assert_eq!(collected, handles);
}

#[test]
fn handle_set_does_not_contain_unadded_handles() {
    let mut arena: Arena<u32> = Arena::new();
    let a = arena.add(1);
    let b = arena.add(2);
    let mut set = HandleSet::new();
    set.add(a);
    assert!(set.contains(a));
    assert!(!set.contains(b));
}
