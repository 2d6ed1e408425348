// ------------------------------------------------------------------------------------------------
// Licensed under either of Apache License, Version 2.0, or MIT license, at your option.
// Please see the LICENSE-APACHE or LICENSE-MIT files in this distribution for license details.
// ------------------------------------------------------------------------------------------------

use flow_graphs::interner::Interner;
use pretty_assertions::assert_eq;

#[test]
fn interning_the_same_spelling_twice_returns_the_same_handle() {
    let mut interner = Interner::new();
    let a = interner.intern("foo");
    let b = interner.intern("foo");
    assert_eq!(a, b);
    assert_eq!(interner.resolve(a), "foo");
}

#[test]
fn distinct_spellings_get_distinct_handles() {
    let mut interner = Interner::new();
    let a = interner.intern("foo");
    let b = interner.intern("bar");
    assert_ne!(a, b);
    assert_eq!(interner.resolve(a), "foo");
    assert_eq!(interner.resolve(b), "bar");
}

#[test]
fn peek_does_not_create_a_new_entry() {
    let mut interner = Interner::new();
    assert!(interner.peek("foo").is_none());
    let handle = interner.intern("foo");
    assert_eq!(interner.peek("foo"), Some(handle));
}
