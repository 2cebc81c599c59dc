// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::view::View;

#[test]
fn test_empty_views_hash_identically() {
    assert_eq!(View::new().digest(), View::new().digest());
}

#[test]
fn test_digest_ignores_history() {
    let built = View::from_members([("a", 1u16), ("b", 2)]).unwrap();

    let mut grown = View::new();
    grown.add("x", 9).unwrap();
    grown.add("a", 1).unwrap();
    grown.remove("x", 9).unwrap();
    grown.add("b", 2).unwrap();

    assert_ne!(built.version(), grown.version());
    assert_eq!(built.digest(), grown.digest());
}

#[test]
fn test_add_then_remove_restores_digest() {
    let mut view = View::from_members([("a", 1u16)]).unwrap();
    view.set_metadata("k", "v");
    let original = view.digest();

    view.add("b", 2).unwrap();
    assert_ne!(view.digest(), original);

    view.remove("b", 2).unwrap();
    assert_eq!(view.digest(), original);
}

#[test]
fn test_member_order_changes_digest() {
    let ab = View::from_members([("a", 1u16), ("b", 2)]).unwrap();
    let ba = View::from_members([("b", 2u16), ("a", 1)]).unwrap();
    assert_ne!(ab.digest(), ba.digest());
}

#[test]
fn test_metadata_insertion_order_does_not_matter() {
    let mut v1 = View::new();
    v1.set_metadata("x", "1");
    v1.set_metadata("y", "2");

    let mut v2 = View::new();
    v2.set_metadata("y", "2");
    v2.set_metadata("x", "1");

    assert_eq!(v1.digest(), v2.digest());
}

#[test]
fn test_cached_digest_refreshes_after_mutation() {
    let mut view = View::new();
    let empty = view.digest();
    view.set_metadata("k", "v");
    assert_ne!(view.digest(), empty);
    // Cached value stays consistent across reads.
    assert_eq!(view.digest(), view.clone().digest());
}
