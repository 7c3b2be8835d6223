//! Unit tests for ImagesInFlight

use crate::graphics_device::ImagesInFlight;

#[test]
fn test_new_table_is_unowned() {
    let table = ImagesInFlight::new(3);
    assert_eq!(table.len(), 3);
    assert!(!table.is_empty());
    for image in 0..3 {
        assert_eq!(table.owner(image), None);
    }
}

#[test]
fn test_claim_returns_previous_owner() {
    let mut table = ImagesInFlight::new(3);

    assert_eq!(table.claim(1, 0), None);
    assert_eq!(table.owner(1), Some(0));

    assert_eq!(table.claim(1, 1), Some(0));
    assert_eq!(table.owner(1), Some(1));

    assert_eq!(table.owner(0), None);
    assert_eq!(table.owner(2), None);
}

#[test]
fn test_same_slot_can_own_several_images() {
    let mut table = ImagesInFlight::new(3);
    table.claim(0, 1);
    table.claim(2, 1);
    assert_eq!(table.owner(0), Some(1));
    assert_eq!(table.owner(2), Some(1));
}

#[test]
#[should_panic]
fn test_owner_out_of_range_panics() {
    let table = ImagesInFlight::new(2);
    let _ = table.owner(2);
}

#[test]
fn test_empty_table() {
    assert!(ImagesInFlight::new(0).is_empty());
}
