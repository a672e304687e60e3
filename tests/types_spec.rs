use std::sync::Arc;

use img_reader::{Coordinates, CostCache, RectC, SubFileType};

#[test]
fn cost_cache_evicts_least_recently_used() {
    let mut cache: CostCache<u32, &str> = CostCache::new(10);
    assert!(cache.insert(1, Arc::new("one"), 4));
    assert!(cache.insert(2, Arc::new("two"), 4));

    // Touch 1 so that 2 becomes the eviction candidate.
    assert_eq!(cache.get(&1).as_deref(), Some(&"one"));
    assert!(cache.insert(3, Arc::new("three"), 4));

    assert!(cache.contains(&1));
    assert!(!cache.contains(&2));
    assert!(cache.contains(&3));
    assert_eq!(cache.total_cost(), 8);
}

#[test]
fn cost_cache_rejects_entries_larger_than_capacity() {
    let mut cache: CostCache<u32, Vec<u8>> = CostCache::new(5);
    assert!(cache.insert(1, Arc::new(vec![1]), 5));
    assert!(!cache.insert(2, Arc::new(vec![2]), 6));

    assert!(cache.contains(&1));
    assert!(!cache.contains(&2));
    assert_eq!(cache.total_cost(), 5);
}

#[test]
fn cost_cache_replacing_a_key_recounts_its_cost() {
    let mut cache: CostCache<&str, u8> = CostCache::new(10);
    cache.insert("a", Arc::new(1), 6);
    cache.insert("a", Arc::new(2), 3);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.total_cost(), 3);
    assert_eq!(cache.get(&"a").map(|v| *v), Some(2));

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.total_cost(), 0);
    assert_eq!(cache.capacity(), 10);
}

#[test]
fn empty_batches_still_count_toward_capacity() {
    let mut cache: CostCache<u32, Vec<u8>> = CostCache::new(2);
    for key in 0..10_000 {
        assert!(cache.insert(key, Arc::new(Vec::new()), 0));
        assert!(cache.len() <= cache.capacity(), "{} entries after key {}", cache.len(), key);
    }
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.total_cost(), 2);
    assert!(cache.contains(&9_999));
    assert!(cache.contains(&9_998));
}

#[test]
fn rect_union_ignores_invalid_operands() {
    let a = RectC::from_min_max([0.0, 0.0], [1.0, 1.0]);
    let b = RectC::from_min_max([2.0, -1.0], [3.0, 0.5]);
    let u = a | b;
    assert_eq!(u, RectC::from_min_max([0.0, -1.0], [3.0, 1.0]));

    let invalid = RectC::from_min_max([5.0, 5.0], [4.0, 4.0]);
    assert!(!invalid.is_valid());
    assert_eq!(a | invalid, a);
    assert_eq!(invalid | a, a);

    let mut acc = a;
    acc |= b;
    assert_eq!(acc, u);
}

#[test]
fn rect_intersection_is_closed() {
    let a = RectC::from_min_max([0.0, 0.0], [1.0, 1.0]);
    assert!(a.intersects(&RectC::from_min_max([1.0, 1.0], [2.0, 2.0])));
    assert!(!a.intersects(&RectC::from_min_max([1.5, 0.0], [2.0, 1.0])));
    assert!(a.contains(Coordinates::new(1.0, 0.0)));
    assert!(!a.contains(Coordinates::new(1.0, 1.1)));
    assert_eq!(a.top_left(), Coordinates::new(0.0, 1.0));
}

#[test]
fn subfile_types_parse_from_codes_and_names() {
    assert_eq!(SubFileType::from_code(b"TRE"), SubFileType::Tre);
    assert_eq!(SubFileType::from_code(b"GMP"), SubFileType::Gmp);
    assert_eq!(SubFileType::from_code(b"MDR"), SubFileType::Unknown);
    assert!(SubFileType::Net.is_tile_file());
    assert!(!SubFileType::Typ.is_tile_file());

    assert_eq!("rgn".parse::<SubFileType>(), Ok(SubFileType::Rgn));
    assert_eq!(SubFileType::Lbl.to_string(), "LBL");
    assert!("XYZ".parse::<SubFileType>().is_err());
}
