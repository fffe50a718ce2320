use tabula::{
    cursor::{MemoryCollection, QuerySpec},
    doc::Doc,
};

use crate::helpers::{ids, tagged_collection};

fn scores() -> MemoryCollection {
    let collection = MemoryCollection::with_page_size("scores", 2);
    for (id, team, points) in [(1, "red", 10), (2, "blue", 30), (3, "red", 20), (4, "blue", 10)] {
        let mut doc = Doc::new().with("_id", id).with("points", points);
        doc.append("team.name", team).unwrap();
        collection.insert_one(doc);
    }
    collection
}

#[test]
fn test_filter_on_nested_path() {
    let collection = scores();
    let mut cursor = collection
        .find_all()
        .filter(Doc::new().with("team.name", "red"))
        .unwrap();
    assert_eq!(ids(&cursor.to_list().unwrap()), [1, 3]);
}

#[test]
fn test_sort_descending_with_ties() {
    let collection = scores();
    let sort = Doc::new().with("points", -1);
    let mut cursor = collection.find(QuerySpec::new().with_sort(sort));
    assert_eq!(ids(&cursor.to_list().unwrap()), [2, 3, 1, 4]);
}

#[test]
fn test_multi_key_sort() {
    let collection = scores();
    let sort = Doc::new().with("team.name", 1).with("points", 1);
    let mut cursor = collection.find_all().sort(sort).unwrap();
    assert_eq!(ids(&cursor.to_list().unwrap()), [4, 2, 1, 3]);
}

#[test]
fn test_skip_and_limit_span_pages() {
    let collection = tagged_collection(10, 3);
    let mut cursor = collection.find_all().skip(2).unwrap().limit(5).unwrap();
    assert_eq!(ids(&cursor.to_list().unwrap()), [3, 4, 5, 6, 7]);
    assert_eq!(collection.fetch_count(), 2);
}

#[test]
fn test_skip_past_end() {
    let collection = tagged_collection(3, 2);
    let mut cursor = collection.find_all().skip(10).unwrap();
    assert!(cursor.to_list().unwrap().is_empty());
    assert_eq!(collection.fetch_count(), 1);
}

#[test]
fn test_inclusion_projection() {
    let collection = scores();
    let mut cursor = collection
        .find_all()
        .projection(Doc::new().with("team.name", 1))
        .unwrap()
        .limit(1)
        .unwrap();

    let docs = cursor.to_list().unwrap();
    assert_eq!(docs[0].keys().collect::<Vec<_>>(), ["_id", "team"]);
    assert_eq!(docs[0].read_string("team.name").unwrap(), Some("red".to_string()));
}

#[test]
fn test_exclusion_projection_without_id() {
    let collection = scores();
    let projection = Doc::new().with("_id", 0).with("points", 0);
    let mut cursor = collection.find(QuerySpec::new().with_projection(projection).with_limit(1));

    let docs = cursor.to_list().unwrap();
    assert_eq!(docs[0].keys().collect::<Vec<_>>(), ["team"]);
}

#[test]
fn test_page_size_override() {
    let collection = tagged_collection(6, 4);
    let mut cursor = collection.find_all().page_size(1).unwrap();
    assert_eq!(cursor.to_list().unwrap().len(), 6);
    assert_eq!(collection.fetch_count(), 6);
}

#[test]
fn test_malformed_filter_path_fails_fetch() {
    let collection = scores();
    let mut cursor = collection
        .find_all()
        .filter(Doc::new().with("team&name", "red"))
        .unwrap();
    assert!(cursor.has_next().unwrap_err().is_malformed_path());
}

#[test]
fn test_inserts_visible_to_later_cursors() {
    let collection = tagged_collection(2, 5);
    let mut before = collection.find_all();
    collection.insert_one(Doc::new().with("_id", 3));

    assert_eq!(ids(&before.to_list().unwrap()), [1, 2, 3]);
    assert_eq!(collection.len(), 3);
}
