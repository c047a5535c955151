use super::*;
use crate::errors::is_unique_violation;
use crate::repo::{delete_item, get_store};
use crate::test_utils::{seed_item, seed_store, setup_test_db};

#[test]
fn test_create_tag() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");

    let tag = create_tag(&pool, store.get_id(), "sale".to_string()).unwrap();

    assert_eq!(tag.get_name(), "sale");
    assert_eq!(tag.get_store_id(), store.get_id());
}

#[test]
fn test_tag_names_unique_per_store() {
    let pool = setup_test_db();
    let shop = seed_store(&pool, "Shop");
    let market = seed_store(&pool, "Market");

    create_tag(&pool, shop.get_id(), "sale".to_string()).unwrap();

    // Same name in another store is fine
    create_tag(&pool, market.get_id(), "sale".to_string()).unwrap();

    let err = create_tag(&pool, shop.get_id(), "sale".to_string()).unwrap_err();
    assert!(is_unique_violation(&err));
}

#[test]
fn test_create_tag_for_missing_store_fails() {
    let pool = setup_test_db();

    assert!(create_tag(&pool, 42, "sale".to_string()).is_err());
}

#[test]
fn test_get_tag() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");

    let created = create_tag(&pool, store.get_id(), "sale".to_string()).unwrap();

    assert_eq!(get_tag(&pool, created.get_id()).unwrap(), Some(created));
    assert!(get_tag(&pool, 999).unwrap().is_none());
}

#[test]
fn test_list_tags_for_store() {
    let pool = setup_test_db();
    let shop = seed_store(&pool, "Shop");
    let market = seed_store(&pool, "Market");

    let tag1 = create_tag(&pool, shop.get_id(), "sale".to_string()).unwrap();
    let tag2 = create_tag(&pool, shop.get_id(), "new".to_string()).unwrap();
    create_tag(&pool, market.get_id(), "fresh".to_string()).unwrap();

    assert_eq!(list_tags_for_store(&pool, shop.get_id()).unwrap(), vec![tag1, tag2]);
}

#[test]
fn test_link_and_list_both_directions() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");
    let chair = seed_item(&pool, store.get_id(), "Chair", 10.0);
    let table = seed_item(&pool, store.get_id(), "Table", 20.0);
    let tag = create_tag(&pool, store.get_id(), "furniture".to_string()).unwrap();

    assert!(link_tag_to_item(&pool, chair.get_id(), tag.get_id()).unwrap());
    assert!(link_tag_to_item(&pool, table.get_id(), tag.get_id()).unwrap());

    assert_eq!(list_tags_for_item(&pool, chair.get_id()).unwrap(), vec![tag.clone()]);
    assert_eq!(list_items_for_tag(&pool, tag.get_id()).unwrap(), vec![chair, table]);
    assert_eq!(count_items_for_tag(&pool, tag.get_id()).unwrap(), 2);
}

#[test]
fn test_link_twice_keeps_single_link() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");
    let item = seed_item(&pool, store.get_id(), "Chair", 10.0);
    let tag = create_tag(&pool, store.get_id(), "furniture".to_string()).unwrap();

    assert!(link_tag_to_item(&pool, item.get_id(), tag.get_id()).unwrap());
    assert!(!link_tag_to_item(&pool, item.get_id(), tag.get_id()).unwrap());

    assert_eq!(count_items_for_tag(&pool, tag.get_id()).unwrap(), 1);
}

#[test]
fn test_link_missing_tag_fails() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");
    let item = seed_item(&pool, store.get_id(), "Chair", 10.0);

    assert!(link_tag_to_item(&pool, item.get_id(), 999).is_err());
}

#[test]
fn test_unlink() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");
    let item = seed_item(&pool, store.get_id(), "Chair", 10.0);
    let tag = create_tag(&pool, store.get_id(), "furniture".to_string()).unwrap();
    link_tag_to_item(&pool, item.get_id(), tag.get_id()).unwrap();

    assert!(unlink_tag_from_item(&pool, item.get_id(), tag.get_id()).unwrap());
    assert!(list_tags_for_item(&pool, item.get_id()).unwrap().is_empty());

    // Nothing left to remove
    assert!(!unlink_tag_from_item(&pool, item.get_id(), tag.get_id()).unwrap());
}

#[test]
fn test_get_tag_detail() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");
    let item = seed_item(&pool, store.get_id(), "Chair", 10.0);
    let tag = create_tag(&pool, store.get_id(), "furniture".to_string()).unwrap();
    link_tag_to_item(&pool, item.get_id(), tag.get_id()).unwrap();

    let detail = get_tag_detail(&pool, tag.get_id()).unwrap().unwrap();

    assert_eq!(detail.id, tag.get_id());
    assert_eq!(detail.name, "furniture");
    assert_eq!(detail.store, store);
    assert_eq!(detail.items, vec![item]);
    assert!(get_tag_detail(&pool, 999).unwrap().is_none());
}

#[test]
fn test_list_tag_details_for_store() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");
    let item = seed_item(&pool, store.get_id(), "Chair", 10.0);
    let linked = create_tag(&pool, store.get_id(), "furniture".to_string()).unwrap();
    create_tag(&pool, store.get_id(), "unused".to_string()).unwrap();
    link_tag_to_item(&pool, item.get_id(), linked.get_id()).unwrap();

    let details = list_tag_details_for_store(&pool, store.get_id()).unwrap().unwrap();

    assert_eq!(details.len(), 2);
    assert_eq!(details[0].items, vec![item]);
    assert!(details[1].items.is_empty());
    assert!(list_tag_details_for_store(&pool, 999).unwrap().is_none());
}

#[test]
fn test_delete_unlinked_tag() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");
    let tag = create_tag(&pool, store.get_id(), "sale".to_string()).unwrap();

    assert_eq!(delete_tag_if_unlinked(&pool, tag.get_id()).unwrap(), TagDeletion::Deleted);
    assert!(get_tag(&pool, tag.get_id()).unwrap().is_none());
    assert!(get_store(&pool, store.get_id()).unwrap().is_some());
}

#[test]
fn test_delete_linked_tag_is_refused() {
    let pool = setup_test_db();
    let store = seed_store(&pool, "Shop");
    let item = seed_item(&pool, store.get_id(), "Chair", 10.0);
    let tag = create_tag(&pool, store.get_id(), "furniture".to_string()).unwrap();
    link_tag_to_item(&pool, item.get_id(), tag.get_id()).unwrap();

    assert_eq!(delete_tag_if_unlinked(&pool, tag.get_id()).unwrap(), TagDeletion::StillLinked(1));
    assert!(get_tag(&pool, tag.get_id()).unwrap().is_some());

    // Once the only linked item is gone the tag can be deleted
    delete_item(&pool, item.get_id()).unwrap();
    assert_eq!(delete_tag_if_unlinked(&pool, tag.get_id()).unwrap(), TagDeletion::Deleted);
}

#[test]
fn test_delete_missing_tag() {
    let pool = setup_test_db();

    assert_eq!(delete_tag_if_unlinked(&pool, 999).unwrap(), TagDeletion::NotFound);
}
