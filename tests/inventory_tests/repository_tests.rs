//! Generic repository tests, exercised through `Supplier`

use supplykv::model::{Supplier, SupplierCreate, SupplierPatch};
use supplykv::repository::Repository;
use supplykv::{Config, SupplyError};
use tempfile::TempDir;

fn open(dir: &TempDir) -> Repository<Supplier> {
    Repository::open(Config::builder().data_dir(dir.path()).build()).unwrap()
}

fn payload(name: &str) -> SupplierCreate {
    SupplierCreate {
        name: Some(name.into()),
        contact_info: Some("c@x.com".into()),
    }
}

#[test]
fn test_find_and_get_on_miss() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    assert_eq!(repo.find("absent").unwrap(), None);
    assert!(!repo.contains("absent").unwrap());
    assert!(matches!(
        repo.get("absent"),
        Err(SupplyError::NotFound { entity: "supplier", .. })
    ));
}

#[test]
fn test_ids_are_uuid_v4() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    let id = repo.create(payload("Acme")).unwrap().id;
    let parsed = uuid::Uuid::parse_str(&id).unwrap();
    assert_eq!(parsed.get_version_num(), 4);
}

#[test]
fn test_concurrent_creates_get_distinct_records() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            std::thread::spawn(move || {
                (0..10)
                    .map(|j| repo.create(payload(&format!("s{}-{}", i, j))).unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 80);
    assert_eq!(repo.list().unwrap().len(), 80);
}

#[test]
fn test_list_is_ordered_by_id() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    for name in ["c", "a", "b", "d"] {
        repo.create(payload(name)).unwrap();
    }
    repo.map().engine().flush().unwrap();
    repo.create(payload("e")).unwrap();

    let ids: Vec<String> = repo.list().unwrap().into_iter().map(|s| s.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids.len(), 5);
    assert_eq!(ids, sorted);
}

#[test]
fn test_repeat_delete_is_not_found_each_time() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);

    for _ in 0..2 {
        assert!(matches!(repo.delete("gone"), Err(SupplyError::NotFound { .. })));
    }
    assert_eq!(repo.map().engine().memtable_entry_count(), 0);
}

#[test]
fn test_update_stamps_time_and_keeps_id() {
    let dir = TempDir::new().unwrap();
    let repo = open(&dir);
    let created = repo.create(payload("Acme")).unwrap();

    let first = repo
        .update(&created.id, SupplierPatch { name: Some("Acme Ltd".into()), ..Default::default() })
        .unwrap();
    let second = repo.update(&created.id, SupplierPatch::default()).unwrap();

    assert_eq!(first.id, created.id);
    assert_eq!(second.name, "Acme Ltd");
    assert!(second.updated_at >= first.updated_at);
    assert!(first.updated_at.is_some());
}
