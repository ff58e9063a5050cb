//! Join and referential policy tests

use supplykv::config::ReferentialPolicy;
use supplykv::model::{ProductCreate, ProductPatch, SupplierCreate};
use supplykv::{Config, Inventory, SupplyError};
use tempfile::TempDir;

fn open_with(dir: &TempDir, policy: ReferentialPolicy) -> Inventory {
    let config = Config::builder()
        .data_dir(dir.path())
        .referential_policy(policy)
        .build();
    Inventory::open(&config).unwrap()
}

fn supplier(inventory: &Inventory, name: &str) -> String {
    inventory
        .create_supplier(SupplierCreate {
            name: Some(name.into()),
            contact_info: Some(format!("{}@x.com", name.to_lowercase())),
        })
        .unwrap()
        .id
}

fn product(name: &str, supplier_id: &str) -> ProductCreate {
    ProductCreate {
        name: Some(name.into()),
        description: Some(format!("{} description", name)),
        price: Some(1.25),
        quantity: Some(10),
        supplier_id: Some(supplier_id.into()),
    }
}

#[test]
fn test_product_with_supplier() {
    let dir = TempDir::new().unwrap();
    let inventory = open_with(&dir, ReferentialPolicy::Advisory);
    let acme = supplier(&inventory, "Acme");
    let created = inventory.create_product(product("Widget", &acme)).unwrap();

    let joined = inventory.product_with_supplier(&created.id).unwrap();
    assert_eq!(joined.id, created.id);
    assert_eq!(joined.quantity, 10);
    assert_eq!(joined.supplier, inventory.get_supplier(&acme).unwrap());
}

#[test]
fn test_orphaned_product_read_is_dependency_error() {
    let dir = TempDir::new().unwrap();
    let inventory = open_with(&dir, ReferentialPolicy::Advisory);
    let acme = supplier(&inventory, "Acme");
    let created = inventory.create_product(product("Widget", &acme)).unwrap();

    inventory.delete_supplier(&acme).unwrap();

    // The product itself is still there
    assert_eq!(inventory.get_product(&created.id).unwrap(), created);
    assert!(matches!(
        inventory.product_with_supplier(&created.id),
        Err(SupplyError::DependencyNotFound { entity: "supplier", .. })
    ));
    assert_eq!(inventory.orphaned_products().unwrap(), vec![created]);
}

#[test]
fn test_missing_product_beats_missing_supplier() {
    let dir = TempDir::new().unwrap();
    let inventory = open_with(&dir, ReferentialPolicy::Advisory);

    assert!(matches!(
        inventory.product_with_supplier("p0"),
        Err(SupplyError::NotFound { entity: "product", .. })
    ));
}

#[test]
fn test_products_by_supplier() {
    let dir = TempDir::new().unwrap();
    let inventory = open_with(&dir, ReferentialPolicy::Advisory);
    let acme = supplier(&inventory, "Acme");
    let globex = supplier(&inventory, "Globex");

    let bolt = inventory.create_product(product("Bolt", &acme)).unwrap();
    let nut = inventory.create_product(product("Nut", &acme)).unwrap();
    inventory.create_product(product("Gear", &globex)).unwrap();

    let mut ids: Vec<String> = inventory
        .products_by_supplier(&acme)
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    ids.sort();

    let mut expected = vec![bolt.id, nut.id];
    expected.sort();
    assert_eq!(ids, expected);
}

#[test]
fn test_products_by_supplier_empty_and_unknown_differ() {
    let dir = TempDir::new().unwrap();
    let inventory = open_with(&dir, ReferentialPolicy::Advisory);
    let acme = supplier(&inventory, "Acme");

    let empty = inventory.products_by_supplier(&acme).unwrap_err();
    assert!(matches!(empty, SupplyError::NoProducts(_)));
    assert_eq!(empty.to_string(), format!("No product with supplier id={}", acme));

    assert!(matches!(
        inventory.products_by_supplier("ghost"),
        Err(SupplyError::NotFound { entity: "supplier", .. })
    ));
}

#[test]
fn test_moving_product_between_suppliers() {
    let dir = TempDir::new().unwrap();
    let inventory = open_with(&dir, ReferentialPolicy::Enforced);
    let acme = supplier(&inventory, "Acme");
    let globex = supplier(&inventory, "Globex");
    let created = inventory.create_product(product("Widget", &acme)).unwrap();

    inventory
        .update_product(
            &created.id,
            ProductPatch {
                supplier_id: Some(globex.clone()),
                ..Default::default()
            },
        )
        .unwrap();

    assert!(matches!(
        inventory.products_by_supplier(&acme),
        Err(SupplyError::NoProducts(_))
    ));
    assert_eq!(inventory.products_by_supplier(&globex).unwrap().len(), 1);
}

// =============================================================================
// Referential Policy
// =============================================================================

#[test]
fn test_advisory_accepts_unknown_supplier() {
    let dir = TempDir::new().unwrap();
    let inventory = open_with(&dir, ReferentialPolicy::Advisory);

    let created = inventory.create_product(product("Loose", "nobody")).unwrap();
    assert_eq!(created.supplier_id, "nobody");
}

#[test]
fn test_enforced_rejects_unknown_supplier() {
    let dir = TempDir::new().unwrap();
    let inventory = open_with(&dir, ReferentialPolicy::Enforced);
    assert_eq!(inventory.policy(), ReferentialPolicy::Enforced);

    assert!(matches!(
        inventory.create_product(product("Loose", "nobody")),
        Err(SupplyError::BadRequest(_))
    ));
    assert!(inventory.list_products().unwrap().is_empty());

    let acme = supplier(&inventory, "Acme");
    let created = inventory.create_product(product("Widget", &acme)).unwrap();
    let repoint = inventory.update_product(
        &created.id,
        ProductPatch {
            supplier_id: Some("nobody".into()),
            ..Default::default()
        },
    );
    assert!(matches!(repoint, Err(SupplyError::BadRequest(_))));

    // Unknown product wins over the bad reference
    let unknown = inventory.update_product(
        "p0",
        ProductPatch {
            supplier_id: Some("nobody".into()),
            ..Default::default()
        },
    );
    assert!(matches!(unknown, Err(SupplyError::NotFound { .. })));
}

#[test]
fn test_policy_parses_case_insensitively() {
    assert_eq!("Enforced".parse::<ReferentialPolicy>(), Ok(ReferentialPolicy::Enforced));
    assert_eq!("advisory".parse::<ReferentialPolicy>(), Ok(ReferentialPolicy::Advisory));
    assert!("strict".parse::<ReferentialPolicy>().is_err());
}
