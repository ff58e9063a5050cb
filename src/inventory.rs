//! Inventory
//!
//! Owns the supplier and product repositories and answers the queries
//! that join them. This is the handle the HTTP layer and the CLI share.

use crate::config::{Config, ReferentialPolicy};
use crate::error::{Result, SupplyError};
use crate::model::{
    Product, ProductCreate, ProductPatch, ProductWithSupplier, Supplier, SupplierCreate,
    SupplierPatch,
};
use crate::repository::Repository;

/// Sub-directories of `Config::data_dir`, one store per entity
const SUPPLIER_STORE: &str = "suppliers";
const PRODUCT_STORE: &str = "products";

/// Suppliers, products, and the joins between them
pub struct Inventory {
    suppliers: Repository<Supplier>,
    products: Repository<Product>,
    policy: ReferentialPolicy,
}

impl Inventory {
    /// Assemble from already-open repositories
    pub fn new(
        suppliers: Repository<Supplier>,
        products: Repository<Product>,
        policy: ReferentialPolicy,
    ) -> Self {
        Self {
            suppliers,
            products,
            policy,
        }
    }

    /// Open both stores under `config.data_dir`
    pub fn open(config: &Config) -> Result<Self> {
        let suppliers = Repository::open(config.with_subdir(SUPPLIER_STORE))?;
        let products = Repository::open(config.with_subdir(PRODUCT_STORE))?;

        tracing::info!(
            data_dir = %config.data_dir.display(),
            policy = ?config.referential_policy,
            "inventory opened"
        );
        Ok(Self::new(suppliers, products, config.referential_policy))
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    pub fn create_supplier(&self, payload: SupplierCreate) -> Result<Supplier> {
        self.suppliers.create(payload)
    }

    pub fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        self.suppliers.list()
    }

    pub fn get_supplier(&self, id: &str) -> Result<Supplier> {
        self.suppliers.get(id)
    }

    pub fn update_supplier(&self, id: &str, patch: SupplierPatch) -> Result<Supplier> {
        self.suppliers.update(id, patch)
    }

    /// Remove a supplier; products that reference it are left in place
    pub fn delete_supplier(&self, id: &str) -> Result<Supplier> {
        self.suppliers.delete(id)
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub fn create_product(&self, payload: ProductCreate) -> Result<Product> {
        if let Some(supplier_id) = payload.supplier_id.as_deref() {
            self.check_supplier_reference(supplier_id)?;
        }
        self.products.create(payload)
    }

    pub fn list_products(&self) -> Result<Vec<Product>> {
        self.products.list()
    }

    /// The stored product record, without its supplier
    pub fn get_product(&self, id: &str) -> Result<Product> {
        self.products.get(id)
    }

    pub fn update_product(&self, id: &str, patch: ProductPatch) -> Result<Product> {
        if let Some(supplier_id) = patch.supplier_id.as_deref() {
            // Missing product wins over a bad reference
            if !self.products.contains(id)? {
                return Err(SupplyError::NotFound {
                    entity: "product",
                    id: id.to_string(),
                });
            }
            self.check_supplier_reference(supplier_id)?;
        }
        self.products.update(id, patch)
    }

    pub fn delete_product(&self, id: &str) -> Result<Product> {
        self.products.delete(id)
    }

    // =========================================================================
    // Joins
    // =========================================================================

    /// A product with its supplier resolved
    ///
    /// The supplier is a hard dependency here: an orphaned product yields
    /// `DependencyNotFound`.
    pub fn product_with_supplier(&self, id: &str) -> Result<ProductWithSupplier> {
        let product = self.products.get(id)?;
        let supplier = self.suppliers.find(&product.supplier_id)?.ok_or_else(|| {
            SupplyError::DependencyNotFound {
                entity: "supplier",
                id: product.supplier_id.clone(),
            }
        })?;

        Ok(ProductWithSupplier::new(product, supplier))
    }

    /// Every product whose `supplierId` matches, by linear scan
    ///
    /// An unknown supplier is `NotFound`; a known supplier without
    /// products is `NoProducts`.
    pub fn products_by_supplier(&self, supplier_id: &str) -> Result<Vec<Product>> {
        if !self.suppliers.contains(supplier_id)? {
            return Err(SupplyError::NotFound {
                entity: "supplier",
                id: supplier_id.to_string(),
            });
        }

        let matching: Vec<Product> = self
            .products
            .list()?
            .into_iter()
            .filter(|p| p.supplier_id == supplier_id)
            .collect();

        if matching.is_empty() {
            return Err(SupplyError::NoProducts(supplier_id.to_string()));
        }
        Ok(matching)
    }

    /// Products whose supplier no longer exists
    pub fn orphaned_products(&self) -> Result<Vec<Product>> {
        let mut orphans = Vec::new();
        for product in self.products.list()? {
            if !self.suppliers.contains(&product.supplier_id)? {
                orphans.push(product);
            }
        }
        Ok(orphans)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Flush both stores' memtables to SSTables
    pub fn flush(&self) -> Result<()> {
        self.suppliers.map().engine().flush()?;
        self.products.map().engine().flush()
    }

    /// Compact both stores, returning tables replaced in each
    pub fn compact(&self) -> Result<(usize, usize)> {
        let suppliers = self.suppliers.map().engine().compact()?;
        let products = self.products.map().engine().compact()?;
        Ok((suppliers, products))
    }

    pub fn policy(&self) -> ReferentialPolicy {
        self.policy
    }

    fn check_supplier_reference(&self, supplier_id: &str) -> Result<()> {
        if self.policy == ReferentialPolicy::Enforced && !self.suppliers.contains(supplier_id)? {
            return Err(SupplyError::BadRequest(format!(
                "supplier with id={} does not exist",
                supplier_id
            )));
        }
        Ok(())
    }
}
