use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;
use crate::repository::Entity;

use super::{non_empty_text, required, required_text, valid_price, Supplier};

/// An inventory item, referencing its supplier by id
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u64,
    pub supplier_id: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Serialize for Product {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let omit_timestamp = serializer.is_human_readable() && self.updated_at.is_none();
        let mut state = serializer.serialize_struct("Product", if omit_timestamp { 6 } else { 7 })?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("price", &self.price)?;
        state.serialize_field("quantity", &self.quantity)?;
        state.serialize_field("supplierId", &self.supplier_id)?;
        if omit_timestamp {
            state.skip_field("updatedAt")?;
        } else {
            state.serialize_field("updatedAt", &self.updated_at)?;
        }
        state.end()
    }
}

/// Body of `POST /products`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u64>,
    pub supplier_id: Option<String>,
}

/// Body of `PUT /products/:id`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u64>,
    pub supplier_id: Option<String>,
}

/// A product with its supplier resolved, as returned by `GET /products/:id`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductWithSupplier {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub quantity: u64,
    pub supplier: Supplier,
}

impl ProductWithSupplier {
    pub fn new(product: Product, supplier: Supplier) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            description: product.description,
            quantity: product.quantity,
            supplier,
        }
    }
}

impl Entity for Product {
    type Create = ProductCreate;
    type Patch = ProductPatch;

    const KIND: &'static str = "product";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_create(id: String, payload: ProductCreate) -> Result<Self> {
        Ok(Self {
            id,
            name: required_text("name", payload.name)?,
            description: required_text("description", payload.description)?,
            price: valid_price(required("price", payload.price)?)?,
            quantity: required("quantity", payload.quantity)?,
            supplier_id: required_text("supplierId", payload.supplier_id)?,
            updated_at: None,
        })
    }

    fn apply_patch(&mut self, patch: ProductPatch) -> Result<()> {
        let name = patch.name.map(|v| non_empty_text("name", v)).transpose()?;
        let description = patch
            .description
            .map(|v| non_empty_text("description", v))
            .transpose()?;
        let price = patch.price.map(valid_price).transpose()?;
        let supplier_id = patch
            .supplier_id
            .map(|v| non_empty_text("supplierId", v))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(supplier_id) = supplier_id {
            self.supplier_id = supplier_id;
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}
