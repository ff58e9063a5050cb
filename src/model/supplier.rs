use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;
use crate::repository::Entity;

use super::{non_empty_text, required_text};

/// A goods provider
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_info: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Serialize for Supplier {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let omit_timestamp = serializer.is_human_readable() && self.updated_at.is_none();
        let mut state = serializer.serialize_struct("Supplier", if omit_timestamp { 3 } else { 4 })?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("contactInfo", &self.contact_info)?;
        if omit_timestamp {
            state.skip_field("updatedAt")?;
        } else {
            state.serialize_field("updatedAt", &self.updated_at)?;
        }
        state.end()
    }
}

/// Body of `POST /suppliers`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierCreate {
    pub name: Option<String>,
    pub contact_info: Option<String>,
}

/// Body of `PUT /suppliers/:id`; absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact_info: Option<String>,
}

impl Entity for Supplier {
    type Create = SupplierCreate;
    type Patch = SupplierPatch;

    const KIND: &'static str = "supplier";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_create(id: String, payload: SupplierCreate) -> Result<Self> {
        Ok(Self {
            id,
            name: required_text("name", payload.name)?,
            contact_info: required_text("contactInfo", payload.contact_info)?,
            updated_at: None,
        })
    }

    fn apply_patch(&mut self, patch: SupplierPatch) -> Result<()> {
        // Validate everything before touching self
        let name = patch.name.map(|v| non_empty_text("name", v)).transpose()?;
        let contact_info = patch
            .contact_info
            .map(|v| non_empty_text("contactInfo", v))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(contact_info) = contact_info {
            self.contact_info = contact_info;
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}
