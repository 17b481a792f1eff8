//! Address Domain Models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct AddressRow {
    pub address_id: i64,
    pub street: String,
    pub building_name: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
    pub user_id: i64,
}

/// Body for creating or updating an address
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressRequest {
    pub street: String,
    pub building_name: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddressDto {
    pub address_id: i64,
    pub street: String,
    pub building_name: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}

impl From<AddressRow> for AddressDto {
    fn from(row: AddressRow) -> Self {
        Self {
            address_id: row.address_id,
            street: row.street,
            building_name: row.building_name,
            city: row.city,
            state: row.state,
            country: row.country,
            pincode: row.pincode,
        }
    }
}
