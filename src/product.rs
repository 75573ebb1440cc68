//! Product record, update payload, and field validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Field name -> human readable message, one entry per violated rule.
pub type FieldErrors = BTreeMap<String, String>;

/// A product row joined with its category name and image list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[serde(rename = "Id")]
    pub id: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Des")]
    pub des: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Discount")]
    pub discount: f64,
    #[serde(rename = "Available_quantity")]
    pub available_quantity: i32,
    #[serde(rename = "Category")]
    pub category_id: i32,
    /// Read-only, derived from the category table.
    #[serde(rename = "Category_Name")]
    pub category_name: Option<String>,
    #[serde(rename = "ProductImage_url")]
    pub image_urls: Vec<String>,
}

/// Incoming PUT body. Absent fields take zero values so they are caught by validation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, ToSchema)]
#[serde(default)]
pub struct ProductPayload {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Des")]
    pub des: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Discount")]
    pub discount: f64,
    #[serde(rename = "Available_quantity")]
    pub available_quantity: i32,
    #[serde(rename = "Category")]
    pub category_id: i32,
    /// When absent the stored image list is left as is.
    #[serde(rename = "ProductImage_url", alias = "PrdouctImage_url")]
    pub image_urls: Option<Vec<String>>,
}

impl ProductPayload {
    /// Check every field rule and report all violations together.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut fields = FieldErrors::new();

        if self.name.trim().is_empty() {
            fields.insert("name".into(), "Can't be blank Name".into());
        }
        if self.des.trim().is_empty() {
            fields.insert("description".into(), "Can't be blank Description".into());
        }
        if !non_negative(self.price) {
            fields.insert("price".into(), "Can't be Price less than zero".into());
        }
        if !non_negative(self.discount) {
            fields.insert("discount".into(), "Can't be Discount less than zero".into());
        }
        if self.available_quantity < 0 {
            fields.insert(
                "available_quantity".into(),
                "Can't be Available_quantity less than zero".into(),
            );
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(fields)
        }
    }
}

fn non_negative(n: f64) -> bool {
    n.is_finite() && n >= 0.0
}

/// Decode the JSON text kept in `productimage.image_url`. NULL or empty text is an empty list.
pub fn decode_image_urls(raw: Option<&str>) -> Result<Vec<String>, serde_json::Error> {
    match raw.map(str::trim) {
        None | Some("") | Some("null") => Ok(Vec::new()),
        Some(s) => serde_json::from_str(s),
    }
}

pub fn encode_image_urls(urls: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(urls)
}
