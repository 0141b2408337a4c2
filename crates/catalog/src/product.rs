use serde::{Deserialize, Serialize};

use easyway_core::{CategoryId, DomainError, DomainResult, ProductId, SubcategoryId};

const MIN_NAME_LEN: usize = 2;
const MIN_DESCRIPTION_LEN: usize = 10;

/// Product status as shown in the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

/// Product record returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub sub_category_id: Option<SubcategoryId>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub status: ProductStatus,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }
}

/// Body of product create/update (images travel separately).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub sub_category_id: Option<SubcategoryId>,
    pub price: f64,
    pub sku: String,
    #[serde(default)]
    pub status: ProductStatus,
}

impl ProductDraft {
    /// Validate in form order; the first failing field is reported.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().chars().count() < MIN_NAME_LEN {
            return Err(DomainError::validation(
                "name",
                "Product name must be at least 2 characters",
            ));
        }

        if self.description.trim().chars().count() < MIN_DESCRIPTION_LEN {
            return Err(DomainError::validation(
                "description",
                "Description must be at least 10 characters",
            ));
        }

        if self.category_id.is_none() {
            return Err(DomainError::validation(
                "categoryId",
                "Please select a category",
            ));
        }

        if self.sub_category_id.is_none() {
            return Err(DomainError::validation(
                "subCategoryId",
                "Please select a subcategory",
            ));
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation("price", "Price must be positive"));
        }

        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("sku", "SKU is required"));
        }

        Ok(())
    }
}

/// Image URLs attached to a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImages {
    #[serde(default)]
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Trail Runner".to_string(),
            description: "Lightweight trail running shoe".to_string(),
            category_id: Some(CategoryId::new(1)),
            sub_category_id: Some(SubcategoryId::new(2)),
            price: 89.5,
            sku: "TR-001".to_string(),
            status: ProductStatus::Active,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn short_description_is_rejected() {
        let mut d = draft();
        d.description = "too short".to_string();
        assert_eq!(d.validate().unwrap_err().field(), Some("description"));
    }

    #[test]
    fn missing_subcategory_is_rejected() {
        let mut d = draft();
        d.sub_category_id = None;
        assert_eq!(d.validate().unwrap_err().field(), Some("subCategoryId"));
    }

    #[test]
    fn blank_sku_is_rejected() {
        let mut d = draft();
        d.sku = "  ".to_string();
        assert_eq!(d.validate().unwrap_err().field(), Some("sku"));
    }

    #[test]
    fn nan_price_is_rejected() {
        let mut d = draft();
        d.price = f64::NAN;
        assert_eq!(d.validate().unwrap_err().field(), Some("price"));
    }

    #[test]
    fn draft_serializes_backend_field_names() {
        let body = serde_json::to_value(draft()).unwrap();
        assert_eq!(body["subCategoryId"], 2);
        assert_eq!(body["status"], "active");
    }

    #[test]
    fn parses_product_with_missing_optionals() {
        let product: Product = serde_json::from_str(r#"{"id":12,"name":"Cap"}"#).unwrap();
        assert_eq!(product.id, ProductId::new(12));
        assert!(product.is_active());
        assert_eq!(product.category_id, None);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: any negative price is rejected on the price field.
            #[test]
            fn negative_price_rejected(price in -1.0e9f64..-1.0e-9f64) {
                let mut d = draft();
                d.price = price;
                prop_assert_eq!(d.validate().unwrap_err().field(), Some("price"));
            }

            /// Property: non-negative prices never fail validation on their own.
            #[test]
            fn non_negative_price_accepted(price in 0.0f64..1.0e9f64) {
                let mut d = draft();
                d.price = price;
                prop_assert!(d.validate().is_ok());
            }
        }
    }
}
