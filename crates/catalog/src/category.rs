use serde::{Deserialize, Serialize};

use easyway_core::{CategoryId, DomainError, DomainResult, SubcategoryId};

const MIN_NAME_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<SubcategoryId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub is_active: bool,
}

/// Body of category create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            is_active: true,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name, "Category name must be at least 2 characters")
    }
}

/// Body of sub-category create/update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub is_active: bool,
}

impl SubcategoryDraft {
    pub fn new(name: impl Into<String>, category_id: CategoryId) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category_id: Some(category_id),
            is_active: true,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name, "Subcategory name must be at least 2 characters")?;
        if self.category_id.is_none() {
            return Err(DomainError::validation(
                "categoryId",
                "Please select a category",
            ));
        }
        Ok(())
    }
}

fn validate_name(name: &str, message: &str) -> DomainResult<()> {
    if name.trim().chars().count() < MIN_NAME_LEN {
        return Err(DomainError::validation("name", message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_draft_requires_two_characters() {
        assert!(CategoryDraft::new("Shoes").validate().is_ok());
        let err = CategoryDraft::new(" x ").validate().unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn subcategory_draft_requires_category() {
        let mut draft = SubcategoryDraft::new("Sneakers", CategoryId::new(4));
        assert!(draft.validate().is_ok());

        draft.category_id = None;
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field(), Some("categoryId"));
    }

    #[test]
    fn parses_category_list_item() {
        let json = r#"{"categoryId":4,"name":"Shoes","description":"All shoes","isActive":true}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.category_id, Some(CategoryId::new(4)));
        assert!(category.is_active);
    }

    #[test]
    fn draft_serializes_camel_case() {
        let body = serde_json::to_value(SubcategoryDraft::new("Sneakers", CategoryId::new(4))).unwrap();
        assert_eq!(body["categoryId"], 4);
        assert_eq!(body["isActive"], true);
    }
}
