//! API request/response models for news categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::validation::nullable_id;
use crate::db::models::{Status, categories::Category, paging::FilterField};
use crate::services::categories::CategoryBranch;
use crate::types::CategoryId;

/// Query keys accepted as filters on the admin category list.
pub const FILTERS: &[FilterField] = &[
    FilterField::field("name"),
    FilterField::field("slug"),
    FilterField::field("status"),
    FilterField::alias("parent", "parent_id"),
    FilterField::field("parent_id"),
];

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Request body for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryCreate {
    #[validate(
        required(message = "Category name is required."),
        custom(function = "not_blank", message = "Category name is required."),
        length(max = 255, message = "Category name cannot exceed 255 characters.")
    )]
    #[schema(example = "Technology")]
    pub name: Option<String>,
    /// Derived from the name when omitted
    #[validate(length(max = 255, message = "Slug cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(length(max = 255, message = "Image path cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[schema(value_type = Option<String>, format = "uuid")]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable_id")]
    pub parent_id: Option<Option<CategoryId>>,
    #[validate(range(min = 0, message = "Sort order must be at least 0."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[validate(length(max = 255, message = "Meta title cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[validate(length(max = 500, message = "Meta description cannot exceed 500 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

/// Request body for updating a category. Only provided fields change.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryUpdate {
    #[validate(
        custom(function = "not_blank", message = "Category name is required."),
        length(max = 255, message = "Category name cannot exceed 255 characters.")
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Slug cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[validate(length(max = 1000, message = "Description cannot exceed 1000 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(length(max = 255, message = "Image path cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Must not be the category itself
    #[schema(value_type = Option<String>, format = "uuid")]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "nullable_id")]
    pub parent_id: Option<Option<CategoryId>>,
    #[validate(range(min = 0, message = "Sort order must be at least 0."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[validate(length(max = 255, message = "Meta title cannot exceed 255 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[validate(length(max = 500, message = "Meta description cannot exceed 500 characters."))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryMeta {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Category as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryView {
    #[schema(value_type = String, format = "uuid")]
    pub id: CategoryId,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub parent_id: Option<CategoryId>,
    pub sort_order: i64,
    pub status: Status,
    pub status_label: String,
    pub meta: CategoryMeta,
    /// Only present on the category tree
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub children: Option<Vec<CategoryView>>,
    /// Only present where article counts were requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_count: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            status_label: category.status.label().to_string(),
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            image: category.image,
            parent_id: category.parent_id,
            sort_order: category.sort_order,
            status: category.status,
            meta: CategoryMeta {
                title: category.meta_title,
                description: category.meta_description,
            },
            children: None,
            news_count: None,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

impl From<CategoryBranch> for CategoryView {
    fn from(branch: CategoryBranch) -> Self {
        Self {
            children: Some(branch.children.into_iter().map(CategoryView::from).collect()),
            ..CategoryView::from(branch.category)
        }
    }
}

impl From<(Category, u64)> for CategoryView {
    fn from((category, news_count): (Category, u64)) -> Self {
        Self {
            news_count: Some(news_count),
            ..CategoryView::from(category)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::validation::validate_payload;
    use crate::db::models::now;
    use serde_json::json;
    use uuid::Uuid;

    fn category(name: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: Some(name.to_lowercase()),
            description: None,
            image: None,
            parent_id: None,
            sort_order: 0,
            status: Status::Active,
            meta_title: Some(name.into()),
            meta_description: None,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn test_create_rules() {
        let errors = validate_payload::<CategoryCreate>(json!({"sort_order": -1})).unwrap_err();
        assert_eq!(errors["name"], vec!["Category name is required.".to_string()]);
        assert_eq!(errors["sort_order"], vec!["Sort order must be at least 0.".to_string()]);

        let errors = validate_payload::<CategoryCreate>(json!({"name": "n".repeat(256)})).unwrap_err();
        assert_eq!(errors["name"], vec!["Category name cannot exceed 255 characters.".to_string()]);
        assert!(validate_payload::<CategoryCreate>(json!({"name": "Tech"})).is_ok());
    }

    #[test]
    fn test_tree_view_nests_children() {
        let branch = CategoryBranch {
            category: category("Tech"),
            children: vec![category("Rust")],
        };
        let view = CategoryView::from(branch);
        let children = view.children.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "Rust");
        assert!(children[0].children.is_none());
    }

    #[test]
    fn test_plain_view_omits_optional_sections() {
        let value = serde_json::to_value(CategoryView::from(category("Tech"))).unwrap();
        assert!(value.get("children").is_none());
        assert!(value.get("news_count").is_none());
        assert_eq!(value["meta"]["title"], "Tech");
        assert_eq!(value["status_label"], "Active");

        let value = serde_json::to_value(CategoryView::from((category("Tech"), 3))).unwrap();
        assert_eq!(value["news_count"], 3);
    }
}
