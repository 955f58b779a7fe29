use rollup::RecordKind;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Offered for a kind until at least one category of that kind is stored.
pub const DEFAULT_SALE_CATEGORIES: &[&str] = &["Retail", "Services"];
pub const DEFAULT_EXPENSE_CATEGORIES: &[&str] = &["Food", "Beverage", "Supplies", "Rent", "Misc"];

pub fn default_categories(kind: RecordKind) -> &'static [&'static str] {
    match kind {
        RecordKind::Sale => DEFAULT_SALE_CATEGORIES,
        RecordKind::Expense => DEFAULT_EXPENSE_CATEGORIES,
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: RecordKind,
    pub created_at: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateCategoryRequest {
    name: String,
    kind: RecordKind,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RawCreateCategoryRequest {
    #[validate(length(max = 64, message = "Category name is too long"))]
    pub name: String,
    pub kind: RecordKind,
}

impl CreateCategoryRequest {
    pub fn new(name: String, kind: RecordKind) -> Result<Self, String> {
        if name.trim().is_empty() {
            return Err("Category name cannot be empty".to_string());
        }

        Ok(Self {
            name: name.trim().to_string(),
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }
}

/// Names a line item may pick from, and whether they are the built-in defaults.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOptions {
    pub kind: RecordKind,
    pub names: Vec<String>,
    pub is_default: bool,
}
