//! Category registry and per-category open-task counts.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::Task;

pub const DEFAULT_COLOR: &str = "#8B85F0";
pub const DEFAULT_ICON: &str = "Folder";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl Category {
    fn new(id: &str, name: &str, color: &str, icon: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// A category decorated with its number of open tasks.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    #[serde(flatten)]
    pub category: Category,
    pub task_count: usize,
}

/// Decorate every category with the number of tasks in it that are neither
/// archived nor completed. Tasks pointing at unknown categories are ignored.
pub fn counts(categories: &[Category], tasks: &[Task]) -> Vec<CategoryCount> {
    categories
        .iter()
        .map(|category| CategoryCount {
            category: category.clone(),
            task_count: tasks
                .iter()
                .filter(|task| task.category_id == category.id && task.is_open())
                .count(),
        })
        .collect()
}

/// Total for the "All Tasks" entry: the sum over the real categories.
pub fn all_tasks_count(counts: &[CategoryCount]) -> usize {
    counts.iter().map(|entry| entry.task_count).sum()
}

/// Fields accepted when adding a category.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Flat lookup of categories, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self {
            categories: vec![
                Category::new("work", "Work", "#5B4CDB", "Briefcase"),
                Category::new("personal", "Personal", "#10B981", "User"),
                Category::new("health", "Health", "#EF4444", "Heart"),
                Category::new("learning", "Learning", "#F59E0B", "BookOpen"),
                Category::new("shopping", "Shopping", "#3B82F6", "ShoppingCart"),
            ],
        }
    }
}

impl CategoryRegistry {
    pub fn from_categories(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn contains(&self, id: &str) -> bool {
        self.categories.iter().any(|category| category.id == id)
    }

    pub fn get(&self, id: &str) -> Result<Category> {
        self.categories
            .iter()
            .find(|category| category.id == id)
            .cloned()
            .ok_or_else(|| Error::CategoryNotFound(id.to_string()))
    }

    /// Add a category. Without an explicit id, the id is derived from the name.
    pub fn create(&mut self, fields: NewCategory) -> Result<Category> {
        let name = fields.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("category name cannot be empty".to_string()));
        }
        let id = match fields.id.as_deref() {
            Some(id) => slugify(id),
            None => slugify(name),
        };
        if id.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "cannot derive a category id from '{name}'"
            )));
        }
        if self.contains(&id) {
            return Err(Error::InvalidArgument(format!("category '{id}' already exists")));
        }

        let category = Category {
            id,
            name: name.to_string(),
            color: fields.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            icon: fields.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        };
        self.categories.push(category.clone());
        Ok(category)
    }

    pub fn update(&mut self, id: &str, patch: CategoryPatch) -> Result<Category> {
        let category = self
            .categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or_else(|| Error::CategoryNotFound(id.to_string()))?;
        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(color) = patch.color {
            category.color = color;
        }
        if let Some(icon) = patch.icon {
            category.icon = icon;
        }
        Ok(category.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<Category> {
        let index = self
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| Error::CategoryNotFound(id.to_string()))?;
        Ok(self.categories.remove(index))
    }
}

fn slugify(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
