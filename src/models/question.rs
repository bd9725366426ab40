//! Canonical question records.

use serde::{Deserialize, Serialize};

/// A normalized question from the catalog feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    pub text: String,

    pub category: Option<String>,

    pub options: Vec<String>,

    /// Index into `options`, when the backend reported it numerically.
    pub correct_index: Option<usize>,

    pub image: Option<String>,
}

impl Question {
    /// Category for display, with the product's placeholder for missing data.
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or("—")
    }
}
