use std::collections::HashMap;

use crate::errors::{Result, RevisitError};
use crate::models::{Category, Pattern, ReviewBox};

/// Patterns, boxes and categories known to the client
///
/// Filled from the service and consulted by the placement gate. A lookup
/// miss means the referenced entity no longer exists (or was never loaded)
/// and surfaces as `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    patterns: HashMap<String, Pattern>,
    boxes: HashMap<String, ReviewBox>,
    categories: HashMap<String, Category>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every known pattern
    pub fn set_patterns(&mut self, patterns: Vec<Pattern>) {
        self.patterns = patterns.into_iter().map(|p| (p.id.clone(), p)).collect();
    }

    /// Replaces the boxes of one category, leaving other categories alone
    pub fn set_boxes(&mut self, category_id: &str, boxes: Vec<ReviewBox>) {
        self.boxes.retain(|_, b| b.category_id != category_id);
        self.boxes.extend(boxes.into_iter().map(|b| (b.id.clone(), b)));
    }

    /// Replaces every known category
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories.into_iter().map(|c| (c.id.clone(), c)).collect();
    }

    pub fn insert_pattern(&mut self, pattern: Pattern) {
        self.patterns.insert(pattern.id.clone(), pattern);
    }

    pub fn insert_box(&mut self, review_box: ReviewBox) {
        self.boxes.insert(review_box.id.clone(), review_box);
    }

    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.id.clone(), category);
    }

    pub fn pattern(&self, pattern_id: &str) -> Result<&Pattern> {
        self.patterns
            .get(pattern_id)
            .ok_or_else(|| RevisitError::NotFound(format!("pattern {}", pattern_id)))
    }

    pub fn review_box(&self, box_id: &str) -> Result<&ReviewBox> {
        self.boxes
            .get(box_id)
            .ok_or_else(|| RevisitError::NotFound(format!("box {}", box_id)))
    }

    pub fn category(&self, category_id: &str) -> Result<&Category> {
        self.categories
            .get(category_id)
            .ok_or_else(|| RevisitError::NotFound(format!("category {}", category_id)))
    }

    /// Patterns ordered by name
    pub fn patterns(&self) -> Vec<&Pattern> {
        let mut patterns: Vec<&Pattern> = self.patterns.values().collect();
        patterns.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        patterns
    }

    /// Boxes of one category ordered by name
    pub fn boxes_in(&self, category_id: &str) -> Vec<&ReviewBox> {
        let mut boxes: Vec<&ReviewBox> = self
            .boxes
            .values()
            .filter(|b| b.category_id == category_id)
            .collect();
        boxes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        boxes
    }

    /// Categories ordered by name
    pub fn categories(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.values().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        categories
    }
}
