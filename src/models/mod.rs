/// Data models module
///
/// This module defines the value types shared by the scheduling logic, the
/// caches and the service layer: patterns and their steps, items and their
/// review dates, boxes and categories.

mod pattern;
pub use pattern::{validate_steps, Pattern, Step, TargetWeight};

mod review_date;
pub use review_date::ReviewDate;

mod item;
pub use item::Item;

mod review_box;
pub use review_box::ReviewBox;

mod category;
pub use category::Category;
