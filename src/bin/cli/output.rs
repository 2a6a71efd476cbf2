use clap::ValueEnum;
use revisit::dto::TodaysReviews;
use revisit::models::{Category, Item, Pattern, ReviewBox};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// Prints a list of patterns in the specified format
pub fn print_patterns(patterns: &[Pattern], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if patterns.is_empty() {
                if !config.quiet {
                    println!("No patterns found.");
                }
                return;
            }
            if config.quiet {
                for pattern in patterns {
                    println!("{}", pattern.id);
                }
                return;
            }
            let max_id = patterns.iter().map(|p| p.id.len()).max().unwrap_or(2);
            let max_name = patterns.iter().map(|p| p.name.len()).max().unwrap_or(4).max(4);
            println!("{:<id_w$}  {:<name_w$}  INTERVALS", "ID", "NAME", id_w = max_id, name_w = max_name);
            for pattern in patterns {
                let intervals: Vec<String> = pattern.intervals().iter().map(u32::to_string).collect();
                println!(
                    "{:<id_w$}  {:<name_w$}  [{}]",
                    pattern.id,
                    pattern.name,
                    intervals.join(", "),
                    id_w = max_id,
                    name_w = max_name,
                );
            }
        }
        OutputFormat::Json => print_json(patterns),
    }
}

/// Prints a list of categories in the specified format
pub fn print_categories(categories: &[Category], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if categories.is_empty() {
                if !config.quiet {
                    println!("No categories found.");
                }
                return;
            }
            if config.quiet {
                for category in categories {
                    println!("{}", category.id);
                }
                return;
            }
            let max_id = categories.iter().map(|c| c.id.len()).max().unwrap_or(2);
            println!("{:<width$}  NAME", "ID", width = max_id);
            for category in categories {
                println!("{:<width$}  {}", category.id, category.name, width = max_id);
            }
        }
        OutputFormat::Json => print_json(categories),
    }
}

/// Prints a list of boxes in the specified format
pub fn print_boxes(boxes: &[ReviewBox], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if boxes.is_empty() {
                if !config.quiet {
                    println!("No boxes found.");
                }
                return;
            }
            if config.quiet {
                for review_box in boxes {
                    println!("{}", review_box.id);
                }
                return;
            }
            let max_id = boxes.iter().map(|b| b.id.len()).max().unwrap_or(2);
            let max_name = boxes.iter().map(|b| b.name.len()).max().unwrap_or(4).max(4);
            println!("{:<id_w$}  {:<name_w$}  PATTERN", "ID", "NAME", id_w = max_id, name_w = max_name);
            for review_box in boxes {
                println!(
                    "{:<id_w$}  {:<name_w$}  {}",
                    review_box.id,
                    review_box.name,
                    review_box.pattern_id.as_deref().unwrap_or("-"),
                    id_w = max_id,
                    name_w = max_name,
                );
            }
        }
        OutputFormat::Json => print_json(boxes),
    }
}

/// Prints a list of items in the specified format
pub fn print_items(items: &[Item], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if items.is_empty() {
                if !config.quiet {
                    println!("No items found.");
                }
                return;
            }
            if config.quiet {
                for item in items {
                    println!("{}", item.id);
                }
                return;
            }
            let max_id = items.iter().map(|i| i.id.len()).max().unwrap_or(2);
            let max_name = items.iter().map(|i| i.name.len()).max().unwrap_or(4).max(4);
            println!(
                "{:<id_w$}  {:<name_w$}  DONE  NEXT",
                "ID",
                "NAME",
                id_w = max_id,
                name_w = max_name,
            );
            for item in items {
                let next = item
                    .next_review()
                    .map(|rd| rd.scheduled_date.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<id_w$}  {:<name_w$}  {}/{:<2}  {}",
                    item.id,
                    item.name,
                    item.completed_count(),
                    item.review_dates.len(),
                    next,
                    id_w = max_id,
                    name_w = max_name,
                );
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Prints a single item with its schedule in the specified format
pub fn print_item(item: &Item, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", item.id);
                return;
            }
            println!("ID:       {}", item.id);
            println!("Name:     {}", item.name);
            if let Some(detail) = &item.detail {
                println!("Detail:   {}", detail);
            }
            println!("Location: {}", item.location());
            println!("Pattern:  {}", item.pattern_id.as_deref().unwrap_or("-"));
            println!("Learned:  {}", item.learned_date);
            if item.is_finished {
                println!("Finished");
            }
            for rd in item.sorted_review_dates() {
                println!(
                    "  {:>2}. {}  [{}]  {}",
                    rd.step_number,
                    rd.scheduled_date,
                    if rd.is_completed { "x" } else { " " },
                    rd.id
                );
            }
        }
        OutputFormat::Json => print_json(item),
    }
}

/// Prints today's reviews grouped by location
pub fn print_todays_reviews(reviews: &TodaysReviews, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", reviews.total());
                return;
            }
            if reviews.groups.is_empty() {
                println!("Nothing to review today.");
                return;
            }
            for group in &reviews.groups {
                println!("{}:", group.location());
                for review in &group.reviews {
                    println!(
                        "  {}  step {}  {}  ({} / {})",
                        review.review_date.scheduled_date,
                        review.review_date.step_number,
                        review.item_name,
                        review.item_id,
                        review.review_date.id
                    );
                }
            }
        }
        OutputFormat::Json => print_json(reviews),
    }
}

/// Prints a success message in the specified format
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => {
            print_json(&serde_json::json!({"status": "ok", "message": message}));
        }
    }
}
