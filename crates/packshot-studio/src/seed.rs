// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default categories and the seeded work item catalog.

use packshot_core::types::{Category, WorkItem};

/// Logo-integration fragment given to every seeded item.
pub const DEFAULT_LOGO_PROMPT: &str = "Place for a restaurant brand logo on the packaging.";

/// (id, display name, color, seeded item count)
const DEFAULT_CATEGORIES: [(&str, &str, &str, usize); 5] = [
    ("pizza", "Pizza", "#e74c3c", 30),
    ("burger", "Burger", "#d35400", 23),
    ("shawarma", "Shawarma", "#f39c12", 24),
    ("chicken", "Chicken", "#27ae60", 23),
    ("desserts", "Desserts", "#9b59b6", 28),
];

pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(id, name, color, _)| Category::new(*id, *name, *color))
        .collect()
}

/// Builds the seeded catalog: `<category>-NNN` ids in category order.
pub fn seed_items() -> Vec<WorkItem> {
    let mut items = Vec::new();
    for (id, name, _, count) in DEFAULT_CATEGORIES {
        for n in 1..=count {
            let mut item = WorkItem::new(
                format!("{id}-{n:03}"),
                id,
                format!("{name} design #{n}"),
                format!(
                    "High-quality, professional food mockup of a {id} dish, studio lighting, \
                     commercial photography style, clean background, photorealistic 8k."
                ),
            )
            .with_logo_prompt(DEFAULT_LOGO_PROMPT);
            item.description = format!("Professional packaging design for the {name} range");
            items.push(item);
        }
    }
    items
}
