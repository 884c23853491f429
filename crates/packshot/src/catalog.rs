// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog, selection, logo, and category command implementations.

use std::path::Path;

use colored::Colorize;
use packshot_core::PackshotError;
use packshot_core::types::{ItemStatus, WorkItem};
use packshot_studio::{ImportMode, ItemEdit, NewItem, ResetFilter, load_logo_file};

use crate::app::App;

fn io_error(e: std::io::Error) -> PackshotError {
    PackshotError::Storage { source: e.into() }
}

fn status_label(status: ItemStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        ItemStatus::Pending => label.normal(),
        ItemStatus::Generating => label.cyan(),
        ItemStatus::Completed => label.green(),
        ItemStatus::Failed => label.red(),
        ItemStatus::Skipped => label.dimmed(),
    }
}

pub async fn list(
    app: &App,
    category: Option<&str>,
    status: Option<ItemStatus>,
    json: bool,
) -> Result<(), PackshotError> {
    let items: Vec<WorkItem> = app
        .studio
        .read(|s| {
            s.items
                .iter()
                .filter(|i| category.is_none_or(|c| i.category == c))
                .filter(|i| status.is_none_or(|st| i.status == st))
                .map(|i| WorkItem {
                    result_image: None,
                    ..i.clone()
                })
                .collect()
        })
        .await;

    if json {
        let out = serde_json::to_string_pretty(&items)
            .map_err(|e| PackshotError::Internal(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    for item in &items {
        let mark = if item.selected { "*" } else { " " };
        println!(
            "{mark} {:<40} {:<10} {:<12} {}",
            item.id,
            item.category,
            status_label(item.status),
            item.name
        );
        if let Some(error) = &item.error {
            println!("    {}", error.red());
        }
    }
    println!("{} items", items.len());
    Ok(())
}

pub async fn stats(app: &App, json: bool) -> Result<(), PackshotError> {
    let stats = app.studio.read(|s| s.stats()).await;
    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| PackshotError::Internal(e.to_string()))?;
        println!("{out}");
    } else {
        println!("total:     {}", stats.total);
        println!("completed: {}", stats.completed.to_string().green());
        println!("pending:   {}", stats.pending);
        println!("failed:    {}", stats.failed.to_string().red());
        println!("selected:  {}", stats.selected);
    }
    Ok(())
}

pub async fn add(
    app: &App,
    prompt: String,
    name: Option<String>,
    category: Option<String>,
    logo_prompt: String,
) -> Result<(), PackshotError> {
    let id = app
        .studio
        .update(|s| {
            s.add_item(NewItem {
                category,
                name,
                prompt,
                logo_prompt,
                description: String::new(),
            })
        })
        .await?;
    println!("{} {id}", "added".green());
    Ok(())
}

pub async fn edit(app: &App, id: &str, edit: ItemEdit) -> Result<(), PackshotError> {
    app.studio.update(|s| s.update_item(id, edit)).await?;
    println!("{} {id}", "updated".green());
    Ok(())
}

pub async fn remove(app: &App, id: &str) -> Result<(), PackshotError> {
    let removed = app.studio.update(|s| s.remove_item(id)).await?;
    println!("{} {} ({})", "removed".yellow(), removed.id, removed.name);
    Ok(())
}

/// What `packshot select` does to the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectMode {
    /// Select the listed ids, leaving others as they are.
    Set(Vec<String>),
    /// Flip each listed id.
    Toggle(Vec<String>),
    /// Select or deselect every item, optionally within one category.
    ToggleAll(Option<String>),
    Clear,
}

pub async fn select(app: &App, mode: SelectMode) -> Result<(), PackshotError> {
    let selected = app
        .studio
        .update(|s| {
            match &mode {
                SelectMode::Set(ids) => {
                    s.select(ids)?;
                }
                SelectMode::Toggle(ids) => {
                    if let Some(missing) = ids.iter().find(|id| s.item(id).is_none()) {
                        return Err(PackshotError::NotFound {
                            kind: "work item",
                            id: missing.clone(),
                        });
                    }
                    for id in ids {
                        s.toggle_selected(id)?;
                    }
                }
                SelectMode::ToggleAll(category) => {
                    s.toggle_select_all(category.as_deref());
                }
                SelectMode::Clear => s.clear_selection(),
            }
            Ok(s.stats().selected)
        })
        .await?;
    println!("{selected} selected");
    Ok(())
}

pub async fn mark(app: &App, id: &str, status: ItemStatus) -> Result<(), PackshotError> {
    app.studio.update(|s| s.set_status(id, status)).await?;
    println!("{id} -> {}", status_label(status));
    Ok(())
}

pub async fn reset(app: &App, filter: ResetFilter) -> Result<(), PackshotError> {
    let count = app.studio.update(|s| Ok(s.reset_items(filter))).await?;
    println!("{count} items reset to pending");
    Ok(())
}

pub async fn logo_prompt(app: &App, category: &str, prompt: &str) -> Result<(), PackshotError> {
    let count = app
        .studio
        .update(|s| Ok(s.apply_logo_prompt(category, prompt)))
        .await?;
    println!("updated {count} items in {category}");
    Ok(())
}

pub async fn import(app: &App, file: &Path, overwrite: bool) -> Result<(), PackshotError> {
    let json = tokio::fs::read_to_string(file).await.map_err(io_error)?;
    let mode = if overwrite {
        ImportMode::Overwrite
    } else {
        ImportMode::Append
    };
    let count = app.studio.update(|s| s.import_items(&json, mode)).await?;
    println!("{} {count} items ({mode})", "imported".green());
    Ok(())
}

pub async fn export(app: &App, file: &Path) -> Result<(), PackshotError> {
    let json = app.studio.read(|s| s.export_items()).await?;
    tokio::fs::write(file, json).await.map_err(io_error)?;
    println!("{} {}", "exported".green(), file.display());
    Ok(())
}

pub async fn download(app: &App, dir: &Path) -> Result<(), PackshotError> {
    let written = app.studio.download_selected(dir).await?;
    if written.is_empty() {
        println!("no selected, completed items to download");
    }
    for path in &written {
        println!("{} {}", "wrote".green(), path.display());
    }
    Ok(())
}

pub async fn logo_add(app: &App, file: &Path) -> Result<(), PackshotError> {
    let logo = load_logo_file(file).await?;
    app.studio
        .update(|s| {
            s.add_logo(logo);
            Ok(())
        })
        .await?;
    println!("{} {}", "active logo".green(), file.display());
    Ok(())
}

pub async fn logo_list(app: &App) -> Result<(), PackshotError> {
    let (library, active) = app
        .studio
        .read(|s| (s.logo_library.clone(), s.active_logo.clone()))
        .await;
    for (index, logo) in library.iter().enumerate() {
        let mark = if active.as_ref() == Some(logo) { "*" } else { " " };
        let size = logo.to_bytes().map(|b| b.len()).unwrap_or(0);
        println!("{mark} {index:>2} {} {size} bytes", logo.mime_type());
    }
    println!("{} logos", library.len());
    Ok(())
}

pub async fn logo_use(app: &App, index: usize) -> Result<(), PackshotError> {
    app.studio
        .update(|s| {
            if s.select_logo(index) {
                Ok(())
            } else {
                Err(logo_not_found(index))
            }
        })
        .await?;
    println!("logo {index} active");
    Ok(())
}

pub async fn logo_remove(app: &App, index: usize) -> Result<(), PackshotError> {
    app.studio
        .update(|s| s.remove_logo(index).ok_or_else(|| logo_not_found(index)))
        .await?;
    println!("logo {index} removed");
    Ok(())
}

fn logo_not_found(index: usize) -> PackshotError {
    PackshotError::NotFound {
        kind: "logo",
        id: index.to_string(),
    }
}

pub async fn category_list(app: &App) -> Result<(), PackshotError> {
    let rows = app
        .studio
        .read(|s| {
            s.categories
                .iter()
                .map(|c| {
                    let count = s.items.iter().filter(|i| i.category == c.id).count();
                    (c.clone(), count)
                })
                .collect::<Vec<_>>()
        })
        .await;
    for (category, count) in rows {
        println!(
            "{:<16} {:<20} {} {count} items",
            category.id, category.name, category.color
        );
    }
    Ok(())
}

pub async fn category_add(app: &App, name: &str, color: &str) -> Result<(), PackshotError> {
    let id = app.studio.update(|s| s.add_category(name, color)).await?;
    println!("{} {id}", "added category".green());
    Ok(())
}

pub async fn category_update(
    app: &App,
    id: &str,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<(), PackshotError> {
    app.studio
        .update(|s| s.update_category(id, name, color))
        .await?;
    println!("updated category {id}");
    Ok(())
}

pub async fn category_delete(app: &App, id: &str) -> Result<(), PackshotError> {
    let moved = app.studio.update(|s| s.delete_category(id)).await?;
    println!("{} {id} ({moved} items reassigned)", "deleted category".yellow());
    Ok(())
}

pub async fn clear(app: &App, yes: bool) -> Result<(), PackshotError> {
    if !yes {
        eprintln!("this deletes every item, image, and logo; rerun with --yes to confirm");
        return Ok(());
    }
    app.studio.clear_all().await?;
    println!("{}", "all data cleared".red());
    Ok(())
}
