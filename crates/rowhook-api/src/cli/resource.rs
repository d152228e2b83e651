//! Option lookups: databases and tables visible to the configured account.

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use rowhook_core::remote::ResourceLoader;
use rowhook_types::subscription::ResourceOption;

use crate::state::AppState;

pub async fn databases(state: &AppState, json: bool) -> Result<()> {
    let options = state
        .client
        .list_databases()
        .await
        .context("failed to list databases")?;
    print_options(&options, "databases", json)
}

pub async fn tables(state: &AppState, database_id: &str, json: bool) -> Result<()> {
    let options = state
        .client
        .list_tables(database_id)
        .await
        .with_context(|| format!("failed to list tables of database {database_id}"))?;
    print_options(&options, "tables", json)
}

fn print_options(options: &[ResourceOption], noun: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(options)?);
        return Ok(());
    }

    if options.is_empty() {
        println!();
        println!("  No {noun} found.");
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);
    for option in options {
        table.add_row(vec![
            Cell::new(&option.name).fg(Color::Cyan),
            Cell::new(&option.value).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    println!(
        "  {}",
        style(format!("{} {noun}", options.len())).dim()
    );
    Ok(())
}
