//! Trigger lifecycle commands: activate, deactivate, status.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use rowhook_core::lifecycle::{Activation, UnregisterOutcome};
use rowhook_types::event::EventKind;
use rowhook_types::subscription::SubscriptionState;

use crate::state::AppState;

/// Make sure the trigger's webhook exists, registering it if needed.
pub async fn activate(state: &AppState, name: &str, json: bool) -> Result<()> {
    let activation = state.activate(name).await?;
    let (trigger, _) = state.trigger(name)?;
    let requested: BTreeSet<EventKind> = trigger.events.iter().copied().collect();

    if json {
        let out = match &activation {
            Activation::AlreadyActive { subscription_id } => serde_json::json!({
                "trigger": name,
                "status": "already_active",
                "subscription_id": subscription_id,
            }),
            Activation::Registered(registration) => serde_json::json!({
                "trigger": name,
                "status": "registered",
                "subscription_id": registration.subscription_id,
                "granted_events": registration.granted_events,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    match activation {
        Activation::AlreadyActive { subscription_id } => {
            println!(
                "  {} Trigger '{}' already has webhook {}",
                style("✓").green().bold(),
                style(name).cyan(),
                style(subscription_id).bold()
            );
        }
        Activation::Registered(registration) => {
            println!(
                "  {} Registered webhook {} for '{}'",
                style("✓").green().bold(),
                style(&registration.subscription_id).bold(),
                style(name).cyan()
            );
            println!(
                "  {}",
                style(format!("Events: {}", join_events(&registration.granted_events))).dim()
            );
            if registration.granted_events != requested {
                println!(
                    "  {} The service granted a different event set than requested ({})",
                    style("!").yellow().bold(),
                    join_events(&requested)
                );
            }
        }
    }
    println!();

    Ok(())
}

/// Remove the trigger's webhook and clear its stored state.
pub async fn deactivate(state: &AppState, name: &str, json: bool) -> Result<()> {
    let (_, manager) = state.trigger(name)?;
    let outcome = manager
        .unregister()
        .await
        .with_context(|| format!("failed to deactivate trigger '{name}'"))?;

    if json {
        let status = match outcome {
            UnregisterOutcome::NotRegistered => "not_registered",
            UnregisterOutcome::Removed => "removed",
            UnregisterOutcome::AlreadyGone => "already_gone",
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "trigger": name,
                "status": status,
                "partial_failure": outcome.is_partial_failure(),
            }))?
        );
        return Ok(());
    }

    println!();
    match outcome {
        UnregisterOutcome::NotRegistered => println!(
            "  {} Trigger '{}' has no webhook registered",
            style("-").dim(),
            style(name).cyan()
        ),
        UnregisterOutcome::Removed => println!(
            "  {} Removed webhook for '{}'",
            style("✓").green().bold(),
            style(name).cyan()
        ),
        UnregisterOutcome::AlreadyGone => println!(
            "  {} Webhook for '{}' was already deleted on the service; local state cleared",
            style("!").yellow().bold(),
            style(name).cyan()
        ),
    }
    println!();

    Ok(())
}

/// Show stored subscription state, without contacting the service.
pub async fn status(state: &AppState, only: Option<&str>, json: bool) -> Result<()> {
    let names: Vec<&str> = match only {
        Some(name) => vec![state.trigger(name)?.0.name.as_str()],
        None => state.config.triggers.iter().map(|t| t.name.as_str()).collect(),
    };

    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        let (trigger, manager) = state.trigger(name)?;
        let subscription = manager.state().await?;
        rows.push((trigger, subscription));
    }

    if json {
        let out: Vec<_> = rows
            .iter()
            .map(|(trigger, subscription)| {
                serde_json::json!({
                    "trigger": trigger.name,
                    "database_id": trigger.database_id,
                    "table_id": trigger.table_id,
                    "requested_events": trigger.events,
                    "registered": subscription.is_registered(),
                    "subscription_id": subscription.subscription_id(),
                    "granted_events": subscription.granted_events(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!();
        println!("  No triggers configured.");
        println!(
            "  {}",
            style(format!(
                "Add [[triggers]] entries to {}",
                state.data_dir.join("config.toml").display()
            ))
            .dim()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Trigger").fg(Color::White),
        Cell::new("Table").fg(Color::White),
        Cell::new("Webhook").fg(Color::White),
        Cell::new("Events").fg(Color::White),
    ]);

    for (trigger, subscription) in &rows {
        let (webhook, events) = match subscription {
            SubscriptionState::Unregistered => (
                Cell::new("not registered").fg(Color::DarkGrey),
                Cell::new(join_events(&trigger.events)).fg(Color::DarkGrey),
            ),
            SubscriptionState::Registered {
                subscription_id,
                granted_events,
            } => (
                Cell::new(subscription_id).fg(Color::Green),
                Cell::new(join_events(granted_events)),
            ),
        };

        table.add_row(vec![
            Cell::new(&trigger.name).fg(Color::Cyan),
            Cell::new(format!("{}/{}", trigger.database_id, trigger.table_id)),
            webhook,
            events,
        ]);
    }

    println!("{table}");
    Ok(())
}

fn join_events<'a>(events: impl IntoIterator<Item = &'a EventKind>) -> String {
    events
        .into_iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_events_is_ordered() {
        let events: BTreeSet<EventKind> = [EventKind::RowsDeleted, EventKind::RowsCreated].into();
        assert_eq!(join_events(&events), "rows.created, rows.deleted");
        assert_eq!(join_events(&Vec::new()), "");
    }
}
