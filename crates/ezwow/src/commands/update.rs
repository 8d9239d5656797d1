use crate::commands::list::{fail_with_listing, print_installed};
use crate::commands::Context;
use crate::errors::CliError;
use crate::println_pad;
use crate::utils::{confirm_folder_action, print_ansi_boxed_lines};
use camino::Utf8Path;
use colored::Colorize;
use ezwow_core::{AddonManager, InstalledSet, UpdateOutcome, UpdateStatus};
use miette::Result;

/// Folder names with a record and a directory under `root`.
fn managed_folders(ctx: &Context, root: &Utf8Path) -> Vec<String> {
    InstalledSet::new(ctx.store())
        .records()
        .into_keys()
        .filter(|name| root.join(name).is_dir())
        .collect()
}

pub fn update_addons(ctx: &Context, folder: Option<String>, yes: bool) -> Result<()> {
    let root = ctx.addons_folder()?;
    let (api, fetcher) = ctx.clients()?;
    let manager = AddonManager::new(&api, &fetcher);

    let mut confirm = |name: &str| confirm_folder_action("Overwrite existing folder", name, yes);

    if let Some(folder) = folder {
        let outcome = match manager.update(ctx.store(), &root, &folder, &mut confirm) {
            Ok(outcome) => outcome,
            Err(e) => return fail_with_listing(ctx, &root, e),
        };
        print_update_outcome(&folder, &outcome);
        return print_installed(ctx, &root);
    }

    let folders = managed_folders(ctx, &root);
    if folders.is_empty() {
        println_pad!("{}", "No managed addons to update.".bright_yellow());
        return Ok(());
    }

    let mut updated = 0;
    let mut failed = Vec::new();
    for folder in &folders {
        match manager.update(ctx.store(), &root, folder, &mut confirm) {
            Ok(outcome) => {
                if matches!(outcome, UpdateOutcome::Updated { .. }) {
                    updated += 1;
                }
                print_update_outcome(folder, &outcome);
            }
            Err(e) => {
                tracing::warn!("Updating {} failed: {}", folder, e);
                println_pad!(
                    "{} {} {}",
                    "✗".bright_red().bold(),
                    folder.bright_white().bold(),
                    e.to_string().bright_red()
                );
                failed.push(folder.clone());
            }
        }
    }

    println!();
    let mut summary = vec![format!(
        "{} {} of {} addons",
        "Updated".bright_green().bold(),
        updated.to_string().bright_white().bold(),
        folders.len()
    )];
    if !failed.is_empty() {
        summary.push(format!(
            "{} {}",
            "Failed:".bright_red().bold(),
            failed.join(", ")
        ));
    }
    print_ansi_boxed_lines(&summary);

    print_installed(ctx, &root)?;

    if failed.is_empty() {
        Ok(())
    } else {
        Err(miette::miette!("{} addon(s) failed to update", failed.len()))
    }
}

fn print_update_outcome(folder: &str, outcome: &UpdateOutcome) {
    match outcome {
        UpdateOutcome::UpToDate => println_pad!(
            "{} {} {}",
            "✓".bright_green(),
            folder.bright_white().bold(),
            "is up to date".dimmed()
        ),
        UpdateOutcome::Updated { status, addon } => {
            let reason = match status {
                UpdateStatus::Unknown => "version unknown, reinstalled".to_string(),
                status => status.to_string(),
            };
            println_pad!(
                "{} {} {} {}",
                "⬆ Updated".bright_green().bold(),
                folder.bright_white().bold(),
                format!("to {}", addon.version).bright_cyan(),
                format!("({})", reason).dimmed()
            );
        }
        UpdateOutcome::Cancelled => println_pad!(
            "{} {}",
            "Skipped".bright_yellow(),
            folder.bright_white().bold()
        ),
    }
}

pub fn check_addons(ctx: &Context, folder: Option<String>) -> Result<()> {
    let root = ctx.addons_folder()?;
    let (api, fetcher) = ctx.clients()?;
    let manager = AddonManager::new(&api, &fetcher);

    let folders = match folder {
        Some(folder) => vec![folder],
        None => managed_folders(ctx, &root),
    };
    if folders.is_empty() {
        println_pad!("{}", "No managed addons to check.".bright_yellow());
        return Ok(());
    }

    let mut available = Vec::new();
    for folder in &folders {
        let status = manager
            .check(ctx.store(), &root, folder)
            .map_err(CliError::from)?;
        let label = match &status {
            UpdateStatus::UpToDate => status.to_string().bright_green(),
            UpdateStatus::UpdateAvailable(_) => status.to_string().bright_yellow().bold(),
            UpdateStatus::Unknown => status.to_string().dimmed(),
        };
        println_pad!("   {} {} {}", "•".bright_cyan(), folder.bright_white().bold(), label);
        if status.needs_reinstall() {
            available.push(folder.clone());
        }
    }

    println!();
    if available.is_empty() {
        println_pad!("{}", "✓ Everything is up to date".bright_green().bold());
    } else {
        print_ansi_boxed_lines(&[
            format!(
                "{} {}",
                "ℹ Updates available or unknown:".bright_yellow().bold(),
                available.join(", ").bright_white()
            ),
            format!(
                "{} {}",
                "Run".bright_cyan(),
                "ezwow update".bright_white().bold()
            ),
        ]);
    }

    Ok(())
}
