use crate::commands::Context;
use crate::errors::CliError;
use crate::println_pad;
use camino::Utf8Path;
use colored::Colorize;
use ezwow_core::{list_installed, InstalledSet, RECOMMENDED_ADDONS};
use miette::Result;

pub fn list_addons(ctx: &Context) -> Result<()> {
    let root = ctx.addons_folder()?;
    print_installed(ctx, &root)
}

/// Prints the addon folders under `root` with their provenance.
pub(crate) fn print_installed(ctx: &Context, root: &Utf8Path) -> Result<()> {
    let entries = list_installed(ctx.store(), root).map_err(CliError::from)?;

    println!();
    println_pad!(
        "{} {}",
        "📂 Installed addons in".bright_blue().bold(),
        root.as_str().bright_white()
    );

    if entries.is_empty() {
        println_pad!("   {}", "(none)".dimmed());
    }

    for entry in &entries {
        match &entry.record {
            Some(record) => println_pad!(
                "   {} {} {}",
                "•".bright_cyan(),
                entry.folder_name.bright_cyan().bold(),
                format!("({})", record.version).dimmed()
            ),
            None => println_pad!(
                "   {} {} {}",
                "•".dimmed(),
                entry.folder_name.bright_white(),
                "(unmanaged)".dimmed()
            ),
        }
    }

    let orphans = InstalledSet::new(ctx.store()).orphans(root);
    if !orphans.is_empty() {
        println_pad!(
            "\n{}",
            "⚠ Tracked but missing from disk:".bright_yellow().bold()
        );
        for name in orphans {
            println_pad!("   {} {}", "•".bright_yellow(), name);
        }
        println_pad!(
            "   {}",
            "Run 'ezwow remove <folder>' to forget them".dimmed()
        );
    }
    println!();

    Ok(())
}

/// Refreshes the installed list after a failed operation, then reports `err`.
pub(crate) fn fail_with_listing<T>(
    ctx: &Context,
    root: &Utf8Path,
    err: ezwow_core::Error,
) -> Result<T> {
    if let Err(e) = print_installed(ctx, root) {
        tracing::warn!("Could not list installed addons: {:?}", e);
    }
    Err(CliError::from(err).into())
}

pub fn list_recommended(ctx: &Context) -> Result<()> {
    let root = ctx.addons_folder().ok();

    println!();
    println_pad!("{}", "⭐ Recommended addons".bright_magenta().bold());
    for addon in RECOMMENDED_ADDONS {
        let status = match &root {
            Some(root) if addon.is_installed(root) => "Installed".bright_green(),
            Some(_) => "Not Installed".bright_yellow(),
            None => "Unknown".dimmed(),
        };
        println_pad!(
            "   {} {} {}",
            "•".bright_cyan(),
            format!("{:<16}", addon.name).bright_cyan().bold(),
            status
        );
    }
    println!();
    println_pad!(
        "{}",
        "Install one with 'ezwow install --recommended <name>'".dimmed()
    );

    Ok(())
}
