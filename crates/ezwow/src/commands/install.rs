use crate::commands::list::{fail_with_listing, print_installed};
use crate::commands::Context;
use crate::errors::CliError;
use crate::println_pad;
use crate::utils::confirm_folder_action;
use colored::Colorize;
use ezwow_core::{find_recommended, AddonManager, InstallOutcome};
use miette::Result;

#[derive(Debug, Clone)]
pub struct InstallAddonArgs {
    pub reference: String,
    pub folder: Option<String>,
    pub yes: bool,
}

pub fn install_addon(ctx: &Context, args: InstallAddonArgs) -> Result<()> {
    let root = ctx.addons_folder()?;
    let (api, fetcher) = ctx.clients()?;
    let manager = AddonManager::new(&api, &fetcher);

    println_pad!(
        "{} {}",
        "⬇ Installing".bright_cyan().bold(),
        args.reference.trim().bright_white()
    );

    let mut confirm =
        |folder: &str| confirm_folder_action("Overwrite existing folder", folder, args.yes);
    let outcome = match manager.install(
        ctx.store(),
        &root,
        &args.reference,
        args.folder.as_deref(),
        &mut confirm,
    ) {
        Ok(outcome) => outcome,
        Err(e) => return fail_with_listing(ctx, &root, e),
    };

    match outcome {
        InstallOutcome::Installed(addon) => {
            println_pad!(
                "{} {} {}",
                "✓ Installed".bright_green().bold(),
                addon.folder_name.bright_white().bold(),
                format!("({})", addon.version).dimmed()
            );
            println_pad!("  {} {}", "Path:".bright_white(), addon.path);
        }
        InstallOutcome::Cancelled => {
            println_pad!("{}", "Installation cancelled.".bright_yellow());
        }
    }

    print_installed(ctx, &root)
}

pub fn install_recommended(
    ctx: &Context,
    name: &str,
    folder: Option<String>,
    yes: bool,
) -> Result<()> {
    let addon =
        find_recommended(name).ok_or_else(|| CliError::unknown_recommended(name.to_string()))?;

    install_addon(
        ctx,
        InstallAddonArgs {
            reference: addon.reference.to_string(),
            folder: folder.or_else(|| Some(addon.folder_name.to_string())),
            yes,
        },
    )
}
