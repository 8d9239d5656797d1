use crate::commands::list::{fail_with_listing, print_installed};
use crate::commands::Context;
use crate::println_pad;
use crate::utils::confirm_folder_action;
use colored::Colorize;
use ezwow_core::{uninstall, UninstallOutcome};
use miette::Result;

pub fn remove_addon(ctx: &Context, folder: &str, yes: bool) -> Result<()> {
    let root = ctx.addons_folder()?;

    let mut confirm = |name: &str| confirm_folder_action("Delete addon folder", name, yes);
    let outcome = match uninstall(ctx.store(), &root, folder, &mut confirm) {
        Ok(outcome) => outcome,
        Err(e) => return fail_with_listing(ctx, &root, e),
    };
    match outcome {
        UninstallOutcome::Removed => {
            println_pad!(
                "{} {}",
                "✓ Removed".bright_green().bold(),
                folder.bright_white().bold()
            );
        }
        UninstallOutcome::Cancelled => {
            println_pad!("{}", "Removal cancelled.".bright_yellow());
        }
    }

    print_installed(ctx, &root)
}
