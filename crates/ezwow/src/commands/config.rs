use crate::commands::Context;
use crate::errors::CliError;
use crate::println_pad;
use camino::{Utf8Path, Utf8PathBuf};
use colored::Colorize;
use ezwow_core::{is_valid_addons_folder, load_or_default, AppConfig, ConfigStore};
use miette::Result;

fn update_addons_folder_in_config(ctx: &Context, path: Option<Utf8PathBuf>) -> Result<()> {
    let mut cfg = load_or_default(ctx.store());
    cfg.addons_folder = path;
    ctx.store().save(&cfg).map_err(CliError::from)?;
    Ok(())
}

/// Print a config path entry with status indicator
fn print_path_config(name: &str, path: Option<&Utf8Path>) {
    match path {
        Some(p) => {
            let status = if is_valid_addons_folder(p) {
                "✓".bright_green()
            } else {
                "✗".bright_red()
            };
            println!("  {} {} {}", format!("{}:", name).bright_white(), p, status);
        }
        None => {
            println!(
                "  {} {}",
                format!("{}:", name).bright_white(),
                "(not set)".bright_yellow()
            );
        }
    }
}

pub fn show_config(ctx: &Context) -> Result<()> {
    let cfg = load_or_default(ctx.store());

    println!();
    println!("  {} {}", "config_file:".bright_white(), ctx.config_path());
    print_path_config("addons_folder", cfg.addons_folder.as_deref());
    println!(
        "  {} {}",
        "managed_addons:".bright_white(),
        cfg.installed.len()
    );
    println!();
    Ok(())
}

pub fn set_addons_folder(ctx: &Context, path: Utf8PathBuf) -> Result<()> {
    if !is_valid_addons_folder(&path) {
        eprintln!(
            "  {}",
            "The path must be an existing folder, usually '<Turtle WoW>/Interface/AddOns'."
                .bright_yellow()
        );
        return Err(CliError::AddonsFolderMissing { path }.into());
    }

    update_addons_folder_in_config(ctx, Some(path.clone()))?;

    println!("{}", "✓ AddOns folder set successfully!".bright_green().bold());
    println!();
    println!(
        "  {} {}",
        "Path:".bright_white().bold(),
        path.as_str().bright_green()
    );

    Ok(())
}

pub fn auto_detect_addons_folder(ctx: &Context) -> Result<()> {
    println!(
        "{}",
        "Searching for the Turtle WoW AddOns folder...".bright_cyan()
    );
    println!();

    match ezwow_core::auto_detect_addons_folder() {
        Some(detected_path) => {
            println!("{}", "✓ Found Turtle WoW!".bright_green().bold());
            println!();
            println!(
                "  {} {}",
                "Path:".bright_white().bold(),
                detected_path.as_str().bright_green()
            );
            println!();

            update_addons_folder_in_config(ctx, Some(detected_path))?;

            println!(
                "{}",
                "✓ Configuration updated successfully!"
                    .bright_green()
                    .bold()
            );
        }
        None => {
            println!(
                "{}",
                "✗ Could not automatically detect the AddOns folder"
                    .bright_red()
                    .bold()
            );
            println!();
            println!(
                "  {} Use 'ezwow config set-addons-folder <path>' to set the path manually",
                "•".bright_cyan()
            );
            println!(
                "  {} The path should point to: ...{}Interface{}AddOns",
                "•".bright_cyan(),
                std::path::MAIN_SEPARATOR,
                std::path::MAIN_SEPARATOR
            );
        }
    }

    Ok(())
}

/// Clears the AddOns folder setting. Provenance records are kept so managed
/// addons stay updatable.
pub fn reset_config(ctx: &Context) -> Result<()> {
    let cfg = load_or_default(ctx.store());
    let reset = AppConfig {
        installed: cfg.installed,
        ..AppConfig::default()
    };
    ctx.store().save(&reset).map_err(CliError::from)?;

    println!(
        "{}",
        "✓ Configuration reset to defaults".bright_green().bold()
    );
    println!();
    println!("  {} {}", "Config file:".bright_white().bold(), ctx.config_path());
    println!();
    println!(
        "  {}",
        "Run 'ezwow config auto-detect' to find your AddOns folder".bright_cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezwow_core::{InstalledSet, VersionMarker};
    use tempfile::tempdir;

    fn context(dir: &tempfile::TempDir) -> (Context, Utf8PathBuf) {
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (Context::new(Some(root.join("ezwow_config.json")), None), root)
    }

    #[test]
    fn test_set_addons_folder_requires_existing_dir() {
        let temp = tempdir().unwrap();
        let (ctx, root) = context(&temp);

        assert!(set_addons_folder(&ctx, root.join("missing")).is_err());
        assert_eq!(load_or_default(ctx.store()).addons_folder, None);

        set_addons_folder(&ctx, root.clone()).unwrap();
        assert_eq!(load_or_default(ctx.store()).addons_folder, Some(root));
    }

    #[test]
    fn test_reset_keeps_installed_records() {
        let temp = tempdir().unwrap();
        let (ctx, root) = context(&temp);
        set_addons_folder(&ctx, root).unwrap();
        InstalledSet::new(ctx.store())
            .record("pfQuest", "https://github.com/shagu/pfQuest", VersionMarker::Untracked)
            .unwrap();

        reset_config(&ctx).unwrap();

        let cfg = load_or_default(ctx.store());
        assert_eq!(cfg.addons_folder, None);
        assert!(cfg.installed.contains_key("pfQuest"));
    }
}
