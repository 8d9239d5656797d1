use camino::Utf8PathBuf;
use clap::builder::{styling::AnsiColor, Styles};
use clap::ColorChoice;
use clap::{ArgAction, CommandFactory, FromArgMatches, Parser, Subcommand};
use commands::{
    auto_detect_addons_folder, check_addons, install_addon, install_recommended, list_addons,
    list_recommended, remove_addon, reset_config, set_addons_folder, show_config, update_addons,
    Context, InstallAddonArgs,
};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod errors;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the config file (defaults to ezwow_config.json next to the executable)
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    /// AddOns folder to use instead of the configured one
    #[arg(long, global = true)]
    addons_folder: Option<Utf8PathBuf>,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install an addon from a GitHub repository or .zip URL
    Install {
        /// GitHub repository URL, `/tree/<branch>` URL or direct .zip link
        #[arg(required_unless_present = "recommended", conflicts_with = "recommended")]
        reference: Option<String>,

        /// Install one of the recommended addons by name
        #[arg(short, long)]
        recommended: Option<String>,

        /// Folder name inside AddOns (defaults to the project name)
        #[arg(short, long)]
        folder: Option<String>,

        /// Overwrite an existing folder without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Update one addon, or every managed addon when no folder is given
    Update {
        /// Folder name of the addon to update
        folder: Option<String>,

        /// Overwrite existing folders without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// Check managed addons for updates without installing anything
    Check {
        /// Folder name of the addon to check
        folder: Option<String>,
    },
    /// Delete an addon folder
    Remove {
        /// Folder name of the addon to remove
        folder: String,

        /// Delete without asking
        #[arg(short, long)]
        yes: bool,
    },
    /// List addon folders in the AddOns folder
    List,
    /// Show the recommended addons and whether they are installed
    Recommended,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Set the Turtle WoW AddOns folder
    SetAddonsFolder {
        /// Path to `<Turtle WoW>/Interface/AddOns`
        path: Utf8PathBuf,
    },
    /// Search common install locations for the AddOns folder
    AutoDetect,
    /// Reset configuration to defaults
    Reset,
}

fn parse_args() -> Args {
    // Configure colored/styled help output
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default())
        .placeholder(AnsiColor::Blue.on_default());

    let matches = Args::command()
        .styles(styles)
        .color(ColorChoice::Auto)
        .get_matches();

    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "ezwow=warn,ezwow_core=warn",
        1 => "ezwow=info,ezwow_core=info",
        _ => "ezwow=debug,ezwow_core=debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = parse_args();
    init_logging(args.verbose);

    let ctx = Context::new(args.config, args.addons_folder);

    match args.command {
        Commands::Install {
            reference,
            recommended,
            folder,
            yes,
        } => match recommended {
            Some(name) => install_recommended(&ctx, &name, folder, yes),
            None => install_addon(
                &ctx,
                InstallAddonArgs {
                    reference: reference.unwrap_or_default(),
                    folder,
                    yes,
                },
            ),
        },
        Commands::Update { folder, yes } => update_addons(&ctx, folder, yes),
        Commands::Check { folder } => check_addons(&ctx, folder),
        Commands::Remove { folder, yes } => remove_addon(&ctx, &folder, yes),
        Commands::List => list_addons(&ctx),
        Commands::Recommended => list_recommended(&ctx),
        Commands::Config { command } => match command {
            ConfigCommands::Show => show_config(&ctx),
            ConfigCommands::SetAddonsFolder { path } => set_addons_folder(&ctx, path),
            ConfigCommands::AutoDetect => auto_detect_addons_folder(&ctx),
            ConfigCommands::Reset => reset_config(&ctx),
        },
    }
}
