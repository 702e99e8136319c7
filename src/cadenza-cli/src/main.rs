mod dispatch;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use cadenza_audio::NullAudioEngine;
use cadenza_core::{env_or, init_logging, AppDirs, CommandHelp, Config};
use cadenza_player::Session;
use cadenza_plugin::{CommandOutcome, PlayArgs, PlayRequest, PluginRegistry};
use cadenza_ui::{
    clear_screen, now_playing_line, read_nav_input, render_page, HelpMenu, PageEvent,
    PaginationSession,
};
use clap::Parser;
use local_provider::{LocalPlugin, LocalPluginOptions};

use crate::dispatch::{route, Builtin, Dispatch, PluginCommand};

/// Environment override for the local provider's command alias, consulted
/// when the config file does not set one.
const LOCAL_ALIAS_ENV: &str = "CADENZA_LOCAL_ALIAS";

/// Terminal media player with pluggable playback providers.
#[derive(Parser, Debug)]
#[command(name = "cadenza", version, about)]
struct Cli {
    /// Local media library root, overriding the configured path.
    #[arg(long)]
    library: Option<PathBuf>,
    /// Root directory for config, data and logs (mainly for testing).
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dirs = match &cli.data_dir {
        Some(root) => AppDirs::rooted_at(root),
        None => AppDirs::discover().context("locating application directories")?,
    };
    let config = Config::load_or_default(&dirs).context("loading configuration")?;
    let _guard = init_logging(&config.logging, &dirs).context("initializing logging")?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cadenza starting");

    let registry = build_registry(&config, &dirs, cli.library);
    for failure in registry.failures() {
        eprintln!(
            "Plugin '{}' unavailable: {}",
            failure.plugin_id, failure.reason
        );
    }
    if registry.is_empty() {
        eprintln!("No playback plugins loaded; only built-in commands will work.");
    }

    let mut session = Session::new(registry);
    run(&mut session, &config)?;
    Ok(())
}

fn build_registry(
    config: &Config,
    dirs: &AppDirs,
    library_override: Option<PathBuf>,
) -> PluginRegistry {
    let mut registry = PluginRegistry::new();

    if config.plugin_enabled(local_provider::PLUGIN_ID) {
        let options = LocalPluginOptions {
            library_path: library_override.or_else(|| config.library_path.clone()),
            playlist_dir: dirs.playlist_dir(),
            index_path: dirs.media_index_path(),
            default_volume: config.default_volume,
            sort_order: config.sort_order,
        };
        let plugin = LocalPlugin::new(options, Box::<NullAudioEngine>::default());
        let alias = config
            .plugin_alias(local_provider::PLUGIN_ID)
            .map(str::to_string)
            .unwrap_or_else(|| env_or(LOCAL_ALIAS_ENV, ""));
        let alias = (!alias.is_empty()).then_some(alias);
        registry.register(Box::new(plugin), alias.as_deref());
    } else {
        tracing::info!("local provider disabled by configuration");
    }

    registry
}

/// Interactive command loop. Plugin failures are printed and logged; only
/// terminal I/O failures abort the loop.
fn run(session: &mut Session, config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        // Refresh cadence: absorb pending provider reports (position updates,
        // auto-advance, completions) between commands.
        session.poll();

        print!("cadenza> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF behaves like quit.
            break;
        }

        match route(session.registry(), &line) {
            Dispatch::Empty => {}
            Dispatch::Builtin(Builtin::Help) => print_help(session),
            Dispatch::Builtin(Builtin::Now) => {
                session.poll();
                let mut info = session.now_playing();
                // A provider that has not reported since the last track change
                // may hold richer state than the shared view; ask it directly
                // when the title is missing.
                if info.track_name.is_none() {
                    if let Some(current) = session.current_playback() {
                        info = current;
                    }
                }
                println!("{}", now_playing_line(&info));
            }
            Dispatch::Builtin(Builtin::Settings) => print_settings(session, config),
            Dispatch::Builtin(Builtin::Quit) => break,
            Dispatch::UnknownAlias(alias) => {
                println!("Unknown command '{alias}'. Try 'help'.");
            }
            Dispatch::Plugin { index, command } => {
                run_plugin_command(session, config, index, command)?;
            }
        }
    }

    session.shutdown();
    println!("Bye.");
    Ok(())
}

fn run_plugin_command(
    session: &mut Session,
    config: &Config,
    index: usize,
    command: PluginCommand,
) -> Result<()> {
    match command {
        PluginCommand::Play(tokens) => {
            let outcome = PlayArgs::normalize(PlayRequest::Tokens(tokens))
                .map_err(Into::into)
                .and_then(|args| session.play(index, args));
            if let Err(err) = outcome {
                println!("Error: {err}");
            }
        }
        PluginCommand::Pause => {
            if let Err(err) = session.pause(index) {
                println!("Error: {err}");
            }
        }
        PluginCommand::Stop => {
            if let Err(err) = session.stop(index) {
                println!("Error: {err}");
            }
        }
        PluginCommand::Volume(args) => match args.first().and_then(|a| a.parse::<i64>().ok()) {
            Some(level) => {
                if let Err(err) = session.set_volume(index, level) {
                    println!("Error: {err}");
                }
            }
            None => println!("Usage: volume <0-100>"),
        },
        PluginCommand::Paginated { command, args } => {
            match session.invoke(index, &command, &args) {
                Ok(CommandOutcome::Selection {
                    title,
                    items,
                    special_actions,
                }) => browse(session, config, index, &title, items, special_actions)?,
                Ok(other) => print_outcome(other),
                Err(err) => println!("Error: {err}"),
            }
        }
        PluginCommand::Other { command, args } => match session.invoke(index, &command, &args) {
            Ok(outcome) => print_outcome(outcome),
            Err(err) => println!("Error: {err}"),
        },
    }
    Ok(())
}

/// Drive one pagination session to completion: selection plays the item,
/// special actions run without ending the browse, cancel returns quietly.
fn browse(
    session: &mut Session,
    config: &Config,
    index: usize,
    title: &str,
    items: Vec<cadenza_core::SelectionItem>,
    special_actions: Vec<cadenza_core::SpecialAction>,
) -> Result<()> {
    let mut pagination = PaginationSession::new(items, config.page_size, special_actions);
    let mut status: Option<String> = None;

    loop {
        clear_screen()?;
        for line in render_page(&pagination, title) {
            println!("{line}");
        }
        if let Some(message) = status.take() {
            println!("\n{message}");
        }

        let input = read_nav_input(Duration::from_millis(250))?;
        match pagination.handle(input) {
            PageEvent::Moved | PageEvent::Ignored => {}
            PageEvent::Cancelled => break,
            PageEvent::Selected(item) => {
                clear_screen()?;
                let outcome = PlayArgs::normalize(PlayRequest::Selected(item))
                    .map_err(Into::into)
                    .and_then(|args| session.play(index, args));
                if let Err(err) = outcome {
                    println!("Error: {err}");
                }
                break;
            }
            PageEvent::Special { key, item } => match session.special_action(index, key, &item) {
                Ok(CommandOutcome::Message(message)) => status = Some(message),
                Ok(_) => {}
                Err(err) => status = Some(format!("Error: {err}")),
            },
        }
    }

    Ok(())
}

fn print_outcome(outcome: CommandOutcome) {
    match outcome {
        CommandOutcome::Done => {}
        CommandOutcome::Message(message) => println!("{message}"),
        CommandOutcome::Selection { title, items, .. } => {
            // Non-paginated listing, printed flat.
            println!("{title}:");
            for (i, item) in items.iter().enumerate() {
                println!("  {}. {}", i + 1, item.display);
            }
        }
    }
}

fn print_help(session: &Session) {
    let builtins = vec![
        CommandHelp::new("help", "show this menu"),
        CommandHelp::new("now", "show what is playing"),
        CommandHelp::new("settings", "show effective configuration"),
        CommandHelp::new("quit", "stop playback and exit"),
    ];
    let mut menu = HelpMenu::new(builtins);
    for (heading, entries) in session.registry().help_sections() {
        menu.add_section(heading, entries);
    }
    for line in menu.lines() {
        println!("{line}");
    }
}

fn print_settings(session: &Session, config: &Config) {
    println!("Settings:");
    println!(
        "  library_path   {}",
        config
            .library_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  default_volume {}", config.default_volume);
    println!("  page_size      {}", config.page_size);
    println!("  sort_order     {:?}", config.sort_order);
    println!("  plugins:");
    for registration in session.registry().registrations() {
        println!(
            "    {} as '{}'",
            registration.plugin_id, registration.alias
        );
    }
    for failure in session.registry().failures() {
        println!("    {} (unavailable: {})", failure.plugin_id, failure.reason);
    }
}
