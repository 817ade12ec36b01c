//! Binary entrypoint for the Guildcraft CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` and create the data directory
//! - `status [--guild <id>] [--json]` - print record counts from the economy store
//! - `console --guild <id> --user <id>` - drive the item commands from stdin
//!
//! See the library crate docs for module-level details: `guildcraft::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use guildcraft::bot::{ChatEvent, Invoker, ItemCommandProcessor, Reaction, Reply};
use guildcraft::config::Config;
use guildcraft::economy::{format_recipe, ChannelId, EconomyStore, GuildId, UserId};

#[derive(Parser)]
#[command(name = "guildcraft")]
#[command(about = "Per-guild item economy with crafting for chat bots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Show economy store statistics
    Status {
        /// Also list the items and recipes of one guild
        #[arg(short, long)]
        guild: Option<u64>,
        /// Print a JSON summary instead of text
        #[arg(long)]
        json: bool,
    },
    /// Feed chat lines from stdin to the item commands as one member
    Console {
        /// Guild the member is in
        #[arg(short, long)]
        guild: u64,
        /// Member user id
        #[arg(short, long)]
        user: u64,
        /// Channel the conversation happens in
        #[arg(long, default_value_t = 1)]
        channel: u64,
        /// Display name used in replies
        #[arg(short, long)]
        name: Option<String>,
        /// Grant the "manage server" permission
        #[arg(short, long)]
        manager: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new Guildcraft configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);

            let cfg = Config::default();
            tokio::fs::create_dir_all(&cfg.storage.data_dir).await?;
            info!("Data directory ready at {}", cfg.storage.data_dir);
        }
        Commands::Status { guild, json } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let db_path = config.storage.economy_db_path();
            let store = EconomyStore::open(&db_path)?;
            let stats = store.stats();

            let (items, recipes) = match guild {
                Some(id) => {
                    let items: Vec<String> = store.list_items(GuildId(id))?.into_iter().collect();
                    let recipes: Vec<String> = store
                        .list_recipes(GuildId(id))?
                        .iter()
                        .map(format_recipe)
                        .collect();
                    (Some(items), Some(recipes))
                }
                None => (None, None),
            };

            if json {
                let payload = serde_json::json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "store": db_path.display().to_string(),
                    "stats": stats,
                    "guild": guild,
                    "items": items,
                    "recipes": recipes,
                });
                println!("{}", payload);
                return Ok(());
            }

            println!("Guildcraft v{}", env!("CARGO_PKG_VERSION"));
            println!("Store: {}", db_path.display());
            println!("Items: {}", stats.items);
            println!("Inventory entries: {}", stats.inventory_entries);
            println!("Recipes: {}", stats.recipes);
            println!("Acquire methods: {}", stats.acquire_methods);
            if let (Some(id), Some(items), Some(recipes)) = (guild, items, recipes) {
                println!();
                println!("Guild {} items: {}", id, items.join(", "));
                for recipe in recipes {
                    println!("  {}", recipe);
                }
            }
        }
        Commands::Console {
            guild,
            user,
            channel,
            name,
            manager,
        } => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            info!("Starting Guildcraft console v{}", env!("CARGO_PKG_VERSION"));

            let store = EconomyStore::open(config.storage.economy_db_path())?;
            let mut processor = ItemCommandProcessor::new(store, &config);
            let display_name = name.unwrap_or_else(|| format!("user-{}", user));
            let mut invoker = Invoker::new(GuildId(guild), ChannelId(channel), UserId(user), &display_name);
            if manager {
                invoker = invoker.as_manager();
            }

            println!(
                "Type commands with the `{}` prefix; react with :blue_heart: :green_heart: :yellow_heart: :x: :question:. Ctrl-D quits.",
                processor.prefix()
            );
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let event = match Reaction::parse(&line) {
                    Some(reaction) => ChatEvent::Reaction(reaction),
                    None => ChatEvent::message(&line),
                };
                for reply in processor.handle_event(&invoker, &event) {
                    print_reply(&reply);
                }
            }
            info!("Console closed");
        }
    }

    Ok(())
}

fn print_reply(reply: &Reply) {
    println!("{}", reply.content);
    if !reply.reactions.is_empty() {
        let buttons: Vec<String> = reply
            .reactions
            .iter()
            .map(|r| format!("{} {}", r.emoji(), r.shortcode()))
            .collect();
        println!("[{}]", buttons.join("  "));
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match (verbosity, config) {
        (0, Some(cfg)) => cfg.logging.level_filter(),
        (0, None) => log::LevelFilter::Info,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when someone is watching it.
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
