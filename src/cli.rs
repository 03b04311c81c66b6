use std::io::{BufRead, Write};
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};

use catalog_bot::build_engine;
use catalog_bot::card::format_product;
use catalog_bot::config::BotConfig;
use catalog_bot::conversation::{ConversationEngine, Inbound};
use catalog_bot::matcher::MatchFilters;
use catalog_bot::reply::Reply;

#[derive(Parser)]
#[command(
    name = "catalog-bot-cli",
    about = "Chat with the catalog bot or query the catalog locally"
)]
struct Cli {
    /// Catalog JSON export (overrides CATALOG_PATH)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Output machine-readable JSON (default: human-readable)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive conversation through the full engine
    Chat {
        /// Sender identifier for the session
        #[arg(long, default_value = "local")]
        user: String,
        /// Display name used in greetings
        #[arg(long)]
        name: Option<String>,
    },
    /// Run a catalog search without a session
    Search {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long)]
        max_price: Option<f64>,
        /// Free-form query (positional, collects remaining args)
        query: Vec<String>,
    },
    /// List catalog categories
    Categories,
}

// ============================================================================
// Output Formatting
// ============================================================================

fn print_reply(reply: &Reply, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&reply.fragments)?);
        return Ok(());
    }
    for fragment in &reply.fragments {
        println!("{}", fragment.text);
        if let Some(url) = &fragment.media_url {
            println!("[media] {url}");
        }
        println!();
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = BotConfig::from_env()?;
    if let Some(path) = cli.catalog {
        config.catalog_path = path;
    }
    let engine = build_engine(&config)?;

    match cli.command {
        Command::Chat { user, name } => chat(&engine, user, name, cli.json).await?,
        Command::Search {
            category,
            subcategory,
            max_price,
            query,
        } => {
            let filters = MatchFilters {
                category,
                subcategory,
                price_limit: max_price,
            };
            let results = engine.matcher().search(&query.join(" "), &filters);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                eprintln!("No products found.");
            } else {
                for (i, hit) in results.iter().enumerate() {
                    if i > 0 {
                        println!();
                    }
                    println!("{}", format_product(i, hit));
                }
            }
        }
        Command::Categories => {
            let categories = engine.matcher().catalog().categories();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(categories)?);
            } else {
                for category in categories {
                    println!("{category}");
                }
            }
        }
    }

    Ok(())
}

/// Read messages from stdin until EOF or `/quit`.
async fn chat(
    engine: &ConversationEngine,
    user: String,
    name: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim() == "/quit" {
            break;
        }

        let inbound = Inbound {
            user_id: user.clone(),
            text: line,
            display_name: name.clone(),
        };
        let reply = engine.handle(&inbound, Utc::now()).await;
        print_reply(&reply, json)?;
    }

    Ok(())
}
