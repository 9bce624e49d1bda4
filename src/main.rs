//! wordcards - vocabulary flashcards with spaced repetition
//!
//! Review the words that are due today, add new ones, and manage the
//! collection from the terminal.

mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use wordcards::config::Config;
use wordcards::{CardDraft, Filters, InteractionMode, JsonStore, Scheduler, Study};

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "wordcards")]
#[command(author, version, about = "Vocabulary flashcards with spaced repetition", long_about = None)]
struct Args {
    /// Directory containing the card collection
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Whose progress to use
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Review due cards (the default)
    Review {
        /// Include cards that are not due yet
        #[arg(long)]
        all: bool,

        /// Only cards in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Present cards in random order
        #[arg(short, long)]
        shuffle: bool,

        /// Type answers instead of flipping cards
        #[arg(short, long)]
        typing: bool,
    },
    /// Add a card
    Add {
        front: String,
        back: String,

        #[arg(short, long)]
        category: Option<String>,

        /// Language of the back side
        #[arg(short, long)]
        language: Option<String>,

        /// Usage example
        #[arg(short, long)]
        example: Option<String>,
    },
    /// List cards with their schedule
    List {
        #[arg(short, long)]
        category: Option<String>,

        /// Only cards due today
        #[arg(long)]
        due: bool,
    },
    /// List categories
    Categories,
    /// Delete a card and its progress
    Delete {
        /// Card id or unique id prefix
        card_id: String,
    },
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = Config::load_or_init(&Config::default_path()).unwrap_or_else(|e| {
        log::warn!("Ignoring config: {:#}", e);
        Config::default()
    });

    let data_dir = args
        .data_dir
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(JsonStore::default_path);
    let store = JsonStore::new(data_dir)?;
    let user = args.user.unwrap_or_else(|| config.user.clone());
    let table = config.interval_table().context("Invalid intervals in config")?;

    let study = Study::new(Arc::new(store), user, Scheduler::new(table)).with_mode(config.mode);

    let command = args.command.unwrap_or(Command::Review {
        all: false,
        category: None,
        shuffle: false,
        typing: false,
    });

    match command {
        Command::Review {
            all,
            category,
            shuffle,
            typing,
        } => {
            let mode = if typing { InteractionMode::Typing } else { config.mode };
            let filters = Filters {
                category,
                only_due: !all,
            };
            let mut study = study.with_mode(mode).with_filters(filters);
            terminal::run(&mut study, shuffle).await
        }
        Command::Add {
            front,
            back,
            category,
            language,
            example,
        } => {
            let mut study = study;
            let draft = CardDraft {
                front,
                back,
                category,
                target_language: language,
                example,
            };
            let report = study.add_cards(vec![draft]).await?;
            if report.inserted.is_empty() {
                println!("Already in your collection, nothing added");
            } else {
                println!("✓ Added card {}", short_id(&report.inserted[0]));
            }
            Ok(())
        }
        Command::List { category, due } => {
            let filters = Filters {
                category,
                only_due: due,
            };
            let items = study.browse(&filters).await?;
            for item in &items {
                println!(
                    "{}  {} → {}  [{}]  {}d, due {}{}",
                    short_id(&item.card.id),
                    item.card.front,
                    item.card.back,
                    item.card.category.as_deref().unwrap_or("-"),
                    item.progress.interval_days,
                    item.progress.next_due_date,
                    if item.progress.mastered { "  ★" } else { "" }
                );
            }
            println!("{} card(s)", items.len());
            Ok(())
        }
        Command::Categories => {
            for category in study.categories().await? {
                println!("{}", category);
            }
            Ok(())
        }
        Command::Delete { card_id } => {
            let mut study = study;
            let items = study.browse(&Filters::all_cards()).await?;
            let matches: Vec<&str> = items
                .iter()
                .map(|i| i.card.id.as_str())
                .filter(|id| id.starts_with(card_id.as_str()))
                .collect();
            let id = match matches.as_slice() {
                [id] => id.to_string(),
                [] => bail!("No card with id {}", card_id),
                _ => bail!("Id prefix {} matches {} cards", card_id, matches.len()),
            };
            study.delete_card(&id).await?;
            println!("✓ Deleted card {}", short_id(&id));
            Ok(())
        }
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}
