use chrono::Utc;
use clap::{Parser, Subcommand};
use recall_core::csv_io::{export_deck, import_cards};
use recall_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Spaced-repetition flashcards for the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List decks with their New / Learning / Review counts (default)
    Decks,

    /// Create an empty deck
    NewDeck { name: String },

    /// Delete a deck and its card file
    DeleteDeck { name: String },

    /// Add a card to a deck
    Add {
        deck: String,
        #[arg(long)]
        front: String,
        #[arg(long)]
        back: String,
    },

    /// Change the text of a card, keeping its schedule
    Edit {
        deck: String,
        /// Card number as shown by `cards`
        number: usize,
        #[arg(long)]
        front: String,
        #[arg(long)]
        back: String,
    },

    /// Remove a card from a deck
    Remove {
        deck: String,
        /// Card number as shown by `cards`
        number: usize,
    },

    /// List the cards of a deck
    Cards {
        deck: String,
        /// Only show cards whose front contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Review the cards that are due in a deck
    Review {
        deck: String,
        /// Rate every due card with this quality instead of prompting (again, good, easy)
        #[arg(long)]
        auto: Option<Quality>,
    },

    /// Append cards from a CSV file with front and back columns
    Import { deck: String, path: PathBuf },

    /// Write a deck's cards to a CSV file
    Export { deck: String, path: PathBuf },

    /// Show recent reviews
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        recall_core::logging::init_with_level("debug");
    } else {
        recall_core::logging::init();
    }

    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    let mut ctx = AppContext::load(config)?;

    match cli.command.unwrap_or(Commands::Decks) {
        Commands::Decks => cmd_decks(&mut ctx),
        Commands::NewDeck { name } => {
            let deck = ctx.create_deck(&name)?;
            println!("✓ Created deck {}", deck.name());
            Ok(())
        }
        Commands::DeleteDeck { name } => {
            let deck = ctx.delete_deck(&name)?;
            println!("✓ Deleted deck {} ({} cards)", deck.name(), deck.len());
            Ok(())
        }
        Commands::Add { deck, front, back } => {
            let target = ctx.deck_mut(&deck)?;
            target.add_card(front, back);
            println!("✓ Added card {} to {}", target.len(), target.name());
            ctx.save_deck(&deck)
        }
        Commands::Edit {
            deck,
            number,
            front,
            back,
        } => {
            let index = card_index(&ctx, &deck, number)?;
            ctx.deck_mut(&deck)?.edit_card(index, front, back)?;
            println!("✓ Updated card {}", number);
            ctx.save_deck(&deck)
        }
        Commands::Remove { deck, number } => {
            let index = card_index(&ctx, &deck, number)?;
            let removed = ctx.deck_mut(&deck)?.delete_card(index)?;
            println!("✓ Removed card {:?}", removed.front);
            ctx.save_deck(&deck)
        }
        Commands::Cards { deck, filter } => cmd_cards(&ctx, &deck, filter.as_deref()),
        Commands::Review { deck, auto } => cmd_review(&mut ctx, &deck, auto),
        Commands::Import { deck, path } => {
            let cards = import_cards(&path)?;
            let count = cards.len();
            ctx.deck_mut(&deck)?.extend_cards(cards);
            ctx.save_deck(&deck)?;
            println!("✓ Imported {} cards into {}", count, deck);
            Ok(())
        }
        Commands::Export { deck, path } => {
            let count = export_deck(ctx.deck(&deck)?, &path)?;
            println!("✓ Exported {} cards to {}", count, path.display());
            Ok(())
        }
        Commands::History { limit } => cmd_history(&ctx, limit),
    }
}

/// Convert a 1-based card number from the command line
fn card_index(ctx: &AppContext, deck: &str, number: usize) -> Result<usize> {
    let deck = ctx.deck(deck)?;
    if number == 0 || number > deck.len() {
        return Err(Error::CardNumber {
            deck: deck.name().to_string(),
            number,
        });
    }
    Ok(number - 1)
}

fn cmd_decks(ctx: &mut AppContext) -> Result<()> {
    ctx.refresh_due(Utc::now());

    if ctx.decks().is_empty() {
        println!("No decks yet. Create one with `recall new-deck <name>`.");
        return Ok(());
    }

    println!("Decks:");
    for (i, deck) in ctx.decks().iter().enumerate() {
        let item = ListItem::from(deck);
        println!();
        println!("  {}. {}", i + 1, item.title());
        println!("     {}", item.subtitle());
    }
    Ok(())
}

fn cmd_cards(ctx: &AppContext, deck: &str, filter: Option<&str>) -> Result<()> {
    let deck = ctx.deck(deck)?;
    if deck.is_empty() {
        println!("{} has no cards.", deck.name());
        return Ok(());
    }

    for (i, card) in deck.cards().iter().enumerate() {
        let item = ListItem::from(card);
        if filter.is_some_and(|query| !item.matches(query)) {
            continue;
        }
        println!("{:>4}. {}", i + 1, item.title());
        println!("      {}  [{}]", item.subtitle(), card.status);
    }
    Ok(())
}

fn cmd_review(ctx: &mut AppContext, deck: &str, auto: Option<Quality>) -> Result<()> {
    let mut review_sink = ctx.review_sink();
    let (mut session, store) = ctx.start_review(deck, Utc::now())?;
    let deck_name = session.deck().name().to_string();

    if session.is_complete() {
        println!("No cards due in {}.", deck_name);
    }

    while session.is_active() {
        let Some(card) = session.current() else {
            break;
        };
        let (front, back) = (card.front.clone(), card.back.clone());

        println!();
        println!("─── {} · {}/{} ───", deck_name, session.position() + 1, session.len());
        println!("{}", front);

        if auto.is_none() && !prompt_reveal()? {
            session.abort();
            break;
        }
        session.reveal();
        println!("{}", "─".repeat(20));
        println!("{}", back);

        let quality = match auto {
            Some(quality) => quality,
            None => match prompt_rating()? {
                Some(quality) => quality,
                None => {
                    session.abort();
                    break;
                }
            },
        };

        let rated_at = Utc::now();
        if let Some(rated) = session.advance(quality, rated_at, store)? {
            println!("→ {} (next in {} min)", quality, rated.interval);
            if let Some(sink) = review_sink.as_mut() {
                sink.append(&ReviewEvent::from_rated(&deck_name, &rated, quality, rated_at))?;
            }
        }
    }

    let (reviewed, total, complete) = (session.position(), session.len(), session.is_complete());
    if total > 0 {
        if complete {
            println!("\n✓ Review complete: {} cards", reviewed);
        } else {
            println!("\nReview stopped after {} of {} cards", reviewed, total);
        }
    }

    ctx.save_all()
}

/// Wait for Enter. Returns false if the user quits.
fn prompt_reveal() -> Result<bool> {
    print!("[Enter] show answer, [q] quit > ");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(false);
    }
    Ok(!input.trim().eq_ignore_ascii_case("q"))
}

/// Read a rating. Returns None if the user quits.
fn prompt_rating() -> Result<Option<Quality>> {
    loop {
        print!("[a]gain, [g]ood, [e]asy, [q]uit > ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match input.parse::<Quality>() {
            Ok(quality) => return Ok(Some(quality)),
            Err(e) => {
                tracing::debug!("Rejected rating input: {}", e);
                println!("Please answer a, g or e.");
            }
        }
    }
}

fn cmd_history(ctx: &AppContext, limit: usize) -> Result<()> {
    let events = read_events(&ctx.review_log_path())?;
    if events.is_empty() {
        println!("No reviews logged yet.");
        return Ok(());
    }

    let skip = events.len().saturating_sub(limit);
    for event in &events[skip..] {
        println!(
            "{}  {:<12} {:<6} {}  (interval {} min, {})",
            event.reviewed_at.format("%Y-%m-%d %H:%M"),
            event.deck,
            event.quality.to_string(),
            event.front,
            event.interval,
            event.status
        );
    }
    Ok(())
}
