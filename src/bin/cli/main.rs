mod app;
mod commands;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use studywell_lib::notes::Actor;
use studywell_lib::roles::Role;

#[derive(Parser)]
#[command(name = "studywell-cli", about = "Flashcard reviews and encrypted notes", version)]
struct Cli {
    /// Learner whose decks to use (default: the local learner)
    #[arg(long, global = true)]
    learner: Option<Uuid>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Deck management
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Card management
    #[command(subcommand)]
    Card(CardCommand),

    /// Spaced repetition reviews
    #[command(subcommand)]
    Review(ReviewCommand),

    /// Encrypted therapy notes
    #[command(subcommand)]
    Note(NoteCommand),

    /// Master key diagnostics
    #[command(subcommand)]
    Key(KeyCommand),
}

#[derive(Subcommand)]
enum DeckCommand {
    /// Create a deck
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Most never-reviewed cards offered per day
        #[arg(long)]
        new_per_day: Option<i32>,
        /// Most scheduled reviews offered per day
        #[arg(long)]
        reviews_per_day: Option<i32>,
    },
    /// List decks
    List,
    /// Delete a deck and its cards
    Delete { deck: Uuid },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Add a card to a deck
    Add {
        deck: Uuid,
        front: String,
        back: String,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Change a card's content; its review schedule is kept
    Edit {
        card: Uuid,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,
    },
    /// List cards in a deck with their schedule
    List { deck: Uuid },
}

#[derive(Subcommand)]
enum ReviewCommand {
    /// Show cards due now, oldest first
    Due {
        #[arg(long)]
        deck: Option<Uuid>,
    },
    /// Record one review (quality 0-5)
    Submit { card: Uuid, quality: i32 },
    /// Study due cards interactively
    Session {
        #[arg(long)]
        deck: Option<Uuid>,
    },
    /// Review statistics
    Stats {
        #[arg(long)]
        deck: Option<Uuid>,
    },
}

#[derive(Subcommand)]
enum NoteCommand {
    /// Write a new note (content "-" or piped stdin reads stdin)
    Write {
        #[arg(long)]
        patient: Uuid,
        #[arg(long)]
        author: Uuid,
        #[arg(long, default_value = "therapist")]
        role: Role,
        #[arg(long)]
        content: Option<String>,
    },
    /// Replace a note's content
    Edit {
        note: Uuid,
        #[arg(long)]
        author: Uuid,
        #[arg(long, default_value = "therapist")]
        role: Role,
        #[arg(long)]
        content: Option<String>,
    },
    /// Decrypt and print a note
    Read {
        note: Uuid,
        #[arg(long)]
        reader: Uuid,
        #[arg(long, default_value = "therapist")]
        role: Role,
    },
    /// List a patient's notes
    List {
        #[arg(long)]
        patient: Uuid,
    },
}

#[derive(Subcommand)]
enum KeyCommand {
    /// Resolve the configured master key and report how it was obtained
    Check,
}

/// Read content from stdin if piped, or resolve "-" as stdin
fn resolve_content(content: Option<String>) -> anyhow::Result<String> {
    use std::io::{IsTerminal, Read};

    match content.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(_) => Ok(content.unwrap_or_default()),
        None if !std::io::stdin().is_terminal() => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        None => anyhow::bail!("No content given; pass --content or pipe it on stdin"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let app = app::App::new(cli.learner)?;

    match cli.command {
        Command::Deck(DeckCommand::Create {
            name,
            description,
            new_per_day,
            reviews_per_day,
        }) => {
            let limits = commands::deck::DailyLimits {
                new_cards: new_per_day,
                reviews: reviews_per_day,
            };
            commands::deck::run_create(&app, name, description, limits, &cli.format)?;
        }
        Command::Deck(DeckCommand::List) => {
            commands::deck::run_list(&app, &cli.format)?;
        }
        Command::Deck(DeckCommand::Delete { deck }) => {
            commands::deck::run_delete(&app, deck)?;
        }
        Command::Card(CardCommand::Add { deck, front, back, tags }) => {
            commands::card::run_add(&app, deck, front, back, tags.as_deref(), &cli.format)?;
        }
        Command::Card(CardCommand::Edit { card, front, back, tags }) => {
            commands::card::run_edit(&app, card, front, back, tags.as_deref(), &cli.format)?;
        }
        Command::Card(CardCommand::List { deck }) => {
            commands::card::run_list(&app, deck, &cli.format)?;
        }
        Command::Review(ReviewCommand::Due { deck }) => {
            commands::review::run_due(&app, deck, &cli.format)?;
        }
        Command::Review(ReviewCommand::Submit { card, quality }) => {
            commands::review::run_submit(&app, card, quality, &cli.format)?;
        }
        Command::Review(ReviewCommand::Session { deck }) => {
            commands::review::run_session(&app, deck, &cli.format)?;
        }
        Command::Review(ReviewCommand::Stats { deck }) => {
            commands::review::run_stats(&app, deck, &cli.format)?;
        }
        Command::Note(subcmd) => {
            // Fail before touching any note if the key is missing
            let keys = studywell_lib::encryption::init_master_key()?;
            match subcmd {
                NoteCommand::Write { patient, author, role, content } => {
                    let content = resolve_content(content)?;
                    let author = Actor::new(author, role);
                    commands::note::run_write(&app, keys, patient, author, &content, &cli.format)?;
                }
                NoteCommand::Edit { note, author, role, content } => {
                    let content = resolve_content(content)?;
                    let author = Actor::new(author, role);
                    commands::note::run_edit(&app, keys, note, author, &content, &cli.format)?;
                }
                NoteCommand::Read { note, reader, role } => {
                    commands::note::run_read(&app, keys, note, reader, role)?;
                }
                NoteCommand::List { patient } => {
                    commands::note::run_list(&app, keys, patient, &cli.format)?;
                }
            }
        }
        Command::Key(KeyCommand::Check) => {
            commands::key::run_check(&cli.format)?;
        }
    }

    Ok(())
}
