use anyhow::Result;
use uuid::Uuid;

use crate::app::App;
use crate::OutputFormat;

pub struct DailyLimits {
    pub new_cards: Option<i32>,
    pub reviews: Option<i32>,
}

pub fn run_create(
    app: &App,
    name: String,
    description: Option<String>,
    limits: DailyLimits,
    format: &OutputFormat,
) -> Result<()> {
    let storage = app.flashcards()?;
    let mut deck = storage.create_deck(app.learner_id, name, description)?;

    if limits.new_cards.is_some() || limits.reviews.is_some() {
        if let Some(n) = limits.new_cards {
            deck.new_cards_per_day = n;
        }
        if let Some(n) = limits.reviews {
            deck.reviews_per_day = n;
        }
        storage.update_deck(app.learner_id, &deck)?;
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&deck)?),
        OutputFormat::Plain => {
            println!("Created deck \"{}\"", deck.name);
            println!("  ID: {}", deck.id);
        }
    }

    Ok(())
}

pub fn run_list(app: &App, format: &OutputFormat) -> Result<()> {
    let storage = app.flashcards()?;
    let decks = storage.list_decks(app.learner_id)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&decks)?),
        OutputFormat::Plain => {
            if decks.is_empty() {
                println!("(no decks)");
            }
            for deck in &decks {
                println!("{} ({} cards)  {}", deck.name, deck.card_count, deck.id);
                if let Some(desc) = &deck.description {
                    println!("    {}", desc);
                }
            }
        }
    }

    Ok(())
}

pub fn run_delete(app: &App, deck_id: Uuid) -> Result<()> {
    let storage = app.flashcards()?;
    storage.delete_deck(app.learner_id, deck_id)?;
    println!("Deleted deck {}", deck_id);
    Ok(())
}
