use anyhow::Result;
use uuid::Uuid;

use studywell_lib::flashcards::{format_interval, CardWithState};

use crate::app::App;
use crate::OutputFormat;

pub fn run_add(
    app: &App,
    deck_id: Uuid,
    front: String,
    back: String,
    tags: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let tags = tags.map(parse_tags);

    let storage = app.flashcards()?;
    let card = storage.create_card(app.learner_id, deck_id, front, back, tags)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => {
            println!("Added card \"{}\"", card.front);
            if !card.tags.is_empty() {
                let tags: Vec<String> = card.tags.iter().map(|t| format!("#{}", t)).collect();
                println!("  Tags: {}", tags.join(" "));
            }
            println!("  ID: {}", card.id);
        }
    }

    Ok(())
}

pub fn run_edit(
    app: &App,
    card_id: Uuid,
    front: Option<String>,
    back: Option<String>,
    tags: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    if front.is_none() && back.is_none() && tags.is_none() {
        anyhow::bail!("Nothing to change; pass --front, --back or --tags");
    }

    let storage = app.flashcards()?;
    let mut card = storage.get_card(app.learner_id, card_id)?;
    if let Some(front) = front {
        card.front = front;
    }
    if let Some(back) = back {
        card.back = back;
    }
    if let Some(tags) = tags {
        card.tags = parse_tags(tags);
    }
    let card = storage.update_card(app.learner_id, &card)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&card)?),
        OutputFormat::Plain => println!("Updated card {}", card.id),
    }

    Ok(())
}

fn parse_tags(tag_str: &str) -> Vec<String> {
    tag_str
        .split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn run_list(app: &App, deck_id: Uuid, format: &OutputFormat) -> Result<()> {
    let storage = app.flashcards()?;
    let cards = storage
        .list_cards(app.learner_id, deck_id)?
        .into_iter()
        .map(|card| -> Result<CardWithState> {
            let state = storage.get_card_state(app.learner_id, card.id)?;
            Ok(CardWithState { card, state })
        })
        .collect::<Result<Vec<_>>>()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
        OutputFormat::Plain => {
            for entry in &cards {
                println!(
                    "{}  {:?}  every {}  ease {:.2}  {}",
                    entry.card.id,
                    entry.state.status(),
                    format_interval(entry.state.interval_days),
                    entry.state.ease_factor,
                    entry.card.front,
                );
            }
        }
    }

    Ok(())
}
