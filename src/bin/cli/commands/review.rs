use std::io::{BufRead, Write};

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use studywell_lib::clock::SystemClock;
use studywell_lib::flashcards::{format_interval, preview_intervals, StudySession};

use crate::app::App;
use crate::OutputFormat;

pub fn run_due(app: &App, deck: Option<Uuid>, format: &OutputFormat) -> Result<()> {
    let storage = app.flashcards()?;
    let due = storage.get_due_cards(app.learner_id, deck)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&due)?),
        OutputFormat::Plain => {
            if due.is_empty() {
                println!("Nothing due.");
            }
            for entry in &due {
                println!(
                    "{}  due {}  {}",
                    entry.card.id,
                    entry.state.next_review_at.format("%Y-%m-%d %H:%M"),
                    entry.card.front
                );
            }
        }
    }

    Ok(())
}

pub fn run_submit(app: &App, card: Uuid, quality: i32, format: &OutputFormat) -> Result<()> {
    let storage = app.flashcards()?;
    let state = storage.submit_review(app.learner_id, card, quality)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
        OutputFormat::Plain => {
            println!(
                "Next review in {} (ease {:.2}, streak {})",
                format_interval(state.interval_days),
                state.ease_factor,
                state.repetitions
            );
        }
    }

    Ok(())
}

pub fn run_session(app: &App, deck: Option<Uuid>, format: &OutputFormat) -> Result<()> {
    let storage = app.flashcards()?;
    let due = storage.get_due_cards(app.learner_id, deck)?;
    if due.is_empty() {
        println!("Nothing due.");
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut session = StudySession::start(due, SystemClock);

    while let Some(entry) = session.current() {
        println!("\nQ: {}", entry.card.front);
        print!("(enter to reveal) ");
        std::io::stdout().flush()?;
        if lines.next().transpose()?.is_none() {
            break;
        }

        let [again, hard, good, easy] = preview_intervals(&entry.state, Utc::now())?;
        println!("A: {}", entry.card.back);
        println!(
            "Quality 0-5 (1 again {}, 3 hard {}, 4 good {}, 5 easy {}), q to stop",
            format_interval(again),
            format_interval(hard),
            format_interval(good),
            format_interval(easy)
        );

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            break;
        }

        let quality = match line.parse::<i32>() {
            Ok(q) => q,
            Err(_) => {
                println!("Please enter a number between 0 and 5.");
                continue;
            }
        };
        if let Err(e) = session.answer(quality) {
            println!("{}", e);
        }
    }

    storage.record_session(app.learner_id, session.reviewed(), session.records())?;

    let summary = session.summary();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => {
            println!(
                "\nReviewed {}: {} correct, {} incorrect in {}s",
                summary.answered(),
                summary.correct,
                summary.incorrect,
                summary.elapsed.num_seconds()
            );
        }
    }

    Ok(())
}

pub fn run_stats(app: &App, deck: Option<Uuid>, format: &OutputFormat) -> Result<()> {
    let storage = app.flashcards()?;
    let stats = storage.get_review_stats(app.learner_id, deck)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            println!("Cards:     {}", stats.total_cards);
            println!("  new:       {}", stats.new_cards);
            println!("  learning:  {}", stats.learning_cards);
            println!("  review:    {}", stats.review_cards);
            println!("Due now:   {}", stats.due_cards);
            println!("Last 24h:  {} reviews, {} correct", stats.reviews_today, stats.correct_today);
        }
    }

    Ok(())
}
