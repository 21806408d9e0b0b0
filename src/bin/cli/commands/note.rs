use anyhow::Result;
use uuid::Uuid;

use studywell_lib::encryption::KeyManager;
use studywell_lib::notes::{Actor, NoteStorageError};
use studywell_lib::roles::Role;

use crate::app::App;
use crate::OutputFormat;

pub fn run_write(
    app: &App,
    keys: &KeyManager,
    patient: Uuid,
    author: Actor,
    content: &str,
    format: &OutputFormat,
) -> Result<()> {
    let storage = app.notes(keys)?;
    let note = storage.create_note(author, patient, content)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&note)?),
        OutputFormat::Plain => println!("Created note {}", note.id),
    }

    Ok(())
}

pub fn run_edit(
    app: &App,
    keys: &KeyManager,
    note: Uuid,
    author: Actor,
    content: &str,
    format: &OutputFormat,
) -> Result<()> {
    let storage = app.notes(keys)?;
    let note = storage.update_note(author, note, content)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&note)?),
        OutputFormat::Plain => println!("Updated note {}", note.id),
    }

    Ok(())
}

pub fn run_read(app: &App, keys: &KeyManager, note: Uuid, reader: Uuid, role: Role) -> Result<()> {
    let storage = app.notes(keys)?;

    match storage.read_note(Actor::new(reader, role), note) {
        Ok(content) => {
            println!("{}", content);
            Ok(())
        }
        Err(e) if e.is_integrity() => {
            eprintln!(
                "Note {} could not be decrypted; it may have been tampered with \
                 or sealed under another key.",
                note
            );
            Err(e.into())
        }
        Err(NoteStorageError::NoteNotFound(id)) => anyhow::bail!("No note with ID {}", id),
        Err(e) => Err(e.into()),
    }
}

pub fn run_list(app: &App, keys: &KeyManager, patient: Uuid, format: &OutputFormat) -> Result<()> {
    let storage = app.notes(keys)?;
    let notes = storage.list_notes(patient)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&notes)?),
        OutputFormat::Plain => {
            if notes.is_empty() {
                println!("(no notes)");
            }
            for note in &notes {
                println!(
                    "{}  {}  by {}",
                    note.id,
                    note.updated_at.format("%Y-%m-%d %H:%M"),
                    note.author_id
                );
            }
        }
    }

    Ok(())
}
