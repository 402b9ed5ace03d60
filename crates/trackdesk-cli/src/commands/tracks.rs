//! Single-track commands.

use anyhow::Result;
use trackdesk_scan::{ScanError, delete_track};

use super::{App, parse_status};
use crate::display;
use crate::prompt::TerminalPrompt;

pub async fn search(app: &App, track_number: &str) -> Result<()> {
    let track = app.tracks().search(track_number).await?;
    display::print_track_card(&track);
    Ok(())
}

/// Assign to `code`, or to the signed-in user's own personal code.
pub async fn assign(app: &App, track_number: &str, code: Option<String>) -> Result<()> {
    let code = match code {
        Some(c) => c,
        None => app.own_code()?,
    };
    let assignment = app.tracks().assign(track_number, &code).await?;
    if assignment.message.is_empty() {
        println!("{} assigned to {code}.", assignment.track.track_number);
    } else {
        println!("{}", assignment.message);
    }
    Ok(())
}

pub async fn archive(app: &App, track_number: &str) -> Result<()> {
    let msg = app.tracks().archive(track_number).await?;
    println!("{}", msg.message);
    Ok(())
}

pub async fn mine(app: &App, archived: bool) -> Result<()> {
    let code = app.own_code()?;
    let registry = app.tracks();
    let tracks = if archived {
        registry.archived_tracks(&code).await?
    } else {
        registry.user_tracks(&code).await?
    };
    display::print_user_tracks(&tracks);
    Ok(())
}

pub async fn set_status(app: &App, track_number: &str, status: &str) -> Result<()> {
    let status = parse_status(status)?;
    let change = app.tracks().update_status(track_number, &status).await?;
    let old = change
        .old_status
        .as_ref()
        .map(|s| s.label())
        .unwrap_or("-");
    println!("{}: {old} -> {}", change.track_number, change.new_status);
    Ok(())
}

pub async fn delete(app: &App, track_number: &str) -> Result<()> {
    match delete_track(&app.tracks(), &TerminalPrompt, track_number).await {
        Ok(message) => println!("{message}"),
        Err(ScanError::Aborted(_)) => println!("Cancelled."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
