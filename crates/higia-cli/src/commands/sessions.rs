use anyhow::Result;
use colored::Colorize;
use higia_application::messages;
use higia_core::cleaning::CleaningBackend;
use higia_core::clock::Clock;
use higia_core::elapsed::{elapsed_seconds, format_elapsed, format_minutes_since};

use super::{sector_label, user_error};
use crate::bootstrap::App;
use crate::terminal::ArgCapture;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub async fn sector(app: &App, code: &str) -> Result<()> {
    let sector = app
        .backend
        .find_sector_by_code(code.trim())
        .await
        .map_err(|err| user_error(err, messages::LOOKUP_FAILED))?;

    println!("{} [{}]", sector.name.bold(), sector.code);
    if let Some(location) = &sector.location {
        println!("  {location}");
    }
    Ok(())
}

pub async fn start(app: &App, code: &str) -> Result<()> {
    let workflow = app
        .identification
        .scan_and_start(&mut ArgCapture::new(code))
        .await
        .map_err(|err| user_error(err, messages::START_FAILED))?
        .ok_or_else(|| anyhow::anyhow!(messages::BLANK_CODE))?;

    if let Some(session) = workflow.session() {
        println!(
            "{} Higienização iniciada: {}",
            "✓".green(),
            workflow.title().unwrap_or(workflow.sector_code()).bold()
        );
        println!("  id: {}", session.id);
        println!("  Finalize with `higia finalize {} --notes \"...\"`", session.id);
    }
    // The session keeps running on the backend; only the local ticker stops.
    workflow.close();
    Ok(())
}

pub async fn finalize(app: &App, id: &str, notes: Option<&str>) -> Result<()> {
    let mut workflow = app
        .home
        .continue_session(id)
        .await
        .map_err(|err| user_error(err, messages::LOAD_FAILED))?;

    let closed = workflow
        .finalize(notes)
        .await
        .map_err(|err| user_error(err, messages::FINALIZE_FAILED))?;

    let end = closed.finished_at.unwrap_or_else(|| app.clock.now());
    println!(
        "{} Higienização finalizada: {} ({})",
        "✓".green(),
        sector_label(&closed).bold(),
        format_elapsed(elapsed_seconds(closed.started_at, end))
    );
    Ok(())
}

pub async fn list(app: &App) -> Result<()> {
    let sessions = app
        .home
        .my_in_progress()
        .await
        .map_err(|err| user_error(err, messages::LOAD_FAILED))?;

    if sessions.is_empty() {
        println!("{}", "Nenhuma higienização em andamento".dimmed());
        return Ok(());
    }

    let now = app.clock.now();
    for session in sessions {
        println!(
            "{}  {}  {}",
            session.id.cyan(),
            sector_label(&session).bold(),
            format!("há {}", format_minutes_since(session.started_at, now))
                .as_str()
                .yellow()
        );
    }
    Ok(())
}

pub async fn history(app: &App) -> Result<()> {
    let sessions = app
        .home
        .history()
        .await
        .map_err(|err| user_error(err, messages::LOAD_FAILED))?;

    if sessions.is_empty() {
        println!("{}", "Nenhum registro".dimmed());
        return Ok(());
    }

    for session in sessions {
        let started = session.started_at.format(TIME_FORMAT);
        let status = match session.finished_at {
            Some(end) => format!(
                "{} ({})",
                end.format(TIME_FORMAT),
                format_elapsed(elapsed_seconds(session.started_at, end))
            )
            .as_str()
            .normal(),
            None => "em andamento".yellow(),
        };
        println!(
            "{}  {}  {} → {}",
            session.id.cyan(),
            sector_label(&session).bold(),
            started,
            status
        );
        if let Some(notes) = &session.notes {
            println!("    {}", notes.dimmed());
        }
    }
    Ok(())
}
