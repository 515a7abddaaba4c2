//! Interactive session screen: identify, start, watch the clock, finalize.

use anyhow::Result;
use colored::Colorize;
use higia_application::{SessionWorkflow, messages};
use higia_core::elapsed::format_elapsed;
use std::io::Write;

use super::{print_error, user_error};
use crate::bootstrap::App;
use crate::terminal::{ArgCapture, Terminal};

pub async fn track(app: &App, code: Option<String>) -> Result<()> {
    let mut terminal = Terminal::new();

    let mut workflow = loop {
        let identified = match &code {
            Some(code) => app.identification.identify(&mut ArgCapture::new(code)).await,
            None => app.identification.identify(&mut terminal).await,
        };
        match identified {
            Ok(Some(workflow)) => break workflow,
            Ok(None) => {
                println!("{}", "Cancelado".dimmed());
                return Ok(());
            }
            // Typed codes can be re-entered.
            Err(err) if code.is_none() => print_error(&err, messages::LOOKUP_FAILED),
            Err(err) => return Err(user_error(err, messages::LOOKUP_FAILED)),
        }
    };

    print_header(&workflow);
    loop {
        terminal.prompt("[Enter] iniciar  [q] sair: ");
        match terminal.read_line().await? {
            None => return Ok(()),
            Some(line) if line.trim().eq_ignore_ascii_case("q") => return Ok(()),
            Some(_) => {}
        }
        match workflow.start().await {
            Ok(_) => break,
            Err(err) => print_error(&err, messages::START_FAILED),
        }
    }

    follow(&mut workflow, &mut terminal).await
}

pub async fn resume(app: &App, id: &str) -> Result<()> {
    let mut workflow = app
        .home
        .continue_session(id)
        .await
        .map_err(|err| user_error(err, messages::LOAD_FAILED))?;

    print_header(&workflow);
    follow(&mut workflow, &mut Terminal::new()).await
}

fn print_header(workflow: &SessionWorkflow) {
    println!(
        "{}",
        workflow.title().unwrap_or(workflow.sector_code()).bold()
    );
    if let Some(location) = workflow.location() {
        println!("  {location}");
    }
}

/// Shows the running clock until the user enters notes and the backend
/// accepts them, or leaves.
async fn follow(workflow: &mut SessionWorkflow, terminal: &mut Terminal) -> Result<()> {
    let session_id = workflow.session_id().unwrap_or_default();
    let mut elapsed = workflow.subscribe_elapsed();

    println!(
        "{}",
        "Digite as observações e Enter para finalizar; Ctrl-D sai sem finalizar.".dimmed()
    );

    loop {
        tokio::select! {
            changed = elapsed.changed() => {
                if changed.is_err() {
                    break;
                }
                let seconds = *elapsed.borrow_and_update();
                print!("\r{} {} > ", "⏱".cyan(), format_elapsed(seconds).bold());
                let _ = std::io::stdout().flush();
            }
            line = terminal.read_line() => {
                let Some(notes) = line? else {
                    leave(&session_id);
                    return Ok(());
                };
                match workflow.finalize(Some(&notes)).await {
                    Ok(closed) => {
                        println!();
                        println!(
                            "{} Higienização finalizada ({})",
                            "✓".green(),
                            closed.id
                        );
                        break;
                    }
                    Err(err) => print_error(&err, messages::FINALIZE_FAILED),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                leave(&session_id);
                return Ok(());
            }
        }
    }

    Ok(())
}

fn leave(session_id: &str) {
    println!();
    println!(
        "Sessão continua em andamento. Retome com `higia resume {session_id}`"
    );
}
