//! Interactive scanner loop.
//!
//! Each input line is either a scanned identifier (several may be pasted,
//! comma-separated) or a `:command`. The batch lives only for this session.

use std::io::Write;

use anyhow::Result;
use trackdesk_core::split_track_numbers;
use trackdesk_scan::{
    Accumulator, Action, ConfirmationPolicy, RemovalPolicy, ScanBackend, ScanError, ScanOutcome,
};

use super::App;
use crate::display;
use crate::prompt::TerminalPrompt;

const HELP: &str = "\
Scan or type track numbers; paste several separated by commas.
  :list        show the batch
  :rm <row>    drop a row
  :deliver     hand every deliverable parcel to its client
  :delete      permanently delete every found parcel
  :clear       empty the batch
  :quit        leave";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Scan(Vec<String>),
    List,
    /// Row as shown, numbered from 1.
    Remove(Option<usize>),
    Deliver,
    Delete,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> Input {
    let line = line.trim();
    let Some(cmd) = line.strip_prefix(':') else {
        return Input::Scan(split_track_numbers(line));
    };
    let (name, arg) = match cmd.split_once(char::is_whitespace) {
        Some((n, a)) => (n, a.trim()),
        None => (cmd, ""),
    };
    match name.to_ascii_lowercase().as_str() {
        "list" | "ls" => Input::List,
        "rm" | "remove" => Input::Remove(arg.parse().ok()),
        "deliver" => Input::Deliver,
        "delete" => Input::Delete,
        "clear" => Input::Clear,
        "help" | "h" | "?" => Input::Help,
        "quit" | "q" | "exit" => Input::Quit,
        _ => Input::Unknown(name.to_string()),
    }
}

pub async fn run(app: &App, policy: RemovalPolicy) -> Result<()> {
    let mut acc = Accumulator::new(app.scanner(), TerminalPrompt).with_policy(policy);
    println!("{HELP}");

    let mut line = String::new();
    loop {
        print!("scan> ");
        std::io::stdout().flush()?;
        line.clear();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        match parse_line(&line) {
            Input::Quit => {
                if acc.batch().is_empty()
                    || TerminalPrompt.confirm(&format!(
                        "Discard {} scanned item(s)?",
                        acc.batch().scanned_count()
                    ))
                {
                    break;
                }
            }
            Input::Clear => {
                let n = acc.batch().scanned_count();
                if n > 0 && TerminalPrompt.confirm(&format!("Clear {n} scanned item(s)?")) {
                    acc.clear();
                    println!("Batch cleared.");
                }
            }
            input => handle(&mut acc, input).await?,
        }
    }
    Ok(())
}

/// Apply one input. Only errors that require signing in again end the loop.
async fn handle<B, C>(acc: &mut Accumulator<B, C>, input: Input) -> Result<()>
where
    B: ScanBackend,
    C: ConfirmationPolicy,
{
    let outcome = match input {
        Input::Scan(ids) => scan_all(acc, ids).await,
        Input::List => {
            display::print_batch(acc.batch());
            Ok(())
        }
        Input::Remove(Some(row)) if row > 0 => acc.remove_at(row - 1).map(|r| {
            println!("Removed {}.", r.track_number);
            display::print_counters(acc.batch());
        }),
        Input::Remove(_) => {
            println!("usage: :rm <row>");
            Ok(())
        }
        Input::Deliver => acc.deliver_selected().await.map(|result| {
            display::print_bulk_result(&result);
            display::print_counters(acc.batch());
        }),
        Input::Delete => acc.delete_selected().await.map(|result| {
            display::print_bulk_result(&result);
            println!("Batch reset.");
        }),
        Input::Help => {
            println!("{HELP}");
            Ok(())
        }
        Input::Unknown(name) => {
            println!("unknown command :{name}, try :help");
            Ok(())
        }
        Input::Quit | Input::Clear => Ok(()),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(e) if e.requires_login() => Err(e.into()),
        Err(e) => {
            report(&e);
            Ok(())
        }
    }
}

async fn scan_all<B, C>(acc: &mut Accumulator<B, C>, ids: Vec<String>) -> Result<(), ScanError>
where
    B: ScanBackend,
    C: ConfirmationPolicy,
{
    for id in ids {
        match acc.submit_scan(&id).await {
            Ok(ScanOutcome::Added { index }) => {
                display::print_scan_row(index, &acc.batch().records()[index]);
            }
            Ok(ScanOutcome::Duplicate) => println!("  {id} already scanned"),
            Ok(ScanOutcome::Empty) => {}
            Err(e) if e.requires_login() => return Err(e),
            Err(e) => report(&e),
        }
    }
    Ok(())
}

fn report(err: &ScanError) {
    match err {
        ScanError::NoEligibleItems(Action::Deliver) => {
            println!("Nothing to deliver: no found parcel is at a pickup warehouse.")
        }
        ScanError::NoEligibleItems(_) => println!("Nothing to delete: no scanned parcel is known."),
        ScanError::Aborted(_) => println!("Cancelled."),
        ScanError::IndexOutOfRange { len, .. } => println!("No such row; the batch has {len}."),
        ScanError::ValidationUnavailable { track_number, source } => {
            println!("Could not check {track_number}, not added: {}", source.detail())
        }
        ScanError::BulkActionFailed { action, detail } => {
            println!("{action} failed, batch unchanged: {detail}")
        }
        other => println!("{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_split_on_commas() {
        assert_eq!(
            parse_line(" ab1, cd2 ,,\n"),
            Input::Scan(vec!["AB1".into(), "CD2".into()])
        );
        assert_eq!(parse_line(""), Input::Scan(vec![]));
    }

    #[test]
    fn commands() {
        assert_eq!(parse_line(":list"), Input::List);
        assert_eq!(parse_line(":rm 3"), Input::Remove(Some(3)));
        assert_eq!(parse_line(":rm x"), Input::Remove(None));
        assert_eq!(parse_line(":DELIVER"), Input::Deliver);
        assert_eq!(parse_line(":q"), Input::Quit);
        assert_eq!(parse_line(":frobnicate"), Input::Unknown("frobnicate".into()));
    }
}
