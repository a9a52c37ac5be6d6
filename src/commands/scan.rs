use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shelfscan_config::Config;
use shelfscan_session::{ScanController, StagingEvent, StagingSet, Submission};
use shelfscan_store::{ReadOnlyStore, StoreHandle};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

enum Ending {
    /// `:commit` typed: commit whatever has resolved so far.
    Commit,
    /// End of input: let outstanding lookups finish, then commit.
    Finish,
    Close,
}

pub async fn run(config: &Config, dry_run: bool) -> Result<()> {
    let library = super::open_library(config).await?;
    let store: StoreHandle = if dry_run { Arc::new(ReadOnlyStore::new(library.clone())) } else { library.clone() };
    let mut controller =
        ScanController::new(super::resolver(config)?, store).with_rescan_cooldown(config.scanner.rescan_cooldown());

    let session = controller.open().await;
    let staging = session.staging().clone();
    let mut events = staging.subscribe();
    eprintln!("Scanner open ({}). Enter one identifier per line; :status, :close or :commit.", session.acquisition_state());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ending = loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.or_raise(|| ErrorKind::Io)? else {
                    break Ending::Finish;
                };
                match line.trim() {
                    "" => {},
                    ":commit" => break Ending::Commit,
                    ":close" => break Ending::Close,
                    ":status" => {
                        if let Some(status) = controller.status() {
                            eprintln!("{status}");
                        }
                    },
                    text => {
                        let submission = controller.submit_manual(text).or_raise(|| ErrorKind::Session)?;
                        if let Some(message) = describe_submission(&submission) {
                            eprintln!("{message}");
                        }
                    },
                }
            },
            event = events.recv() => report(event),
        }
    };

    let result = match ending {
        Ending::Close => {
            let discarded = controller.close().await;
            eprintln!("Scanner closed, {discarded} staged book(s) discarded.");
            Ok(())
        },
        Ending::Finish | Ending::Commit => {
            if matches!(ending, Ending::Finish) {
                settle(&staging, &mut events).await;
            }
            drain(&mut events);
            commit(&mut controller, dry_run).await
        },
    };
    library.close().await;
    result
}

async fn commit(controller: &mut ScanController, dry_run: bool) -> Result<()> {
    let committed = controller.commit().await.or_raise(|| ErrorKind::Session)?;
    if committed.is_empty() {
        eprintln!("Nothing staged, library unchanged.");
    } else if dry_run {
        eprintln!("Dry run: {} staged book(s) not saved.", committed.len());
    } else {
        eprintln!("Committed {} staged book(s) to the library.", committed.len());
    }
    Ok(())
}

/// Keep reporting events until no lookup is in flight.
async fn settle(staging: &StagingSet, events: &mut Receiver<StagingEvent>) {
    loop {
        tokio::select! {
            () = staging.settled() => return,
            event = events.recv() => report(event),
        }
    }
}

fn drain(events: &mut Receiver<StagingEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => report(Ok(event)),
            Err(TryRecvError::Lagged(skipped)) => report(Err(RecvError::Lagged(skipped))),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return,
        }
    }
}

fn report(event: std::result::Result<StagingEvent, RecvError>) {
    match event {
        Ok(event) => eprintln!("{}", describe_event(&event)),
        Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "Missed staging events"),
        Err(RecvError::Closed) => {},
    }
}

fn describe_event(event: &StagingEvent) -> String {
    match event {
        StagingEvent::Submitted(id) => format!("{id}: looking up"),
        StagingEvent::Resolved(book) => format!("{}: staged {book}", book.identifier()),
        StagingEvent::Absent(id) => format!("{id}: no book found"),
    }
}

fn describe_submission(submission: &Submission) -> Option<String> {
    match submission {
        Submission::Started(_) => None,
        Submission::InFlight(id) => Some(format!("{id}: already looking up")),
        Submission::Resolved(id) => Some(format!("{id}: already staged")),
        Submission::Empty => Some("Ignored: not an identifier".to_string()),
        Submission::Closed => Some("Ignored: scanner is not accepting input".to_string()),
    }
}
