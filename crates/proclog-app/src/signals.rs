//! OS signal handling: SIGINT/SIGTERM (Ctrl+C elsewhere) become `Message::Quit`

use tokio::sync::mpsc;

use crate::message::Message;
use proclog_core::prelude::*;

/// Spawn a task that sends `Message::Quit` on the first termination signal
pub fn spawn_signal_handler(tx: mpsc::Sender<Message>) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => {
                if tx.send(Message::Quit).await.is_err() {
                    debug!("Engine gone before shutdown signal was delivered");
                }
            }
            Err(e) => error!("{}", e),
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, Signal, SignalKind};

    fn listen(kind: SignalKind, name: &str) -> Result<Signal> {
        signal(kind).map_err(|e| listen_error(name, e))
    }

    let mut sigint = listen(SignalKind::interrupt(), "SIGINT")?;
    let mut sigterm = listen(SignalKind::terminate(), "SIGTERM")?;

    let name = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    };
    info!("Received {}, shutting down", name);
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| listen_error("Ctrl+C", e))?;
    info!("Received Ctrl+C, shutting down");
    Ok(())
}

fn listen_error(signal: &str, err: std::io::Error) -> Error {
    Error::signal(format!("Failed to listen for {}: {}", signal, err))
}
