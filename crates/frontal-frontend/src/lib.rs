//! Console frontend.
//!
//! Reads commands from standard input, forwards them to the backend over the
//! bridge and prints every backend event as it arrives.

use anyhow::Context;
use frontal_bridge::{MessageFromBackend, MessageToBackend, navigation::Route};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

use crate::commands::{Command, HELP, parse_command};

pub mod commands;
pub mod formatting;

#[derive(Clone)]
pub struct BackendBridge {
    pub to_backend: mpsc::Sender<MessageToBackend>,
}

impl BackendBridge {
    pub async fn send(&self, message: MessageToBackend) -> anyhow::Result<()> {
        self.to_backend
            .send(message)
            .await
            .context("backend stopped accepting messages")
    }

    pub async fn request_config(&self) -> anyhow::Result<()> {
        self.send(MessageToBackend::ConfigurationRequest).await
    }

    pub async fn navigate(&self, route: Route) -> anyhow::Result<()> {
        self.send(MessageToBackend::Navigate(route)).await
    }
}

async fn drive(
    mut rx: mpsc::Receiver<MessageFromBackend>,
    bridge: BackendBridge,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type `help` for the list of commands.");
    bridge.navigate(Route::Home).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(Command::Backend(message))) => bridge.send(message).await?,
                    Ok(Some(Command::Help)) => println!("{HELP}"),
                    Ok(Some(Command::Quit)) => break,
                    Ok(None) => {}
                    Err(error) => println!("{error}"),
                }
            }
            message = rx.recv() => {
                let Some(message) = message else {
                    log::warn!("Backend closed the bridge");
                    break;
                };
                log::debug!("Got a message from backend: {message:?}");
                if let Some(text) = formatting::format_message(&message) {
                    println!("{text}");
                }
            }
        }
    }

    Ok(())
}

/// Runs the console until `quit`, end of input or backend shutdown.
pub fn run(
    rx: mpsc::Receiver<MessageFromBackend>,
    tx: mpsc::Sender<MessageToBackend>,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .context("failed to build the frontend runtime")?;

    let bridge = BackendBridge { to_backend: tx };
    runtime.block_on(async move {
        bridge.request_config().await?;
        drive(rx, bridge).await
    })
}
