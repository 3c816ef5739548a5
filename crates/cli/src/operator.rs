use engine_runtime::Importer;
use std::{io::BufRead, str::FromStr, sync::Arc};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

/// A control request typed by the operator on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    Pause,
    Resume,
    Stop,
}

impl FromStr for OperatorCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pause" | "p" => Ok(OperatorCommand::Pause),
            "resume" | "r" | "continue" => Ok(OperatorCommand::Resume),
            "stop" | "s" | "abort" => Ok(OperatorCommand::Stop),
            other => Err(format!("unknown command '{other}' (expected pause, resume or stop)")),
        }
    }
}

impl OperatorCommand {
    pub fn apply(self, importer: &Importer) {
        match self {
            OperatorCommand::Pause => importer.pause(),
            OperatorCommand::Resume => importer.resume(),
            OperatorCommand::Stop => importer.stop(),
        }
    }
}

/// Reads operator commands from stdin and forwards them to the importer.
///
/// Stdin is read on a plain thread because blocking reads would otherwise
/// keep the runtime alive after the import is done.
pub fn listen(importer: Arc<Importer>) -> JoinHandle<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<OperatorCommand>() {
                Ok(command) => {
                    info!(?command, "Operator request");
                    command.apply(&importer);
                }
                Err(e) => warn!("{e}"),
            }
        }
    })
}
