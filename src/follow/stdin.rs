//! Stdin commands while following

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use proclog_app::Message;
use proclog_core::{DisplayOptions, InstanceId};

/// Commands accepted on stdin, one per line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdinCommand {
    Refresh,
    Whole,
    Stop,
    Quit,
}

impl StdinCommand {
    /// Parse a trimmed line; `None` for blank or unknown input
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "r" | "refresh" => Some(Self::Refresh),
            "w" | "whole" => Some(Self::Whole),
            "s" | "stop" => Some(Self::Stop),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }

    pub fn into_message(self, instance_id: InstanceId, options: DisplayOptions) -> Message {
        match self {
            Self::Refresh => Message::ForceRefresh,
            Self::Whole => Message::LoadWholeLog {
                instance_id,
                options,
            },
            Self::Stop => Message::StopPolling,
            Self::Quit => Message::Quit,
        }
    }
}

/// Read stdin commands and forward them to the engine (blocking; run on a
/// dedicated thread)
pub fn spawn_stdin_reader_blocking(
    msg_tx: mpsc::Sender<Message>,
    instance_id: InstanceId,
    options: DisplayOptions,
) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let Some(command) = StdinCommand::parse(trimmed) else {
                    warn!("Unknown stdin command: {}", trimmed);
                    continue;
                };

                info!("Stdin: {:?} requested", command);
                let msg = command.into_message(instance_id, options);
                if msg_tx.blocking_send(msg).is_err() || command == StdinCommand::Quit {
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    info!("Stdin reader exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(StdinCommand::parse("r"), Some(StdinCommand::Refresh));
        assert_eq!(
            StdinCommand::parse(" refresh "),
            Some(StdinCommand::Refresh)
        );
        assert_eq!(StdinCommand::parse("w"), Some(StdinCommand::Whole));
        assert_eq!(StdinCommand::parse("stop"), Some(StdinCommand::Stop));
        assert_eq!(StdinCommand::parse("q"), Some(StdinCommand::Quit));
        assert_eq!(StdinCommand::parse(""), None);
        assert_eq!(StdinCommand::parse("reload"), None);
    }

    #[test]
    fn test_whole_command_targets_followed_instance() {
        let id: InstanceId = "0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b".parse().unwrap();
        let options = DisplayOptions::new(true, false);
        match StdinCommand::Whole.into_message(id, options) {
            Message::LoadWholeLog {
                instance_id,
                options: o,
            } => {
                assert_eq!(instance_id, id);
                assert_eq!(o, options);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
