use crate::domain::language::TargetLanguage;
use crate::utils::error::{Result, TranslatorError};
use std::io::BufRead;
use tokio::sync::mpsc;

pub const HELP_TEXT: &str = "\
Commands:
  open <path>    select the PDF file to translate (alias: browse)
  lang <CODE>    choose the target language, e.g. lang FR
  languages      list supported target languages
  translate      translate the selected file
  cancel         cancel the running translation
  status         redraw the window
  help           show this help
  quit           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Open(String),
    Language(TargetLanguage),
    Languages,
    Translate,
    Cancel,
    Status,
    Help,
    Quit,
}

impl UserCommand {
    /// Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "open" | "browse" => {
                if rest.is_empty() {
                    return Err(TranslatorError::validation("Usage: open <path>"));
                }
                Self::Open(rest.to_string())
            }
            "lang" | "language" => {
                if rest.is_empty() {
                    return Err(TranslatorError::validation("Usage: lang <CODE>"));
                }
                let language = rest.parse::<TargetLanguage>().map_err(|_| {
                    TranslatorError::validation(format!(
                        "Unsupported language '{}'. Type 'languages' for the list.",
                        rest
                    ))
                })?;
                Self::Language(language)
            }
            "languages" => Self::Languages,
            "translate" | "t" => Self::Translate,
            "cancel" => Self::Cancel,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => {
                return Err(TranslatorError::validation(format!(
                    "Unknown command '{}'. Type 'help' for the list.",
                    other
                )))
            }
        };
        Ok(Some(command))
    }
}

pub fn language_listing() -> String {
    TargetLanguage::ALL
        .iter()
        .map(|lang| format!("  {:<6} {}", lang.code(), lang.name()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Forwards stdin lines to the presentation loop until EOF.
///
/// Reads on a dedicated OS thread; runtime shutdown must not wait on a pending read.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    let spawned = std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read from stdin: {}", e);
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        tracing::error!("Could not start stdin reader: {}", e);
    }
    rx
}
