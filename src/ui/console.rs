use std::io::{self, Stdout, Write};
use std::path::Path;

use crate::domain::language::TargetLanguage;
use crate::domain::ports::{Presenter, StatusColor, StatusLabel};
use colored::Colorize;

pub const WINDOW_TITLE: &str = "PDF Translator";

/// Terminal rendering of the translator window.
pub struct ConsolePresenter<W: Write> {
    out: W,
    translate_enabled: Option<bool>,
}

impl ConsolePresenter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            translate_enabled: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn open_window(&mut self) {
        let rule = "=".repeat(WINDOW_TITLE.len() + 8);
        self.line(&rule);
        self.line(&format!("    {}", WINDOW_TITLE.bold()));
        self.line(&rule);
        self.line(&"Type 'help' for commands.".dimmed().to_string());
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to write to the terminal: {}", e);
        }
    }

    fn dialog(&mut self, title: &str, message: &str, color: StatusColor) {
        let heading = format!("[ {} ]", title);
        let heading = match color {
            StatusColor::Green => heading.green().bold(),
            StatusColor::Red => heading.red().bold(),
            StatusColor::Neutral => heading.bold(),
        };
        self.line(&heading.to_string());
        for text in message.lines() {
            self.line(&format!("  {}", text));
        }
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn show_status(&mut self, label: StatusLabel) {
        let text = match label.color {
            StatusColor::Green => label.text.green(),
            StatusColor::Red => label.text.red(),
            StatusColor::Neutral => label.text.normal(),
        };
        self.line(&format!("Status: {}", text));
    }

    fn set_translate_enabled(&mut self, enabled: bool) {
        if self.translate_enabled == Some(enabled) {
            return;
        }
        self.translate_enabled = Some(enabled);
        let button = if enabled {
            "[ Translate ] ready".green().to_string()
        } else {
            "[ Translate ] disabled".dimmed().to_string()
        };
        self.line(&button);
    }

    fn show_selected_file(&mut self, path: &Path) {
        self.line(&format!("Select PDF File: {}", path.display()));
    }

    fn show_language(&mut self, language: TargetLanguage) {
        self.line(&format!("Target Language: {} ({})", language.code(), language.name()));
    }

    fn show_notice(&mut self, message: &str) {
        self.line(message);
    }

    fn notify_success(&mut self, title: &str, message: &str) {
        self.dialog(title, message, StatusColor::Green);
    }

    fn notify_error(&mut self, title: &str, message: &str) {
        self.dialog(title, message, StatusColor::Red);
    }
}
