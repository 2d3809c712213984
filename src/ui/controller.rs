use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::orchestrator::TranslationOrchestrator;
use crate::core::{
    ConnectivityState, Credential, TargetLanguage, TranslationRequest, TranslationResult,
    TranslationService,
};
use crate::domain::ports::{FileSelector, Presenter};
use crate::ui::command::{language_listing, UserCommand, HELP_TEXT};
use crate::ui::gate::{status_label, ActionGate};
use crate::utils::error::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub type JobOutcome = Result<TranslationResult>;

/// Window state and handlers. Lives on the presentation loop; translation
/// jobs run on spawned tasks and report back through `outcomes`.
pub struct Controller<S, P, F>
where
    S: TranslationService + 'static,
    P: Presenter,
    F: FileSelector,
{
    orchestrator: Arc<TranslationOrchestrator<S>>,
    presenter: P,
    selector: F,
    credential: Credential,
    gate: ActionGate,
    source_path: Option<PathBuf>,
    language: TargetLanguage,
    job: Option<CancellationToken>,
    outcomes: mpsc::UnboundedSender<JobOutcome>,
}

impl<S, P, F> Controller<S, P, F>
where
    S: TranslationService + 'static,
    P: Presenter,
    F: FileSelector,
{
    pub fn new(
        orchestrator: Arc<TranslationOrchestrator<S>>,
        presenter: P,
        selector: F,
        credential: Credential,
        language: TargetLanguage,
        outcomes: mpsc::UnboundedSender<JobOutcome>,
    ) -> Self {
        Self {
            orchestrator,
            presenter,
            selector,
            credential,
            gate: ActionGate::new(),
            source_path: None,
            language,
            job: None,
            outcomes,
        }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    pub fn translate_enabled(&self) -> bool {
        self.gate.translate_enabled()
    }

    /// Draws every widget from current state.
    pub fn render(&mut self) {
        self.presenter.show_status(status_label(self.gate.connectivity()));
        if let Some(path) = &self.source_path {
            self.presenter.show_selected_file(path);
        }
        self.presenter.show_language(self.language);
        self.presenter
            .set_translate_enabled(self.gate.translate_enabled());
    }

    pub fn on_connectivity(&mut self, state: ConnectivityState) {
        self.gate.set_connectivity(state);
        self.presenter.show_status(status_label(state));
        self.presenter
            .set_translate_enabled(self.gate.translate_enabled());
    }

    pub fn handle_line(&mut self, line: &str) -> ControlFlow<()> {
        match UserCommand::parse(line) {
            Ok(Some(command)) => self.handle(command),
            Ok(None) => ControlFlow::Continue(()),
            Err(e) => {
                self.presenter.show_notice(&e.user_friendly_message());
                ControlFlow::Continue(())
            }
        }
    }

    pub fn handle(&mut self, command: UserCommand) -> ControlFlow<()> {
        match command {
            UserCommand::Open(input) => self.select_file(&input),
            UserCommand::Language(language) => self.select_language(language),
            UserCommand::Languages => self.presenter.show_notice(&language_listing()),
            UserCommand::Translate => self.request_translation(),
            UserCommand::Cancel => self.cancel_translation(),
            UserCommand::Status => self.render(),
            UserCommand::Help => self.presenter.show_notice(HELP_TEXT),
            UserCommand::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    pub fn select_file(&mut self, input: &str) {
        match self.selector.select(input) {
            Some(path) => {
                tracing::debug!("Selected {}", path.display());
                self.presenter.show_selected_file(&path);
                self.source_path = Some(path);
            }
            None => self.presenter.show_notice("No PDF file selected."),
        }
    }

    pub fn select_language(&mut self, language: TargetLanguage) {
        self.language = language;
        self.presenter.show_language(language);
    }

    /// Dispatches the translation onto a background task.
    pub fn request_translation(&mut self) {
        if self.gate.is_busy() {
            self.presenter
                .show_notice("A translation is already running. Type 'cancel' to stop it.");
            return;
        }
        if !self.gate.translate_enabled() {
            self.presenter
                .show_notice("Translate is unavailable until the connection is back.");
            return;
        }

        let request = TranslationRequest::new(
            self.source_path.clone().unwrap_or_default(),
            self.language,
            self.credential.clone(),
        );
        let cancel = CancellationToken::new();

        self.gate.set_busy(true);
        self.presenter.set_translate_enabled(false);
        self.presenter.show_notice(&format!(
            "Translating to {}... (type 'cancel' to stop)",
            self.language
        ));

        let orchestrator = Arc::clone(&self.orchestrator);
        let outcomes = self.outcomes.clone();
        let token = cancel.clone();
        tokio::spawn(async move {
            let outcome = orchestrator.translate(request, token).await;
            if outcomes.send(outcome).is_err() {
                tracing::debug!("Presentation loop gone before translation finished");
            }
        });

        self.job = Some(cancel);
    }

    pub fn cancel_translation(&mut self) {
        match &self.job {
            Some(token) => {
                tracing::info!("Cancelling translation");
                token.cancel();
                self.presenter.show_notice("Cancelling...");
            }
            None => self.presenter.show_notice("Nothing to cancel."),
        }
    }

    pub fn finish(&mut self, outcome: JobOutcome) {
        self.job = None;
        self.gate.set_busy(false);
        self.presenter
            .set_translate_enabled(self.gate.translate_enabled());

        match outcome {
            Ok(result) => {
                self.presenter.notify_success(
                    "Success!",
                    &format!(
                        "Translation completed and saved to:\n{}",
                        result.output_path.display()
                    ),
                );
            }
            Err(e) => {
                tracing::error!(
                    "Translation failed: {} (Category: {:?})",
                    e,
                    e.category()
                );
                tracing::debug!("Recovery suggestion: {}", e.recovery_suggestion());
                self.presenter
                    .notify_error(e.report_title(), &e.user_friendly_message());
            }
        }
    }

    /// Cancels the running job, if any. Returns whether one was running.
    pub fn shutdown(&mut self) -> bool {
        match self.job.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
