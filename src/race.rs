use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::artifact::ArtifactGenerator;
use crate::error::Result;
use crate::mode::Gamemode;
use crate::paragraphs::ParagraphProvider;
use crate::report::SessionReport;
use crate::report_store::{SessionId, StatisticsSink};
use crate::session::{Keystroke, SideEffect, TypingSession};
use crate::sound::SoundNotifier;

/// The live session together with the collaborators it reports to.
pub struct Race {
    session: TypingSession,
    provider: Box<dyn ParagraphProvider>,
    sink: Box<dyn StatisticsSink>,
    artifacts: Option<Box<dyn ArtifactGenerator>>,
    sound: Box<dyn SoundNotifier>,
    last_report: Option<SessionReport>,
    session_id: Option<SessionId>,
    artifact_message: Option<String>,
    notice: Option<String>,
    elapsed_secs: u64,
}

impl Race {
    /// Fetches the first paragraph; without one there is nothing to type.
    pub fn start(
        mode: Gamemode,
        mut provider: Box<dyn ParagraphProvider>,
        sink: Box<dyn StatisticsSink>,
        artifacts: Option<Box<dyn ArtifactGenerator>>,
        sound: Box<dyn SoundNotifier>,
    ) -> Result<Self> {
        let paragraph = provider.fetch(mode)?;
        info!(id = paragraph.id, %mode, "race started");

        Ok(Self {
            session: TypingSession::new(paragraph, mode),
            provider,
            sink,
            artifacts,
            sound,
            last_report: None,
            session_id: None,
            artifact_message: None,
            notice: None,
            elapsed_secs: 0,
        })
    }

    /// Feed one keystroke; returns true if it finished the session.
    pub fn handle_key(&mut self, keystroke: Keystroke) -> bool {
        let mut finished = false;
        for effect in self.session.apply_keystroke(keystroke) {
            match effect {
                SideEffect::Sound(kind) => self.sound.play(kind),
                SideEffect::Finished(report) => {
                    let elapsed = self.session.clock().elapsed(keystroke.at);
                    self.elapsed_secs = elapsed.num_seconds() as u64;
                    self.publish(report);
                    finished = true;
                }
            }
        }
        finished
    }

    fn publish(&mut self, report: SessionReport) {
        match self.sink.submit(&report) {
            Ok(id) => {
                info!(session = %id, "report submitted");
                self.session_id = Some(id);
                if let Some(artifacts) = self.artifacts.as_mut() {
                    match artifacts.generate(id) {
                        Ok(message) => self.artifact_message = Some(message),
                        Err(e) => {
                            warn!(session = %id, error = %e, "artifact generation failed");
                            self.notice = Some(format!("could not create artifact: {e}"));
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "report submission failed");
                self.notice = Some(format!("could not save results: {e}"));
            }
        }
        self.last_report = Some(report);
    }

    /// Returns the elapsed seconds when the displayed value changes.
    pub fn on_tick(&mut self, now: DateTime<Local>) -> Option<u64> {
        let secs = self.session.tick(now)?;
        self.elapsed_secs = secs;
        Some(secs)
    }

    /// Start over on the same paragraph.
    pub fn restart(&mut self) {
        self.session.restart();
        self.clear_results();
    }

    /// Switch to a freshly fetched paragraph. On failure the current session
    /// is left untouched and a notice is raised.
    pub fn next_text(&mut self) -> bool {
        self.switch(self.session.mode())
    }

    pub fn set_mode(&mut self, mode: Gamemode) -> bool {
        self.switch(mode)
    }

    fn switch(&mut self, mode: Gamemode) -> bool {
        match self.provider.fetch(mode) {
            Ok(paragraph) => {
                info!(id = paragraph.id, %mode, "new paragraph");
                self.session = TypingSession::new(paragraph, mode);
                self.clear_results();
                true
            }
            Err(e) => {
                warn!(%mode, error = %e, "paragraph fetch failed, keeping current text");
                self.notice = Some(format!("could not load a new text: {e}"));
                false
            }
        }
    }

    fn clear_results(&mut self) {
        self.last_report = None;
        self.session_id = None;
        self.artifact_message = None;
        self.notice = None;
        self.elapsed_secs = 0;
    }

    pub fn session(&self) -> &TypingSession {
        &self.session
    }

    pub fn mode(&self) -> Gamemode {
        self.session.mode()
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_completed()
    }

    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn artifact_message(&self) -> Option<&str> {
        self.artifact_message.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }
}
