//! Upload/predict state machine.
//!
//! The controller does no I/O. Callers take a [`SubmitTicket`] from
//! [`Controller::begin_submit`], run the request themselves, and hand the
//! outcome back through [`Controller::complete`]. Every selection bumps a
//! generation counter; outcomes carrying an older generation are dropped.

use crate::error::PredictError;
use crate::models::prediction_types::PredictionResult;
use crate::models::session_types::{Notice, NoticeLevel, RequestState, SessionView};
use crate::models::upload_types::{PreviewHandle, SelectedFile, Selection};
use crate::services::renderer;

pub const NO_FILE_MESSAGE: &str = "Please select an image first.";

/// Proof that a request was admitted; carries the file to upload.
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub generation: u64,
    pub file: SelectedFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(RequestState),
    /// The selection changed while the request was in flight.
    Stale,
}

#[derive(Debug)]
pub struct Controller {
    state: RequestState,
    selection: Option<Selection>,
    result: Option<PredictionResult>,
    show_overlay: bool,
    overlay_opacity: f32,
    generation: u64,
    outstanding: Option<u64>,
    notice: Option<Notice>,
}

impl Controller {
    pub fn new(overlay_opacity: f32) -> Self {
        Self {
            state: RequestState::Idle,
            selection: None,
            result: None,
            show_overlay: true,
            overlay_opacity,
            generation: 0,
            outstanding: None,
            notice: None,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Stored result, regardless of whether it is currently displayable.
    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    /// Result paired with the selection that produced it; only while Succeeded.
    pub fn current_result(&self) -> Option<(&PredictionResult, &Selection)> {
        if self.state != RequestState::Succeeded {
            return None;
        }
        self.result.as_ref().zip(self.selection.as_ref())
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn show_overlay(&self) -> bool {
        self.show_overlay
    }

    pub fn is_busy(&self) -> bool {
        self.outstanding.is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.selection.is_some() && !self.is_busy()
    }

    /// Replace the selection. Returns the superseded preview, which the caller
    /// must revoke.
    pub fn select(&mut self, selection: Selection) -> Option<PreviewHandle> {
        self.generation += 1;
        self.result = None;
        self.notice = None;
        self.state = RequestState::ReadyToSubmit;

        tracing::info!(
            file = %selection.file.name,
            bytes = selection.file.len(),
            generation = self.generation,
            "Image selected"
        );

        self.selection.replace(selection).map(|old| old.preview)
    }

    /// Drop the selection and any result; back to Idle.
    pub fn clear(&mut self) -> Option<PreviewHandle> {
        self.generation += 1;
        self.result = None;
        self.notice = None;
        self.state = RequestState::Idle;
        self.selection.take().map(|old| old.preview)
    }

    pub fn begin_submit(&mut self) -> Result<SubmitTicket, PredictError> {
        if self.outstanding.is_some() {
            tracing::debug!("Submit ignored, request already in flight");
            return Err(PredictError::InFlight);
        }

        let Some(selection) = self.selection.as_ref() else {
            tracing::warn!("Submit without a selected image");
            self.notice = Some(Notice {
                level: NoticeLevel::Warning,
                message: NO_FILE_MESSAGE.to_string(),
            });
            return Err(PredictError::validation(NO_FILE_MESSAGE));
        };

        let ticket = SubmitTicket {
            generation: self.generation,
            file: selection.file.clone(),
        };

        self.outstanding = Some(self.generation);
        self.notice = None;
        self.state = RequestState::InFlight;
        Ok(ticket)
    }

    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<PredictionResult, PredictError>,
    ) -> Completion {
        if self.outstanding == Some(generation) {
            self.outstanding = None;
        }

        if generation != self.generation {
            tracing::info!(
                generation,
                current = self.generation,
                "Discarding response for a superseded selection"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(result) => {
                tracing::info!(
                    flood_percent = result.flood_percent,
                    risk = %result.risk_label,
                    prediction = %result.prediction,
                    "Prediction succeeded"
                );
                self.result = Some(result);
                self.notice = None;
                self.state = RequestState::Succeeded;
            }
            Err(err) => {
                tracing::error!("Prediction failed: {}", err);
                self.notice = Some(Notice {
                    level: NoticeLevel::Error,
                    message: err.user_message(),
                });
                self.state = RequestState::Failed;
            }
        }

        Completion::Applied(self.state)
    }

    pub fn set_overlay(&mut self, visible: bool) {
        self.show_overlay = visible;
    }

    pub fn toggle_overlay(&mut self) -> bool {
        self.show_overlay = !self.show_overlay;
        self.show_overlay
    }

    pub fn view(&self) -> SessionView {
        let result = self.current_result().map(|(result, selection)| {
            renderer::render(result, &selection.preview, self.show_overlay, self.overlay_opacity)
        });

        SessionView {
            state: self.state,
            can_submit: self.can_submit(),
            file_name: self.selection.as_ref().map(|s| s.file.name.clone()),
            preview_url: self.selection.as_ref().map(|s| s.preview.url.clone()),
            image: self.selection.as_ref().map(|s| s.info.clone()),
            show_overlay: self.show_overlay,
            result,
            notice: self.notice.clone(),
        }
    }
}
