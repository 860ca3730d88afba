//! The add-entry form controller.
//!
//! [`EntryFormController`] owns the [`FormState`] for the lifetime of one open
//! form. It applies user events, re-validates, and runs the submit round-trip
//! against an [`EntrySubmitter`]. When the form is done, either after a
//! successful submit or on cancel, the controller fires its close callback
//! once and rejects every further mutation with [`FormError::Closed`].
//!
//! Submission comes in two shapes:
//! - [`submit_with`](EntryFormController::submit_with) for async hosts.
//! - [`begin_submit`](EntryFormController::begin_submit) and
//!   [`complete_submit`](EntryFormController::complete_submit) for hosts that
//!   run the network call on their own event loop. A [`SubmitTicket`] ties a
//!   response to the submit that produced it, so responses that arrive after a
//!   cancel are dropped.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::config::FormConfig;
use crate::diagnosis::DiagnosisCatalog;
use crate::draft::FormState;
use crate::entry::{Entry, EntryType, NewEntry};
use crate::error::{FormError, FormResult, SubmitError};
use crate::fields::{
    DiagnosisSelection, FieldPath, FieldValue, FieldView, SickLeaveToggle, VariantOption,
};
use crate::validation::{validate_with, FieldErrors};

/// Sends a normalized entry to the patients API.
///
/// Implementations return the stored [`Entry`] on success, or a
/// [`SubmitError`] carrying the message to show the user.
pub trait EntrySubmitter {
    fn submit(&self, payload: NewEntry) -> impl Future<Output = Result<Entry, SubmitError>>;
}

/// Lifecycle phase of the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    Submitting,
    Closed,
}

/// Proof that a submit was started. Redeemed once by
/// [`EntryFormController::complete_submit`].
#[derive(Debug, PartialEq, Eq)]
pub struct SubmitTicket {
    generation: u64,
    entry_type: EntryType,
}

impl SubmitTicket {
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }
}

/// Result of [`EntryFormController::begin_submit`].
#[derive(Debug)]
pub enum BeginSubmit {
    /// The form is valid; send `payload` and hand the result back with `ticket`.
    Ready {
        ticket: SubmitTicket,
        payload: NewEntry,
    },
    /// Validation failed; nothing is sent.
    Invalid(FieldErrors),
    /// A submit is already outstanding.
    InFlight,
}

/// What a submit attempt ended in.
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    /// The API stored the entry. The form is now closed.
    Submitted(Entry),
    /// Validation failed; the callback was not invoked.
    Invalid(FieldErrors),
    /// The API refused the entry. The message is also available from
    /// [`EntryFormController::submit_error`] and all input is kept.
    Rejected(String),
    /// A submit was already in flight; nothing happened.
    AlreadySubmitting,
    /// The response arrived for a form that was closed or a stale submit.
    Ignored,
}

pub struct EntryFormController {
    config: FormConfig,
    catalog: Arc<DiagnosisCatalog>,
    state: FormState,
    phase: FormPhase,
    touched: BTreeSet<FieldPath>,
    submit_attempted: bool,
    submit_error: Option<String>,
    generation: u64,
    on_close: Option<Box<dyn FnMut()>>,
}

impl EntryFormController {
    /// Opens a fresh form with no variant selected.
    pub fn new(
        config: FormConfig,
        catalog: Arc<DiagnosisCatalog>,
        on_close: impl FnMut() + 'static,
    ) -> Self {
        Self {
            config,
            catalog,
            state: FormState::new(),
            phase: FormPhase::Editing,
            touched: BTreeSet::new(),
            submit_attempted: false,
            submit_error: None,
            generation: 0,
            on_close: Some(Box::new(on_close)),
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == FormPhase::Closed
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn ensure_open(&self) -> FormResult<()> {
        if self.is_closed() {
            return Err(FormError::Closed);
        }
        Ok(())
    }

    /// Switches the entry variant, keeping the common fields.
    pub fn select_variant(&mut self, target: EntryType) -> FormResult<()> {
        self.ensure_open()?;
        tracing::debug!(from = ?self.state.entry_type(), to = %target, "select entry variant");
        self.state.select_variant(target);
        self.touched.insert(FieldPath::EntryType);
        Ok(())
    }

    /// Writes one text or number field. See [`FormState::set_field`].
    pub fn set_field(&mut self, path: FieldPath, value: FieldValue) -> FormResult<()> {
        self.ensure_open()?;
        self.state.set_field(path, value)?;
        tracing::debug!(field = %path, "field updated");
        self.touched.insert(path);
        Ok(())
    }

    /// Writes a text field addressed by its path string, such as `discharge.date`.
    pub fn set_field_str(&mut self, path: &str, value: impl Into<String>) -> FormResult<()> {
        let path: FieldPath = path.parse()?;
        self.set_field(path, FieldValue::Text(value.into()))
    }

    pub fn set_include_sick_leave(&mut self, include: bool) -> FormResult<()> {
        self.ensure_open()?;
        self.state.set_include_sick_leave(include)?;
        tracing::debug!(include, "sick leave toggled");
        self.touched.insert(FieldPath::IncludeSickLeave);
        Ok(())
    }

    /// Replaces the diagnosis selection.
    pub fn set_diagnosis_codes(&mut self, codes: Vec<String>) -> FormResult<()> {
        self.ensure_open()?;
        tracing::debug!(count = codes.len(), "diagnosis selection replaced");
        self.state.set_diagnosis_codes(codes);
        self.touched.insert(FieldPath::DiagnosisCodes);
        Ok(())
    }

    /// Every current validation error.
    pub fn errors(&self) -> FieldErrors {
        validate_with(&self.state, &self.config)
    }

    /// Errors to display: those of touched fields, or all of them once a
    /// submit has been attempted.
    pub fn visible_errors(&self) -> FieldErrors {
        let mut errors = self.errors();
        if !self.submit_attempted {
            errors.retain(|path| self.touched.contains(&path));
        }
        errors
    }

    /// `true` when the form is valid and no submit is outstanding.
    pub fn can_submit(&self) -> bool {
        self.phase == FormPhase::Editing && self.errors().is_empty()
    }

    /// Message of the last rejected submit, cleared when a new submit starts.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn field_views(&self) -> Vec<FieldView> {
        self.state.field_views(&self.visible_errors())
    }

    pub fn variant_options(&self) -> [VariantOption; 3] {
        self.state.variant_options()
    }

    pub fn sick_leave_toggle(&self) -> Option<SickLeaveToggle> {
        self.state.sick_leave_toggle()
    }

    pub fn diagnosis_selection(&self) -> DiagnosisSelection<'_> {
        DiagnosisSelection::new(&self.state.base.diagnosis_codes, &self.catalog)
    }

    /// Validates and, if valid, marks the form as submitting.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::Closed`] once the form has closed.
    pub fn begin_submit(&mut self) -> FormResult<BeginSubmit> {
        self.ensure_open()?;
        if self.phase == FormPhase::Submitting {
            tracing::debug!("submit ignored, request already in flight");
            return Ok(BeginSubmit::InFlight);
        }

        self.submit_attempted = true;
        let errors = self.errors();
        if !errors.is_empty() {
            tracing::debug!(errors = errors.len(), "submit blocked by validation");
            return Ok(BeginSubmit::Invalid(errors));
        }
        // A draft without validation errors always normalizes.
        let Some(payload) = self.state.normalize() else {
            return Ok(BeginSubmit::Invalid(errors));
        };

        self.generation += 1;
        self.phase = FormPhase::Submitting;
        self.submit_error = None;
        let ticket = SubmitTicket {
            generation: self.generation,
            entry_type: payload.entry_type(),
        };
        tracing::info!(entry_type = %ticket.entry_type, "submitting entry");
        Ok(BeginSubmit::Ready { ticket, payload })
    }

    /// Applies the response for `ticket`.
    ///
    /// A response whose variant differs from the submitted one is treated as
    /// a rejection. Responses for a closed form or a superseded ticket are
    /// ignored.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<Entry, SubmitError>,
    ) -> SubmitOutcome {
        if self.phase != FormPhase::Submitting || ticket.generation != self.generation {
            tracing::warn!(
                phase = ?self.phase,
                entry_type = %ticket.entry_type,
                "ignoring late submit response"
            );
            return SubmitOutcome::Ignored;
        }

        let result = result.and_then(|entry| {
            let received = entry.entry_type();
            if received == ticket.entry_type {
                Ok(entry)
            } else {
                Err(SubmitError::variant_mismatch(ticket.entry_type, received))
            }
        });

        match result {
            Ok(entry) => {
                tracing::info!(id = %entry.id, entry_type = %ticket.entry_type, "entry submitted");
                self.close();
                SubmitOutcome::Submitted(entry)
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, "entry submit failed");
                self.phase = FormPhase::Editing;
                self.submit_error = Some(message.clone());
                SubmitOutcome::Rejected(message)
            }
        }
    }

    /// Validates, submits through `submitter` and applies the response.
    pub async fn submit_with<S: EntrySubmitter>(
        &mut self,
        submitter: &S,
    ) -> FormResult<SubmitOutcome> {
        match self.begin_submit()? {
            BeginSubmit::Ready { ticket, payload } => {
                let result = submitter.submit(payload).await;
                Ok(self.complete_submit(ticket, result))
            }
            BeginSubmit::Invalid(errors) => Ok(SubmitOutcome::Invalid(errors)),
            BeginSubmit::InFlight => Ok(SubmitOutcome::AlreadySubmitting),
        }
    }

    /// Discards all input and closes the form. Does nothing once closed.
    pub fn cancel(&mut self) {
        if self.is_closed() {
            return;
        }
        tracing::info!(phase = ?self.phase, "entry form cancelled");
        self.close();
    }

    fn close(&mut self) {
        self.phase = FormPhase::Closed;
        self.state = FormState::new();
        self.touched.clear();
        self.submit_attempted = false;
        self.submit_error = None;
        if let Some(mut on_close) = self.on_close.take() {
            on_close();
        }
    }
}

impl fmt::Debug for EntryFormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryFormController")
            .field("config", &self.config)
            .field("catalog_len", &self.catalog.len())
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("submit_error", &self.submit_error)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
