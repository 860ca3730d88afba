//! # Patientor Core
//!
//! Core logic of the Patientor add-entry form.
//!
//! This crate contains the form as pure data and state transitions:
//! - the entry model and its JSON wire shape ([`entry`])
//! - form state with one draft per entry variant ([`draft`]) and field bindings ([`fields`])
//! - validation ([`validators`], [`validation`])
//! - the controller that drives editing and submission ([`controller`])
//! - a client-side patient and diagnosis cache ([`store`])
//!
//! **No transport concerns**: the core never fetches or sends anything itself. Hosts
//! implement [`EntrySubmitter`] to reach the patients API and hand the controller a
//! [`DiagnosisCatalog`] snapshot.

pub mod config;
pub mod constants;
pub mod controller;
pub mod diagnosis;
pub mod draft;
pub mod entry;
pub mod error;
pub mod fields;
pub mod patient;
pub mod store;
pub mod validation;
pub mod validators;

pub use config::FormConfig;
pub use controller::{
    BeginSubmit, EntryFormController, EntrySubmitter, FormPhase, SubmitOutcome, SubmitTicket,
};
pub use diagnosis::{Diagnosis, DiagnosisCatalog, DiagnosisOption};
pub use draft::{FormState, VariantDraft};
pub use entry::{
    Discharge, Entry, EntryDetails, EntryType, HealthCheckRating, NewEntry, SickLeave,
};
pub use error::{FormError, FormResult, SubmitError};
pub use fields::{FieldKind, FieldPath, FieldValue, FieldView};
pub use patient::{Gender, Patient};
pub use patientor_types::NonEmptyText;
pub use store::{PatientStore, StoreAction, StoreError, StoreResult};
pub use validation::{validate, validate_with, FieldErrors};
pub use validators::{is_valid_date, is_valid_health_check_rating};
