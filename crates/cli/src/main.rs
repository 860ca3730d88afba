use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use patientor_core::config::{
    flag_from_env_value, REJECT_DUPLICATE_DIAGNOSES_ENV, REQUIRE_SICK_LEAVE_ORDER_ENV,
};
use patientor_core::{
    is_valid_date, DiagnosisCatalog, Entry, EntryFormController, EntrySubmitter, EntryType,
    FieldPath, FieldValue, FormConfig, FormError, NewEntry, SubmitError, SubmitOutcome,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "patientor")]
#[command(about = "Patientor medical entry CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the add-entry form and submit it
    NewEntry(NewEntryArgs),
    /// Print the labels of a diagnosis catalog
    Diagnoses {
        /// JSON file with the diagnosis list
        #[arg(long)]
        catalog: PathBuf,
    },
    /// Check a value against the entry date format (YYYY-MM-DD)
    CheckDate {
        value: String,
    },
}

#[derive(Args, Debug, Default)]
struct NewEntryArgs {
    /// Entry type: hospital, occupational-healthcare or health-check
    #[arg(long = "type", value_parser = parse_entry_type)]
    entry_type: Option<EntryType>,
    #[arg(long)]
    description: Option<String>,
    /// Entry date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    specialist: Option<String>,
    /// Diagnosis code; repeat for several
    #[arg(long = "diagnosis-code")]
    diagnosis_codes: Vec<String>,
    #[arg(long)]
    discharge_date: Option<String>,
    #[arg(long)]
    discharge_criteria: Option<String>,
    #[arg(long)]
    employer_name: Option<String>,
    /// Sick leave start date; setting either sick leave date includes sick leave
    #[arg(long)]
    sick_leave_start: Option<String>,
    #[arg(long)]
    sick_leave_end: Option<String>,
    /// Health check rating (0 healthy to 3 critical risk)
    #[arg(long, allow_hyphen_values = true)]
    rating: Option<f64>,
    /// JSON file with the diagnosis list, used for labels
    #[arg(long = "diagnoses")]
    diagnoses: Option<PathBuf>,
}

fn parse_entry_type(value: &str) -> Result<EntryType, FormError> {
    EntryType::parse(value)
}

/// Stands in for the patients API: assigns an id and answers with the stored entry.
///
/// The answer goes through the JSON wire format so it is read back the way a
/// real response would be.
struct LocalSubmitter;

impl EntrySubmitter for LocalSubmitter {
    fn submit(
        &self,
        payload: NewEntry,
    ) -> impl std::future::Future<Output = Result<Entry, SubmitError>> {
        let id = uuid::Uuid::new_v4().to_string();
        async move {
            let body = serde_json::to_string(&payload.with_id(id))
                .map_err(|e| SubmitError::Rejected(format!("failed to encode entry: {e}")))?;
            Entry::parse_json(&body)
        }
    }
}

fn form_config_from_env() -> anyhow::Result<FormConfig> {
    let reject_duplicates = flag_from_env_value(
        REJECT_DUPLICATE_DIAGNOSES_ENV,
        std::env::var(REJECT_DUPLICATE_DIAGNOSES_ENV).ok(),
    )?;
    let require_order = flag_from_env_value(
        REQUIRE_SICK_LEAVE_ORDER_ENV,
        std::env::var(REQUIRE_SICK_LEAVE_ORDER_ENV).ok(),
    )?;
    Ok(FormConfig::new(reject_duplicates, require_order))
}

fn load_catalog(path: &Path) -> anyhow::Result<DiagnosisCatalog> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read diagnosis catalog {}", path.display()))?;
    DiagnosisCatalog::from_json(&text)
        .with_context(|| format!("failed to parse diagnosis catalog {}", path.display()))
}

/// Feeds the given flags into the form, one event per flag.
fn apply_new_entry_args(
    controller: &mut EntryFormController,
    args: &NewEntryArgs,
) -> anyhow::Result<()> {
    if let Some(entry_type) = args.entry_type {
        controller.select_variant(entry_type)?;
    }

    let text_fields = [
        (FieldPath::Description, &args.description),
        (FieldPath::Date, &args.date),
        (FieldPath::Specialist, &args.specialist),
        (FieldPath::DischargeDate, &args.discharge_date),
        (FieldPath::DischargeCriteria, &args.discharge_criteria),
        (FieldPath::EmployerName, &args.employer_name),
    ];
    for (path, value) in text_fields {
        if let Some(value) = value {
            controller
                .set_field(path, FieldValue::Text(value.clone()))
                .with_context(|| format!("cannot set --{}", flag_name(path)))?;
        }
    }

    if !args.diagnosis_codes.is_empty() {
        controller.set_diagnosis_codes(args.diagnosis_codes.clone())?;
    }

    if args.sick_leave_start.is_some() || args.sick_leave_end.is_some() {
        controller
            .set_include_sick_leave(true)
            .context("sick leave flags need --type occupational-healthcare")?;
        let dates = [
            (FieldPath::SickLeaveStartDate, &args.sick_leave_start),
            (FieldPath::SickLeaveEndDate, &args.sick_leave_end),
        ];
        for (path, value) in dates {
            controller.set_field(path, FieldValue::Text(value.clone().unwrap_or_default()))?;
        }
    }

    if let Some(rating) = args.rating {
        controller
            .set_field(FieldPath::HealthCheckRating, FieldValue::Number(rating))
            .context("--rating needs --type health-check")?;
    }

    Ok(())
}

fn flag_name(path: FieldPath) -> &'static str {
    match path {
        FieldPath::Description => "description",
        FieldPath::Date => "date",
        FieldPath::Specialist => "specialist",
        FieldPath::DischargeDate => "discharge-date",
        FieldPath::DischargeCriteria => "discharge-criteria",
        FieldPath::EmployerName => "employer-name",
        _ => path.as_str(),
    }
}

async fn run_new_entry(args: NewEntryArgs) -> anyhow::Result<ExitCode> {
    let config = form_config_from_env()?;
    let catalog = match &args.diagnoses {
        Some(path) => load_catalog(path)?,
        None => DiagnosisCatalog::new(),
    };

    let mut controller = EntryFormController::new(config, Arc::new(catalog), || {
        tracing::debug!("entry form closed")
    });
    apply_new_entry_args(&mut controller, &args)?;

    for label in controller.diagnosis_selection().selected_labels() {
        tracing::info!(diagnosis = %label, "diagnosis selected");
    }

    match controller.submit_with(&LocalSubmitter).await? {
        SubmitOutcome::Submitted(entry) => {
            println!("{}", serde_json::to_string_pretty(&entry)?);
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Invalid(errors) => {
            println!("{}", serde_json::to_string_pretty(&errors.to_json())?);
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::Rejected(message) => {
            eprintln!("Error submitting entry: {message}");
            Ok(ExitCode::FAILURE)
        }
        SubmitOutcome::AlreadySubmitting | SubmitOutcome::Ignored => Ok(ExitCode::FAILURE),
    }
}

fn run_diagnoses(catalog: &Path) -> anyhow::Result<ExitCode> {
    let catalog = load_catalog(catalog)?;
    if catalog.is_empty() {
        println!("No diagnoses found.");
    }
    for option in catalog.options() {
        println!("{}", option.label);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check_date(value: String) -> ExitCode {
    if is_valid_date(&serde_json::Value::String(value.clone())) {
        println!("{value}: valid date");
        ExitCode::SUCCESS
    } else {
        println!("{value}: invalid date");
        ExitCode::FAILURE
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patientor=info".parse()?)
                .add_directive("patientor_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::NewEntry(args) => run_new_entry(args).await,
        Commands::Diagnoses { catalog } => run_diagnoses(&catalog),
        Commands::CheckDate { value } => Ok(run_check_date(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patientor_core::validation::FieldErrors;
    use std::io::Write;

    fn parse_new_entry(args: &[&str]) -> NewEntryArgs {
        let argv = std::iter::once("patientor")
            .chain(std::iter::once("new-entry"))
            .chain(args.iter().copied());
        match Cli::try_parse_from(argv).expect("arguments should parse").command {
            Commands::NewEntry(args) => args,
            _ => panic!("expected new-entry"),
        }
    }

    fn controller() -> EntryFormController {
        EntryFormController::new(FormConfig::default(), Arc::new(DiagnosisCatalog::new()), || {})
    }

    #[test]
    fn test_type_flag_accepts_cli_spelling() {
        let args = parse_new_entry(&["--type", "occupational-healthcare"]);
        assert_eq!(args.entry_type, Some(EntryType::OccupationalHealthcare));
        assert!(Cli::try_parse_from(["patientor", "new-entry", "--type", "surgery"]).is_err());
    }

    #[test]
    fn test_apply_args_builds_valid_health_check() {
        let args = parse_new_entry(&[
            "--type",
            "health-check",
            "--description",
            "Yearly control visit",
            "--date",
            "2019-10-20",
            "--specialist",
            "MD House",
            "--diagnosis-code",
            "Z57.1",
            "--diagnosis-code",
            "M51.2",
            "--rating",
            "1",
        ]);
        let mut controller = controller();
        apply_new_entry_args(&mut controller, &args).expect("flags apply");

        assert!(controller.can_submit());
        assert_eq!(controller.state().base.diagnosis_codes, vec!["Z57.1", "M51.2"]);
    }

    #[test]
    fn test_apply_args_reports_missing_fields_as_nested_json() {
        let args = parse_new_entry(&[
            "--type",
            "hospital",
            "--description",
            "Thumb injury",
            "--date",
            "2015-01-02",
            "--specialist",
            "MD House",
            "--discharge-date",
            "2015-01-16",
        ]);
        let mut controller = controller();
        apply_new_entry_args(&mut controller, &args).expect("flags apply");

        let errors: FieldErrors = controller.errors();
        assert_eq!(
            errors.to_json(),
            serde_json::json!({ "discharge": { "criteria": "Field is required" } })
        );
    }

    #[test]
    fn test_apply_args_rejects_flag_for_other_variant() {
        let args = parse_new_entry(&["--type", "hospital", "--employer-name", "HyPD"]);
        let mut controller = controller();
        let err = apply_new_entry_args(&mut controller, &args)
            .expect_err("employer name does not exist on hospital entries");
        assert!(err.to_string().contains("--employer-name"));
    }

    #[test]
    fn test_sick_leave_flag_turns_on_sick_leave() {
        let args = parse_new_entry(&[
            "--type",
            "occupational",
            "--sick-leave-start",
            "2019-08-05",
        ]);
        let mut controller = controller();
        apply_new_entry_args(&mut controller, &args).expect("flags apply");

        let toggle = controller.sick_leave_toggle().expect("occupational entry");
        assert!(toggle.checked);
        assert!(controller.errors().contains(FieldPath::SickLeaveEndDate));
    }

    #[tokio::test]
    async fn test_local_submitter_assigns_id() {
        let args = parse_new_entry(&[
            "--type",
            "health-check",
            "--description",
            "Checkup",
            "--date",
            "2019-10-20",
            "--specialist",
            "MD House",
        ]);
        let mut controller = controller();
        apply_new_entry_args(&mut controller, &args).expect("flags apply");

        let outcome = controller
            .submit_with(&LocalSubmitter)
            .await
            .expect("form is open");
        match outcome {
            SubmitOutcome::Submitted(entry) => {
                assert!(uuid::Uuid::parse_str(&entry.id).is_ok());
                assert_eq!(entry.entry_type(), EntryType::HealthCheck);
            }
            other => panic!("expected submitted entry, got {other:?}"),
        }
        assert!(controller.is_closed());
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        write!(
            file,
            r#"[{{"code": "M24.2", "name": "Disorder of ligament", "latin": "Morbositas ligamenti"}}]"#
        )
        .expect("write catalog");

        let catalog = load_catalog(file.path()).expect("catalog should load");
        assert_eq!(catalog.label_for("M24.2"), "Disorder of ligament (M24.2)");
    }

    #[test]
    fn test_load_catalog_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        write!(file, "not json").expect("write catalog");

        let err = load_catalog(file.path()).expect_err("invalid catalog");
        assert!(err.to_string().contains("failed to parse diagnosis catalog"));
    }

    #[test]
    fn test_check_date_exit_codes() {
        assert_eq!(run_check_date("2024-02-29".into()), ExitCode::SUCCESS);
        assert_eq!(run_check_date("2023-02-29".into()), ExitCode::FAILURE);
    }
}
