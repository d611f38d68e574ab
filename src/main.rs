//! Clinsight: clinical decision-support pipeline.
//!
//! Thin command-line front end standing in for the presentation layer:
//! reads one fully-populated encounter from a JSON file, runs the
//! pipeline, prints the ranked diagnoses and writes the PDF report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clinsight::adapters::pdf::PdfRenderer;
use clinsight::adapters::sanitize::SanitizingMakeWriter;
use clinsight::application::{self, validator, AttributionService, InferenceService, ResourceBundle};
use clinsight::PatientRecord;

struct Args {
    patient: PathBuf,
    models: PathBuf,
    out: PathBuf,
}

fn parse_args() -> Result<Args> {
    let mut patient = None;
    let mut models = PathBuf::from("models");
    let mut out = PathBuf::from(".");

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--models" => {
                models = PathBuf::from(
                    iter.next().context("--models requires a directory argument")?,
                );
            }
            "--out" => {
                out = PathBuf::from(iter.next().context("--out requires a directory argument")?);
            }
            "--help" | "-h" => {
                eprintln!("Usage: clinsight <patient.json> [--models <dir>] [--out <dir>]");
                std::process::exit(0);
            }
            other if patient.is_none() => patient = Some(PathBuf::from(other)),
            other => bail!("unexpected argument: {other}"),
        }
    }

    Ok(Args {
        patient: patient.context("missing required <patient.json> argument")?,
        models,
        out,
    })
}

fn init_logging() -> tracing_appender::non_blocking::WorkerGuard {
    // Logs go to a file when CLINSIGHT_LOG_FILE is set, otherwise to
    // stderr so stdout stays clean for the result summary.
    let (writer, guard) = match std::env::var("CLINSIGHT_LOG_FILE") {
        Ok(path) => {
            if let Some(parent) = std::path::Path::new(&path).parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => tracing_appender::non_blocking(file),
                Err(_) => tracing_appender::non_blocking(std::io::stderr()),
            }
        }
        Err(_) => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    guard
}

fn main() -> Result<()> {
    let _guard = init_logging();
    let args = parse_args()?;

    tracing::info!("Starting clinsight...");

    // Resource loading is fatal for the whole session: refuse to run any
    // prediction until the artifacts are fixed.
    let bundle = match ResourceBundle::load(&args.models) {
        Ok(bundle) => Arc::new(bundle),
        Err(e) => {
            eprintln!("Cannot start: {e}");
            eprintln!(
                "The system cannot run predictions until the model and scaler artifacts \
                 are present in {:?}.",
                args.models
            );
            std::process::exit(1);
        }
    };

    let content = std::fs::read_to_string(&args.patient)
        .with_context(|| format!("failed to read patient file {:?}", args.patient))?;
    let record: PatientRecord =
        serde_json::from_str(&content).context("invalid patient record JSON")?;

    let alerts = validator::validate(&record);
    for alert in &alerts {
        println!("ALERT: {alert}");
    }

    let vector = application::build(&record, bundle.schema())?;
    let inference = InferenceService::new(bundle.clone());
    let result = inference.predict(&vector, alerts)?;

    println!("Principal diagnosis: {} ({})", result.principal().diagnosis, result.principal().diagnosis.description());
    println!(
        "Confidence: {:.2}% ({})",
        result.principal().probability * 100.0,
        result.tier
    );
    for (i, entry) in result.ranked.iter().enumerate().skip(1) {
        println!(
            "  {}. {} ({:.2}%)",
            i + 1,
            entry.diagnosis,
            entry.probability * 100.0
        );
    }

    // Attribution is optional: show the diagnosis either way.
    let attribution = AttributionService::new(bundle.clone());
    let set = match attribution.explain(&vector, result.principal().diagnosis) {
        Ok(set) => {
            println!("Top contributing factors:");
            for entry in &set.entries {
                println!("  - {}", entry.narrative());
            }
            Some(set)
        }
        Err(e) => {
            tracing::warn!("Attribution skipped: {e}");
            None
        }
    };

    let renderer = PdfRenderer::new();
    let bytes = application::generate(&renderer, &result, set.as_ref())?;
    let out_path = args.out.join(application::suggested_filename(record.age));
    std::fs::write(&out_path, &bytes)
        .with_context(|| format!("failed to write report to {out_path:?}"))?;
    println!("Report written to {}", out_path.display());

    tracing::info!("Clinsight run complete.");
    Ok(())
}
