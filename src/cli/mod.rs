//! Cross-sell pipeline CLI
//!
//! Command-line interface for training, prediction and schema validation.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cloud_storage::{LocalModelStore, ModelStore, S3ModelStore};
use crate::components::data_validation::validate_frames;
use crate::config::{
    ConnectionSettings, PipelineConfig, PredictorConfig, SchemaConfig, TrainingPipelineConfig,
};
use crate::constants::{ARTIFACT_DIR, SCHEMA_FILE_PATH};
use crate::data_access::{CsvSource, DocumentSource, MongoSource};
use crate::entity::ModelBundle;
use crate::pipeline::{PredictionPipeline, TrainPipeline};
use crate::utils::{read_csv, write_csv};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(&format!("{:<18}", key)), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_fail(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "crosssell")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Training pipeline for the vehicle-insurance cross-sell classifier")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full training pipeline
    Train {
        /// Root directory for run artifacts
        #[arg(long, default_value = ARTIFACT_DIR)]
        artifact_dir: PathBuf,

        /// Dataset schema
        #[arg(long, default_value = SCHEMA_FILE_PATH)]
        schema: PathBuf,

        /// Read the collection from a CSV export instead of MongoDB
        #[arg(long)]
        source_csv: Option<PathBuf>,

        /// Keep bundles under this directory instead of S3
        #[arg(long)]
        local_store: Option<PathBuf>,

        /// Seed the split and the resampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Predict labels for raw customer rows
    Predict {
        /// CSV of raw rows
        #[arg(short, long)]
        data: PathBuf,

        /// Bundle file; defaults to the deployed bundle
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Read the deployed bundle from this directory instead of S3
        #[arg(long, conflicts_with = "model")]
        local_store: Option<PathBuf>,

        /// Write rows with a `prediction` column to this CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check a train/test pair against the schema
    Validate {
        #[arg(long)]
        train: PathBuf,

        #[arg(long)]
        test: PathBuf,

        #[arg(long, default_value = SCHEMA_FILE_PATH)]
        schema: PathBuf,
    },
}

fn model_store(local_store: Option<&Path>) -> anyhow::Result<Box<dyn ModelStore>> {
    Ok(match local_store {
        Some(root) => Box::new(LocalModelStore::new(root)),
        None => Box::new(S3ModelStore::connect(&ConnectionSettings::aws_region_from_env())?),
    })
}

fn document_source(source_csv: Option<&Path>) -> anyhow::Result<Box<dyn DocumentSource>> {
    Ok(match source_csv {
        Some(path) => Box::new(CsvSource::new(path)),
        None => Box::new(MongoSource::connect(&ConnectionSettings::from_env()?)?),
    })
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    artifact_dir: &Path,
    schema_path: &Path,
    source_csv: Option<&Path>,
    local_store: Option<&Path>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    section("Train");

    let schema = SchemaConfig::from_yaml_file(schema_path)
        .with_context(|| format!("loading schema {}", schema_path.display()))?;

    let mut config = PipelineConfig::new(TrainingPipelineConfig::new(artifact_dir));
    if let Some(seed) = seed {
        config = config.with_random_state(seed);
    }
    let run_dir = config.training_pipeline.artifact_dir.clone();

    let pipeline = TrainPipeline::new(
        config,
        schema,
        document_source(source_csv)?,
        model_store(local_store)?,
    );

    step_run("Running pipeline");
    let start = Instant::now();
    let run = pipeline.run_pipeline()?;
    step_done(&format!("{:.2?}", start.elapsed()));

    let metrics = &run.trainer.metric_artifact;
    println!();
    line_box_top();
    line_box(&kv("Artifacts", &run_dir.display().to_string()));
    line_box_sep();
    line_box(&kv("Accuracy", &format!("{:.4}", metrics.accuracy_score)));
    line_box(&kv("F1", &format!("{:.4}", metrics.f1_score)));
    line_box(&kv("Precision", &format!("{:.4}", metrics.precision_score)));
    line_box(&kv("Recall", &format!("{:.4}", metrics.recall_score)));
    line_box_sep();
    let deployed = run
        .evaluation
        .deployed_model_score
        .map_or_else(|| "none".to_string(), |s| format!("{:.4}", s));
    line_box(&kv("Deployed F1", &deployed));
    line_box(&kv("Change", &format!("{:+.4}", run.evaluation.changed_accuracy)));
    line_box_bottom();
    println!();

    match &run.pusher {
        Some(pushed) => step_ok(&format!(
            "model pushed to {}/{}",
            pushed.bucket_name, pushed.s3_model_path
        )),
        None => step_fail("model not accepted, deployed bundle kept"),
    }
    println!();

    Ok(())
}

pub fn cmd_predict(
    data_path: &Path,
    model_path: Option<&Path>,
    local_store: Option<&Path>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    section("Predict");

    step_run("Loading data");
    let mut df = read_csv(data_path)?;
    step_done(&format!("{} rows × {} cols", df.height(), df.width()));

    step_run("Scoring");
    let start = Instant::now();
    let predictions = match model_path {
        Some(path) => ModelBundle::load(path)?.predict(&df)?.to_vec(),
        None => PredictionPipeline::new(PredictorConfig::default(), model_store(local_store)?)
            .predict(&df)?,
    };
    step_done(&format!("{:.2?}", start.elapsed()));

    let positives = predictions.iter().filter(|&&p| p == 1).count();
    println!();
    println!("  {:<16} {}", muted("Rows"), predictions.len().to_string().white().bold());
    println!("  {:<16} {}", muted("Interested"), positives.to_string().white().bold());

    if let Some(path) = output {
        df.with_column(Series::new("prediction".into(), predictions))?;
        write_csv(&mut df, path)?;
        step_ok(&format!("predictions written to {}", path.display()));
    }
    println!();

    Ok(())
}

pub fn cmd_validate(train: &Path, test: &Path, schema_path: &Path) -> anyhow::Result<()> {
    section("Validate");

    let schema = SchemaConfig::from_yaml_file(schema_path)?;
    let train_df = read_csv(train)?;
    let test_df = read_csv(test)?;

    let message = validate_frames(&train_df, &test_df, &schema);

    if message.is_empty() {
        step_ok("train and test match the schema");
    } else {
        step_fail(message.trim());
        println!();
        anyhow::bail!("validation failed");
    }
    println!();
    Ok(())
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Train { artifact_dir, schema, source_csv, local_store, seed } => cmd_train(
            &artifact_dir,
            &schema,
            source_csv.as_deref(),
            local_store.as_deref(),
            seed,
        ),
        Commands::Predict { data, model, local_store, output } => {
            cmd_predict(&data, model.as_deref(), local_store.as_deref(), output.as_deref())
        }
        Commands::Validate { train, test, schema } => cmd_validate(&train, &test, &schema),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        let colored = ok("done").to_string();
        assert_eq!(strip_ansi(&colored), "done");
    }

    #[test]
    fn test_parse_train_defaults() {
        let cli = Cli::try_parse_from(["crosssell", "train", "--local-store", "store"]).unwrap();
        match cli.command {
            Commands::Train { artifact_dir, schema, local_store, seed, .. } => {
                assert_eq!(artifact_dir, PathBuf::from("artifact"));
                assert_eq!(schema, PathBuf::from("config/schema.yaml"));
                assert_eq!(local_store, Some(PathBuf::from("store")));
                assert_eq!(seed, None);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_predict_model_conflicts_with_store() {
        let parsed = Cli::try_parse_from([
            "crosssell", "predict", "-d", "rows.csv", "-m", "model.bin", "--local-store", "store",
        ]);
        assert!(parsed.is_err());
    }
}
