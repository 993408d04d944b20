//! StudyMetrics - Main entry point
//!
//! Thin CLI over the training and inference pipelines.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use studymetrics::config::TrainerConfig;
use studymetrics::data::{build_model_arrays, load_csv, train_test_split};
use studymetrics::persistence::save_object;
use studymetrics::pipeline::{CustomData, PredictPipeline};
use studymetrics::trainer::ModelTrainer;

#[derive(Parser)]
#[command(name = "studymetrics", about = "Student performance score prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a CSV dataset and persist the best model
    Train {
        /// Path to the training CSV
        #[arg(long)]
        data: PathBuf,
        /// Target column to predict
        #[arg(long, default_value = "math_score")]
        target: String,
        /// Directory for the persisted artifacts
        #[arg(long, default_value = "artifacts")]
        artifacts: PathBuf,
        /// Fraction of rows held out for testing
        #[arg(long, default_value_t = 0.2)]
        test_fraction: f64,
        /// Minimum acceptable test R²
        #[arg(long, default_value_t = 0.6)]
        quality_floor: f64,
        /// Cross-validation folds for the grid search
        #[arg(long, default_value_t = 5)]
        cv_folds: usize,
        /// Random seed for the whole run
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Score one student record with the persisted artifacts
    Predict {
        /// Directory holding the persisted artifacts
        #[arg(long, default_value = "artifacts")]
        artifacts: PathBuf,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        race_ethnicity: String,
        #[arg(long)]
        parental_level_of_education: String,
        #[arg(long)]
        lunch: String,
        #[arg(long)]
        test_preparation_course: String,
        #[arg(long)]
        reading_score: String,
        #[arg(long)]
        writing_score: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studymetrics=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            target,
            artifacts,
            test_fraction,
            quality_floor,
            cv_folds,
            seed,
        } => {
            let config = TrainerConfig::with_artifact_dir(artifacts)
                .with_quality_floor(quality_floor)
                .with_cv_folds(cv_folds)
                .with_random_seed(seed);

            let df = load_csv(&data)?;
            let (train, test) = train_test_split(&df, test_fraction, seed)?;
            let (train_array, test_array, preprocessor) =
                build_model_arrays(&train, &test, &target)?;

            save_object(&preprocessor, &config.artifacts.preprocessor_path())?;

            let trainer = ModelTrainer::new(config);
            let test_r2 = trainer.initiate_model_trainer(&train_array, &test_array)?;
            println!("test R²: {test_r2:.4}");
        }
        Commands::Predict {
            artifacts,
            gender,
            race_ethnicity,
            parental_level_of_education,
            lunch,
            test_preparation_course,
            reading_score,
            writing_score,
        } => {
            let record = CustomData::from_fields(
                &gender,
                &race_ethnicity,
                &parental_level_of_education,
                &lunch,
                &test_preparation_course,
                &reading_score,
                &writing_score,
            )?;

            let config = TrainerConfig::with_artifact_dir(artifacts);
            let pipeline = PredictPipeline::load(&config.artifacts)?;
            let predictions = pipeline.predict(&record.to_dataframe()?)?;
            println!("predicted score: {:.2}", predictions[0]);
        }
    }

    Ok(())
}
