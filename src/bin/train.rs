use anyhow::Result;
use clap::Parser;
use finsight::application::categorizer::Categorizer;
use finsight::config::Config;
use finsight::infrastructure::persistence::{CsvFeedbackStore, JsonModelStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rebuild the categorization model from seed data and feedback", long_about = None)]
struct Args {
    /// Path to the model artifact (overrides FINSIGHT_MODEL_PATH)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Path to the feedback CSV (overrides FINSIGHT_FEEDBACK_PATH)
    #[arg(long)]
    feedback: Option<PathBuf>,

    /// Retrain even when a loadable artifact already exists
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let args = Args::parse();
    let config = Config::from_env()?;
    let model_path = args.model.unwrap_or(config.model_path);
    let feedback_path = args.feedback.unwrap_or(config.feedback_path);

    println!("Model artifact: {}", model_path.display());
    println!("Feedback store: {}", feedback_path.display());

    let feedback = Arc::new(CsvFeedbackStore::new(&feedback_path));
    let store = Arc::new(JsonModelStore::new(&model_path));
    let categorizer = Categorizer::new(feedback, store);

    if args.force {
        if !categorizer.retrain() {
            anyhow::bail!("model rebuild failed");
        }
    } else {
        categorizer.bootstrap();
    }

    let Some(metrics) = categorizer.model_metrics() else {
        anyhow::bail!("no model available after training");
    };

    println!("\nModel ready:");
    println!("  Held-out accuracy: {:.1}%", metrics.accuracy * 100.0);
    println!("  Samples:           {}", metrics.sample_count);
    println!("  Features:          {}", metrics.feature_count);
    println!("  Categories:        {}", metrics.class_count);

    Ok(())
}
