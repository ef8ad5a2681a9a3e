use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// Runtime configuration, resolved from the environment with sensible
/// defaults so the engine runs out of the box.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the model artifact and feedback store.
    pub data_dir: PathBuf,
    /// Serialized categorization model artifact.
    pub model_path: PathBuf,
    /// Append-only CSV of user feedback.
    pub feedback_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir =
            PathBuf::from(env::var("FINSIGHT_DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        let model_path = env::var("FINSIGHT_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("models/category_model.json"));

        let feedback_path = env::var("FINSIGHT_FEEDBACK_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("models/learned_data.csv"));

        Ok(Self {
            data_dir,
            model_path,
            feedback_path,
        })
    }
}
