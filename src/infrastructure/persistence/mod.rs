pub mod feedback_store;
pub mod model_store;

pub use feedback_store::CsvFeedbackStore;
pub use model_store::JsonModelStore;
