pub mod ask_controller;
pub mod delete_controller;
pub mod documents_controller;
pub mod history_controller;
pub mod ingest_controller;
pub mod manifest_controller;
pub mod process_controller;
pub mod stats_controller;

pub use ask_controller::AskController;
pub use delete_controller::DeleteController;
pub use documents_controller::DocumentsController;
pub use history_controller::HistoryController;
pub use ingest_controller::IngestController;
pub use manifest_controller::ManifestController;
pub use process_controller::ProcessController;
pub use stats_controller::StatsController;
