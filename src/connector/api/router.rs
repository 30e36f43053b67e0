use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{
    AskController, DeleteController, DocumentsController, HistoryController, IngestController,
    ManifestController, ProcessController, StatsController,
};

pub struct Router<'a> {
    process_controller: ProcessController<'a>,
    ingest_controller: IngestController<'a>,
    documents_controller: DocumentsController<'a>,
    delete_controller: DeleteController<'a>,
    ask_controller: AskController<'a>,
    history_controller: HistoryController<'a>,
    stats_controller: StatsController<'a>,
    manifest_controller: ManifestController,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            process_controller: ProcessController::new(container),
            ingest_controller: IngestController::new(container),
            documents_controller: DocumentsController::new(container),
            delete_controller: DeleteController::new(container),
            ask_controller: AskController::new(container),
            history_controller: HistoryController::new(container),
            stats_controller: StatsController::new(container),
            manifest_controller: ManifestController::new(),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Process { path } => self.process_controller.process(path).await,
            Commands::Ingest { path } => self.ingest_controller.ingest(path).await,
            Commands::List => self.documents_controller.list().await,
            Commands::Show { id } => self.documents_controller.show(id).await,
            Commands::Delete { id } => self.delete_controller.delete(id).await,
            Commands::Ask { question, document } => {
                self.ask_controller.ask(question, document).await
            }
            Commands::History { limit } => self.history_controller.history(limit).await,
            Commands::Stats => self.stats_controller.stats().await,
            Commands::Manifest { path } => self.manifest_controller.manifest(path).await,
            Commands::Serve { .. } => unreachable!("serve command is handled separately in main"),
        }
    }
}
