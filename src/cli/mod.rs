use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Load and split a file, showing a preview of its chunks without storing it
    Process { path: String },

    /// Ingest a file, or every supported file in a directory
    Ingest { path: String },

    /// List ingested documents
    List,

    /// Show a document with all of its chunks
    Show { id: i64 },

    Delete { id: i64 },

    /// Ask a question about one document, or about all of them
    Ask {
        question: String,

        #[arg(short, long)]
        document: Option<i64>,
    },

    /// Show recent questions and answers
    History {
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    Stats,

    /// Validate a requirements-style dependency manifest
    Manifest { path: String },

    /// Start the HTTP API
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Bind to 0.0.0.0 instead of 127.0.0.1, exposing the server on all network interfaces
        #[arg(long)]
        public: bool,
    },
}
