//! Backend commands queued from UI to backend worker.

use dashboard_core::Command;

pub enum BackendCommand {
    /// A gateway call requested by the dashboard reducer.
    Dashboard(Command),
    /// Download and decode a product thumbnail.
    FetchImage { url: String },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dashboard(command) => command.name(),
            Self::FetchImage { .. } => "fetch_image",
        }
    }
}
