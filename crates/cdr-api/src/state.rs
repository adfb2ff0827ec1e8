//! Shared application state

use cdr_services::{CdrGenerator, DataInitializer, ReportService};
use std::sync::Arc;

/// Services handed to every handler through `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<ReportService>,
    pub generator: Arc<CdrGenerator>,
    pub initializer: Arc<DataInitializer>,
    /// MSISDNs used when resetting without an explicit list
    pub seed_msisdns: Arc<Vec<String>>,
}
