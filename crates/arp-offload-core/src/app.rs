use crate::sleep::{SleepRequest, SuspendLedger};

/// State shared by the control panel and the suspend worker.
///
/// Built once before the worker starts and kept for the life of the program.
pub struct AppContext {
    pub sleep_request: SleepRequest,
    pub ledger: SuspendLedger,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext {
    pub const fn new() -> Self {
        Self {
            sleep_request: SleepRequest::new(),
            ledger: SuspendLedger::new(),
        }
    }
}
