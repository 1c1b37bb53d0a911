pub mod config;
pub mod models;
pub mod pipeline;

pub use models::{Report, ResultFlag, Section, SectionKind, TestResult};
pub use pipeline::lab_report::{
    parse, parse_with_clock, Clock, FixedClock, LabParseError, LabReportParser, ParseWarning,
    ReportParser, SystemClock, Vocabulary,
};

use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber honoring `RUST_LOG`, for binaries and
/// services embedding the parser. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();

    tracing::info!("{} v{} ready", config::APP_NAME, config::APP_VERSION);
}
