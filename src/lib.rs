//! Client layer for the Web OCR service: HTTP calls with error classification,
//! clipboard interop, and upload validation/encoding.

pub mod actions;
pub mod backend;
pub mod config;
pub mod notify;
pub mod ocr;
pub mod system;
pub mod validator;

use std::sync::Arc;

use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

pub use actions::{execute_action, ActionContext, ActionError, AppAction};
pub use backend::{classify, ApiError, ClassifiedError, OcrClient, TransportOutcome};
pub use config::ClientConfig;
pub use notify::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use system::{extract_image, ClipboardAdapter, FileCandidate, PasteEvent};
pub use validator::{check_size, check_type, encode, validate, Validation};

/// RUST_LOG wins; otherwise the level from the config file.
pub fn init_logging() {
    let level = config::load_log_level();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter())),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one action on a single-threaded runtime. Returns the process exit code.
pub fn run(action: AppAction) -> i32 {
    init_logging();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start async runtime");
            return 1;
        }
    };

    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let client = match OcrClient::new(config::load_client_config(), Arc::clone(&notifier)) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client");
            return 1;
        }
    };
    let ctx = ActionContext { client, notifier };

    match runtime.block_on(execute_action(&ctx, action)) {
        Ok(output) => {
            println!("{output}");
            0
        }
        Err(e) => {
            debug!(error = %e, "Action failed");
            1
        }
    }
}
