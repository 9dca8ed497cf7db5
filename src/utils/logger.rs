use crate::utils::error::{AtlasError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            Self::Json
        } else {
            Self::Compact
        }
    }
}

// verbose 時連同 HTTP 請求一起輸出，其餘相依套件只留警告
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "indicator_atlas=debug,reqwest=debug,warn"
    } else {
        "indicator_atlas=info,warn"
    }
}

/// 初始化全域日誌；RUST_LOG 優先於預設過濾規則
pub fn init_logger(format: LogFormat, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let layer = match format {
        LogFormat::Compact => fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .compact()
            .boxed(),
        LogFormat::Json => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .json()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| AtlasError::config(format!("logger setup failed: {}", e)))
}
