use clap::Parser;
use indicator_atlas::utils::error::ErrorSeverity;
use indicator_atlas::utils::{logger, validation::Validate};
use indicator_atlas::{
    AtlasConfig, AtlasError, CliConfig, MapFrame, OutputFormat, Session, WorldBankClient,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if let Err(e) = logger::init_logger(logger::LogFormat::from_flag(cli.log_json), cli.verbose) {
        eprintln!("⚠️ {}", e);
    }

    tracing::info!("Starting indicator-atlas");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match AtlasConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => exit_with(&e),
            }
        }
        None => AtlasConfig::default(),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        exit_with(&e);
    }

    let session = match bootstrap(&config).await {
        Ok(session) => session,
        Err(e) => exit_with(&e),
    };

    let indicator = match &cli.indicator {
        Some(label) => label.clone(),
        None => session
            .catalog()
            .labels()
            .next()
            .map(str::to_string)
            .unwrap_or_default(),
    };
    let year_low = cli.from.unwrap_or(config.years.start);
    let year_high = cli.to.unwrap_or(year_low);

    if cli.watch {
        tracing::info!(
            "🔁 Refreshing every {}s, press Ctrl-C to stop",
            config.refresh.interval_seconds
        );
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
            }
        };
        let printer = async {
            let mut last_printed = String::new();
            let mut poll = tokio::time::interval(std::time::Duration::from_secs(1));
            loop {
                poll.tick().await;
                let fetched_at = session.request_freshness_label();
                if session.cache().is_empty() || fetched_at == last_printed {
                    continue;
                }
                print_map(&session, &indicator, year_low, year_high, cli.format);
                last_printed = fetched_at;
            }
        };
        tokio::select! {
            result = session.run_refresh_loop(shutdown) => {
                if let Err(e) = result {
                    exit_with(&e);
                }
            }
            _ = printer => {}
        }
        session.end();
        return Ok(());
    }

    if let Err(e) = session.refresh_now().await {
        tracing::error!(
            "❌ Refresh failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }

    println!("Date Last Fetched: {}", session.request_freshness_label());
    print_map(&session, &indicator, year_low, year_high, cli.format);

    if let Some(path) = &cli.snapshot {
        let snapshot = session.snapshot_json()?;
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        tracing::info!("📁 Snapshot saved to: {}", path);
    }

    session.end();
    Ok(())
}

async fn bootstrap(config: &AtlasConfig) -> indicator_atlas::Result<Session<WorldBankClient>> {
    let client = WorldBankClient::from_config(config)?;
    Session::bootstrap(client, config).await
}

fn print_map(
    session: &Session<WorldBankClient>,
    indicator: &str,
    year_low: i32,
    year_high: i32,
    format: OutputFormat,
) {
    let frame: indicator_atlas::Result<MapFrame> =
        session.request_map(indicator, year_low, year_high);
    let rendered = frame.and_then(|frame| match format {
        OutputFormat::Table => Ok(frame.to_table()),
        OutputFormat::Json => frame.to_json(),
        OutputFormat::Csv => frame.to_csv(),
    });

    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => {
            tracing::warn!("Query failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
        }
    }
}

fn exit_with(e: &AtlasError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2, // 資料來源錯誤，可重試
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
