//! Engine configuration composition.
//!
//! Builds the flat key/value map one engine run reads from its `config.json`.
//! The map has a common block shared by every run plus an environment block
//! selected by the job's account kind.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::path::Path;

use ql_config::{QlJobConfig, QlSettings};
use ql_models::account::{AccountKind, QlAccount};
use ql_models::job::QlJob;

use crate::prelude::*;

/// Compose the full engine configuration for one job.
///
/// `Backtest` and `Paper` account names select the corresponding built-in
/// environment block. Any other name designates a brokerage account and
/// requires `account` to be supplied; its connection keys are contributed by
/// the owning adapter, so only the common block is written here. Fails with
/// [`Error::NoAccount`] when a brokerage run has no account selected.
pub fn compose(
    job: &QlJob,
    account: Option<&QlAccount>,
    settings: &QlSettings,
) -> Result<QlJobConfig> {
    let mut config = QlJobConfig::new();
    set_model(&mut config, job, settings)?;
    match AccountKind::from_name(&job.account) {
        AccountKind::Backtest => set_backtest(&mut config),
        AccountKind::Paper => set_paper(&mut config),
        AccountKind::Broker => {
            if account.is_none() {
                return Err(Error::NoAccount);
            }
        }
    }
    Ok(config)
}

/// Common block written for every run.
fn set_model(config: &mut QlJobConfig, job: &QlJob, settings: &QlSettings) -> Result<()> {
    config.set("debug-mode", "false");
    config.set("debugging", "false");
    config.set("messaging-handler", "QuantConnect.Messaging.Messaging");
    config.set("job-queue-handler", "QuantConnect.Queues.JobQueue");
    config.set("api-handler", "QuantConnect.Api.Api");
    config.set(
        "map-file-provider",
        "QuantConnect.Data.Auxiliary.LocalDiskMapFileProvider",
    );
    config.set(
        "factor-file-provider",
        "QuantConnect.Data.Auxiliary.LocalDiskFactorFileProvider",
    );
    config.set(
        "alpha-handler",
        "QuantConnect.Lean.Engine.Alphas.DefaultAlphaHandler",
    );
    config.set("api-access-token", settings.api_token.as_str());
    config.set(
        "job-user-id",
        if settings.api_user.parse::<i32>().is_ok() {
            settings.api_user.as_str()
        } else {
            "0"
        },
    );
    config.set("job-project-id", "0");
    config.set("algorithm-path-python", ".");
    config.set("regression-update-statistics", "false");
    config.set("algorithm-manager-time-loop-maximum", "60");
    config.set("symbol-minute-limit", "10000");
    config.set("symbol-second-limit", "10000");
    config.set("symbol-tick-limit", "10000");
    config.set("maximum-data-points-per-chart-series", "10000");
    config.set("force-exchange-always-open", "false");
    config.set("version-id", "");
    config.set("security-data-feeds", "");
    config.set("forward-console-messages", "true");
    config.set("send-via-api", "false");
    config.set("lean-manager-type", "LocalLeanManager");
    config.set("transaction-log", "");
    config.set("algorithm-language", job.algorithm_language.as_str());
    config.set("algorithm-type-name", job.algorithm_name.as_str());
    config.set("algorithm-id", job.algorithm_name.as_str());

    let data_folder = settings.data_folder.display().to_string();
    config.set("data-folder", data_folder.clone());
    config.set("data-directory", data_folder.clone());
    config.set("cache-location", data_folder);
    config.set("algorithm-location", job.algorithm_location.as_str());

    // The engine loads its plugin assemblies from the folder it was
    // installed into, next to the launcher executable.
    let engine_folder = settings
        .engine_exe
        .parent()
        .filter(|folder| !folder.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    config.set("plugin-directory", engine_folder.display().to_string());
    config.set("composer-dll-directory", engine_folder.display().to_string());

    config.set("results-destination-folder", ".");
    config.set("log-handler", "CompositeLogHandler");
    config.set("scheduled-event-leaky-bucket-capacity", "120");
    config.set("scheduled-event-leaky-bucket-time-interval-minutes", "1440");
    config.set("scheduled-event-leaky-bucket-refill-amount", "18");
    config.set("object-store", "LocalObjectStore");
    config.set("object-store-root", "./storage");
    config.set("data-permission-manager", "DataPermissionManager");
    config.set("ignore-version-checks", "false");

    let workers = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    config.set("data-feed-workers-count", workers.to_string());
    config.set("data-feed-max-work-weight", "400");
    config.set(
        "data-feed-queue-type",
        "QuantConnect.Lean.Engine.DataFeeds.WorkScheduling.WorkQueue, QuantConnect.Lean.Engine",
    );
    config.set("show-missing-data-logs", "false");
    config.set("close-automatically", "true");
    config.set("live-data-url", "ws://www.quantconnect.com/api/v2/live/data/");
    config.set("live-data-port", "8020");
    config.set(
        "data-provider",
        if settings.api_download {
            "QuantConnect.Lean.Engine.DataFeeds.ApiDataProvider"
        } else {
            "QuantConnect.Lean.Engine.DataFeeds.DefaultDataProvider"
        },
    );

    if let Some((start, end)) = job.period() {
        config.set("period-start", start.format("%Y-%m-%d").to_string());
        config.set("period-finish", end.format("%Y-%m-%d").to_string());
        config.set("cash-amount", job.initial_capital.to_string());
        set_parameters(config, job)?;
    }
    Ok(())
}

/// Algorithm parameters, JSON-encoded into the single `parameters` value.
///
/// The explicit job fields win over same-named user parameters.
fn set_parameters(config: &mut QlJobConfig, job: &QlJob) -> Result<()> {
    let mut parameters = BTreeMap::new();
    parameters.insert("security".to_string(), job.security.clone());
    parameters.insert("resolution".to_string(), job.resolution.clone());
    if let Some(market) = job.market.as_deref().filter(|market| !market.is_empty()) {
        parameters.insert("market".to_string(), market.to_string());
    }
    if !job.symbols.is_empty() {
        parameters.insert("symbols".to_string(), job.symbols.join(";"));
    }
    for (name, value) in &job.parameters {
        parameters
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }

    config.set("parameters", serde_json::to_string(&parameters)?);
    Ok(())
}

fn set_backtest(config: &mut QlJobConfig) {
    config.set("environment", "backtesting");
    config.set("live-mode", "false");
    config.set(
        "setup-handler",
        "QuantConnect.Lean.Engine.Setup.BacktestingSetupHandler",
    );
    config.set(
        "result-handler",
        "QuantConnect.Lean.Engine.Results.BacktestingResultHandler",
    );
    config.set(
        "data-feed-handler",
        "QuantConnect.Lean.Engine.DataFeeds.FileSystemDataFeed",
    );
    config.set(
        "real-time-handler",
        "QuantConnect.Lean.Engine.RealTime.BacktestingRealTimeHandler",
    );
    config.set(
        "history-provider",
        "QuantConnect.Lean.Engine.HistoricalData.SubscriptionDataReaderHistoryProvider",
    );
    config.set(
        "transaction-handler",
        "QuantConnect.Lean.Engine.TransactionHandlers.BacktestingTransactionHandler",
    );
}

fn set_paper(config: &mut QlJobConfig) {
    config.set("environment", "live-paper");
    config.set("live-mode", "true");
    config.set("live-mode-brokerage", "PaperBrokerage");
    config.set(
        "setup-handler",
        "QuantConnect.Lean.Engine.Setup.BrokerageSetupHandler",
    );
    config.set(
        "result-handler",
        "QuantConnect.Lean.Engine.Results.LiveTradingResultHandler",
    );
    config.set(
        "data-feed-handler",
        "QuantConnect.Lean.Engine.DataFeeds.LiveTradingDataFeed",
    );
    config.set(
        "data-queue-handler",
        "QuantConnect.Lean.Engine.DataFeeds.Queues.LiveDataQueue",
    );
    config.set(
        "real-time-handler",
        "QuantConnect.Lean.Engine.RealTime.LiveTradingRealTimeHandler",
    );
    config.set(
        "transaction-handler",
        "QuantConnect.Lean.Engine.TransactionHandlers.BacktestingTransactionHandler",
    );
}
