use clap::{Parser, Subcommand};
use idea_client::{IdeaClient, UpstreamCall};
use llm_interface::{DeepSeekProvider, LlmProvider};
use scout_core::{
    AppConfig, ConfigError, CoreError, ErrorExt, ErrorReporter, IdeaApiError, IdeaUnit,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "idea_scout=info,idea_client=info,idea_cache=info,llm_interface=info,scout_core=info";

#[derive(Parser)]
#[command(name = "idea-scout")]
#[command(about = "Collect and score micro-SaaS ideas by keyword", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file; defaults apply when omitted
    #[arg(long, global = true, env = "IDEA_SCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Abort unless the proxy answers the health ping
    #[arg(long, global = true)]
    check_proxy: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect distinct ideas for a keyword across several generations
    Acquire {
        keyword: String,

        /// Number of distinct ideas to collect
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Completed-cycle budget (defaults to the configured value)
        #[arg(long)]
        max_requests: Option<u32>,

        /// Score the collected ideas with the LLM
        #[arg(long)]
        score: bool,
    },
    /// Fetch the record for a keyword, reusing a cached identifier
    Get { keyword: String },
    /// List keywords with cached identifiers or records
    List,
    /// Check that the proxy answers
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let reporter = ErrorReporter::new();

    if let Err(e) = run(cli, &reporter).await {
        reporter.report_error(&e);
        return Err(anyhow::anyhow!(e.user_friendly_message()).context(e.error_code()));
    }
    Ok(())
}

async fn run(cli: Cli, reporter: &ErrorReporter) -> Result<(), CoreError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let client = IdeaClient::new(&config)?;

    if cli.check_proxy && !client.api().healthy_proxy_check().await {
        return Err(IdeaApiError::ProxyUnavailable {
            proxy: config
                .api
                .proxy_url
                .clone()
                .unwrap_or_else(|| "<direct connection>".to_string()),
        }
        .into());
    }

    match cli.command {
        Commands::Acquire {
            keyword,
            limit,
            max_requests,
            score,
        } => {
            // Fail before spending any upstream requests
            let provider = if score {
                if config.llm.api_key.is_none() {
                    return Err(ConfigError::MissingEnvironmentVariable {
                        var_name: "DEEPSEEK_APIKEY".to_string(),
                    }
                    .into());
                }
                Some(DeepSeekProvider::new(config.llm.clone())?)
            } else {
                None
            };

            let max_requests = max_requests.unwrap_or(config.acquisition.max_requests);
            let ideas = client
                .deep_extract_ideas(&keyword, limit, max_requests)
                .await?;

            match provider {
                Some(provider) => {
                    let scored =
                        score_collected(&client, &provider, &keyword, &ideas, reporter).await;
                    print_json(&scored)?
                }
                None => print_json(&serde_json::to_value(&ideas)?)?,
            }
        }
        Commands::Get { keyword } => match client.get_ideas(&keyword).await? {
            Some(record) => print_json(&serde_json::to_value(&record)?)?,
            None => println!("No idea found."),
        },
        Commands::List => {
            let keywords = client.list_cached_keywords().await?;
            print_json(&json!(keywords))?;
        }
        Commands::Ping => {
            let healthy = client.api().healthy_proxy_check().await;
            print_json(&json!({
                "proxy": config.api.proxy_url,
                "healthy": healthy,
            }))?;
        }
    }

    let metrics = client.api().metrics().await;
    for call in [
        UpstreamCall::GenerateIdentifier,
        UpstreamCall::FetchRecord,
        UpstreamCall::Ping,
    ] {
        let stats = metrics.stats(call);
        if stats.calls > 0 {
            tracing::debug!(
                "{:?}: {} calls, {} failed, {} rate limited, mean latency {:?}",
                call,
                stats.calls,
                stats.failures,
                stats.rate_limited,
                stats.mean_latency()
            );
        }
    }
    tracing::debug!(
        "Upstream requests: {} total, success rate {:.2}",
        metrics.total_requests(),
        metrics.success_rate()
    );
    Ok(())
}

/// Scored ideas, or the plain ideas when scoring fails.
async fn score_collected(
    client: &IdeaClient,
    provider: &DeepSeekProvider,
    keyword: &str,
    ideas: &[IdeaUnit],
    reporter: &ErrorReporter,
) -> Value {
    let scored = match provider.score_ideas(ideas).await {
        Ok(scored) => scored,
        Err(e) => {
            reporter.report_warning(&e);
            return json!(ideas);
        }
    };

    if let Err(e) = client.cache().save_scored(keyword, &scored).await {
        reporter.report_warning(&e);
    }
    json!(scored)
}

fn print_json(value: &Value) -> Result<(), CoreError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
