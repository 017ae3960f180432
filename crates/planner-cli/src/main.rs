//! Runs one weekend-planning request against the agent backend and prints
//! each agent's output as it streams in.

use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use planner_client::display::{agent_display_name, format_user_message};
use planner_client::prelude::*;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "weekend-planner")]
#[command(about = "Stream a family weekend plan from the planner agents")]
#[command(version)]
struct Cli {
    /// Zip code to plan around
    #[arg(long)]
    zip: String,

    /// Kids' ages, free-form (for example "5 and 8")
    #[arg(long)]
    kids: String,

    /// Agent server base URL
    #[arg(long, env = "ADK_API_URL", default_value = planner_client::backend::DEFAULT_BASE_URL)]
    base_url: String,

    /// Agent application name
    #[arg(long, env = "ADK_APP_NAME", default_value = planner_client::backend::DEFAULT_APP_NAME)]
    app_name: String,

    /// Give up if the whole run takes longer than this many seconds
    #[arg(long, default_value_t = 300)]
    deadline_secs: u64,

    /// Default log level when PLANNER_LOG_LEVEL / RUST_LOG are unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    planner_client::observability::init_observability(&cli.log_level);

    let config = ClientConfig::default()
        .base_url(&cli.base_url)
        .app_name(&cli.app_name);
    let client = PlannerClient::from_config(config).context("failed to configure client")?;

    let session = client
        .create_session()
        .await
        .context("failed to create session")?;
    info!(session_id = %session.session_id, user_id = %session.user_id, "session ready");

    let message = format_user_message(&cli.zip, &cli.kids);
    let deadline = Duration::from_secs(cli.deadline_secs);
    match tokio::time::timeout(deadline, run(&client, &session, &message)).await {
        Ok(Ok(count)) => {
            info!(events = count, "plan complete");
            Ok(())
        }
        Ok(Err(err)) => {
            eprintln!("{}", describe_failure(&err));
            Err(err.into())
        }
        Err(_) => {
            warn!(?deadline, "planner run exceeded deadline");
            anyhow::bail!("planning did not finish within {}s", cli.deadline_secs)
        }
    }
}

async fn run(
    client: &PlannerClient,
    session: &SessionInfo,
    message: &str,
) -> Result<usize, ClientError> {
    let mut events = client.stream_session(session, message).await?;
    let mut count = 0;
    while let Some(event) = events.next_event().await {
        let event = event?;
        count += 1;
        println!("\n{}\n{}", agent_display_name(&event.author), event.text);
    }
    Ok(count)
}

fn describe_failure(err: &ClientError) -> String {
    let Some(classified) = err.classified() else {
        return format!("Planning failed: {err}");
    };
    match classified.kind() {
        ErrorKind::Quota => match classified.retry_after_seconds() {
            Some(secs) => format!("API quota exceeded. Try again in {}s.", secs.ceil()),
            None => "API quota exceeded. Try again later.".to_string(),
        },
        ErrorKind::RateLimit => match classified.retry_after_seconds() {
            Some(secs) => format!("Too many requests. Retry in {}s.", secs.ceil()),
            None => "Too many requests. Slow down and retry shortly.".to_string(),
        },
        ErrorKind::InvalidCredential => {
            "The backend rejected its API key. Check the server's credentials.".to_string()
        }
        ErrorKind::SessionNotFound => {
            "The planning session expired. Run the command again to start a new one.".to_string()
        }
        ErrorKind::BackendTimeout => "The planner timed out. Please try again.".to_string(),
        ErrorKind::ModelUnavailable => {
            format!("The configured model is unavailable: {}", classified.message())
        }
        ErrorKind::Generic => format!("Planning failed: {classified}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_message_rounds_retry_delay_up() {
        let err = ClientError::Backend(planner_client::classify_error(
            "429 quota exceeded, retry in 12.5s",
        ));
        assert_eq!(describe_failure(&err), "API quota exceeded. Try again in 13s.");
    }

    #[test]
    fn transport_failure_is_reported_verbatim() {
        let err = ClientError::transport("agent execution failed: 502", Some(502));
        assert_eq!(
            describe_failure(&err),
            "Planning failed: transport error: agent execution failed: 502"
        );
    }

    #[test]
    fn cli_requires_zip_and_kids() {
        assert!(Cli::try_parse_from(["weekend-planner", "--zip", "90210"]).is_err());
        let cli = Cli::try_parse_from(["weekend-planner", "--zip", "90210", "--kids", "5 and 8"])
            .expect("parse");
        assert_eq!(cli.deadline_secs, 300);
    }
}
