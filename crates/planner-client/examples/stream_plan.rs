use planner_client::display::{agent_display_name, format_user_message};
use planner_client::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ClientError> {
    planner_client::observability::init_observability("info");

    let client = PlannerClient::from_env()?;
    let session = client.create_session().await?;
    let mut events = client
        .stream_session(&session, &format_user_message("90210", "5 and 8"))
        .await?;

    while let Some(event) = events.next_event().await {
        match event {
            Ok(event) => println!("[{}] {}", agent_display_name(&event.author), event.text),
            Err(err) => {
                eprintln!("run error: {err}");
                break;
            }
        }
    }
    Ok(())
}
