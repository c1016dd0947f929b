use agent_demo_http::{Assistant, MockApiClient};
use tracing_subscriber::EnvFilter;

/// Replays a scripted conversation against the mock API at `API_BASE`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api = MockApiClient::from_env().map_err(anyhow::Error::msg)?;
    let health = api.health().await?;
    tracing::info!(base_url = api.base_url(), ok = health.ok, "mock API reachable");

    let assistant = Assistant::new(api);
    let user_id = 1;
    println!("{}", assistant.start(user_id));

    for message in [
        "где мой заказ #1234",
        "хочу вернуть худи",
        "realty",
        "ищу 2-к квартиру",
        "бронь",
        "clinic",
        "болит горло",
        "на 18:00",
    ] {
        println!("> {message}");
        for reply in assistant.handle_text(user_id, message).await {
            println!("{reply}");
        }
    }

    Ok(())
}
