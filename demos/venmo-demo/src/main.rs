use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use venmo_rs::{VenmoConfig, VenmoSession};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let token = env::var("VENMO_ACCESS_TOKEN")?;
    let mut config = VenmoConfig::new(token).with_timeout(Duration::from_secs(15));
    if let Ok(user_agent) = env::var("VENMO_USER_AGENT") {
        config = config.with_user_agent(user_agent);
    }

    let session = VenmoSession::connect(&config).await?;
    tracing::info!(user_agent = ?session.client().user_agent(), "Connected");
    println!("Balance: {}", session.get_balance()?);
    println!("Limited account: {:?}", session.is_limited_account());

    for identity in session.get_handle().await? {
        println!("Identity: @{} ({})", identity.handle, identity.kind);
    }

    // Optional: look up a user by handle, e.g. VENMO_LOOKUP_USER=Jane-Doe-7
    if let Ok(handle) = env::var("VENMO_LOOKUP_USER") {
        let user = session.get_user(&handle).await?;
        println!("{} -> {}", handle, user.id("demo")?);
    }

    Ok(())
}
