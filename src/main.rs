/// Country Explorer API
///
/// Country lookup and population comparison over the REST Countries API,
/// plus a favorites list with pictures hosted on Cloudinary.

use country_explorer::{
    config::{LoggingConfig, ServerConfig},
    context::AppContext,
    error::ApiResult,
    server,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Load configuration (also reads .env, which may set RUST_LOG)
    let config = ServerConfig::from_env()?;

    // Initialize logging
    init_tracing(&config.logging);

    print_banner();

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "country_explorer=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn print_banner() {
    println!(
        r#"
   ______                  __
  / ____/___  __  ______  / /________  __
 / /   / __ \/ / / / __ \/ __/ ___/ / / /
/ /___/ /_/ / /_/ / / / / /_/ /  / /_/ /
\____/\____/\__,_/_/ /_/\__/_/   \__, /
                                /____/
        Country Explorer API v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
