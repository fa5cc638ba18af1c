use mingle_app::{app::App, config::Config};

use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::parse();
    let db = mingle_db::Db::init(&config.database_url).await?;

    mingle_app::serve(App {
        config: Arc::new(config),
        db,
    })
    .await?;

    Ok(())
}
