use dotenvy::dotenv;
use stars_shop::ShopConfig;
use stars_shop::config::PricingConfig;
use stars_shop::telegram;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let config = match ShopConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("refusing to start: {e}");
            std::process::exit(1);
        }
    };

    info!(
        price = %config.pricing.star_price,
        min = config.pricing.min_stars,
        max = PricingConfig::MAX_STARS,
        "starting stars shop"
    );

    telegram::run(config).await;
}
