use tailoring::config::configuration;
use tailoring::db::establish_connection;
use tailoring::startup::Application;
use tailoring::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("tailoring".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    dotenv::dotenv().ok();
    let config = configuration::Settings::new().expect("Failed to load configurations");
    let pool = establish_connection(&config.database.url);

    let application = Application::build(config.application.port, pool).await?;
    application.run_until_stopped().await?;
    Ok(())
}
