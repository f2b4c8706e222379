use std::net::TcpListener;

use adlook::{
    configuration::get_configuration,
    services::{OpenaiClient, ResultStore},
    startup::run,
};
use env_logger::Env;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");
    configuration
        .require_openai_key()
        .expect("OPENAI_API_KEY must be set to start the server.");

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;
    log::info!("Listening on {}", listener.local_addr()?);

    let openai_client = OpenaiClient::new(configuration.api_keys.openai.clone());
    let store = ResultStore::new();

    run(listener, configuration, openai_client, store)?.await
}
