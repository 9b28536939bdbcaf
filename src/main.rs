use persons_api::{AppState, Config, PersonDirectory, Server, logging, routes};

#[tokio::main]
async fn main() -> Result<(), persons_api::Error> {
    let config = Config::load()?;
    logging::init(&config);

    let state = AppState::new(PersonDirectory::new(config.person_ids.iter().copied()));
    let app = routes::router(state).with_body_limit(config.max_body_bytes);

    Server::bind(&config.addr())?.serve(app).await
}
