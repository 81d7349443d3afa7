use clap::ArgMatches;
use server::config::{Settings, DEFAULT_CONTAINER, DEFAULT_PORT, DEFAULT_SERVICE};

pub async fn run(matches: &ArgMatches) -> Result<(), server::config::StartupError> {
    let settings = Settings {
        service: matches
            .get_one::<String>("service")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SERVICE.to_owned()),
        container: matches
            .get_one::<String>("container")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CONTAINER.to_owned()),
        port: matches
            .get_one::<u16>("port")
            .copied()
            .unwrap_or(DEFAULT_PORT),
    };
    server::run(settings).await
}
