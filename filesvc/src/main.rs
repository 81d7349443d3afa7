use std::process::ExitCode;

use clap::{arg, command, crate_name, value_parser, ArgMatches, Command};
use client::{DownloadParams, UploadParams};

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = build_cli().get_matches();

    if cli.subcommand_matches(cli::VERSION_SUBCOMMAND).is_some() {
        cli::version::run();
    } else if cli.subcommand_matches(cli::BUGREPORT_SUBCOMMAND).is_some() {
        cli::bugreport::run();
    } else if let Some(server_matches) = cli.subcommand_matches(cli::SERVER_SUBCOMMAND) {
        if let Err(e) = cli::server::run(server_matches).await {
            eprintln!("server error: {e}");
            return ExitCode::FAILURE;
        }
    } else if let Some(matches) = cli.subcommand_matches(cli::UPLOAD_SUBCOMMAND) {
        let params = UploadParams {
            uri: required(matches, "uri"),
            file: required(matches, "file"),
        };
        cli::client::upload(params).await;
    } else if let Some(matches) = cli.subcommand_matches(cli::LIST_SUBCOMMAND) {
        cli::client::list(&required(matches, "uri")).await;
    } else if let Some(matches) = cli.subcommand_matches(cli::DOWNLOAD_SUBCOMMAND) {
        let params = DownloadParams {
            uri: required(matches, "uri"),
            name: required(matches, "name"),
            output: matches.get_one::<String>("output").cloned(),
        };
        cli::client::download(params).await;
    } else if let Some(matches) = cli.subcommand_matches(cli::DELETE_SUBCOMMAND) {
        cli::client::delete(&required(matches, "uri"), &required(matches, "name")).await;
    }
    ExitCode::SUCCESS
}

// clap guarantees presence of required arguments
fn required(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

fn uri_arg() -> clap::Arg {
    arg!(-u --uri <URI>).required(true).help("Service URI")
}

fn name_arg() -> clap::Arg {
    arg!(-n --name <NAME>).required(true).help("File name inside the container")
}

fn build_cli() -> Command {
    command!(crate_name!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .subcommand(Command::new(cli::VERSION_SUBCOMMAND).about(cli::VERSION_DESCRIPTION))
        .subcommand(Command::new(cli::BUGREPORT_SUBCOMMAND).about(cli::BUGREPORT_DESCRIPTION))
        .subcommand(
            Command::new(cli::SERVER_SUBCOMMAND)
                .about(cli::SERVER_DESCRIPTION)
                .arg(
                    arg!(-s --service <SERVICE>)
                        .env("FILESVC_STORAGE_SERVICE")
                        .hide_env_values(true)
                        .help("Storage connection string or 'memory'"),
                )
                .arg(
                    arg!(-c --container <CONTAINER>)
                        .env("FILESVC_STORAGE_CONTAINER")
                        .help("Blob container name"),
                )
                .arg(
                    arg!(-p --port <PORT>)
                        .env("FILESVC_PORT")
                        .value_parser(value_parser!(u16))
                        .help("Port to listen on"),
                ),
        )
        .subcommand(
            Command::new(cli::UPLOAD_SUBCOMMAND)
                .about(cli::UPLOAD_DESCRIPTION)
                .arg(uri_arg())
                .arg(
                    arg!(-f --file <FILE>)
                        .required(true)
                        .help("Path to file to upload"),
                ),
        )
        .subcommand(
            Command::new(cli::LIST_SUBCOMMAND)
                .about(cli::LIST_DESCRIPTION)
                .arg(uri_arg()),
        )
        .subcommand(
            Command::new(cli::DOWNLOAD_SUBCOMMAND)
                .about(cli::DOWNLOAD_DESCRIPTION)
                .arg(uri_arg())
                .arg(name_arg())
                .arg(arg!(-o --output <PATH>).help("Where to save the file")),
        )
        .subcommand(
            Command::new(cli::DELETE_SUBCOMMAND)
                .about(cli::DELETE_DESCRIPTION)
                .arg(uri_arg())
                .arg(name_arg()),
        )
        .arg_required_else_help(true)
        .disable_version_flag(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        build_cli().debug_assert();
    }

    #[test]
    fn server_port_parsed() {
        // Act
        let matches = build_cli()
            .try_get_matches_from(["filesvc", "server", "-p", "8080", "-s", "memory"])
            .unwrap();

        // Assert
        let server = matches.subcommand_matches(cli::SERVER_SUBCOMMAND).unwrap();
        assert_eq!(server.get_one::<u16>("port"), Some(&8080));
        assert_eq!(
            server.get_one::<String>("service").map(String::as_str),
            Some("memory")
        );
    }

    #[test]
    fn download_requires_name() {
        // Act
        let result = build_cli().try_get_matches_from(["filesvc", "download", "-u", "http://localhost"]);

        // Assert
        assert!(result.is_err());
    }
}
