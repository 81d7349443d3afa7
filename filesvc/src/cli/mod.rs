pub mod bugreport;
pub mod client;
pub mod server;
pub mod version;

pub const SERVER_SUBCOMMAND: &str = "server";
pub const SERVER_DESCRIPTION: &str = "Run the server";

pub const VERSION_SUBCOMMAND: &str = "version";
pub const VERSION_DESCRIPTION: &str = "Display the version and build information";

pub const BUGREPORT_SUBCOMMAND: &str = "bugreport";
pub const BUGREPORT_DESCRIPTION: &str = "Collect information about the system and the environment to include into bug reports";

pub const UPLOAD_SUBCOMMAND: &str = "upload";
pub const UPLOAD_DESCRIPTION: &str = "Upload a file into the container";

pub const LIST_SUBCOMMAND: &str = "list";
pub const LIST_DESCRIPTION: &str = "List all files in the container";

pub const DOWNLOAD_SUBCOMMAND: &str = "download";
pub const DOWNLOAD_DESCRIPTION: &str = "Download a file from the container";

pub const DELETE_SUBCOMMAND: &str = "delete";
pub const DELETE_DESCRIPTION: &str = "Delete a file from the container";
