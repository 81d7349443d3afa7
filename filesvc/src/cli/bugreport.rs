use bugreport::{
    bugreport,
    collector::{CompileTimeInformation, EnvironmentVariables, OperatingSystem, SoftwareVersion},
    format::Markdown,
};

// The storage service setting may carry an account key so it is never collected
const REPORTED_VARIABLES: &[&str] = &[
    "SHELL",
    "TERM",
    "RUST_LOG",
    "FILESVC_STORAGE_CONTAINER",
    "FILESVC_PORT",
];

pub fn run() {
    bugreport!()
        .info(SoftwareVersion::default())
        .info(OperatingSystem::default())
        .info(EnvironmentVariables::list(REPORTED_VARIABLES))
        .info(CompileTimeInformation::default())
        .print::<Markdown>();
}
