use std::env;

struct VersionInfo {
    name: &'static str,
    version: &'static str,
    description: &'static str,
    os: &'static str,
    architecture: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            name: clap::crate_name!(),
            version: clap::crate_version!(),
            description: clap::crate_description!(),
            os: env::consts::OS,
            architecture: env::consts::ARCH,
        }
    }

    fn lines(&self) -> [(&'static str, &'static str); 5] {
        [
            ("Name", self.name),
            ("Version", self.version),
            ("Description", self.description),
            ("OS", self.os),
            ("Architecture", self.architecture),
        ]
    }
}

pub fn run() {
    for (title, value) in VersionInfo::current().lines() {
        println!("{title:<15}: {value}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_start_with_package_name() {
        // Act
        let lines = VersionInfo::current().lines();

        // Assert
        assert_eq!(lines[0], ("Name", "filesvc"));
        assert!(!lines[1].1.is_empty());
    }
}
