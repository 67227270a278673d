use anyhow::Result;
use clap::Args;
use dlc::{Container, KeyService};
use log::info;
use std::{fs, path::PathBuf};

/// Create a container from links.
#[derive(Debug, Clone, Args)]
pub struct Create {
    /// Links to pack, in download order.
    /// File names are taken from the last path segment of each link.
    #[arg(required = true, value_name = "URL")]
    pub links: Vec<String>,

    /// Package name.
    /// If empty, the comment is set to "unknown".
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Package comment, defaults to the package name.
    #[arg(short, long, default_value = "")]
    pub comment: String,

    /// Write the container to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Create {
    pub fn execute(self, service: &dyn KeyService) -> Result<()> {
        let container =
            Container::create_from_links(&self.links, &self.name, &self.comment, service)?;
        info!("created container with {} links", self.links.len());

        if let Some(output) = &self.output {
            fs::write(output, container)?;
            info!("saved {}", output.display());
        } else {
            println!("{}", container);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlc::LoopbackKeyService;

    #[test]
    fn test_create_output_file() {
        let output = std::env::temp_dir().join(format!("undlc-create-{}.dlc", std::process::id()));
        let args = Create {
            links: vec!["https://example.com/files/setup.exe".to_owned()],
            name: "setup".to_owned(),
            comment: String::new(),
            output: Some(output.clone()),
        };
        args.execute(&LoopbackKeyService).unwrap();

        let raw = fs::read_to_string(&output).unwrap();
        let container = Container::decode(&raw, &LoopbackKeyService).unwrap();
        assert_eq!(container.content.package.name, "setup");
        assert_eq!(container.content.package.comment, "setup");
        assert_eq!(container.files()[0].filename, "setup.exe");

        fs::remove_file(&output).ok();
    }

    #[test]
    fn test_create_invalid_link() {
        let args = Create {
            links: vec!["not a link".to_owned()],
            name: String::new(),
            comment: String::new(),
            output: None,
        };
        assert!(args.execute(&LoopbackKeyService).is_err());
    }
}
