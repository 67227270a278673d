use anyhow::{Result, bail};
use clap::Args;
use dlc::{Container, KeyService};
use log::{error, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Decrypt containers and print their links.
#[derive(Debug, Clone, Args)]
pub struct Decode {
    /// Container files to decrypt.
    #[arg(required = true)]
    pub input: Vec<PathBuf>,

    /// Print url, file name and size separated by tabs.
    /// Combined with --json the whole container is printed instead of a link array.
    #[arg(short, long)]
    pub full: bool,

    /// Print json instead of plain text.
    #[arg(long)]
    pub json: bool,
}

impl Decode {
    pub fn execute(self, service: &dyn KeyService) -> Result<()> {
        let mut failed = 0;

        for path in &self.input {
            info!("{}", path.display());

            match self.decode(path, service) {
                Ok(output) => {
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                }
                Err(e) => {
                    error!("unable to decrypt {} ({})", path.display(), e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            bail!(
                "{} of {} containers could not be decrypted.",
                failed,
                self.input.len()
            );
        }

        Ok(())
    }

    fn decode(&self, path: &Path, service: &dyn KeyService) -> Result<String> {
        let raw = fs::read_to_string(path)?;
        let container = Container::decode(raw.trim(), service)?;
        self.render(&container)
    }

    fn render(&self, container: &Container) -> Result<String> {
        Ok(match (self.json, self.full) {
            (true, true) => serde_json::to_string(container)?,
            (true, false) => serde_json::to_string(&container.links().collect::<Vec<_>>())?,
            (false, true) => container
                .files()
                .iter()
                .map(|x| format!("{}\t{}\t{}", x.url, x.filename, x.size))
                .collect::<Vec<_>>()
                .join("\n"),
            (false, false) => container.links().collect::<Vec<_>>().join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlc::{File, Header};

    fn container() -> Container {
        Container::new(
            Header::generated(),
            "docs",
            "",
            vec![
                File {
                    url: "https://example.com/a.pdf".to_owned(),
                    filename: "a.pdf".to_owned(),
                    size: 42,
                },
                File {
                    url: "https://example.com/b.pdf".to_owned(),
                    filename: "b.pdf".to_owned(),
                    size: 0,
                },
            ],
        )
    }

    fn args(full: bool, json: bool) -> Decode {
        Decode {
            input: vec![],
            full,
            json,
        }
    }

    #[test]
    fn test_render_links() {
        assert_eq!(
            args(false, false).render(&container()).unwrap(),
            "https://example.com/a.pdf\nhttps://example.com/b.pdf"
        );
    }

    #[test]
    fn test_render_full() {
        assert_eq!(
            args(true, false).render(&container()).unwrap(),
            "https://example.com/a.pdf\ta.pdf\t42\nhttps://example.com/b.pdf\tb.pdf\t0"
        );
    }

    #[test]
    fn test_render_json() {
        assert_eq!(
            args(false, true).render(&container()).unwrap(),
            r#"["https://example.com/a.pdf","https://example.com/b.pdf"]"#
        );

        let full = args(true, true).render(&container()).unwrap();
        let value = serde_json::from_str::<serde_json::Value>(&full).unwrap();
        assert_eq!(value["content"]["package"]["name"], "docs");
        assert_eq!(value["content"]["package"]["files"][0]["size"], 42);
        assert_eq!(value["header"]["generator"]["app"], "undlc");
    }

    #[test]
    fn test_execute_continues_after_failure() {
        let dir = std::env::temp_dir().join(format!("undlc-decode-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let short = dir.join("short.dlc");
        fs::write(&short, "too short").unwrap();

        let args = Decode {
            input: vec![short, dir.join("missing.dlc")],
            full: false,
            json: false,
        };
        let error = args.execute(&dlc::LoopbackKeyService).unwrap_err();
        assert!(error.to_string().starts_with("2 of 2"));

        fs::remove_dir_all(&dir).ok();
    }
}
