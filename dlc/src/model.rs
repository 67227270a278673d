//! Container entities and their markup representation.
//!
//! Every leaf value of the markup (element text or attribute) holds base64
//! text of the single-byte encoded field value.

use crate::{
    Error, Result,
    text::{decode_field, encode_field},
};
use log::trace;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Markup version written into created containers.
pub const DLC_XML_VERSION: &str = "20_02_2008";

const DEFAULT_PASSWORDS: &str = "{}";
const DEFAULT_CATEGORY: &str = "various";
const UNKNOWN_COMMENT: &str = "unknown";

/// A decoded container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Container {
    pub header: Header,
    pub content: Content,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Header {
    pub generator: Generator,
    /// Free form markup version, not validated.
    pub version: String,
    pub tribute: Tribute,
}

/// The tool which created the container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Generator {
    pub app: String,
    pub version: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tribute {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Content {
    pub package: Package,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: String,
    pub comment: String,
    pub passwords: String,
    pub category: String,
    /// Files in download order.
    pub files: Vec<File>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct File {
    pub url: String,
    pub filename: String,
    /// Advisory size in bytes, 0 when unknown.
    pub size: u64,
}

impl Header {
    /// Header written by this crate into created containers.
    pub fn generated() -> Self {
        Self {
            generator: Generator {
                app: "undlc".to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                url: env!("CARGO_PKG_REPOSITORY").to_owned(),
            },
            version: DLC_XML_VERSION.to_owned(),
            tribute: Tribute {
                name: "undlc".to_owned(),
            },
        }
    }
}

impl Package {
    /// Package with the default passwords and category.
    ///
    /// An empty `name` forces the comment to `unknown`, an empty `comment`
    /// falls back to the package name.
    pub fn new(name: &str, comment: &str, files: Vec<File>) -> Self {
        let comment = if name.is_empty() {
            UNKNOWN_COMMENT
        } else if comment.is_empty() {
            name
        } else {
            comment
        };

        Self {
            name: name.to_owned(),
            comment: comment.to_owned(),
            passwords: DEFAULT_PASSWORDS.to_owned(),
            category: DEFAULT_CATEGORY.to_owned(),
            files,
        }
    }
}

impl File {
    /// File entry for a bare link, named after the last path segment.
    pub fn from_link(link: &str) -> Result<Self> {
        let url = link
            .parse::<Url>()
            .map_err(|x| Error::format(format!("invalid link '{}' ({})", link, x)))?;
        let filename = url
            .path_segments()
            .and_then(|x| x.filter(|x| !x.is_empty()).last())
            .unwrap_or_default()
            .to_owned();

        Ok(Self {
            url: link.to_owned(),
            filename,
            size: 0,
        })
    }
}

impl Container {
    /// Container holding a single package, with the given header.
    pub fn new(header: Header, package_name: &str, comment: &str, files: Vec<File>) -> Self {
        Self {
            header,
            content: Content {
                package: Package::new(package_name, comment, files),
            },
        }
    }

    /// Parses decrypted markup.
    ///
    /// The root element must contain `header` and `content`, every other
    /// missing element or attribute reads as an empty value. Package children
    /// other than `file` entries are skipped.
    pub fn from_markup(markup: &str) -> Result<Self> {
        let dlc = quick_xml::de::from_str::<DlcXml>(markup)?;
        trace!(
            "parsed markup with {} file entries",
            dlc.content.package.files.len()
        );

        Ok(Self {
            header: dlc.header.into(),
            content: Content {
                package: dlc.content.package.try_into()?,
            },
        })
    }

    /// Builds markup from the entities, the inverse of [`Self::from_markup`].
    pub fn to_markup(&self) -> Result<String> {
        quick_xml::se::to_string(&DlcXml::from(self))
            .map_err(|x| Error::format(format!("cannot build markup ({})", x)))
    }

    pub fn files(&self) -> &[File] {
        &self.content.package.files
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.files().iter().map(|x| x.url.as_str())
    }
}

#[derive(Deserialize, Serialize)]
#[serde(rename = "dlc")]
struct DlcXml {
    header: HeaderXml,
    content: ContentXml,
}

#[derive(Default, Deserialize, Serialize)]
struct HeaderXml {
    #[serde(default)]
    generator: GeneratorXml,
    #[serde(default)]
    tribute: TributeXml,
    #[serde(default)]
    dlcxmlversion: String,
}

#[derive(Default, Deserialize, Serialize)]
struct GeneratorXml {
    #[serde(default)]
    app: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    url: String,
}

#[derive(Default, Deserialize, Serialize)]
struct TributeXml {
    #[serde(default)]
    name: String,
}

#[derive(Default, Deserialize, Serialize)]
struct ContentXml {
    #[serde(default)]
    package: PackageXml,
}

#[derive(Default, Deserialize, Serialize)]
struct PackageXml {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@comment", default)]
    comment: String,
    #[serde(rename = "@passwords", default)]
    passwords: String,
    #[serde(rename = "@category", default)]
    category: String,
    #[serde(rename = "file", alias = "File", alias = "FILE", default)]
    files: Vec<FileXml>,
}

#[derive(Default, Deserialize, Serialize)]
struct FileXml {
    #[serde(default)]
    url: String,
    #[serde(default)]
    filename: String,
    #[serde(default)]
    size: String,
}

impl From<HeaderXml> for Header {
    fn from(x: HeaderXml) -> Self {
        Self {
            generator: Generator {
                app: decode_field(&x.generator.app),
                version: decode_field(&x.generator.version),
                url: decode_field(&x.generator.url),
            },
            version: decode_field(&x.dlcxmlversion),
            tribute: Tribute {
                name: decode_field(&x.tribute.name),
            },
        }
    }
}

impl TryFrom<PackageXml> for Package {
    type Error = Error;

    fn try_from(x: PackageXml) -> Result<Self> {
        Ok(Self {
            name: decode_field(&x.name),
            comment: decode_field(&x.comment),
            passwords: decode_field(&x.passwords),
            category: decode_field(&x.category),
            files: x
                .files
                .into_iter()
                .map(File::try_from)
                .collect::<Result<_>>()?,
        })
    }
}

impl TryFrom<FileXml> for File {
    type Error = Error;

    fn try_from(x: FileXml) -> Result<Self> {
        let size = decode_field(&x.size);
        let size = size.trim();

        Ok(Self {
            url: decode_field(&x.url),
            filename: decode_field(&x.filename),
            size: if size.is_empty() {
                0
            } else {
                size.parse()
                    .map_err(|_| Error::format(format!("invalid file size '{}'", size)))?
            },
        })
    }
}

impl From<&Container> for DlcXml {
    fn from(x: &Container) -> Self {
        let header = &x.header;
        let package = &x.content.package;

        Self {
            header: HeaderXml {
                generator: GeneratorXml {
                    app: encode_field(&header.generator.app),
                    version: encode_field(&header.generator.version),
                    url: encode_field(&header.generator.url),
                },
                tribute: TributeXml {
                    name: encode_field(&header.tribute.name),
                },
                dlcxmlversion: encode_field(&header.version),
            },
            content: ContentXml {
                package: PackageXml {
                    name: encode_field(&package.name),
                    comment: encode_field(&package.comment),
                    passwords: encode_field(&package.passwords),
                    category: encode_field(&package.category),
                    files: package
                        .files
                        .iter()
                        .map(|file| FileXml {
                            url: encode_field(&file.url),
                            filename: encode_field(&file.filename),
                            size: encode_field(&file.size.to_string()),
                        })
                        .collect(),
                },
            },
        }
    }
}
