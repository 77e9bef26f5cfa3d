//! Locating and reading the module manifest (`<container>/etc/module.xml`).

use anyhow::{Context, Result, anyhow};
use log::debug;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::path::{Path, PathBuf};

use super::ModuleName;
use crate::runtime::Runtime;

pub const MANIFEST_DIR: &str = "etc";
pub const MANIFEST_FILE: &str = "module.xml";

/// Element carrying the module's declared name.
const MODULE_ELEMENT: &[u8] = b"module";
const NAME_ATTRIBUTE: &str = "name";

/// Archivers on macOS add this folder next to the real content.
const IGNORED_TOP_LEVEL: &[&str] = &["__MACOSX"];

/// Top-level entries that are never the module container: archiver
/// leftovers and hidden files such as `.DS_Store` or `.gitattributes`.
fn is_ignored_top_level(path: &Path) -> bool {
    path.file_name().is_some_and(|n| {
        IGNORED_TOP_LEVEL.iter().any(|i| n == *i) || n.to_string_lossy().starts_with('.')
    })
}

/// Where the payload and manifest live inside an extracted artifact.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ModuleLayout {
    /// The single top-level directory of the archive; its contents are the payload.
    pub container: PathBuf,
    pub manifest: PathBuf,
}

/// Find the container directory and its manifest under `extraction_root`.
///
/// Artifacts must unpack into exactly one top-level directory holding
/// `etc/module.xml`. Anything else is rejected rather than guessed at.
#[tracing::instrument(skip(runtime))]
pub fn locate<R: Runtime>(runtime: &R, extraction_root: &Path) -> Result<ModuleLayout> {
    let entries: Vec<PathBuf> = runtime
        .read_dir(extraction_root)
        .context("Failed to read extraction directory")?
        .into_iter()
        .filter(|p| !is_ignored_top_level(p))
        .collect();

    let container = match entries.as_slice() {
        [] => return Err(anyhow!("Archive appears to be empty.")),
        [single] if runtime.is_dir(single) => single.clone(),
        [single] => {
            return Err(anyhow!(
                "Archive must contain a single top-level directory, found file {:?}",
                single.file_name().unwrap_or_default()
            ));
        }
        many => {
            return Err(anyhow!(
                "Archive must contain a single top-level directory, found {} entries",
                many.len()
            ));
        }
    };
    debug!("Found container directory {:?}", container);

    let manifest = container.join(MANIFEST_DIR).join(MANIFEST_FILE);
    if !runtime.exists(&manifest) {
        return Err(anyhow!(
            "No {}/{} found in {:?}",
            MANIFEST_DIR,
            MANIFEST_FILE,
            container.file_name().unwrap_or_default()
        ));
    }

    Ok(ModuleLayout {
        container,
        manifest,
    })
}

/// The parts of `module.xml` needed to place a module.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ModuleManifest {
    /// Declared name, as written in the manifest.
    pub name: String,
}

impl ModuleManifest {
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read manifest {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid manifest {:?}", path))
    }

    /// Parse a manifest document. The first `<module>` element supplies the
    /// name; the document as a whole must be well-formed.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut name = None;
        let mut depth = 0usize;
        let mut seen_root = false;

        loop {
            let event = reader.read_event().with_context(|| {
                format!(
                    "Malformed XML at position {}",
                    reader.error_position()
                )
            })?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    if depth == 0 && seen_root {
                        return Err(anyhow!("Manifest has more than one root element"));
                    }
                    seen_root = true;
                    if matches!(event, Event::Start(_)) {
                        depth += 1;
                    }

                    if name.is_none() && e.name().as_ref() == MODULE_ELEMENT {
                        let attr = e
                            .try_get_attribute(NAME_ATTRIBUTE)
                            .context("Malformed attribute on <module>")?
                            .ok_or_else(|| anyhow!("<module> element has no name attribute"))?;
                        let value = attr
                            .unescape_value()
                            .context("Malformed name attribute on <module>")?;
                        name = Some(value.into_owned());
                    }
                }
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(anyhow!("Manifest has no root element"));
        }
        if depth != 0 {
            return Err(anyhow!("Manifest ended with unclosed elements"));
        }

        let name = name.ok_or_else(|| anyhow!("Manifest declares no <module> element"))?;
        Ok(Self { name })
    }

    pub fn module_name(&self) -> Result<ModuleName> {
        self.name.parse()
    }
}
