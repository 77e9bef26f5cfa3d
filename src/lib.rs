pub mod archive;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod extractor;
pub mod http;
pub mod installer;
pub mod loader;
pub mod module;
pub mod root;
pub mod runtime;
pub mod scratch;

/// Test utilities for building installation roots and module artifacts.
#[cfg(test)]
pub mod test_utils {
    use std::io::{Cursor, Write};
    use std::path::{Path, PathBuf};
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Returns a fake installation root path based on the platform.
    /// - Unix: `/var/www/shop`
    /// - Windows: `C:\inetpub\shop`
    pub fn test_root() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/var/www/shop")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\inetpub\shop")
        }
    }

    /// Turn `path` into a valid installation root by adding the marker file.
    pub fn create_installation_root(path: &Path) {
        let etc = path.join("app").join("etc");
        std::fs::create_dir_all(&etc).unwrap();
        std::fs::write(etc.join("env.php"), "<?php return [];").unwrap();
    }

    /// A minimal `etc/module.xml` declaring `name`.
    pub fn module_xml(name: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<config xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="urn:magento:framework:Module/etc/module.xsd">
    <module name="{}"/>
</config>
"#,
            name
        )
    }

    /// Build an in-memory ZIP archive from `(name, content)` pairs.
    pub fn create_zip(files: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}
