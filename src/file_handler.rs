use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Discovers TypeScript sources and performs the read/backup/write cycle
/// for the CLI.
pub struct FileHandler {
    backup_enabled: bool,
}

impl FileHandler {
    pub fn new(backup_enabled: bool) -> Self {
        Self { backup_enabled }
    }

    /// Expands the CLI path arguments into a sorted, deduplicated list of
    /// TypeScript files. Directories are walked recursively; arguments that
    /// name neither a file nor a directory are treated as glob patterns.
    pub fn find_typescript_files(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                if is_typescript_file(path) {
                    files.push(path.clone());
                }
            } else if path.is_dir() {
                self.walk_directory(path, &mut files)?;
            } else {
                let pattern = path
                    .to_str()
                    .with_context(|| format!("Invalid path: {}", path.display()))?;
                for entry in glob(pattern).context("Failed to read glob pattern")? {
                    let file = entry.context("Failed to process glob entry")?;
                    if is_typescript_file(&file) {
                        files.push(file);
                    }
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn walk_directory(&self, root: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)
                .with_context(|| format!("Failed to read directory: {}", dir.display()))?
            {
                let path = entry.context("Failed to read directory entry")?.path();
                if path.is_dir() {
                    if !is_skipped_directory(&path) {
                        pending.push(path);
                    }
                } else if is_typescript_file(&path) {
                    files.push(path);
                }
            }
        }
        Ok(())
    }

    pub fn read_file(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    pub fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if self.backup_enabled {
            self.create_backup(path)?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write file: {}", path.display()))
    }

    fn create_backup(&self, path: &Path) -> Result<()> {
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        let backup_path = path.with_extension(format!("{extension}.bak"));

        fs::copy(path, &backup_path)
            .with_context(|| format!("Failed to create backup: {}", backup_path.display()))?;

        Ok(())
    }
}

fn is_typescript_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "ts" | "tsx" | "mts" | "cts"))
}

/// Dependency trees and hidden directories are never sorted in place.
fn is_skipped_directory(path: &Path) -> bool {
    path.file_name()
        .map(|name| {
            let name = name.to_string_lossy();
            name == "node_modules" || name.starts_with('.')
        })
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_typescript_extensions() {
        for name in ["a.ts", "a.tsx", "a.mts", "a.cts"] {
            assert!(is_typescript_file(Path::new(name)), "{name}");
        }
        for name in ["a.js", "a.jsx", "a.json", "a"] {
            assert!(!is_typescript_file(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn test_single_file_argument() {
        let temp_dir = TempDir::new().unwrap();
        let ts_file = temp_dir.path().join("test.ts");
        fs::write(&ts_file, "// test").unwrap();

        let handler = FileHandler::new(false);
        let files = handler.find_typescript_files(&[ts_file.clone()]).unwrap();

        assert_eq!(files, vec![ts_file]);
    }

    #[test]
    fn test_directory_walk_is_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested).unwrap();

        let b_file = temp_dir.path().join("b.ts");
        let a_file = nested.join("a.tsx");
        let js_file = temp_dir.path().join("c.js");
        fs::write(&b_file, "// b").unwrap();
        fs::write(&a_file, "// a").unwrap();
        fs::write(&js_file, "// c").unwrap();

        let handler = FileHandler::new(false);
        let files = handler
            .find_typescript_files(&[temp_dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(files, vec![b_file, a_file]);
    }

    #[test]
    fn test_duplicate_arguments_are_deduplicated() {
        let temp_dir = TempDir::new().unwrap();
        let ts_file = temp_dir.path().join("test.ts");
        fs::write(&ts_file, "// test").unwrap();

        let handler = FileHandler::new(false);
        let files = handler
            .find_typescript_files(&[ts_file.clone(), ts_file.clone()])
            .unwrap();

        assert_eq!(files, vec![ts_file]);
    }

    #[test]
    fn test_node_modules_and_hidden_dirs_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let node_modules = temp_dir.path().join("node_modules");
        let hidden = temp_dir.path().join(".cache");
        fs::create_dir(&node_modules).unwrap();
        fs::create_dir(&hidden).unwrap();

        let ts_file = temp_dir.path().join("app.ts");
        fs::write(&ts_file, "// app").unwrap();
        fs::write(node_modules.join("lib.ts"), "// lib").unwrap();
        fs::write(hidden.join("gen.ts"), "// gen").unwrap();

        let handler = FileHandler::new(false);
        let files = handler
            .find_typescript_files(&[temp_dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(files, vec![ts_file]);
    }

    #[test]
    fn test_backup_is_created_before_write() {
        let temp_dir = TempDir::new().unwrap();
        let ts_file = temp_dir.path().join("test.ts");
        fs::write(&ts_file, "// original").unwrap();

        let handler = FileHandler::new(true);
        handler.write_file(&ts_file, "// sorted").unwrap();

        let backup_file = temp_dir.path().join("test.ts.bak");
        assert_eq!(fs::read_to_string(&backup_file).unwrap(), "// original");
        assert_eq!(fs::read_to_string(&ts_file).unwrap(), "// sorted");
    }

    #[test]
    fn test_no_backup_when_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let ts_file = temp_dir.path().join("test.ts");
        fs::write(&ts_file, "// original").unwrap();

        let handler = FileHandler::new(false);
        handler.write_file(&ts_file, "// sorted").unwrap();

        assert!(!temp_dir.path().join("test.ts.bak").exists());
    }
}
