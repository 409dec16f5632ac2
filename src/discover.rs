//! Header discovery: walks the keyword directories under the include root
//! and builds the shared include prologue.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use tracing::debug;

use crate::config::Config;

/// One header file selected for stub generation.
#[derive(Debug, Clone)]
pub struct Header {
    pub path: PathBuf,
    /// File stem naming the output unit: `op_def.h` becomes `op_def`.
    pub stem: String,
}

/// Everything discovery learns from one include root.
#[derive(Debug)]
pub struct HeaderBatch {
    /// Headers that receive a stub unit, in path order.
    pub headers: Vec<Header>,
    /// `#include` lines shared by every generated unit. Lists every header
    /// found under the keyword directories, not only the allow-listed ones,
    /// so each unit sees the same declarations the real library would.
    pub prologue: String,
}

pub fn discover(cfg: &Config, inc_root: &Path) -> Result<HeaderBatch> {
    let mut found: Vec<PathBuf> = Vec::new();
    for keyword in &cfg.include_dir_keywords {
        let pattern = inc_root.join(keyword).join("**").join("*.h");
        let pattern = pattern.to_string_lossy().into_owned();
        let entries =
            glob(&pattern).with_context(|| format!("invalid header pattern `{pattern}`"))?;
        for entry in entries {
            let path = entry?;
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name,
                None => continue,
            };
            // Version-control droppings such as `.gitignore` copies.
            if name.contains("git") {
                continue;
            }
            found.push(path);
        }
    }
    found.sort();
    found.dedup();

    let mut prologue = String::new();
    let mut headers = Vec::new();
    for path in found {
        prologue.push_str("#include \"");
        prologue.push_str(&include_path(inc_root, &path));
        prologue.push_str("\"\n");
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if !cfg.allows(name) {
            continue;
        }
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        headers.push(Header { path, stem });
    }
    for line in cfg.extra_include_lines {
        prologue.push_str(line);
        prologue.push('\n');
    }
    debug!(
        "{} declaration headers collected, {} selected for stubs",
        prologue.lines().count() - cfg.extra_include_lines.len(),
        headers.len()
    );
    Ok(HeaderBatch { headers, prologue })
}

/// Path as written in an `#include`: relative to the include root, forward
/// slashes, keyword directory kept as the first segment.
fn include_path(inc_root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(inc_root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn prologue_lists_every_header_but_units_respect_the_allow_list() {
        let dir = tempdir().unwrap();
        let inc = dir.path();
        touch(&inc.join("register/op_def.h"));
        touch(&inc.join("register/opdef/op_def_api.h"));
        touch(&inc.join("elsewhere/ignored.h"));

        let batch = discover(&Config::builtin(), inc).unwrap();
        assert!(batch.prologue.contains("#include \"register/op_def.h\"\n"));
        assert!(batch.prologue.contains("#include \"register/opdef/op_def_api.h\"\n"));
        assert!(!batch.prologue.contains("ignored.h"));
        assert!(batch.prologue.ends_with("#include <iostream>\n"));

        let stems: Vec<&str> = batch.headers.iter().map(|h| h.stem.as_str()).collect();
        assert_eq!(stems, ["op_def"]);
    }

    #[test]
    fn git_named_files_are_skipped() {
        let dir = tempdir().unwrap();
        let inc = dir.path();
        touch(&inc.join("register/register.h"));
        touch(&inc.join("register/gitignore_backup.h"));

        let batch = discover(&Config::builtin(), inc).unwrap();
        assert!(!batch.prologue.contains("gitignore_backup"));
        assert_eq!(batch.headers.len(), 1);
    }

    #[test]
    fn discovery_is_sorted_and_stable() {
        let dir = tempdir().unwrap();
        let inc = dir.path();
        touch(&inc.join("register/tilingdata_base.h"));
        touch(&inc.join("register/op_def.h"));
        touch(&inc.join("register/register.h"));

        let cfg = Config::builtin();
        let first = discover(&cfg, inc).unwrap();
        let second = discover(&cfg, inc).unwrap();
        assert_eq!(first.prologue, second.prologue);

        let stems: Vec<&str> = first.headers.iter().map(|h| h.stem.as_str()).collect();
        assert_eq!(stems, ["op_def", "register", "tilingdata_base"]);
    }

    #[test]
    fn missing_root_yields_an_empty_batch() {
        let dir = tempdir().unwrap();
        let batch = discover(&Config::builtin(), &dir.path().join("absent")).unwrap();
        assert!(batch.headers.is_empty());
        assert!(batch.prologue.starts_with("#include \"register/kernel_register_data.h\""));
    }
}
