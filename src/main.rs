//! stubgen — generate linkable stub definitions from declaration-only C++ headers.
//!
//! Scans the `register` header tree under an include root and writes one
//! `stub_<name>.cc` unit per allow-listed header. Each unit carries the shared
//! include prologue, the namespace skeleton of its header, and one trivial
//! definition per declared function, so test binaries link without the real
//! library.

mod config;
mod discover;
mod emit;
mod model;
mod scanner;
mod synth;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use discover::Header;
use model::ScanStats;

#[derive(Parser)]
#[command(
    name = "stubgen",
    about = "Generate linkable stub definitions from declaration-only C++ headers"
)]
struct Cli {
    /// Include root holding the `register` header tree
    inc_root: PathBuf,

    /// Directory receiving the generated `stub_*.cc` units
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("stubgen=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = Config::builtin();

    let batch = discover::discover(&cfg, &cli.inc_root)?;
    if batch.headers.is_empty() {
        warn!("no stub targets under `{}`", cli.inc_root.display());
        return Ok(());
    }
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create `{}`", cli.out_dir.display()))?;

    let failed: Vec<String> = batch
        .headers
        .par_iter()
        .filter_map(
            |header| match generate_unit(&cfg, header, &batch.prologue, &cli.out_dir) {
                Ok(()) => None,
                Err(err) => {
                    error!("{}: {err:#}", header.path.display());
                    Some(header.path.display().to_string())
                }
            },
        )
        .collect();
    if !failed.is_empty() {
        bail!("failed to generate stubs for {} header(s)", failed.len());
    }
    Ok(())
}

/// Reads one header, scans it, and writes its stub unit.
fn generate_unit(cfg: &Config, header: &Header, prologue: &str, out_dir: &Path) -> Result<()> {
    let out_name = cfg.output_name(&header.stem);
    let out_path = out_dir.join(&out_name);
    info!(
        "generating {} from {}",
        out_path.display(),
        header.path.display()
    );

    let source = fs::read_to_string(&header.path)
        .with_context(|| format!("failed to read `{}`", header.path.display()))?;
    let scanned = scanner::scan(cfg, &source)?;

    let mut content = String::with_capacity(prologue.len() + scanned.body.len() + 256);
    content.push_str(prologue);
    content.push_str(&scanned.body);
    if out_name == cfg.root_output {
        content.push_str(cfg.trailer);
    }

    fs::write(&out_path, &content)
        .with_context(|| format!("failed to write `{}`", out_path.display()))?;

    let ScanStats {
        emitted,
        skipped_duplicates,
        unresolved,
    } = scanned.stats;
    info!(
        "{}: {} stubs, {} duplicates dropped, {} unresolved",
        out_path.display(),
        emitted,
        skipped_duplicates,
        unresolved
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn header_in(dir: &Path, name: &str, text: &str) -> Header {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        Header {
            path,
            stem: name.trim_end_matches(".h").to_string(),
        }
    }

    #[test]
    fn unit_is_prologue_then_body() {
        let dir = tempdir().unwrap();
        let header = header_in(
            dir.path(),
            "op_def.h",
            "namespace ge {\nStatus Touch();\n}  // namespace ge\n",
        );
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();

        generate_unit(
            &Config::builtin(),
            &header,
            "#include \"register/op_def.h\"\n",
            &out,
        )
        .unwrap();

        let text = fs::read_to_string(out.join("stub_op_def.cc")).unwrap();
        assert!(text.starts_with("#include \"register/op_def.h\"\nnamespace ge {\n\n"));
        assert!(text.contains("Status Touch()\n{\n    return SUCCESS;\n}\n\n"));
        assert!(!text.contains("FrameworkRegistryImpl"));
    }

    #[test]
    fn root_unit_receives_the_trailer() {
        let dir = tempdir().unwrap();
        let header = header_in(
            dir.path(),
            "register.h",
            "namespace ge {\nStatus Touch();\n}  // namespace ge\n",
        );
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();

        generate_unit(&Config::builtin(), &header, "", &out).unwrap();

        let text = fs::read_to_string(out.join("stub_register.cc")).unwrap();
        assert!(text.contains("namespace domi {\nclass FMK_FUNC_HOST_VISIBILITY"));
        assert!(text.ends_with("}  // namespace domi\n"));
    }

    #[test]
    fn scan_errors_surface_through_generate_unit() {
        let dir = tempdir().unwrap();
        let header = header_in(dir.path(), "op_def.h", "namespace ge {\n");
        let err = generate_unit(&Config::builtin(), &header, "", dir.path()).unwrap_err();
        assert!(err.to_string().contains("unbalanced scopes"));
    }
}
