use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("arch-check") => arch_check(),
        Some(cmd) => anyhow::bail!("Unknown xtask command: {cmd}"),
        None => anyhow::bail!("Usage: cargo xtask <command>\n\nCommands:\n  arch-check"),
    }
}

/// Internal crates each workspace crate may depend on.
const ALLOWED_INTERNAL_DEPS: &[(&str, &[&str])] = &[
    ("chronicle-domain", &[]),
    ("chronicle-shared", &["chronicle-domain"]),
    ("chronicle-engine", &["chronicle-domain", "chronicle-shared"]),
    ("xtask", &[]),
];

/// The domain crate stays pure: no runtime, no I/O.
const DOMAIN_FORBIDDEN_CRATES: &[&str] = &["tokio", "tracing", "async_trait", "std::fs", "std::net"];

#[derive(Deserialize)]
struct Metadata {
    packages: Vec<Package>,
    workspace_root: PathBuf,
}

#[derive(Deserialize)]
struct Package {
    name: String,
    dependencies: Vec<Dependency>,
}

#[derive(Deserialize)]
struct Dependency {
    name: String,
    #[serde(default)]
    kind: Option<String>,
}

fn arch_check() -> anyhow::Result<()> {
    let output = std::process::Command::new("cargo")
        .args(["metadata", "--format-version", "1", "--no-deps"])
        .output()
        .context("running cargo metadata")?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed")
    }
    let metadata: Metadata =
        serde_json::from_slice(&output.stdout).context("parsing cargo metadata")?;

    let mut violations = dependency_violations(&metadata.packages);
    violations.extend(domain_import_violations(&metadata.workspace_root)?);

    if violations.is_empty() {
        println!("arch-check: ok ({} crates)", metadata.packages.len());
        return Ok(());
    }
    for violation in &violations {
        eprintln!("arch-check: {violation}");
    }
    anyhow::bail!("{} architecture violation(s)", violations.len())
}

fn dependency_violations(packages: &[Package]) -> Vec<String> {
    let allowed: BTreeMap<&str, &[&str]> = ALLOWED_INTERNAL_DEPS.iter().copied().collect();
    let internal: Vec<&str> = packages.iter().map(|p| p.name.as_str()).collect();

    let mut violations = Vec::new();
    for package in packages {
        let Some(permitted) = allowed.get(package.name.as_str()) else {
            violations.push(format!("{} is not a known workspace crate", package.name));
            continue;
        };
        for dep in &package.dependencies {
            // Dev-dependencies may reach across layers for fixtures.
            if dep.kind.as_deref() == Some("dev") {
                continue;
            }
            if internal.contains(&dep.name.as_str()) && !permitted.contains(&dep.name.as_str()) {
                violations.push(format!("{} must not depend on {}", package.name, dep.name));
            }
        }
    }
    violations
}

fn domain_import_violations(root: &Path) -> anyhow::Result<Vec<String>> {
    let pattern = DOMAIN_FORBIDDEN_CRATES
        .iter()
        .map(|name| regex_lite::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    let forbidden = regex_lite::Regex::new(&format!(r"^\s*(pub\s+)?use\s+({pattern})\b"))
        .context("building import pattern")?;

    let mut violations = Vec::new();
    for file in rust_files(&root.join("crates/domain/src"))? {
        let source =
            std::fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
        for (line_no, line) in source.lines().enumerate() {
            if forbidden.is_match(line) {
                violations.push(format!(
                    "{}:{}: domain imports `{}`",
                    file.display(),
                    line_no + 1,
                    line.trim()
                ));
            }
        }
    }
    Ok(violations)
}

fn rust_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            files.extend(rust_files(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
