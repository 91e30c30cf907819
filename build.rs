use anyhow::{Context, Result};
use chrono::TimeZone;
use std::env;
use std::fs;
use std::process::Command;
use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> Result<()> {
    let gitcl = GitclBuilder::default()
        .describe(true, true, Some("[0-9]*"))
        .build()?;

    let gitcl_res = Emitter::default()
        .idempotent()
        .fail_on_error()
        .add_instructions(&gitcl)
        .and_then(|emitter| emitter.emit());

    if let Err(e) = gitcl_res {
        eprintln!("error occurred while generating instructions: {e:?}");
        Emitter::default().idempotent().fail_on_error().emit()?;
    }

    // Reproducible builds pin the stamp through SOURCE_DATE_EPOCH
    let now = match env::var("SOURCE_DATE_EPOCH") {
        Ok(val) => {
            let secs = val.parse::<i64>().context("invalid SOURCE_DATE_EPOCH")?;
            chrono::Utc
                .timestamp_opt(secs, 0)
                .single()
                .context("SOURCE_DATE_EPOCH out of range")?
        }
        Err(_) => chrono::Utc::now(),
    };

    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let dvdvr_version = dvdvr_version_from_metadata()
        .or_else(|_| dvdvr_version_from_manifest())
        .unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=DVDVR_VERSION={dvdvr_version}");

    println!("cargo:rerun-if-changed=dvdvr/Cargo.toml");

    Ok(())
}

/// Looks the library up in `cargo metadata`, as a workspace member or a
/// registry dependency.
fn dvdvr_version_from_metadata() -> Result<String> {
    let output = Command::new("cargo")
        .args(["metadata", "--format-version", "1"])
        .output()?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed");
    }

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    let packages = metadata["packages"].as_array().into_iter().flatten();
    for package in packages {
        if package["name"].as_str() == Some("dvdvr") {
            if let Some(version) = package["version"].as_str() {
                return Ok(version.to_string());
            }
        }
    }

    // "dvdvr 0.1.0 (registry+...)"
    let nodes = metadata["resolve"]["nodes"].as_array();
    for node in nodes.into_iter().flatten() {
        let Some(id) = node["id"].as_str() else {
            continue;
        };
        let mut parts = id.split(' ');
        if parts.next() == Some("dvdvr") {
            if let Some(version) = parts.next() {
                return Ok(version.to_string());
            }
        }
    }

    anyhow::bail!("dvdvr package not found in metadata");
}

fn dvdvr_version_from_manifest() -> Result<String> {
    let toml_content = fs::read_to_string("dvdvr/Cargo.toml")?;

    for line in toml_content.lines().map(str::trim) {
        if !line.starts_with("version") {
            continue;
        }
        if let Some((_, value)) = line.split_once('=') {
            let version = value.trim().trim_matches('"').trim_matches('\'');
            return Ok(version.to_string());
        }
    }

    anyhow::bail!("Could not find version in dvdvr/Cargo.toml");
}
