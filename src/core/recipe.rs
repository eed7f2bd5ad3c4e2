//! Build recipe loading.
//!
//! A recipe checkout declares one or more packages. Rather than sourcing
//! the recipe script directly, the checkout is rendered to its `.SRCINFO`
//! form via `makepkg --printsrcinfo` and that output is parsed: `key =
//! value` lines, a `pkgbase` section followed by one or more `pkgname`
//! sections, every field an ordered sequence of values.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::depend::{parse_constraint, parse_optdep};
use crate::core::PackageRecord;
use crate::repo::RawEntry;
use crate::util::process::ProcessBuilder;

/// Load the package records a recipe checkout declares.
pub fn load(dir: &Path) -> Result<Vec<PackageRecord>> {
    let output = ProcessBuilder::new("makepkg")
        .arg("--printsrcinfo")
        .cwd(dir)
        .exec_and_check()
        .with_context(|| format!("failed to render recipe in {}", dir.display()))?;

    let text = String::from_utf8_lossy(&output.stdout);
    parse_srcinfo(&text)
}

/// Parse rendered recipe text into one record per declared package.
///
/// Each package overlays its own section on the `pkgbase` section, so a
/// package-specific field wins over the shared one.
pub fn parse_srcinfo(text: &str) -> Result<Vec<PackageRecord>> {
    enum Section {
        Base,
        Package(usize),
    }

    let mut base: Option<(String, RawEntry)> = None;
    let mut packages: Vec<(String, RawEntry)> = Vec::new();
    let mut current: Option<Section> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "pkgbase" => {
                base = Some((value.to_string(), RawEntry::default()));
                current = Some(Section::Base);
            }
            "pkgname" => {
                packages.push((value.to_string(), RawEntry::default()));
                current = Some(Section::Package(packages.len() - 1));
            }
            _ => match current {
                Some(Section::Base) => {
                    if let Some((_, fields)) = base.as_mut() {
                        fields.push_value(key, value);
                    }
                }
                Some(Section::Package(idx)) => packages[idx].1.push_value(key, value),
                None => continue,
            },
        }
    }

    let Some((base_name, base_fields)) = base else {
        bail!("recipe declares no pkgbase");
    };
    if packages.is_empty() {
        bail!("recipe `{}` declares no pkgname", base_name);
    }

    let mut records = Vec::new();
    for (name, fields) in &packages {
        let merged = base_fields.overlay(fields);

        let pkgver = merged
            .first("pkgver")
            .with_context(|| format!("recipe `{}` is missing pkgver", base_name))?;
        let version = match merged.first("pkgrel") {
            Some(pkgrel) => format!("{}-{}", pkgver, pkgrel),
            None => pkgver.to_string(),
        };

        records.push(PackageRecord {
            name: name.clone(),
            base: base_name.clone(),
            version,
            desc: merged.first("pkgdesc").unwrap_or_default().to_string(),
            url: merged.first("url").map(str::to_string),
            arch: merged.first("arch").map(str::to_string),
            licenses: merged.get("license").to_vec(),
            depends: merged
                .get("depends")
                .iter()
                .map(|s| parse_constraint(s))
                .collect(),
            makedepends: merged
                .get("makedepends")
                .iter()
                .map(|s| parse_constraint(s))
                .collect(),
            optdepends: merged
                .get("optdepends")
                .iter()
                .map(|s| parse_optdep(s))
                .collect(),
            provides: merged.get("provides").to_vec(),
            conflicts: merged.get("conflicts").to_vec(),
            replaces: merged.get("replaces").to_vec(),
            ..Default::default()
        });
    }

    Ok(records)
}
