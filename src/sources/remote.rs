//! Remote community index queried over an AUR-compatible RPC endpoint.

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use crate::core::depend::{parse_constraint, parse_optdep};
use crate::core::PackageRecord;

/// A remote package index queried by exact name.
pub trait RemoteIndex {
    /// Info lookup for `name`. Yields a record only when the index knows
    /// exactly one package by that name.
    fn info(&self, name: &str) -> Result<Option<PackageRecord>>;
}

/// Client for an AUR-compatible RPC endpoint.
pub struct RpcClient {
    endpoint: Url,
    client: reqwest::blocking::Client,
}

impl RpcClient {
    pub fn new(endpoint: Url) -> Self {
        RpcClient {
            endpoint,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn rpc_url(&self) -> String {
        format!("{}/rpc/", self.endpoint.as_str().trim_end_matches('/'))
    }
}

impl RemoteIndex for RpcClient {
    fn info(&self, name: &str) -> Result<Option<PackageRecord>> {
        tracing::debug!("looking up {} on the remote index", name);

        let response = self
            .client
            .get(self.rpc_url())
            .query(&[("v", "5"), ("type", "info"), ("arg[]", name)])
            .send()
            .with_context(|| format!("remote index query for `{}` failed", name))?;

        let body: RpcResponse = response
            .json()
            .with_context(|| format!("malformed remote index response for `{}`", name))?;

        Ok(single_result(body))
    }
}

/// Take the lone result of an info response, if there is exactly one.
///
/// Zero or multiple results is "no match", not an error.
fn single_result(body: RpcResponse) -> Option<PackageRecord> {
    if body.resultcount != 1 {
        return None;
    }
    body.results.into_iter().next().map(RpcPackageInfo::into_record)
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    resultcount: u32,

    #[serde(default)]
    results: Vec<RpcPackageInfo>,
}

/// Package-info object of the RPC response. List fields may be absent or
/// null, both meaning empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RpcPackageInfo {
    name: String,
    package_base: String,
    version: String,

    #[serde(default)]
    description: Option<String>,

    #[serde(rename = "URL", default)]
    url: Option<String>,

    #[serde(default)]
    license: Option<Vec<String>>,

    #[serde(default)]
    depends: Option<Vec<String>>,

    #[serde(default)]
    make_depends: Option<Vec<String>>,

    #[serde(default)]
    opt_depends: Option<Vec<String>>,

    #[serde(default)]
    conflicts: Option<Vec<String>>,

    #[serde(default)]
    provides: Option<Vec<String>>,

    #[serde(default)]
    replaces: Option<Vec<String>>,
}

impl RpcPackageInfo {
    /// The remote index reports no binary artifact, so size, checksum and
    /// build metadata stay absent.
    fn into_record(self) -> PackageRecord {
        PackageRecord {
            name: self.name,
            base: self.package_base,
            version: self.version,
            desc: self.description.unwrap_or_default(),
            url: self.url,
            licenses: self.license.unwrap_or_default(),
            depends: self
                .depends
                .unwrap_or_default()
                .iter()
                .map(|s| parse_constraint(s))
                .collect(),
            makedepends: self
                .make_depends
                .unwrap_or_default()
                .iter()
                .map(|s| parse_constraint(s))
                .collect(),
            optdepends: self
                .opt_depends
                .unwrap_or_default()
                .iter()
                .map(|s| parse_optdep(s))
                .collect(),
            conflicts: self.conflicts.unwrap_or_default(),
            provides: self.provides.unwrap_or_default(),
            replaces: self.replaces.unwrap_or_default(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> RpcResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_result_maps_fields() {
        let body = response(json!({
            "resultcount": 1,
            "results": [{
                "Name": "yay",
                "PackageBase": "yay",
                "Version": "12.0.0-1",
                "Description": "AUR helper",
                "URL": "https://github.com/Jguer/yay",
                "License": ["GPL-3.0"],
                "Depends": ["pacman>=6.0"],
                "MakeDepends": ["go"],
                "OptDepends": ["sudo: privilege elevation"],
                "Keywords": ["aur", "helper"]
            }]
        }));

        let record = single_result(body).unwrap();
        assert_eq!(record.name, "yay");
        assert_eq!(record.base, "yay");
        assert_eq!(record.version, "12.0.0-1");
        assert_eq!(record.desc, "AUR helper");
        assert_eq!(record.depends[0].name, "pacman");
        assert_eq!(record.makedepends[0].name, "go");
        assert_eq!(record.optdepends[0].name, "sudo");
        assert!(record.filename.is_none());
        assert!(record.csize.is_none());
    }

    #[test]
    fn test_zero_results_is_no_match() {
        let body = response(json!({ "resultcount": 0, "results": [] }));
        assert!(single_result(body).is_none());
    }

    #[test]
    fn test_multiple_results_is_no_match() {
        let body = response(json!({
            "resultcount": 2,
            "results": [
                { "Name": "a", "PackageBase": "a", "Version": "1-1" },
                { "Name": "b", "PackageBase": "b", "Version": "1-1" }
            ]
        }));
        assert!(single_result(body).is_none());
    }

    #[test]
    fn test_null_list_fields_decode_as_empty() {
        let body = response(json!({
            "resultcount": 1,
            "results": [{
                "Name": "tool",
                "PackageBase": "tool",
                "Version": "1-1",
                "Description": null,
                "License": null,
                "Depends": null
            }]
        }));

        let record = single_result(body).unwrap();
        assert_eq!(record.desc, "");
        assert!(record.licenses.is_empty());
        assert!(record.depends.is_empty());
    }
}
