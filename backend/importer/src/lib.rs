//! # Name Import
//!
//! Bulk loads a JSON name list through the admin import endpoint.
//!
//! ## Input
//! - Either a bare array of names or an object `{ "names": [...] }`
//! - Each entry needs `name`, `meaning`, `gender` and `origin`; the server derives everything else
//!
//! ## Flow
//! 1. Split the list into batches of `--batch-size`
//! 2. `POST /api/names/import` per batch with the admin principal headers
//! 3. Count imported entries, print per-entry failures reported with `207 Multi-Status`
use std::{fs::read_to_string, path::Path};

use anyhow::{Context, bail};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

pub const IMPORT_PATH: &str = "/api/names/import";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const ROLE_HEADER: &str = "x-user-role";

#[derive(Deserialize)]
#[serde(untagged)]
enum NameFile {
    Bare(Vec<Value>),
    Wrapped { names: Vec<Value> },
}

pub fn read_names(path: &Path) -> anyhow::Result<Vec<Value>> {
    let text = read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file: NameFile = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    Ok(match file {
        NameFile::Bare(names) | NameFile::Wrapped { names } => names,
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub imported: u64,
    pub failed: u64,
}

/// `imported` from either a complete (`data.imported`) or partial (`data.success.imported`) report.
fn imported(body: &Value) -> u64 {
    let data = &body["data"];

    data["imported"]
        .as_u64()
        .or_else(|| data["success"]["imported"].as_u64())
        .unwrap_or_default()
}

fn failures(body: &Value) -> Vec<String> {
    body["data"]["error"]["details"]
        .as_array()
        .map(|details| {
            details
                .iter()
                .map(|detail| format!("{}: {}", detail["name"], detail["error"]))
                .collect()
        })
        .unwrap_or_default()
}

pub async fn import_names(
    base_url: &str,
    user_id: &str,
    names: &[Value],
    batch_size: usize,
) -> anyhow::Result<Summary> {
    let client = Client::new();
    let url = format!("{}{IMPORT_PATH}", base_url.trim_end_matches('/'));

    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut summary = Summary::default();

    for batch in names.chunks(batch_size.max(1)) {
        pb.set_message(format!("Importing {} names", batch.len()));

        let response = client
            .post(&url)
            .header(USER_ID_HEADER, user_id)
            .header(ROLE_HEADER, "admin")
            .json(&json!({ "names": batch }))
            .send()
            .await
            .with_context(|| format!("posting to {url}"))?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        match status {
            StatusCode::CREATED | StatusCode::MULTI_STATUS => {
                let count = imported(&body);
                summary.imported += count;
                summary.failed += batch.len() as u64 - count.min(batch.len() as u64);

                for failure in failures(&body) {
                    pb.println(format!("Skipped {failure}"));
                }
            }
            status => bail!("import rejected ({status}): {}", body["message"]),
        }

        pb.inc(batch.len() as u64);
    }

    pb.finish_with_message("Done");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_parsing() {
        let complete = json!({ "data": { "imported": 3, "total": 3 } });
        assert_eq!(imported(&complete), 3);
        assert!(failures(&complete).is_empty());

        let partial = json!({
            "data": {
                "success": { "imported": 1, "total": 2 },
                "error": { "details": [{ "index": 1, "name": "Ava", "error": "Duplicate name" }] }
            }
        });
        assert_eq!(imported(&partial), 1);
        assert_eq!(failures(&partial), ["\"Ava\": \"Duplicate name\""]);
    }

    #[test]
    fn test_name_file_shapes() {
        let bare: NameFile = serde_json::from_str(r#"[{"name": "Ava"}]"#).unwrap();
        assert!(matches!(bare, NameFile::Bare(names) if names.len() == 1));

        let wrapped: NameFile = serde_json::from_str(r#"{"names": [{"name": "Ava"}, {"name": "Max"}]}"#).unwrap();
        assert!(matches!(wrapped, NameFile::Wrapped { names } if names.len() == 2));
    }
}
