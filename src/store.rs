// src/store.rs
//! Digest persistence: serialize once, write byte-identical copies to every
//! destination path.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::aggregate::Digest;

pub const DEFAULT_OUTPUT_PATHS: [&str; 2] = ["data/news.json", "public/data/news.json"];
pub const ENV_OUTPUT_PATHS: &str = "RADAR_OUTPUT_PATHS";

/// Destination list: $RADAR_OUTPUT_PATHS (comma-separated) or the defaults.
pub fn output_paths() -> Vec<PathBuf> {
    let from_env = std::env::var(ENV_OUTPUT_PATHS).ok().map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect::<Vec<_>>()
    });
    match from_env {
        Some(paths) if !paths.is_empty() => paths,
        _ => DEFAULT_OUTPUT_PATHS.iter().map(PathBuf::from).collect(),
    }
}

/// Write the digest to each path, creating parent directories. The document
/// is serialized exactly once, so all copies are byte-identical; non-ASCII
/// text is emitted literally.
pub fn write_digest(digest: &Digest, paths: &[PathBuf]) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(digest).context("serializing digest")?;
    for path in paths {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{NewsItem, SourceSummary};
    use chrono::Utc;

    fn sample_digest() -> Digest {
        Digest {
            generated_at: Utc::now(),
            sources: vec![SourceSummary {
                name: "OilCapital (нефтегаз)".to_string(),
                url: "https://oilcapital.ru/rss".to_string(),
                count: 1,
            }],
            items: vec![NewsItem {
                title: "Пожар на НПЗ".to_string(),
                link: "http://news.test/1".to_string(),
                source: "OilCapital (нефтегаз)".to_string(),
                published: None,
                summary: String::new(),
                categories: vec!["Пожарная".to_string()],
            }],
        }
    }

    #[test]
    fn all_destinations_get_identical_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = vec![
            tmp.path().join("data/news.json"),
            tmp.path().join("public/data/news.json"),
        ];
        write_digest(&sample_digest(), &paths).unwrap();

        let a = fs::read(&paths[0]).unwrap();
        let b = fs::read(&paths[1]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_ascii_is_written_literally() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("news.json");
        write_digest(&sample_digest(), &[path.clone()]).unwrap();

        let bytes = fs::read(&path).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Пожар на НПЗ"));
        assert!(!text.contains("\\u0"));
    }

    #[test]
    fn output_document_has_the_expected_shape() {
        // serde_json::Value reorders keys, so compare sets; the key set is
        // the contract, not the order.
        fn keys(value: &serde_json::Value) -> std::collections::BTreeSet<&str> {
            value.as_object().unwrap().keys().map(String::as_str).collect()
        }

        let value = serde_json::to_value(sample_digest()).unwrap();
        assert_eq!(
            keys(&value),
            ["generated_at", "sources", "items"].into_iter().collect()
        );
        assert_eq!(
            keys(&value["sources"][0]),
            ["name", "url", "count"].into_iter().collect()
        );
        assert_eq!(
            keys(&value["items"][0]),
            ["title", "link", "source", "published", "summary", "categories"]
                .into_iter()
                .collect()
        );
    }

    #[serial_test::serial]
    #[test]
    fn output_paths_come_from_env_or_defaults() {
        std::env::remove_var(ENV_OUTPUT_PATHS);
        let defaults = output_paths();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults[0], PathBuf::from("data/news.json"));

        std::env::set_var(ENV_OUTPUT_PATHS, "out/a.json, out/b.json");
        let overridden = output_paths();
        std::env::remove_var(ENV_OUTPUT_PATHS);
        assert_eq!(
            overridden,
            vec![PathBuf::from("out/a.json"), PathBuf::from("out/b.json")]
        );
    }
}
