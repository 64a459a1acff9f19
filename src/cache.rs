use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fieldgate_core::SchemaConfig;
use serde::{Deserialize, Serialize};

const DEFAULT_CACHE_PATH: &str = "bootstrap/cache/graphql.json";

#[derive(Serialize, Deserialize)]
struct CacheFile {
    #[serde(rename = "graphql:cache")]
    schema: SchemaConfig,
}

pub fn cached_file_path() -> PathBuf {
    std::env::var_os("APP_GRAPHQL_CACHE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH))
}

/// Compile `config` and write it to the cache file.
///
/// The written file is read back, a cache that does not reproduce the
/// configuration is removed again.
pub fn cache(config: &SchemaConfig, path: &Path) -> Result<()> {
    clear(path)?;
    config
        .build()
        .context("Failed to compile the schema config.")?;

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory '{}'.", dir.display()))?;
    }

    let data = serde_json::to_string_pretty(&CacheFile {
        schema: config.clone(),
    })
    .context("Failed to serialize the schema config.")?;
    fs::write(path, data)
        .with_context(|| format!("Failed to write cache file '{}'.", path.display()))?;

    match load(path) {
        Ok(Some(cached)) if &cached == config => Ok(()),
        res => {
            if let Err(err) = res {
                tracing::debug!(error = %err, "Failed to reload the cache file.");
            }
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove cache file '{}'.", path.display()))?;
            anyhow::bail!("Your configuration files are not serializable.")
        }
    }
}

/// Remove the cache file, returns `false` if there was none.
pub fn clear(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)
        .with_context(|| format!("Failed to remove cache file '{}'.", path.display()))?;
    Ok(true)
}

pub fn load(path: &Path) -> Result<Option<SchemaConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to load cache file '{}'.", path.display()))?;
    let cache_file = serde_json::from_str::<CacheFile>(&data)
        .with_context(|| format!("Failed to parse cache file '{}'.", path.display()))?;
    Ok(Some(cache_file.schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
        [input_types.PostInput.fields]
        title = { type = "String!", rules = "required|min:3" }
        tags = { type = "[String!]", rules = ["array", "max:5"] }

        [mutation.createPost]
        type = "Boolean"
        args.input = { type = "PostInput!" }
        messages = { "input.title.required" = "A title is needed." }
    "#;

    #[test]
    fn cache_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootstrap/cache/graphql.json");
        let config: SchemaConfig = toml::from_str(SCHEMA).unwrap();

        cache(&config, &path).unwrap();
        let data: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(data.get("graphql:cache").is_some());
        assert_eq!(load(&path).unwrap(), Some(config));

        assert!(clear(&path).unwrap());
        assert!(!clear(&path).unwrap());
        assert_eq!(load(&path).unwrap(), None);
    }

    #[test]
    fn invalid_config_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphql.json");
        fs::write(&path, "{}").unwrap();

        let config: SchemaConfig =
            toml::from_str(&SCHEMA.replace("required|min:3", "required|shiny")).unwrap();
        assert!(cache(&config, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_cache_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graphql.json");
        fs::write(&path, r#"{ "graphql:cache": 1 }"#).unwrap();
        assert!(load(&path).is_err());
    }
}
