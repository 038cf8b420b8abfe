use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Resolved runtime settings: the engine binary the listing and destructive
/// commands shell out to, and the helper image used by the export template.
#[derive(Debug, Clone)]
pub struct Settings {
    pub docker_bin: String,
    pub export_image: String,
    pub source: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docker_bin: "docker".to_string(),
            export_image: "busybox".to_string(),
            source: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct DockyardConfigFile {
    #[serde(default, alias = "docker-bin", alias = "bin")]
    docker_bin: Option<String>,
    #[serde(default, alias = "export-image")]
    export_image: Option<String>,
}

impl Settings {
    /// Loads the optional config file, with a command-line binary override
    /// winning over the file value.
    pub fn load(bin_override: Option<String>) -> Result<Self> {
        let Some(path) = discover_config_path() else {
            return Ok(Self::from_parts(
                DockyardConfigFile::default(),
                bin_override,
                None,
            ));
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let parsed: DockyardConfigFile = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        Ok(Self::from_parts(
            parsed,
            bin_override,
            Some(path.display().to_string()),
        ))
    }

    fn from_parts(
        parsed: DockyardConfigFile,
        bin_override: Option<String>,
        source: Option<String>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            docker_bin: bin_override
                .or(parsed.docker_bin)
                .unwrap_or(defaults.docker_bin),
            export_image: parsed.export_image.unwrap_or(defaults.export_image),
            source,
        }
    }
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DOCKYARD_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("dockyard.yaml"),
        PathBuf::from("dockyard.yml"),
        PathBuf::from(".dockyard.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/dockyard/config.yaml"),
            PathBuf::from(&home).join(".config/dockyard/config.yml"),
            PathBuf::from(&home).join(".dockyard.yaml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::{DockyardConfigFile, Settings};

    #[test]
    fn defaults_apply_without_a_config_file() {
        let settings = Settings::from_parts(DockyardConfigFile::default(), None, None);
        assert_eq!(settings.docker_bin, "docker");
        assert_eq!(settings.export_image, "busybox");
        assert!(settings.source.is_none());
    }

    #[test]
    fn config_file_values_parse() {
        let parsed: DockyardConfigFile =
            serde_yaml::from_str("docker_bin: podman\nexport-image: alpine\n")
                .expect("valid yaml");
        let settings = Settings::from_parts(parsed, None, Some("dockyard.yaml".to_string()));
        assert_eq!(settings.docker_bin, "podman");
        assert_eq!(settings.export_image, "alpine");
        assert_eq!(settings.source.as_deref(), Some("dockyard.yaml"));
    }

    #[test]
    fn cli_override_wins_over_config_file() {
        let parsed: DockyardConfigFile =
            serde_yaml::from_str("docker_bin: podman\n").expect("valid yaml");
        let settings = Settings::from_parts(parsed, Some("nerdctl".to_string()), None);
        assert_eq!(settings.docker_bin, "nerdctl");
    }
}
