//! Media service configuration from TOML (`[[services]]` array)

use dashagent_application::ports::connector_directory::ConnectorDescriptor;
use serde::{Deserialize, Serialize};

/// One configured media service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileServiceConfig {
    pub id: String,
    /// Service type, e.g. "radarr"
    #[serde(rename = "type")]
    pub service_type: String,
    /// Display name (defaults to the id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FileServiceConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn to_descriptor(&self) -> ConnectorDescriptor {
        ConnectorDescriptor {
            id: self.id.trim().to_string(),
            service_type: self.service_type.trim().to_lowercase(),
            name: self.display_name().to_string(),
            base_url: self.url.trim_end_matches('/').to_string(),
            enabled: self.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_entry_defaults() {
        let toml_str = r#"
[[services]]
id = "radarr-main"
type = "Radarr"
url = "http://localhost:7878/"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        let service = &config.services[0];
        assert!(service.enabled);
        assert_eq!(service.display_name(), "radarr-main");

        let descriptor = service.to_descriptor();
        assert_eq!(descriptor.service_type, "radarr");
        assert_eq!(descriptor.base_url, "http://localhost:7878");
    }

    #[test]
    fn test_service_requires_type() {
        let toml_str = r#"
[[services]]
id = "radarr-main"
"#;
        assert!(toml::from_str::<super::super::FileConfig>(toml_str).is_err());
    }
}
