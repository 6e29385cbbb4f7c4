//! Settings types shared between the core and the server binary.
//!
//! Deployment configuration supplies the subscriber base path, the name
//! of the template node and (optionally) extra reserved property
//! prefixes. Everything is optional in the serialized form; accessors
//! fill in the defaults.

use serde::{Deserialize, Serialize};

use crate::clone::ReservedPrefixes;
use crate::path::{NodePath, PathError};
use crate::subscriber::SubscriberManager;

/// Top-level settings for the server binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub subscribers: SubscriberSettings,
}

impl Settings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    /// Address the HTTP server binds to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_addr: Option<String>,
}

impl ServerSettings {
    /// The bind address, defaulting to `0.0.0.0:3000`.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or("0.0.0.0:3000")
    }
}

/// Subscriber subsystem settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberSettings {
    /// Base path all subscriber nodes live under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// Name of the template node under the base path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,

    /// Reserved property prefixes excluded from cloning. When absent the
    /// built-in defaults apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reserved_prefixes: Option<Vec<String>>,
}

impl SubscriberSettings {
    /// Default base path for subscriber nodes.
    pub const DEFAULT_BASE_PATH: &'static str = "/server/activation/subscribers";

    /// Default template node name.
    pub const DEFAULT_TEMPLATE_NAME: &'static str = "default";

    /// The configured base path, or the default.
    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or(Self::DEFAULT_BASE_PATH)
    }

    /// The configured template name, or the default.
    pub fn template_name(&self) -> &str {
        self.template_name
            .as_deref()
            .unwrap_or(Self::DEFAULT_TEMPLATE_NAME)
    }

    /// Build a [`SubscriberManager`] from these settings.
    ///
    /// Fails when the configured base path is not a valid absolute path.
    pub fn manager(&self) -> Result<SubscriberManager, PathError> {
        let base = NodePath::new(self.base_path())?;
        let mut manager = SubscriberManager::new(base, self.template_name());
        if let Some(prefixes) = &self.reserved_prefixes {
            manager = manager.with_reserved(ReservedPrefixes::new(prefixes.clone()));
        }
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:3000");
        assert_eq!(
            settings.subscribers.base_path(),
            "/server/activation/subscribers"
        );
        assert_eq!(settings.subscribers.template_name(), "default");

        let manager = settings.subscribers.manager().unwrap();
        assert_eq!(
            manager.template_path().as_str(),
            "/server/activation/subscribers/default"
        );
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "server": { "bindAddr": "127.0.0.1:8080" },
            "subscribers": {
                "basePath": "/server/publishing/receivers",
                "templateName": "blueprint",
                "reservedPrefixes": ["jcr:", "mgnl:", "rep:"]
            }
        }"#;

        let settings = Settings::from_json(json).unwrap();
        assert_eq!(settings.server.bind_addr(), "127.0.0.1:8080");
        assert_eq!(settings.subscribers.base_path(), "/server/publishing/receivers");

        let manager = settings.subscribers.manager().unwrap();
        assert_eq!(
            manager.template_path().as_str(),
            "/server/publishing/receivers/blueprint"
        );
    }

    #[test]
    fn test_invalid_base_path() {
        let settings = SubscriberSettings {
            base_path: Some("not-absolute".to_string()),
            ..Default::default()
        };
        assert!(settings.manager().is_err());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings = Settings::from_json(r#"{ "subscribers": {} }"#).unwrap();
        assert_eq!(settings.subscribers.template_name(), "default");
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:3000");
    }
}
