use std::env;

/// Identity of the running service, written into every envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// `nlp_service_info.service_app_name`
    pub app_name: String,
    /// `report_language` and `service_language`
    pub language: String,
    /// `nlp_service_info.service_version`
    pub service_version: String,
    /// `record_metadata.nlp_processing_pipeline_version`
    pub pipeline_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            app_name: "NLP Classifier".to_string(),
            language: "es".to_string(),
            service_version: "1.0".to_string(),
            pipeline_version: "1.0".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by `CDM_SERVICE_NAME`, `CDM_SERVICE_LANGUAGE`,
    /// `CDM_SERVICE_VERSION` and `CDM_PIPELINE_VERSION`. Empty values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str, default: String| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(default)
        };

        Self {
            app_name: read("CDM_SERVICE_NAME", defaults.app_name),
            language: read("CDM_SERVICE_LANGUAGE", defaults.language),
            service_version: read("CDM_SERVICE_VERSION", defaults.service_version),
            pipeline_version: read("CDM_PIPELINE_VERSION", defaults.pipeline_version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_identity() {
        let config = ServiceConfig::default();
        assert_eq!(config.app_name, "NLP Classifier");
        assert_eq!(config.language, "es");
        assert_eq!(config.service_version, "1.0");
        assert_eq!(config.pipeline_version, "1.0");
    }

    #[test]
    fn test_lookup_overrides() {
        let config = ServiceConfig::from_lookup(|key| match key {
            "CDM_SERVICE_LANGUAGE" => Some("ca".to_string()),
            "CDM_PIPELINE_VERSION" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.language, "ca");
        assert_eq!(config.pipeline_version, "1.0");
        assert_eq!(config.app_name, "NLP Classifier");
    }
}
