use std::{collections::BTreeSet, time::Duration};

use url::Url;

use crate::{
    error::ConfigError,
    fetcher::FetchOptions,
    policy::DEFAULT_STUB_MARKERS,
};

use super::loader::{CaptureConfig, CaptureProfileConfig, LoadedConfig};

#[derive(Debug, Clone)]
pub struct ScopeConfig {
    pub target: Url,
    pub target_hostname: String,
    pub local_only: bool,
    pub allowed_hosts: BTreeSet<String>,
    pub base_url: Option<Url>,
    pub rewrite_origins: Vec<String>,
    pub stub_markers: Vec<String>,
}

impl ScopeConfig {
    pub fn for_target(target: &str) -> Result<Self, ConfigError> {
        let target = parse_target(target)?;
        let target_hostname = host_of(&target)?;
        Ok(Self {
            target,
            target_hostname,
            local_only: false,
            allowed_hosts: BTreeSet::new(),
            base_url: None,
            rewrite_origins: Vec::new(),
            stub_markers: DEFAULT_STUB_MARKERS.iter().map(|m| m.to_string()).collect(),
        })
    }

    pub fn is_allowed_host(&self, host: &str) -> bool {
        host.eq_ignore_ascii_case(&self.target_hostname)
            || self
                .allowed_hosts
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(host))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScopeOverrides {
    pub local_only: bool,
    pub base_url: Option<String>,
    pub allowed_hosts: Vec<String>,
    pub rewrite_origins: Vec<String>,
    pub stub_markers: Vec<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub navigation_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub scope: ScopeConfig,
    pub fetch: FetchOptions,
    pub navigation_timeout: Option<Duration>,
    pub profile_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScopeBuilder {
    target: String,
    config: Option<LoadedConfig>,
    requested_profile: Option<String>,
    overrides: ScopeOverrides,
}

impl ScopeBuilder {
    pub fn new(
        target: impl Into<String>,
        config: Option<LoadedConfig>,
        requested_profile: Option<String>,
        overrides: ScopeOverrides,
    ) -> Self {
        Self {
            target: target.into(),
            config,
            requested_profile,
            overrides,
        }
    }

    pub fn build(&self) -> Result<CaptureSettings, ConfigError> {
        let root = self
            .config
            .as_ref()
            .map(|loaded| &loaded.config)
            .cloned()
            .unwrap_or_default();
        let profile = resolve_profile(&root, self.requested_profile.as_deref())?;
        let profile_config = profile.as_ref().map(|p| p.config);

        let target = parse_target(&self.target)?;
        let target_hostname = host_of(&target)?;

        let local_only = self.overrides.local_only
            || profile_config.and_then(|p| p.local_only).unwrap_or(false);

        let base_url = self
            .overrides
            .base_url
            .clone()
            .or_else(|| profile_config.and_then(|p| p.base_url.clone()))
            .map(|raw| {
                Url::parse(&raw).map_err(|source| ConfigError::InvalidBaseUrl { url: raw, source })
            })
            .transpose()?;

        let allowed_hosts = merge_lists(
            &root.allowed_hosts,
            profile_config.map(|p| p.allowed_hosts.as_slice()),
            &self.overrides.allowed_hosts,
        )
        .into_iter()
        .map(|host| host.to_ascii_lowercase())
        .collect();

        let rewrite_origins = merge_lists(
            &root.rewrite_origins,
            profile_config.map(|p| p.rewrite_origins.as_slice()),
            &self.overrides.rewrite_origins,
        )
        .iter()
        .map(|origin| normalize_origin(origin))
        .collect::<Result<Vec<_>, _>>()?;

        let mut stub_markers = merge_lists(
            &root.stub_markers,
            profile_config.map(|p| p.stub_markers.as_slice()),
            &self.overrides.stub_markers,
        );
        if stub_markers.is_empty() {
            stub_markers = DEFAULT_STUB_MARKERS.iter().map(|m| m.to_string()).collect();
        }

        let mut fetch = FetchOptions::default();
        if let Some(agent) = &root.user_agent {
            fetch.user_agent = agent.clone();
        }
        if let Some(secs) = self.overrides.fetch_timeout_secs.or(root.fetch_timeout_secs) {
            fetch.timeout = Duration::from_secs(secs);
        }

        let navigation_timeout = self
            .overrides
            .navigation_timeout_secs
            .or(root.navigation_timeout_secs)
            .map(Duration::from_secs);

        Ok(CaptureSettings {
            scope: ScopeConfig {
                target,
                target_hostname,
                local_only,
                allowed_hosts,
                base_url,
                rewrite_origins,
                stub_markers,
            },
            fetch,
            navigation_timeout,
            profile_name: profile.map(|p| p.name),
        })
    }
}

struct ResolvedProfile<'a> {
    name: String,
    config: &'a CaptureProfileConfig,
}

fn resolve_profile<'a>(
    config: &'a CaptureConfig,
    requested: Option<&str>,
) -> Result<Option<ResolvedProfile<'a>>, ConfigError> {
    let Some(name) = requested.or(config.default_profile.as_deref()) else {
        return Ok(None);
    };
    match config.profiles.get(name) {
        Some(profile) => Ok(Some(ResolvedProfile {
            name: name.to_string(),
            config: profile,
        })),
        None => Err(ConfigError::UnknownProfile(name.to_string())),
    }
}

fn parse_target(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidTarget {
        url: raw.to_string(),
        source,
    })
}

fn host_of(url: &Url) -> Result<String, ConfigError> {
    url.host_str()
        .map(|h| h.to_ascii_lowercase())
        .ok_or_else(|| ConfigError::MissingHost(url.to_string()))
}

pub fn normalize_origin(raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw).map_err(|_| ConfigError::InvalidOrigin(raw.to_string()))?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(ConfigError::InvalidOrigin(raw.to_string()));
    }
    Ok(origin.ascii_serialization())
}

fn merge_lists(root: &[String], profile: Option<&[String]>, cli: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    root.iter()
        .chain(profile.unwrap_or_default())
        .chain(cli)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .filter(|value| seen.insert(value.to_string()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn loaded(json: &str) -> Result<LoadedConfig> {
        let temp = tempdir()?;
        let path = temp.path().join("pagecapture.json");
        std::fs::write(&path, json)?;
        Ok(load_config(&path)?.expect("config should load"))
    }

    #[test]
    fn defaults_without_config() -> Result<()> {
        let settings = ScopeBuilder::new(
            "https://Site.Test/page",
            None,
            None,
            ScopeOverrides::default(),
        )
        .build()?;

        assert_eq!(settings.scope.target_hostname, "site.test");
        assert!(!settings.scope.local_only);
        assert!(settings.scope.base_url.is_none());
        assert_eq!(settings.scope.stub_markers, vec!["sitelock.js".to_string()]);
        assert_eq!(settings.navigation_timeout, None);
        assert!(settings.profile_name.is_none());
        Ok(())
    }

    #[test]
    fn cli_overrides_win_and_lists_merge() -> Result<()> {
        let config = loaded(
            r#"{
  "defaultProfile": "game",
  "allowedHosts": ["fonts.test"],
  "rewriteOrigins": ["https://cdn.test/static"],
  "fetchTimeoutSecs": 10,
  "navigationTimeoutSecs": 60,
  "profiles": {
    "game": {
      "localOnly": true,
      "baseURL": "https://profile.test",
      "allowedHosts": ["assets.test", "fonts.test"]
    }
  }
}"#,
        )?;

        let settings = ScopeBuilder::new(
            "https://site.test/",
            Some(config),
            None,
            ScopeOverrides {
                base_url: Some("https://cli.test/".to_string()),
                allowed_hosts: vec!["CLI.test".to_string()],
                fetch_timeout_secs: Some(3),
                ..ScopeOverrides::default()
            },
        )
        .build()?;

        assert_eq!(settings.profile_name.as_deref(), Some("game"));
        assert!(settings.scope.local_only);
        assert_eq!(
            settings.scope.base_url.as_ref().map(Url::as_str),
            Some("https://cli.test/")
        );
        assert_eq!(
            settings.scope.allowed_hosts.iter().cloned().collect::<Vec<_>>(),
            vec!["assets.test", "cli.test", "fonts.test"]
        );
        assert_eq!(settings.scope.rewrite_origins, vec!["https://cdn.test"]);
        assert_eq!(settings.fetch.timeout, Duration::from_secs(3));
        assert_eq!(settings.navigation_timeout, Some(Duration::from_secs(60)));
        Ok(())
    }

    #[test]
    fn unknown_profile_is_rejected() -> Result<()> {
        let config = loaded(r#"{"profiles":{"a":{}}}"#)?;
        let err = ScopeBuilder::new(
            "https://site.test/",
            Some(config),
            Some("missing".to_string()),
            ScopeOverrides::default(),
        )
        .build()
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile(name) if name == "missing"));
        Ok(())
    }

    #[test]
    fn invalid_target_and_base_url_are_config_errors() {
        let err = ScopeBuilder::new("not a url", None, None, ScopeOverrides::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTarget { .. }));

        let err = ScopeBuilder::new(
            "https://site.test/",
            None,
            None,
            ScopeOverrides {
                base_url: Some("::nope".to_string()),
                ..ScopeOverrides::default()
            },
        )
        .build()
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn normalize_origin_drops_path_and_default_port() -> Result<()> {
        assert_eq!(normalize_origin("https://cdn.example.com/a/b")?, "https://cdn.example.com");
        assert_eq!(normalize_origin("https://cdn.example.com:443")?, "https://cdn.example.com");
        assert_eq!(normalize_origin("http://127.0.0.1:8080/")?, "http://127.0.0.1:8080");
        assert!(normalize_origin("data:text/plain,hi").is_err());
        Ok(())
    }

    #[test]
    fn host_comparison_is_case_insensitive_and_exact() -> Result<()> {
        let mut scope = ScopeConfig::for_target("https://site.test/")?;
        scope.allowed_hosts.insert("cdn.test".to_string());

        assert!(scope.is_allowed_host("SITE.test"));
        assert!(scope.is_allowed_host("CDN.TEST"));
        assert!(!scope.is_allowed_host("sub.site.test"));
        assert!(!scope.is_allowed_host("test"));
        Ok(())
    }
}
