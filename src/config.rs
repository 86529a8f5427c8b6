use serde::Deserialize;
use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
};

use crate::errors::ConfigError;

// Configuration location
const USER_CONFIG_DIR: &str = ".config/neo4j-gds-mcp";
const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_USERNAME: &str = "neo4j";
const DEFAULT_LOG_FILE: &str = "mcp_server_neo4j_gds.log";
const DEFAULT_SERVER_NAME: &str = "neo4j-gds";
const DEFAULT_MAX_CONNECTIONS: usize = 8;
const DEFAULT_FETCH_SIZE: usize = 500;

/// Environment variables consulted during resolution.
pub const ENV_URI: &str = "NEO4J_URI";
pub const ENV_USERNAME: &str = "NEO4J_USERNAME";
pub const ENV_PASSWORD: &str = "NEO4J_PASSWORD";
pub const ENV_DATABASE: &str = "NEO4J_DATABASE";

/// 可启用的服务组
pub const SERVICE_GROUPS: [&str; 5] = ["schema", "centrality", "community", "similarity", "path"];

/// Neo4j connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    /// `None` selects the server's default database
    pub database: Option<String>,
    pub max_connections: usize,
    pub fetch_size: usize,
}

/// MCP server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub log_file: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            log_file: Some(DEFAULT_LOG_FILE.to_string()),
        }
    }
}

/// Which tool groups the server exposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicesConfig {
    pub enabled: Vec<String>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            enabled: SERVICE_GROUPS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ServicesConfig {
    pub fn is_enabled(&self, group: &str) -> bool {
        self.enabled.iter().any(|g| g == group)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub neo4j: Neo4jConfig,
    pub server: ServerConfig,
    pub services: ServicesConfig,
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub db_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

/// Partial loading helper struct for the Neo4j section
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PartialNeo4jConfig {
    pub uri: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_connections: Option<usize>,
    pub fetch_size: Option<usize>,
}

/// Partial loading helper struct for the server section
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PartialServerConfig {
    pub name: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PartialServicesConfig {
    pub enabled: Option<Vec<String>>,
}

/// Shape of `config.toml`; every section is optional.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PartialAppConfig {
    pub neo4j: Option<PartialNeo4jConfig>,
    pub server: Option<PartialServerConfig>,
    pub services: Option<PartialServicesConfig>,
}

impl AppConfig {
    /// Load configuration from file, environment and command line overrides.
    pub fn load(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let file_config = Self::read_config_file(config_path)?;
        let env_map = collect_env(&[ENV_URI, ENV_USERNAME, ENV_PASSWORD, ENV_DATABASE]);
        Self::resolve(file_config, &env_map, overrides)
    }

    /// `~/.config/neo4j-gds-mcp/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(USER_CONFIG_DIR).join(CONFIG_FILE_NAME))
    }

    /// An explicit path must exist; the default path is optional.
    fn read_config_file(config_path: Option<&Path>) -> Result<Option<PartialAppConfig>, ConfigError> {
        let (path, required) = match config_path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_config_path() {
                Some(path) => (path, false),
                None => return Ok(None),
            },
        };

        if !required && !path.exists() {
            log::debug!("未找到配置文件 {:?}，使用环境变量和默认值", path);
            return Ok(None);
        }

        log::info!("正在读取配置文件: {:?}", path);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::FileRead(path.to_string_lossy().to_string(), e))?;
        Self::parse_toml(&content, &path.to_string_lossy()).map(Some)
    }

    pub fn parse_toml(content: &str, source_name: &str) -> Result<PartialAppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParse(source_name.to_string(), e))
    }

    /// Merge every source, giving priority to CLI, then environment, then file.
    pub fn resolve(
        file_config: Option<PartialAppConfig>,
        env_map: &HashMap<String, String>,
        overrides: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let file_config = file_config.unwrap_or_default();
        let file_neo4j = file_config.neo4j.unwrap_or_default();
        let file_server = file_config.server.unwrap_or_default();
        let file_services = file_config.services.unwrap_or_default();

        let pick = |cli: &Option<String>, env_key: &str, file: Option<String>| -> Option<String> {
            cli.clone()
                .or_else(|| env_map.get(env_key).cloned())
                .or(file)
                .filter(|value| !value.is_empty())
        };

        let uri = pick(&overrides.db_url, ENV_URI, file_neo4j.uri)
            .ok_or_else(|| ConfigError::FieldMissing(format!("neo4j.uri (and {ENV_URI} not set)")))?;
        let username = pick(&overrides.username, ENV_USERNAME, file_neo4j.username)
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let password = pick(&overrides.password, ENV_PASSWORD, file_neo4j.password).ok_or_else(|| {
            ConfigError::FieldMissing(format!("neo4j.password (and {ENV_PASSWORD} not set)"))
        })?;
        let database = pick(&overrides.database, ENV_DATABASE, file_neo4j.database);

        let enabled = match file_services.enabled {
            Some(groups) => {
                if let Some(unknown) = groups.iter().find(|g| !SERVICE_GROUPS.contains(&g.as_str())) {
                    return Err(ConfigError::UnknownService(unknown.clone()));
                }
                groups
            }
            None => ServicesConfig::default().enabled,
        };

        let default_server = ServerConfig::default();
        let log_file = match file_server.log_file {
            Some(path) if path.is_empty() => None,
            Some(path) => Some(path),
            None => default_server.log_file,
        };

        Ok(Self {
            neo4j: Neo4jConfig {
                uri,
                username,
                password,
                database,
                max_connections: file_neo4j.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
                fetch_size: file_neo4j.fetch_size.unwrap_or(DEFAULT_FETCH_SIZE),
            },
            server: ServerConfig {
                name: file_server.name.unwrap_or(default_server.name),
                version: default_server.version,
                log_file,
            },
            services: ServicesConfig { enabled },
        })
    }
}

/// Load a `.env` file into the process environment. A missing file is not an error.
pub fn load_dotenv(path: Option<&Path>) -> Result<bool, ConfigError> {
    let result = match path {
        Some(path) => dotenvy::from_path(path).map(|_| true),
        None => dotenvy::dotenv().map(|_| true),
    };
    result.or_else(|err| match err {
        dotenvy::Error::Io(_) => Ok(false),
        other => Err(ConfigError::DotEnv(other.to_string())),
    })
}

fn collect_env(keys: &[&str]) -> HashMap<String, String> {
    keys.iter()
        .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect()
}
