use std::{fs, path::Path};

use kirana_types::StorefrontConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable consulted when `gateway.merchant_key` is not set in
/// the manifest.
const MERCHANT_KEY_ENV: &str = "PAYU_MERCHANT_KEY";

/// Kirana manifest file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Optional store name, shown in the startup banner
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Local server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Product catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Payment gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Public URLs used for gateway redirects
    #[serde(default)]
    pub urls: UrlsConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum LoadManifestError {
    #[error("{} not found at {}. Please create a {} file in your project root.",
        kirana_types::MANIFEST_FILE_NAME,
        .0.display(),
        kirana_types::MANIFEST_FILE_NAME)]
    FileNotFound(std::path::PathBuf),
    #[error("Failed to read {}: {}", .0.display(), .1)]
    ReadError(std::path::PathBuf, std::io::Error),
    #[error("Failed to parse {}: {}", .0.display(), .1)]
    ParseError(std::path::PathBuf, serde_yml::Error),
}

impl Manifest {
    /// Load manifest from the specified file path
    pub fn load(manifest_file_path: &Path) -> Result<Self, LoadManifestError> {
        if !manifest_file_path.exists() {
            return Err(LoadManifestError::FileNotFound(
                manifest_file_path.to_path_buf(),
            ));
        }

        let content = fs::read_to_string(manifest_file_path)
            .map_err(|e| LoadManifestError::ReadError(manifest_file_path.to_path_buf(), e))?;

        let manifest: Manifest = serde_yml::from_str(&content)
            .map_err(|e| LoadManifestError::ParseError(manifest_file_path.to_path_buf(), e))?;

        Ok(manifest)
    }

    /// Try to load manifest, returning a default instance if the file doesn't exist
    pub fn load_or_default(manifest_file_path: &Path) -> Self {
        Self::load(manifest_file_path).unwrap_or_default()
    }

    /// Save manifest to the specified file path with proper formatting
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let yaml = serde_yml::to_string(self)
            .map_err(|e| format!("Failed to serialize manifest: {}", e))?;

        let content = format!("---\n# Kirana Manifest - API version v1\n\n{}", yaml);

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write manifest to {}: {}", path.display(), e))?;

        Ok(())
    }

    /// Resolve the merchant key from the manifest or the PAYU_MERCHANT_KEY
    /// environment variable
    pub fn merchant_key(&self) -> Option<String> {
        self.gateway
            .merchant_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var(MERCHANT_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }

    /// Resolve the merchant salt from the environment variable named by
    /// `gateway.merchant_salt_env`. The salt value itself is never included
    /// in error messages.
    pub fn merchant_salt(&self) -> Result<SecretString, String> {
        match std::env::var(&self.gateway.merchant_salt_env) {
            Ok(salt) if !salt.is_empty() => Ok(SecretString::new(salt)),
            _ => Err(format!(
                "Merchant salt not found. Set the {} environment variable (or run 'kirana init' to create a .env file).",
                self.gateway.merchant_salt_env
            )),
        }
    }

    /// Build the storefront configuration from the manifest URLs
    pub fn storefront_config(&self) -> Result<StorefrontConfig, String> {
        let gateway_base_url = parse_url("gateway.base_url", &self.gateway.base_url)?;
        let frontend_url = parse_url("urls.frontend", &self.urls.frontend)?;
        let backend_url = parse_url("urls.backend", &self.urls.backend)?;

        Ok(StorefrontConfig {
            gateway_base_url,
            frontend_url,
            backend_url,
            allow_unsigned_callbacks: self.gateway.allow_unsigned_callbacks,
        })
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Manifest {
            name: None,
            server: ServerConfig::default(),
            catalog: CatalogConfig::default(),
            gateway: GatewayConfig::default(),
            urls: UrlsConfig::default(),
        }
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|e| format!("Invalid {} '{}': {}", field, value, e))
}

/// Local server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the storefront server listens on (default: 5001)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the sqlite database file, relative to the manifest directory
    #[serde(default = "default_database")]
    pub database: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            database: default_database(),
        }
    }
}

/// Product catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog path - directory of product YAML files, relative to the
    /// manifest directory (default: "catalog/v1")
    #[serde(default = "default_catalog_path")]
    pub path: String,

    /// Optional description of this catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            path: default_catalog_path(),
            description: None,
        }
    }
}

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Merchant key (optional)
    /// WARNING: It's recommended to use the PAYU_MERCHANT_KEY environment
    /// variable instead to avoid committing credentials to version control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_key: Option<String>,

    /// Name of the environment variable holding the merchant salt
    /// (default: PAYU_MERCHANT_SALT). The salt itself never lives in the
    /// manifest.
    #[serde(default = "default_merchant_salt_env")]
    pub merchant_salt_env: String,

    /// Gateway payment endpoint the checkout form posts to
    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,

    /// Accept callbacks that carry no hash field. Leave this off unless you
    /// are replaying captured traffic against a dev server.
    #[serde(default)]
    pub allow_unsigned_callbacks: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            merchant_key: None,
            merchant_salt_env: default_merchant_salt_env(),
            base_url: default_gateway_base_url(),
            allow_unsigned_callbacks: false,
        }
    }
}

/// Public URLs used for gateway redirects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlsConfig {
    /// Frontend base URL the customer is redirected back to
    #[serde(default = "default_frontend_url")]
    pub frontend: String,

    /// Backend base URL the gateway posts callbacks to
    #[serde(default = "default_backend_url")]
    pub backend: String,
}

impl Default for UrlsConfig {
    fn default() -> Self {
        UrlsConfig {
            frontend: default_frontend_url(),
            backend: default_backend_url(),
        }
    }
}

fn default_port() -> u16 {
    5001
}

fn default_database() -> String {
    "storefront.sqlite".to_string()
}

fn default_catalog_path() -> String {
    "catalog/v1".to_string()
}

fn default_merchant_salt_env() -> String {
    "PAYU_MERCHANT_SALT".to_string()
}

fn default_gateway_base_url() -> String {
    "https://test.payu.in/_payment".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

fn default_backend_url() -> String {
    "http://localhost:5001".to_string()
}
