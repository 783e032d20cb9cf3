//! Configuration management for the demo service

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub reconstruct: ReconstructConfig,
    pub buffer: BufferConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Destination of the save-json endpoint
    pub json_output_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Upper bound on a multipart request body
    pub max_body_bytes: usize,
    /// Directory used when the client sends no `destDir`
    pub default_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReconstructConfig {
    pub chunk_size: usize,
    pub total_size: u64,
    pub output_path: PathBuf,
    /// Progress step in percent; 0 reports after every chunk
    pub progress_step: u8,
    /// Largest `totalSize` accepted by the HTTP reconstruct endpoint
    pub max_request_size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BufferConfig {
    pub seed: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            storage: StorageConfig {
                json_output_path: PathBuf::from("data.json"),
            },
            upload: UploadConfig {
                max_body_bytes: 10 << 20,
                default_dir: PathBuf::from("."),
            },
            reconstruct: ReconstructConfig {
                chunk_size: 1024,
                total_size: 100 * 1024 * 1024,
                output_path: PathBuf::from("received_large_file.txt"),
                progress_step: 5,
                max_request_size: 1024 * 1024 * 1024,
            },
            buffer: BufferConfig {
                seed: "BascomHunter".to_string(),
            },
        }
    }
}

impl Config {
    /// Build the configuration from environment variables, falling back to
    /// the defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            storage: StorageConfig {
                json_output_path: env::var("JSON_OUTPUT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.json_output_path),
            },
            upload: UploadConfig {
                max_body_bytes: parse_var("UPLOAD_MAX_BYTES", defaults.upload.max_body_bytes)?,
                default_dir: env::var("UPLOAD_DEFAULT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.upload.default_dir),
            },
            reconstruct: ReconstructConfig {
                chunk_size: parse_var("RECONSTRUCT_CHUNK_SIZE", defaults.reconstruct.chunk_size)?,
                total_size: parse_var("RECONSTRUCT_TOTAL_SIZE", defaults.reconstruct.total_size)?,
                output_path: env::var("RECONSTRUCT_OUTPUT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.reconstruct.output_path),
                progress_step: parse_var(
                    "RECONSTRUCT_PROGRESS_STEP",
                    defaults.reconstruct.progress_step,
                )?,
                max_request_size: parse_var(
                    "RECONSTRUCT_MAX_REQUEST_SIZE",
                    defaults.reconstruct.max_request_size,
                )?,
            },
            buffer: BufferConfig {
                seed: env::var("BUFFER_SEED").unwrap_or(defaults.buffer.seed),
            },
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}
