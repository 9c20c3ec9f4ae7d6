use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, fmt, str::FromStr};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Which object store implementation backs the file manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Any S3-compatible service reached through the AWS SDK.
    S3,
    /// Process-local store, contents are lost on exit.
    Memory,
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown backend `{}` (expected `s3` or `memory`)", other),
        }
    }
}

/// Connection settings for the S3 gateway.
#[derive(Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub force_path_style: bool,
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    /// Present only when `backend` is `S3`.
    pub s3: Option<S3Settings>,
    /// Public base URL that object keys are appended to.
    pub cdn_url: String,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "File manager over an S3-compatible bucket")]
pub struct Args {
    /// Host to bind to (overrides FILE_MANAGER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides FILE_MANAGER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Storage backend (overrides FILE_MANAGER_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Bucket holding the managed files (overrides AWS_BUCKET_NAME)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Bucket region (overrides AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom S3 endpoint, e.g. a MinIO or R2 URL (overrides AWS_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Use path-style bucket addressing (overrides AWS_FORCE_PATH_STYLE)
    #[arg(long)]
    pub force_path_style: bool,

    /// Public CDN base URL for file links (overrides FILE_MANAGER_CDN_URL)
    #[arg(long)]
    pub cdn_url: Option<String>,

    /// Maximum accepted upload request size (overrides FILE_MANAGER_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    fn from_args(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env::var("FILE_MANAGER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env("FILE_MANAGER_PORT")?.unwrap_or(3000);
        let env_backend = parse_env::<Backend>("FILE_MANAGER_BACKEND")?.unwrap_or(Backend::S3);
        let env_cdn = env::var("FILE_MANAGER_CDN_URL")
            .unwrap_or_else(|_| "http://localhost:3000/files".into());
        let env_max_upload =
            parse_env("FILE_MANAGER_MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let backend = args.backend.unwrap_or(env_backend);
        let s3 = match backend {
            Backend::S3 => Some(S3Settings {
                bucket: args
                    .bucket
                    .or_else(|| env::var("AWS_BUCKET_NAME").ok())
                    .context("a bucket is required for the s3 backend (AWS_BUCKET_NAME)")?,
                region: args
                    .region
                    .or_else(|| env::var("AWS_REGION").ok())
                    .unwrap_or_else(|| "us-east-1".into()),
                endpoint: args.endpoint.or_else(|| env::var("AWS_ENDPOINT_URL").ok()),
                access_key: env::var("AWS_ACCESS_KEY_ID").context("reading AWS_ACCESS_KEY_ID")?,
                secret_key: env::var("AWS_SECRET_ACCESS_KEY")
                    .context("reading AWS_SECRET_ACCESS_KEY")?,
                force_path_style: args.force_path_style
                    || parse_env::<bool>("AWS_FORCE_PATH_STYLE")?.unwrap_or(false),
            }),
            Backend::Memory => None,
        };

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            backend,
            s3,
            cdn_url: args.cdn_url.unwrap_or(env_cdn),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse an optional environment variable.
fn parse_env<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|err| anyhow::anyhow!("{}", err))
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}
