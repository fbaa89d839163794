use std::path::PathBuf;

const DEFAULT_REPORTS_DIR: &str = "reports";
const DEFAULT_SNAPSHOT_PATH: &str = "drive_data.json";
const DEFAULT_TOKEN_PATH: &str = "token.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditConfig {
    /// Root folder audited when no id is given on the command line.
    pub parent_file_id: Option<String>,
    pub copy_exact_filename: bool,
    pub reports_dir: PathBuf,
    pub snapshot_path: PathBuf,
    pub token_path: PathBuf,
    /// Bypasses the token file entirely when set.
    pub access_token: Option<String>,
    pub api_base_url: Option<String>,
    pub oauth_base_url: Option<String>,
}

impl AuditConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let path_or = |name: &str, default: &str| {
            non_empty(name)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Self {
            parent_file_id: non_empty("GDRIVE_PARENT_FILE_ID"),
            copy_exact_filename: non_empty("GDRIVE_COPY_EXACT_FILENAME")
                .map(|value| parse_bool(&value))
                .unwrap_or(true),
            reports_dir: path_or("GDRIVE_REPORTS_DIR", DEFAULT_REPORTS_DIR),
            snapshot_path: path_or("GDRIVE_SNAPSHOT_PATH", DEFAULT_SNAPSHOT_PATH),
            token_path: path_or("GDRIVE_TOKEN_PATH", DEFAULT_TOKEN_PATH),
            access_token: non_empty("GDRIVE_ACCESS_TOKEN"),
            api_base_url: non_empty("GDRIVE_API_BASE_URL"),
            oauth_base_url: non_empty("GDRIVE_OAUTH_BASE_URL"),
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
