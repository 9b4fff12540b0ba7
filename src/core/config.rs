use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub swagger: SwaggerConfig,
    pub assistant: AssistantConfig,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Connection and provisioning settings for the remote assistant service
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Bearer credential for the remote API
    pub api_key: String,
    /// Assistant identity used to start runs. Optional at load time so the
    /// provisioning route can be used to obtain one.
    pub assistant_id: Option<String>,
    /// API root, without trailing slash
    pub base_url: String,
    /// Bound on each non-streaming call and on opening a run stream
    pub request_timeout: Duration,
    /// Bound on the wait for the next event of an open run stream
    pub stream_idle_timeout: Duration,
    pub default_model: String,
    pub default_name: String,
    pub default_instructions: String,
}

#[derive(Debug, Clone)]
pub struct ToolsConfig {
    /// Whether `setRoomTemperature` may register a room it has never seen
    pub allow_new_rooms: bool,
}

/// Read a variable, treating an empty value as unset
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a boolean flag, accepting 1/0, true/false, yes/no and on/off
fn bool_var(key: &str, default: bool) -> Result<bool, String> {
    match non_empty_var(key) {
        None => Ok(default),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("{} must be a boolean", key)),
        },
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            assistant: AssistantConfig::from_env()?,
            tools: ToolsConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 21 * 1024 * 1024; // 20MB file + multipart overhead

    pub fn from_env() -> Result<Self, String> {
        let host = non_empty_var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = non_empty_var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let cors_allowed_origins = non_empty_var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = non_empty_var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        let title = non_empty_var("SWAGGER_TITLE").unwrap_or_else(|| "Assistant Relay API".to_string());
        let version = non_empty_var("SWAGGER_VERSION").unwrap_or_else(|| "0.1.0".to_string());
        let description = non_empty_var("SWAGGER_DESCRIPTION").unwrap_or_else(|| {
            "Chat relay between browser clients and a hosted assistant".to_string()
        });

        Ok(Self {
            title,
            version,
            description,
        })
    }
}

impl AssistantConfig {
    const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
    const DEFAULT_STREAM_IDLE_TIMEOUT_SECS: u64 = 120;
    const DEFAULT_MODEL: &'static str = "gpt-4o";
    const DEFAULT_NAME: &'static str = "Math Tutor";
    const DEFAULT_INSTRUCTIONS: &'static str =
        "You are a personal math tutor. Write and run code to answer math questions.";

    pub fn from_env() -> Result<Self, String> {
        let api_key = non_empty_var("OPENAI_API_KEY")
            .ok_or_else(|| "OPENAI_API_KEY environment variable is required".to_string())?;

        let assistant_id = non_empty_var("ASSISTANT_ID");
        Self::check_assistant_id(
            assistant_id.as_deref(),
            bool_var("REQUIRE_ASSISTANT_ID", false)?,
        )?;

        let base_url = non_empty_var("OPENAI_BASE_URL")
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout_secs = non_empty_var("ASSISTANT_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| Self::DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "ASSISTANT_REQUEST_TIMEOUT_SECS must be a valid number".to_string())?;

        let stream_idle_timeout_secs = non_empty_var("ASSISTANT_STREAM_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|| Self::DEFAULT_STREAM_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "ASSISTANT_STREAM_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let default_model =
            non_empty_var("ASSISTANT_MODEL").unwrap_or_else(|| Self::DEFAULT_MODEL.to_string());
        let default_name =
            non_empty_var("ASSISTANT_NAME").unwrap_or_else(|| Self::DEFAULT_NAME.to_string());
        let default_instructions = non_empty_var("ASSISTANT_INSTRUCTIONS")
            .unwrap_or_else(|| Self::DEFAULT_INSTRUCTIONS.to_string());

        Ok(Self {
            api_key,
            assistant_id,
            base_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            stream_idle_timeout: Duration::from_secs(stream_idle_timeout_secs),
            default_model,
            default_name,
            default_instructions,
        })
    }
}

impl AssistantConfig {
    /// Deployments without the provisioning step set `REQUIRE_ASSISTANT_ID`
    /// so a missing id stops startup
    fn check_assistant_id(assistant_id: Option<&str>, required: bool) -> Result<(), String> {
        if required && assistant_id.is_none() {
            return Err(
                "ASSISTANT_ID environment variable is required when REQUIRE_ASSISTANT_ID is set"
                    .to_string(),
            );
        }
        Ok(())
    }
}

impl ToolsConfig {
    pub fn from_env() -> Result<Self, String> {
        let allow_new_rooms = bool_var("TOOLS_ALLOW_NEW_ROOMS", true)?;

        Ok(Self { allow_new_rooms })
    }
}
