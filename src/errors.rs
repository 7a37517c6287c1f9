use std::fmt;

#[derive(Debug, Clone)]
pub enum PeanutError {
    CacheConnection(String),
    ConfigError(String),
    StorageOperation(String),
    ConversionNotFound(String),
    InvalidModel(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    DateParse(String),
}

impl PeanutError {
    /// Stable error code, used in logs and API envelopes
    pub fn code(&self) -> &'static str {
        match self {
            PeanutError::CacheConnection(_) => "E001",
            PeanutError::ConfigError(_) => "E002",
            PeanutError::StorageOperation(_) => "E003",
            PeanutError::ConversionNotFound(_) => "E004",
            PeanutError::InvalidModel(_) => "E005",
            PeanutError::Validation(_) => "E006",
            PeanutError::NotFound(_) => "E007",
            PeanutError::Serialization(_) => "E008",
            PeanutError::DateParse(_) => "E009",
        }
    }

    /// Human-readable error category
    pub fn error_type(&self) -> &'static str {
        match self {
            PeanutError::CacheConnection(_) => "Cache Connection Error",
            PeanutError::ConfigError(_) => "Configuration Error",
            PeanutError::StorageOperation(_) => "Storage Operation Error",
            PeanutError::ConversionNotFound(_) => "Conversion Not Found",
            PeanutError::InvalidModel(_) => "Invalid Attribution Model",
            PeanutError::Validation(_) => "Validation Error",
            PeanutError::NotFound(_) => "Resource Not Found",
            PeanutError::Serialization(_) => "Serialization Error",
            PeanutError::DateParse(_) => "Date Parse Error",
        }
    }

    /// Error detail message
    pub fn message(&self) -> &str {
        match self {
            PeanutError::CacheConnection(msg) => msg,
            PeanutError::ConfigError(msg) => msg,
            PeanutError::StorageOperation(msg) => msg,
            PeanutError::ConversionNotFound(msg) => msg,
            PeanutError::InvalidModel(msg) => msg,
            PeanutError::Validation(msg) => msg,
            PeanutError::NotFound(msg) => msg,
            PeanutError::Serialization(msg) => msg,
            PeanutError::DateParse(msg) => msg,
        }
    }

    /// Colored format for server startup output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// Plain one-line format
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for PeanutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PeanutError {}

// Convenience constructors
impl PeanutError {
    pub fn cache_connection<T: Into<String>>(msg: T) -> Self {
        PeanutError::CacheConnection(msg.into())
    }

    pub fn config_error<T: Into<String>>(msg: T) -> Self {
        PeanutError::ConfigError(msg.into())
    }

    pub fn storage_operation<T: Into<String>>(msg: T) -> Self {
        PeanutError::StorageOperation(msg.into())
    }

    pub fn conversion_not_found<T: Into<String>>(msg: T) -> Self {
        PeanutError::ConversionNotFound(msg.into())
    }

    pub fn invalid_model<T: Into<String>>(msg: T) -> Self {
        PeanutError::InvalidModel(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PeanutError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PeanutError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PeanutError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        PeanutError::DateParse(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, PeanutError>;
