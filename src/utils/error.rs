use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Data source request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Data source error: {message}")]
    DataSourceError { message: String },

    #[error("Invalid year range {low}..={high}: {reason}")]
    InvalidRangeError { low: i32, high: i32, reason: String },

    #[error("No dataset cached yet: data not yet available")]
    EmptyCacheError,

    #[error("Unknown indicator: {label}")]
    UnknownIndicatorError { label: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DataSource,
    Query,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AtlasError {
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSourceError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn invalid_range(low: i32, high: i32, reason: impl Into<String>) -> Self {
        Self::InvalidRangeError {
            low,
            high,
            reason: reason.into(),
        }
    }

    /// 上游資料來源造成的錯誤：刷新失敗，保留舊快取
    pub fn is_data_source(&self) -> bool {
        matches!(self, Self::ApiError(_) | Self::DataSourceError { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::ApiError(e) if e.is_timeout())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::DataSourceError { .. } => ErrorCategory::DataSource,
            Self::InvalidRangeError { .. } | Self::EmptyCacheError | Self::UnknownIndicatorError { .. } => {
                ErrorCategory::Query
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyCacheError => ErrorSeverity::Low,
            Self::ApiError(_) | Self::DataSourceError { .. } => ErrorSeverity::Medium,
            Self::InvalidRangeError { .. }
            | Self::UnknownIndicatorError { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::TomlError(_) => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) if e.is_timeout() => {
                "The statistics service did not answer in time".to_string()
            }
            Self::ApiError(_) | Self::DataSourceError { .. } => {
                format!("Could not retrieve indicator data: {}", self)
            }
            Self::EmptyCacheError => "Data not yet available".to_string(),
            Self::InvalidRangeError { low, high, .. } => {
                format!("The year range {} to {} cannot be shown", low, high)
            }
            Self::UnknownIndicatorError { label } => format!("No data set named \"{}\"", label),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::DataSource => {
                "Check network access to the data source; the next refresh will retry"
            }
            ErrorCategory::Query => match self {
                Self::EmptyCacheError => "Wait for the first refresh to complete",
                Self::UnknownIndicatorError { .. } => "Pick one of the configured indicator labels",
                _ => "Choose years inside the configured range",
            },
            ErrorCategory::Configuration => "Fix the configuration file and restart",
            ErrorCategory::System => "Check file permissions and disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_errors_are_categorised() {
        assert_eq!(AtlasError::EmptyCacheError.category(), ErrorCategory::Query);
        assert_eq!(AtlasError::EmptyCacheError.severity(), ErrorSeverity::Low);
        assert_eq!(
            AtlasError::invalid_range(2020, 2001, "outside").category(),
            ErrorCategory::Query
        );
    }

    #[test]
    fn test_data_source_errors() {
        let err = AtlasError::data_source("service unavailable");
        assert!(err.is_data_source());
        assert!(!err.is_timeout());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err.user_friendly_message().contains("service unavailable"));
    }

    #[test]
    fn test_config_errors_are_not_data_source() {
        let err = AtlasError::config("empty catalog");
        assert!(!err.is_data_source());
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
