use crate::domain::model::{IndicatorDefinition, IndicatorId, YearBounds};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AtlasError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.worldbank.org/v2";

/// 最早可接受的年份（World Bank 時間序列起點）
const EARLIEST_YEAR: i32 = 1960;
const LATEST_YEAR: i32 = 2100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub source: SourceConfig,
    pub years: YearsConfig,
    pub refresh: RefreshConfig,
    pub countries: CountriesConfig,
    pub indicators: Vec<IndicatorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub per_page: u32,
    pub skip_failed_indicators: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct YearsConfig {
    pub start: i32,
    pub end: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CountriesConfig {
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub code: String,
    pub label: String,
    pub short_label: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 30,
            per_page: 1000,
            skip_failed_indicators: false,
        }
    }
}

impl Default for YearsConfig {
    fn default() -> Self {
        Self {
            start: 2005,
            end: 2016,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
        }
    }
}

impl Default for CountriesConfig {
    fn default() -> Self {
        Self {
            excluded: vec![
                "Kosovo".to_string(),
                "Korea, Dem. People's Rep.".to_string(),
            ],
        }
    }
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            years: YearsConfig::default(),
            refresh: RefreshConfig::default(),
            countries: CountriesConfig::default(),
            indicators: vec![
                IndicatorConfig {
                    code: "IT.NET.USER.ZS".to_string(),
                    label: "Individuals using the Internet (% of population)".to_string(),
                    short_label: Some("pop % using internet".to_string()),
                },
                IndicatorConfig {
                    code: "SG.GEN.PARL.ZS".to_string(),
                    label: "Proportion of seats held by women in national parliaments (%)"
                        .to_string(),
                    short_label: Some("% parliament women".to_string()),
                },
                IndicatorConfig {
                    code: "EN.GHG.CO2.IP.MT.CE.AR5".to_string(),
                    label: "CO2 emissions from Industrial Processes".to_string(),
                    short_label: None,
                },
            ],
        }
    }
}

impl AtlasConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${WB_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| AtlasError::config(format!("env pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }
}

impl ConfigProvider for AtlasConfig {
    fn indicators(&self) -> Vec<IndicatorDefinition> {
        self.indicators
            .iter()
            .map(|i| IndicatorDefinition {
                id: IndicatorId::new(i.code.trim()),
                label: i.label.clone(),
                short_label: i.short_label.clone(),
            })
            .collect()
    }

    fn year_bounds(&self) -> YearBounds {
        YearBounds {
            start: self.years.start,
            end: self.years.end,
        }
    }

    fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_seconds)
    }

    fn excluded_countries(&self) -> &[String] {
        &self.countries.excluded
    }

    fn skip_failed_indicators(&self) -> bool {
        self.source.skip_failed_indicators
    }
}

impl Validate for AtlasConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_endpoint("source.endpoint", &self.source.endpoint)?;
        validation::validate_at_least("source.timeout_seconds", self.source.timeout_seconds, 1)?;
        validation::validate_at_least("source.per_page", self.source.per_page, 1)?;
        validation::validate_at_least("refresh.interval_seconds", self.refresh.interval_seconds, 1)?;
        validation::validate_year_span(
            "years",
            self.years.start,
            self.years.end,
            EARLIEST_YEAR,
            LATEST_YEAR,
        )?;

        if self.indicators.is_empty() {
            return Err(AtlasError::MissingConfigError {
                field: "indicators".to_string(),
            });
        }
        for indicator in &self.indicators {
            validation::validate_indicator_code("indicators.code", &indicator.code)?;
            validation::validate_non_empty_string("indicators.label", &indicator.label)?;
        }
        validation::validate_unique(
            "indicators.code",
            self.indicators.iter().map(|i| i.code.trim()),
        )?;
        validation::validate_unique(
            "indicators.label",
            self.indicators.iter().map(|i| i.label.as_str()),
        )?;

        Ok(())
    }
}
