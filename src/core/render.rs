use crate::core::catalog::IndicatorCatalog;
use crate::domain::model::{AggregationMode, AggregationResult};
use crate::utils::error::Result;
use serde::Serialize;

pub const PROJECTION: &str = "natural earth";

// locations (ISO3) 是地圖的對應鍵，hover_text 只用於顯示
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFrame {
    pub title: String,
    pub legend_title: String,
    pub mode: AggregationMode,
    pub projection: &'static str,
    pub locations: Vec<String>,
    pub values: Vec<f64>,
    pub hover_text: Vec<String>,
}

impl MapFrame {
    pub fn from_result(result: &AggregationResult, catalog: &IndicatorCatalog) -> Self {
        let label = catalog
            .label(&result.indicator)
            .unwrap_or(result.indicator.as_str());
        let legend_title = catalog
            .legend_title(&result.indicator)
            .unwrap_or(label)
            .to_string();

        let title = match result.mode {
            AggregationMode::Exact { year } => format!("{} ({})", label, year),
            AggregationMode::Averaged { from, to } => {
                format!("{} (average {}-{})", label, from, to)
            }
        };

        let mut locations = Vec::with_capacity(result.rows.len());
        let mut values = Vec::with_capacity(result.rows.len());
        let mut hover_text = Vec::with_capacity(result.rows.len());
        for row in &result.rows {
            locations.push(row.iso3_code.clone());
            values.push(row.value.value());
            hover_text.push(row.country_name.clone());
        }

        Self {
            title,
            legend_title,
            mode: result.mode,
            projection: PROJECTION,
            locations,
            values,
            hover_text,
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["iso3c", "country", "value"])?;
        for ((iso3, country), value) in self
            .locations
            .iter()
            .zip(&self.hover_text)
            .zip(&self.values)
        {
            writer.write_record([iso3.as_str(), country.as_str(), value.to_string().as_str()])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_table(&self) -> String {
        let mut lines = vec![
            self.title.clone(),
            format!("{:<6} {:<40} {:>14}", "ISO3", "Country", self.legend_title),
        ];
        for ((iso3, country), value) in self
            .locations
            .iter()
            .zip(&self.hover_text)
            .zip(&self.values)
        {
            lines.push(format!("{:<6} {:<40} {:>14.2}", iso3, country, value));
        }
        lines.push(format!("{} countries", self.len()));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        AggregateRow, AggregateValue, IndicatorDefinition, IndicatorId,
    };

    fn catalog() -> IndicatorCatalog {
        IndicatorCatalog::new(vec![IndicatorDefinition {
            id: IndicatorId::new("SG.GEN.PARL.ZS"),
            label: "Women in parliament (%)".to_string(),
            short_label: Some("% parliament women".to_string()),
        }])
        .unwrap()
    }

    fn result(mode: AggregationMode) -> AggregationResult {
        AggregationResult {
            indicator: IndicatorId::new("SG.GEN.PARL.ZS"),
            mode,
            rows: vec![
                AggregateRow {
                    iso3_code: "CIV".to_string(),
                    country_name: "Cote d'Ivoire, Rep.".to_string(),
                    value: AggregateValue::Exact { value: 11.0 },
                },
                AggregateRow {
                    iso3_code: "SWE".to_string(),
                    country_name: "Sweden".to_string(),
                    value: AggregateValue::Exact { value: 46.5 },
                },
            ],
        }
    }

    #[test]
    fn test_frame_is_keyed_by_iso3() {
        let frame = MapFrame::from_result(&result(AggregationMode::Exact { year: 2010 }), &catalog());

        assert_eq!(frame.locations, vec!["CIV", "SWE"]);
        assert_eq!(frame.values, vec![11.0, 46.5]);
        assert_eq!(frame.hover_text[1], "Sweden");
        assert_eq!(frame.legend_title, "% parliament women");
        assert_eq!(frame.title, "Women in parliament (%) (2010)");
        assert_eq!(frame.projection, PROJECTION);
    }

    #[test]
    fn test_averaged_title() {
        let frame = MapFrame::from_result(
            &result(AggregationMode::Averaged { from: 2005, to: 2008 }),
            &catalog(),
        );
        assert_eq!(frame.title, "Women in parliament (%) (average 2005-2008)");
    }

    #[test]
    fn test_csv_export_quotes_names() {
        let frame = MapFrame::from_result(&result(AggregationMode::Exact { year: 2010 }), &catalog());
        let csv = frame.to_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "iso3c,country,value");
        assert_eq!(lines[1], "CIV,\"Cote d'Ivoire, Rep.\",11");
        assert_eq!(lines[2], "SWE,Sweden,46.5");
    }

    #[test]
    fn test_json_contains_mode() {
        let frame = MapFrame::from_result(&result(AggregationMode::Exact { year: 2010 }), &catalog());
        let json: serde_json::Value = serde_json::from_str(&frame.to_json().unwrap()).unwrap();
        assert_eq!(json["mode"]["kind"], "exact");
        assert_eq!(json["locations"][0], "CIV");
    }
}
