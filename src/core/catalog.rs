use crate::domain::model::{IndicatorDefinition, IndicatorId};
use crate::utils::error::{AtlasError, Result};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct IndicatorCatalog {
    definitions: Vec<IndicatorDefinition>,
}

impl IndicatorCatalog {
    pub fn new(definitions: Vec<IndicatorDefinition>) -> Result<Self> {
        if definitions.is_empty() {
            return Err(AtlasError::config("indicator catalog is empty"));
        }

        let mut ids = HashSet::new();
        let mut labels = HashSet::new();
        for definition in &definitions {
            if !ids.insert(definition.id.as_str()) {
                return Err(AtlasError::config(format!(
                    "duplicate indicator code {}",
                    definition.id
                )));
            }
            if !labels.insert(definition.label.as_str()) {
                return Err(AtlasError::config(format!(
                    "duplicate indicator label \"{}\"",
                    definition.label
                )));
            }
        }

        Ok(Self { definitions })
    }

    pub fn get(&self, id: &IndicatorId) -> Option<&IndicatorDefinition> {
        self.definitions.iter().find(|d| &d.id == id)
    }

    pub fn contains(&self, id: &IndicatorId) -> bool {
        self.get(id).is_some()
    }

    pub fn label(&self, id: &IndicatorId) -> Option<&str> {
        self.get(id).map(|d| d.label.as_str())
    }

    pub fn legend_title(&self, id: &IndicatorId) -> Option<&str> {
        self.get(id)
            .map(|d| d.short_label.as_deref().unwrap_or(d.label.as_str()))
    }

    pub fn resolve_label(&self, label: &str) -> Result<&IndicatorId> {
        self.definitions
            .iter()
            .find(|d| d.label == label)
            .map(|d| &d.id)
            .ok_or_else(|| AtlasError::UnknownIndicatorError {
                label: label.to_string(),
            })
    }

    pub fn ids(&self) -> impl Iterator<Item = &IndicatorId> {
        self.definitions.iter().map(|d| &d.id)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.label.as_str())
    }

    pub fn definitions(&self) -> &[IndicatorDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(code: &str, label: &str, short: Option<&str>) -> IndicatorDefinition {
        IndicatorDefinition {
            id: IndicatorId::new(code),
            label: label.to_string(),
            short_label: short.map(str::to_string),
        }
    }

    #[test]
    fn test_resolve_label_to_id() {
        let catalog = IndicatorCatalog::new(vec![
            def("IT.NET.USER.ZS", "Internet users", Some("pop % using internet")),
            def("SG.GEN.PARL.ZS", "Women in parliament", None),
        ])
        .unwrap();

        assert_eq!(
            catalog.resolve_label("Women in parliament").unwrap(),
            &IndicatorId::new("SG.GEN.PARL.ZS")
        );
        assert!(matches!(
            catalog.resolve_label("GDP"),
            Err(AtlasError::UnknownIndicatorError { .. })
        ));
    }

    #[test]
    fn test_legend_title_falls_back_to_label() {
        let catalog = IndicatorCatalog::new(vec![
            def("A", "Alpha", Some("a")),
            def("B", "Beta", None),
        ])
        .unwrap();

        assert_eq!(catalog.legend_title(&IndicatorId::new("A")), Some("a"));
        assert_eq!(catalog.legend_title(&IndicatorId::new("B")), Some("Beta"));
        assert_eq!(catalog.legend_title(&IndicatorId::new("C")), None);
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(IndicatorCatalog::new(vec![]).is_err());
        assert!(IndicatorCatalog::new(vec![def("A", "x", None), def("A", "y", None)]).is_err());
        assert!(IndicatorCatalog::new(vec![def("A", "x", None), def("B", "x", None)]).is_err());
    }
}
