use crate::spec::axis::AxisSpec;
use crate::spec::data::DataSpec;
use crate::spec::legend::LegendSpec;
use crate::spec::mark::MarkSpec;
use crate::spec::scale::ScaleSpec;
use crate::spec::signal::SignalSpec;
use crate::spec::title::TitleSpec;
use crate::spec::visitors::ReferenceCheckVisitor;
use chartspec_common::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "$schema", default = "default_schema")]
    pub schema: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<DataSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<SignalSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scales: Vec<ScaleSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub axes: Vec<AxisSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legends: Vec<LegendSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<MarkSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleSpec>,

    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

pub fn default_schema() -> String {
    String::from("https://vega.github.io/schema/vega/v5.json")
}

impl ChartSpec {
    /// An empty chart with the default schema
    pub fn new() -> Self {
        Self {
            schema: default_schema(),
            ..Default::default()
        }
    }

    pub fn walk(&self, visitor: &mut dyn ChartVisitor) -> Result<()> {
        visitor.visit_chart(self)?;

        // Top-level with empty scope
        let scope: Vec<u32> = Vec::new();
        for data in &self.data {
            visitor.visit_data(data, &scope)?;
        }
        for scale in &self.scales {
            visitor.visit_scale(scale, &scope)?;
        }
        for axis in &self.axes {
            visitor.visit_axis(axis, &scope)?;
        }
        for legend in &self.legends {
            visitor.visit_legend(legend, &scope)?;
        }
        for signal in &self.signals {
            visitor.visit_signal(signal, &scope)?;
        }

        let mut group_index = 0;
        for mark in &self.marks {
            if mark.is_group() {
                let mut nested_scope = scope.clone();
                nested_scope.push(group_index);

                visitor.visit_group_mark(mark, &nested_scope)?;
                mark.walk(visitor, &nested_scope)?;
                group_index += 1;
            } else {
                visitor.visit_non_group_mark(mark, &scope)?;
            }
        }

        Ok(())
    }

    /// Collect every scale, data or signal reference that has no matching definition
    pub fn dangling_references(&self) -> Result<Vec<String>> {
        let mut visitor = ReferenceCheckVisitor::new();
        self.walk(&mut visitor)?;
        Ok(visitor.dangling())
    }

    pub fn get_data(&self, name: &str) -> Option<&DataSpec> {
        self.data.iter().find(|d| d.name == name)
    }

    pub fn get_scale(&self, name: &str) -> Option<&ScaleSpec> {
        self.scales.iter().find(|s| s.name == name)
    }

    pub fn get_signal(&self, name: &str) -> Option<&SignalSpec> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Depth-first search through all marks, including nested group marks
    pub fn find_mark(&self, name: &str) -> Option<&MarkSpec> {
        self.marks.iter().find_map(|m| m.find_mark(name))
    }

    pub fn find_mark_mut(&mut self, name: &str) -> Option<&mut MarkSpec> {
        self.marks.iter_mut().find_map(|m| m.find_mark_mut(name))
    }
}

pub trait ChartVisitor {
    fn visit_chart(&mut self, _chart: &ChartSpec) -> Result<()> {
        Ok(())
    }
    fn visit_data(&mut self, _data: &DataSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_signal(&mut self, _signal: &SignalSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_scale(&mut self, _scale: &ScaleSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_axis(&mut self, _axis: &AxisSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_legend(&mut self, _legend: &LegendSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_non_group_mark(&mut self, _mark: &MarkSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
    fn visit_group_mark(&mut self, _mark: &MarkSpec, _scope: &[u32]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::spec::chart::ChartSpec;
    use crate::spec::mark::MarkSpec;
    use serde_json::json;

    #[test]
    fn test_find_nested_mark() {
        let mut chart = ChartSpec::new();
        let mut group = MarkSpec::new("group", "bar0_group");
        group.marks.push(MarkSpec::new("rect", "bar0"));
        chart.marks.push(group);

        assert_eq!(chart.find_mark("bar0").map(|m| m.type_.as_str()), Some("rect"));
        assert!(chart.find_mark("line0").is_none());
        assert_eq!(chart.find_mark("bar0_group").unwrap().marks.len(), 1);
    }

    #[test]
    fn test_empty_collections_not_serialized() {
        let chart = ChartSpec::new();
        let value = serde_json::to_value(&chart).unwrap();
        assert_eq!(
            value,
            json!({"$schema": "https://vega.github.io/schema/vega/v5.json"})
        );
    }
}
