use crate::spec::axis::AxisSpec;
use crate::spec::chart::ChartVisitor;
use crate::spec::data::DataSpec;
use crate::spec::legend::LegendSpec;
use crate::spec::mark::{MarkEncodingOrList, MarkSpec};
use crate::spec::scale::{ScaleDomainSpec, ScaleSpec};
use chartspec_common::error::Result;
use std::collections::HashSet;

/// Collects data and scale definitions along with every reference to them, so that
/// references without a definition can be reported once the walk completes.
///
/// Names are treated as chart-global. Facet aliases introduced by group marks and
/// named marks count as data definitions.
#[derive(Clone, Debug, Default)]
pub struct ReferenceCheckVisitor {
    pub data: HashSet<String>,
    pub scales: HashSet<String>,
    pub data_refs: Vec<(String, String)>,
    pub scale_refs: Vec<(String, String)>,
}

impl ReferenceCheckVisitor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Human readable description of every unresolved reference, in visit order
    pub fn dangling(&self) -> Vec<String> {
        let missing_data = self
            .data_refs
            .iter()
            .filter(|(name, _)| !self.data.contains(name))
            .map(|(name, owner)| format!("data '{name}' referenced by {owner}"));
        let missing_scales = self
            .scale_refs
            .iter()
            .filter(|(name, _)| !self.scales.contains(name))
            .map(|(name, owner)| format!("scale '{name}' referenced by {owner}"));
        missing_data.chain(missing_scales).collect()
    }

    fn visit_mark(&mut self, mark: &MarkSpec) {
        let owner = format!("mark '{}'", mark.name.clone().unwrap_or_default());
        // Named marks can be used as data sources by other marks
        if let Some(name) = &mark.name {
            self.data.insert(name.clone());
        }
        if let Some(from) = &mark.from {
            if let Some(data) = &from.data {
                self.data_refs.push((data.clone(), owner.clone()));
            }
            if let Some(facet) = &from.facet {
                self.data_refs.push((facet.data.clone(), owner.clone()));
                self.data.insert(facet.name.clone());
            }
        }
        if let Some(encode) = &mark.encode {
            for (_, encoding) in encode.channels() {
                let encodings = match encoding {
                    MarkEncodingOrList::List(list) => list.clone(),
                    MarkEncodingOrList::Scalar(enc) => vec![enc.as_ref().clone()],
                };
                for enc in encodings {
                    if let Some(scale) = enc.scale {
                        self.scale_refs.push((scale, owner.clone()));
                    }
                }
            }
        }
    }
}

impl ChartVisitor for ReferenceCheckVisitor {
    fn visit_data(&mut self, data: &DataSpec, _scope: &[u32]) -> Result<()> {
        self.data.insert(data.name.clone());
        if let Some(source) = &data.source {
            self.data_refs
                .push((source.clone(), format!("data '{}'", data.name)));
        }
        Ok(())
    }

    fn visit_scale(&mut self, scale: &ScaleSpec, _scope: &[u32]) -> Result<()> {
        self.scales.insert(scale.name.clone());
        let owner = format!("scale '{}'", scale.name);
        match &scale.domain {
            Some(ScaleDomainSpec::FieldsReference(refs)) => {
                if let Some(data) = &refs.data {
                    self.data_refs.push((data.clone(), owner.clone()));
                }
                for r in &refs.fields {
                    self.data_refs.push((r.data.clone(), owner.clone()));
                }
            }
            Some(ScaleDomainSpec::FieldReference(r)) => {
                self.data_refs.push((r.data.clone(), owner));
            }
            _ => {}
        }
        Ok(())
    }

    fn visit_axis(&mut self, axis: &AxisSpec, _scope: &[u32]) -> Result<()> {
        self.scale_refs
            .push((axis.scale.clone(), format!("{:?} axis", axis.orient)));
        Ok(())
    }

    fn visit_legend(&mut self, legend: &LegendSpec, _scope: &[u32]) -> Result<()> {
        for scale in legend.scales() {
            self.scale_refs.push((scale.to_string(), "legend".to_string()));
        }
        Ok(())
    }

    fn visit_non_group_mark(&mut self, mark: &MarkSpec, _scope: &[u32]) -> Result<()> {
        self.visit_mark(mark);
        Ok(())
    }

    fn visit_group_mark(&mut self, mark: &MarkSpec, _scope: &[u32]) -> Result<()> {
        self.visit_mark(mark);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::spec::chart::ChartSpec;
    use crate::spec::mark::{MarkEncodeSpec, MarkEncodingSpec, MarkSpec};
    use crate::spec::scale::{ScaleSpec, ScaleTypeSpec};

    #[test]
    fn test_dangling_scale_reported() {
        let mut chart = ChartSpec::new();
        chart.scales.push(ScaleSpec::new("xBand", ScaleTypeSpec::Band));
        chart.marks.push(
            MarkSpec::new("rect", "bar0").with_encode(
                MarkEncodeSpec::default()
                    .enter("x", MarkEncodingSpec::scale_field("xBand", "category"))
                    .enter("y", MarkEncodingSpec::scale_field("yLinear", "value")),
            ),
        );
        let dangling = chart.dangling_references().unwrap();
        assert_eq!(
            dangling,
            vec!["scale 'yLinear' referenced by mark 'bar0'".to_string()]
        );
    }
}
