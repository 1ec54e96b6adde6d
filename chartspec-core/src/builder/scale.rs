use crate::config::{stroke_dash, BuilderConfig};
use crate::constants::{
    COLORS_SCALE, COLOR_SCALE, FILTERED_TABLE, LINE_TYPES_SCALE, LINE_TYPE_SCALE,
    LINE_WIDTHS_SCALE, LINE_WIDTH_SCALE, OPACITIES_SCALE, OPACITY_SCALE, SYMBOL_PATH_WIDTH_SCALE,
    SYMBOL_SHAPE_SCALE, SYMBOL_SIZE_SCALE,
};
use crate::naming;
use crate::options::{line_width_value, symbol_size_value, DimensionScaleType, FacetRef};
use crate::spec::mark::MarkEncodingSpec;
use crate::spec::scale::{
    ScaleArrayElementSpec, ScaleDataReferenceSpec, ScaleDataReferencesSpec, ScaleDomainSpec,
    ScaleRangeSpec, ScaleSpec, ScaleTypeSpec,
};
use chartspec_common::escape::datum_field;
use serde_json::{json, Value};

/// A visual property that can be driven by a data field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetScale {
    Color,
    LineType,
    LineWidth,
    Opacity,
    SymbolSize,
    SymbolShape,
    SymbolPathWidth,
}

impl FacetScale {
    pub fn name(&self) -> &'static str {
        match self {
            FacetScale::Color => COLOR_SCALE,
            FacetScale::LineType => LINE_TYPE_SCALE,
            FacetScale::LineWidth => LINE_WIDTH_SCALE,
            FacetScale::Opacity => OPACITY_SCALE,
            FacetScale::SymbolSize => SYMBOL_SIZE_SCALE,
            FacetScale::SymbolShape => SYMBOL_SHAPE_SCALE,
            FacetScale::SymbolPathWidth => SYMBOL_PATH_WIDTH_SCALE,
        }
    }

    /// Scale mapping a primary value to a list of variants, used by dual facets
    pub fn array_name(&self) -> Option<&'static str> {
        match self {
            FacetScale::Color => Some(COLORS_SCALE),
            FacetScale::LineType => Some(LINE_TYPES_SCALE),
            FacetScale::LineWidth => Some(LINE_WIDTHS_SCALE),
            FacetScale::Opacity => Some(OPACITIES_SCALE),
            _ => None,
        }
    }

    pub fn scale_type(&self) -> ScaleTypeSpec {
        match self {
            FacetScale::SymbolSize | FacetScale::SymbolPathWidth => ScaleTypeSpec::Linear,
            _ => ScaleTypeSpec::Ordinal,
        }
    }

    /// Resolve a static facet value into what the encoding channel expects
    pub fn static_value(&self, value: &Value) -> Value {
        match self {
            FacetScale::LineType => match value {
                Value::String(name) => json!(stroke_dash(name)),
                other => other.clone(),
            },
            FacetScale::LineWidth | FacetScale::SymbolPathWidth => json!(line_width_value(value)),
            FacetScale::SymbolSize => json!(symbol_size_value(value)),
            _ => value.clone(),
        }
    }
}

/// Position of the scale, `x` or `y`, derived from its name
fn range_for(name: &str) -> Option<ScaleRangeSpec> {
    if name.starts_with('x') {
        Some(ScaleRangeSpec::Value(json!("width")))
    } else if name.starts_with('y') {
        Some(ScaleRangeSpec::Value(json!("height")))
    } else {
        None
    }
}

/// Index of the scale called `name`, creating it with an empty `filteredTable` field
/// domain when absent
pub fn get_scale_index_by_name(
    scales: &mut Vec<ScaleSpec>,
    name: &str,
    type_: ScaleTypeSpec,
) -> usize {
    if let Some(index) = scales.iter().position(|s| s.name == name) {
        return index;
    }
    let mut scale = ScaleSpec::new(name, type_);
    scale.domain = Some(empty_fields_domain());
    scale.range = range_for(name);
    scales.push(scale);
    scales.len() - 1
}

/// Append `fields` to the domain of `scale`, skipping fields already present by name
pub fn add_domain_fields(scale: &mut ScaleSpec, data: &str, fields: &[String]) {
    if !matches!(scale.domain, Some(ScaleDomainSpec::FieldsReference(_))) {
        scale.domain = Some(empty_fields_domain());
    }
    if let Some(ScaleDomainSpec::FieldsReference(domain)) = &mut scale.domain {
        for field in fields {
            if !domain.fields.iter().any(|r| &r.field == field) {
                domain
                    .fields
                    .push(ScaleDataReferenceSpec::new(data, field.as_str()));
            }
        }
    }
}

fn empty_fields_domain() -> ScaleDomainSpec {
    ScaleDomainSpec::FieldsReference(ScaleDataReferencesSpec {
        data: None,
        fields: vec![],
        extra: Default::default(),
    })
}

/// Register `fields` in the domain of the scale called `name`, creating the scale when needed
pub fn add_fields_to_scale(
    scales: &mut Vec<ScaleSpec>,
    name: &str,
    type_: ScaleTypeSpec,
    fields: &[String],
) -> usize {
    let index = get_scale_index_by_name(scales, name, type_);
    add_domain_fields(&mut scales[index], FILTERED_TABLE, fields);
    index
}

/// Make a facet's field(s) part of the domain of its scale.
///
/// A dual facet also registers its primary field in the array scale and its secondary
/// field in the `secondary*` scale. Static facets register nothing.
pub fn add_field_to_facet_scale_domain(
    scales: &mut Vec<ScaleSpec>,
    facet_scale: FacetScale,
    facet: &FacetRef,
) {
    match facet {
        FacetRef::Field(field) => {
            add_fields_to_scale(
                scales,
                facet_scale.name(),
                facet_scale.scale_type(),
                &[field.clone()],
            );
        }
        FacetRef::Dual(primary, secondary) => {
            add_fields_to_scale(
                scales,
                facet_scale.name(),
                facet_scale.scale_type(),
                &[primary.clone()],
            );
            if let Some(array_name) = facet_scale.array_name() {
                add_fields_to_scale(
                    scales,
                    array_name,
                    ScaleTypeSpec::Ordinal,
                    &[primary.clone()],
                );
            }
            add_fields_to_scale(
                scales,
                &naming::secondary_scale(facet_scale.name()),
                ScaleTypeSpec::Ordinal,
                &[secondary.clone()],
            );
        }
        FacetRef::Static(_) => {}
    }
}

/// Lookup of a dual facet: the secondary value indexes into the primary value's variants
pub fn dual_facet_expression(array_scale: &str, secondary_scale: &str, primary: &str, secondary: &str) -> String {
    dual_facet_lookup(
        array_scale,
        secondary_scale,
        &datum_field(primary),
        &datum_field(secondary),
    )
}

/// [`dual_facet_expression`] over arbitrary value expressions instead of `datum` fields
pub fn dual_facet_lookup(
    array_scale: &str,
    secondary_scale: &str,
    primary: &str,
    secondary: &str,
) -> String {
    format!(
        "scale('{array_scale}', {primary})[indexof(domain('{secondary_scale}'), {secondary}) % length(scale('{array_scale}', {primary}))]"
    )
}

/// Encoding rule of a facet channel
pub fn facet_encoding(facet_scale: FacetScale, facet: &FacetRef) -> MarkEncodingSpec {
    match facet {
        FacetRef::Field(field) => MarkEncodingSpec::scale_field(facet_scale.name(), field.as_str()),
        FacetRef::Dual(primary, secondary) => match facet_scale.array_name() {
            Some(array_name) => MarkEncodingSpec::signal(dual_facet_expression(
                array_name,
                &naming::secondary_scale(facet_scale.name()),
                primary,
                secondary,
            )),
            None => MarkEncodingSpec::scale_field(facet_scale.name(), primary.as_str()),
        },
        FacetRef::Static(s) => MarkEncodingSpec::value(facet_scale.static_value(&s.value)),
    }
}

/// Same lookup as [`facet_encoding`] written as an expression, for use inside larger signals
pub fn facet_expression(facet_scale: FacetScale, facet: &FacetRef) -> String {
    match facet {
        FacetRef::Field(field) => format!("scale('{}', {})", facet_scale.name(), datum_field(field)),
        FacetRef::Dual(primary, secondary) => match facet_scale.array_name() {
            Some(array_name) => dual_facet_expression(
                array_name,
                &naming::secondary_scale(facet_scale.name()),
                primary,
                secondary,
            ),
            None => format!("scale('{}', {})", facet_scale.name(), datum_field(primary)),
        },
        FacetRef::Static(s) => facet_scale.static_value(&s.value).to_string(),
    }
}

/// Name of the dimension scale for an axis, e.g. `xTime`
pub fn dimension_scale_name(axis: &str, scale_type: DimensionScaleType) -> String {
    let suffix = match scale_type {
        DimensionScaleType::Time => "Time",
        DimensionScaleType::Linear => "Linear",
        DimensionScaleType::Point => "Point",
        DimensionScaleType::Band => "Band",
    };
    format!("{axis}{suffix}")
}

pub fn dimension_scale_type(scale_type: DimensionScaleType) -> ScaleTypeSpec {
    match scale_type {
        DimensionScaleType::Time => ScaleTypeSpec::Time,
        DimensionScaleType::Linear => ScaleTypeSpec::Linear,
        DimensionScaleType::Point => ScaleTypeSpec::Point,
        DimensionScaleType::Band => ScaleTypeSpec::Band,
    }
}

/// Register a dimension field on the `axis` scale of the given type and return its name
pub fn add_dimension_scale(
    scales: &mut Vec<ScaleSpec>,
    axis: &str,
    scale_type: DimensionScaleType,
    field: &str,
    padding: f64,
) -> String {
    let name = dimension_scale_name(axis, scale_type);
    let index = add_fields_to_scale(
        scales,
        &name,
        dimension_scale_type(scale_type),
        &[field.to_string()],
    );
    let scale = &mut scales[index];
    match scale_type {
        DimensionScaleType::Point => {
            scale.padding.get_or_insert(padding);
        }
        DimensionScaleType::Linear => {
            scale.zero.get_or_insert(false);
            scale.padding.get_or_insert(padding);
        }
        DimensionScaleType::Time => {
            scale.padding.get_or_insert(padding);
        }
        DimensionScaleType::Band => {}
    }
    name
}

/// Register metric fields on a linear metric scale that starts at zero
pub fn add_metric_scale(scales: &mut Vec<ScaleSpec>, name: &str, fields: &[String]) -> usize {
    let index = add_fields_to_scale(scales, name, ScaleTypeSpec::Linear, fields);
    let scale = &mut scales[index];
    scale.nice.get_or_insert(true);
    scale.zero.get_or_insert(true);
    index
}

fn values_range(values: Vec<Value>) -> ScaleRangeSpec {
    ScaleRangeSpec::Array(values.into_iter().map(ScaleArrayElementSpec::Value).collect())
}

/// Fill the range of every facet scale that has none yet from the builder config
pub fn fill_facet_ranges(scales: &mut [ScaleSpec], config: &BuilderConfig) {
    for scale in scales.iter_mut().filter(|s| s.range.is_none()) {
        let range = match scale.name.as_str() {
            COLOR_SCALE => Some(values_range(config.color_range())),
            COLORS_SCALE => Some(values_range(config.colors_range())),
            LINE_TYPE_SCALE => Some(values_range(config.line_type_range())),
            LINE_TYPES_SCALE => Some(values_range(
                config
                    .line_types
                    .iter()
                    .map(|t| json!([stroke_dash(t)]))
                    .collect(),
            )),
            LINE_WIDTH_SCALE => Some(values_range(
                config.line_widths.iter().map(|w| json!(w)).collect(),
            )),
            LINE_WIDTHS_SCALE => Some(values_range(
                config.line_widths.iter().map(|w| json!([w])).collect(),
            )),
            OPACITY_SCALE => Some(values_range(
                config.opacities.iter().map(|o| json!(o)).collect(),
            )),
            OPACITIES_SCALE => Some(values_range(
                config.opacities.iter().map(|o| json!([o])).collect(),
            )),
            SYMBOL_SIZE_SCALE => Some(values_range(
                config.symbol_sizes.iter().map(|s| json!(s)).collect(),
            )),
            SYMBOL_SHAPE_SCALE => Some(values_range(
                config.symbol_shapes.iter().map(|s| json!(s)).collect(),
            )),
            SYMBOL_PATH_WIDTH_SCALE => Some(values_range(vec![json!(1.0), json!(6.0)])),
            _ => None,
        };
        if range.is_some() {
            scale.range = range;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::scale::{
        add_dimension_scale, add_field_to_facet_scale_domain, dual_facet_expression,
        facet_encoding, fill_facet_ranges, FacetScale,
    };
    use crate::config::BuilderConfig;
    use crate::options::{DimensionScaleType, FacetRef};
    use crate::spec::scale::ScaleRangeSpec;
    use serde_json::json;

    #[test]
    fn test_facet_registration_is_idempotent() {
        let mut scales = vec![];
        let facet = FacetRef::field("series");
        add_field_to_facet_scale_domain(&mut scales, FacetScale::Color, &facet);
        add_field_to_facet_scale_domain(&mut scales, FacetScale::Color, &facet);
        assert_eq!(scales.len(), 1);
        assert_eq!(scales[0].domain_fields(), vec!["series".to_string()]);

        add_field_to_facet_scale_domain(&mut scales, FacetScale::Color, &FacetRef::field("region"));
        assert_eq!(scales.len(), 1);
        assert_eq!(
            scales[0].domain_fields(),
            vec!["series".to_string(), "region".to_string()]
        );
    }

    #[test]
    fn test_dual_facet_registers_secondary_scale() {
        let mut scales = vec![];
        let facet = FacetRef::Dual("series".to_string(), "subSeries".to_string());
        add_field_to_facet_scale_domain(&mut scales, FacetScale::Color, &facet);
        let names: Vec<_> = scales.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["color", "colors", "secondaryColor"]);
        assert_eq!(scales[2].domain_fields(), vec!["subSeries".to_string()]);
    }

    #[test]
    fn test_dual_facet_expression() {
        let facet = FacetRef::Dual("series".to_string(), "subSeries".to_string());
        let encoding = facet_encoding(FacetScale::Color, &facet);
        assert_eq!(
            encoding.signal.as_deref(),
            Some(
                "scale('colors', datum.series)[indexof(domain('secondaryColor'), datum.subSeries) % length(scale('colors', datum.series))]"
            )
        );
        assert_eq!(
            dual_facet_expression("lineTypes", "secondaryLineType", "a b", "c"),
            "scale('lineTypes', datum['a b'])[indexof(domain('secondaryLineType'), datum.c) % length(scale('lineTypes', datum['a b']))]"
        );
    }

    #[test]
    fn test_static_facets_resolve_named_values() {
        let encoding = facet_encoding(FacetScale::LineType, &FacetRef::value("dashed"));
        assert_eq!(encoding.value, Some(json!([7.0, 4.0])));
        let encoding = facet_encoding(FacetScale::SymbolSize, &FacetRef::value("M"));
        assert_eq!(encoding.value, Some(json!(100.0)));
    }

    #[test]
    fn test_dimension_scale() {
        let mut scales = vec![];
        let name = add_dimension_scale(&mut scales, "x", DimensionScaleType::Time, "datetime0", 0.0);
        assert_eq!(name, "xTime");
        let again = add_dimension_scale(&mut scales, "x", DimensionScaleType::Time, "datetime0", 0.0);
        assert_eq!(again, name);
        assert_eq!(scales.len(), 1);
        assert_eq!(scales[0].range, Some(ScaleRangeSpec::Value(json!("width"))));
    }

    #[test]
    fn test_fill_facet_ranges() {
        let mut scales = vec![];
        add_field_to_facet_scale_domain(&mut scales, FacetScale::Color, &FacetRef::field("series"));
        let config = BuilderConfig::default();
        fill_facet_ranges(&mut scales, &config);
        let range = serde_json::to_value(&scales[0].range).unwrap();
        assert_eq!(range[0], json!("#0fb5ae"));
        assert_eq!(range.as_array().unwrap().len(), config.colors.len());
    }
}
