use crate::constants::{
    FILTERED_TABLE, GROUP_ID_SEPARATOR, HIDDEN_SERIES, HIGHLIGHTED_GROUP, HIGHLIGHTED_ITEM,
    MARK_ID, SELECTED_ITEM, SELECTED_SERIES, SERIES_ID, TABLE,
};
use crate::naming;
use crate::options::{Granularity, HighlightBy, HighlightMode};
use crate::spec::data::DataSpec;
use crate::spec::transform::filter::FilterTransformSpec;
use crate::spec::transform::formula::FormulaTransformSpec;
use crate::spec::transform::hierarchy::StratifyTransformSpec;
use crate::spec::transform::identifier::IdentifierTransformSpec;
use crate::spec::transform::stack::StackTransformSpec;
use crate::spec::transform::timeunit::{TimeUnitTransformSpec, TimeUnitUnitSpec};
use crate::spec::transform::TransformSpec;
use crate::spec::values::{CompareSpec, Field};
use chartspec_common::error::{Result, ResultWithContext};
use chartspec_common::escape::datum_field;
use itertools::Itertools;
use serde_json::Value;

/// `table` holding the inline rows and `filteredTable` without hidden series
pub fn base_data(values: Vec<Value>) -> Vec<DataSpec> {
    let mut table = DataSpec {
        name: TABLE.to_string(),
        source: None,
        values: Some(Value::Array(values)),
        transform: Vec::new(),
        extra: Default::default(),
    };
    table
        .transform
        .push(TransformSpec::Identifier(IdentifierTransformSpec {
            as_: MARK_ID.to_string(),
            extra: Default::default(),
        }));

    let mut filtered = DataSpec::derived(FILTERED_TABLE, TABLE);
    filtered
        .transform
        .push(TransformSpec::Filter(FilterTransformSpec::new(format!(
            "indexof({HIDDEN_SERIES}, datum.{SERIES_ID}) === -1"
        ))));

    vec![table, filtered]
}

pub fn get_table_data(data: &mut [DataSpec]) -> Result<&mut DataSpec> {
    data.iter_mut()
        .find(|d| d.name == TABLE)
        .with_context(|| format!("Chart has no '{TABLE}' data source"))
}

pub fn get_filtered_table_data(data: &mut [DataSpec]) -> Result<&mut DataSpec> {
    data.iter_mut()
        .find(|d| d.name == FILTERED_TABLE)
        .with_context(|| format!("Chart has no '{FILTERED_TABLE}' data source"))
}

/// Find the data source called `name`, creating it as derived from `source` when absent
pub fn get_or_add_derived_data<'a>(
    data: &'a mut Vec<DataSpec>,
    name: &str,
    source: &str,
) -> &'a mut DataSpec {
    let index = match data.iter().position(|d| d.name == name) {
        Some(index) => index,
        None => {
            data.push(DataSpec::derived(name, source));
            data.len() - 1
        }
    };
    &mut data[index]
}

/// Join the series facet fields into `rscSeriesId`. Only the first call has an effect.
pub fn add_series_id(data: &mut [DataSpec], facet_fields: &[String]) -> Result<()> {
    let table = get_table_data(data)?;
    if table.has_transform_output(SERIES_ID) {
        return Ok(());
    }
    let expr = if facet_fields.is_empty() {
        "''".to_string()
    } else {
        facet_fields
            .iter()
            .map(|f| datum_field(f))
            .join(&format!(" + '{GROUP_ID_SEPARATOR}' + "))
    };
    table
        .transform
        .push(TransformSpec::Formula(FormulaTransformSpec::new(
            expr, SERIES_ID,
        )));
    Ok(())
}

fn time_units(granularity: Granularity) -> Vec<TimeUnitUnitSpec> {
    use TimeUnitUnitSpec::*;
    match granularity {
        Granularity::Minute => vec![Year, Month, Date, Hours, Minutes],
        Granularity::Hour => vec![Year, Month, Date, Hours],
        Granularity::Day => vec![Year, Month, Date],
        Granularity::Week => vec![Year, Week],
        Granularity::Month => vec![Year, Month],
        Granularity::Quarter => vec![Year, Quarter],
        Granularity::Year => vec![Year],
    }
}

/// Coerce `dimension` to a date and bucket it into `${dimension}0`/`${dimension}1`.
/// Returns false when the dimension was already bucketed.
pub fn add_time_transform(
    data: &mut DataSpec,
    dimension: &str,
    granularity: Granularity,
) -> bool {
    let as_ = vec![format!("{dimension}0"), format!("{dimension}1")];
    if data.has_transform_output(&as_[0]) {
        return false;
    }
    data.transform
        .push(TransformSpec::Formula(FormulaTransformSpec::new(
            format!("toDate({})", datum_field(dimension)),
            dimension,
        )));
    data.transform
        .push(TransformSpec::Timeunit(TimeUnitTransformSpec {
            field: dimension.to_string(),
            units: Some(time_units(granularity)),
            step: None,
            timezone: None,
            interval: None,
            signal: None,
            as_: Some(as_),
            extra: Default::default(),
        }));
    true
}

/// Stack `metric` within each value of `groupby` into `${metric}0`/`${metric}1`.
///
/// Rows are stacked in ascending `order`; rows without an order value go last.
pub fn add_stack_transform(
    data: &mut DataSpec,
    groupby: &[String],
    metric: &str,
    order: Option<&str>,
) -> bool {
    let as_ = vec![format!("{metric}0"), format!("{metric}1")];
    if data.has_transform_output(&as_[0]) {
        return false;
    }
    data.transform.push(TransformSpec::Stack(StackTransformSpec {
        field: Field::from(metric),
        groupby: Some(groupby.iter().cloned().map(Field::from).collect()),
        sort: order.map(CompareSpec::ascending),
        as_: Some(as_),
        offset: None,
        extra: Default::default(),
    }));
    true
}

/// Everything needed to build the highlight filter of one mark
#[derive(Debug, Clone, Copy)]
pub struct HighlightContext<'a> {
    pub name: &'a str,
    pub dimension: &'a str,
    pub highlight_by: &'a HighlightBy,
    pub has_tooltip: bool,
    pub has_popover: bool,
}

impl<'a> HighlightContext<'a> {
    /// Fields whose joined values identify a highlight group, `None` for item highlighting
    pub fn group_fields(&self) -> Option<Vec<String>> {
        match self.highlight_by {
            HighlightBy::Mode(HighlightMode::Item) => None,
            HighlightBy::Mode(HighlightMode::Dimension) => Some(vec![self.dimension.to_string()]),
            HighlightBy::Mode(HighlightMode::Series) => Some(vec![SERIES_ID.to_string()]),
            HighlightBy::Keys(keys) => Some(keys.clone()),
        }
    }

    pub fn group_id_field(&self) -> String {
        naming::highlight_group_id(self.name)
    }

    /// Filter selecting the rows drawn as highlighted.
    ///
    /// Precedence from highest to lowest: selected item, hovered id, external highlight.
    pub fn filter_expr(&self) -> String {
        let mut expr = match self.group_fields() {
            Some(_) => format!(
                "{HIGHLIGHTED_GROUP} === datum.{}",
                self.group_id_field()
            ),
            None => format!(
                "isArray({HIGHLIGHTED_ITEM}) ? indexof({HIGHLIGHTED_ITEM}, datum.{MARK_ID}) > -1 : {HIGHLIGHTED_ITEM} === datum.{MARK_ID}"
            ),
        };
        if self.has_tooltip {
            let hovered = naming::hovered_id(self.name);
            expr = format!("isValid({hovered}) ? {hovered} === datum.{MARK_ID} : ({expr})");
        }
        if self.has_popover {
            expr = format!(
                "isValid({SELECTED_ITEM}) ? {SELECTED_ITEM} === datum.{MARK_ID} : ({expr})"
            );
        }
        expr
    }
}

/// Formula joining the highlight group fields into `${name}_highlightGroupId`
pub fn add_highlight_group_id(data: &mut [DataSpec], highlight: &HighlightContext) -> Result<()> {
    let Some(fields) = highlight.group_fields() else {
        return Ok(());
    };
    let filtered = get_filtered_table_data(data)?;
    let as_ = highlight.group_id_field();
    if filtered.has_transform_output(&as_) {
        return Ok(());
    }
    let expr = fields
        .iter()
        .map(|f| datum_field(f))
        .join(&format!(" + '{GROUP_ID_SEPARATOR}' + "));
    filtered
        .transform
        .push(TransformSpec::Formula(FormulaTransformSpec::new(expr, as_)));
    Ok(())
}

/// `${name}_highlightedData`, the rows of `filteredTable` currently highlighted
pub fn add_highlighted_data(data: &mut Vec<DataSpec>, highlight: &HighlightContext) -> Result<()> {
    add_highlight_group_id(data, highlight)?;
    let highlighted = get_or_add_derived_data(
        data,
        &naming::highlighted_data(highlight.name),
        FILTERED_TABLE,
    );
    highlighted.push_transform_once(TransformSpec::Filter(FilterTransformSpec::new(
        highlight.filter_expr(),
    )));
    Ok(())
}

/// `${name}_selectedData`, the row picked through a popover
pub fn add_selected_data(data: &mut Vec<DataSpec>, name: &str) {
    let selected = get_or_add_derived_data(data, &naming::selected_data(name), FILTERED_TABLE);
    selected.push_transform_once(TransformSpec::Filter(FilterTransformSpec::new(format!(
        "{SELECTED_ITEM} === datum.{MARK_ID}"
    ))));
}

/// `${name}_selectedDataSeries`, every row of the selected series
pub fn add_selected_data_series(data: &mut Vec<DataSpec>, name: &str) {
    let selected = get_or_add_derived_data(
        data,
        &naming::selected_data_series(name),
        FILTERED_TABLE,
    );
    selected.push_transform_once(TransformSpec::Filter(FilterTransformSpec::new(format!(
        "{SELECTED_SERIES} === datum.{SERIES_ID}"
    ))));
}

/// `${name}_tree`, the rows of `filteredTable` stratified by `id`/`parent_key` and laid out by `layout`
pub fn add_tree_data(
    data: &mut Vec<DataSpec>,
    name: &str,
    id: &str,
    parent_key: &str,
    layout: TransformSpec,
) -> String {
    let tree_name = naming::tree(name);
    let tree = get_or_add_derived_data(data, &tree_name, FILTERED_TABLE);
    tree.push_transform_once(TransformSpec::Stratify(StratifyTransformSpec {
        key: Field::from(id),
        parent_key: Field::from(parent_key),
        extra: Default::default(),
    }));
    tree.push_transform_once(layout);
    tree_name
}

#[cfg(test)]
mod tests {
    use crate::builder::data::{
        add_highlighted_data, add_series_id, add_stack_transform, add_time_transform, base_data,
        get_filtered_table_data, get_table_data, HighlightContext,
    };
    use crate::options::{Granularity, HighlightBy, HighlightMode};
    use crate::spec::transform::TransformSpec;
    use serde_json::json;

    #[test]
    fn test_missing_table_is_internal_error() {
        let mut data = vec![];
        assert!(get_table_data(&mut data).is_err());
        assert!(get_filtered_table_data(&mut data).is_err());
    }

    #[test]
    fn test_time_transform_is_idempotent() {
        let mut data = base_data(vec![]);
        let table = get_table_data(&mut data).unwrap();
        assert!(add_time_transform(table, "datetime", Granularity::Day));
        assert!(!add_time_transform(table, "datetime", Granularity::Day));
        assert_eq!(table.transform.len(), 3);
        assert!(table.has_transform_output("datetime0"));
    }

    #[test]
    fn test_stack_transform() {
        let mut data = base_data(vec![]);
        let filtered = get_filtered_table_data(&mut data).unwrap();
        assert!(add_stack_transform(
            filtered,
            &["browser".to_string()],
            "downloads",
            Some("order")
        ));
        assert!(!add_stack_transform(
            filtered,
            &["browser".to_string()],
            "downloads",
            Some("order")
        ));
        let stack = serde_json::to_value(filtered.transform.last().unwrap()).unwrap();
        assert_eq!(
            stack,
            json!({
                "type": "stack",
                "field": "downloads",
                "groupby": ["browser"],
                "sort": {"field": "order", "order": "ascending"},
                "as": ["downloads0", "downloads1"]
            })
        );
    }

    #[test]
    fn test_series_id_joins_fields() {
        let mut data = base_data(vec![]);
        add_series_id(&mut data, &["series".to_string(), "sub series".to_string()]).unwrap();
        add_series_id(&mut data, &["other".to_string()]).unwrap();
        let table = get_table_data(&mut data).unwrap();
        assert_eq!(table.transform.len(), 2);
        match &table.transform[1] {
            TransformSpec::Formula(f) => {
                assert_eq!(f.expr, "datum.series + ' | ' + datum['sub series']")
            }
            other => panic!("unexpected transform {other:?}"),
        }
    }

    #[test]
    fn test_selection_wins_over_hover() {
        let highlight_by = HighlightBy::default();
        let highlight = HighlightContext {
            name: "scatter0",
            dimension: "x",
            highlight_by: &highlight_by,
            has_tooltip: true,
            has_popover: true,
        };
        assert_eq!(
            highlight.filter_expr(),
            "isValid(selectedItem) ? selectedItem === datum.rscMarkId : \
             (isValid(scatter0_hoveredId) ? scatter0_hoveredId === datum.rscMarkId : \
             (isArray(highlightedItem) ? indexof(highlightedItem, datum.rscMarkId) > -1 : \
             highlightedItem === datum.rscMarkId))"
        );
    }

    #[test]
    fn test_group_highlight_adds_group_id() {
        let highlight_by = HighlightBy::Mode(HighlightMode::Dimension);
        let highlight = HighlightContext {
            name: "line0",
            dimension: "datetime",
            highlight_by: &highlight_by,
            has_tooltip: false,
            has_popover: false,
        };
        let mut data = base_data(vec![]);
        add_highlighted_data(&mut data, &highlight).unwrap();
        add_highlighted_data(&mut data, &highlight).unwrap();

        let filtered = get_filtered_table_data(&mut data).unwrap();
        assert!(filtered.has_transform_output("line0_highlightGroupId"));
        assert_eq!(filtered.transform.len(), 2);

        let highlighted = data
            .iter()
            .find(|d| d.name == "line0_highlightedData")
            .unwrap();
        assert_eq!(highlighted.transform.len(), 1);
        assert_eq!(
            highlight.filter_expr(),
            "highlightedGroup === datum.line0_highlightGroupId"
        );
    }
}
