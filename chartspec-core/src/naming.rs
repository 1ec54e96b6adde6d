//! Every generated identifier is built here.
//!
//! The interaction layer parses rendered item names back into their owning mark, so
//! any change to a template below changes what that layer observes.
use regex::Regex;

lazy_static! {
    static ref SEPARATORS: Regex = Regex::new(r"[^A-Za-z0-9]+").unwrap();
}

/// Convert an arbitrary name into camelCase, dropping every separator so that the
/// result never contains `_`
pub fn to_camel_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for (i, word) in SEPARATORS
        .split(name)
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                result.extend(first.to_lowercase());
            } else {
                result.extend(first.to_uppercase());
            }
            result.push_str(chars.as_str());
        }
    }
    result
}

/// Explicit names are camelCased, otherwise `${mark_type}${index}`
pub fn mark_name(name: Option<&str>, mark_type: &str, index: usize) -> String {
    match name.map(to_camel_case) {
        Some(name) if !name.is_empty() => name,
        _ => format!("{}{index}", to_camel_case(mark_type)),
    }
}

/// Name of the mark that owns a rendered item, e.g. `bar0` for `bar0_group`
pub fn owner_of(item_name: &str) -> &str {
    item_name.split('_').next().unwrap_or(item_name)
}

pub fn group(name: &str) -> String {
    format!("{name}_group")
}

pub fn facet(name: &str) -> String {
    format!("{name}_facet")
}

pub fn highlighted_data(name: &str) -> String {
    format!("{name}_highlightedData")
}

pub fn selected_data(name: &str) -> String {
    format!("{name}_selectedData")
}

pub fn selected_data_series(name: &str) -> String {
    format!("{name}_selectedDataSeries")
}

pub fn hovered_id(name: &str) -> String {
    format!("{name}_hoveredId")
}

pub fn highlight_group_id(name: &str) -> String {
    format!("{name}_highlightGroupId")
}

pub fn voronoi(name: &str) -> String {
    format!("{name}_voronoi")
}

pub fn points_for_voronoi(name: &str) -> String {
    format!("{name}_pointsForVoronoi")
}

pub fn point_highlight(name: &str) -> String {
    format!("{name}_point_highlight")
}

pub fn selection_ring(name: &str) -> String {
    format!("{name}_selectionRing")
}

pub fn anchor_point(name: &str) -> String {
    format!("{name}_anchorPoint")
}

pub fn highlight_rule(name: &str) -> String {
    format!("{name}_highlightRule")
}

pub fn select_border(name: &str) -> String {
    format!("{name}_selectBorder")
}

pub fn static_points(name: &str) -> String {
    format!("{name}_staticPoints")
}

pub fn static_point_data(name: &str) -> String {
    format!("{name}_staticPointData")
}

pub fn gradient(name: &str) -> String {
    format!("{name}_gradient")
}

pub fn dodge_position(name: &str) -> String {
    format!("{name}_position")
}

pub fn trellis(name: &str) -> String {
    format!("{name}_trellis")
}

pub fn annotation_text(name: &str) -> String {
    format!("{name}_annotationText")
}

pub fn annotation_background(name: &str) -> String {
    format!("{name}_annotationBackground")
}

pub fn trendline(name: &str, index: usize) -> String {
    format!("{name}Trendline{index}")
}

pub fn extent(name: &str) -> String {
    format!("{name}_extent")
}

pub fn data(name: &str) -> String {
    format!("{name}_data")
}

pub fn annotation(name: &str, index: usize) -> String {
    format!("{name}Annotation{index}")
}

pub fn badge(name: &str) -> String {
    format!("{name}_badge")
}

pub fn scatter_path(name: &str, index: usize) -> String {
    format!("{name}Path{index}")
}

pub fn metric_range(name: &str, index: usize) -> String {
    format!("{name}MetricRange{index}")
}

pub fn reference_line(axis_name: &str, index: usize) -> String {
    format!("{axis_name}ReferenceLine{index}")
}

pub fn thumbnail(axis_name: &str, index: usize) -> String {
    format!("{axis_name}Thumbnail{index}")
}

pub fn legend_entry(name: &str) -> String {
    format!("{name}_legendEntry")
}

/// Data source and scale listing one legend entry per series id
pub fn legend_entries(name: &str) -> String {
    format!("{name}Entries")
}

pub fn summary_value(name: &str) -> String {
    format!("{name}_summaryValue")
}

pub fn summary_data(name: &str) -> String {
    format!("{name}_summaryData")
}

pub fn summary_label(name: &str) -> String {
    format!("{name}_summaryLabel")
}

pub fn segment_label(name: &str) -> String {
    format!("{name}_segmentLabel")
}

pub fn tree(name: &str) -> String {
    format!("{name}_tree")
}

pub fn leaves(name: &str) -> String {
    format!("{name}_leaves")
}

pub fn label(name: &str) -> String {
    format!("{name}_label")
}

pub fn line(name: &str) -> String {
    format!("{name}_line")
}

/// `color` becomes `secondaryColor`
pub fn secondary_scale(scale_name: &str) -> String {
    let mut chars = scale_name.chars();
    match chars.next() {
        Some(first) => format!("secondary{}{}", first.to_uppercase(), chars.as_str()),
        None => "secondary".to_string(),
    }
}

/// DOM id of the hidden button that opens a mark's popover
pub fn popover_trigger_id(chart_id: &str, mark_name: &str) -> String {
    format!("{chart_id}-{mark_name}-popover-trigger")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bar", "bar")]
    #[case("my bar", "myBar")]
    #[case("My_Bar chart", "myBarChart")]
    #[case("line-2", "line2")]
    #[case("__x__", "x")]
    fn test_to_camel_case(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_camel_case(input), expected);
    }

    #[test]
    fn test_mark_name_is_stable() {
        assert_eq!(mark_name(None, "bar", 0), "bar0");
        assert_eq!(mark_name(None, "bar", 0), mark_name(None, "bar", 0));
        assert_eq!(mark_name(Some("Downloads bar"), "bar", 3), "downloadsBar");
        assert_eq!(mark_name(Some("__"), "line", 2), "line2");
    }

    #[test]
    fn test_owner_of() {
        assert_eq!(owner_of("bar0_group"), "bar0");
        assert_eq!(owner_of(&point_highlight("line0")), "line0");
        assert_eq!(owner_of("scatter0"), "scatter0");
    }

    #[test]
    fn test_nested_templates() {
        let trendline = trendline("line0", 1);
        assert_eq!(trendline, "line0Trendline1");
        assert_eq!(data(&trendline), "line0Trendline1_data");
        assert_eq!(annotation(&trendline, 0), "line0Trendline1Annotation0");
        assert_eq!(secondary_scale("lineWidth"), "secondaryLineWidth");
        assert_eq!(
            popover_trigger_id("chart-1", "bar0"),
            "chart-1-bar0-popover-trigger"
        );
    }
}
