// Data sources
pub const TABLE: &str = "table";
pub const FILTERED_TABLE: &str = "filteredTable";

// Reserved fields injected into the data
pub const MARK_ID: &str = "rscMarkId";
pub const SERIES_ID: &str = "rscSeriesId";
pub const TRENDLINE_VALUE: &str = "rscTrendlineValue";
pub const ANNOTATION_DATUM: &str = "rscAnnotationDatum";
pub const ANNOTATION_DISTANCE: &str = "rscAnnotationDistance";
pub const AXIS_ANNOTATION_ID: &str = "rscAnnotationId";

// Default field names
pub const DEFAULT_COLOR: &str = "series";
pub const DEFAULT_METRIC: &str = "value";
pub const DEFAULT_TIME_DIMENSION: &str = "datetime";
pub const DEFAULT_CATEGORICAL_DIMENSION: &str = "category";
pub const DEFAULT_SCATTER_DIMENSION: &str = "x";
pub const DEFAULT_SCATTER_METRIC: &str = "y";
pub const DEFAULT_HIERARCHY_ID: &str = "id";
pub const DEFAULT_HIERARCHY_PARENT: &str = "parent";

// Interaction signals
pub const HIGHLIGHTED_ITEM: &str = "highlightedItem";
pub const HIGHLIGHTED_SERIES: &str = "highlightedSeries";
pub const HIGHLIGHTED_GROUP: &str = "highlightedGroup";
pub const SELECTED_ITEM: &str = "selectedItem";
pub const SELECTED_SERIES: &str = "selectedSeries";
pub const SELECTED_GROUP: &str = "selectedGroup";
pub const HIDDEN_SERIES: &str = "hiddenSeries";

// Facet scales
pub const COLOR_SCALE: &str = "color";
pub const LINE_TYPE_SCALE: &str = "lineType";
pub const LINE_WIDTH_SCALE: &str = "lineWidth";
pub const OPACITY_SCALE: &str = "opacity";
pub const SYMBOL_SIZE_SCALE: &str = "symbolSize";
pub const SYMBOL_SHAPE_SCALE: &str = "symbolShape";
pub const SYMBOL_PATH_WIDTH_SCALE: &str = "symbolPathWidth";

// Array-valued scales used by dual facets
pub const COLORS_SCALE: &str = "colors";
pub const LINE_TYPES_SCALE: &str = "lineTypes";
pub const LINE_WIDTHS_SCALE: &str = "lineWidths";
pub const OPACITIES_SCALE: &str = "opacities";

// Dimension and metric scales
pub const X_LINEAR: &str = "xLinear";
pub const X_TIME: &str = "xTime";
pub const X_POINT: &str = "xPoint";
pub const X_BAND: &str = "xBand";
pub const Y_LINEAR: &str = "yLinear";
pub const Y_BAND: &str = "yBand";

// Anchor preference used when placing labels with the label transform
pub const LABEL_ANCHORS: [&str; 8] = [
    "top",
    "bottom",
    "right",
    "left",
    "top-right",
    "top-left",
    "bottom-right",
    "bottom-left",
];

// Tokens shared by generated expressions
pub const GROUP_ID_SEPARATOR: &str = " | ";
pub const HIGHLIGHT_CONTRAST_RATIO: f64 = 0.2;
pub const SELECTION_RING_PADDING: f64 = 4.0;
pub const DEFAULT_SYMBOL_STROKE_WIDTH: f64 = 2.0;
pub const HIGHLIGHT_POINT_SIZE: f64 = 64.0;
pub const ANNOTATION_PADDING: f64 = 4.0;
pub const BACKGROUND_COLOR: &str = "white";
pub const SELECTION_COLOR: &str = "rgb(2, 101, 220)";
