pub mod aggregate;
pub mod extent;
pub mod filter;
pub mod flatten;
pub mod formula;
pub mod hierarchy;
pub mod identifier;
pub mod joinaggregate;
pub mod label;
pub mod pie;
pub mod regression;
pub mod stack;
pub mod timeunit;
pub mod voronoi;
pub mod window;

use crate::spec::transform::aggregate::AggregateTransformSpec;
use crate::spec::transform::extent::ExtentTransformSpec;
use crate::spec::transform::filter::FilterTransformSpec;
use crate::spec::transform::flatten::FlattenTransformSpec;
use crate::spec::transform::formula::FormulaTransformSpec;
use crate::spec::transform::hierarchy::{
    PartitionTransformSpec, StratifyTransformSpec, TreemapTransformSpec,
};
use crate::spec::transform::identifier::IdentifierTransformSpec;
use crate::spec::transform::joinaggregate::JoinAggregateTransformSpec;
use crate::spec::transform::label::LabelTransformSpec;
use crate::spec::transform::pie::PieTransformSpec;
use crate::spec::transform::regression::RegressionTransformSpec;
use crate::spec::transform::stack::StackTransformSpec;
use crate::spec::transform::timeunit::TimeUnitTransformSpec;
use crate::spec::transform::voronoi::VoronoiTransformSpec;
use crate::spec::transform::window::WindowTransformSpec;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransformSpec {
    Aggregate(AggregateTransformSpec),
    Extent(ExtentTransformSpec),
    Filter(FilterTransformSpec),
    Flatten(FlattenTransformSpec),
    Formula(FormulaTransformSpec),
    Identifier(IdentifierTransformSpec),
    JoinAggregate(JoinAggregateTransformSpec),
    Label(LabelTransformSpec),
    Partition(PartitionTransformSpec),
    Pie(PieTransformSpec),
    Regression(RegressionTransformSpec),
    Stack(StackTransformSpec),
    Stratify(StratifyTransformSpec),
    Timeunit(TimeUnitTransformSpec),
    Treemap(TreemapTransformSpec),
    Voronoi(VoronoiTransformSpec),
    Window(WindowTransformSpec),
}

impl Deref for TransformSpec {
    type Target = dyn TransformSpecTrait;

    fn deref(&self) -> &Self::Target {
        match self {
            TransformSpec::Aggregate(t) => t,
            TransformSpec::Extent(t) => t,
            TransformSpec::Filter(t) => t,
            TransformSpec::Flatten(t) => t,
            TransformSpec::Formula(t) => t,
            TransformSpec::Identifier(t) => t,
            TransformSpec::JoinAggregate(t) => t,
            TransformSpec::Label(t) => t,
            TransformSpec::Partition(t) => t,
            TransformSpec::Pie(t) => t,
            TransformSpec::Regression(t) => t,
            TransformSpec::Stack(t) => t,
            TransformSpec::Stratify(t) => t,
            TransformSpec::Timeunit(t) => t,
            TransformSpec::Treemap(t) => t,
            TransformSpec::Voronoi(t) => t,
            TransformSpec::Window(t) => t,
        }
    }
}

impl TransformSpec {
    /// Name of the transform type as it appears in the serialized spec
    pub fn type_name(&self) -> &'static str {
        match self {
            TransformSpec::Aggregate(_) => "aggregate",
            TransformSpec::Extent(_) => "extent",
            TransformSpec::Filter(_) => "filter",
            TransformSpec::Flatten(_) => "flatten",
            TransformSpec::Formula(_) => "formula",
            TransformSpec::Identifier(_) => "identifier",
            TransformSpec::JoinAggregate(_) => "joinaggregate",
            TransformSpec::Label(_) => "label",
            TransformSpec::Partition(_) => "partition",
            TransformSpec::Pie(_) => "pie",
            TransformSpec::Regression(_) => "regression",
            TransformSpec::Stack(_) => "stack",
            TransformSpec::Stratify(_) => "stratify",
            TransformSpec::Timeunit(_) => "timeunit",
            TransformSpec::Treemap(_) => "treemap",
            TransformSpec::Voronoi(_) => "voronoi",
            TransformSpec::Window(_) => "window",
        }
    }
}

pub trait TransformSpecTrait {
    /// Fields written onto each output datum by this transform
    fn output_fields(&self) -> Vec<String> {
        Default::default()
    }
}
