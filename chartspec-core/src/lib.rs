#[macro_use]
extern crate lazy_static;

pub mod builder;
pub mod chart;
pub mod config;
pub mod constants;
pub mod element;
pub mod marks;
pub mod naming;
pub mod options;
pub mod spec;

#[cfg(test)]
mod test_logger;

pub use chart::{build_chart_spec, build_chart_spec_from_element};
pub use chartspec_common::error;
