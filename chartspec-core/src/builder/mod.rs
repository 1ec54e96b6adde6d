//! Helpers shared by the mark builders.
//!
//! Every helper mutates a draft [`ChartSpec`] in place. Mark builders run inside
//! [`SpecBuilder::apply`] so a failing mark never leaves a partially applied draft behind.
pub mod data;
pub mod encoding;
pub mod scale;
pub mod signal;

use crate::config::BuilderConfig;
use crate::spec::chart::ChartSpec;
use chartspec_common::error::{Result, ResultWithContext};

/// Owns the in-progress spec for a single build
#[derive(Debug, Clone)]
pub struct SpecBuilder<'a> {
    spec: ChartSpec,
    config: &'a BuilderConfig,
}

impl<'a> SpecBuilder<'a> {
    pub fn new(spec: ChartSpec, config: &'a BuilderConfig) -> Self {
        Self { spec, config }
    }

    pub fn config(&self) -> &'a BuilderConfig {
        self.config
    }

    pub fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    /// Run `f` against a copy of the draft and commit the copy only if `f` succeeds
    pub fn apply<F>(&mut self, label: &str, f: F) -> Result<()>
    where
        F: FnOnce(&mut ChartSpec, &BuilderConfig) -> Result<()>,
    {
        let mut draft = self.spec.clone();
        f(&mut draft, self.config).with_context(|| format!("while adding {label}"))?;
        self.spec = draft;
        Ok(())
    }

    pub fn into_spec(self) -> ChartSpec {
        self.spec
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::SpecBuilder;
    use crate::config::BuilderConfig;
    use crate::spec::chart::ChartSpec;
    use crate::spec::data::DataSpec;
    use chartspec_common::error::ChartSpecError;

    #[test]
    fn test_failed_apply_leaves_draft_untouched() {
        let config = BuilderConfig::default();
        let mut builder = SpecBuilder::new(ChartSpec::new(), &config);
        builder
            .apply("first", |spec, _| {
                spec.data.push(DataSpec::derived("a", "table"));
                Ok(())
            })
            .unwrap();

        let err = builder
            .apply("second", |spec, _| {
                spec.data.push(DataSpec::derived("b", "table"));
                Err(ChartSpecError::internal("boom"))
            })
            .unwrap_err();

        assert!(err.to_string().contains("while adding second"));
        let names: Vec<_> = builder.spec().data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }
}
