//! Drawing hooks around the dataset pass

use super::draw::DrawOp;
use super::layout::{BarGeometry, Layout, Rect};
use super::ChartConfig;

/// What a plugin can see while the chart is being painted
pub struct Frame<'a> {
    pub config: &'a ChartConfig,
    pub layout: &'a Layout,
}

impl<'a> Frame<'a> {
    pub fn area(&self) -> Rect {
        self.layout.area
    }

    /// Values of one dataset, empty if the index is out of range
    pub fn values(&self, dataset: usize) -> &'a [f64] {
        self.config
            .datasets
            .get(dataset)
            .map(|d| d.values.as_slice())
            .unwrap_or(&[])
    }

    /// Rendered geometry of one dataset, empty if the index is out of range
    pub fn bars(&self, dataset: usize) -> &'a [BarGeometry] {
        self.layout
            .datasets
            .get(dataset)
            .map(|g| g.as_slice())
            .unwrap_or(&[])
    }
}

/// Hook invoked by the renderer before and after datasets are painted.
///
/// Both hooks run on every render, after layout, so anything derived from
/// geometry must be computed inside them.
pub trait ChartPlugin {
    fn id(&self) -> &str;

    fn before_datasets_draw(&self, _frame: &Frame<'_>, _ops: &mut Vec<DrawOp>) {}

    fn after_datasets_draw(&self, _frame: &Frame<'_>, _ops: &mut Vec<DrawOp>) {}
}
