//! Chart instances and the canvases they are drawn on
//!
//! A [`Canvas`] holds at most one live [`Chart`]. Mounting a second chart
//! while one is live fails with [`DeckError::CanvasBusy`]; the old chart has
//! to be handed back through [`Chart::destroy`] first.

use super::draw::{self, DrawOp};
use super::plugin::ChartPlugin;
use super::{ChartConfig, Size};
use crate::error::{DeckError, Result};
use tracing::debug;

#[derive(Debug)]
pub struct Canvas {
    id: String,
    live: Option<u64>,
    mounted: u64,
}

impl Canvas {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string(), live: None, mounted: 0 }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_busy(&self) -> bool {
        self.live.is_some()
    }

    /// Number of charts currently alive on this canvas (0 or 1)
    pub fn live_charts(&self) -> usize {
        usize::from(self.live.is_some())
    }

    /// Total charts ever mounted here
    pub fn mounted(&self) -> u64 {
        self.mounted
    }

    /// Construct and draw a chart on this canvas
    pub fn mount(
        &mut self,
        config: ChartConfig,
        plugins: Vec<Box<dyn ChartPlugin>>,
        size: Size,
    ) -> Result<Chart> {
        if self.live.is_some() {
            return Err(DeckError::CanvasBusy(self.id.clone()));
        }
        self.mounted += 1;
        self.live = Some(self.mounted);

        let font = config.options.font.clone();
        let mut chart = Chart {
            canvas: self.id.clone(),
            serial: self.mounted,
            config,
            plugins,
            size,
            ops: Vec::new(),
            font,
        };
        chart.draw();
        debug!(canvas = %self.id, serial = chart.serial, "chart mounted");
        Ok(chart)
    }
}

/// A drawn chart bound to a canvas
pub struct Chart {
    canvas: String,
    serial: u64,
    config: ChartConfig,
    plugins: Vec<Box<dyn ChartPlugin>>,
    size: Size,
    ops: Vec<DrawOp>,
    font: String,
}

impl std::fmt::Debug for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chart")
            .field("canvas", &self.canvas)
            .field("serial", &self.serial)
            .field("size", &self.size)
            .field("ops", &self.ops.len())
            .finish()
    }
}

impl Chart {
    fn draw(&mut self) {
        let plugins: Vec<&dyn ChartPlugin> = self.plugins.iter().map(|p| &**p).collect();
        let (_, ops) = draw::paint(&self.config, &plugins, self.size);
        self.ops = ops;
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn canvas_id(&self) -> &str {
        &self.canvas
    }

    /// Redraw at a new size; plugin overlays are recomputed from the new geometry
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.draw();
    }

    pub fn svg(&self) -> String {
        draw::to_svg(&self.canvas, &self.ops, self.size, &self.font)
    }

    /// Release the canvas so another chart can be mounted on it
    pub fn destroy(self, canvas: &mut Canvas) {
        if canvas.id == self.canvas && canvas.live == Some(self.serial) {
            canvas.live = None;
            debug!(canvas = %canvas.id, serial = self.serial, "chart destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{plain_labels, Dataset};

    fn config() -> ChartConfig {
        ChartConfig::bar(plain_labels(["a", "b"])).dataset(Dataset::bar("v", vec![1.0, 2.0], "red", "red"))
    }

    #[test]
    fn test_mount_then_destroy() {
        let mut canvas = Canvas::new("gapsChart");
        let chart = canvas.mount(config(), vec![], Size::new(400.0, 200.0)).unwrap();
        assert_eq!(canvas.live_charts(), 1);
        assert!(chart.svg().contains(r#"id="gapsChart""#));

        chart.destroy(&mut canvas);
        assert_eq!(canvas.live_charts(), 0);
    }

    #[test]
    fn test_second_mount_without_destroy_fails() {
        let mut canvas = Canvas::new("gapsChart");
        let _first = canvas.mount(config(), vec![], Size::new(400.0, 200.0)).unwrap();
        let second = canvas.mount(config(), vec![], Size::new(400.0, 200.0));
        assert!(matches!(second, Err(DeckError::CanvasBusy(id)) if id == "gapsChart"));
        assert_eq!(canvas.live_charts(), 1);
    }

    #[test]
    fn test_destroy_on_other_canvas_is_ignored() {
        let mut a = Canvas::new("a");
        let mut b = Canvas::new("b");
        let chart = a.mount(config(), vec![], Size::new(400.0, 200.0)).unwrap();
        chart.destroy(&mut b);
        assert!(a.is_busy());
        assert!(!b.is_busy());
    }

    #[test]
    fn test_resize_redraws() {
        let mut canvas = Canvas::new("c");
        let mut chart = canvas.mount(config(), vec![], Size::new(400.0, 200.0)).unwrap();
        let before = chart.svg();
        chart.resize(Size::new(400.0, 400.0));
        assert_ne!(before, chart.svg());
        assert_eq!(chart.size(), Size::new(400.0, 400.0));
    }
}
