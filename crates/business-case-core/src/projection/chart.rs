use serde::{Deserialize, Serialize};

use crate::types::Money;
use crate::BusinessCaseResult;

use super::yearly::{year_label, YearlySummary};

/// Render payload for the cash-flow chart: one bar per yearly bucket plus a
/// cumulative NPV line over the same labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub cash_flow_bars: Vec<Money>,
    pub cumulative_npv_line: Vec<Money>,
}

pub fn build_chart_data(yearly: &[YearlySummary]) -> ChartData {
    ChartData {
        labels: yearly.iter().map(|y| year_label(y.year)).collect(),
        cash_flow_bars: yearly.iter().map(|y| y.cash_flow).collect(),
        cumulative_npv_line: yearly.iter().map(|y| y.cumulative_npv).collect(),
    }
}

/// A backend able to draw a chart and tear it down again.
pub trait ChartRenderer {
    type Handle;

    fn draw(&mut self, data: &ChartData) -> BusinessCaseResult<Self::Handle>;
    fn destroy(&mut self, handle: Self::Handle);
}

/// Owns a renderer and the chart currently drawn with it.
///
/// Every update destroys the previous chart before drawing the new one, so at
/// most one chart exists per view.
pub struct ChartView<R: ChartRenderer> {
    renderer: R,
    current: Option<R::Handle>,
}

impl<R: ChartRenderer> ChartView<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            current: None,
        }
    }

    pub fn update(&mut self, data: &ChartData) -> BusinessCaseResult<&R::Handle> {
        if let Some(old) = self.current.take() {
            self.renderer.destroy(old);
        }
        let handle = self.current.insert(self.renderer.draw(data)?);
        Ok(&*handle)
    }

    pub fn current(&self) -> Option<&R::Handle> {
        self.current.as_ref()
    }

    /// Tear down the current chart and hand the renderer back.
    pub fn close(mut self) -> R {
        if let Some(old) = self.current.take() {
            self.renderer.destroy(old);
        }
        self.renderer
    }
}
