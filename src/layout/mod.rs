//! Auto-layout: converting the graph into a layout request and mapping the result
//! back to position changes.
//!
//! The engine runs behind an async boundary. The model hands out a request, awaits
//! any `LayoutEngine`, and applies the result as one grouped change.

pub mod adapter;
pub mod layered;
pub mod request;

pub use adapter::{MeasuredSizes, build_layout_request, graph_center, position_changes, recentered};
pub use layered::LayeredLayout;
pub use request::{LayoutConfig, LayoutEdge, LayoutNode, LayoutOptions, LayoutRequest, LayoutResult, PositionedNode};

use crate::error::LayoutError;
use async_trait::async_trait;

/// An external or in-process layout algorithm.
#[async_trait]
pub trait LayoutEngine: Send + Sync {
    async fn layout(&self, request: LayoutRequest) -> Result<LayoutResult, LayoutError>;
}
