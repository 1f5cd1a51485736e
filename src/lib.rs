pub mod config;
pub mod dump;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod solver;

pub use config::{DiagramFamily, LayoutAlgorithm, LayoutConfig, LayoutDirection, LayoutOverrides};
pub use error::{LayoutError, Result};
pub use layout::{
    EdgeRoute, LayoutEdge, LayoutNode, LayoutResult, RoutingMode, apply_layout,
    apply_recommended_layout,
};
