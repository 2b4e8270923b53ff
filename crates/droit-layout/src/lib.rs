//! # droit-layout — Rule Tree Layout
//!
//! Turns a rule tree into positioned boxes and edges a viewer can draw
//! directly, optionally highlighting an evaluation path.
//!
//! ```text
//! calculate_layout(tree, config, path) -> TreeLayout { nodes, edges, width, height }
//! generate_edge_path(edge)             -> "M x y C ..."   (SVG path data)
//! get_path_from_trace(trace)           -> {node ids}
//! ```
//!
//! Layout is deterministic: the same tree and configuration always produce
//! the same coordinates.

pub mod config;
pub mod layout;
pub mod path;

pub use config::{LayoutConfig, LayoutError};
pub use layout::{calculate_layout, LayoutEdge, LayoutNode, Point, TreeLayout};
pub use path::{generate_edge_path, get_path_from_trace};
