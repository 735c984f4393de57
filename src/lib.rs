//! Collision-free arrangement of canvas branches.
//!
//! A branch owns one or more frames (positioned rectangles). Arranging moves
//! each branch's frames as one rigid group so that the groups sit side by side
//! along an axis, stay inside the workspace bounds and never overlap.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
