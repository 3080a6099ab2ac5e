//! ISO Section 8: Graphics
//!
//! Tests for graphics state, coordinate systems, colors, and graphics operators
//! as defined in ISO 32000-1:2008 Section 8.

pub mod test_color_spaces;
pub mod test_graphics_state;
pub mod test_paths;