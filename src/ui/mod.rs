// Terminal output

pub mod dashboard;

pub use dashboard::{render_frame, render_row, sparkline};
