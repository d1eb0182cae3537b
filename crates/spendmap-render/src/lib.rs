//! Terminal and SVG output for spending reports

pub mod pie;
pub mod table;

pub use pie::PieChart;
pub use table::Table;
