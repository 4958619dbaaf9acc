pub mod indicators;
pub mod analyzer;
pub mod momentum;
pub mod chart;


pub use indicators::*;
pub use analyzer::*;
pub use momentum::*;
pub use chart::*;
