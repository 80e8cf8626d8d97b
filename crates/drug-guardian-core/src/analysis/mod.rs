//! Pure functions over prediction text: severity, segmentation and the
//! results view model built from them.

mod report;
mod segmenter;
mod severity;

pub use report::*;
pub use segmenter::*;
pub use severity::*;
