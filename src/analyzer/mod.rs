pub mod form;
pub mod machine;
pub mod state;

pub use form::{FormFault, FormGates, FormVerdict};
pub use machine::{DebugInfo, FrameAnalysis, SitUpAnalyzer};
pub use state::{Phase, RepWindow};
