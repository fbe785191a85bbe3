pub mod record;
pub mod span;

pub use record::{LabelingTask, TextField, TextRecord};
pub use span::{BODY_PART, CandidateSpan, EntitySpan};
