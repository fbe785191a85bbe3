pub mod align;
pub mod bilou;

pub use align::{AlignOptions, Alignment, spans_from_tags, tags_from_offsets};
pub use bilou::{BilouTag, TagKind};
