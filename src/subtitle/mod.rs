// Caption generation
//
// - Chunker: groups timed words into caption-sized chunks
// - Vtt: renders chunks as WebVTT and writes the caption files

pub mod chunker;
pub mod vtt;

pub use chunker::*;
pub use vtt::*;
