//! crdforge Engine - the manifest synthesizer
//!
//! One generic pipeline replaces the per-kind boilerplate this tool exists
//! to eliminate: `decode` walks configuration against a compiled attribute
//! tree, and `Synthesizer` turns a clean decode into a canonical YAML
//! manifest with the kind's fixed `apiVersion`/`kind` stamped on.

pub mod decode;
pub mod error;
pub mod suggestions;
pub mod synth;

pub use decode::{DecodeResult, decode};
pub use error::EngineError;
pub use synth::{SynthesizedManifest, Synthesizer};
