//! Speech synthesis backends.
//!
//! A backend turns one segment's text into a WAV file. Backends that cannot
//! be driven from several threads at once report
//! [`Synthesizer::is_parallel_capable`] as `false`; the scheduler then
//! serializes their calls behind a single lock.

pub mod local;
pub mod playht;
pub mod registry;

pub use local::LocalSynthesizer;
pub use playht::PlayHtSynthesizer;
pub use registry::{BackendFactory, BackendRegistry};

use std::path::Path;

/// A text-to-speech backend.
pub trait Synthesizer: Send + Sync {
    /// Registry name of this backend.
    fn name(&self) -> &str;

    /// Speak `text` into a WAV file at `output`, replacing any existing file.
    fn synthesize(&self, text: &str, output: &Path) -> anyhow::Result<()>;

    /// Whether concurrent calls to [`Synthesizer::synthesize`] are safe.
    fn is_parallel_capable(&self) -> bool;
}
