// Glossary subsystem: key normalization, dictionary loading, the per-script
// term index and the resolver that matches subtitle text against it.

pub mod index;
pub mod loader;
pub mod normalize;
pub mod resolver;

pub use index::{GlossaryEntry, TermIndex};
pub use resolver::{GlossaryHit, GlossaryResolver};
