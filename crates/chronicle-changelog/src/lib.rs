//! Chronicle Changelog - Changelog generation from conventional commits
//!
//! This crate provides commit parsing, the display transform, grouping and
//! ordering, the template engine and the generator that ties them together
//! over a git history.

pub mod generator;
pub mod parser;
pub mod policy;
pub mod preset;
pub mod template;
pub mod transform;
pub mod types;

pub use generator::{ChangelogGenerator, GenerateOptions, PackageSelector};
pub use parser::{CommitParser, ConventionalParser, ParserOptions};
pub use policy::WriterPolicy;
pub use preset::{load_preset, Preset, TemplatePaths, WriterOptions};
pub use template::{Template, TemplateSet};
pub use transform::{transform, TransformFn};
pub use types::{CommitGroup, Note, NoteEntry, NoteGroup, ParsedCommit, Reference, Revert};
