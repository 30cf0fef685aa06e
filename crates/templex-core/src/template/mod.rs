//! Templating settings: where to look on a document and what to read there.

mod file;
mod region;
mod registry;
mod settings;
mod spec;

pub use file::TemplateFile;
pub use region::{DecodingRegion, RegionCatalog, DEFAULT_CLASS};
pub use registry::{ParserRegistry, DEFAULT_GROUP};
pub use settings::{ConfigWarning, TemplatingSettings};
pub use spec::{
    DateFormat, DateParserSettings, DatePart, IbanParserSettings, ParserKind, ParserSpec,
    RawParserSettings, RegexParserSettings, DEFAULT_DATE_SEPARATORS,
};
