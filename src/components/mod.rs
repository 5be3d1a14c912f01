//! Concrete DDMS elements.
//!
//! Every type here follows the same pattern: `from_xml` gathers raw values and
//! hands them to `new`, which runs the checks, errors are located at the element's
//! qualified name, and a `*Builder` counterpart stages raw values.

pub mod dates;
pub mod extensible;
pub mod format;
pub mod geospatial;
pub mod identifier;
pub mod language;
pub mod producer;
pub mod related;
pub mod rights;
pub mod security;
pub mod source;
pub mod subject;
pub mod temporal;
pub mod text;
pub mod type_;
pub mod virtual_coverage;

pub use dates::{Dates, DatesBuilder};
pub use extensible::{ExtensibleElement, ExtensibleElementBuilder};
pub use format::{Extent, ExtentBuilder, Format, FormatBuilder};
pub use geospatial::{
    BoundingBox, BoundingBoxBuilder, CountryCode, CountryCodeBuilder, GeographicIdentifier,
    GeographicIdentifierBuilder, GeospatialCoverage, GeospatialCoverageBuilder,
};
pub use identifier::{Identifier, IdentifierBuilder};
pub use language::{Language, LanguageBuilder};
pub use producer::{Entity, EntityBuilder, EntityKind, ProducerKind, ProducerRole, ProducerRoleBuilder};
pub use related::{Link, LinkBuilder, RelatedResource, RelatedResourceBuilder};
pub use rights::{Rights, RightsBuilder};
pub use security::{
    Notice, NoticeBuilder, NoticeList, NoticeListBuilder, NoticeText, NoticeTextBuilder, Security,
    SecurityBuilder,
};
pub use source::{Source, SourceBuilder};
pub use subject::{
    Category, CategoryBuilder, Keyword, KeywordBuilder, NonStateActor, NonStateActorBuilder,
    ProductionMetric, ProductionMetricBuilder, SubjectCoverage, SubjectCoverageBuilder,
};
pub use temporal::{TemporalCoverage, TemporalCoverageBuilder};
pub use text::{TextElement, TextElementBuilder, TextKind};
pub use type_::{Type, TypeBuilder};
pub use virtual_coverage::{VirtualCoverage, VirtualCoverageBuilder};
