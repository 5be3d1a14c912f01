//! The contract shared by every modeled DDMS element.
//!
//! A component is built either from a parsed [`XmlElement`] or from raw field
//! values; both paths end in the same validation routine before the value is
//! handed to the caller, so a component that exists is valid. Warnings are
//! computed once validation has succeeded and merged upward with the child's
//! locator prefixed.
//!
//! All three output formats are produced from one ordered list of
//! [`OutputPair`]s, which keeps them in step with each other.

use serde::{Deserialize, Serialize};

use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::{DDMS_PREFIX, SchemaVersion};
use crate::xml::XmlElement;

/// One rendered `(name, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPair {
    pub name: String,
    pub value: String,
}

impl OutputPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    Json,
    Html,
    Text,
}

/// Format an ordered pair list.
pub fn render_pairs(pairs: &[OutputPair], format: RenderFormat) -> String {
    match format {
        RenderFormat::Json => serde_json::to_string_pretty(pairs).unwrap_or_default(),
        RenderFormat::Html => pairs
            .iter()
            .map(|p| {
                format!(
                    "<meta name=\"{}\" content=\"{}\" />\n",
                    escape_html(&p.name),
                    escape_html(&p.value)
                )
            })
            .collect(),
        RenderFormat::Text => pairs
            .iter()
            .map(|p| format!("{}: {}\n", p.name, p.value))
            .collect(),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub trait Component {
    /// Local element name for this component's version.
    fn name(&self) -> &str;

    fn version(&self) -> SchemaVersion;

    fn prefix(&self) -> &str {
        DDMS_PREFIX
    }

    fn namespace(&self) -> &str {
        self.version().ddms_namespace()
    }

    fn qualified_name(&self) -> String {
        format!("{}:{}", self.prefix(), self.name())
    }

    /// Locator used on errors and warnings raised by this component.
    fn locator(&self) -> String {
        format!("/{}", self.qualified_name())
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        Vec::new()
    }

    /// Own warnings plus every nested component's, located from this element down.
    fn warnings(&self) -> &[ValidationMessage];

    /// Ordered output pairs, named `<prefix><name><suffix>...`.
    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair>;

    fn to_xml(&self) -> XmlElement;

    fn to_xml_string(&self) -> String {
        self.to_xml().to_xml_string()
    }

    fn render(&self, format: RenderFormat) -> String {
        render_pairs(&self.output_pairs("", ""), format)
    }
}

/// Mutable staging counterpart of a component.
pub trait Builder {
    type Output;

    /// True when neither this builder nor any child builder holds data.
    fn is_empty(&self) -> bool;

    /// `Ok(None)` when empty; otherwise the raw-values constructor's outcome.
    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Self::Output>>;
}

/// Grow `list` with default builders until it holds at least `len` entries.
pub fn ensure_len<T: Default>(list: &mut Vec<T>, len: usize) {
    while list.len() < len {
        list.push(T::default());
    }
}

/// Mutable access to `list[index]`, growing the list first when needed.
pub fn get_mut_or_grow<T: Default>(list: &mut Vec<T>, index: usize) -> &mut T {
    ensure_len(list, index + 1);
    &mut list[index]
}

pub fn all_empty<B: Builder>(builders: &[B]) -> bool {
    builders.iter().all(Builder::is_empty)
}

/// Commit every non-empty builder, keeping order.
pub fn commit_all<B: Builder>(builders: &[B], ctx: &ValidationContext) -> Result<Vec<B::Output>> {
    let mut committed = Vec::with_capacity(builders.len());
    for builder in builders {
        if let Some(component) = builder.commit(ctx)? {
            committed.push(component);
        }
    }
    Ok(committed)
}

/// Inclusive range of versions in which something is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    pub since: Option<SchemaVersion>,
    pub until: Option<SchemaVersion>,
}

impl VersionRange {
    pub const ALL: VersionRange = VersionRange {
        since: None,
        until: None,
    };

    pub const fn since(version: SchemaVersion) -> Self {
        Self {
            since: Some(version),
            until: None,
        }
    }

    pub const fn until(version: SchemaVersion) -> Self {
        Self {
            since: None,
            until: Some(version),
        }
    }

    pub const fn only(version: SchemaVersion) -> Self {
        Self {
            since: Some(version),
            until: Some(version),
        }
    }

    pub fn contains(&self, version: SchemaVersion) -> bool {
        self.since.is_none_or(|since| version >= since)
            && self.until.is_none_or(|until| version <= until)
    }

    /// `what` is "attribute" or "element".
    pub fn check(&self, what: &str, name: &str, version: SchemaVersion) -> Result<()> {
        if let Some(since) = self.since
            && version < since
        {
            return Err(DdmsError::invalid(format!(
                "The {} {} cannot be used until DDMS {} or later.",
                name, what, since
            )));
        }
        if let Some(until) = self.until
            && version > until
        {
            return Err(DdmsError::invalid(format!(
                "The {} {} can only be used in DDMS {} or earlier.",
                name, what, until
            )));
        }
        Ok(())
    }
}

/// Cardinality of a child slot in one version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccurrenceRule {
    pub min: usize,
    pub max: Option<usize>,
    pub legal: VersionRange,
}

impl OccurrenceRule {
    pub const fn new(min: usize, max: Option<usize>) -> Self {
        Self {
            min,
            max,
            legal: VersionRange::ALL,
        }
    }

    pub const OPTIONAL: OccurrenceRule = OccurrenceRule::new(0, Some(1));
    pub const EXACTLY_ONE: OccurrenceRule = OccurrenceRule::new(1, Some(1));
    pub const ONE_OR_MORE: OccurrenceRule = OccurrenceRule::new(1, None);
    pub const ANY: OccurrenceRule = OccurrenceRule::new(0, None);

    pub const fn legal(mut self, range: VersionRange) -> Self {
        self.legal = range;
        self
    }

    pub fn check(&self, name: &str, count: usize, version: SchemaVersion) -> Result<()> {
        if count > 0 {
            self.legal.check("element", name, version)?;
        }
        if count < self.min {
            return Err(DdmsError::invalid(if self.min == 1 {
                format!("At least 1 {} is required.", name)
            } else {
                format!("At least {} {} elements are required.", self.min, name)
            }));
        }
        if let Some(max) = self.max
            && count > max
        {
            return Err(DdmsError::invalid(if max == 1 {
                format!("Only 1 {} can be used.", name)
            } else {
                format!("No more than {} {} elements can be used.", max, name)
            }));
        }
        Ok(())
    }
}

pub fn require_value(value: &str, description: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(DdmsError::invalid(format!("{} is required.", description)))
    } else {
        Ok(())
    }
}

/// Non-empty and free of whitespace, which is as much URI syntax as DDMS cares about.
pub fn require_uri(value: &str, description: &str) -> Result<()> {
    require_value(value, description)?;
    if value.chars().any(char::is_whitespace) {
        return Err(DdmsError::invalid(format!("Invalid URI ({})", value)));
    }
    Ok(())
}

/// Fail unless `element` is `{namespace}local`.
pub fn expect_element(element: &XmlElement, namespace: &str, local: &str) -> Result<()> {
    if element.is(namespace, local) {
        Ok(())
    } else {
        Err(DdmsError::invalid(format!(
            "Unexpected namespace URI and local name encountered: {{{}}}{}. Expected {{{}}}{}.",
            element.namespace(),
            element.local_name(),
            namespace,
            local
        )))
    }
}

/// `xs:boolean` value; "" reads as absent.
pub fn parse_bool(value: &str, name: &str) -> Result<Option<bool>> {
    match value.trim() {
        "" => Ok(None),
        "true" | "1" => Ok(Some(true)),
        "false" | "0" => Ok(Some(false)),
        _ => Err(DdmsError::invalid(format!(
            "The {} attribute must be a boolean.",
            name
        ))),
    }
}

pub fn ddms_element(version: SchemaVersion, local: &str) -> XmlElement {
    XmlElement::new(DDMS_PREFIX, version.ddms_namespace(), local)
}

/// `<ddms:local>text</ddms:local>`.
pub fn ddms_text_element(version: SchemaVersion, local: &str, text: &str) -> XmlElement {
    ddms_element(version, local).with_text(text)
}

pub fn add_ddms_attribute(element: &mut XmlElement, version: SchemaVersion, local: &str, value: &str) {
    element.add_optional_attribute(DDMS_PREFIX, version.ddms_namespace(), local, value);
}

/// Texts of every `ddms:local` child.
pub fn child_texts(element: &XmlElement, version: SchemaVersion, local: &str) -> Vec<String> {
    element
        .children_named(version.ddms_namespace(), local)
        .map(|c| c.text())
        .collect()
}

pub fn push_pair(out: &mut Vec<OutputPair>, name: String, value: &str) {
    if !value.is_empty() {
        out.push(OutputPair::new(name, value));
    }
}

/// Suffix for item `index` of a list of `len` children: none for single items,
/// otherwise a 1-based `[n]`.
pub fn list_suffix(index: usize, len: usize) -> String {
    if len > 1 {
        format!("[{}]", index + 1)
    } else {
        String::new()
    }
}

/// Output pairs of a homogeneous child list.
pub fn list_pairs<C: Component>(items: &[C], prefix: &str) -> Vec<OutputPair> {
    items
        .iter()
        .enumerate()
        .flat_map(|(i, item)| item.output_pairs(prefix, &list_suffix(i, items.len())))
        .collect()
}

/// Warnings of `children`, re-located under `locator`.
pub fn child_warnings(locator: &str, children: &[&dyn Component]) -> Vec<ValidationMessage> {
    children
        .iter()
        .flat_map(|c| c.warnings().iter().map(|w| w.with_prefix(locator)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_range() {
        let range = VersionRange::since(SchemaVersion::V3_1);
        assert!(!range.contains(SchemaVersion::V3_0));
        assert!(range.contains(SchemaVersion::V4_1));
        let err = range
            .check("attribute", "compliesWith", SchemaVersion::V3_0)
            .unwrap_err();
        assert_eq!(
            err.message(),
            "The compliesWith attribute cannot be used until DDMS 3.1 or later."
        );

        let range = VersionRange::until(SchemaVersion::V3_0);
        let err = range
            .check("attribute", "typeOfExemptedSource", SchemaVersion::V3_1)
            .unwrap_err();
        assert_eq!(
            err.message(),
            "The typeOfExemptedSource attribute can only be used in DDMS 3.0 or earlier."
        );
        assert!(VersionRange::only(SchemaVersion::V2_0).contains(SchemaVersion::V2_0));
        assert!(!VersionRange::only(SchemaVersion::V2_0).contains(SchemaVersion::V3_0));
    }

    #[test]
    fn test_occurrence_rule_messages() {
        let version = SchemaVersion::V4_1;
        let err = OccurrenceRule::ONE_OR_MORE
            .check("ddms:identifier", 0, version)
            .unwrap_err();
        assert_eq!(err.message(), "At least 1 ddms:identifier is required.");

        let err = OccurrenceRule::OPTIONAL
            .check("ddms:format", 2, version)
            .unwrap_err();
        assert_eq!(err.message(), "Only 1 ddms:format can be used.");

        let err = OccurrenceRule::new(0, Some(3))
            .check("ddms:thing", 4, version)
            .unwrap_err();
        assert_eq!(err.message(), "No more than 3 ddms:thing elements can be used.");

        OccurrenceRule::ANY.check("ddms:source", 7, version).unwrap();

        let gated = OccurrenceRule::ANY.legal(VersionRange::since(SchemaVersion::V4_1));
        gated.check("ddms:nonStateActor", 0, SchemaVersion::V3_0).unwrap();
        assert!(gated.check("ddms:nonStateActor", 1, SchemaVersion::V3_0).is_err());
    }

    #[test]
    fn test_ensure_len_and_grow() {
        let mut list: Vec<String> = Vec::new();
        ensure_len(&mut list, 2);
        assert_eq!(list.len(), 2);
        *get_mut_or_grow(&mut list, 4) = "five".to_string();
        assert_eq!(list.len(), 5);
        assert_eq!(list[4], "five");
        ensure_len(&mut list, 1);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("", "x").unwrap(), None);
        assert_eq!(parse_bool("true", "x").unwrap(), Some(true));
        assert_eq!(parse_bool("0", "x").unwrap(), Some(false));
        assert!(parse_bool("yes", "x").is_err());
    }

    #[test]
    fn test_require_uri() {
        require_uri("http://example.mil/id", "qualifier").unwrap();
        assert_eq!(
            require_uri("", "qualifier").unwrap_err().message(),
            "qualifier is required."
        );
        assert!(require_uri("not a uri", "qualifier").is_err());
    }

    #[test]
    fn test_render_formats_share_pairs() {
        let pairs = vec![
            OutputPair::new("title", "A & B"),
            OutputPair::new("title.classification", "U"),
        ];
        assert_eq!(
            render_pairs(&pairs, RenderFormat::Text),
            "title: A & B\ntitle.classification: U\n"
        );
        assert_eq!(
            render_pairs(&pairs, RenderFormat::Html),
            "<meta name=\"title\" content=\"A &amp; B\" />\n\
             <meta name=\"title.classification\" content=\"U\" />\n"
        );
        let parsed: Vec<OutputPair> =
            serde_json::from_str(&render_pairs(&pairs, RenderFormat::Json)).unwrap();
        assert_eq!(parsed, pairs);
    }

    #[test]
    fn test_list_suffix() {
        assert_eq!(list_suffix(0, 1), "");
        assert_eq!(list_suffix(0, 2), "[1]");
        assert_eq!(list_suffix(1, 2), "[2]");
    }
}
