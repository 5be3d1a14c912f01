use crate::component::{
    Builder, Component, OutputPair, add_ddms_attribute, child_warnings, ddms_element,
    ddms_text_element, expect_element, push_pair, require_value,
};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "format";
const LOCATOR: &str = "/ddms:format";
const EXTENT: &str = "extent";
const EXTENT_LOCATOR: &str = "/ddms:extent";
/// Wrapper between `ddms:format` and its content up to DDMS 3.1.
const MEDIA: &str = "Media";

fn has_media_wrapper(version: SchemaVersion) -> bool {
    !version.is_at_least(SchemaVersion::V4_0_1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    version: SchemaVersion,
    qualifier: String,
    value: String,
    warnings: Vec<ValidationMessage>,
}

impl Extent {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, EXTENT).map_err(|e| e.locate(EXTENT_LOCATOR))?;
        Self::new(
            element.attribute_value(ns, "qualifier"),
            element.attribute_value(ns, "value"),
            ctx,
        )
    }

    pub fn new(qualifier: impl Into<String>, value: impl Into<String>, ctx: &ValidationContext) -> Result<Self> {
        let mut extent = Self {
            version: ctx.version(),
            qualifier: qualifier.into(),
            value: value.into(),
            warnings: Vec::new(),
        };
        if !extent.value.is_empty() && extent.qualifier.is_empty() {
            return Err(
                DdmsError::invalid("A qualifier must exist when a value is set.").locate(EXTENT_LOCATOR),
            );
        }
        if extent.qualifier.is_empty() && extent.value.is_empty() {
            extent.warnings.push(ValidationMessage::warning(
                "A completely empty ddms:extent element was found.",
                EXTENT_LOCATOR,
            ));
        }
        Ok(extent)
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Component for Extent {
    fn name(&self) -> &str {
        EXTENT
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, EXTENT, suffix);
        let mut pairs = Vec::new();
        push_pair(&mut pairs, format!("{}.qualifier", base), &self.qualifier);
        push_pair(&mut pairs, format!("{}.value", base), &self.value);
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, EXTENT);
        add_ddms_attribute(&mut element, self.version, "qualifier", &self.qualifier);
        add_ddms_attribute(&mut element, self.version, "value", &self.value);
        element
    }
}

/// `ddms:format`: the mime type of the resource, with optional extent and medium.
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    version: SchemaVersion,
    mime_type: String,
    extent: Option<Extent>,
    medium: String,
    warnings: Vec<ValidationMessage>,
}

impl Format {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        expect_element(element, ns, NAME).map_err(|e| e.locate(LOCATOR))?;
        let content = if has_media_wrapper(ctx.version()) {
            element.first_child(ns, MEDIA).ok_or_else(|| {
                DdmsError::invalid("A ddms:Media element is required.").locate(LOCATOR)
            })?
        } else {
            element
        };
        let extent = content
            .first_child(ns, EXTENT)
            .map(|e| Extent::from_xml(e, ctx))
            .transpose()
            .map_err(|e| e.locate(LOCATOR))?;
        Self::new(
            content.child_text(ns, "mimeType"),
            extent,
            content.child_text(ns, "medium"),
            ctx,
        )
    }

    pub fn new(
        mime_type: impl Into<String>,
        extent: Option<Extent>,
        medium: impl Into<String>,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut format = Self {
            version: ctx.version(),
            mime_type: mime_type.into(),
            extent,
            medium: medium.into(),
            warnings: Vec::new(),
        };
        require_value(&format.mime_type, "mimeType").map_err(|e| e.locate(LOCATOR))?;
        format.warnings = child_warnings(LOCATOR, &format.nested_components());
        Ok(format)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn extent(&self) -> Option<&Extent> {
        self.extent.as_ref()
    }

    pub fn medium(&self) -> &str {
        &self.medium
    }
}

impl Component for Format {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        self.extent.iter().map(|e| e as &dyn Component).collect()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, NAME, suffix);
        let mut pairs = Vec::new();
        push_pair(&mut pairs, format!("{}.mimeType", base), &self.mime_type);
        if let Some(extent) = &self.extent {
            pairs.extend(extent.output_pairs(&format!("{}.", base), ""));
        }
        push_pair(&mut pairs, format!("{}.medium", base), &self.medium);
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut content = if has_media_wrapper(self.version) {
            ddms_element(self.version, MEDIA)
        } else {
            ddms_element(self.version, NAME)
        };
        content.append_child(ddms_text_element(self.version, "mimeType", &self.mime_type));
        if let Some(extent) = &self.extent {
            content.append_child(extent.to_xml());
        }
        if !self.medium.is_empty() {
            content.append_child(ddms_text_element(self.version, "medium", &self.medium));
        }
        if has_media_wrapper(self.version) {
            ddms_element(self.version, NAME).with_child(content)
        } else {
            content
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtentBuilder {
    pub qualifier: String,
    pub value: String,
}

impl Builder for ExtentBuilder {
    type Output = Extent;

    fn is_empty(&self) -> bool {
        self.qualifier.trim().is_empty() && self.value.trim().is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Extent>> {
        if self.is_empty() {
            return Ok(None);
        }
        Extent::new(&self.qualifier, &self.value, ctx).map(Some)
    }
}

impl From<&Extent> for ExtentBuilder {
    fn from(extent: &Extent) -> Self {
        Self {
            qualifier: extent.qualifier.clone(),
            value: extent.value.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatBuilder {
    pub mime_type: String,
    pub extent: ExtentBuilder,
    pub medium: String,
}

impl Builder for FormatBuilder {
    type Output = Format;

    fn is_empty(&self) -> bool {
        self.mime_type.trim().is_empty() && self.extent.is_empty() && self.medium.trim().is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Format>> {
        if self.is_empty() {
            return Ok(None);
        }
        let extent = self.extent.commit(ctx).map_err(|e| e.locate(LOCATOR))?;
        Format::new(&self.mime_type, extent, &self.medium, ctx).map(Some)
    }
}

impl From<&Format> for FormatBuilder {
    fn from(format: &Format) -> Self {
        Self {
            mime_type: format.mime_type.clone(),
            extent: format.extent.as_ref().map(ExtentBuilder::from).unwrap_or_default(),
            medium: format.medium.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ctx, xmlns};

    fn sample(ctx: &ValidationContext) -> Format {
        let extent = Extent::new("sizeBytes", "75000", ctx).unwrap();
        Format::new("text/xml", Some(extent), "digital", ctx).unwrap()
    }

    #[test]
    fn test_media_wrapper_before_ddms_4() {
        let version = SchemaVersion::V3_1;
        let xml = format!(
            r#"<ddms:format {}><ddms:Media><ddms:mimeType>text/xml</ddms:mimeType><ddms:extent ddms:qualifier="sizeBytes" ddms:value="75000"/><ddms:medium>digital</ddms:medium></ddms:Media></ddms:format>"#,
            xmlns(version)
        );
        let format = Format::from_xml(&XmlElement::parse(&xml).unwrap(), &ctx(version)).unwrap();
        assert_eq!(format.mime_type(), "text/xml");
        assert_eq!(format.extent().unwrap().value(), "75000");
        assert_eq!(format.medium(), "digital");
        assert!(format.to_xml_string().contains("<ddms:Media>"));
    }

    #[test]
    fn test_no_wrapper_in_ddms_4() {
        let ctx = ctx(SchemaVersion::V4_1);
        let format = sample(&ctx);
        let xml = format.to_xml_string();
        assert!(!xml.contains("Media"));
        let reparsed = Format::from_xml(&XmlElement::parse(&xml).unwrap(), &ctx).unwrap();
        assert_eq!(reparsed, format);
    }

    #[test]
    fn test_mime_type_required() {
        let err = Format::new("", None, "", &ctx(SchemaVersion::V4_1)).unwrap_err();
        assert_eq!(err.message(), "mimeType is required.");
        assert_eq!(err.locator(), Some(LOCATOR));
    }

    #[test]
    fn test_extent_errors_and_warnings_are_located() {
        let version = SchemaVersion::V4_1;
        let xml = format!(
            r#"<ddms:format {}><ddms:mimeType>text/xml</ddms:mimeType><ddms:extent ddms:value="1"/></ddms:format>"#,
            xmlns(version)
        );
        let err = Format::from_xml(&XmlElement::parse(&xml).unwrap(), &ctx(version)).unwrap_err();
        assert_eq!(err.locator(), Some("/ddms:format/ddms:extent"));

        let ctx = ctx(version);
        let format = Format::new("text/xml", Some(Extent::new("", "", &ctx).unwrap()), "", &ctx).unwrap();
        assert_eq!(format.warnings().len(), 1);
        assert_eq!(format.warnings()[0].locator, "/ddms:format/ddms:extent");
    }

    #[test]
    fn test_output_pairs() {
        let format = sample(&ctx(SchemaVersion::V4_1));
        let names: Vec<_> = format.output_pairs("", "").into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "format.mimeType",
                "format.extent.qualifier",
                "format.extent.value",
                "format.medium"
            ]
        );
    }

    #[test]
    fn test_builder_round_trip() {
        for version in SchemaVersion::ALL {
            let ctx = ctx(version);
            let format = sample(&ctx);
            assert_eq!(FormatBuilder::from(&format).commit(&ctx).unwrap(), Some(format));
        }
    }
}
