use crate::component::{
    Builder, Component, OutputPair, add_ddms_attribute, ddms_element, expect_element, parse_bool,
};
use crate::context::ValidationContext;
use crate::error::{Result, ValidationMessage};
use crate::version::SchemaVersion;
use crate::xml::XmlElement;

const NAME: &str = "rights";
const LOCATOR: &str = "/ddms:rights";

/// `ddms:rights`: three flags, all defaulting to false.
#[derive(Debug, Clone, PartialEq)]
pub struct Rights {
    version: SchemaVersion,
    privacy_act: bool,
    intellectual_property: bool,
    copyright: bool,
}

impl Rights {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let ns = ctx.ddms_namespace();
        let read = |name: &str| -> Result<bool> {
            Ok(parse_bool(&element.attribute_value(ns, name), name)?.unwrap_or(false))
        };
        let flags = expect_element(element, ns, NAME).and_then(|_| {
            Ok((read("privacyAct")?, read("intellectualProperty")?, read("copyright")?))
        });
        let (privacy_act, intellectual_property, copyright) = flags.map_err(|e| e.locate(LOCATOR))?;
        Ok(Self::new(privacy_act, intellectual_property, copyright, ctx))
    }

    pub fn new(
        privacy_act: bool,
        intellectual_property: bool,
        copyright: bool,
        ctx: &ValidationContext,
    ) -> Self {
        Self {
            version: ctx.version(),
            privacy_act,
            intellectual_property,
            copyright,
        }
    }

    pub fn privacy_act(&self) -> bool {
        self.privacy_act
    }

    pub fn intellectual_property(&self) -> bool {
        self.intellectual_property
    }

    pub fn copyright(&self) -> bool {
        self.copyright
    }

    fn flags(&self) -> [(&'static str, bool); 3] {
        [
            ("privacyAct", self.privacy_act),
            ("intellectualProperty", self.intellectual_property),
            ("copyright", self.copyright),
        ]
    }
}

impl Component for Rights {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &[]
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, NAME, suffix);
        self.flags()
            .into_iter()
            .map(|(name, flag)| OutputPair::new(format!("{}.{}", base, name), flag.to_string()))
            .collect()
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, NAME);
        for (name, flag) in self.flags() {
            add_ddms_attribute(&mut element, self.version, name, &flag.to_string());
        }
        element
    }
}

/// Rights has no invalid states; a builder is empty only while no flag is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RightsBuilder {
    pub privacy_act: bool,
    pub intellectual_property: bool,
    pub copyright: bool,
}

impl Builder for RightsBuilder {
    type Output = Rights;

    fn is_empty(&self) -> bool {
        !(self.privacy_act || self.intellectual_property || self.copyright)
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Rights>> {
        if self.is_empty() {
            return Ok(None);
        }
        Ok(Some(Rights::new(
            self.privacy_act,
            self.intellectual_property,
            self.copyright,
            ctx,
        )))
    }
}

impl From<&Rights> for RightsBuilder {
    fn from(rights: &Rights) -> Self {
        Self {
            privacy_act: rights.privacy_act,
            intellectual_property: rights.intellectual_property,
            copyright: rights.copyright,
        }
    }
}
