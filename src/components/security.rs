//! `ddms:security` and the ISM notice elements it may carry.

use crate::attributes::{
    NoticeAttributes, NoticeAttributesBuilder, SecurityAttributes, SecurityAttributesBuilder,
};
use crate::component::{
    Builder, Component, OccurrenceRule, OutputPair, VersionRange, all_empty, child_warnings,
    commit_all, ddms_element, expect_element, list_pairs,
};
use crate::context::ValidationContext;
use crate::error::{DdmsError, Result, ValidationMessage};
use crate::version::{ISM_PREFIX, SchemaVersion};
use crate::xml::XmlElement;

const NAME: &str = "security";
const LOCATOR: &str = "/ddms:security";
const EXCLUDE_FROM_ROLLUP: &str = "excludeFromRollup";
const NOTICE_LIST: &str = "NoticeList";
const NOTICE: &str = "Notice";
const NOTICE_TEXT: &str = "NoticeText";

fn ism_element(version: SchemaVersion, local: &str) -> XmlElement {
    XmlElement::new(ISM_PREFIX, version.ism_namespace(), local)
}

fn ism_locator(local: &str) -> String {
    format!("/{}:{}", ISM_PREFIX, local)
}

/// Notices only exist from DDMS 4.0.1.
fn check_notice_version(local: &str, version: SchemaVersion) -> Result<()> {
    VersionRange::since(SchemaVersion::V4_0_1).check("element", &format!("{}:{}", ISM_PREFIX, local), version)
}

/// `ism:NoticeText`: one paragraph of a notice.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeText {
    version: SchemaVersion,
    value: String,
    poc_types: Vec<String>,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl NoticeText {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let locator = ism_locator(NOTICE_TEXT);
        let ism = ctx.ism_namespace();
        expect_element(element, ism, NOTICE_TEXT).map_err(|e| e.locate(&locator))?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate(&locator))?;
        let poc_types = element
            .attribute_value(ism, "pocType")
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self::new(element.text(), poc_types, security, ctx)
    }

    pub fn new(
        value: impl Into<String>,
        poc_types: Vec<String>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut text = Self {
            version: ctx.version(),
            value: value.into(),
            poc_types,
            security,
            warnings: Vec::new(),
        };
        let locator = ism_locator(NOTICE_TEXT);
        check_notice_version(NOTICE_TEXT, text.version)
            .and_then(|_| text.security.require_marking())
            .map_err(|e| e.locate(&locator))?;
        if text.value.trim().is_empty() {
            text.warnings.push(ValidationMessage::warning(
                "An ism:NoticeText element was found with no value.",
                locator,
            ));
        }
        Ok(text)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn poc_types(&self) -> &[String] {
        &self.poc_types
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for NoticeText {
    fn name(&self) -> &str {
        NOTICE_TEXT
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn prefix(&self) -> &str {
        ISM_PREFIX
    }

    fn namespace(&self) -> &str {
        self.version.ism_namespace()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}noticeText{}", prefix, suffix);
        let mut pairs = vec![OutputPair::new(format!("{}.value", base), &self.value)];
        if !self.poc_types.is_empty() {
            pairs.push(OutputPair::new(format!("{}.pocType", base), self.poc_types.join(" ")));
        }
        pairs.extend(self.security.output_pairs(&format!("{}.", base)));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ism_element(self.version, NOTICE_TEXT);
        self.security.add_to(&mut element, self.version);
        element.add_optional_attribute(
            ISM_PREFIX,
            self.version.ism_namespace(),
            "pocType",
            &self.poc_types.join(" "),
        );
        element.with_text(self.value.clone())
    }
}

/// `ism:Notice`: a marked notice made of one or more texts.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    version: SchemaVersion,
    texts: Vec<NoticeText>,
    notice_attributes: NoticeAttributes,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl Notice {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let locator = ism_locator(NOTICE);
        let ism = ctx.ism_namespace();
        expect_element(element, ism, NOTICE).map_err(|e| e.locate(&locator))?;
        let texts = element
            .children_named(ism, NOTICE_TEXT)
            .map(|e| NoticeText::from_xml(e, ctx))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&locator))?;
        let notice_attributes = NoticeAttributes::from_xml(element, ctx).map_err(|e| e.locate(&locator))?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate(&locator))?;
        Self::new(texts, notice_attributes, security, ctx)
    }

    pub fn new(
        texts: Vec<NoticeText>,
        notice_attributes: NoticeAttributes,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut notice = Self {
            version: ctx.version(),
            texts,
            notice_attributes,
            security,
            warnings: Vec::new(),
        };
        let locator = ism_locator(NOTICE);
        check_notice_version(NOTICE, notice.version)
            .and_then(|_| OccurrenceRule::ONE_OR_MORE.check("ism:NoticeText", notice.texts.len(), notice.version))
            .and_then(|_| notice.security.require_marking())
            .map_err(|e| e.locate(&locator))?;
        notice.warnings = child_warnings(&locator, &notice.nested_components());
        Ok(notice)
    }

    pub fn texts(&self) -> &[NoticeText] {
        &self.texts
    }

    pub fn notice_attributes(&self) -> &NoticeAttributes {
        &self.notice_attributes
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for Notice {
    fn name(&self) -> &str {
        NOTICE
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn prefix(&self) -> &str {
        ISM_PREFIX
    }

    fn namespace(&self) -> &str {
        self.version.ism_namespace()
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        self.texts.iter().map(|t| t as &dyn Component).collect()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}notice{}", prefix, suffix);
        let child_prefix = format!("{}.", base);
        let mut pairs = list_pairs(&self.texts, &child_prefix);
        pairs.extend(self.security.output_pairs(&child_prefix));
        pairs.extend(self.notice_attributes.output_pairs(&child_prefix));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ism_element(self.version, NOTICE);
        self.security.add_to(&mut element, self.version);
        self.notice_attributes.add_to(&mut element, self.version);
        for text in &self.texts {
            element.append_child(text.to_xml());
        }
        element
    }
}

/// `ism:NoticeList`.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeList {
    version: SchemaVersion,
    notices: Vec<Notice>,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

impl NoticeList {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let locator = ism_locator(NOTICE_LIST);
        let ism = ctx.ism_namespace();
        expect_element(element, ism, NOTICE_LIST).map_err(|e| e.locate(&locator))?;
        let notices = element
            .children_named(ism, NOTICE)
            .map(|e| Notice::from_xml(e, ctx))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.locate(&locator))?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(|e| e.locate(&locator))?;
        Self::new(notices, security, ctx)
    }

    pub fn new(notices: Vec<Notice>, security: SecurityAttributes, ctx: &ValidationContext) -> Result<Self> {
        let mut list = Self {
            version: ctx.version(),
            notices,
            security,
            warnings: Vec::new(),
        };
        let locator = ism_locator(NOTICE_LIST);
        check_notice_version(NOTICE_LIST, list.version)
            .and_then(|_| OccurrenceRule::ONE_OR_MORE.check("ism:Notice", list.notices.len(), list.version))
            .and_then(|_| list.security.require_marking())
            .map_err(|e| e.locate(&locator))?;
        list.warnings = child_warnings(&locator, &list.nested_components());
        Ok(list)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for NoticeList {
    fn name(&self) -> &str {
        NOTICE_LIST
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn prefix(&self) -> &str {
        ISM_PREFIX
    }

    fn namespace(&self) -> &str {
        self.version.ism_namespace()
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        self.notices.iter().map(|n| n as &dyn Component).collect()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}noticeList{}", prefix, suffix);
        let child_prefix = format!("{}.", base);
        let mut pairs = list_pairs(&self.notices, &child_prefix);
        pairs.extend(self.security.output_pairs(&child_prefix));
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ism_element(self.version, NOTICE_LIST);
        self.security.add_to(&mut element, self.version);
        for notice in &self.notices {
            element.append_child(notice.to_xml());
        }
        element
    }
}

/// `ddms:security`: the resource-level marking.
#[derive(Debug, Clone, PartialEq)]
pub struct Security {
    version: SchemaVersion,
    notice_list: Option<NoticeList>,
    security: SecurityAttributes,
    warnings: Vec<ValidationMessage>,
}

fn uses_exclude_from_rollup(version: SchemaVersion) -> bool {
    version.is_at_least(SchemaVersion::V3_0)
}

impl Security {
    pub fn from_xml(element: &XmlElement, ctx: &ValidationContext) -> Result<Self> {
        let locate = |e: DdmsError| e.locate(LOCATOR);
        expect_element(element, ctx.ddms_namespace(), NAME).map_err(locate)?;
        let exclude = element.attribute(ctx.ism_namespace(), EXCLUDE_FROM_ROLLUP);
        match (uses_exclude_from_rollup(ctx.version()), exclude) {
            (false, Some(_)) => {
                VersionRange::since(SchemaVersion::V3_0)
                    .check("attribute", EXCLUDE_FROM_ROLLUP, ctx.version())
                    .map_err(locate)?;
            }
            (true, None) => {
                return Err(locate(DdmsError::invalid("The excludeFromRollup attribute is required.")));
            }
            (true, Some(value)) if value != "true" => {
                return Err(locate(DdmsError::invalid(
                    "The excludeFromRollup attribute must have a fixed value of \"true\".",
                )));
            }
            _ => {}
        }
        let notice_list = element
            .first_child(ctx.ism_namespace(), NOTICE_LIST)
            .map(|e| NoticeList::from_xml(e, ctx))
            .transpose()
            .map_err(locate)?;
        let security = SecurityAttributes::from_xml(element, ctx).map_err(locate)?;
        Self::new(notice_list, security, ctx)
    }

    pub fn new(
        notice_list: Option<NoticeList>,
        security: SecurityAttributes,
        ctx: &ValidationContext,
    ) -> Result<Self> {
        let mut element = Self {
            version: ctx.version(),
            notice_list,
            security,
            warnings: Vec::new(),
        };
        element.security.require_marking().map_err(|e| e.locate(LOCATOR))?;
        element.warnings = child_warnings(LOCATOR, &element.nested_components());
        Ok(element)
    }

    pub fn notice_list(&self) -> Option<&NoticeList> {
        self.notice_list.as_ref()
    }

    pub fn security(&self) -> &SecurityAttributes {
        &self.security
    }
}

impl Component for Security {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn nested_components(&self) -> Vec<&dyn Component> {
        self.notice_list.iter().map(|n| n as &dyn Component).collect()
    }

    fn warnings(&self) -> &[ValidationMessage] {
        &self.warnings
    }

    fn output_pairs(&self, prefix: &str, suffix: &str) -> Vec<OutputPair> {
        let base = format!("{}{}{}", prefix, NAME, suffix);
        let child_prefix = format!("{}.", base);
        let mut pairs = Vec::new();
        if uses_exclude_from_rollup(self.version) {
            pairs.push(OutputPair::new(format!("{}.{}", base, EXCLUDE_FROM_ROLLUP), "true"));
        }
        pairs.extend(self.security.output_pairs(&child_prefix));
        if let Some(list) = &self.notice_list {
            pairs.extend(list.output_pairs(&child_prefix, ""));
        }
        pairs
    }

    fn to_xml(&self) -> XmlElement {
        let mut element = ddms_element(self.version, NAME);
        if uses_exclude_from_rollup(self.version) {
            element.add_attribute(ISM_PREFIX, self.version.ism_namespace(), EXCLUDE_FROM_ROLLUP, "true");
        }
        self.security.add_to(&mut element, self.version);
        if let Some(list) = &self.notice_list {
            element.append_child(list.to_xml());
        }
        element
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeTextBuilder {
    pub value: String,
    /// Whitespace-separated.
    pub poc_types: String,
    pub security: SecurityAttributesBuilder,
}

impl Builder for NoticeTextBuilder {
    type Output = NoticeText;

    fn is_empty(&self) -> bool {
        self.value.trim().is_empty() && self.poc_types.trim().is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<NoticeText>> {
        if self.is_empty() {
            return Ok(None);
        }
        let security = self
            .security
            .build(ctx)
            .map_err(|e| e.locate(&ism_locator(NOTICE_TEXT)))?;
        let poc_types = self.poc_types.split_whitespace().map(str::to_string).collect();
        NoticeText::new(&self.value, poc_types, security, ctx).map(Some)
    }
}

impl From<&NoticeText> for NoticeTextBuilder {
    fn from(text: &NoticeText) -> Self {
        Self {
            value: text.value.clone(),
            poc_types: text.poc_types.join(" "),
            security: SecurityAttributesBuilder::from(&text.security),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeBuilder {
    pub texts: Vec<NoticeTextBuilder>,
    pub notice_attributes: NoticeAttributesBuilder,
    pub security: SecurityAttributesBuilder,
}

impl Builder for NoticeBuilder {
    type Output = Notice;

    fn is_empty(&self) -> bool {
        all_empty(&self.texts) && self.notice_attributes.is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Notice>> {
        if self.is_empty() {
            return Ok(None);
        }
        let locator = ism_locator(NOTICE);
        let locate = |e: DdmsError| e.locate(&locator);
        Notice::new(
            commit_all(&self.texts, ctx).map_err(locate)?,
            self.notice_attributes.build(ctx).map_err(locate)?,
            self.security.build(ctx).map_err(locate)?,
            ctx,
        )
        .map(Some)
    }
}

impl From<&Notice> for NoticeBuilder {
    fn from(notice: &Notice) -> Self {
        Self {
            texts: notice.texts.iter().map(NoticeTextBuilder::from).collect(),
            notice_attributes: NoticeAttributesBuilder::from(&notice.notice_attributes),
            security: SecurityAttributesBuilder::from(&notice.security),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeListBuilder {
    pub notices: Vec<NoticeBuilder>,
    pub security: SecurityAttributesBuilder,
}

impl Builder for NoticeListBuilder {
    type Output = NoticeList;

    fn is_empty(&self) -> bool {
        all_empty(&self.notices) && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<NoticeList>> {
        if self.is_empty() {
            return Ok(None);
        }
        let locator = ism_locator(NOTICE_LIST);
        let locate = |e: DdmsError| e.locate(&locator);
        NoticeList::new(
            commit_all(&self.notices, ctx).map_err(locate)?,
            self.security.build(ctx).map_err(locate)?,
            ctx,
        )
        .map(Some)
    }
}

impl From<&NoticeList> for NoticeListBuilder {
    fn from(list: &NoticeList) -> Self {
        Self {
            notices: list.notices.iter().map(NoticeBuilder::from).collect(),
            security: SecurityAttributesBuilder::from(&list.security),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityBuilder {
    pub notice_list: NoticeListBuilder,
    pub security: SecurityAttributesBuilder,
}

impl Builder for SecurityBuilder {
    type Output = Security;

    fn is_empty(&self) -> bool {
        self.notice_list.is_empty() && self.security.is_empty()
    }

    fn commit(&self, ctx: &ValidationContext) -> Result<Option<Security>> {
        if self.is_empty() {
            return Ok(None);
        }
        let locate = |e: DdmsError| e.locate(LOCATOR);
        Security::new(
            self.notice_list.commit(ctx).map_err(locate)?,
            self.security.build(ctx).map_err(locate)?,
            ctx,
        )
        .map(Some)
    }
}

impl From<&Security> for SecurityBuilder {
    fn from(security: &Security) -> Self {
        Self {
            notice_list: security
                .notice_list
                .as_ref()
                .map(NoticeListBuilder::from)
                .unwrap_or_default(),
            security: SecurityAttributesBuilder::from(&security.security),
        }
    }
}
