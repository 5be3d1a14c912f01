//! Shared fixtures for unit tests.

use std::sync::{Arc, OnceLock};

use crate::attributes::{SecurityAttributes, SecurityField};
use crate::context::ValidationContext;
use crate::version::SchemaVersion;
use crate::vocabulary::ControlledVocabularies;

pub fn data_dir() -> String {
    format!("{}/data", env!("CARGO_MANIFEST_DIR"))
}

fn shared_vocabularies() -> Arc<ControlledVocabularies> {
    static VOCABULARIES: OnceLock<Arc<ControlledVocabularies>> = OnceLock::new();
    VOCABULARIES
        .get_or_init(|| Arc::new(ControlledVocabularies::from_directory(data_dir())))
        .clone()
}

pub fn ctx(version: SchemaVersion) -> ValidationContext {
    ValidationContext::new(version, shared_vocabularies())
}

/// `classification="U" ownerProducer="USA"`.
pub fn unclassified(ctx: &ValidationContext) -> SecurityAttributes {
    SecurityAttributes::new(
        [
            (SecurityField::Classification, "U".to_string()),
            (SecurityField::OwnerProducer, "USA".to_string()),
        ],
        ctx,
    )
    .unwrap()
}

/// Namespace declarations for hand-written fixtures at `version`.
pub fn xmlns(version: SchemaVersion) -> String {
    let ns = version.namespaces();
    let mut decls = format!(
        "xmlns:ddms=\"{}\" xmlns:ism=\"{}\" xmlns:xlink=\"{}\"",
        ns.ddms, ns.ism, ns.xlink
    );
    if let Some(ntk) = ns.ntk {
        decls.push_str(&format!(" xmlns:ntk=\"{}\"", ntk));
    }
    if let Some(virt) = ns.virt {
        decls.push_str(&format!(" xmlns:virt=\"{}\"", virt));
    }
    decls
}

const MARKED: &str = r#"ism:classification="U" ism:ownerProducer="USA""#;

pub fn creator(version: SchemaVersion) -> String {
    let person = if version.is_at_least(SchemaVersion::V4_0_1) { "person" } else { "Person" };
    format!(
        "<ddms:creator><ddms:{p}><ddms:name>Brian</ddms:name><ddms:surname>Uri</ddms:surname></ddms:{p}></ddms:creator>",
        p = person
    )
}

/// `ddms:subjectCoverage` around `content`, with the `ddms:Subject` wrapper where needed.
pub fn subject(version: SchemaVersion, content: &str) -> String {
    if version.is_at_least(SchemaVersion::V4_0_1) {
        format!("<ddms:subjectCoverage>{}</ddms:subjectCoverage>", content)
    } else {
        format!("<ddms:subjectCoverage><ddms:Subject>{}</ddms:Subject></ddms:subjectCoverage>", content)
    }
}

/// A minimal valid record with `extra` inserted after the subject coverage.
pub fn resource_xml(version: SchemaVersion, subject_content: &str, extra: &str) -> String {
    let name = if version.is_at_least(SchemaVersion::V4_0_1) { "resource" } else { "Resource" };
    let mut attributes = String::new();
    let mut exclude = "";
    if version.is_at_least(SchemaVersion::V3_0) {
        attributes = format!(
            r#" ism:resourceElement="true" ism:createDate="2010-01-21" ism:DESVersion="2" {}"#,
            MARKED
        );
        exclude = r#" ism:excludeFromRollup="true""#;
    }
    if version.is_at_least(SchemaVersion::V4_1) {
        attributes.push_str(r#" ntk:DESVersion="7""#);
    }
    format!(
        r#"<ddms:{name} {xmlns}{attributes}><ddms:identifier ddms:qualifier="URI" ddms:value="urn:buri:ddmsence:testIdentifier"/><ddms:title {marked}>DDMSence</ddms:title>{creator}{subject}{extra}<ddms:security{exclude} {marked}/></ddms:{name}>"#,
        name = name,
        xmlns = xmlns(version),
        attributes = attributes,
        marked = MARKED,
        creator = creator(version),
        subject = subject(version, subject_content),
        extra = extra,
        exclude = exclude,
    )
}

pub fn minimal_xml(version: SchemaVersion) -> String {
    resource_xml(version, r#"<ddms:keyword ddms:value="DDMSence"/>"#, "")
}
