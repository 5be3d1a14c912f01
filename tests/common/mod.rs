#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ddms_validate::{ControlledVocabularies, DdmsReader, SchemaVersion};

pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

pub fn reader() -> DdmsReader {
    DdmsReader::new(Arc::new(ControlledVocabularies::from_directory(data_dir())))
}

const MARKED: &str = r#"ism:classification="U" ism:ownerProducer="USA""#;

fn xmlns(version: SchemaVersion) -> String {
    let ns = version.namespaces();
    let mut decls = format!(
        r#"xmlns:ddms="{}" xmlns:ism="{}" xmlns:xlink="{}""#,
        ns.ddms, ns.ism, ns.xlink
    );
    if let Some(ntk) = ns.ntk {
        decls.push_str(&format!(r#" xmlns:ntk="{}""#, ntk));
    }
    decls
}

/// A complete record at `version` with `subject_content` inside the subject
/// coverage and `extra` after it.
pub fn record(version: SchemaVersion, subject_content: &str, extra: &str) -> String {
    let modern = version.is_at_least(SchemaVersion::V4_0_1);
    let name = if modern { "resource" } else { "Resource" };
    let person = if modern { "person" } else { "Person" };
    let subject = if modern {
        format!("<ddms:subjectCoverage>{subject_content}</ddms:subjectCoverage>")
    } else {
        format!("<ddms:subjectCoverage><ddms:Subject>{subject_content}</ddms:Subject></ddms:subjectCoverage>")
    };

    let mut attributes = String::new();
    let mut exclude = "";
    if version.is_at_least(SchemaVersion::V3_0) {
        attributes = format!(
            r#" ism:resourceElement="true" ism:createDate="2010-01-21" ism:DESVersion="2" {MARKED}"#
        );
        exclude = r#" ism:excludeFromRollup="true""#;
    }
    if version.is_at_least(SchemaVersion::V4_1) {
        attributes.push_str(r#" ntk:DESVersion="7""#);
    }

    format!(
        concat!(
            r#"<ddms:{name} {xmlns}{attributes}>"#,
            r#"<ddms:identifier ddms:qualifier="URI" ddms:value="urn:buri:ddmsence:testIdentifier"/>"#,
            r#"<ddms:title {marked}>DDMSence</ddms:title>"#,
            r#"<ddms:creator><ddms:{person}><ddms:name>Brian</ddms:name><ddms:surname>Uri</ddms:surname></ddms:{person}></ddms:creator>"#,
            r#"{subject}{extra}"#,
            r#"<ddms:security{exclude} {marked}/>"#,
            r#"</ddms:{name}>"#
        ),
        name = name,
        xmlns = xmlns(version),
        attributes = attributes,
        marked = MARKED,
        person = person,
        subject = subject,
        extra = extra,
        exclude = exclude,
    )
}

pub fn minimal_record(version: SchemaVersion) -> String {
    record(version, r#"<ddms:keyword ddms:value="DDMSence"/>"#, "")
}

/// A 4.1 record whose only producer has been removed.
pub fn record_without_producer() -> String {
    minimal_record(SchemaVersion::V4_1).replace(
        "<ddms:creator><ddms:person><ddms:name>Brian</ddms:name><ddms:surname>Uri</ddms:surname></ddms:person></ddms:creator>",
        "",
    )
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// One valid record per version plus one invalid record and a non-DDMS file.
pub fn populate_mixed(dir: &Path) {
    for version in SchemaVersion::ALL {
        write_file(dir, &format!("valid/{}.xml", version), &minimal_record(version));
    }
    write_file(dir, "invalid/no-producer.xml", &record_without_producer());
    write_file(dir, "README.txt", "not a record");
}
