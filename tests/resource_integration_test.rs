mod common;

use std::sync::Arc;

use common::{minimal_record, reader, record, record_without_producer};
use ddms_validate::components::{IdentifierBuilder, TextKind, VirtualCoverageBuilder};
use ddms_validate::{
    Builder, Component, DdmsError, DdmsReader, RenderFormat, Resource, ResourceBuilder,
    SchemaVersion, WellFormedValidator, XmlElement,
};

const ORDER_MESSAGE: &str =
    "The ddms:order attributes throughout this resource must form a single, ordered list starting from 1.";

fn actors(orders: &[u32]) -> String {
    let mut content = r#"<ddms:keyword ddms:value="DDMSence"/>"#.to_string();
    for order in orders {
        content.push_str(&format!(
            r#"<ddms:nonStateActor ddms:order="{order}">Actor {order}</ddms:nonStateActor>"#
        ));
    }
    content
}

#[test]
fn test_minimal_4_1_record_is_valid() {
    let resource = reader().read_str(&minimal_record(SchemaVersion::V4_1)).unwrap();
    assert_eq!(resource.version(), SchemaVersion::V4_1);
    assert_eq!(resource.name(), "resource");
    assert_eq!(resource.texts(TextKind::Title).len(), 1);
    assert_eq!(resource.attributes().ntk_des_version, Some(7));
    assert!(resource.warnings().is_empty());
}

#[test]
fn test_every_version_is_detected_and_valid() {
    for version in SchemaVersion::ALL {
        let resource = reader().read_str(&minimal_record(version)).unwrap();
        assert_eq!(resource.version(), version);
    }
}

#[test]
fn test_rendering_round_trips() {
    let reader = reader();
    for version in SchemaVersion::ALL {
        let resource = reader.read_str(&minimal_record(version)).unwrap();
        let rendered = resource.to_xml_string();
        let reparsed = reader.read_str(&rendered).unwrap();
        assert_eq!(reparsed, resource, "DDMS {version}");
        assert_eq!(reparsed.to_xml_string(), rendered, "DDMS {version}");
    }
}

#[test]
fn test_builder_round_trips() {
    let reader = reader();
    for version in SchemaVersion::ALL {
        let resource = reader.read_str(&minimal_record(version)).unwrap();
        let committed = ResourceBuilder::from(&resource)
            .commit(&reader.context(version))
            .unwrap();
        assert_eq!(committed, Some(resource), "DDMS {version}");
    }
}

#[test]
fn test_builder_edit_then_commit() {
    let reader = reader();
    let version = SchemaVersion::V4_1;
    let ctx = reader.context(version);
    let resource = reader.read_str(&minimal_record(version)).unwrap();

    let mut builder = ResourceBuilder::from(&resource);
    builder.identifiers.push(IdentifierBuilder {
        qualifier: "URI".to_string(),
        value: "urn:buri:ddmsence:second".to_string(),
    });
    builder.virtual_coverages.push(VirtualCoverageBuilder::default());
    let edited = builder.commit(&ctx).unwrap().unwrap();

    // The empty virtual coverage builder is dropped on commit
    assert_eq!(edited.identifiers().len(), 2);
    assert_eq!(edited.components().len(), resource.components().len() + 1);
}

#[test]
fn test_missing_producer() {
    let err = reader().read_str(&record_without_producer()).unwrap_err();
    assert!(err.is_invalid());
    assert_eq!(
        err.message(),
        "At least 1 producer role (creator, publisher, contributor or pointOfContact) is required."
    );
    assert_eq!(err.locator(), Some("/ddms:resource"));
}

#[test]
fn test_duplicate_single_valued_slot() {
    let version = SchemaVersion::V3_1;
    let xml = record(
        version,
        r#"<ddms:keyword ddms:value="DDMSence"/>"#,
        r#"<ddms:rights ddms:privacyAct="true"/><ddms:rights ddms:copyright="true"/>"#,
    );
    let err = reader().read_str(&xml).unwrap_err();
    assert_eq!(err.message(), "Only 1 ddms:rights can be used.");
}

#[test]
fn test_order_contiguous() {
    let xml = record(SchemaVersion::V4_1, &actors(&[2, 1, 3]), "");
    assert!(reader().read_str(&xml).is_ok());
}

#[test]
fn test_order_gap() {
    let xml = record(SchemaVersion::V4_1, &actors(&[1, 3]), "");
    let err = reader().read_str(&xml).unwrap_err();
    assert_eq!(err.message(), ORDER_MESSAGE);
}

#[test]
fn test_version_gated_attribute() {
    let xml = minimal_record(SchemaVersion::V2_0).replacen(
        "<ddms:Resource ",
        r#"<ddms:Resource ism:createDate="2010-01-21" "#,
        1,
    );
    let err = reader().read_str(&xml).unwrap_err();
    assert!(err.message().contains("createDate"), "{}", err);
}

#[test]
fn test_unknown_child_element() {
    let xml = record(
        SchemaVersion::V4_1,
        r#"<ddms:keyword ddms:value="DDMSence"/>"#,
        "<ddms:unknownThing/>",
    );
    let err = reader().read_str(&xml).unwrap_err();
    assert_eq!(err.message(), "Unexpected element encountered: ddms:unknownThing");
}

#[test]
fn test_well_formed_validator_accepts_rendered_record() {
    let reader = reader().with_schema_validator(Arc::new(WellFormedValidator));
    let resource = reader.read_str(&minimal_record(SchemaVersion::V3_0)).unwrap();

    let rebuilt = Resource::new(
        resource.components().to_vec(),
        resource.attributes().clone(),
        &reader.context(SchemaVersion::V3_0),
    )
    .unwrap();
    assert_eq!(rebuilt, resource);
}

#[test]
fn test_render_formats() {
    let resource = reader().read_str(&minimal_record(SchemaVersion::V4_1)).unwrap();

    let text = resource.render(RenderFormat::Text);
    assert!(text.contains("title: DDMSence\n"));
    assert!(text.contains("resource.resourceElement: true\n"));

    let html = resource.render(RenderFormat::Html);
    assert!(html.contains(r#"<meta name="title" content="DDMSence" />"#));

    let json: serde_json::Value =
        serde_json::from_str(&resource.render(RenderFormat::Json)).unwrap();
    assert!(json.as_array().is_some_and(|pairs| !pairs.is_empty()));
}

#[test]
fn test_unsupported_namespace() {
    let root = XmlElement::parse(r#"<resource xmlns="http://metadata.dod.mil/mdr/ns/DDMS/9.9/"/>"#)
        .unwrap();
    assert!(matches!(
        DdmsReader::detect_version(&root),
        Err(DdmsError::UnsupportedVersion(_))
    ));
}
