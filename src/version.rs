//! DDMS schema revisions and their namespace tables.
//!
//! Every validation decision in this crate takes a [`SchemaVersion`] as an explicit
//! input (usually through a [`crate::context::ValidationContext`]); there is no
//! process-wide "current version".

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DdmsError, Result};

pub const DDMS_PREFIX: &str = "ddms";
pub const ISM_PREFIX: &str = "ism";
pub const NTK_PREFIX: &str = "ntk";
pub const VIRT_PREFIX: &str = "virt";
pub const XLINK_PREFIX: &str = "xlink";

/// Namespace URIs bound to one schema revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespaces {
    pub ddms: &'static str,
    pub ism: &'static str,
    pub ntk: Option<&'static str>,
    pub virt: Option<&'static str>,
    pub gml: &'static str,
    pub xlink: &'static str,
}

const XLINK: &str = "http://www.w3.org/1999/xlink";

const V2_0_NAMESPACES: Namespaces = Namespaces {
    ddms: "http://metadata.dod.mil/mdr/ns/DDMS/2.0/",
    ism: "urn:us:gov:ic:ism:v2",
    ntk: None,
    virt: None,
    gml: "http://www.opengis.net/gml",
    xlink: XLINK,
};

const V3_0_NAMESPACES: Namespaces = Namespaces {
    ddms: "http://metadata.dod.mil/mdr/ns/DDMS/3.0/",
    ism: "urn:us:gov:ic:ism",
    ntk: None,
    virt: None,
    gml: "http://www.opengis.net/gml/3.2",
    xlink: XLINK,
};

const V3_1_NAMESPACES: Namespaces = Namespaces {
    ddms: "http://metadata.dod.mil/mdr/ns/DDMS/3.1/",
    ism: "urn:us:gov:ic:ism",
    ntk: None,
    virt: None,
    gml: "http://www.opengis.net/gml/3.2",
    xlink: XLINK,
};

const V4_NAMESPACES: Namespaces = Namespaces {
    ddms: "urn:us:mil:ces:metadata:ddms:4",
    ism: "urn:us:gov:ic:ism",
    ntk: Some("urn:us:gov:ic:ntk"),
    virt: Some("urn:us:gov:ic:virt"),
    gml: "http://www.opengis.net/gml/3.2",
    xlink: XLINK,
};

/// One of the supported DDMS revisions, ordered oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SchemaVersion {
    #[serde(rename = "2.0")]
    V2_0,
    #[serde(rename = "3.0")]
    V3_0,
    #[serde(rename = "3.1")]
    V3_1,
    #[serde(rename = "4.0.1")]
    V4_0_1,
    #[serde(rename = "4.1")]
    V4_1,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 5] = [
        SchemaVersion::V2_0,
        SchemaVersion::V3_0,
        SchemaVersion::V3_1,
        SchemaVersion::V4_0_1,
        SchemaVersion::V4_1,
    ];

    /// The newest supported revision.
    pub fn latest() -> Self {
        SchemaVersion::V4_1
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::V2_0 => "2.0",
            SchemaVersion::V3_0 => "3.0",
            SchemaVersion::V3_1 => "3.1",
            SchemaVersion::V4_0_1 => "4.0.1",
            SchemaVersion::V4_1 => "4.1",
        }
    }

    pub fn is_at_least(&self, other: SchemaVersion) -> bool {
        *self >= other
    }

    pub fn namespaces(&self) -> &'static Namespaces {
        match self {
            SchemaVersion::V2_0 => &V2_0_NAMESPACES,
            SchemaVersion::V3_0 => &V3_0_NAMESPACES,
            SchemaVersion::V3_1 => &V3_1_NAMESPACES,
            SchemaVersion::V4_0_1 | SchemaVersion::V4_1 => &V4_NAMESPACES,
        }
    }

    pub fn ddms_namespace(&self) -> &'static str {
        self.namespaces().ddms
    }

    pub fn ism_namespace(&self) -> &'static str {
        self.namespaces().ism
    }

    /// Location of the ISM controlled vocabulary files, relative to the configured root.
    pub fn vocabulary_location(&self) -> &'static str {
        match self {
            SchemaVersion::V2_0 => "schemas/2.0/ISM/CVE",
            SchemaVersion::V3_0 => "schemas/3.0/ISM/CVE",
            SchemaVersion::V3_1 => "schemas/3.1/ISM/CVE",
            SchemaVersion::V4_0_1 => "schemas/4.0.1/ISM/CVE",
            SchemaVersion::V4_1 => "schemas/4.1/ISM/CVE",
        }
    }

    /// All revisions whose DDMS namespace is `namespace`, oldest first.
    ///
    /// 4.0.1 and 4.1 share a namespace, so callers must disambiguate.
    pub fn versions_for_namespace(namespace: &str) -> Vec<SchemaVersion> {
        Self::ALL
            .into_iter()
            .filter(|v| v.ddms_namespace() == namespace)
            .collect()
    }

    /// Whether `namespace` is any revision's DDMS namespace.
    pub fn is_ddms_namespace(namespace: &str) -> bool {
        !Self::versions_for_namespace(namespace).is_empty()
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::latest()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = DdmsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "2.0" => Ok(SchemaVersion::V2_0),
            "3.0" => Ok(SchemaVersion::V3_0),
            "3.1" => Ok(SchemaVersion::V3_1),
            // 4.0 was superseded by 4.0.1 before any records were published against it
            "4.0" | "4.0.1" => Ok(SchemaVersion::V4_0_1),
            "4.1" => Ok(SchemaVersion::V4_1),
            other => Err(DdmsError::UnsupportedVersion(other.to_string())),
        }
    }
}
