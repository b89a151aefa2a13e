use serde::{Deserialize, Serialize};

/// A file artifact stored in the service workspace.
///
/// The name is the canonical identity; the optional server-assigned id
/// is carried through but never used for addressing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub size: i64,
    /// Epoch seconds of the last modification.
    #[serde(default, rename = "lastModifiedDate")]
    pub last_modified: i64,
    /// Epoch seconds of the upload, when the backend records it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_instance: Option<String>,
    /// Workspace path on the server, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
