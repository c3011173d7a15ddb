use serde::Deserialize;
use serde::Serialize;

use crate::document::SourceType;

/// Declarative description of a document graph
///
/// ```json
/// {
///   "documents": [
///     {
///       "id": "index.html",
///       "kind": "markup",
///       "imports": [{ "target": "lazy.html", "lazy": true }],
///       "scripts": [
///         { "src": "app.js" },
///         { "inline": { "sourceType": "module", "imports": [{ "target": "dep.js" }] } }
///       ]
///     }
///   ]
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphManifest {
  pub documents: Vec<DocumentManifest>,
}

impl GraphManifest {
  pub fn from_json(json: &str) -> anyhow::Result<Self> {
    Ok(serde_json::from_str(json)?)
  }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ManifestDocumentKind {
  Markup,
  Script,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentManifest {
  pub id: String,

  pub kind: ManifestDocumentKind,

  /// Only meaningful for script documents
  #[serde(default)]
  pub source_type: SourceType,

  /// `<link rel="import">` for markup documents, `import` statements for scripts
  #[serde(default)]
  pub imports: Vec<ImportManifest>,

  /// `<script>` elements, only meaningful for markup documents
  #[serde(default)]
  pub scripts: Vec<ScriptManifest>,

  /// Querying the edges of a malformed document fails
  #[serde(default)]
  pub malformed: bool,
}

impl DocumentManifest {
  pub fn new(id: impl Into<String>, kind: ManifestDocumentKind) -> Self {
    Self {
      id: id.into(),
      kind,
      source_type: SourceType::default(),
      imports: Vec::new(),
      scripts: Vec::new(),
      malformed: false,
    }
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportManifest {
  pub target: String,

  #[serde(default)]
  pub lazy: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScriptManifest {
  /// The referenced document decides whether this is a module script
  External { src: String },
  Inline { inline: InlineScriptManifest },
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineScriptManifest {
  #[serde(default)]
  pub source_type: SourceType,

  #[serde(default)]
  pub imports: Vec<ImportManifest>,
}
