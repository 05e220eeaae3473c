//! Plant snapshot files: the equipment list plus optional annotations and
//! layer table, as JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use yardview_core::{Annotation, Equipment, LayerTable};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub layers: Option<LayerTable>,
}

impl SceneSnapshot {
    /// Accepts either a full snapshot object or a bare equipment array.
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Full(SceneSnapshot),
            Equipment(Vec<Equipment>),
        }

        let wire: Wire = serde_json::from_str(json).context("Failed to parse scene snapshot")?;
        Ok(match wire {
            Wire::Full(snapshot) => snapshot,
            Wire::Equipment(equipment) => SceneSnapshot {
                equipment,
                ..Default::default()
            },
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            equipment = snapshot.equipment.len(),
            annotations = snapshot.annotations.len(),
            "loaded scene snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const TANK: &str = r##"{
        "tag": "TQ-01",
        "type": "tank",
        "position": [0.0, 4.0, 0.0],
        "shape": { "kind": "cylinder", "radius": 4.0, "height": 8.0 },
        "base_color": "#4FC3F7",
        "system": "storage"
    }"##;

    #[test]
    fn test_bare_equipment_array() {
        let snapshot = SceneSnapshot::from_json(&format!("[{TANK}]")).unwrap();
        assert_eq!(snapshot.equipment.len(), 1);
        assert!(snapshot.annotations.is_empty());
        assert!(snapshot.layers.is_none());
    }

    #[test]
    fn test_full_snapshot_from_file() {
        let json = format!(
            r#"{{
                "equipment": [{TANK}],
                "annotations": [
                    {{
                        "tag": "TQ-01",
                        "text": "Drain scheduled",
                        "created_at": "2026-03-01T08:00:00Z"
                    }}
                ],
                "layers": [
                    {{
                        "id": "tanks",
                        "name": "Tanks",
                        "target": {{ "equipment": "tank" }},
                        "visible": false
                    }}
                ]
            }}"#
        );
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), json).unwrap();

        let snapshot = SceneSnapshot::load(file.path()).unwrap();
        assert_eq!(snapshot.equipment[0].tag, "TQ-01");
        assert_eq!(snapshot.annotations[0].headline(), "Drain scheduled");
        let layers = snapshot.layers.unwrap();
        assert_eq!(layers.is_visible("tanks"), Some(false));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneSnapshot::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(SceneSnapshot::from_json("{ \"equipment\": 3 }").is_err());
    }
}
