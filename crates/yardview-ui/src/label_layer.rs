//! Annotation labels drawn as GTK widgets over the GL area.

use std::collections::HashMap;

use gtk4::prelude::*;
use gtk4::{Fixed, Label};
use yardview_scene::LabelPlacement;

pub struct LabelLayer {
    fixed: Fixed,
    labels: HashMap<String, Label>,
}

impl LabelLayer {
    pub fn new() -> Self {
        let fixed = Fixed::new();
        // Pointer input must reach the GL area underneath
        fixed.set_can_target(false);
        fixed.add_css_class("scene-labels");
        Self {
            fixed,
            labels: HashMap::new(),
        }
    }

    pub fn widget(&self) -> &Fixed {
        &self.fixed
    }

    /// Bring the widgets in line with the latest placements, reusing labels
    /// that survive from the previous frame.
    pub fn sync(&mut self, placements: &[LabelPlacement]) {
        self.labels.retain(|tag, label| {
            let keep = placements.iter().any(|p| &p.tag == tag);
            if !keep {
                self.fixed.remove(&*label);
            }
            keep
        });

        for placement in placements {
            let label = self
                .labels
                .entry(placement.tag.clone())
                .or_insert_with(|| {
                    let label = Label::new(None);
                    label.add_css_class("scene-label");
                    label.set_can_target(false);
                    self.fixed.put(&label, 0.0, 0.0);
                    label
                });

            if label.text().as_str() != placement.text {
                label.set_text(&placement.text);
            }
            label.set_visible(placement.visible);
            if placement.visible {
                // Center horizontally, bottom edge on the anchor
                let x = f64::from(placement.position.x) - f64::from(label.width()) / 2.0;
                let y = f64::from(placement.position.y) - f64::from(label.height());
                self.fixed.move_(&*label, x, y);
            }
        }
    }

    pub fn clear(&mut self) {
        for label in self.labels.values() {
            self.fixed.remove(label);
        }
        self.labels.clear();
    }
}

impl Default for LabelLayer {
    fn default() -> Self {
        Self::new()
    }
}
