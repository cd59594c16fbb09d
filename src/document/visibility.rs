use crate::document::model::Document;

/// Per-layer effective visibility: a layer is visible when its own flag and every ancestor
/// group's flag are set.
///
/// Built once per document so per-frame work is a table lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerVisibility {
    visible: Vec<bool>,
}

impl LayerVisibility {
    pub fn compute(doc: &Document) -> Self {
        let visible = (0..doc.layers.len())
            .map(|idx| {
                let mut cursor = Some(idx);
                // Bounded by the layer count so a malformed cyclic chain cannot spin.
                for _ in 0..=doc.layers.len() {
                    let Some(i) = cursor else {
                        return true;
                    };
                    let Some(layer) = doc.layers.get(i) else {
                        return false;
                    };
                    if !layer.flags.visible {
                        return false;
                    }
                    cursor = layer.parent;
                }
                false
            })
            .collect();
        Self { visible }
    }

    pub fn is_visible(&self, layer: usize) -> bool {
        self.visible.get(layer).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/visibility.rs"]
mod tests;
