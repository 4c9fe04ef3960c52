//! Configuration types for Easel editing behavior.
//!
//! Every structure implements [`serde::Deserialize`] with defaults for
//! missing fields, so a configuration file only needs to name the values it
//! overrides.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`LayoutConfig`] - Which [`Router`] lays out connections and whether
//!   their ends are cropped to shape outlines.
//! - [`GridConfig`] - Grid size and connection snapping.
//! - [`ModelingConfig`] - Thresholds used by editing handlers and behaviors.
//! - [`ElementsConfig`] - Default sizes per element type.
//! - [`SemanticsConfig`] - Type names driving the default semantic rules.
//!
//! # Example
//!
//! ```
//! # use easel::config::{AppConfig, Router};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().router(), Router::Straight);
//! assert_eq!(config.grid().size(), 10.0);
//! assert!(config.validate().is_ok());
//! ```

use std::collections::HashMap;

use serde::Deserialize;

use easel_core::geometry::Size;

use crate::EaselError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    grid: GridConfig,

    #[serde(default)]
    modeling: ModelingConfig,

    #[serde(default)]
    elements: ElementsConfig,

    #[serde(default)]
    semantics: SemanticsConfig,
}

impl AppConfig {
    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the grid configuration.
    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Returns the modeling thresholds.
    pub fn modeling(&self) -> &ModelingConfig {
        &self.modeling
    }

    /// Returns the default element sizes.
    pub fn elements(&self) -> &ElementsConfig {
        &self.elements
    }

    /// Returns the semantic type names.
    pub fn semantics(&self) -> &SemanticsConfig {
        &self.semantics
    }

    /// Replaces the layout section.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Replaces the grid section.
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`EaselError::Config`] naming the first offending value.
    pub fn validate(&self) -> Result<(), EaselError> {
        if self.grid.size <= 0.0 {
            return Err(EaselError::Config(format!(
                "grid.size must be positive, got {}",
                self.grid.size
            )));
        }
        let min = self.modeling.min_shape_size;
        if min.width() < 0.0 || min.height() < 0.0 {
            return Err(EaselError::Config(
                "modeling.min_shape_size cannot be negative".to_string(),
            ));
        }
        if let Some((name, size)) = self
            .elements
            .sizes
            .iter()
            .find(|(_, size)| size.width() < 0.0 || size.height() < 0.0)
        {
            return Err(EaselError::Config(format!(
                "elements.sizes.{name} cannot be negative, got {}x{}",
                size.width(),
                size.height()
            )));
        }
        Ok(())
    }
}

/// Connection routing strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Router {
    /// A straight line between the two anchors.
    #[default]
    Straight,
    /// Axis aligned segments between the two anchors.
    Manhattan,
}

/// Connection layout settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    router: Router,

    /// Bend limit for [`Router::Manhattan`] before falling back to a straight line.
    #[serde(default = "default_max_bends")]
    max_bends: usize,

    #[serde(default = "default_true")]
    crop_connections: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            router: Router::default(),
            max_bends: default_max_bends(),
            crop_connections: true,
        }
    }
}

impl LayoutConfig {
    pub fn new(router: Router, max_bends: usize, crop_connections: bool) -> Self {
        Self {
            router,
            max_bends,
            crop_connections,
        }
    }

    pub fn router(&self) -> Router {
        self.router
    }

    pub fn max_bends(&self) -> usize {
        self.max_bends
    }

    /// Whether connection ends are cropped to the outline of their shapes.
    pub fn crop_connections(&self) -> bool {
        self.crop_connections
    }
}

/// Grid settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_grid_size")]
    size: f32,

    #[serde(default = "default_true")]
    snap_connections: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_grid_size(),
            snap_connections: true,
        }
    }
}

impl GridConfig {
    pub fn new(size: f32, snap_connections: bool) -> Self {
        Self {
            size,
            snap_connections,
        }
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Whether the middle segments of laid out connections snap to the grid.
    pub fn snap_connections(&self) -> bool {
        self.snap_connections
    }

    /// Rounds `value` to the nearest grid line.
    pub fn snap(&self, value: f32) -> f32 {
        (value / self.size).round() * self.size
    }
}

/// Thresholds used by handlers and behaviors.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelingConfig {
    #[serde(default = "default_min_shape_size")]
    min_shape_size: Size,

    /// Inset applied to element ranges when grouping for distribution.
    #[serde(default = "default_distribute_threshold")]
    distribute_threshold: f32,

    /// Maximum distance between a drop point and a flow for the flow to be split.
    #[serde(default = "default_flow_intersection_threshold")]
    flow_intersection_threshold: f32,

    /// Extra hover region around a host while its attacher is dragged.
    #[serde(default = "default_attach_hover_padding")]
    attach_hover_padding: f32,
}

impl Default for ModelingConfig {
    fn default() -> Self {
        Self {
            min_shape_size: default_min_shape_size(),
            distribute_threshold: default_distribute_threshold(),
            flow_intersection_threshold: default_flow_intersection_threshold(),
            attach_hover_padding: default_attach_hover_padding(),
        }
    }
}

impl ModelingConfig {
    pub fn min_shape_size(&self) -> Size {
        self.min_shape_size
    }

    pub fn distribute_threshold(&self) -> f32 {
        self.distribute_threshold
    }

    pub fn flow_intersection_threshold(&self) -> f32 {
        self.flow_intersection_threshold
    }

    pub fn attach_hover_padding(&self) -> f32 {
        self.attach_hover_padding
    }
}

/// Default sizes of newly created elements, keyed by type name.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementsConfig {
    #[serde(default = "default_sizes")]
    sizes: HashMap<String, Size>,

    #[serde(default = "default_fallback_size")]
    fallback: Size,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
            fallback: default_fallback_size(),
        }
    }
}

impl ElementsConfig {
    /// Returns the configured size of `type_name`, or the fallback size.
    pub fn size_for(&self, type_name: &str) -> Size {
        self.sizes.get(type_name).copied().unwrap_or(self.fallback)
    }
}

/// Type names the default semantic rules work with.
#[derive(Debug, Clone, Deserialize)]
pub struct SemanticsConfig {
    #[serde(default = "default_sequence_kinds")]
    sequence_kinds: Vec<String>,

    #[serde(default = "default_connection_type")]
    connection_type: String,

    #[serde(default = "default_attachable_kinds")]
    attachable_kinds: Vec<String>,

    #[serde(default = "default_label_kind")]
    label_kind: String,
}

impl Default for SemanticsConfig {
    fn default() -> Self {
        Self {
            sequence_kinds: default_sequence_kinds(),
            connection_type: default_connection_type(),
            attachable_kinds: default_attachable_kinds(),
            label_kind: default_label_kind(),
        }
    }
}

impl SemanticsConfig {
    /// Connection types that may not cross container boundaries.
    pub fn sequence_kinds(&self) -> &[String] {
        &self.sequence_kinds
    }

    /// Connection type used when none is given.
    pub fn connection_type(&self) -> &str {
        &self.connection_type
    }

    /// Shape types that can be attached to a host.
    pub fn attachable_kinds(&self) -> &[String] {
        &self.attachable_kinds
    }

    pub fn label_kind(&self) -> &str {
        &self.label_kind
    }
}

fn default_true() -> bool {
    true
}

fn default_max_bends() -> usize {
    3
}

fn default_grid_size() -> f32 {
    10.0
}

fn default_min_shape_size() -> Size {
    Size::new(10.0, 10.0)
}

fn default_distribute_threshold() -> f32 {
    5.0
}

fn default_flow_intersection_threshold() -> f32 {
    10.0
}

fn default_attach_hover_padding() -> f32 {
    15.0
}

fn default_fallback_size() -> Size {
    Size::new(100.0, 80.0)
}

fn default_sizes() -> HashMap<String, Size> {
    [
        ("Task", Size::new(100.0, 80.0)),
        ("SubProcess", Size::new(350.0, 200.0)),
        ("Gateway", Size::new(50.0, 50.0)),
        ("Event", Size::new(36.0, 36.0)),
        ("StartEvent", Size::new(36.0, 36.0)),
        ("EndEvent", Size::new(36.0, 36.0)),
        ("BoundaryEvent", Size::new(36.0, 36.0)),
        ("TextAnnotation", Size::new(100.0, 30.0)),
        ("DataObject", Size::new(36.0, 50.0)),
        ("Label", Size::new(90.0, 20.0)),
    ]
    .into_iter()
    .map(|(name, size)| (name.to_string(), size))
    .collect()
}

fn default_sequence_kinds() -> Vec<String> {
    vec!["SequenceFlow".to_string()]
}

fn default_connection_type() -> String {
    "SequenceFlow".to_string()
}

fn default_attachable_kinds() -> Vec<String> {
    vec!["BoundaryEvent".to_string()]
}

fn default_label_kind() -> String {
    "Label".to_string()
}

#[cfg(test)]
mod tests {
    use serde::de::{
        IntoDeserializer,
        value::{MapDeserializer, StrDeserializer},
    };

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.layout().router(), Router::Straight);
        assert_eq!(config.layout().max_bends(), 3);
        assert!(config.layout().crop_connections());
        assert!(config.grid().snap_connections());
        assert_eq!(config.modeling().min_shape_size(), Size::new(10.0, 10.0));
        assert_eq!(config.modeling().distribute_threshold(), 5.0);
        assert_eq!(config.semantics().connection_type(), "SequenceFlow");
    }

    #[test]
    fn test_size_for() {
        let elements = ElementsConfig::default();
        assert_eq!(elements.size_for("Gateway"), Size::new(50.0, 50.0));
        assert_eq!(elements.size_for("Unknown"), Size::new(100.0, 80.0));
    }

    #[test]
    fn test_grid_snap() {
        let grid = GridConfig::new(10.0, true);
        assert_eq!(grid.snap(14.0), 10.0);
        assert_eq!(grid.snap(15.0), 20.0);
        assert_eq!(grid.snap(-6.0), -10.0);
    }

    #[test]
    fn test_router_deserializes_lowercase() {
        let deserializer: StrDeserializer<'_, serde::de::value::Error> =
            "manhattan".into_deserializer();
        let router = Router::deserialize(deserializer).expect("valid router");
        assert_eq!(router, Router::Manhattan);
    }

    #[test]
    fn test_partial_grid_section() {
        let grid: GridConfig = Deserialize::deserialize(MapDeserializer::<
            _,
            serde::de::value::Error,
        >::new([("size", 20.0_f32)].into_iter()))
        .expect("partial section");
        assert_eq!(grid.size(), 20.0);
        assert!(grid.snap_connections());
    }

    #[test]
    fn test_validate_rejects_zero_grid() {
        let config = AppConfig::default().with_grid(GridConfig::new(0.0, true));
        assert!(matches!(config.validate(), Err(EaselError::Config(_))));
    }
}
