//! Preference keys.
//!
//! Every persisted value a gadget owns is addressed by a key from one of the
//! groups below. A key has a stable stored name, a fixed position in its
//! group's enumeration order and a default that resolves with no other state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use crate::coordinate::ViewCoordinate;

/// A declared default value, tagged with its semantic type.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceValue {
    /// Boolean flag.
    Bool(bool),
    /// Free text.
    Str(String),
    /// Double precision number.
    Double(f64),
    /// 32-bit integer.
    Int(i32),
    /// Fixed-length array of doubles (insets, vectors).
    DoubleArray(Vec<f64>),
    /// Opaque object stored whole as JSON.
    Object(serde_json::Value),
}

/// Concern a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyGroup {
    /// Identity stamps every gadget carries.
    Identity,
    /// Name, id and view coordinate of a context.
    Context,
    /// Top-level window geometry and title.
    WindowGeometry,
    /// Whiteboard style 3-D transform of a pane.
    PaneTransform,
    /// Grid placement of a widget inside its pane.
    GridPlacement,
    /// Application wide values outside any gadget.
    Application,
}

impl fmt::Display for KeyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyGroup::Identity => write!(f, "Identity"),
            KeyGroup::Context => write!(f, "Context"),
            KeyGroup::WindowGeometry => write!(f, "WindowGeometry"),
            KeyGroup::PaneTransform => write!(f, "PaneTransform"),
            KeyGroup::GridPlacement => write!(f, "GridPlacement"),
            KeyGroup::Application => write!(f, "Application"),
        }
    }
}

/// The four gadget variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GadgetKind {
    /// Top-level window wrapping a stage.
    Window,
    /// Layout container that owns a context.
    View,
    /// Layout container with a 3-D transform.
    WindowPane,
    /// Leaf element placed on a grid.
    Widget,
}

impl GadgetKind {
    /// Key groups a gadget of this kind persists, in save order.
    pub fn key_groups(self) -> &'static [KeyGroup] {
        match self {
            GadgetKind::Window => &[
                KeyGroup::Identity,
                KeyGroup::Context,
                KeyGroup::WindowGeometry,
            ],
            GadgetKind::View => &[KeyGroup::Identity, KeyGroup::Context],
            GadgetKind::WindowPane => &[KeyGroup::Identity, KeyGroup::PaneTransform],
            GadgetKind::Widget => &[KeyGroup::Identity, KeyGroup::GridPlacement],
        }
    }

    /// Whether this kind declares the given group.
    pub fn declares(self, group: KeyGroup) -> bool {
        self.key_groups().contains(&group)
    }

    /// Whether gadgets of this kind carry their own context.
    pub fn is_context_bearing(self) -> bool {
        self.declares(KeyGroup::Context)
    }
}

impl fmt::Display for GadgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GadgetKind::Window => write!(f, "Window"),
            GadgetKind::View => write!(f, "View"),
            GadgetKind::WindowPane => write!(f, "WindowPane"),
            GadgetKind::Widget => write!(f, "Widget"),
        }
    }
}

/// An enumerable preference key with a declared default.
pub trait PreferenceKey: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Group every key of this type belongs to.
    const GROUP: KeyGroup;

    /// All keys of the group in enumeration order.
    fn all() -> &'static [Self];

    /// Stable name under which the value is stored.
    fn key_name(self) -> &'static str;

    /// Declared default.
    fn default_value(self) -> PreferenceValue;
}

/// Identity stamps written on the create path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GadgetKey {
    Initialized,
    FactoryClass,
    NameForRestore,
}

impl PreferenceKey for GadgetKey {
    const GROUP: KeyGroup = KeyGroup::Identity;

    fn all() -> &'static [Self] {
        &[
            GadgetKey::Initialized,
            GadgetKey::FactoryClass,
            GadgetKey::NameForRestore,
        ]
    }

    fn key_name(self) -> &'static str {
        match self {
            GadgetKey::Initialized => "INITIALIZED",
            GadgetKey::FactoryClass => "FACTORY_CLASS",
            GadgetKey::NameForRestore => "NAME_FOR_RESTORE",
        }
    }

    fn default_value(self) -> PreferenceValue {
        match self {
            GadgetKey::Initialized => PreferenceValue::Bool(false),
            GadgetKey::FactoryClass | GadgetKey::NameForRestore => {
                PreferenceValue::Str(String::new())
            }
        }
    }
}

/// Window geometry, bound both ways to the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKey {
    Opacity,
    Visible,
    XLocation,
    YLocation,
    Width,
    Height,
    Title,
}

impl PreferenceKey for WindowKey {
    const GROUP: KeyGroup = KeyGroup::WindowGeometry;

    fn all() -> &'static [Self] {
        &[
            WindowKey::Opacity,
            WindowKey::Visible,
            WindowKey::XLocation,
            WindowKey::YLocation,
            WindowKey::Width,
            WindowKey::Height,
            WindowKey::Title,
        ]
    }

    fn key_name(self) -> &'static str {
        match self {
            WindowKey::Opacity => "WINDOW_OPACITY",
            WindowKey::Visible => "WINDOW_VISIBLE",
            WindowKey::XLocation => "WINDOW_X_LOCATION",
            WindowKey::YLocation => "WINDOW_Y_LOCATION",
            WindowKey::Width => "WINDOW_WIDTH",
            WindowKey::Height => "WINDOW_HEIGHT",
            WindowKey::Title => "WINDOW_TITLE",
        }
    }

    fn default_value(self) -> PreferenceValue {
        match self {
            WindowKey::Opacity => PreferenceValue::Double(1.0),
            WindowKey::Visible => PreferenceValue::Bool(false),
            WindowKey::XLocation | WindowKey::YLocation => PreferenceValue::Double(40.0),
            WindowKey::Width => PreferenceValue::Double(800.0),
            WindowKey::Height => PreferenceValue::Double(600.0),
            WindowKey::Title => PreferenceValue::Str("Untitled window".to_string()),
        }
    }
}

/// Whiteboard transform of a window pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaneKey {
    TranslateX,
    TranslateY,
    TranslateZ,
    ScaleX,
    ScaleY,
    ScaleZ,
    Rotate,
}

impl PreferenceKey for PaneKey {
    const GROUP: KeyGroup = KeyGroup::PaneTransform;

    fn all() -> &'static [Self] {
        &[
            PaneKey::TranslateX,
            PaneKey::TranslateY,
            PaneKey::TranslateZ,
            PaneKey::ScaleX,
            PaneKey::ScaleY,
            PaneKey::ScaleZ,
            PaneKey::Rotate,
        ]
    }

    fn key_name(self) -> &'static str {
        match self {
            PaneKey::TranslateX => "TRANSLATE_X",
            PaneKey::TranslateY => "TRANSLATE_Y",
            PaneKey::TranslateZ => "TRANSLATE_Z",
            PaneKey::ScaleX => "SCALE_X",
            PaneKey::ScaleY => "SCALE_Y",
            PaneKey::ScaleZ => "SCALE_Z",
            PaneKey::Rotate => "ROTATE",
        }
    }

    fn default_value(self) -> PreferenceValue {
        match self {
            PaneKey::ScaleX | PaneKey::ScaleY | PaneKey::ScaleZ => PreferenceValue::Double(1.0),
            _ => PreferenceValue::Double(0.0),
        }
    }
}

/// Grid placement of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKey {
    HGrow,
    VGrow,
    HAlignment,
    VAlignment,
    ColumnIndex,
    RowIndex,
    ColumnSpan,
    RowSpan,
    Margin,
}

impl PreferenceKey for WidgetKey {
    const GROUP: KeyGroup = KeyGroup::GridPlacement;

    fn all() -> &'static [Self] {
        &[
            WidgetKey::HGrow,
            WidgetKey::VGrow,
            WidgetKey::HAlignment,
            WidgetKey::VAlignment,
            WidgetKey::ColumnIndex,
            WidgetKey::RowIndex,
            WidgetKey::ColumnSpan,
            WidgetKey::RowSpan,
            WidgetKey::Margin,
        ]
    }

    fn key_name(self) -> &'static str {
        match self {
            WidgetKey::HGrow => "H_GROW",
            WidgetKey::VGrow => "V_GROW",
            WidgetKey::HAlignment => "H_ALIGNMENT",
            WidgetKey::VAlignment => "V_ALIGNMENT",
            WidgetKey::ColumnIndex => "COLUMN_INDEX",
            WidgetKey::RowIndex => "ROW_INDEX",
            WidgetKey::ColumnSpan => "COLUMN_SPAN",
            WidgetKey::RowSpan => "ROW_SPAN",
            WidgetKey::Margin => "MARGIN",
        }
    }

    fn default_value(self) -> PreferenceValue {
        match self {
            WidgetKey::HGrow | WidgetKey::VGrow => PreferenceValue::Str("SOMETIMES".to_string()),
            WidgetKey::HAlignment => PreferenceValue::Str("LEFT".to_string()),
            WidgetKey::VAlignment => PreferenceValue::Str("CENTER".to_string()),
            WidgetKey::ColumnIndex | WidgetKey::RowIndex => PreferenceValue::Int(0),
            WidgetKey::ColumnSpan | WidgetKey::RowSpan => PreferenceValue::Int(1),
            WidgetKey::Margin => PreferenceValue::DoubleArray(vec![0.0; 4]),
        }
    }
}

/// Keys a context persists on its peer's node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKey {
    ContextName,
    ContextUuid,
    ViewCoordinate,
}

impl PreferenceKey for ContextKey {
    const GROUP: KeyGroup = KeyGroup::Context;

    fn all() -> &'static [Self] {
        &[
            ContextKey::ContextName,
            ContextKey::ContextUuid,
            ContextKey::ViewCoordinate,
        ]
    }

    fn key_name(self) -> &'static str {
        match self {
            ContextKey::ContextName => "CONTEXT_NAME",
            ContextKey::ContextUuid => "CONTEXT_UUID",
            ContextKey::ViewCoordinate => "VIEW_COORDINATE",
        }
    }

    fn default_value(self) -> PreferenceValue {
        match self {
            ContextKey::ContextName => PreferenceValue::Str("Unnamed context".to_string()),
            ContextKey::ContextUuid => PreferenceValue::Str(uuid::Uuid::nil().to_string()),
            ContextKey::ViewCoordinate => PreferenceValue::Object(
                serde_json::to_value(ViewCoordinate::default()).unwrap_or_default(),
            ),
        }
    }
}

/// Application values kept in the user namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppKey {
    LastRun,
}

impl PreferenceKey for AppKey {
    const GROUP: KeyGroup = KeyGroup::Application;

    fn all() -> &'static [Self] {
        &[AppKey::LastRun]
    }

    fn key_name(self) -> &'static str {
        match self {
            AppKey::LastRun => "LAST_RUN",
        }
    }

    fn default_value(self) -> PreferenceValue {
        PreferenceValue::Str(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn names<K: PreferenceKey>() -> Vec<&'static str> {
        K::all().iter().map(|k| k.key_name()).collect()
    }

    #[test]
    fn test_key_names_are_unique_across_gadget_groups() {
        let mut seen = HashSet::new();
        let all = [
            names::<GadgetKey>(),
            names::<WindowKey>(),
            names::<PaneKey>(),
            names::<WidgetKey>(),
            names::<ContextKey>(),
        ];
        for name in all.iter().flatten() {
            assert!(seen.insert(*name), "duplicate key name {name}");
        }
    }

    #[test]
    fn test_window_geometry_order() {
        assert_eq!(
            names::<WindowKey>(),
            vec![
                "WINDOW_OPACITY",
                "WINDOW_VISIBLE",
                "WINDOW_X_LOCATION",
                "WINDOW_Y_LOCATION",
                "WINDOW_WIDTH",
                "WINDOW_HEIGHT",
                "WINDOW_TITLE",
            ]
        );
    }

    #[test]
    fn test_kind_declarations() {
        assert!(GadgetKind::Window.declares(KeyGroup::WindowGeometry));
        assert!(GadgetKind::View.is_context_bearing());
        assert!(!GadgetKind::WindowPane.is_context_bearing());
        assert!(!GadgetKind::Widget.declares(KeyGroup::PaneTransform));
        for kind in [
            GadgetKind::Window,
            GadgetKind::View,
            GadgetKind::WindowPane,
            GadgetKind::Widget,
        ] {
            assert!(kind.declares(KeyGroup::Identity));
        }
    }

    #[test]
    fn test_margin_default_has_four_insets() {
        assert_eq!(
            WidgetKey::Margin.default_value(),
            PreferenceValue::DoubleArray(vec![0.0, 0.0, 0.0, 0.0])
        );
    }

    #[test]
    fn test_coordinate_default_is_an_object() {
        assert!(matches!(
            ContextKey::ViewCoordinate.default_value(),
            PreferenceValue::Object(serde_json::Value::Object(_))
        ));
    }
}
