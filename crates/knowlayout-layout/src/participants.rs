//! Property groups each gadget kind persists.
//!
//! Each group maps its key enum onto typed [`PreferenceProperty`] fields and
//! knows how to bind those fields to the matching host cells.

use chrono::Local;
use knowlayout_core::{
    bind_bidirectional, GadgetKey, GadgetKind, PaneKey, PersistentSlot, PreferenceProperty,
    PropertySet, Subscription, WidgetKey, WindowKey,
};

use crate::error::LayoutResult;
use crate::factory::GadgetFactory;
use crate::host::{GeometryCells, PlacementCells, TransformCells};

/// Identity stamps carried by every gadget.
#[derive(Debug)]
pub struct GadgetIdentity {
    pub initialized: PreferenceProperty<bool>,
    pub factory_class: PreferenceProperty<String>,
    pub name_for_restore: PreferenceProperty<String>,
}

impl GadgetIdentity {
    pub fn new(kind: GadgetKind) -> LayoutResult<Self> {
        Ok(Self {
            initialized: PreferenceProperty::new(kind, GadgetKey::Initialized)?,
            factory_class: PreferenceProperty::new(kind, GadgetKey::FactoryClass)?,
            name_for_restore: PreferenceProperty::new(kind, GadgetKey::NameForRestore)?,
        })
    }

    /// Mark the gadget as produced by `factory` now
    pub fn stamp<F: GadgetFactory + ?Sized>(&self, factory: &F) {
        self.initialized.set(true);
        self.factory_class.set(factory.type_tag().to_string());
        self.name_for_restore.set(format!(
            "{} from {}",
            factory.gadget_name(),
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
    }
}

impl PropertySet for GadgetIdentity {
    type Key = GadgetKey;

    fn slot(&self, key: GadgetKey) -> &dyn PersistentSlot {
        match key {
            GadgetKey::Initialized => &self.initialized,
            GadgetKey::FactoryClass => &self.factory_class,
            GadgetKey::NameForRestore => &self.name_for_restore,
        }
    }
}

/// Window geometry and title.
#[derive(Debug)]
pub struct WindowGeometry {
    pub opacity: PreferenceProperty<f64>,
    pub visible: PreferenceProperty<bool>,
    pub x: PreferenceProperty<f64>,
    pub y: PreferenceProperty<f64>,
    pub width: PreferenceProperty<f64>,
    pub height: PreferenceProperty<f64>,
    pub title: PreferenceProperty<String>,
}

impl WindowGeometry {
    pub fn new() -> LayoutResult<Self> {
        let kind = GadgetKind::Window;
        Ok(Self {
            opacity: PreferenceProperty::new(kind, WindowKey::Opacity)?,
            visible: PreferenceProperty::new(kind, WindowKey::Visible)?,
            x: PreferenceProperty::new(kind, WindowKey::XLocation)?,
            y: PreferenceProperty::new(kind, WindowKey::YLocation)?,
            width: PreferenceProperty::new(kind, WindowKey::Width)?,
            height: PreferenceProperty::new(kind, WindowKey::Height)?,
            title: PreferenceProperty::new(kind, WindowKey::Title)?,
        })
    }

    /// Bind every geometry property to the stage; preferences win initially
    pub fn bind(&self, cells: &GeometryCells) -> Subscription {
        bind_bidirectional(self.opacity.property(), &cells.opacity)
            .and(bind_bidirectional(self.visible.property(), &cells.visible))
            .and(bind_bidirectional(self.x.property(), &cells.x))
            .and(bind_bidirectional(self.y.property(), &cells.y))
            .and(bind_bidirectional(self.width.property(), &cells.width))
            .and(bind_bidirectional(self.height.property(), &cells.height))
            .and(bind_bidirectional(self.title.property(), &cells.title))
    }
}

impl PropertySet for WindowGeometry {
    type Key = WindowKey;

    fn slot(&self, key: WindowKey) -> &dyn PersistentSlot {
        match key {
            WindowKey::Opacity => &self.opacity,
            WindowKey::Visible => &self.visible,
            WindowKey::XLocation => &self.x,
            WindowKey::YLocation => &self.y,
            WindowKey::Width => &self.width,
            WindowKey::Height => &self.height,
            WindowKey::Title => &self.title,
        }
    }
}

/// Whiteboard transform of a window pane.
#[derive(Debug)]
pub struct PaneTransform {
    pub translate_x: PreferenceProperty<f64>,
    pub translate_y: PreferenceProperty<f64>,
    pub translate_z: PreferenceProperty<f64>,
    pub scale_x: PreferenceProperty<f64>,
    pub scale_y: PreferenceProperty<f64>,
    pub scale_z: PreferenceProperty<f64>,
    pub rotate: PreferenceProperty<f64>,
}

impl PaneTransform {
    pub fn new() -> LayoutResult<Self> {
        let kind = GadgetKind::WindowPane;
        Ok(Self {
            translate_x: PreferenceProperty::new(kind, PaneKey::TranslateX)?,
            translate_y: PreferenceProperty::new(kind, PaneKey::TranslateY)?,
            translate_z: PreferenceProperty::new(kind, PaneKey::TranslateZ)?,
            scale_x: PreferenceProperty::new(kind, PaneKey::ScaleX)?,
            scale_y: PreferenceProperty::new(kind, PaneKey::ScaleY)?,
            scale_z: PreferenceProperty::new(kind, PaneKey::ScaleZ)?,
            rotate: PreferenceProperty::new(kind, PaneKey::Rotate)?,
        })
    }

    pub fn bind(&self, cells: &TransformCells) -> Subscription {
        bind_bidirectional(self.translate_x.property(), &cells.translate_x)
            .and(bind_bidirectional(self.translate_y.property(), &cells.translate_y))
            .and(bind_bidirectional(self.translate_z.property(), &cells.translate_z))
            .and(bind_bidirectional(self.scale_x.property(), &cells.scale_x))
            .and(bind_bidirectional(self.scale_y.property(), &cells.scale_y))
            .and(bind_bidirectional(self.scale_z.property(), &cells.scale_z))
            .and(bind_bidirectional(self.rotate.property(), &cells.rotate))
    }
}

impl PropertySet for PaneTransform {
    type Key = PaneKey;

    fn slot(&self, key: PaneKey) -> &dyn PersistentSlot {
        match key {
            PaneKey::TranslateX => &self.translate_x,
            PaneKey::TranslateY => &self.translate_y,
            PaneKey::TranslateZ => &self.translate_z,
            PaneKey::ScaleX => &self.scale_x,
            PaneKey::ScaleY => &self.scale_y,
            PaneKey::ScaleZ => &self.scale_z,
            PaneKey::Rotate => &self.rotate,
        }
    }
}

/// Grid placement of a widget in its pane.
#[derive(Debug)]
pub struct GridPlacement {
    pub h_grow: PreferenceProperty<String>,
    pub v_grow: PreferenceProperty<String>,
    pub h_alignment: PreferenceProperty<String>,
    pub v_alignment: PreferenceProperty<String>,
    pub column_index: PreferenceProperty<i32>,
    pub row_index: PreferenceProperty<i32>,
    pub column_span: PreferenceProperty<i32>,
    pub row_span: PreferenceProperty<i32>,
    pub margin: PreferenceProperty<Vec<f64>>,
}

impl GridPlacement {
    pub fn new() -> LayoutResult<Self> {
        let kind = GadgetKind::Widget;
        Ok(Self {
            h_grow: PreferenceProperty::new(kind, WidgetKey::HGrow)?,
            v_grow: PreferenceProperty::new(kind, WidgetKey::VGrow)?,
            h_alignment: PreferenceProperty::new(kind, WidgetKey::HAlignment)?,
            v_alignment: PreferenceProperty::new(kind, WidgetKey::VAlignment)?,
            column_index: PreferenceProperty::new(kind, WidgetKey::ColumnIndex)?,
            row_index: PreferenceProperty::new(kind, WidgetKey::RowIndex)?,
            column_span: PreferenceProperty::new(kind, WidgetKey::ColumnSpan)?,
            row_span: PreferenceProperty::new(kind, WidgetKey::RowSpan)?,
            margin: PreferenceProperty::new(kind, WidgetKey::Margin)?,
        })
    }

    pub fn bind(&self, cells: &PlacementCells) -> Subscription {
        bind_bidirectional(self.h_grow.property(), &cells.h_grow)
            .and(bind_bidirectional(self.v_grow.property(), &cells.v_grow))
            .and(bind_bidirectional(self.h_alignment.property(), &cells.h_alignment))
            .and(bind_bidirectional(self.v_alignment.property(), &cells.v_alignment))
            .and(bind_bidirectional(self.column_index.property(), &cells.column_index))
            .and(bind_bidirectional(self.row_index.property(), &cells.row_index))
            .and(bind_bidirectional(self.column_span.property(), &cells.column_span))
            .and(bind_bidirectional(self.row_span.property(), &cells.row_span))
            .and(bind_bidirectional(self.margin.property(), &cells.margin))
    }
}

impl PropertySet for GridPlacement {
    type Key = WidgetKey;

    fn slot(&self, key: WidgetKey) -> &dyn PersistentSlot {
        match key {
            WidgetKey::HGrow => &self.h_grow,
            WidgetKey::VGrow => &self.v_grow,
            WidgetKey::HAlignment => &self.h_alignment,
            WidgetKey::VAlignment => &self.v_alignment,
            WidgetKey::ColumnIndex => &self.column_index,
            WidgetKey::RowIndex => &self.row_index,
            WidgetKey::ColumnSpan => &self.column_span,
            WidgetKey::RowSpan => &self.row_span,
            WidgetKey::Margin => &self.margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowlayout_core::MemoryPreferences;

    #[test]
    fn test_geometry_binding_pushes_preferences_to_host() {
        let node = MemoryPreferences::root().child("w").unwrap();
        let geometry = WindowGeometry::new().unwrap();
        geometry.restore_all(&node).unwrap();

        let cells = GeometryCells::default();
        let _binding = geometry.bind(&cells);
        assert_eq!(cells.width.get(), 800.0);
        assert_eq!(cells.title.get(), "Untitled window");

        geometry.width.set(450.0);
        assert_eq!(cells.width.get(), 450.0);
        cells.height.set(500.0);
        assert_eq!(geometry.height.get(), 500.0);
    }

    #[test]
    fn test_placement_round_trip() {
        let node = MemoryPreferences::root().child("widget").unwrap();
        let placement = GridPlacement::new().unwrap();
        placement.restore_all(&node).unwrap();
        placement.column_index.set(2);
        placement.margin.set(vec![4.0, 8.0, 4.0, 8.0]);
        placement.h_grow.set("ALWAYS".to_string());
        placement.save_all(&node).unwrap();

        let restored = GridPlacement::new().unwrap();
        restored.restore_all(&node).unwrap();
        assert_eq!(restored.column_index.get(), 2);
        assert_eq!(restored.margin.get(), vec![4.0, 8.0, 4.0, 8.0]);
        assert_eq!(restored.h_grow.get(), "ALWAYS");
        assert_eq!(restored.row_span.get(), 1);
    }
}
