use knowlayout_core::{
    bind_bidirectional, ContextKey, CoordinateChange, GadgetKind, MemoryPreferences,
    PreferenceProperty, ViewCoordinate, WidgetKey,
};
use uuid::Uuid;

#[test]
fn test_context_values_survive_the_store() {
    let node = MemoryPreferences::root().child("windows").unwrap();
    let name = PreferenceProperty::<String>::new(GadgetKind::Window, ContextKey::ContextName).unwrap();
    let id = PreferenceProperty::<Uuid>::new(GadgetKind::Window, ContextKey::ContextUuid).unwrap();
    let coordinate =
        PreferenceProperty::<ViewCoordinate>::new(GadgetKind::Window, ContextKey::ViewCoordinate)
            .unwrap();

    assert_eq!(id.get(), Uuid::nil());
    assert_eq!(coordinate.get(), ViewCoordinate::default());

    let fresh = Uuid::new_v4();
    let spanish = CoordinateChange::Language("es".to_string()).apply(&coordinate.get());
    name.set("Context for simple-window".to_string());
    id.set(fresh);
    coordinate.set(spanish.clone());
    name.save(&node).unwrap();
    id.save(&node).unwrap();
    coordinate.save(&node).unwrap();

    let reread =
        PreferenceProperty::<ViewCoordinate>::new(GadgetKind::View, ContextKey::ViewCoordinate)
            .unwrap();
    reread.restore_or_default(&node).unwrap();
    assert_eq!(reread.get(), spanish);
    assert_eq!(reread.get().language.language, "es");
    assert_eq!(
        node.get_raw("CONTEXT_UUID").unwrap(),
        Some(fresh.to_string())
    );
}

#[test]
fn test_malformed_coordinate_heals_to_default() {
    let node = MemoryPreferences::root().child("view").unwrap();
    node.put_raw("VIEW_COORDINATE", "{not json").unwrap();
    let coordinate =
        PreferenceProperty::<ViewCoordinate>::new(GadgetKind::View, ContextKey::ViewCoordinate)
            .unwrap();
    coordinate.restore_or_default(&node).unwrap();
    assert_eq!(coordinate.get(), ViewCoordinate::default());

    let healed = node.get_raw("VIEW_COORDINATE").unwrap().unwrap();
    let parsed: ViewCoordinate = serde_json::from_str(&healed).unwrap();
    assert_eq!(parsed, ViewCoordinate::default());
}

#[test]
fn test_margin_is_stored_as_json_array() {
    let node = MemoryPreferences::root().child("widget").unwrap();
    let margin = PreferenceProperty::<Vec<f64>>::new(GadgetKind::Widget, WidgetKey::Margin).unwrap();
    margin.set(vec![4.0, 8.0, 4.0, 8.0]);
    margin.save(&node).unwrap();

    let stored = node.get_raw("MARGIN").unwrap().unwrap();
    let values: Vec<f64> = serde_json::from_str(&stored).unwrap();
    assert_eq!(values, vec![4.0, 8.0, 4.0, 8.0]);
}

#[test]
fn test_bound_properties_persist_the_same_value() {
    let node = MemoryPreferences::root().child("pair").unwrap();
    let stored = PreferenceProperty::<String>::new(GadgetKind::Window, ContextKey::ContextName).unwrap();
    let shown = PreferenceProperty::<String>::new(GadgetKind::View, ContextKey::ContextName).unwrap();
    let binding = bind_bidirectional(stored.property(), shown.property());

    shown.set("Edited in the host".to_string());
    stored.save(&node).unwrap();
    assert_eq!(
        node.get_raw("CONTEXT_NAME").unwrap().as_deref(),
        Some("Edited in the host")
    );

    binding.unsubscribe();
    shown.set("Detached".to_string());
    assert_eq!(stored.get(), "Edited in the host");
}
