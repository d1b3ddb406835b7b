use calorie_core::store::day_store::{LIMIT_KEY, MEALS_KEY, TOTAL_KEY, WORKOUTS_KEY};
use calorie_core::{DayStore, Entry, EntryId, EntryKind, KeyValueStore, MemoryKeyValueStore};

fn entry(id: &str, calories: f64) -> Entry {
    Entry::with_id(EntryId::new(id), format!("item {id}"), calories)
}

#[test]
fn absent_keys_yield_documented_defaults() {
    let store = DayStore::new(MemoryKeyValueStore::new());

    assert_eq!(store.limit(), 2000.0);
    assert_eq!(store.total(), 0.0);
    assert!(store.meals().is_empty());
    assert!(store.workouts().is_empty());
}

#[test]
fn scalars_are_stored_as_plain_text_numbers() {
    let mut store = DayStore::new(MemoryKeyValueStore::new());
    store.set_limit(1750.0).unwrap();
    store.set_total(-120.5).unwrap();

    assert_eq!(store.backend().get(LIMIT_KEY).unwrap().as_deref(), Some("1750"));
    assert_eq!(store.backend().get(TOTAL_KEY).unwrap().as_deref(), Some("-120.5"));
    assert_eq!(store.limit(), 1750.0);
    assert_eq!(store.total(), -120.5);
}

#[test]
fn lists_use_json_wire_fields() {
    let mut store = DayStore::new(MemoryKeyValueStore::new());
    store.save_workout(&entry("w1", 400.0)).unwrap();

    let raw = store.backend().get(WORKOUTS_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["id"], "w1");
    assert_eq!(json[0]["name"], "item w1");
    assert_eq!(json[0]["calories"], 400.0);
}

#[test]
fn lists_written_by_other_clients_are_readable() {
    let mut backend = MemoryKeyValueStore::new();
    backend
        .set(
            MEALS_KEY,
            r#"[{"id":"1700000000000-abc1234","name":"Eggs","calories":300}]"#,
        )
        .unwrap();

    let meals = DayStore::new(backend).meals();
    assert_eq!(meals.len(), 1);
    assert_eq!(meals[0].id().as_str(), "1700000000000-abc1234");
    assert_eq!(meals[0].calories(), 300.0);
}

#[test]
fn save_appends_in_order() {
    let mut store = DayStore::new(MemoryKeyValueStore::new());
    store.save_meal(&entry("a", 1.0)).unwrap();
    store.save_meal(&entry("b", 2.0)).unwrap();

    let ids = store
        .meals()
        .iter()
        .map(|meal| meal.id().as_str().to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(store.workouts().is_empty());
}

#[test]
fn remove_deletes_every_match_and_reports_count() {
    let mut store = DayStore::new(MemoryKeyValueStore::new());
    store.save_meal(&entry("dup", 100.0)).unwrap();
    store.save_meal(&entry("keep", 50.0)).unwrap();
    store.save_meal(&entry("dup", 200.0)).unwrap();

    assert_eq!(store.remove_meal(&EntryId::new("dup")).unwrap(), 2);
    assert_eq!(store.meals(), vec![entry("keep", 50.0)]);
    assert_eq!(store.remove_meal(&EntryId::new("dup")).unwrap(), 0);
    assert_eq!(store.remove_workout(&EntryId::new("keep")).unwrap(), 0);
}

#[test]
fn corrupt_values_fall_back_without_errors() {
    let mut backend = MemoryKeyValueStore::new();
    backend.set(LIMIT_KEY, "").unwrap();
    backend.set(TOTAL_KEY, "twelve").unwrap();
    backend.set(MEALS_KEY, "not json").unwrap();
    backend.set(WORKOUTS_KEY, r#"[{"id":"w1"}]"#).unwrap();

    let store = DayStore::new(backend);
    assert_eq!(store.limit(), 2000.0);
    assert_eq!(store.total(), 0.0);
    assert!(store.meals().is_empty());
    assert!(store.workouts().is_empty());
}

#[test]
fn one_undecodable_element_does_not_drop_the_list() {
    let mut store = DayStore::new(MemoryKeyValueStore::new());
    store.save_meal(&entry("a", 300.0)).unwrap();
    store.save_meal(&entry("b", f64::NAN)).unwrap();
    store.save_meal(&entry("c", 50.0)).unwrap();

    let raw = store.backend().get(MEALS_KEY).unwrap().unwrap();
    assert!(raw.contains(r#""calories":null"#));

    let meals = store.meals();
    assert_eq!(meals.len(), 3);
    assert_eq!(meals[0], entry("a", 300.0));
    assert_eq!(meals[1].calories(), 0.0);
    assert_eq!(meals[2], entry("c", 50.0));

    let mut backend = MemoryKeyValueStore::new();
    backend
        .set(
            WORKOUTS_KEY,
            r#"[{"id":"w1","name":"Run","calories":400},{"id":"w2"},{"id":"w3","name":"Row","calories":"lots"}]"#,
        )
        .unwrap();
    assert_eq!(
        DayStore::new(backend).workouts(),
        vec![Entry::with_id(EntryId::new("w1"), "Run", 400.0)]
    );
}

#[test]
fn entry_and_total_are_written_together() {
    let mut store = DayStore::new(MemoryKeyValueStore::new());
    store
        .save_entry_with_total(EntryKind::Meal, &entry("m", 300.0), 300.0)
        .unwrap();
    store
        .save_entry_with_total(EntryKind::Workout, &entry("w", 100.0), 200.0)
        .unwrap();
    assert_eq!(store.total(), 200.0);
    assert_eq!(store.meals(), vec![entry("m", 300.0)]);

    let removed = store
        .remove_entry_with_total(EntryKind::Meal, &EntryId::new("m"), -100.0)
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.total(), -100.0);
    assert!(store.meals().is_empty());
    assert_eq!(store.workouts().len(), 1);
}

#[test]
fn clear_keeping_limit_leaves_only_the_limit() {
    let mut store = DayStore::new(MemoryKeyValueStore::new());
    store.set_limit(1500.0).unwrap();
    store.set_total(10.0).unwrap();
    store.save_meal(&entry("m", 10.0)).unwrap();

    store.clear_keeping_limit(1500.0).unwrap();

    assert_eq!(store.backend().len(), 1);
    assert_eq!(store.backend().get(LIMIT_KEY).unwrap().as_deref(), Some("1500"));
    assert_eq!(store.total(), 0.0);
    assert!(store.meals().is_empty());
}

#[test]
fn clear_erases_every_key() {
    let mut store = DayStore::new(MemoryKeyValueStore::new());
    store.set_limit(1500.0).unwrap();
    store.set_total(10.0).unwrap();
    store.save_meal(&entry("m", 10.0)).unwrap();

    store.clear().unwrap();

    assert!(store.backend().is_empty());
    assert_eq!(store.limit(), 2000.0);
}
