use mutbson_core::{
    apply_modifiers, Document, EqualsValue, Error, Modifier, ModifierPull, ModifierPush, Value,
};

#[test]
fn push_and_pull_on_separate_fields() {
    let mut doc = Document::from_value(&Value::doc([
        ("a", Value::array([1, 2, 1])),
        ("b", Value::array([9])),
    ]))
    .unwrap();
    let mut pull = ModifierPull::init("a", EqualsValue(Value::from(1))).unwrap();
    let mut push = ModifierPush::init("b", &Value::from(10)).unwrap();
    let mut log = Document::new();

    let mut mods: [&mut dyn Modifier; 2] = [&mut pull, &mut push];
    let infos = apply_modifiers(&mut doc, &mut mods, "", Some(&mut log)).unwrap();
    assert_eq!(infos.len(), 2);
    assert!(infos.iter().all(|i| !i.no_op));
    assert_eq!(
        doc.to_object().unwrap(),
        Value::doc([("a", Value::array([2])), ("b", Value::array([9, 10]))])
    );
    assert_eq!(
        log.to_object().unwrap(),
        Value::doc([(
            "$set",
            Value::doc([("a", Value::array([2])), ("b", Value::array([9, 10]))])
        )])
    );
    doc.validate_invariants().unwrap();
}

#[test]
fn no_op_modifiers_are_logged_but_not_applied() {
    let mut doc = Document::from_value(&Value::doc([("a", Value::array([2]))])).unwrap();
    let mut pull = ModifierPull::init("a", EqualsValue(Value::from(1))).unwrap();
    let mut missing = ModifierPull::init("z", EqualsValue(Value::from(1))).unwrap();
    let mut log = Document::new();

    let mut mods: [&mut dyn Modifier; 2] = [&mut pull, &mut missing];
    let infos = apply_modifiers(&mut doc, &mut mods, "", Some(&mut log)).unwrap();
    assert!(infos.iter().all(|i| i.no_op));
    assert_eq!(doc.to_object().unwrap(), Value::doc([("a", Value::array([2]))]));
    assert_eq!(
        log.to_object().unwrap(),
        Value::doc([
            ("$set", Value::doc([("a", Value::array([2]))])),
            ("$unset", Value::doc([("z", 1)])),
        ])
    );
}

#[test]
fn overlapping_paths_conflict_before_any_change() {
    let start = Value::doc([("a", Value::doc([("b", Value::array([1]))]))]);
    let mut doc = Document::from_value(&start).unwrap();
    let mut push = ModifierPush::init("a.b", &Value::from(2)).unwrap();
    let mut pull = ModifierPull::init("a.b", EqualsValue(Value::from(1))).unwrap();

    let mut mods: [&mut dyn Modifier; 2] = [&mut push, &mut pull];
    let err = apply_modifiers(&mut doc, &mut mods, "", None).unwrap_err();
    assert!(matches!(err, Error::BadValue(msg) if msg.contains("conflicting")));
    assert_eq!(doc.to_object().unwrap(), start);
}

#[test]
fn positional_match_binds_every_modifier() {
    let mut doc = Document::from_value(&Value::doc([(
        "rows",
        Value::array([Value::array([1, 2]), Value::array([3])]),
    )]))
    .unwrap();
    let mut push = ModifierPush::init("rows.$", &Value::from(4)).unwrap();

    let mut mods: [&mut dyn Modifier; 1] = [&mut push];
    let infos = apply_modifiers(&mut doc, &mut mods, "1", None).unwrap();
    assert_eq!(infos[0].field_ref.as_ref().unwrap().dotted(), "rows.1");
    assert_eq!(
        doc.to_object().unwrap(),
        Value::doc([(
            "rows",
            Value::array([Value::array([1, 2]), Value::array([3, 4])])
        )])
    );
}

#[test]
fn pushes_share_a_created_parent() {
    let mut doc = Document::new();
    let mut x = ModifierPush::init("a.x", &Value::from(1)).unwrap();
    let mut y = ModifierPush::init("a.y", &Value::from(2)).unwrap();
    let mut log = Document::new();

    let mut mods: [&mut dyn Modifier; 2] = [&mut x, &mut y];
    apply_modifiers(&mut doc, &mut mods, "", Some(&mut log)).unwrap();

    let root = doc.root();
    assert_eq!(doc.children(root).count(), 1);
    assert_eq!(
        doc.to_object().unwrap(),
        Value::doc([(
            "a",
            Value::doc([("x", Value::array([1])), ("y", Value::array([2]))])
        )])
    );
    assert_eq!(
        log.to_object().unwrap(),
        Value::doc([(
            "$set",
            Value::doc([("a.x", Value::array([1])), ("a.y", Value::array([2]))])
        )])
    );
    doc.validate_invariants().unwrap();
}

#[test]
fn push_into_array_created_by_an_earlier_push() {
    let mut doc = Document::new();
    let mut first = ModifierPush::init("a.b", &Value::from(1)).unwrap();
    let mut second = ModifierPush::init("a.c.d", &Value::from(2)).unwrap();

    let mut mods: [&mut dyn Modifier; 2] = [&mut first, &mut second];
    apply_modifiers(&mut doc, &mut mods, "", None).unwrap();
    assert_eq!(
        doc.to_object().unwrap(),
        Value::doc([(
            "a",
            Value::doc([
                ("b", Value::array([1])),
                ("c", Value::doc([("d", Value::array([2]))])),
            ])
        )])
    );
}
