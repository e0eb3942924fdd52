use crate::{fixtures::scenario, prelude::*};

fn ety(name: &str) -> EntityType {
    EntityType::parse(name).unwrap()
}

fn shape_pairs(resolved: &ResolvedSchema, entity: &str) -> Vec<(String, ResolvedType)> {
    resolved
        .entity(&ety(entity))
        .and_then(|e| e.shape.as_ref())
        .map(|shape| {
            shape
                .pairs()
                .map(|(name, ty)| (name.to_string(), ty.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn global_fallback_keeps_unqualified_parent() {
    let resolved = resolve(&scenario::global_fallback().unwrap()).unwrap();

    assert!(resolved.entity(&ety("GlobalGroup")).is_some());
    assert_eq!(
        resolved.entity(&ety("App::User")).unwrap().parents,
        [ety("GlobalGroup")]
    );
}

#[test]
fn namespace_qualifies_unqualified_parent() {
    let resolved = resolve(&scenario::namespace_qualification().unwrap()).unwrap();

    assert!(resolved.entity(&ety("App::Group")).is_some());
    assert_eq!(
        resolved.entity(&ety("App::User")).unwrap().parents,
        [ety("App::Group")]
    );
}

#[test]
fn alias_chain_inlines_to_string() {
    let resolved = resolve(&scenario::alias_chain().unwrap()).unwrap();

    assert_eq!(
        shape_pairs(&resolved, "U"),
        [("f".to_string(), ResolvedType::String)]
    );
}

#[test]
fn namespace_alias_reaches_global_alias() {
    let resolved = resolve(&scenario::namespace_alias_to_global().unwrap()).unwrap();

    assert_eq!(
        shape_pairs(&resolved, "A::U"),
        [("f".to_string(), ResolvedType::String)]
    );
}

#[test]
fn duplicate_entity_across_blocks_fails() {
    let err = resolve(&scenario::duplicate_across_blocks().unwrap()).unwrap_err();

    assert_eq!(err, ResolveError::EntityDuplicate { name: ety("A::U") });
    assert_eq!(err.subject().as_deref(), Some("A::U"));
}

#[test]
fn non_record_context_fails() {
    let err = resolve(&scenario::context_not_record().unwrap()).unwrap_err();

    assert_eq!(
        err,
        ResolveError::ContextNotRecord {
            action: ActionUid::new(ety("Action"), "view"),
            found: "String".to_string(),
        }
    );
}

#[test]
fn unknown_alias_degrades_to_entity_reference() {
    let resolved = resolve(&scenario::unknown_alias().unwrap()).unwrap();

    assert_eq!(
        shape_pairs(&resolved, "U"),
        [("f".to_string(), ResolvedType::Entity(ety("NonExistent")))]
    );
}

#[test]
fn every_successful_scenario_is_canonical() {
    let schemas = [
        scenario::global_fallback(),
        scenario::namespace_qualification(),
        scenario::alias_chain(),
        scenario::namespace_alias_to_global(),
        scenario::unknown_alias(),
    ];

    for schema in schemas {
        let resolved = resolve(&schema.unwrap()).unwrap();

        assert_eq!(resolve(&resolved.to_schema()).unwrap(), resolved);
    }
}

#[test]
fn errors_convert_into_crate_error() {
    let err: Error = resolve(&scenario::context_not_record().unwrap())
        .unwrap_err()
        .into();
    assert!(matches!(err, Error::ResolveError(_)));

    let err: Error = Identifier::new("A::B").unwrap_err().into();
    assert!(matches!(err, Error::NameError(_)));
    assert_eq!(err.to_string(), "identifier 'A::B' contains the '::' separator");
}
