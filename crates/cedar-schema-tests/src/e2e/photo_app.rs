use crate::{fixtures::photo_app, prelude::*};

fn ety(name: &str) -> EntityType {
    EntityType::parse(name).unwrap()
}

fn ns(name: &str) -> Path {
    Path::parse(name).unwrap()
}

fn resolved() -> ResolvedSchema {
    resolve(&photo_app::schema().unwrap()).unwrap()
}

#[test]
fn declarations_are_keyed_by_full_name() {
    let resolved = resolved();

    let entities: Vec<_> = resolved.entities().map(|e| e.name.to_string()).collect();
    assert_eq!(
        entities,
        [
            "Admin",
            "PhotoApp::Account",
            "PhotoApp::Album",
            "PhotoApp::Photo",
            "PhotoApp::User",
            "PhotoApp::UserGroup",
        ]
    );

    let enums: Vec<_> = resolved.enums().map(|e| e.name.to_string()).collect();
    assert_eq!(enums, ["PhotoApp::AccountType"]);

    let actions: Vec<_> = resolved.actions().map(|a| a.uid.to_string()).collect();
    assert_eq!(
        actions,
        [
            "Action::\"any\"",
            "PhotoApp::Action::\"createAlbum\"",
            "PhotoApp::Action::\"read\"",
            "PhotoApp::Action::\"viewPhoto\"",
            "PhotoApp::Moderation::Action::\"flag\"",
        ]
    );

    assert_eq!(resolved.len(), 12);
}

#[test]
fn user_shape_inlines_person_type_and_keeps_tags() {
    let resolved = resolved();
    let user = resolved.entity(&ety("PhotoApp::User")).unwrap();

    assert_eq!(user.parents, [ety("PhotoApp::UserGroup")]);
    assert_eq!(user.tags, Some(ResolvedType::String));
    assert_eq!(
        user.annotations.get("doc").and_then(|a| a.value.as_deref()),
        Some("an account holder")
    );

    let info = user.attribute("personInfo").unwrap().ty.as_record().unwrap();
    assert_eq!(info.to_string(), r#"{ "age": Long, "name": String }"#);
}

#[test]
fn references_respect_namespace_and_global_fallback() {
    let resolved = resolved();

    let group = resolved.entity(&ety("PhotoApp::UserGroup")).unwrap();
    assert_eq!(group.parents, [ety("Admin")]);

    let account = resolved.entity(&ety("PhotoApp::Account")).unwrap();
    let mut refs = Vec::new();
    account.for_each_entity_ref(&mut |name| refs.push(name.to_string()));
    assert_eq!(
        refs,
        ["PhotoApp::User", "PhotoApp::User", "PhotoApp::AccountType"]
    );

    let tier = resolved.enum_entity(&ety("PhotoApp::AccountType")).unwrap();
    assert!(tier.admits("Premium"));
    assert!(!tier.admits("Gold"));

    let photo = resolved.entity(&ety("PhotoApp::Photo")).unwrap();
    assert_eq!(
        photo.attribute("taken").map(|a| &a.ty),
        Some(&ResolvedType::Extension(Extension::Datetime))
    );
}

#[test]
fn actions_resolve_parents_and_context() {
    let resolved = resolved();
    let app = ns(photo_app::NAMESPACE);

    let view = resolved
        .action(&ActionUid::in_namespace(&app, "viewPhoto"))
        .unwrap();
    assert_eq!(view.parents, [ActionUid::in_namespace(&app, "read")]);

    let applies_to = view.applies_to.as_ref().unwrap();
    assert_eq!(applies_to.principals, [ety("PhotoApp::User")]);
    assert_eq!(applies_to.resources, [ety("PhotoApp::Photo")]);
    assert_eq!(
        applies_to.context.as_ref().unwrap().to_string(),
        r#"{ "ip": __cedar::ipaddr, "authenticated"?: Bool }"#
    );

    let read = resolved
        .action(&ActionUid::in_namespace(&app, "read"))
        .unwrap();
    assert_eq!(read.parents, [ActionUid::new(ety("Action"), "any")]);

    let flag = resolved
        .action(&ActionUid::in_namespace(&ns("PhotoApp::Moderation"), "flag"))
        .unwrap();
    assert_eq!(flag.parents, [ActionUid::in_namespace(&app, "read")]);

    let local: Vec<_> = resolved
        .actions_in_namespace(&app)
        .map(|a| a.uid.id.as_str())
        .collect();
    assert_eq!(local, ["createAlbum", "read", "viewPhoto"]);
}

#[test]
fn repeated_namespace_blocks_merge() {
    let resolved = resolved();

    let values: Vec<_> = resolved
        .namespace(&ns(photo_app::NAMESPACE))
        .unwrap()
        .annotations
        .iter()
        .filter_map(|a| a.value.as_deref())
        .collect();
    assert_eq!(values, ["photo sharing", "media"]);

    let paths: Vec<_> = resolved.namespaces().map(|n| n.path.to_string()).collect();
    assert_eq!(paths, ["PhotoApp", "PhotoApp::Moderation"]);
}

#[test]
fn report_counts_every_step() {
    let schema = photo_app::schema().unwrap();
    let mut report = ResolveReport::new();

    resolve_with(&schema, ResolveOptions::default(), &mut report).unwrap();

    assert_eq!(
        report,
        ResolveReport {
            common_types: 2,
            entities: 6,
            enums: 1,
            actions: 5,
            alias_expansions: 2,
            alias_cache_hits: 3,
            namespaces_merged: 1,
            opaque_references: 0,
        }
    );
}

#[test]
fn canonical_projection_round_trips() {
    let resolved = resolved();
    let projected = resolved.to_schema();

    assert_eq!(resolve(&projected).unwrap(), resolved);

    // one node per global declaration, then one per namespace
    assert_eq!(projected.nodes().len(), 4);
    assert!(matches!(
        &projected.nodes()[2],
        Node::Namespace(ns) if ns.path.to_string() == "PhotoApp"
    ));
}

#[test]
fn resolved_schema_survives_json() {
    let resolved = resolved();

    let json = serde_json::to_string(&resolved).unwrap();
    let back: ResolvedSchema = serde_json::from_str(&json).unwrap();

    assert_eq!(back, resolved);
}

#[test]
fn written_schema_survives_json() {
    let schema = photo_app::schema().unwrap();

    let json = serde_json::to_string_pretty(&schema).unwrap();
    let back: Schema = serde_json::from_str(&json).unwrap();

    assert_eq!(back, schema);
    assert_eq!(resolve(&back).unwrap(), resolve(&schema).unwrap());
}
