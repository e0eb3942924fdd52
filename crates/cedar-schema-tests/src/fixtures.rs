use crate::prelude::*;

fn ident(name: &str) -> Result<Identifier, Error> {
    Ok(Identifier::new(name)?)
}

fn ety(name: &str) -> Result<EntityType, Error> {
    Ok(EntityType::parse(name)?)
}

fn path(name: &str) -> Result<Path, Error> {
    Ok(Path::parse(name)?)
}

fn type_ref(name: &str) -> Result<Type, Error> {
    Ok(Type::type_ref(path(name)?))
}

///
/// Scenarios
///
/// One small schema per resolution rule.
///

pub mod scenario {
    use super::*;

    /// `entity GlobalGroup; namespace App { entity User in [GlobalGroup]; }`
    pub fn global_fallback() -> Result<Schema, Error> {
        Ok(Schema::new()
            .declare(EntityDecl::new(ident("GlobalGroup")?))
            .namespace(
                Namespace::new(path("App")?)
                    .declare(EntityDecl::new(ident("User")?).parent(ety("GlobalGroup")?)),
            ))
    }

    /// `namespace App { entity Group; entity User in [Group]; }`
    pub fn namespace_qualification() -> Result<Schema, Error> {
        Ok(Schema::new().namespace(
            Namespace::new(path("App")?)
                .declare(EntityDecl::new(ident("Group")?))
                .declare(EntityDecl::new(ident("User")?).parent(ety("Group")?)),
        ))
    }

    /// `type T1 = String; type T2 = T1; type T3 = T2; entity U = { "f": T3 };`
    pub fn alias_chain() -> Result<Schema, Error> {
        Ok(Schema::new()
            .declare(CommonTypeDecl::new(ident("T1")?, Type::String))
            .declare(CommonTypeDecl::new(ident("T2")?, type_ref("T1")?))
            .declare(CommonTypeDecl::new(ident("T3")?, type_ref("T2")?))
            .declare(
                EntityDecl::new(ident("U")?).shape(RecordType::new().attr("f", type_ref("T3")?)),
            ))
    }

    /// `type G = String; namespace A { type L = G; entity U = { "f": L }; }`
    pub fn namespace_alias_to_global() -> Result<Schema, Error> {
        Ok(Schema::new()
            .declare(CommonTypeDecl::new(ident("G")?, Type::String))
            .namespace(
                Namespace::new(path("A")?)
                    .declare(CommonTypeDecl::new(ident("L")?, type_ref("G")?))
                    .declare(
                        EntityDecl::new(ident("U")?)
                            .shape(RecordType::new().attr("f", type_ref("L")?)),
                    ),
            ))
    }

    /// `namespace A { entity U; } namespace A { entity U; }`
    pub fn duplicate_across_blocks() -> Result<Schema, Error> {
        let block = || -> Result<Namespace, Error> {
            Ok(Namespace::new(path("A")?).declare(EntityDecl::new(ident("U")?)))
        };

        Ok(Schema::new().namespace(block()?).namespace(block()?))
    }

    /// `type S = String; action view appliesTo { principal: [], resource: [], context: S };`
    pub fn context_not_record() -> Result<Schema, Error> {
        Ok(Schema::new()
            .declare(CommonTypeDecl::new(ident("S")?, Type::String))
            .declare(ActionDecl::new("view").applies_to(AppliesTo::new().context(type_ref("S")?))))
    }

    /// `entity U = { "f": NonExistent };`
    pub fn unknown_alias() -> Result<Schema, Error> {
        Ok(Schema::new().declare(
            EntityDecl::new(ident("U")?)
                .shape(RecordType::new().attr("f", type_ref("NonExistent")?)),
        ))
    }
}

///
/// PhotoApp
///
/// A photo-sharing schema exercising every declaration kind, nested
/// namespaces, annotations, tags and repeated namespace blocks.
///

pub mod photo_app {
    use super::*;

    pub const NAMESPACE: &str = "PhotoApp";

    pub fn schema() -> Result<Schema, Error> {
        let ns = path(NAMESPACE)?;
        let doc = ident("doc")?;

        let core = Namespace::new(ns.clone())
            .annotation(doc.clone(), "photo sharing")
            .declare(CommonTypeDecl::new(
                ident("PersonType")?,
                RecordType::new()
                    .attr("age", Type::Long)
                    .attr("name", Type::String)
                    .into(),
            ))
            .declare(CommonTypeDecl::new(
                ident("ContextType")?,
                RecordType::new()
                    .attr("ip", type_ref("ipaddr")?)
                    .optional_attr("authenticated", type_ref("Boolean")?)
                    .into(),
            ))
            .declare(
                EntityDecl::new(ident("User")?)
                    .parent(ety("UserGroup")?)
                    .shape(
                        RecordType::new()
                            .attr("department", Type::String)
                            .attr("jobLevel", Type::Long)
                            .attr("personInfo", type_ref("PersonType")?),
                    )
                    .tags(Type::String)
                    .annotation(doc.clone(), "an account holder"),
            )
            .declare(EntityDecl::new(ident("UserGroup")?).parent(ety("::Admin")?))
            .declare(
                EntityDecl::new(ident("Account")?).shape(
                    RecordType::new()
                        .attr("owner", Type::Entity(ety("User")?))
                        .optional_attr("admins", Type::set(Type::Entity(ety("User")?)))
                        .attr("tier", Type::Entity(ety("AccountType")?)),
                ),
            )
            .declare(EnumDecl::new(ident("AccountType")?, ["Basic", "Premium"]));

        let media = Namespace::new(ns)
            .annotation(doc, "media")
            .declare(
                EntityDecl::new(ident("Album")?)
                    .parent(ety("Album")?)
                    .shape(album_shape()?),
            )
            .declare(
                EntityDecl::new(ident("Photo")?)
                    .parent(ety("Album")?)
                    .shape(album_shape()?.attr("taken", type_ref("__cedar::datetime")?)),
            )
            .declare(
                ActionDecl::new("viewPhoto")
                    .parent(ActionParent::new("read"))
                    .applies_to(
                        AppliesTo::new()
                            .principal(ety("User")?)
                            .resource(ety("Photo")?)
                            .context(type_ref("ContextType")?),
                    ),
            )
            .declare(
                ActionDecl::new("createAlbum").applies_to(
                    AppliesTo::new()
                        .principal(ety("User")?)
                        .resource(ety("Account")?)
                        .resource(ety("Album")?)
                        .context(type_ref("ContextType")?),
                ),
            )
            .declare(ActionDecl::new("read").parent(ActionParent::typed(ety("::Action")?, "any")));

        let moderation = Namespace::new(path("PhotoApp::Moderation")?).declare(
            ActionDecl::new("flag")
                .parent(ActionParent::typed(ety("PhotoApp::Action")?, "read"))
                .applies_to(
                    AppliesTo::new()
                        .principal(ety("PhotoApp::User")?)
                        .resource(ety("PhotoApp::Photo")?),
                ),
        );

        Ok(Schema::new()
            .declare(EntityDecl::new(ident("Admin")?))
            .declare(ActionDecl::new("any"))
            .namespace(core)
            .namespace(media)
            .namespace(moderation))
    }

    fn album_shape() -> Result<RecordType, Error> {
        Ok(RecordType::new()
            .attr("account", Type::Entity(ety("Account")?))
            .attr("private", Type::Bool))
    }
}
