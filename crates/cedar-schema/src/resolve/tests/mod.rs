
use crate::{
    name::{EntityType, Identifier, Path},
    types::{RecordType, Type},
};

fn ident(s: &str) -> Identifier {
    Identifier::new(s).unwrap()
}

fn ety(s: &str) -> EntityType {
    EntityType::parse(s).unwrap()
}

fn path(s: &str) -> Path {
    Path::parse(s).unwrap()
}

fn type_ref(s: &str) -> Type {
    Type::type_ref(path(s))
}

fn record(attrs: &[(&str, Type)]) -> RecordType {
    attrs
        .iter()
        .fold(RecordType::new(), |record, (name, ty)| record.attr(*name, ty.clone()))
}
