use super::{
    Cardinality, Field, FieldId, FieldName, ForeignKeySide, JoinTable, Model, ModelId, Relation,
    RelationId, ScalarKind, Schema,
};
use crate::{Error, Result};

use indexmap::IndexMap;

/// Declares models by name and links them into a [`Schema`].
///
/// Relations name their target model, which may be declared later or be the
/// declaring model itself. Names are resolved to ids in [`Builder::build`].
#[derive(Debug, Default)]
pub struct Builder {
    models: Vec<ModelBuilder>,
}

#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    table_name: Option<String>,
    fields: Vec<FieldBuilder>,
    relations: Vec<RelationBuilder>,
}

#[derive(Debug)]
pub struct FieldBuilder {
    name: String,
    storage_name: Option<String>,
    kind: ScalarKind,
    nullable: bool,
    list: bool,
    primary_key: bool,
    auto_increment: bool,
}

#[derive(Debug)]
pub struct RelationBuilder {
    name: String,
    target: String,
    cardinality: Cardinality,
    fields: Vec<String>,
    references: Vec<String>,
    foreign_key: Option<ForeignKeySide>,
    join_table: Option<JoinTable>,
}

impl Builder {
    pub fn model(mut self, name: impl Into<String>, f: impl FnOnce(&mut ModelBuilder)) -> Self {
        let mut model = ModelBuilder {
            name: name.into(),
            table_name: None,
            fields: vec![],
            relations: vec![],
        };
        f(&mut model);
        self.models.push(model);
        self
    }

    pub fn build(self) -> Result<Schema> {
        let mut by_name = IndexMap::new();

        for (index, model) in self.models.iter().enumerate() {
            if by_name.insert(model.name.clone(), ModelId(index)).is_some() {
                return Err(Error::invalid_schema(format!(
                    "duplicate model `{}`",
                    model.name
                )));
            }
        }

        // Scalar fields first so relations can resolve key names on any model.
        let mut models = self
            .models
            .iter()
            .enumerate()
            .map(|(index, model)| model.build_fields(ModelId(index)))
            .collect::<Result<Vec<_>>>()?;

        for (index, builder) in self.models.iter().enumerate() {
            let mut relations = vec![];

            for (relation_index, relation) in builder.relations.iter().enumerate() {
                let id = RelationId {
                    model: ModelId(index),
                    index: relation_index,
                };
                relations.push(relation.build(id, &models, &by_name)?);
            }

            models[index].relations = relations;
        }

        Ok(Schema { models, by_name })
    }
}

impl ModelBuilder {
    pub fn table(&mut self, name: impl Into<String>) -> &mut Self {
        self.table_name = Some(name.into());
        self
    }

    pub fn field(&mut self, name: impl Into<String>, kind: ScalarKind) -> &mut FieldBuilder {
        self.fields.push(FieldBuilder {
            name: name.into(),
            storage_name: None,
            kind,
            nullable: false,
            list: false,
            primary_key: false,
            auto_increment: false,
        });
        let index = self.fields.len() - 1;
        &mut self.fields[index]
    }

    pub fn relation(
        &mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        cardinality: Cardinality,
    ) -> &mut RelationBuilder {
        self.relations.push(RelationBuilder {
            name: name.into(),
            target: target.into(),
            cardinality,
            fields: vec![],
            references: vec![],
            foreign_key: None,
            join_table: None,
        });
        let index = self.relations.len() - 1;
        &mut self.relations[index]
    }

    fn build_fields(&self, id: ModelId) -> Result<Model> {
        let mut fields: Vec<Field> = vec![];

        for (index, field) in self.fields.iter().enumerate() {
            if fields.iter().any(|f| f.name.app_name == field.name) {
                return Err(Error::invalid_schema(format!(
                    "duplicate field `{}.{}`",
                    self.name, field.name
                )));
            }

            fields.push(Field {
                id: id.field(index),
                name: FieldName {
                    app_name: field.name.clone(),
                    storage_name: field.storage_name.clone(),
                },
                kind: field.kind,
                nullable: field.nullable,
                list: field.list,
                primary_key: field.primary_key,
                auto_increment: field.auto_increment,
            });
        }

        for relation in &self.relations {
            let clashes = fields.iter().any(|f| f.name.app_name == relation.name)
                || self
                    .relations
                    .iter()
                    .filter(|r| r.name == relation.name)
                    .count()
                    > 1;

            if clashes {
                return Err(Error::invalid_schema(format!(
                    "duplicate field `{}.{}`",
                    self.name, relation.name
                )));
            }
        }

        let primary_key = fields
            .iter()
            .filter(|field| field.primary_key)
            .map(|field| field.id)
            .collect();

        Ok(Model {
            id,
            name: self.name.clone(),
            table_name: self.table_name.clone(),
            fields,
            relations: vec![],
            primary_key,
        })
    }
}

impl FieldBuilder {
    /// Stores the field in a column with a different name.
    pub fn column(&mut self, name: impl Into<String>) -> &mut Self {
        self.storage_name = Some(name.into());
        self
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    pub fn list(&mut self) -> &mut Self {
        self.list = true;
        self
    }

    pub fn primary_key(&mut self) -> &mut Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }
}

impl RelationBuilder {
    /// Key fields on the declaring model.
    pub fn fields<I>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Key fields on the target model.
    pub fn references<I>(&mut self, references: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.references = references.into_iter().map(Into::into).collect();
        self
    }

    pub fn through(&mut self, join_table: JoinTable) -> &mut Self {
        self.join_table = Some(join_table);
        self
    }

    /// Overrides which side of a one-to-one relation stores the foreign key.
    pub fn foreign_key(&mut self, side: ForeignKeySide) -> &mut Self {
        self.foreign_key = Some(side);
        self
    }

    fn build(
        &self,
        id: RelationId,
        models: &[Model],
        by_name: &IndexMap<String, ModelId>,
    ) -> Result<Relation> {
        let model = &models[id.model.0];
        let path = format!("{}.{}", model.name, self.name);

        let Some(&target_id) = by_name.get(&self.target) else {
            return Err(Error::invalid_schema(format!(
                "relation `{path}` targets unknown model `{}`",
                self.target
            )));
        };
        let target = &models[target_id.0];

        // Many-to-many keys default to both primary keys.
        let (fields, references) = if self.cardinality == Cardinality::ManyToMany
            && self.fields.is_empty()
            && self.references.is_empty()
        {
            (model.primary_key.clone(), target.primary_key.clone())
        } else {
            (
                resolve_keys(&path, model, &self.fields)?,
                resolve_keys(&path, target, &self.references)?,
            )
        };

        if fields.is_empty() || fields.len() != references.len() {
            return Err(Error::invalid_schema(format!(
                "relation `{path}` pairs {} local key fields with {} target key fields",
                fields.len(),
                references.len()
            )));
        }

        let foreign_key = match (self.cardinality, self.foreign_key) {
            (Cardinality::ManyToOne, None) => ForeignKeySide::Local,
            (Cardinality::OneToMany, None) => ForeignKeySide::Target,
            (Cardinality::ManyToMany, None) => ForeignKeySide::JoinTable,
            (Cardinality::OneToOne, Some(ForeignKeySide::JoinTable)) => {
                return Err(Error::invalid_schema(format!(
                    "one-to-one relation `{path}` cannot store its key in a join table"
                )));
            }
            (Cardinality::OneToOne, Some(side)) => side,
            (Cardinality::OneToOne, None) if fields == model.primary_key => ForeignKeySide::Target,
            (Cardinality::OneToOne, None) => ForeignKeySide::Local,
            (cardinality, Some(_)) => {
                return Err(Error::invalid_schema(format!(
                    "only one-to-one relations choose their foreign key side (`{path}` is {})",
                    cardinality.name()
                )));
            }
        };

        let join_table = match (self.cardinality, &self.join_table) {
            (Cardinality::ManyToMany, Some(join_table)) => {
                if join_table.local_columns.len() != fields.len()
                    || join_table.target_columns.len() != references.len()
                {
                    return Err(Error::invalid_schema(format!(
                        "join table `{}` of relation `{path}` does not match the key arity",
                        join_table.name
                    )));
                }
                Some(join_table.clone())
            }
            (Cardinality::ManyToMany, None) => {
                return Err(Error::invalid_schema(format!(
                    "many-to-many relation `{path}` has no join table"
                )));
            }
            (_, Some(_)) => {
                return Err(Error::invalid_schema(format!(
                    "only many-to-many relations use a join table (`{path}`)"
                )));
            }
            (_, None) => None,
        };

        Ok(Relation {
            id,
            name: self.name.clone(),
            target: target_id,
            cardinality: self.cardinality,
            fields,
            references,
            foreign_key,
            join_table,
        })
    }
}

fn resolve_keys(path: &str, model: &Model, names: &[String]) -> Result<Vec<FieldId>> {
    names
        .iter()
        .map(|name| {
            model.field_by_name(name).map(|field| field.id).ok_or_else(|| {
                Error::invalid_schema(format!(
                    "relation `{path}` names unknown key field `{}.{name}`",
                    model.name
                ))
            })
        })
        .collect()
}
