//! Models and records.
//!
//! A [`Model`] declares a bean type and its column registry; a [`Record`]
//! wraps an engine bean and pushes every write through the declared column's
//! formatters, type coercion, and length check. Validation runs at save
//! time, and link/unlink operations are queued and applied only after a
//! successful store.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use fluidbean_common::{Error, Result};
use fluidbean_engine::associations::AssociationManager;
use fluidbean_engine::{Bean, Oodb, Value};

use crate::column::{Column, ColumnType, Schema};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A record type backed by the engine.
///
/// `BEAN_TYPE` must be a lowercase identifier; it names the underlying
/// table. Stampable models get implicit `created_at` and `modified_at`
/// datetime columns maintained on save.
pub trait Model {
    const BEAN_TYPE: &'static str;
    const STAMPABLE: bool = true;

    /// Register the model's columns.
    fn define(schema: &mut Schema);

    /// Hook invoked at the start of `save`, before validation. An error
    /// aborts the save.
    fn before_save(_record: &mut Record<Self>) -> Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }

    /// Hook invoked after the record has been stored and its queued link
    /// operations applied.
    fn after_save(_record: &mut Record<Self>) -> Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

enum LinkOp {
    Link { bean: Bean },
    Unlink { bean: Bean },
    UnlinkAll { bean_type: &'static str },
}

/// A typed record over a schema-less bean.
pub struct Record<M: Model> {
    bean: Bean,
    schema: Schema,
    link_ops: Vec<LinkOp>,
    validation_errors: BTreeMap<String, Vec<String>>,
    last_error: Option<String>,
    _model: PhantomData<M>,
}

impl<M: Model> Record<M> {
    fn build_schema() -> Schema {
        let mut schema = Schema::new();
        M::define(&mut schema);
        if M::STAMPABLE {
            schema.add(Column::new("created_at").column_type(ColumnType::DateTime));
            schema.add(Column::new("modified_at").column_type(ColumnType::DateTime));
        }
        schema
    }

    fn wrap(mut bean: Bean) -> Result<Self> {
        if bean.type_name() != M::BEAN_TYPE {
            return Err(Error::invalid_input(format!(
                "bean type '{}' does not match model type '{}'",
                bean.type_name(),
                M::BEAN_TYPE
            )));
        }
        let schema = Self::build_schema();
        bean.set_unique_hint(schema.unique_columns());
        for column in schema.iter() {
            if let Some(default) = column.get_default() {
                let unset = bean
                    .get(column.name())
                    .map_or(true, |v| matches!(v, Value::Null));
                if unset {
                    bean.set(column.name(), default.clone())?;
                }
            }
        }
        Ok(Self {
            bean,
            schema,
            link_ops: Vec::new(),
            validation_errors: BTreeMap::new(),
            last_error: None,
            _model: PhantomData,
        })
    }

    /// Dispense a fresh, unsaved record with defaults applied.
    pub fn new(oodb: &Oodb) -> Result<Self> {
        Self::wrap(oodb.dispense(M::BEAN_TYPE)?)
    }

    /// Load a record by id. A missing row yields an unsaved record, like
    /// the engine's `load`.
    pub fn load(oodb: &Oodb, id: i64) -> Result<Self> {
        Self::wrap(oodb.load(M::BEAN_TYPE, id)?)
    }

    /// Wrap an already-loaded bean.
    pub fn from_bean(bean: Bean) -> Result<Self> {
        Self::wrap(bean)
    }

    /// Hydrate a fresh record from raw values, running each through the
    /// setter pipeline.
    pub fn from_map(oodb: &Oodb, values: BTreeMap<String, Value>) -> Result<Self> {
        let mut record = Self::new(oodb)?;
        for (name, value) in values {
            record.set(&name, value)?;
        }
        Ok(record)
    }

    pub fn id(&self) -> i64 {
        self.bean.id()
    }

    pub fn is_saved(&self) -> bool {
        self.bean.is_saved()
    }

    pub fn bean(&self) -> &Bean {
        &self.bean
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Set a property. Declared columns run through formatters, coercion by
    /// declared type, and the length check; undeclared names pass through
    /// untyped, as the fluid engine permits.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let mut value = value.into();
        if let Some(column) = self.schema.get(name) {
            value = apply_column(column, value)?;
        }
        self.bean.set(name, value)
    }

    /// Set a datetime column from a timestamp.
    pub fn set_datetime(&mut self, name: &str, when: DateTime<Utc>) -> Result<()> {
        self.set(name, Value::Text(when.format(DATETIME_FORMAT).to_string()))
    }

    /// Serialize structured data into a column.
    pub fn set_serialized(&mut self, name: &str, value: &serde_json::Value) -> Result<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| Error::internal(format!("serialization failed: {}", e)))?;
        self.set(name, Value::Text(json))
    }

    /// Raw stored value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bean.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.bean.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.bean.get(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.bean.get(name).and_then(Value::as_bool)
    }

    /// Decode a datetime column.
    pub fn get_datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        let text = self.get_str(name)?;
        NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }

    /// Decode a serialized column. Returns `None` for unset or null values;
    /// malformed stored JSON is an error.
    pub fn get_serialized(&self, name: &str) -> Result<Option<serde_json::Value>> {
        match self.get_str(name) {
            Some(text) => serde_json::from_str(text)
                .map(Some)
                .map_err(|e| Error::internal(format!("stored value is not valid JSON: {}", e))),
            None => Ok(None),
        }
    }

    /// Export the declared columns.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.schema
            .iter()
            .map(|c| {
                let value = self.bean.get(c.name()).cloned().unwrap_or(Value::Null);
                (c.name().to_string(), value)
            })
            .collect()
    }

    /// Run all column validators, collecting failures per column.
    ///
    /// A blank value on a column without `NotBlank` skips that column; a
    /// blank value on a `NotBlank` column fails without running the other
    /// validators.
    pub fn validate(&mut self) -> bool {
        self.validation_errors.clear();
        self.last_error = None;
        let mut valid = true;

        for column in self.schema.iter() {
            if column.validators().is_empty() {
                continue;
            }
            let value = self.bean.get(column.name()).cloned().unwrap_or(Value::Null);
            let has_notblank = column
                .validators()
                .iter()
                .any(|v| matches!(v, crate::Validator::NotBlank));

            if value.is_blank() {
                if has_notblank {
                    record_failure(
                        &mut self.validation_errors,
                        &mut self.last_error,
                        column,
                        "notblank",
                        "not blank",
                    );
                    valid = false;
                }
                continue;
            }

            for validator in column.validators() {
                if matches!(validator, crate::Validator::NotBlank) {
                    continue;
                }
                if !validator.check(&value) {
                    record_failure(
                        &mut self.validation_errors,
                        &mut self.last_error,
                        column,
                        validator.name(),
                        validator.name(),
                    );
                    valid = false;
                }
            }
        }
        valid
    }

    /// Per-column validation failures from the last `validate` run.
    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.validation_errors
    }

    /// The most recent validation failure as `label: validator`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Queue a link to another record, applied on save.
    pub fn link<N: Model>(&mut self, other: &Record<N>) {
        self.link_ops.push(LinkOp::Link {
            bean: other.bean.clone(),
        });
    }

    /// Queue removal of a link to another record, applied on save.
    pub fn unlink<N: Model>(&mut self, other: &Record<N>) {
        self.link_ops.push(LinkOp::Unlink {
            bean: other.bean.clone(),
        });
    }

    /// Queue removal of all links to records of the given type, applied on
    /// save.
    pub fn unlink_all<N: Model>(&mut self) {
        self.link_ops.push(LinkOp::UnlinkAll {
            bean_type: N::BEAN_TYPE,
        });
    }

    /// Related records of the given type.
    pub fn related<N: Model>(&self, oodb: &Oodb) -> Result<Vec<Record<N>>> {
        let assoc = AssociationManager::new(oodb.clone());
        let ids = assoc.related(&self.bean, N::BEAN_TYPE)?;
        oodb.batch(N::BEAN_TYPE, &ids)?
            .into_iter()
            .map(Record::from_bean)
            .collect()
    }

    /// Run the `before_save` hook, validate, stamp, store, apply queued
    /// link operations, then run the `after_save` hook.
    ///
    /// Validation failure aborts with `Error::Validation` carrying the last
    /// failure message, and the record stays unpersisted.
    pub fn save(&mut self, oodb: &Oodb) -> Result<i64> {
        M::before_save(self)?;
        if !self.validate() {
            let message = self
                .last_error
                .clone()
                .unwrap_or_else(|| "unknown".to_string());
            return Err(Error::validation(format!(
                "record validation error. {}",
                message
            )));
        }

        if M::STAMPABLE {
            let now = Utc::now();
            let created_unset = self
                .bean
                .get("created_at")
                .map_or(true, Value::is_blank);
            if created_unset {
                self.set_datetime("created_at", now)?;
            }
            self.set_datetime("modified_at", now)?;
        }

        oodb.store(&mut self.bean)?;

        let assoc = AssociationManager::new(oodb.clone());
        for op in std::mem::take(&mut self.link_ops) {
            match op {
                LinkOp::Link { mut bean } => assoc.associate(&mut self.bean, &mut bean)?,
                LinkOp::Unlink { bean } => assoc.unassociate(&self.bean, &bean)?,
                LinkOp::UnlinkAll { bean_type } => assoc.clear_relations(&self.bean, bean_type)?,
            }
        }
        M::after_save(self)?;
        tracing::debug!(type_name = M::BEAN_TYPE, id = self.bean.id(), "saved record");
        Ok(self.bean.id())
    }

    /// Delete the record's row.
    pub fn trash(&self, oodb: &Oodb) -> Result<()> {
        oodb.trash(&self.bean)
    }

    /// Find records with a raw SQL WHERE fragment. Unknown table or column
    /// yields an empty collection.
    pub fn find(oodb: &Oodb, where_sql: &str, params: &[Value]) -> Result<Vec<Self>> {
        oodb.find(M::BEAN_TYPE, where_sql, params)?
            .into_iter()
            .map(Self::from_bean)
            .collect()
    }

    /// First matching record, if any.
    pub fn find_one(oodb: &Oodb, where_sql: &str, params: &[Value]) -> Result<Option<Self>> {
        let limited = format!("{} LIMIT 1", where_sql);
        Ok(Self::find(oodb, &limited, params)?.into_iter().next())
    }

    /// Number of matching records.
    pub fn count(oodb: &Oodb, where_sql: &str, params: &[Value]) -> Result<usize> {
        Ok(Self::find(oodb, where_sql, params)?.len())
    }
}

fn record_failure(
    errors: &mut BTreeMap<String, Vec<String>>,
    last_error: &mut Option<String>,
    column: &Column,
    validator: &str,
    message: &str,
) {
    *last_error = Some(format!("{}: {}", column.label(), validator));
    errors
        .entry(column.name().to_string())
        .or_default()
        .push(message.to_string());
}

/// Run the setter pipeline for a declared column: formatters on text, then
/// coercion by declared type, then the length check.
fn apply_column(column: &Column, value: Value) -> Result<Value> {
    let value = match value {
        Value::Text(mut text) => {
            for formatter in column.formatters() {
                text = formatter.apply(&text, column.get_length());
            }
            Value::Text(text)
        }
        other => other,
    };

    let value = coerce(column.get_type(), value);

    if let (Some(limit), Value::Text(text)) = (column.get_length(), &value) {
        if text.chars().count() > limit {
            return Err(Error::LengthExceeded {
                column: column.name().to_string(),
                limit,
            });
        }
    }
    Ok(value)
}

fn coerce(column_type: ColumnType, value: Value) -> Value {
    if matches!(value, Value::Null) {
        return Value::Null;
    }
    match column_type {
        ColumnType::Str | ColumnType::Serialized => value,
        ColumnType::Int => match value {
            Value::Int(_) => value,
            Value::Bool(b) => Value::Int(b as i64),
            Value::Real(f) => Value::Int(f as i64),
            Value::Text(s) => Value::Int(s.trim().parse().unwrap_or(0)),
            Value::Null => Value::Null,
        },
        ColumnType::Bool => match value {
            Value::Bool(_) => value,
            Value::Int(i) => Value::Bool(i != 0),
            Value::Real(f) => Value::Bool(f != 0.0),
            Value::Text(s) => Value::Bool(!s.is_empty() && s != "0"),
            Value::Null => Value::Null,
        },
        ColumnType::DateTime => match value {
            // Epoch seconds become the canonical datetime text.
            Value::Int(secs) => match Utc.timestamp_opt(secs, 0).single() {
                Some(when) => Value::Text(when.format(DATETIME_FORMAT).to_string()),
                None => Value::Null,
            },
            other => other,
        },
    }
}
