//! CLI command implementations
//!
//! Each command loads shapes and configuration, parses the query string,
//! validates it and returns the JSON payload written to stdout. `validate`
//! reports a rejection in its payload; `query` and `sql` treat it as an
//! error, so the process exits non-zero.

use std::path::Path;

use serde_json::{json, Map, Value};
use tracing::info;

use crate::config::ManagerConfig;
use crate::manager::FilterManager;
use crate::projection::project;
use crate::request::{RequestDataSource, RequestValidationStatus};
use crate::shape::{RecordShape, ShapeLoader};
use crate::source::{LazyCollection, SqlQuery};
use crate::value::Record;

use super::args::{Command, RequestArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, write_error, write_response};

/// Everything a command needs, resolved from its arguments
struct Context {
    model: RecordShape,
    entity: RecordShape,
    request: RequestDataSource,
    manager: FilterManager,
}

impl Context {
    fn load(args: &RequestArgs) -> CliResult<Self> {
        let mut config = match &args.config {
            Some(path) => ManagerConfig::load(path)?,
            None => ManagerConfig::default(),
        };
        if let Some(max_take) = args.max_take {
            config = config.with_max_take(max_take);
        }
        if let Some(format) = &args.date_format {
            config = config.with_date_format(format.clone());
        }
        config.validate()?;

        let mut loader = ShapeLoader::new();
        if args.shape.is_dir() {
            loader.load_dir(&args.shape)?;
        } else {
            loader.load_file(&args.shape)?;
        }

        let model = match &args.model {
            Some(name) => loader.require(name)?.clone(),
            None => only_shape(&loader)?,
        };
        let entity = match &args.entity {
            Some(name) => loader.require(name)?.clone(),
            None => model.backing_shape()?,
        };

        let request = RequestDataSource::parse_query(&args.query);

        Ok(Self {
            model,
            entity,
            request,
            manager: FilterManager::new(config),
        })
    }

    /// Loads the context and rejects requests that fail validation.
    fn load_valid(args: &RequestArgs) -> CliResult<Self> {
        let ctx = Self::load(args)?;
        ctx.request.ensure_valid(&ctx.model)?;
        Ok(ctx)
    }
}

fn only_shape(loader: &ShapeLoader) -> CliResult<RecordShape> {
    let mut shapes = loader.shapes();
    match (shapes.next(), shapes.next()) {
        (Some(shape), None) => Ok(shape.clone()),
        _ => Err(CliError::usage(format!(
            "--model is required when the shape file holds {} shapes",
            loader.len()
        ))),
    }
}

/// Parse arguments, run the command and print its response
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code(), &e.to_string())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Validate { request } => validate(&request),
        Command::Query { request, records } => query(&request, &records),
        Command::Sql { request, table } => sql(&request, table.as_deref()),
    }
}

/// Validates the query string against the model shape.
///
/// A rejected request is reported, not raised: the payload carries the
/// failing status and its reason.
pub fn validate(args: &RequestArgs) -> CliResult<Value> {
    let ctx = Context::load(args)?;

    let mut data = match ctx.request.ensure_valid(&ctx.model) {
        Ok(()) => json!({
            "validation": RequestValidationStatus::Valid.as_str(),
            "http_status": RequestValidationStatus::Valid.http_status(),
            "memory_stage": ctx.manager.requires_memory_stage(&ctx.model, &ctx.request),
        }),
        Err(e) => {
            let status = e.status();
            json!({
                "validation": status.as_str(),
                "http_status": status.http_status(),
                "reason": e.to_string(),
            })
        }
    };
    if let Value::Object(map) = &mut data {
        map.insert("filters".to_string(), ctx.request.filters.len().into());
        map.insert("sorts".to_string(), ctx.request.sorts.len().into());
    }
    Ok(data)
}

/// Runs both stages over the records file and projects the result
pub fn query(args: &RequestArgs, records_path: &Path) -> CliResult<Value> {
    let ctx = Context::load_valid(args)?;

    let rows = match read_json_file(records_path)? {
        Value::Array(rows) => rows,
        _ => {
            return Err(CliError::usage(format!(
                "{} must hold a JSON array of records",
                records_path.display()
            )))
        }
    };
    let total = rows.len();

    let fetched = ctx
        .manager
        .filter_remote(&ctx.model, &ctx.entity, LazyCollection::new(rows), &ctx.request)
        .collect();
    let fetched_count = fetched.len();

    let records: Vec<Value> = fetched
        .iter()
        .map(|row| to_model_record(&ctx.model, row))
        .collect();
    let records = ctx.manager.filter_memory(&ctx.model, records, &ctx.request);

    let projected = records
        .iter()
        .map(|r| project(&ctx.model, r, &ctx.request.fields).map(Value::Object))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        model = ctx.model.name(),
        total,
        fetched = fetched_count,
        returned = projected.len(),
        "query complete"
    );

    Ok(json!({
        "count": projected.len(),
        "records": projected,
    }))
}

/// Compiles the remote stage into SQL
pub fn sql(args: &RequestArgs, table: Option<&str>) -> CliResult<Value> {
    let ctx = Context::load_valid(args)?;
    let table = table.unwrap_or_else(|| ctx.entity.name());
    let columns: Vec<&str> = ctx.entity.fields().iter().map(|f| f.name.as_str()).collect();

    let statement = ctx
        .manager
        .filter_remote(
            &ctx.model,
            &ctx.entity,
            SqlQuery::new(table).with_columns(columns),
            &ctx.request,
        )
        .to_sql();

    let mut out = serde_json::to_value(&statement)?;
    if let Value::Object(map) = &mut out {
        map.insert(
            "memory_stage".to_string(),
            Value::Bool(ctx.manager.requires_memory_stage(&ctx.model, &ctx.request)),
        );
    }
    Ok(out)
}

/// Maps an entity row onto the model's declared names.
///
/// Stored fields are read under their backing name, computed-only fields
/// under their declared name.
fn to_model_record(model: &RecordShape, row: &Value) -> Value {
    let mut out = Map::with_capacity(model.fields().len());
    for def in model.fields() {
        let source_name = if def.is_computed_only() {
            def.name.as_str()
        } else {
            def.backing_name()
        };
        let value = row.value(source_name).map_or(Value::Null, |v| v.to_json());
        out.insert(def.name.clone(), value);
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::FieldDef;

    #[test]
    fn test_to_model_record_renames_backing_fields() {
        let model = RecordShape::builder("accounts")
            .field(FieldDef::text("DisplayName").backed_by("display_name"))
            .field(FieldDef::float("Score").computed_only())
            .build()
            .unwrap();
        let row = json!({"display_name": "Acme", "Score": 4.5, "unrelated": 1});

        assert_eq!(
            to_model_record(&model, &row),
            json!({"DisplayName": "Acme", "Score": 4.5})
        );
    }

    #[test]
    fn test_only_shape_requires_single() {
        let mut loader = ShapeLoader::new();
        assert!(matches!(only_shape(&loader), Err(CliError::Usage(_))));

        loader
            .load_str(r#"{"name": "a", "fields": [{"name": "x", "type": "int"}]}"#)
            .unwrap();
        assert_eq!(only_shape(&loader).unwrap().name(), "a");

        loader
            .load_str(r#"{"name": "b", "fields": [{"name": "x", "type": "int"}]}"#)
            .unwrap();
        assert!(matches!(only_shape(&loader), Err(CliError::Usage(_))));
    }
}
