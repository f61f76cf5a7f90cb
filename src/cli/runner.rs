use serde_json::json;
use std::io::Write;

use super::command::Command;
use crate::context::RequestContext;
use crate::errors::DbError;
use crate::query::QueryParams;
use crate::record::Record;
use crate::service::RecordService;
use crate::store::RecordStore;
use crate::types::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Human,
    Plain,
    Json,
}

/// Everything a command needs besides the command itself.
pub struct Session<'a, S: RecordStore> {
    pub service: &'a RecordService<S>,
    pub user: &'a User,
    pub base_path: &'a str,
}

fn to_json_line(v: &serde_json::Value) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "{}".into())
}

/// Runs one command and renders its result to `out`.
///
/// # Errors
/// Validation failures, conflicts and missing records come back as `DbError` so the caller can
/// turn them into a non-zero exit status. Output is only written for successful commands.
pub fn run_with_format<S: RecordStore>(
    session: &Session<'_, S>,
    cmd: Command,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<(), DbError> {
    let ctx = RequestContext::new();
    let svc = session.service;
    match cmd {
        Command::Insert { json } => {
            let id = svc.insert(&ctx, session.user, Record::from_json_str(&json)?)?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", json!({"action": "inserted", "id": id.to_hex()}))?,
                OutputMode::Plain => writeln!(out, "{id}")?,
                OutputMode::Human => writeln!(out, "inserted id={id}")?,
            }
        }
        Command::Get { id } => {
            let rec = svc.get(&ctx, &id)?;
            match mode {
                OutputMode::Json | OutputMode::Plain => writeln!(out, "{}", to_json_line(&rec.to_json()))?,
                OutputMode::Human => {
                    writeln!(out, "{}", serde_json::to_string_pretty(&rec.to_json()).unwrap_or_default())?;
                }
            }
        }
        Command::Find { query } => {
            let list = svc.find(&ctx, session.base_path, &QueryParams::parse(&query))?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", to_json_line(&list.to_json()))?,
                OutputMode::Plain => {
                    for rec in &list.records {
                        writeln!(out, "{}", to_json_line(&rec.to_json()))?;
                    }
                }
                OutputMode::Human => {
                    for rec in &list.records {
                        writeln!(out, "{}", to_json_line(&rec.to_json()))?;
                    }
                    writeln!(out, "page={} count={} returned={}", list.page, list.count, list.records.len())?;
                    for link in &list.links {
                        writeln!(out, "{}: {}", link.rel, link.href)?;
                    }
                    for w in &list.warnings {
                        writeln!(out, "warning: {w}")?;
                    }
                }
            }
        }
        Command::Count { query } => {
            let n = svc.count(&ctx, &QueryParams::parse(&query))?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", json!({"count": n}))?,
                OutputMode::Plain => writeln!(out, "{n}")?,
                OutputMode::Human => writeln!(out, "count={n}")?,
            }
        }
        Command::Update { id, json } => {
            let (rid, version) = svc.update(&ctx, session.user, &id, Record::from_json_str(&json)?)?.into_result()?;
            match mode {
                OutputMode::Json => {
                    writeln!(out, "{}", json!({"action": "updated", "id": rid.to_hex(), "version": version}))?;
                }
                OutputMode::Plain => writeln!(out, "{rid} {version}")?,
                OutputMode::Human => writeln!(out, "updated id={rid} version={version}")?,
            }
        }
        Command::Delete { id } => {
            svc.delete(&ctx, session.user, &id)?;
            match mode {
                OutputMode::Json => writeln!(out, "{}", json!({"action": "deleted", "id": id}))?,
                OutputMode::Plain => writeln!(out, "{id}")?,
                OutputMode::Human => writeln!(out, "deleted id={id}")?,
            }
        }
    }
    Ok(())
}
