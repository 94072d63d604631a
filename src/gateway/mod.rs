//! The agent tool-bridge: a JSON-RPC gateway exposing the tracker's domain
//! operations as a fixed set of callable tools.
//!
//! Dispatch is driven entirely by the [`catalog`]: unknown tools fail with
//! method-not-found, declared arguments are validated before any store
//! access, and every handler result is wrapped in the same single-text-block
//! envelope. A fault inside a handler is converted to an internal error
//! response; nothing escapes the boundary unformatted.

pub mod catalog;
pub mod matcher;
pub mod protocol;

use anyhow::anyhow;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use devtrack_core::db::Database;
use devtrack_core::models::*;

use catalog::{ParamKind, ToolDescriptor};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Arguments failed the tool's contract. Raised before any store access
    /// for catalog violations, or by handlers for malformed ids.
    #[error("{0}")]
    InvalidParams(String),
    /// The underlying operation failed after validation passed.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct Gateway {
    db: Database,
}

impl Gateway {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Handle one JSON-RPC request. Stateless and single-shot: the response
    /// always echoes the request id, and errors are returned, never thrown.
    pub fn handle(&self, request: &Value) -> Value {
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = request.get("method").and_then(Value::as_str).unwrap_or("");

        match method {
            "tools/list" => protocol::success_response(id, catalog::render_tools()),
            "tools/call" => self.handle_call(id, request.get("params")),
            other => protocol::error_response(
                id,
                protocol::METHOD_NOT_FOUND,
                &format!("Method not found: {other}"),
            ),
        }
    }

    fn handle_call(&self, id: Value, params: Option<&Value>) -> Value {
        let empty = json!({});
        let params = params.unwrap_or(&empty);
        let name = params.get("name").and_then(Value::as_str).unwrap_or("");
        let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        let Some(tool) = catalog::descriptor(name) else {
            return protocol::error_response(
                id,
                protocol::METHOD_NOT_FOUND,
                &format!("Unknown tool: {name}"),
            );
        };

        // Fail fast: no store access happens until the arguments pass the
        // tool's declared contract.
        if let Err(message) = validate_args(tool, &args) {
            return protocol::error_response(id, protocol::INVALID_PARAMS, &message);
        }

        tracing::info!(tool = name, "dispatching tool call");
        match self.dispatch(name, &args) {
            Ok(text) => protocol::success_response(id, protocol::text_result(text)),
            Err(GatewayError::InvalidParams(message)) => {
                protocol::error_response(id, protocol::INVALID_PARAMS, &message)
            }
            Err(GatewayError::Internal(e)) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                protocol::error_response(id, protocol::INTERNAL_ERROR, &e.to_string())
            }
        }
    }

    fn dispatch(&self, name: &str, args: &Value) -> Result<String, GatewayError> {
        match name {
            "list_projects" => self.list_projects(),
            "update_project_progress" => self.update_project_progress(args),
            "log_ai_action" => self.log_ai_action(args),
            "get_tasks" => self.get_tasks(args),
            "read_context_dump" => self.read_context_dump(args),
            "update_project_local_path" => self.update_project_local_path(args),
            "list_project_files" => self.list_project_files(args),
            "add_task" => self.add_task(args),
            "mark_task_done" => self.mark_task_done(args),
            "create_context_dump" => self.create_context_dump(args),
            // descriptor() already vetted the name; the catalog and this
            // table list the same tools.
            other => Err(GatewayError::Internal(anyhow!("no handler for tool: {other}"))),
        }
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    fn list_projects(&self) -> Result<String, GatewayError> {
        let projects = self.db.get_all_projects()?;
        Ok(to_pretty_json(&projects)?)
    }

    fn update_project_progress(&self, args: &Value) -> Result<String, GatewayError> {
        let project_id = uuid_arg(args, "projectId")?;
        let progress = args
            .get("progress")
            .and_then(Value::as_i64)
            .ok_or_else(|| GatewayError::InvalidParams("Parameter progress must be an integer".into()))?;

        if !self.db.update_project_progress(project_id, progress)? {
            return Err(anyhow!("Project {project_id} not found").into());
        }
        Ok(format!("Project progress updated to {progress}%"))
    }

    fn log_ai_action(&self, args: &Value) -> Result<String, GatewayError> {
        let entry = self.db.append_ai_log(CreateAiLogInput {
            command: str_arg(args, "command").to_string(),
            status: str_arg(args, "status").to_string(),
            interpreted_action: opt_str_arg(args, "interpreted_action").map(str::to_string),
            result: args.get("result").filter(|v| !v.is_null()).cloned(),
            execution_time_ms: args.get("execution_time_ms").and_then(Value::as_i64),
        })?;
        Ok(format!("Action logged with id: {}", entry.id))
    }

    fn get_tasks(&self, args: &Value) -> Result<String, GatewayError> {
        let project_id = uuid_arg(args, "projectId")?;
        let tasks = self.db.get_pending_tasks(project_id)?;
        Ok(to_pretty_json(&tasks)?)
    }

    fn read_context_dump(&self, args: &Value) -> Result<String, GatewayError> {
        let project_id = uuid_arg(args, "projectId")?;
        // Absence of a dump is a normal state, not a fault.
        match self.db.latest_context_dump(project_id)? {
            Some(dump) => Ok(to_pretty_json(&dump)?),
            None => Ok("No dump found".to_string()),
        }
    }

    fn update_project_local_path(&self, args: &Value) -> Result<String, GatewayError> {
        let project_id = uuid_arg(args, "projectId")?;
        let local_path = str_arg(args, "localPath").trim();

        if !self.db.update_project_local_path(project_id, local_path)? {
            return Err(anyhow!("Project {project_id} not found").into());
        }
        Ok(format!("Project local path updated to {local_path}"))
    }

    fn list_project_files(&self, args: &Value) -> Result<String, GatewayError> {
        let project_id = uuid_arg(args, "projectId")?;
        let project = self
            .db
            .get_project(project_id)?
            .ok_or_else(|| anyhow!("Project {project_id} not found"))?;

        // The tracker never touches the filesystem here; the agent does its
        // own listing with the path we hand back.
        match project.local_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => Ok(format!(
                "Project local path: {path}\n\
                 List the files in this directory with your own file tools; \
                 the tracker does not read the filesystem."
            )),
            _ => Ok("No local path configured for this project. \
                     Set one with update_project_local_path first."
                .to_string()),
        }
    }

    fn add_task(&self, args: &Value) -> Result<String, GatewayError> {
        let project_id = uuid_arg(args, "projectId")?;
        let content = str_arg(args, "content").trim().to_string();
        let version_id = opt_uuid_arg(args, "versionId")?;
        let priority = opt_str_arg(args, "priority").and_then(Priority::from_str);

        let task = self.db.create_task(
            project_id,
            CreateTaskInput { content, version_id, priority },
        )?;
        Ok(format!("Task created with id: {}", task.id))
    }

    fn mark_task_done(&self, args: &Value) -> Result<String, GatewayError> {
        let project_id = uuid_arg(args, "projectId")?;
        let search = str_arg(args, "taskContent");

        let pending = self.db.get_pending_tasks(project_id)?;
        if pending.is_empty() {
            return Ok("No pending tasks for this project".to_string());
        }

        match matcher::find_match(search, &pending) {
            Some(task) => {
                self.db.complete_task(task.id)?;
                Ok(format!("Marked task as done: \"{}\"", task.content))
            }
            // A failed fuzzy match is an expected outcome; list the pending
            // tasks so the agent can retry with corrected text.
            None => {
                let mut text = format!("No matching task found for \"{search}\". Pending tasks:");
                for task in &pending {
                    text.push_str("\n- ");
                    text.push_str(&task.content);
                }
                Ok(text)
            }
        }
    }

    fn create_context_dump(&self, args: &Value) -> Result<String, GatewayError> {
        let project_id = uuid_arg(args, "projectId")?;
        let mental_model = str_arg(args, "mentalModel").trim().to_string();
        let next_step_prompt = opt_str_arg(args, "nextStepPrompt")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let workspace_location =
            opt_str_arg(args, "workspaceLocation").and_then(WorkspaceLocation::from_str);

        let dump = self.db.create_context_dump(
            project_id,
            CreateContextDumpInput { mental_model, next_step_prompt, workspace_location },
        )?;
        Ok(format!(
            "Context dump created with id: {} at {}",
            dump.id,
            dump.created_at.to_rfc3339()
        ))
    }
}

// ----------------------------------------------------------------------
// Catalog-driven validation
// ----------------------------------------------------------------------

/// Check `args` against the tool's declared parameters. Every required
/// field is validated regardless of type; enum values are checked whenever
/// the argument is present.
fn validate_args(tool: &ToolDescriptor, args: &Value) -> Result<(), String> {
    for param in tool.params {
        match args.get(param.name) {
            None | Some(Value::Null) => {
                if param.required {
                    return Err(format!("Missing required parameter: {}", param.name));
                }
            }
            Some(value) => check_param(param.name, param.kind, param.required, value)?,
        }
    }
    Ok(())
}

fn check_param(
    name: &str,
    kind: ParamKind,
    required: bool,
    value: &Value,
) -> Result<(), String> {
    match kind {
        ParamKind::String => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("Parameter {name} must be a string"))?;
            if required && s.trim().is_empty() {
                return Err(format!("Parameter {name} must not be empty"));
            }
        }
        ParamKind::Number => {
            if !value.is_number() {
                return Err(format!("Parameter {name} must be a number"));
            }
        }
        ParamKind::Object => {
            if !value.is_object() {
                return Err(format!("Parameter {name} must be an object"));
            }
        }
        ParamKind::Enum(allowed) => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("Parameter {name} must be a string"))?;
            if !allowed.contains(&s) {
                return Err(format!(
                    "Parameter {name} must be one of: {}",
                    allowed.join(", ")
                ));
            }
        }
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Argument helpers
// ----------------------------------------------------------------------

fn str_arg<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or("")
}

fn opt_str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn uuid_arg(args: &Value, key: &str) -> Result<Uuid, GatewayError> {
    let raw = str_arg(args, key);
    Uuid::parse_str(raw.trim())
        .map_err(|e| GatewayError::InvalidParams(format!("Invalid {key}: {e}")))
}

fn opt_uuid_arg(args: &Value, key: &str) -> Result<Option<Uuid>, GatewayError> {
    opt_str_arg(args, key)
        .map(|raw| {
            Uuid::parse_str(raw.trim())
                .map_err(|e| GatewayError::InvalidParams(format!("Invalid {key}: {e}")))
        })
        .transpose()
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, GatewayError> {
    serde_json::to_string_pretty(value).map_err(|e| GatewayError::Internal(e.into()))
}
