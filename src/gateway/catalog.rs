//! The closed catalog of tools the gateway exposes.
//!
//! This table is the single source of truth for dispatch: a tool that is not
//! declared here cannot be called, and the dispatcher validates every
//! argument against the declared [`ParamSpec`]s before touching the store.

use serde_json::{json, Map, Value};

pub const PRIORITY_VALUES: &[&str] = &["none", "low", "medium", "high"];
pub const LOCATION_VALUES: &[&str] = &["office", "home"];

#[derive(Debug, Clone, Copy)]
pub enum ParamKind {
    String,
    Number,
    Object,
    Enum(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

const fn required(name: &'static str, description: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec { name, description, kind, required: true }
}

const fn optional(name: &'static str, description: &'static str, kind: ParamKind) -> ParamSpec {
    ParamSpec { name, description, kind, required: false }
}

pub const TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: "list_projects",
        description: "List every tracked project with its id, name, progress percentage, and \
                      local path. Call this first to discover project ids for the other tools.",
        params: &[],
    },
    ToolDescriptor {
        name: "update_project_progress",
        description: "Overwrite a project's completion percentage (0-100).",
        params: &[
            required("projectId", "Id of the project to update", ParamKind::String),
            required("progress", "New completion percentage, 0-100", ParamKind::Number),
        ],
    },
    ToolDescriptor {
        name: "log_ai_action",
        description: "Append an entry to the AI action log. Record every command you execute on \
                      behalf of the user, together with its outcome.",
        params: &[
            required("command", "The raw command or instruction that was executed", ParamKind::String),
            required("status", "Outcome status, e.g. 'success' or 'error'", ParamKind::String),
            optional("interpreted_action", "How the command was interpreted", ParamKind::String),
            optional("result", "Structured result payload of the action", ParamKind::Object),
            optional("execution_time_ms", "Wall-clock execution time in milliseconds", ParamKind::Number),
        ],
    },
    ToolDescriptor {
        name: "get_tasks",
        description: "List the pending (not done) tasks for a project.",
        params: &[required("projectId", "Id of the project to inspect", ParamKind::String)],
    },
    ToolDescriptor {
        name: "read_context_dump",
        description: "Read the most recent context dump for a project: the mental model and \
                      next-step prompt left behind by the previous session. Returns 'No dump \
                      found' when the project has none yet.",
        params: &[required("projectId", "Id of the project to read", ParamKind::String)],
    },
    ToolDescriptor {
        name: "update_project_local_path",
        description: "Store the local filesystem path where a project's code lives.",
        params: &[
            required("projectId", "Id of the project to update", ParamKind::String),
            required("localPath", "Absolute path to the project directory", ParamKind::String),
        ],
    },
    ToolDescriptor {
        name: "list_project_files",
        description: "Look up a project's stored local path. The tracker never reads the \
                      filesystem itself; use your own file tools on the returned path.",
        params: &[required("projectId", "Id of the project to look up", ParamKind::String)],
    },
    ToolDescriptor {
        name: "add_task",
        description: "Create a new pending task in a project. Optionally assign it to a version \
                      and give it a priority.",
        params: &[
            required("projectId", "Id of the project the task belongs to", ParamKind::String),
            required("content", "Task description; must not be empty", ParamKind::String),
            optional("versionId", "Id of the version to assign the task to", ParamKind::String),
            optional("priority", "Task priority", ParamKind::Enum(PRIORITY_VALUES)),
        ],
    },
    ToolDescriptor {
        name: "mark_task_done",
        description: "Mark a pending task as done, resolved by fuzzy text match. You do not need \
                      the task id: pass any text that contains, or is contained in, the task's \
                      content. On a failed match the pending tasks are listed so you can retry.",
        params: &[
            required("projectId", "Id of the project the task belongs to", ParamKind::String),
            required("taskContent", "Free text identifying the task to complete", ParamKind::String),
        ],
    },
    ToolDescriptor {
        name: "create_context_dump",
        description: "Persist a context dump for the next session: your current mental model of \
                      the project and, optionally, a prompt for the next step.",
        params: &[
            required("projectId", "Id of the project the dump belongs to", ParamKind::String),
            required("mentalModel", "Your working understanding of the project state", ParamKind::String),
            optional("nextStepPrompt", "Suggested prompt to resume work with", ParamKind::String),
            optional("workspaceLocation", "Where the work happened", ParamKind::Enum(LOCATION_VALUES)),
        ],
    },
];

/// Look up a tool by name. `None` means the call must fail with
/// method-not-found; nothing outside this table is ever dispatched.
pub fn descriptor(name: &str) -> Option<&'static ToolDescriptor> {
    TOOLS.iter().find(|t| t.name == name)
}

/// Render the catalog as the `tools/list` result, with a JSON-Schema-shaped
/// `inputSchema` per tool.
pub fn render_tools() -> Value {
    let tools: Vec<Value> = TOOLS
        .iter()
        .map(|tool| {
            let mut properties = Map::new();
            let mut required_names = Vec::new();
            for param in tool.params {
                properties.insert(param.name.to_string(), render_param(param));
                if param.required {
                    required_names.push(param.name);
                }
            }
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": {
                    "type": "object",
                    "properties": properties,
                    "required": required_names,
                },
            })
        })
        .collect();
    json!({ "tools": tools })
}

fn render_param(param: &ParamSpec) -> Value {
    match param.kind {
        ParamKind::String => json!({
            "type": "string",
            "description": param.description,
        }),
        ParamKind::Number => json!({
            "type": "number",
            "description": param.description,
        }),
        ParamKind::Object => json!({
            "type": "object",
            "description": param.description,
        }),
        ParamKind::Enum(values) => json!({
            "type": "string",
            "enum": values,
            "description": param.description,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_closed_and_stable() {
        let names: Vec<_> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            [
                "list_projects",
                "update_project_progress",
                "log_ai_action",
                "get_tasks",
                "read_context_dump",
                "update_project_local_path",
                "list_project_files",
                "add_task",
                "mark_task_done",
                "create_context_dump",
            ]
        );
    }

    #[test]
    fn lookup_is_exact() {
        assert!(descriptor("add_task").is_some());
        assert!(descriptor("Add_Task").is_none());
        assert!(descriptor("").is_none());
    }

    #[test]
    fn rendered_schema_lists_required_params() {
        let rendered = render_tools();
        let tools = rendered["tools"].as_array().unwrap();
        assert_eq!(tools.len(), TOOLS.len());

        let add_task = tools.iter().find(|t| t["name"] == "add_task").unwrap();
        let required = add_task["inputSchema"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 2);
        assert!(required.contains(&"projectId".into()));
        assert!(required.contains(&"content".into()));

        let priority = &add_task["inputSchema"]["properties"]["priority"];
        assert_eq!(priority["enum"].as_array().unwrap().len(), 4);
    }
}
