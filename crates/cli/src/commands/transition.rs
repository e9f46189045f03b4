use std::path::Path;
use std::process;

use problemflow_engine::{
    DisplayValueMode, Projector, RenderOptions, SubmittedFields, TransitionError,
    TransitionExecutor, TransitionRequest,
};
use problemflow_storage::{MemoryStore, SeedFile, StorageError};

use crate::serve::config::{with_trailing_slash, INSTANCE_URL_VAR};
use crate::{report_error, OutputFormat};

/// Link base used when neither `--instance-url` nor the environment sets one.
const DEFAULT_INSTANCE_URL: &str = "http://localhost:8080/";

/// Arguments of `problemflow transition`.
pub(crate) struct TransitionArgs<'a> {
    pub(crate) seed: &'a Path,
    pub(crate) number: String,
    pub(crate) new_state: String,
    pub(crate) data: Option<&'a str>,
    pub(crate) display_value: Option<&'a str>,
    pub(crate) exclude_reference_link: bool,
    pub(crate) fields: Option<&'a str>,
    pub(crate) instance_url: Option<String>,
}

/// Parse `--data` into submitted fields. Must be a JSON object.
fn parse_data(raw: Option<&str>) -> Result<SubmittedFields, String> {
    let Some(raw) = raw else {
        return Ok(SubmittedFields::new());
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(fields)) => Ok(fields),
        Ok(_) => Err("--data must be a JSON object".to_string()),
        Err(e) => Err(format!("error parsing --data: {}", e)),
    }
}

fn instance_url(flag: Option<String>) -> String {
    let url = flag
        .or_else(|| std::env::var(INSTANCE_URL_VAR).ok())
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_INSTANCE_URL.to_string());
    with_trailing_slash(url.trim())
}

async fn load_store(seed: &Path) -> Result<MemoryStore, StorageError> {
    MemoryStore::from_seed(SeedFile::from_path(seed)?).await
}

pub(crate) fn cmd_transition(args: TransitionArgs<'_>, output: OutputFormat, quiet: bool) {
    let data = match parse_data(args.data) {
        Ok(d) => d,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let options = RenderOptions {
        display_value: args
            .display_value
            .and_then(|v| v.parse::<DisplayValueMode>().ok())
            .unwrap_or_default(),
        exclude_reference_link: args.exclude_reference_link,
        fields: args.fields.and_then(crate::serve::parse_field_list),
    };
    let request = TransitionRequest {
        problem_number: args.number,
        new_state: args.new_state,
        data,
        options,
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to create tokio runtime: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let store = match rt.block_on(load_store(args.seed)) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };
    let executor = TransitionExecutor::new(store, Projector::new(instance_url(args.instance_url)));

    match rt.block_on(executor.execute(&request)) {
        Ok(result) => {
            let response = serde_json::json!({ "result": result });
            match serde_json::to_string_pretty(&response) {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    report_error(&format!("error serializing result: {}", e), output, quiet);
                    process::exit(1);
                }
            }
        }
        Err(e) => {
            report_transition_error(&e, output, quiet);
            process::exit(1);
        }
    }
}

fn report_transition_error(error: &TransitionError, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", error),
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::json!({ "error": error.to_string(), "kind": error.kind() })
        ),
    }
}
