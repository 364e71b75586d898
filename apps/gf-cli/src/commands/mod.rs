pub mod config;
pub mod goal;
pub mod sync;
pub mod validate;

use gf_workflow::ActionResult;
use serde::Serialize;

/// Print an operation envelope and translate it to process outcome.
///
/// JSON mode prints the whole envelope (and exits nonzero on failure);
/// human mode prints the message and hands the payload back to the caller
/// for any extra rendering.
pub(crate) fn finish<T: Serialize>(
    result: ActionResult<T>,
    json: bool,
) -> anyhow::Result<Option<T>> {
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.success {
            std::process::exit(1);
        }
        return Ok(None);
    }

    if !result.success {
        anyhow::bail!(result.message);
    }
    println!("{}", result.message);
    Ok(result.data)
}
