//! HTML to text conversion via `html-to-markdown-rs`.
//!
//! The output is Markdown, which keeps headings and lists readable as plain
//! text. Large documents are converted on a thread with a bigger stack since
//! deeply nested markup recurses in the converter.

use crate::core::fault::contain;
use crate::error::{DocsiftError, Result};
use html_to_markdown_rs::{ConversionOptions, PreprocessingOptions, convert};
use std::panic;
use std::thread;

const LARGE_HTML_STACK_THRESHOLD_BYTES: usize = 512 * 1024;
const HTML_CONVERSION_STACK_SIZE_BYTES: usize = 16 * 1024 * 1024;
const OPERATION: &str = "convert text/html";

fn conversion_options() -> ConversionOptions {
    ConversionOptions {
        extract_metadata: false,
        preprocessing: PreprocessingOptions {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn convert_on_current_stack(html: &str) -> Result<String> {
    convert(html, Some(conversion_options()))
        .map_err(|e| DocsiftError::backend(OPERATION, format!("failed to convert HTML: {}", e)))
}

/// Run `job` on a thread with a large stack.
///
/// The job runs under its own fault barrier, so a panic on that thread comes
/// back as `Fault` carrying that thread's backtrace.
fn run_on_dedicated_stack<F>(job: F) -> Result<String>
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("docsift-html-conversion".to_string())
        .stack_size(HTML_CONVERSION_STACK_SIZE_BYTES)
        .spawn(move || contain(job))
        .map_err(|e| DocsiftError::backend_with_source(OPERATION, "failed to spawn conversion thread", e))?;

    match handle.join() {
        Ok(result) => result,
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// Convert HTML bytes (decoded lossily as UTF-8) to Markdown text.
pub fn convert_html(bytes: &[u8]) -> Result<String> {
    let html = String::from_utf8_lossy(bytes);
    if html.len() >= LARGE_HTML_STACK_THRESHOLD_BYTES {
        let html = html.into_owned();
        run_on_dedicated_stack(move || convert_on_current_stack(&html))
    } else {
        convert_on_current_stack(&html)
    }
}
