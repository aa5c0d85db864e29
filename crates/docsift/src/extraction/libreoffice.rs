//! Legacy Word (`.doc`) to text through headless LibreOffice.
//!
//! The bytes are written into a scratch directory, converted with
//! `soffice --headless --convert-to txt:Text`, and the resulting `.txt` is
//! read back. The scratch directory is removed when the call returns.
//! A run that exceeds [`DEFAULT_CONVERSION_TIMEOUT`] is killed and reported
//! as a backend error.
//!
//! LibreOffice must be installed. Discovery checks `DOCSIFT_LIBREOFFICE_PATH`,
//! `SOFFICE_PATH`, `LIBREOFFICE_PATH`, the usual install locations and `PATH`.

use crate::error::{DocsiftError, Result};
use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const OPERATION: &str = "convert application/msword";
const TARGET_FILTER: &str = "txt:Text";

/// Upper bound on one `soffice` run before the process is killed.
pub const DEFAULT_CONVERSION_TIMEOUT: Duration = Duration::from_secs(300);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn libreoffice_install_message() -> String {
    "LibreOffice (soffice/libreoffice) is required for .doc support. \
Install: macOS: 'brew install --cask libreoffice', \
Linux: 'apt install libreoffice', \
Windows: 'winget install LibreOffice.LibreOffice'. \
If LibreOffice is installed in a custom location, set DOCSIFT_LIBREOFFICE_PATH to the soffice executable."
        .to_string()
}

fn soffice_candidates() -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push_candidate = |path: PathBuf| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    for var in ["DOCSIFT_LIBREOFFICE_PATH", "SOFFICE_PATH", "LIBREOFFICE_PATH"] {
        if let Some(value) = env::var_os(var).filter(|v| !v.is_empty()) {
            push_candidate(PathBuf::from(value));
        }
    }

    if cfg!(target_os = "macos") {
        push_candidate(PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"));
    }

    if cfg!(target_os = "windows") {
        push_candidate(PathBuf::from("C:\\Program Files\\LibreOffice\\program\\soffice.exe"));
    }

    if let Some(path_env) = env::var_os("PATH") {
        for dir in env::split_paths(&path_env) {
            push_candidate(dir.join("soffice"));
            push_candidate(dir.join("libreoffice"));
            push_candidate(dir.join("soffice.exe"));
        }
    }

    candidates
}

fn locate_soffice_binary() -> Result<PathBuf> {
    soffice_candidates()
        .into_iter()
        .find(|candidate| fs::metadata(candidate).is_ok_and(|m| m.is_file()))
        .ok_or_else(|| DocsiftError::backend(OPERATION, libreoffice_install_message()))
}

/// Convert legacy Word bytes to plain text.
pub fn convert_doc_to_text(doc_bytes: &[u8]) -> Result<String> {
    let soffice = locate_soffice_binary()?;

    let scratch = tempfile::Builder::new().prefix("docsift-doc-").tempdir()?;
    let input_path = scratch.path().join("input.doc");
    let output_dir = scratch.path().join("out");
    fs::create_dir_all(&output_dir)?;
    fs::write(&input_path, doc_bytes)?;

    run_conversion(&soffice, &input_path, &output_dir, DEFAULT_CONVERSION_TIMEOUT)?;

    let output_path = output_dir.join("input.txt");
    let converted = fs::read(&output_path).map_err(|e| {
        DocsiftError::backend_with_source(OPERATION, "conversion completed but output file not found", e)
    })?;

    Ok(String::from_utf8_lossy(&converted).into_owned())
}

fn run_conversion(soffice: &Path, input_path: &Path, output_dir: &Path, timeout: Duration) -> Result<()> {
    tracing::debug!("Converting {} with {}", input_path.display(), soffice.display());

    // Captured through files: a full pipe would stall the child while we poll.
    let mut stdout = tempfile::tempfile()?;
    let mut stderr = tempfile::tempfile()?;

    let mut child = Command::new(soffice)
        .arg("--headless")
        .arg("--convert-to")
        .arg(TARGET_FILTER)
        .arg("--outdir")
        .arg(output_dir)
        .arg(input_path)
        .stdin(Stdio::null())
        .stdout(stdout.try_clone()?)
        .stderr(stderr.try_clone()?)
        .spawn()
        .map_err(|e| {
            DocsiftError::backend_with_source(
                OPERATION,
                format!("failed to execute LibreOffice at '{}'", soffice.display()),
                e,
            )
        })?;

    let status = wait_with_deadline(&mut child, timeout)?;

    if !status.success() {
        let stderr = read_captured(&mut stderr)?;
        let stdout = read_captured(&mut stdout)?;
        return Err(DocsiftError::backend(
            OPERATION,
            format!(
                "LibreOffice exited with code {}: {}",
                status.code().unwrap_or(-1),
                if stderr.is_empty() { stdout } else { stderr }
            ),
        ));
    }

    Ok(())
}

/// Waits for `child`, killing it once `timeout` has elapsed.
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let pid = child.id();
            // The child may exit between try_wait and kill; either way it is reaped below.
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!("LibreOffice (PID {}) killed after {:?}", pid, timeout);
            return Err(DocsiftError::backend(
                OPERATION,
                format!("LibreOffice conversion timed out after {} seconds (PID: {})", timeout.as_secs(), pid),
            ));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_captured(file: &mut File) -> Result<String> {
    let mut bytes = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
