//! Subprocess wrappers for the tools the pipeline shells out to: the OCR
//! engine, a PostScript interpreter (rasterisation and PDF/A conversion), a
//! PDF linearizer, a JBIG2 encoder, and a PNG colour quantiser.
//!
//! These are intentionally thin (spec.md §1 scopes their internals out of
//! design), grounded on the `Command`-based shell-out already used in
//! `operations::page_analysis::rotate_image_externally`, extended with the
//! timeout escalation spec.md §5 requires: a watcher thread sends `SIGTERM`
//! and, if the process hasn't exited after a grace period, `SIGKILL`.

use crate::error::{CoreError, CoreResult};
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Grace period between `SIGTERM` and `SIGKILL` once a run's timeout
/// elapses.
const KILL_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Runs `cmd`, waiting up to `timeout`. On timeout the watcher thread sends
/// `SIGTERM`; if the process is still alive after [`KILL_GRACE_PERIOD`] it
/// sends `SIGKILL`. A non-zero exit (including one caused by the kill
/// escalation) maps to [`CoreError::SubprocessOutput`] carrying captured
/// stderr.
fn run_with_timeout(tool: &str, mut cmd: Command, timeout: Duration) -> CoreResult<Vec<u8>> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let mut child = cmd
        .spawn()
        .map_err(|e| CoreError::MissingDependency(format!("{tool}: {e}")))?;

    let timed_out = Arc::new(AtomicBool::new(false));
    let pid = child.id();
    let watcher_timed_out = Arc::clone(&timed_out);
    let watcher = std::thread::spawn(move || {
        watch_and_escalate(pid, timeout, watcher_timed_out);
    });

    let output = child
        .wait_with_output()
        .map_err(|e| CoreError::SubprocessOutput {
            tool: tool.to_string(),
            code: None,
            stderr: e.to_string(),
        })?;
    let _ = watcher.join();

    if timed_out.load(Ordering::SeqCst) {
        return Err(CoreError::SubprocessOutput {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: format!("timed out after {:?}", timeout),
        });
    }

    if !output.status.success() {
        return Err(CoreError::SubprocessOutput {
            tool: tool.to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(output.stdout)
}

/// Sleeps in small increments until `timeout` elapses or the watched
/// process has already exited, then escalates `SIGTERM` → `SIGKILL`.
fn watch_and_escalate(pid: u32, timeout: Duration, timed_out: Arc<AtomicBool>) {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(100).min(timeout);
    while start.elapsed() < timeout {
        if !process_alive(pid) {
            return;
        }
        std::thread::sleep(poll_interval);
    }
    if !process_alive(pid) {
        return;
    }
    timed_out.store(true, Ordering::SeqCst);
    warn!(pid, ?timeout, "subprocess exceeded timeout, sending SIGTERM");
    send_signal(pid, Signal::Term);

    let kill_deadline = Instant::now() + KILL_GRACE_PERIOD;
    while Instant::now() < kill_deadline {
        if !process_alive(pid) {
            return;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
    if process_alive(pid) {
        warn!(pid, "subprocess ignored SIGTERM, sending SIGKILL");
        send_signal(pid, Signal::Kill);
    }
}

enum Signal {
    Term,
    Kill,
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: Signal) {
    let sig = match signal {
        Signal::Term => libc::SIGTERM,
        Signal::Kill => libc::SIGKILL,
    };
    unsafe {
        libc::kill(pid as libc::pid_t, sig);
    }
}

#[cfg(not(unix))]
fn send_signal(_pid: u32, _signal: Signal) {}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    false
}

/// Probes a tool's version string, used once by `Validator` up front and
/// memoized on `Job` (spec.md §9: process-wide, read-only after
/// construction).
fn probe_version(tool: &str, version_flag: &str) -> CoreResult<String> {
    let output = Command::new(tool)
        .arg(version_flag)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| CoreError::MissingDependency(format!("{tool} not found: {e}")))?;
    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    Ok(text.lines().next().unwrap_or_default().trim().to_string())
}

/// Invokes the configured OCR engine (`tesseract`) on a single preprocessed
/// page image, producing a text-only single-page PDF and, optionally, a
/// plain-text transcript.
pub mod ocr_engine {
    use super::*;

    pub fn probe_version() -> CoreResult<String> {
        super::probe_version("tesseract", "--version")
    }

    /// Runs OCR on `image_path`, writing a text-only PDF to `pdf_out` sized
    /// to `page_width_pts`×`page_height_pts`, and (if `text_out` is given)
    /// a plain-text transcript.
    pub fn run(
        image_path: &Path,
        pdf_out: &Path,
        text_out: Option<&Path>,
        languages: &[String],
        timeout: Duration,
    ) -> CoreResult<()> {
        let lang_arg = languages.join("+");
        let out_base = pdf_out.with_extension("");

        let mut cmd = Command::new("tesseract");
        cmd.arg(image_path).arg(&out_base).arg("-l").arg(&lang_arg).arg("pdf");
        if text_out.is_some() {
            cmd.arg("txt");
        }
        run_with_timeout("tesseract", cmd, timeout)?;

        let produced_pdf = out_base.with_extension("pdf");
        if produced_pdf != pdf_out {
            std::fs::rename(&produced_pdf, pdf_out).map_err(|e| {
                CoreError::OcrConfig(format!("failed to relocate tesseract PDF output: {e}"))
            })?;
        }
        if let Some(text_out) = text_out {
            let produced_txt = out_base.with_extension("txt");
            if produced_txt != text_out {
                std::fs::rename(&produced_txt, text_out).map_err(|e| {
                    CoreError::OcrConfig(format!("failed to relocate tesseract text output: {e}"))
                })?;
            }
        }
        Ok(())
    }
}

/// Wraps a PostScript interpreter (`gs`) for rasterisation and PDF/A
/// conversion.
pub mod postscript {
    use super::*;

    pub fn probe_version() -> CoreResult<String> {
        super::probe_version("gs", "--version")
    }

    /// Rasterises `pdf_in` (a single-page PDF) to a PNG at `dpi`.
    pub fn rasterize(pdf_in: &Path, png_out: &Path, dpi: u32, timeout: Duration) -> CoreResult<()> {
        let mut cmd = Command::new("gs");
        cmd.arg("-dNOPAUSE")
            .arg("-dBATCH")
            .arg("-dSAFER")
            .arg("-sDEVICE=png16m")
            .arg(format!("-r{dpi}"))
            .arg(format!("-sOutputFile={}", png_out.display()))
            .arg(pdf_in);
        run_with_timeout("gs", cmd, timeout).map(|_| ())
    }

    /// Converts `pdf_in` to the PDF/A flavour named by `pdfa_def` (one of
    /// Ghostscript's `PDFA{1,2,3}` output-intent definition files).
    pub fn to_pdfa(pdf_in: &Path, pdf_out: &Path, pdfa_level: u8, timeout: Duration) -> CoreResult<()> {
        let mut cmd = Command::new("gs");
        cmd.arg("-dPDFA")
            .arg("-dPDFACompatibilityPolicy=1")
            .arg(format!("-dPDFA={pdfa_level}"))
            .arg("-dNOPAUSE")
            .arg("-dBATCH")
            .arg("-dSAFER")
            .arg("-sDEVICE=pdfwrite")
            .arg(format!("-sOutputFile={}", pdf_out.display()))
            .arg(pdf_in);
        run_with_timeout("gs", cmd, timeout).map(|_| ())
    }
}

/// Wraps an external PDF linearizer (`qpdf --linearize`) for
/// `fast_web_view`.
pub mod linearizer {
    use super::*;

    pub fn probe_version() -> CoreResult<String> {
        super::probe_version("qpdf", "--version")
    }

    pub fn linearize(pdf_in: &Path, pdf_out: &Path, timeout: Duration) -> CoreResult<()> {
        let mut cmd = Command::new("qpdf");
        cmd.arg("--linearize").arg(pdf_in).arg(pdf_out);
        run_with_timeout("qpdf", cmd, timeout).map(|_| ())
    }
}

/// Wraps a JBIG2 encoder (`jbig2enc`'s `jbig2` CLI) for bitonal image
/// groups sharing a symbol dictionary (spec.md §4.5).
pub mod jbig2enc {
    use super::*;

    pub fn probe_version() -> CoreResult<String> {
        super::probe_version("jbig2", "-v")
    }

    /// Encodes a single bitonal image with no shared symbol dictionary
    /// (`G = 1`, lossless).
    pub fn convert_single(png_in: &Path, out_dir: &Path, timeout: Duration) -> CoreResult<Vec<u8>> {
        let mut cmd = Command::new("jbig2");
        cmd.current_dir(out_dir).arg(png_in);
        run_with_timeout("jbig2", cmd, timeout)
    }

    /// Encodes a group of bitonal images sharing one symbol dictionary
    /// (`G > 1`, lossy), returning the symbol-dictionary bytes; per-page
    /// image streams are written as `out_dir/{n}.jb2` by the encoder.
    pub fn convert_group(png_ins: &[&Path], out_dir: &Path, lossy: bool, timeout: Duration) -> CoreResult<Vec<u8>> {
        let mut cmd = Command::new("jbig2");
        cmd.current_dir(out_dir).arg("-s").arg("-p");
        if lossy {
            cmd.arg("-O");
        }
        for png in png_ins {
            cmd.arg(png);
        }
        run_with_timeout("jbig2", cmd, timeout)?;
        std::fs::read(out_dir.join("symboltable")).map_err(|e| {
            CoreError::SubprocessOutput {
                tool: "jbig2".to_string(),
                code: None,
                stderr: format!("missing symbol dictionary output: {e}"),
            }
        })
    }
}

/// Wraps a palette quantiser (`pngquant`) for the Optimiser's PNG-reinsertion
/// path (spec.md §4.5).
pub mod quantizer {
    use super::*;

    pub fn probe_version() -> CoreResult<String> {
        super::probe_version("pngquant", "--version")
    }

    pub fn quantize(png_in: &Path, png_out: &Path, quality: u8, timeout: Duration) -> CoreResult<()> {
        let mut cmd = Command::new("pngquant");
        cmd.arg("--quality")
            .arg(format!("{quality}-{quality}"))
            .arg("--output")
            .arg(png_out)
            .arg("--force")
            .arg(png_in);
        run_with_timeout("pngquant", cmd, timeout).map(|_| ())
    }
}

/// Wraps an image descanning tool (`unpaper`) for the `clean`/`clean_final`
/// preprocessing stage (spec.md §4.3).
pub mod descanner {
    use super::*;

    pub fn probe_version() -> CoreResult<String> {
        super::probe_version("unpaper", "--version")
    }

    pub fn clean(png_in: &Path, png_out: &Path, timeout: Duration) -> CoreResult<()> {
        let mut cmd = Command::new("unpaper");
        cmd.arg(png_in).arg(png_out);
        run_with_timeout("unpaper", cmd, timeout).map(|_| ())
    }
}

/// Writes `data` to a temporary file and returns its path, for tools (like
/// `jbig2enc`) that only accept file input.
#[allow(dead_code)]
fn write_temp(dir: &Path, name: &str, data: &[u8]) -> CoreResult<std::path::PathBuf> {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).map_err(|e| CoreError::Internal(e.to_string()))?;
    file.write_all(data).map_err(|e| CoreError::Internal(e.to_string()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_command_returns_stdout() {
        let mut cmd = Command::new("printf");
        cmd.arg("hello");
        let output = run_with_timeout("printf", cmd, Duration::from_secs(5)).unwrap();
        assert_eq!(output, b"hello");
    }

    #[test]
    fn nonzero_exit_maps_to_subprocess_output_error() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo failed >&2; exit 3");
        let err = run_with_timeout("sh", cmd, Duration::from_secs(5)).unwrap_err();
        match err {
            CoreError::SubprocessOutput { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("failed"));
            }
            other => panic!("expected SubprocessOutput, got {other:?}"),
        }
    }

    #[test]
    fn missing_binary_maps_to_missing_dependency() {
        let cmd = Command::new("definitely-not-a-real-binary-xyz");
        let err = run_with_timeout("definitely-not-a-real-binary-xyz", cmd, Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingDependency(_)));
    }

    #[test]
    fn slow_command_is_terminated_on_timeout() {
        let mut cmd = Command::new("sleep");
        cmd.arg("30");
        let start = Instant::now();
        let err = run_with_timeout("sleep", cmd, Duration::from_millis(200)).unwrap_err();
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(matches!(err, CoreError::SubprocessOutput { .. }));
    }
}
