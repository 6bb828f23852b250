use crate::error::OpenerError;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;

/// Hands a link to whatever the platform uses to open it (browser, package
/// installer, ...).
pub trait UrlOpener: Send + Sync {
    fn name(&self) -> &str;

    fn open<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), OpenerError>> + Send + 'a>>;
}

/// Accept only absolute `http`/`https` links.
pub fn validate_artifact_url(raw: &str) -> Result<url::Url, OpenerError> {
    let parsed = url::Url::parse(raw.trim()).map_err(|e| OpenerError::Rejected {
        url: raw.to_string(),
        reason: format!("invalid URL: {e}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(OpenerError::Rejected {
            url: raw.to_string(),
            reason: format!("scheme '{}' not allowed", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(OpenerError::Rejected {
            url: raw.to_string(),
            reason: "URL has no host".into(),
        });
    }
    Ok(parsed)
}

/// Opens links with the desktop handler: `open` on macOS, `cmd /C start` on
/// Windows, `xdg-open` elsewhere.
pub struct SystemUrlOpener;

impl SystemUrlOpener {
    fn launcher(url: &str) -> (&'static str, Vec<String>) {
        if cfg!(target_os = "macos") {
            ("open", vec![url.to_string()])
        } else if cfg!(target_os = "windows") {
            (
                "cmd",
                vec!["/C".into(), "start".into(), String::new(), url.to_string()],
            )
        } else {
            ("xdg-open", vec![url.to_string()])
        }
    }
}

impl UrlOpener for SystemUrlOpener {
    fn name(&self) -> &str {
        "system"
    }

    fn open<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), OpenerError>> + Send + 'a>> {
        Box::pin(async move {
            let parsed = validate_artifact_url(url)?;
            let (program, args) = Self::launcher(parsed.as_str());

            let status = Command::new(program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map_err(|e| OpenerError::Launch {
                    program: program.to_string(),
                    message: e.to_string(),
                })?;

            if !status.success() {
                return Err(OpenerError::Launch {
                    program: program.to_string(),
                    message: format!("exited with {status}"),
                });
            }
            tracing::info!(url = %parsed, "update artifact opened");
            Ok(())
        })
    }
}

/// Opener that only remembers what it was asked to open.
#[derive(Debug, Default)]
pub struct RecordingUrlOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingUrlOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl UrlOpener for RecordingUrlOpener {
    fn name(&self) -> &str {
        "recording"
    }

    fn open<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), OpenerError>> + Send + 'a>> {
        Box::pin(async move {
            validate_artifact_url(url)?;
            self.opened
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(url.to_string());
            Ok(())
        })
    }
}
