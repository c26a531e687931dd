//! Playwright sidecar bridge.
//!
//! One browser page lives in a long-running `node` process executing a
//! generated driver script. Commands go down as newline-delimited JSON on
//! stdin, responses come back on stdout keyed by request id. Browser dialogs
//! are the one unsolicited frame: after an `armDialog` command the next
//! dialog is held open on the JS side and surfaced as a `dialog` event, until
//! the Rust side settles it with `settleDialog`. An unarmed dialog is
//! dismissed immediately so the page is never wedged.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::error::{DriverError, DriverResult};

/// Driver script executed by the sidecar. Reads its configuration from
/// `VITRINE_BRIDGE_CONFIG` and speaks the line protocol described above.
const DRIVER_SCRIPT: &str = r#"
const { chromium } = require('playwright');
const readline = require('readline');

const config = JSON.parse(process.env.VITRINE_BRIDGE_CONFIG || '{}');

function send(obj) {
  process.stdout.write(JSON.stringify(obj) + '\n');
}

(async () => {
  const browser = await chromium.launch({ headless: config.headless !== false });
  const context = await browser.newContext({
    viewport: {
      width: config.viewportWidth || 1280,
      height: config.viewportHeight || 720,
    },
  });
  const page = await context.newPage();

  let armed = false;
  let heldDialog = null;

  page.on('dialog', async (dialog) => {
    if (armed) {
      armed = false;
      heldDialog = dialog;
      send({ event: 'dialog', message: dialog.message() });
    } else {
      await dialog.dismiss().catch(() => {});
    }
  });

  async function handle(req) {
    switch (req.op) {
      case 'goto':
        await page.goto(req.url, { waitUntil: 'domcontentloaded', timeout: req.timeoutMs || 30000 });
        return;
      case 'click':
        await page.click(req.selector, { timeout: req.timeoutMs || 5000 });
        return;
      case 'fill':
        await page.fill(req.selector, req.value);
        return;
      case 'text':
        return await page.locator(req.selector).first().textContent();
      case 'texts':
        return await page.locator(req.selector).allTextContents();
      case 'visible':
        return await page.locator(req.selector).first().isVisible();
      case 'count':
        return await page.locator(req.selector).count();
      case 'wait':
        await page.waitForSelector(req.selector, {
          state: req.state || 'visible',
          timeout: req.timeoutMs || 5000,
        });
        return;
      case 'armDialog':
        armed = true;
        return;
      case 'settleDialog': {
        const d = heldDialog;
        heldDialog = null;
        if (d) {
          if (req.action === 'dismiss') {
            await d.dismiss();
          } else {
            await d.accept();
          }
        }
        return;
      }
      case 'close':
        await browser.close();
        process.exit(0);
      default:
        throw new Error('unknown op: ' + req.op);
    }
  }

  send({ event: 'ready' });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    let req;
    try {
      req = JSON.parse(line);
    } catch {
      continue;
    }
    handle(req).then(
      (value) => send({ id: req.id, ok: true, value: value === undefined ? null : value }),
      (err) => send({ id: req.id, ok: false, error: String((err && err.message) || err) })
    );
  }
})().catch((err) => {
  console.error(String(err));
  process.exit(1);
});
"#;

/// One stdout line from the sidecar: either a command response (has `id`) or
/// an event frame (has `event`).
#[derive(Debug, Deserialize)]
struct Frame {
    id: Option<u64>,
    #[serde(default)]
    ok: bool,
    value: Option<Value>,
    error: Option<String>,
    event: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub node_binary: PathBuf,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub startup_timeout: Duration,
    /// Upper bound on any single command round-trip. Individual operations
    /// carry their own tighter Playwright timeouts.
    pub command_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            node_binary: PathBuf::from("node"),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            startup_timeout: Duration::from_secs(60),
            command_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&DriverConfig> for BridgeConfig {
    fn from(config: &DriverConfig) -> Self {
        Self {
            headless: config.headless,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            startup_timeout: config.timeouts.long * 2,
            command_timeout: config.timeouts.long * 2,
            ..Self::default()
        }
    }
}

struct Inner {
    child: Mutex<Child>,
    stdin: Mutex<ChildStdin>,
    pending: Mutex<HashMap<u64, oneshot::Sender<Frame>>>,
    dialog_waiter: Mutex<Option<oneshot::Sender<String>>>,
    next_id: AtomicU64,
    command_timeout: Duration,
    _workdir: tempfile::TempDir,
}

/// Cheap-to-clone handle to the sidecar.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<Inner>,
}

impl Bridge {
    pub async fn launch(config: BridgeConfig) -> DriverResult<Self> {
        Self::check_node(&config.node_binary)?;

        let workdir = tempfile::tempdir()?;
        let script_path = workdir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_SCRIPT)?;

        let bridge_config = json!({
            "headless": config.headless,
            "viewportWidth": config.viewport_width,
            "viewportHeight": config.viewport_height,
        });

        let mut child = TokioCommand::new(&config.node_binary)
            .arg(&script_path)
            .env("VITRINE_BRIDGE_CONFIG", bridge_config.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DriverError::BridgeStartup(format!(
                    "failed to spawn {}: {e}",
                    config.node_binary.display()
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DriverError::BridgeStartup("sidecar stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DriverError::BridgeStartup("sidecar stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DriverError::BridgeStartup("sidecar stderr unavailable".into()))?;

        let inner = Arc::new(Inner {
            child: Mutex::new(child),
            stdin: Mutex::new(stdin),
            pending: Mutex::new(HashMap::new()),
            dialog_waiter: Mutex::new(None),
            next_id: AtomicU64::new(1),
            command_timeout: config.command_timeout,
            _workdir: workdir,
        });

        let (ready_tx, ready_rx) = oneshot::channel();
        tokio::spawn(read_loop(inner.clone(), stdout, ready_tx));
        tokio::spawn(log_stderr(stderr));

        match tokio::time::timeout(config.startup_timeout, ready_rx).await {
            Ok(Ok(())) => {}
            _ => {
                return Err(DriverError::BridgeStartup(
                    "sidecar did not become ready (is playwright installed?)".into(),
                ))
            }
        }

        info!("playwright sidecar ready");
        Ok(Self { inner })
    }

    fn check_node(node_binary: &std::path::Path) -> DriverResult<()> {
        let status = std::process::Command::new(node_binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(s) if s.success() => Ok(()),
            _ => Err(DriverError::NodeNotFound),
        }
    }

    async fn command(&self, op: &str, mut params: Value) -> DriverResult<Value> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        params["id"] = json!(id);
        params["op"] = json!(op);

        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().await.insert(id, tx);

        {
            let mut stdin = self.inner.stdin.lock().await;
            let mut line = params.to_string();
            line.push('\n');
            stdin.write_all(line.as_bytes()).await?;
            stdin.flush().await?;
        }

        let frame = match tokio::time::timeout(self.inner.command_timeout, rx).await {
            Ok(Ok(frame)) => frame,
            Ok(Err(_)) => return Err(DriverError::BridgeGone(format!("no response to {op}"))),
            Err(_) => {
                self.inner.pending.lock().await.remove(&id);
                return Err(DriverError::Timeout(format!("{op} command")));
            }
        };

        if frame.ok {
            Ok(frame.value.unwrap_or(Value::Null))
        } else {
            Err(DriverError::CommandFailed {
                command: op.to_string(),
                reason: frame.error.unwrap_or_else(|| "unknown".into()),
            })
        }
    }

    pub async fn goto(&self, url: &str, timeout: Duration) -> DriverResult<()> {
        self.command(
            "goto",
            json!({ "url": url, "timeoutMs": timeout.as_millis() as u64 }),
        )
        .await?;
        Ok(())
    }

    pub async fn click(&self, selector: &str, timeout: Duration) -> DriverResult<()> {
        self.command(
            "click",
            json!({ "selector": selector, "timeoutMs": timeout.as_millis() as u64 }),
        )
        .await?;
        Ok(())
    }

    pub async fn fill(&self, selector: &str, value: &str) -> DriverResult<()> {
        self.command("fill", json!({ "selector": selector, "value": value }))
            .await?;
        Ok(())
    }

    pub async fn text(&self, selector: &str) -> DriverResult<String> {
        let value = self.command("text", json!({ "selector": selector })).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Text contents of every element matching `selector`, in DOM order.
    pub async fn texts(&self, selector: &str) -> DriverResult<Vec<String>> {
        let value = self.command("texts", json!({ "selector": selector })).await?;
        match value {
            Value::Array(items) => Ok(items
                .into_iter()
                .map(|item| item.as_str().unwrap_or_default().to_string())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    pub async fn visible(&self, selector: &str) -> DriverResult<bool> {
        let value = self
            .command("visible", json!({ "selector": selector }))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub async fn count(&self, selector: &str) -> DriverResult<usize> {
        let value = self.command("count", json!({ "selector": selector })).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    pub async fn wait_for(
        &self,
        selector: &str,
        state: &str,
        timeout: Duration,
    ) -> DriverResult<()> {
        self.command(
            "wait",
            json!({
                "selector": selector,
                "state": state,
                "timeoutMs": timeout.as_millis() as u64,
            }),
        )
        .await?;
        Ok(())
    }

    /// Arm the one-shot dialog listener. The returned receiver yields the
    /// dialog message once one fires; the dialog stays open until
    /// [`settle_dialog`](Self::settle_dialog) is called.
    pub async fn arm_dialog(&self) -> DriverResult<oneshot::Receiver<String>> {
        let (tx, rx) = oneshot::channel();
        *self.inner.dialog_waiter.lock().await = Some(tx);
        self.command("armDialog", json!({})).await?;
        Ok(rx)
    }

    pub async fn settle_dialog(&self, accept: bool) -> DriverResult<()> {
        let action = if accept { "accept" } else { "dismiss" };
        self.command("settleDialog", json!({ "action": action }))
            .await?;
        Ok(())
    }

    /// Ask the sidecar to close the browser and exit, escalating to SIGTERM
    /// and then a hard kill if it lingers.
    pub async fn shutdown(&self) -> DriverResult<()> {
        {
            let mut stdin = self.inner.stdin.lock().await;
            let _ = stdin.write_all(b"{\"id\":0,\"op\":\"close\"}\n").await;
            let _ = stdin.flush().await;
        }

        let mut child = self.inner.child.lock().await;
        if tokio::time::timeout(Duration::from_secs(5), child.wait())
            .await
            .is_ok()
        {
            debug!("sidecar exited cleanly");
            return Ok(());
        }

        #[cfg(unix)]
        if let Some(pid) = child.id() {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            warn!(pid, "sidecar did not exit, sending SIGTERM");
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
            tokio::time::sleep(Duration::from_millis(500)).await;
        }

        let _ = child.kill().await;
        Ok(())
    }
}

async fn read_loop(inner: Arc<Inner>, stdout: ChildStdout, ready: oneshot::Sender<()>) {
    let mut ready = Some(ready);
    let mut lines = BufReader::new(stdout).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let frame: Frame = match serde_json::from_str(&line) {
                    Ok(frame) => frame,
                    Err(err) => {
                        warn!(%line, %err, "unparseable frame from sidecar");
                        continue;
                    }
                };

                if let Some(event) = frame.event.as_deref() {
                    match event {
                        "ready" => {
                            if let Some(tx) = ready.take() {
                                let _ = tx.send(());
                            }
                        }
                        "dialog" => {
                            let message = frame.message.unwrap_or_default();
                            debug!(%message, "dialog raised");
                            if let Some(tx) = inner.dialog_waiter.lock().await.take() {
                                let _ = tx.send(message);
                            } else {
                                // Armed but the waiter is gone; accept so the
                                // page is not left blocked behind the dialog.
                                warn!("dialog with no waiter, accepting");
                                let mut stdin = inner.stdin.lock().await;
                                let _ = stdin
                                    .write_all(
                                        b"{\"id\":0,\"op\":\"settleDialog\",\"action\":\"accept\"}\n",
                                    )
                                    .await;
                                let _ = stdin.flush().await;
                            }
                        }
                        other => debug!(other, "ignoring sidecar event"),
                    }
                    continue;
                }

                if let Some(id) = frame.id {
                    if let Some(tx) = inner.pending.lock().await.remove(&id) {
                        let _ = tx.send(frame);
                    }
                }
            }
            Ok(None) => {
                debug!("sidecar stdout closed");
                break;
            }
            Err(err) => {
                warn!(%err, "sidecar read error");
                break;
            }
        }
    }

    // Drop all in-flight waiters so callers observe BridgeGone rather than
    // hanging until their command timeout.
    inner.pending.lock().await.clear();
}

async fn log_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "vitrine_driver::sidecar", "{line}");
    }
}
