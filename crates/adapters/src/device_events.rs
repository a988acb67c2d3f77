// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External Event Source (C9): subscribes to block-device change events
//! and hands them to the Worker's debounce counter (§4.9).

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// One filtered device-change event, carrying just the fields the
/// debounce filter inspects.
#[derive(Debug, Clone, Default)]
pub struct DeviceEvent {
    pub action: String,
    pub device: Option<String>,
    pub fs_type: Option<String>,
    pub dm_name: Option<String>,
}

impl DeviceEvent {
    /// Whether this event should trigger a refresh, per §4.9's filter:
    /// a filesystem-type attribute containing the domain signature, a
    /// known device going empty, or a mapper-device attribute.
    pub fn is_relevant(&self, domain_signature: &str) -> bool {
        self.fs_type.as_deref().is_some_and(|t| t.contains(domain_signature))
            || self.dm_name.is_some()
            || (self.action == "remove" && self.device.is_some())
    }
}

#[async_trait]
pub trait DeviceEventSource: Send + Sync {
    async fn subscribe(&self) -> mpsc::Receiver<DeviceEvent>;
}

/// Drives `udevadm monitor --udev --property`, parsing its `KEY=VALUE`
/// blocks (one block per event, separated by a blank line) into
/// [`DeviceEvent`]s.
pub struct UdevMonitorSource {
    udevadm_path: String,
}

impl UdevMonitorSource {
    pub fn new() -> Self {
        Self { udevadm_path: "udevadm".to_string() }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_path(udevadm_path: impl Into<String>) -> Self {
        Self { udevadm_path: udevadm_path.into() }
    }
}

impl Default for UdevMonitorSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceEventSource for UdevMonitorSource {
    async fn subscribe(&self) -> mpsc::Receiver<DeviceEvent> {
        let (tx, rx) = mpsc::channel(64);
        let udevadm_path = self.udevadm_path.clone();
        tokio::spawn(async move {
            let Ok(mut child) = Command::new(&udevadm_path)
                .args(["monitor", "--udev", "--property"])
                .stdout(std::process::Stdio::piped())
                .spawn()
            else {
                tracing::warn!(path = %udevadm_path, "failed to spawn udevadm monitor");
                return;
            };
            let Some(stdout) = child.stdout.take() else { return };
            let mut lines = BufReader::new(stdout).lines();
            let mut block: Vec<(String, String)> = Vec::new();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    if !block.is_empty() {
                        let event = event_from_block(std::mem::take(&mut block));
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    block.push((key.to_string(), value.to_string()));
                }
            }
        });
        rx
    }
}

fn event_from_block(block: Vec<(String, String)>) -> DeviceEvent {
    let mut event = DeviceEvent::default();
    for (key, value) in block {
        match key.as_str() {
            "ACTION" => event.action = value,
            "DEVNAME" => event.device = Some(value),
            "ID_FS_TYPE" => event.fs_type = Some(value),
            "DM_NAME" => event.dm_name = Some(value),
            _ => {}
        }
    }
    event
}

/// A test double whose events are pushed directly by the test holding the
/// paired [`mpsc::Sender`].
pub struct FakeDeviceEventSource {
    rx: std::sync::Mutex<Option<mpsc::Receiver<DeviceEvent>>>,
}

impl FakeDeviceEventSource {
    pub fn new() -> (Self, mpsc::Sender<DeviceEvent>) {
        let (tx, rx) = mpsc::channel(64);
        (Self { rx: std::sync::Mutex::new(Some(rx)) }, tx)
    }
}

#[async_trait]
impl DeviceEventSource for FakeDeviceEventSource {
    async fn subscribe(&self) -> mpsc::Receiver<DeviceEvent> {
        self.rx.lock().expect("fake source lock poisoned").take().expect("subscribe called once")
    }
}

/// Maps `/dev/dm-*` to its `dm-name-*` mapper-style symlink. Active only
/// when `dev_prefix` differs from `/dev` (i.e. under a test environment
/// prefix); dead code in production, preserved as a documented capability
/// per the Open Questions.
pub fn translate_dm_path(dev_prefix: &str, device: &str) -> Option<String> {
    if dev_prefix == "/dev" {
        return None;
    }
    let minor = device.strip_prefix(&format!("{dev_prefix}/dm-"))?;
    let mapper_dir = std::path::Path::new(dev_prefix).join("mapper");
    std::fs::read_dir(&mapper_dir).ok()?.filter_map(Result::ok).find_map(|entry| {
        let name = entry.file_name().into_string().ok()?;
        let target = std::fs::read_link(entry.path()).ok()?;
        target.to_str()?.ends_with(&format!("dm-{minor}")).then(|| format!("{dev_prefix}/mapper/{name}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_relevant_matches_fs_type_containing_signature() {
        let event = DeviceEvent { fs_type: Some("LVM2_member".to_string()), ..Default::default() };
        assert!(event.is_relevant("LVM2"));
    }

    #[test]
    fn is_relevant_matches_mapper_device_attribute() {
        let event = DeviceEvent { dm_name: Some("vg-lv".to_string()), ..Default::default() };
        assert!(event.is_relevant("LVM2"));
    }

    #[test]
    fn is_relevant_matches_device_going_empty() {
        let event = DeviceEvent { action: "remove".to_string(), device: Some("/dev/sda1".to_string()), ..Default::default() };
        assert!(event.is_relevant("LVM2"));
    }

    #[test]
    fn is_relevant_false_for_unmatched_events() {
        let event = DeviceEvent { action: "add".to_string(), ..Default::default() };
        assert!(!event.is_relevant("LVM2"));
    }

    #[test]
    fn event_from_block_maps_known_keys() {
        let event = event_from_block(vec![
            ("ACTION".to_string(), "change".to_string()),
            ("DEVNAME".to_string(), "/dev/sda1".to_string()),
            ("ID_FS_TYPE".to_string(), "LVM2_member".to_string()),
        ]);
        assert_eq!(event.action, "change");
        assert_eq!(event.device.as_deref(), Some("/dev/sda1"));
    }

    #[test]
    fn translate_dm_path_is_dead_code_against_the_real_dev_tree() {
        assert_eq!(translate_dm_path("/dev", "/dev/dm-0"), None);
    }

    #[tokio::test]
    async fn fake_source_delivers_pushed_events() {
        let (source, tx) = FakeDeviceEventSource::new();
        let mut rx = source.subscribe().await;
        tx.send(DeviceEvent { action: "change".to_string(), ..Default::default() }).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.action, "change");
    }
}
