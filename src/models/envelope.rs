//! Provider response schemas: typed views of the `az` CLI's JSON output.
//!
//! Every field the provider may omit is an `Option` with a documented
//! fallback, so a missing key degrades to a default instead of failing
//! the whole parse. Structural breakage (not JSON, wrong shape) is still
//! surfaced to the caller as a malformed-response error.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
/// One entry of `az vm list` output. Only the fields we read.
pub struct VmEntry {
    pub name: Option<String>,
    #[serde(rename = "resourceGroup")]
    pub resource_group: Option<String>,
    #[serde(rename = "storageProfile", default)]
    pub storage_profile: Option<StorageProfile>,
}

impl VmEntry {
    /// OS type string from the nested storage profile, when present.
    pub fn os_type(&self) -> Option<&str> {
        self.storage_profile
            .as_ref()
            .and_then(|p| p.os_disk.as_ref())
            .and_then(|d| d.os_type.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageProfile {
    #[serde(rename = "osDisk")]
    pub os_disk: Option<OsDisk>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OsDisk {
    #[serde(rename = "osType")]
    pub os_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
/// One status entry of `az vm get-instance-view` (`instanceView.statuses`).
pub struct InstanceStatus {
    pub code: Option<String>,
    #[serde(rename = "displayStatus")]
    pub display_status: Option<String>,
}

/// Extract the power-state display string from an instance view's statuses.
///
/// Statuses carry codes like `PowerState/running`; absence of any
/// `PowerState/` entry reads as an unknown state, not an error.
pub fn power_state(statuses: &[InstanceStatus]) -> Option<String> {
    statuses.iter().find_map(|s| {
        let code = s.code.as_deref()?;
        let state = code.strip_prefix("PowerState/")?;
        Some(
            s.display_status
                .clone()
                .unwrap_or_else(|| state.to_string()),
        )
    })
}

#[derive(Debug, Deserialize)]
/// Envelope of `az vm run-command invoke`.
pub struct RunCommandEnvelope {
    #[serde(default)]
    pub value: Vec<RunCommandResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunCommandResult {
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Split a run-command `message` into its `[stdout]` and `[stderr]`
/// substreams. Returns `None` when the expected markers are absent,
/// which callers treat as a malformed response.
pub fn split_streams(message: &str) -> Option<(String, String)> {
    let out_start = message.find("[stdout]")?;
    let after_out = &message[out_start + "[stdout]".len()..];
    let (stdout, stderr) = match after_out.find("[stderr]") {
        Some(err_start) => {
            let stderr = &after_out[err_start + "[stderr]".len()..];
            (&after_out[..err_start], stderr)
        }
        None => (after_out, ""),
    };
    Some((stdout.trim().to_string(), stderr.trim().to_string()))
}
