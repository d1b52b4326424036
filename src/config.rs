use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub notify: NotifyConfig,
    pub recording: RecordingConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct NotifyConfig {
    /// Upper bound for a single gateway send, in seconds
    pub sms_timeout_secs: u64,

    /// Base URL baked into tracking/playback links in alert bodies
    pub tracking_base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordingConfig {
    pub max_payload_bytes: u64,
    pub staging_dir: String,

    /// Upper bound for one inbound upload transfer, in seconds
    pub upload_timeout_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "beacon-sos".to_string(),
                http: HttpConfig {
                    bind: "127.0.0.1".to_string(),
                    port: 3001,
                },
            },
            notify: NotifyConfig {
                sms_timeout_secs: 5,
                tracking_base_url: "http://localhost:3000".to_string(),
            },
            recording: RecordingConfig {
                max_payload_bytes: crate::recording::MAX_RECORDING_BYTES,
                staging_dir: "uploads".to_string(),
                upload_timeout_secs: 30,
            },
        }
    }
}
