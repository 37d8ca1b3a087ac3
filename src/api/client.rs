use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response, multipart};
use serde::de::DeserializeOwned;

use crate::config::ServerSettings;
use crate::error::RemoteError;

use super::PlayerApi;
use super::types::{ControlCommand, ControlReply, Snapshot, UploadReply};

/// `PlayerApi` over HTTP/JSON, one blocking request per call.
pub struct HttpPlayerApi {
    client: Client,
    base: Url,
}

impl HttpPlayerApi {
    pub fn new(settings: &ServerSettings) -> Result<Self, RemoteError> {
        let base = parse_base_url(&settings.url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn endpoint<I, S>(&self, segments: I) -> Result<Url, RemoteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send()?;
        read_json(response)
    }
}

/// Parse and sanity-check the configured server URL.
pub fn parse_base_url(raw: &str) -> Result<Url, RemoteError> {
    let url = Url::parse(raw.trim()).map_err(|e| RemoteError::InvalidUrl(format!("{raw}: {e}")))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(RemoteError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}

/// The server answers errors with a JSON body and a 4xx/5xx status, so the
/// body is decoded whatever the status code.
fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status();
    if !status.is_success() {
        tracing::debug!(%status, "non-success status, decoding body anyway");
    }
    Ok(response.json::<T>()?)
}

impl PlayerApi for HttpPlayerApi {
    fn fetch_files(&mut self) -> Result<Snapshot, RemoteError> {
        let url = self.endpoint(["api", "files"])?;
        self.get_json(url)
    }

    fn fetch_status(&mut self) -> Result<Snapshot, RemoteError> {
        let url = self.endpoint(["api", "status"])?;
        self.get_json(url)
    }

    fn send_control(&mut self, command: &ControlCommand) -> Result<ControlReply, RemoteError> {
        let url = self.endpoint(command.path_segments())?;
        self.get_json(url)
    }

    fn upload(&mut self, path: &Path) -> Result<UploadReply, RemoteError> {
        let url = self.endpoint(["upload"])?;
        let form = multipart::Form::new().file("file", path)?;
        tracing::debug!(%url, path = %path.display(), "POST multipart");
        let response = self.client.post(url).multipart(form).send()?;
        read_json(response)
    }
}
