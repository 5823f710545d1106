use std::time::Duration;

use csv2po::{Error, TableFetcher};

const USER_AGENT: &str = concat!("csv2po/", env!("CARGO_PKG_VERSION"));

/// Downloads tables over HTTP(S) with a blocking client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::configuration(format!("unable to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl TableFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, Error> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::fetch(url, e))?;
        let bytes = response.bytes().map_err(|e| Error::fetch(url, e))?;
        if bytes.is_empty() {
            return Err(Error::fetch(url, "server returned an empty body"));
        }
        Ok(bytes.to_vec())
    }
}
