use crate::{
    extract::extract_fields,
    listing::{
        online_players_count,
        search_listing,
    },
    types::{
        PartialRecord,
        PlayerRecord,
    },
    Error,
    RtanksResult,
    DEFAULT_BASE_URL,
};
use parking_lot::Mutex;
use rand::{
    seq::SliceRandom,
    Rng,
};
use reqwest::{
    header::{
        HeaderMap,
        HeaderName,
        HeaderValue,
        ACCEPT,
        ACCEPT_LANGUAGE,
        DNT,
        UPGRADE_INSECURE_REQUESTS,
        USER_AGENT,
    },
    StatusCode,
};
use std::{
    sync::Arc,
    time::Duration,
};
use tracing::{
    error,
    info,
    warn,
};
use url::Url;

/// Browser user agents, one is picked for each request
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
];

/// Options for a [`Client`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The ratings site
    pub base_url: Url,

    /// The timeout for a whole request
    pub timeout: Duration,

    /// The shortest wait before a request
    pub min_delay: Duration,

    /// The longest wait before a request
    pub max_delay: Duration,

    /// User agents to rotate through.
    ///
    /// If empty, the first default is used.
    pub user_agents: Vec<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("invalid DEFAULT_BASE_URL"),
            timeout: Duration::from_secs(30),
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(1500),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Client
///
/// Clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    options: ClientOptions,

    /// Created on first use, and again after a close
    http: Mutex<Option<reqwest::Client>>,
}

impl Client {
    /// Make a new [`Client`] for the public site.
    pub fn new() -> Self {
        Self::with_options(ClientOptions::default())
    }

    /// Make a new [`Client`] with the given options.
    pub fn with_options(options: ClientOptions) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                options,
                http: Mutex::new(None),
            }),
        }
    }

    /// Get the options
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Drop the connection pool.
    ///
    /// The next request makes a new one.
    pub fn close(&self) {
        self.inner.http.lock().take();
    }

    /// Get the http client, making it if needed.
    fn http(&self) -> RtanksResult<reqwest::Client> {
        let mut http = self.inner.http.lock();
        if let Some(client) = http.as_ref() {
            return Ok(client.clone());
        }

        let client = reqwest::Client::builder()
            .timeout(self.inner.options.timeout)
            .default_headers(browser_headers())
            .build()?;
        *http = Some(client.clone());

        Ok(client)
    }

    fn user_agent(&self) -> &str {
        self.inner
            .options
            .user_agents
            .choose(&mut rand::thread_rng())
            .map_or(DEFAULT_USER_AGENTS[0], String::as_str)
    }

    /// Wait a random time between the min and max delays.
    async fn delay(&self) {
        let options = &self.inner.options;
        let delay = if options.min_delay >= options.max_delay {
            options.min_delay
        } else {
            rand::thread_rng().gen_range(options.min_delay..=options.max_delay)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Get the url of a player's profile.
    ///
    /// # Errors
    /// Returns an error if the base url cannot have a path.
    pub fn profile_url(&self, username: &str) -> RtanksResult<Url> {
        let mut url = self.inner.options.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::CannotBeABase)?
            .pop_if_empty()
            .push("user")
            .push(username);
        Ok(url)
    }

    /// Get a page as text.
    async fn get_text(&self, url: Url) -> RtanksResult<String> {
        self.delay().await;

        let response = self
            .http()?
            .get(url.as_str())
            .header(USER_AGENT, self.user_agent())
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.text().await?),
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            status => {
                warn!("unexpected status {status} for {url}");
                Err(Error::InvalidStatus(status))
            }
        }
    }

    /// Fetch the markup of a player's profile.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] on a 404, and other errors for network failures or unexpected statuses.
    pub async fn fetch_profile(&self, username: &str) -> RtanksResult<String> {
        let url = self.profile_url(username)?;
        self.get_text(url).await
    }

    /// Fetch and parse a player's profile.
    ///
    /// Returns `Ok(None)` if the page had too little data.
    async fn lookup_profile(&self, username: &str) -> RtanksResult<Option<PlayerRecord>> {
        let markup = self.fetch_profile(username).await?;

        let username = username.to_string();
        let record =
            tokio::task::spawn_blocking(move || extract_fields(&markup, &username)).await??;

        Ok(record.assemble())
    }

    /// Search the rankings table on the main page for a player.
    ///
    /// # Errors
    /// Returns an error if the main page could not be fetched.
    pub async fn search_main_listing(&self, username: &str) -> RtanksResult<Option<PartialRecord>> {
        let markup = self.get_text(self.inner.options.base_url.clone()).await?;

        let username = username.to_string();
        Ok(tokio::task::spawn_blocking(move || search_listing(&markup, &username)).await?)
    }

    /// Get a player's data.
    ///
    /// The profile page is tried first.
    /// If it is missing, unreachable, or too empty, the rankings table is searched instead.
    /// Returns `None` if neither finds the player.
    #[tracing::instrument(skip(self))]
    pub async fn get_player_data(&self, username: &str) -> Option<PlayerRecord> {
        match self.lookup_profile(username).await {
            Ok(Some(record)) => {
                info!(rank = %record.rank, experience = record.experience, "found profile");
                return Some(record);
            }
            Ok(None) => info!("profile has too little data"),
            Err(Error::NotFound) => info!("profile not found"),
            Err(error) => warn!("failed to look up profile: {error}"),
        }

        match self.search_main_listing(username).await {
            Ok(Some(record)) => {
                let record = record.assemble();
                if record.is_some() {
                    info!("found player in the rankings table");
                }
                record
            }
            Ok(None) => {
                info!("player not in the rankings table");
                None
            }
            Err(error) => {
                error!("failed to search the rankings table: {error}");
                None
            }
        }
    }

    /// Get the number of players online.
    ///
    /// Returns 0 if it could not be found.
    #[tracing::instrument(skip(self))]
    pub async fn get_online_players_count(&self) -> u32 {
        let markup = match self.get_text(self.inner.options.base_url.clone()).await {
            Ok(markup) => markup,
            Err(error) => {
                warn!("failed to fetch the main page: {error}");
                return 0;
            }
        };

        match tokio::task::spawn_blocking(move || online_players_count(&markup)).await {
            Ok(count) => count.unwrap_or(0),
            Err(error) => {
                error!("failed to parse the main page: {error}");
                0
            }
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Headers a browser would send for a page load
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn profile_urls() {
        let client = Client::new();

        let url = client.profile_url("Rekt").expect("invalid url");
        assert_eq!(url.as_str(), "https://ratings.ranked-rtanks.online/user/Rekt");

        let url = client.profile_url("a/b c").expect("invalid url");
        assert_eq!(url.as_str(), "https://ratings.ranked-rtanks.online/user/a%2Fb%20c");
    }

    #[test]
    fn base_url_with_path() {
        let options = ClientOptions {
            base_url: Url::parse("http://localhost:8080/ratings/").expect("invalid url"),
            ..ClientOptions::default()
        };
        let client = Client::with_options(options);
        let url = client.profile_url("Rekt").expect("invalid url");
        assert_eq!(url.as_str(), "http://localhost:8080/ratings/user/Rekt");
    }

    #[test]
    fn empty_user_agent_pool() {
        let options = ClientOptions {
            user_agents: Vec::new(),
            ..ClientOptions::default()
        };
        let client = Client::with_options(options);
        assert_eq!(client.user_agent(), DEFAULT_USER_AGENTS[0]);
    }

    #[test]
    fn close_drops_the_pool() {
        let client = Client::new();
        client.http().expect("failed to build http client");
        assert!(client.inner.http.lock().is_some());

        client.close();
        assert!(client.inner.http.lock().is_none());

        client.http().expect("failed to build http client");
        assert!(client.clone().inner.http.lock().is_some());
    }
}
