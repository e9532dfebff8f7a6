//! A scraper for the RTanks ratings site.
//!
//! The site has no API, so player data is pulled out of the rendered profile pages.
//! See [`Client::get_player_data`] for the main entry point.

mod client;
pub mod compare;
pub mod equipment;
pub mod extract;
pub mod listing;
pub mod types;

pub use crate::{
    client::{
        Client,
        ClientOptions,
        DEFAULT_USER_AGENTS,
    },
    compare::{
        compare_equipment_quality,
        Comparison,
        Winner,
    },
    equipment::extract_equipment,
    extract::{
        extract_fields,
        ExtractError,
    },
    listing::{
        online_players_count,
        search_listing,
    },
    types::{
        kd_ratio,
        EquipmentSet,
        FixedRank,
        PartialRecord,
        PlayerRecord,
        Rank,
        RecordSource,
    },
};
pub use reqwest::StatusCode;

/// The public ratings site
pub const DEFAULT_BASE_URL: &str = "https://ratings.ranked-rtanks.online";

/// Result type
pub type RtanksResult<T> = Result<T, Error>;

/// Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reqwest HTTP error
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    /// Invalid HTTP Status
    #[error("invalid http status {0}")]
    InvalidStatus(StatusCode),

    /// The player does not exist
    #[error("player not found")]
    NotFound,

    /// Url Parse Error
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// The base url cannot hold path segments
    #[error("the base url cannot be a base")]
    CannotBeABase,

    /// A tokio task failed
    #[error(transparent)]
    TokioJoin(#[from] tokio::task::JoinError),
}

impl Error {
    /// Returns `true` if retrying later might succeed.
    ///
    /// Timeouts, connection failures, and unexpected statuses are transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Reqwest(_) | Self::InvalidStatus(_) | Self::TokioJoin(_)
        )
    }
}

impl From<ExtractError> for Error {
    fn from(error: ExtractError) -> Self {
        match error {
            ExtractError::RedirectedToRankings => Self::NotFound,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn not_found_is_not_transient() {
        assert!(!Error::NotFound.is_transient());
        assert!(Error::InvalidStatus(StatusCode::BAD_GATEWAY).is_transient());
    }

    #[test]
    fn redirect_maps_to_not_found() {
        let error = Error::from(ExtractError::RedirectedToRankings);
        assert!(matches!(error, Error::NotFound));
    }

    /// Hits the live site.
    #[ignore]
    #[tokio::test]
    async fn it_works() {
        let client = Client::new();

        let count = client.get_online_players_count().await;
        dbg!(count);

        let player = client.get_player_data("Rekt").await;
        dbg!(player);
    }
}
