use camino::Utf8PathBuf;

/// CLI Options
#[derive(Debug, argh::FromArgs)]
#[argh(description = "Look up players on the RTanks ratings site")]
pub struct CliOptions {
    #[argh(
        option,
        description = "the path to the config",
        default = "Utf8PathBuf::from(\"./config.toml\")"
    )]
    pub config: Utf8PathBuf,

    #[argh(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(Debug, argh::FromArgs)]
#[argh(subcommand)]
pub enum Subcommand {
    Player(PlayerOptions),
    Compare(CompareOptions),
    Online(OnlineOptions),
}

/// Show a player
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "player", description = "show a player's stats")]
pub struct PlayerOptions {
    #[argh(positional, description = "the username to look up")]
    pub username: String,

    #[argh(switch, description = "list all owned equipment instead of what is installed")]
    pub expanded: bool,

    #[argh(switch, description = "print the record as json")]
    pub json: bool,
}

/// Compare two players
#[derive(Debug, argh::FromArgs)]
#[argh(subcommand, name = "compare", description = "compare two players")]
pub struct CompareOptions {
    #[argh(positional, description = "the first player")]
    pub player1: String,

    #[argh(positional, description = "the second player")]
    pub player2: String,

    #[argh(switch, description = "print the comparison as json")]
    pub json: bool,
}

/// Show the online player count
#[derive(Debug, Clone, Copy, argh::FromArgs)]
#[argh(subcommand, name = "online", description = "show how many players are online")]
pub struct OnlineOptions {
    #[argh(option, description = "keep polling, waiting this many seconds between polls")]
    pub watch: Option<u64>,
}
