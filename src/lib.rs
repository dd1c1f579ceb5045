pub mod api_config;
pub mod feed;
pub mod field;
pub mod http_client;
pub mod panel;
pub mod player;
pub mod player_fetch;
pub mod radar;
pub mod roster;
pub mod sample_roster;
pub mod state;
pub mod team_stats;
