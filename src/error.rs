use thiserror::Error;

/// Data-quality failures found while joining and scoring upstream records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoutError {
    #[error("player {player_id}: field `{field}` is not numeric: {raw:?}")]
    MalformedField {
        player_id: u32,
        field: &'static str,
        raw: String,
    },
    #[error("player {player_id} references unknown team {team_id}")]
    UnknownTeam { player_id: u32, team_id: u32 },
}
