use serde::Deserialize;

/// Payload of `bootstrap-static/`. Only the three arrays the scout needs are kept.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Bootstrap {
    #[serde(default)]
    pub elements: Vec<Player>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Player {
    pub id: u32,
    pub web_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
    pub team: u32,
    pub element_type: u8,
    // Tenths of a million.
    pub now_cost: i32,
    pub form: LooseNumber,
    pub total_points: LooseNumber,
    #[serde(default)]
    pub minutes: u32,
    pub status: PlayerStatus,
    #[serde(default)]
    pub selected_by_percent: Option<LooseNumber>,
    #[serde(default)]
    pub news: String,
}

impl Player {
    pub fn cost(&self) -> f64 {
        f64::from(self.now_cost) / 10.0
    }

    /// First and second name, or the display name when the feed omits both.
    pub fn full_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.second_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.web_name.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub played: u32,
    #[serde(default)]
    pub win: u32,
    #[serde(default)]
    pub draw: u32,
    #[serde(default)]
    pub loss: u32,
    #[serde(default)]
    pub goals_for: u32,
    #[serde(default)]
    pub goals_against: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub id: u32,
    // Null for fixtures that have not been assigned to a gameweek yet.
    pub event: Option<u32>,
    pub team_h: u32,
    pub team_a: u32,
    pub team_h_difficulty: u8,
    pub team_a_difficulty: u8,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub kickoff_time: Option<String>,
    #[serde(default)]
    pub team_h_score: Option<u8>,
    #[serde(default)]
    pub team_a_score: Option<u8>,
}

impl Fixture {
    /// Difficulty faced by `team_id` in this fixture, if it plays in it.
    pub fn difficulty_for(&self, team_id: u32) -> Option<u8> {
        if self.team_h == team_id {
            Some(self.team_h_difficulty)
        } else if self.team_a == team_id {
            Some(self.team_a_difficulty)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_next: bool,
    #[serde(default)]
    pub is_current: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::Goalkeeper,
        Position::Defender,
        Position::Midfielder,
        Position::Forward,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Position::Goalkeeper),
            2 => Some(Position::Defender),
            3 => Some(Position::Midfielder),
            4 => Some(Position::Forward),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GKP",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(raw.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PlayerStatus {
    Available,
    Doubtful,
    Injured,
    Suspended,
    Unavailable,
    NotInSquad,
    Other(String),
}

impl From<String> for PlayerStatus {
    fn from(code: String) -> Self {
        match code.as_str() {
            "a" => PlayerStatus::Available,
            "d" => PlayerStatus::Doubtful,
            "i" => PlayerStatus::Injured,
            "s" => PlayerStatus::Suspended,
            "u" => PlayerStatus::Unavailable,
            "n" => PlayerStatus::NotInSquad,
            _ => PlayerStatus::Other(code),
        }
    }
}

impl PlayerStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, PlayerStatus::Available)
    }

    pub fn label(&self) -> &str {
        match self {
            PlayerStatus::Available => "Available",
            PlayerStatus::Doubtful => "Doubtful",
            PlayerStatus::Injured => "Injured",
            PlayerStatus::Suspended => "Suspended",
            PlayerStatus::Unavailable => "Unavailable",
            PlayerStatus::NotInSquad => "Not in squad",
            PlayerStatus::Other(code) => code.as_str(),
        }
    }
}

/// Numeric field that the upstream feed sends either as a JSON number or as a decimal string
/// (`"form": "5.4"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Finite numeric value, or `None` when the field is not a number.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    pub fn raw(&self) -> String {
        match self {
            LooseNumber::Number(n) => n.to_string(),
            LooseNumber::Text(s) => s.clone(),
        }
    }
}
