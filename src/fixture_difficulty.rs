use std::collections::HashMap;

use tracing::warn;

use crate::fpl_types::{Event, Fixture};

/// Difficulty assigned to a team with no fixture in the window (hardest rating, so the
/// inverted fixture component is zero).
pub const BLANK_GAMEWEEK_DIFFICULTY: f64 = 5.0;
pub const DEFAULT_WINDOW_GAMEWEEKS: u32 = 3;
/// Window start used when no event carries the `is_next` flag (pre-season, end of season).
pub const FALLBACK_GAMEWEEK: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishedPolicy {
    UnfinishedOnly,
    IncludeFinished,
}

#[derive(Debug, Clone, Copy)]
pub struct DifficultyConfig {
    pub window_gameweeks: u32,
    pub blank_difficulty: f64,
    pub finished: FinishedPolicy,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            window_gameweeks: DEFAULT_WINDOW_GAMEWEEKS,
            blank_difficulty: BLANK_GAMEWEEK_DIFFICULTY,
            finished: FinishedPolicy::UnfinishedOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameweekWindow {
    pub start: u32,
    pub len: u32,
    /// False when `start` came from the fallback rather than an `is_next` event.
    pub from_next_flag: bool,
}

impl GameweekWindow {
    pub fn new(start: u32, len: u32) -> Self {
        Self {
            start,
            len: len.max(1),
            from_next_flag: true,
        }
    }

    /// Last gameweek inside the window (inclusive).
    pub fn end(&self) -> u32 {
        self.start.saturating_add(self.len.saturating_sub(1))
    }

    pub fn contains(&self, gameweek: u32) -> bool {
        gameweek >= self.start && gameweek <= self.end()
    }

    pub fn label(&self) -> String {
        if self.len <= 1 {
            format!("GW{}", self.start)
        } else {
            format!("GW{}-{}", self.start, self.end())
        }
    }
}

pub fn next_gameweek(events: &[Event]) -> Option<u32> {
    events.iter().find(|e| e.is_next).map(|e| e.id)
}

/// Gameweek currently in progress (or most recently started), if the feed flags one.
pub fn current_gameweek(events: &[Event]) -> Option<u32> {
    events.iter().find(|e| e.is_current).map(|e| e.id)
}

pub fn resolve_window(events: &[Event], len: u32) -> GameweekWindow {
    match next_gameweek(events) {
        Some(start) => GameweekWindow::new(start, len),
        None => {
            warn!(
                fallback = FALLBACK_GAMEWEEK,
                "no event flagged as next gameweek; falling back"
            );
            GameweekWindow {
                from_next_flag: false,
                ..GameweekWindow::new(FALLBACK_GAMEWEEK, len)
            }
        }
    }
}

fn in_window(fixture: &Fixture, window: GameweekWindow, policy: FinishedPolicy) -> bool {
    let Some(gw) = fixture.event else {
        return false;
    };
    if !window.contains(gw) {
        return false;
    }
    match policy {
        FinishedPolicy::UnfinishedOnly => !fixture.finished,
        FinishedPolicy::IncludeFinished => true,
    }
}

/// Mean difficulty per team over the window. Every id in `team_ids` gets an entry; teams
/// without a fixture get `cfg.blank_difficulty`.
pub fn compute_team_difficulty(
    fixtures: &[Fixture],
    team_ids: impl IntoIterator<Item = u32>,
    window: GameweekWindow,
    cfg: &DifficultyConfig,
) -> HashMap<u32, f64> {
    let mut acc: HashMap<u32, (f64, u32)> = HashMap::new();
    for f in fixtures.iter().filter(|f| in_window(f, window, cfg.finished)) {
        let home = acc.entry(f.team_h).or_insert((0.0, 0));
        home.0 += f64::from(f.team_h_difficulty);
        home.1 += 1;
        let away = acc.entry(f.team_a).or_insert((0.0, 0));
        away.0 += f64::from(f.team_a_difficulty);
        away.1 += 1;
    }

    team_ids
        .into_iter()
        .map(|team_id| {
            let difficulty = match acc.get(&team_id) {
                Some(&(sum, n)) if n > 0 => sum / f64::from(n),
                _ => cfg.blank_difficulty,
            };
            (team_id, difficulty)
        })
        .collect()
}

/// Fixtures inside the window, ordered by gameweek then kickoff.
pub fn upcoming_fixtures<'a>(
    fixtures: &'a [Fixture],
    window: GameweekWindow,
    policy: FinishedPolicy,
) -> Vec<&'a Fixture> {
    let mut out: Vec<&Fixture> = fixtures
        .iter()
        .filter(|f| in_window(f, window, policy))
        .collect();
    // RFC 3339 UTC strings sort chronologically.
    out.sort_by(|a, b| {
        a.event
            .cmp(&b.event)
            .then_with(|| a.kickoff_time.cmp(&b.kickoff_time))
            .then(a.id.cmp(&b.id))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(id: u32, gw: Option<u32>, h: u32, a: u32, hd: u8, ad: u8, finished: bool) -> Fixture {
        Fixture {
            id,
            event: gw,
            team_h: h,
            team_a: a,
            team_h_difficulty: hd,
            team_a_difficulty: ad,
            finished,
            kickoff_time: None,
            team_h_score: None,
            team_a_score: None,
        }
    }

    fn event(id: u32, is_next: bool) -> Event {
        Event {
            id,
            name: format!("Gameweek {id}"),
            is_next,
            is_current: false,
        }
    }

    #[test]
    fn mean_uses_matching_side() {
        // Team 1: home (2), away (3), home (4) -> 3.0
        let fixtures = vec![
            fixture(1, Some(5), 1, 2, 2, 5, false),
            fixture(2, Some(6), 3, 1, 4, 3, false),
            fixture(3, Some(7), 1, 4, 4, 1, false),
        ];
        let window = GameweekWindow::new(5, 3);
        let map = compute_team_difficulty(&fixtures, [1, 2, 3, 4], window, &DifficultyConfig::default());
        assert!((map[&1] - 3.0).abs() < 1e-12);
        assert!((map[&2] - 5.0).abs() < 1e-12);
        assert!((map[&3] - 4.0).abs() < 1e-12);
        assert!((map[&4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn blank_team_gets_configured_default() {
        let fixtures = vec![fixture(1, Some(5), 1, 2, 2, 2, false)];
        let cfg = DifficultyConfig {
            blank_difficulty: 3.0,
            ..DifficultyConfig::default()
        };
        let map = compute_team_difficulty(&fixtures, [1, 2, 9], GameweekWindow::new(5, 3), &cfg);
        assert_eq!(map[&9], 3.0);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn fixtures_outside_window_or_unscheduled_are_ignored() {
        let fixtures = vec![
            fixture(1, Some(4), 1, 2, 1, 1, false),
            fixture(2, Some(8), 1, 2, 1, 1, false),
            fixture(3, None, 1, 2, 1, 1, false),
        ];
        let map = compute_team_difficulty(
            &fixtures,
            [1, 2],
            GameweekWindow::new(5, 3),
            &DifficultyConfig::default(),
        );
        assert_eq!(map[&1], BLANK_GAMEWEEK_DIFFICULTY);
        assert_eq!(map[&2], BLANK_GAMEWEEK_DIFFICULTY);
    }

    #[test]
    fn finished_policy_controls_inclusion() {
        let fixtures = vec![
            fixture(1, Some(5), 1, 2, 2, 4, true),
            fixture(2, Some(6), 1, 2, 4, 2, false),
        ];
        let window = GameweekWindow::new(5, 3);
        let unfinished = compute_team_difficulty(&fixtures, [1], window, &DifficultyConfig::default());
        assert_eq!(unfinished[&1], 4.0);

        let cfg = DifficultyConfig {
            finished: FinishedPolicy::IncludeFinished,
            ..DifficultyConfig::default()
        };
        let all = compute_team_difficulty(&fixtures, [1], window, &cfg);
        assert_eq!(all[&1], 3.0);
    }

    #[test]
    fn double_gameweek_counts_both_fixtures() {
        let fixtures = vec![
            fixture(1, Some(5), 1, 2, 2, 3, false),
            fixture(2, Some(5), 3, 1, 2, 5, false),
        ];
        let map = compute_team_difficulty(
            &fixtures,
            [1],
            GameweekWindow::new(5, 1),
            &DifficultyConfig::default(),
        );
        assert_eq!(map[&1], 3.5);
    }

    #[test]
    fn window_from_next_flag_or_fallback() {
        let events = vec![event(1, false), event(2, true), event(3, false)];
        let window = resolve_window(&events, 3);
        assert_eq!(window.start, 2);
        assert_eq!(window.end(), 4);
        assert!(window.from_next_flag);

        let none = resolve_window(&[event(1, false)], 3);
        assert_eq!(none.start, FALLBACK_GAMEWEEK);
        assert!(!none.from_next_flag);
        assert_eq!(none.label(), "GW1-3");
    }

    #[test]
    fn window_len_is_at_least_one() {
        let w = GameweekWindow::new(10, 0);
        assert_eq!(w.len, 1);
        assert!(w.contains(10));
        assert!(!w.contains(11));
        assert_eq!(w.label(), "GW10");
    }

    #[test]
    fn zero_length_literal_does_not_underflow() {
        let w = GameweekWindow {
            start: 7,
            len: 0,
            from_next_flag: true,
        };
        assert_eq!(w.end(), 7);
        assert!(w.contains(7));
        assert_eq!(w.label(), "GW7");
    }

    #[test]
    fn upcoming_sorted_by_gameweek_then_kickoff() {
        let mut a = fixture(1, Some(6), 1, 2, 2, 2, false);
        a.kickoff_time = Some("2026-09-20T14:00:00Z".to_string());
        let mut b = fixture(2, Some(5), 3, 4, 2, 2, false);
        b.kickoff_time = Some("2026-09-13T16:30:00Z".to_string());
        let mut c = fixture(3, Some(5), 5, 6, 2, 2, false);
        c.kickoff_time = Some("2026-09-13T11:30:00Z".to_string());
        let fixtures = vec![a, b, c];
        let rows = upcoming_fixtures(&fixtures, GameweekWindow::new(5, 3), FinishedPolicy::UnfinishedOnly);
        let ids: Vec<u32> = rows.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
