use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// One row of the season schedule. Scores are absent until the game
/// has been played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub date: DateTime<Utc>,
    pub visiting_team: String,
    pub visiting_score: Option<u32>,
    pub home_team: String,
    pub home_score: Option<u32>,
}

#[derive(Debug, Error)]
#[error("game schedule {} could not be read: {source}", .path.display())]
pub struct ScheduleError {
    path: PathBuf,
    #[source]
    source: csv::Error,
}

/// Game lookups over a season schedule in the CSV export format:
/// date, tipoff, box score link, visiting team, points, home team, points.
pub struct GameSchedule {
    path: PathBuf,
}

impl GameSchedule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The first of the team's games strictly after `now`, if any.
    pub fn next_game(
        &self,
        team: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Game>, ScheduleError> {
        let games = self.load_games(team)?;
        let first_after = games.partition_point(|game| game.date <= now);

        Ok(games.get(first_after).cloned())
    }

    /// The last of the team's games at or before `now`, if any.
    pub fn last_game(
        &self,
        team: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Game>, ScheduleError> {
        let games = self.load_games(team)?;
        let first_after = games.partition_point(|game| game.date <= now);

        Ok(first_after.checked_sub(1).and_then(|i| games.get(i).cloned()))
    }

    fn load_games(&self, team: &str) -> Result<Vec<Game>, ScheduleError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|source| self.error(source))?;

        let needle = sanitize(team);
        let mut games = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| self.error(source))?;
            let Some(game) = parse_game(&record) else {
                log::warn!("Skipping malformed schedule row: {record:?}");
                continue;
            };
            if sanitize(&game.visiting_team).contains(&needle)
                || sanitize(&game.home_team).contains(&needle)
            {
                games.push(game);
            }
        }
        games.sort_by_key(|game| game.date);

        Ok(games)
    }

    fn error(&self, source: csv::Error) -> ScheduleError {
        ScheduleError {
            path: self.path.clone(),
            source,
        }
    }
}

fn parse_game(record: &csv::StringRecord) -> Option<Game> {
    let date = record.get(0)?;
    let start = record.get(1)?;
    let naive =
        NaiveDateTime::parse_from_str(&format!("{date} {start}"), "%a %b %d %Y %I:%M %p").ok()?;
    // Tipoff times in the export are US Eastern.
    let tipoff = naive.and_local_timezone(Tz::America__New_York).earliest()?;

    Some(Game {
        date: tipoff.with_timezone(&Utc),
        visiting_team: record.get(3)?.to_owned(),
        visiting_score: record.get(4).and_then(|pts| pts.parse().ok()),
        home_team: record.get(5)?.to_owned(),
        home_score: record.get(6).and_then(|pts| pts.parse().ok()),
    })
}

/// Team matching is loose: lowercased, trimmed, letters and spaces only,
/// substring against either side of the matchup.
fn sanitize(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == ' ')
        .collect()
}

pub fn format_game(game: &Game) -> String {
    let tipoff = game
        .date
        .with_timezone(&Tz::America__New_York)
        .format("%a %b %-d %Y %-I:%M %P");

    match (game.visiting_score, game.home_score) {
        (Some(visiting), Some(home)) => format!(
            "{} {} at {} {} ({} ET)",
            game.visiting_team, visiting, game.home_team, home, tipoff
        ),
        _ => format!(
            "{} at {} on {} ET",
            game.visiting_team, game.home_team, tipoff
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use tempfile::TempDir;

    use super::*;

    const SEASON: &str = "\
Date,Start (ET),Box Score,Visitor/Neutral,PTS,Home/Neutral,PTS,,Notes
Tue Oct 25 2016,7:30 pm,Box Score,New York Knicks,88,Cleveland Cavaliers,117,,
Tue Oct 25 2016,10:30 pm,Box Score,San Antonio Spurs,129,Golden State Warriors,100,,
Sat Dec 25 2027,2:30 pm,,Golden State Warriors,,Cleveland Cavaliers,,,
";

    fn schedule_with(rows: &str) -> (TempDir, GameSchedule) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.csv");
        std::fs::write(&path, rows).unwrap();

        (dir, GameSchedule::new(path))
    }

    fn between_seasons() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn straddles_now_with_last_and_next() {
        let (_dir, schedule) = schedule_with(SEASON);

        let last = schedule.last_game("warriors", between_seasons()).unwrap().unwrap();
        let next = schedule.next_game("warriors", between_seasons()).unwrap().unwrap();

        assert_eq!(last.visiting_team, "San Antonio Spurs");
        assert_eq!(last.visiting_score, Some(129));
        assert_eq!(last.home_score, Some(100));
        assert_eq!(next.home_team, "Cleveland Cavaliers");
        assert_eq!(next.visiting_score, None);
    }

    #[test]
    fn matches_either_side_of_the_matchup() {
        let (_dir, schedule) = schedule_with(SEASON);

        // Home on the 2016 row, visiting on the 2027 row.
        let last = schedule.last_game("warriors", between_seasons()).unwrap().unwrap();
        let next = schedule.next_game("warriors", between_seasons()).unwrap().unwrap();

        assert_eq!(last.home_team, "Golden State Warriors");
        assert_eq!(next.visiting_team, "Golden State Warriors");
    }

    #[test]
    fn team_matching_ignores_case_and_punctuation() {
        let (_dir, schedule) = schedule_with(SEASON);

        let game = schedule.next_game("  CAVALIERS!!  ", between_seasons()).unwrap();

        assert!(game.is_some());
    }

    #[test]
    fn tipoffs_convert_from_eastern_to_utc() {
        let (_dir, schedule) = schedule_with(SEASON);

        let game = schedule.last_game("knicks", between_seasons()).unwrap().unwrap();

        // 7:30 pm EDT is 23:30 UTC.
        assert_eq!(game.date, Utc.with_ymd_and_hms(2016, 10, 25, 23, 30, 0).unwrap());
    }

    #[test]
    fn a_game_at_exactly_now_is_the_last_not_the_next() {
        let (_dir, schedule) = schedule_with(SEASON);
        let now = Utc.with_ymd_and_hms(2016, 10, 25, 23, 30, 0).unwrap();

        let last = schedule.last_game("knicks", now).unwrap().unwrap();

        assert_eq!(last.date, now);
        assert_eq!(schedule.next_game("knicks", now).unwrap(), None);
    }

    #[test]
    fn header_and_malformed_rows_are_skipped() {
        let rows = "\
Date,Start (ET),Box Score,Visitor/Neutral,PTS,Home/Neutral,PTS,,Notes
not,a,game
Tue Oct 25 2016,7:30 pm,Box Score,New York Knicks,88,Cleveland Cavaliers,117,,
";
        let (_dir, schedule) = schedule_with(rows);

        let last = schedule.last_game("knicks", between_seasons()).unwrap().unwrap();

        assert_eq!(last.visiting_team, "New York Knicks");
    }

    #[test]
    fn a_missing_schedule_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let schedule = GameSchedule::new(dir.path().join("missing.csv"));

        assert!(schedule.next_game("warriors", between_seasons()).is_err());
    }

    #[test]
    fn formats_played_and_upcoming_games_differently() {
        let (_dir, schedule) = schedule_with(SEASON);

        let played = schedule.last_game("warriors", between_seasons()).unwrap().unwrap();
        let upcoming = schedule.next_game("warriors", between_seasons()).unwrap().unwrap();

        assert_eq!(
            format_game(&played),
            "San Antonio Spurs 129 at Golden State Warriors 100 (Tue Oct 25 2016 10:30 pm ET)"
        );
        assert_eq!(
            format_game(&upcoming),
            "Golden State Warriors at Cleveland Cavaliers on Sat Dec 25 2027 2:30 pm ET"
        );
    }
}
