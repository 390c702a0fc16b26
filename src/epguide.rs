use serde::Deserialize;

/// Client for the epguides JSON API backing the `/nextep` and `/lastep`
/// commands.
pub struct EpisodeGuide {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct EpguideResponse {
    episode: Episode,
}

#[derive(Debug, Deserialize)]
struct Episode {
    title: String,
    release_date: String,
    season: u32,
    number: u32,
}

impl EpisodeGuide {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// `s02e05: <title> (<release date>)` for the next unaired episode of
    /// the series.
    pub async fn next_episode(&self, series: &str) -> anyhow::Result<String> {
        self.lookup(series, "next").await
    }

    /// Same, for the most recently aired episode.
    pub async fn last_episode(&self, series: &str) -> anyhow::Result<String> {
        self.lookup(series, "last").await
    }

    async fn lookup(&self, series: &str, which: &str) -> anyhow::Result<String> {
        let url = self.show_url(series, which);
        log::debug!("Fetching {url}");

        let response: EpguideResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(format_episode(&response.episode))
    }

    fn show_url(&self, series: &str, which: &str) -> String {
        format!(
            "{}/show/{}/{}/",
            self.base_url,
            strip_whitespace(series),
            which
        )
    }
}

fn format_episode(episode: &Episode) -> String {
    format!(
        "s{:02}e{:02}: {} ({})",
        episode.season, episode.number, episode.title, episode.release_date
    )
}

// Show slugs in the API contain no whitespace.
fn strip_whitespace(series: &str) -> String {
    series.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_urls_drop_whitespace() {
        let guide = EpisodeGuide::new("https://epguides.example");

        assert_eq!(
            guide.show_url("The  Expanse", "next"),
            "https://epguides.example/show/TheExpanse/next/"
        );
    }

    #[test]
    fn trailing_slash_on_the_base_url_is_tolerated() {
        let guide = EpisodeGuide::new("https://epguides.example/");

        assert_eq!(
            guide.show_url("severance", "last"),
            "https://epguides.example/show/severance/last/"
        );
    }

    #[test]
    fn parses_and_formats_the_api_response() {
        let response: EpguideResponse = serde_json::from_str(
            r#"{"episode": {"title": "Leviathan Wakes", "release_date": "2021-12-10",
                "season": 6, "number": 1, "show": {"title": "The Expanse"}}}"#,
        )
        .unwrap();

        assert_eq!(
            format_episode(&response.episode),
            "s06e01: Leviathan Wakes (2021-12-10)"
        );
    }

    #[test]
    fn pads_season_and_episode_numbers() {
        let episode = Episode {
            title: "Pilot".to_owned(),
            release_date: "2008-01-20".to_owned(),
            season: 1,
            number: 1,
        };

        assert_eq!(format_episode(&episode), "s01e01: Pilot (2008-01-20)");
    }
}
