use std::sync::Arc;
use std::time::Duration;

use teloxide::Bot;

use napomni::appsettings::AppSettings;
use napomni::epguide::EpisodeGuide;
use napomni::nba::GameSchedule;
use napomni::scheduling::ReminderScheduler;
use napomni::telegram::{TelegramDeliveryChannel, TelegramInteractionInterface};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = AppSettings::new()?;

    let scheduler = Arc::new(ReminderScheduler::initialize(&settings.reminders.file)?);
    let bot = Bot::new(settings.telegram.token.clone());

    let delivery = Arc::new(TelegramDeliveryChannel::new(bot.clone()));
    let watcher = Arc::clone(&scheduler).watch(delivery);

    let epguide = Arc::new(EpisodeGuide::new(settings.epguide.base_url.clone()));
    let games = Arc::new(GameSchedule::new(&settings.games.file));

    TelegramInteractionInterface::start(bot, Arc::clone(&scheduler), epguide, games).await;

    log::info!("Interaction interface stopped, stopping the reminder watcher");
    watcher.stop(Duration::from_secs(5)).await;

    Ok(())
}
