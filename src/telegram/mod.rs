mod delivery;
mod duration;

pub use delivery::{TelegramDeliveryChannel, TelegramDeliveryError};

use std::sync::Arc;

use chrono::Utc;
use teloxide::{dptree, prelude::*, utils::command::BotCommands};

use crate::epguide::EpisodeGuide;
use crate::nba::{format_game, GameSchedule};
use crate::scheduling::{ReminderScheduler, SchedulerError};
use duration::{format_duration, parse_remind_request};

type HandlerResult = anyhow::Result<()>;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
enum Command {
    #[command(description = "schedule a reminder: /remind 1h30m stretch your legs")]
    Remind(String),
    #[command(description = "list pending reminders")]
    List,
    #[command(description = "show when the next reminder fires")]
    Next,
    #[command(description = "when does the next episode air: /nextep the expanse")]
    Nextep(String),
    #[command(description = "when did the last episode air: /lastep the expanse")]
    Lastep(String),
    #[command(description = "when does the team play next: /nextgame warriors")]
    Nextgame(String),
    #[command(description = "when did the team last play: /lastgame warriors")]
    Lastgame(String),
    #[command(description = "show this help")]
    Help,
}

pub struct TelegramInteractionInterface;
impl TelegramInteractionInterface {
    pub async fn start(
        bot: Bot,
        scheduler: Arc<ReminderScheduler>,
        epguide: Arc<EpisodeGuide>,
        games: Arc<GameSchedule>,
    ) {
        log::info!("Starting Telegram interaction interface");

        let command_handler =
            teloxide::filter_command::<Command, _>().endpoint(handle_command);

        let schema = Update::filter_message()
            .branch(command_handler)
            .branch(dptree::endpoint(unrecognized));

        Dispatcher::builder(bot, schema)
            .dependencies(dptree::deps![scheduler, epguide, games])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await
    }
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    scheduler: Arc<ReminderScheduler>,
    epguide: Arc<EpisodeGuide>,
    games: Arc<GameSchedule>,
) -> HandlerResult {
    match cmd {
        Command::Remind(args) => remind(&bot, &msg, &scheduler, &args).await,
        Command::List => list(&bot, &msg, &scheduler).await,
        Command::Next => next(&bot, &msg, &scheduler).await,
        Command::Nextep(series) => episode(&bot, &msg, &epguide, &series, EpisodeQuery::Next).await,
        Command::Lastep(series) => episode(&bot, &msg, &epguide, &series, EpisodeQuery::Last).await,
        Command::Nextgame(team) => game(&bot, &msg, &games, &team, GameQuery::Next).await,
        Command::Lastgame(team) => game(&bot, &msg, &games, &team, GameQuery::Last).await,
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
            Ok(())
        }
    }
}

async fn remind(
    bot: &Bot,
    msg: &Message,
    scheduler: &ReminderScheduler,
    args: &str,
) -> HandlerResult {
    const USAGE: &str = "I could not understand that. Use /remind <duration> <text>, \
         for example /remind 1h30m stretch your legs.";

    let Some((duration, text)) = parse_remind_request(args) else {
        bot.send_message(msg.chat.id, USAGE).await?;
        return Ok(());
    };

    // A duration can parse yet overshoot the representable dates.
    let Some(when) = Utc::now().checked_add_signed(duration) else {
        bot.send_message(msg.chat.id, USAGE).await?;
        return Ok(());
    };

    let reminder = scheduler
        .add(sender_name(msg), text, msg.chat.id.to_string(), when)
        .await;

    if let Err(error) = scheduler.save().await {
        log::warn!("Reminder accepted but not persisted: {error}");
    }
    scheduler.notify(&reminder);

    bot.send_message(
        msg.chat.id,
        format!(
            "⏰ Will do. Reminding you in {} (at {}).",
            format_duration(duration),
            reminder.when.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    )
    .await?;

    Ok(())
}

async fn list(bot: &Bot, msg: &Message, scheduler: &ReminderScheduler) -> HandlerResult {
    let pending = scheduler.pending().await;
    if pending.is_empty() {
        bot.send_message(msg.chat.id, "No reminders pending. Use /remind to add one.")
            .await?;
        return Ok(());
    }

    let now = Utc::now();
    let lines: Vec<String> = pending
        .iter()
        .map(|reminder| {
            format!(
                "• in {}: {}",
                format_duration(reminder.when - now),
                reminder.what
            )
        })
        .collect();

    bot.send_message(
        msg.chat.id,
        format!("📋 Pending reminders:\n{}", lines.join("\n")),
    )
    .await?;

    Ok(())
}

async fn next(bot: &Bot, msg: &Message, scheduler: &ReminderScheduler) -> HandlerResult {
    let text = match scheduler.peek_next_time().await {
        Ok(when) => format!(
            "⏭ Next reminder fires in {} (at {}).",
            format_duration(when - Utc::now()),
            when.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        Err(SchedulerError::Empty) => "Nothing scheduled.".to_owned(),
    };

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

enum EpisodeQuery {
    Next,
    Last,
}

async fn episode(
    bot: &Bot,
    msg: &Message,
    epguide: &EpisodeGuide,
    series: &str,
    query: EpisodeQuery,
) -> HandlerResult {
    let series = series.trim();
    if series.is_empty() {
        bot.send_message(msg.chat.id, "Tell me which show: /nextep the expanse.")
            .await?;
        return Ok(());
    }

    let result = match query {
        EpisodeQuery::Next => epguide.next_episode(series).await,
        EpisodeQuery::Last => epguide.last_episode(series).await,
    };

    let reply = match result {
        Ok(episode) => episode,
        Err(error) => {
            log::warn!("Episode lookup for {series:?} failed: {error}");
            format!("Could not look anything up for \"{series}\".")
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

enum GameQuery {
    Next,
    Last,
}

async fn game(
    bot: &Bot,
    msg: &Message,
    schedule: &GameSchedule,
    team: &str,
    query: GameQuery,
) -> HandlerResult {
    let team = team.trim();
    if team.is_empty() {
        bot.send_message(msg.chat.id, "Tell me which team: /nextgame warriors.")
            .await?;
        return Ok(());
    }

    let (result, missing) = match query {
        GameQuery::Next => (schedule.next_game(team, Utc::now()), "No upcoming game"),
        GameQuery::Last => (schedule.last_game(team, Utc::now()), "No earlier game"),
    };

    let reply = match result {
        Ok(Some(game)) => format_game(&game),
        Ok(None) => format!("{missing} for \"{team}\" on the schedule."),
        Err(error) => {
            log::warn!("Game lookup for {team:?} failed: {error}");
            format!("Could not look anything up for \"{team}\".")
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn unrecognized(bot: Bot, msg: Message) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Some(reply) = greeting_reply(text, &sender_name(&msg)) {
        bot.send_message(msg.chat.id, reply).await?;
    } else if text.starts_with('/') {
        bot.send_message(msg.chat.id, "Unknown command. Use /help to see what I understand.")
            .await?;
    }
    Ok(())
}

fn greeting_reply(text: &str, who: &str) -> Option<String> {
    match text {
        "hi" => Some(format!("hi, {who}")),
        "o/" => Some(format!("{who}: \\o")),
        _ => None,
    }
}

fn sender_name(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|user| user.full_name())
        .unwrap_or_else(|| "someone".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_remind_with_its_argument_line() {
        let cmd = Command::parse("/remind 10m take out the trash", "napomni_bot").unwrap();

        assert!(matches!(cmd, Command::Remind(args) if args == "10m take out the trash"));
    }

    #[test]
    fn parses_bare_commands() {
        assert!(matches!(
            Command::parse("/list", "napomni_bot").unwrap(),
            Command::List
        ));
        assert!(matches!(
            Command::parse("/next", "napomni_bot").unwrap(),
            Command::Next
        ));
    }

    #[test]
    fn parses_episode_lookups() {
        let cmd = Command::parse("/nextep the expanse", "napomni_bot").unwrap();

        assert!(matches!(cmd, Command::Nextep(series) if series == "the expanse"));
    }

    #[test]
    fn parses_game_lookups() {
        let cmd = Command::parse("/nextgame warriors", "napomni_bot").unwrap();

        assert!(matches!(cmd, Command::Nextgame(team) if team == "warriors"));
    }

    #[test]
    fn rejects_unknown_commands() {
        assert!(Command::parse("/frobnicate", "napomni_bot").is_err());
    }

    #[test]
    fn refuses_due_times_past_the_calendar() {
        let (duration, _) = parse_remind_request("15000000000w stretch your legs").unwrap();

        assert_eq!(Utc::now().checked_add_signed(duration), None);
    }

    #[test]
    fn greets_back_like_a_regular() {
        assert_eq!(greeting_reply("hi", "Ada"), Some("hi, Ada".to_owned()));
        assert_eq!(greeting_reply("o/", "Ada"), Some("Ada: \\o".to_owned()));
        assert_eq!(greeting_reply("hello there", "Ada"), None);
        assert_eq!(greeting_reply("/hi", "Ada"), None);
    }
}
