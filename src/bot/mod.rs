//! Telegram bot module - Daily plans and summaries on demand or on schedule

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use teloxide::{prelude::*, types::ChatId, utils::command::BotCommands};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::coach::{daily_summary, make_rng, plan_from_store};
use crate::config::PlannerConfig;
use crate::db::Database;
use crate::quotes::{format_quote, random_quote};
use crate::summary::format_routine;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;
type Subscribers = Arc<Mutex<HashSet<ChatId>>>;
type SharedDb = Arc<Mutex<Database>>;

/// Daily plan interval (24 hours)
const DAILY_INTERVAL_SECS: u64 = 24 * 3600;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum Command {
    #[command(description = "Start")]
    Start,
    #[command(description = "Show help")]
    Help,
    #[command(description = "Plan and publish today's routine")]
    Plan,
    #[command(description = "Show the published routine")]
    Today,
    #[command(description = "Daily summary")]
    Summary,
    #[command(description = "Send the plan and summary every day")]
    Remind,
    #[command(description = "Stop daily messages")]
    Stop,
}

/// Plan and publish the day's routine
async fn plan_today(db: &SharedDb, config: &PlannerConfig) -> HandlerResult {
    let db = db.lock().await;
    let now = Utc::now();
    plan_from_store(&db, config, now, &mut make_rng(None), false)?;
    Ok(())
}

async fn summary_text(db: &SharedDb, config: &PlannerConfig) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
    let db = db.lock().await;
    Ok(daily_summary(&db, config, Utc::now())?)
}

/// Background task that plans the day and sends the summary every 24 hours
async fn daily_task(bot: Bot, db: SharedDb, config: Arc<PlannerConfig>, subscribers: Subscribers) {
    info!("Daily task started (interval: {} seconds)", DAILY_INTERVAL_SECS);

    loop {
        tokio::time::sleep(Duration::from_secs(DAILY_INTERVAL_SECS)).await;

        let subs: Vec<ChatId> = subscribers.lock().await.iter().copied().collect();
        if subs.is_empty() {
            continue;
        }

        if let Err(e) = plan_today(&db, &config).await {
            error!("Daily planning failed: {}", e);
            continue;
        }
        let text = match summary_text(&db, &config).await {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to build daily summary: {}", e);
                continue;
            }
        };

        info!("Sending daily summary to {} subscribers", subs.len());
        for chat_id in subs {
            if let Err(e) = bot.send_message(chat_id, text.clone()).await {
                error!("Failed to send summary to {}: {}", chat_id, e);
            }
        }
    }
}

/// Start the Telegram bot with the daily task
pub async fn run_bot(token: String, db_path: &str, config: PlannerConfig) -> anyhow::Result<()> {
    let bot = Bot::new(token);
    let db: SharedDb = Arc::new(Mutex::new(Database::open(db_path)?));
    let config = Arc::new(config);
    let subscribers: Subscribers = Arc::new(Mutex::new(HashSet::new()));

    let task_bot = bot.clone();
    let task_db = db.clone();
    let task_config = config.clone();
    let task_subs = subscribers.clone();
    tokio::spawn(async move {
        daily_task(task_bot, task_db, task_config, task_subs).await;
    });

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![db, config, subscribers])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: SharedDb,
    config: Arc<PlannerConfig>,
    subscribers: Subscribers,
) -> HandlerResult {
    match cmd {
        Command::Start => {
            let quote = random_quote(&mut make_rng(None)).map(format_quote).unwrap_or_default();
            let text = format!(
                "🏋️ autocoach\n\n\
                Push / Pull / Legs / Core planner with progressive overload\n\n\
                /plan - plan today's routine\n\
                /today - published routine\n\
                /summary - daily summary\n\
                /remind - daily plan and summary\n\
                /stop - stop daily messages\n\n\
                {}",
                quote
            );
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }

        Command::Plan => {
            let text = {
                let db = db.lock().await;
                let plan = plan_from_store(&db, &config, Utc::now(), &mut make_rng(None), false)?;
                let mut text = format_routine(&plan.routine);
                for warning in &plan.warnings {
                    text.push_str(&format!("\n⚠️ {}", warning));
                }
                text
            };
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Today => {
            let routine = db.lock().await.latest_routine()?;
            let text = match routine {
                Some(routine) => format_routine(&routine),
                None => "No routine yet. Send /plan!".to_string(),
            };
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Summary => {
            let text = summary_text(&db, &config).await?;
            bot.send_message(msg.chat.id, text).await?;
        }

        Command::Remind => {
            let count = {
                let mut subs = subscribers.lock().await;
                subs.insert(msg.chat.id);
                subs.len()
            };

            bot.send_message(
                msg.chat.id,
                format!(
                    "✅ Daily messages on!\n\n\
                    A fresh plan and summary every 24 hours.\n\
                    /stop - turn off\n\n\
                    Active subscribers: {}",
                    count
                ),
            )
            .await?;

            info!("User {} subscribed to daily summaries", msg.chat.id);
        }

        Command::Stop => {
            let was_subscribed = subscribers.lock().await.remove(&msg.chat.id);

            if was_subscribed {
                bot.send_message(msg.chat.id, "🔕 Daily messages off.\n\n/remind - turn on again")
                    .await?;
                info!("User {} unsubscribed from daily summaries", msg.chat.id);
            } else {
                bot.send_message(msg.chat.id, "Daily messages are already off.\n\n/remind - turn on")
                    .await?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_parse() {
        assert!(matches!(Command::parse("/plan", "autocoach_bot"), Ok(Command::Plan)));
        assert!(matches!(Command::parse("/summary", "autocoach_bot"), Ok(Command::Summary)));
        assert!(Command::parse("/unknown", "autocoach_bot").is_err());
    }

    #[test]
    fn test_descriptions_list_commands() {
        let text = Command::descriptions().to_string();
        for cmd in ["/plan", "/today", "/summary", "/remind", "/stop"] {
            assert!(text.contains(cmd), "{} missing", cmd);
        }
    }

    #[tokio::test]
    async fn test_plan_today_publishes_routine() {
        let db: SharedDb = Arc::new(Mutex::new(Database::open(":memory:").unwrap()));
        plan_today(&db, &PlannerConfig::default()).await.unwrap();

        assert!(db.lock().await.latest_routine().unwrap().is_some());
        let text = summary_text(&db, &PlannerConfig::default()).await.unwrap();
        assert!(text.contains("What's Next"));
    }
}
