use chrono::{DateTime, Local, Utc};
use ledger::{Ledger, Reduction};
use log::{error, info};
use model::{adjustment::Adjustment, errors::LedgerError, ChatId, UserId};
use teloxide::{
    prelude::{Requester as _, ResponseResult},
    types::{Message, User},
    Bot,
};

use crate::{command::Command, err::handle_result};

const WELCOME: &str = "Welcome to our subscription service!";

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    ledger: Ledger,
) -> ResponseResult<()> {
    let Some(requester) = msg.from.as_ref().map(user_id) else {
        info!("Ignoring {:?} without a sender", cmd);
        return Ok(());
    };
    let chat_id = msg.chat.id.0;

    let text = match cmd {
        Command::Start => WELCOME.to_string(),
        Command::Add(args) => handle_result(add(&ledger, chat_id, requester, &args).await, "/add"),
        Command::Reduce(args) => handle_result(
            reduce(&ledger, chat_id, requester, &args, Utc::now()).await,
            "/reduce",
        ),
    };
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

pub async fn join_handler(
    bot: Bot,
    msg: Message,
    members: Vec<User>,
    ledger: Ledger,
) -> ResponseResult<()> {
    for member in track_members(&ledger, &members, Utc::now()).await {
        if let Err(err) = bot
            .send_message(msg.chat.id, welcome(&member.first_name))
            .await
        {
            error!("Failed to welcome {}: {:#}", member.id.0, err);
        }
    }
    Ok(())
}

/// Starts a subscription for every human member, returning the tracked ones.
pub(crate) async fn track_members<'a>(
    ledger: &Ledger,
    members: &'a [User],
    now: DateTime<Utc>,
) -> Vec<&'a User> {
    let mut tracked = Vec::with_capacity(members.len());
    for member in members.iter().filter(|member| !member.is_bot) {
        match ledger.subscriptions.on_join(user_id(member), now).await {
            Ok(_) => tracked.push(member),
            Err(err) => {
                error!("Failed to start subscription of {}: {:#}", member.id.0, err);
            }
        }
    }
    tracked
}

pub(crate) async fn add(
    ledger: &Ledger,
    chat_id: ChatId,
    requester: UserId,
    args: &str,
) -> Result<String, LedgerError> {
    let admin = ledger.subscriptions.authorize(chat_id, requester).await?;
    let adjustment = Adjustment::parse(args)?;
    let sub = ledger.subscriptions.extend(&admin, &adjustment).await?;
    Ok(format!(
        "Added {} hours to user {}, subscription valid until {}. Note: {}",
        adjustment.hours,
        sub.user_id,
        fmt_time(sub.expires_at()),
        adjustment.note
    ))
}

pub(crate) async fn reduce(
    ledger: &Ledger,
    chat_id: ChatId,
    requester: UserId,
    args: &str,
    now: DateTime<Utc>,
) -> Result<String, LedgerError> {
    let admin = ledger.subscriptions.authorize(chat_id, requester).await?;
    let adjustment = Adjustment::parse(args)?;
    Ok(match ledger.subscriptions.reduce(&admin, &adjustment, now).await? {
        Reduction::Shortened(sub) => format!(
            "Removed {} hours from user {}, subscription valid until {}. Note: {}",
            adjustment.hours,
            sub.user_id,
            fmt_time(sub.expires_at()),
            adjustment.note
        ),
        Reduction::Evicted(user_id) => format!(
            "Removed {} hours from user {}, the subscription expired and the user was removed. Note: {}",
            adjustment.hours, user_id, adjustment.note
        ),
    })
}

pub(crate) fn welcome(name: &str) -> String {
    format!("Welcome, {}! Your subscription is valid for 1 day.", name)
}

pub(crate) fn fmt_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn user_id(user: &User) -> UserId {
    user.id.0 as UserId
}
