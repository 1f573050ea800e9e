mod command;
mod err;
mod handlers;
mod members;

use std::sync::Arc;

use env::Env;
use eyre::Result;
use ledger::Ledger;
use log::info;
use teloxide::{
    dispatching::{HandlerExt as _, MessageFilterExt as _, UpdateFilterExt as _},
    dptree,
    prelude::{Dispatcher, Requester as _},
    types::{Message, Update, User},
    utils::command::BotCommands as _,
    Bot,
};

pub use command::Command;
pub use members::TgMembers;

#[derive(Clone)]
pub struct BotApp {
    pub bot: Bot,
    pub env: Env,
}

impl BotApp {
    pub fn new(env: Env) -> Self {
        BotApp {
            bot: Bot::new(env.tg_token()),
            env,
        }
    }

    /// Membership operations backed by this bot.
    pub fn members(&self) -> Arc<TgMembers> {
        Arc::new(TgMembers::new(self.bot.clone()))
    }

    pub async fn start(self, ledger: Ledger) -> Result<()> {
        let bot = self.bot;
        bot.set_my_commands(Command::bot_commands()).await?;

        let cmd_ledger = ledger.clone();
        let join_ledger = ledger;
        let handler = Update::filter_message()
            .branch(dptree::entry().filter_command::<Command>().endpoint(
                move |bot: Bot, msg: Message, cmd: Command| {
                    handlers::command_handler(bot, msg, cmd, cmd_ledger.clone())
                },
            ))
            .branch(Message::filter_new_chat_members().endpoint(
                move |bot: Bot, msg: Message, members: Vec<User>| {
                    handlers::join_handler(bot, msg, members, join_ledger.clone())
                },
            ));

        info!("Bot is listening, sweeping chat {}", self.env.chat_id());
        Dispatcher::builder(bot, handler)
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
        Ok(())
    }
}
