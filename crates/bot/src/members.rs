use async_trait::async_trait;
use eyre::{Context as _, Error};
use ledger::ChatMembers;
use model::{ChatId, UserId};
use teloxide::{prelude::Requester as _, types, Bot};

pub struct TgMembers {
    bot: Bot,
}

impl TgMembers {
    pub fn new(bot: Bot) -> Self {
        TgMembers { bot }
    }
}

#[async_trait]
impl ChatMembers for TgMembers {
    async fn administrators(&self, chat_id: ChatId) -> Result<Vec<UserId>, Error> {
        let admins = self
            .bot
            .get_chat_administrators(types::ChatId(chat_id))
            .await
            .context("get_chat_administrators")?;
        Ok(admins
            .into_iter()
            .map(|member| member.user.id.0 as UserId)
            .collect())
    }

    async fn remove(&self, chat_id: ChatId, user_id: UserId) -> Result<(), Error> {
        let tg_user = u64::try_from(user_id)
            .map(types::UserId)
            .context("user id must not be negative")?;
        self.bot
            .ban_chat_member(types::ChatId(chat_id), tg_user)
            .await
            .context("ban_chat_member")?;
        Ok(())
    }
}
