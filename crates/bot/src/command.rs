use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "Subscription bot commands:"
)]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "extend a subscription: /add userid|hours|note")]
    Add(String),
    #[command(description = "shorten a subscription: /reduce userid|hours|note")]
    Reduce(String),
}
