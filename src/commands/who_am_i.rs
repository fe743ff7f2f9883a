//! `who-am-i`: identity behind the access token.

use crate::api::{MattermostApi, User};
use crate::error::CommandResult;
use crate::ui::Console;

pub fn run(api: &dyn MattermostApi, console: &mut Console) -> CommandResult<User> {
    let me = api.get_me()?.entity()?;
    print_identity(&me, console);
    Ok(me)
}

pub fn print_identity(user: &User, console: &mut Console) {
    console.key_value("Id", &user.id);
    console.key_value("Username", &user.username);
    console.key_value("Email", &user.email);
    console.key_value("Last name", &user.last_name);
    console.key_value("First name", &user.first_name);
    console.key_value("Nickname", &user.nickname);
    console.key_value("Role", &user.roles);
    console.key_value("is Bot", user.is_bot);
    if user.is_bot {
        console.key_value("Bot description", user.bot_description.as_deref().unwrap_or_default());
    }
}
