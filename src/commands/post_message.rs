//! `post-message`: one post to one channel.

use crate::api::{MattermostApi, Post};
use crate::error::CommandResult;
use crate::ui::Console;

pub fn run(
    api: &dyn MattermostApi,
    channel_id: &str,
    message_text: &str,
    console: &mut Console,
) -> CommandResult<()> {
    let response = api.create_post(&Post::new(channel_id, message_text))?;
    response.throw_on_api_error()?;
    console.message("Message successfully posted.");
    if let Some(id) = response.read_entity().ok().and_then(|post| post.id) {
        console.debug(format!("Post id: {id}"));
    }
    Ok(())
}
