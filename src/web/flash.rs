use tower_sessions::Session;

use crate::error::StudioError;

const FLASH_FLAG_KEY: &str = "flash_flag";

pub(crate) const FLASH_PROMPT_LOADED: u16 = 1;
pub(crate) const FLASH_EMPTY_PROMPT: u16 = 2;

#[derive(Clone, Debug)]
pub(crate) struct FlashMessage {
    pub(crate) text: &'static str,
    pub(crate) class: &'static str,
}

pub(crate) async fn set_flash(session: &Session, flag: u16) -> Result<(), StudioError> {
    session.insert(FLASH_FLAG_KEY, flag).await?;
    Ok(())
}

pub(crate) async fn take_flash_message(
    session: &Session,
) -> Result<Option<FlashMessage>, StudioError> {
    let flag = session
        .get::<u16>(FLASH_FLAG_KEY)
        .await?
        .filter(|flag| *flag != 0);
    if flag.is_some() {
        session.insert(FLASH_FLAG_KEY, 0u16).await?;
    }
    Ok(flag.and_then(message_for))
}

fn message_for(flag: u16) -> Option<FlashMessage> {
    match flag {
        FLASH_PROMPT_LOADED => Some(FlashMessage {
            text: "Prompt loaded into the form. Adjust it and generate again.",
            class: "success",
        }),
        FLASH_EMPTY_PROMPT => Some(FlashMessage {
            text: "Please enter a prompt.",
            class: "warning",
        }),
        _ => None,
    }
}
