//! Bot API objects, limited to the fields the dispatcher and its actions read.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub chat: Option<Chat>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
    #[serde(default)]
    pub sticker: Option<Sticker>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: String,
}

impl User {
    /// The handle if the user has one, otherwise the first name.
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.first_name
        } else {
            &self.username
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
}

impl Chat {
    /// The title for groups and channels, the chat kind for untitled private chats.
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.kind
        } else {
            &self.title
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sticker {
    pub file_id: String,
    #[serde(default)]
    pub file_unique_id: String,
    #[serde(default)]
    pub set_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

impl BotCommand {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: description.into(),
        }
    }
}

/// Kinds of "still working" indicator accepted by `sendChatAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    RecordVoice,
    UploadVoice,
    UploadDocument,
    UploadVideo,
    RecordVideoNote,
    UploadVideoNote,
}

impl ChatAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Typing => "typing",
            Self::UploadPhoto => "upload_photo",
            Self::RecordVoice => "record_voice",
            Self::UploadVoice => "upload_voice",
            Self::UploadDocument => "upload_document",
            Self::UploadVideo => "upload_video",
            Self::RecordVideoNote => "record_video_note",
            Self::UploadVideoNote => "upload_video_note",
        }
    }
}

impl std::fmt::Display for ChatAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{ChatAction, Update, User};

    #[test]
    fn update_decodes_nested_message() {
        let raw = r#"{
            "update_id": 901,
            "message": {
                "message_id": 5,
                "from": {"id": 7, "is_bot": false, "first_name": "Ann", "username": "ann"},
                "chat": {"id": -100, "type": "supergroup", "title": "Club"},
                "text": "/meme@gotbot 5",
                "reply_to_message": {"message_id": 4, "text": "earlier"},
                "sticker": {"file_id": "CAAD", "file_unique_id": "u1", "set_name": "cats"}
            }
        }"#;
        let update: Update = serde_json::from_str(raw).expect("decode");
        let message = update.message.expect("message");
        assert_eq!(update.update_id, 901);
        assert_eq!(message.chat.as_ref().map(|c| c.kind.as_str()), Some("supergroup"));
        assert_eq!(
            message.reply_to_message.as_ref().map(|m| m.text.as_str()),
            Some("earlier")
        );
        assert_eq!(message.sticker.map(|s| s.set_name), Some("cats".to_string()));
    }

    #[test]
    fn update_without_message_or_text() {
        let update: Update = serde_json::from_str(r#"{"update_id": 3}"#).expect("decode");
        assert!(update.message.is_none());

        let update: Update =
            serde_json::from_str(r#"{"update_id": 4, "message": {"message_id": 1}}"#)
                .expect("decode");
        let message = update.message.expect("message");
        assert_eq!(message.text, "");
        assert!(message.from.is_none());
        assert!(message.chat.is_none());
    }

    #[test]
    fn display_name_prefers_handle() {
        let mut user = User {
            id: 1,
            is_bot: false,
            first_name: "Ann".to_string(),
            username: "ann_h".to_string(),
        };
        assert_eq!(user.display_name(), "ann_h");
        user.username.clear();
        assert_eq!(user.display_name(), "Ann");
    }

    #[test]
    fn chat_action_wire_names() {
        assert_eq!(ChatAction::Typing.as_str(), "typing");
        assert_eq!(
            serde_json::to_value(ChatAction::RecordVideoNote).expect("encode"),
            serde_json::json!("record_video_note")
        );
    }
}
