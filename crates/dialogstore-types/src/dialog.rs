use serde::{Deserialize, Serialize};

use crate::error::DialogError;

/// A single conversation record with exactly one allowed reply.
///
/// `id` and `chat_id` are fixed at construction. `reply` and `replied` only
/// change through [`Dialog::set_reply`], which moves the dialog from
/// Unreplied to Replied once and never back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dialog {
    id: i64,
    user_name: String,
    first_name: String,
    last_name: String,
    chat_id: i64,
    reply: String,
    replied: bool,
}

/// Column values of a stored dialog, used by storage adapters to rebuild a
/// [`Dialog`] without going through the reply transition.
#[derive(Debug, Clone)]
pub struct PersistedDialog {
    pub id: i64,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub chat_id: i64,
    pub reply: String,
    pub replied: bool,
}

impl Dialog {
    /// Create an Unreplied dialog.
    ///
    /// Identifier validation belongs to the service; this constructor accepts
    /// any values.
    pub fn new(
        id: i64,
        user_name: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        chat_id: i64,
    ) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            chat_id,
            reply: String::new(),
            replied: false,
        }
    }

    /// Rebuild a dialog from stored column values.
    pub fn from_persisted(data: PersistedDialog) -> Self {
        Self {
            id: data.id,
            user_name: data.user_name,
            first_name: data.first_name,
            last_name: data.last_name,
            chat_id: data.chat_id,
            reply: data.reply,
            replied: data.replied,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    /// The operator's reply, empty until [`Dialog::set_reply`] succeeds.
    pub fn reply(&self) -> &str {
        &self.reply
    }

    pub fn is_replied(&self) -> bool {
        self.replied
    }

    /// Apply the reply transition.
    ///
    /// # Errors
    ///
    /// - [`DialogError::EmptyMessage`] if `message` is empty (checked first).
    /// - [`DialogError::AlreadyReplied`] if the dialog is already replied.
    ///
    /// On error the dialog is left untouched.
    pub fn set_reply(&mut self, message: impl Into<String>) -> Result<(), DialogError> {
        let message = message.into();
        if message.is_empty() {
            return Err(DialogError::EmptyMessage);
        }
        if self.replied {
            return Err(DialogError::AlreadyReplied(self.id));
        }

        self.reply = message;
        self.replied = true;
        Ok(())
    }
}

/// Payload for creating a dialog, as received from the messaging front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDialogRequest {
    pub id: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub chat_id: i64,
}

impl CreateDialogRequest {
    /// Both identifiers must be strictly positive.
    pub fn has_valid_ids(&self) -> bool {
        self.id > 0 && self.chat_id > 0
    }

    /// Build the Unreplied dialog this request describes.
    pub fn into_dialog(self) -> Dialog {
        Dialog::new(
            self.id,
            self.user_name,
            self.first_name,
            self.last_name,
            self.chat_id,
        )
    }
}
