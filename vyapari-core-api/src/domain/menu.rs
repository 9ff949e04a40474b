use serde_json::{json, Value};

use super::callback::TokenString;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Round-trips an opaque token back to the server.
    Callback(TokenString),
    /// Prefills the user's input box with editable text.
    InsertText(String),
    /// Asks the user to share their phone number.
    RequestContact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuButton {
    pub label: String,
    pub action: ButtonAction,
}

impl MenuButton {
    pub fn callback(label: impl Into<String>, token: TokenString) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(token),
        }
    }

    pub fn insert_text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::InsertText(text.into()),
        }
    }

    pub fn request_contact(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::RequestContact,
        }
    }

    fn to_json(&self) -> Value {
        match &self.action {
            ButtonAction::Callback(token) => json!({ "text": self.label, "callback_data": token.as_str() }),
            ButtonAction::InsertText(text) => {
                json!({ "text": self.label, "switch_inline_query_current_chat": text })
            }
            ButtonAction::RequestContact => json!({ "text": self.label, "request_contact": true }),
        }
    }
}

/// Rows of buttons attached to an outbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub rows: Vec<Vec<MenuButton>>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<MenuButton>) -> Self {
        self.rows.push(buttons);
        self
    }

    pub fn push_row(&mut self, buttons: Vec<MenuButton>) {
        self.rows.push(buttons);
    }

    pub fn buttons(&self) -> impl Iterator<Item = &MenuButton> {
        self.rows.iter().flatten()
    }

    /// Callback tokens carried by this menu, in display order.
    pub fn tokens(&self) -> Vec<&str> {
        self.buttons()
            .filter_map(|b| match &b.action {
                ButtonAction::Callback(token) => Some(token.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Telegram `reply_markup` encoding. Contact requests need a reply
    /// keyboard; everything else is an inline keyboard.
    pub fn to_reply_markup(&self) -> Value {
        let rows: Vec<Vec<Value>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(MenuButton::to_json).collect())
            .collect();

        if self.buttons().any(|b| b.action == ButtonAction::RequestContact) {
            json!({ "keyboard": rows, "one_time_keyboard": true, "resize_keyboard": true })
        } else {
            json!({ "inline_keyboard": rows })
        }
    }
}
