//! Conversational front end for the DormDash engine.
//!
//! The assistant is a thin interpreter: it recognizes one command per
//! message ([`parse_intent`]), applies it to the engine and answers with
//! chat text. The transcript, the applied promotion and the move being
//! configured survive restarts through a JSON state file; accounts,
//! wallets and bookings live in the engine's [`AccountStore`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use engine::{Account, AccountStore, MoveConfig, PromoEngine};

mod handlers;
mod intents;
mod parsing;
mod replies;
mod state;

pub use intents::{parse_intent, FaqTopic, Intent, Leg};
pub use state::{Message, Role};

const DEFAULT_ACCOUNTS_PATH: &str = "data/accounts.json";
const DEFAULT_STATE_PATH: &str = "data/assistant_state.json";

/// Where the host UI should navigate after a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Confirmation,
    Payment,
}

/// A bot answer: the text to show plus an optional navigation hint.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub text: String,
    pub goto: Option<View>,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Reply {
        Reply {
            text: text.into(),
            goto: None,
        }
    }

    pub(crate) fn goto(text: impl Into<String>, view: View) -> Reply {
        Reply {
            text: text.into(),
            goto: Some(view),
        }
    }
}

pub struct Assistant {
    store: AccountStore,
    config: MoveConfig,
    promo: PromoEngine,
    transcript: Vec<Message>,
    /// 0-based saved-place index awaiting a "pickup or dropoff?" answer.
    pending_place: Option<usize>,
    state_path: PathBuf,
}

impl Assistant {
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::default()
    }

    /// Handles one user message and returns the bot's reply.
    ///
    /// The exchange is appended to the transcript and the state file is
    /// rewritten; a failed write is logged and the session continues.
    pub fn handle(&mut self, input: &str, now: DateTime<Utc>) -> Reply {
        self.transcript
            .push(Message::new(Role::User, input.trim(), now));

        let intent = parse_intent(input, self.pending_place.is_some());
        tracing::debug!(?intent, "dispatching");
        let reply = self.dispatch(intent, now);

        self.transcript
            .push(Message::new(Role::Bot, reply.text.clone(), now));
        self.save_state();
        reply
    }

    /// The conversation so far, oldest first.
    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// The move currently being configured.
    #[must_use]
    pub fn config(&self) -> &MoveConfig {
        &self.config
    }

    #[must_use]
    pub fn accounts(&self) -> &AccountStore {
        &self.store
    }

    pub fn accounts_mut(&mut self) -> &mut AccountStore {
        &mut self.store
    }

    /// The active account, if any.
    #[must_use]
    pub fn account(&self) -> Option<&Account> {
        self.store.active()
    }

    fn save_state(&self) {
        let file = state::StateFile {
            messages: self.transcript.clone(),
            promo: self.promo.clone(),
            config: self.config.clone(),
        };
        if let Err(err) = state::write_state(&self.state_path, &file) {
            tracing::warn!(path = %self.state_path.display(), error = %err, "state save failed");
        }
    }
}

#[derive(Debug, Default)]
pub struct AssistantBuilder {
    accounts_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
}

impl AssistantBuilder {
    pub fn accounts_path(mut self, path: impl Into<PathBuf>) -> AssistantBuilder {
        self.accounts_path = Some(path.into());
        self
    }

    pub fn state_path(mut self, path: impl Into<PathBuf>) -> AssistantBuilder {
        self.state_path = Some(path.into());
        self
    }

    /// Loads accounts and conversation state from disk. A fresh
    /// transcript opens with the greeting.
    pub fn build(self) -> Assistant {
        let accounts_path = self
            .accounts_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ACCOUNTS_PATH));
        let state_path = self
            .state_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));

        let store = AccountStore::load_or_empty(accounts_path);
        let file = state::read_state(&state_path);

        let mut transcript = file.messages;
        if transcript.is_empty() {
            transcript.push(Message::new(Role::Bot, replies::GREETING, Utc::now()));
        }

        Assistant {
            store,
            config: file.config,
            promo: file.promo,
            transcript,
            pending_place: None,
            state_path,
        }
    }
}
