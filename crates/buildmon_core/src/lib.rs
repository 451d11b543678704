//! Build monitor core: feed and build model, health evaluation, and the pure
//! panel board state machine the UI sink is built on.
mod build;
mod effect;
mod feed;
mod msg;
mod notify;
mod reltime;
mod state;
mod status;
mod update;
mod view_model;

pub use build::{status_token, Build, BuildKind, FeedResult};
pub use effect::Effect;
pub use feed::{ExecutorHandle, Feed, FeedId, FeedKind, DEFAULT_EXECUTOR_URL};
pub use msg::Msg;
pub use notify::{alert_icon, sound_for, NotifyPolicy, ParseNotifyPolicyError};
pub use reltime::relative_time;
pub use state::BoardState;
pub use status::{
    AggregateStatus, HealthEvaluator, HealthTier, ParseStatusModeError, StatusMode, IDLE_STATUS,
    SUCCESS_STATUS, UNKNOWN_STATUS,
};
pub use update::update;
pub use view_model::{BoardView, KindView, PanelView};
