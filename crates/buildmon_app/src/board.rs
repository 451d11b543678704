use buildmon_core::{update, BoardState, BoardView, KindView, Msg, NotifyPolicy};
use buildmon_engine::{dispatch, MonitorEvent, NotificationDispatcher};
use monitor_logging::monitor_info;

pub(crate) fn msg_for(event: MonitorEvent) -> Msg {
    match event {
        MonitorEvent::Prepared(feeds) => Msg::Prepare(feeds),
        MonitorEvent::Downloading { kind, feed_id } => Msg::Downloading { kind, feed_id },
        MonitorEvent::Processed {
            kind,
            feed_id,
            result,
        } => Msg::Processed {
            kind,
            feed_id,
            result,
        },
        MonitorEvent::PanelRemoved { feed_id } => Msg::RemovePanel { feed_id },
    }
}

/// Owns the board state and runs its effects.
pub(crate) struct Board<'a> {
    state: BoardState,
    notifier: &'a dyn NotificationDispatcher,
}

impl<'a> Board<'a> {
    pub(crate) fn new(policy: NotifyPolicy, notifier: &'a dyn NotificationDispatcher) -> Self {
        Self {
            state: BoardState::new(policy),
            notifier,
        }
    }

    pub(crate) fn apply(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in &effects {
            dispatch(self.notifier, effect);
        }
    }

    pub(crate) fn set_policy(&mut self, policy: NotifyPolicy) {
        if policy != self.state.policy() {
            self.apply(Msg::PolicyChanged(policy));
        }
    }

    /// Logs the board once per change.
    pub(crate) fn render(&mut self) {
        if !self.state.consume_dirty() {
            return;
        }
        for line in summary(&self.state.view()) {
            monitor_info!("{}", line);
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &BoardState {
        &self.state
    }
}

fn kind_cell(view: &KindView) -> String {
    if view.downloading {
        return "downloading".to_string();
    }
    match (&view.status, &view.newest) {
        (Some(status), Some(newest)) => format!("{status} ({newest})"),
        (Some(status), None) => status.clone(),
        (None, _) => "-".to_string(),
    }
}

pub(crate) fn summary(view: &BoardView) -> Vec<String> {
    view.panels
        .iter()
        .map(|panel| {
            let mut line = format!("#{} {}: {}", panel.feed_id, panel.name, kind_cell(&panel.historic));
            if panel.executor != KindView::default() {
                line.push_str(&format!(" | executors: {}", kind_cell(&panel.executor)));
            }
            line
        })
        .collect()
}
