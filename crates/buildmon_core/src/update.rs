use crate::{AggregateStatus, BoardState, Effect, Feed, FeedKind, FeedResult, Msg, NotifyPolicy};

/// Pure update function: applies a message to the board and returns any
/// notification effects.
pub fn update(mut state: BoardState, msg: Msg) -> (BoardState, Vec<Effect>) {
    let effects = match msg {
        Msg::Prepare(feeds) => {
            state.prepare(feeds);
            Vec::new()
        }
        Msg::Downloading { kind, feed_id } => {
            state.mark_downloading(kind, feed_id);
            Vec::new()
        }
        Msg::Processed {
            kind,
            feed_id,
            result,
        } => {
            // A feed removed while its download was in flight has no panel.
            let Some((feed, previous)) = state.apply_processed(kind, feed_id, result) else {
                return (state, Vec::new());
            };
            match state.last_result(kind, feed_id) {
                Some(current) => notification_effects(
                    state.policy(),
                    kind,
                    feed,
                    previous.as_ref(),
                    current,
                ),
                None => Vec::new(),
            }
        }
        Msg::RemovePanel { feed_id } => {
            state.remove_panel(feed_id);
            Vec::new()
        }
        Msg::PolicyChanged(policy) => {
            state.set_policy(policy);
            Vec::new()
        }
    };

    (state, effects)
}

fn notification_effects(
    policy: NotifyPolicy,
    kind: FeedKind,
    feed: Feed,
    previous: Option<&AggregateStatus>,
    current: &FeedResult,
) -> Vec<Effect> {
    let Some(newest) = current.newest() else {
        return Vec::new();
    };
    let notify = match policy {
        NotifyPolicy::Never => false,
        NotifyPolicy::EveryPoll => true,
        NotifyPolicy::OnChange => previous.is_some_and(|previous| *previous != current.status),
    };
    if !notify {
        return Vec::new();
    }

    let mut effects = vec![Effect::DisplayAlert {
        kind,
        title: current.title.clone(),
        feed: feed.clone(),
        build: newest.clone(),
    }];
    // The sound reflects the job's own health, not executor churn.
    if kind == FeedKind::Historic {
        effects.push(Effect::PlaySound {
            feed,
            status: current.status.clone(),
        });
    }
    effects
}
