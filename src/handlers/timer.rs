//! Countdown commands: `addtime`, `timeleft` and `uptime`.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::core::{Context, Handler, HandlerError, HandlerResult};
use crate::state::{Channel, format_duration, format_end_time};

/// `addtime [n]` / `ugh [n]`: add `n` intervals (default 1), starting the
/// countdown at the message time if needed, and reply with the time left.
pub struct AddTimeHandler;

impl Handler for AddTimeHandler {
    fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let count = match ctx.args {
            [] => 1,
            [n] => n
                .parse::<u32>()
                .map_err(|_| HandlerError::NotANumber((*n).to_string()))?,
            _ => return Err(HandlerError::TooManyArguments),
        };

        let channel = ctx.channels.get_or_create(&ctx.msg.channel);
        let state = channel
            .timer()
            .add_interval(count, ctx.interval, ctx.sent_at)?;

        let time_left = state.time_left_at(Utc::now()).unwrap_or_default();
        let end_time = state.end_time().map(format_end_time);
        info!(
            channel = %channel.name(),
            count,
            duration = %format_duration(state.duration),
            end_time = end_time.as_deref(),
            "Time added"
        );

        ctx.reply(&format_duration(time_left));
        Ok(())
    }
}

/// Channel of the message, if its countdown is running. Queries never create channels.
fn started_channel(ctx: &Context<'_>) -> Result<Arc<Channel>, HandlerError> {
    ctx.channels
        .get(&ctx.msg.channel)
        .filter(|channel| channel.timer().has_started())
        .ok_or(HandlerError::NotInitialized)
}

/// `timeleft` / `howmuchlonger` / `remaining?`: reply with the time left.
pub struct TimeLeftHandler;

impl Handler for TimeLeftHandler {
    fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let channel = started_channel(ctx)?;
        let time_left = channel.timer().time_left().unwrap_or_default();

        ctx.reply(&format_duration(time_left));
        Ok(())
    }
}

/// `uptime`: reply with the time since the countdown started.
pub struct UptimeHandler;

impl Handler for UptimeHandler {
    fn handle(&self, ctx: &Context<'_>) -> HandlerResult {
        let channel = started_channel(ctx)?;
        let up_for = channel.timer().up_for(ctx.sent_at).unwrap_or_default();

        ctx.reply(&format_duration(up_for));
        Ok(())
    }
}
