//! Acknowledged-but-inert opcodes: party matching rooms, command
//! channels, observer mode and the olympiad match list. Their subsystems
//! are unspecified; the dispatcher still recognizes and state-gates the
//! opcodes so a client sending them is neither disconnected nor able to
//! smuggle them through the wrong state.

use tracing::debug;

use crate::dispatch::{DispatchCtx, HandlerResult, PostAction};

pub async fn soft_noop(ctx: DispatchCtx<'_>) -> HandlerResult {
    debug!(
        conn_id = ctx.conn.conn_id(),
        "stubbed opcode acknowledged without action"
    );

    Ok(PostAction::KeepOpen)
}
