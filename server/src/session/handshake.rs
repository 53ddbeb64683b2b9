//! First exchange on a new connection

use std::time::Duration;

use protocol::{GameRuleViolation, MessageStream, Request};
use tokio::io::AsyncRead;

use crate::error::SessionError;

/// Read the client's REQUEST. Zero rounds is refused before anything is dealt.
pub async fn read_request<S>(stream: &mut MessageStream<S>, limit: Duration) -> Result<Request, SessionError>
where
    S: AsyncRead + Unpin,
{
    let request: Request = stream.read_message_within(limit).await?;
    if request.rounds == 0 {
        return Err(GameRuleViolation::ZeroRounds.into());
    }
    Ok(request)
}
