use std::future::Future;

/// The player being driven.
///
/// Connects asynchronously; every operation other than `await_ready` assumes
/// the connection is up. Implementations must tolerate concurrent calls from
/// independent dispatch tasks; the relay performs no locking around them.
pub trait PlayerController: Send + Sync {
    /// Resolves once the player is connected.
    fn await_ready(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn play_pause(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Step forward. Does not guarantee the player is playing afterwards.
    fn fast_forward(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Step backward. Does not guarantee the player is playing afterwards.
    fn rewind(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Resume playback.
    fn play(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}
