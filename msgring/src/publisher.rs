/// Receives batches drained from a [`MessageRing`](crate::MessageRing) and hands them to
/// whatever transmits them downstream.
///
/// A returned error means the batch is lost: the flusher logs it and moves on.
pub trait Publisher<T>: Send + 'static {
    fn publish(&mut self, batch: Vec<T>) -> anyhow::Result<()>;
}

impl<T, F> Publisher<T> for F
where
    F: FnMut(Vec<T>) -> anyhow::Result<()> + Send + 'static,
{
    #[inline]
    fn publish(&mut self, batch: Vec<T>) -> anyhow::Result<()> {
        self(batch)
    }
}
