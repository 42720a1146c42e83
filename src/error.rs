/// Logs the error of a best-effort operation and continues without its result.
pub trait ResultOkLogExt<T, E> {
    /// Converts to an [`Option`], logging any error at `error` level prefixed with `context`.
    fn ok_log(self, context: &str) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, context: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{context}: {err}");
                None
            }
        }
    }
}
