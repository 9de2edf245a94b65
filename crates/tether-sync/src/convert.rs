//! Payload-to-record conversion hook.

/// Maps a raw network payload to local records.
///
/// Runs on the CPU pool, so it may be expensive but must not block on I/O.
/// Returning `None` signals that the payload holds no data, which is not an
/// error: synchronizers fold it into their empty states.
pub trait Convert<R, T>: Send + Sync + 'static {
    fn convert(&self, raw: &R) -> Option<T>;
}

impl<R, T, F> Convert<R, T> for F
where
    F: Fn(&R) -> Option<T> + Send + Sync + 'static,
{
    fn convert(&self, raw: &R) -> Option<T> {
        self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_convert() {
        let parse = |raw: &String| raw.parse::<u32>().ok();
        assert_eq!(parse.convert(&"42".to_string()), Some(42));
        assert_eq!(parse.convert(&"x".to_string()), None);
    }
}
