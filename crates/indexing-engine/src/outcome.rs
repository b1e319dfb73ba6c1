//! Accumulator for operations that attempt every item and report the
//! last failure.

/// Records results of a sequence of attempts, keeping only the most
/// recent error.
#[derive(Debug)]
pub struct LastError<E> {
    attempts: usize,
    failures: usize,
    last: Option<E>,
}

impl<E> LastError<E> {
    pub fn new() -> Self {
        Self {
            attempts: 0,
            failures: 0,
            last: None,
        }
    }

    /// Record one attempt. Returns the value on success.
    pub fn record<T>(&mut self, result: Result<T, E>) -> Option<T> {
        self.attempts += 1;
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.failures += 1;
                self.last = Some(e);
                None
            }
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    /// `Err` with the last recorded error, if any attempt failed.
    pub fn into_result(self) -> Result<(), E> {
        match self.last {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<E> Default for LastError<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ok() {
        let mut acc: LastError<String> = LastError::new();
        assert_eq!(acc.record(Ok::<_, String>(1)), Some(1));
        assert_eq!(acc.record(Ok::<_, String>(2)), Some(2));
        assert_eq!(acc.attempts(), 2);
        assert!(acc.into_result().is_ok());
    }

    #[test]
    fn test_keeps_last_error() {
        let mut acc = LastError::new();
        acc.record(Err::<(), _>("first"));
        acc.record(Ok(()));
        acc.record(Err::<(), _>("third"));
        assert_eq!(acc.failures(), 2);
        assert_eq!(acc.into_result(), Err("third"));
    }
}
