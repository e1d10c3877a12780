//! Delivery of the final outcome of a parse.

use tracing::warn;

use crate::error::{ParseError, Result};

/// Caller-supplied handler, called with the fault (if any) and the store
pub type Completion<'a, S> = Box<dyn FnOnce(Option<&ParseError>, &mut S) + Send + 'a>;

/// Where a parse was when its outcome became known
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Inside the call, before any asynchronous work started
    Synchronous,
    /// After the pipelined backend started its asynchronous work
    Pipelined,
}

/// Routes one outcome to the completion handler or back to the caller.
///
/// Consumed by [`CompletionBridge::resolve`], so the handler runs at most
/// once per parse.
pub struct CompletionBridge<'a, S> {
    handler: Option<Completion<'a, S>>,
    base: String,
    content_type: String,
}

impl<'a, S> CompletionBridge<'a, S> {
    pub fn new(handler: Option<Completion<'a, S>>, base: &str, content_type: &str) -> Self {
        Self {
            handler,
            base: base.to_string(),
            content_type: content_type.to_string(),
        }
    }

    /// Deliver `outcome`.
    ///
    /// With a handler, the handler sees the outcome and `Ok(())` is
    /// returned. Without one, a synchronous fault is returned wrapped with
    /// the base and content type; a pipelined fault is logged and dropped.
    pub fn resolve(self, outcome: Result<()>, stage: Stage, store: &mut S) -> Result<()> {
        match (self.handler, outcome) {
            (Some(handler), outcome) => {
                handler(outcome.as_ref().err(), store);
                Ok(())
            }
            (None, Ok(())) => Ok(()),
            (None, Err(fault)) => match stage {
                Stage::Synchronous => Err(fault.in_context(&self.base, &self.content_type)),
                Stage::Pipelined => {
                    warn!(
                        error = %fault,
                        base = %self.base,
                        content_type = %self.content_type,
                        "parse failed with no completion handler"
                    );
                    Ok(())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphparse_ir::Graph;
    use pretty_assertions::assert_eq;
    use std::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn unsupported() -> ParseError {
        ParseError::UnsupportedFormat("text/plain".to_string())
    }

    #[test]
    fn test_handler_sees_success_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let bridge: CompletionBridge<'_, Graph> = CompletionBridge::new(
            Some(Box::new(move |fault: Option<&ParseError>, _store: &mut Graph| {
                assert!(fault.is_none());
                seen.fetch_add(1, Ordering::SeqCst);
            })),
            "https://example.org/doc",
            "text/turtle",
        );

        let mut graph = Graph::new();
        bridge.resolve(Ok(()), Stage::Synchronous, &mut graph).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_sees_fault_and_call_succeeds() {
        let mut message = None;
        let bridge = CompletionBridge::new(
            Some(Box::new(|fault: Option<&ParseError>, _store: &mut Graph| {
                message = fault.map(|f| f.to_string());
            })),
            "https://example.org/doc",
            "text/plain",
        );

        let mut graph = Graph::new();
        assert!(bridge.resolve(Err(unsupported()), Stage::Pipelined, &mut graph).is_ok());
        assert_eq!(message.as_deref(), Some("Don't know how to parse text/plain yet"));
    }

    #[test]
    fn test_synchronous_fault_without_handler_gets_context() {
        let bridge = CompletionBridge::<Graph>::new(None, "https://example.org/doc", "text/plain");

        let err = bridge
            .resolve(Err(unsupported()), Stage::Synchronous, &mut Graph::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Don't know how to parse text/plain yet while trying to parse <https://example.org/doc> as text/plain"
        );
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("Don't know how to parse text/plain yet")
        );
        assert!(matches!(err.root(), ParseError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_pipelined_fault_without_handler_is_dropped() {
        let bridge = CompletionBridge::<Graph>::new(None, "https://example.org/doc", "application/n-quads");
        assert!(bridge
            .resolve(Err(unsupported()), Stage::Pipelined, &mut Graph::new())
            .is_ok());
    }
}
