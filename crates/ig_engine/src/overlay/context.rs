//! GL current-context discipline
//!
//! Exactly one GL context may be current on a thread at a time; the overlay
//! time-multiplexes its own context with whatever the host had current. The
//! ambient "current context" slot is modeled as a [`ContextProvider`] and the
//! capture/switch/restore bracket as a [`ContextScope`] guard, so restoration
//! happens on drop even when the bracketed work bails early.

/// Opaque identifier for a GL context
///
/// The null handle means "no context current", which is the normal host state
/// here since the host window carries no client API context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ContextHandle(pub(crate) usize);

impl ContextHandle {
    pub(crate) const NONE: Self = Self(0);
}

/// Access to a thread's current-context slot
pub(crate) trait ContextProvider {
    /// The context currently bound on the calling thread
    fn current(&self) -> ContextHandle;

    /// Bind the given context on the calling thread
    fn make_current(&mut self, context: ContextHandle);
}

/// Scoped capture of the current context
///
/// `enter` switches to a target context after capturing the current one;
/// `save` only captures. Either way the captured context is re-bound when the
/// scope drops.
pub(crate) struct ContextScope<'a, P: ContextProvider + ?Sized> {
    provider: &'a mut P,
    saved: ContextHandle,
}

impl<'a, P: ContextProvider + ?Sized> ContextScope<'a, P> {
    pub(crate) fn enter(provider: &'a mut P, target: ContextHandle) -> Self {
        let saved = provider.current();
        provider.make_current(target);
        Self { provider, saved }
    }

    pub(crate) fn save(provider: &'a mut P) -> Self {
        let saved = provider.current();
        Self { provider, saved }
    }
}

impl<P: ContextProvider + ?Sized> Drop for ContextScope<'_, P> {
    fn drop(&mut self) {
        self.provider.make_current(self.saved);
    }
}

/// Provider backed by the real GLFW per-thread context slot
pub(crate) struct GlfwContextProvider;

impl ContextProvider for GlfwContextProvider {
    fn current(&self) -> ContextHandle {
        ContextHandle(unsafe { glfw::ffi::glfwGetCurrentContext() } as usize)
    }

    fn make_current(&mut self, context: ContextHandle) {
        unsafe { glfw::ffi::glfwMakeContextCurrent(context.0 as *mut glfw::ffi::GLFWwindow) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: ContextHandle = ContextHandle(1);
    const OVERLAY: ContextHandle = ContextHandle(2);

    /// Mock provider recording every context that becomes current
    struct RecordingProvider {
        current: ContextHandle,
        sequence: Vec<ContextHandle>,
    }

    impl RecordingProvider {
        fn new(initial: ContextHandle) -> Self {
            Self {
                current: initial,
                sequence: vec![initial],
            }
        }
    }

    impl ContextProvider for RecordingProvider {
        fn current(&self) -> ContextHandle {
            self.current
        }

        fn make_current(&mut self, context: ContextHandle) {
            self.current = context;
            self.sequence.push(context);
        }
    }

    #[test]
    fn test_scope_restores_saved_context() {
        let mut provider = RecordingProvider::new(HOST);
        {
            let _scope = ContextScope::enter(&mut provider, OVERLAY);
        }
        assert_eq!(provider.sequence, vec![HOST, OVERLAY, HOST]);
        assert_eq!(provider.current(), HOST);
    }

    #[test]
    fn test_scope_restores_on_early_bail() {
        fn fails_mid_frame(provider: &mut RecordingProvider) -> Result<(), ()> {
            let _scope = ContextScope::enter(provider, OVERLAY);
            Err(())
        }

        let mut provider = RecordingProvider::new(HOST);
        assert!(fails_mid_frame(&mut provider).is_err());
        assert_eq!(provider.sequence, vec![HOST, OVERLAY, HOST]);
    }

    #[test]
    fn test_save_only_captures() {
        let mut provider = RecordingProvider::new(HOST);
        {
            let _scope = ContextScope::save(&mut provider);
        }
        // No switch-in happened, and the capture still re-binds on drop
        assert_eq!(provider.sequence, vec![HOST, HOST]);
        assert_eq!(provider.current(), HOST);
    }

    #[test]
    fn test_none_handle_round_trip() {
        let mut provider = RecordingProvider::new(ContextHandle::NONE);
        {
            let _scope = ContextScope::enter(&mut provider, OVERLAY);
        }
        assert_eq!(provider.current(), ContextHandle::NONE);
    }
}
